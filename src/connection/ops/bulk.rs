//! Bulk document writes.

use reqwest::Method;
use serde_json::json;

use crate::connection::CouchClient;
use crate::connection::batching::{BatchReport, write_in_batches};
use crate::connection::client::read_json;
use crate::connection::types::BulkResult;
use crate::document::Document;
use crate::error::{Error, Result};

/// Anything that can persist a batch of documents in one call.
pub trait DocumentStore {
    fn bulk_write(&self, docs: &[Document]) -> Result<()>;
}

impl CouchClient {
    /// Push a batch of documents in one `_bulk_docs` call.
    ///
    /// Returns the per-document results; documents the server rejected
    /// (conflicts, validation failures) carry an `error`.
    pub fn bulk(&self, docs: &[Document]) -> Result<Vec<BulkResult>> {
        let db = self.require_database()?;
        let request = self.request(Method::POST, &[db, "_bulk_docs"])?.json(&json!({ "docs": docs }));

        let results: Vec<BulkResult> = self.runtime.block_on(async {
            let response = request.send().await?;
            read_json(response).await
        })?;

        for rejected in results.iter().filter(|r| !r.is_ok()) {
            log::debug!(
                "Rejected {}: {} ({})",
                rejected.id.as_deref().unwrap_or("<no id>"),
                rejected.error.as_deref().unwrap_or_default(),
                rejected.reason.as_deref().unwrap_or_default()
            );
        }
        let rejected = results.iter().filter(|r| !r.is_ok()).count();
        if rejected == 0 {
            log::info!("Bulk of {} docs: all accepted", docs.len());
        } else {
            log::warn!(
                "Bulk of {} docs: {} accepted, {rejected} rejected",
                docs.len(),
                results.len() - rejected
            );
        }
        Ok(results)
    }

    /// Bulk-write `docs` split into `blocks` chunks, continuing past failed chunks.
    pub fn bulk_by_blocks(&self, docs: &[Document], blocks: i64) -> Result<BatchReport> {
        let report = write_in_batches(docs, blocks, |chunk| self.bulk_write(chunk))?;
        if !report.all_succeeded() {
            log::warn!(
                "{} of {} chunks failed: {:?}",
                report.failed().len(),
                report.outcomes.len(),
                report.failed()
            );
        }
        Ok(report)
    }
}

impl DocumentStore for CouchClient {
    fn bulk_write(&self, docs: &[Document]) -> Result<()> {
        let results = self.bulk(docs)?;
        let rejected = results.iter().filter(|r| !r.is_ok()).count();
        if rejected > 0 {
            return Err(Error::BulkRejected { rejected, total: docs.len() });
        }
        Ok(())
    }
}
