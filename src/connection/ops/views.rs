//! View queries and view-driven cleanup.

use reqwest::Method;
use serde_json::Value;

use crate::connection::CouchClient;
use crate::connection::batching::BatchReport;
use crate::connection::client::read_json;
use crate::connection::types::{ViewResponse, ViewRow};
use crate::document::Document;
use crate::error::Result;

impl CouchClient {
    /// Fetch every row of `_design/{design}/_view/{view}` with its document.
    pub fn get_view(&self, design: &str, view: &str) -> Result<Vec<ViewRow>> {
        let db = self.require_database()?;
        let request = self.request_with_query(
            Method::GET,
            &[db, "_design", design, "_view", view],
            &[("include_docs", "true"), ("reduce", "false")],
        )?;

        let result: ViewResponse = self.runtime.block_on(async {
            let response = request.send().await?;
            read_json(response).await
        })?;
        log::debug!(
            "View {design}/{view}: {} rows (total {})",
            result.rows.len(),
            result.total_rows.map_or_else(|| "?".to_string(), |n| n.to_string())
        );
        Ok(result.rows)
    }

    /// Mark every document returned by a view as deleted, writing the
    /// tombstones in `blocks` bulk calls.
    pub fn cleanup_view(&self, design: &str, view: &str, blocks: i64) -> Result<BatchReport> {
        let rows = self.get_view(design, view)?;
        let tombstones = tombstones(rows);
        log::info!("{} docs from {design}/{view} marked as deleted", tombstones.len());
        self.bulk_by_blocks(&tombstones, blocks)
    }
}

/// Turn view rows into deletion stubs. Rows without a document are skipped,
/// and a document emitted by several rows is deleted once.
pub fn tombstones(rows: Vec<ViewRow>) -> Vec<Document> {
    let mut seen = std::collections::HashSet::new();
    rows.into_iter()
        .filter_map(|row| row.doc)
        .filter(|doc| match doc.get("_id").and_then(Value::as_str) {
            Some(id) => seen.insert(id.to_string()),
            None => false,
        })
        .map(|mut doc| {
            doc.insert("_deleted".to_string(), Value::Bool(true));
            doc
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: &str, doc: Option<Value>) -> ViewRow {
        ViewRow {
            id: id.to_string(),
            key: Value::Null,
            value: Value::Null,
            doc: doc.and_then(|d| d.as_object().cloned()),
        }
    }

    #[test]
    fn test_tombstones_mark_and_dedupe() {
        let rows = vec![
            row("a", Some(json!({ "_id": "a", "_rev": "1-x", "n": 1 }))),
            row("a", Some(json!({ "_id": "a", "_rev": "1-x", "n": 1 }))),
            row("b", None),
            row("c", Some(json!({ "_id": "c", "_rev": "2-y" }))),
        ];

        let docs = tombstones(rows);
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.get("_deleted") == Some(&Value::Bool(true))));
        assert_eq!(docs[1].get("_id"), Some(&json!("c")));
    }
}
