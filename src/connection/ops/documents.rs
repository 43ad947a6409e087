//! Single-document operations and Mango queries on the selected database.

use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::connection::CouchClient;
use crate::connection::client::read_json;
use crate::connection::types::{DocumentRef, FindResponse, MangoQuery};
use crate::document::{Document, PatchSpec, resolve};
use crate::error::{Error, Result};

/// Page size used when a query has no explicit limit.
const FIND_PAGE_SIZE: u64 = 200;

impl CouchClient {
    /// Fetch a document by id. A missing document is `Ok(None)`.
    pub fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let db = self.require_database()?;
        let request = self.request(Method::GET, &[db, id])?;

        self.runtime.block_on(async {
            let response = request.send().await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            let doc: Document = read_json(response).await?;
            Ok(Some(doc))
        })
    }

    /// Insert a new document; the server assigns an id unless `_id` is set.
    pub fn insert_document(&self, doc: &Document) -> Result<DocumentRef> {
        let db = self.require_database()?;
        let request = self.request(Method::POST, &[db])?.json(doc);

        let created: DocumentRef = self.runtime.block_on(async {
            let response = request.send().await?;
            read_json(response).await
        })?;
        log::info!("Document {} inserted", created.id);
        Ok(created)
    }

    /// Delete the current revision of a document.
    pub fn delete_document(&self, id: &str) -> Result<DocumentRef> {
        let db = self.require_database()?;
        let doc = self.get_document(id)?.ok_or_else(|| Error::NotFound(format!("document '{id}'")))?;
        let rev = current_rev(&doc, id)?;

        let request = self.request_with_query(Method::DELETE, &[db, id], &[("rev", rev)])?;
        let deleted: DocumentRef = self.runtime.block_on(async {
            let response = request.send().await?;
            read_json(response).await
        })?;
        log::info!("Document {id} erased");
        Ok(deleted)
    }

    /// Save a full document (must carry `_id` and, for updates, `_rev`).
    pub fn save_document(&self, doc: &Document) -> Result<DocumentRef> {
        let db = self.require_database()?;
        let id = doc
            .get("_id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Config("document has no _id".to_string()))?;
        let request = self.request(Method::PUT, &[db, id])?.json(doc);

        self.runtime.block_on(async {
            let response = request.send().await?;
            read_json(response).await
        })
    }

    /// Apply a single-path patch to an existing document and save it.
    pub fn update_document(&self, id: &str, patch: &PatchSpec) -> Result<DocumentRef> {
        let mut doc =
            self.get_document(id)?.ok_or_else(|| Error::NotFound(format!("document '{id}'")))?;
        resolve(&mut doc, patch)?;
        let saved = self.save_document(&doc)?;
        log::info!("{id} has been updated at {}", patch.path());
        Ok(saved)
    }

    /// Run a Mango query and return every matching document.
    ///
    /// Without an explicit `limit` the query is paged through with bookmarks
    /// until the server runs out of results.
    pub fn query_documents(&self, name: &str, query: &MangoQuery) -> Result<Vec<Document>> {
        let db = self.require_database()?;

        if query.limit.is_some() {
            let page = self.find_page(db, query)?;
            log::info!("Successfully retrieved {name} query ({} docs)", page.docs.len());
            return Ok(page.docs);
        }

        let mut docs = Vec::new();
        let mut page_query = query.clone();
        page_query.limit = Some(FIND_PAGE_SIZE);

        loop {
            let page = self.find_page(db, &page_query)?;
            let fetched = page.docs.len() as u64;
            docs.extend(page.docs);

            let next = page.bookmark.filter(|b| !b.is_empty() && b != "nil");
            if fetched < FIND_PAGE_SIZE || next.is_none() || next == page_query.bookmark {
                break;
            }
            page_query.bookmark = next;
        }

        log::info!("Successfully retrieved {name} query ({} docs)", docs.len());
        Ok(docs)
    }

    fn find_page(&self, db: &str, query: &MangoQuery) -> Result<FindResponse> {
        let request = self.request(Method::POST, &[db, "_find"])?.json(query);
        let page: FindResponse = self.runtime.block_on(async {
            let response = request.send().await?;
            read_json(response).await
        })?;
        if let Some(warning) = &page.warning {
            log::warn!("{warning}");
        }
        Ok(page)
    }
}

fn current_rev<'a>(doc: &'a Document, id: &str) -> Result<&'a str> {
    doc.get("_rev")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Couch { status: 500, reason: format!("document '{id}' has no _rev") })
}
