use thiserror::Error;

use crate::connection::batching::BatchError;
use crate::document::patch::PatchError;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CouchDB error {status}: {reason}")]
    Couch { status: u16, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("No database selected")]
    NoDatabase,

    #[error("Bulk write rejected {rejected} of {total} documents")]
    BulkRejected { rejected: usize, total: usize },

    #[error("Replication failed: {0}")]
    Replication(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience Result type using our Error
pub type Result<T> = std::result::Result<T, Error>;
