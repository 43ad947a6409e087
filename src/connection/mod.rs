//! CouchDB connection management and operations.
//!
//! This module provides:
//! - `CouchClient`: Core connection management and server-level operations
//! - `ops`: Database operations (documents, bulk, views, replication)
//! - `batching`: Partitioning of large document batches into bulk writes
//! - `types`: Shared request/response types for all operations

pub mod batching;
pub mod client;
pub mod ops;
pub mod types;

// Re-export commonly used items at the crate level
pub use batching::{BatchError, BatchReport, ChunkOutcome, partition, write_in_batches};
pub use client::CouchClient;
pub use ops::bulk::DocumentStore;
pub use ops::views::tombstones;
pub use types::{
    BulkResult, DocumentRef, MangoQuery, ReplicationOutcome, ReplicationRequest, ReplicationState,
    ViewRow,
};
