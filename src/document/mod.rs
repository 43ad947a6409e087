//! Schema-less document helpers: nested patching and tabular shaping.

pub mod patch;
pub mod table;

/// A schema-less JSON document as stored in CouchDB.
pub type Document = serde_json::Map<String, serde_json::Value>;

pub use patch::{PatchError, PatchPolicy, PatchSpec, PatchValue, resolve};
pub use table::{Cell, Table, collect_columns, flatten_document};
