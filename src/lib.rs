//! Export CouchDB / Cloudant query results to formatted spreadsheets, plus
//! the document maintenance helpers that go with it.

pub mod cli;
pub mod connection;
pub mod document;
pub mod error;
pub mod export;
pub mod helpers;
pub mod state;

pub use error::{Error, Result};
