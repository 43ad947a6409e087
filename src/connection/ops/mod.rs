//! Database operations split into focused modules.

pub mod bulk;
pub mod documents;
pub mod replication;
pub mod views;
