use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;

/// A Mango (`_find`) query as stored in the query file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MangoQuery {
    pub selector: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_index: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<String>,
}

impl MangoQuery {
    pub fn new(selector: Value) -> Self {
        Self { selector, ..Default::default() }
    }
}

/// Response body of `POST /{db}/_find`.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct FindResponse {
    pub docs: Vec<Document>,
    #[serde(default)]
    pub bookmark: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
}

/// Identity of a stored document revision.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DocumentRef {
    pub id: String,
    pub rev: String,
}

/// One row of a view result fetched with `include_docs=true`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ViewRow {
    pub id: String,
    #[serde(default)]
    pub key: Value,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub doc: Option<Document>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ViewResponse {
    #[serde(default)]
    pub total_rows: Option<u64>,
    pub rows: Vec<ViewRow>,
}

/// Per-document result of `POST /{db}/_bulk_docs`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BulkResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub rev: Option<String>,
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl BulkResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Standard CouchDB error body.
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct CouchErrorBody {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub reason: String,
}

/// Body of `GET /_session`.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SessionResponse {
    #[serde(rename = "userCtx")]
    pub user_ctx: UserContext,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct UserContext {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// A one-shot replication between two databases.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplicationRequest {
    /// Source database name or full URL.
    pub source: String,
    /// Target database name or full URL.
    pub target: String,
    pub create_target: bool,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl ReplicationRequest {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            create_target: false,
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(600),
        }
    }
}

/// `_replication_state` of a `_replicator` document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplicationState {
    #[default]
    Pending,
    Initializing,
    Running,
    Triggered,
    Completed,
    Crashing,
    Error,
    Failed,
}

impl ReplicationState {
    pub fn label(self) -> &'static str {
        match self {
            ReplicationState::Pending => "Pending",
            ReplicationState::Initializing => "Initializing",
            ReplicationState::Running => "Running",
            ReplicationState::Triggered => "Triggered",
            ReplicationState::Completed => "Completed",
            ReplicationState::Crashing => "Crashing",
            ReplicationState::Error => "Error",
            ReplicationState::Failed => "Failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReplicationState::Completed | ReplicationState::Failed | ReplicationState::Error
        )
    }
}

/// Outcome of a finished replication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplicationOutcome {
    pub id: String,
    pub state: ReplicationState,
    pub docs_written: Option<u64>,
}
