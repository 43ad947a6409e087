//! One-shot replication through the `_replicator` database.

use reqwest::Method;
use serde_json::{Value, json};

use crate::connection::CouchClient;
use crate::connection::client::read_json;
use crate::connection::types::{
    DocumentRef, ReplicationOutcome, ReplicationRequest, ReplicationState,
};
use crate::error::{Error, Result};

const REPLICATOR_DB: &str = "_replicator";

impl CouchClient {
    /// Submit a one-shot replication and poll it until it completes, fails
    /// or `request.timeout` elapses.
    pub fn replicate(&self, request: &ReplicationRequest) -> Result<ReplicationOutcome> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let body = json!({
            "_id": id,
            "source": self.replication_endpoint(&request.source),
            "target": self.replication_endpoint(&request.target),
            "create_target": request.create_target,
            "continuous": false,
        });

        let submit = self.request(Method::POST, &[REPLICATOR_DB])?.json(&body);
        let created: DocumentRef = self.runtime.block_on(async {
            let response = submit.send().await?;
            read_json(response).await
        })?;
        log::info!("Replication {} submitted: {} -> {}", created.id, request.source, request.target);

        let poll = self.request(Method::GET, &[REPLICATOR_DB, &created.id])?;
        let interval = request.poll_interval;

        let polled = self.runtime.block_on(async {
            tokio::time::timeout(request.timeout, async {
                loop {
                    let Some(attempt) = poll.try_clone() else {
                        return Err(Error::Replication("cannot retry status request".to_string()));
                    };
                    let doc: Value = read_json(attempt.send().await?).await?;
                    let state = replication_state(&doc);
                    log::debug!("Replication {} is {}", created.id, state.label());

                    if state.is_terminal() {
                        return Ok((state, doc));
                    }
                    tokio::time::sleep(interval).await;
                }
            })
            .await
        });

        let (state, doc) = match polled {
            Ok(result) => result?,
            Err(_) => {
                return Err(Error::Timeout(format!(
                    "replication {} did not finish within {:?}",
                    created.id, request.timeout
                )));
            }
        };

        if state != ReplicationState::Completed {
            let reason = doc
                .get("_replication_state_reason")
                .and_then(Value::as_str)
                .unwrap_or("no reason given");
            return Err(Error::Replication(format!("{} ({reason})", state.label())));
        }

        let docs_written = doc.pointer("/_replication_stats/docs_written").and_then(Value::as_u64);
        log::info!("Replication {} completed", created.id);
        Ok(ReplicationOutcome { id: created.id, state, docs_written })
    }

    /// Full replication endpoint for a database name or URL. Bare names are
    /// resolved against this server and carry its credentials.
    fn replication_endpoint(&self, database: &str) -> Value {
        if database.starts_with("http://") || database.starts_with("https://") {
            return Value::String(database.to_string());
        }

        let url = self
            .endpoint(&[database], &[])
            .map(|url| url.to_string())
            .unwrap_or_else(|_| database.to_string());
        let credentials = self.credentials();
        json!({
            "url": url,
            "auth": {
                "basic": {
                    "username": credentials.user,
                    "password": credentials.password,
                }
            }
        })
    }
}

fn replication_state(doc: &Value) -> ReplicationState {
    doc.get("_replication_state")
        .cloned()
        .and_then(|state| serde_json::from_value(state).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replication_state_parsing() {
        assert_eq!(replication_state(&json!({})), ReplicationState::Pending);
        assert_eq!(
            replication_state(&json!({ "_replication_state": "completed" })),
            ReplicationState::Completed
        );
        assert_eq!(
            replication_state(&json!({ "_replication_state": "running" })),
            ReplicationState::Running
        );
        assert_eq!(
            replication_state(&json!({ "_replication_state": "something-new" })),
            ReplicationState::Pending
        );
    }
}
