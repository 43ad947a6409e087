//! Common test utilities for integration tests against a mock CouchDB.
//!
//! `CouchClient` blocks on its own Tokio runtime, so tests are plain `#[test]`
//! functions. The mock server is started and configured through a separate
//! runtime owned by `MockCouch`; wiremock serves requests on its own thread,
//! so the client can reach it while the test thread is blocked.

#![allow(dead_code)]

pub mod fixtures;

use couch_export::connection::CouchClient;
use couch_export::state::Credentials;
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

pub const TEST_DB: &str = "assessments";

/// A wiremock server standing in for CouchDB.
pub struct MockCouch {
    // Dropped before the runtime that started it.
    pub server: MockServer,
    runtime: Runtime,
}

impl MockCouch {
    /// Start a server that accepts `GET /_session` and `HEAD /assessments`.
    pub fn start() -> Self {
        let runtime = Runtime::new().expect("Failed to create test runtime");
        let server = runtime.block_on(MockServer::start());
        let mock = Self { server, runtime };

        mock.mount(
            Mock::given(method("GET")).and(path("/_session")).respond_with(
                ResponseTemplate::new(200).set_body_json(json!({
                    "ok": true,
                    "userCtx": { "name": "admin", "roles": ["_admin"] }
                })),
            ),
        );
        mock.mount(
            Mock::given(method("HEAD"))
                .and(path(format!("/{TEST_DB}")))
                .respond_with(ResponseTemplate::new(200)),
        );
        mock
    }

    /// Start a server with no routes mounted.
    pub fn start_empty() -> Self {
        let runtime = Runtime::new().expect("Failed to create test runtime");
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            user: "admin".to_string(),
            password: "secret".to_string(),
            url: self.server.uri(),
            database: Some(TEST_DB.to_string()),
        }
    }

    /// A client that has not selected a database yet.
    pub fn client(&self) -> CouchClient {
        CouchClient::new(self.credentials()).expect("Failed to create client")
    }

    /// A client with `assessments` selected.
    pub fn client_with_db(&self) -> CouchClient {
        let mut client = self.client();
        client.use_database(TEST_DB).expect("Failed to select database");
        client
    }

    /// Requests received so far with this method and path suffix.
    pub fn requests_to(&self, method_name: &str, path_suffix: &str) -> Vec<Request> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == method_name && r.url.path().ends_with(path_suffix))
            .collect()
    }
}

/// Matches requests whose body contains the given text.
pub struct BodyContains(pub String);

impl Match for BodyContains {
    fn matches(&self, request: &Request) -> bool {
        String::from_utf8_lossy(&request.body).contains(&self.0)
    }
}
