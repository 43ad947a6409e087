//! Core CouchClient struct and basic server/database methods.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::runtime::Runtime;

use crate::connection::types::{CouchErrorBody, SessionResponse};
use crate::error::{Error, Result};
use crate::helpers::{redact_url_password, validate_database_name, validate_server_url};
use crate::state::Credentials;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Blocking client for a CouchDB / Cloudant server.
///
/// Requests run on an owned Tokio runtime. Document operations act on the
/// database selected with [`CouchClient::use_database`].
pub struct CouchClient {
    pub(crate) runtime: Runtime,
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: Url,
    credentials: Credentials,
    database: Option<String>,
}

impl CouchClient {
    /// Create a client for the server in `credentials`. No request is sent
    /// until [`CouchClient::connect`].
    pub fn new(credentials: Credentials) -> Result<Self> {
        validate_server_url(&credentials.url).map_err(Error::Config)?;
        let base_url = Url::parse(credentials.url.trim())
            .map_err(|err| Error::Config(format!("Invalid server URL: {err}")))?;

        let runtime = Runtime::new()?;
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self { runtime, http, base_url, credentials, database: None })
    }

    /// Authenticate against `/_session` and return the user name the server
    /// resolved the credentials to.
    pub fn connect(&self) -> Result<String> {
        let request = self.request(Method::GET, &["_session"])?;
        let session: SessionResponse = self.runtime.block_on(async {
            let response = request.send().await?;
            read_json(response).await
        })?;

        let Some(name) = session.user_ctx.name else {
            return Err(Error::Auth("server did not accept the credentials".to_string()));
        };
        log::info!(
            "Connected to {} as {name} (roles: {})",
            redact_url_password(self.base_url.as_str()),
            session.user_ctx.roles.join(", ")
        );
        Ok(name)
    }

    /// End the server-side session. Basic-auth requests keep working afterwards.
    pub fn disconnect(&self) -> Result<()> {
        let request = self.request(Method::DELETE, &["_session"])?;
        self.runtime.block_on(async {
            let response = request.send().await?;
            read_json::<Value>(response).await
        })?;
        log::info!("Disconnected");
        Ok(())
    }

    /// Connect, run `f`, then end the session whether `f` succeeded or not.
    /// A failed disconnect is logged and does not mask the result of `f`.
    pub fn with_session<T, E, F>(&mut self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Self) -> std::result::Result<T, E>,
        E: From<Error>,
    {
        self.connect()?;
        let result = f(self);
        if let Err(err) = self.disconnect() {
            log::warn!("Failed to close session: {err}");
        }
        result
    }

    /// Point subsequent document operations at `name` after checking it exists.
    pub fn use_database(&mut self, name: &str) -> Result<()> {
        if !self.database_exists(name)? {
            return Err(Error::NotFound(format!("database '{name}'")));
        }
        self.database = Some(name.to_string());
        log::info!("Using database {name}");
        Ok(())
    }

    /// The currently selected database, if any.
    pub fn current_database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub(crate) fn require_database(&self) -> Result<&str> {
        self.database.as_deref().ok_or(Error::NoDatabase)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Check whether a database exists (`HEAD /{db}`)
    pub fn database_exists(&self, name: &str) -> Result<bool> {
        let request = self.request(Method::HEAD, &[name])?;
        self.runtime.block_on(async {
            let response = request.send().await?;
            match response.status() {
                status if status.is_success() => Ok(true),
                StatusCode::NOT_FOUND => Ok(false),
                _ => Err(couch_error(response).await),
            }
        })
    }

    /// List all databases on the server, sorted case-insensitively
    pub fn list_databases(&self) -> Result<Vec<String>> {
        let request = self.request(Method::GET, &["_all_dbs"])?;
        self.runtime.block_on(async {
            let response = request.send().await?;
            let mut databases: Vec<String> = read_json(response).await?;
            databases.sort_unstable_by_key(|name| name.to_lowercase());
            Ok(databases)
        })
    }

    /// Create a database
    pub fn create_database(&self, name: &str) -> Result<()> {
        validate_database_name(name).map_err(Error::Config)?;
        let request = self.request(Method::PUT, &[name])?;
        self.runtime.block_on(async {
            let response = request.send().await?;
            read_json::<Value>(response).await
        })?;
        log::info!("The database {name} was created successfully");
        Ok(())
    }

    /// Destroy a database and everything in it
    pub fn destroy_database(&self, name: &str) -> Result<()> {
        let request = self.request(Method::DELETE, &[name])?;
        self.runtime.block_on(async {
            let response = request.send().await?;
            read_json::<Value>(response).await
        })?;
        log::info!("The database {name} was destroyed successfully");
        Ok(())
    }

    /// Build an authenticated request to the given path segments.
    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments, &[])?;
        Ok(self.authorize(self.http.request(method, url)))
    }

    /// Like [`CouchClient::request`] with query parameters.
    pub(crate) fn request_with_query(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<RequestBuilder> {
        let url = self.endpoint(segments, query)?;
        Ok(self.authorize(self.http.request(method, url)))
    }

    /// Server URL for the given path segments. Segments are percent-encoded,
    /// so document ids containing `/` stay a single segment.
    pub(crate) fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.set_username("").ok();
        url.set_password(None).ok();
        url.path_segments_mut()
            .map_err(|_| Error::Config("Server URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.basic_auth(&self.credentials.user, Some(&self.credentials.password))
    }
}

/// Deserialize a successful response body, or turn the CouchDB error body
/// into an [`Error`].
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    if response.status().is_success() {
        return Ok(response.json::<T>().await?);
    }
    Err(couch_error(response).await)
}

pub(crate) async fn couch_error(response: Response) -> Error {
    let status = response.status();
    let body: CouchErrorBody = response.json().await.unwrap_or_default();
    let reason = match (body.error.is_empty(), body.reason.is_empty()) {
        (true, true) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        (false, true) => body.error,
        (true, false) => body.reason,
        (false, false) => format!("{}: {}", body.error, body.reason),
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Auth(reason),
        StatusCode::NOT_FOUND => Error::NotFound(reason),
        _ => Error::Couch { status: status.as_u16(), reason },
    }
}
