// Configuration loading: credentials, query files and export settings

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::connection::types::MangoQuery;
use crate::helpers::redact_url_password;
use crate::state::settings::ExportSettings;

/// Environment variable holding the JSON credentials blob.
pub const CREDENTIALS_VAR: &str = "DBSOURCE";

/// Query file read when none is given on the command line.
pub const DEFAULT_QUERIES_FILE: &str = "queries/getAssessments.json";

/// Connection credentials for a CouchDB / Cloudant instance.
///
/// Deserialized from `{"USERDB": .., "PASSDB": .., "URLDB": .., "NAMEDB": ..}`.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    #[serde(rename = "USERDB")]
    pub user: String,
    #[serde(rename = "PASSDB")]
    pub password: String,
    #[serde(rename = "URLDB")]
    pub url: String,
    #[serde(rename = "NAMEDB", default)]
    pub database: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"*****")
            .field("url", &redact_url_password(&self.url))
            .field("database", &self.database)
            .finish()
    }
}

impl Credentials {
    /// Parse the JSON credentials blob.
    pub fn from_json(raw: &str) -> Result<Self> {
        let credentials: Credentials =
            serde_json::from_str(raw).context("Failed to parse credentials JSON")?;
        if credentials.url.trim().is_empty() {
            anyhow::bail!("URLDB must not be empty");
        }
        Ok(credentials)
    }

    /// Read credentials from `var` in the process environment.
    pub fn from_env_var(var: &str) -> Result<Self> {
        let raw = std::env::var(var).with_context(|| format!("{var} is not set"))?;
        Self::from_json(&raw).with_context(|| format!("Invalid credentials in {var}"))
    }

    /// Database name, or an error naming what is missing.
    pub fn require_database(&self) -> Result<&str> {
        self.database.as_deref().filter(|name| !name.is_empty()).context("NAMEDB is not set")
    }
}

/// A named query, in the order it appeared in the query file.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedQuery {
    pub name: String,
    pub query: MangoQuery,
}

/// Ordered set of predefined queries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuerySet {
    pub queries: Vec<NamedQuery>,
}

impl QuerySet {
    /// Parse `{"name": {"selector": {...}, ...}, ...}` keeping file order.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let map: serde_json::Map<String, Value> =
            serde_json::from_str(raw).context("Query file must be a JSON object")?;

        let queries = map
            .into_iter()
            .map(|(name, value)| {
                let query: MangoQuery = serde_json::from_value(value)
                    .with_context(|| format!("Invalid query '{name}'"))?;
                Ok(NamedQuery { name, query })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { queries })
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// Loads configuration files relative to a base directory.
#[derive(Clone, Debug)]
pub struct ConfigManager {
    base_dir: PathBuf,
}

impl ConfigManager {
    const EXPORT_SETTINGS_FILE: &'static str = "export.json";

    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    /// Load a `.env` file from the base directory into the environment.
    /// A missing file is not an error.
    pub fn load_dotenv(&self) -> Result<()> {
        match dotenvy::from_path(self.base_dir.join(".env")) {
            Ok(()) => Ok(()),
            Err(err) if err.not_found() => Ok(()),
            Err(err) => Err(err).context("Failed to load .env file"),
        }
    }

    /// Credentials from the `DBSOURCE` environment variable.
    pub fn load_credentials(&self) -> Result<Credentials> {
        let credentials = Credentials::from_env_var(CREDENTIALS_VAR)?;
        log::info!("Credentials loaded for {}", redact_url_password(&credentials.url));
        Ok(credentials)
    }

    /// Load the query file at `path` (relative paths resolve against the base directory).
    pub fn load_queries(&self, path: &Path) -> Result<QuerySet> {
        let path = self.resolve(path);
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let queries = QuerySet::from_json_str(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        log::debug!("Loaded {} queries from {}", queries.len(), path.display());
        Ok(queries)
    }

    /// Export settings from `export.json`, or defaults when the file is absent.
    pub fn load_export_settings(&self) -> Result<ExportSettings> {
        Ok(self.load_json(Self::EXPORT_SETTINGS_FILE)?.unwrap_or_default())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() { path.to_path_buf() } else { self.base_dir.join(path) }
    }

    fn load_json<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        let path = self.base_dir.join(filename);

        if !path.exists() {
            return Ok(None);
        }

        let data =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {}", filename))?;

        let value: T = serde_json::from_str(&data)
            .with_context(|| format!("Failed to deserialize {}", filename))?;

        Ok(Some(value))
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new(".")
    }
}
