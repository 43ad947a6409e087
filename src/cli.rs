//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::state::{DEFAULT_QUERIES_FILE, ExportFormat};

#[derive(Debug, Parser)]
#[command(name = "couch-export", version, about = "Export CouchDB/Cloudant query results to spreadsheets")]
pub struct Cli {
    /// Directory holding `.env`, `export.json` and relative query files
    #[arg(long, global = true, env = "COUCH_EXPORT_DIR", default_value = ".")]
    pub config_dir: PathBuf,

    /// Database to use instead of NAMEDB from the credentials
    #[arg(long, global = true)]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the predefined queries and write the results to a spreadsheet
    Export(ExportArgs),
    /// Print a document as JSON
    Get { id: String },
    /// Patch one field of a document, e.g. '{"profile": {"city": "Lyon"}}'
    Update {
        id: String,
        patch: String,
        /// Only accept string values at the end of the patch path
        #[arg(long)]
        strict: bool,
    },
    /// Delete a document
    Delete { id: String },
    /// Mark every document returned by a view as deleted
    CleanupView {
        design: String,
        view: String,
        /// Number of bulk requests to split the deletions into
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        blocks: i64,
    },
    /// Replicate one database into another and wait for it to finish
    Replicate(ReplicateArgs),
    /// List databases on the server
    ListDbs,
    /// Create a database
    CreateDb { name: String },
    /// Destroy a database
    DestroyDb { name: String },
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Query file
    #[arg(long, default_value = DEFAULT_QUERIES_FILE)]
    pub queries: PathBuf,

    /// Output format (overrides export.json)
    #[arg(long, value_parser = parse_format)]
    pub format: Option<ExportFormat>,

    /// Output filename template without extension (overrides export.json)
    #[arg(long)]
    pub output: Option<String>,

    /// Worksheet name (overrides export.json)
    #[arg(long)]
    pub sheet: Option<String>,
}

impl Default for ExportArgs {
    fn default() -> Self {
        Self { queries: PathBuf::from(DEFAULT_QUERIES_FILE), format: None, output: None, sheet: None }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ReplicateArgs {
    /// Source database name or URL
    pub source: String,
    /// Target database name or URL
    pub target: String,
    /// Create the target database if it does not exist
    #[arg(long)]
    pub create_target: bool,
    /// Seconds between status checks
    #[arg(long, default_value_t = 2)]
    pub poll_interval: u64,
    /// Seconds to wait before giving up
    #[arg(long, default_value_t = 600)]
    pub timeout: u64,
}

fn parse_format(raw: &str) -> Result<ExportFormat, String> {
    match raw.to_ascii_lowercase().as_str() {
        "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
        "csv" => Ok(ExportFormat::Csv),
        other => Err(format!("unknown format '{other}' (expected xlsx or csv)")),
    }
}
