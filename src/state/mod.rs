// Configuration and settings

pub mod config;
pub mod settings;

pub use config::{
    CREDENTIALS_VAR, ConfigManager, Credentials, DEFAULT_QUERIES_FILE, NamedQuery, QuerySet,
};
pub use settings::{ExportFormat, ExportSettings, expand_filename_template};
