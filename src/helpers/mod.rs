pub mod format;
pub mod validate;

pub use format::{format_number, sanitize_sheet_name};
pub use validate::{
    REDACTED_PASSWORD, redact_url_password, validate_database_name, validate_server_url,
};
