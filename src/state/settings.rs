//! Export settings.

use serde::{Deserialize, Serialize};

use crate::export::HeaderStyle;

/// Output format for exports
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "Excel (.xlsx)",
            ExportFormat::Csv => "CSV (.csv)",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

/// How query results are written out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_filename_template")]
    pub filename_template: String,
    #[serde(default)]
    pub output_folder: String,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default = "default_true")]
    pub include_index: bool,
    #[serde(default)]
    pub header_style: HeaderStyle,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            filename_template: default_filename_template(),
            output_folder: String::new(),
            sheet_name: default_sheet_name(),
            drop_columns: default_drop_columns(),
            format: ExportFormat::default(),
            include_index: true,
            header_style: HeaderStyle::default(),
        }
    }
}

impl ExportSettings {
    /// Output path for `database`, with the template expanded and the
    /// format's extension appended.
    pub fn output_path(&self, database: &str) -> std::path::PathBuf {
        let stem = expand_filename_template(&self.filename_template, database);
        let filename = format!("{stem}.{}", self.format.extension());
        if self.output_folder.is_empty() {
            std::path::PathBuf::from(filename)
        } else {
            std::path::Path::new(&self.output_folder).join(filename)
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sheet_name() -> String {
    "Assessments".to_string()
}

fn default_drop_columns() -> Vec<String> {
    vec!["_id".to_string(), "_rev".to_string(), "parentid".to_string()]
}

fn default_filename_template() -> String {
    DEFAULT_FILENAME_TEMPLATE.to_string()
}

/// Default filename template constant
pub const DEFAULT_FILENAME_TEMPLATE: &str = "assessments";

/// Expand filename template placeholders
pub fn expand_filename_template(template: &str, database: &str) -> String {
    let now = chrono::Local::now();

    template
        .replace("${datetime}", &now.format("%Y-%m-%d_%H-%M-%S").to_string())
        .replace("${date}", &now.format("%Y-%m-%d").to_string())
        .replace("${time}", &now.format("%H-%M-%S").to_string())
        .replace("${database}", database)
}
