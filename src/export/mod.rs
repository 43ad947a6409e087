//! Query-to-spreadsheet export.
//!
//! This module provides:
//! - `run_export`: run every predefined query and write the combined results
//! - `XlsxExporter`: spreadsheet output with a styled header row
//! - `write_csv`: plain CSV output

mod csv;
mod xlsx;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::connection::CouchClient;
use crate::document::{Document, Table};
use crate::error::Result;
use crate::helpers::format_number;
use crate::state::{ExportFormat, ExportSettings, QuerySet};

pub use self::csv::write_csv;
pub use xlsx::XlsxExporter;

/// Vertical alignment of header cells
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Vcenter,
    Bottom,
}

/// Header row style, using the xlsxwriter-style keys
/// (`bold`, `text_wrap`, `valign`, `fg_color`, `border`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderStyle {
    #[serde(default = "default_true")]
    pub bold: bool,
    #[serde(default = "default_true")]
    pub text_wrap: bool,
    #[serde(default)]
    pub valign: VerticalAlign,
    #[serde(default = "default_fg_color")]
    pub fg_color: String,
    #[serde(default = "default_border")]
    pub border: u8,
}

impl Default for HeaderStyle {
    fn default() -> Self {
        Self {
            bold: true,
            text_wrap: true,
            valign: VerticalAlign::Top,
            fg_color: default_fg_color(),
            border: default_border(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_fg_color() -> String {
    "#D7E4BC".to_string()
}

fn default_border() -> u8 {
    1
}

/// What an export wrote.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub documents: usize,
    pub columns: usize,
    pub format: ExportFormat,
}

/// Run every query in `queries` and concatenate the results in file order.
pub fn collect_documents(client: &CouchClient, queries: &QuerySet) -> Result<Vec<Document>> {
    let mut docs = Vec::new();
    for named in &queries.queries {
        docs.extend(client.query_documents(&named.name, &named.query)?);
    }
    log::info!("{} docs retrieved", format_number(docs.len() as u64));
    Ok(docs)
}

/// Shape `docs` into a table and write it according to `settings`.
pub fn write_export(
    docs: &[Document],
    settings: &ExportSettings,
    database: &str,
) -> Result<ExportSummary> {
    let table = Table::from_documents(docs, &settings.drop_columns);
    let path = settings.output_path(database);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    match settings.format {
        ExportFormat::Xlsx => {
            let mut exporter = XlsxExporter::create(&path, &settings.sheet_name)?;
            exporter.write_table(&table, settings.include_index)?;
            log::info!("Excel file created, formatting header");
            exporter.set_header_format(&settings.header_style, &table, settings.include_index)?;
            exporter.close()?;
        }
        ExportFormat::Csv => write_csv(&path, &table, settings.include_index)?,
    }

    log::info!(
        "Wrote {} rows x {} columns to {}",
        format_number(table.row_count() as u64),
        table.columns.len(),
        path.display()
    );

    Ok(ExportSummary {
        path,
        documents: table.row_count(),
        columns: table.columns.len(),
        format: settings.format,
    })
}

/// Query the selected database and write the results.
pub fn run_export(
    client: &CouchClient,
    queries: &QuerySet,
    settings: &ExportSettings,
) -> Result<ExportSummary> {
    let database = client.current_database().unwrap_or("export").to_string();
    let docs = collect_documents(client, queries)?;
    write_export(&docs, settings, &database)
}
