//! Integration tests for writing export files.
//!
//! Files go to a temp directory; the xlsx output is checked structurally
//! (zip container present) and the CSV output byte-for-byte.

mod common;

use std::fs;

use common::fixtures::{doc, generate_test_documents};
use couch_export::document::Table;
use couch_export::export::{XlsxExporter, write_csv, write_export};
use couch_export::state::{ExportFormat, ExportSettings};
use serde_json::json;
use tempfile::TempDir;

fn settings_in(dir: &TempDir, format: ExportFormat) -> ExportSettings {
    ExportSettings {
        output_folder: dir.path().to_string_lossy().into_owned(),
        format,
        ..ExportSettings::default()
    }
}

#[test]
fn test_write_export_xlsx() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let settings = settings_in(&temp_dir, ExportFormat::Xlsx);

    let summary = write_export(&generate_test_documents(3), &settings, "assessments").unwrap();

    assert_eq!(summary.path, temp_dir.path().join("assessments.xlsx"));
    assert_eq!(summary.documents, 3);
    assert_eq!(summary.columns, 5);
    let bytes = fs::read(&summary.path).expect("xlsx written");
    assert!(bytes.starts_with(b"PK"), "xlsx should be a zip container");
}

#[test]
fn test_write_export_csv() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let settings = settings_in(&temp_dir, ExportFormat::Csv);
    let docs = vec![
        doc(json!({ "_id": "1", "_rev": "1-a", "name": "Ana", "owner": { "team": "qa" }, "score": 7 })),
        doc(json!({ "_id": "2", "name": "Luis, Jr.", "passed": true })),
    ];

    let summary = write_export(&docs, &settings, "assessments").unwrap();

    let written = fs::read_to_string(&summary.path).expect("csv written");
    assert_eq!(
        written,
        ",name,owner.team,score,passed\n0,Ana,qa,7,\n1,\"Luis, Jr.\",,,true\n"
    );
}

#[test]
fn test_write_csv_without_index() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let path = temp_dir.path().join("plain.csv");
    let table = Table::from_documents(&[doc(json!({ "a": "x", "b": 1.5 }))], &[]);

    write_csv(&path, &table, false).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\nx,1.5\n");
}

#[test]
fn test_oversized_text_cell_is_truncated_not_fatal() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let settings = settings_in(&temp_dir, ExportFormat::Xlsx);
    let docs = vec![doc(json!({ "name": "ok", "notes": "é".repeat(40_000) }))];

    let summary = write_export(&docs, &settings, "db").expect("export should survive long cells");

    assert_eq!(summary.documents, 1);
    assert_eq!(summary.columns, 2);
    assert!(fs::read(&summary.path).unwrap().starts_with(b"PK"));
}

#[test]
fn test_empty_result_still_writes_file() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let settings = settings_in(&temp_dir, ExportFormat::Xlsx);

    let summary = write_export(&[], &settings, "assessments").unwrap();

    assert_eq!(summary.documents, 0);
    assert!(summary.path.exists());
}

#[test]
fn test_output_folder_is_created() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut settings = settings_in(&temp_dir, ExportFormat::Csv);
    settings.output_folder = temp_dir.path().join("nested/out").to_string_lossy().into_owned();

    let summary = write_export(&generate_test_documents(1), &settings, "db").unwrap();
    assert!(summary.path.starts_with(temp_dir.path().join("nested/out")));
    assert!(summary.path.exists());
}

#[test]
fn test_xlsx_exporter_sequence() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let path = temp_dir.path().join("manual.xlsx");
    let table = Table::from_documents(&generate_test_documents(2), &[]);

    let mut exporter = XlsxExporter::create(&path, "Assessments").unwrap();
    exporter.write_table(&table, true).unwrap();
    exporter
        .set_header_format(&Default::default(), &table, true)
        .unwrap();
    let saved = exporter.close().unwrap();

    assert_eq!(saved, path);
    assert!(fs::metadata(&path).unwrap().len() > 0);
}
