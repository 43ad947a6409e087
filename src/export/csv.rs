//! CSV output.

use std::fs::File;
use std::path::Path;

use crate::document::Table;
use crate::error::Result;

/// Write `table` as CSV with a header row. With `include_index`, a leading
/// unnamed column holds row numbers.
pub fn write_csv(path: &Path, table: &Table, include_index: bool) -> Result<()> {
    let file = File::create(path)?;
    let mut csv_writer = csv::Writer::from_writer(file);

    let mut header: Vec<&str> = Vec::with_capacity(table.columns.len() + 1);
    if include_index {
        header.push("");
    }
    header.extend(table.columns.iter().map(String::as_str));
    csv_writer.write_record(&header)?;

    for (index, row) in table.rows.iter().enumerate() {
        let mut record: Vec<String> = Vec::with_capacity(row.len() + 1);
        if include_index {
            record.push(index.to_string());
        }
        record.extend(row.iter().map(|cell| cell.as_text().into_owned()));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}
