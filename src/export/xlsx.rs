//! Spreadsheet (.xlsx) output.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use super::{HeaderStyle, VerticalAlign};
use crate::document::{Cell, Table};
use crate::error::{Error, Result};
use crate::helpers::sanitize_sheet_name;

const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;
const MAX_STRING_CHARS: usize = 32_767;

/// Writes one table to one worksheet of a new workbook.
///
/// Usage follows the create / write / format / close sequence; nothing
/// reaches disk until [`XlsxExporter::close`].
pub struct XlsxExporter {
    workbook: Workbook,
    path: PathBuf,
    sheet: String,
}

impl XlsxExporter {
    /// Start a workbook at `path` with a single sheet.
    pub fn create(path: &Path, sheet_name: &str) -> Result<Self> {
        let sheet = sanitize_sheet_name(sheet_name);
        let mut workbook = Workbook::new();
        workbook.add_worksheet().set_name(&sheet)?;
        Ok(Self { workbook, path: path.to_path_buf(), sheet })
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet
    }

    /// Write the header row and all rows. With `include_index`, column 0
    /// holds row numbers and the data starts at column 1.
    pub fn write_table(&mut self, table: &Table, include_index: bool) -> Result<()> {
        let offset = usize::from(include_index);
        if table.columns.len() + offset > MAX_COLUMNS {
            return Err(Error::Config(format!("{} columns exceed the sheet limit", table.columns.len())));
        }
        if table.rows.len() + 1 > MAX_ROWS {
            return Err(Error::Config(format!("{} rows exceed the sheet limit", table.rows.len())));
        }

        let worksheet = self.worksheet()?;

        for (index, column) in table.columns.iter().enumerate() {
            worksheet.write_string(0, (index + offset) as u16, column)?;
        }

        for (row_index, row) in table.rows.iter().enumerate() {
            let row_num = (row_index + 1) as u32;
            if include_index {
                worksheet.write_number(row_num, 0, row_index as f64)?;
            }
            for (col_index, cell) in row.iter().enumerate() {
                let col_num = (col_index + offset) as u16;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(text) => {
                        let (text, truncated) = truncate_chars(text, MAX_STRING_CHARS);
                        if truncated {
                            log::warn!(
                                "Row {row_index}, column '{}' truncated to {MAX_STRING_CHARS} characters",
                                table.columns[col_index]
                            );
                        }
                        worksheet.write_string(row_num, col_num, text)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(row_num, col_num, *n)?;
                    }
                    Cell::Bool(b) => {
                        worksheet.write_boolean(row_num, col_num, *b)?;
                    }
                }
            }
        }

        worksheet.autofit();
        Ok(())
    }

    /// Rewrite the header row of the sheet with `style`.
    pub fn set_header_format(
        &mut self,
        style: &HeaderStyle,
        table: &Table,
        include_index: bool,
    ) -> Result<()> {
        let format = header_format(style)?;
        let offset = usize::from(include_index);
        let worksheet = self.worksheet()?;
        for (index, column) in table.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, (index + offset) as u16, column, &format)?;
        }
        Ok(())
    }

    /// Save the workbook and return its path.
    pub fn close(mut self) -> Result<PathBuf> {
        self.workbook.save(&self.path)?;
        Ok(self.path)
    }

    fn worksheet(&mut self) -> Result<&mut Worksheet> {
        Ok(self.workbook.worksheet_from_name(&self.sheet)?)
    }
}

fn header_format(style: &HeaderStyle) -> Result<Format> {
    let mut format = Format::new();
    if style.bold {
        format = format.set_bold();
    }
    if style.text_wrap {
        format = format.set_text_wrap();
    }
    format = format.set_align(match style.valign {
        VerticalAlign::Top => FormatAlign::Top,
        VerticalAlign::Vcenter => FormatAlign::VerticalCenter,
        VerticalAlign::Bottom => FormatAlign::Bottom,
    });
    format = format.set_background_color(Color::RGB(parse_hex_color(&style.fg_color)?));
    format = format.set_border(border_style(style.border));
    Ok(format)
}

/// Parse `#RRGGBB` (leading `#` optional).
fn parse_hex_color(raw: &str) -> Result<u32> {
    let hex = raw.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return Err(Error::Config(format!("Invalid colour '{raw}': expected #RRGGBB")));
    }
    u32::from_str_radix(hex, 16).map_err(|_| Error::Config(format!("Invalid colour '{raw}'")))
}

/// Cut `text` to at most `max` characters on a char boundary.
fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((end, _)) => (&text[..end], true),
        None => (text, false),
    }
}

/// xlsxwriter border indexes.
fn border_style(index: u8) -> FormatBorder {
    match index {
        0 => FormatBorder::None,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        _ => FormatBorder::Thin,
    }
}
