//! Output spreadsheet writing.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatPattern, Workbook, Worksheet};
use tracing::debug;

use super::{CellValue, OutputSheet};
use crate::error::{SheetError, SheetResult};

/// Widest an output column gets, in characters. Longer content wraps.
pub const MAX_COLUMN_WIDTH: usize = 78;

const HEADER_BACKGROUND: u32 = 0x00CCFF;

/// Spreadsheet type written for an output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Xlsx,
    Csv,
}

impl OutputKind {
    /// Pick the output type from the path extension, `None` if the
    /// extension is not one we write.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "xlsx" => Some(OutputKind::Xlsx),
            "csv" => Some(OutputKind::Csv),
            _ => None,
        }
    }
}

/// Write `sheet` to `path`, replacing any existing file.
pub fn write_output(sheet: &OutputSheet, path: &Path) -> SheetResult<()> {
    match OutputKind::from_path(path) {
        Some(OutputKind::Xlsx) => write_xlsx(sheet, path)?,
        Some(OutputKind::Csv) => write_csv(sheet, path)?,
        None => return Err(SheetError::UnsupportedExtension(path.to_path_buf())),
    }

    debug!(path = %path.display(), rows = sheet.row_count(), "Wrote output sheet");
    Ok(())
}

fn write_xlsx(sheet: &OutputSheet, path: &Path) -> SheetResult<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&sheet.name)?;

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_BACKGROUND))
        .set_pattern(FormatPattern::Solid);
    let wrap_format = Format::new().set_text_wrap();

    let widths = column_widths(sheet);

    for (col, header) in sheet.headers().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }

    for (row_index, row) in sheet.rows().iter().enumerate() {
        let row_number = (row_index + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let Some(cell) = cell else { continue };
            let wrap = widths[col] >= MAX_COLUMN_WIDTH;
            write_cell(worksheet, row_number, col as u16, cell, wrap.then_some(&wrap_format))?;
        }
    }

    for (col, width) in widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width as f64)?;
    }

    workbook.save(path)?;
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    format: Option<&Format>,
) -> SheetResult<()> {
    match (cell, format) {
        (CellValue::Text(text), Some(format)) => {
            worksheet.write_string_with_format(row, col, text, format)?;
        }
        (CellValue::Text(text), None) => {
            worksheet.write_string(row, col, text)?;
        }
        (CellValue::Integer(n), _) => {
            worksheet.write_number(row, col, *n as f64)?;
        }
    }
    Ok(())
}

/// Width of each column: its longest line plus padding, capped at
/// [`MAX_COLUMN_WIDTH`].
fn column_widths(sheet: &OutputSheet) -> Vec<usize> {
    let mut widths: Vec<usize> = sheet.headers().iter().map(|h| text_width(h)).collect();

    for row in sheet.rows() {
        for (col, cell) in row.iter().enumerate() {
            if let Some(cell) = cell {
                let width = text_width(&cell.to_string());
                if width > widths[col] {
                    widths[col] = width;
                }
            }
        }
    }

    widths
        .into_iter()
        .map(|w| (w + 2).min(MAX_COLUMN_WIDTH))
        .collect()
}

fn text_width(text: &str) -> usize {
    text.lines().map(|l| l.chars().count()).max().unwrap_or(0)
}

fn write_csv(sheet: &OutputSheet, path: &Path) -> SheetResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(sheet.headers())?;

    for row in sheet.rows() {
        let record: Vec<String> = row
            .iter()
            .map(|cell| cell.as_ref().map(CellValue::to_string).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
