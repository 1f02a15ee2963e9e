//! Input spreadsheet reading.
//!
//! Workbooks (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) go through
//! `calamine`; `.csv` files through [`crate::parser`]. Every cell comes back
//! as text.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::{debug, trace};

use super::{HeaderIndex, Sheet};
use crate::error::{SheetError, SheetResult};
use crate::models::SheetSelector;
use crate::parser::parse_csv_file_auto;

/// Kind of input file, from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Workbook,
    Csv,
}

fn input_kind(path: &Path) -> SheetResult<InputKind> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Ok(InputKind::Workbook),
        Some("csv") => Ok(InputKind::Csv),
        _ => Err(SheetError::UnsupportedExtension(path.to_path_buf())),
    }
}

/// Read the input-data sheet of `path` into memory.
pub fn open_input(path: &Path, selector: SheetSelector) -> SheetResult<Sheet> {
    let sheet = match input_kind(path)? {
        InputKind::Csv => parse_csv_file_auto(path)?,
        InputKind::Workbook => read_workbook_sheet(path, selector)?,
    };

    debug!(
        path = %path.display(),
        sheet = %sheet.name,
        columns = sheet.headers.len(),
        rows = sheet.row_count(),
        "Read input sheet"
    );
    Ok(sheet)
}

/// Header row of the input-data sheet of `path`.
pub fn read_headers(path: &Path, selector: SheetSelector) -> SheetResult<HeaderIndex> {
    open_input(path, selector).map(|sheet| sheet.headers)
}

fn read_workbook_sheet(path: &Path, selector: SheetSelector) -> SheetResult<Sheet> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names().to_vec();

    let name = selector
        .select(&sheet_names)
        .map(str::to_string)
        .ok_or_else(|| {
            SheetError::SheetNotFound(selector.name.map(str::to_string).unwrap_or_else(|| {
                format!("sheet #{} of {}", selector.index + 1, path.display())
            }))
        })?;

    trace!(sheet = %name, available = ?sheet_names, "Selected input sheet");
    let range = workbook.worksheet_range(&name)?;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Sheet::from_rows(name.clone(), rows).ok_or(SheetError::EmptySheet(name))
}

/// Text of a workbook cell. Integral numbers are written without a
/// fractional part.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                n.to_string()
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#{e:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FormatType;
    use rust_xlsxwriter::Workbook;
    use std::fs;

    #[test]
    fn test_cell_text_renders_integral_floats_without_fraction() {
        assert_eq!(cell_text(&Data::Float(42.0)), "42");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Bool(true)), "TRUE");
    }

    #[test]
    fn test_unsupported_extension() {
        let err = open_input(Path::new("notes.txt"), FormatType::QTest.input_sheet()).unwrap_err();
        assert!(matches!(err, SheetError::UnsupportedExtension(_)));
    }

    #[test]
    fn test_read_csv_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        fs::write(&path, "Id;Name;Status\nTC-1;Login;New\n").unwrap();

        let sheet = open_input(&path, FormatType::QTest.input_sheet()).unwrap();
        assert_eq!(sheet.headers.names().collect::<Vec<_>>(), vec!["Id", "Name", "Status"]);
        assert_eq!(sheet.row_count(), 1);
    }

    #[test]
    fn test_read_named_sheet_from_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.xlsx");

        let mut workbook = Workbook::new();
        let overview = workbook.add_worksheet();
        overview.set_name("Overview").unwrap();
        overview.write_string(0, 0, "Summary").unwrap();
        let cases = workbook.add_worksheet();
        cases.set_name("Test Cases").unwrap();
        cases.write_string(0, 0, "Id").unwrap();
        cases.write_string(0, 1, "Test Step #").unwrap();
        cases.write_string(1, 0, "TC-1").unwrap();
        cases.write_number(1, 1, 1.0).unwrap();
        workbook.save(&path).unwrap();

        let sheet = open_input(&path, FormatType::QTest.input_sheet()).unwrap();
        assert_eq!(sheet.name, "Test Cases");
        let row = sheet.rows().next().unwrap();
        assert_eq!(row.cell("Test Step #").unwrap(), "1");

        let headers = read_headers(&path, FormatType::QTest.input_sheet()).unwrap();
        assert!(headers.contains("Id"));
    }
}
