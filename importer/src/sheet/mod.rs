//! In-memory spreadsheet model.
//!
//! Input sheets are read whole into a [`Sheet`]: a header index plus rows of
//! cell text. Conversion drivers walk [`Row`]s and address cells by header
//! name. Output is built into an [`OutputSheet`] and handed to
//! [`writer::write_output`].
//!
//! ```text
//! ┌────────────┐    ┌───────────┐    ┌──────────────┐    ┌────────────┐
//! │ xlsx / csv │───▶│   Sheet   │───▶│ RowConverter │───▶│ OutputSheet│──▶ xlsx / csv
//! │  (reader)  │    │ (headers) │    │  (mappings)  │    │  (writer)  │
//! └────────────┘    └───────────┘    └──────────────┘    └────────────┘
//! ```

pub mod reader;
pub mod writer;

use indexmap::IndexMap;

use crate::error::{ConversionError, ConversionResult};
use crate::mapping::MappingSet;

pub use reader::{open_input, read_headers};
pub use writer::{write_output, OutputKind};

// =============================================================================
// Header Index
// =============================================================================

/// Header text → column index of a sheet's first row.
///
/// Empty header cells are skipped. When the same text appears twice the
/// last column wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderIndex {
    columns: IndexMap<String, usize>,
}

impl HeaderIndex {
    pub fn from_row<S: AsRef<str>>(row: &[S]) -> Self {
        let mut columns = IndexMap::new();
        for (index, cell) in row.iter().enumerate() {
            let name = cell.as_ref().trim();
            if !name.is_empty() {
                columns.insert(name.to_string(), index);
            }
        }
        Self { columns }
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Header names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// =============================================================================
// Input Sheet
// =============================================================================

/// An input sheet read into memory.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub headers: HeaderIndex,
    /// Data rows, header row excluded.
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Build a sheet from raw rows; the first row is the header row.
    pub fn from_rows(name: impl Into<String>, mut rows: Vec<Vec<String>>) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let header_row = rows.remove(0);
        Some(Self {
            name: name.into(),
            headers: HeaderIndex::from_row(header_row.as_slice()),
            rows,
        })
    }

    /// Data rows with their spreadsheet row number (header is row 1).
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().enumerate().map(|(i, cells)| Row {
            number: i + 2,
            cells,
            headers: &self.headers,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// One data row of an input sheet.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub number: usize,
    cells: &'a [String],
    headers: &'a HeaderIndex,
}

impl<'a> Row<'a> {
    /// Cell text under `column`. A cell past the end of the row is empty.
    pub fn cell(&self, column: &str) -> ConversionResult<&'a str> {
        let index = self
            .headers
            .get(column)
            .ok_or_else(|| ConversionError::MissingColumn(column.to_string()))?;
        Ok(self.cells.get(index).map(String::as_str).unwrap_or(""))
    }

    /// Trimmed cell text under `column`, converted through `mappings`.
    pub fn mapped_cell(&self, column: &str, mappings: &MappingSet) -> ConversionResult<String> {
        let raw = self.cell(column)?;
        Ok(mappings.convert(column, raw.trim()))
    }

    /// True when every cell is blank.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

// =============================================================================
// Output Sheet
// =============================================================================

/// Value written to an output cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        CellValue::Integer(value as i64)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Text(text) => f.write_str(text),
            CellValue::Integer(n) => write!(f, "{n}"),
        }
    }
}

/// Output sheet under construction.
#[derive(Debug, Clone)]
pub struct OutputSheet {
    pub name: String,
    headers: Vec<String>,
    index: HeaderIndex,
    rows: Vec<Vec<Option<CellValue>>>,
}

impl OutputSheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        let index = HeaderIndex::from_row(headers.as_slice());
        Self {
            name: name.into(),
            headers,
            index,
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Option<CellValue>>] {
        &self.rows
    }

    /// Append an empty row and return its number. The header is row 0, so
    /// the first data row is 1.
    pub fn create_row(&mut self) -> usize {
        self.rows.push(vec![None; self.headers.len()]);
        self.rows.len()
    }

    /// Set the cell of `row` under `column`.
    pub fn set(
        &mut self,
        row: usize,
        column: &str,
        value: impl Into<CellValue>,
    ) -> ConversionResult<()> {
        let index = self
            .index
            .get(column)
            .ok_or_else(|| ConversionError::UnknownOutputColumn(column.to_string()))?;
        let cells = row
            .checked_sub(1)
            .and_then(|i| self.rows.get_mut(i))
            .ok_or(ConversionError::UnknownOutputRow(row))?;
        cells[index] = Some(value.into());
        Ok(())
    }

    /// Cell of `row` under `column`, if set.
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        let index = self.index.get(column)?;
        self.rows.get(row.checked_sub(1)?)?.get(index)?.as_ref()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
