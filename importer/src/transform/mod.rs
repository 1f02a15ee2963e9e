//! Conversion of input rows into output rows.
//!
//! - [`qtest`] - qTest export driver
//! - [`pipeline`] - Load, check, convert, write
//!
//! A [`RowConverter`] decides which input rows become which output entities.
//! Field values always go through [`crate::mapping::convert_field`].

pub mod pipeline;
pub mod qtest;

use indexmap::IndexSet;

use crate::error::{ConfigError, ConfigResult};
use crate::mapping::MappingSet;
use crate::models::{FormatType, OctaneField};
use crate::sheet::{OutputSheet, Sheet};

pub use pipeline::ConversionJob;
pub use qtest::QTestConverter;

/// Name of the sheet written to the output workbook.
pub const OUTPUT_SHEET_NAME: &str = "manual tests";

/// Counters of one conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Input data rows walked.
    pub input_rows: usize,
    /// Manual test rows written.
    pub tests: usize,
    /// Step rows written.
    pub steps: usize,
    /// Input rows skipped entirely.
    pub skipped_rows: usize,
    /// Cells that could not be converted.
    pub field_errors: usize,
}

/// Walks an input sheet and fills the output sheet.
pub trait RowConverter {
    /// Format this converter reads.
    fn format(&self) -> FormatType;

    fn output_sheet_name(&self) -> &'static str {
        OUTPUT_SHEET_NAME
    }

    /// Output columns written whatever the mappings say.
    fn mandatory_headers(&self) -> Vec<&'static str> {
        vec![OctaneField::UniqueId.as_str(), OctaneField::Type.as_str()]
    }

    /// Convert every row of `input` into `output`. Row-level problems are
    /// logged and counted, never returned.
    fn convert(&self, input: &Sheet, mappings: &MappingSet, output: &mut OutputSheet) -> ConversionStats;
}

/// Converter for `format`.
pub fn converter_for(format: FormatType) -> ConfigResult<Box<dyn RowConverter>> {
    match format {
        FormatType::QTest => Ok(Box::new(QTestConverter)),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

/// Output columns: the mandatory ones, then each mapping target in mapping
/// order, without duplicates.
pub fn output_headers(mandatory: &[&str], mappings: &MappingSet) -> Vec<String> {
    let mut headers: IndexSet<String> = mandatory.iter().map(|h| h.to_string()).collect();
    for (_, target) in mappings.targets() {
        headers.insert(target.to_string());
    }
    headers.into_iter().collect()
}

/// Run `converter` over `input` into a fresh output sheet.
pub fn convert_sheet(
    converter: &dyn RowConverter,
    input: &Sheet,
    mappings: &MappingSet,
) -> (OutputSheet, ConversionStats) {
    let headers = output_headers(&converter.mandatory_headers(), mappings);
    let mut output = OutputSheet::new(converter.output_sheet_name(), headers);
    let stats = converter.convert(input, mappings, &mut output);
    (output, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::FieldMapping;

    #[test]
    fn test_output_headers_mandatory_first_then_targets() {
        let mappings = MappingSet::new()
            .with_field("Name", FieldMapping::new().with_target("name"))
            .with_field("Id", FieldMapping::new())
            .with_field("Status", FieldMapping::new().with_target("phase"))
            .with_field("Type", FieldMapping::new().with_target("type"));

        let headers = output_headers(&["unique_id", "type"], &mappings);
        assert_eq!(headers, vec!["unique_id", "type", "name", "phase"]);
    }

    #[test]
    fn test_converter_factory() {
        assert_eq!(converter_for(FormatType::QTest).unwrap().format(), FormatType::QTest);

        match converter_for(FormatType::Octane) {
            Err(ConfigError::UnsupportedFormat(name)) => assert_eq!(name, "OCTANE"),
            _ => panic!("expected unsupported format"),
        }
    }
}
