//! Error types for the sheetport conversion pipeline.
//!
//! - [`ConfigError`] - Configuration loading and mapping compilation errors
//! - [`RegexRuleError`] - Why one regex mapping rule was rejected
//! - [`SheetError`] - Spreadsheet reading and writing errors
//! - [`ConversionError`] - Per-row conversion errors (logged and skipped)
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Integrity problems found before a conversion are not errors: they are
//! collected as [`crate::integrity::IntegrityIssue`] values in a report.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading the properties file or the mapping document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("Could not read the file {} because it does not exist.", .0.display())]
    NotFound(PathBuf),

    /// The configuration file exists but could not be read.
    #[error("Could not read the file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A properties line could not be parsed.
    #[error("Invalid properties file {}: {message}", .path.display())]
    Properties { path: PathBuf, message: String },

    /// The mapping document is not valid JSON or has the wrong shape.
    #[error("Invalid mapping document {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// The mapping document violates the mapping schema.
    #[error("Mapping document {origin} does not match the mapping schema: {}", .errors.join("; "))]
    Schema { origin: String, errors: Vec<String> },

    /// A regex mapping pattern does not compile.
    #[error("Invalid regex pattern '{pattern}' for field '{field}': {source}")]
    InvalidRegex {
        field: String,
        pattern: String,
        #[source]
        source: RegexRuleError,
    },

    /// A required property is absent.
    #[error("Missing required property '{0}'")]
    MissingProperty(&'static str),

    /// No converter exists for the configured input format.
    #[error("Input file format type '{0}' wasn't provided or it isn't supported.")]
    UnsupportedFormat(String),

    /// The output path does not name a writable spreadsheet type.
    #[error("The specified output file '{}' is not a spreadsheet file.", .0.display())]
    UnsupportedOutput(PathBuf),
}

/// Errors building a single regex mapping rule.
#[derive(Debug, Error)]
pub enum RegexRuleError {
    #[error(transparent)]
    Pattern(#[from] regex::Error),

    /// The replacement refers to a capture group the pattern does not define.
    #[error("replacement '{replacement}' refers to group {group}, which the pattern does not define")]
    UnknownGroup { replacement: String, group: String },

    /// A `$` or `\` in the replacement is not followed by a valid reference.
    #[error("illegal group reference in replacement '{0}'")]
    IllegalReference(String),
}

// =============================================================================
// Spreadsheet Errors
// =============================================================================

/// Errors while reading or writing spreadsheet files.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The workbook could not be opened or parsed.
    #[error("Cannot open workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// The input-data sheet is not present in the workbook.
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// The sheet has no header row.
    #[error("Sheet '{0}' is empty, no header row found")]
    EmptySheet(String),

    /// Failed to decode the file content.
    #[error("Failed to decode file content: {0}")]
    Encoding(String),

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// XLSX writing failed.
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// The file extension is not a supported spreadsheet type.
    #[error("Unsupported spreadsheet file '{}'", .0.display())]
    UnsupportedExtension(PathBuf),
}

// =============================================================================
// Conversion Errors
// =============================================================================

/// Errors scoped to one row or field during conversion.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConversionError {
    /// The input sheet has no column with this header.
    #[error("Column '{0}' is missing from the input sheet")]
    MissingColumn(String),

    /// The output sheet has no column with this header.
    #[error("Column '{0}' is missing from the output sheet")]
    UnknownOutputColumn(String),

    /// The output row does not exist.
    #[error("Output row {0} does not exist")]
    UnknownOutputRow(usize),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// Returned by [`crate::transform::pipeline::ConversionJob::run`] and the
/// configuration loaders it wraps.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Spreadsheet I/O error.
    #[error("Spreadsheet error: {0}")]
    Sheet(#[from] SheetError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for spreadsheet operations.
pub type SheetResult<T> = Result<T, SheetError>;

/// Result type for row conversion operations.
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let config_err = ConfigError::MissingProperty("output.file.path");
        let pipeline_err: PipelineError = config_err.into();
        assert!(pipeline_err.to_string().contains("output.file.path"));

        let sheet_err = SheetError::SheetNotFound("Test Cases".into());
        let pipeline_err: PipelineError = sheet_err.into();
        assert!(pipeline_err.to_string().contains("Test Cases"));
    }

    #[test]
    fn test_not_found_message_names_the_file() {
        let err = ConfigError::NotFound(PathBuf::from("mapping.json"));
        assert_eq!(
            err.to_string(),
            "Could not read the file mapping.json because it does not exist."
        );
    }

    #[test]
    fn test_regex_error_format() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = ConfigError::InvalidRegex {
            field: "Status".into(),
            pattern: "(".into(),
            source: source.into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Status"));
        assert!(msg.contains("'('"));
    }
}
