//! # Sheetport - qTest to Octane test-case conversion
//!
//! Sheetport rewrites a qTest test-case export into an Octane import
//! workbook. Values are rewritten field by field from a declarative mapping
//! document, after a pre-flight integrity check of the configuration and the
//! files it names.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Config    │────▶│  Integrity  │────▶│  Transform  │────▶│   Output    │
//! │ (props+map) │     │ (check+gate)│     │ (per field) │     │ (xlsx/csv)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sheetport::{ConversionConfig, ConversionJob, Decision, Gate, PropertyOverrides};
//!
//! let config = ConversionConfig::load(
//!     "converter.properties".as_ref(),
//!     "mapping.json".as_ref(),
//!     &PropertyOverrides::default(),
//! )?;
//! let job = ConversionJob::from(config);
//! let report = job.check();
//! report.log();
//! if Gate::evaluate(&report).decide(None) == Decision::Proceed {
//!     job.run()?;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Formats and well-known field descriptors
//! - [`config`] - Properties and mapping document loading
//! - [`mapping`] - Mapping model and the field value converter
//! - [`validation`] - Mapping document schema validation
//! - [`integrity`] - Pre-flight checks and the continue gate
//! - [`sheet`] / [`parser`] - Spreadsheet reading and writing
//! - [`transform`] - Row-walking drivers and the pipeline
//! - [`logging`] - `tracing` subscriber setup

// Core modules
pub mod error;
pub mod models;

// Configuration
pub mod config;
pub mod mapping;
pub mod validation;

// Pre-flight
pub mod integrity;

// Spreadsheets
pub mod parser;
pub mod sheet;

// Conversion
pub mod transform;

// Observability
pub mod logging;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, ConfigResult, ConversionError, ConversionResult, PipelineError, PipelineResult,
    RegexRuleError, SheetError, SheetResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{EntityType, FormatType, OctaneField, QTestField, SheetSelector, StepType};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{
    example_mappings, load_mappings, parse_mappings, ConversionConfig, ConversionProperties,
    PropertyOverrides, DEFAULT_MAPPING_FILE, DEFAULT_PROPERTIES_FILE,
};

// =============================================================================
// Re-exports - Mapping
// =============================================================================

pub use mapping::{convert_field, FieldMapping, MappingSet, RegexRule};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid_field_mappings, validate_field_mappings};

// =============================================================================
// Re-exports - Integrity
// =============================================================================

pub use integrity::{
    check, Decision, Gate, IntegrityChecker, IntegrityIssue, IntegrityReport, OperatorAnswer,
    Severity, RETRY_PROMPT,
};

// =============================================================================
// Re-exports - Spreadsheets
// =============================================================================

pub use sheet::{
    open_input, read_headers, write_output, CellValue, HeaderIndex, OutputKind, OutputSheet, Row,
    Sheet,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    converter_for, output_headers, ConversionJob, ConversionStats, QTestConverter, RowConverter,
};
