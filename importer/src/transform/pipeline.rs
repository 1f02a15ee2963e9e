//! End-to-end conversion of one configured run.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::path::Path;
//! use sheetport::config::{ConversionConfig, PropertyOverrides};
//! use sheetport::integrity::{Decision, Gate};
//! use sheetport::transform::ConversionJob;
//!
//! let config = ConversionConfig::load(
//!     Path::new("converter.properties"),
//!     Path::new("mapping.json"),
//!     &PropertyOverrides::default(),
//! )?;
//! let job = ConversionJob::from(config);
//!
//! let gate = Gate::evaluate(&job.check());
//! if gate.decide(None) == Decision::Proceed {
//!     let stats = job.run()?;
//!     println!("{} tests, {} steps", stats.tests, stats.steps);
//! }
//! ```

use std::path::Path;

use tracing::info;

use super::{convert_sheet, converter_for, ConversionStats};
use crate::config::properties::{INPUT_FILE_PATH, OUTPUT_FILE_PATH};
use crate::config::{ConversionConfig, ConversionProperties};
use crate::error::{ConfigError, PipelineResult};
use crate::integrity::{self, IntegrityReport};
use crate::mapping::MappingSet;
use crate::sheet::{open_input, write_output, OutputKind, OutputSheet};

/// One conversion run: its properties and its field mappings.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    properties: ConversionProperties,
    mappings: MappingSet,
}

impl From<ConversionConfig> for ConversionJob {
    fn from(config: ConversionConfig) -> Self {
        Self::new(config.properties, config.mappings)
    }
}

impl ConversionJob {
    pub fn new(properties: ConversionProperties, mappings: MappingSet) -> Self {
        Self {
            properties,
            mappings,
        }
    }

    pub fn properties(&self) -> &ConversionProperties {
        &self.properties
    }

    pub fn mappings(&self) -> &MappingSet {
        &self.mappings
    }

    /// Run the integrity check. Conversion should only follow when the
    /// gate lets it through.
    pub fn check(&self) -> IntegrityReport {
        integrity::check(&self.properties, &self.mappings)
    }

    /// Read the input and build the output sheet, without writing it.
    pub fn convert(&self) -> PipelineResult<(OutputSheet, ConversionStats)> {
        let input_path = self
            .properties
            .input_file_path()
            .ok_or(ConfigError::MissingProperty(INPUT_FILE_PATH))?;
        let format = self.properties.input_format();
        let converter = converter_for(format)?;

        info!(path = %input_path.display(), format = %format, "Reading input file");
        let input = open_input(input_path, format.input_sheet())?;

        info!(rows = input.row_count(), "Converting rows");
        Ok(convert_sheet(converter.as_ref(), &input, &self.mappings))
    }

    /// Convert and write the output file.
    pub fn run(&self) -> PipelineResult<ConversionStats> {
        let output_path = self.output_path()?;
        let (output, stats) = self.convert()?;

        info!(path = %output_path.display(), rows = output.row_count(), "Writing output file");
        write_output(&output, output_path)?;

        info!(
            tests = stats.tests,
            steps = stats.steps,
            skipped_rows = stats.skipped_rows,
            field_errors = stats.field_errors,
            "Conversion finished"
        );
        Ok(stats)
    }

    /// Output path, checked to be a writable spreadsheet type before any
    /// input is read.
    fn output_path(&self) -> PipelineResult<&Path> {
        let path = self
            .properties
            .output_file_path()
            .ok_or(ConfigError::MissingProperty(OUTPUT_FILE_PATH))?;
        if OutputKind::from_path(path).is_none() {
            return Err(ConfigError::UnsupportedOutput(path.to_path_buf()).into());
        }
        Ok(path)
    }
}
