//! Conversion properties: where to read, where to write, which format.
//!
//! Loaded from a `key=value` properties file:
//!
//! ```text
//! input.file.path=exports/qtest.xlsx
//! input.file.format.type=QTEST
//! output.file.path=out/octane.xlsx
//! ```
//!
//! Values containing backslashes (Windows paths) must be single-quoted.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::models::FormatType;

pub const INPUT_FILE_PATH: &str = "input.file.path";
pub const INPUT_FILE_FORMAT_TYPE: &str = "input.file.format.type";
pub const OUTPUT_FILE_PATH: &str = "output.file.path";

/// Run parameters. Immutable once built; use [`ConversionProperties::with_overrides`]
/// to derive a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionProperties {
    input_file_path: Option<PathBuf>,
    output_file_path: Option<PathBuf>,
    input_format: FormatType,
}

/// Values given on the command line, taking precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct PropertyOverrides {
    pub input_file_path: Option<PathBuf>,
    pub output_file_path: Option<PathBuf>,
    pub input_format: Option<String>,
}

impl ConversionProperties {
    pub fn new(
        input_file_path: Option<PathBuf>,
        output_file_path: Option<PathBuf>,
        input_format: FormatType,
    ) -> Self {
        Self {
            input_file_path,
            output_file_path,
            input_format,
        }
    }

    /// Build from raw key/value pairs. Unknown keys are ignored and empty
    /// values count as absent.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut properties = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                INPUT_FILE_PATH => properties.input_file_path = Some(PathBuf::from(value)),
                OUTPUT_FILE_PATH => properties.output_file_path = Some(PathBuf::from(value)),
                INPUT_FILE_FORMAT_TYPE => properties.input_format = FormatType::parse(value),
                other => debug!(key = other, "Ignoring unknown property"),
            }
        }
        properties
    }

    /// Read a properties file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let entries = dotenvy::from_path_iter(path).map_err(|e| properties_error(path, e))?;
        let mut pairs = Vec::new();
        for entry in entries {
            pairs.push(entry.map_err(|e| properties_error(path, e))?);
        }

        let properties = Self::from_pairs(pairs);
        debug!(path = %path.display(), ?properties, "Loaded conversion properties");
        Ok(properties)
    }

    /// Replace every value the overrides set.
    pub fn with_overrides(self, overrides: &PropertyOverrides) -> Self {
        Self {
            input_file_path: overrides.input_file_path.clone().or(self.input_file_path),
            output_file_path: overrides.output_file_path.clone().or(self.output_file_path),
            input_format: overrides
                .input_format
                .as_deref()
                .map(FormatType::parse)
                .unwrap_or(self.input_format),
        }
    }

    pub fn input_file_path(&self) -> Option<&Path> {
        self.input_file_path.as_deref()
    }

    pub fn output_file_path(&self) -> Option<&Path> {
        self.output_file_path.as_deref()
    }

    pub fn input_format(&self) -> FormatType {
        self.input_format
    }
}

fn properties_error(path: &Path, error: dotenvy::Error) -> ConfigError {
    match error {
        dotenvy::Error::Io(source) => ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
        other => ConfigError::Properties {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}
