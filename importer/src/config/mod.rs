//! Run configuration.
//!
//! - [`properties`] - `converter.properties`: input/output paths and format
//! - [`mappings`] - `mapping.json`: field mapping rules

pub mod mappings;
pub mod properties;

use std::path::Path;

use tracing::info;

use crate::error::ConfigResult;
use crate::mapping::MappingSet;

pub use mappings::{example_mappings, load_mappings, parse_mappings};
pub use properties::{ConversionProperties, PropertyOverrides};

/// Properties file read when none is given.
pub const DEFAULT_PROPERTIES_FILE: &str = "converter.properties";

/// Mapping document read when none is given.
pub const DEFAULT_MAPPING_FILE: &str = "mapping.json";

/// Everything a run is configured by.
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    pub properties: ConversionProperties,
    pub mappings: MappingSet,
}

impl ConversionConfig {
    /// Load both configuration files, then apply command-line overrides.
    pub fn load(
        properties_path: &Path,
        mapping_path: &Path,
        overrides: &PropertyOverrides,
    ) -> ConfigResult<Self> {
        info!(path = %properties_path.display(), "Loading conversion properties");
        let properties = ConversionProperties::load(properties_path)?.with_overrides(overrides);

        info!(path = %mapping_path.display(), "Loading field mappings");
        let mappings = load_mappings(mapping_path)?;

        Ok(Self {
            properties,
            mappings,
        })
    }
}
