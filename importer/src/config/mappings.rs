//! Mapping document loading.
//!
//! ```json
//! {
//!   "field_mappings": {
//!     "Status": {
//!       "target": "phase",
//!       "mapping": { "New": "New", "default": "Draft" },
//!       "regex_mappings": [{ "pattern": "Ready (.*)", "replacement": "Ready $1" }],
//!       "mapping_separator": ","
//!     }
//!   }
//! }
//! ```
//!
//! The document is parsed to JSON, checked against the embedded schema, then
//! deserialized and compiled into a [`MappingSet`]. Regex patterns that do
//! not compile are reported here, not on first use.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::mapping::{FieldMapping, MappingSet, RegexRule};
use crate::validation::validate_field_mappings;

#[derive(Debug, Deserialize)]
struct MappingDocument {
    #[serde(default)]
    field_mappings: IndexMap<String, FieldMappingDef>,
}

#[derive(Debug, Deserialize)]
struct FieldMappingDef {
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    mapping: HashMap<String, String>,
    #[serde(default)]
    regex_mappings: Vec<RegexMappingDef>,
    #[serde(default)]
    mapping_separator: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegexMappingDef {
    pattern: String,
    replacement: String,
}

/// Load and compile a mapping document from disk.
pub fn load_mappings(path: &Path) -> ConfigResult<MappingSet> {
    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    parse_mappings(&content, &path.display().to_string())
}

/// Parse and compile a mapping document. `origin` names the document in
/// error messages.
pub fn parse_mappings(content: &str, origin: &str) -> ConfigResult<MappingSet> {
    let document: Value = serde_json::from_str(content).map_err(|source| ConfigError::Json {
        origin: origin.to_string(),
        source,
    })?;

    validate_field_mappings(&document).map_err(|errors| ConfigError::Schema {
        origin: origin.to_string(),
        errors,
    })?;

    let document: MappingDocument =
        serde_json::from_value(document).map_err(|source| ConfigError::Json {
            origin: origin.to_string(),
            source,
        })?;

    let mappings = compile(document)?;
    debug!(origin, fields = mappings.len(), "Loaded field mappings");
    Ok(mappings)
}

fn compile(document: MappingDocument) -> ConfigResult<MappingSet> {
    let mut mappings = MappingSet::new();

    for (field, def) in document.field_mappings {
        let mut regex_rules = Vec::with_capacity(def.regex_mappings.len());
        for rule in def.regex_mappings {
            let compiled = RegexRule::new(&rule.pattern, rule.replacement).map_err(|source| {
                ConfigError::InvalidRegex {
                    field: field.clone(),
                    pattern: rule.pattern.clone(),
                    source,
                }
            })?;
            regex_rules.push(compiled);
        }

        mappings.insert(
            field,
            FieldMapping {
                target: def.target,
                literals: def.mapping,
                regex_rules,
                separator: def.mapping_separator,
            },
        );
    }

    Ok(mappings)
}

/// An example mapping document for a qTest export.
pub fn example_mappings() -> Value {
    json!({
        "field_mappings": {
            "Name": {
                "target": "name"
            },
            "Description": {
                "target": "description"
            },
            "Module": {
                "target": "product_areas",
                "regex_mappings": [
                    { "pattern": "MD-\\d+ (.*)", "replacement": "$1" }
                ]
            },
            "Status": {
                "target": "phase",
                "mapping": {
                    "New": "New",
                    "Ready For Baseline": "Ready For Baseline",
                    "Baselined": "Approved",
                    "default": "New"
                }
            },
            "Assigned To": {
                "target": "owner",
                "mapping_separator": ",",
                "mapping": {
                    "admin": "sa@nga"
                }
            },
            "Id": {},
            "Test Step Description": {},
            "Test Step Expected Result": {}
        }
    })
}
