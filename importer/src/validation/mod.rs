//! JSON Schema validation for mapping documents.
//!
//! The mapping document is checked against an embedded Draft 7 schema
//! (`schemas/field-mappings.json`) before it is deserialized, so a shape
//! error reports every offending location at once instead of the first one
//! serde trips over.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use sheetport::validation::validate_field_mappings;
//!
//! let doc = json!({
//!     "field_mappings": {
//!         "Status": { "target": "phase", "mapping": { "New": "New" } }
//!     }
//! });
//! assert!(validate_field_mappings(&doc).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static FIELD_MAPPINGS_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/field-mappings.json"))
        .expect("Invalid embedded schema")
});

/// Validate `data` against a Draft 7 `schema`.
///
/// # Returns
/// * `Ok(())` when valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick check, true when `data` satisfies `schema`.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate a mapping document against the field mappings schema.
pub fn validate_field_mappings(data: &Value) -> Result<(), Vec<String>> {
    validate(&FIELD_MAPPINGS_SCHEMA, data)
}

/// Quick check against the field mappings schema.
pub fn is_valid_field_mappings(data: &Value) -> bool {
    is_valid(&FIELD_MAPPINGS_SCHEMA, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_document() {
        let doc = json!({
            "field_mappings": {
                "Status": {
                    "target": "phase",
                    "mapping": { "New": "New", "default": "Draft" },
                    "regex_mappings": [{ "pattern": "v(\\d+)", "replacement": "$1" }],
                    "mapping_separator": ","
                },
                "Notes": {}
            }
        });
        assert!(is_valid_field_mappings(&doc));
    }

    #[test]
    fn test_empty_document_is_valid() {
        assert!(is_valid_field_mappings(&json!({})));
    }

    #[test]
    fn test_non_string_literal_is_rejected() {
        let doc = json!({
            "field_mappings": {
                "Status": { "target": "phase", "mapping": { "New": 1 } }
            }
        });
        assert!(!is_valid_field_mappings(&doc));
    }

    #[test]
    fn test_regex_mapping_requires_replacement() {
        let doc = json!({
            "field_mappings": {
                "Status": { "regex_mappings": [{ "pattern": "x" }] }
            }
        });
        let errors = validate_field_mappings(&doc).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_every_violation_is_reported() {
        let doc = json!({
            "field_mappings": {
                "A": { "target": 5 },
                "B": { "mapping_separator": "" }
            }
        });
        let errors = validate_field_mappings(&doc).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
