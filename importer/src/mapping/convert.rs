//! Field value conversion.
//!
//! Precedence, for each value:
//!
//! 1. exact literal
//! 2. literal `"default"`
//! 3. first regex rule matching the whole value
//! 4. the value unchanged
//!
//! With a separator the cell is split first, every trimmed piece goes
//! through the steps above, empty results are dropped and the rest joined
//! with `,`.

use tracing::debug;

use super::{FieldMapping, LiteralMatch, MappingSet, JOIN_SEPARATOR};

/// Convert `raw_value` of input field `field_name`.
///
/// Never fails: an unmapped field, a mapping without target, or a value no
/// rule matches all come back unchanged.
pub fn convert_field(field_name: &str, raw_value: &str, mappings: &MappingSet) -> String {
    let Some(mapping) = mappings.get(field_name) else {
        debug!(field = field_name, "No field mapping was found for field");
        return raw_value.to_string();
    };

    if mapping.target.is_none() {
        debug!(field = field_name, "Field mapping has no target, value left unchanged");
        return raw_value.to_string();
    }

    match mapping.separator.as_deref() {
        Some(separator) => raw_value
            .split(separator)
            .map(str::trim)
            .map(|piece| resolve(field_name, mapping, piece))
            .filter(|converted| !converted.is_empty())
            .collect::<Vec<_>>()
            .join(JOIN_SEPARATOR),
        None => resolve(field_name, mapping, raw_value),
    }
}

/// Convert a single value through the literal table, then the regex rules.
fn resolve(field_name: &str, mapping: &FieldMapping, value: &str) -> String {
    match mapping.literal(value) {
        Some(LiteralMatch::Exact(mapped)) => {
            debug!(field = field_name, from = value, to = mapped, "Mapped field");
            return mapped.to_string();
        }
        Some(LiteralMatch::Default(default)) => {
            debug!(field = field_name, from = value, to = default, "Default mapped field");
            return default.to_string();
        }
        None => {}
    }

    for rule in &mapping.regex_rules {
        if let Some(replaced) = rule.apply(value) {
            debug!(
                field = field_name,
                pattern = rule.pattern(),
                from = value,
                to = %replaced,
                "Mapped field using regex"
            );
            return replaced;
        }
    }

    debug!(field = field_name, value, "Unchanged value, no mapping or regex mapping matched");
    value.to_string()
}
