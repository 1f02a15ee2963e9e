//! Field mapping model.
//!
//! A [`MappingSet`] holds one [`FieldMapping`] per input field name, in the
//! order the mapping document declares them. That order decides the order of
//! the output columns.
//!
//! ```text
//! "Status" ─┬─ target:    "phase"
//!           ├─ literals:  { "New": "New", "default": "Draft" }
//!           ├─ regex:     [ ("Ready (.*)", "Ready $1") ]
//!           └─ separator: none
//! ```
//!
//! Regex patterns are compiled once, when the mapping is built, and always
//! match against the whole value.

pub mod convert;

use std::collections::HashMap;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::RegexRuleError;

pub use convert::convert_field;

/// Reserved literal key used when no exact literal matches.
pub const DEFAULT_KEY: &str = "default";

/// Separator used to join multi-value results.
pub const JOIN_SEPARATOR: &str = ",";

// =============================================================================
// Regex Rule
// =============================================================================

/// A pattern → replacement rule applied only when the pattern matches the
/// entire value.
#[derive(Debug, Clone)]
pub struct RegexRule {
    source: String,
    regex: Regex,
    replacement: String,
    expansion: String,
}

impl RegexRule {
    /// Compile `pattern` anchored at both ends.
    ///
    /// In `replacement`, `$n` refers to group `n` and `${name}` to a named
    /// group. Digits after `$` are taken while they still name an existing
    /// group, so with one group `$12` is group 1 followed by `2`. `\` makes the
    /// next character literal (`\$`, `\\`). A reference to a missing group is
    /// rejected.
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, RegexRuleError> {
        let regex = Regex::new(&format!(r"\A(?:{pattern})\z"))?;
        let replacement = replacement.into();
        let expansion = expansion_template(&regex, &replacement)?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
            replacement,
            expansion,
        })
    }

    /// The pattern as written in the mapping document.
    pub fn pattern(&self) -> &str {
        &self.source
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Replace `value` when the pattern matches all of it.
    pub fn apply(&self, value: &str) -> Option<String> {
        let captures = self.regex.captures(value)?;
        let mut replaced = String::new();
        captures.expand(&self.expansion, &mut replaced);
        Some(replaced)
    }
}

/// Rewrite a mapping-document replacement into `regex` expansion syntax,
/// where every group reference is braced and every literal `$` doubled.
fn expansion_template(regex: &Regex, replacement: &str) -> Result<String, RegexRuleError> {
    let group_count = regex.captures_len() - 1;
    let illegal = || RegexRuleError::IllegalReference(replacement.to_string());
    let unknown = |group: String| RegexRuleError::UnknownGroup {
        replacement: replacement.to_string(),
        group,
    };

    let mut template = String::with_capacity(replacement.len() + 8);
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('$') => template.push_str("$$"),
                Some(escaped) => template.push(escaped),
                None => return Err(illegal()),
            },
            '$' => match chars.next() {
                Some('{') => {
                    let mut name = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed || name.is_empty() {
                        return Err(illegal());
                    }
                    if !regex.capture_names().flatten().any(|n| n == name) {
                        return Err(unknown(name));
                    }
                    template.push_str(&format!("${{{name}}}"));
                }
                Some(d) if d.is_ascii_digit() => {
                    let mut group = d as usize - '0' as usize;
                    if group > group_count {
                        return Err(unknown(group.to_string()));
                    }
                    while let Some(next) = chars.peek().and_then(|c| c.to_digit(10)) {
                        let extended = group * 10 + next as usize;
                        if extended > group_count {
                            break;
                        }
                        group = extended;
                        chars.next();
                    }
                    template.push_str(&format!("${{{group}}}"));
                }
                _ => return Err(illegal()),
            },
            other => template.push(other),
        }
    }

    Ok(template)
}

// =============================================================================
// Field Mapping
// =============================================================================

/// Rules rewriting the values of one input field.
#[derive(Debug, Clone, Default)]
pub struct FieldMapping {
    /// Output column. `None` means the mapping is ignored during conversion.
    pub target: Option<String>,
    /// Exact-match substitutions, including the reserved [`DEFAULT_KEY`].
    pub literals: HashMap<String, String>,
    /// Tried in order when no literal (or default) applies.
    pub regex_rules: Vec<RegexRule>,
    /// Splits a multi-value cell before each piece is converted.
    pub separator: Option<String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_literal(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.literals.insert(from.into(), to.into());
        self
    }

    pub fn with_default(self, value: impl Into<String>) -> Self {
        self.with_literal(DEFAULT_KEY, value)
    }

    pub fn with_regex(mut self, rule: RegexRule) -> Self {
        self.regex_rules.push(rule);
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Exact literal, or the default entry when there is none.
    pub fn literal(&self, value: &str) -> Option<LiteralMatch<'_>> {
        if let Some(mapped) = self.literals.get(value) {
            return Some(LiteralMatch::Exact(mapped));
        }
        self.literals.get(DEFAULT_KEY).map(|d| LiteralMatch::Default(d))
    }
}

/// Which literal entry matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralMatch<'a> {
    Exact(&'a str),
    Default(&'a str),
}

impl<'a> LiteralMatch<'a> {
    pub fn value(&self) -> &'a str {
        match self {
            LiteralMatch::Exact(v) | LiteralMatch::Default(v) => v,
        }
    }
}

// =============================================================================
// Mapping Set
// =============================================================================

/// All field mappings of a run, keyed by input field name.
#[derive(Debug, Clone, Default)]
pub struct MappingSet {
    fields: IndexMap<String, FieldMapping>,
}

impl MappingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the mapping of `field`.
    pub fn insert(&mut self, field: impl Into<String>, mapping: FieldMapping) {
        self.fields.insert(field.into(), mapping);
    }

    pub fn with_field(mut self, field: impl Into<String>, mapping: FieldMapping) -> Self {
        self.insert(field, mapping);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldMapping> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Input field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldMapping)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `(input field, target)` pairs for every mapping with a target, in
    /// declaration order. When two inputs share a target only the first is
    /// kept.
    pub fn targets(&self) -> Vec<(&str, &str)> {
        let mut seen: IndexMap<&str, &str> = IndexMap::new();
        for (field, mapping) in self.iter() {
            if let Some(target) = mapping.target.as_deref() {
                seen.entry(target).or_insert(field);
            }
        }
        seen.into_iter().map(|(target, field)| (field, target)).collect()
    }

    /// Input fields grouped by the target they write to, in first-seen order.
    pub fn fields_by_target(&self) -> IndexMap<&str, Vec<&str>> {
        let mut grouped: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for (field, mapping) in self.iter() {
            if let Some(target) = mapping.target.as_deref() {
                grouped.entry(target).or_default().push(field);
            }
        }
        grouped
    }

    /// Convert one raw cell value of `field`. See [`convert_field`].
    pub fn convert(&self, field: &str, raw_value: &str) -> String {
        convert_field(field, raw_value, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_rule_requires_full_match() {
        let rule = RegexRule::new(r"foo(\d+)", "bar$1").unwrap();
        assert_eq!(rule.apply("foo42").as_deref(), Some("bar42"));
        assert_eq!(rule.apply("xfoo42"), None);
        assert_eq!(rule.apply("foo42x"), None);
    }

    #[test]
    fn test_regex_rule_alternation_is_anchored_as_a_whole() {
        let rule = RegexRule::new("a|b", "x").unwrap();
        assert_eq!(rule.apply("a").as_deref(), Some("x"));
        assert_eq!(rule.apply("ab"), None);
    }

    #[test]
    fn test_regex_rule_named_groups() {
        let rule = RegexRule::new(r"(?P<major>\d+)\.(?P<minor>\d+)", "v${major}-${minor}").unwrap();
        assert_eq!(rule.apply("3.14").as_deref(), Some("v3-14"));
        assert_eq!(rule.pattern(), r"(?P<major>\d+)\.(?P<minor>\d+)");
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(matches!(
            RegexRule::new("(unclosed", "x"),
            Err(RegexRuleError::Pattern(_))
        ));
    }

    #[test]
    fn test_group_digits_stop_at_the_last_existing_group() {
        let one = RegexRule::new(r"(\d)", "<$12>").unwrap();
        assert_eq!(one.apply("7").as_deref(), Some("<72>"));

        let twelve = RegexRule::new(r"(a)(b)(c)(d)(e)(f)(g)(h)(i)(j)(k)(l)", "$12$1").unwrap();
        assert_eq!(twelve.apply("abcdefghijkl").as_deref(), Some("la"));
    }

    #[test]
    fn test_escaped_dollar_and_backslash_are_literal() {
        let rule = RegexRule::new(r"(\d+)", r"\$$1 \\ \x").unwrap();
        assert_eq!(rule.apply("5").as_deref(), Some(r"$5 \ x"));
    }

    #[test]
    fn test_group_zero_is_the_whole_value() {
        let rule = RegexRule::new(r"v\d+", "[$0]").unwrap();
        assert_eq!(rule.apply("v3").as_deref(), Some("[v3]"));
    }

    #[test]
    fn test_missing_group_is_rejected() {
        match RegexRule::new(r"v(\d+)", "$2").unwrap_err() {
            RegexRuleError::UnknownGroup { group, .. } => assert_eq!(group, "2"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            RegexRule::new(r"(?P<major>\d+)", "${minor}"),
            Err(RegexRuleError::UnknownGroup { .. })
        ));
    }

    #[test]
    fn test_malformed_reference_is_rejected() {
        for replacement in ["cost $x", "$", "${major", "${}", "trailing \\"] {
            assert!(
                matches!(
                    RegexRule::new(r"(?P<major>\d+)", replacement),
                    Err(RegexRuleError::IllegalReference(_))
                ),
                "{replacement}"
            );
        }
    }

    #[test]
    fn test_literal_prefers_exact_over_default() {
        let mapping = FieldMapping::new()
            .with_literal("New", "Draft")
            .with_default("Unknown");

        assert_eq!(mapping.literal("New"), Some(LiteralMatch::Exact("Draft")));
        assert_eq!(mapping.literal("Other"), Some(LiteralMatch::Default("Unknown")));
        assert_eq!(FieldMapping::new().literal("New"), None);
    }

    #[test]
    fn test_targets_keep_declaration_order_and_first_owner() {
        let set = MappingSet::new()
            .with_field("Name", FieldMapping::new().with_target("name"))
            .with_field("Notes", FieldMapping::new())
            .with_field("Status", FieldMapping::new().with_target("phase"))
            .with_field("State", FieldMapping::new().with_target("phase"));

        assert_eq!(set.targets(), vec![("Name", "name"), ("Status", "phase")]);

        let grouped = set.fields_by_target();
        assert_eq!(grouped["phase"], vec!["Status", "State"]);
        assert_eq!(set.field_names().collect::<Vec<_>>(), vec!["Name", "Notes", "Status", "State"]);
    }
}
