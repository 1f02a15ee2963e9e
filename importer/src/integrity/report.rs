//! Integrity issues and the report collecting them.

use std::fmt;
use std::path::PathBuf;

use tracing::{error, warn};

/// How much an issue weighs on the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Blocks the conversion.
    Error,
    /// Conversion may continue once the operator agrees.
    Warning,
}

/// One finding of the integrity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    MissingInputPath,
    InputNotFound(PathBuf),
    InputLocked(PathBuf),
    UnreadableInput { path: PathBuf, reason: String },
    MissingOutputPath,
    OutputExists(PathBuf),
    OutputLocked(PathBuf),
    OutputNotSpreadsheet(PathBuf),
    UnknownFormat { recognized: Vec<&'static str> },
    UnknownFields { fields: Vec<String>, headers: Vec<String> },
    MissingTarget(String),
    DuplicateTarget { target: String, fields: Vec<String> },
}

impl IntegrityIssue {
    pub fn severity(&self) -> Severity {
        match self {
            IntegrityIssue::OutputExists(_) | IntegrityIssue::MissingTarget(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::MissingInputPath => write!(f, "No input file was provided."),
            IntegrityIssue::InputNotFound(path) => {
                write!(f, "Input file '{}' doesn't exist.", path.display())
            }
            IntegrityIssue::InputLocked(path) => {
                write!(f, "Input file '{}' is already in use.", path.display())
            }
            IntegrityIssue::UnreadableInput { path, reason } => {
                write!(f, "Input file '{}' could not be read: {reason}", path.display())
            }
            IntegrityIssue::MissingOutputPath => write!(f, "No output file was provided."),
            IntegrityIssue::OutputExists(path) => write!(
                f,
                "Output file '{}' already exists, after conversion it will be overridden.",
                path.display()
            ),
            IntegrityIssue::OutputLocked(path) => {
                write!(f, "Output file '{}' is already in use.", path.display())
            }
            IntegrityIssue::OutputNotSpreadsheet(path) => write!(
                f,
                "Output file '{}' is not a spreadsheet file, use .xlsx or .csv.",
                path.display()
            ),
            IntegrityIssue::UnknownFormat { recognized } => write!(
                f,
                "Unsupported input file format type, supported formats are: [{}]",
                recognized.join(", ")
            ),
            IntegrityIssue::UnknownFields { fields, headers } => write!(
                f,
                "Input field names [{}] are not present in the input file, valid field names are: [{}]",
                fields.join(", "),
                headers.join(", ")
            ),
            IntegrityIssue::MissingTarget(field) => write!(
                f,
                "No target specified for input field name '{field}', mapping will be ignored."
            ),
            IntegrityIssue::DuplicateTarget { target, fields } => write!(
                f,
                "Target field {target} is used by multiple input field mappings: [{}]",
                fields.join(", ")
            ),
        }
    }
}

/// Errors and warnings found by one integrity check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    pub errors: Vec<IntegrityIssue>,
    pub warnings: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// File `issue` under its severity.
    pub fn push(&mut self, issue: IntegrityIssue) {
        match issue.severity() {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// No errors and no warnings.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Every issue, errors first.
    pub fn issues(&self) -> impl Iterator<Item = &IntegrityIssue> {
        self.errors.iter().chain(self.warnings.iter())
    }

    /// Emit each issue at its level.
    pub fn log(&self) {
        for issue in &self.errors {
            error!("{issue}");
        }
        for issue in &self.warnings {
            warn!("{issue}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_files_by_severity() {
        let mut report = IntegrityReport::new();
        report.push(IntegrityIssue::MissingInputPath);
        report.push(IntegrityIssue::OutputExists(PathBuf::from("out.xlsx")));
        report.push(IntegrityIssue::MissingTarget("Notes".into()));

        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 2);
        assert!(report.has_errors());
        assert!(!report.is_clean());
        assert_eq!(report.issues().next(), Some(&IntegrityIssue::MissingInputPath));
    }

    #[test]
    fn test_issue_messages() {
        let issue = IntegrityIssue::UnknownFields {
            fields: vec!["Nonexistent".into()],
            headers: vec!["Id".into(), "Name".into()],
        };
        assert_eq!(
            issue.to_string(),
            "Input field names [Nonexistent] are not present in the input file, valid field names are: [Id, Name]"
        );

        let issue = IntegrityIssue::UnknownFormat { recognized: vec!["QTEST"] };
        assert_eq!(
            issue.to_string(),
            "Unsupported input file format type, supported formats are: [QTEST]"
        );
    }

    #[test]
    fn test_empty_report_is_clean() {
        assert!(IntegrityReport::new().is_clean());
    }
}
