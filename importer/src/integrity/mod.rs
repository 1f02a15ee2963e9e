//! Pre-flight checks over the run configuration and the files it names.
//!
//! Every check runs, errors do not short-circuit. Property checks come first
//! because the header row they read is what mapping keys are checked
//! against.
//!
//! | Check                                   | Severity |
//! |-----------------------------------------|----------|
//! | input path missing / not found / locked | error    |
//! | input unreadable                        | error    |
//! | output path missing                     | error    |
//! | output exists                           | warning  |
//! | output exists and locked                | error    |
//! | output extension not `.xlsx` / `.csv`   | error    |
//! | format unknown                          | error    |
//! | mapping keys absent from input headers  | error    |
//! | mapping without target                  | warning  |
//! | target shared by several fields         | error    |

pub mod gate;
pub mod report;

use std::fs::OpenOptions;
use std::path::Path;

use fs2::FileExt;
use tracing::{debug, info};

use crate::config::ConversionProperties;
use crate::mapping::MappingSet;
use crate::models::FormatType;
use crate::sheet::{read_headers, HeaderIndex, OutputKind};

pub use gate::{Decision, Gate, OperatorAnswer, RETRY_PROMPT};
pub use report::{IntegrityIssue, IntegrityReport, Severity};

/// Checks one run configuration.
#[derive(Debug, Clone, Copy)]
pub struct IntegrityChecker<'a> {
    properties: &'a ConversionProperties,
    mappings: &'a MappingSet,
}

impl<'a> IntegrityChecker<'a> {
    pub fn new(properties: &'a ConversionProperties, mappings: &'a MappingSet) -> Self {
        Self {
            properties,
            mappings,
        }
    }

    /// Run every check and collect the findings.
    pub fn check(&self) -> IntegrityReport {
        info!("Checking conversion integrity");
        let mut report = IntegrityReport::new();

        let headers = self.check_input(&mut report);
        self.check_output(&mut report);
        self.check_format(&mut report);

        self.check_mapping_fields(headers.as_ref(), &mut report);
        self.check_targets(&mut report);

        debug!(
            errors = report.error_count(),
            warnings = report.warning_count(),
            "Integrity check finished"
        );
        report
    }

    /// Input file checks. Returns the header row when the file could be read.
    fn check_input(&self, report: &mut IntegrityReport) -> Option<HeaderIndex> {
        let Some(path) = self.properties.input_file_path() else {
            report.push(IntegrityIssue::MissingInputPath);
            return None;
        };

        if !path.exists() {
            report.push(IntegrityIssue::InputNotFound(path.to_path_buf()));
            return None;
        }

        if is_locked(path) {
            report.push(IntegrityIssue::InputLocked(path.to_path_buf()));
            return None;
        }

        match read_headers(path, self.properties.input_format().input_sheet()) {
            Ok(headers) => Some(headers),
            Err(e) => {
                report.push(IntegrityIssue::UnreadableInput {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    fn check_output(&self, report: &mut IntegrityReport) {
        let Some(path) = self.properties.output_file_path() else {
            report.push(IntegrityIssue::MissingOutputPath);
            return;
        };

        if path.exists() {
            report.push(IntegrityIssue::OutputExists(path.to_path_buf()));
            if is_locked(path) {
                report.push(IntegrityIssue::OutputLocked(path.to_path_buf()));
            }
        }

        if OutputKind::from_path(path).is_none() {
            report.push(IntegrityIssue::OutputNotSpreadsheet(path.to_path_buf()));
        }
    }

    fn check_format(&self, report: &mut IntegrityReport) {
        if self.properties.input_format() == FormatType::Unknown {
            report.push(IntegrityIssue::UnknownFormat {
                recognized: FormatType::recognized_names(),
            });
        }
    }

    /// Mapping keys must be input headers. Skipped when no header row was
    /// read.
    fn check_mapping_fields(&self, headers: Option<&HeaderIndex>, report: &mut IntegrityReport) {
        let Some(headers) = headers else { return };

        let unknown: Vec<String> = self
            .mappings
            .field_names()
            .filter(|field| !headers.contains(field))
            .map(str::to_string)
            .collect();

        if !unknown.is_empty() {
            report.push(IntegrityIssue::UnknownFields {
                fields: unknown,
                headers: headers.names().map(str::to_string).collect(),
            });
        }
    }

    fn check_targets(&self, report: &mut IntegrityReport) {
        for (field, mapping) in self.mappings.iter() {
            if mapping.target.is_none() {
                report.push(IntegrityIssue::MissingTarget(field.to_string()));
            }
        }

        for (target, fields) in self.mappings.fields_by_target() {
            if fields.len() > 1 {
                report.push(IntegrityIssue::DuplicateTarget {
                    target: target.to_string(),
                    fields: fields.into_iter().map(str::to_string).collect(),
                });
            }
        }
    }
}

/// Check `properties` and `mappings`. See [`IntegrityChecker`].
pub fn check(properties: &ConversionProperties, mappings: &MappingSet) -> IntegrityReport {
    IntegrityChecker::new(properties, mappings).check()
}

/// True when `path` can't be opened for writing and locked exclusively.
fn is_locked(path: &Path) -> bool {
    let file = match OpenOptions::new().read(true).write(true).open(path) {
        Ok(file) => file,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Cannot open file for writing");
            return true;
        }
    };

    match file.try_lock_exclusive() {
        Ok(()) => {
            let _ = FileExt::unlock(&file);
            false
        }
        Err(_) => true,
    }
}
