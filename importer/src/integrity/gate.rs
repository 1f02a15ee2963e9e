//! Decide whether a run may proceed after the integrity check.
//!
//! Asking the operator is left to the caller: [`Gate::evaluate`] says
//! whether an answer is needed and [`Gate::decide`] folds that answer in.

use tracing::{error, info, warn};

use super::report::IntegrityReport;

/// Outcome of the integrity check, before any operator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Nothing was found.
    Proceed,
    /// Only warnings: the operator must agree before conversion starts.
    Confirm { warnings: usize },
    /// At least one error: conversion can't start.
    Stop { errors: usize, warnings: usize },
}

/// Shown again after an answer that is neither `YES` nor `NO`.
pub const RETRY_PROMPT: &str = "Wrong input, please enter a valid answer. [YES/NO]";

/// Operator reply to the continue prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorAnswer {
    Yes,
    No,
}

impl OperatorAnswer {
    /// Accepts `YES` and `NO`, trimmed, in any case.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("yes") {
            Some(OperatorAnswer::Yes)
        } else if input.eq_ignore_ascii_case("no") {
            Some(OperatorAnswer::No)
        } else {
            None
        }
    }
}

/// Final go/no-go for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Stop,
}

impl Gate {
    pub fn evaluate(report: &IntegrityReport) -> Self {
        match (report.error_count(), report.warning_count()) {
            (0, 0) => Gate::Proceed,
            (0, warnings) => Gate::Confirm { warnings },
            (errors, warnings) => Gate::Stop { errors, warnings },
        }
    }

    /// Whether an operator answer is needed.
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, Gate::Confirm { .. })
    }

    /// The question to put to the operator, when an answer is needed.
    pub fn question(&self) -> Option<String> {
        match self {
            Gate::Confirm { warnings } => {
                Some(format!("Warnings encountered: {warnings}. Continue? [YES/NO]"))
            }
            _ => None,
        }
    }

    /// Fold in the operator's answer. A missing answer never lets a run
    /// with warnings through.
    pub fn decide(&self, answer: Option<OperatorAnswer>) -> Decision {
        match (self, answer) {
            (Gate::Proceed, _) => Decision::Proceed,
            (Gate::Confirm { .. }, Some(OperatorAnswer::Yes)) => Decision::Proceed,
            (Gate::Confirm { .. }, _) => Decision::Stop,
            (Gate::Stop { .. }, _) => Decision::Stop,
        }
    }

    /// Log the summary line for this outcome.
    pub fn log(&self) {
        match self {
            Gate::Proceed => info!("Integrity check passed"),
            Gate::Confirm { warnings } => warn!("Warnings encountered: {warnings}."),
            Gate::Stop { errors, warnings } => error!(
                "Errors encountered: {errors} and warnings encountered: {warnings}. Conversion can't start."
            ),
        }
    }
}
