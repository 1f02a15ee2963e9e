//! qTest test-case export driver.
//!
//! A qTest export lists one row per test step; the test's own fields are
//! only filled on its first row. Each change of `Id` starts a new manual
//! test, and every row contributes up to two steps:
//!
//! ```text
//! Id    Name    Test Step Description   Test Step Expected Result
//! TC-1  Login   Open the page           Page is shown      → test_manual, simple, validation
//!               Enter credentials       User is logged in  →              simple, validation
//! TC-2  Logout  Click logout                               → test_manual, simple
//! ```

use tracing::{debug, error, trace, warn};

use super::{ConversionStats, RowConverter};
use crate::error::ConversionResult;
use crate::mapping::MappingSet;
use crate::models::{EntityType, FormatType, OctaneField, QTestField, StepType};
use crate::sheet::{OutputSheet, Row, Sheet};

/// Converts qTest exports.
#[derive(Debug, Clone, Copy, Default)]
pub struct QTestConverter;

impl RowConverter for QTestConverter {
    fn format(&self) -> FormatType {
        FormatType::QTest
    }

    fn mandatory_headers(&self) -> Vec<&'static str> {
        vec![
            OctaneField::UniqueId.as_str(),
            OctaneField::Type.as_str(),
            OctaneField::StepType.as_str(),
            OctaneField::StepDescription.as_str(),
        ]
    }

    fn convert(&self, input: &Sheet, mappings: &MappingSet, output: &mut OutputSheet) -> ConversionStats {
        let mut stats = ConversionStats::default();
        let mut current_id: Option<String> = None;

        for row in input.rows() {
            stats.input_rows += 1;

            let id = match row.cell(QTestField::Id.as_str()) {
                Ok(id) => id.trim(),
                Err(e) => {
                    error!(row = row.number, "Could not convert row because: {e}");
                    stats.skipped_rows += 1;
                    continue;
                }
            };

            if id.is_empty() {
                if row.is_blank() {
                    trace!(row = row.number, "Skipping blank row");
                    stats.skipped_rows += 1;
                    continue;
                }
                if current_id.is_none() {
                    warn!(row = row.number, "Row has no test Id and follows no test, skipped");
                    stats.skipped_rows += 1;
                    continue;
                }
            } else if current_id.as_deref() != Some(id) {
                debug!(row = row.number, id, "Converting test");
                current_id = Some(id.to_string());
                add_manual_test(&row, mappings, output, &mut stats);
            }

            add_step(StepType::Simple, &row, QTestField::TestStepDescription, output, &mut stats);
            add_step(StepType::Validation, &row, QTestField::TestStepExpectedResult, output, &mut stats);
        }

        stats
    }
}

/// Append the manual test row for `row`, one column per mapping target.
fn add_manual_test(
    row: &Row<'_>,
    mappings: &MappingSet,
    output: &mut OutputSheet,
    stats: &mut ConversionStats,
) {
    let test_row = create_row(output, EntityType::ManualTest, row, stats);
    stats.tests += 1;

    for (field, target) in mappings.targets() {
        let written = row
            .mapped_cell(field, mappings)
            .and_then(|value| output.set(test_row, target, value));
        if let Err(e) = written {
            error!(row = row.number, field, "Could not add test row because: {e}");
            stats.field_errors += 1;
        }
    }
}

/// Append a step row from the `column` cell of `row`, unless it is empty.
fn add_step(
    step_type: StepType,
    row: &Row<'_>,
    column: QTestField,
    output: &mut OutputSheet,
    stats: &mut ConversionStats,
) {
    let description = match row.cell(column.as_str()) {
        Ok(description) => description,
        Err(e) => {
            error!(row = row.number, "Could not add test step row because: {e}");
            stats.field_errors += 1;
            return;
        }
    };

    if description.trim().is_empty() {
        return;
    }

    let step_row = create_row(output, EntityType::Step, row, stats);
    let written = write_step(output, step_row, step_type, description);
    if let Err(e) = written {
        error!(row = row.number, "Could not add test step row because: {e}");
        stats.field_errors += 1;
    }
    stats.steps += 1;
}

fn write_step(
    output: &mut OutputSheet,
    step_row: usize,
    step_type: StepType,
    description: &str,
) -> ConversionResult<()> {
    output.set(step_row, OctaneField::StepType.as_str(), step_type.as_str())?;
    output.set(
        step_row,
        OctaneField::StepDescription.as_str(),
        clean_step_description(description),
    )
}

/// New output row carrying its own number as `unique_id`, converted from
/// `source`.
fn create_row(
    output: &mut OutputSheet,
    entity_type: EntityType,
    source: &Row<'_>,
    stats: &mut ConversionStats,
) -> usize {
    let row = output.create_row();
    let written = output
        .set(row, OctaneField::UniqueId.as_str(), row)
        .and_then(|()| output.set(row, OctaneField::Type.as_str(), entity_type.as_str()));
    if let Err(e) = written {
        error!(
            row = source.number,
            entity = entity_type.as_str(),
            "Could not create output row because: {e}"
        );
        stats.field_errors += 1;
    }
    row
}

/// Octane rejects `-` in step descriptions.
fn clean_step_description(description: &str) -> String {
    description.replace('-', "•")
}
