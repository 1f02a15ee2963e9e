//! Domain models shared by the configuration, integrity and conversion layers.
//!
//! - [`FormatType`] - Input spreadsheet format (qTest export, ...)
//! - [`QTestField`] - Well-known column headers of a qTest test-case export
//! - [`OctaneField`] - Well-known column headers of an Octane import workbook
//! - [`EntityType`] / [`StepType`] - Values of the Octane `type` and `step_type` columns
//!
//! Field descriptors are the one place where header text lives. Everything
//! else refers to a column through its descriptor and `as_str()`.

use std::fmt;

// =============================================================================
// Input Format
// =============================================================================

/// Format of the input spreadsheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FormatType {
    /// qTest test-case export.
    #[default]
    QTest,
    /// Octane export. Known, but no converter reads it yet.
    Octane,
    /// Anything that did not parse as a known format.
    Unknown,
}

impl FormatType {
    /// Formats an input file may be declared as.
    pub const RECOGNIZED: &'static [FormatType] = &[FormatType::QTest];

    /// Parse a format name case-insensitively. Unrecognized names map to
    /// [`FormatType::Unknown`] instead of failing.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "QTEST" => FormatType::QTest,
            "OCTANE" => FormatType::Octane,
            _ => FormatType::Unknown,
        }
    }

    /// Canonical configuration spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatType::QTest => "QTEST",
            FormatType::Octane => "OCTANE",
            FormatType::Unknown => "UNKNOWN",
        }
    }

    /// Canonical names of [`FormatType::RECOGNIZED`].
    pub fn recognized_names() -> Vec<&'static str> {
        Self::RECOGNIZED.iter().map(FormatType::as_str).collect()
    }

    /// Which sheet of an input workbook holds the rows to convert.
    pub fn input_sheet(&self) -> SheetSelector {
        match self {
            FormatType::QTest => SheetSelector {
                name: Some(QTEST_TEST_CASES_SHEET),
                index: 1,
            },
            FormatType::Octane | FormatType::Unknown => SheetSelector {
                name: None,
                index: 0,
            },
        }
    }
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sheet holding test cases in a qTest export workbook.
pub const QTEST_TEST_CASES_SHEET: &str = "Test Cases";

/// Locates the input-data sheet of a workbook.
///
/// The named sheet wins when present, then the sheet at `index`. A workbook
/// with a single sheet always resolves to that sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetSelector {
    pub name: Option<&'static str>,
    pub index: usize,
}

impl SheetSelector {
    /// Pick a sheet among `sheet_names`.
    pub fn select<'a>(&self, sheet_names: &'a [String]) -> Option<&'a str> {
        if let Some(wanted) = self.name {
            if let Some(found) = sheet_names.iter().find(|n| n.as_str() == wanted) {
                return Some(found);
            }
        }
        if let Some(found) = sheet_names.get(self.index) {
            return Some(found);
        }
        match sheet_names {
            [only] => Some(only),
            _ => None,
        }
    }
}

// =============================================================================
// qTest Fields
// =============================================================================

/// Column headers of a qTest test-case export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QTestField {
    Module,
    Name,
    Id,
    Attachments,
    Status,
    Type,
    Description,
    Precondition,
    TestStepNumber,
    TestStepDescription,
    TestStepExpectedResult,
    TestStepAttachment,
    RequirementIds,
    Requirements,
    Version,
    AssignedTo,
    Priority,
    EpicLink,
}

impl QTestField {
    pub const ALL: [QTestField; 18] = [
        QTestField::Module,
        QTestField::Name,
        QTestField::Id,
        QTestField::Attachments,
        QTestField::Status,
        QTestField::Type,
        QTestField::Description,
        QTestField::Precondition,
        QTestField::TestStepNumber,
        QTestField::TestStepDescription,
        QTestField::TestStepExpectedResult,
        QTestField::TestStepAttachment,
        QTestField::RequirementIds,
        QTestField::Requirements,
        QTestField::Version,
        QTestField::AssignedTo,
        QTestField::Priority,
        QTestField::EpicLink,
    ];

    /// Header text in the export.
    pub fn as_str(&self) -> &'static str {
        match self {
            QTestField::Module => "Module",
            QTestField::Name => "Name",
            QTestField::Id => "Id",
            QTestField::Attachments => "Attachments",
            QTestField::Status => "Status",
            QTestField::Type => "Type",
            QTestField::Description => "Description",
            QTestField::Precondition => "Precondition",
            QTestField::TestStepNumber => "Test Step #",
            QTestField::TestStepDescription => "Test Step Description",
            QTestField::TestStepExpectedResult => "Test Step Expected Result",
            QTestField::TestStepAttachment => "Test Step Attachment",
            QTestField::RequirementIds => "Requirement Ids",
            QTestField::Requirements => "Requirements",
            QTestField::Version => "Version",
            QTestField::AssignedTo => "Assigned To",
            QTestField::Priority => "Priority",
            QTestField::EpicLink => "Epic Link",
        }
    }

    /// Look a header up by its exact (case-sensitive) text.
    pub fn from_header(header: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == header)
    }
}

impl fmt::Display for QTestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Octane Fields
// =============================================================================

/// Column headers of an Octane import workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OctaneField {
    UniqueId,
    Type,
    TestType,
    StepType,
    StepDescription,
    Name,
    Description,
    Designer,
    Owner,
    ProductAreas,
    UserTags,
    Phase,
    CoveredContent,
    EstimatedDuration,
}

impl OctaneField {
    pub fn as_str(&self) -> &'static str {
        match self {
            OctaneField::UniqueId => "unique_id",
            OctaneField::Type => "type",
            OctaneField::TestType => "test_type",
            OctaneField::StepType => "step_type",
            OctaneField::StepDescription => "step_description",
            OctaneField::Name => "name",
            OctaneField::Description => "description",
            OctaneField::Designer => "designer",
            OctaneField::Owner => "owner",
            OctaneField::ProductAreas => "product_areas",
            OctaneField::UserTags => "user_tags",
            OctaneField::Phase => "phase",
            OctaneField::CoveredContent => "covered_content",
            OctaneField::EstimatedDuration => "estimated_duration",
        }
    }
}

impl fmt::Display for OctaneField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Octane Row Kinds
// =============================================================================

/// Value of the Octane `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    ManualTest,
    Step,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::ManualTest => "test_manual",
            EntityType::Step => "step",
        }
    }
}

/// Value of the Octane `step_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepType {
    Simple,
    Validation,
}

impl StepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Simple => "simple",
            StepType::Validation => "validation",
        }
    }
}
