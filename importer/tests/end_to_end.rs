//! Full runs: configuration files on disk, a qTest workbook in, an Octane
//! workbook out.

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook;
use sheetport::{
    ConversionConfig, ConversionJob, Decision, Gate, IntegrityIssue, OperatorAnswer,
    PropertyOverrides,
};
use tempfile::TempDir;

const MAPPING: &str = r#"{
    "field_mappings": {
        "Name": { "target": "name" },
        "Status": {
            "target": "phase",
            "mapping": { "New": "New", "Ready For Baseline": "Ready For Baseline" }
        },
        "Module": {
            "target": "product_areas",
            "regex_mappings": [{ "pattern": "MD-\\d+ (.*)", "replacement": "$1" }]
        },
        "Assigned To": {
            "target": "owner",
            "mapping_separator": ",",
            "mapping": { "admin": "sa@nga" }
        }
    }
}"#;

fn write_qtest_export(path: &Path) {
    let mut workbook = Workbook::new();

    let overview = workbook.add_worksheet();
    overview.set_name("Overview").unwrap();
    overview.write_string(0, 0, "Exported from qTest").unwrap();

    let cases = workbook.add_worksheet();
    cases.set_name("Test Cases").unwrap();
    let headers = [
        "Id",
        "Name",
        "Module",
        "Status",
        "Assigned To",
        "Test Step Description",
        "Test Step Expected Result",
    ];
    for (col, header) in headers.iter().enumerate() {
        cases.write_string(0, col as u16, *header).unwrap();
    }
    let rows: [[&str; 7]; 3] = [
        ["TC-1", "Login", "MD-3 Accounts", "New", "admin, jdoe", "Open the login page", "Form is shown"],
        ["", "", "", "", "", "Submit credentials", "User is logged-in"],
        ["TC-2", "Logout", "MD-3 Accounts", "Ready For Baseline", "", "Click logout", ""],
    ];
    for (r, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            if !value.is_empty() {
                cases.write_string(r as u32 + 1, col as u16, *value).unwrap();
            }
        }
    }

    workbook.save(path).unwrap();
}

struct Run {
    _dir: TempDir,
    properties: PathBuf,
    mapping: PathBuf,
    output: PathBuf,
}

fn setup(mapping: &str) -> Run {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("qtest.xlsx");
    let output = dir.path().join("octane.xlsx");
    write_qtest_export(&input);

    let properties = dir.path().join("converter.properties");
    fs::write(
        &properties,
        format!(
            "input.file.path='{}'\ninput.file.format.type=qtest\noutput.file.path='{}'\n",
            input.display(),
            output.display()
        ),
    )
    .unwrap();

    let mapping_path = dir.path().join("mapping.json");
    fs::write(&mapping_path, mapping).unwrap();

    Run {
        _dir: dir,
        properties,
        mapping: mapping_path,
        output,
    }
}

fn load(run: &Run) -> ConversionJob {
    let config =
        ConversionConfig::load(&run.properties, &run.mapping, &PropertyOverrides::default())
            .unwrap();
    ConversionJob::from(config)
}

fn text(range: &calamine::Range<Data>, row: u32, header: &str) -> String {
    let col = (0..range.width() as u32)
        .find(|&c| range.get_value((0, c)) == Some(&Data::String(header.to_string())))
        .unwrap_or_else(|| panic!("no column {header}"));
    text_at(range, row, col)
}

fn text_at(range: &calamine::Range<Data>, row: u32, col: u32) -> String {
    match range.get_value((row, col)) {
        Some(Data::String(s)) => s.clone(),
        Some(Data::Float(f)) => f.to_string(),
        _ => String::new(),
    }
}

#[test]
fn test_convert_qtest_workbook() {
    let run = setup(MAPPING);
    let job = load(&run);

    let report = job.check();
    assert!(report.is_clean(), "{report:?}");
    assert_eq!(Gate::evaluate(&report).decide(None), Decision::Proceed);

    let stats = job.run().unwrap();
    assert_eq!(stats.tests, 2);
    assert_eq!(stats.steps, 5);

    let mut workbook = open_workbook_auto(&run.output).unwrap();
    let range = workbook.worksheet_range("manual tests").unwrap();

    assert_eq!(range.height(), 8);
    let headers: Vec<String> = (0..range.width() as u32)
        .map(|c| text_at(&range, 0, c))
        .collect();
    assert_eq!(
        headers,
        [
            "unique_id",
            "type",
            "step_type",
            "step_description",
            "name",
            "phase",
            "product_areas",
            "owner"
        ]
    );
    assert_eq!(text(&range, 1, "type"), "test_manual");
    assert_eq!(text(&range, 1, "unique_id"), "1");
    assert_eq!(text(&range, 1, "name"), "Login");
    assert_eq!(text(&range, 1, "phase"), "New");
    assert_eq!(text(&range, 1, "product_areas"), "Accounts");
    assert_eq!(text(&range, 1, "owner"), "sa@nga,jdoe");

    assert_eq!(text(&range, 2, "step_type"), "simple");
    assert_eq!(text(&range, 5, "step_description"), "User is logged•in");

    assert_eq!(text(&range, 6, "phase"), "Ready For Baseline");
    assert_eq!(text(&range, 6, "owner"), "");
}

#[test]
fn test_existing_output_needs_confirmation() {
    let run = setup(MAPPING);
    fs::write(&run.output, b"previous run").unwrap();
    let job = load(&run);

    let report = job.check();
    assert_eq!(report.warnings, vec![IntegrityIssue::OutputExists(run.output.clone())]);

    let gate = Gate::evaluate(&report);
    assert!(gate.needs_confirmation());
    assert_eq!(gate.decide(Some(OperatorAnswer::No)), Decision::Stop);
    assert_eq!(gate.decide(Some(OperatorAnswer::Yes)), Decision::Proceed);

    job.run().unwrap();
    assert!(open_workbook_auto(&run.output).is_ok());
}

#[test]
fn test_mapping_errors_block_the_run() {
    let run = setup(
        r#"{
            "field_mappings": {
                "Status": { "target": "phase" },
                "State": { "target": "phase" },
                "Nonexistent": { "target": "description" }
            }
        }"#,
    );
    let job = load(&run);

    let report = job.check();
    assert_eq!(report.error_count(), 2);
    assert!(report.errors.iter().any(|e| e.to_string().contains("Nonexistent")));
    assert!(report.errors.iter().any(|e| e.to_string().contains("phase")));
    assert_eq!(Gate::evaluate(&report).decide(Some(OperatorAnswer::Yes)), Decision::Stop);
    assert!(!run.output.exists());
}
