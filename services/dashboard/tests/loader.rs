//! Startup loading from on-disk fixtures.

use dashboard::{load_raw_table, load_region_table, load_snapshot, LoadError};
use gradboard_leaderboard::{LeaderboardError, QueryParams, RawRecord, SortKey};
use rust_xlsxwriter::Workbook;
use std::io::Write;
use tempfile::{Builder, NamedTempFile, TempDir};

const PREFIX: &str = "Graduation rate - Bachelor degree within 6 years  ";

fn ipeds_header() -> String {
    let rates = ["total", "men", "women", "Black  non-Hispanic", "Hispanic", "White  non-Hispanic"]
        .iter()
        .map(|g| format!("{PREFIX}{g} (DRVGR2023)"))
        .collect::<Vec<_>>()
        .join(",");
    format!("UnitID,Institution Name,State,{rates}")
}

fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn csv_dataset_derives_in_file_order() {
    let csv = format!(
        "{}\n1,Kenyon College,Ohio,87,85,89,80,,90\n2,Rice University,Texas,94,95,93,91,92,95\n3,Unknown Tech,,50,,52,,,\n",
        ipeds_header()
    );
    let file = write_temp(".csv", &csv);
    let board = load_snapshot(file.path(), None, None).unwrap();
    assert_eq!(board.len(), 3);
    let first = &board.rows()[0];
    assert_eq!(first.institution(), Some("Kenyon College"));
    assert_eq!(first.region_code(), Some("OH"));
    assert_eq!(first.gender_gap(), Some(4.0));
    assert_eq!(first.black_white_gap(), Some(10.0));
    assert_eq!(first.hispanic_white_gap(), None);
    let third = &board.rows()[2];
    assert_eq!(third.region(), None);
    assert_eq!(third.gender_gap(), None);

    let res = board.query(&QueryParams::new(SortKey::OverallRate));
    let names: Vec<_> = res.rows.iter().filter_map(|r| r.institution()).collect();
    assert_eq!(names, vec!["Rice University", "Kenyon College", "Unknown Tech"]);
    assert!(res.chart_groups.contains_key("unspecified"));
}

#[test]
fn missing_column_is_schema_error() {
    let header = ipeds_header().replace(&format!("{PREFIX}men (DRVGR2023),"), "");
    let file = write_temp(".csv", &format!("{header}\n"));
    let err = load_snapshot(file.path(), None, None).unwrap_err();
    match err {
        LoadError::Schema(LeaderboardError::Schema { missing }) => {
            assert_eq!(missing, vec![format!("{PREFIX}men (DRVGR2023)")]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn custom_region_table_replaces_builtin() {
    let regions = write_temp(".yaml", "Ohio: OHIO\nGuam: GU\n");
    let table = load_region_table(Some(regions.path())).unwrap();
    assert_eq!(table.len(), 2);

    let csv = format!("{}\n1,University of Guam,Guam,35,30,38,,,\n2,Kenyon College,Ohio,87,85,89,,,\n3,Rice University,Texas,94,,,,,\n", ipeds_header());
    let data = write_temp(".csv", &csv);
    let board = load_snapshot(data.path(), None, Some(regions.path())).unwrap();
    let codes: Vec<_> = board.rows().iter().map(|r| r.region_code()).collect();
    assert_eq!(codes, vec![Some("GU"), Some("OHIO"), None]);
}

#[test]
fn malformed_region_table_fails() {
    let regions = write_temp(".yaml", "- just\n- a list\n");
    assert!(matches!(load_region_table(Some(regions.path())), Err(LoadError::RegionTable(_))));
}

#[test]
fn missing_dataset_file_fails() {
    let err = load_snapshot(std::path::Path::new("/nonexistent/data.csv"), None, None).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

/// Writes `Grad` (IPEDS header with padded cells, one blank interior row) and an empty `Notes` sheet.
fn write_workbook() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Merged_IPEDS_Data.xlsx");
    let mut workbook = Workbook::new();

    let grad = workbook.add_worksheet().set_name("Grad").unwrap();
    for (col, name) in ipeds_header().split(',').enumerate() {
        grad.write_string(0, col as u16, format!(" {name} ")).unwrap();
    }
    let data: [(&str, &str, [f64; 6]); 2] = [
        ("Kenyon College", "Ohio", [87.0, 85.0, 89.0, 80.0, 88.0, 90.0]),
        ("Rice University", "Texas", [94.0, 95.0, 93.0, 91.0, 92.0, 95.0]),
    ];
    for (i, (name, state, rates)) in data.iter().enumerate() {
        // row 1 stays blank
        let row = i as u32 + 2;
        grad.write_number(row, 0, i as f64 + 1.0).unwrap();
        grad.write_string(row, 1, *name).unwrap();
        grad.write_string(row, 2, *state).unwrap();
        for (j, rate) in rates.iter().enumerate() {
            grad.write_number(row, 3 + j as u16, *rate).unwrap();
        }
    }
    workbook.add_worksheet().set_name("Notes").unwrap();
    workbook.save(&path).unwrap();
    (dir, path)
}

#[test]
fn workbook_first_sheet_is_default() {
    let (_dir, path) = write_workbook();
    let table = load_raw_table(&path, None).unwrap();
    assert_eq!(table.columns[1], "Institution Name");
    assert_eq!(table.columns[3], format!("{PREFIX}total (DRVGR2023)"));
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[0], RawRecord::default());
    assert_eq!(table.rows[1].text("Institution Name"), Some("Kenyon College"));
    assert_eq!(table.rows[2].number("UnitID"), Some(2.0));
}

#[test]
fn workbook_named_sheet_is_selected() {
    let (_dir, path) = write_workbook();
    let grad = load_raw_table(&path, Some("Grad")).unwrap();
    assert_eq!(grad.rows.len(), 3);
    let notes = load_raw_table(&path, Some("Notes")).unwrap();
    assert!(notes.columns.is_empty());
    assert!(notes.rows.is_empty());
}

#[test]
fn workbook_missing_sheet_fails() {
    let (_dir, path) = write_workbook();
    let err = load_raw_table(&path, Some("Sheet9")).unwrap_err();
    assert!(matches!(err, LoadError::SheetNotFound(name) if name == "Sheet9"));
}

#[test]
fn workbook_snapshot_derives_rows() {
    let (_dir, path) = write_workbook();
    let board = load_snapshot(&path, None, None).unwrap();
    assert_eq!(board.len(), 3);
    assert_eq!(board.rows()[0].institution(), None);
    assert_eq!(board.rows()[0].overall_rate(), None);
    let kenyon = &board.rows()[1];
    assert_eq!(kenyon.region_code(), Some("OH"));
    assert_eq!(kenyon.gender_gap(), Some(4.0));
    assert_eq!(kenyon.hispanic_white_gap(), Some(2.0));

    let res = board.query(&QueryParams::new(SortKey::OverallRate));
    let names: Vec<_> = res.rows.iter().map(|r| r.institution()).collect();
    assert_eq!(names, vec![Some("Rice University"), Some("Kenyon College"), None]);
}

#[test]
fn empty_sheet_fails_schema_check() {
    let (_dir, path) = write_workbook();
    let err = load_snapshot(&path, Some("Notes"), None).unwrap_err();
    assert!(matches!(err, LoadError::Schema(LeaderboardError::Schema { .. })));
}
