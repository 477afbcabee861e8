//! CLI Integration Tests
//!
//! Tests the `sciport` binary directly using assert_cmd.

// Binaries are stubbed during coverage builds
#![cfg(not(coverage))]
#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use rust_xlsxwriter::Workbook;
use sciport::excel::read_excel;
use sciport::fits::{fits_writer, FitsReader};
use sciport::types::{ComponentValues, Dataset};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_grid(dir: &Path) -> PathBuf {
    let path = dir.join("grid.fits");
    let mut data = Dataset::from_arrays(
        "grid",
        vec![2, 3],
        [
            ("x", vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]),
            ("y", vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]),
        ],
    )
    .unwrap();
    data.set_units("x", "m / s").unwrap();
    fits_writer(&path, &data, None).unwrap();
    path
}

fn write_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("simple_data.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Data1").unwrap();
    sheet.write_string(0, 0, "a").unwrap();
    sheet.write_string(0, 1, "b").unwrap();
    for (row, letter) in ["a", "c", "d"].iter().enumerate() {
        let r = row as u32 + 1;
        sheet.write_number(r, 0, f64::from(r)).unwrap();
        sheet.write_string(r, 1, *letter).unwrap();
    }
    let second = workbook.add_worksheet();
    second.set_name("Data2").unwrap();
    second.write_string(0, 0, "v").unwrap();
    second.write_number(1, 0, 42.0).unwrap();
    workbook.save(&path).unwrap();
    path
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("sciport").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sciport"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("sciport").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sciport"));
}

#[test]
fn test_export_help_mentions_subsets() {
    let mut cmd = Command::cargo_bin("sciport").unwrap();
    cmd.args(["export", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SUBSET EXPRESSIONS"));
}

// ═══════════════════════════════════════════════════════════════════════════
// INFO / SHEETS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_info_text() {
    let temp_dir = TempDir::new().unwrap();
    let fits = write_grid(temp_dir.path());
    let xlsx = write_workbook(temp_dir.path());

    let mut cmd = Command::cargo_bin("sciport").unwrap();
    cmd.arg("info")
        .arg(&fits)
        .arg(&xlsx)
        .assert()
        .success()
        .stdout(predicate::str::contains("grid"))
        .stdout(predicate::str::contains("[m / s]"))
        .stdout(predicate::str::contains("simple_data:Data1"))
        .stdout(predicate::str::contains("simple_data:Data2"))
        .stdout(predicate::str::contains("categorical"));
}

#[test]
fn test_info_json() {
    let temp_dir = TempDir::new().unwrap();
    let fits = write_grid(temp_dir.path());

    let output = Command::cargo_bin("sciport")
        .unwrap()
        .args(["info", "--format", "json"])
        .arg(&fits)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["label"], "grid");
    assert_eq!(json[0]["shape"], serde_json::json!([2, 3]));
    assert_eq!(json[0]["components"][0]["name"], "x");
    assert_eq!(json[0]["components"][0]["units"], "m / s");
    assert!(json[0]["components"][1].get("units").is_none());
}

#[test]
fn test_info_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let xlsx = write_workbook(temp_dir.path());

    let mut cmd = Command::cargo_bin("sciport").unwrap();
    cmd.args(["info", "-f", "yaml"])
        .arg(&xlsx)
        .assert()
        .success()
        .stdout(predicate::str::contains("label:"))
        .stdout(predicate::str::contains("simple_data:Data1"));
}

#[test]
fn test_info_missing_file() {
    let mut cmd = Command::cargo_bin("sciport").unwrap();
    cmd.args(["info", "/nonexistent/file.fits"])
        .assert()
        .failure();
}

#[test]
fn test_sheets() {
    let temp_dir = TempDir::new().unwrap();
    let xlsx = write_workbook(temp_dir.path());

    let mut cmd = Command::cargo_bin("sciport").unwrap();
    cmd.arg("sheets")
        .arg(&xlsx)
        .assert()
        .success()
        .stdout(predicate::str::contains("Data1"))
        .stdout(predicate::str::contains("Data2"));
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPORT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_export_sheet_to_fits() {
    let temp_dir = TempDir::new().unwrap();
    let xlsx = write_workbook(temp_dir.path());
    let output = temp_dir.path().join("data2.fits");

    let mut cmd = Command::cargo_bin("sciport").unwrap();
    cmd.arg("export")
        .arg(&xlsx)
        .arg(&output)
        .args(["--sheet", "Data2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Export Complete"));

    let loaded = FitsReader::new(&output).read().unwrap();
    assert_eq!(loaded[0].numeric("v").unwrap(), &[42.0]);
}

#[test]
fn test_export_text_only_selection_fails() {
    let temp_dir = TempDir::new().unwrap();
    let xlsx = write_workbook(temp_dir.path());
    let output = temp_dir.path().join("b.fits");

    let mut cmd = Command::cargo_bin("sciport").unwrap();
    cmd.arg("export")
        .arg(&xlsx)
        .arg(&output)
        .args(["-c", "b"])
        .assert()
        .failure();
}

#[test]
fn test_export_fits_with_subset_and_components() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_grid(temp_dir.path());
    let output = temp_dir.path().join("masked");

    let mut cmd = Command::cargo_bin("sciport").unwrap();
    cmd.arg("export")
        .arg(&input)
        .arg(&output)
        .args(["--subset", "x > 2", "-c", "y", "--verbose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 of 6 entries"));

    let loaded = FitsReader::new(&output).read().unwrap();
    assert_eq!(loaded[0].num_components(), 1);
    let y = loaded[0].numeric("y").unwrap();
    assert!(y[..3].iter().all(|v| v.is_nan()));
    assert_eq!(&y[3..], &[6.0, 8.0, 10.0]);
}

#[test]
fn test_export_xlsx_subset_on_unexported_component() {
    let temp_dir = TempDir::new().unwrap();
    let xlsx = write_workbook(temp_dir.path());
    let output = temp_dir.path().join("letters.xlsx");

    let mut cmd = Command::cargo_bin("sciport").unwrap();
    cmd.arg("export")
        .arg(&xlsx)
        .arg(&output)
        .args(["-c", "b", "--subset", "a > 1"])
        .assert()
        .success();

    let loaded = read_excel(&output, None).unwrap();
    assert_eq!(loaded[0].num_components(), 1);
    assert_eq!(
        loaded[0].values("b").unwrap(),
        &ComponentValues::Text(vec!["c".to_string(), "d".to_string()])
    );
}

#[test]
fn test_export_no_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_grid(temp_dir.path());
    let output = temp_dir.path().join("copy.fits");
    std::fs::write(&output, b"existing").unwrap();

    let mut cmd = Command::cargo_bin("sciport").unwrap();
    cmd.arg("export")
        .arg(&input)
        .arg(&output)
        .arg("--no-overwrite")
        .assert()
        .failure();

    assert_eq!(std::fs::read(&output).unwrap(), b"existing");
}

#[test]
fn test_export_bad_subset() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_grid(temp_dir.path());
    let output = temp_dir.path().join("bad.fits");

    let mut cmd = Command::cargo_bin("sciport").unwrap();
    cmd.arg("export")
        .arg(&input)
        .arg(&output)
        .args(["--subset", "x >"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Subset"));
}

#[test]
fn test_export_dataset_index_out_of_range() {
    let temp_dir = TempDir::new().unwrap();
    let xlsx = write_workbook(temp_dir.path());
    let output = temp_dir.path().join("out.fits");

    let mut cmd = Command::cargo_bin("sciport").unwrap();
    cmd.arg("export")
        .arg(&xlsx)
        .arg(&output)
        .args(["--dataset", "5"])
        .assert()
        .failure();
}
