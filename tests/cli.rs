use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FEED: &str = r#"[
  {"ID": 1, "Account Number": "ACC-2", "Upload Date": "2024-01-15", "Completion Date": "",
   "Status": "Pending", "Categories": "Other", "Type of Issue": "Blurred scan",
   "Rejection Reason": "Invalid Entry", "Report": "/reports/1.pdf", "Accept/Reject": "Pending"},
  {"ID": 2, "Account Number": "ACC-1", "Upload Date": "2024-01-20", "Completion Date": "2024-01-22",
   "Status": "Complete", "Categories": "Other", "Type of Issue": "Name mismatch",
   "Rejection Reason": "Invalid Entry", "Report": "", "Accept/Reject": "Accept"}
]"#;

/// A command with HOME pointed at a scratch directory so settings stay isolated.
fn reviewdesk(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("reviewdesk").unwrap();
    cmd.env("HOME", home).env("NO_COLOR", "1").env_remove("REVIEWDESK_LOG");
    cmd
}

fn write_feed(dir: &TempDir) -> String {
    let path = dir.path().join("feed.json");
    fs::write(&path, FEED).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn summary_prints_totals_and_series() {
    let home = tempfile::tempdir().unwrap();
    let feed = write_feed(&home);
    reviewdesk(home.path())
        .args(["summary", "--source", &feed])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total records: 2"))
        .stdout(predicate::str::contains("Invalid Entry"))
        .stdout(predicate::str::contains("Tenancy Agreement"));
}

#[test]
fn summary_with_missing_source_fails() {
    let home = tempfile::tempdir().unwrap();
    reviewdesk(home.path())
        .args(["summary", "--source", "/definitely/not/here.json"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn records_sorted_by_account() {
    let home = tempfile::tempdir().unwrap();
    let feed = write_feed(&home);
    let output = reviewdesk(home.path())
        .args(["records", "--source", &feed, "--sort", "account"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    let first = text.find("ACC-1").unwrap();
    let second = text.find("ACC-2").unwrap();
    assert!(first < second);
}

#[test]
fn records_rejects_unknown_sort_column() {
    let home = tempfile::tempdir().unwrap();
    let feed = write_feed(&home);
    reviewdesk(home.path())
        .args(["records", "--source", &feed, "--sort", "colour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown sort column: colour"));
}

#[test]
fn csv_prints_rows_as_json() {
    let home = tempfile::tempdir().unwrap();
    let path = home.path().join("rows.csv");
    fs::write(&path, "ID,Status\n1,Pending\n\n2\n").unwrap();
    reviewdesk(home.path())
        .args(["csv", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Status\": \"Pending\""))
        .stdout(predicate::str::contains("\"ID\": \"2\""));
}

#[test]
fn upload_file_reports_success() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join(".config").join("reviewdesk");
    fs::create_dir_all(&config).unwrap();
    fs::write(
        config.join("settings.json"),
        r#"{"upload_delay_ms": 10, "success_display_ms": 10}"#,
    )
    .unwrap();
    let file = home.path().join("statement.pdf");
    fs::write(&file, b"%PDF-1.4").unwrap();

    reviewdesk(home.path())
        .args(["upload", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Upload Successful!"));
}

#[test]
fn upload_rejects_unsupported_file() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("notes.txt");
    fs::write(&file, "hello").unwrap();
    reviewdesk(home.path())
        .args(["upload", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a JPG, PNG or PDF"));
}

#[test]
fn demo_then_summary_uses_configured_feed() {
    let home = tempfile::tempdir().unwrap();
    reviewdesk(home.path())
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 36 sample records"));
    reviewdesk(home.path())
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total records: 36"));
}

#[test]
fn config_saves_name() {
    let home = tempfile::tempdir().unwrap();
    reviewdesk(home.path())
        .args(["config", "--name", "Sam Rivera"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings saved."))
        .stdout(predicate::str::contains("Sam Rivera"));
    let saved = fs::read_to_string(home.path().join(".config/reviewdesk/settings.json")).unwrap();
    assert!(saved.contains("Sam Rivera"));
}

#[test]
fn summary_json_emits_datasets() {
    let home = tempfile::tempdir().unwrap();
    let feed = write_feed(&home);
    let output = reviewdesk(home.path())
        .args(["summary", "--source", &feed, "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["total"], 2);
    assert_eq!(value["monthly"]["Invalid Entry"][0], 2);
    assert_eq!(value["status"]["observed"][0][0], "Pending");
}

#[test]
fn records_filters_by_decision() {
    let home = tempfile::tempdir().unwrap();
    let feed = write_feed(&home);
    reviewdesk(home.path())
        .args(["records", "--source", &feed, "--decision", "Accept"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ACC-1"))
        .stdout(predicate::str::contains("ACC-2").not());
    reviewdesk(home.path())
        .args(["records", "--source", &feed, "--decision", "Maybe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid review decision: Maybe"));
}

#[test]
fn csv_selects_columns() {
    let home = tempfile::tempdir().unwrap();
    let path = home.path().join("rows.csv");
    fs::write(&path, "ID,Status,Notes\n1,Pending,late\n").unwrap();
    reviewdesk(home.path())
        .args(["csv", path.to_str().unwrap(), "--column", "Status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Status\": \"Pending\""))
        .stdout(predicate::str::contains("Notes").not());
    reviewdesk(home.path())
        .args(["csv", path.to_str().unwrap(), "--column", "Colour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No column named \"Colour\""));
}

#[test]
fn csv_checks_columns_without_data_rows() {
    let home = tempfile::tempdir().unwrap();
    let path = home.path().join("header_only.csv");
    fs::write(&path, "ID,Status\n").unwrap();
    reviewdesk(home.path())
        .args(["csv", path.to_str().unwrap(), "--column", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No column named \"nope\""));
    reviewdesk(home.path())
        .args(["csv", path.to_str().unwrap(), "--column", "Status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn config_falls_back_to_defaults_on_corrupt_settings() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join(".config").join("reviewdesk");
    fs::create_dir_all(&config).unwrap();
    fs::write(config.join("settings.json"), "{not json").unwrap();
    reviewdesk(home.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("(not set)"))
        .stdout(predicate::str::contains("Upload delay:   2000 ms"))
        .stderr(predicate::str::contains("ignoring unreadable"));
}
