// End-to-end checks of the `autoscan` binary.

mod common;

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::TempDir;

use common::{fixture, fixture_path, golf, golf_with};

/// Runs from an empty directory so no local `autoscan.toml` is picked up.
fn autoscan(cwd: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("autoscan").unwrap();
    cmd.current_dir(cwd.path());
    cmd
}

#[test]
fn parse_prints_a_valid_report() {
    let cwd = TempDir::new().unwrap();
    autoscan(&cwd)
        .arg("parse")
        .arg(fixture_path("golf.txt"))
        .assert()
        .success()
        .stdout(contains("WVWZZZ1KZ8W123456").and(contains("Cent. Elect.")));
}

#[test]
fn parse_reports_syntax_errors_with_context() {
    let cwd = TempDir::new().unwrap();
    autoscan(&cwd)
        .arg("parse")
        .arg(fixture_path("truncated.txt"))
        .assert()
        .failure()
        .stderr(
            contains("SYNTAX ERROR")
                .and(contains("from line 67 column 24"))
                .and(contains("Address 17: Instruments")),
        );
}

#[test]
fn parse_reports_schema_violations() {
    let cwd = TempDir::new().unwrap();
    autoscan(&cwd)
        .arg("parse")
        .arg(fixture_path("invalid.txt"))
        .assert()
        .failure()
        .stderr(contains("INVALID REPORT").and(contains("/duration/seconds: ")));
}

#[test]
fn parse_json_emits_the_document() {
    let cwd = TempDir::new().unwrap();
    let output = autoscan(&cwd)
        .arg("parse")
        .arg("--json")
        .arg(fixture_path("golf.txt"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["ok"], true);
    assert_eq!(value["filename"], "golf.txt");
    assert_eq!(value["report"]["vehicle"]["mileage"]["km"], 123456);
}

#[test]
fn batch_sorts_by_mileage_and_fails_on_any_error() {
    let cwd = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("golf.txt"), golf()).unwrap();
    fs::write(
        dir.path().join("high.txt"),
        golf_with("Mileage: 123456km-76712miles", "Mileage: 200000km"),
    )
    .unwrap();
    fs::write(dir.path().join("broken.txt"), fixture("truncated.txt")).unwrap();
    fs::write(dir.path().join("notes.md"), "not a report").unwrap();

    let output = autoscan(&cwd).arg("batch").arg(dir.path()).output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();

    assert!(!output.status.success());
    assert!(!stdout.contains("notes.md"), "{stdout}");

    let position = |name: &str| {
        stdout
            .find(name)
            .unwrap_or_else(|| panic!("{name} missing from:\n{stdout}"))
    };
    assert!(position("high.txt") < position("golf.txt"));
    assert!(position("golf.txt") < position("broken.txt"));
}

#[test]
fn batch_of_valid_reports_succeeds() {
    let cwd = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), golf()).unwrap();
    fs::write(dir.path().join("b.txt"), golf()).unwrap();

    autoscan(&cwd)
        .args(["--threads", "2", "batch"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(contains("a.txt").and(contains("b.txt")));
}

#[test]
fn config_file_selects_json_output() {
    let cwd = TempDir::new().unwrap();
    fs::write(cwd.path().join("autoscan.toml"), "format = \"json\"\n").unwrap();

    autoscan(&cwd)
        .arg("parse")
        .arg(fixture_path("golf.txt"))
        .assert()
        .success()
        .stdout(contains("\"ok\": true"));
}

#[test]
fn malformed_config_is_rejected() {
    let cwd = TempDir::new().unwrap();
    fs::write(cwd.path().join("autoscan.toml"), "colour = \"blue\"\n").unwrap();

    autoscan(&cwd)
        .arg("parse")
        .arg(fixture_path("golf.txt"))
        .assert()
        .failure()
        .stderr(contains("autoscan.toml"));
}

#[test]
fn tree_prints_the_raw_tree() {
    let cwd = TempDir::new().unwrap();
    autoscan(&cwd)
        .arg("tree")
        .arg(fixture_path("golf.txt"))
        .assert()
        .success()
        .stdout(contains("\"isReachable\": false").and(contains("\"licensePlate\": \"AB-123-CD\"")));
}

#[test]
fn tree_fails_with_a_diagnostic() {
    let cwd = TempDir::new().unwrap();
    autoscan(&cwd)
        .arg("tree")
        .arg(fixture_path("truncated.txt"))
        .assert()
        .failure()
        .stderr(contains("autoscan::syntax").or(contains("syntax error")));
}
