//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

/// Absolute path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
}

/// A complete, valid report: four modules, three faults.
pub fn golf() -> String {
    fixture("golf.txt")
}

/// `golf.txt` with one line replaced.
pub fn golf_with(from: &str, to: &str) -> String {
    let text = golf();
    assert!(text.contains(from), "fixture does not contain {from:?}");
    text.replacen(from, to, 1)
}
