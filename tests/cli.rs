//! Command-line behaviour of the `mofa` binary.

use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn mofa(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mofa"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_unzip_missing_archive_fails_before_any_progress() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("data.zip");

    let out = mofa(&["unzip", "-i", missing.to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&out.stderr);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr.contains("Error: Input file not found at '"));
    assert!(!stderr.contains("Starting extraction"));
}

#[test]
fn test_analyze_rejects_layout_for_other_variant() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("report.yaml");
    let model = dir.path().join("CLL.hdf5");
    let results = dir.path().join("results");
    fs::write(&model, b"model").unwrap();

    let written = mofa(&[
        "example-config",
        "-k",
        "report-mefisto",
        "-o",
        config.to_str().unwrap(),
    ]);
    assert!(written.status.success());

    let out = mofa(&[
        "analyze-mofa",
        "-i",
        model.to_str().unwrap(),
        "-o",
        results.to_str().unwrap(),
        "-c",
        config.to_str().unwrap(),
    ]);
    let stderr = String::from_utf8_lossy(&out.stderr);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr.contains("Error: Invalid parameter: report layout is for Mefisto"));
    assert!(!results.exists());
}
