use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PERMIT: &str = "\
REPUBLIC OF THE PHILIPPINES
Business ID No.: S041008-00061
Business TIN: 420-560-891-00000
OWNER'S NAME: JUAN DELA CRUZ
BUSINESS NAME: DELA CRUZ GENERAL MERCHANDISE
Date Issued: 2025-01-15
Valid Until: 2025-12-31
";

fn permitscan() -> Command {
    Command::cargo_bin("permitscan").unwrap()
}

/// Config file with reports archived inside `dir`.
fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("config.json");
    let config = serde_json::json!({
        "archive": { "directory": dir.join("reports") },
        "acquisition": { "api_key_env": "PERMITSCAN_TEST_UNSET_VARIABLE" }
    });
    fs::write(&path, config.to_string()).unwrap();
    path
}

fn write_permit(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn extract_prints_json() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let input = write_permit(dir.path(), "permit.txt", PERMIT);

    permitscan()
        .arg("-c")
        .arg(&config)
        .arg("extract")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"businessIdNo\": \"S041008-00061\""))
        .stdout(predicate::str::contains("\"dateIssued\": \"2025-01-15\""))
        .stdout(predicate::str::contains("\"validUntil\": \"2025-12-31\""));
}

#[test]
fn extract_reads_stdin() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    permitscan()
        .arg("-c")
        .arg(&config)
        .args(["extract", "-", "--format", "text"])
        .write_stdin("Business TIN: 420-560-891-00000\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("420-560-891-00000"))
        .stdout(predicate::str::contains("Owner Name:"));
}

#[test]
fn extract_csv_output_file() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let input = write_permit(dir.path(), "permit.txt", PERMIT);
    let output = dir.path().join("out.csv");

    permitscan()
        .arg("-c")
        .arg(&config)
        .arg("extract")
        .arg(&input)
        .args(["--format", "csv", "--output"])
        .arg(&output)
        .assert()
        .success();

    let csv = fs::read_to_string(&output).unwrap();
    assert!(csv.starts_with("ownerName,businessName,address,"));
    assert!(csv.contains("JUAN DELA CRUZ"));
}

#[test]
fn extract_archives_report() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let input = write_permit(dir.path(), "permit.txt", PERMIT);

    permitscan()
        .arg("-c")
        .arg(&config)
        .arg("extract")
        .arg(&input)
        .args(["--format", "report", "--archive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EXTRACTED BUSINESS INFORMATION:"))
        .stderr(predicate::str::contains("Report written to"));

    let reports: Vec<_> = fs::read_dir(dir.path().join("reports"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].starts_with("ocr_results_"));
}

#[test]
fn extract_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    permitscan()
        .arg("-c")
        .arg(&config)
        .args(["extract", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn extract_rejects_pdf() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let input = write_permit(dir.path(), "permit.pdf", "%PDF-1.4\n");

    permitscan()
        .arg("-c")
        .arg(&config)
        .arg("extract")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("permitscan scan"));
}

#[test]
fn scan_image_without_api_key_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let input = dir.path().join("permit.png");
    fs::write(&input, b"\x89PNG\r\n\x1a\n").unwrap();

    permitscan()
        .arg("-c")
        .arg(&config)
        .arg("scan")
        .arg(&input)
        .arg("--no-archive")
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"success\": false"))
        .stderr(predicate::str::contains("Text recognition failed"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let inputs = dir.path().join("in");
    fs::create_dir_all(&inputs).unwrap();
    write_permit(&inputs, "a.txt", PERMIT);
    write_permit(&inputs, "b.txt", "Business TIN: 420-560-891-00000\n");
    write_permit(&inputs, "empty.txt", "   \n");
    let out = dir.path().join("out");

    permitscan()
        .arg("-c")
        .arg(&config)
        .arg("batch")
        .arg(format!("{}/*.txt", inputs.display()))
        .arg("--output-dir")
        .arg(&out)
        .args(["--summary", "--continue-on-error", "--no-archive", "-j", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful"));

    assert!(out.join("a.json").exists());
    assert!(out.join("b.json").exists());
    assert!(!out.join("empty.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("a.txt,success,JUAN DELA CRUZ,"));
    assert!(lines[3].starts_with("empty.txt,error,"));
    assert!(!dir.path().join("reports").exists());
}

#[test]
fn batch_stops_on_first_error() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    write_permit(dir.path(), "empty.txt", "");

    permitscan()
        .arg("-c")
        .arg(&config)
        .arg("batch")
        .arg(format!("{}/*.txt", dir.path().display()))
        .arg("--no-archive")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No text in file"));
}

#[test]
fn config_init_get_set() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");

    permitscan()
        .arg("-c")
        .arg(&path)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(path.exists());

    permitscan()
        .arg("-c")
        .arg(&path)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    permitscan()
        .arg("-c")
        .arg(&path)
        .args(["config", "set", "pdf.max_pages", "3"])
        .assert()
        .success();

    permitscan()
        .arg("-c")
        .arg(&path)
        .args(["config", "get", "pdf.max_pages"])
        .assert()
        .success()
        .stdout("3\n");
}
