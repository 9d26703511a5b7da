//! Integration tests for the `ucx` binary

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn scenario() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios/mid.toml")
}

const BROKEN: &str = r#"
[horizon]
steps = 2

[[unit]]
timeframe = 2020
site = "Mid"
unit = "Gas"
cap-lo = 50.0
cap-up = 10.0
min-fraction = 1.5
"#;

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = cargo_bin_cmd!("ucx");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("audit"))
        .stdout(predicate::str::contains("solve"));
}

#[test]
fn test_check_sample_scenario() {
    let mut cmd = cargo_bin_cmd!("ucx");
    cmd.arg("check")
        .arg(scenario())
        .assert()
        .success()
        .stdout(predicate::str::contains("3 units"))
        .stdout(predicate::str::contains("Diagnostics: No issues"));
}

#[test]
fn test_check_reports_every_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, BROKEN).unwrap();

    let mut cmd = cargo_bin_cmd!("ucx");
    cmd.arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("cap-lo (50) exceeds cap-up (10)"))
        .stdout(predicate::str::contains("min-fraction must lie in [0, 1]"))
        .stderr(predicate::str::contains("configuration error(s)"));
}

#[test]
fn test_check_missing_file() {
    let mut cmd = cargo_bin_cmd!("ucx");
    cmd.args(["check", "does-not-exist.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reading scenario file"));
}

#[test]
fn test_audit_prints_big_m_table() {
    let mut cmd = cargo_bin_cmd!("ucx");
    cmd.arg("audit")
        .arg(scenario())
        .assert()
        .success()
        .stdout(predicate::str::contains("Big-M constants:"))
        .stdout(predicate::str::contains("part_load_offset"))
        .stdout(predicate::str::contains("2020.Mid.Coal Plant"));
}

#[test]
fn test_audit_json() {
    let output = cargo_bin_cmd!("ucx")
        .arg("audit")
        .arg(scenario())
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert!(entries
        .iter()
        .any(|e| e["family"] == "ramp_exceptions" && e["entity"] == "2020.Mid.Coal Plant"));
}

#[test]
fn test_solve_writes_json() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("solution.json");

    let mut cmd = cargo_bin_cmd!("ucx");
    cmd.arg("solve")
        .arg(scenario())
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: optimal"))
        .stdout(predicate::str::contains("Operating States:"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["status"], "optimal");
    assert_eq!(json["solver"], "microlp");
    let gas = json["units"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["unit"] == "2020.Mid.Gas Turbine")
        .unwrap();
    let throughput = gas["throughput"].as_array().unwrap();
    // (label, value) pairs, t0 included
    assert_eq!(throughput.len(), 7);
    assert!((throughput[3][1].as_f64().unwrap() - 20.0).abs() < 1e-5);
}

#[test]
fn test_solve_unknown_solver() {
    let mut cmd = cargo_bin_cmd!("ucx");
    cmd.arg("solve")
        .arg(scenario())
        .args(["--solver", "gurobi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown solver 'gurobi'"));
}

#[test]
fn test_solve_relaxed() {
    let mut cmd = cargo_bin_cmd!("ucx");
    cmd.arg("solve")
        .arg(scenario())
        .arg("--relax")
        .assert()
        .success()
        .stdout(predicate::str::contains("Solver: microlp"));
}
