//! End-to-end tests for the `adservices-lint` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture(project: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(project)
}

fn lint() -> Command {
    let mut cmd = Command::cargo_bin("adservices-lint").expect("adservices-lint binary");
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_clean_project_exits_zero() {
    lint()
        .arg(fixture("room/complete"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No AdServices lint issues found!"));
}

#[test]
fn test_errors_exit_one() {
    lint()
        .arg(fixture("room/broken"))
        .args(["--format", "compact"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("RD006"))
        .stdout(predicate::str::contains("RD007"));
}

#[test]
fn test_warnings_alone_exit_zero() {
    lint()
        .arg(fixture("room/broken"))
        .args(["--rules", "RoomExportSchemaDisabled", "--format", "compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RD002"))
        .stdout(predicate::str::contains("RD006").not());
}

#[test]
fn test_json_output() {
    let output = lint()
        .arg(fixture("compat"))
        .args(["--format", "json", "--quiet"])
        .output()
        .expect("failed to run");
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is not JSON");
    let codes: Vec<&str> = report["issues"]
        .as_array()
        .expect("issues array")
        .iter()
        .filter_map(|i| i["code"].as_str())
        .collect();
    assert!(codes.contains(&"BC001"));
    assert!(codes.contains(&"BC002"));
    assert!(codes.contains(&"BC003"));
}

#[test]
fn test_sarif_written_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.sarif");
    lint()
        .arg(fixture("restricted"))
        .args(["--format", "sarif", "--quiet", "--output"])
        .arg(&out)
        .assert()
        .code(1);

    let sarif: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(sarif["version"], "2.1.0");
    let results = sarif["runs"][0]["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
}

#[test]
fn test_baseline_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let baseline = dir.path().join("baseline.json");

    lint()
        .arg(fixture("compat"))
        .arg("--generate-baseline")
        .arg(&baseline)
        .assert()
        .code(1);
    assert!(baseline.exists());

    lint()
        .arg(fixture("compat"))
        .arg("--baseline")
        .arg(&baseline)
        .assert()
        .success()
        .stdout(predicate::str::contains("No AdServices lint issues found!"));
}

#[test]
fn test_config_file_disables_rules() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("lint.yml");
    std::fs::write(
        &config,
        "rules:\n  disabled:\n    - RD001\n    - RD003\n    - RD005\n    - RD006\n    - RD007\n",
    )
    .unwrap();

    lint()
        .arg(fixture("room/broken"))
        .arg("--config")
        .arg(&config)
        .args(["--format", "compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RD002"));
}

#[test]
fn test_unknown_rule_is_rejected() {
    lint()
        .arg(fixture("compat"))
        .args(["--disable", "NoSuchRule"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown rule"));
}

#[test]
fn test_list_rules() {
    lint()
        .arg("--list-rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("RD001"))
        .stdout(predicate::str::contains("RoomIncompleteMigrationPath"))
        .stdout(predicate::str::contains("AdServicesProcess"));
}

#[test]
fn test_parallel_mode_matches_sequential() {
    let run = |parallel: bool| {
        let mut cmd = lint();
        cmd.arg(fixture("room/broken"))
            .args(["--format", "json", "--quiet"]);
        if parallel {
            cmd.arg("--parallel");
        }
        let output = cmd.output().expect("failed to run");
        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        report["total_issues"].clone()
    };
    assert_eq!(run(false), run(true));
}
