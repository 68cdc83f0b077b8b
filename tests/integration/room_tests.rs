//! Integration tests for the Room database migration rules
//!
//! Each fixture directory under `tests/fixtures/room` is a small project.

use adservices_lint::analysis::detectors::room::{
    migration_path, MigrationEdge, PathDefect, RoomScan, ScanPhase,
};
use adservices_lint::analysis::{Analyzer, Finding, LintIssue};
use adservices_lint::config::{Config, RoomConfig};
use adservices_lint::discovery::FileFinder;
use adservices_lint::graph::{Graph, GraphBuilder};
use std::path::PathBuf;

/// Get the path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn build_graph(project: &str, config: &Config) -> Graph {
    let root = fixtures_path().join(project);
    let files = FileFinder::new(config)
        .find_files(&root)
        .expect("Failed to discover files");
    let mut builder = GraphBuilder::new();
    for file in &files {
        builder.process_file(file).expect("Failed to process file");
    }
    builder.build()
}

fn analyze(project: &str) -> Vec<Finding> {
    let config = Config::default();
    let graph = build_graph(project, &config);
    Analyzer::new(&config).analyze(&graph)
}

fn summarize(findings: &[Finding]) -> Vec<(LintIssue, String)> {
    let mut pairs: Vec<_> = findings
        .iter()
        .map(|f| (f.issue, f.subject.clone()))
        .collect();
    pairs.sort();
    pairs
}

#[test]
fn test_complete_project_is_clean() {
    let findings = analyze("room/complete");
    assert!(findings.is_empty(), "unexpected findings: {:?}", findings);
}

#[test]
fn test_broken_project_reports_each_defect() {
    let findings = analyze("room/broken");
    let mut expected = vec![
        (LintIssue::MissingDatabaseAnnotation, "PlainDatabase".to_string()),
        (LintIssue::MissingVersionField, "PlainDatabase".to_string()),
        (LintIssue::DatabaseNotRegistered, "PlainDatabase".to_string()),
        (LintIssue::ExportSchemaDisabled, "LegacyDatabase".to_string()),
        (LintIssue::MissingAutoMigrations, "LegacyDatabase".to_string()),
        (LintIssue::DatabaseNotRegistered, "LegacyDatabase".to_string()),
        (LintIssue::IncompleteMigrationPath, "MeasurementDatabase".to_string()),
    ];
    expected.sort();
    assert_eq!(summarize(&findings), expected);
}

#[test]
fn test_incomplete_path_message_names_the_gap() {
    let findings = analyze("room/broken");
    let incomplete = findings
        .iter()
        .find(|f| f.issue == LintIssue::IncompleteMigrationPath)
        .expect("RD006 not reported");
    assert!(
        incomplete.message.contains("missing 2 -> 3"),
        "{}",
        incomplete.message
    );
    assert!(incomplete
        .location
        .file
        .ends_with("MeasurementDatabase.java"));
}

#[test]
fn test_missing_registration_class_reported_once() {
    let findings = analyze("room/missing_registration");
    assert_eq!(findings.len(), 1, "{:?}", findings);
    assert_eq!(findings[0].issue, LintIssue::RegistrationClassMissing);
    assert_eq!(findings[0].subject, "RoomDatabaseRegistration");
    assert!(findings[0].location.file.ends_with("SignalsDatabase.kt"));
}

#[test]
fn test_custom_registration_class() {
    let mut config = Config::default();
    config.room = RoomConfig {
        registration_class: "DatabaseCatalog".to_string(),
        ..RoomConfig::default()
    };
    let graph = build_graph("room/complete", &config);
    let findings = Analyzer::new(&config).analyze(&graph);
    assert_eq!(
        summarize(&findings),
        vec![(
            LintIssue::RegistrationClassMissing,
            "DatabaseCatalog".to_string()
        )]
    );
}

#[test]
fn test_scan_worklist_covers_every_database() {
    let config = Config::default();
    let graph = build_graph("room/broken", &config);
    let mut scan = RoomScan::new(&graph, &config.room);
    scan.step();
    assert_eq!(scan.phase(), ScanPhase::Verify);

    let mut names: Vec<_> = scan.worklist().iter().map(|d| d.name.as_str()).collect();
    names.sort();
    assert_eq!(
        names,
        vec!["LegacyDatabase", "MeasurementDatabase", "PlainDatabase"]
    );
}

#[test]
fn test_disabled_rule_is_not_reported() {
    let mut config = Config::default();
    config.rules.disabled = vec!["RoomDatabaseNotRegistered".to_string()];
    let graph = build_graph("room/broken", &config);
    let findings = Analyzer::new(&config).analyze(&graph);
    assert!(findings
        .iter()
        .all(|f| f.issue != LintIssue::DatabaseNotRegistered));
    assert!(!findings.is_empty());
}

#[test]
fn test_migration_path_properties() {
    let chain = |target: i64| -> Vec<MigrationEdge> {
        (1..target).map(|v| MigrationEdge::new(v, v + 1)).collect()
    };

    for target in 1..8 {
        assert!(migration_path::validate(&chain(target), target));
    }
    assert!(!migration_path::validate(&chain(4), 5));
    assert!(!migration_path::validate(&chain(6), 5));
    assert!(!migration_path::validate(&[], 2));

    assert!(matches!(
        migration_path::check(&[MigrationEdge::new(1, 3)], 3),
        Err(PathDefect::UnexpectedEdge { .. })
    ));
}
