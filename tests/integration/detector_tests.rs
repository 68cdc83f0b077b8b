//! Integration tests for the restricted API and backward-compatibility
//! detectors, run over the fixture projects.

use adservices_lint::analysis::detectors::{
    Detector, JobServiceInitializerDetector, ManifestProcessDetector, NewFileNamingDetector,
    RestrictedApiDetector,
};
use adservices_lint::analysis::{Analyzer, Confidence, Finding, LintIssue, Severity};
use adservices_lint::config::{Config, FileNamingConfig, ManifestConfig, RestrictedApiConfig};
use adservices_lint::discovery::{FileType, SourceFile};
use adservices_lint::graph::{Graph, GraphBuilder};
use std::path::PathBuf;

/// Get the path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Build a graph from fixture files, relative to the fixtures directory
fn build_graph(files: &[&str]) -> Graph {
    let mut builder = GraphBuilder::new();
    for name in files {
        let path = fixtures_path().join(name);
        if !path.exists() {
            panic!("Fixture not found: {:?}", path);
        }
        let file_type = FileType::from_path(&path).expect("unsupported fixture");
        builder
            .process_file(&SourceFile::new(path, file_type))
            .expect("Failed to process file");
    }
    builder.build()
}

fn subjects(findings: &[Finding]) -> Vec<&str> {
    findings.iter().map(|f| f.subject.as_str()).collect()
}

// ============================================================================
// Restricted API Tests
// ============================================================================

mod restricted_api_tests {
    use super::*;

    const FILES: &[&str] = &[
        "restricted/FlagReader.java",
        "restricted/PhFlags.java",
        "restricted/ConsentManager.kt",
    ];

    #[test]
    fn test_system_properties_outside_wrappers() {
        let graph = build_graph(FILES);
        let detector = RestrictedApiDetector::system_properties(&RestrictedApiConfig::default());
        let findings = detector.detect(&graph);

        // Both calls in FlagReader; suppression is applied by the analyzer
        assert_eq!(subjects(&findings), vec!["FlagReader", "FlagReader"]);
        assert!(findings.iter().all(|f| f.confidence == Confidence::High));
    }

    #[test]
    fn test_device_config_outside_wrappers() {
        let graph = build_graph(FILES);
        let detector = RestrictedApiDetector::device_config(&RestrictedApiConfig::default());
        let findings = detector.detect(&graph);

        assert_eq!(subjects(&findings), vec!["ConsentManager"]);
        assert!(findings[0].location.file.ends_with("ConsentManager.kt"));
    }

    #[test]
    fn test_analyzer_honors_suppress_lint() {
        let config = Config::default();
        let graph = build_graph(FILES);
        let findings = Analyzer::new(&config).analyze(&graph);

        let system_properties: Vec<_> = findings
            .iter()
            .filter(|f| f.issue == LintIssue::SystemPropertiesUsage)
            .collect();
        assert_eq!(system_properties.len(), 1);
        assert_eq!(system_properties[0].location.line, 7);
    }

    #[test]
    fn test_custom_allow_list() {
        let graph = build_graph(FILES);
        let config = RestrictedApiConfig {
            device_config_allowed: vec!["PhFlags".to_string(), "ConsentManager".to_string()],
            ..RestrictedApiConfig::default()
        };
        assert!(RestrictedApiDetector::device_config(&config)
            .detect(&graph)
            .is_empty());
    }
}

// ============================================================================
// JobService Initializer Tests
// ============================================================================

mod job_service_tests {
    use super::*;

    #[test]
    fn test_field_initializer_reported() {
        let graph = build_graph(&["compat/EpochJobService.java"]);
        let findings = JobServiceInitializerDetector::new().detect(&graph);

        // TAG is a constant and mExecutor has no initializer
        assert_eq!(subjects(&findings), vec!["EpochJobService.mWorker"]);
        assert_eq!(findings[0].severity, Severity::Error);
    }
}

// ============================================================================
// File Naming Tests
// ============================================================================

mod file_naming_tests {
    use super::*;

    #[test]
    fn test_unprefixed_names_reported() {
        let graph = build_graph(&["compat/FileStore.java"]);
        let findings = NewFileNamingDetector::new(&FileNamingConfig::default()).detect(&graph);
        assert_eq!(subjects(&findings), vec!["topics_prefs", "enrollment.db"]);
    }

    #[test]
    fn test_custom_prefix() {
        let graph = build_graph(&["compat/FileStore.java"]);
        let config = FileNamingConfig {
            required_prefix: "^(adservices|topics|enrollment)".to_string(),
        };
        assert!(NewFileNamingDetector::new(&config).detect(&graph).is_empty());
    }
}

// ============================================================================
// Manifest Process Tests
// ============================================================================

mod manifest_tests {
    use super::*;

    #[test]
    fn test_component_without_process() {
        let graph = build_graph(&["compat/AndroidManifest.xml"]);
        let findings = ManifestProcessDetector::new(ManifestConfig::default()).detect(&graph);

        assert_eq!(
            subjects(&findings),
            vec!["com.android.adservices.service.measurement.AttributionJobService"]
        );
        assert_eq!(findings[0].location.line, 8);
    }
}

// ============================================================================
// Whole-project Tests
// ============================================================================

mod analyzer_tests {
    use super::*;

    #[test]
    fn test_compat_project() {
        let config = Config::default();
        let graph = build_graph(&[
            "compat/EpochJobService.java",
            "compat/FileStore.java",
            "compat/AndroidManifest.xml",
        ]);
        let findings = Analyzer::new(&config).analyze(&graph);

        let mut issues: Vec<_> = findings.iter().map(|f| f.issue).collect();
        issues.sort();
        issues.dedup();
        assert_eq!(
            issues,
            vec![
                LintIssue::JobServiceInitializer,
                LintIssue::NewFileNaming,
                LintIssue::ManifestProcess,
            ]
        );
    }

    #[test]
    fn test_enabled_rules_restrict_the_run() {
        let mut config = Config::default();
        config.rules.enabled = vec!["BC003".to_string()];
        let graph = build_graph(&[
            "compat/EpochJobService.java",
            "compat/FileStore.java",
            "compat/AndroidManifest.xml",
        ]);
        let findings = Analyzer::new(&config).analyze(&graph);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].issue, LintIssue::ManifestProcess);
    }

    #[test]
    fn test_severity_override() {
        let mut config = Config::default();
        config
            .rules
            .severity
            .insert("NewAdServicesFile".to_string(), Severity::Info);
        let graph = build_graph(&["compat/FileStore.java"]);
        let findings = Analyzer::new(&config).analyze(&graph);
        assert!(!findings.is_empty());
        assert!(findings.iter().all(|f| f.severity == Severity::Info));
    }
}
