//! Room database migration rules (RD001-RD008)
//!
//! The scan runs in two phases over the same graph. COLLECT inspects every
//! `RoomDatabase` subclass on its own and queues it on a worklist. VERIFY
//! runs only when the worklist is non-empty and cross-checks the queued
//! databases against the registration class.

mod database;
pub mod migration_path;
mod registration;

pub use database::{DatabaseInspector, DatabaseReport};
pub use migration_path::{MigrationEdge, PathDefect};
pub use registration::RegistrationIndex;

use super::Detector;
use crate::analysis::{Finding, LintIssue};
use crate::config::RoomConfig;
use crate::graph::{DeclarationId, DeclarationKind, Graph, Location};
use tracing::debug;

const ISSUES: &[LintIssue] = &[
    LintIssue::MissingDatabaseAnnotation,
    LintIssue::ExportSchemaDisabled,
    LintIssue::MissingVersionField,
    LintIssue::VersionMismatch,
    LintIssue::MissingAutoMigrations,
    LintIssue::IncompleteMigrationPath,
    LintIssue::DatabaseNotRegistered,
    LintIssue::RegistrationClassMissing,
];

/// Where a scan is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Collect,
    Verify,
    Done,
}

/// A database found during COLLECT
#[derive(Debug, Clone)]
pub struct TrackedDatabase {
    pub id: DeclarationId,
    pub name: String,
    pub location: Location,
}

/// Databases awaiting the registration cross-check
#[derive(Debug, Default)]
pub struct DatabaseWorklist {
    databases: Vec<TrackedDatabase>,
}

impl DatabaseWorklist {
    pub fn push(&mut self, database: TrackedDatabase) {
        self.databases.push(database);
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.databases.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedDatabase> {
        self.databases.iter()
    }

    /// Earliest database by file then line
    pub fn first(&self) -> Option<&TrackedDatabase> {
        self.databases.iter().min_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.line.cmp(&b.location.line))
        })
    }
}

/// One run of the two-phase scan. Owns all state; the detector itself is
/// stateless and may be reused.
pub struct RoomScan<'g> {
    graph: &'g Graph,
    config: &'g RoomConfig,
    phase: ScanPhase,
    worklist: DatabaseWorklist,
    findings: Vec<Finding>,
}

impl<'g> RoomScan<'g> {
    pub fn new(graph: &'g Graph, config: &'g RoomConfig) -> Self {
        Self {
            graph,
            config,
            phase: ScanPhase::Collect,
            worklist: DatabaseWorklist::default(),
            findings: Vec::new(),
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn worklist(&self) -> &DatabaseWorklist {
        &self.worklist
    }

    /// Advance one phase
    pub fn step(&mut self) {
        self.phase = match self.phase {
            ScanPhase::Collect => {
                self.collect();
                if self.worklist.is_empty() {
                    ScanPhase::Done
                } else {
                    ScanPhase::Verify
                }
            }
            ScanPhase::Verify => {
                self.verify();
                ScanPhase::Done
            }
            ScanPhase::Done => ScanPhase::Done,
        };
    }

    pub fn run(mut self) -> Vec<Finding> {
        while self.phase != ScanPhase::Done {
            self.step();
        }
        self.findings
    }

    fn collect(&mut self) {
        let inspector = DatabaseInspector::new(self.graph, self.config);
        for class in self.graph.types() {
            if class.kind != DeclarationKind::Class
                || !self.graph.is_subtype_of(class, &self.config.base_class)
            {
                continue;
            }
            debug!("Room database: {}", class.name);
            let report = inspector.inspect(class);
            self.findings.extend(report.findings);
            self.worklist.push(TrackedDatabase {
                id: class.id.clone(),
                name: class.name.clone(),
                location: class.location.clone(),
            });
        }
    }

    fn verify(&mut self) {
        let index = RegistrationIndex::collect(self.graph, &self.config.registration_class);

        if !index.is_found() {
            if let Some(first) = self.worklist.first() {
                self.findings.push(
                    Finding::new(
                        LintIssue::RegistrationClassMissing,
                        first.location.clone(),
                        &self.config.registration_class,
                    )
                    .with_message(format!(
                        "Database registration class '{}' was not found; {} Room database(s) cannot be verified",
                        self.config.registration_class,
                        self.worklist.len()
                    )),
                );
            }
            return;
        }

        for database in self.worklist.iter() {
            let qualified = self
                .graph
                .get_declaration(&database.id)
                .and_then(|d| self.graph.qualified_name(d));
            if !index.is_registered(&database.name, qualified.as_deref()) {
                self.findings.push(
                    Finding::new(
                        LintIssue::DatabaseNotRegistered,
                        database.location.clone(),
                        &database.name,
                    )
                    .with_message(format!(
                        "Room database '{}' is not registered in {}",
                        database.name, self.config.registration_class
                    )),
                );
            }
        }
    }
}

/// Detector for the Room migration rules
pub struct RoomDatabaseMigrationDetector {
    config: RoomConfig,
}

impl RoomDatabaseMigrationDetector {
    pub fn new(config: RoomConfig) -> Self {
        Self { config }
    }
}

impl Default for RoomDatabaseMigrationDetector {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

impl Detector for RoomDatabaseMigrationDetector {
    fn name(&self) -> &'static str {
        "room-database-migration"
    }

    fn issues(&self) -> &'static [LintIssue] {
        ISSUES
    }

    fn detect(&self, graph: &Graph) -> Vec<Finding> {
        RoomScan::new(graph, &self.config).run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::detectors::test_support::graph_from;

    const TOPICS_DB: &str = r#"
@Database(entities = {Topic.class}, version = TopicsDatabase.DATABASE_VERSION)
public abstract class TopicsDatabase extends RoomDatabase {
    public static final int DATABASE_VERSION = 1;
}
"#;

    const MEASUREMENT_DB: &str = r#"
@Database(entities = {Event.class}, version = MeasurementDatabase.DATABASE_VERSION)
public abstract class MeasurementDatabase extends RoomDatabase {
    public static final int DATABASE_VERSION = 1;
}
"#;

    const REGISTRATION: &str = r#"
public class RoomDatabaseRegistration {
    TopicsDatabase mTopicsDatabase;
}
"#;

    fn issues(findings: &[Finding]) -> Vec<LintIssue> {
        findings.iter().map(|f| f.issue).collect()
    }

    #[test]
    fn test_no_databases_skips_verify() {
        let graph = graph_from(&[("A.java", "class A {}")]);
        let config = RoomConfig::default();
        let mut scan = RoomScan::new(&graph, &config);
        scan.step();
        assert_eq!(scan.phase(), ScanPhase::Done);
        assert!(scan.worklist().is_empty());
        assert!(scan.run().is_empty());
    }

    #[test]
    fn test_phases_advance_collect_verify_done() {
        let graph = graph_from(&[
            ("TopicsDatabase.java", TOPICS_DB),
            ("RoomDatabaseRegistration.java", REGISTRATION),
        ]);
        let config = RoomConfig::default();
        let mut scan = RoomScan::new(&graph, &config);
        assert_eq!(scan.phase(), ScanPhase::Collect);
        scan.step();
        assert_eq!(scan.phase(), ScanPhase::Verify);
        assert_eq!(scan.worklist().len(), 1);
        scan.step();
        assert_eq!(scan.phase(), ScanPhase::Done);
        assert!(scan.run().is_empty());
    }

    #[test]
    fn test_unregistered_database() {
        let graph = graph_from(&[
            ("TopicsDatabase.java", TOPICS_DB),
            ("MeasurementDatabase.java", MEASUREMENT_DB),
            ("RoomDatabaseRegistration.java", REGISTRATION),
        ]);
        let findings = RoomDatabaseMigrationDetector::default().detect(&graph);
        assert_eq!(issues(&findings), vec![LintIssue::DatabaseNotRegistered]);
        assert_eq!(findings[0].subject, "MeasurementDatabase");
    }

    #[test]
    fn test_missing_registration_reported_once_at_first_database() {
        let graph = graph_from(&[
            ("b/TopicsDatabase.java", TOPICS_DB),
            ("a/MeasurementDatabase.java", MEASUREMENT_DB),
        ]);
        let findings = RoomDatabaseMigrationDetector::default().detect(&graph);
        assert_eq!(issues(&findings), vec![LintIssue::RegistrationClassMissing]);
        assert_eq!(
            findings[0].location.file.to_string_lossy(),
            "a/MeasurementDatabase.java"
        );
    }

    #[test]
    fn test_indirect_subclass_is_tracked() {
        let graph = graph_from(&[
            (
                "BaseDatabase.java",
                "public abstract class BaseDatabase extends RoomDatabase {}",
            ),
            (
                "AppDatabase.java",
                r#"
@Database(entities = {A.class}, version = AppDatabase.DATABASE_VERSION)
public abstract class AppDatabase extends BaseDatabase {
    public static final int DATABASE_VERSION = 1;
}
"#,
            ),
            ("RoomDatabaseRegistration.java", REGISTRATION),
        ]);
        let findings = RoomDatabaseMigrationDetector::default().detect(&graph);
        let app: Vec<_> = findings
            .iter()
            .filter(|f| f.subject == "AppDatabase")
            .map(|f| f.issue)
            .collect();
        assert_eq!(app, vec![LintIssue::DatabaseNotRegistered]);
    }

    #[test]
    fn test_detector_is_reusable() {
        let graph = graph_from(&[("TopicsDatabase.java", TOPICS_DB)]);
        let detector = RoomDatabaseMigrationDetector::default();
        let first = detector.detect(&graph);
        let second = detector.detect(&graph);
        assert_eq!(issues(&first), issues(&second));
        assert_eq!(first.len(), 1);
    }
}
