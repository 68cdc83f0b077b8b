//! Per-class checks on a single Room database declaration

use super::migration_path::{self, MigrationEdge};
use crate::analysis::{Finding, LintIssue};
use crate::config::RoomConfig;
use crate::graph::{Annotation, AnnotationArgument, Declaration, Expr, Graph};
use tracing::debug;

/// What was learned about one database class
#[derive(Debug, Default)]
pub struct DatabaseReport {
    /// `DATABASE_VERSION` value, when present and resolvable
    pub field_version: Option<i64>,
    /// `@Database(version = ..)`, when resolvable
    pub annotation_version: Option<i64>,
    /// Declared edges; `None` when absent or not statically known
    pub migrations: Option<Vec<MigrationEdge>>,
    pub findings: Vec<Finding>,
}

impl DatabaseReport {
    /// Version the migration chain must reach
    pub fn target_version(&self) -> Option<i64> {
        self.field_version.or(self.annotation_version)
    }
}

pub struct DatabaseInspector<'g> {
    graph: &'g Graph,
    config: &'g RoomConfig,
}

impl<'g> DatabaseInspector<'g> {
    pub fn new(graph: &'g Graph, config: &'g RoomConfig) -> Self {
        Self { graph, config }
    }

    pub fn inspect(&self, class: &Declaration) -> DatabaseReport {
        let mut report = DatabaseReport::default();
        let annotation = class.annotation(&self.config.database_annotation);

        if annotation.is_none() {
            report.findings.push(Finding::new(
                LintIssue::MissingDatabaseAnnotation,
                class.location.clone(),
                &class.name,
            ));
        }

        let version_field = self
            .graph
            .fields_of(class)
            .into_iter()
            .find(|f| f.name == self.config.version_field);
        match version_field {
            Some(field) => {
                report.field_version = field
                    .initializer
                    .as_ref()
                    .and_then(|value| self.graph.resolve_int(Some(class), value));
            }
            None => report.findings.push(
                Finding::new(
                    LintIssue::MissingVersionField,
                    class.location.clone(),
                    &class.name,
                )
                .with_message(format!(
                    "Room database '{}' must declare a {} constant",
                    class.name, self.config.version_field
                )),
            ),
        }

        let Some(annotation) = annotation else {
            return report;
        };

        if let Some(export) = annotation.argument("exportSchema") {
            let value = self.graph.resolve_constant(Some(class), &export.value);
            if value.as_ref().and_then(Expr::as_bool) == Some(false) {
                report.findings.push(Finding::new(
                    LintIssue::ExportSchemaDisabled,
                    export.location.clone(),
                    &class.name,
                ));
            }
        }

        if let Some(version) = annotation.argument("version") {
            report.annotation_version = self.graph.resolve_int(Some(class), &version.value);
            if let (Some(declared), Some(field)) = (report.annotation_version, report.field_version)
            {
                if declared != field {
                    report.findings.push(
                        Finding::new(LintIssue::VersionMismatch, version.location.clone(), &class.name)
                            .with_message(format!(
                                "@Database version of '{}' is {} but {} is {}",
                                class.name, declared, self.config.version_field, field
                            )),
                    );
                }
            }
        }

        let Some(target) = report.target_version() else {
            debug!("{}: version not statically known, skipping migrations", class.name);
            return report;
        };

        match annotation.argument("autoMigrations") {
            None if target > 1 => report.findings.push(
                Finding::new(
                    LintIssue::MissingAutoMigrations,
                    annotation.location.clone(),
                    &class.name,
                )
                .with_message(format!(
                    "Room database '{}' is at version {} but declares no autoMigrations",
                    class.name, target
                )),
            ),
            None => {}
            Some(argument) => {
                report.migrations = self.migration_edges(class, argument);
                if let Some(edges) = &report.migrations {
                    if let Err(defect) = migration_path::check(edges, target) {
                        report.findings.push(
                            Finding::new(
                                LintIssue::IncompleteMigrationPath,
                                argument.location.clone(),
                                &class.name,
                            )
                            .with_message(format!(
                                "autoMigrations of '{}' do not reach version {}: {}",
                                class.name, target, defect
                            )),
                        );
                    }
                }
            }
        }

        report
    }

    /// Edges declared by `autoMigrations`; `None` if any operand is unknown
    fn migration_edges(
        &self,
        class: &Declaration,
        argument: &AnnotationArgument,
    ) -> Option<Vec<MigrationEdge>> {
        let items: Vec<&Expr> = match &argument.value {
            Expr::Array(items) => items.iter().collect(),
            single @ Expr::Annotation(_) => vec![single],
            _ => return None,
        };

        items
            .into_iter()
            .map(|item| match item {
                Expr::Annotation(migration) if migration.is(&self.config.migration_annotation) => {
                    self.edge(class, migration)
                }
                _ => None,
            })
            .collect()
    }

    fn edge(&self, class: &Declaration, migration: &Annotation) -> Option<MigrationEdge> {
        let from = self
            .graph
            .resolve_int(Some(class), &migration.argument_at("from", 0)?.value)?;
        let to = self
            .graph
            .resolve_int(Some(class), &migration.argument_at("to", 1)?.value)?;
        Some(MigrationEdge::new(from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::detectors::test_support::graph_from;

    fn inspect(name: &str, source: &str) -> DatabaseReport {
        let graph = graph_from(&[(name, source)]);
        let config = RoomConfig::default();
        let class = graph
            .types()
            .find(|t| graph.is_subtype_of(t, "RoomDatabase"))
            .expect("no database class")
            .clone();
        DatabaseInspector::new(&graph, &config).inspect(&class)
    }

    fn issues(report: &DatabaseReport) -> Vec<LintIssue> {
        report.findings.iter().map(|f| f.issue).collect()
    }

    #[test]
    fn test_complete_java_database() {
        let report = inspect(
            "TopicsDatabase.java",
            r#"
@Database(
    entities = {Topic.class},
    version = TopicsDatabase.DATABASE_VERSION,
    autoMigrations = {
        @AutoMigration(from = 1, to = 2),
        @AutoMigration(from = 2, to = 3)
    })
public abstract class TopicsDatabase extends RoomDatabase {
    public static final int DATABASE_VERSION = 3;
}
"#,
        );
        assert!(report.findings.is_empty(), "{:?}", report.findings);
        assert_eq!(report.field_version, Some(3));
        assert_eq!(report.annotation_version, Some(3));
        assert_eq!(report.migrations.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_missing_annotation_and_field() {
        let report = inspect(
            "Plain.java",
            "public abstract class Plain extends RoomDatabase {}",
        );
        assert_eq!(
            issues(&report),
            vec![LintIssue::MissingDatabaseAnnotation, LintIssue::MissingVersionField]
        );
    }

    #[test]
    fn test_export_schema_disabled() {
        let report = inspect(
            "Db.java",
            r#"
@Database(entities = {A.class}, version = Db.DATABASE_VERSION, exportSchema = false)
public abstract class Db extends RoomDatabase {
    public static final int DATABASE_VERSION = 1;
}
"#,
        );
        assert_eq!(issues(&report), vec![LintIssue::ExportSchemaDisabled]);
    }

    #[test]
    fn test_version_mismatch() {
        let report = inspect(
            "Db.java",
            r#"
@Database(entities = {A.class}, version = 2, autoMigrations = {@AutoMigration(from = 1, to = 2)})
public abstract class Db extends RoomDatabase {
    public static final int DATABASE_VERSION = 3;
}
"#,
        );
        assert_eq!(
            issues(&report),
            vec![LintIssue::VersionMismatch, LintIssue::IncompleteMigrationPath]
        );
        assert!(report.findings[0].message.contains("is 2 but DATABASE_VERSION is 3"));
    }

    #[test]
    fn test_missing_auto_migrations_above_version_one() {
        let report = inspect(
            "Db.java",
            r#"
@Database(entities = {A.class}, version = Db.DATABASE_VERSION)
public abstract class Db extends RoomDatabase {
    public static final int DATABASE_VERSION = 2;
}
"#,
        );
        assert_eq!(issues(&report), vec![LintIssue::MissingAutoMigrations]);
    }

    #[test]
    fn test_version_one_needs_no_migrations() {
        let report = inspect(
            "Db.java",
            r#"
@Database(entities = {A.class}, version = Db.DATABASE_VERSION)
public abstract class Db extends RoomDatabase {
    public static final int DATABASE_VERSION = 1;
}
"#,
        );
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_gap_in_migrations() {
        let report = inspect(
            "Db.java",
            r#"
@Database(
    entities = {A.class},
    version = Db.DATABASE_VERSION,
    autoMigrations = {@AutoMigration(from = 1, to = 2), @AutoMigration(from = 3, to = 4)})
public abstract class Db extends RoomDatabase {
    public static final int DATABASE_VERSION = 4;
}
"#,
        );
        assert_eq!(issues(&report), vec![LintIssue::IncompleteMigrationPath]);
        assert!(report.findings[0]
            .message
            .contains("expected a migration 2 -> 3 but found 3 -> 4"));
    }

    #[test]
    fn test_unresolved_operand_fails_open() {
        let report = inspect(
            "Db.java",
            r#"
@Database(
    entities = {A.class},
    version = Db.DATABASE_VERSION,
    autoMigrations = {@AutoMigration(from = Versions.V1, to = 2)})
public abstract class Db extends RoomDatabase {
    public static final int DATABASE_VERSION = 5;
}
"#,
        );
        assert!(report.findings.is_empty());
        assert!(report.migrations.is_none());
    }

    #[test]
    fn test_kotlin_companion_version() {
        let report = inspect(
            "SignalsDatabase.kt",
            r#"
@Database(
    entities = [Signal::class],
    version = SignalsDatabase.DATABASE_VERSION,
    autoMigrations = [AutoMigration(from = 1, to = 2)]
)
abstract class SignalsDatabase : RoomDatabase() {
    companion object {
        const val DATABASE_VERSION = 2
    }
}
"#,
        );
        assert!(report.findings.is_empty(), "{:?}", report.findings);
        assert_eq!(report.target_version(), Some(2));
    }

    #[test]
    fn test_kotlin_positional_gap() {
        let report = inspect(
            "DbK.kt",
            r#"
@Database(
    entities = [A::class],
    version = DbK.DATABASE_VERSION,
    autoMigrations = [AutoMigration(1, 3)]
)
abstract class DbK : RoomDatabase() {
    companion object {
        const val DATABASE_VERSION = 3
    }
}
"#,
        );
        assert_eq!(issues(&report), vec![LintIssue::IncompleteMigrationPath]);
        assert_eq!(report.migrations, Some(vec![MigrationEdge::new(1, 3)]));
    }

    #[test]
    fn test_migration_operands_from_constants() {
        let report = inspect(
            "Db.java",
            r#"
@Database(
    entities = {A.class},
    version = Db.DATABASE_VERSION,
    autoMigrations = {@AutoMigration(from = Db.V1, to = Db.DATABASE_VERSION)})
public abstract class Db extends RoomDatabase {
    static final int V1 = 1;
    public static final int DATABASE_VERSION = V1 + 1;
}
"#,
        );
        // `V1 + 1` is arithmetic, not a constant we evaluate
        assert!(report.findings.is_empty());
        assert_eq!(report.field_version, None);
    }
}
