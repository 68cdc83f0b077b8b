pub mod detectors;
mod suppression;

pub use suppression::is_suppressed;

use crate::config::Config;
use crate::graph::{Graph, Location};
use detectors::Detector;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info};

/// How sure a detector is that the finding is real
///
/// Symbols matched through an explicit import or a qualified name are
/// `High`; symbols matched through a wildcard import or the file's own
/// package are `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Confidence::Low),
            "medium" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            other => Err(format!("unknown confidence level '{}'", other)),
        }
    }
}

/// A single rule violation
#[derive(Debug, Clone)]
pub struct Finding {
    pub issue: LintIssue,

    /// Where the violation is reported
    pub location: Location,

    /// Class, field, call or component the finding is about
    pub subject: String,

    pub severity: Severity,

    pub confidence: Confidence,

    pub message: String,
}

impl Finding {
    pub fn new(issue: LintIssue, location: Location, subject: impl Into<String>) -> Self {
        let subject = subject.into();
        Self {
            message: issue.default_message(&subject),
            severity: issue.default_severity(),
            confidence: Confidence::High,
            issue,
            location,
            subject,
        }
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.message = message;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }
}

/// Every rule the analyzer knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LintIssue {
    /// RoomDatabase subclass without `@Database`
    MissingDatabaseAnnotation,

    /// `@Database(exportSchema = false)`
    ExportSchemaDisabled,

    /// No `DATABASE_VERSION` constant on the database
    MissingVersionField,

    /// `@Database(version)` disagrees with `DATABASE_VERSION`
    VersionMismatch,

    /// Version above 1 without an `autoMigrations` attribute
    MissingAutoMigrations,

    /// `autoMigrations` does not cover every step up to the version
    IncompleteMigrationPath,

    /// Database not referenced by the registration class
    DatabaseNotRegistered,

    /// Registration class not found in the project
    RegistrationClassMissing,

    /// Direct use of `android.os.SystemProperties`
    SystemPropertiesUsage,

    /// Direct use of `android.provider.DeviceConfig`
    DeviceConfigUsage,

    /// Class-loading field initializer in a `JobService`
    JobServiceInitializer,

    /// Persisted file without the `adservices` prefix
    NewFileNaming,

    /// Manifest component outside the AdServices process
    ManifestProcess,
}

impl LintIssue {
    pub fn all() -> &'static [LintIssue] {
        &[
            LintIssue::MissingDatabaseAnnotation,
            LintIssue::ExportSchemaDisabled,
            LintIssue::MissingVersionField,
            LintIssue::VersionMismatch,
            LintIssue::MissingAutoMigrations,
            LintIssue::IncompleteMigrationPath,
            LintIssue::DatabaseNotRegistered,
            LintIssue::RegistrationClassMissing,
            LintIssue::SystemPropertiesUsage,
            LintIssue::DeviceConfigUsage,
            LintIssue::JobServiceInitializer,
            LintIssue::NewFileNaming,
            LintIssue::ManifestProcess,
        ]
    }

    pub fn code(&self) -> &'static str {
        match self {
            LintIssue::MissingDatabaseAnnotation => "RD001",
            LintIssue::ExportSchemaDisabled => "RD002",
            LintIssue::MissingVersionField => "RD003",
            LintIssue::VersionMismatch => "RD004",
            LintIssue::MissingAutoMigrations => "RD005",
            LintIssue::IncompleteMigrationPath => "RD006",
            LintIssue::DatabaseNotRegistered => "RD007",
            LintIssue::RegistrationClassMissing => "RD008",
            LintIssue::SystemPropertiesUsage => "AS001",
            LintIssue::DeviceConfigUsage => "AS002",
            LintIssue::JobServiceInitializer => "BC001",
            LintIssue::NewFileNaming => "BC002",
            LintIssue::ManifestProcess => "BC003",
        }
    }

    /// Identifier accepted by `@SuppressLint`, `tools:ignore` and the config
    pub fn name(&self) -> &'static str {
        match self {
            LintIssue::MissingDatabaseAnnotation => "RoomDatabaseMissingAnnotation",
            LintIssue::ExportSchemaDisabled => "RoomExportSchemaDisabled",
            LintIssue::MissingVersionField => "RoomMissingVersionField",
            LintIssue::VersionMismatch => "RoomVersionMismatch",
            LintIssue::MissingAutoMigrations => "RoomMissingAutoMigrations",
            LintIssue::IncompleteMigrationPath => "RoomIncompleteMigrationPath",
            LintIssue::DatabaseNotRegistered => "RoomDatabaseNotRegistered",
            LintIssue::RegistrationClassMissing => "RoomRegistrationMissing",
            LintIssue::SystemPropertiesUsage => "AvoidSystemPropertiesUsage",
            LintIssue::DeviceConfigUsage => "AvoidDeviceConfigUsage",
            LintIssue::JobServiceInitializer => "JobServiceFieldInitializer",
            LintIssue::NewFileNaming => "NewAdServicesFile",
            LintIssue::ManifestProcess => "AdServicesProcess",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            LintIssue::MissingDatabaseAnnotation
            | LintIssue::ExportSchemaDisabled
            | LintIssue::MissingVersionField
            | LintIssue::VersionMismatch
            | LintIssue::MissingAutoMigrations
            | LintIssue::IncompleteMigrationPath
            | LintIssue::DatabaseNotRegistered
            | LintIssue::RegistrationClassMissing => "Room Database",
            LintIssue::SystemPropertiesUsage | LintIssue::DeviceConfigUsage => "Restricted API",
            LintIssue::JobServiceInitializer
            | LintIssue::NewFileNaming
            | LintIssue::ManifestProcess => "Backward Compatibility",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            LintIssue::ExportSchemaDisabled => Severity::Warning,
            LintIssue::RegistrationClassMissing => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn default_message(&self, subject: &str) -> String {
        match self {
            LintIssue::MissingDatabaseAnnotation => {
                format!("Room database '{}' is missing the @Database annotation", subject)
            }
            LintIssue::ExportSchemaDisabled => format!(
                "Room database '{}' sets exportSchema = false; exported schemas are required for auto migration",
                subject
            ),
            LintIssue::MissingVersionField => format!(
                "Room database '{}' must declare a DATABASE_VERSION constant",
                subject
            ),
            LintIssue::VersionMismatch => format!(
                "@Database version of '{}' must reference DATABASE_VERSION",
                subject
            ),
            LintIssue::MissingAutoMigrations => format!(
                "Room database '{}' is above version 1 but declares no autoMigrations",
                subject
            ),
            LintIssue::IncompleteMigrationPath => format!(
                "autoMigrations of '{}' do not cover every version step",
                subject
            ),
            LintIssue::DatabaseNotRegistered => format!(
                "Room database '{}' is not registered in the database registration class",
                subject
            ),
            LintIssue::RegistrationClassMissing => {
                format!("Database registration class '{}' was not found", subject)
            }
            LintIssue::SystemPropertiesUsage => format!(
                "'{}' uses android.os.SystemProperties directly; read flags through the flag wrappers",
                subject
            ),
            LintIssue::DeviceConfigUsage => format!(
                "'{}' uses android.provider.DeviceConfig directly; read flags through PhFlags",
                subject
            ),
            LintIssue::JobServiceInitializer => format!(
                "Field '{}' of a JobService is initialized at construction; defer it to onStartJob",
                subject
            ),
            LintIssue::NewFileNaming => format!(
                "Persisted file '{}' must be named with the adservices prefix",
                subject
            ),
            LintIssue::ManifestProcess => format!(
                "Component '{}' must run in the AdServices process",
                subject
            ),
        }
    }
}

impl std::fmt::Display for LintIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for LintIssue {
    type Err = String;

    /// Accepts a code (`RD006`) or a name (`RoomIncompleteMigrationPath`),
    /// case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        LintIssue::all()
            .iter()
            .copied()
            .find(|issue| issue.code().eq_ignore_ascii_case(s) || issue.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown rule '{}'", s))
    }
}

/// Severity levels for findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Runs every enabled detector over a graph and post-processes the results
pub struct Analyzer<'a> {
    config: &'a Config,
    detectors: Vec<Box<dyn Detector>>,
}

impl<'a> Analyzer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            detectors: detectors::all(config),
        }
    }

    pub fn analyze(&self, graph: &Graph) -> Vec<Finding> {
        let mut findings = Vec::new();

        for detector in &self.detectors {
            if !detector
                .issues()
                .iter()
                .any(|issue| self.config.is_rule_enabled(*issue))
            {
                debug!("Skipping {} (all rules disabled)", detector.name());
                continue;
            }
            let found = detector.detect(graph);
            debug!("{}: {} findings", detector.name(), found.len());
            findings.extend(found);
        }

        let total = findings.len();
        let mut findings: Vec<Finding> = findings
            .into_iter()
            .filter(|f| self.config.is_rule_enabled(f.issue))
            .filter(|f| !is_suppressed(graph, f))
            .map(|f| match self.config.severity_override(f.issue) {
                Some(severity) => f.with_severity(severity),
                None => f,
            })
            .collect();

        findings.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.line.cmp(&b.location.line))
                .then(a.location.column.cmp(&b.location.column))
                .then(a.issue.cmp(&b.issue))
        });

        info!(
            "{} findings ({} disabled or suppressed)",
            findings.len(),
            total - findings.len()
        );
        findings
    }
}
