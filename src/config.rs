//! Configuration loading
//!
//! Looked up from `--config` or, failing that, from the project root under
//! one of [`DEFAULT_CONFIG_FILES`]. Every section is optional.

use crate::analysis::{LintIssue, Severity};
use miette::Diagnostic;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    ".adservices-lint.yml",
    ".adservices-lint.yaml",
    "adservices-lint.toml",
];

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    #[diagnostic(code(adservices_lint::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {path}: {message}")]
    #[diagnostic(code(adservices_lint::config::yaml))]
    Yaml { path: PathBuf, message: String },

    #[error("invalid TOML in {path}: {message}")]
    #[diagnostic(code(adservices_lint::config::toml))]
    Toml { path: PathBuf, message: String },

    #[error("unsupported config format: {path}")]
    #[diagnostic(
        code(adservices_lint::config::format),
        help("use a .yml, .yaml or .toml file")
    )]
    UnsupportedFormat { path: PathBuf },

    #[error("unknown rule '{rule}' in {section}")]
    #[diagnostic(
        code(adservices_lint::config::rule),
        help("run with --list-rules to see valid codes")
    )]
    UnknownRule { rule: String, section: &'static str },

    #[error("invalid file naming pattern '{pattern}': {message}")]
    #[diagnostic(code(adservices_lint::config::pattern))]
    InvalidPattern { pattern: String, message: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directories to analyze, relative to the project root
    pub targets: Vec<PathBuf>,
    /// Glob patterns to skip
    pub exclude: Vec<String>,
    pub rules: RulesConfig,
    pub room: RoomConfig,
    pub restricted_apis: RestrictedApiConfig,
    pub file_naming: FileNamingConfig,
    pub manifest: ManifestConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Rule codes or names to turn off
    pub disabled: Vec<String>,
    /// When non-empty, only these rules run
    pub enabled: Vec<String>,
    /// Per-rule severity overrides
    pub severity: HashMap<String, Severity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    pub base_class: String,
    pub database_annotation: String,
    pub migration_annotation: String,
    pub version_field: String,
    pub registration_class: String,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            base_class: "RoomDatabase".to_string(),
            database_annotation: "Database".to_string(),
            migration_annotation: "AutoMigration".to_string(),
            version_field: "DATABASE_VERSION".to_string(),
            registration_class: "RoomDatabaseRegistration".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestrictedApiConfig {
    /// Classes allowed to call `SystemProperties`
    pub system_properties_allowed: Vec<String>,
    /// Classes allowed to call `DeviceConfig`
    pub device_config_allowed: Vec<String>,
}

impl Default for RestrictedApiConfig {
    fn default() -> Self {
        Self {
            system_properties_allowed: vec!["DebugFlags".to_string(), "PhFlags".to_string()],
            device_config_allowed: vec!["PhFlags".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNamingConfig {
    /// Regex a persisted file name must match
    pub required_prefix: String,
}

impl Default for FileNamingConfig {
    fn default() -> Self {
        Self {
            required_prefix: "(?i)^adservices".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    pub required_process: String,
    /// Only components under this package are checked
    pub package_prefix: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            required_process: ":adservices".to_string(),
            package_prefix: "com.android.adservices".to_string(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = match path.extension().and_then(|e| e.to_str()) {
            Some("yml") | Some("yaml") => {
                serde_yaml::from_str(&contents).map_err(|e| ConfigError::Yaml {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?
            }
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Toml {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?,
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };

        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// First config file found under `root`, or the defaults
    pub fn from_default_locations(root: &Path) -> Result<Self, ConfigError> {
        for name in DEFAULT_CONFIG_FILES {
            let candidate = root.join(name);
            if candidate.is_file() {
                return Self::from_file(&candidate);
            }
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sections: [(&'static str, Vec<&String>); 3] = [
            ("rules.disabled", self.rules.disabled.iter().collect()),
            ("rules.enabled", self.rules.enabled.iter().collect()),
            ("rules.severity", self.rules.severity.keys().collect()),
        ];
        for (section, rules) in sections {
            if let Some(unknown) = rules.into_iter().find(|r| r.parse::<LintIssue>().is_err()) {
                return Err(ConfigError::UnknownRule {
                    rule: unknown.clone(),
                    section,
                });
            }
        }

        Regex::new(&self.file_naming.required_prefix).map_err(|e| {
            ConfigError::InvalidPattern {
                pattern: self.file_naming.required_prefix.clone(),
                message: e.to_string(),
            }
        })?;
        Ok(())
    }

    pub fn is_rule_enabled(&self, issue: LintIssue) -> bool {
        let matches = |rule: &String| rule.parse::<LintIssue>().ok() == Some(issue);
        if self.rules.disabled.iter().any(matches) {
            return false;
        }
        self.rules.enabled.is_empty() || self.rules.enabled.iter().any(matches)
    }

    pub fn severity_override(&self, issue: LintIssue) -> Option<Severity> {
        self.rules
            .severity
            .iter()
            .find(|(rule, _)| rule.parse::<LintIssue>().ok() == Some(issue))
            .map(|(_, severity)| *severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.room.registration_class, "RoomDatabaseRegistration");
        assert_eq!(config.room.version_field, "DATABASE_VERSION");
        assert_eq!(config.manifest.required_process, ":adservices");
        assert!(config.is_rule_enabled(LintIssue::MissingVersionField));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".adservices-lint.yml");
        fs::write(
            &path,
            r#"
exclude:
  - "**/test/**"
rules:
  disabled: [AS002]
  severity:
    RD002: error
room:
  registration_class: DatabaseRegistry
"#,
        )
        .unwrap();

        let config = Config::from_default_locations(dir.path()).unwrap();
        assert_eq!(config.exclude, vec!["**/test/**".to_string()]);
        assert!(!config.is_rule_enabled(LintIssue::DeviceConfigUsage));
        assert!(config.is_rule_enabled(LintIssue::SystemPropertiesUsage));
        assert_eq!(
            config.severity_override(LintIssue::ExportSchemaDisabled),
            Some(Severity::Error)
        );
        assert_eq!(config.room.registration_class, "DatabaseRegistry");
        assert_eq!(config.room.base_class, "RoomDatabase");
    }

    #[test]
    fn test_toml_config_with_rule_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("adservices-lint.toml");
        fs::write(
            &path,
            r#"
[rules]
enabled = ["RoomIncompleteMigrationPath", "BC003"]

[manifest]
required_process = ":adservices_sandbox"
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert!(config.is_rule_enabled(LintIssue::IncompleteMigrationPath));
        assert!(config.is_rule_enabled(LintIssue::ManifestProcess));
        assert!(!config.is_rule_enabled(LintIssue::JobServiceInitializer));
        assert_eq!(config.manifest.required_process, ":adservices_sandbox");
    }

    #[test]
    fn test_unknown_rule_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yml");
        fs::write(&path, "rules:\n  disabled: [XX999]\n").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::UnknownRule { .. })
        ));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let config = Config {
            file_naming: FileNamingConfig {
                required_prefix: "(".to_string(),
            },
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{}").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }
}
