use super::Detector;
use crate::analysis::{Finding, LintIssue};
use crate::config::FileNamingConfig;
use crate::graph::{CallKind, CallSite, Graph};
use regex::Regex;
use tracing::warn;

/// Context methods whose first argument names a file on disk
const NAMED_BY_FIRST_ARGUMENT: &[&str] = &[
    "getSharedPreferences",
    "getDatabasePath",
    "openFileOutput",
    "deleteDatabase",
    "openOrCreateDatabase",
    "getDir",
    "getFileStreamPath",
];

/// BC002: files AdServices creates must carry the `adservices` prefix so the
/// OTA cleanup job can find them after a module rollback
pub struct NewFileNamingDetector {
    pattern: Option<Regex>,
}

impl NewFileNamingDetector {
    pub fn new(config: &FileNamingConfig) -> Self {
        let pattern = match Regex::new(&config.required_prefix) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                warn!("Invalid file naming pattern, BC002 disabled: {}", e);
                None
            }
        };
        Self { pattern }
    }

    /// Index of the argument holding the file name, for call shapes we check
    fn name_argument(call: &CallSite) -> Option<usize> {
        match call.kind {
            CallKind::Constructor if call.name == "File" && call.arguments.len() == 2 => Some(1),
            CallKind::Constructor => None,
            CallKind::Method if call.name == "databaseBuilder" => {
                let from_room = call
                    .receiver
                    .as_deref()
                    .is_some_and(|r| r == "Room" || r.ends_with(".Room"));
                (from_room && call.arguments.len() == 3).then_some(2)
            }
            CallKind::Method if NAMED_BY_FIRST_ARGUMENT.contains(&call.name.as_str()) => {
                (!call.arguments.is_empty()).then_some(0)
            }
            CallKind::Method => None,
        }
    }
}

impl Detector for NewFileNamingDetector {
    fn name(&self) -> &'static str {
        "new-file-naming"
    }

    fn issues(&self) -> &'static [LintIssue] {
        &[LintIssue::NewFileNaming]
    }

    fn detect(&self, graph: &Graph) -> Vec<Finding> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };
        let mut findings = Vec::new();

        for call in graph.calls() {
            let Some(index) = Self::name_argument(call) else {
                continue;
            };
            let Some(argument) = call.arguments.get(index) else {
                continue;
            };

            let scope = graph.enclosing_declarations(&call.location).pop();
            let Some(name) = graph.resolve_string_prefix(scope, argument) else {
                continue;
            };
            if pattern.is_match(&name) {
                continue;
            }

            findings.push(
                Finding::new(LintIssue::NewFileNaming, call.location.clone(), &name).with_message(
                    format!(
                        "File name '{}' passed to {}() must match '{}'",
                        name,
                        call.name,
                        pattern.as_str()
                    ),
                ),
            );
        }

        findings
    }
}
