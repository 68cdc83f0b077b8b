use super::Detector;
use crate::analysis::{Confidence, Finding, LintIssue};
use crate::config::RestrictedApiConfig;
use crate::graph::{CallKind, CallSite, Graph, Resolution};

const SYSTEM_PROPERTIES: &str = "android.os.SystemProperties";
const DEVICE_CONFIG: &str = "android.provider.DeviceConfig";

/// Flags calls on a platform class that AdServices code must not use
/// directly (AS001, AS002)
///
/// Receivers resolve through the calling file's imports and package. A
/// receiver that cannot be tied to the restricted class is left alone.
pub struct RestrictedApiDetector {
    issue: LintIssue,
    qualified_class: &'static str,
    /// Classes allowed to make these calls
    allowed: Vec<String>,
}

impl RestrictedApiDetector {
    pub fn system_properties(config: &RestrictedApiConfig) -> Self {
        Self {
            issue: LintIssue::SystemPropertiesUsage,
            qualified_class: SYSTEM_PROPERTIES,
            allowed: config.system_properties_allowed.clone(),
        }
    }

    pub fn device_config(config: &RestrictedApiConfig) -> Self {
        Self {
            issue: LintIssue::DeviceConfigUsage,
            qualified_class: DEVICE_CONFIG,
            allowed: config.device_config_allowed.clone(),
        }
    }

    fn resolve(&self, graph: &Graph, call: &CallSite) -> Option<Resolution> {
        let file = call.location.file.as_path();
        match &call.receiver {
            Some(receiver) => graph.resolve_type_reference(file, receiver, self.qualified_class),
            None => graph.resolve_static_member(file, &call.name, self.qualified_class),
        }
    }

    fn simple_class(&self) -> &'static str {
        self.qualified_class
            .rsplit('.')
            .next()
            .unwrap_or(self.qualified_class)
    }
}

impl Detector for RestrictedApiDetector {
    fn name(&self) -> &'static str {
        match self.issue {
            LintIssue::DeviceConfigUsage => "device-config-usage",
            _ => "system-properties-usage",
        }
    }

    fn issues(&self) -> &'static [LintIssue] {
        match self.issue {
            LintIssue::DeviceConfigUsage => &[LintIssue::DeviceConfigUsage],
            _ => &[LintIssue::SystemPropertiesUsage],
        }
    }

    fn detect(&self, graph: &Graph) -> Vec<Finding> {
        let mut findings = Vec::new();

        for call in graph.calls() {
            if call.kind != CallKind::Method {
                continue;
            }
            let Some(resolution) = self.resolve(graph, call) else {
                continue;
            };

            let enclosing = graph.enclosing_declarations(&call.location);
            if enclosing
                .iter()
                .any(|d| d.kind.is_type() && self.allowed.contains(&d.name))
            {
                continue;
            }

            let owner = enclosing
                .iter()
                .rev()
                .find(|d| d.kind.is_type())
                .map(|d| d.name.clone())
                .unwrap_or_else(|| {
                    call.location
                        .file
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default()
                });

            let confidence = match resolution {
                Resolution::Exact => Confidence::High,
                Resolution::Inferred => Confidence::Medium,
            };
            let message = format!(
                "'{}' calls {}.{}() directly; use the AdServices flag wrappers instead",
                owner,
                self.simple_class(),
                call.name
            );
            findings.push(
                Finding::new(self.issue, call.location.clone(), owner)
                    .with_confidence(confidence)
                    .with_message(message),
            );
        }

        findings
    }
}
