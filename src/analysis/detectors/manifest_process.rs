use super::Detector;
use crate::analysis::{Finding, LintIssue};
use crate::config::ManifestConfig;
use crate::graph::Graph;

/// BC003: AdServices components must run in the AdServices process
pub struct ManifestProcessDetector {
    config: ManifestConfig,
}

impl ManifestProcessDetector {
    pub fn new(config: ManifestConfig) -> Self {
        Self { config }
    }
}

impl Detector for ManifestProcessDetector {
    fn name(&self) -> &'static str {
        "manifest-process"
    }

    fn issues(&self) -> &'static [LintIssue] {
        &[LintIssue::ManifestProcess]
    }

    fn detect(&self, graph: &Graph) -> Vec<Finding> {
        let issue = LintIssue::ManifestProcess;
        let mut findings = Vec::new();

        for component in graph.manifest_components() {
            let Some(name) = &component.name else {
                continue;
            };
            if !name.starts_with(&self.config.package_prefix) {
                continue;
            }
            if component
                .ignored
                .iter()
                .any(|id| id == issue.name() || id.eq_ignore_ascii_case(issue.code()) || id == "all")
            {
                continue;
            }

            let message = match component.process.as_deref() {
                Some(process) if process == self.config.required_process => continue,
                Some(process) => format!(
                    "<{}> {} runs in process '{}' but must declare android:process=\"{}\"",
                    component.tag, name, process, self.config.required_process
                ),
                None => format!(
                    "<{}> {} must declare android:process=\"{}\"",
                    component.tag, name, self.config.required_process
                ),
            };
            findings.push(
                Finding::new(issue, component.location.clone(), name).with_message(message),
            );
        }

        findings
    }
}
