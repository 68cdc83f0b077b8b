use super::Detector;
use crate::analysis::{Finding, LintIssue};
use crate::graph::{DeclarationKind, Graph};

const JOB_SERVICE: &str = "JobService";

/// BC001: field initializers of a `JobService` run when the system
/// instantiates the service, before `onStartJob`. On an older module
/// version that is enough to load classes which may not exist.
///
/// Literals, `null`, class literals and constant references are fine, as
/// are `by lazy` delegates and fields without an initializer.
pub struct JobServiceInitializerDetector;

impl JobServiceInitializerDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JobServiceInitializerDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for JobServiceInitializerDetector {
    fn name(&self) -> &'static str {
        "job-service-initializer"
    }

    fn issues(&self) -> &'static [LintIssue] {
        &[LintIssue::JobServiceInitializer]
    }

    fn detect(&self, graph: &Graph) -> Vec<Finding> {
        let mut findings = Vec::new();

        for service in graph.types() {
            if service.kind != DeclarationKind::Class || !graph.is_subtype_of(service, JOB_SERVICE)
            {
                continue;
            }

            for field in graph.fields_of(service) {
                let Some(initializer) = &field.initializer else {
                    continue;
                };
                if initializer.is_inert() {
                    continue;
                }
                findings.push(
                    Finding::new(
                        LintIssue::JobServiceInitializer,
                        field.location.clone(),
                        format!("{}.{}", service.name, field.name),
                    )
                    .with_message(format!(
                        "Field '{}' of JobService '{}' is initialized with a {}; move it into onStartJob or make it lazy",
                        field.name,
                        service.name,
                        initializer.describe()
                    )),
                );
            }
        }

        findings
    }
}
