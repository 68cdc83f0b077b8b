// Rule detectors. Each one is a read-only pass over the project graph.

mod job_service_init;
mod manifest_process;
mod new_file_naming;
mod restricted_api;
pub mod room;

pub use job_service_init::JobServiceInitializerDetector;
pub use manifest_process::ManifestProcessDetector;
pub use new_file_naming::NewFileNamingDetector;
pub use restricted_api::RestrictedApiDetector;
pub use room::RoomDatabaseMigrationDetector;

use crate::analysis::{Finding, LintIssue};
use crate::config::Config;
use crate::graph::Graph;

/// Trait for lint rule detectors
pub trait Detector {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Rules this detector can report
    fn issues(&self) -> &'static [LintIssue];

    /// Run the detector on the graph and return found issues
    fn detect(&self, graph: &Graph) -> Vec<Finding>;
}

/// Every detector, configured
pub fn all(config: &Config) -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(RoomDatabaseMigrationDetector::new(config.room.clone())),
        Box::new(RestrictedApiDetector::system_properties(
            &config.restricted_apis,
        )),
        Box::new(RestrictedApiDetector::device_config(&config.restricted_apis)),
        Box::new(JobServiceInitializerDetector::new()),
        Box::new(NewFileNamingDetector::new(&config.file_naming)),
        Box::new(ManifestProcessDetector::new(config.manifest.clone())),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::discovery::FileType;
    use crate::graph::{Graph, GraphBuilder};
    use std::path::Path;

    /// Build a graph from `(file name, source)` pairs
    pub fn graph_from(sources: &[(&str, &str)]) -> Graph {
        let mut builder = GraphBuilder::new();
        for (name, source) in sources {
            let path = Path::new(name);
            let file_type = FileType::from_path(path).expect("unsupported fixture name");
            builder
                .process_source(path, file_type, source)
                .expect("fixture failed to parse");
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_issue_has_a_detector() {
        let detectors = all(&Config::default());
        for issue in LintIssue::all() {
            assert!(
                detectors.iter().any(|d| d.issues().contains(issue)),
                "no detector reports {}",
                issue
            );
        }
    }
}
