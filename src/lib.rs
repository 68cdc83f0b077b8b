//! adservices-lint - compliance and backward-compatibility lint rules for
//! AdServices Android sources (Kotlin/Java/AndroidManifest.xml)
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **File Discovery** - Find all .kt, .java and AndroidManifest.xml files
//! 2. **Parsing** - Parse source files using tree-sitter, manifests with quick-xml
//! 3. **Graph Building** - Index declarations, imports, calls and components
//! 4. **Detection** - Run the Room, restricted API and compatibility detectors
//! 5. **Filtering** - Apply config, suppressions, confidence and baseline
//! 6. **Reporting** - Output results in various formats

pub mod analysis;
pub mod baseline;
pub mod config;
pub mod discovery;
pub mod graph;
pub mod parser;
pub mod report;

pub use analysis::{Analyzer, Confidence, Finding, LintIssue, Severity};
pub use baseline::Baseline;
pub use config::Config;
pub use discovery::FileFinder;
pub use graph::{Declaration, DeclarationKind, Graph, GraphBuilder, ParallelGraphBuilder};
pub use report::{ReportFormat, Reporter};
