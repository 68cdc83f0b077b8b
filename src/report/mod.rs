mod aggregator;
mod compact;
mod grouped;
mod json;
mod palette;
mod sarif;
mod summary;
mod terminal;

pub use aggregator::ResultStats;
pub use compact::CompactReporter;
pub use grouped::{GroupBy, GroupedReporter};
pub use json::JsonReporter;
pub use sarif::SarifReporter;
pub use summary::SummaryReporter;
pub use terminal::TerminalReporter;

use crate::analysis::Finding;
use miette::Result;
use std::path::{Path, PathBuf};

/// Output format for reports
#[derive(Debug, Clone, Default)]
pub enum ReportFormat {
    /// Findings grouped by file
    #[default]
    Terminal,
    /// One line per finding
    Compact,
    /// Grouped by rule or category
    Grouped(GroupBy),
    /// Summary statistics only
    Summary,
    Json,
    /// SARIF 2.1.0
    Sarif,
}

/// Options for report generation
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Output file path (for JSON/SARIF)
    pub output_path: Option<PathBuf>,
    /// Base path to strip from file paths for shorter display
    pub base_path: Option<PathBuf>,
    pub expand_all: bool,
    pub show_confidence: bool,
    /// Maximum items per group before collapsing
    pub max_per_group: usize,
    /// Number of top rules to show in summary
    pub top_n: usize,
    pub files_count: Option<usize>,
    pub declarations_count: Option<usize>,
}

impl ReportOptions {
    pub fn new() -> Self {
        Self {
            output_path: None,
            base_path: None,
            expand_all: false,
            show_confidence: true,
            max_per_group: 5,
            top_n: 10,
            files_count: None,
            declarations_count: None,
        }
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Display `path` relative to `base` when it lies under it
pub(crate) fn display_path(path: &Path, base: Option<&Path>) -> String {
    base.and_then(|base| path.strip_prefix(base).ok())
        .filter(|rel| !rel.as_os_str().is_empty())
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Reporter for outputting lint findings
pub struct Reporter {
    format: ReportFormat,
    options: ReportOptions,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            options: ReportOptions {
                output_path,
                ..ReportOptions::default()
            },
        }
    }

    pub fn with_options(format: ReportFormat, options: ReportOptions) -> Self {
        Self { format, options }
    }

    pub fn report(&self, findings: &[Finding]) -> Result<()> {
        match &self.format {
            ReportFormat::Terminal => {
                let mut reporter =
                    TerminalReporter::new().with_confidence(self.options.show_confidence);
                if let Some(base) = &self.options.base_path {
                    reporter = reporter.with_base_path(base.clone());
                }
                reporter.report(findings);
                self.print_final_summary(findings);
                Ok(())
            }
            ReportFormat::Compact => {
                let mut reporter =
                    CompactReporter::new().with_confidence(self.options.show_confidence);
                if let Some(base) = &self.options.base_path {
                    reporter = reporter.with_base_path(base.clone());
                }
                reporter.report(findings);
                Ok(())
            }
            ReportFormat::Grouped(group_by) => {
                let mut reporter =
                    GroupedReporter::new(*group_by).with_max_per_group(self.options.max_per_group);
                if let Some(base) = &self.options.base_path {
                    reporter = reporter.with_base_path(base.clone());
                }
                if self.options.expand_all {
                    reporter = reporter.expand_all();
                }
                reporter.report(findings);
                self.print_final_summary(findings);
                Ok(())
            }
            ReportFormat::Summary => {
                self.summary_reporter().report(findings);
                Ok(())
            }
            ReportFormat::Json => JsonReporter::new(self.options.output_path.clone()).report(findings),
            ReportFormat::Sarif => {
                SarifReporter::new(self.options.output_path.clone()).report(findings)
            }
        }
    }

    fn summary_reporter(&self) -> SummaryReporter {
        let mut reporter = SummaryReporter::new().with_top_n(self.options.top_n);
        if let Some(files) = self.options.files_count {
            reporter = reporter.with_files_count(files);
        }
        if let Some(decls) = self.options.declarations_count {
            reporter = reporter.with_declarations_count(decls);
        }
        reporter
    }

    fn print_final_summary(&self, findings: &[Finding]) {
        if findings.is_empty() {
            return;
        }
        self.summary_reporter().as_final_summary().report(findings);
    }
}
