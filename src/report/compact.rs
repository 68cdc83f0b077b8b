//! Compact terminal reporter
//!
//! One line per finding, `path:line:col  severity  code  message`, easy to
//! grep and to paste into an editor's quickfix list

use crate::analysis::Finding;
use crate::report::aggregator::ResultStats;
use crate::report::{display_path, palette};
use colored::Colorize;
use std::path::PathBuf;

pub struct CompactReporter {
    base_path: Option<PathBuf>,
    show_confidence: bool,
    /// Messages longer than this are cut
    max_message_width: usize,
}

impl CompactReporter {
    pub fn new() -> Self {
        Self {
            base_path: None,
            show_confidence: true,
            max_message_width: 100,
        }
    }

    pub fn with_base_path(mut self, path: PathBuf) -> Self {
        self.base_path = Some(path);
        self
    }

    pub fn with_confidence(mut self, show: bool) -> Self {
        self.show_confidence = show;
        self
    }

    pub fn report(&self, findings: &[Finding]) {
        if findings.is_empty() {
            println!("{}", "No issues found!".green().bold());
            return;
        }

        for finding in findings {
            println!("{}", self.format_line(finding));
        }

        self.print_summary(findings);
    }

    fn format_line(&self, finding: &Finding) -> String {
        let location = format!(
            "{}:{}:{}",
            display_path(&finding.location.file, self.base_path.as_deref()),
            finding.location.line,
            finding.location.column
        );
        let confidence = if self.show_confidence {
            format!("{} ", palette::confidence(finding.confidence))
        } else {
            String::new()
        };

        format!(
            "{}{}  {}  {}  {}",
            confidence,
            location.dimmed(),
            palette::severity(finding.severity),
            palette::rule(finding.issue),
            self.shorten(&finding.message)
        )
    }

    fn shorten(&self, message: &str) -> String {
        if message.chars().count() <= self.max_message_width {
            return message.to_string();
        }
        let cut: String = message.chars().take(self.max_message_width - 3).collect();
        format!("{}...", cut)
    }

    fn print_summary(&self, findings: &[Finding]) {
        let stats = ResultStats::from_findings(findings);

        println!("{}", palette::divider(50));

        let mut parts = Vec::new();
        if stats.errors > 0 {
            parts.push(format!("{} {}", stats.errors, "errors".red()));
        }
        if stats.warnings > 0 {
            parts.push(format!("{} {}", stats.warnings, "warnings".yellow()));
        }
        if stats.infos > 0 {
            parts.push(format!("{} {}", stats.infos, "info".blue()));
        }

        println!(
            "  {} {} in {} files ({})",
            palette::count(stats.total_issues),
            "issues".bold(),
            stats.files_affected,
            parts.join(", ")
        );
    }
}

impl Default for CompactReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::LintIssue;
    use crate::graph::Location;

    #[test]
    fn test_line_is_relative_to_base() {
        colored::control::set_override(false);
        let finding = Finding::new(
            LintIssue::NewFileNaming,
            Location::new(PathBuf::from("/repo/src/Store.java"), 12, 9, 0, 0),
            "topics.db",
        );
        let line = CompactReporter::new()
            .with_confidence(false)
            .with_base_path(PathBuf::from("/repo"))
            .format_line(&finding);
        assert!(line.starts_with("src/Store.java:12:9"), "{}", line);
        assert!(line.contains("BC002"));
        assert!(line.contains("error"), "{}", line);
    }

    #[test]
    fn test_long_messages_are_cut() {
        let reporter = CompactReporter::new();
        let long = "x".repeat(300);
        let short = reporter.shorten(&long);
        assert_eq!(short.chars().count(), 100);
        assert!(short.ends_with("..."));
    }
}
