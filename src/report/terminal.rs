//! Terminal reporter with colored output, grouped by file
//!
//! Based on Rust compiler diagnostic design (RFC 1644)

use crate::analysis::{Confidence, Finding};
use crate::report::{display_path, palette};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub struct TerminalReporter {
    show_confidence: bool,
    base_path: Option<PathBuf>,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            show_confidence: true,
            base_path: None,
        }
    }

    pub fn with_confidence(mut self, show: bool) -> Self {
        self.show_confidence = show;
        self
    }

    pub fn with_base_path(mut self, base: PathBuf) -> Self {
        self.base_path = Some(base);
        self
    }

    pub fn report(&self, findings: &[Finding]) {
        if findings.is_empty() {
            println!("{}", "No AdServices lint issues found!".green().bold());
            return;
        }

        let mut by_file: BTreeMap<&Path, Vec<&Finding>> = BTreeMap::new();
        for finding in findings {
            by_file
                .entry(finding.location.file.as_path())
                .or_default()
                .push(finding);
        }

        println!();
        println!(
            "Found {} issues:",
            palette::count(findings.len())
        );
        println!();

        if self.show_confidence {
            self.print_legend();
        }

        for (file, mut items) in by_file {
            println!(
                "{}",
                palette::path(&display_path(file, self.base_path.as_deref()))
            );
            items.sort_by_key(|f| (f.location.line, f.location.column));
            for item in items {
                self.print_item(item);
            }
            println!();
        }
    }

    fn print_legend(&self) {
        println!("{}", "Confidence Legend:".dimmed());
        let entries: Vec<String> = [Confidence::High, Confidence::Medium, Confidence::Low]
            .into_iter()
            .map(|c| format!("{} {}", palette::confidence(c), c.as_str().dimmed()))
            .collect();
        println!("  {}", entries.join("  "));
        println!();
    }

    fn print_item(&self, item: &Finding) {
        let confidence = if self.show_confidence {
            format!("{} ", palette::confidence(item.confidence))
        } else {
            String::new()
        };

        println!(
            "  {}{} {} [{}] {}",
            confidence,
            palette::position(item.location.line, item.location.column),
            palette::severity(item.severity),
            palette::rule(item.issue),
            item.message
        );
        println!(
            "    {} {} '{}'",
            "→".dimmed(),
            item.issue.name().dimmed(),
            palette::subject(&item.subject)
        );
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
