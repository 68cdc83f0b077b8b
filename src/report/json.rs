//! JSON reporter for machine consumption

use crate::analysis::{Confidence, Finding, Severity};
use crate::report::aggregator::ResultStats;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    total_issues: usize,
    summary: JsonSummary,
    issues: Vec<JsonIssue<'a>>,
}

#[derive(Serialize)]
struct JsonSummary {
    errors: usize,
    warnings: usize,
    infos: usize,
    files_affected: usize,
    by_rule: BTreeMap<&'static str, usize>,
}

#[derive(Serialize)]
struct JsonIssue<'a> {
    code: &'static str,
    name: &'static str,
    category: &'static str,
    severity: Severity,
    confidence: Confidence,
    file: String,
    line: usize,
    column: usize,
    subject: &'a str,
    message: &'a str,
}

pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    /// Write the report to the output file, or stdout when none is set
    pub fn report(&self, findings: &[Finding]) -> Result<()> {
        let json = Self::render(findings)?;
        match &self.output_path {
            Some(path) => {
                std::fs::write(path, json).into_diagnostic()?;
                eprintln!("JSON report written to: {}", path.display());
            }
            None => println!("{}", json),
        }
        Ok(())
    }

    fn render(findings: &[Finding]) -> Result<String> {
        let stats = ResultStats::from_findings(findings);
        let report = JsonReport {
            version: env!("CARGO_PKG_VERSION"),
            total_issues: findings.len(),
            summary: JsonSummary {
                errors: stats.errors,
                warnings: stats.warnings,
                infos: stats.infos,
                files_affected: stats.files_affected,
                by_rule: stats
                    .by_rule
                    .iter()
                    .map(|(issue, count)| (issue.code(), *count))
                    .collect(),
            },
            issues: findings
                .iter()
                .map(|f| JsonIssue {
                    code: f.issue.code(),
                    name: f.issue.name(),
                    category: f.issue.category(),
                    severity: f.severity,
                    confidence: f.confidence,
                    file: f.location.file.display().to_string(),
                    line: f.location.line,
                    column: f.location.column,
                    subject: &f.subject,
                    message: &f.message,
                })
                .collect(),
        };
        serde_json::to_string_pretty(&report).into_diagnostic()
    }
}
