//! Grouping and counting of findings

use crate::analysis::{Confidence, Finding, LintIssue, Severity};
use std::collections::{BTreeMap, HashSet};

/// Findings of one rule
#[derive(Debug, Clone)]
pub struct IssueGroup<'a> {
    pub issue: LintIssue,
    pub items: Vec<&'a Finding>,
}

impl IssueGroup<'_> {
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Highest severity in the group
    pub fn severity(&self) -> Severity {
        self.items
            .iter()
            .map(|f| f.severity)
            .max()
            .unwrap_or_else(|| self.issue.default_severity())
    }
}

/// Group findings by rule, largest group first
pub fn group_by_rule(findings: &[Finding]) -> Vec<IssueGroup<'_>> {
    let mut map: BTreeMap<LintIssue, Vec<&Finding>> = BTreeMap::new();
    for finding in findings {
        map.entry(finding.issue).or_default().push(finding);
    }
    let mut groups: Vec<IssueGroup<'_>> = map
        .into_iter()
        .map(|(issue, items)| IssueGroup { issue, items })
        .collect();
    groups.sort_by(|a, b| b.count().cmp(&a.count()));
    groups
}

/// Statistics about the analysis results
#[derive(Debug, Default)]
pub struct ResultStats {
    pub total_issues: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub by_category: BTreeMap<&'static str, usize>,
    pub by_rule: BTreeMap<LintIssue, usize>,
    pub files_affected: usize,
}

impl ResultStats {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut stats = Self {
            total_issues: findings.len(),
            ..Self::default()
        };
        let mut files = HashSet::new();

        for item in findings {
            match item.severity {
                Severity::Error => stats.errors += 1,
                Severity::Warning => stats.warnings += 1,
                Severity::Info => stats.infos += 1,
            }
            match item.confidence {
                Confidence::High => stats.high += 1,
                Confidence::Medium => stats.medium += 1,
                Confidence::Low => stats.low += 1,
            }
            *stats.by_category.entry(item.issue.category()).or_default() += 1;
            *stats.by_rule.entry(item.issue).or_default() += 1;
            files.insert(item.location.file.as_path());
        }

        stats.files_affected = files.len();
        stats
    }
}
