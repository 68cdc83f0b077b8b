//! Baseline support
//!
//! A baseline records the findings of a run so later runs only report what
//! is new. Entries are matched on rule, relative file, subject and message;
//! line numbers are ignored so unrelated edits do not resurface old issues.

use crate::analysis::Finding;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

const BASELINE_VERSION: u32 = 1;

/// rule, file, subject, message
type EntryKey = (String, String, String, String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaselineEntry {
    pub rule: String,
    pub file: String,
    pub subject: String,
    pub message: String,
    /// Informational only, not used for matching
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl BaselineEntry {
    fn from_finding(finding: &Finding, base: &Path) -> Self {
        Self {
            rule: finding.issue.code().to_string(),
            file: relative_file(&finding.location.file, base),
            subject: finding.subject.clone(),
            message: finding.message.clone(),
            line: Some(finding.location.line),
        }
    }

    fn into_key(self) -> EntryKey {
        (self.rule, self.file, self.subject, self.message)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Baseline {
    pub version: u32,
    pub entries: Vec<BaselineEntry>,
}

/// Comparison of a run against a baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselineStats {
    /// Entries in the baseline file
    pub total_baselined: usize,
    /// Current findings matched by the baseline
    pub baselined_found: usize,
    /// Current findings not in the baseline
    pub new_issues: usize,
    /// Baseline entries no longer reported
    pub fixed: usize,
}

impl fmt::Display for BaselineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} baselined, {} new, {} fixed",
            self.baselined_found, self.new_issues, self.fixed
        )
    }
}

impl Baseline {
    pub fn from_findings(findings: &[Finding], base: &Path) -> Self {
        let mut entries: Vec<BaselineEntry> = findings
            .iter()
            .map(|f| BaselineEntry::from_finding(f, base))
            .collect();
        entries.sort_by(|a, b| {
            (&a.file, a.line, &a.rule, &a.subject).cmp(&(&b.file, b.line, &b.rule, &b.subject))
        });
        Self {
            version: BASELINE_VERSION,
            entries,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read baseline {}", path.display()))?;
        let baseline: Baseline = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid baseline file {}", path.display()))?;
        if baseline.version != BASELINE_VERSION {
            anyhow::bail!(
                "Unsupported baseline version {} (expected {})",
                baseline.version,
                BASELINE_VERSION
            );
        }
        Ok(baseline)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write baseline {}", path.display()))?;
        Ok(())
    }

    /// Remaining budget per key; duplicates in the baseline cover as many
    /// identical findings as they appear
    fn budget(&self) -> HashMap<EntryKey, usize> {
        let mut budget = HashMap::new();
        for entry in &self.entries {
            *budget.entry(entry.clone().into_key()).or_insert(0) += 1;
        }
        budget
    }

    /// Findings the baseline does not cover
    pub fn filter_new<'f>(&self, findings: &'f [Finding], base: &Path) -> Vec<&'f Finding> {
        let mut budget = self.budget();
        findings
            .iter()
            .filter(|finding| {
                let key = BaselineEntry::from_finding(finding, base).into_key();
                match budget.get_mut(&key) {
                    Some(remaining) if *remaining > 0 => {
                        *remaining -= 1;
                        false
                    }
                    _ => true,
                }
            })
            .collect()
    }

    pub fn stats(&self, findings: &[Finding], base: &Path) -> BaselineStats {
        let new_issues = self.filter_new(findings, base).len();
        let baselined_found = findings.len() - new_issues;
        BaselineStats {
            total_baselined: self.entries.len(),
            baselined_found,
            new_issues,
            fixed: self.entries.len().saturating_sub(baselined_found),
        }
    }
}

/// Forward-slash path relative to `base`, so baselines are portable
fn relative_file(file: &Path, base: &Path) -> String {
    file.strip_prefix(base)
        .unwrap_or(file)
        .to_string_lossy()
        .replace('\\', "/")
}
