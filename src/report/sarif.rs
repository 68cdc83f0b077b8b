//! SARIF 2.1.0 reporter for IDE and code scanning integration

use crate::analysis::{Finding, LintIssue, Severity};
use miette::{IntoDiagnostic, Result};
use serde_json::{json, Value};
use std::path::PathBuf;

const SARIF_SCHEMA: &str = "https://json.schemastore.org/sarif-2.1.0.json";

pub struct SarifReporter {
    output_path: Option<PathBuf>,
}

impl SarifReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, findings: &[Finding]) -> Result<()> {
        let sarif = serde_json::to_string_pretty(&Self::document(findings)).into_diagnostic()?;
        match &self.output_path {
            Some(path) => {
                std::fs::write(path, sarif).into_diagnostic()?;
                eprintln!("SARIF report written to: {}", path.display());
            }
            None => println!("{}", sarif),
        }
        Ok(())
    }

    fn level(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "note",
        }
    }

    fn rule(issue: LintIssue) -> Value {
        json!({
            "id": issue.code(),
            "name": issue.name(),
            "shortDescription": { "text": issue.name() },
            "fullDescription": { "text": issue.default_message("<subject>") },
            "defaultConfiguration": { "level": Self::level(issue.default_severity()) },
            "properties": { "category": issue.category() },
        })
    }

    fn result(finding: &Finding) -> Value {
        let rule_index = LintIssue::all()
            .iter()
            .position(|issue| *issue == finding.issue)
            .unwrap_or_default();
        let uri = finding.location.file.to_string_lossy().replace('\\', "/");

        json!({
            "ruleId": finding.issue.code(),
            "ruleIndex": rule_index,
            "level": Self::level(finding.severity),
            "message": { "text": finding.message },
            "locations": [{
                "physicalLocation": {
                    "artifactLocation": { "uri": uri },
                    "region": {
                        "startLine": finding.location.line,
                        "startColumn": finding.location.column,
                    },
                },
            }],
            "properties": {
                "subject": finding.subject,
                "confidence": finding.confidence,
            },
        })
    }

    fn document(findings: &[Finding]) -> Value {
        let rules: Vec<Value> = LintIssue::all().iter().copied().map(Self::rule).collect();
        let results: Vec<Value> = findings.iter().map(Self::result).collect();

        json!({
            "$schema": SARIF_SCHEMA,
            "version": "2.1.0",
            "runs": [{
                "tool": {
                    "driver": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION"),
                        "rules": rules,
                    },
                },
                "results": results,
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Location;

    #[test]
    fn test_document() {
        let findings = vec![Finding::new(
            LintIssue::ManifestProcess,
            Location::new(PathBuf::from("AndroidManifest.xml"), 8, 9, 0, 0),
            "com.android.adservices.api.AttributionJobService",
        )];
        let doc = SarifReporter::document(&findings);

        assert_eq!(doc["version"], "2.1.0");
        let run = &doc["runs"][0];
        assert_eq!(
            run["tool"]["driver"]["rules"].as_array().map(Vec::len),
            Some(LintIssue::all().len())
        );
        let result = &run["results"][0];
        assert_eq!(result["ruleId"], "BC003");
        assert_eq!(result["level"], "error");
        assert_eq!(
            result["locations"][0]["physicalLocation"]["region"]["startLine"],
            8
        );
        let index = result["ruleIndex"].as_u64().unwrap() as usize;
        assert_eq!(run["tool"]["driver"]["rules"][index]["id"], "BC003");
    }
}
