//! Grouped reporter - organize findings by rule or category

use crate::analysis::Finding;
use crate::report::aggregator::{group_by_rule, IssueGroup};
use crate::report::{display_path, palette};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// How to group findings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    /// One section per rule (RD006, BC002, ...)
    Rule,
    /// Room Database, Restricted API, Backward Compatibility
    Category,
}

impl std::str::FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rule" | "issue" => Ok(GroupBy::Rule),
            "category" | "cat" => Ok(GroupBy::Category),
            _ => Err(format!("Unknown grouping: {}. Use: rule, category", s)),
        }
    }
}

pub struct GroupedReporter {
    group_by: GroupBy,
    base_path: Option<PathBuf>,
    /// Items shown per group before collapsing
    max_per_group: usize,
    expand_all: bool,
}

impl GroupedReporter {
    pub fn new(group_by: GroupBy) -> Self {
        Self {
            group_by,
            base_path: None,
            max_per_group: 5,
            expand_all: false,
        }
    }

    pub fn with_base_path(mut self, path: PathBuf) -> Self {
        self.base_path = Some(path);
        self
    }

    pub fn with_max_per_group(mut self, max: usize) -> Self {
        self.max_per_group = max;
        self
    }

    pub fn expand_all(mut self) -> Self {
        self.expand_all = true;
        self
    }

    pub fn report(&self, findings: &[Finding]) {
        if findings.is_empty() {
            println!("{}", "No issues found!".green().bold());
            return;
        }

        let groups = group_by_rule(findings);
        match self.group_by {
            GroupBy::Rule => {
                println!();
                println!("{}", "Issues Grouped by Rule".cyan().bold());
                println!("{}", palette::divider(50));
                println!();
                for group in &groups {
                    self.print_group(group, "");
                    println!();
                }
            }
            GroupBy::Category => {
                let mut by_category: BTreeMap<&str, Vec<&IssueGroup<'_>>> = BTreeMap::new();
                for group in &groups {
                    by_category
                        .entry(group.issue.category())
                        .or_default()
                        .push(group);
                }

                println!();
                println!("{}", "Issues Grouped by Category".cyan().bold());
                println!("{}", palette::divider(50));
                for (category, groups) in by_category {
                    let total: usize = groups.iter().map(|g| g.count()).sum();
                    println!();
                    println!(
                        "{} ({})",
                        palette::category(category),
                        palette::count(total)
                    );
                    println!("{}", palette::thin_divider(40));
                    for group in groups {
                        self.print_group(group, "  ");
                    }
                }
            }
        }

        println!();
        println!(
            "{} {} total issues",
            palette::divider(40),
            palette::count(findings.len())
        );
    }

    fn print_group(&self, group: &IssueGroup<'_>, indent: &str) {
        println!(
            "{}{} {} {} ({})",
            indent,
            palette::severity(group.severity()),
            palette::rule(group.issue),
            group.issue.name().bold(),
            palette::count(group.count())
        );

        let limit = if self.expand_all {
            group.count()
        } else {
            self.max_per_group
        };
        for item in group.items.iter().take(limit) {
            println!(
                "{}    {}:{} {}",
                indent,
                display_path(&item.location.file, self.base_path.as_deref()).dimmed(),
                item.location.line.to_string().dimmed(),
                palette::subject(&item.subject)
            );
        }

        let hidden = group.count().saturating_sub(limit);
        if hidden > 0 {
            println!(
                "{}    {}",
                indent,
                format!("... and {} more (use --expand to show all)", hidden).dimmed()
            );
        }
    }
}
