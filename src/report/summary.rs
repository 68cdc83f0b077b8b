//! Summary reporter - statistics and overview only

use crate::analysis::Finding;
use crate::report::aggregator::ResultStats;
use crate::analysis::Confidence;
use crate::report::palette;
use colored::Colorize;

/// Summary-only reporter with statistics and charts
pub struct SummaryReporter {
    /// Width of bar charts
    bar_width: usize,
    /// Number of top rules to show
    top_n: usize,
    show_files_count: Option<usize>,
    show_declarations_count: Option<usize>,
    /// Appended after another report rather than standalone
    is_final_summary: bool,
}

impl SummaryReporter {
    pub fn new() -> Self {
        Self {
            bar_width: 20,
            top_n: 10,
            show_files_count: None,
            show_declarations_count: None,
            is_final_summary: false,
        }
    }

    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    pub fn with_files_count(mut self, count: usize) -> Self {
        self.show_files_count = Some(count);
        self
    }

    pub fn with_declarations_count(mut self, count: usize) -> Self {
        self.show_declarations_count = Some(count);
        self
    }

    pub fn as_final_summary(mut self) -> Self {
        self.is_final_summary = true;
        self
    }

    pub fn report(&self, findings: &[Finding]) {
        println!();
        println!("{}", "AdServices Lint Summary".cyan().bold());
        println!("{}", palette::divider(50));
        println!();

        if findings.is_empty() {
            println!("{}", "No issues found!".green().bold());
            return;
        }

        let stats = ResultStats::from_findings(findings);

        self.print_basic_stats(&stats);
        println!();
        self.print_severity_breakdown(&stats);
        println!();
        self.print_category_breakdown(&stats);
        println!();
        self.print_top_rules(&stats);
        println!();
        self.print_confidence_breakdown(&stats);
        println!();
        self.print_footer();
    }

    fn print_basic_stats(&self, stats: &ResultStats) {
        let label_width = 20;
        let mut rows = Vec::new();
        if let Some(files) = self.show_files_count {
            rows.push(("Files analyzed:", files));
        }
        if let Some(decls) = self.show_declarations_count {
            rows.push(("Declarations:", decls));
        }
        rows.push(("Files affected:", stats.files_affected));
        rows.push(("Issues found:", stats.total_issues));

        for (label, value) in rows {
            println!(
                "{:>width$}  {}",
                label.dimmed(),
                format_number(value).bold(),
                width = label_width
            );
        }
    }

    fn print_severity_breakdown(&self, stats: &ResultStats) {
        println!("{}", "By Severity:".white().bold());
        let total = stats.total_issues as f64;

        for (label, count) in [
            ("Errors".red(), stats.errors),
            ("Warnings".yellow(), stats.warnings),
            ("Info".blue(), stats.infos),
        ] {
            if count > 0 {
                let pct = (count as f64 / total) * 100.0;
                println!("  {} {:>6} ({:>5.1}%)", label, count, pct);
            }
        }
    }

    fn print_category_breakdown(&self, stats: &ResultStats) {
        println!("{}", "By Category:".white().bold());
        let total = stats.total_issues as f64;

        let mut categories: Vec<_> = stats.by_category.iter().collect();
        categories.sort_by(|a, b| b.1.cmp(a.1));

        let max_name_len = categories
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(10);

        for (name, count) in categories {
            let pct = (*count as f64 / total) * 100.0;
            let bar = palette::share_bar(*count, stats.total_issues, self.bar_width, name);

            println!(
                "  {:width$} │{}│ {:>4} ({:>5.1}%)",
                name,
                bar,
                count,
                pct,
                width = max_name_len
            );
        }
    }

    fn print_top_rules(&self, stats: &ResultStats) {
        println!("{}", "Top Rules:".white().bold());

        let mut rules: Vec<_> = stats.by_rule.iter().collect();
        rules.sort_by(|a, b| b.1.cmp(a.1));

        for (i, (issue, count)) in rules.iter().take(self.top_n).enumerate() {
            println!(
                "  {:>2}. {}  {:>5}  {}",
                i + 1,
                palette::rule(**issue),
                palette::count(**count),
                issue.name().dimmed()
            );
        }

        let remaining = rules.len().saturating_sub(self.top_n);
        if remaining > 0 {
            println!("      ... and {} more rules", remaining.to_string().dimmed());
        }
    }

    fn print_confidence_breakdown(&self, stats: &ResultStats) {
        println!("{}", "By Confidence:".white().bold());
        let total = stats.total_issues as f64;

        for (confidence, count) in [
            (Confidence::High, stats.high),
            (Confidence::Medium, stats.medium),
            (Confidence::Low, stats.low),
        ] {
            if count > 0 {
                let pct = (count as f64 / total) * 100.0;
                println!(
                    "  {} {:<6} {:>6} ({:>5.1}%)",
                    palette::confidence(confidence),
                    confidence.as_str(),
                    count,
                    pct
                );
            }
        }
    }

    fn print_footer(&self) {
        println!("{}", palette::thin_divider(50));
        if self.is_final_summary {
            println!(
                "{}",
                "Tip: Use --generate-baseline to accept the current findings".dimmed()
            );
        } else {
            println!("{}", "Run without --summary for full details".dimmed());
        }
        println!(
            "{}",
            "Use --min-confidence high to filter inferred findings".dimmed()
        );
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
