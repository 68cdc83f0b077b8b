//! Colors and glyphs shared by the terminal reporters
//!
//! A rule code is painted in the color of its category, so Room findings,
//! restricted API calls and compatibility problems separate at a glance in
//! every format.

use crate::analysis::{Confidence, LintIssue, Severity};
use colored::{Color, ColoredString, Colorize};

pub fn category_color(category: &str) -> Color {
    match category {
        "Room Database" => Color::Cyan,
        "Restricted API" => Color::Magenta,
        "Backward Compatibility" => Color::Yellow,
        _ => Color::White,
    }
}

pub fn category(name: &str) -> ColoredString {
    name.color(category_color(name)).bold()
}

pub fn rule(issue: LintIssue) -> ColoredString {
    issue.code().color(category_color(issue.category()))
}

/// Severity as a fixed-width label (`error  `, `warning`, `info   `)
pub fn severity(severity: Severity) -> ColoredString {
    let label = format!("{:<7}", severity.as_str());
    match severity {
        Severity::Error => label.red().bold(),
        Severity::Warning => label.yellow().bold(),
        Severity::Info => label.blue(),
    }
}

/// How sure the resolver was: filled for exact matches, hollow for guesses
pub fn confidence(confidence: Confidence) -> ColoredString {
    match confidence {
        Confidence::High => "●".green(),
        Confidence::Medium => "◐".yellow(),
        Confidence::Low => "○".dimmed(),
    }
}

pub fn path(text: &str) -> ColoredString {
    text.cyan().bold()
}

pub fn position(line: usize, column: usize) -> ColoredString {
    format!("{:>5}:{:<3}", line, column).dimmed()
}

pub fn subject(text: &str) -> ColoredString {
    text.bold()
}

pub fn count(n: usize) -> ColoredString {
    n.to_string().bold()
}

pub fn divider(width: usize) -> ColoredString {
    "━".repeat(width).dimmed()
}

pub fn thin_divider(width: usize) -> ColoredString {
    "─".repeat(width).dimmed()
}

/// Share of `part` in `total` as a bar of `width` cells, painted in the
/// category's color
pub fn share_bar(part: usize, total: usize, width: usize, category: &str) -> ColoredString {
    let filled = if total == 0 {
        0
    } else {
        ((part * width) as f64 / total as f64).round() as usize
    }
    .min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled)).color(category_color(category))
}
