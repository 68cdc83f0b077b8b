use crate::graph::{CallSite, Declaration, FileContext, Language, Location, ManifestComponent};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tree_sitter::Node;

/// Errors raised while reading or parsing a single file
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load {language} grammar: {message}")]
    Grammar {
        language: &'static str,
        message: String,
    },

    #[error("tree-sitter produced no tree for {path}")]
    NoTree { path: PathBuf },

    #[error("malformed XML in {path}: {message}")]
    Xml { path: PathBuf, message: String },
}

/// Everything extracted from one source file
#[derive(Debug)]
pub struct ParseResult {
    pub file: FileContext,
    pub declarations: Vec<Declaration>,
    pub calls: Vec<CallSite>,
    pub manifest_components: Vec<ManifestComponent>,
}

impl ParseResult {
    pub fn new(path: &Path, language: Language) -> Self {
        Self {
            file: FileContext::new(path.to_path_buf(), language),
            declarations: Vec::new(),
            calls: Vec::new(),
            manifest_components: Vec::new(),
        }
    }
}

/// A language front end
pub trait Parser {
    fn parse(&self, path: &Path, contents: &str) -> Result<ParseResult, ParseError>;
}

pub(crate) fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Location spanning `node`, reported at the node's start
pub(crate) fn node_location(node: Node<'_>, path: &Path) -> Location {
    let start = node.start_position();
    Location::new(
        path.to_path_buf(),
        start.row + 1,
        start.column + 1,
        node.start_byte(),
        node.end_byte(),
    )
}

/// Location spanning `node`, reported at `anchor` (usually the name)
pub(crate) fn anchored_location(node: Node<'_>, anchor: Node<'_>, path: &Path) -> Location {
    let start = anchor.start_position();
    Location::new(
        path.to_path_buf(),
        start.row + 1,
        start.column + 1,
        node.start_byte(),
        node.end_byte(),
    )
}

pub(crate) fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

pub(crate) fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

pub(crate) fn first_child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    children(node).into_iter().find(|c| c.kind() == kind)
}

/// Strip whitespace from a dotted path split across lines
pub(crate) fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Parse a Java/Kotlin integer literal (`1_000`, `0x1F`, `0b11`, `42L`, `7u`)
pub(crate) fn parse_int_literal(text: &str) -> Option<i64> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '_')
        .collect::<String>()
        .trim_end_matches(|c: char| matches!(c, 'l' | 'L' | 'u' | 'U'))
        .to_string();

    let lower = cleaned.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else if lower.len() > 1 && lower.starts_with('0') && lower.chars().all(|c| c.is_ascii_digit()) {
        i64::from_str_radix(&lower[1..], 8).ok()
    } else {
        lower.parse().ok()
    }
}

/// Remove surrounding quotes (plain or triple) and unescape simple escapes
pub(crate) fn unquote(text: &str) -> String {
    let inner = if text.len() >= 6 && text.starts_with("\"\"\"") && text.ends_with("\"\"\"") {
        &text[3..text.len() - 3]
    } else if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_literal() {
        assert_eq!(parse_int_literal("42"), Some(42));
        assert_eq!(parse_int_literal("1_000"), Some(1000));
        assert_eq!(parse_int_literal("0x1F"), Some(31));
        assert_eq!(parse_int_literal("0b101"), Some(5));
        assert_eq!(parse_int_literal("42L"), Some(42));
        assert_eq!(parse_int_literal("010"), Some(8));
        assert_eq!(parse_int_literal("0"), Some(0));
        assert_eq!(parse_int_literal("abc"), None);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"adservices.db\""), "adservices.db");
        assert_eq!(unquote("\"a\\\"b\""), "a\"b");
        assert_eq!(unquote("\"\"\"raw\"\"\""), "raw");
        assert_eq!(unquote("bare"), "bare");
    }

    #[test]
    fn test_compact() {
        assert_eq!(compact("android.os\n    .SystemProperties"), "android.os.SystemProperties");
    }
}
