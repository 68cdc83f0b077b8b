mod common;
mod java;
mod kotlin;
mod xml;

pub use common::{ParseError, ParseResult, Parser};
pub use java::JavaParser;
pub use kotlin::KotlinParser;
pub use xml::ManifestParser;

use crate::discovery::FileType;
use std::path::Path;

/// Parse `contents` with the front end matching `file_type`
pub fn parse_source(
    path: &Path,
    file_type: FileType,
    contents: &str,
) -> Result<ParseResult, ParseError> {
    match file_type {
        FileType::Kotlin => KotlinParser::new().parse(path, contents),
        FileType::Java => JavaParser::new().parse(path, contents),
        FileType::Manifest => ManifestParser::new().parse(path, contents),
    }
}
