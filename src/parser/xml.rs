//! AndroidManifest.xml reader
//!
//! Only the pieces the manifest rules look at are extracted: the manifest
//! package and every application component with its process attribute.

use super::common::{ParseError, ParseResult, Parser};
use crate::graph::{Language, Location, ManifestComponent};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

const COMPONENT_TAGS: &[&str] = &["activity", "activity-alias", "service", "receiver", "provider"];

pub struct ManifestParser;

impl ManifestParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ManifestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for ManifestParser {
    fn parse(&self, path: &Path, contents: &str) -> Result<ParseResult, ParseError> {
        let mut result = ParseResult::new(path, Language::Xml);
        let mut reader = Reader::from_str(contents);
        reader.config_mut().trim_text(true);

        let mut package: Option<String> = None;
        let mut in_application = false;

        loop {
            let event = reader.read_event().map_err(|e| ParseError::Xml {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            let end = usize::try_from(reader.buffer_position()).unwrap_or(contents.len());

            match event {
                Event::Start(ref tag) | Event::Empty(ref tag) => {
                    let is_empty = matches!(event, Event::Empty(_));
                    let name = tag_name(tag);
                    match name.as_str() {
                        "manifest" => {
                            package = attribute(tag, "package");
                            result.file.package = package.clone();
                        }
                        "application" => in_application = !is_empty,
                        n if in_application && COMPONENT_TAGS.contains(&n) => {
                            let component_name = attribute(tag, "android:name")
                                .or_else(|| attribute(tag, "android:targetActivity"));
                            result.manifest_components.push(ManifestComponent {
                                tag: name.clone(),
                                name: component_name
                                    .map(|n| qualify(&n, package.as_deref())),
                                process: attribute(tag, "android:process"),
                                ignored: attribute(tag, "tools:ignore")
                                    .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                                    .unwrap_or_default(),
                                location: tag_location(path, contents, end),
                            });
                        }
                        _ => {}
                    }
                }
                Event::End(ref tag) => {
                    if tag.name().as_ref() == b"application" {
                        in_application = false;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(result)
    }
}

fn tag_name(tag: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(tag.name().as_ref()).into_owned()
}

/// Raw attribute value; manifests rarely carry entities worth decoding
fn attribute(tag: &BytesStart<'_>, key: &str) -> Option<String> {
    tag.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key.as_bytes())
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Expand `.Foo` and bare `Foo` against the manifest package
fn qualify(name: &str, package: Option<&str>) -> String {
    match package {
        Some(pkg) if name.starts_with('.') => format!("{}{}", pkg, name),
        Some(pkg) if !name.is_empty() && !name.contains('.') => format!("{}.{}", pkg, name),
        _ => name.to_string(),
    }
}

/// Locate the `<` that opened the tag ending at byte `end`
fn tag_location(path: &Path, contents: &str, end: usize) -> Location {
    let end = end.min(contents.len());
    let start = contents
        .get(..end)
        .and_then(|head| head.rfind('<'))
        .unwrap_or(0);
    let before = &contents[..start];
    let line = before.matches('\n').count() + 1;
    let column = start - before.rfind('\n').map(|i| i + 1).unwrap_or(0) + 1;
    Location::new(path.to_path_buf(), line, column, start, end)
}
