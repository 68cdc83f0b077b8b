use super::Graph;
use crate::discovery::{FileType, SourceFile};
use crate::parser::{parse_source, ParseError, ParseResult};
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

/// Builds a [`Graph`] one file at a time
#[derive(Default)]
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read, parse and merge a file from disk
    pub fn process_file(&mut self, file: &SourceFile) -> Result<(), ParseError> {
        let contents = std::fs::read_to_string(&file.path).map_err(|source| ParseError::Io {
            path: file.path.clone(),
            source,
        })?;
        self.process_source(&file.path, file.file_type, &contents)
    }

    /// Parse and merge in-memory source
    pub fn process_source(
        &mut self,
        path: &Path,
        file_type: FileType,
        contents: &str,
    ) -> Result<(), ParseError> {
        let result = parse_source(path, file_type, contents)?;
        self.merge(result);
        Ok(())
    }

    fn merge(&mut self, result: ParseResult) {
        debug!(
            "{}: {} declarations, {} calls",
            result.file.path.display(),
            result.declarations.len(),
            result.calls.len()
        );
        self.graph.add_file(result.file);
        for decl in result.declarations {
            self.graph.add_declaration(decl);
        }
        for call in result.calls {
            self.graph.add_call(call);
        }
        for component in result.manifest_components {
            self.graph.add_manifest_component(component);
        }
    }

    pub fn build(self) -> Graph {
        self.graph
    }
}

/// Parses files on the rayon pool and merges the results in file order
#[derive(Default)]
pub struct ParallelGraphBuilder;

impl ParallelGraphBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Files that fail to read or parse are logged and skipped
    pub fn build_from_files(&self, files: &[SourceFile]) -> Graph {
        let results: Vec<Option<ParseResult>> = files
            .par_iter()
            .map(|file| {
                let parsed = std::fs::read_to_string(&file.path)
                    .map_err(|source| ParseError::Io {
                        path: file.path.clone(),
                        source,
                    })
                    .and_then(|contents| parse_source(&file.path, file.file_type, &contents));
                match parsed {
                    Ok(result) => Some(result),
                    Err(e) => {
                        warn!("Skipping {}: {}", file.path.display(), e);
                        None
                    }
                }
            })
            .collect();

        let mut builder = GraphBuilder::new();
        for result in results.into_iter().flatten() {
            builder.merge(result);
        }
        builder.build()
    }
}
