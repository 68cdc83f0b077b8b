//! Source file discovery

use crate::config::Config;
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::{Path, PathBuf};
use tracing::debug;

const MANIFEST_FILE_NAME: &str = "AndroidManifest.xml";

/// Kind of file the analyzer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Kotlin,
    Java,
    Manifest,
}

impl FileType {
    pub fn from_path(path: &Path) -> Option<Self> {
        if path.file_name().and_then(|n| n.to_str()) == Some(MANIFEST_FILE_NAME) {
            return Some(FileType::Manifest);
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("kt") => Some(FileType::Kotlin),
            Some("java") => Some(FileType::Java),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub file_type: FileType,
}

impl SourceFile {
    pub fn new(path: PathBuf, file_type: FileType) -> Self {
        Self { path, file_type }
    }
}

/// Walks a project honoring `.gitignore`, configured targets and excludes
pub struct FileFinder<'a> {
    config: &'a Config,
}

impl<'a> FileFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Every analyzable file under `root`, sorted by path
    pub fn find_files(&self, root: &Path) -> Result<Vec<SourceFile>> {
        let roots: Vec<PathBuf> = if self.config.targets.is_empty() {
            vec![root.to_path_buf()]
        } else {
            self.config
                .targets
                .iter()
                .map(|t| if t.is_absolute() { t.clone() } else { root.join(t) })
                .filter(|t| {
                    let exists = t.exists();
                    if !exists {
                        debug!("Target {} does not exist, skipping", t.display());
                    }
                    exists
                })
                .collect()
        };

        let mut overrides = OverrideBuilder::new(root);
        for pattern in &self.config.exclude {
            overrides
                .add(&format!("!{}", pattern))
                .into_diagnostic()
                .wrap_err_with(|| format!("Invalid exclude pattern '{}'", pattern))?;
        }
        let overrides = overrides.build().into_diagnostic()?;

        let mut files = Vec::new();
        for target in roots {
            let walker = WalkBuilder::new(&target)
                .require_git(false)
                .overrides(overrides.clone())
                .build();

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        debug!("Walk error: {}", e);
                        continue;
                    }
                };
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                if let Some(file_type) = FileType::from_path(entry.path()) {
                    files.push(SourceFile::new(entry.into_path(), file_type));
                }
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup_by(|a, b| a.path == b.path);
        debug!("Discovered {} files under {}", files.len(), root.display());
        Ok(files)
    }
}
