//! Resource loader
//!
//! Reads referenced YAML content into the document model through the
//! `ContentSource` port, so the resolver never touches the filesystem
//! directly and tests can run against an in-memory source.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml_ng::Value;

use crate::error::{KovlError, KovlResult};
use crate::model::Document;

/// File names recognized as a kustomization unit inside a directory
pub const KUSTOMIZATION_FILE_NAMES: [&str; 2] = ["kustomization.yaml", "kustomization.yml"];

/// Read-only content access for the resolver
///
/// Implementations:
/// - `FsSource` - standard file I/O
/// - `MemorySource` - in-memory for testing
pub trait ContentSource {
    /// Read file content as string
    fn read(&self, path: &Path) -> KovlResult<String>;

    /// Check if the path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if the path is a directory
    fn is_dir(&self, path: &Path) -> bool;
}

/// Local filesystem source
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl ContentSource for FsSource {
    fn read(&self, path: &Path) -> KovlResult<String> {
        if !path.exists() {
            return Err(KovlError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(fs::read_to_string(path)?)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// In-memory source for tests and embedded content
///
/// Paths ending in `/` (or inserted via `add_dir`) act as directories.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<PathBuf, String>,
    dirs: Vec<PathBuf>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> &mut Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            let mut dir = PathBuf::new();
            for component in parent.components() {
                dir.push(component);
                if !self.dirs.contains(&dir) {
                    self.dirs.push(dir.clone());
                }
            }
        }
        self.files.insert(path, content.into());
        self
    }

    pub fn add_dir(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.dirs.push(path.into());
        self
    }
}

impl ContentSource for MemorySource {
    fn read(&self, path: &Path) -> KovlResult<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| KovlError::NotFound {
                path: path.to_path_buf(),
            })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.iter().any(|d| d == path)
    }
}

/// Load all documents from one YAML file (multi-document streams allowed).
///
/// Documents come back in file order. Empty documents (bare `---`) are
/// skipped.
pub fn load_documents(source: &dyn ContentSource, path: &Path) -> KovlResult<Vec<Document>> {
    let content = source.read(path)?;
    parse_documents(&content, path)
}

/// Parse a YAML string into documents, attributing errors to `file`.
pub fn parse_documents(content: &str, file: &Path) -> KovlResult<Vec<Document>> {
    let mut docs = Vec::new();
    for de in serde_yaml_ng::Deserializer::from_str(content) {
        let value = Value::deserialize(de).map_err(|e| KovlError::MalformedDocument {
            file: file.to_path_buf(),
            message: format_yaml_error(&e),
        })?;
        if value.is_null() {
            continue;
        }
        docs.push(Document::from_value(value, file)?);
    }
    Ok(docs)
}

/// Resolve a reference to the kustomization file it denotes, if any.
///
/// A directory containing `kustomization.yaml`/`.yml` is a unit; so is the
/// file itself when referenced directly. Anything else is a plain resource
/// file.
pub fn kustomization_file(source: &dyn ContentSource, path: &Path) -> Option<PathBuf> {
    if source.is_dir(path) {
        for name in KUSTOMIZATION_FILE_NAMES {
            let candidate = path.join(name);
            if source.exists(&candidate) {
                return Some(candidate);
            }
        }
        return None;
    }
    let is_unit_file = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| KUSTOMIZATION_FILE_NAMES.contains(&n))
        .unwrap_or(false);
    if is_unit_file && source.exists(path) {
        return Some(path.to_path_buf());
    }
    None
}

fn format_yaml_error(err: &serde_yaml_ng::Error) -> String {
    match err.location() {
        Some(loc) => format!("line {}: {}", loc.line(), err),
        None => err.to_string(),
    }
}
