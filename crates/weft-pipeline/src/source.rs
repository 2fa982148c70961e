//! Source access abstraction.
//!
//! The planner never touches the filesystem directly: every read goes through
//! a `SourceGraph`. Paths handed to a source graph are relative to its root
//! and already normalized.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use path_clean::PathClean;

/// Read-only view of a project's files.
pub trait SourceGraph: std::fmt::Debug {
    /// Directory module paths are relative to
    fn root(&self) -> &Path;

    /// Whether `path` is a file
    fn exists(&self, path: &Path) -> bool;

    /// File content as UTF-8, `None` when missing or not text
    fn read(&self, path: &Path) -> Option<String>;

    /// File size in bytes
    fn size(&self, path: &Path) -> Option<u64> {
        self.read(path).map(|content| content.len() as u64)
    }
}

/// Project files on disk.
#[derive(Debug, Clone)]
pub struct FsSourceGraph {
    root: PathBuf,
}

impl FsSourceGraph {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl SourceGraph for FsSourceGraph {
    fn root(&self) -> &Path {
        &self.root
    }

    fn exists(&self, path: &Path) -> bool {
        self.root.join(path).is_file()
    }

    fn read(&self, path: &Path) -> Option<String> {
        fs::read_to_string(self.root.join(path)).ok()
    }

    fn size(&self, path: &Path) -> Option<u64> {
        fs::metadata(self.root.join(path))
            .ok()
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len())
    }
}

/// In-memory project, for tests and generated sources.
///
/// ```
/// use std::path::Path;
/// use weft_pipeline::{MemorySourceGraph, SourceGraph};
///
/// let source = MemorySourceGraph::new("/project")
///     .with_file("./src/js/index.js", "import '../scss/main.scss';");
///
/// assert!(source.exists(Path::new("src/js/index.js")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySourceGraph {
    root: PathBuf,
    files: IndexMap<PathBuf, String>,
}

impl MemorySourceGraph {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: IndexMap::new(),
        }
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files.insert(path.as_ref().clean(), content.into());
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl SourceGraph for MemorySourceGraph {
    fn root(&self) -> &Path {
        &self.root
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read(&self, path: &Path) -> Option<String> {
        self.files.get(path).cloned()
    }
}
