//! Persistence of generated sources.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::type_ref::TypeRef;

/// Extension of generated source files.
pub const SOURCE_EXTENSION: &str = "java";

/// Destination for completed source buffers.
pub trait OutputSink {
    /// Persist `source` as the compilation unit of `type_ref`, replacing any
    /// previous content.
    fn write(&mut self, type_ref: &TypeRef, source: &str) -> Result<()>;
}

/// Relative path of the source file for `type_ref`: `com/example/Widget.java`.
pub fn source_path(type_ref: &TypeRef) -> PathBuf {
    let mut path = PathBuf::new();
    for segment in type_ref.namespace().split('.').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path.push(format!("{}.{SOURCE_EXTENSION}", type_ref.name()));
    path
}

/// Writes sources below a root directory, one file per type.
#[derive(Debug, Clone)]
pub struct DirectoryOutput {
    root: PathBuf,
}

impl DirectoryOutput {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Full path of the file `type_ref` is written to.
    pub fn path_for(&self, type_ref: &TypeRef) -> PathBuf {
        self.root.join(source_path(type_ref))
    }

    pub fn exists(&self, type_ref: &TypeRef) -> bool {
        self.path_for(type_ref).is_file()
    }
}

impl OutputSink for DirectoryOutput {
    fn write(&mut self, type_ref: &TypeRef, source: &str) -> Result<()> {
        write_file(&self.path_for(type_ref), source)
    }
}

/// Write content to a file, creating parent directories as needed.
fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, content).map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

#[derive(Debug, Default)]
struct MemoryFiles {
    files: BTreeMap<PathBuf, String>,
    writes: Vec<PathBuf>,
}

/// In-memory sink. Clones share the same files, so a handle kept outside the
/// engine observes everything written through it.
#[derive(Debug, Clone, Default)]
pub struct MemoryOutput {
    inner: Rc<RefCell<MemoryFiles>>,
}

impl MemoryOutput {
    /// Current content of the file at `path` (as produced by [`source_path`]).
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.inner.borrow().files.get(path.as_ref()).cloned()
    }

    /// Content written for `type_ref`.
    pub fn source_of(&self, type_ref: &TypeRef) -> Option<String> {
        self.get(source_path(type_ref))
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.inner.borrow().files.keys().cloned().collect()
    }

    /// Total number of writes, including overwrites.
    pub fn write_count(&self) -> usize {
        self.inner.borrow().writes.len()
    }

    /// Number of writes to `path`.
    pub fn writes_to(&self, path: impl AsRef<Path>) -> usize {
        let path = path.as_ref();
        self.inner.borrow().writes.iter().filter(|p| *p == path).count()
    }
}

impl OutputSink for MemoryOutput {
    fn write(&mut self, type_ref: &TypeRef, source: &str) -> Result<()> {
        let path = source_path(type_ref);
        let mut inner = self.inner.borrow_mut();
        inner.writes.push(path.clone());
        inner.files.insert(path, source.to_string());
        Ok(())
    }
}
