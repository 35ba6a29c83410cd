//! Source provider abstraction for filesystem-independent loading.
//!
//! The scp text this pipeline consumes is the output of an upstream
//! preprocessing step. [`SourceProvider`] is the seam where that step
//! lives: an implementation either returns the preprocessed text for a
//! logical path or fails that one file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Trait that abstracts per-file text access for the loader.
pub trait SourceProvider {
    /// Read the preprocessed source text for a given logical path.
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error>;
}

/// Default filesystem-backed provider, delegating to `std::fs`.
pub struct FileSystemProvider;

impl SourceProvider for FileSystemProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        std::fs::read_to_string(path)
    }
}

/// In-memory provider for tests.
pub struct InMemoryProvider {
    files: HashMap<PathBuf, String>,
}

impl InMemoryProvider {
    pub fn new(files: HashMap<PathBuf, String>) -> Self {
        Self { files }
    }
}

impl SourceProvider for InMemoryProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found in memory: {}", path.display()),
            )
        })
    }
}
