//! Resource store abstraction
//!
//! Font descriptors, atlas textures and vector sources are read and
//! written through this seam. Production uses a directory-rooted
//! filesystem store; tests and embedders can supply an in-memory one.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

pub trait ResourceStore: Send + Sync {
    fn read(&self, path: &str) -> Result<Vec<u8>>;
    fn write(&self, path: &str, data: &[u8]) -> Result<()>;
    /// Create the directory (and parents) if missing.
    fn ensure_dir(&self, path: &str) -> Result<()>;
}

/// Filesystem store rooted at a directory; all paths are relative to it.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirStore { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl ResourceStore for DirStore {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        std::fs::read(self.resolve(path)).map_err(|e| Error::resource(path, e))
    }

    fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        std::fs::write(self.resolve(path), data).map_err(|e| Error::resource(path, e))
    }

    fn ensure_dir(&self, path: &str) -> Result<()> {
        std::fs::create_dir_all(self.resolve(path)).map_err(|e| Error::resource(path, e))
    }
}

/// In-memory store keyed by path. Directories are implicit.
#[derive(Default)]
pub struct MemStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }
}

impl ResourceStore for MemStore {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| {
                Error::resource(
                    path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no such resource"),
                )
            })
    }

    fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn ensure_dir(&self, _path: &str) -> Result<()> {
        Ok(())
    }
}
