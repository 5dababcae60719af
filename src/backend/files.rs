//! Raw byte access for asset paths.
//!
//! Paths are the engine's asset paths (forward slashes, relative to the asset
//! root). How the bytes are fetched is up to the [`FileSource`]; the engine
//! ships a directory-backed source and an in-memory one.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Something that can produce the bytes stored at an asset path.
pub trait FileSource: Send + Sync {
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

impl<T: FileSource + ?Sized> FileSource for Arc<T> {
    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        (**self).read(path)
    }
}

/// Reads asset paths from a directory on disk.
#[derive(Debug, Clone)]
pub struct DiskFiles {
    root: PathBuf,
}

impl DiskFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileSource for DiskFiles {
    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.root.join(path))
    }
}

/// In-memory file table keyed by asset path.
#[derive(Default)]
pub struct MemoryFiles {
    files: RwLock<FxHashMap<String, Vec<u8>>>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<String>, bytes: Vec<u8>) {
        self.files.write().insert(path.into(), bytes);
    }

    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        self.files.write().remove(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.read().contains_key(path)
    }
}

impl FileSource for MemoryFiles {
    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files.read().get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such file: {path}"))
        })
    }
}
