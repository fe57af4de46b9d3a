// src/fs/mock.rs

use super::FileSystem;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEntry {
    File { readable: bool, executable: bool },
    Dir,
}

/// In-memory filesystem for exercising preflight logic without touching disk.
///
/// Paths are compared verbatim; tests should use the same spelling they put
/// into the configuration.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    created: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::File { readable: true, executable: false });
    }

    pub fn add_executable(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::File { readable: true, executable: true });
    }

    pub fn add_unreadable_file(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::File { readable: false, executable: false });
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Dir);
    }

    /// Directories created through [`FileSystem::create_dir_all`], in order.
    pub fn created_dirs(&self) -> Vec<PathBuf> {
        self.created.lock().unwrap().clone()
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(path.to_path_buf(), entry);
        // Parents exist implicitly.
        let mut parent = path.parent();
        while let Some(p) = parent {
            if p.as_os_str().is_empty() {
                break;
            }
            entries.entry(p.to_path_buf()).or_insert(MockEntry::Dir);
            parent = p.parent();
        }
    }

    fn get(&self, path: &Path) -> Option<MockEntry> {
        self.entries.lock().unwrap().get(path).copied()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.get(path), Some(MockEntry::Dir))
    }

    fn is_readable(&self, path: &Path) -> bool {
        matches!(self.get(path), Some(MockEntry::File { readable: true, .. }))
    }

    fn is_executable(&self, path: &Path) -> bool {
        matches!(self.get(path), Some(MockEntry::File { executable: true, .. }))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        match self.get(path) {
            Some(MockEntry::Dir) => Ok(()),
            Some(MockEntry::File { .. }) => Err(anyhow!("File exists: {:?}", path)),
            None => {
                self.insert(path, MockEntry::Dir);
                self.created.lock().unwrap().push(path.to_path_buf());
                Ok(())
            }
        }
    }
}
