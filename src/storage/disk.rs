//! Local disk implementation of [`PageStore`]

use crate::storage::PageStore;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Stores pages on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskStore;

impl DiskStore {
    /// Creates a new disk store
    pub fn new() -> Self {
        Self
    }
}

impl PageStore for DiskStore {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        // Default permissions, subject to the process umask
        fs::create_dir_all(path)
    }

    fn create_new(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        file.write_all(contents.as_bytes())?;
        file.flush()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}
