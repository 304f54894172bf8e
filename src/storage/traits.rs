//! Storage trait
//!
//! This module defines the filesystem capability the crawler needs. The
//! traversal engine receives it at construction, so tests can substitute an
//! in-memory implementation.

use std::io;
use std::path::Path;

/// Trait for the filesystem operations used to persist pages
///
/// Implementations must be safe to share between the concurrent tasks of a
/// level.
pub trait PageStore: Send + Sync {
    /// Returns true if a regular file exists at the given path
    ///
    /// A directory at the path does not count as a saved page.
    fn exists(&self, path: &Path) -> bool;

    /// Creates a directory and all of its missing parents
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Writes a new file
    ///
    /// Must fail with [`io::ErrorKind::AlreadyExists`] instead of replacing a
    /// file that is already present.
    fn create_new(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Reads a previously written file
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}
