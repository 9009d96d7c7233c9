//! In-memory mock filesystem for testing collectors without real `/proc`.
//!
//! This module provides `MockFs` which simulates a filesystem in memory,
//! allowing tests to run on macOS and in CI environments without Linux.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Stores files and directories in memory, allowing tests to simulate
/// various `/proc` filesystem states without needing actual Linux access.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Removes a file, keeping its directory.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) {
        self.files.remove(path.as_ref());
    }

    /// Adds a process with the `/proc/[pid]/` files the sampler reads.
    ///
    /// # Arguments
    /// * `pid` - Process ID
    /// * `stat` - Content of `/proc/[pid]/stat`
    /// * `status` - Content of `/proc/[pid]/status`
    pub fn add_process(&mut self, pid: u32, stat: &str, status: &str) {
        let base = PathBuf::from(format!("/proc/{}", pid));
        self.add_dir(&base);
        self.add_file(base.join("stat"), stat);
        self.add_file(base.join("status"), status);
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let mut entries = HashSet::new();

        // Direct children only
        for file_path in self.files.keys() {
            if file_path.parent().is_some_and(|parent| parent == path) {
                entries.insert(file_path.clone());
            }
        }

        for dir_path in &self.directories {
            if dir_path.parent().is_some_and(|parent| parent == path) && dir_path != path {
                entries.insert(dir_path.clone());
            }
        }

        Ok(entries.into_iter().collect())
    }
}
