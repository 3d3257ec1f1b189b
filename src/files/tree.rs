//! Recursive file listing
//!
//! Yields every regular file below a directory; directories themselves are
//! not returned.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

/// Iterates over all files in a directory tree
#[derive(Debug, Clone)]
pub struct FileTree {
    root: PathBuf,
    sorted: bool,
    max_depth: Option<usize>,
}

impl FileTree {
    /// Create a file tree rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            root: dir.into(),
            sorted: false,
            max_depth: None,
        }
    }

    /// Visit entries in file name order within each directory
    pub fn sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    /// Limit recursion depth (1 = only files directly in the root)
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Iterate over every file path
    pub fn files(&self) -> impl Iterator<Item = Result<PathBuf>> + use<> {
        let mut walk = WalkDir::new(&self.root);
        if self.sorted {
            walk = walk.sort_by_file_name();
        }
        if let Some(depth) = self.max_depth {
            walk = walk.max_depth(depth);
        }

        walk.into_iter().filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => Some(Ok(entry.into_path())),
            Ok(_) => None,
            Err(e) => Some(Err(e.into())),
        })
    }

    /// Count the files, failing on the first unreadable entry
    pub fn count(&self) -> Result<usize> {
        self.files().try_fold(0, |n, file| file.map(|_| n + 1))
    }
}

impl IntoIterator for &FileTree {
    type Item = Result<PathBuf>;
    type IntoIter = Box<dyn Iterator<Item = Result<PathBuf>>>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.files())
    }
}
