//! Line reader for simple text files
//!
//! Returns trimmed, non-blank lines, optionally skipping comment lines.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// Default comment marker
pub const DEFAULT_COMMENT_MARKERS: &[char] = &['#'];

/// Reads a text file line by line, skipping blank and comment lines
///
/// A comment line is one whose first non-whitespace character is one of the
/// configured comment markers. The file handle is released when the reader
/// is dropped.
pub struct TextReader<R = BufReader<File>> {
    inner: R,
    path: Option<PathBuf>,
    comment_markers: Vec<char>,
    ignore_comments: bool,
    line_number: usize,
    buf: String,
}

impl TextReader {
    /// Open a text file for reading
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::file(path, e))?;
        debug!(path = %path.display(), "Opened text file");

        let mut reader = Self::from_reader(BufReader::new(file));
        reader.path = Some(path.to_path_buf());
        Ok(reader)
    }
}

impl<R: BufRead> TextReader<R> {
    /// Wrap any buffered reader
    pub fn from_reader(inner: R) -> Self {
        Self {
            inner,
            path: None,
            comment_markers: DEFAULT_COMMENT_MARKERS.to_vec(),
            ignore_comments: true,
            line_number: 0,
            buf: String::new(),
        }
    }

    /// Set the characters that mark a comment line
    pub fn with_comment_markers(mut self, markers: &[char]) -> Self {
        self.comment_markers = markers.to_vec();
        self
    }

    /// Whether comment lines are skipped (default) or returned
    pub fn ignore_comments(mut self, ignore: bool) -> Self {
        self.ignore_comments = ignore;
        self
    }

    /// Path of the underlying file, if opened from one
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 1-based line number of the last line returned (0 before the first read)
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Check whether a trimmed line is a comment
    pub fn is_comment(&self, line: &str) -> bool {
        line.chars()
            .next()
            .is_some_and(|c| self.comment_markers.contains(&c))
    }

    /// Read the next non-blank line, trimmed. Returns `None` at end of file.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        loop {
            self.buf.clear();
            let n = self.inner.read_line(&mut self.buf).map_err(|e| match &self.path {
                Some(path) => Error::file(path, e),
                None => Error::Io(e),
            })?;
            if n == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let mut line = self.buf.as_str();
            if self.line_number == 1 {
                line = line.strip_prefix('\u{feff}').unwrap_or(line);
            }
            let line = line.trim();

            if line.is_empty() || (self.ignore_comments && self.is_comment(line)) {
                continue;
            }
            return Ok(Some(line.to_string()));
        }
    }

    /// Read every remaining line into a list
    pub fn read_lines(&mut self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        while let Some(line) = self.read_line()? {
            lines.push(line);
        }
        Ok(lines)
    }
}

impl<R: BufRead> Iterator for TextReader<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_line().transpose()
    }
}
