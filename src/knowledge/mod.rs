//! Knowledge base aggregation.
//!
//! This module scans a fixed directory of plain-text documents and
//! concatenates their contents, each prefixed with a file header, into
//! a single string the agent hands to the LLM as tool output.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Sentinel returned when the knowledge directory contains no text files.
///
/// Callers must treat this as valid output, not a failure.
pub const EMPTY_SENTINEL: &str = "No text files found.";

/// Failure while reading a document.
///
/// Covers open, I/O, and UTF-8 decode errors alike; the tool boundary
/// does not distinguish sub-causes.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("{path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Result of one aggregation pass over the knowledge directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    /// Concatenated headers and contents of every matching file.
    Documents(String),
    /// No `.txt` files were found.
    Empty,
}

/// Aggregator over a directory of `.txt` documents.
///
/// The directory is resolved once at construction and never re-derived,
/// so results are independent of the caller's working directory. The
/// aggregator itself is stateless: every call re-reads the directory.
pub struct KnowledgeBase {
    dir: PathBuf,
    sorted: bool,
}

impl KnowledgeBase {
    /// Create a knowledge base rooted at an explicit directory.
    pub fn new(dir: PathBuf, sorted: bool) -> Self {
        Self { dir, sorted }
    }

    /// Create a knowledge base at the default location: a directory named
    /// `data` sibling to the running executable.
    pub fn at_default_location(sorted: bool) -> anyhow::Result<Self> {
        let exe = std::env::current_exe()?;
        let dir = exe
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Executable has no parent directory"))?
            .join("data");
        Ok(Self::new(dir, sorted))
    }

    /// The resolved knowledge directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Enumerate `.txt` files in the knowledge directory.
    ///
    /// A missing or unreadable directory enumerates as zero files. Order
    /// is whatever the directory listing yields unless sorting is enabled.
    fn list_files(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Cannot read knowledge directory {}: {}", self.dir.display(), e);
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("txt")
            })
            .collect();

        if self.sorted {
            files.sort_by_key(|path| path.file_name().map(|n| n.to_os_string()));
        }

        files
    }

    /// Aggregate all documents into a single snapshot.
    ///
    /// Each file is fully read and closed before the next is opened. Any
    /// read failure aborts the pass; partial output is discarded.
    pub fn aggregate(&self) -> Result<Snapshot, KnowledgeError> {
        let files = self.list_files();

        if files.is_empty() {
            debug!("No text files in {}", self.dir.display());
            return Ok(Snapshot::Empty);
        }

        let mut combined = String::new();

        for path in &files {
            let content = fs::read_to_string(path).map_err(|source| KnowledgeError::Read {
                path: path.display().to_string(),
                source,
            })?;

            let basename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            combined.push_str(&format!("\n--- FILE: {} ---\n", basename));
            combined.push_str(&content);
        }

        debug!("Aggregated {} documents", files.len());
        Ok(Snapshot::Documents(combined))
    }

    /// Tool-facing adapter: always returns a string, never an error.
    ///
    /// Failure paths are encoded as sentinel values so the caller can
    /// forward the result verbatim into the model's context.
    pub fn tool_output(&self) -> String {
        match self.aggregate() {
            Ok(Snapshot::Documents(text)) => text,
            Ok(Snapshot::Empty) => EMPTY_SENTINEL.to_string(),
            Err(e) => format!("Error reading file: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn kb(dir: &TempDir) -> KnowledgeBase {
        KnowledgeBase::new(dir.path().to_path_buf(), false)
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(kb(&temp_dir).aggregate().unwrap(), Snapshot::Empty);
        assert_eq!(kb(&temp_dir).tool_output(), EMPTY_SENTINEL);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let kb = KnowledgeBase::new(temp_dir.path().join("does_not_exist"), false);
        assert_eq!(kb.tool_output(), EMPTY_SENTINEL);
    }

    #[test]
    fn test_single_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), "hello").unwrap();

        assert_eq!(kb(&temp_dir).tool_output(), "\n--- FILE: a.txt ---\nhello");
    }

    #[test]
    fn test_two_files_both_present() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), "alpha body").unwrap();
        std::fs::write(temp_dir.path().join("b.txt"), "beta body").unwrap();

        let output = kb(&temp_dir).tool_output();

        assert_eq!(output.matches("--- FILE: a.txt ---").count(), 1);
        assert_eq!(output.matches("--- FILE: b.txt ---").count(), 1);
        assert_eq!(output.matches("alpha body").count(), 1);
        assert_eq!(output.matches("beta body").count(), 1);
    }

    #[test]
    fn test_non_txt_files_excluded() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), "keep").unwrap();
        std::fs::write(temp_dir.path().join("b.csv"), "col1,col2").unwrap();
        std::fs::write(temp_dir.path().join("c.md"), "# heading").unwrap();

        let output = kb(&temp_dir).tool_output();

        assert!(output.contains("keep"));
        assert!(!output.contains("col1"));
        assert!(!output.contains("heading"));
    }

    #[test]
    fn test_invalid_utf8_discards_everything() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("bad.txt"), [0xff, 0xfe, 0xfd]).unwrap();
        std::fs::write(temp_dir.path().join("good.txt"), "readable").unwrap();

        let output = kb(&temp_dir).tool_output();

        // Enumeration order is unspecified, but an error always discards
        // partial output, so no file content may survive.
        assert!(output.starts_with("Error reading file:"));
        assert!(!output.contains("readable"));
        assert!(kb(&temp_dir).aggregate().is_err());
    }

    #[test]
    fn test_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), "stable").unwrap();

        let kb = kb(&temp_dir);
        assert_eq!(kb.tool_output(), kb.tool_output());
    }

    #[test]
    fn test_sorted_order() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("b.txt"), "second").unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), "first").unwrap();

        let kb = KnowledgeBase::new(temp_dir.path().to_path_buf(), true);
        let output = kb.tool_output();

        let a_pos = output.find("--- FILE: a.txt ---").unwrap();
        let b_pos = output.find("--- FILE: b.txt ---").unwrap();
        assert!(a_pos < b_pos);
    }

    #[test]
    fn test_subdirectories_ignored() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("nested.txt")).unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), "top level").unwrap();

        let output = kb(&temp_dir).tool_output();
        assert!(output.contains("top level"));
        assert!(!output.contains("nested.txt"));
    }
}
