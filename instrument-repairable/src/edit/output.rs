//! Committing a translation unit buffer.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::buffer::TranslationUnitBuffer;
use crate::config::OutputMode;

/// What a commit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The file was overwritten with the rewritten source.
    Written,
    /// In-place mode with no edits: the file was left alone.
    Unchanged,
    /// The final buffer was written to the output stream.
    Streamed,
}

/// Error raised while committing a buffer.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// Overwriting the source file failed.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        /// File being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Writing to the output stream failed.
    #[error("Failed to stream rewritten source: {0}")]
    Stream(#[from] std::io::Error),
}

/// Commit `buffer`, the rewritten contents of `path`.
///
/// In-place mode overwrites the file only when an edit was applied. Stream
/// mode always writes the final buffer, so an untouched file is echoed
/// byte for byte.
///
/// # Errors
/// Returns error if the file or the stream cannot be written
pub fn commit<W: Write>(
    buffer: &TranslationUnitBuffer,
    path: &Path,
    mode: OutputMode,
    writer: &mut W,
) -> Result<CommitOutcome, CommitError> {
    match mode {
        OutputMode::InPlace => {
            if !buffer.has_edits() {
                return Ok(CommitOutcome::Unchanged);
            }
            fs::write(path, buffer.text()).map_err(|source| CommitError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(CommitOutcome::Written)
        }
        OutputMode::Stream => {
            writer.write_all(buffer.text().as_bytes())?;
            writer.flush()?;
            Ok(CommitOutcome::Streamed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::Edit;
    use tempfile::TempDir;

    #[test]
    fn test_stream_writes_buffer() {
        let mut buffer = TranslationUnitBuffer::new("int x = 1;\n");
        buffer.replace(Edit::new(8, 9, "2")).unwrap();
        let mut out = Vec::new();

        let outcome = commit(&buffer, Path::new("x.c"), OutputMode::Stream, &mut out).unwrap();
        assert_eq!(outcome, CommitOutcome::Streamed);
        assert_eq!(String::from_utf8(out).unwrap(), "int x = 2;\n");
    }

    #[test]
    fn test_stream_echoes_untouched_source() {
        let buffer = TranslationUnitBuffer::new("int x = 1;\n");
        let mut out = Vec::new();

        commit(&buffer, Path::new("x.c"), OutputMode::Stream, &mut out).unwrap();
        assert_eq!(out, b"int x = 1;\n");
    }

    #[test]
    fn test_in_place_overwrites_changed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.c");
        std::fs::write(&path, "int x = 1;\n").unwrap();
        let mut buffer = TranslationUnitBuffer::new("int x = 1;\n");
        buffer.replace(Edit::new(8, 9, "3")).unwrap();
        let mut out = Vec::new();

        let outcome = commit(&buffer, &path, OutputMode::InPlace, &mut out).unwrap();
        assert_eq!(outcome, CommitOutcome::Written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "int x = 3;\n");
        assert!(out.is_empty());
    }

    #[test]
    fn test_in_place_skips_unchanged_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.c");
        let buffer = TranslationUnitBuffer::new("int x;\n");
        let mut out = Vec::new();

        let outcome = commit(&buffer, &path, OutputMode::InPlace, &mut out).unwrap();
        assert_eq!(outcome, CommitOutcome::Unchanged);
        assert!(!path.exists());
    }

    #[test]
    fn test_in_place_write_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no").join("such").join("dir.c");
        let mut buffer = TranslationUnitBuffer::new("a");
        buffer.replace(Edit::new(0, 1, "b")).unwrap();
        let mut out = Vec::new();

        let err = commit(&buffer, &path, OutputMode::InPlace, &mut out).unwrap_err();
        assert!(matches!(err, CommitError::Write { .. }));
    }
}
