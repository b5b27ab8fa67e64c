//! Byte-range edit buffer for one translation unit.
//!
//! Edits are expressed in ORIGINAL source offsets and applied as soon as
//! they are registered. The buffer keeps the applied edits sorted so any
//! later original offset can be mapped to its position in the working text.
//!
//! # Usage
//!
//! ```
//! use instrument_repairable::edit::{Edit, TranslationUnitBuffer};
//!
//! let mut buffer = TranslationUnitBuffer::new("if (x > 0) y = 1;");
//! buffer.replace(Edit::new(15, 16, "2")).expect("should apply");
//! buffer.replace(Edit::new(4, 9, "x >= 0")).expect("should apply");
//! assert_eq!(buffer.text(), "if (x >= 0) y = 2;");
//! ```

/// A single edit operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Start byte offset in the original source (inclusive)
    pub start_byte: usize,
    /// End byte offset in the original source (exclusive)
    pub end_byte: usize,
    /// Replacement content
    pub replacement: String,
    /// Optional description for logging
    pub description: Option<String>,
}

impl Edit {
    /// Create a new edit
    #[must_use]
    pub fn new(start_byte: usize, end_byte: usize, replacement: impl Into<String>) -> Self {
        Self {
            start_byte,
            end_byte,
            replacement: replacement.into(),
            description: None,
        }
    }

    /// Create an edit with description
    #[must_use]
    pub fn with_description(
        start_byte: usize,
        end_byte: usize,
        replacement: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            start_byte,
            end_byte,
            replacement: replacement.into(),
            description: Some(description.into()),
        }
    }

    /// Length of the range being replaced
    #[must_use]
    pub const fn range_len(&self) -> usize {
        self.end_byte.saturating_sub(self.start_byte)
    }

    /// Check if this edit overlaps with another.
    ///
    /// An insertion overlaps a replacement when it falls strictly inside
    /// the replaced range; insertions at either boundary do not.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        if self.start_byte == self.end_byte {
            return other.start_byte < self.start_byte && self.start_byte < other.end_byte;
        }
        if other.start_byte == other.end_byte {
            return self.start_byte < other.start_byte && other.start_byte < self.end_byte;
        }
        self.start_byte < other.end_byte && other.start_byte < self.end_byte
    }
}

/// Error during rewriting
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    /// The edit overlaps an edit that was registered before it
    #[error("Edit {start_byte}..{end_byte} overlaps registered edit {existing_start}..{existing_end}")]
    OverlappingEdits {
        /// Start of the rejected edit
        start_byte: usize,
        /// End of the rejected edit
        end_byte: usize,
        /// Start of the edit already in the buffer
        existing_start: usize,
        /// End of the edit already in the buffer
        existing_end: usize,
    },
    /// Edit range is out of bounds
    #[error("Edit out of bounds: {start_byte}..{end_byte} exceeds source length {source_len}")]
    OutOfBounds {
        /// Start byte of the edit
        start_byte: usize,
        /// End byte of the edit
        end_byte: usize,
        /// Length of the source
        source_len: usize,
    },
    /// Edit boundary falls inside a UTF-8 sequence
    #[error("Edit boundary at byte {0} is not a character boundary")]
    InvalidUtf8(usize),
}

/// Working copy of one source file plus the edits applied to it.
///
/// Invariant: `applied` is sorted by original start offset, no two applied
/// edits overlap, and the original text between applied edits appears
/// verbatim in `current`.
#[derive(Debug, Clone)]
pub struct TranslationUnitBuffer {
    /// Original source code
    original: String,
    /// Source with every applied edit
    current: String,
    /// Applied edits, in original coordinates
    applied: Vec<Edit>,
}

impl TranslationUnitBuffer {
    /// Create a new buffer for the given source
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        let original = source.into();
        Self {
            current: original.clone(),
            original,
            applied: Vec::new(),
        }
    }

    /// The unmodified source.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The source with every registered edit applied.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.current
    }

    /// Get the number of applied edits
    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.applied.len()
    }

    /// Check if any edit was applied
    #[must_use]
    pub fn has_edits(&self) -> bool {
        !self.applied.is_empty()
    }

    /// Applied edits ordered by original position.
    #[must_use]
    pub fn edits(&self) -> &[Edit] {
        &self.applied
    }

    /// Position in the working text of an original offset.
    ///
    /// Edits ending at or before `offset` shift it; an insertion exactly at
    /// `offset` counts as before it.
    #[must_use]
    pub fn map_offset(&self, offset: usize) -> usize {
        let mut mapped = offset;
        for edit in self.applied.iter().take_while(|e| e.end_byte <= offset) {
            mapped = mapped + edit.replacement.len() - edit.range_len();
        }
        mapped
    }

    /// Validate an edit against the original source and the applied edits.
    ///
    /// # Errors
    /// Returns error if the edit is out of bounds, splits a character, or
    /// overlaps an applied edit
    pub fn validate(&self, edit: &Edit) -> Result<(), RewriteError> {
        if edit.start_byte > edit.end_byte || edit.end_byte > self.original.len() {
            return Err(RewriteError::OutOfBounds {
                start_byte: edit.start_byte,
                end_byte: edit.end_byte,
                source_len: self.original.len(),
            });
        }
        for boundary in [edit.start_byte, edit.end_byte] {
            if !self.original.is_char_boundary(boundary) {
                return Err(RewriteError::InvalidUtf8(boundary));
            }
        }
        if let Some(existing) = self.applied.iter().find(|e| e.overlaps(edit)) {
            return Err(RewriteError::OverlappingEdits {
                start_byte: edit.start_byte,
                end_byte: edit.end_byte,
                existing_start: existing.start_byte,
                existing_end: existing.end_byte,
            });
        }
        Ok(())
    }

    /// Replace the original range of `edit` with its replacement.
    ///
    /// Edits may be registered in any order; each one is resolved against
    /// original coordinates, so earlier and later edits stay valid.
    ///
    /// # Errors
    /// Returns error if the edit is rejected by [`Self::validate`]; the
    /// buffer is left unchanged in that case
    pub fn replace(&mut self, edit: Edit) -> Result<(), RewriteError> {
        self.validate(&edit)?;

        // Untouched original text between applied edits is verbatim in
        // `current`, so the target keeps its original length there.
        let start = self.map_offset(edit.start_byte);
        let end = start + edit.range_len();
        self.current.replace_range(start..end, &edit.replacement);

        let index = self
            .applied
            .partition_point(|e| e.end_byte <= edit.start_byte);
        self.applied.insert(index, edit);
        Ok(())
    }
}
