//! Text source boundary for the undo engine.
//!
//! The engine never talks to a widget directly. It consumes a [`TextSource`]:
//! something that can report its current text, apply a range replacement, and
//! move the selection. Two implementations live here:
//!
//! - [`Document`]: a rope-backed reference source with a tracked selection,
//!   used by headless hosts and the test suites.
//! - `String`: the minimal source (selection requests are ignored). The
//!   history manager uses a plain `String` as its shadow copy of the host
//!   text, so playback can be dry-run against it before the live source is
//!   touched.
//!
//! All offsets in this workspace are byte offsets into the current UTF-8
//! text. `replace_range` validates that both ends of the replaced span fall
//! on char boundaries and inside the document; violations surface as
//! [`DocumentError`] so callers can treat a stale range as a recoverable
//! no-op rather than a panic.

use anyhow::Result;
use ropey::Rope;
use thiserror::Error;

pub mod diff;

pub use diff::{TextDelta, detect_change};

/// Errors surfaced by [`TextSource::replace_range`].
///
/// Both variants indicate that a stored range no longer corresponds to the
/// live text (typically because something mutated the source behind the
/// engine's back). They are recoverable by construction: the caller skips
/// the operation and leaves its own state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("replace range {start}..{end} exceeds document length {len}")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },
    #[error("offset {offset} is not a char boundary")]
    NotCharBoundary { offset: usize },
}

/// Host text abstraction consumed by the undo engine.
pub trait TextSource {
    /// Current full text as an owned string.
    fn text(&self) -> String;

    /// Byte length of the current text.
    fn len_bytes(&self) -> usize;

    /// Replace `length` bytes starting at `start` with `text`.
    ///
    /// Observed (not invoked) by the engine for ordinary edits; invoked by
    /// the engine during undo/redo playback.
    fn replace_range(&mut self, start: usize, length: usize, text: &str) -> Result<(), DocumentError>;

    /// Move the selection to `[start, start + length)`. Sources without a
    /// selection concept may ignore this.
    fn set_selection(&mut self, start: usize, length: usize);
}

/// A rope-backed text source with a tracked selection.
#[derive(Clone)]
pub struct Document {
    rope: Rope,
    pub name: String,
    selection: Option<(usize, usize)>,
}

impl Document {
    /// Construct a document from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        Ok(Self {
            rope: Rope::from_str(content),
            name: name.into(),
            selection: None,
        })
    }

    /// Last selection applied via `set_selection` as `(start, length)`.
    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    // Map a byte offset to a rope char index, rejecting offsets that are out
    // of range or fall inside a multi-byte sequence.
    fn byte_to_char_checked(&self, byte: usize) -> Result<usize, DocumentError> {
        let len = self.rope.len_bytes();
        if byte > len {
            return Err(DocumentError::RangeOutOfBounds {
                start: byte,
                end: byte,
                len,
            });
        }
        let ch = self.rope.byte_to_char(byte);
        if self.rope.char_to_byte(ch) != byte {
            return Err(DocumentError::NotCharBoundary { offset: byte });
        }
        Ok(ch)
    }
}

impl TextSource for Document {
    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    fn replace_range(&mut self, start: usize, length: usize, text: &str) -> Result<(), DocumentError> {
        let len = self.rope.len_bytes();
        let end = start.checked_add(length).ok_or(DocumentError::RangeOutOfBounds {
            start,
            end: usize::MAX,
            len,
        })?;
        if end > len {
            return Err(DocumentError::RangeOutOfBounds { start, end, len });
        }
        let start_char = self.byte_to_char_checked(start)?;
        let end_char = self.byte_to_char_checked(end)?;
        self.rope.remove(start_char..end_char);
        self.rope.insert(start_char, text);
        Ok(())
    }

    fn set_selection(&mut self, start: usize, length: usize) {
        self.selection = Some((start, length));
    }
}

impl TextSource for String {
    fn text(&self) -> String {
        self.clone()
    }

    fn len_bytes(&self) -> usize {
        self.len()
    }

    fn replace_range(&mut self, start: usize, length: usize, text: &str) -> Result<(), DocumentError> {
        let len = self.len();
        let end = start.checked_add(length).ok_or(DocumentError::RangeOutOfBounds {
            start,
            end: usize::MAX,
            len,
        })?;
        if end > len {
            return Err(DocumentError::RangeOutOfBounds { start, end, len });
        }
        if !self.is_char_boundary(start) {
            return Err(DocumentError::NotCharBoundary { offset: start });
        }
        if !self.is_char_boundary(end) {
            return Err(DocumentError::NotCharBoundary { offset: end });
        }
        String::replace_range(self, start..end, text);
        Ok(())
    }

    fn set_selection(&mut self, _start: usize, _length: usize) {}
}

/// Grapheme utilities. Pure helpers operating on event payloads.
pub mod grapheme {
    use unicode_segmentation::UnicodeSegmentation;

    /// True if `text` is exactly one grapheme cluster. A multi-code-unit
    /// cluster (combining sequence, emoji) still counts as single.
    pub fn is_single(text: &str) -> bool {
        let mut clusters = text.graphemes(true);
        clusters.next().is_some() && clusters.next().is_none()
    }
}
