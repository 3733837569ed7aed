//! Committed command model.
//!
//! A [`TextChange`] is the smallest undoable unit: the span that was
//! replaced, the text that used to occupy it, and the text that replaced it.
//! Offsets are byte offsets into the document as it was *before* the change
//! applied, so `end - start` is the length of the replaced text and
//! `start..start + inserted.len()` is the span the change occupies
//! afterwards. Only fully-formed changes exist at this level; accumulation
//! happens in the coalescer, and `Coalescer::take_pending` refuses to
//! produce a change without a recorded span. That makes the "invalid
//! command" failure mode of the original design unrepresentable here.
//!
//! [`Command`] tags a change as atomic or compound. Compound children are
//! stored in the order they were applied; undo walks them backwards.

use core_document::{DocumentError, TextSource};

/// A replaced range plus the text that was there and the text that
/// replaced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub start: usize,
    pub end: usize,
    pub inserted: String,
    pub replaced: String,
}

impl TextChange {
    /// Length of the text this change removed from the document.
    pub fn replaced_len(&self) -> usize {
        self.end - self.start
    }

    /// Apply in the forward (redo) direction: the original span becomes the
    /// inserted text.
    fn apply_forward<S: TextSource>(&self, source: &mut S) -> Result<(), DocumentError> {
        source.replace_range(self.start, self.replaced_len(), &self.inserted)
    }

    /// Apply in the backward (undo) direction: the inserted span becomes the
    /// replaced text again.
    fn apply_backward<S: TextSource>(&self, source: &mut S) -> Result<(), DocumentError> {
        source.replace_range(self.start, self.inserted.len(), &self.replaced)
    }
}

/// A committed undoable/redoable unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Atomic(TextChange),
    /// Bracketed multi-step edit; children in application order, undone and
    /// redone as one unit.
    Compound(Vec<TextChange>),
}

impl Command {
    /// Revert this command on `source`. For compounds, children after the
    /// first are reverted raw in reverse order and only the first child's
    /// undo moves the selection, so the caret jumps once rather than once
    /// per child.
    pub(crate) fn undo<S: TextSource>(&self, source: &mut S) -> Result<(), DocumentError> {
        match self {
            Command::Atomic(change) => {
                change.apply_backward(source)?;
                source.set_selection(change.start, change.replaced.len());
                Ok(())
            }
            Command::Compound(children) => {
                for child in children.iter().skip(1).rev() {
                    child.apply_backward(source)?;
                }
                if let Some(first) = children.first() {
                    first.apply_backward(source)?;
                    source.set_selection(first.start, first.replaced.len());
                }
                Ok(())
            }
        }
    }

    /// Re-apply this command on `source`. Compound redo replays children
    /// forward and selects the union span of the whole edit.
    pub(crate) fn redo<S: TextSource>(&self, source: &mut S) -> Result<(), DocumentError> {
        match self {
            Command::Atomic(change) => {
                change.apply_forward(source)?;
                source.set_selection(change.start, change.inserted.len());
                Ok(())
            }
            Command::Compound(children) => {
                for child in children {
                    child.apply_forward(source)?;
                }
                let mut span: Option<(usize, usize)> = None;
                for child in children {
                    let (s, e) = (child.start, child.start + child.inserted.len());
                    span = Some(match span {
                        None => (s, e),
                        Some((a, b)) => (a.min(s), b.max(e)),
                    });
                }
                if let Some((s, e)) = span {
                    source.set_selection(s, e - s);
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(start: usize, end: usize, inserted: &str, replaced: &str) -> TextChange {
        TextChange {
            start,
            end,
            inserted: inserted.to_string(),
            replaced: replaced.to_string(),
        }
    }

    #[test]
    fn atomic_round_trip() {
        let cmd = Command::Atomic(change(1, 3, "XYZ", "bc"));
        let mut text = String::from("aXYZd");
        cmd.undo(&mut text).unwrap();
        assert_eq!(text, "abcd");
        cmd.redo(&mut text).unwrap();
        assert_eq!(text, "aXYZd");
    }

    #[test]
    fn atomic_pure_insert_round_trip() {
        let cmd = Command::Atomic(change(2, 2, "..", ""));
        let mut text = String::from("ab..cd");
        cmd.undo(&mut text).unwrap();
        assert_eq!(text, "abcd");
        cmd.redo(&mut text).unwrap();
        assert_eq!(text, "ab..cd");
    }

    #[test]
    fn compound_undo_walks_children_backwards() {
        // Applied forward: insert "12" at 0, then insert "34" at 4.
        let cmd = Command::Compound(vec![change(0, 0, "12", ""), change(4, 4, "34", "")]);
        let mut text = String::from("12ab34");
        cmd.undo(&mut text).unwrap();
        assert_eq!(text, "ab");
        cmd.redo(&mut text).unwrap();
        assert_eq!(text, "12ab34");
    }

    #[test]
    fn compound_redo_error_reports_without_panic() {
        let cmd = Command::Compound(vec![change(50, 50, "x", "")]);
        let mut text = String::from("short");
        assert!(cmd.redo(&mut text).is_err());
        assert_eq!(text, "short");
    }

    #[test]
    fn stale_undo_surfaces_error() {
        let cmd = Command::Atomic(change(0, 0, "hello", ""));
        let mut text = String::from("hi");
        // Inserted span no longer fits the live text.
        assert!(cmd.undo(&mut text).is_err());
        assert_eq!(text, "hi");
    }
}
