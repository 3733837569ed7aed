//! Edit classification and coalescing.
//!
//! The change detector reports shape only: `{offset, deleted, inserted}`.
//! This module decides which consecutive edits belong to the same logical
//! user action and merges them into one in-progress command:
//!
//! - typing runs: single-grapheme insertions at strictly contiguous offsets,
//!   plus whitespace runs following a line break (auto-indent shape);
//! - backspace runs: single-unit deletions each ending where the previous
//!   one started (the span grows backwards);
//! - forward-delete runs: single-unit deletions repeating at the same
//!   position (the span grows forwards);
//! - overwrite runs: contiguous one-for-one replacements.
//!
//! Everything else (pastes, selection deletes, multi-character
//! replacements) commits the in-progress command and becomes a standalone
//! command immediately; those are never merged with anything.
//!
//! "Single character" means one grapheme cluster or one recognized line
//! delimiter, so an emoji or combining sequence removed in one input event
//! behaves like a length-1 delete. Contiguity arithmetic stays in byte
//! offsets.
//!
//! All transient state lives in [`CoalescingState`], owned by exactly one
//! [`Coalescer`] per manager; nothing here touches the document.

use crate::command::TextChange;
use core_document::grapheme;
use tracing::trace;

/// Recognized line delimiters, longest first so `\r\n` wins over `\r`.
pub const LINE_DELIMITERS: [&str; 3] = ["\r\n", "\n", "\r"];

/// True if `text` is exactly one recognized line delimiter.
pub fn is_line_delimiter(text: &str) -> bool {
    LINE_DELIMITERS.contains(&text)
}

/// True if `text` starts with a line delimiter and everything after it is
/// spaces or tabs. This is the shape auto-indent produces; it extends a
/// typing run instead of breaking it.
pub fn is_whitespace_run(text: &str) -> bool {
    for delim in LINE_DELIMITERS {
        if let Some(rest) = text.strip_prefix(delim) {
            return rest.chars().all(|c| c == ' ' || c == '\t');
        }
    }
    false
}

fn is_single_unit(text: &str) -> bool {
    is_line_delimiter(text) || grapheme::is_single(text)
}

/// Transient coalescing state. One instance per manager; logically owned by
/// whichever command is currently being built.
#[derive(Debug, Default)]
pub struct CoalescingState {
    /// Characters accumulated by the in-progress insertion/overwrite run.
    pub(crate) insert_buf: String,
    /// Characters deleted by the in-progress delete/overwrite run, in
    /// document order.
    pub(crate) replace_buf: String,
    /// In a typing/whitespace run.
    pub(crate) inserting: bool,
    /// In an overwrite run.
    pub(crate) overwriting: bool,
    /// Span of the last single-unit deletion, used to tell repeated
    /// backspace from repeated forward delete.
    pub(crate) previous_delete: Option<(usize, usize)>,
}

/// Offsets of the in-progress command. Unset until an edit opens one.
#[derive(Debug, Default, Clone, Copy)]
struct PendingSpan {
    start: Option<usize>,
    end: Option<usize>,
}

/// Stateful classifier. Feed it edit descriptors; it hands back commands
/// that became committed as a side effect, and holds the still-open command
/// until a discontinuity (or an explicit [`Coalescer::take_pending`])
/// closes it.
#[derive(Debug)]
pub struct Coalescer {
    state: CoalescingState,
    pending: PendingSpan,
    coalesce_whitespace: bool,
}

impl Default for Coalescer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Coalescer {
    pub fn new(coalesce_whitespace: bool) -> Self {
        Self {
            state: CoalescingState::default(),
            pending: PendingSpan::default(),
            coalesce_whitespace,
        }
    }

    /// True if an in-progress command with accumulated text exists.
    pub fn has_pending(&self) -> bool {
        self.pending.start.is_some()
            && (!self.state.insert_buf.is_empty() || !self.state.replace_buf.is_empty())
    }

    /// Close and return the in-progress command, if any. Always resets the
    /// transient mode flags and the previous-delete shadow, so the next edit
    /// starts a fresh command rather than merging with history.
    pub fn take_pending(&mut self) -> Option<TextChange> {
        self.state.inserting = false;
        self.state.overwriting = false;
        self.state.previous_delete = None;
        let span = std::mem::take(&mut self.pending);
        let inserted = std::mem::take(&mut self.state.insert_buf);
        let replaced = std::mem::take(&mut self.state.replace_buf);
        match (span.start, span.end) {
            (Some(start), Some(end)) if !inserted.is_empty() || !replaced.is_empty() => {
                Some(TextChange {
                    start,
                    end,
                    inserted,
                    replaced,
                })
            }
            _ => None,
        }
    }

    /// Drop all transient state without producing a command.
    pub fn reset(&mut self) {
        self.state = CoalescingState::default();
        self.pending = PendingSpan::default();
    }

    /// Classify one edit descriptor. Returned commands became committed as a
    /// result (at most two: the closed previous run plus a standalone edit).
    pub fn process(&mut self, offset: usize, deleted: &str, inserted: &str) -> Vec<TextChange> {
        let mut committed = Vec::new();
        match (deleted.is_empty(), inserted.is_empty()) {
            (true, true) => {}
            (true, false) => self.insertion(offset, inserted, &mut committed),
            (false, true) => self.deletion(offset, deleted, &mut committed),
            (false, false) => self.replacement(offset, deleted, inserted, &mut committed),
        }
        committed
    }

    fn commit_into(&mut self, out: &mut Vec<TextChange>) {
        if let Some(change) = self.take_pending() {
            out.push(change);
        }
    }

    fn insertion(&mut self, offset: usize, inserted: &str, out: &mut Vec<TextChange>) {
        let typing = is_single_unit(inserted)
            || (self.coalesce_whitespace && is_whitespace_run(inserted));
        if typing {
            let contiguous = self.state.inserting
                && self
                    .pending
                    .start
                    .is_some_and(|s| offset == s + self.state.insert_buf.len());
            if !contiguous {
                self.commit_into(out);
                self.pending.start = Some(offset);
                self.pending.end = Some(offset);
                self.state.inserting = true;
                trace!(target: "history.coalesce", offset, "typing_run_start");
            }
            self.state.insert_buf.push_str(inserted);
        } else {
            // Paste or programmatic insert: never merged.
            self.commit_into(out);
            trace!(target: "history.coalesce", offset, len = inserted.len(), "paste_standalone");
            out.push(TextChange {
                start: offset,
                end: offset,
                inserted: inserted.to_string(),
                replaced: String::new(),
            });
        }
    }

    fn deletion(&mut self, offset: usize, deleted: &str, out: &mut Vec<TextChange>) {
        let n = deleted.len();
        if is_single_unit(deleted) {
            match self.state.previous_delete {
                Some((ps, _)) if ps == offset => {
                    // Same position again: the DEL key eating forward. The
                    // previous unit's byte width is irrelevant here.
                    self.state.replace_buf.push_str(deleted);
                    self.pending.end = self.pending.end.map(|e| e + n);
                    trace!(target: "history.coalesce", offset, "forward_delete_run_extend");
                }
                Some((ps, _)) if ps == offset + n => {
                    // New deletion ends where the last one started: backspace.
                    self.state.replace_buf.insert_str(0, deleted);
                    self.pending.start = Some(offset);
                    trace!(target: "history.coalesce", offset, "backspace_run_extend");
                }
                _ => {
                    // First deletion in a run. Direction is unknowable yet;
                    // initialize backspace-style (growable backwards).
                    self.commit_into(out);
                    self.pending.start = Some(offset);
                    self.pending.end = Some(offset + n);
                    self.state.replace_buf.push_str(deleted);
                    trace!(target: "history.coalesce", offset, "delete_run_start");
                }
            }
            self.state.previous_delete = Some((offset, offset + n));
        } else {
            // Selection delete: standalone.
            self.commit_into(out);
            trace!(target: "history.coalesce", offset, len = n, "selection_delete_standalone");
            out.push(TextChange {
                start: offset,
                end: offset + n,
                inserted: String::new(),
                replaced: deleted.to_string(),
            });
        }
    }

    fn replacement(&mut self, offset: usize, deleted: &str, inserted: &str, out: &mut Vec<TextChange>) {
        let overwrite = grapheme::is_single(inserted) && is_single_unit(deleted);
        if overwrite {
            let contiguous = self.state.overwriting
                && self
                    .pending
                    .start
                    .is_some_and(|s| offset == s + self.state.insert_buf.len());
            if !contiguous {
                self.commit_into(out);
                self.pending.start = Some(offset);
                self.state.overwriting = true;
                trace!(target: "history.coalesce", offset, "overwrite_run_start");
            }
            self.state.insert_buf.push_str(inserted);
            self.state.replace_buf.push_str(deleted);
            // The span end lives in pre-edit coordinates: it must cover the
            // replaced text, whose byte width can differ from the inserted.
            self.pending.end = self
                .pending
                .start
                .map(|s| s + self.state.replace_buf.len());
        } else {
            // Typed or pasted replacement of a selection: standalone.
            self.commit_into(out);
            trace!(
                target: "history.coalesce",
                offset,
                deleted_len = deleted.len(),
                inserted_len = inserted.len(),
                "replacement_standalone"
            );
            out.push(TextChange {
                start: offset,
                end: offset + deleted.len(),
                inserted: inserted.to_string(),
                replaced: deleted.to_string(),
            });
        }
    }
}
