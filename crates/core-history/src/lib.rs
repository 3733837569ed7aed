//! Text-edit undo/redo engine.
//!
//! [`UndoManager`] sits behind a host text widget. The widget reports raw
//! text-replacement events; the manager reconstructs what changed (the host
//! can hand over either the full new text or an incremental descriptor),
//! coalesces consecutive edits into logical undo steps, and maintains
//! bounded undo/redo stacks with atomic compound-edit support.
//!
//! Coalescing policy (see `coalesce` for the heuristics):
//! - A typing run, backspace run, forward-delete run, or overwrite run is
//!   captured as a *single* command, grown lazily while consecutive events
//!   keep matching the run's shape.
//! - Boundaries: caret navigation, a primary mouse press, an explicit
//!   [`UndoManager::flush`], an incompatible edit shape, or a compound
//!   bracket. Pastes and selection edits never merge with anything.
//! - `undo()` commits the in-progress run first, so a run in flight is
//!   undoable without an explicit flush, and resets all transient state so
//!   the next edit starts fresh rather than merging with history.
//!
//! Playback & consistency:
//! - The manager keeps a shadow copy of the last observed text. Undo/redo
//!   dry-run the command against the shadow before touching the live
//!   source, so a stale range (the host mutated the document without
//!   notifying) is caught with nothing half-applied. A playback failure is
//!   logged and the stacks are left exactly as they were.
//! - A `replaying` flag suppresses change observation while the manager
//!   itself drives `replace_range`, so playback never re-enters the
//!   classifier. Single-threaded by design; there is no locking.
//!
//! Telemetry: command lifecycle emits trace events (`push_command`,
//! `undo_pop`, `redo_pop`, stack trims, redo clears) under the
//! `history.stack` / `history.coalesce` / `history.playback` targets, plus
//! plain counters surfaced through [`HistoryMetricsSnapshot`]. Offsets and
//! lengths only; user text is never logged.

use std::collections::VecDeque;

use core_config::HistorySection;
use core_document::{TextSource, detect_change};
use tracing::{trace, warn};

mod coalesce;
pub mod command;

use coalesce::Coalescer;
pub use command::{Command, TextChange};

/// Host signals that end a coalescing burst. Delivered *before* the signal
/// itself is otherwise processed, so coalescing never crosses a
/// user-visible caret relocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundarySignal {
    /// Arrow-key navigation moved the caret.
    CaretMoved,
    /// Primary mouse button pressed.
    PointerPressed,
}

impl BoundarySignal {
    fn as_str(self) -> &'static str {
        match self {
            BoundarySignal::CaretMoved => "caret_moved",
            BoundarySignal::PointerPressed => "pointer_pressed",
        }
    }
}

/// Lightweight counters mutated on the event thread only; inspected by
/// tests and host metrics surfaces.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HistoryMetricsSnapshot {
    pub commands_committed: u64,
    pub commands_evicted: u64,
    pub playback_failures: u64,
}

enum Direction {
    Undo,
    Redo,
}

/// The undo/redo engine. One instance per editing context; call
/// [`UndoManager::reset`] (or [`UndoManager::set_base_text`]) when the host
/// switches documents so history never leaks across contexts.
pub struct UndoManager {
    undo_stack: VecDeque<Command>,
    redo_stack: VecDeque<Command>,
    max_depth: usize,
    coalescer: Coalescer,
    /// Children of the currently open compound change, if bracketing.
    compound: Option<Vec<TextChange>>,
    /// Last observed full text; the diffing baseline and the playback
    /// dry-run target.
    shadow: String,
    replaying: bool,
    disposed: bool,
    metrics: HistoryMetricsSnapshot,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoManager {
    pub fn new() -> Self {
        Self::with_config(&HistorySection::default())
    }

    pub fn with_config(history: &HistorySection) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth: history.max_depth,
            coalescer: Coalescer::new(history.coalesce_whitespace),
            compound: None,
            shadow: String::new(),
            replaying: false,
            disposed: false,
            metrics: HistoryMetricsSnapshot::default(),
        }
    }

    // ---------------- observation ----------------

    /// Rebase the diffing baseline on the given text, clearing all history.
    /// Call when the host attaches the manager to a (different) document.
    pub fn set_base_text(&mut self, text: &str) {
        if self.disposed {
            return;
        }
        self.reset();
        self.shadow = text.to_string();
    }

    /// Observe a widget-style "text is now X" notification. The minimal
    /// edit against the last observed text is reconstructed and classified;
    /// identical text is a no-op.
    pub fn text_changed(&mut self, new_text: &str) {
        if self.disposed || self.replaying {
            return;
        }
        let Some(delta) = detect_change(&self.shadow, new_text) else {
            return;
        };
        let offset = delta.offset;
        let deleted = delta.deleted.to_string();
        let inserted = delta.inserted.to_string();
        self.shadow = new_text.to_string();
        self.process_edit(offset, &deleted, &inserted);
    }

    /// Observe an incremental edit descriptor, avoiding the full-text diff:
    /// `replaced` was substituted by `inserted` at byte offset `offset`. The
    /// descriptor must match the last observed text or it is dropped.
    pub fn handle_replace(&mut self, offset: usize, replaced: &str, inserted: &str) {
        if self.disposed || self.replaying {
            return;
        }
        if let Err(e) = TextSource::replace_range(&mut self.shadow, offset, replaced.len(), inserted)
        {
            warn!(target: "history.coalesce", error = %e, offset, "edit_descriptor_rejected");
            return;
        }
        self.process_edit(offset, replaced, inserted);
    }

    fn process_edit(&mut self, offset: usize, deleted: &str, inserted: &str) {
        trace!(
            target: "history.coalesce",
            offset,
            deleted_len = deleted.len(),
            inserted_len = inserted.len(),
            "edit_observed"
        );
        let committed = self.coalescer.process(offset, deleted, inserted);
        for change in committed {
            self.push_committed(change);
        }
    }

    // ---------------- commit & stacks ----------------

    /// Commit the in-progress command, if any. Burst boundaries and hosts
    /// about to read a consistent history call this.
    pub fn flush(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(change) = self.coalescer.take_pending() {
            self.push_committed(change);
        }
    }

    /// A burst boundary from the host UI: forces a commit of the pending
    /// command before the signal is otherwise processed.
    pub fn note_boundary(&mut self, signal: BoundarySignal) {
        if self.disposed {
            return;
        }
        trace!(target: "history.coalesce", signal = signal.as_str(), "burst_boundary");
        self.flush();
    }

    fn push_committed(&mut self, change: TextChange) {
        if let Some(children) = &mut self.compound {
            children.push(change);
            trace!(
                target: "history.stack",
                children = children.len(),
                "compound_child_added"
            );
            // A child edit is still a new edit: any redo branch is dead.
            if !self.redo_stack.is_empty() {
                self.redo_stack.clear();
                trace!(target: "history.stack", "redo_stack_cleared_on_new_edit");
            }
        } else {
            self.push_command(Command::Atomic(change));
        }
    }

    fn push_command(&mut self, command: Command) {
        self.undo_stack.push_back(command);
        self.metrics.commands_committed += 1;
        trace!(
            target: "history.stack",
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "push_command"
        );
        while self.undo_stack.len() > self.max_depth {
            let _ = self.undo_stack.pop_front();
            self.metrics.commands_evicted += 1;
            trace!(target: "history.stack", "undo_stack_trimmed");
        }
        if !self.redo_stack.is_empty() {
            self.redo_stack.clear();
            trace!(target: "history.stack", "redo_stack_cleared_on_new_edit");
        }
    }

    // ---------------- compound bracketing ----------------

    /// Open a compound change: until [`UndoManager::end_compound_change`],
    /// every committed command becomes a child of one undo entry instead of
    /// its own. Edits are still classified and coalesced as usual. A second
    /// `begin` while open is ignored.
    pub fn begin_compound_change(&mut self) {
        if self.disposed {
            return;
        }
        self.flush();
        if self.compound.is_none() {
            self.compound = Some(Vec::new());
            trace!(target: "history.stack", "compound_begin");
        }
    }

    /// Close the open compound change and push it as a single undo entry.
    /// An empty compound pushes nothing.
    pub fn end_compound_change(&mut self) {
        if self.disposed {
            return;
        }
        self.flush();
        if let Some(children) = self.compound.take() {
            if children.is_empty() {
                trace!(target: "history.stack", "compound_discarded_empty");
            } else {
                trace!(target: "history.stack", children = children.len(), "compound_end");
                self.push_command(Command::Compound(children));
            }
        }
    }

    // ---------------- undo / redo ----------------

    /// Revert the most recent command on `source`. Returns `false` when
    /// there is nothing to undo or the stored range no longer matches the
    /// live text (logged; stacks unchanged).
    pub fn undo<S: TextSource>(&mut self, source: &mut S) -> bool {
        if self.disposed {
            return false;
        }
        // The in-progress run becomes the step being undone; this also
        // resets transient coalescing state.
        self.flush();
        let Some(command) = self.undo_stack.pop_back() else {
            return false;
        };
        trace!(
            target: "history.stack",
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "undo_pop"
        );
        match self.play(&command, Direction::Undo, source) {
            Ok(()) => {
                self.redo_stack.push_back(command);
                trace!(target: "history.stack", redo_depth = self.redo_stack.len(), "redo_push_from_undo");
                true
            }
            Err(e) => {
                warn!(target: "history.playback", error = %e, "undo_skipped_stale_range");
                self.metrics.playback_failures += 1;
                self.undo_stack.push_back(command);
                false
            }
        }
    }

    /// Re-apply the most recently undone command on `source`. Symmetric to
    /// [`UndoManager::undo`].
    pub fn redo<S: TextSource>(&mut self, source: &mut S) -> bool {
        if self.disposed {
            return false;
        }
        // A pending edit is a new edit: committing it clears the redo stack
        // and this call degenerates to a no-op, which is the intent.
        self.flush();
        let Some(command) = self.redo_stack.pop_back() else {
            return false;
        };
        trace!(
            target: "history.stack",
            redo_depth = self.redo_stack.len(),
            undo_depth = self.undo_stack.len(),
            "redo_pop"
        );
        match self.play(&command, Direction::Redo, source) {
            Ok(()) => {
                self.undo_stack.push_back(command);
                trace!(target: "history.stack", undo_depth = self.undo_stack.len(), "undo_push_from_redo");
                true
            }
            Err(e) => {
                warn!(target: "history.playback", error = %e, "redo_skipped_stale_range");
                self.metrics.playback_failures += 1;
                self.redo_stack.push_back(command);
                false
            }
        }
    }

    fn play<S: TextSource>(
        &mut self,
        command: &Command,
        direction: Direction,
        source: &mut S,
    ) -> Result<(), core_document::DocumentError> {
        // Dry-run against the shadow first: a stale range must be caught
        // before the live source is touched, so a compound never
        // half-applies.
        let mut dry = self.shadow.clone();
        match direction {
            Direction::Undo => command.undo(&mut dry)?,
            Direction::Redo => command.redo(&mut dry)?,
        }
        self.replaying = true;
        let applied = match direction {
            Direction::Undo => command.undo(source),
            Direction::Redo => command.redo(source),
        };
        self.replaying = false;
        match applied {
            Ok(()) => {
                self.shadow = source.text();
                Ok(())
            }
            Err(e) => {
                // The source diverged from the shadow between observation
                // and playback; resync so later attempts see reality.
                self.shadow = source.text();
                Err(e)
            }
        }
    }

    // ---------------- state & lifecycle ----------------

    pub fn can_undo(&self) -> bool {
        !self.disposed && (self.coalescer.has_pending() || !self.undo_stack.is_empty())
    }

    pub fn can_redo(&self) -> bool {
        !self.disposed && !self.redo_stack.is_empty()
    }

    /// Update the stack bound and immediately evict excess oldest entries.
    pub fn set_max_undo_depth(&mut self, n: usize) {
        if self.disposed {
            return;
        }
        self.max_depth = n;
        while self.undo_stack.len() > self.max_depth {
            let _ = self.undo_stack.pop_front();
            self.metrics.commands_evicted += 1;
            trace!(target: "history.stack", "undo_stack_trimmed");
        }
    }

    /// Destroy both stacks and any in-progress command. Call whenever the
    /// host switches editing context so history never leaks across
    /// documents.
    pub fn reset(&mut self) {
        if self.disposed {
            return;
        }
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.coalescer.reset();
        self.compound = None;
        trace!(target: "history.stack", "reset");
    }

    /// Idempotent teardown: releases buffers and turns every other public
    /// operation into a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.undo_stack = VecDeque::new();
        self.redo_stack = VecDeque::new();
        self.coalescer.reset();
        self.compound = None;
        self.shadow = String::new();
        trace!(target: "history.stack", "disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // Test/metrics helpers
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    pub fn metrics(&self) -> HistoryMetricsSnapshot {
        self.metrics
    }
}
