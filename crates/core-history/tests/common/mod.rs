#![allow(dead_code)] // Shared across test binaries; each uses a subset of helpers.

use core_document::{Document, TextSource};
use core_history::{BoundarySignal, UndoManager};

/// A minimal stand-in for a host text widget: a document plus a manager
/// observing it. Edits go through [`Harness::edit`], which applies the
/// replacement and then delivers the widget-style "text is now X"
/// notification.
pub struct Harness {
    pub doc: Document,
    pub mgr: UndoManager,
}

impl Harness {
    pub fn new(initial: &str) -> Self {
        let doc = Document::from_str("fixture", initial).unwrap();
        let mut mgr = UndoManager::new();
        mgr.set_base_text(initial);
        Self { doc, mgr }
    }

    pub fn with_manager(initial: &str, mut mgr: UndoManager) -> Self {
        let doc = Document::from_str("fixture", initial).unwrap();
        mgr.set_base_text(initial);
        Self { doc, mgr }
    }

    /// Replace `len` bytes at `offset` with `text`, then notify the manager.
    pub fn edit(&mut self, offset: usize, len: usize, text: &str) {
        self.doc.replace_range(offset, len, text).unwrap();
        let now = self.doc.text();
        self.mgr.text_changed(&now);
    }

    /// Type `text` one char event at a time starting at `offset`.
    pub fn type_str(&mut self, mut offset: usize, text: &str) {
        for ch in text.chars() {
            let s = ch.to_string();
            self.edit(offset, 0, &s);
            offset += s.len();
        }
    }

    /// One backspace/forward-delete shaped event: delete `len` bytes at
    /// `offset` (the classifier decides the direction from history).
    pub fn delete(&mut self, offset: usize, len: usize) {
        self.edit(offset, len, "");
    }

    pub fn caret_move(&mut self) {
        self.mgr.note_boundary(BoundarySignal::CaretMoved);
    }

    pub fn click(&mut self) {
        self.mgr.note_boundary(BoundarySignal::PointerPressed);
    }

    pub fn undo(&mut self) -> bool {
        self.mgr.undo(&mut self.doc)
    }

    pub fn redo(&mut self) -> bool {
        self.mgr.redo(&mut self.doc)
    }

    pub fn text(&self) -> String {
        self.doc.text()
    }

    /// Undo until nothing is left to undo; returns the number of steps.
    pub fn undo_all(&mut self) -> usize {
        let mut steps = 0;
        while self.undo() {
            steps += 1;
        }
        steps
    }
}
