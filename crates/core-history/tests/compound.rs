mod common;
use common::*;

#[test]
fn compound_yields_exactly_one_undo_entry() {
    let mut h = Harness::new("abc");
    h.mgr.begin_compound_change();
    h.edit(0, 0, ">> "); // programmatic insert
    h.edit(6, 0, " <<"); // after "abc"
    h.type_str(9, "!");
    h.mgr.end_compound_change();
    assert_eq!(h.text(), ">> abc <<!");
    assert_eq!(h.mgr.undo_depth(), 1);
    assert!(h.undo());
    assert_eq!(h.text(), "abc");
    assert_eq!(h.mgr.undo_depth(), 0);
    assert!(h.redo());
    assert_eq!(h.text(), ">> abc <<!");
}

#[test]
fn compound_redo_selects_union_span() {
    let mut h = Harness::new("abcd");
    h.mgr.begin_compound_change();
    h.edit(0, 0, "[");
    h.edit(5, 0, "]");
    h.mgr.end_compound_change();
    assert_eq!(h.text(), "[abcd]");
    assert!(h.undo());
    assert_eq!(h.text(), "abcd");
    assert!(h.redo());
    assert_eq!(h.text(), "[abcd]");
    // Union of [0,1) and [5,6).
    assert_eq!(h.doc.selection(), Some((0, 6)));
}

#[test]
fn empty_compound_pushes_nothing() {
    let mut h = Harness::new("abc");
    h.mgr.begin_compound_change();
    h.mgr.end_compound_change();
    assert_eq!(h.mgr.undo_depth(), 0);
    assert!(!h.mgr.can_undo());
}

#[test]
fn compound_with_mixed_edit_shapes_is_atomic() {
    let mut h = Harness::new("one two three");
    h.mgr.begin_compound_change();
    h.delete(0, 4); // drop "one "
    h.edit(0, 3, "TWO"); // replace "two"
    h.type_str(3, "!");
    h.mgr.end_compound_change();
    assert_eq!(h.text(), "TWO! three");
    assert_eq!(h.mgr.undo_depth(), 1);
    assert!(h.undo());
    assert_eq!(h.text(), "one two three");
    assert!(h.redo());
    assert_eq!(h.text(), "TWO! three");
}

#[test]
fn repeated_begin_is_ignored() {
    let mut h = Harness::new("");
    h.mgr.begin_compound_change();
    h.edit(0, 0, "x");
    h.mgr.begin_compound_change(); // still the same bracket
    h.edit(1, 0, "YZ");
    h.mgr.end_compound_change();
    assert_eq!(h.mgr.undo_depth(), 1);
    assert!(h.undo());
    assert_eq!(h.text(), "");
}

#[test]
fn edits_before_bracket_stay_separate() {
    let mut h = Harness::new("");
    h.type_str(0, "pre");
    h.mgr.begin_compound_change();
    h.edit(3, 0, "AB");
    h.edit(5, 0, "CD");
    h.mgr.end_compound_change();
    assert_eq!(h.text(), "preABCD");
    assert!(h.undo());
    assert_eq!(h.text(), "pre");
    assert!(h.undo());
    assert_eq!(h.text(), "");
}

#[test]
fn undo_after_compound_restores_selection_once() {
    let mut h = Harness::new("mid");
    h.mgr.begin_compound_change();
    h.edit(0, 0, "AA");
    h.edit(5, 0, "BB");
    h.mgr.end_compound_change();
    assert!(h.undo());
    assert_eq!(h.text(), "mid");
    // Only the first child's undo repositions the selection.
    assert_eq!(h.doc.selection(), Some((0, 0)));
}
