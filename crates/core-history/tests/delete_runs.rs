mod common;
use common::*;

#[test]
fn backspace_run_reverts_in_one_undo() {
    // "abc", backspace three times.
    let mut h = Harness::new("abc");
    h.delete(2, 1);
    h.delete(1, 1);
    h.delete(0, 1);
    assert_eq!(h.text(), "");
    assert!(h.undo());
    assert_eq!(h.text(), "abc");
}

#[test]
fn caret_move_splits_backspace_runs() {
    let mut h = Harness::new("abcd");
    h.delete(3, 1);
    h.delete(2, 1);
    h.caret_move();
    h.delete(1, 1);
    assert_eq!(h.text(), "a");
    assert!(h.undo());
    assert_eq!(h.text(), "ab");
    assert!(h.undo());
    assert_eq!(h.text(), "abcd");
}

#[test]
fn forward_delete_run_reverts_in_one_undo() {
    // "abcd", caret after "a": DEL three times.
    let mut h = Harness::new("abcd");
    h.delete(1, 1);
    h.delete(1, 1);
    h.delete(1, 1);
    assert_eq!(h.text(), "a");
    assert!(h.undo());
    assert_eq!(h.text(), "abcd");
    assert!(h.redo());
    assert_eq!(h.text(), "a");
}

#[test]
fn backspace_then_del_at_same_spot_share_a_run() {
    // "abcd", caret between b and c: backspace then DEL.
    let mut h = Harness::new("abcd");
    h.delete(1, 1); // backspace eats "b"
    h.delete(1, 1); // DEL eats "c"
    assert_eq!(h.text(), "ad");
    assert!(h.undo());
    assert_eq!(h.text(), "abcd");
}

#[test]
fn selection_delete_is_one_standalone_step() {
    let mut h = Harness::new("hello world");
    h.delete(0, 6);
    assert_eq!(h.text(), "world");
    h.delete(4, 1); // a separate single-char delete afterwards
    assert_eq!(h.text(), "worl");
    assert!(h.undo());
    assert_eq!(h.text(), "world");
    assert!(h.undo());
    assert_eq!(h.text(), "hello world");
}

#[test]
fn grapheme_cluster_delete_coalesces_as_single_unit() {
    let mut h = Harness::new("a👍b");
    h.delete(5, 1); // backspace "b"
    h.delete(1, 4); // backspace the emoji in one event
    h.delete(0, 1); // backspace "a"
    assert_eq!(h.text(), "");
    assert!(h.undo());
    assert_eq!(h.text(), "a👍b");
}

#[test]
fn forward_delete_over_emoji_stays_one_run() {
    // Caret parked at 0, DEL three times across mixed-width graphemes.
    let mut h = Harness::new("a👍b");
    h.delete(0, 1);
    h.delete(0, 4);
    h.delete(0, 1);
    assert_eq!(h.text(), "");
    assert_eq!(h.mgr.undo_depth(), 0); // still one open run
    assert!(h.undo());
    assert_eq!(h.text(), "a👍b");
}

#[test]
fn newline_delete_joins_run() {
    let mut h = Harness::new("ab\ncd");
    h.delete(3, 1); // backspace "c"
    h.delete(2, 1); // the newline
    h.delete(1, 1); // "b"
    assert_eq!(h.text(), "ad");
    assert!(h.undo());
    assert_eq!(h.text(), "ab\ncd");
}

#[test]
fn delete_then_type_are_separate_steps() {
    let mut h = Harness::new("abc");
    h.delete(2, 1);
    h.type_str(2, "X");
    assert_eq!(h.text(), "abX");
    assert!(h.undo());
    assert_eq!(h.text(), "ab");
    assert!(h.undo());
    assert_eq!(h.text(), "abc");
}
