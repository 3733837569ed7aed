//! Change detection between two full-text snapshots.
//!
//! Widgets typically report only "text is now X", not "insert Y at Z". This
//! module reconstructs the minimal edit by trimming the longest common prefix
//! and then, restricted to what remains, the longest common suffix. Both
//! trims are floored to char boundaries so the resulting slices are always
//! valid UTF-8 and the anchored offset is slice-safe.
//!
//! The detector is deliberately shape-agnostic: whether an edit was typing,
//! a paste, a backspace, or an overwrite is decided downstream from the
//! descriptor plus recent history, because old/new text is the only signal
//! guaranteed available from the source.

/// A minimal edit descriptor: `deleted` was removed at `offset` and
/// `inserted` was put in its place. Either side (not both) may be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextDelta<'a> {
    pub offset: usize,
    pub deleted: &'a str,
    pub inserted: &'a str,
}

/// Compute the minimal edit turning `prev` into `next`.
///
/// Returns `None` when the texts are identical. O(n), single pass in each
/// direction.
pub fn detect_change<'a>(prev: &'a str, next: &'a str) -> Option<TextDelta<'a>> {
    if prev == next {
        return None;
    }
    let pb = prev.as_bytes();
    let nb = next.as_bytes();

    let max_prefix = pb.len().min(nb.len());
    let mut prefix = 0;
    while prefix < max_prefix && pb[prefix] == nb[prefix] {
        prefix += 1;
    }
    // The mismatching byte can split a multi-byte sequence in either string.
    while prefix > 0 && (!prev.is_char_boundary(prefix) || !next.is_char_boundary(prefix)) {
        prefix -= 1;
    }

    // Suffix bounded so prefix + suffix never exceeds either length.
    let max_suffix = (pb.len() - prefix).min(nb.len() - prefix);
    let mut suffix = 0;
    while suffix < max_suffix && pb[pb.len() - 1 - suffix] == nb[nb.len() - 1 - suffix] {
        suffix += 1;
    }
    while suffix > 0
        && (!prev.is_char_boundary(pb.len() - suffix) || !next.is_char_boundary(nb.len() - suffix))
    {
        suffix -= 1;
    }

    Some(TextDelta {
        offset: prefix,
        deleted: &prev[prefix..pb.len() - suffix],
        inserted: &next[prefix..nb.len() - suffix],
    })
}
