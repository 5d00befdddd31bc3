//! Type-ahead matching against row labels.
//!
//! A match splits the label into three spans (before, matched, after). The
//! list paints the middle span highlighted. Only the first occurrence per
//! column is recorded.

use std::collections::BTreeMap;
use std::ops::BitOr;

/// Options for `SearchText::matches` and the list's `find_next`/`find_prev`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeSearchFlags(u32);

impl TreeSearchFlags {
    pub const NONE: TreeSearchFlags = TreeSearchFlags(0);
    /// Fold case on both sides
    pub const ICASE: TreeSearchFlags = TreeSearchFlags(1 << 0);
    /// Substring containment instead of equality
    pub const CONTAINS: TreeSearchFlags = TreeSearchFlags(1 << 1);
    /// The starting row is itself a candidate
    pub const INCLUDE_CURRENT_ITEM: TreeSearchFlags = TreeSearchFlags(1 << 2);
    /// Skip hidden rows
    pub const VISIBLE_ITEMS: TreeSearchFlags = TreeSearchFlags(1 << 3);
    pub const DEFAULT: TreeSearchFlags = TreeSearchFlags(0b1111);

    pub fn contains(self, other: TreeSearchFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Copy with `other` cleared.
    pub fn without(self, other: TreeSearchFlags) -> TreeSearchFlags {
        TreeSearchFlags(self.0 & !other.0)
    }
}

impl Default for TreeSearchFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for TreeSearchFlags {
    type Output = TreeSearchFlags;

    fn bitor(self, rhs: TreeSearchFlags) -> TreeSearchFlags {
        TreeSearchFlags(self.0 | rhs.0)
    }
}

/// Prefix, matched text and suffix of one label.
pub type Spans = [String; 3];

/// Per-column highlight spans for one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    columns: BTreeMap<usize, Spans>,
}

impl MatchResult {
    pub fn add(&mut self, col: usize, spans: Spans) {
        self.columns.insert(col, spans);
    }

    pub fn get(&self, col: usize) -> Option<&Spans> {
        self.columns.get(&col)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn clear(&mut self) {
        self.columns.clear();
    }

    pub fn columns(&self) -> impl Iterator<Item = (usize, &Spans)> {
        self.columns.iter().map(|(col, spans)| (*col, spans))
    }
}

/// Lowercase `text` the way `str::to_lowercase` does, remembering which
/// source byte each folded byte came from. The extra trailing entry maps the
/// end of the string.
fn fold_with_offsets(text: &str) -> (String, Vec<usize>) {
    // Context-sensitive folds (final sigma) keep the per-char byte length,
    // so the offsets can come from the char-wise fold.
    let folded = text.to_lowercase();
    let mut offsets = Vec::with_capacity(folded.len() + 1);
    for (i, ch) in text.char_indices() {
        let len: usize = ch.to_lowercase().map(char::len_utf8).sum();
        offsets.extend(std::iter::repeat(i).take(len));
    }
    offsets.push(text.len());
    debug_assert_eq!(offsets.len(), folded.len() + 1);
    (folded, offsets)
}

/// The inline search state of a list control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchText {
    enabled: bool,
}

impl Default for SearchText {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl SearchText {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Test `text` against `find_what`. When `result` is given, a hit records
    /// the three spans for `col` in it.
    pub fn matches(
        find_what: &str,
        col: usize,
        text: &str,
        flags: TreeSearchFlags,
        result: Option<&mut MatchResult>,
    ) -> bool {
        let icase = flags.contains(TreeSearchFlags::ICASE);

        if !flags.contains(TreeSearchFlags::CONTAINS) {
            let equal = if icase {
                text.to_lowercase() == find_what.to_lowercase()
            } else {
                text == find_what
            };
            if equal {
                if let Some(result) = result {
                    result.add(col, [String::new(), text.to_string(), String::new()]);
                }
            }
            return equal;
        }

        let (start, end) = if icase {
            let (haystack, offsets) = fold_with_offsets(text);
            let needle = find_what.to_lowercase();
            let Some(at) = haystack.find(&needle) else {
                return false;
            };
            let stop = at + needle.len();
            let start = offsets[at];
            let end = offsets[stop].max(start);
            // a match ending inside a multi-char fold still covers that char
            let end = if !needle.is_empty()
                && stop < haystack.len()
                && offsets[stop] == offsets[stop - 1]
            {
                text[end..]
                    .chars()
                    .next()
                    .map(|c| end + c.len_utf8())
                    .unwrap_or(end)
            } else {
                end
            };
            (start, end)
        } else {
            let Some(at) = text.find(find_what) else {
                return false;
            };
            (at, at + find_what.len())
        };

        if let Some(result) = result {
            result.add(
                col,
                [
                    text[..start].to_string(),
                    text[start..end].to_string(),
                    text[end..].to_string(),
                ],
            );
        }
        true
    }
}
