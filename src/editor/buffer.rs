//! In-memory text surface.
//!
//! `TextBuffer` holds the document, its selections, a snapshot undo history
//! and the indicator layers. The demo's editor view renders it; the find bar
//! tests drive it directly.

use crate::editor::{
    compile_pattern, FindTarget, HighlightableEditor, Indicator, SearchFlags, Selection,
    SurfaceId, TextSurface,
};
use crate::string_utils::{floor_char_boundary, is_word_char, next_char_boundary, safe_slice};
use log::debug;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

/// Lines assumed visible until the view reports its real height.
const DEFAULT_LINES_ON_SCREEN: usize = 20;

/// Undo history depth
const MAX_UNDO_STEPS: usize = 200;

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    text: String,
    caret: usize,
}

/// A plain text document with selections, undo and highlight layers.
#[derive(Debug)]
pub struct TextBuffer {
    id: SurfaceId,
    text: String,
    read_only: bool,
    /// Main selection first
    selections: Vec<Selection>,
    caret: usize,
    anchor: usize,

    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    undo_depth: usize,
    pending_undo: Option<Snapshot>,

    indicators: HashMap<Indicator, Vec<(usize, usize)>>,
    find_markers: BTreeSet<usize>,
    find_bookmarks_active: bool,
    highlightable: bool,

    lines_on_screen: usize,
    first_visible_line: usize,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new("")
    }
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: SurfaceId(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed)),
            text: text.into(),
            read_only: false,
            selections: vec![Selection::caret(0)],
            caret: 0,
            anchor: 0,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            undo_depth: 0,
            pending_undo: None,
            indicators: HashMap::new(),
            find_markers: BTreeSet::new(),
            find_bookmarks_active: false,
            highlightable: true,
            lines_on_screen: DEFAULT_LINES_ON_SCREEN,
            first_visible_line: 0,
        }
    }

    /// A buffer that does not offer the bookmark capability.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            highlightable: false,
            ..Self::new(text)
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the whole document. Clears history, selections and indicators.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.selections = vec![Selection::caret(0)];
        self.caret = 0;
        self.anchor = 0;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.indicators.clear();
        self.find_markers.clear();
        self.first_visible_line = 0;
    }

    /// Take an edit made outside the buffer (e.g. typed in a text widget).
    ///
    /// Indicator ranges and markers no longer line up with the new text, so
    /// they are dropped.
    pub fn apply_external_edit(&mut self, text: String) {
        if text == self.text {
            return;
        }
        self.push_undo(self.snapshot());
        self.text = text;
        self.indicators.clear();
        self.find_markers.clear();
        self.clamp_selections();
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn set_lines_on_screen(&mut self, lines: usize) {
        self.lines_on_screen = lines.max(1);
    }

    pub fn line_count(&self) -> usize {
        self.text.matches('\n').count() + 1
    }

    pub fn find_marker_lines(&self) -> Vec<usize> {
        self.find_markers.iter().copied().collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Undo
    // ─────────────────────────────────────────────────────────────────────────

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            text: self.text.clone(),
            caret: self.caret,
        }
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);
        if self.undo_stack.len() > MAX_UNDO_STEPS {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.text = snapshot.text;
        let caret = floor_char_boundary(&self.text, snapshot.caret);
        self.set_empty_selection(caret);
        self.indicators.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(self.snapshot());
        self.restore(previous);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(self.snapshot());
        self.restore(next);
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Matching
    // ─────────────────────────────────────────────────────────────────────────

    fn compile(needle: &str, flags: SearchFlags) -> Option<Regex> {
        if needle.is_empty() {
            return None;
        }
        match compile_pattern(needle, flags) {
            Ok(re) => Some(re),
            Err(e) => {
                debug!("{}", e);
                None
            }
        }
    }

    fn is_whole_word(&self, start: usize, end: usize) -> bool {
        let before = self.text[..start].chars().next_back();
        let after = self.text[end..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    }

    /// First acceptable match starting at or after `from` and ending by `limit`.
    ///
    /// Candidates advance one character past each rejected match start, so
    /// overlapping occurrences are still found.
    fn find_forward(
        &self,
        re: &Regex,
        flags: SearchFlags,
        from: usize,
        limit: usize,
    ) -> Option<(usize, usize)> {
        let limit = floor_char_boundary(&self.text, limit);
        let haystack = &self.text[..limit];
        let mut pos = floor_char_boundary(haystack, from);
        while pos <= haystack.len() {
            let m = re.find_at(haystack, pos)?;
            let accept = m.start() < m.end()
                && (!flags.contains(SearchFlags::WHOLE_WORD)
                    || self.is_whole_word(m.start(), m.end()));
            if accept {
                return Some((m.start(), m.end()));
            }
            if m.start() >= haystack.len() {
                break;
            }
            pos = next_char_boundary(haystack, m.start());
        }
        None
    }

    /// Last acceptable match starting strictly before `before`.
    fn find_backward(&self, re: &Regex, flags: SearchFlags, before: usize) -> Option<(usize, usize)> {
        let mut found = None;
        let mut pos = 0;
        while let Some((start, end)) = self.find_forward(re, flags, pos, self.text.len()) {
            if start >= before {
                break;
            }
            found = Some((start, end));
            pos = next_char_boundary(&self.text, start);
        }
        found
    }

    /// Every non-overlapping match in document order.
    pub fn all_matches(&self, needle: &str, flags: SearchFlags) -> Vec<(usize, usize)> {
        let Some(re) = Self::compile(needle, flags) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut pos = 0;
        while let Some((start, end)) = self.find_forward(&re, flags, pos, self.text.len()) {
            out.push((start, end));
            pos = end;
        }
        out
    }

    fn clamp_selections(&mut self) {
        let len = self.text.len();
        for sel in &mut self.selections {
            sel.start = floor_char_boundary(&self.text, sel.start.min(len));
            sel.end = floor_char_boundary(&self.text, sel.end.min(len));
        }
        self.caret = floor_char_boundary(&self.text, self.caret.min(len));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TextSurface
// ─────────────────────────────────────────────────────────────────────────────

impl TextSurface for TextBuffer {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn len(&self) -> usize {
        self.text.len()
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn text_range(&self, start: usize, end: usize) -> String {
        safe_slice(&self.text, start, end).to_string()
    }

    fn current_pos(&self) -> usize {
        self.caret
    }

    fn set_empty_selection(&mut self, pos: usize) {
        let pos = floor_char_boundary(&self.text, pos);
        self.selections = vec![Selection::caret(pos)];
        self.caret = pos;
    }

    fn selection(&self) -> Selection {
        self.selections
            .first()
            .copied()
            .unwrap_or_else(|| Selection::caret(self.caret))
    }

    fn set_selection(&mut self, start: usize, end: usize) {
        let sel = Selection::new(
            floor_char_boundary(&self.text, start),
            floor_char_boundary(&self.text, end),
        );
        self.selections = vec![sel];
        self.caret = sel.end;
    }

    fn selections(&self) -> Vec<Selection> {
        self.selections.clone()
    }

    fn add_selection(&mut self, start: usize, end: usize) {
        let sel = Selection::new(
            floor_char_boundary(&self.text, start),
            floor_char_boundary(&self.text, end),
        );
        if self.selections.len() == 1 && self.selections[0].is_empty() {
            self.selections[0] = sel;
            self.caret = sel.end;
        } else {
            self.selections.push(sel);
        }
    }

    fn clear_selections(&mut self) {
        let caret = floor_char_boundary(&self.text, self.caret);
        self.selections = vec![Selection::caret(caret)];
        self.caret = caret;
    }

    fn search_anchor(&mut self) {
        self.anchor = self.selection().start;
    }

    fn search_next(&mut self, flags: SearchFlags, needle: &str) -> Option<usize> {
        let re = Self::compile(needle, flags)?;
        let (start, end) = self.find_forward(&re, flags, self.anchor, self.text.len())?;
        self.set_selection(start, end);
        Some(start)
    }

    fn search_prev(&mut self, flags: SearchFlags, needle: &str) -> Option<usize> {
        let re = Self::compile(needle, flags)?;
        let (start, end) = self.find_backward(&re, flags, self.anchor)?;
        self.set_selection(start, end);
        Some(start)
    }

    fn find_in_range(
        &self,
        needle: &str,
        flags: SearchFlags,
        start: usize,
        end: usize,
    ) -> Option<(usize, usize)> {
        let re = Self::compile(needle, flags)?;
        self.find_forward(&re, flags, start, end)
    }

    fn replace_range(&mut self, start: usize, end: usize, text: &str) {
        if self.read_only {
            return;
        }
        let start = floor_char_boundary(&self.text, start);
        let end = floor_char_boundary(&self.text, end.max(start));
        if self.undo_depth == 0 {
            self.push_undo(self.snapshot());
        }
        self.text.replace_range(start..end, text);

        // shift whatever sits after the edit
        let removed = end - start;
        let inserted = text.len();
        let shift = |pos: usize| -> usize {
            if pos >= end {
                pos - removed + inserted
            } else if pos > start {
                start + inserted
            } else {
                pos
            }
        };
        for sel in &mut self.selections {
            sel.start = shift(sel.start);
            sel.end = shift(sel.end);
        }
        self.caret = shift(self.caret);
        for ranges in self.indicators.values_mut() {
            ranges.retain(|&(s, e)| e <= start || s >= end);
            for range in ranges.iter_mut() {
                *range = (shift(range.0), shift(range.1));
            }
        }
    }

    fn begin_undo_action(&mut self) {
        if self.undo_depth == 0 {
            self.pending_undo = Some(self.snapshot());
        }
        self.undo_depth += 1;
    }

    fn end_undo_action(&mut self) {
        if self.undo_depth == 0 {
            return;
        }
        self.undo_depth -= 1;
        if self.undo_depth == 0 {
            if let Some(before) = self.pending_undo.take() {
                if before.text != self.text {
                    self.push_undo(before);
                }
            }
        }
    }

    fn line_from_position(&self, pos: usize) -> usize {
        let pos = floor_char_boundary(&self.text, pos);
        self.text[..pos].matches('\n').count()
    }

    fn lines_on_screen(&self) -> usize {
        self.lines_on_screen
    }

    fn first_visible_line(&self) -> usize {
        self.first_visible_line
    }

    fn set_first_visible_line(&mut self, line: usize) {
        self.first_visible_line = line.min(self.line_count().saturating_sub(1));
    }

    fn clear_indicator(&mut self, indicator: Indicator) {
        self.indicators.remove(&indicator);
    }

    fn set_indicator(&mut self, indicator: Indicator, start: usize, end: usize) {
        if end > start {
            self.indicators.entry(indicator).or_default().push((start, end));
        }
    }

    fn indicator_ranges(&self, indicator: Indicator) -> Vec<(usize, usize)> {
        self.indicators.get(&indicator).cloned().unwrap_or_default()
    }

    fn word_range_at(&self, pos: usize) -> (usize, usize) {
        let pos = floor_char_boundary(&self.text, pos);
        let start = self.text[..pos]
            .char_indices()
            .rev()
            .take_while(|&(_, c)| is_word_char(c))
            .last()
            .map(|(i, _)| i)
            .unwrap_or(pos);
        let end = self.text[pos..]
            .char_indices()
            .find(|&(_, c)| !is_word_char(c))
            .map(|(i, _)| pos + i)
            .unwrap_or(self.text.len());
        (start, end)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Capabilities
// ─────────────────────────────────────────────────────────────────────────────

impl HighlightableEditor for TextBuffer {
    fn set_find_bookmarks_active(&mut self, active: bool) {
        self.find_bookmarks_active = active;
    }

    fn find_bookmarks_active(&self) -> bool {
        self.find_bookmarks_active
    }

    fn delete_find_markers(&mut self) {
        self.find_markers.clear();
    }

    fn has_find_markers(&self) -> bool {
        !self.find_markers.is_empty()
    }

    fn mark_all(&mut self, needle: &str, flags: SearchFlags) -> usize {
        let matches = self.all_matches(needle, flags);
        self.clear_indicator(Indicator::SearchMatch);
        self.find_markers.clear();
        if matches.is_empty() {
            return 0;
        }

        self.selections.clear();
        for &(start, end) in &matches {
            self.selections.push(Selection::new(start, end));
            self.set_indicator(Indicator::SearchMatch, start, end);
            if self.find_bookmarks_active {
                let line = self.line_from_position(start);
                self.find_markers.insert(line);
            }
        }
        self.caret = matches[0].1;
        debug!("Marked {} matches of '{}'", matches.len(), needle);
        matches.len()
    }
}

impl FindTarget for TextBuffer {
    fn as_highlightable(&mut self) -> Option<&mut dyn HighlightableEditor> {
        if self.highlightable {
            Some(self)
        } else {
            None
        }
    }

    fn has_highlight_capability(&self) -> bool {
        self.highlightable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(TextBuffer::new("").id(), TextBuffer::new("").id());
    }

    #[test]
    fn test_search_next_selects_match() {
        let mut buf = TextBuffer::new("one two one");
        buf.search_anchor();
        assert_eq!(buf.search_next(SearchFlags::NONE, "one"), Some(0));
        assert_eq!(buf.selection(), Selection::new(0, 3));
    }

    #[test]
    fn test_search_next_from_anchor() {
        let mut buf = TextBuffer::new("one two one");
        buf.set_empty_selection(1);
        buf.search_anchor();
        assert_eq!(buf.search_next(SearchFlags::NONE, "one"), Some(8));
    }

    #[test]
    fn test_search_prev() {
        let mut buf = TextBuffer::new("ab ab ab");
        buf.set_selection(6, 8);
        buf.search_anchor();
        assert_eq!(buf.search_prev(SearchFlags::NONE, "ab"), Some(3));
        buf.search_anchor();
        assert_eq!(buf.search_prev(SearchFlags::NONE, "ab"), Some(0));
        buf.search_anchor();
        assert_eq!(buf.search_prev(SearchFlags::NONE, "ab"), None);
        // a miss leaves the selection alone
        assert_eq!(buf.selection(), Selection::new(0, 2));
    }

    #[test]
    fn test_overlapping_matches_found() {
        let mut buf = TextBuffer::new("aaaa");
        buf.set_empty_selection(1);
        buf.search_anchor();
        assert_eq!(buf.search_next(SearchFlags::NONE, "aa"), Some(1));
    }

    #[test]
    fn test_case_and_whole_word() {
        let mut buf = TextBuffer::new("Test testing test");
        buf.search_anchor();
        assert_eq!(buf.search_next(SearchFlags::MATCH_CASE, "test"), Some(5));

        buf.set_empty_selection(0);
        buf.search_anchor();
        let flags = SearchFlags::MATCH_CASE | SearchFlags::WHOLE_WORD;
        assert_eq!(buf.search_next(flags, "test"), Some(13));
    }

    #[test]
    fn test_regex_search_and_invalid_pattern() {
        let mut buf = TextBuffer::new("abc123def");
        buf.search_anchor();
        assert_eq!(buf.search_next(SearchFlags::REGEX, r"\d+"), Some(3));
        assert_eq!(buf.selected_text(), "123");

        buf.set_empty_selection(0);
        buf.search_anchor();
        assert_eq!(buf.search_next(SearchFlags::REGEX, "[bad"), None);
    }

    #[test]
    fn test_find_in_range_respects_end() {
        let buf = TextBuffer::new("xx ab xx ab");
        assert_eq!(buf.find_in_range("ab", SearchFlags::NONE, 0, 4), None);
        assert_eq!(buf.find_in_range("ab", SearchFlags::NONE, 0, 5), Some((3, 5)));
        assert_eq!(buf.find_in_range("ab", SearchFlags::NONE, 4, 11), Some((9, 11)));
    }

    #[test]
    fn test_replace_range_shifts_selections() {
        let mut buf = TextBuffer::new("hello world");
        buf.set_selection(6, 11);
        buf.replace_range(0, 5, "hi");
        assert_eq!(buf.text(), "hi world");
        assert_eq!(buf.selection(), Selection::new(3, 8));
    }

    #[test]
    fn test_undo_transaction_groups_edits() {
        let mut buf = TextBuffer::new("a-b-c");
        {
            let mut tx = crate::editor::UndoTransaction::begin(&mut buf);
            tx.surface().replace_range(4, 5, "C");
            tx.surface().replace_range(0, 1, "A");
        }
        assert_eq!(buf.text(), "A-b-C");
        assert!(buf.undo());
        assert_eq!(buf.text(), "a-b-c");
        assert!(!buf.can_undo());
        assert!(buf.redo());
        assert_eq!(buf.text(), "A-b-C");
    }

    #[test]
    fn test_read_only_ignores_edits() {
        let mut buf = TextBuffer::new("keep");
        buf.set_read_only(true);
        buf.replace_range(0, 4, "lost");
        assert_eq!(buf.text(), "keep");
    }

    #[test]
    fn test_line_from_position() {
        let buf = TextBuffer::new("a\nb\nc");
        assert_eq!(buf.line_from_position(0), 0);
        assert_eq!(buf.line_from_position(2), 1);
        assert_eq!(buf.line_from_position(4), 2);
        assert_eq!(buf.line_count(), 3);
    }

    #[test]
    fn test_word_range_at() {
        let buf = TextBuffer::new("let foo_bar = 1;");
        assert_eq!(buf.word_range_at(6), (4, 11));
        assert_eq!(buf.word_range_at(4), (4, 11));
        assert_eq!(buf.word_range_at(11), (4, 11));
        let (s, e) = buf.word_range_at(12);
        assert_eq!(s, e);
    }

    #[test]
    fn test_clear_selections_keeps_caret() {
        let mut buf = TextBuffer::new("abcdef");
        buf.set_selection(1, 3);
        buf.add_selection(4, 6);
        assert_eq!(buf.selections().len(), 2);
        buf.clear_selections();
        assert_eq!(buf.selections(), vec![Selection::caret(3)]);
    }

    #[test]
    fn test_indicators() {
        let mut buf = TextBuffer::new("some text");
        buf.set_indicator(Indicator::WordHighlight, 0, 4);
        buf.set_indicator(Indicator::WordHighlight, 2, 2);
        assert_eq!(buf.indicator_ranges(Indicator::WordHighlight), vec![(0, 4)]);
        buf.clear_indicator(Indicator::WordHighlight);
        assert!(buf.indicator_ranges(Indicator::WordHighlight).is_empty());
    }

    #[test]
    fn test_mark_all_selects_and_bookmarks() {
        let mut buf = TextBuffer::new("foo\nbar foo\nfoo");
        buf.set_find_bookmarks_active(true);
        assert_eq!(buf.mark_all("foo", SearchFlags::NONE), 3);
        assert_eq!(buf.selections().len(), 3);
        assert_eq!(buf.find_marker_lines(), vec![0, 1, 2]);
        assert!(buf.has_find_markers());
        buf.delete_find_markers();
        assert!(!buf.has_find_markers());
    }

    #[test]
    fn test_plain_buffer_has_no_capability() {
        let mut buf = TextBuffer::plain("x");
        assert!(buf.as_highlightable().is_none());
        let mut buf = TextBuffer::new("x");
        assert!(buf.as_highlightable().is_some());
    }

    #[test]
    fn test_external_edit_is_undoable() {
        let mut buf = TextBuffer::new("abc");
        buf.apply_external_edit("abcd".to_string());
        assert_eq!(buf.text(), "abcd");
        assert!(buf.undo());
        assert_eq!(buf.text(), "abc");
    }
}
