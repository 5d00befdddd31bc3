//! The text surface the find bar drives.
//!
//! Positions are byte offsets into the document and always sit on UTF-8
//! character boundaries. The find bar never owns text: it only talks to a
//! surface through these traits.

use crate::editor::SearchFlags;
use std::cell::RefCell;
use std::rc::Rc;

/// Identifies a surface across `ReleaseEditor` notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// Highlight layers a surface can paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    /// Matches marked by "find all" / highlight matches
    SearchMatch,
    /// Occurrences of the word under the caret
    WordHighlight,
}

/// One selection range. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn caret(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TextSurface
// ─────────────────────────────────────────────────────────────────────────────

/// Editing primitives the find bar needs from a text control.
pub trait TextSurface {
    fn id(&self) -> SurfaceId;

    /// Document length in bytes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_read_only(&self) -> bool;

    /// Text between two positions.
    fn text_range(&self, start: usize, end: usize) -> String;

    // Caret and selections

    fn current_pos(&self) -> usize;

    /// Collapse to a single caret at `pos`.
    fn set_empty_selection(&mut self, pos: usize);

    /// Main selection.
    fn selection(&self) -> Selection;

    /// Replace every selection with `[start, end)`; caret goes to `end`.
    fn set_selection(&mut self, start: usize, end: usize);

    /// Every selection, main first.
    fn selections(&self) -> Vec<Selection>;

    /// Add a secondary selection.
    fn add_selection(&mut self, start: usize, end: usize);

    /// Drop every selection and leave an empty one at the caret.
    fn clear_selections(&mut self);

    fn selected_text(&self) -> String {
        let sel = self.selection();
        self.text_range(sel.start, sel.end)
    }

    // Anchored search

    /// Remember the start of the main selection as the search anchor.
    fn search_anchor(&mut self);

    /// Find the first match at or after the anchor and select it.
    fn search_next(&mut self, flags: SearchFlags, needle: &str) -> Option<usize>;

    /// Find the last match starting before the anchor and select it.
    fn search_prev(&mut self, flags: SearchFlags, needle: &str) -> Option<usize>;

    /// First match inside `[start, end)`, without touching the selection.
    fn find_in_range(
        &self,
        needle: &str,
        flags: SearchFlags,
        start: usize,
        end: usize,
    ) -> Option<(usize, usize)>;

    // Modification

    fn replace_range(&mut self, start: usize, end: usize, text: &str);

    fn begin_undo_action(&mut self);

    fn end_undo_action(&mut self);

    // Lines and view

    fn line_from_position(&self, pos: usize) -> usize;

    fn lines_on_screen(&self) -> usize;

    fn first_visible_line(&self) -> usize;

    fn set_first_visible_line(&mut self, line: usize);

    // Indicators

    fn clear_indicator(&mut self, indicator: Indicator);

    fn set_indicator(&mut self, indicator: Indicator, start: usize, end: usize);

    fn indicator_ranges(&self, indicator: Indicator) -> Vec<(usize, usize)>;

    /// Bounds of the word touching `pos`; empty when there is none.
    fn word_range_at(&self, pos: usize) -> (usize, usize);
}

/// Brackets edits into one undo step; ends it on drop.
pub struct UndoTransaction<'a, S: TextSurface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: TextSurface + ?Sized> UndoTransaction<'a, S> {
    pub fn begin(surface: &'a mut S) -> Self {
        surface.begin_undo_action();
        Self { surface }
    }

    pub fn surface(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: TextSurface + ?Sized> Drop for UndoTransaction<'_, S> {
    fn drop(&mut self) {
        self.surface.end_undo_action();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Capabilities
// ─────────────────────────────────────────────────────────────────────────────

/// Extra behavior offered by full editors: line bookmarks for find results.
pub trait HighlightableEditor {
    fn set_find_bookmarks_active(&mut self, active: bool);

    fn find_bookmarks_active(&self) -> bool;

    /// Remove every find bookmark.
    fn delete_find_markers(&mut self);

    fn has_find_markers(&self) -> bool;

    /// Select and bookmark every match. Returns the match count.
    fn mark_all(&mut self, needle: &str, flags: SearchFlags) -> usize;
}

/// A surface the find bar can bind to.
pub trait FindTarget: TextSurface {
    /// The bookmark capability, when this surface has it.
    fn as_highlightable(&mut self) -> Option<&mut dyn HighlightableEditor> {
        None
    }

    fn has_highlight_capability(&self) -> bool {
        false
    }
}

pub type SharedSurface = Rc<RefCell<dyn FindTarget>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_normalizes() {
        let sel = Selection::new(8, 3);
        assert_eq!(sel, Selection { start: 3, end: 8 });
        assert_eq!(sel.len(), 5);
        assert!(!sel.is_empty());
        assert!(Selection::caret(4).is_empty());
    }
}
