//! Virtualized list/tree control.
//!
//! Rows live in one flat vector in display order; a tree is expressed by
//! row depth. Only the window of rows that fits in the client area gets
//! real geometry. Everything else is parked off-screen so hit tests and
//! painting skip it.
//!
//! The control owns an optional [`SearchOverlay`]. Typed text travels to the
//! owner as [`ListEvent::SearchText`]; the owner answers with
//! [`ControlWithItems::apply_search`].

use crate::list::{
    offscreen_rect, HeaderBar, MatchResult, OverlayState, RowEntry, RowId, SearchOverlay,
    SearchText, TextMeasure, TreeSearchFlags, X_SPACER, Y_SPACER,
};
use crate::notify::{EventBus, ListEvent};
use egui::{pos2, vec2, Pos2, Rect};

/// Column the inline search matches against.
pub const SEARCH_COLUMN: usize = 0;

/// Rows moved per wheel notch unless configured otherwise.
pub const DEFAULT_SCROLL_TICK: usize = 3;

/// Scrollbar geometry as the control last computed it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollBarState {
    pub position: f32,
    pub thumb: f32,
    pub range: f32,
    pub page: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Left,
    Right,
}

/// Which part of a row a point landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitArea {
    Row,
    ExpandButton,
}

/// Keys the control reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKey {
    Char(char),
    Backspace,
    Escape,
    Enter,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyModifiers {
    pub const NONE: KeyModifiers = KeyModifiers {
        ctrl: false,
        alt: false,
        shift: false,
    };

    /// No modifier, or Shift alone.
    pub fn is_plain_typing(&self) -> bool {
        !self.ctrl && !self.alt
    }
}

pub struct ControlWithItems {
    rows: Vec<RowEntry>,
    header: HeaderBar,
    client_rect: Rect,
    line_height: f32,
    indent: f32,
    /// Index of the first on-screen row among the non-hidden rows
    first_row: usize,
    /// Horizontal scroll offset in points
    first_column: f32,
    scroll_tick: usize,
    selected: Option<RowId>,
    /// The row the inline search last landed on
    current_match: Option<RowId>,
    search: SearchText,
    overlay: Option<SearchOverlay>,
    events: EventBus<ListEvent>,
    vscroll: ScrollBarState,
    hscroll: ScrollBarState,
    measure: Box<dyn TextMeasure>,
    next_id: u64,
}

impl ControlWithItems {
    pub fn new(events: EventBus<ListEvent>, measure: Box<dyn TextMeasure>) -> Self {
        let line_height = Y_SPACER + measure.text_height() + Y_SPACER;
        Self {
            rows: Vec::new(),
            header: HeaderBar::new(line_height),
            client_rect: Rect::NOTHING,
            line_height,
            indent: 0.0,
            first_row: 0,
            first_column: 0.0,
            scroll_tick: DEFAULT_SCROLL_TICK,
            selected: None,
            current_match: None,
            search: SearchText::default(),
            overlay: None,
            events,
            vscroll: ScrollBarState::default(),
            hscroll: ScrollBarState::default(),
            measure,
            next_id: 1,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────────

    pub fn events(&self) -> &EventBus<ListEvent> {
        &self.events
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn indent(&self) -> f32 {
        self.indent
    }

    pub fn set_indent(&mut self, indent: f32) {
        self.indent = indent.max(0.0);
    }

    pub fn scroll_tick(&self) -> usize {
        self.scroll_tick
    }

    pub fn set_scroll_tick(&mut self, tick: usize) {
        self.scroll_tick = tick.max(1);
    }

    pub fn search(&self) -> &SearchText {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut SearchText {
        &mut self.search
    }

    /// Replace the text measurer and recompute the line height.
    pub fn set_measure(&mut self, measure: Box<dyn TextMeasure>) {
        self.line_height = Y_SPACER + measure.text_height() + Y_SPACER;
        self.header.set_row_height(self.line_height);
        self.measure = measure;
        self.update_scroll_bar();
        self.assign_rects();
    }

    pub fn header(&self) -> &HeaderBar {
        &self.header
    }

    /// Install a column header. Only allowed while the control is empty.
    pub fn set_header(&mut self, mut header: HeaderBar) -> bool {
        if !self.rows.is_empty() {
            log::warn!("set_header called on a non-empty list; ignored");
            return false;
        }
        header.set_row_height(self.line_height);
        self.header = header;
        self.set_show_header(true);
        true
    }

    pub fn set_show_header(&mut self, show: bool) {
        self.header.set_hidden(!show);
        self.update_scroll_bar();
        self.assign_rects();
    }

    pub fn is_header_visible(&self) -> bool {
        !self.header.is_hidden()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rows
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a row at the end of `parent`'s subtree, or at the end of the list.
    pub fn append_row(&mut self, parent: Option<RowId>, labels: Vec<String>) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        let mut row = RowEntry::new(id, labels);

        let at = match parent.and_then(|p| self.index_of(p)) {
            Some(pi) => {
                let (depth, hidden) = {
                    let parent = &mut self.rows[pi];
                    parent.has_children = true;
                    (parent.depth, parent.hidden || !parent.expanded)
                };
                row.depth = depth + 1;
                row.hidden = hidden;
                self.subtree_end(pi)
            }
            None => self.rows.len(),
        };
        self.rows.insert(at, row);
        self.do_update_header(Some(id));
        id
    }

    pub fn clear(&mut self) {
        if let Some(overlay) = self.overlay.take() {
            overlay.dismiss();
        }
        self.rows.clear();
        self.selected = None;
        self.current_match = None;
        self.first_row = 0;
        self.first_column = 0.0;
        self.update_scroll_bar();
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[RowEntry] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&RowEntry> {
        self.index_of(id).map(|i| &self.rows[i])
    }

    fn index_of(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    /// One past the last descendant of the row at `index`.
    fn subtree_end(&self, index: usize) -> usize {
        let depth = self.rows[index].depth;
        self.rows[index + 1..]
            .iter()
            .position(|r| r.depth <= depth)
            .map(|p| index + 1 + p)
            .unwrap_or(self.rows.len())
    }

    /// Indexes of the non-hidden rows, in display order.
    fn visible_indexes(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.hidden)
            .map(|(i, _)| i)
            .collect()
    }

    fn visible_position(&self, id: RowId) -> Option<usize> {
        self.rows
            .iter()
            .filter(|r| !r.hidden)
            .position(|r| r.id == id)
    }

    /// Rows currently laid out on screen.
    pub fn on_screen_rows(&self) -> Vec<&RowEntry> {
        self.rows
            .iter()
            .filter(|r| !r.hidden)
            .skip(self.first_row)
            .take(self.lines_fit())
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Geometry and scrolling
    // ─────────────────────────────────────────────────────────────────────────

    pub fn client_rect(&self) -> Rect {
        self.client_rect
    }

    /// Client area below the header.
    pub fn items_rect(&self) -> Rect {
        let mut rect = self.client_rect;
        rect.min.y += self.header.height();
        rect.max.y = rect.max.y.max(rect.min.y);
        rect
    }

    /// Number of rows the items area can show, counting a partial last one.
    pub fn lines_fit(&self) -> usize {
        if self.line_height <= 0.0 || !self.client_rect.is_positive() {
            return 0;
        }
        (self.items_rect().height() / self.line_height).ceil() as usize
    }

    /// Vertical scroll range: the number of non-hidden rows.
    pub fn range(&self) -> usize {
        self.rows.iter().filter(|r| !r.hidden).count()
    }

    pub fn first_row(&self) -> usize {
        self.first_row
    }

    pub fn first_column(&self) -> f32 {
        self.first_column
    }

    pub fn vscroll(&self) -> ScrollBarState {
        self.vscroll
    }

    pub fn hscroll(&self) -> ScrollBarState {
        self.hscroll
    }

    pub fn update_scroll_bar(&mut self) {
        let thumb = self.lines_fit() as f32;
        self.vscroll = ScrollBarState {
            position: self.first_row as f32,
            thumb,
            range: self.range() as f32,
            page: thumb,
        };

        let thumb = self.client_rect.width().max(0.0);
        self.hscroll = ScrollBarState {
            position: self.first_column,
            thumb,
            range: if self.rows.is_empty() {
                0.0
            } else {
                self.header.width()
            },
            page: (thumb - 1.0).max(0.0),
        };
    }

    /// New client area. Resets the horizontal scroll.
    pub fn resize(&mut self, client_rect: Rect) {
        self.client_rect = client_rect;
        self.first_column = 0.0;
        self.first_row = self.first_row.min(self.range().saturating_sub(1));
        self.update_scroll_bar();
        self.assign_rects();
    }

    /// Give on-screen rows their rectangles and park the rest.
    pub fn assign_rects(&mut self) {
        let items = self.items_rect();
        let lines = self.lines_fit();
        let line_height = self.line_height;
        let indent = self.indent;
        let first_column = self.first_column;
        let first_row = self.first_row;

        let mut slot = 0usize;
        let mut visible = 0usize;
        for row in &mut self.rows {
            let on_screen = !row.hidden && visible >= first_row && slot < lines;
            if !row.hidden {
                visible += 1;
            }
            if !on_screen {
                row.rect = offscreen_rect();
                row.button_rect = offscreen_rect();
                continue;
            }
            let y = items.min.y + slot as f32 * line_height;
            row.rect = Rect::from_min_size(pos2(items.min.x, y), vec2(items.width(), line_height));
            row.button_rect = if row.has_children {
                let x = items.min.x + row.depth as f32 * indent - first_column;
                Rect::from_min_size(pos2(x, y), vec2(line_height, line_height))
            } else {
                offscreen_rect()
            };
            slot += 1;
        }
    }

    pub fn scroll_to_row(&mut self, position: usize) {
        self.first_row = position.min(self.range().saturating_sub(1));
        self.update_scroll_bar();
        self.assign_rects();
    }

    pub fn scroll_to_column(&mut self, x: f32) {
        let max = (self.hscroll.range - self.hscroll.page).max(0.0);
        self.first_column = x.clamp(0.0, max);
        self.update_scroll_bar();
        self.assign_rects();
    }

    /// Scroll horizontally by `steps` points. Zero steps jumps to an edge.
    pub fn scroll_columns(&mut self, steps: i32, direction: ScrollDirection) {
        let max_width = self.header.width();
        self.first_column = match (steps, direction) {
            (0, ScrollDirection::Left) => 0.0,
            (0, ScrollDirection::Right) => max_width,
            _ => {
                let delta = match direction {
                    ScrollDirection::Right => steps as f32,
                    ScrollDirection::Left => -(steps as f32),
                };
                let mut first = (self.first_column + delta).max(0.0);
                let page = self.client_rect.width().max(0.0);
                if first + page > max_width {
                    first = (max_width - page).max(0.0);
                }
                first
            }
        };
        self.update_scroll_bar();
        self.assign_rects();
    }

    /// Wheel input; positive rotation scrolls up.
    pub fn on_mouse_wheel(&mut self, rotation: f32) {
        if rotation == 0.0 {
            return;
        }
        let range = self.range();
        let new_row = if rotation > 0.0 {
            self.first_row.saturating_sub(self.scroll_tick)
        } else {
            self.first_row + self.scroll_tick
        };
        self.scroll_to_row(new_row.min(range.saturating_sub(1)));
    }

    /// Expand collapsed ancestors and scroll until `id` is on screen.
    pub fn ensure_visible(&mut self, id: RowId) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        for ancestor in self.ancestors(index) {
            if !self.rows[ancestor].expanded {
                self.set_expanded(self.rows[ancestor].id, true);
            }
        }
        let Some(pos) = self.visible_position(id) else {
            return;
        };
        let lines = self.lines_fit().max(1);
        if pos < self.first_row {
            self.scroll_to_row(pos);
        } else if pos >= self.first_row + lines {
            self.scroll_to_row(pos + 1 - lines);
        }
    }

    /// Indexes of the ancestors of the row at `index`, outermost first.
    fn ancestors(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut depth = self.rows[index].depth;
        for i in (0..index).rev() {
            if depth == 0 {
                break;
            }
            if self.rows[i].depth < depth {
                depth = self.rows[i].depth;
                out.push(i);
            }
        }
        out.reverse();
        out
    }

    pub fn hit_test(&self, pos: Pos2) -> Option<(RowId, HitArea)> {
        self.rows
            .iter()
            .filter(|r| !r.hidden && r.rect.is_positive())
            .find(|r| r.rect.contains(pos))
            .map(|r| {
                let area = if r.has_children && r.button_rect.contains(pos) {
                    HitArea::ExpandButton
                } else {
                    HitArea::Row
                };
                (r.id, area)
            })
    }

    /// Fit the header to `row`, or with `None` reset every column to its label.
    pub fn do_update_header(&mut self, row: Option<RowId>) {
        if self.header.is_empty() {
            return;
        }
        let row = match row {
            Some(id) => match self.index_of(id) {
                Some(i) if !self.rows[i].hidden => Some(i),
                _ => return,
            },
            None => None,
        };
        let force = row.is_none();
        for col in 0..self.header.len() {
            let width = match row {
                Some(i) => self.rows[i].calc_item_width(
                    self.measure.as_ref(),
                    self.line_height,
                    self.indent,
                    col,
                ),
                None => {
                    let label = &self.header.columns()[col].label;
                    self.measure.text_width(label) + 3.0 * X_SPACER
                }
            };
            self.header.update_col_width_if_needed(col, width, force);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection and tree state
    // ─────────────────────────────────────────────────────────────────────────

    pub fn selection(&self) -> Option<RowId> {
        self.selected
    }

    pub fn current_match(&self) -> Option<RowId> {
        self.current_match
    }

    pub fn select_row(&mut self, id: RowId) {
        if self.index_of(id).is_some() {
            self.selected = Some(id);
        }
    }

    /// Move the selection by `delta` visible rows, clamped to the ends.
    pub fn move_selection(&mut self, delta: isize) -> Option<RowId> {
        let visible = self.visible_indexes();
        if visible.is_empty() {
            return None;
        }
        let current = self
            .selected
            .and_then(|id| self.visible_position(id))
            .map(|p| p as isize);
        let target = match current {
            Some(p) => (p + delta).clamp(0, visible.len() as isize - 1) as usize,
            None if delta < 0 => visible.len() - 1,
            None => 0,
        };
        let id = self.rows[visible[target]].id;
        self.selected = Some(id);
        self.ensure_visible(id);
        Some(id)
    }

    pub fn toggle_expand(&mut self, id: RowId) {
        if let Some(i) = self.index_of(id) {
            let expanded = self.rows[i].expanded;
            self.set_expanded(id, !expanded);
        }
    }

    pub fn set_expanded(&mut self, id: RowId, expanded: bool) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        self.rows[index].expanded = expanded;
        let end = self.subtree_end(index);
        let parent = &self.rows[index];
        let mut hide_below = if parent.hidden || !parent.expanded {
            Some(parent.depth)
        } else {
            None
        };
        for row in &mut self.rows[index + 1..end] {
            match hide_below {
                Some(depth) if row.depth > depth => row.hidden = true,
                _ => {
                    row.hidden = false;
                    hide_below = (row.has_children && !row.expanded).then_some(row.depth);
                }
            }
        }

        if let Some(sel) = self.selected {
            if self.row(sel).is_some_and(|r| r.hidden) {
                self.selected = Some(id);
            }
        }
        if self.current_match.and_then(|m| self.row(m)).is_some_and(|r| r.hidden) {
            self.current_match = None;
        }
        self.first_row = self.first_row.min(self.range().saturating_sub(1));
        self.update_scroll_bar();
        self.assign_rects();
    }

    /// Post `ItemActivated` for `id`.
    pub fn activate(&self, id: RowId) {
        self.events.post(ListEvent::ItemActivated(id));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Searching
    // ─────────────────────────────────────────────────────────────────────────

    /// Candidate row indexes starting next to `from` and wrapping once.
    /// The start row comes first with `INCLUDE_CURRENT_ITEM`, else last.
    fn search_order(
        &self,
        from: Option<RowId>,
        flags: TreeSearchFlags,
        forward: bool,
    ) -> Vec<usize> {
        let mut order: Vec<usize> = if flags.contains(TreeSearchFlags::VISIBLE_ITEMS) {
            self.visible_indexes()
        } else {
            (0..self.rows.len()).collect()
        };
        if !forward {
            order.reverse();
        }
        let Some(start) = from.and_then(|id| order.iter().position(|&i| self.rows[i].id == id))
        else {
            return order;
        };
        let pivot = if flags.contains(TreeSearchFlags::INCLUDE_CURRENT_ITEM) {
            start
        } else {
            start + 1
        };
        let len = order.len().max(1);
        order.rotate_left(pivot % len);
        order
    }

    fn find(
        &mut self,
        from: Option<RowId>,
        find_what: &str,
        col: usize,
        flags: TreeSearchFlags,
        forward: bool,
    ) -> Option<RowId> {
        for index in self.search_order(from, flags, forward) {
            let row = &mut self.rows[index];
            let mut result = MatchResult::default();
            if SearchText::matches(find_what, col, row.label(col), flags, Some(&mut result)) {
                row.highlight = Some(result);
                return Some(row.id);
            }
        }
        None
    }

    /// Next row whose `col` label matches, recording its spans.
    pub fn find_next(
        &mut self,
        from: Option<RowId>,
        find_what: &str,
        col: usize,
        flags: TreeSearchFlags,
    ) -> Option<RowId> {
        self.find(from, find_what, col, flags, true)
    }

    /// Previous row whose `col` label matches, recording its spans.
    pub fn find_prev(
        &mut self,
        from: Option<RowId>,
        find_what: &str,
        col: usize,
        flags: TreeSearchFlags,
    ) -> Option<RowId> {
        self.find(from, find_what, col, flags, false)
    }

    pub fn clear_all_highlights(&mut self) {
        for row in &mut self.rows {
            row.clear_highlight();
        }
    }

    /// Answer to a `SearchText` event: highlight every matching visible row
    /// and select the first one at or after the selection.
    pub fn apply_search(&mut self, find_what: &str) -> Option<RowId> {
        self.clear_all_highlights();
        self.current_match = None;
        if find_what.is_empty() {
            return None;
        }

        let flags = TreeSearchFlags::DEFAULT;
        let mut hits = 0usize;
        for row in self.rows.iter_mut().filter(|r| !r.hidden) {
            let mut result = MatchResult::default();
            if SearchText::matches(
                find_what,
                SEARCH_COLUMN,
                row.label(SEARCH_COLUMN),
                flags,
                Some(&mut result),
            ) {
                row.highlight = Some(result);
                hits += 1;
            }
        }
        log::debug!("list search {:?}: {} hit(s)", find_what, hits);

        let target = self
            .search_order(self.selected, flags, true)
            .into_iter()
            .find(|&i| self.rows[i].highlight.is_some())
            .map(|i| self.rows[i].id)?;
        self.land_on_match(target);
        Some(target)
    }

    /// Move to the next or previous match of the overlay text, keeping the
    /// spans already recorded on other rows.
    pub fn select_search_match(&mut self, forward: bool) -> Option<RowId> {
        let find_what = self.overlay.as_ref()?.text().to_string();
        if find_what.is_empty() {
            return None;
        }
        let flags = TreeSearchFlags::DEFAULT.without(TreeSearchFlags::INCLUDE_CURRENT_ITEM);
        let target = self.find(self.selected, &find_what, SEARCH_COLUMN, flags, forward)?;

        let fresh = self.row(target).and_then(|r| r.highlight.clone());
        let saved: Vec<(usize, MatchResult)> = self
            .rows
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.highlight.clone().map(|h| (i, h)))
            .collect();
        self.clear_all_highlights();
        for (i, highlight) in saved {
            self.rows[i].highlight = Some(highlight);
        }
        if let Some(i) = self.index_of(target) {
            self.rows[i].highlight = fresh;
        }

        self.land_on_match(target);
        Some(target)
    }

    fn land_on_match(&mut self, id: RowId) {
        self.selected = Some(id);
        self.ensure_visible(id);
        self.current_match = Some(id);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Overlay and keyboard
    // ─────────────────────────────────────────────────────────────────────────

    pub fn overlay_state(&self) -> OverlayState {
        if self.overlay.is_some() {
            OverlayState::Active
        } else {
            OverlayState::Dismissed
        }
    }

    pub fn overlay_text(&self) -> Option<&str> {
        self.overlay.as_ref().map(SearchOverlay::text)
    }

    /// Open the overlay with `seed`, or replace its text if already open.
    pub fn activate_search(&mut self, seed: &str) {
        match self.overlay.as_mut() {
            Some(overlay) => overlay.set_text(seed),
            None => self.overlay = Some(SearchOverlay::new(seed, self.events.clone())),
        }
    }

    /// Replace the overlay text, as when its field is edited directly.
    pub fn set_overlay_text(&mut self, text: &str) {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.set_text(text);
        }
    }

    pub fn dismiss_search(&mut self) {
        if let Some(overlay) = self.overlay.take() {
            overlay.dismiss();
        }
    }

    /// The control itself got keyboard focus back.
    pub fn on_focus_gained(&mut self) {
        self.dismiss_search();
    }

    /// Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: ListKey, modifiers: KeyModifiers) -> bool {
        if self.overlay.is_some() {
            self.handle_overlay_key(key, modifiers);
            return true;
        }

        if let ListKey::Char(c) = key {
            if self.search.is_enabled() && !c.is_control() && modifiers.is_plain_typing() {
                self.activate_search(&c.to_string());
                return true;
            }
            return false;
        }

        let page = self.lines_fit().max(1) as isize;
        match key {
            ListKey::Up => self.move_selection(-1).is_some(),
            ListKey::Down => self.move_selection(1).is_some(),
            ListKey::PageUp => self.move_selection(-page).is_some(),
            ListKey::PageDown => self.move_selection(page).is_some(),
            ListKey::Home => self.move_selection(isize::MIN / 2).is_some(),
            ListKey::End => self.move_selection(isize::MAX / 2).is_some(),
            ListKey::Left | ListKey::Right => {
                let expand = key == ListKey::Right;
                match self.selected.and_then(|id| self.row(id)) {
                    Some(row) if row.has_children && row.expanded != expand => {
                        let id = row.id;
                        self.set_expanded(id, expand);
                    }
                    _ => {
                        let direction = if expand {
                            ScrollDirection::Right
                        } else {
                            ScrollDirection::Left
                        };
                        self.scroll_columns(self.line_height as i32, direction);
                    }
                }
                true
            }
            ListKey::Enter => match self.selected {
                Some(id) => {
                    self.activate(id);
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    fn handle_overlay_key(&mut self, key: ListKey, modifiers: KeyModifiers) {
        match key {
            ListKey::Escape => self.dismiss_search(),
            ListKey::Down => {
                self.select_search_match(true);
            }
            ListKey::Up => {
                self.select_search_match(false);
            }
            ListKey::Enter => {
                if let Some(id) = self.selected {
                    self.activate(id);
                }
                self.dismiss_search();
            }
            ListKey::Backspace => {
                if let Some(overlay) = self.overlay.as_mut() {
                    overlay.backspace();
                }
            }
            ListKey::Char(c) if !c.is_control() && modifiers.is_plain_typing() => {
                if let Some(overlay) = self.overlay.as_mut() {
                    overlay.push_char(c);
                }
            }
            _ => {}
        }
    }
}
