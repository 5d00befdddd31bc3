//! Quick find/replace bar controller.
//!
//! `FindBar` owns everything the bar needs except pixels: the find and
//! replace fields, the option toggles, history, visibility and the binding to
//! one text surface. The egui panel in `ui::find_bar_panel` renders it and
//! feeds user input back through the methods here.
//!
//! Every operation quietly does nothing when no surface is bound, the surface
//! is empty, or the find field is empty.

use crate::config::ConfigStore;
use crate::deferred::{DeferredQueue, Flow};
use crate::editor::{
    compile_pattern, convert_backrefs, wildcard_to_regex, FindTarget, Indicator, RegexMode,
    SearchDirection, SearchFlags, SharedSurface, UndoTransaction,
};
use crate::notify::{EventBus, FindBarEvent, HostCommand, Subscription};
use log::debug;

/// Extra frames a focus request is re-applied after the first attempt.
pub const FOCUS_RETRY_COUNT: u32 = 10;

/// Status text shown when a search had to restart from the other end.
pub const WRAPPED_STATUS: &str = "Wrapped past end of file";

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarVisibility {
    Hidden,
    ShowingFind,
    ShowingFindReplace,
}

/// Result of one `search` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Match found without wrapping
    Found,
    /// Match found after restarting from the start (or end)
    Wrapped,
    /// No match anywhere; caret restored
    NotFound,
    /// Nothing to do (no surface, empty document or empty needle)
    Skipped,
}

impl SearchOutcome {
    pub fn is_match(self) -> bool {
        matches!(self, SearchOutcome::Found | SearchOutcome::Wrapped)
    }
}

/// The bar's text inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputField {
    Find,
    Replace,
}

/// Where keyboard focus currently is, as far as the bar cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    #[default]
    Editor,
    Field(InputField),
    Elsewhere,
}

/// Toggle state of the option buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    pub match_case: bool,
    pub whole_word: bool,
    pub regex_mode: RegexMode,
}

/// Enabled/checked state of a toggle button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToggleState {
    pub enabled: bool,
    pub checked: bool,
}

/// Anchor at the selection start and search one way.
fn anchored_search(
    surface: &mut dyn FindTarget,
    direction: SearchDirection,
    flags: SearchFlags,
    needle: &str,
) -> Option<usize> {
    surface.search_anchor();
    match direction {
        SearchDirection::Forward => surface.search_next(flags, needle),
        SearchDirection::Backward => surface.search_prev(flags, needle),
    }
}

/// First visible line that puts `line` in the middle of the view.
pub fn centered_first_line(line: usize, lines_on_screen: usize) -> usize {
    line.saturating_sub(lines_on_screen / 2)
}

// ─────────────────────────────────────────────────────────────────────────────
// FindBar
// ─────────────────────────────────────────────────────────────────────────────

pub struct FindBar {
    surface: Option<SharedSurface>,
    store: Box<dyn ConfigStore>,
    commands: Subscription<HostCommand>,
    events: EventBus<FindBarEvent>,

    shown: bool,
    replace_row: bool,
    find_what: String,
    replace_with: String,
    find_choices: Vec<String>,
    replace_choices: Vec<String>,
    options: SearchOptions,

    /// Raised while the bar rewrites its own find field
    disable_text_update: bool,
    /// An incremental search is due on the next `flush`
    pending_incremental: bool,
    focus_requests: DeferredQueue<InputField>,
    focus: FocusTarget,
    last_outcome: Option<SearchOutcome>,
}

impl FindBar {
    /// Create a hidden bar. It listens for host commands on `commands` and
    /// reports back on `events`.
    pub fn new(
        store: Box<dyn ConfigStore>,
        commands: &EventBus<HostCommand>,
        events: EventBus<FindBarEvent>,
    ) -> Self {
        let replace_row = store.show_replace_bar();
        let find_choices = store.find_history();
        let replace_choices = store.replace_history();
        Self {
            surface: None,
            store,
            commands: commands.subscribe(),
            events,
            shown: false,
            replace_row,
            find_what: String::new(),
            replace_with: String::new(),
            find_choices,
            replace_choices,
            options: SearchOptions::default(),
            disable_text_update: false,
            pending_incremental: false,
            focus_requests: DeferredQueue::new(),
            focus: FocusTarget::Editor,
            last_outcome: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding and accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Bind to a surface, or unbind (which also hides the bar).
    pub fn set_editor(&mut self, surface: Option<SharedSurface>) {
        self.surface = surface;
        if self.surface.is_none() {
            self.do_show(false, "");
        }
    }

    pub fn editor(&self) -> Option<&SharedSurface> {
        self.surface.as_ref()
    }

    pub fn store(&self) -> &dyn ConfigStore {
        self.store.as_ref()
    }

    pub fn find_what(&self) -> &str {
        &self.find_what
    }

    pub fn replace_with(&self) -> &str {
        &self.replace_with
    }

    pub fn find_choices(&self) -> &[String] {
        &self.find_choices
    }

    pub fn replace_choices(&self) -> &[String] {
        &self.replace_choices
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    pub fn options_mut(&mut self) -> &mut SearchOptions {
        &mut self.options
    }

    pub fn focus(&self) -> FocusTarget {
        self.focus
    }

    pub fn last_outcome(&self) -> Option<SearchOutcome> {
        self.last_outcome
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn is_replace_row_shown(&self) -> bool {
        self.replace_row
    }

    pub fn visibility(&self) -> BarVisibility {
        match (self.shown, self.replace_row) {
            (false, _) => BarVisibility::Hidden,
            (true, false) => BarVisibility::ShowingFind,
            (true, true) => BarVisibility::ShowingFindReplace,
        }
    }

    /// Combined flag value for the text surface.
    pub fn search_flags(&self) -> SearchFlags {
        let mut flags = SearchFlags::NONE;
        if self.options.match_case {
            flags |= SearchFlags::MATCH_CASE;
        }
        if self.options.whole_word {
            flags |= SearchFlags::WHOLE_WORD;
        }
        if self.options.regex_mode != RegexMode::None {
            flags |= SearchFlags::REGEX;
        }
        flags
    }

    /// The needle as the surface should see it, plus its flags.
    fn effective_query(&self) -> (String, SearchFlags) {
        let needle = match self.options.regex_mode {
            RegexMode::Wildcard => wildcard_to_regex(&self.find_what),
            _ => self.find_what.clone(),
        };
        (needle, self.search_flags())
    }

    pub fn can_search(&self) -> bool {
        !self.find_what.is_empty()
            && self
                .surface
                .as_ref()
                .is_some_and(|s| !s.borrow().is_empty())
    }

    pub fn can_replace(&self) -> bool {
        self.can_search()
            && self
                .surface
                .as_ref()
                .is_some_and(|s| !s.borrow().is_read_only())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Field input
    // ─────────────────────────────────────────────────────────────────────────

    /// The user edited the find field. Schedules an incremental search.
    pub fn set_find_what(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.find_what {
            return;
        }
        self.find_what = text;
        if !self.disable_text_update {
            self.pending_incremental = true;
        }
    }

    pub fn set_replace_with(&mut self, text: impl Into<String>) {
        self.replace_with = text.into();
    }

    /// Rewrite the find field without triggering a search.
    fn change_find_value(&mut self, text: &str) {
        self.disable_text_update = true;
        self.set_find_what(text);
        self.disable_text_update = false;
    }

    /// The UI reports where keyboard focus went.
    pub fn set_focus(&mut self, focus: FocusTarget) {
        self.focus = focus;
    }

    /// The user focused a field. The caret they placed stays where it is.
    pub fn on_field_focused(&mut self, field: InputField) {
        self.focus = FocusTarget::Field(field);
    }

    /// Give `field` focus back with its text selected, after layout.
    pub fn refocus_field(&mut self, field: InputField) {
        self.focus = FocusTarget::Field(field);
        self.focus_requests.post(field, FOCUS_RETRY_COUNT);
    }

    pub fn focus_requests(&self) -> &DeferredQueue<InputField> {
        &self.focus_requests
    }

    /// Run queued focus requests. Called once per frame after layout.
    pub fn run_focus_requests(&mut self, handler: impl FnMut(&InputField) -> Flow) -> usize {
        self.focus_requests.run_pending(handler)
    }

    /// Process host commands and any pending incremental search.
    pub fn flush(&mut self) {
        for command in self.commands.drain() {
            self.handle_host_command(command);
        }
        if self.pending_incremental {
            self.pending_incremental = false;
            self.search(SearchDirection::Forward, true);
        }
    }

    pub fn has_pending_search(&self) -> bool {
        self.pending_incremental
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Visibility
    // ─────────────────────────────────────────────────────────────────────────

    /// Show or hide. Showing needs a bound surface.
    pub fn show(&mut self, show: bool) -> bool {
        if self.surface.is_none() && show {
            return false;
        }
        self.do_show(show, "")
    }

    /// Show with `find_what` pre-filled and selected.
    pub fn show_with(&mut self, find_what: &str) -> bool {
        if self.surface.is_none() {
            return false;
        }
        self.do_show(true, find_what)
    }

    /// Hide and blank the status bar.
    pub fn hide(&mut self) {
        self.events.post(FindBarEvent::ClearStatus);
        self.show(false);
    }

    fn do_show(&mut self, show: bool, find_what: &str) -> bool {
        let changed = self.shown != show;
        self.shown = show;

        if show {
            if let Some(surface) = &self.surface {
                let mut s = surface.borrow_mut();
                s.clear_indicator(Indicator::SearchMatch);
                if self.store.clear_highlights_on_find() {
                    s.clear_indicator(Indicator::WordHighlight);
                }
            }
        }

        if changed {
            self.events.post(FindBarEvent::LayoutChanged);
        }

        if self.surface.is_none() {
            return changed;
        }

        if !show {
            self.focus = FocusTarget::Editor;
            self.focus_requests.clear();
            self.events.post(FindBarEvent::FocusEditor);
        } else if !find_what.is_empty() {
            self.change_find_value(find_what);
            self.request_find_focus();
        } else {
            let selected = self.first_selected_text();
            let first_line = selected.split('\n').next().unwrap_or_default();
            if !first_line.is_empty() {
                self.change_find_value(first_line);
            }
            self.request_find_focus();
        }
        changed
    }

    fn request_find_focus(&mut self) {
        self.refocus_field(InputField::Find);
    }

    /// Flip the replace row. Only while shown and bound.
    pub fn toggle_replace_bar(&mut self) {
        if self.surface.is_none() || !self.shown {
            return;
        }
        let show = !self.store.show_replace_bar();
        self.store.set_show_replace_bar(show);
        self.replace_row = show;
        self.events.post(FindBarEvent::LayoutChanged);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────────────────

    fn commit_find_history(&mut self) {
        if self.find_what.is_empty() {
            return;
        }
        self.store.add_find_item(&self.find_what);

        self.disable_text_update = true;
        let current = self.find_what.clone();
        self.find_choices = self.store.find_history();
        self.set_find_what(current);
        self.disable_text_update = false;
    }

    fn commit_replace_history(&mut self) {
        if self.replace_with.is_empty() {
            return;
        }
        self.store.add_replace_item(&self.replace_with);
        self.disable_text_update = true;
        self.replace_choices = self.store.replace_history();
        self.disable_text_update = false;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────

    /// Next button / Enter.
    pub fn find_next(&mut self) -> SearchOutcome {
        self.commit_find_history();
        self.search(SearchDirection::Forward, false)
    }

    /// Previous button / Shift+Enter.
    pub fn find_prev(&mut self) -> SearchOutcome {
        self.commit_find_history();
        self.search(SearchDirection::Backward, false)
    }

    /// Enter in the find field; Shift reverses direction.
    pub fn on_enter(&mut self, shift: bool) -> SearchOutcome {
        if shift {
            self.find_prev()
        } else {
            self.find_next()
        }
    }

    /// Search from the current caret or selection, wrapping once.
    pub fn search(&mut self, direction: SearchDirection, incremental: bool) -> SearchOutcome {
        let outcome = self.do_search(direction, incremental);
        debug!(
            "search '{}' {:?} incremental={} -> {:?}",
            self.find_what, direction, incremental, outcome
        );
        self.last_outcome = Some(outcome);
        outcome
    }

    /// Put the caret at `from` and search from there.
    pub fn search_from(
        &mut self,
        direction: SearchDirection,
        incremental: bool,
        from: usize,
    ) -> SearchOutcome {
        if let Some(surface) = &self.surface {
            surface.borrow_mut().set_empty_selection(from);
        }
        self.search(direction, incremental)
    }

    fn do_search(&mut self, direction: SearchDirection, incremental: bool) -> SearchOutcome {
        let Some(surface) = self.surface.clone() else {
            return SearchOutcome::Skipped;
        };
        let mut s = surface.borrow_mut();
        if s.is_empty() || self.find_what.is_empty() {
            return SearchOutcome::Skipped;
        }

        self.events.post(FindBarEvent::ClearStatus);
        if self.store.clear_highlights_on_find() {
            s.clear_indicator(Indicator::WordHighlight);
        }

        let (needle, flags) = self.effective_query();
        let forward = direction == SearchDirection::Forward;
        let caret = s.current_pos();

        // step off a selection that already is a hit
        if forward && !incremental {
            let sel = s.selection();
            if !sel.is_empty() && s.find_in_range(&needle, flags, sel.start, sel.end).is_some() {
                s.set_empty_selection(sel.end);
            }
        }

        let mut wrapped = false;
        let mut pos = anchored_search(&mut *s, direction, flags, &needle);
        if pos.is_none() {
            let restart = if forward { 0 } else { s.len() };
            s.set_empty_selection(restart);
            pos = anchored_search(&mut *s, direction, flags, &needle);
            wrapped = pos.is_some();
        }

        if pos.is_none() {
            s.set_empty_selection(caret);
            return SearchOutcome::NotFound;
        }

        let line = s.line_from_position(s.selection().start);
        let first = centered_first_line(line, s.lines_on_screen());
        s.set_first_visible_line(first);

        if wrapped {
            self.events.post(FindBarEvent::Status(WRAPPED_STATUS.to_string()));
            SearchOutcome::Wrapped
        } else {
            SearchOutcome::Found
        }
    }

    /// Text of the main selection, or of the first non-empty one when there
    /// are several.
    fn first_selected_text(&self) -> String {
        let Some(surface) = &self.surface else {
            return String::new();
        };
        let s = surface.borrow();
        let selections = s.selections();
        if selections.len() > 1 {
            selections
                .iter()
                .find(|sel| !sel.is_empty())
                .map(|sel| s.text_range(sel.start, sel.end))
                .unwrap_or_default()
        } else {
            s.selected_text()
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Replace
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the selection(s) when they hold a match, else find the next one.
    pub fn replace(&mut self) {
        let Some(surface) = self.surface.clone() else {
            return;
        };

        let selection_text = self.first_selected_text();
        if selection_text.is_empty() || self.find_what.is_empty() {
            return;
        }

        self.commit_replace_history();

        let mut s = surface.borrow_mut();
        let selections = s.selections();
        let start = s.selection().start;
        let (needle, flags) = self.effective_query();

        let replacement = if flags.contains(SearchFlags::REGEX) {
            match compile_pattern(&needle, flags) {
                Ok(re) if re.is_match(&selection_text) => Some(
                    re.replace_all(&selection_text, convert_backrefs(&self.replace_with).as_str())
                        .into_owned(),
                ),
                Ok(_) => None,
                Err(e) => {
                    debug!("{}", e);
                    None
                }
            }
        } else {
            let same = if self.options.match_case {
                selection_text == self.find_what
            } else {
                selection_text.to_lowercase() == self.find_what.to_lowercase()
            };
            if !same {
                drop(s);
                self.search(SearchDirection::Forward, true);
                return;
            }
            Some(self.replace_with.clone())
        };

        let Some(replacement) = replacement else {
            // pattern invalid or not matching the selection: leave the text alone
            drop(s);
            if selections.len() == 1 {
                self.search(SearchDirection::Forward, true);
            }
            return;
        };

        let mut ranges: Vec<_> = selections.iter().filter(|sel| !sel.is_empty()).collect();
        ranges.sort_by(|a, b| b.start.cmp(&a.start));
        {
            let mut tx = UndoTransaction::begin(&mut *s);
            for sel in ranges {
                tx.surface().replace_range(sel.start, sel.end, &replacement);
            }
        }
        s.clear_selections();
        drop(s);

        if selections.len() == 1 {
            self.search_from(SearchDirection::Forward, true, start + replacement.len());
        }
    }

    /// Replace every match in the document as one undo step.
    pub fn replace_all(&mut self) -> usize {
        let Some(surface) = self.surface.clone() else {
            return 0;
        };
        if !self.can_replace() {
            return 0;
        }
        self.commit_find_history();
        self.commit_replace_history();

        let (needle, flags) = self.effective_query();
        let regex = if flags.contains(SearchFlags::REGEX) {
            match compile_pattern(&needle, flags) {
                Ok(re) => Some(re),
                Err(e) => {
                    debug!("{}", e);
                    return 0;
                }
            }
        } else {
            None
        };
        let template = convert_backrefs(&self.replace_with);

        let mut count = 0;
        let mut s = surface.borrow_mut();
        {
            let mut tx = UndoTransaction::begin(&mut *s);
            let mut pos = 0;
            loop {
                let len = tx.surface().len();
                let Some((start, end)) = tx.surface().find_in_range(&needle, flags, pos, len)
                else {
                    break;
                };
                let replacement = match &regex {
                    Some(re) => {
                        let text = tx.surface().text_range(0, len);
                        let mut expanded = String::new();
                        if let Some(caps) = re.captures_at(&text, start) {
                            caps.expand(&template, &mut expanded);
                        }
                        expanded
                    }
                    None => self.replace_with.clone(),
                };
                tx.surface().replace_range(start, end, &replacement);
                pos = start + replacement.len();
                count += 1;
            }
        }
        s.clear_selections();
        drop(s);

        self.events
            .post(FindBarEvent::Status(format!("Replaced {} occurrence(s)", count)));
        count
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Find all / highlight
    // ─────────────────────────────────────────────────────────────────────────

    /// Ask the host to mark every match, then hide.
    pub fn find_all(&mut self) {
        if self.surface.is_none() || self.find_what.is_empty() {
            return;
        }
        self.commit_find_history();
        let (needle, flags) = self.effective_query();
        self.events
            .post(FindBarEvent::MarkAllMatches { needle, flags });
        self.show(false);
    }

    /// Turn find bookmarks on (and mark all) or remove them.
    pub fn set_highlight_matches(&mut self, checked: bool) {
        let Some(surface) = self.surface.clone() else {
            return;
        };
        let mut s = surface.borrow_mut();
        let Some(editor) = s.as_highlightable() else {
            return;
        };
        if checked {
            editor.set_find_bookmarks_active(true);
            drop(s);
            self.find_all();
        } else {
            editor.delete_find_markers();
            editor.set_find_bookmarks_active(false);
        }
    }

    /// State of the highlight toggle button.
    pub fn highlight_matches_state(&self) -> ToggleState {
        let Some(surface) = &self.surface else {
            return ToggleState::default();
        };
        if self.find_what.is_empty() {
            return ToggleState::default();
        }
        if !surface.borrow().has_highlight_capability() {
            return ToggleState::default();
        }
        let checked = surface
            .borrow_mut()
            .as_highlightable()
            .is_some_and(|editor| editor.has_find_markers());
        ToggleState {
            enabled: true,
            checked,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Host commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Navigation commands only run while the editor or the find field has
    /// focus and there is text to search.
    fn accepts_navigation(&self) -> bool {
        let focused = matches!(
            self.focus,
            FocusTarget::Editor | FocusTarget::Field(InputField::Find)
        );
        focused
            && self
                .surface
                .as_ref()
                .is_some_and(|s| !s.borrow().is_empty())
    }

    pub fn handle_host_command(&mut self, command: HostCommand) -> SearchOutcome {
        match command {
            HostCommand::FindNext => self.find_selected(SearchDirection::Forward),
            HostCommand::FindPrevious => self.find_selected(SearchDirection::Backward),
            HostCommand::FindNextAtCaret => self.find_at_caret(SearchDirection::Forward),
            HostCommand::FindPreviousAtCaret => self.find_at_caret(SearchDirection::Backward),
            HostCommand::ReleaseEditor(id) => {
                let bound = self.surface.as_ref().is_some_and(|s| s.borrow().id() == id);
                if bound {
                    self.surface = None;
                    self.show(false);
                }
                SearchOutcome::Skipped
            }
        }
    }

    /// Selected text takes precedence over the find field.
    fn find_selected(&mut self, direction: SearchDirection) -> SearchOutcome {
        if !self.accepts_navigation() {
            return SearchOutcome::Skipped;
        }
        let selected = self.first_selected_text();
        if !selected.is_empty() {
            self.change_find_value(&selected);
        }
        self.search(direction, false)
    }

    /// Search for the selection, or the word under the caret.
    fn find_at_caret(&mut self, direction: SearchDirection) -> SearchOutcome {
        if !self.accepts_navigation() {
            return SearchOutcome::Skipped;
        }
        let mut selection = self.first_selected_text();
        if selection.is_empty() {
            if let Some(surface) = &self.surface {
                let mut s = surface.borrow_mut();
                let (start, end) = s.word_range_at(s.current_pos());
                selection = s.text_range(start, end);
                if !selection.is_empty() {
                    s.set_empty_selection(start);
                }
            }
        }
        if selection.is_empty() {
            return SearchOutcome::Skipped;
        }
        self.change_find_value(&selection);
        self.search(direction, false)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::editor::{HighlightableEditor, Selection, TextBuffer, TextSurface};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Harness {
        bar: FindBar,
        buf: Rc<RefCell<TextBuffer>>,
        host: EventBus<HostCommand>,
        out: Subscription<FindBarEvent>,
    }

    fn harness_with(buf: TextBuffer) -> Harness {
        let host = EventBus::new();
        let events = EventBus::new();
        let out = events.subscribe();
        let mut bar = FindBar::new(Box::new(Settings::default()), &host, events);
        let buf = Rc::new(RefCell::new(buf));
        let shared: SharedSurface = buf.clone();
        bar.set_editor(Some(shared));
        Harness { bar, buf, host, out }
    }

    fn harness(text: &str) -> Harness {
        harness_with(TextBuffer::new(text))
    }

    /// Type into the find field and let the incremental search run.
    fn type_find(h: &mut Harness, text: &str) {
        h.bar.set_find_what(text);
        h.bar.flush();
    }

    fn selection(h: &Harness) -> Selection {
        h.buf.borrow().selection()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_incremental_search_selects_first_match() {
        let mut h = harness("let abc = abcd;");
        type_find(&mut h, "abc");
        assert_eq!(selection(&h), Selection::new(4, 7));
        assert_eq!(h.bar.last_outcome(), Some(SearchOutcome::Found));
    }

    #[test]
    fn test_incremental_search_keeps_current_hit() {
        let mut h = harness("abc abcd");
        type_find(&mut h, "ab");
        assert_eq!(selection(&h), Selection::new(0, 2));
        type_find(&mut h, "abc");
        assert_eq!(selection(&h), Selection::new(0, 3));
        type_find(&mut h, "abcd");
        assert_eq!(selection(&h), Selection::new(4, 8));
    }

    #[test]
    fn test_single_match_wraps_to_itself() {
        let mut h = harness("xx abc yy");
        type_find(&mut h, "abc");
        assert_eq!(selection(&h), Selection::new(3, 6));
        h.out.drain();

        assert_eq!(h.bar.find_next(), SearchOutcome::Wrapped);
        assert_eq!(selection(&h), Selection::new(3, 6));
        let events = h.out.drain();
        assert!(events.contains(&FindBarEvent::Status(WRAPPED_STATUS.to_string())));
    }

    #[test]
    fn test_find_next_moves_past_current_hit() {
        let mut h = harness("ab ab ab");
        type_find(&mut h, "ab");
        assert_eq!(h.bar.find_next(), SearchOutcome::Found);
        assert_eq!(selection(&h), Selection::new(3, 5));
        assert_eq!(h.bar.find_next(), SearchOutcome::Found);
        assert_eq!(selection(&h), Selection::new(6, 8));
        assert_eq!(h.bar.find_next(), SearchOutcome::Wrapped);
        assert_eq!(selection(&h), Selection::new(0, 2));
    }

    #[test]
    fn test_find_prev_wraps_to_end() {
        let mut h = harness("ab ab ab");
        type_find(&mut h, "ab");
        assert_eq!(h.bar.find_prev(), SearchOutcome::Wrapped);
        assert_eq!(selection(&h), Selection::new(6, 8));
        assert_eq!(h.bar.find_prev(), SearchOutcome::Found);
        assert_eq!(selection(&h), Selection::new(3, 5));
    }

    #[test]
    fn test_not_found_restores_caret() {
        let mut h = harness("hello world");
        h.buf.borrow_mut().set_empty_selection(4);
        type_find(&mut h, "zzz");
        assert_eq!(h.bar.last_outcome(), Some(SearchOutcome::NotFound));
        assert_eq!(selection(&h), Selection::caret(4));
        assert!(h.out.drain().iter().all(|e| !matches!(e, FindBarEvent::Status(_))));
    }

    #[test]
    fn test_noop_without_surface_text_or_needle() {
        let host = EventBus::new();
        let mut bar = FindBar::new(Box::new(Settings::default()), &host, EventBus::new());
        bar.set_find_what("x");
        assert_eq!(bar.search(SearchDirection::Forward, false), SearchOutcome::Skipped);
        assert!(!bar.show(true));

        let mut h = harness("");
        h.bar.set_find_what("x");
        assert_eq!(h.bar.find_next(), SearchOutcome::Skipped);

        let mut h = harness("text");
        assert_eq!(h.bar.find_next(), SearchOutcome::Skipped);
        h.bar.replace();
        assert_eq!(h.buf.borrow().text(), "text");
    }

    #[test]
    fn test_centered_first_line() {
        assert_eq!(centered_first_line(5, 20), 0);
        assert_eq!(centered_first_line(100, 20), 90);
        assert_eq!(centered_first_line(10, 20), 0);
        assert_eq!(centered_first_line(11, 20), 1);
    }

    #[test]
    fn test_search_centers_match_line() {
        let mut text = String::new();
        for i in 0..200 {
            if i == 100 {
                text.push_str("needle\n");
            } else {
                text.push_str("hay\n");
            }
        }
        let mut h = harness(&text);
        h.buf.borrow_mut().set_lines_on_screen(20);
        type_find(&mut h, "needle");
        assert_eq!(h.buf.borrow().first_visible_line(), 90);
    }

    #[test]
    fn test_search_clears_word_highlights() {
        let mut h = harness("alpha beta");
        h.buf
            .borrow_mut()
            .set_indicator(Indicator::WordHighlight, 0, 5);
        type_find(&mut h, "beta");
        assert!(h
            .buf
            .borrow()
            .indicator_ranges(Indicator::WordHighlight)
            .is_empty());
    }

    #[test]
    fn test_wildcard_mode_sets_regex_flag() {
        let mut h = harness("fn getName() {}");
        h.bar.options_mut().regex_mode = RegexMode::Wildcard;
        assert!(h.bar.search_flags().contains(SearchFlags::REGEX));
        type_find(&mut h, "get*(");
        assert_eq!(h.buf.borrow().selected_text(), "getName(");
    }

    #[test]
    fn test_whole_word_and_match_case_flags() {
        let mut h = harness("Test testing test");
        h.bar.options_mut().match_case = true;
        h.bar.options_mut().whole_word = true;
        assert_eq!(
            h.bar.search_flags(),
            SearchFlags::MATCH_CASE | SearchFlags::WHOLE_WORD
        );
        type_find(&mut h, "test");
        assert_eq!(selection(&h), Selection::new(13, 17));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Replace
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_replace_then_search_does_not_rematch() {
        let mut h = harness("abcabc");
        type_find(&mut h, "abc");
        assert_eq!(selection(&h), Selection::new(0, 3));

        h.bar.set_replace_with("xyz");
        h.bar.replace();
        assert_eq!(h.buf.borrow().text(), "xyzabc");
        assert_eq!(selection(&h), Selection::new(3, 6));
    }

    #[test]
    fn test_replace_multiple_selections() {
        let mut h = harness("abc12abc34");
        {
            let mut buf = h.buf.borrow_mut();
            buf.set_selection(0, 3);
            buf.add_selection(5, 8);
        }
        h.bar.change_find_value("abc");
        h.bar.set_replace_with("Q");
        h.bar.replace();

        let buf = h.buf.borrow();
        assert_eq!(buf.text(), "Q12Q34");
        assert_eq!(buf.len(), 10 - 4);
        assert_eq!(buf.selections().len(), 1);
        assert!(buf.selection().is_empty());
    }

    #[test]
    fn test_replace_is_single_undo_step() {
        let mut h = harness("abc12abc34");
        {
            let mut buf = h.buf.borrow_mut();
            buf.set_selection(0, 3);
            buf.add_selection(5, 8);
        }
        h.bar.change_find_value("abc");
        h.bar.set_replace_with("Q");
        h.bar.replace();
        assert!(h.buf.borrow_mut().undo());
        assert_eq!(h.buf.borrow().text(), "abc12abc34");
    }

    #[test]
    fn test_replace_case_mismatch_searches_instead() {
        // With match case on, a selection differing only in case is not a hit:
        // the bar re-syncs by searching rather than replacing or reporting.
        let mut h = harness("ABC abc");
        h.bar.options_mut().match_case = true;
        h.buf.borrow_mut().set_selection(0, 3);
        h.bar.change_find_value("abc");
        h.bar.set_replace_with("x");
        h.bar.replace();

        assert_eq!(h.buf.borrow().text(), "ABC abc");
        assert_eq!(selection(&h), Selection::new(4, 7));
    }

    #[test]
    fn test_replace_case_folded_when_match_case_off() {
        let mut h = harness("ABC abc");
        h.buf.borrow_mut().set_selection(0, 3);
        h.bar.change_find_value("abc");
        h.bar.set_replace_with("x");
        h.bar.replace();
        assert_eq!(h.buf.borrow().text(), "x abc");
        assert_eq!(selection(&h), Selection::new(2, 5));
    }

    #[test]
    fn test_replace_regex_backrefs() {
        let mut h = harness("call foo(1) now");
        h.bar.options_mut().regex_mode = RegexMode::Regex;
        type_find(&mut h, r"(\w+)\((\d)\)");
        assert_eq!(h.buf.borrow().selected_text(), "foo(1)");

        h.bar.set_replace_with(r"\2-\1");
        h.bar.replace();
        assert_eq!(h.buf.borrow().text(), "call 1-foo now");
    }

    #[test]
    fn test_replace_regex_keeps_selection_case() {
        let mut h = harness("Hello");
        h.bar.options_mut().regex_mode = RegexMode::Regex;
        type_find(&mut h, "h(el)lo");
        h.bar.set_replace_with("J${1}ly");
        h.bar.replace();
        assert_eq!(h.buf.borrow().text(), "Jelly");
    }

    #[test]
    fn test_replace_invalid_regex_changes_nothing() {
        let mut h = harness("a[b");
        h.buf.borrow_mut().set_selection(1, 2);
        h.bar.options_mut().regex_mode = RegexMode::Regex;
        h.bar.change_find_value("[");
        h.bar.set_replace_with("x");
        h.bar.replace();
        assert_eq!(h.buf.borrow().text(), "a[b");
    }

    #[test]
    fn test_replace_records_history() {
        let mut h = harness("abc");
        type_find(&mut h, "abc");
        h.bar.set_replace_with("zz");
        h.bar.replace();
        assert_eq!(h.bar.replace_choices(), ["zz".to_string()]);
        assert_eq!(h.bar.store().replace_history(), vec!["zz"]);
    }

    #[test]
    fn test_replace_all_counts_and_groups_undo() {
        let mut h = harness("a-a-a");
        h.bar.change_find_value("a");
        h.bar.set_replace_with("bb");
        assert_eq!(h.bar.replace_all(), 3);
        assert_eq!(h.buf.borrow().text(), "bb-bb-bb");
        assert!(h
            .out
            .drain()
            .contains(&FindBarEvent::Status("Replaced 3 occurrence(s)".to_string())));
        assert!(h.buf.borrow_mut().undo());
        assert_eq!(h.buf.borrow().text(), "a-a-a");
    }

    #[test]
    fn test_replace_all_replacement_containing_needle() {
        let mut h = harness("x x");
        h.bar.change_find_value("x");
        h.bar.set_replace_with("xx");
        assert_eq!(h.bar.replace_all(), 2);
        assert_eq!(h.buf.borrow().text(), "xx xx");
    }

    #[test]
    fn test_replace_all_regex_groups() {
        let mut h = harness("k1=v1; k2=v2");
        h.bar.options_mut().regex_mode = RegexMode::Regex;
        h.bar.change_find_value(r"(\w+)=(\w+)");
        h.bar.set_replace_with(r"\2=\1");
        assert_eq!(h.bar.replace_all(), 2);
        assert_eq!(h.buf.borrow().text(), "v1=k1; v2=k2");
    }

    #[test]
    fn test_replace_all_read_only() {
        let mut h = harness("aaa");
        h.buf.borrow_mut().set_read_only(true);
        h.bar.change_find_value("a");
        assert!(!h.bar.can_replace());
        assert_eq!(h.bar.replace_all(), 0);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Visibility and history
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_double_toggle_restores_replace_row() {
        let mut h = harness("text");
        h.bar.show(true);
        let before = h.bar.visibility();
        assert_eq!(before, BarVisibility::ShowingFind);

        h.bar.toggle_replace_bar();
        assert_eq!(h.bar.visibility(), BarVisibility::ShowingFindReplace);
        assert!(h.bar.store().show_replace_bar());

        h.bar.toggle_replace_bar();
        assert_eq!(h.bar.visibility(), before);
        assert!(!h.bar.store().show_replace_bar());
    }

    #[test]
    fn test_toggle_ignored_while_hidden() {
        let mut h = harness("text");
        h.bar.toggle_replace_bar();
        assert_eq!(h.bar.visibility(), BarVisibility::Hidden);
        assert!(!h.bar.is_replace_row_shown());
    }

    #[test]
    fn test_show_with_seed_requests_focus() {
        let mut h = harness("some text");
        assert!(h.bar.show_with("text"));
        assert_eq!(h.bar.find_what(), "text");
        assert!(!h.bar.has_pending_search());
        assert_eq!(h.bar.focus(), FocusTarget::Field(InputField::Find));
        assert_eq!(
            h.bar.focus_requests().retries_left(&InputField::Find),
            Some(FOCUS_RETRY_COUNT)
        );
    }

    #[test]
    fn test_user_focus_keeps_caret_refocus_selects() {
        let mut h = harness("abc");
        h.bar.show(true);
        h.bar.run_focus_requests(|_| Flow::Done);
        assert!(h.bar.focus_requests().is_empty());

        h.bar.on_field_focused(InputField::Replace);
        assert_eq!(h.bar.focus(), FocusTarget::Field(InputField::Replace));
        assert!(h.bar.focus_requests().is_empty());

        h.bar.refocus_field(InputField::Replace);
        assert_eq!(
            h.bar.focus_requests().retries_left(&InputField::Replace),
            Some(FOCUS_RETRY_COUNT)
        );
    }

    #[test]
    fn test_show_seeds_from_first_selection_line() {
        let mut h = harness("first line\nsecond");
        h.buf.borrow_mut().set_selection(6, 15);
        h.bar.show(true);
        assert_eq!(h.bar.find_what(), "line");
    }

    #[test]
    fn test_show_clears_match_indicators() {
        let mut h = harness("abc");
        h.buf
            .borrow_mut()
            .set_indicator(Indicator::SearchMatch, 0, 3);
        h.bar.show(true);
        assert!(h
            .buf
            .borrow()
            .indicator_ranges(Indicator::SearchMatch)
            .is_empty());
    }

    #[test]
    fn test_hide_returns_focus_to_editor() {
        let mut h = harness("abc");
        h.bar.show(true);
        h.out.drain();
        h.bar.hide();
        assert!(!h.bar.is_shown());
        assert_eq!(h.bar.focus(), FocusTarget::Editor);
        let events = h.out.drain();
        assert!(events.contains(&FindBarEvent::FocusEditor));
        assert!(events.contains(&FindBarEvent::ClearStatus));
        assert!(events.contains(&FindBarEvent::LayoutChanged));
    }

    #[test]
    fn test_focus_request_retries_are_bounded() {
        let mut h = harness("abc");
        h.bar.show(true);
        let mut runs = 0;
        while !h.bar.focus_requests().is_empty() {
            h.bar.run_focus_requests(|_| {
                runs += 1;
                Flow::Retry
            });
        }
        assert_eq!(runs, FOCUS_RETRY_COUNT + 1);
    }

    #[test]
    fn test_commit_updates_history_without_incremental_search() {
        let mut h = harness("one two");
        type_find(&mut h, "two");
        h.bar.find_next();
        assert_eq!(h.bar.find_choices(), ["two".to_string()]);
        assert!(!h.bar.has_pending_search());
        assert_eq!(h.bar.store().find_history(), vec!["two"]);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Find all / highlight
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_find_all_posts_mark_all_and_hides() {
        let mut h = harness("x y x");
        h.bar.show(true);
        h.bar.change_find_value("x");
        h.out.drain();
        h.bar.find_all();
        assert!(!h.bar.is_shown());
        let events = h.out.drain();
        assert!(events.contains(&FindBarEvent::MarkAllMatches {
            needle: "x".to_string(),
            flags: SearchFlags::NONE,
        }));
    }

    #[test]
    fn test_highlight_matches_toggle() {
        let mut h = harness("x y x");
        h.bar.change_find_value("x");
        assert!(h.bar.highlight_matches_state().enabled);
        assert!(!h.bar.highlight_matches_state().checked);

        h.bar.set_highlight_matches(true);
        assert!(h.buf.borrow().find_bookmarks_active());
        // the host handles the posted request
        h.buf.borrow_mut().mark_all("x", SearchFlags::NONE);
        assert!(h.bar.highlight_matches_state().checked);

        h.bar.set_highlight_matches(false);
        assert!(!h.buf.borrow().find_bookmarks_active());
        assert!(!h.bar.highlight_matches_state().checked);
    }

    #[test]
    fn test_highlight_needs_capability() {
        let mut h = harness_with(TextBuffer::plain("x y x"));
        h.bar.change_find_value("x");
        assert_eq!(h.bar.highlight_matches_state(), ToggleState::default());
        h.bar.set_highlight_matches(true);
        assert!(h.out.drain().is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Host commands
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_find_next_command_prefers_selection() {
        let mut h = harness("foo bar foo bar");
        h.bar.change_find_value("foo");
        h.buf.borrow_mut().set_selection(4, 7);
        h.host.post(HostCommand::FindNext);
        h.bar.flush();
        assert_eq!(h.bar.find_what(), "bar");
        assert_eq!(selection(&h), Selection::new(12, 15));
    }

    #[test]
    fn test_navigation_requires_focus() {
        let mut h = harness("foo foo");
        h.bar.change_find_value("foo");
        h.bar.set_focus(FocusTarget::Elsewhere);
        assert_eq!(
            h.bar.handle_host_command(HostCommand::FindNext),
            SearchOutcome::Skipped
        );
        h.bar.set_focus(FocusTarget::Field(InputField::Replace));
        assert_eq!(
            h.bar.handle_host_command(HostCommand::FindNext),
            SearchOutcome::Skipped
        );
        h.bar.set_focus(FocusTarget::Field(InputField::Find));
        assert_eq!(
            h.bar.handle_host_command(HostCommand::FindNext),
            SearchOutcome::Found
        );
    }

    #[test]
    fn test_find_at_caret_uses_word() {
        let mut h = harness("let value = value + 1;");
        h.buf.borrow_mut().set_empty_selection(6);
        assert_eq!(
            h.bar.handle_host_command(HostCommand::FindNextAtCaret),
            SearchOutcome::Found
        );
        assert_eq!(h.bar.find_what(), "value");
        assert_eq!(selection(&h), Selection::new(4, 9));

        assert_eq!(
            h.bar.handle_host_command(HostCommand::FindNextAtCaret),
            SearchOutcome::Found
        );
        assert_eq!(selection(&h), Selection::new(12, 17));
    }

    #[test]
    fn test_find_previous_at_caret_without_word() {
        let mut h = harness("a  b");
        h.buf.borrow_mut().set_empty_selection(2);
        assert_eq!(
            h.bar.handle_host_command(HostCommand::FindPreviousAtCaret),
            SearchOutcome::Skipped
        );
    }

    #[test]
    fn test_release_editor_unbinds_and_hides() {
        let mut h = harness("abc");
        h.bar.show(true);
        let other = TextBuffer::new("zzz").id();
        h.host.post(HostCommand::ReleaseEditor(other));
        h.bar.flush();
        assert!(h.bar.editor().is_some());

        let id = h.buf.borrow().id();
        h.host.post(HostCommand::ReleaseEditor(id));
        h.bar.flush();
        assert!(h.bar.editor().is_none());
        assert_eq!(h.bar.visibility(), BarVisibility::Hidden);
    }

    #[test]
    fn test_dropping_bar_unsubscribes() {
        let h = harness("abc");
        assert_eq!(h.host.subscriber_count(), 1);
        let Harness { bar, host, .. } = h;
        drop(bar);
        assert_eq!(host.subscriber_count(), 0);
    }
}
