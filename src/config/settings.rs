//! User settings and preferences for quickfind
//!
//! `Settings` is the serialized shape of the configuration file. It carries
//! the find/replace history, the "show replace row" preference and the few
//! list-control knobs the demo exposes.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Theme Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Color theme for the panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow whatever egui reports for the current visuals
    #[default]
    System,
}

impl Theme {
    /// Resolve to a dark/light decision given the toolkit's current visuals.
    pub fn is_dark(&self, system_dark: bool) -> bool {
        match self {
            Theme::Light => false,
            Theme::Dark => true,
            Theme::System => system_dark,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Window Size Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Initial window dimensions for the demo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1100.0,
            height: 720.0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// Persisted preferences.
///
/// All fields have defaults via `#[serde(default)]`, so a partial or older
/// config file still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Appearance
    // ─────────────────────────────────────────────────────────────────────────
    pub theme: Theme,
    pub window_size: WindowSize,

    // ─────────────────────────────────────────────────────────────────────────
    // Quick Find Bar
    // ─────────────────────────────────────────────────────────────────────────
    /// Committed search strings, most recent first
    pub find_history: Vec<String>,

    /// Committed replacement strings, most recent first
    pub replace_history: Vec<String>,

    /// Cap applied to both history lists
    pub max_history_items: usize,

    /// Whether the replace row is shown under the find row
    pub show_replace_bar: bool,

    /// Clear word-highlight indicators whenever a search runs
    pub clear_highlights_on_find: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Item List
    // ─────────────────────────────────────────────────────────────────────────
    /// Rows moved per mouse-wheel notch
    pub list_scroll_tick: usize,

    /// Whether the list shows its column header
    pub list_show_header: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            window_size: WindowSize::default(),

            find_history: Vec::new(),
            replace_history: Vec::new(),
            max_history_items: 20,
            show_replace_bar: false,
            clear_highlights_on_find: true,

            list_scroll_tick: 3,
            list_show_header: true,
        }
    }
}

/// Move `item` to the front of `list`, dropping duplicates and trimming to `max`.
///
/// Empty strings are never recorded.
pub fn push_history(list: &mut Vec<String>, item: &str, max: usize) {
    if item.is_empty() {
        return;
    }
    list.retain(|existing| existing != item);
    list.insert(0, item.to_string());
    list.truncate(max);
}

impl Settings {
    /// Record a committed search string.
    pub fn add_find_history(&mut self, item: &str) {
        push_history(&mut self.find_history, item, self.max_history_items);
    }

    /// Record a committed replacement string.
    pub fn add_replace_history(&mut self, item: &str) {
        push_history(&mut self.replace_history, item, self.max_history_items);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    pub const MIN_HISTORY_ITEMS: usize = 1;
    pub const MAX_HISTORY_ITEMS: usize = 100;
    pub const MIN_SCROLL_TICK: usize = 1;
    pub const MAX_SCROLL_TICK: usize = 20;
    pub const MIN_WINDOW_SIZE: f32 = 200.0;
    pub const MAX_WINDOW_SIZE: f32 = 10000.0;

    /// Clamp values that may have been hand-edited into nonsense.
    pub fn sanitize(&mut self) {
        self.max_history_items = self
            .max_history_items
            .clamp(Self::MIN_HISTORY_ITEMS, Self::MAX_HISTORY_ITEMS);

        let max = self.max_history_items;
        for list in [&mut self.find_history, &mut self.replace_history] {
            list.retain(|s| !s.is_empty());
            let mut seen = std::collections::HashSet::new();
            list.retain(|s| seen.insert(s.clone()));
            list.truncate(max);
        }

        self.list_scroll_tick = self
            .list_scroll_tick
            .clamp(Self::MIN_SCROLL_TICK, Self::MAX_SCROLL_TICK);

        self.window_size.width = self
            .window_size
            .width
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);
        self.window_size.height = self
            .window_size
            .height
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);
    }

    /// Deserialize and sanitize in one step.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}
