//! Main application module for quickfind
//!
//! Hosts a text buffer with the quick find bar docked under it and a
//! workspace file list on the left. The app owns the buses the components
//! talk over and drains them once per frame.

use eframe::egui;
use log::{debug, info, warn};
use quickfind::config::{get_config_file_path, ConfigStore, FileConfigStore, Settings, Theme};
use quickfind::editor::{FindBar, FindTarget, FocusTarget, SharedSurface, TextBuffer};
use quickfind::error::Error;
use quickfind::list::{ControlWithItems, FixedWidthMeasure, RowId};
use quickfind::notify::{EventBus, FindBarEvent, HostCommand, ListEvent, Subscription};
use quickfind::ui::{EditorView, FindBarPanel, ItemListPanel};
use quickfind::workspace::{populate_list, scan_workspace, MAX_DEPTH};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

const WELCOME_TEXT: &str = "Welcome to quickfind.\n\n\
Ctrl+F opens the find bar, Ctrl+H adds the replace row.\n\
F3 / Shift+F3 search for the selection, Ctrl+F3 for the word under the caret.\n\
Double click a file on the left to load it here.\n\
Type while the file list has focus to search it.\n";

/// Keyboard shortcut actions, collected inside the input closure and run
/// afterwards.
#[derive(Debug, Clone, Copy)]
enum KeyboardAction {
    /// Ctrl+F
    OpenFind,
    /// Ctrl+H
    OpenReplace,
    /// F3
    FindNext,
    /// Shift+F3
    FindPrevious,
    /// Ctrl+F3
    FindNextAtCaret,
    /// Ctrl+Shift+F3
    FindPreviousAtCaret,
    /// Escape
    CloseFind,
}

pub struct QuickFindApp {
    settings: Settings,
    buffer: Rc<RefCell<TextBuffer>>,
    host: EventBus<HostCommand>,
    bar_events: Subscription<FindBarEvent>,
    find_bar: FindBar,
    find_panel: FindBarPanel,
    editor_view: EditorView,
    list: ControlWithItems,
    list_events: Subscription<ListEvent>,
    list_panel: ItemListPanel,
    /// File behind each list row
    paths: HashMap<RowId, PathBuf>,
    status: String,
    editor_focused: bool,
}

impl QuickFindApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings, root: &Path) -> Self {
        info!("Initializing quickfind in {}", root.display());

        match settings.theme {
            Theme::Dark => cc.egui_ctx.set_visuals(egui::Visuals::dark()),
            Theme::Light => cc.egui_ctx.set_visuals(egui::Visuals::light()),
            Theme::System => {}
        }

        let store: Box<dyn ConfigStore> = match get_config_file_path() {
            Ok(path) => Box::new(FileConfigStore::with_settings(settings.clone(), path)),
            Err(e) => {
                warn!("History will not be saved: {}", e);
                Box::new(settings.clone())
            }
        };

        let buffer = Rc::new(RefCell::new(TextBuffer::new(WELCOME_TEXT)));
        let host = EventBus::new();
        let bar_bus = EventBus::new();
        let bar_events = bar_bus.subscribe();
        let mut find_bar = FindBar::new(store, &host, bar_bus);
        let surface: SharedSurface = buffer.clone();
        find_bar.set_editor(Some(surface));

        let list_bus = EventBus::new();
        let list_events = list_bus.subscribe();
        let mut list = ControlWithItems::new(list_bus, Box::new(FixedWidthMeasure::default()));
        list.set_scroll_tick(settings.list_scroll_tick);
        let paths = populate_list(&mut list, &scan_workspace(root, MAX_DEPTH));
        list.set_show_header(settings.list_show_header);
        info!("Listed {} workspace entries", paths.len());

        Self {
            settings,
            buffer,
            host,
            bar_events,
            find_bar,
            find_panel: FindBarPanel::new(),
            editor_view: EditorView::new("quickfind_editor"),
            list,
            list_events,
            list_panel: ItemListPanel::new("workspace_list"),
            paths,
            status: String::new(),
            editor_focused: false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Keyboard
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        let action = ctx.input(|i| {
            let m = i.modifiers;
            // Ctrl+Shift+F3 first since it's the most specific
            if m.ctrl && m.shift && i.key_pressed(egui::Key::F3) {
                return Some(KeyboardAction::FindPreviousAtCaret);
            }
            if m.ctrl && i.key_pressed(egui::Key::F3) {
                return Some(KeyboardAction::FindNextAtCaret);
            }
            if m.shift && i.key_pressed(egui::Key::F3) {
                return Some(KeyboardAction::FindPrevious);
            }
            if i.key_pressed(egui::Key::F3) {
                return Some(KeyboardAction::FindNext);
            }
            if m.ctrl && i.key_pressed(egui::Key::F) {
                return Some(KeyboardAction::OpenFind);
            }
            if m.ctrl && i.key_pressed(egui::Key::H) {
                return Some(KeyboardAction::OpenReplace);
            }
            if i.key_pressed(egui::Key::Escape) && self.editor_focused {
                return Some(KeyboardAction::CloseFind);
            }
            None
        });

        let Some(action) = action else {
            return;
        };
        debug!("Keyboard shortcut: {:?}", action);
        match action {
            KeyboardAction::OpenFind => {
                self.find_bar.show(true);
            }
            KeyboardAction::OpenReplace => {
                if !self.find_bar.is_shown() {
                    if self.find_bar.show(true) && !self.find_bar.is_replace_row_shown() {
                        self.find_bar.toggle_replace_bar();
                    }
                } else {
                    self.find_bar.toggle_replace_bar();
                }
            }
            KeyboardAction::FindNext => self.host.post(HostCommand::FindNext),
            KeyboardAction::FindPrevious => self.host.post(HostCommand::FindPrevious),
            KeyboardAction::FindNextAtCaret => self.host.post(HostCommand::FindNextAtCaret),
            KeyboardAction::FindPreviousAtCaret => {
                self.host.post(HostCommand::FindPreviousAtCaret)
            }
            KeyboardAction::CloseFind => {
                if self.find_bar.is_shown() {
                    self.find_bar.hide();
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Notifications
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_find_bar_events(&mut self, ctx: &egui::Context) {
        for event in self.bar_events.drain() {
            match event {
                FindBarEvent::MarkAllMatches { needle, flags } => {
                    let count = self
                        .buffer
                        .borrow_mut()
                        .as_highlightable()
                        .map(|h| h.mark_all(&needle, flags))
                        .unwrap_or(0);
                    self.status = format!("{} matches of \"{}\"", count, needle);
                }
                FindBarEvent::Status(message) => self.status = message,
                FindBarEvent::ClearStatus => self.status.clear(),
                FindBarEvent::FocusEditor => {
                    ctx.memory_mut(|m| m.request_focus(self.editor_view.id()));
                }
                FindBarEvent::LayoutChanged => ctx.request_repaint(),
            }
        }
    }

    fn handle_list_events(&mut self) {
        for event in self.list_events.drain() {
            match event {
                ListEvent::SearchText(text) => {
                    if self.list.apply_search(&text).is_none() && !text.is_empty() {
                        debug!("No list entry matches {:?}", text);
                    }
                }
                ListEvent::ClearSearch => self.list.clear_all_highlights(),
                ListEvent::ItemActivated(id) => self.open_row(id),
            }
        }
    }

    /// Load the file behind `id` into the buffer. Folders are ignored.
    fn open_row(&mut self, id: RowId) {
        let Some(path) = self.paths.get(&id) else {
            return;
        };
        if !path.is_file() {
            return;
        }
        match std::fs::read_to_string(path) {
            Ok(text) => {
                info!("Opened {}", path.display());
                self.buffer.borrow_mut().set_text(text);
                self.status = path.display().to_string();
            }
            Err(source) => {
                let err = Error::FileRead {
                    path: path.clone(),
                    source,
                };
                warn!("{}", err);
                self.status = err.to_string();
            }
        }
    }
}

impl eframe::App for QuickFindApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let is_dark = self.settings.theme.is_dark(ctx.style().visuals.dark_mode);

        self.handle_keyboard_shortcuts(ctx);

        egui::TopBottomPanel::bottom("status_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new(&self.status).size(12.0));
            });

        let bar_output = self.find_panel.show(ctx, &mut self.find_bar, is_dark);
        self.find_bar.flush();
        self.handle_find_bar_events(ctx);

        let list_output = egui::SidePanel::left("workspace_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| self.list_panel.show(ui, &mut self.list, is_dark))
            .inner;
        self.handle_list_events();

        let editor_output = egui::CentralPanel::default()
            .show(ctx, |ui| self.editor_view.show(ui, &self.buffer, is_dark))
            .inner;
        self.editor_focused = editor_output.focused;

        if !bar_output.field_focused {
            if editor_output.focused {
                self.find_bar.set_focus(FocusTarget::Editor);
            } else if list_output.focused {
                self.find_bar.set_focus(FocusTarget::Elsewhere);
            }
        }
        if bar_output.closed {
            ctx.memory_mut(|m| m.request_focus(self.editor_view.id()));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application exiting");
    }
}
