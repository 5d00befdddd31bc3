//! Bottom-docked quick find/replace bar.
//!
//! The panel is a thin egui rendering of [`FindBar`]: every click and
//! keystroke is forwarded to the controller, and the controller's deferred
//! focus requests are applied here once layout has run.

use crate::deferred::Flow;
use crate::editor::{FindBar, InputField, RegexMode, SearchOutcome};
use eframe::egui::{self, Color32, Key, RichText, Ui, Vec2};

/// Width of the find and replace text fields.
const FIELD_WIDTH: f32 = 260.0;

/// Output from the find bar panel.
#[derive(Debug, Clone, Default)]
pub struct FindBarPanelOutput {
    /// One of the bar's fields holds keyboard focus
    pub field_focused: bool,
    /// The bar was closed this frame
    pub closed: bool,
}

/// Renders a [`FindBar`] as a bottom panel.
pub struct FindBarPanel {
    find_id: egui::Id,
    replace_id: egui::Id,
}

impl Default for FindBarPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl FindBarPanel {
    pub fn new() -> Self {
        Self {
            find_id: egui::Id::new("quick_find_what"),
            replace_id: egui::Id::new("quick_find_replace_with"),
        }
    }

    /// Id of the find field's `TextEdit`.
    pub fn find_field_id(&self) -> egui::Id {
        self.find_id
    }

    /// Show the bar if it is visible, then apply pending focus requests.
    pub fn show(&mut self, ctx: &egui::Context, bar: &mut FindBar, is_dark: bool) -> FindBarPanelOutput {
        let mut output = FindBarPanelOutput::default();
        if !bar.is_shown() {
            return output;
        }

        let panel_bg = if is_dark {
            Color32::from_rgb(45, 45, 45)
        } else {
            Color32::from_rgb(250, 250, 250)
        };
        let border_color = if is_dark {
            Color32::from_rgb(70, 70, 70)
        } else {
            Color32::from_rgb(200, 200, 200)
        };
        let accent_color = if is_dark {
            Color32::from_rgb(100, 180, 255)
        } else {
            Color32::from_rgb(0, 120, 212)
        };
        let muted_color = if is_dark {
            Color32::from_rgb(140, 140, 140)
        } else {
            Color32::from_rgb(120, 120, 120)
        };

        let frame = egui::Frame::none()
            .fill(panel_bg)
            .stroke(egui::Stroke::new(1.0, border_color))
            .inner_margin(egui::Margin::symmetric(8.0, 6.0));

        egui::TopBottomPanel::bottom("quick_find_bar")
            .frame(frame)
            .resizable(false)
            .show(ctx, |ui| {
                self.find_row(ui, bar, is_dark, accent_color, muted_color, &mut output);
                if bar.is_shown() && bar.is_replace_row_shown() {
                    ui.add_space(4.0);
                    self.replace_row(ui, bar, muted_color, &mut output);
                }
            });

        self.apply_focus_requests(ctx, bar);
        output
    }

    fn find_row(
        &self,
        ui: &mut Ui,
        bar: &mut FindBar,
        is_dark: bool,
        accent_color: Color32,
        muted_color: Color32,
        output: &mut FindBarPanelOutput,
    ) {
        ui.horizontal(|ui| {
            if ui
                .add(egui::Button::new(RichText::new("×").size(16.0).color(muted_color)).frame(false))
                .on_hover_text("Close (Escape)")
                .clicked()
            {
                bar.hide();
                output.closed = true;
                return;
            }

            let mut find_what = bar.find_what().to_string();
            let response = ui.add(
                egui::TextEdit::singleline(&mut find_what)
                    .id(self.find_id)
                    .hint_text("Find...")
                    .desired_width(FIELD_WIDTH),
            );
            if response.changed() {
                bar.set_find_what(find_what);
            }
            if response.gained_focus() {
                bar.on_field_focused(InputField::Find);
            }
            output.field_focused |= response.has_focus();

            if response.lost_focus() {
                let (enter, escape, shift) =
                    ui.input(|i| (i.key_pressed(Key::Enter), i.key_pressed(Key::Escape), i.modifiers.shift));
                if enter {
                    bar.on_enter(shift);
                    bar.refocus_field(InputField::Find);
                } else if escape {
                    bar.hide();
                    output.closed = true;
                    return;
                }
            }

            history_menu(ui, "find_history", bar.find_choices().to_vec(), |item| {
                bar.set_find_what(item);
            });

            let can_search = bar.can_search();
            if ui
                .add_enabled(can_search, egui::Button::new(RichText::new("◀").size(12.0)))
                .on_hover_text("Previous (Shift+Enter)")
                .clicked()
            {
                bar.find_prev();
            }
            if ui
                .add_enabled(can_search, egui::Button::new(RichText::new("▶").size(12.0)))
                .on_hover_text("Next (Enter)")
                .clicked()
            {
                bar.find_next();
            }
            if ui
                .add_enabled(can_search, egui::Button::new("Find all"))
                .on_hover_text("Select every match")
                .clicked()
            {
                bar.find_all();
                output.closed = true;
                return;
            }

            ui.add_space(8.0);

            let options = bar.options();
            if ui
                .add(toggle_button("Aa", "Match case", options.match_case, is_dark, accent_color))
                .clicked()
            {
                bar.options_mut().match_case = !options.match_case;
            }
            if ui
                .add(toggle_button("W", "Whole word", options.whole_word, is_dark, accent_color))
                .clicked()
            {
                bar.options_mut().whole_word = !options.whole_word;
            }
            regex_mode_menu(ui, bar);

            let highlight = bar.highlight_matches_state();
            if ui
                .add_enabled(
                    highlight.enabled,
                    toggle_button("🔖", "Highlight matches", highlight.checked, is_dark, accent_color),
                )
                .clicked()
            {
                bar.set_highlight_matches(!highlight.checked);
            }

            let replace_tip = if bar.is_replace_row_shown() {
                "Hide replace"
            } else {
                "Show replace"
            };
            if ui
                .add(toggle_button("⇄", replace_tip, bar.is_replace_row_shown(), is_dark, accent_color))
                .clicked()
            {
                bar.toggle_replace_bar();
            }

            if bar.last_outcome() == Some(SearchOutcome::NotFound) {
                ui.label(RichText::new("No match").size(12.0).color(muted_color));
            }
        });
    }

    fn replace_row(
        &self,
        ui: &mut Ui,
        bar: &mut FindBar,
        muted_color: Color32,
        output: &mut FindBarPanelOutput,
    ) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("↳").size(14.0).color(muted_color));

            let mut replace_with = bar.replace_with().to_string();
            let response = ui.add(
                egui::TextEdit::singleline(&mut replace_with)
                    .id(self.replace_id)
                    .hint_text("Replace with...")
                    .desired_width(FIELD_WIDTH),
            );
            if response.changed() {
                bar.set_replace_with(replace_with);
            }
            if response.gained_focus() {
                bar.on_field_focused(InputField::Replace);
            }
            output.field_focused |= response.has_focus();
            if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                bar.replace();
                bar.refocus_field(InputField::Replace);
            }

            history_menu(ui, "replace_history", bar.replace_choices().to_vec(), |item| {
                bar.set_replace_with(item);
            });

            let can_replace = bar.can_replace();
            if ui
                .add_enabled(can_replace, egui::Button::new("Replace").min_size(Vec2::new(60.0, 0.0)))
                .clicked()
            {
                bar.replace();
            }
            if ui
                .add_enabled(can_replace, egui::Button::new("Replace All").min_size(Vec2::new(80.0, 0.0)))
                .clicked()
            {
                bar.replace_all();
            }
        });
    }

    /// Focus the requested field and select its text. Retries while the
    /// field does not exist yet or focus did not stick.
    fn apply_focus_requests(&self, ctx: &egui::Context, bar: &mut FindBar) {
        if bar.focus_requests().is_empty() {
            return;
        }
        let find = (self.find_id, bar.find_what().chars().count());
        let replace = (self.replace_id, bar.replace_with().chars().count());

        bar.run_focus_requests(|field| {
            let (id, len) = match field {
                InputField::Find => find,
                InputField::Replace => replace,
            };
            ctx.memory_mut(|m| m.request_focus(id));
            let Some(mut state) = egui::TextEdit::load_state(ctx, id) else {
                ctx.request_repaint();
                return Flow::Retry;
            };
            state.cursor.set_char_range(Some(egui::text::CCursorRange::two(
                egui::text::CCursor::new(0),
                egui::text::CCursor::new(len),
            )));
            state.store(ctx, id);
            if ctx.memory(|m| m.has_focus(id)) {
                Flow::Done
            } else {
                ctx.request_repaint();
                Flow::Retry
            }
        });
    }
}

/// Drop-down of recent entries next to a field.
fn history_menu(ui: &mut Ui, id: &str, items: Vec<String>, mut pick: impl FnMut(String)) {
    ui.push_id(id, |ui| {
        ui.add_enabled_ui(!items.is_empty(), |ui| {
            ui.menu_button("⏷", |ui| {
                for item in items {
                    if ui.button(&item).clicked() {
                        pick(item);
                        ui.close_menu();
                    }
                }
            });
        });
    });
}

fn regex_mode_menu(ui: &mut Ui, bar: &mut FindBar) {
    let current = bar.options().regex_mode;
    let label = match current {
        RegexMode::None => "abc",
        RegexMode::Regex => ".*",
        RegexMode::Wildcard => "*?",
    };
    ui.menu_button(label, |ui| {
        for mode in RegexMode::all() {
            if ui.radio(current == *mode, mode.label()).clicked() {
                bar.options_mut().regex_mode = *mode;
                ui.close_menu();
            }
        }
    })
    .response
    .on_hover_text("Pattern syntax");
}

/// Create a toggle button widget.
fn toggle_button<'a>(
    label: &'a str,
    tooltip: &'a str,
    active: bool,
    is_dark: bool,
    accent_color: Color32,
) -> impl egui::Widget + 'a {
    move |ui: &mut Ui| -> egui::Response {
        let text_color = if active {
            accent_color
        } else if is_dark {
            Color32::from_rgb(160, 160, 160)
        } else {
            Color32::from_rgb(100, 100, 100)
        };

        let bg_color = match (active, is_dark) {
            (false, _) => Color32::TRANSPARENT,
            (true, true) => Color32::from_rgb(50, 70, 90),
            (true, false) => Color32::from_rgb(220, 235, 250),
        };

        let border_color = if active {
            accent_color
        } else if is_dark {
            Color32::from_rgb(70, 70, 70)
        } else {
            Color32::from_rgb(180, 180, 180)
        };

        ui.add(
            egui::Button::new(RichText::new(label).size(12.0).color(text_color).strong())
                .fill(bg_color)
                .stroke(egui::Stroke::new(1.0, border_color))
                .min_size(Vec2::new(28.0, 22.0)),
        )
        .on_hover_text(tooltip)
    }
}

/// Highlight colors for search matches: (current match, other matches).
pub fn get_match_highlight_colors(is_dark: bool) -> (Color32, Color32) {
    if is_dark {
        (
            Color32::from_rgba_unmultiplied(255, 230, 0, 180),
            Color32::from_rgba_unmultiplied(200, 180, 80, 80),
        )
    } else {
        (
            Color32::from_rgba_unmultiplied(255, 220, 0, 200),
            Color32::from_rgba_unmultiplied(255, 255, 150, 150),
        )
    }
}
