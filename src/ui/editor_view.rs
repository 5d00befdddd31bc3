//! Multiline view over a shared [`TextBuffer`].
//!
//! egui's `TextEdit` edits a plain `String`, so each frame the view copies
//! the buffer text in, pushes the buffer selection into the widget state if
//! the find bar moved it, and writes user edits and selection changes back.
//! Indicator ranges are painted as text backgrounds by the layouter.

use crate::editor::{Indicator, TextBuffer, TextSurface};
use crate::string_utils::{
    byte_index_to_char_index, ceil_char_boundary, char_index_to_byte_index, floor_char_boundary,
};
use crate::ui::get_match_highlight_colors;
use eframe::egui::{self, text::LayoutJob, Color32, FontId, ScrollArea, TextFormat, Ui};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

const FONT_SIZE: f32 = 14.0;

/// Output from the editor view.
#[derive(Debug, Clone, Default)]
pub struct EditorViewOutput {
    pub focused: bool,
    pub changed: bool,
}

pub struct EditorView {
    id: egui::Id,
    /// Selection (byte range) last exchanged with the widget
    last_selection: Option<(usize, usize)>,
    last_first_line: Option<usize>,
}

impl EditorView {
    pub fn new(id_source: impl std::hash::Hash) -> Self {
        Self {
            id: egui::Id::new(id_source),
            last_selection: None,
            last_first_line: None,
        }
    }

    pub fn id(&self) -> egui::Id {
        self.id
    }

    pub fn show(&mut self, ui: &mut Ui, buffer: &Rc<RefCell<TextBuffer>>, is_dark: bool) -> EditorViewOutput {
        let mut output = EditorViewOutput::default();
        let font = FontId::monospace(FONT_SIZE);
        let row_height = ui.fonts(|f| f.row_height(&font));

        let mut buf = buffer.borrow_mut();
        let lines_on_screen = (ui.available_height() / row_height).floor().max(1.0) as usize;
        buf.set_lines_on_screen(lines_on_screen);

        let mut text = buf.text().to_string();
        let selection = buf.selection();
        let wanted = (selection.start, selection.end);
        if self.last_selection != Some(wanted) {
            self.push_selection(ui.ctx(), &text, wanted);
        }

        let (current_bg, other_bg) = get_match_highlight_colors(is_dark);
        let mut backgrounds: Vec<(usize, usize, Color32)> = buf
            .indicator_ranges(Indicator::SearchMatch)
            .into_iter()
            .map(|(s, e)| (s, e, other_bg))
            .chain(
                buf.indicator_ranges(Indicator::WordHighlight)
                    .into_iter()
                    .map(|(s, e)| (s, e, current_bg.gamma_multiply(0.5))),
            )
            .collect();
        backgrounds.sort_by_key(|r| r.0);

        let text_color = ui.visuals().text_color();
        let layout_font = font.clone();
        let mut layouter = move |ui: &Ui, text: &str, wrap_width: f32| -> Arc<egui::Galley> {
            let mut job = highlight_job(text, &backgrounds, layout_font.clone(), text_color);
            job.wrap.max_width = wrap_width;
            ui.fonts(|f| f.layout_job(job))
        };

        let mut scroll_area = ScrollArea::vertical()
            .id_source(self.id.with("scroll"))
            .auto_shrink([false, false]);
        let first_line = buf.first_visible_line();
        if self.last_first_line != Some(first_line) {
            scroll_area = scroll_area.vertical_scroll_offset(first_line as f32 * row_height);
        }

        let scroll_output = scroll_area.show(ui, |ui| {
            egui::TextEdit::multiline(&mut text)
                .id(self.id)
                .font(font.clone())
                .desired_width(f32::INFINITY)
                .layouter(&mut layouter)
                .show(ui)
        });
        let text_output = scroll_output.inner;
        output.focused = text_output.response.has_focus();

        if text != buf.text() {
            buf.apply_external_edit(text.clone());
            output.changed = true;
        }

        if let Some(range) = text_output.cursor_range {
            let a = char_index_to_byte_index(&text, range.primary.ccursor.index);
            let b = char_index_to_byte_index(&text, range.secondary.ccursor.index);
            let seen = (a.min(b), a.max(b));
            if Some(seen) != self.last_selection {
                buf.set_selection(seen.0, seen.1);
            }
            self.last_selection = Some(seen);
        }

        let line = (scroll_output.state.offset.y / row_height).round() as usize;
        buf.set_first_visible_line(line);
        self.last_first_line = Some(buf.first_visible_line());

        output
    }

    /// Move the widget's cursor to the buffer selection `(start, end)`.
    fn push_selection(&mut self, ctx: &egui::Context, text: &str, (start, end): (usize, usize)) {
        let mut state = egui::TextEdit::load_state(ctx, self.id).unwrap_or_default();
        state.cursor.set_char_range(Some(egui::text::CCursorRange::two(
            egui::text::CCursor::new(byte_index_to_char_index(text, start)),
            egui::text::CCursor::new(byte_index_to_char_index(text, end)),
        )));
        state.store(ctx, self.id);
        self.last_selection = Some((start, end));
    }
}

/// Lay `text` out with a background behind each byte range. Ranges must be
/// sorted by start; overlaps keep the earlier one.
fn highlight_job(
    text: &str,
    ranges: &[(usize, usize, Color32)],
    font: FontId,
    color: Color32,
) -> LayoutJob {
    let plain = TextFormat::simple(font, color);
    let mut job = LayoutJob::default();
    let mut at = 0;
    for &(start, end, bg) in ranges {
        let start = floor_char_boundary(text, start.min(text.len()));
        let end = ceil_char_boundary(text, end.min(text.len()));
        if start < at || start >= end {
            continue;
        }
        if start > at {
            job.append(&text[at..start], 0.0, plain.clone());
        }
        job.append(
            &text[start..end],
            0.0,
            TextFormat {
                background: bg,
                ..plain.clone()
            },
        );
        at = end;
    }
    if at < text.len() || job.sections.is_empty() {
        job.append(&text[at..], 0.0, plain);
    }
    job
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_job_sections() {
        let job = highlight_job(
            "one two one",
            &[(0, 3, Color32::RED), (8, 11, Color32::RED)],
            FontId::monospace(12.0),
            Color32::WHITE,
        );
        assert_eq!(job.text, "one two one");
        let backgrounds: Vec<_> = job.sections.iter().map(|s| s.format.background).collect();
        assert_eq!(
            backgrounds,
            vec![Color32::RED, Color32::TRANSPARENT, Color32::RED]
        );
    }

    #[test]
    fn test_highlight_job_skips_stale_ranges() {
        let job = highlight_job(
            "short",
            &[(2, 4, Color32::RED), (3, 40, Color32::RED), (50, 60, Color32::RED)],
            FontId::monospace(12.0),
            Color32::WHITE,
        );
        assert_eq!(job.text, "short");
        let highlighted: Vec<_> = job
            .sections
            .iter()
            .filter(|s| s.format.background == Color32::RED)
            .map(|s| &job.text[s.byte_range.clone()])
            .collect();
        assert_eq!(highlighted, vec!["or"]);
    }
}
