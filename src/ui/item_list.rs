//! egui rendering of [`ControlWithItems`].
//!
//! The control already knows where every on-screen row goes; this panel
//! feeds it the allocated rectangle, paints what it laid out, and turns egui
//! input into control calls. The inline search box is painted in a
//! foreground `Area` at the top-right of the list.

use crate::list::{
    ControlWithItems, HitArea, KeyModifiers, ListKey, RowEntry, RowId, ScrollDirection,
    TextMeasure, X_SPACER,
};
use eframe::egui::{self, Color32, FontId, Pos2, Rect, Sense, Ui, Vec2};

/// Indentation per tree level.
pub const INDENT_PER_LEVEL: f32 = 16.0;

/// Font size used for labels.
const LABEL_FONT_SIZE: f32 = 13.0;

/// Measures labels with the egui font atlas.
pub struct EguiMeasure {
    ctx: egui::Context,
    font: FontId,
}

impl EguiMeasure {
    pub fn new(ctx: &egui::Context, font: FontId) -> Self {
        Self {
            ctx: ctx.clone(),
            font,
        }
    }
}

impl TextMeasure for EguiMeasure {
    fn text_width(&self, text: &str) -> f32 {
        self.ctx.fonts(|f| {
            f.layout_no_wrap(text.to_owned(), self.font.clone(), Color32::WHITE)
                .size()
                .x
        })
    }

    fn text_height(&self) -> f32 {
        self.ctx.fonts(|f| f.row_height(&self.font))
    }
}

/// Output from the item list panel.
#[derive(Debug, Clone, Default)]
pub struct ItemListOutput {
    /// The list holds keyboard focus
    pub focused: bool,
    /// Row clicked this frame
    pub clicked: Option<RowId>,
}

/// Palette for one frame of list painting.
struct ListColors {
    text: Color32,
    muted: Color32,
    hover_bg: Color32,
    selected_bg: Color32,
    match_bg: Color32,
    header_bg: Color32,
    border: Color32,
}

impl ListColors {
    fn new(is_dark: bool) -> Self {
        if is_dark {
            Self {
                text: Color32::from_rgb(220, 220, 220),
                muted: Color32::from_rgb(140, 140, 140),
                hover_bg: Color32::from_rgb(50, 50, 60),
                selected_bg: Color32::from_rgb(45, 55, 75),
                match_bg: Color32::from_rgba_unmultiplied(255, 200, 0, 120),
                header_bg: Color32::from_rgb(40, 40, 40),
                border: Color32::from_rgb(60, 60, 60),
            }
        } else {
            Self {
                text: Color32::from_rgb(40, 40, 40),
                muted: Color32::from_rgb(120, 120, 120),
                hover_bg: Color32::from_rgb(220, 225, 235),
                selected_bg: Color32::from_rgb(200, 210, 230),
                match_bg: Color32::from_rgba_unmultiplied(255, 220, 0, 160),
                header_bg: Color32::from_rgb(235, 235, 235),
                border: Color32::from_rgb(200, 200, 200),
            }
        }
    }
}

pub struct ItemListPanel {
    id: egui::Id,
    measure_installed: bool,
}

impl ItemListPanel {
    pub fn new(id_source: impl std::hash::Hash) -> Self {
        Self {
            id: egui::Id::new(id_source),
            measure_installed: false,
        }
    }

    fn font() -> FontId {
        FontId::proportional(LABEL_FONT_SIZE)
    }

    /// Lay out, handle input and paint the control in the remaining space.
    pub fn show(&mut self, ui: &mut Ui, ctrl: &mut ControlWithItems, is_dark: bool) -> ItemListOutput {
        let mut output = ItemListOutput::default();

        if !self.measure_installed {
            ctrl.set_measure(Box::new(EguiMeasure::new(ui.ctx(), Self::font())));
            ctrl.set_indent(INDENT_PER_LEVEL);
            ctrl.do_update_header(None);
            for id in ctrl.rows().iter().map(|r| r.id).collect::<Vec<_>>() {
                ctrl.do_update_header(Some(id));
            }
            self.measure_installed = true;
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click());
        if rect != ctrl.client_rect() {
            ctrl.resize(rect);
        }

        if response.gained_focus() {
            ctrl.on_focus_gained();
        }
        if response.has_focus() {
            ui.memory_mut(|m| {
                m.set_focus_lock_filter(
                    response.id,
                    egui::EventFilter {
                        tab: false,
                        horizontal_arrows: true,
                        vertical_arrows: true,
                        escape: true,
                    },
                )
            });
            self.handle_keys(ui, ctrl);
            output.focused = true;
        }

        self.handle_pointer(ui, &response, ctrl, &mut output);

        let colors = ListColors::new(is_dark);
        let painter = ui.painter_at(rect);
        if ctrl.is_header_visible() && !ctrl.header().is_empty() {
            paint_header(&painter, ctrl, &colors);
        }
        let hovered = response.hover_pos().and_then(|p| ctrl.hit_test(p)).map(|(id, _)| id);
        for row in ctrl.on_screen_rows() {
            paint_row(&painter, ctrl, row, hovered == Some(row.id), &colors);
        }
        paint_scrollbar(&painter, ctrl, &colors);

        if let Some(text) = ctrl.overlay_text() {
            self.paint_overlay(ui.ctx(), rect, text, &colors);
        }

        output
    }

    fn handle_keys(&self, ui: &Ui, ctrl: &mut ControlWithItems) {
        let events = ui.input(|i| i.events.clone());
        for event in events {
            match event {
                egui::Event::Text(text) => {
                    let mods = ui.input(|i| to_key_modifiers(i.modifiers));
                    for c in text.chars() {
                        ctrl.handle_key(ListKey::Char(c), mods);
                    }
                }
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => {
                    if let Some(key) = to_list_key(key) {
                        ctrl.handle_key(key, to_key_modifiers(modifiers));
                    }
                }
                _ => {}
            }
        }
    }

    fn handle_pointer(
        &self,
        ui: &Ui,
        response: &egui::Response,
        ctrl: &mut ControlWithItems,
        output: &mut ItemListOutput,
    ) {
        if response.hovered() {
            let delta = ui.input(|i| i.raw_scroll_delta);
            if delta.y != 0.0 {
                ctrl.on_mouse_wheel(delta.y);
            }
            if delta.x != 0.0 {
                let direction = if delta.x < 0.0 {
                    ScrollDirection::Right
                } else {
                    ScrollDirection::Left
                };
                ctrl.scroll_columns(delta.x.abs() as i32, direction);
            }
        }

        let Some(pos) = response.interact_pointer_pos() else {
            return;
        };
        if response.clicked() {
            response.request_focus();
            match ctrl.hit_test(pos) {
                Some((id, HitArea::ExpandButton)) => ctrl.toggle_expand(id),
                Some((id, HitArea::Row)) => {
                    ctrl.select_row(id);
                    output.clicked = Some(id);
                }
                None => {}
            }
        }
        if response.double_clicked() {
            if let Some((id, HitArea::Row)) = ctrl.hit_test(pos) {
                ctrl.activate(id);
            }
        }
    }

    fn paint_overlay(&self, ctx: &egui::Context, rect: Rect, text: &str, colors: &ListColors) {
        let width = 180.0;
        let pos = Pos2::new(rect.right() - width - 8.0, rect.top() + 4.0);
        egui::Area::new(self.id.with("search_overlay"))
            .order(egui::Order::Foreground)
            .fixed_pos(pos)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(width);
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new("🔍").color(colors.muted));
                        ui.label(egui::RichText::new(text).color(colors.text));
                    });
                });
            });
    }
}

fn to_key_modifiers(m: egui::Modifiers) -> KeyModifiers {
    KeyModifiers {
        ctrl: m.ctrl || m.command || m.mac_cmd,
        alt: m.alt,
        shift: m.shift,
    }
}

fn to_list_key(key: egui::Key) -> Option<ListKey> {
    use egui::Key;
    Some(match key {
        Key::Escape => ListKey::Escape,
        Key::Enter => ListKey::Enter,
        Key::Backspace => ListKey::Backspace,
        Key::ArrowUp => ListKey::Up,
        Key::ArrowDown => ListKey::Down,
        Key::ArrowLeft => ListKey::Left,
        Key::ArrowRight => ListKey::Right,
        Key::Home => ListKey::Home,
        Key::End => ListKey::End,
        Key::PageUp => ListKey::PageUp,
        Key::PageDown => ListKey::PageDown,
        _ => return None,
    })
}

fn paint_header(painter: &egui::Painter, ctrl: &ControlWithItems, colors: &ListColors) {
    let client = ctrl.client_rect();
    let header = ctrl.header();
    let header_rect = Rect::from_min_size(client.min, Vec2::new(client.width(), header.height()));
    painter.rect_filled(header_rect, 0.0, colors.header_bg);

    for (col, column) in header.columns().iter().enumerate() {
        let x = client.left() + header.column_x(col) - ctrl.first_column();
        let cell = Rect::from_min_size(
            Pos2::new(x, header_rect.top()),
            Vec2::new(column.width, header_rect.height()),
        );
        painter.with_clip_rect(cell).text(
            Pos2::new(cell.left() + X_SPACER, cell.center().y),
            egui::Align2::LEFT_CENTER,
            &column.label,
            ItemListPanel::font(),
            colors.muted,
        );
        painter.vline(cell.right(), cell.y_range(), egui::Stroke::new(1.0, colors.border));
    }
    painter.hline(
        header_rect.x_range(),
        header_rect.bottom(),
        egui::Stroke::new(1.0, colors.border),
    );
}

fn paint_row(
    painter: &egui::Painter,
    ctrl: &ControlWithItems,
    row: &RowEntry,
    hovered: bool,
    colors: &ListColors,
) {
    if ctrl.selection() == Some(row.id) {
        painter.rect_filled(row.rect, 2.0, colors.selected_bg);
    } else if hovered {
        painter.rect_filled(row.rect, 2.0, colors.hover_bg);
    }

    if row.has_children {
        let arrow = if row.expanded { "▼" } else { "▶" };
        painter.text(
            row.button_rect.center(),
            egui::Align2::CENTER_CENTER,
            arrow,
            FontId::proportional(10.0),
            colors.muted,
        );
    }

    let header = ctrl.header();
    let columns = header.len().max(1);
    for col in 0..columns {
        let mut x = row.rect.left() + header.column_x(col) - ctrl.first_column();
        let width = header
            .columns()
            .get(col)
            .map(|c| c.width)
            .unwrap_or_else(|| row.rect.width());
        let cell = Rect::from_min_size(Pos2::new(x, row.rect.top()), Vec2::new(width, row.rect.height()));
        if col == 0 {
            x += row.depth as f32 * ctrl.indent();
            if row.has_children {
                x += ctrl.line_height();
            }
        }
        x += X_SPACER;
        let clip = painter.with_clip_rect(cell.intersect(row.rect));
        paint_label(&clip, row, col, Pos2::new(x, row.rect.center().y), colors);
    }
}

/// Paint one label, splitting it around the recorded match if any.
fn paint_label(painter: &egui::Painter, row: &RowEntry, col: usize, pos: Pos2, colors: &ListColors) {
    let font = ItemListPanel::font();
    let Some(spans) = row.highlight.as_ref().and_then(|h| h.get(col)) else {
        painter.text(pos, egui::Align2::LEFT_CENTER, row.label(col), font, colors.text);
        return;
    };

    let mut x = pos.x;
    for (i, span) in spans.iter().enumerate() {
        if span.is_empty() {
            continue;
        }
        let galley = painter.layout_no_wrap(span.clone(), font.clone(), colors.text);
        let size = galley.size();
        let top_left = Pos2::new(x, pos.y - size.y / 2.0);
        if i == 1 {
            painter.rect_filled(Rect::from_min_size(top_left, size), 2.0, colors.match_bg);
        }
        painter.galley(top_left, galley, colors.text);
        x += size.x;
    }
}

fn paint_scrollbar(painter: &egui::Painter, ctrl: &ControlWithItems, colors: &ListColors) {
    let v = ctrl.vscroll();
    if v.range <= v.page || v.range <= 0.0 {
        return;
    }
    let track = ctrl.items_rect();
    let height = track.height() * (v.page / v.range);
    let top = track.top() + track.height() * (v.position / v.range);
    let thumb = Rect::from_min_size(
        Pos2::new(track.right() - 6.0, top),
        Vec2::new(4.0, height.max(12.0)),
    );
    painter.rect_filled(thumb, 2.0, colors.muted.gamma_multiply(0.6));
}
