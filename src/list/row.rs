//! Row entries and the text measurement seam used to size them.

use crate::list::MatchResult;
use egui::{pos2, vec2, Rect};

/// Horizontal padding around a label.
pub const X_SPACER: f32 = 5.0;
/// Vertical padding above and below a label.
pub const Y_SPACER: f32 = 2.0;

/// Stable row identity, independent of position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub u64);

/// Rectangle given to rows that are not laid out.
pub fn offscreen_rect() -> Rect {
    Rect::from_min_size(pos2(-100.0, -100.0), vec2(0.0, 0.0))
}

/// Measures label text in the current font.
pub trait TextMeasure {
    fn text_width(&self, text: &str) -> f32;
    fn text_height(&self) -> f32;
}

/// Monospace approximation for headless use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedWidthMeasure {
    pub char_width: f32,
    pub char_height: f32,
}

impl Default for FixedWidthMeasure {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            char_height: 14.0,
        }
    }
}

impl TextMeasure for FixedWidthMeasure {
    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width
    }

    fn text_height(&self) -> f32 {
        self.char_height
    }
}

/// One row of the control.
#[derive(Debug, Clone, PartialEq)]
pub struct RowEntry {
    pub id: RowId,
    /// One label per column
    pub labels: Vec<String>,
    pub depth: usize,
    pub hidden: bool,
    pub has_children: bool,
    pub expanded: bool,
    pub rect: Rect,
    pub button_rect: Rect,
    /// Spans from the last search that hit this row
    pub highlight: Option<MatchResult>,
}

impl RowEntry {
    pub fn new(id: RowId, labels: Vec<String>) -> Self {
        Self {
            id,
            labels,
            depth: 0,
            hidden: false,
            has_children: false,
            expanded: true,
            rect: offscreen_rect(),
            button_rect: offscreen_rect(),
            highlight: None,
        }
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_children(mut self, has_children: bool) -> Self {
        self.has_children = has_children;
        self
    }

    pub fn label(&self, col: usize) -> &str {
        self.labels.get(col).map(String::as_str).unwrap_or("")
    }

    /// Width column `col` needs to show this row in full. The first column
    /// also carries the indentation and the expand button.
    pub fn calc_item_width(
        &self,
        measure: &dyn TextMeasure,
        line_height: f32,
        indent: f32,
        col: usize,
    ) -> f32 {
        let mut width = X_SPACER + measure.text_width(self.label(col)) + X_SPACER;
        if col == 0 {
            width += self.depth as f32 * indent;
            if self.has_children {
                width += line_height;
            }
        }
        width
    }

    pub fn clear_highlight(&mut self) {
        self.highlight = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_row_is_offscreen() {
        let row = RowEntry::new(RowId(1), vec!["a".into()]);
        assert_eq!(row.rect, offscreen_rect());
        assert_eq!(row.rect.width(), 0.0);
        assert!(row.highlight.is_none());
    }

    #[test]
    fn test_calc_item_width() {
        let measure = FixedWidthMeasure::default();
        let row = RowEntry::new(RowId(1), vec!["abcd".into(), "xy".into()])
            .with_depth(2)
            .with_children(true);
        // 5 + 28 + 5 + 2*16 + 18
        assert_eq!(row.calc_item_width(&measure, 18.0, 16.0, 0), 88.0);
        assert_eq!(row.calc_item_width(&measure, 18.0, 16.0, 1), 24.0);
        assert_eq!(row.calc_item_width(&measure, 18.0, 16.0, 7), 10.0);
    }

    #[test]
    fn test_label_out_of_range() {
        let row = RowEntry::new(RowId(1), vec!["only".into()]);
        assert_eq!(row.label(0), "only");
        assert_eq!(row.label(3), "");
    }
}
