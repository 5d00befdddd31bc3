//! Column header of the list control.

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderColumn {
    pub label: String,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeaderBar {
    columns: Vec<HeaderColumn>,
    hidden: bool,
    row_height: f32,
}

impl HeaderBar {
    pub fn new(row_height: f32) -> Self {
        Self {
            columns: Vec::new(),
            hidden: false,
            row_height,
        }
    }

    pub fn add_column(&mut self, label: impl Into<String>, width: f32) {
        self.columns.push(HeaderColumn {
            label: label.into(),
            width,
        });
    }

    pub fn columns(&self) -> &[HeaderColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn set_row_height(&mut self, row_height: f32) {
        self.row_height = row_height;
    }

    /// Sum of the column widths.
    pub fn width(&self) -> f32 {
        self.columns.iter().map(|c| c.width).sum()
    }

    /// Height the header takes from the client area; zero when hidden.
    pub fn height(&self) -> f32 {
        if self.hidden || self.columns.is_empty() {
            0.0
        } else {
            self.row_height
        }
    }

    /// X offset of column `col`.
    pub fn column_x(&self, col: usize) -> f32 {
        self.columns.iter().take(col).map(|c| c.width).sum()
    }

    /// Grow column `col` to `width`, or set it outright when `force` is set.
    /// Returns whether the width changed.
    pub fn update_col_width_if_needed(&mut self, col: usize, width: f32, force: bool) -> bool {
        let Some(column) = self.columns.get_mut(col) else {
            return false;
        };
        if force || width > column.width {
            let changed = column.width != width;
            column.width = width;
            changed
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> HeaderBar {
        let mut h = HeaderBar::new(20.0);
        h.add_column("Name", 100.0);
        h.add_column("Kind", 50.0);
        h
    }

    #[test]
    fn test_width_and_offsets() {
        let h = header();
        assert_eq!(h.width(), 150.0);
        assert_eq!(h.column_x(0), 0.0);
        assert_eq!(h.column_x(1), 100.0);
        assert_eq!(h.height(), 20.0);
    }

    #[test]
    fn test_hidden_header_has_no_height() {
        let mut h = header();
        h.set_hidden(true);
        assert_eq!(h.height(), 0.0);
        assert_eq!(HeaderBar::new(20.0).height(), 0.0);
    }

    #[test]
    fn test_update_only_grows_unless_forced() {
        let mut h = header();
        assert!(!h.update_col_width_if_needed(0, 80.0, false));
        assert_eq!(h.columns()[0].width, 100.0);
        assert!(h.update_col_width_if_needed(0, 120.0, false));
        assert_eq!(h.columns()[0].width, 120.0);
        assert!(h.update_col_width_if_needed(0, 40.0, true));
        assert_eq!(h.columns()[0].width, 40.0);
        assert!(!h.update_col_width_if_needed(5, 40.0, true));
    }
}
