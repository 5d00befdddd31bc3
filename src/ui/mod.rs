//! UI components for quickfind
//!
//! egui renderings of the find bar controller, the list control and the
//! demo's text buffer.

mod editor_view;
mod find_bar_panel;
mod item_list;

pub use editor_view::{EditorView, EditorViewOutput};
pub use find_bar_panel::{get_match_highlight_colors, FindBarPanel, FindBarPanelOutput};
pub use item_list::{EguiMeasure, ItemListOutput, ItemListPanel, INDENT_PER_LEVEL};
