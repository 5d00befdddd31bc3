//! Virtualized list/tree control with incremental inline search.

mod control;
mod header;
mod matcher;
mod row;
mod search_overlay;

pub use control::{
    ControlWithItems, HitArea, KeyModifiers, ListKey, ScrollBarState, ScrollDirection,
    DEFAULT_SCROLL_TICK, SEARCH_COLUMN,
};
pub use header::{HeaderBar, HeaderColumn};
pub use matcher::{MatchResult, SearchText, Spans, TreeSearchFlags};
pub use row::{offscreen_rect, FixedWidthMeasure, RowEntry, RowId, TextMeasure, X_SPACER, Y_SPACER};
pub use search_overlay::{OverlayState, SearchOverlay};
