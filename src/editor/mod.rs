//! Editor module for quickfind
//!
//! The text surface contract, the in-memory buffer implementing it, and the
//! quick find/replace bar controller that drives it.

mod buffer;
mod find_bar;
mod flags;
mod surface;

pub use buffer::TextBuffer;
pub use find_bar::{
    centered_first_line, BarVisibility, FindBar, FocusTarget, InputField, SearchOptions,
    SearchOutcome, ToggleState, FOCUS_RETRY_COUNT, WRAPPED_STATUS,
};
pub use flags::{
    compile_pattern, convert_backrefs, wildcard_to_regex, RegexMode, SearchDirection, SearchFlags,
};
pub use surface::{
    FindTarget, HighlightableEditor, Indicator, Selection, SharedSurface, SurfaceId, TextSurface,
    UndoTransaction,
};
