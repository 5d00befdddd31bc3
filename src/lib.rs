//! quickfind: a quick find/replace bar and a type-ahead list control for
//! egui text editors.
//!
//! [`editor::FindBar`] and [`list::ControlWithItems`] hold all state and
//! behaviour and are toolkit-free apart from egui's geometry types; the
//! [`ui`] module renders them.

pub mod config;
pub mod deferred;
pub mod editor;
pub mod error;
pub mod list;
pub mod notify;
pub mod string_utils;
pub mod ui;
pub mod workspace;
