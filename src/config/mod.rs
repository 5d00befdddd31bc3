//! Configuration module for quickfind
//!
//! User preferences, their JSON persistence, and the `ConfigStore` seam the
//! find bar reads its history through.

mod persistence;
mod settings;
mod store;

pub use persistence::*;
pub use settings::*;
pub use store::{ConfigStore, FileConfigStore};
