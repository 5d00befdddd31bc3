//! The configuration store seen by the find bar.
//!
//! The find bar only needs its history lists and two preferences, so it talks
//! to this trait instead of owning `Settings`. `Settings` implements it for
//! in-memory use; `FileConfigStore` writes every change through to disk.

use crate::config::{load_config_from, save_config_silent, Settings};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Source and sink of the find bar's persisted state.
pub trait ConfigStore {
    /// Find history, most recent first.
    fn find_history(&self) -> Vec<String>;
    /// Replace history, most recent first.
    fn replace_history(&self) -> Vec<String>;
    fn add_find_item(&mut self, item: &str);
    fn add_replace_item(&mut self, item: &str);
    fn show_replace_bar(&self) -> bool;
    fn set_show_replace_bar(&mut self, show: bool);
    /// Whether word-highlight indicators are wiped at the start of a search.
    fn clear_highlights_on_find(&self) -> bool;
}

impl ConfigStore for Settings {
    fn find_history(&self) -> Vec<String> {
        self.find_history.clone()
    }

    fn replace_history(&self) -> Vec<String> {
        self.replace_history.clone()
    }

    fn add_find_item(&mut self, item: &str) {
        self.add_find_history(item);
    }

    fn add_replace_item(&mut self, item: &str) {
        self.add_replace_history(item);
    }

    fn show_replace_bar(&self) -> bool {
        self.show_replace_bar
    }

    fn set_show_replace_bar(&mut self, show: bool) {
        self.show_replace_bar = show;
    }

    fn clear_highlights_on_find(&self) -> bool {
        self.clear_highlights_on_find
    }
}

/// `Settings` backed by a JSON file, saved after every mutation.
#[derive(Debug)]
pub struct FileConfigStore {
    settings: Settings,
    path: PathBuf,
}

impl FileConfigStore {
    /// Open the store at `path`, loading whatever is there.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = load_config_from(&path)?;
        Ok(Self { settings, path })
    }

    /// Wrap already-loaded settings.
    pub fn with_settings(settings: Settings, path: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            path: path.into(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) {
        save_config_silent(&self.settings, &self.path);
    }
}

impl ConfigStore for FileConfigStore {
    fn find_history(&self) -> Vec<String> {
        self.settings.find_history()
    }

    fn replace_history(&self) -> Vec<String> {
        self.settings.replace_history()
    }

    fn add_find_item(&mut self, item: &str) {
        self.settings.add_find_item(item);
        self.persist();
    }

    fn add_replace_item(&mut self, item: &str) {
        self.settings.add_replace_item(item);
        self.persist();
    }

    fn show_replace_bar(&self) -> bool {
        self.settings.show_replace_bar
    }

    fn set_show_replace_bar(&mut self, show: bool) {
        self.settings.set_show_replace_bar(show);
        self.persist();
    }

    fn clear_highlights_on_find(&self) -> bool {
        self.settings.clear_highlights_on_find
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_store_records_history() {
        let mut store = Settings::default();
        store.add_find_item("foo");
        store.add_find_item("bar");
        store.add_find_item("foo");
        assert_eq!(store.find_history(), vec!["foo", "bar"]);
    }

    #[test]
    fn test_file_store_writes_through() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut store = FileConfigStore::open(&path).unwrap();
        store.add_find_item("needle");
        store.set_show_replace_bar(true);

        let reopened = FileConfigStore::open(&path).unwrap();
        assert_eq!(reopened.find_history(), vec!["needle"]);
        assert!(reopened.show_replace_bar());
    }

    #[test]
    fn test_file_store_missing_file_defaults() {
        let dir = TempDir::new().unwrap();
        let store = FileConfigStore::open(dir.path().join("nope.json")).unwrap();
        assert!(store.find_history().is_empty());
        assert!(store.clear_highlights_on_find());
    }
}
