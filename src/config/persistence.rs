//! Configuration file persistence for quickfind
//!
//! Loads and saves `Settings` as JSON in the platform config directory,
//! falling back to defaults when the file is missing or unreadable.

use crate::config::Settings;
use crate::error::{Error, Result, ResultExt};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the config directory
const APP_NAME: &str = "quickfind";

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Extension of the temporary file written before the atomic rename
const BACKUP_EXTENSION: &str = "json.bak";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Directory Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Get the platform-specific configuration directory for the application.
///
/// - **Windows**: `%APPDATA%\quickfind\`
/// - **macOS**: `~/Library/Application Support/quickfind/`
/// - **Linux**: `~/.config/quickfind/`
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` if the base directory cannot be determined.
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the configuration file.
pub fn get_config_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

// ─────────────────────────────────────────────────────────────────────────────
// Load Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Load configuration from the default location, or defaults on any failure.
pub fn load_config() -> Settings {
    get_config_file_path()
        .and_then(|path| load_config_from(&path))
        .unwrap_or_warn_default(Settings::default(), "Failed to load configuration")
}

/// Load configuration from an explicit path.
///
/// A missing or blank file yields defaults. A file with invalid JSON is an
/// error so the caller can decide whether to keep the defaults.
pub fn load_config_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        debug!("Config file not found at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    debug!("Loading config from: {}", path.display());

    let contents = fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    if contents.trim().is_empty() {
        debug!("Config file is empty, using defaults");
        return Ok(Settings::default());
    }

    let settings = Settings::from_json_sanitized(&contents).map_err(|e| {
        warn!(
            "Config file at {} contains invalid JSON: {}",
            path.display(),
            e
        );
        Error::ConfigParse {
            message: format!("Failed to parse config file: {}", e),
            source: Some(Box::new(e)),
        }
    })?;

    info!("Configuration loaded from {}", path.display());
    Ok(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Save Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Save configuration to the default location.
pub fn save_config(settings: &Settings) -> Result<()> {
    save_config_to(settings, &get_config_file_path()?)
}

/// Save configuration to an explicit path.
///
/// Writes a sibling `.json.bak` file first and renames it over the target,
/// creating the parent directory when needed.
pub fn save_config_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            debug!("Creating config directory: {}", dir.display());
            fs::create_dir_all(dir).map_err(|e| Error::ConfigSave {
                path: dir.to_path_buf(),
                source: Box::new(e),
            })?;
        }
    }

    let json = serde_json::to_string_pretty(settings).map_err(|e| Error::ConfigSave {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    let backup_path = path.with_extension(BACKUP_EXTENSION);
    fs::write(&backup_path, &json).map_err(|e| Error::ConfigSave {
        path: backup_path.clone(),
        source: Box::new(e),
    })?;

    fs::rename(&backup_path, path).map_err(|e| Error::ConfigSave {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    debug!("Configuration saved to {}", path.display());
    Ok(())
}

/// Best-effort save. Returns `true` when the file was written.
pub fn save_config_silent(settings: &Settings, path: &Path) -> bool {
    match save_config_to(settings, path) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to save configuration: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_path(dir: &TempDir) -> PathBuf {
        dir.path().join(APP_NAME).join(CONFIG_FILE_NAME)
    }

    #[test]
    fn test_get_config_file_path_names_app_and_file() {
        if let Ok(path) = get_config_file_path() {
            let text = path.to_string_lossy();
            assert!(text.contains(APP_NAME));
            assert!(text.ends_with(CONFIG_FILE_NAME));
        }
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load_config_from(&config_path(&dir)).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_blank_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "  \n").unwrap();
        assert_eq!(load_config_from(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_load_corrupt_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_save_creates_directory_and_roundtrips() {
        let dir = TempDir::new().unwrap();
        let path = config_path(&dir);

        let mut settings = Settings::default();
        settings.add_find_history("fn main");
        settings.add_replace_history("fn start");
        settings.show_replace_bar = true;

        save_config_to(&settings, &path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension(BACKUP_EXTENSION).exists());

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_sanitizes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{"list_scroll_tick": 0}"#).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.list_scroll_tick, Settings::MIN_SCROLL_TICK);
    }

    #[test]
    fn test_save_silent_reports_success() {
        let dir = TempDir::new().unwrap();
        assert!(save_config_silent(&Settings::default(), &config_path(&dir)));
    }
}
