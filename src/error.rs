//! Centralized error handling for quickfind
//!
//! Search operations never fail loudly: a miss is an outcome, not an error.
//! This type covers the places that can genuinely go wrong, which are the
//! configuration file on disk and user-supplied regular expressions.

use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // I/O
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic I/O error wrapper
    Io(io::Error),

    /// Failed to read a file into the text buffer
    FileRead { path: PathBuf, source: io::Error },

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Settings file exists but could not be read
    ConfigLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Settings (or their backup copy) could not be written
    ConfigSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Settings file is not valid JSON for `Settings`
    ConfigParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The platform has no config directory
    ConfigDirNotFound,

    // ─────────────────────────────────────────────────────────────────────────
    // Search Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The find field holds a pattern the regex engine rejects
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::FileRead { path, source } => {
                write!(f, "Failed to read '{}': {}", path.display(), source)
            }
            Error::ConfigLoad { path, source } => {
                write!(f, "Cannot read settings from '{}': {}", path.display(), source)
            }
            Error::ConfigSave { path, source } => {
                write!(f, "Cannot write settings to '{}': {}", path.display(), source)
            }
            Error::ConfigParse { message, .. } => write!(f, "Malformed settings file: {}", message),
            Error::ConfigDirNotFound => write!(f, "No configuration directory on this platform"),
            Error::InvalidPattern { pattern, source } => {
                write!(f, "Invalid search pattern '{}': {}", pattern, source)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::FileRead { source, .. } => Some(source),
            Error::ConfigLoad { source, .. } => Some(source.as_ref()),
            Error::ConfigSave { source, .. } => Some(source.as_ref()),
            Error::ConfigParse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::InvalidPattern { source, .. } => Some(source),
            Error::ConfigDirNotFound => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fallbacks
// ─────────────────────────────────────────────────────────────────────────────

/// Log-and-continue helpers for non-fatal failures.
pub trait ResultExt<T> {
    /// On error, log a warning prefixed with `context` and return `default`.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    fn bad_pattern() -> Error {
        let source = regex::Regex::new("[unclosed").unwrap_err();
        Error::InvalidPattern {
            pattern: "[unclosed".to_string(),
            source,
        }
    }

    #[test]
    fn test_io_conversion() {
        let err = Error::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_serde_json_conversion() {
        let parsed: std::result::Result<u32, _> = serde_json::from_str("{nope");
        let err = Error::from(parsed.unwrap_err());
        assert!(matches!(err, Error::ConfigParse { .. }));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_invalid_pattern_display_names_pattern() {
        let msg = bad_pattern().to_string();
        assert!(msg.starts_with("Invalid search pattern '[unclosed'"));
    }

    #[test]
    fn test_invalid_pattern_has_source() {
        assert!(bad_pattern().source().is_some());
    }

    #[test]
    fn test_file_read_display() {
        let err = Error::FileRead {
            path: PathBuf::from("/tmp/missing.rs"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.rs"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_config_dir_not_found_has_no_source() {
        let err = Error::ConfigDirNotFound;
        assert_eq!(err.to_string(), "No configuration directory on this platform");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_unwrap_or_warn_default() {
        let ok: Result<u8> = Ok(7);
        assert_eq!(ok.unwrap_or_warn_default(0, "ctx"), 7);

        let err: Result<u8> = Err(Error::ConfigDirNotFound);
        assert_eq!(err.unwrap_or_warn_default(3, "ctx"), 3);
    }
}
