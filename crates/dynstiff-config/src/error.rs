//! Error types for profile operations.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// File operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    /// Reading a profile.
    Read,
    /// Writing a profile.
    Write,
    /// Creating the profile directory.
    CreateDir,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileAction::Read => "read file",
            FileAction::Write => "write file",
            FileAction::CreateDir => "create directory",
        })
    }
}

/// Errors from loading, saving and resolving profiles.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file or directory operation failed.
    #[error("failed to {action} '{path}': {source}")]
    Io {
        /// What was being done.
        action: FileAction,
        /// Path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Profile TOML did not parse.
    #[error("failed to parse profile TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Profile could not be serialized.
    #[error("failed to serialize profile TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// No factory profile, user profile or file of that name.
    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    /// A profile setting is out of range.
    #[error("validation failed: {0}")]
    Validation(#[from] crate::validation::ValidationError),
}

impl ConfigError {
    /// `map_err` adapter tagging an I/O error with `action` and `path`.
    ///
    /// ```rust,ignore
    /// std::fs::read_to_string(path).map_err(ConfigError::io(FileAction::Read, path))?;
    /// ```
    pub fn io(action: FileAction, path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| ConfigError::Io {
            action,
            path,
            source,
        }
    }
}
