//! Platform-specific paths for analysis profiles.
//!
//! # Directory Structure
//!
//! - **User profiles**: `~/.config/dynstiff/profiles/` (Linux), `~/Library/Application Support/dynstiff/profiles/` (macOS), `%APPDATA%\dynstiff\profiles\` (Windows)
//! - **User config**: the parent `dynstiff` directory
//!
//! # Example
//!
//! ```rust,no_run
//! use dynstiff_config::paths;
//!
//! if let Some(path) = paths::find_profile("spindle") {
//!     println!("Found profile at: {:?}", path);
//! }
//! ```

use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "dynstiff";

/// Subdirectory name for profiles.
const PROFILES_SUBDIR: &str = "profiles";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the user-specific profiles directory.
pub fn user_profiles_dir() -> PathBuf {
    user_config_dir().join(PROFILES_SUBDIR)
}

/// Find a profile file by name.
///
/// The name can be a path to a TOML file, or a profile name (with or
/// without `.toml`) looked up in the user profiles directory.
pub fn find_profile(name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{}.toml", name)
    };

    let user_path = user_profiles_dir().join(filename);
    user_path.is_file().then_some(user_path)
}

/// Ensure the user profiles directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_profiles_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_profiles_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(crate::ConfigError::io(crate::FileAction::CreateDir, &dir))?;
    }

    Ok(dir)
}

/// List all profile files in the user profiles directory.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn list_user_profiles() -> Vec<PathBuf> {
    list_profiles_in_dir(&user_profiles_dir())
}

/// List the TOML files in `dir`, sorted by path.
pub fn list_profiles_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut profiles: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    profiles.sort();
    profiles
}

/// Get the profile name from a file path (the file stem).
///
/// ```rust
/// use dynstiff_config::paths::profile_name_from_path;
/// use std::path::Path;
///
/// let name = profile_name_from_path(Path::new("/path/to/spindle.toml"));
/// assert_eq!(name, Some("spindle".to_string()));
/// ```
pub fn profile_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}
