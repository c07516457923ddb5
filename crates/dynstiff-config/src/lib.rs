//! Analysis profiles and configuration management for dynstiff.
//!
//! A profile bundles the parameters of one test setup (hammer mass,
//! measurement axis, expected modes) with the engine configuration
//! ([`dynstiff_analysis::AnalysisConfig`]), stored as TOML.
//!
//! # Features
//!
//! - **Profiles**: Load and save analysis profiles from TOML files
//! - **Validation**: Range checks for every numeric setting
//! - **Paths**: Platform-specific profile directory
//! - **Factory Profiles**: Built-in profiles for common structures
//!
//! # Example
//!
//! ```rust,no_run
//! use dynstiff_config::{Profile, user_profiles_dir, validate_profile};
//! use dynstiff_analysis::Axis;
//!
//! let profile = Profile::new("Spindle")
//!     .with_description("Spindle nose, radial")
//!     .with_hammer_mass(5.5)
//!     .with_axis(Axis::Z)
//!     .with_expected_modes([48.0, 152.0]);
//!
//! validate_profile(&profile).unwrap();
//! profile.save(user_profiles_dir().join("spindle.toml")).unwrap();
//! ```

mod error;
mod profile;

/// Platform-specific paths for profiles.
pub mod paths;

/// Profile validation.
pub mod validation;

/// Factory profiles bundled with the library.
pub mod factory_profiles;

pub use error::{ConfigError, FileAction};
pub use factory_profiles::{
    FACTORY_PROFILE_NAMES, factory_profile_names, factory_profiles, get_factory_profile,
    is_factory_profile,
};
pub use paths::{
    ensure_user_profiles_dir, find_profile, list_user_profiles, profile_name_from_path,
    user_config_dir, user_profiles_dir,
};
pub use profile::Profile;
pub use validation::{ValidationError, ValidationResult, validate_analysis, validate_profile};

/// Resolve a profile by factory name, user profile name or file path.
///
/// Factory profiles take precedence over user files of the same name.
pub fn resolve_profile(name: &str) -> Result<Profile, ConfigError> {
    if let Some(profile) = get_factory_profile(name) {
        return Ok(profile);
    }
    match find_profile(name) {
        Some(path) => Profile::load(path),
        None => Err(ConfigError::ProfileNotFound(name.to_string())),
    }
}
