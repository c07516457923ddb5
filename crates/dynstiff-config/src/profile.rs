//! Analysis profile file format and operations.

use dynstiff_analysis::{AnalysisConfig, Axis};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, FileAction};

/// A named analysis setup: test parameters plus engine configuration.
///
/// Profiles are stored as TOML files. Every field except `name` has a
/// default, and the `[analysis]` tables only override the keys they name.
///
/// # TOML Format
///
/// ```toml
/// name = "Spindle housing"
/// description = "Heavy hammer, two expected modes"
/// hammer_mass_kg = 5.5
/// axis = "z"
/// expected_modes_hz = [48.0, 152.0]
///
/// [analysis.frf]
/// h1_coherence = 0.85
///
/// [analysis.damping]
/// max_modal_zeta = 0.3
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Name of the profile.
    pub name: String,

    /// Optional description of the profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Impact hammer mass (kg).
    #[serde(default = "default_hammer_mass")]
    pub hammer_mass_kg: f64,

    /// Acceleration axis to analyse.
    #[serde(default)]
    pub axis: Axis,

    /// Expected modal frequencies (Hz); empty for a free peak search.
    #[serde(default)]
    pub expected_modes_hz: Vec<f64>,

    /// Engine configuration.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

fn default_hammer_mass() -> f64 {
    1.0
}

impl Profile {
    /// Create a profile with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            hammer_mass_kg: default_hammer_mass(),
            axis: Axis::default(),
            expected_modes_hz: Vec::new(),
            analysis: AnalysisConfig::default(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the hammer mass (kg).
    pub fn with_hammer_mass(mut self, mass_kg: f64) -> Self {
        self.hammer_mass_kg = mass_kg;
        self
    }

    /// Set the acceleration axis.
    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    /// Set the expected modal frequencies (Hz).
    pub fn with_expected_modes(mut self, modes: impl IntoIterator<Item = f64>) -> Self {
        self.expected_modes_hz = modes.into_iter().collect();
        self
    }

    /// Replace the engine configuration.
    pub fn with_analysis(mut self, analysis: AnalysisConfig) -> Self {
        self.analysis = analysis;
        self
    }

    /// Load a profile from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(ConfigError::io(FileAction::Read, path))?;
        let profile: Profile = toml::from_str(&content)?;
        Ok(profile)
    }

    /// Load a profile from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the profile to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(ConfigError::io(FileAction::CreateDir, parent))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(ConfigError::io(FileAction::Write, path))?;
        Ok(())
    }

    /// Convert the profile to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
