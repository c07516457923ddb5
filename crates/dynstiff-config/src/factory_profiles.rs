//! Factory profiles bundled with the library.
//!
//! These are always available without external files and serve as starting
//! points for user profiles.

use crate::Profile;

/// Array of factory profile names for external access.
pub static FACTORY_PROFILE_NAMES: &[&str] = &["default", "light-structure", "machine-tool"];

/// TOML content for factory profiles, embedded at compile time.
static FACTORY_PROFILES_TOML: &[(&str, &str)] = &[
    ("default", DEFAULT_PROFILE),
    ("light-structure", LIGHT_STRUCTURE_PROFILE),
    ("machine-tool", MACHINE_TOOL_PROFILE),
];

/// Engine defaults with a 1 kg hammer.
const DEFAULT_PROFILE: &str = r#"
name = "Default"
description = "Engine defaults, 1 kg hammer, free peak search"
hammer_mass_kg = 1.0
axis = "x"
"#;

/// Small hammer on light, lively structures.
const LIGHT_STRUCTURE_PROFILE: &str = r#"
name = "Light Structure"
description = "Small hammer on panels and brackets: short impacts, low damping"
hammer_mass_kg = 0.2
axis = "x"

[analysis.force]
max_window = 0.01

[analysis.damping]
max_modal_zeta = 0.2

[analysis.segmentation]
min_segment_duration = 0.02
"#;

/// Heavy hammer on stiff, well-damped machine structures.
const MACHINE_TOOL_PROFILE: &str = r#"
name = "Machine Tool"
description = "Heavy hammer on spindles and beds: long impacts, stricter coherence"
hammer_mass_kg = 5.5
axis = "z"

[analysis.force]
min_window = 0.001

[analysis.frf]
h1_coherence = 0.85
blend_coherence = 0.6

[analysis.antiresonance]
floor_db = -45.0

[analysis.damping]
search_window_hz = 8.0
"#;

/// Get all factory profiles.
///
/// Profiles that fail to parse are skipped.
pub fn factory_profiles() -> Vec<Profile> {
    FACTORY_PROFILES_TOML
        .iter()
        .filter_map(|(_, toml)| Profile::from_toml(toml).ok())
        .collect()
}

/// Get a factory profile by id or display name (case insensitive).
pub fn get_factory_profile(name: &str) -> Option<Profile> {
    let wanted = name.to_lowercase();
    FACTORY_PROFILES_TOML
        .iter()
        .filter_map(|(id, toml)| Some((*id, Profile::from_toml(toml).ok()?)))
        .find(|(id, profile)| *id == wanted || profile.name.to_lowercase() == wanted)
        .map(|(_, profile)| profile)
}

/// Get the ids of all factory profiles.
pub fn factory_profile_names() -> &'static [&'static str] {
    FACTORY_PROFILE_NAMES
}

/// Check whether `name` identifies a factory profile.
pub fn is_factory_profile(name: &str) -> bool {
    get_factory_profile(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_profile;
    use dynstiff_analysis::Axis;

    #[test]
    fn test_all_factory_profiles_parse_and_validate() {
        for (name, toml) in FACTORY_PROFILES_TOML {
            let profile = Profile::from_toml(toml)
                .unwrap_or_else(|e| panic!("factory profile '{name}' should parse: {e}"));
            assert!(profile.description.is_some(), "profile '{name}' needs a description");
            assert!(
                validate_profile(&profile).is_ok(),
                "factory profile '{name}' should validate"
            );
        }
        assert_eq!(factory_profiles().len(), FACTORY_PROFILE_NAMES.len());
    }

    #[test]
    fn test_get_factory_profile() {
        let tool = get_factory_profile("machine-tool").expect("machine-tool should exist");
        assert_eq!(tool.axis, Axis::Z);
        assert_eq!(tool.analysis.frf.h1_coherence, 0.85);
        // Unspecified tables keep their defaults
        assert_eq!(tool.analysis.display.min_frequency, 0.1);

        let light = get_factory_profile("Light Structure").expect("display name lookup");
        assert_eq!(light.hammer_mass_kg, 0.2);

        assert!(is_factory_profile("DEFAULT"));
        assert!(!is_factory_profile("nonexistent"));
    }
}
