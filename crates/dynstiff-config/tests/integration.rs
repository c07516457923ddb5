//! Integration tests for dynstiff-config.
//!
//! These tests verify end-to-end functionality across modules.

use dynstiff_analysis::{Axis, StiffnessAnalyzer};
use dynstiff_config::{
    ConfigError, FileAction, Profile, ValidationError, factory_profiles, get_factory_profile, resolve_profile,
    validate_profile,
};
use tempfile::TempDir;

/// Profiles survive a save/load cycle through the filesystem.
#[test]
fn test_profile_file_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("bench.toml");

    let mut profile = Profile::new("Bench")
        .with_description("Integration test profile")
        .with_hammer_mass(2.0)
        .with_axis(Axis::Y)
        .with_expected_modes([50.0, 150.0]);
    profile.analysis.damping.max_modal_zeta = 0.3;

    profile.save(&path).expect("should save profile");
    assert!(path.exists());

    let loaded = Profile::load(&path).expect("should load profile");
    assert_eq!(loaded, profile);
}

/// A path to a profile file resolves like a profile name.
#[test]
fn test_resolve_profile_by_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("custom.toml");
    std::fs::write(&path, "name = \"Custom\"\nhammer_mass_kg = 3.0\n").unwrap();

    let profile = resolve_profile(path.to_str().unwrap()).unwrap();
    assert_eq!(profile.name, "Custom");
    assert_eq!(profile.hammer_mass_kg, 3.0);

    assert!(matches!(
        resolve_profile("no_such_profile_98765"),
        Err(ConfigError::ProfileNotFound(_))
    ));
}

/// Factory profiles resolve by id and configure a working analyzer.
#[test]
fn test_factory_profiles_drive_analyzer() {
    assert_eq!(factory_profiles().len(), 3);

    let profile = resolve_profile("machine-tool").unwrap();
    let analyzer = StiffnessAnalyzer::new(profile.analysis.clone());
    assert_eq!(analyzer.config().frf.h1_coherence, 0.85);
    assert_eq!(analyzer.config(), &get_factory_profile("machine-tool").unwrap().analysis);
}

/// Loading a file does not validate; validation is an explicit step.
#[test]
fn test_invalid_profile_loads_but_fails_validation() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.toml");
    std::fs::write(
        &path,
        "name = \"Bad\"\nhammer_mass_kg = 0.01\n\n[analysis.frf]\nh1_coherence = 1.5\n",
    )
    .unwrap();

    let profile = Profile::load(&path).unwrap();
    match validate_profile(&profile) {
        Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
        other => panic!("expected two validation errors, got {other:?}"),
    }
}

/// Missing files report the path that failed.
#[test]
fn test_missing_file_error() {
    let err = Profile::load("/nonexistent/dir/profile.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io { action: FileAction::Read, .. }));
    assert!(err.to_string().contains("profile.toml"));
}
