//! Profile demo: factory profiles, validation and TOML output.
//!
//! Run with: cargo run -p dynstiff-config --example profile_demo

use dynstiff_analysis::Axis;
use dynstiff_config::{Profile, factory_profile_names, get_factory_profile, validate_profile};

fn main() {
    println!("=== Factory Profiles ===\n");

    for id in factory_profile_names() {
        let Some(profile) = get_factory_profile(id) else {
            continue;
        };
        println!(
            "{:<16} {:<16} mass {:>5.2} kg  axis {}",
            id, profile.name, profile.hammer_mass_kg, profile.axis
        );
        if let Some(desc) = &profile.description {
            println!("{:<16} {}", "", desc);
        }
    }

    println!("\n=== Custom Profile ===\n");

    let profile = Profile::new("Spindle")
        .with_description("Spindle nose, radial")
        .with_hammer_mass(5.5)
        .with_axis(Axis::Z)
        .with_expected_modes([48.0, 152.0]);

    match validate_profile(&profile) {
        Ok(()) => println!("Validation: ok"),
        Err(err) => println!("Validation: {err}"),
    }

    match profile.to_toml() {
        Ok(toml) => println!("\n{toml}"),
        Err(err) => eprintln!("{err}"),
    }

    println!("=== Invalid Profile ===\n");
    let heavy = Profile::new("Too heavy").with_hammer_mass(120.0);
    if let Err(err) = validate_profile(&heavy) {
        println!("{err}");
    }
}
