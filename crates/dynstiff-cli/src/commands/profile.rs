//! Profile management commands.
//!
//! Provides commands to list, show, validate and save analysis profiles.

use clap::{Args, Subcommand};
use dynstiff_analysis::Axis;
use dynstiff_config::{
    Profile, ValidationError, ensure_user_profiles_dir, factory_profiles, list_user_profiles,
    profile_name_from_path, resolve_profile, user_profiles_dir, validate_profile,
};
use std::path::PathBuf;

#[derive(Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    command: ProfileCommand,
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// List available profiles (factory and user)
    List {
        /// Show only factory profiles
        #[arg(long)]
        factory: bool,

        /// Show only user profiles
        #[arg(long)]
        user: bool,
    },

    /// Show a profile as TOML
    Show {
        /// Profile name or path
        name: String,
    },

    /// Check every setting of a profile
    Validate {
        /// Profile name or path
        name: String,
    },

    /// Save a new profile, optionally based on an existing one
    Save {
        /// Name for the new profile
        name: String,

        /// Profile to start from
        #[arg(long)]
        from: Option<String>,

        /// Description of the profile
        #[arg(short, long)]
        description: Option<String>,

        /// Hammer mass in kg
        #[arg(long)]
        mass: Option<f64>,

        /// Acceleration axis (x, y or z)
        #[arg(long)]
        axis: Option<Axis>,

        /// Expected modal frequencies in Hz (e.g., "50,150")
        #[arg(long, value_delimiter = ',')]
        modes: Option<Vec<f64>>,

        /// Write to this path instead of the user profiles directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite if the file already exists
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: ProfileArgs) -> anyhow::Result<()> {
    match args.command {
        ProfileCommand::List { factory, user } => list_profiles(factory, user),
        ProfileCommand::Show { name } => show_profile(&name),
        ProfileCommand::Validate { name } => check_profile(&name),
        ProfileCommand::Save {
            name,
            from,
            description,
            mass,
            axis,
            modes,
            output,
            force,
        } => {
            let mut profile = match from {
                Some(base) => resolve_profile(&base)?,
                None => Profile::new(&name),
            };
            profile.name = name;
            if let Some(description) = description {
                profile.description = Some(description);
            }
            if let Some(mass) = mass {
                profile.hammer_mass_kg = mass;
            }
            if let Some(axis) = axis {
                profile.axis = axis;
            }
            if let Some(modes) = modes {
                profile.expected_modes_hz = modes;
            }
            save_profile(&profile, output, force)
        }
    }
}

fn list_profiles(factory_only: bool, user_only: bool) -> anyhow::Result<()> {
    let show_factory = !user_only;
    let show_user = !factory_only;

    if show_factory {
        println!("Factory Profiles:");
        println!("=================");
        for profile in factory_profiles() {
            let desc = profile.description.as_deref().unwrap_or("");
            println!("  {:20} - {}", profile.name, desc);
        }
        println!();
    }

    if show_user {
        println!("User Profiles:");
        println!("==============");
        let user_profiles = list_user_profiles();
        if user_profiles.is_empty() {
            println!("  (none)");
            println!();
            println!("  Create a profile with: dynstiff profile save <name> --mass <kg>\n");
        } else {
            for path in user_profiles {
                let name = profile_name_from_path(&path).unwrap_or_else(|| "unknown".to_string());
                match Profile::load(&path) {
                    Ok(profile) => {
                        let desc = profile.description.as_deref().unwrap_or("");
                        println!("  {:20} - {}", name, desc);
                    }
                    Err(_) => println!("  {:20} - (error loading)", name),
                }
            }
        }
        println!();
    }

    Ok(())
}

fn show_profile(name: &str) -> anyhow::Result<()> {
    let profile = resolve_profile(name)?;

    println!("Profile: {}", profile.name);
    println!("{}", "=".repeat(9 + profile.name.len()));
    println!();
    if let Some(desc) = &profile.description {
        println!("Description: {}", desc);
        println!();
    }
    print!("{}", profile.to_toml()?);
    Ok(())
}

fn check_profile(name: &str) -> anyhow::Result<()> {
    let profile = resolve_profile(name)?;

    match validate_profile(&profile) {
        Ok(()) => {
            println!("Profile '{}' is valid.", profile.name);
            Ok(())
        }
        Err(err) => {
            let errors = match err {
                ValidationError::Multiple(errors) => errors,
                single => vec![single],
            };
            println!("Profile '{}' has {} problem(s):", profile.name, errors.len());
            for e in &errors {
                println!("  - {}", e);
            }
            anyhow::bail!("validation failed")
        }
    }
}

fn save_profile(profile: &Profile, output: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    validate_profile(profile)?;

    let path = match output {
        Some(path) => path,
        None => {
            ensure_user_profiles_dir()?;
            user_profiles_dir().join(format!("{}.toml", profile.name))
        }
    };

    if path.exists() && !force {
        anyhow::bail!(
            "Profile file '{}' already exists. Use --force to overwrite.",
            path.display()
        );
    }

    profile.save(&path)?;
    println!("Saved profile '{}' to {}", profile.name, path.display());
    Ok(())
}
