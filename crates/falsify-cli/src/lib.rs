//! falsify-cli library crate.
//!
//! Argument definitions and command handlers for the `falsify-settings`
//! binary.  Handlers write to any [`Write`] sink and take the
//! [`SettingsContext`] as a parameter, so they can be tested without touching
//! stdout or the process-wide context.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::debug;

use falsify_core::{SettingOverrides, SettingValue, SettingsContext, SettingsProfiles};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Inspect falsify settings, profiles and storage locations.
#[derive(Debug, Parser)]
#[command(
    name = "falsify-settings",
    about = "Inspect falsify settings, profiles and storage locations",
    version
)]
pub struct Cli {
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every declared setting with its default and description.
    List,

    /// Build a snapshot and print its resolved values.
    Show {
        /// TOML file holding `[profiles.<name>]` tables.
        #[arg(long, env = "FALSIFY_PROFILE_FILE")]
        profile_file: Option<PathBuf>,

        /// Profile to start from; requires a profile file.
        #[arg(long)]
        profile: Option<String>,

        /// Extra `name=value` override, applied after the profile.  Repeatable.
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, SettingValue)>,
    },

    /// Print the storage home directory, creating it if needed.
    Home,
}

/// Parses `name=value`; the value is read as a [`SettingValue`] literal.
pub fn parse_assignment(raw: &str) -> Result<(String, SettingValue), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing setting name in {raw:?}"));
    }
    let value = value
        .parse::<SettingValue>()
        .unwrap_or_else(|never| match never {});
    Ok((name.to_string(), value))
}

// ── Command handlers ──────────────────────────────────────────────────────────

/// Runs `command` against `context`, writing human-readable output to `out`.
///
/// # Errors
///
/// Returns an error if a profile cannot be loaded, the overrides name an
/// undeclared setting, or `out` cannot be written.
pub fn run(command: &Command, context: &SettingsContext, out: &mut dyn Write) -> anyhow::Result<()> {
    match command {
        Command::List => list(context, out),
        Command::Show {
            profile_file,
            profile,
            set,
        } => show(context, profile_file.as_deref(), profile.as_deref(), set, out),
        Command::Home => {
            writeln!(out, "{}", context.paths().home_dir().display())?;
            Ok(())
        }
    }
}

fn list(context: &SettingsContext, out: &mut dyn Write) -> anyhow::Result<()> {
    let defaults = context.default_settings();
    for definition in context.registry().definitions() {
        let value = defaults.get(definition.name())?;
        writeln!(out, "{} (default: {value})", definition.name())?;
        for line in definition.description().lines() {
            writeln!(out, "    {}", line.trim())?;
        }
    }
    Ok(())
}

fn show(
    context: &SettingsContext,
    profile_file: Option<&std::path::Path>,
    profile: Option<&str>,
    set: &[(String, SettingValue)],
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut overrides = match (profile, profile_file) {
        (Some(name), Some(path)) => {
            let profiles = SettingsProfiles::load(path)
                .with_context(|| format!("loading profiles from {}", path.display()))?;
            profiles.profile(name)?
        }
        (Some(name), None) => bail!("profile {name:?} requested without --profile-file"),
        (None, _) => SettingOverrides::new(),
    };
    overrides.extend(set.iter().cloned());
    debug!(overrides = overrides.len(), "building snapshot");

    let settings = context
        .settings(overrides)
        .context("building settings snapshot")?;

    writeln!(out, "{settings}")?;
    for (name, value) in settings.values() {
        writeln!(out, "{name} = {value}")?;
    }
    match settings.database() {
        Some(database) => writeln!(out, "database -> {}", database.path().display())?,
        None => writeln!(out, "database -> None")?,
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use uuid::Uuid;

    fn isolated_context() -> (SettingsContext, PathBuf) {
        let home = std::env::temp_dir().join(format!("falsify_cli_{}", Uuid::new_v4()));
        let context = SettingsContext::builder()
            .home_dir(&home)
            .env(Arc::new(|_: &str| -> Option<String> { None }))
            .build();
        (context, home)
    }

    fn run_to_string(command: &Command, context: &SettingsContext) -> anyhow::Result<String> {
        let mut out = Vec::new();
        run(command, context, &mut out)?;
        Ok(String::from_utf8(out).expect("utf-8 output"))
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("max_examples=10"),
            Ok(("max_examples".to_string(), SettingValue::Int(10)))
        );
        assert_eq!(
            parse_assignment("database_file=a=b.db"),
            Ok(("database_file".to_string(), SettingValue::from("a=b.db")))
        );
        assert!(parse_assignment("no_equals").is_err());
        assert!(parse_assignment("=5").is_err());
    }

    #[test]
    fn test_cli_parses_repeated_set() {
        let cli = Cli::try_parse_from([
            "falsify-settings",
            "show",
            "--set",
            "max_examples=10",
            "--set",
            "derandomize=true",
        ])
        .expect("valid arguments");

        match cli.command {
            Command::Show { set, profile, .. } => {
                assert_eq!(set.len(), 2);
                assert_eq!(set[1], ("derandomize".to_string(), SettingValue::Bool(true)));
                assert!(profile.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_list_prints_every_setting() {
        let (context, home) = isolated_context();

        let output = run_to_string(&Command::List, &context).unwrap();

        assert!(output.contains("max_examples (default: 200)"));
        assert!(output.contains("timeout (default: 60)"));
        assert!(output.contains("database_file (default: None)"));

        std::fs::remove_dir_all(&home).ok();
    }

    #[test]
    fn test_show_applies_overrides() {
        let (context, home) = isolated_context();
        let command = Command::Show {
            profile_file: None,
            profile: None,
            set: vec![("max_examples".to_string(), SettingValue::Int(10))],
        };

        let output = run_to_string(&command, &context).unwrap();

        assert!(output.starts_with("Settings(max_examples=10)\n"));
        assert!(output.contains("max_examples = 10\n"));
        assert!(output.contains("database -> None"));

        std::fs::remove_dir_all(&home).ok();
    }

    #[test]
    fn test_show_layers_set_over_profile() {
        let (context, home) = isolated_context();
        std::fs::create_dir_all(&home).unwrap();
        let profile_file = home.join("profiles.toml");
        std::fs::write(
            &profile_file,
            "[profiles.ci]\nmax_examples = 1000\ndatabase_file = \"ci.db\"\n",
        )
        .unwrap();
        let command = Command::Show {
            profile_file: Some(profile_file),
            profile: Some("ci".to_string()),
            set: vec![("max_examples".to_string(), SettingValue::Int(3))],
        };

        let output = run_to_string(&command, &context).unwrap();

        assert!(output.contains("max_examples = 3\n"));
        assert!(output.contains("database -> ci.db"));

        std::fs::remove_dir_all(&home).ok();
    }

    #[test]
    fn test_show_rejects_unknown_setting() {
        let (context, home) = isolated_context();
        let command = Command::Show {
            profile_file: None,
            profile: None,
            set: vec![("bogus".to_string(), SettingValue::Int(1))],
        };

        let err = run_to_string(&command, &context).unwrap_err();

        assert!(format!("{err:#}").contains("unrecognized settings: bogus"));

        std::fs::remove_dir_all(&home).ok();
    }

    #[test]
    fn test_show_requires_profile_file_for_profile() {
        let (context, home) = isolated_context();
        let command = Command::Show {
            profile_file: None,
            profile: Some("ci".to_string()),
            set: Vec::new(),
        };

        assert!(run_to_string(&command, &context).is_err());

        std::fs::remove_dir_all(&home).ok();
    }

    #[test]
    fn test_home_prints_configured_directory() {
        let (context, home) = isolated_context();

        let output = run_to_string(&Command::Home, &context).unwrap();

        assert_eq!(output.trim_end(), home.display().to_string());
        assert!(home.is_dir());

        std::fs::remove_dir_all(&home).ok();
    }
}
