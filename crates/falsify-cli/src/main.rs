//! falsify-settings: inspect the settings registry from a shell.
//!
//! # Usage
//!
//! ```text
//! falsify-settings [--log-level <FILTER>] <COMMAND>
//!
//! Commands:
//!   list   List every declared setting with its default and description
//!   show   Build a snapshot and print its resolved values
//!            --profile-file <FILE>   TOML file with [profiles.<name>] tables
//!            --profile <NAME>        profile to start from
//!            --set <NAME=VALUE>      extra override (repeatable)
//!   home   Print the storage home directory
//! ```
//!
//! # Environment variables
//!
//! | Variable                     | Description                                 |
//! |------------------------------|---------------------------------------------|
//! | `FALSIFY_STORAGE_DIRECTORY`  | storage home directory                      |
//! | `FALSIFY_DATABASE_FILE`      | default example database path               |
//! | `FALSIFY_PROFILE_FILE`       | default for `show --profile-file`           |
//! | `RUST_LOG`                   | log filter; overrides `--log-level`         |
//!
//! Log output goes to stderr so command output on stdout stays pipeable.

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use falsify_cli::{run, Cli};
use falsify_core::SettingsContext;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // `RUST_LOG` wins when present; otherwise `--log-level` is the filter.
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&cli.log_level)
            .with_context(|| format!("invalid --log-level {:?}", cli.log_level))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(command = ?cli.command, "falsify-settings starting");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&cli.command, SettingsContext::global(), &mut out)?;
    out.flush().context("flushing stdout")?;
    Ok(())
}
