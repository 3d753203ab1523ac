//! The standard settings surface.
//!
//! | Setting                   | Default | Meaning                                   |
//! |---------------------------|---------|-------------------------------------------|
//! | `min_satisfying_examples` | `5`     | examples that must pass all assumptions   |
//! | `max_examples`            | `200`   | examples tried before giving up           |
//! | `timeout`                 | `60`    | soft limit in seconds; `<= 0` disables it |
//! | `derandomize`             | `false` | seed the generator from the test itself   |
//! | `database_file`           | derived | path of the example database              |
//!
//! `database_file` defaults to `$FALSIFY_DATABASE_FILE`, or `database.db` in
//! the storage home directory.

use std::sync::Arc;
use std::time::Duration;

use super::{SettingDefault, SettingRegistry, SettingValue, Settings, SettingsError};
use crate::storage::{EnvLookup, StoragePaths};

pub const MIN_SATISFYING_EXAMPLES: &str = "min_satisfying_examples";
pub const MAX_EXAMPLES: &str = "max_examples";
pub const TIMEOUT: &str = "timeout";
pub const DERANDOMIZE: &str = "derandomize";
pub const DATABASE_FILE: &str = "database_file";

/// Environment variable overriding the database path.
pub const DATABASE_FILE_ENV: &str = "FALSIFY_DATABASE_FILE";

/// File name of the database inside the storage home directory.
pub const DEFAULT_DATABASE_FILE_NAME: &str = "database.db";

/// Declares the standard settings into `registry`.
///
/// The `database_file` default is deferred: it reads `env` and `paths` each
/// time it is resolved.
pub fn define_standard_settings(
    registry: &SettingRegistry,
    paths: Arc<StoragePaths>,
    env: EnvLookup,
) {
    registry.define_setting(
        MIN_SATISFYING_EXAMPLES,
        "
Fail as unsatisfiable any test which does not produce at least this many
values that pass all assumptions, unless it has exhaustively covered the
search space.
",
        5,
    );

    registry.define_setting(
        MAX_EXAMPLES,
        "
Once this many examples have been considered without finding any
counter-example, falsification will terminate.
",
        200,
    );

    registry.define_setting(
        TIMEOUT,
        "
Once this many seconds have passed, falsification will terminate even if it
has not found many examples.  This is a soft limit: a running test is never
interrupted.  A value <= 0 disables the timeout.
",
        60,
    );

    registry.define_setting(
        DERANDOMIZE,
        "
Run in deterministic mode, seeding the random generator from the test being
falsified so that results are stable across runs.  This removes randomness
from the suite at the cost of finding fewer novel failures.
",
        false,
    );

    registry.define_setting(
        DATABASE_FILE,
        "
Path of the example database used to save and reload previous examples.  An
empty or absent value disables storage.
",
        SettingDefault::computed(move || {
            let path = env(DATABASE_FILE_ENV)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| {
                    paths
                        .home_dir()
                        .join(DEFAULT_DATABASE_FILE_NAME)
                        .to_string_lossy()
                        .into_owned()
                });
            SettingValue::Text(path)
        }),
    );
}

// ── Typed accessors ───────────────────────────────────────────────────────────

impl Settings {
    pub fn min_satisfying_examples(&self) -> Result<u64, SettingsError> {
        self.count(MIN_SATISFYING_EXAMPLES)
    }

    pub fn max_examples(&self) -> Result<u64, SettingsError> {
        self.count(MAX_EXAMPLES)
    }

    /// The soft time limit, or `None` when the value is `<= 0`.
    pub fn timeout(&self) -> Result<Option<Duration>, SettingsError> {
        let value = self.get(TIMEOUT)?;
        let seconds = value
            .as_f64()
            .ok_or_else(|| mismatch(TIMEOUT, "number", &value))?;
        if seconds <= 0.0 || !seconds.is_finite() {
            return Ok(None);
        }
        Ok(Some(Duration::from_secs_f64(seconds)))
    }

    pub fn derandomize(&self) -> Result<bool, SettingsError> {
        let value = self.get(DERANDOMIZE)?;
        value
            .as_bool()
            .ok_or_else(|| mismatch(DERANDOMIZE, "boolean", &value))
    }

    /// The database path, or `None` when empty or absent.
    pub fn database_file(&self) -> Result<Option<String>, SettingsError> {
        match self.get(DATABASE_FILE)? {
            SettingValue::Absent => Ok(None),
            SettingValue::Text(path) if path.is_empty() => Ok(None),
            SettingValue::Text(path) => Ok(Some(path)),
            other => Err(mismatch(DATABASE_FILE, "text", &other)),
        }
    }

    fn count(&self, name: &str) -> Result<u64, SettingsError> {
        let value = self.get(name)?;
        value
            .as_i64()
            .and_then(|i| u64::try_from(i).ok())
            .ok_or_else(|| mismatch(name, "non-negative integer", &value))
    }
}

fn mismatch(name: &str, expected: &'static str, found: &SettingValue) -> SettingsError {
    SettingsError::TypeMismatch {
        name: name.to_string(),
        expected,
        found: found.type_name(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
