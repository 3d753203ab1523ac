//! Home-directory resolution for persisted artifacts.
//!
//! The home directory is chosen in this order:
//!
//! 1. An explicit override set with [`StoragePaths::set_home_dir`].
//! 2. The `FALSIFY_STORAGE_DIRECTORY` environment variable.
//! 3. `.falsify` under the current working directory.
//!
//! Whatever is chosen by (2) or (3) is written back into the override slot, so
//! later calls keep returning the same directory even if the environment
//! changes mid-process.
//!
//! Directory creation never fails the caller.  If the directory cannot be
//! created the problem is logged and the path is returned anyway; the first
//! real I/O against it will surface the error.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

/// Environment variable naming the home directory.
pub const STORAGE_DIRECTORY_ENV: &str = "FALSIFY_STORAGE_DIRECTORY";

/// Name of the fallback home directory created under the working directory.
pub const DEFAULT_HOME_DIR_NAME: &str = ".falsify";

/// Looks up an environment variable by name.
///
/// Injected so tests can supply a fixed environment instead of mutating the
/// real process environment.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// An [`EnvLookup`] reading the real process environment.
pub fn process_env() -> EnvLookup {
    Arc::new(|key: &str| std::env::var(key).ok())
}

/// Resolves and creates the storage home directory and its subdirectories.
pub struct StoragePaths {
    home: Mutex<Option<PathBuf>>,
    env: EnvLookup,
}

impl StoragePaths {
    /// Creates a resolver reading variables through `env`.
    pub fn new(env: EnvLookup) -> Self {
        Self {
            home: Mutex::new(None),
            env,
        }
    }

    /// Creates a resolver reading the real process environment.
    pub fn from_process_env() -> Self {
        Self::new(process_env())
    }

    /// Overrides the home directory for every later call.
    pub fn set_home_dir(&self, dir: impl Into<PathBuf>) {
        *self.home.lock().unwrap_or_else(PoisonError::into_inner) = Some(dir.into());
    }

    /// Returns the home directory, creating it if missing.
    pub fn home_dir(&self) -> PathBuf {
        let dir = {
            let mut slot = self.home.lock().unwrap_or_else(PoisonError::into_inner);
            slot.get_or_insert_with(|| self.resolve_home_dir()).clone()
        };
        ensure_dir(&dir);
        dir
    }

    /// Returns `name` joined under the home directory, creating it if missing.
    pub fn storage_directory(&self, name: &str) -> PathBuf {
        let dir = self.home_dir().join(name);
        ensure_dir(&dir);
        dir
    }

    fn resolve_home_dir(&self) -> PathBuf {
        if let Some(dir) = (self.env)(STORAGE_DIRECTORY_ENV).filter(|v| !v.is_empty()) {
            debug!(%dir, env = STORAGE_DIRECTORY_ENV, "home directory taken from environment");
            return PathBuf::from(dir);
        }
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        cwd.join(DEFAULT_HOME_DIR_NAME)
    }
}

impl std::fmt::Debug for StoragePaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let home = self.home.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("StoragePaths").field("home", &*home).finish()
    }
}

/// Creates `path` and its parents.  "Already exists" is success; every other
/// failure is logged and swallowed.
fn ensure_dir(path: &Path) {
    match std::fs::create_dir_all(path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
        Err(e) => warn!(path = %path.display(), "could not create storage directory: {e}"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
