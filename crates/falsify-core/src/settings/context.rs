//! The settings context: registry, database pool and default snapshot.
//!
//! Snapshots never reach for hidden global state.  Everything they share is
//! owned by a [`SettingsContext`] and handed to [`Settings::new`] explicitly.
//! An application normally builds exactly one context, and
//! [`SettingsContext::global`] provides that one lazily for callers that do
//! not want to thread it through.
//!
//! # Construction order
//!
//! ```text
//! SettingsContextBuilder::build()
//!  └─ StoragePaths          -- home directory resolver
//!  └─ SettingRegistry       -- standard settings declared (optional)
//!  └─ DatabaseCache         -- empty pool around the database factory
//!  └─ default Settings      -- empty; registry defaults are read on demand
//!  └─ bootstrap             -- $FALSIFY_DATABASE_FILE assigned onto the default
//! ```
//!
//! The default snapshot stays mutable.  Snapshots built afterwards copy its
//! values *at their own construction time*, so the order of
//! `default_settings().set(..)` calls relative to `settings(..)` calls is
//! observable.  The same holds for redeclaring a setting: the default snapshot
//! follows the newest definition (unless a value was assigned to it), and only
//! snapshots built after the redeclaration see the change.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use super::standard::{define_standard_settings, DATABASE_FILE, DATABASE_FILE_ENV};
use super::{SettingDefault, SettingOverrides, SettingRegistry, SettingValue, Settings, SettingsError};
use crate::storage::{
    process_env, DatabaseCache, DatabaseFactory, DirectDatabaseFactory, EnvLookup, StoragePaths,
};

/// Process-wide settings state, passed explicitly to snapshot constructors.
#[derive(Debug)]
pub struct SettingsContext {
    registry: Arc<SettingRegistry>,
    databases: Arc<DatabaseCache>,
    paths: Arc<StoragePaths>,
    default: Arc<Settings>,
}

impl SettingsContext {
    pub fn builder() -> SettingsContextBuilder {
        SettingsContextBuilder::default()
    }

    /// A context with the standard settings, reading the process environment.
    pub fn standard() -> Self {
        Self::builder().build()
    }

    /// The lazily created process-wide context.
    pub fn global() -> &'static SettingsContext {
        static GLOBAL: OnceLock<SettingsContext> = OnceLock::new();
        GLOBAL.get_or_init(Self::standard)
    }

    pub fn registry(&self) -> &Arc<SettingRegistry> {
        &self.registry
    }

    pub fn databases(&self) -> &Arc<DatabaseCache> {
        &self.databases
    }

    pub fn paths(&self) -> &Arc<StoragePaths> {
        &self.paths
    }

    /// The default snapshot every other snapshot layers onto.
    pub fn default_settings(&self) -> &Arc<Settings> {
        &self.default
    }

    /// Declares a setting; see [`SettingRegistry::define_setting`].
    pub fn define_setting(
        &self,
        name: impl Into<String>,
        description: &str,
        default: impl Into<SettingDefault>,
    ) {
        self.registry.define_setting(name, description, default);
    }

    /// Builds a snapshot from `overrides`; see [`Settings::new`].
    pub fn settings(&self, overrides: SettingOverrides) -> Result<Settings, SettingsError> {
        Settings::new(self, overrides)
    }
}

/// Configures a [`SettingsContext`].
///
/// | Option              | Default                      |
/// |---------------------|------------------------------|
/// | `registry`          | a new, empty registry        |
/// | `env`               | the real process environment |
/// | `home_dir`          | resolved lazily              |
/// | `database_factory`  | [`DirectDatabaseFactory`]    |
/// | `standard_settings` | `true`                       |
pub struct SettingsContextBuilder {
    registry: Option<Arc<SettingRegistry>>,
    env: EnvLookup,
    home_dir: Option<PathBuf>,
    factory: Arc<dyn DatabaseFactory>,
    standard_settings: bool,
}

impl Default for SettingsContextBuilder {
    fn default() -> Self {
        Self {
            registry: None,
            env: process_env(),
            home_dir: None,
            factory: Arc::new(DirectDatabaseFactory),
            standard_settings: true,
        }
    }
}

impl SettingsContextBuilder {
    /// Uses an existing registry, so settings declared before the context is
    /// built are resolved into its default snapshot.
    pub fn registry(mut self, registry: Arc<SettingRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Environment lookup used for every variable the context reads.
    pub fn env(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    /// Fixes the storage home directory instead of resolving it.
    pub fn home_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(dir.into());
        self
    }

    pub fn database_factory(mut self, factory: Arc<dyn DatabaseFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Whether to declare the standard settings and apply the environment
    /// bootstrap.  Without them the registry starts empty.
    pub fn standard_settings(mut self, enabled: bool) -> Self {
        self.standard_settings = enabled;
        self
    }

    pub fn build(self) -> SettingsContext {
        let paths = Arc::new(StoragePaths::new(Arc::clone(&self.env)));
        if let Some(dir) = self.home_dir {
            paths.set_home_dir(dir);
        }

        let registry = self.registry.unwrap_or_default();
        if self.standard_settings {
            define_standard_settings(&registry, Arc::clone(&paths), Arc::clone(&self.env));
        }

        let databases = Arc::new(DatabaseCache::new(self.factory));
        let default = Arc::new(Settings::new_default(
            Arc::clone(&registry),
            Arc::clone(&databases),
        ));

        if self.standard_settings {
            // The environment decides the default database once, here.
            let database_file = (self.env)(DATABASE_FILE_ENV).filter(|v| !v.is_empty());
            debug!(?database_file, setting = DATABASE_FILE, "bootstrapping default snapshot");
            default.store(DATABASE_FILE, SettingValue::from(database_file));
        }

        SettingsContext {
            registry,
            databases,
            paths,
            default,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
