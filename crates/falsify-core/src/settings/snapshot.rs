//! Configuration snapshots.
//!
//! A [`Settings`] value holds one resolved value for every setting that was
//! declared when it was built.  Values come from the caller's overrides, and
//! anything not overridden is copied from the default snapshot *as it is at
//! that moment*.  Later changes to the default snapshot do not reach snapshots
//! that already exist, but they do reach every snapshot built afterwards.
//!
//! # Lookup
//!
//! [`Settings::get`] is a two-tier lookup:
//!
//! 1. the value resolved at construction, if the setting existed then;
//! 2. otherwise the registry default (producer invoked, result not cached).
//!
//! A name absent from both tiers is [`SettingsError::UnknownSetting`].
//!
//! # The default snapshot
//!
//! The default snapshot is the one exception to "resolved at construction".
//! It stores only values assigned to it with [`Settings::set`]; everything
//! else is read from the registry's *current* definition.  The resolved
//! default is cached together with the definition it came from, so a producer
//! runs once per definition, and redeclaring a setting is picked up by the
//! default snapshot and by every snapshot built after it.
//!
//! ```text
//! default.get(name)
//!  ├─ assigned with set()?                 -> that value
//!  ├─ cached for the current definition?   -> cached value
//!  └─ otherwise                            -> resolve, cache, return
//! ```
//!
//! # Representation
//!
//! `Display` (and `Debug`) list only the settings that differ from the
//! default snapshot's current values, sorted by name:
//! `Settings(max_examples=5, timeout=0)`.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use super::standard::DATABASE_FILE;
use super::{
    SettingDefinition, SettingOverrides, SettingRegistry, SettingValue, SettingsContext,
    SettingsError,
};
use crate::storage::{DatabaseCache, DatabaseHandle};

/// An immutable-after-construction bundle of resolved setting values.
pub struct Settings {
    registry: Arc<SettingRegistry>,
    databases: Arc<DatabaseCache>,
    /// The snapshot unset values are copied from; `None` for the default
    /// snapshot itself, which resolves registry defaults instead.
    defaults: Option<Arc<Settings>>,
    /// Resolved values.  On the default snapshot, only explicit assignments.
    values: RwLock<HashMap<String, SettingValue>>,
    /// Default snapshot only: registry defaults keyed by name, with the
    /// definition each was resolved from.
    resolved: RwLock<HashMap<String, ResolvedDefault>>,
    /// Outer `None`: not computed yet.  `Some(None)`: computed, no database.
    database: OnceLock<Option<DatabaseHandle>>,
}

/// A registry default resolved by the default snapshot.
struct ResolvedDefault {
    definition: Arc<SettingDefinition>,
    value: SettingValue,
}

impl Settings {
    /// Builds a snapshot layering `overrides` onto the context's default
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnrecognizedSettings`] listing every override
    /// name that is not a declared setting.
    pub fn new(context: &SettingsContext, overrides: SettingOverrides) -> Result<Self, SettingsError> {
        Self::layered(
            Arc::clone(context.registry()),
            Arc::clone(context.databases()),
            Arc::clone(context.default_settings()),
            overrides,
        )
    }

    /// Builds the default snapshot.  Nothing is resolved up front: registry
    /// defaults are read on first use and follow later redeclarations.
    pub(crate) fn new_default(
        registry: Arc<SettingRegistry>,
        databases: Arc<DatabaseCache>,
    ) -> Self {
        debug!(settings = registry.len(), "built default settings snapshot");

        Self {
            registry,
            databases,
            defaults: None,
            values: RwLock::new(HashMap::new()),
            resolved: RwLock::new(HashMap::new()),
            database: OnceLock::new(),
        }
    }

    fn layered(
        registry: Arc<SettingRegistry>,
        databases: Arc<DatabaseCache>,
        defaults: Arc<Settings>,
        mut overrides: SettingOverrides,
    ) -> Result<Self, SettingsError> {
        let mut values = HashMap::new();
        let mut overridden = 0_usize;

        for definition in registry.definitions() {
            let name = definition.name();
            let value = match overrides.take(name) {
                Some(value) => {
                    overridden += 1;
                    value
                }
                None => defaults.get(name)?,
            };
            values.insert(name.to_string(), value);
        }

        let database = OnceLock::new();
        if let Some(handle) = overrides.take_database() {
            let _ = database.set(Some(handle));
        }

        let unrecognized = overrides.remaining_names();
        if !unrecognized.is_empty() {
            return Err(SettingsError::UnrecognizedSettings {
                names: unrecognized,
            });
        }

        debug!(settings = values.len(), overridden, "built settings snapshot");

        Ok(Self {
            registry,
            databases,
            defaults: Some(defaults),
            values: RwLock::new(values),
            resolved: RwLock::new(HashMap::new()),
            database,
        })
    }

    /// Returns the value of `name`.
    ///
    /// Settings declared after this snapshot was built resolve to their
    /// registry default.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnknownSetting`] if `name` was never declared.
    pub fn get(&self, name: &str) -> Result<SettingValue, SettingsError> {
        let stored = self.read_values().get(name).cloned();
        match stored {
            Some(value) => Ok(value),
            None if self.is_default() => self.resolved_default(name),
            None => self.registry.default_value(name),
        }
    }

    /// The registry default of `name` as seen by the default snapshot.
    ///
    /// Reuses the cached value while the registry still holds the definition
    /// it came from.  The producer runs outside the cache lock.  If two
    /// threads race on a first read, the first cached value wins.
    fn resolved_default(&self, name: &str) -> Result<SettingValue, SettingsError> {
        let definition = self
            .registry
            .get(name)
            .ok_or_else(|| SettingsError::UnknownSetting(name.to_string()))?;

        if let Some(cached) = self.read_resolved().get(name) {
            if Arc::ptr_eq(&cached.definition, &definition) {
                return Ok(cached.value.clone());
            }
        }

        let value = definition.default().resolve();
        let mut resolved = self.write_resolved();
        if let Some(cached) = resolved.get(name) {
            if Arc::ptr_eq(&cached.definition, &definition) {
                return Ok(cached.value.clone());
            }
        }
        debug!(setting = name, %value, "resolved registry default");
        resolved.insert(
            name.to_string(),
            ResolvedDefault {
                definition,
                value: value.clone(),
            },
        );
        Ok(value)
    }

    /// Assigns `value` to `name` in place.
    ///
    /// On the default snapshot this is the bootstrap hook: every snapshot
    /// built afterwards inherits the new value.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnknownSetting`] if `name` was never declared.
    pub fn set(&self, name: &str, value: impl Into<SettingValue>) -> Result<(), SettingsError> {
        if !self.registry.contains(name) {
            return Err(SettingsError::UnknownSetting(name.to_string()));
        }
        self.store(name, value.into());
        Ok(())
    }

    /// Assigns without checking the registry.
    pub(crate) fn store(&self, name: &str, value: SettingValue) {
        debug!(setting = name, %value, "assigning setting");
        self.write_values().insert(name.to_string(), value);
    }

    /// Every declared setting with its value, in registry order.
    pub fn values(&self) -> Vec<(String, SettingValue)> {
        self.registry
            .names()
            .into_iter()
            .filter_map(|name| self.get(&name).ok().map(|value| (name, value)))
            .collect()
    }

    /// `true` for the context's default snapshot.
    pub fn is_default(&self) -> bool {
        self.defaults.is_none()
    }

    pub fn registry(&self) -> &Arc<SettingRegistry> {
        &self.registry
    }

    /// The example database for this snapshot, computed at most once.
    ///
    /// A database handle supplied in the overrides is always returned.
    /// Otherwise an empty or absent `database_file` means no database, and
    /// any other path is opened through the shared pool, so snapshots naming
    /// the same file share one handle.
    pub fn database(&self) -> Option<DatabaseHandle> {
        self.database
            .get_or_init(|| self.resolve_database())
            .clone()
    }

    fn resolve_database(&self) -> Option<DatabaseHandle> {
        let file = self
            .get(DATABASE_FILE)
            .ok()
            .filter(SettingValue::is_truthy)?;
        match file.as_str() {
            Some(path) => Some(self.databases.open(path)),
            None => {
                warn!(value = %file, setting = DATABASE_FILE, "not a path; no database will be used");
                None
            }
        }
    }

    /// Settings whose value differs from the default snapshot, sorted by name.
    fn differences(&self) -> Vec<(String, SettingValue)> {
        let Some(defaults) = &self.defaults else {
            return Vec::new();
        };
        let mut bits: Vec<(String, SettingValue)> = self
            .values()
            .into_iter()
            .filter(|(name, value)| defaults.get(name).ok().as_ref() != Some(value))
            .collect();
        bits.sort_by(|a, b| a.0.cmp(&b.0));
        bits
    }

    fn read_values(&self) -> RwLockReadGuard<'_, HashMap<String, SettingValue>> {
        self.values.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_values(&self) -> RwLockWriteGuard<'_, HashMap<String, SettingValue>> {
        self.values.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_resolved(&self) -> RwLockReadGuard<'_, HashMap<String, ResolvedDefault>> {
        self.resolved.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_resolved(&self) -> RwLockWriteGuard<'_, HashMap<String, ResolvedDefault>> {
        self.resolved.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits: Vec<String> = self
            .differences()
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        write!(f, "Settings({})", bits.join(", "))
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Two snapshots are equal when every declared setting resolves to the same
/// value in both.
impl PartialEq for Settings {
    fn eq(&self, other: &Self) -> bool {
        self.values() == other.values()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
