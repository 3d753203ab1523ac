//! The setting registry: every setting the engine knows about.
//!
//! A [`SettingRegistry`] maps a setting name to its [`SettingDefinition`]
//! (description plus default).  Definitions are added at startup and never
//! removed; declaring a name a second time replaces the earlier definition
//! but keeps the name's original position, so iteration order is the order in
//! which names first appeared.
//!
//! # Deferred defaults
//!
//! A default is either a plain [`SettingValue`] or a producer function.  The
//! registry only stores producers; they run when a snapshot resolves the
//! default (see [`SettingRegistry::default_value`]).
//!
//! # Reserved name
//!
//! `database` is the override key that carries a snapshot's database handle
//! ([`DATABASE_KEY`]), so it can never be a setting.  Declaring it is refused
//! and logged; the name stays undeclared and lookups of it fail with
//! [`SettingsError::UnknownSetting`].

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use super::overrides::DATABASE_KEY;
use super::{SettingValue, SettingsError};

/// A zero-argument function producing a default value on demand.
pub type DefaultProducer = Arc<dyn Fn() -> SettingValue + Send + Sync>;

/// The declared default of a setting.
#[derive(Clone)]
pub enum SettingDefault {
    /// Used as-is.
    Value(SettingValue),
    /// Invoked each time the default is resolved.
    Computed(DefaultProducer),
}

impl SettingDefault {
    /// Wraps `producer` as a deferred default.
    pub fn computed<F>(producer: F) -> Self
    where
        F: Fn() -> SettingValue + Send + Sync + 'static,
    {
        SettingDefault::Computed(Arc::new(producer))
    }

    /// Returns the plain value, or invokes the producer.
    pub fn resolve(&self) -> SettingValue {
        match self {
            SettingDefault::Value(value) => value.clone(),
            SettingDefault::Computed(producer) => producer(),
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, SettingDefault::Computed(_))
    }
}

impl fmt::Debug for SettingDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingDefault::Value(value) => f.debug_tuple("Value").field(value).finish(),
            SettingDefault::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

macro_rules! impl_default_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for SettingDefault {
                fn from(value: $ty) -> Self {
                    SettingDefault::Value(SettingValue::from(value))
                }
            }
        )*
    };
}

impl_default_from!(bool, i64, i32, u32, f64, &str, String);

impl From<SettingValue> for SettingDefault {
    fn from(value: SettingValue) -> Self {
        SettingDefault::Value(value)
    }
}

/// Declared metadata for one setting.
#[derive(Debug, Clone)]
pub struct SettingDefinition {
    name: String,
    description: String,
    default: SettingDefault,
}

impl SettingDefinition {
    /// Creates a definition; `description` is stored with surrounding
    /// whitespace trimmed.
    pub fn new(
        name: impl Into<String>,
        description: &str,
        default: impl Into<SettingDefault>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.trim().to_string(),
            default: default.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn default(&self) -> &SettingDefault {
        &self.default
    }
}

/// Mapping from setting name to its definition.
///
/// Shared between threads behind an `Arc`; all mutation goes through an
/// internal `RwLock`.
#[derive(Debug, Default)]
pub struct SettingRegistry {
    definitions: RwLock<Vec<Arc<SettingDefinition>>>,
}

impl SettingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name`, replacing any earlier definition of the same name.
    ///
    /// The reserved name [`DATABASE_KEY`] is refused with a warning.
    pub fn define_setting(
        &self,
        name: impl Into<String>,
        description: &str,
        default: impl Into<SettingDefault>,
    ) {
        let definition = Arc::new(SettingDefinition::new(name, description, default));
        if definition.name == DATABASE_KEY {
            warn!(setting = DATABASE_KEY, "refusing to declare a setting with the reserved override key");
            return;
        }
        debug!(setting = definition.name(), "defining setting");

        let mut definitions = self.write();
        match definitions.iter_mut().find(|d| d.name == definition.name) {
            Some(slot) => *slot = definition,
            None => definitions.push(definition),
        }
    }

    /// Returns the current definition of `name`.
    pub fn get(&self, name: &str) -> Option<Arc<SettingDefinition>> {
        self.read().iter().find(|d| d.name == name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().iter().any(|d| d.name == name)
    }

    /// All declared names in iteration order.
    pub fn names(&self) -> Vec<String> {
        self.read().iter().map(|d| d.name.clone()).collect()
    }

    /// A point-in-time copy of every definition in iteration order.
    pub fn definitions(&self) -> Vec<Arc<SettingDefinition>> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Resolves the registry default of `name`, invoking a producer if the
    /// default is deferred.
    ///
    /// The lock is released before the producer runs, so producers may read
    /// the registry themselves.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnknownSetting`] if `name` was never declared.
    pub fn default_value(&self, name: &str) -> Result<SettingValue, SettingsError> {
        let definition = self
            .get(name)
            .ok_or_else(|| SettingsError::UnknownSetting(name.to_string()))?;
        Ok(definition.default.resolve())
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<SettingDefinition>>> {
        self.definitions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<SettingDefinition>>> {
        self.definitions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_define_setting_trims_description() {
        let registry = SettingRegistry::new();

        registry.define_setting("max_examples", "\n  Stop after this many.\n", 200);

        let definition = registry.get("max_examples").expect("declared");
        assert_eq!(definition.description(), "Stop after this many.");
        assert_eq!(registry.default_value("max_examples"), Ok(SettingValue::Int(200)));
    }

    #[test]
    fn test_reserved_database_name_cannot_be_declared() {
        let registry = SettingRegistry::new();

        registry.define_setting(DATABASE_KEY, "", "x.db");

        assert!(!registry.contains(DATABASE_KEY));
        assert!(registry.is_empty());
        assert_eq!(
            registry.default_value(DATABASE_KEY),
            Err(SettingsError::UnknownSetting(DATABASE_KEY.to_string()))
        );
    }

    #[test]
    fn test_redefinition_is_last_writer_wins_and_keeps_position() {
        // Arrange
        let registry = SettingRegistry::new();
        registry.define_setting("a", "", 1);
        registry.define_setting("b", "", 2);

        // Act
        registry.define_setting("a", "second", 10);

        // Assert
        assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.default_value("a"), Ok(SettingValue::Int(10)));
        assert_eq!(registry.get("a").unwrap().description(), "second");
    }

    #[test]
    fn test_registry_does_not_invoke_producers_on_declaration() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let registry = SettingRegistry::new();

        registry.define_setting(
            "computed",
            "",
            SettingDefault::computed(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                SettingValue::Int(7)
            }),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(registry.get("computed").unwrap().default().is_computed());

        // Each resolution invokes the producer afresh.
        assert_eq!(registry.default_value("computed"), Ok(SettingValue::Int(7)));
        assert_eq!(registry.default_value("computed"), Ok(SettingValue::Int(7)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_default_value_of_unknown_setting_fails() {
        let registry = SettingRegistry::new();
        assert_eq!(
            registry.default_value("nope"),
            Err(SettingsError::UnknownSetting("nope".to_string()))
        );
        assert!(!registry.contains("nope"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_declarations_are_all_recorded() {
        let registry = SettingRegistry::new();

        std::thread::scope(|scope| {
            for t in 0..8 {
                let registry = &registry;
                scope.spawn(move || {
                    for i in 0..25 {
                        registry.define_setting(format!("s{t}_{i}"), "", i);
                    }
                });
            }
        });

        assert_eq!(registry.len(), 200);
    }
}
