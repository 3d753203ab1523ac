//! Override sets used to build a snapshot.
//!
//! Each entry is `Option<SettingValue>`: `Some` pins the setting, `None`
//! means "not set" and behaves exactly as if the name had been left out.  No
//! legitimate setting value can be mistaken for the "not set" marker.

use std::collections::BTreeMap;

use tracing::warn;

use super::SettingValue;
use crate::storage::DatabaseHandle;

/// Override key reserved for the database handle.  It is never a setting.
pub const DATABASE_KEY: &str = "database";

/// Named overrides plus an optional database handle.
#[derive(Debug, Clone, Default)]
pub struct SettingOverrides {
    values: BTreeMap<String, Option<SettingValue>>,
    database: Option<DatabaseHandle>,
}

impl SettingOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins `name` to `value`.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.insert(name, Some(value.into()));
        self
    }

    /// Marks `name` as explicitly not set.
    pub fn unset(mut self, name: impl Into<String>) -> Self {
        self.insert(name, None);
        self
    }

    /// Uses `handle` as the snapshot's database regardless of `database_file`.
    pub fn database(mut self, handle: DatabaseHandle) -> Self {
        self.database = Some(handle);
        self
    }

    /// Records an entry in place; a later entry for the same name wins.
    ///
    /// The reserved `database` key cannot carry a setting value and is
    /// ignored; use [`SettingOverrides::database`] instead.
    pub fn insert(&mut self, name: impl Into<String>, value: Option<SettingValue>) {
        let name = name.into();
        if name == DATABASE_KEY {
            warn!(key = DATABASE_KEY, "ignoring setting value for reserved override key");
            return;
        }
        self.values.insert(name, value);
    }

    /// Returns the pinned value of `name`, if any.
    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.values.get(name).and_then(Option::as_ref)
    }

    /// Number of named entries, including explicit "not set" entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.database.is_none()
    }

    /// Removes `name`, flattening "absent" and "not set" into `None`.
    pub(crate) fn take(&mut self, name: &str) -> Option<SettingValue> {
        self.values.remove(name).flatten()
    }

    pub(crate) fn take_database(&mut self) -> Option<DatabaseHandle> {
        self.database.take()
    }

    /// Names still present, in sorted order.
    pub(crate) fn remaining_names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

impl FromIterator<(String, SettingValue)> for SettingOverrides {
    fn from_iter<I: IntoIterator<Item = (String, SettingValue)>>(iter: I) -> Self {
        let mut overrides = Self::new();
        overrides.extend(iter);
        overrides
    }
}

impl Extend<(String, SettingValue)> for SettingOverrides {
    fn extend<I: IntoIterator<Item = (String, SettingValue)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, Some(value));
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ExampleDatabase;
    use std::sync::Arc;

    #[test]
    fn test_later_entry_wins() {
        let overrides = SettingOverrides::new()
            .set("max_examples", 10)
            .set("max_examples", 20);

        assert_eq!(overrides.get("max_examples"), Some(&SettingValue::Int(20)));
        assert_eq!(overrides.len(), 1);
    }

    #[test]
    fn test_unset_is_recorded_but_has_no_value() {
        let mut overrides = SettingOverrides::new().unset("timeout");

        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides.get("timeout"), None);
        assert_eq!(overrides.take("timeout"), None);
        assert_eq!(overrides.len(), 0);
    }

    #[test]
    fn test_reserved_database_key_is_not_a_setting() {
        let overrides = SettingOverrides::new().set(DATABASE_KEY, "x.db");

        assert_eq!(overrides.len(), 0);
        assert!(overrides.is_empty());
    }

    #[test]
    fn test_database_handle_counts_as_content() {
        let mut overrides =
            SettingOverrides::new().database(Arc::new(ExampleDatabase::new("a.db")));

        assert!(!overrides.is_empty());
        assert!(overrides.take_database().is_some());
        assert!(overrides.take_database().is_none());
    }

    #[test]
    fn test_extend_layers_on_top() {
        let mut overrides: SettingOverrides =
            vec![("max_examples".to_string(), SettingValue::Int(5))].into_iter().collect();

        overrides.extend([("max_examples".to_string(), SettingValue::Int(9))]);

        assert_eq!(overrides.get("max_examples"), Some(&SettingValue::Int(9)));
        assert_eq!(overrides.remaining_names(), vec!["max_examples".to_string()]);
    }
}
