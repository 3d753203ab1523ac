//! Named settings profiles loaded from a TOML file.
//!
//! A profile file groups override sets under a name:
//!
//! ```toml
//! [profiles.ci]
//! max_examples = 1000
//! derandomize = true
//!
//! [profiles.dev]
//! timeout = 0
//! database_file = ""
//! ```
//!
//! # How a profile becomes a snapshot
//!
//! ```text
//! profiles.toml ──load──▶ SettingsProfiles ──profile("ci")──▶ SettingOverrides
//!                                                                   │
//!                                      context.settings(overrides) ◀┘
//! ```
//!
//! Each table under `[profiles]` is one profile.  Its keys are setting names
//! and its values are read as [`SettingValue`]s: TOML booleans, integers,
//! floats and strings map onto the matching variant.  TOML has no null, so a
//! profile cannot mark a setting as absent; leave the key out instead and the
//! value comes from the default snapshot.
//!
//! Profiles are not validated against the registry when loaded.  Settings
//! can be declared at any time, so a key that is unknown at load time may be
//! valid by the time the profile is used.  Unknown keys are rejected when the
//! profile's [`SettingOverrides`] are turned into a snapshot, with every
//! offending key named in one
//! [`UnrecognizedSettings`](crate::settings::SettingsError::UnrecognizedSettings)
//! error.
//!
//! A file that does not exist yet loads as an empty set of profiles, so a
//! tool can point at its default profile path before anyone has written it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::settings::{SettingOverrides, SettingValue};

/// Why a profile file or a profile within it could not be used.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The profile file exists but could not be read.
    #[error("cannot read profile file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The profile file is not valid TOML, or a value is not a setting value.
    #[error("invalid profile file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The file has no `[profiles.<name>]` table with this name.
    #[error("no profile named {0}")]
    NotFound(String),
}

/// Every profile in one file, keyed by profile name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SettingsProfiles {
    #[serde(default)]
    profiles: BTreeMap<String, BTreeMap<String, SettingValue>>,
}

impl SettingsProfiles {
    /// Loads profiles from `path`, returning an empty set if the file does not
    /// exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Io`] for file-system errors other than "not
    /// found", and [`ProfileError::Parse`] if the TOML is malformed.
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ProfileError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ProfileError> {
        Ok(toml::from_str(content)?)
    }

    /// Profile names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Returns the overrides of profile `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::NotFound`] if no such profile exists.
    pub fn profile(&self, name: &str) -> Result<SettingOverrides, ProfileError> {
        let values = self
            .profiles
            .get(name)
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))?;
        Ok(values
            .iter()
            .map(|(setting, value)| (setting.clone(), value.clone()))
            .collect())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const SAMPLE: &str = r#"
[profiles.ci]
max_examples = 1000
derandomize = true
timeout = 2.5

[profiles.dev]
timeout = 0
database_file = ""
"#;

    #[test]
    fn test_parse_profiles_keeps_value_shapes() {
        // Arrange / Act
        let profiles = SettingsProfiles::from_toml_str(SAMPLE).expect("parse");
        let ci = profiles.profile("ci").expect("ci profile");

        // Assert
        assert_eq!(profiles.names().collect::<Vec<_>>(), vec!["ci", "dev"]);
        assert_eq!(ci.get("max_examples"), Some(&SettingValue::Int(1000)));
        assert_eq!(ci.get("derandomize"), Some(&SettingValue::Bool(true)));
        assert_eq!(ci.get("timeout"), Some(&SettingValue::Float(2.5)));
        assert_eq!(ci.len(), 3);
    }

    #[test]
    fn test_empty_text_is_kept_as_text() {
        let profiles = SettingsProfiles::from_toml_str(SAMPLE).unwrap();
        let dev = profiles.profile("dev").unwrap();

        assert_eq!(dev.get("database_file"), Some(&SettingValue::from("")));
        assert_eq!(dev.get("timeout"), Some(&SettingValue::Int(0)));
    }

    #[test]
    fn test_missing_profile_is_an_error() {
        let profiles = SettingsProfiles::from_toml_str(SAMPLE).unwrap();

        let err = profiles.profile("nightly").unwrap_err();

        assert!(matches!(err, ProfileError::NotFound(ref name) if name == "nightly"));
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        let result = SettingsProfiles::from_toml_str("[[[ not valid toml");
        assert!(matches!(result, Err(ProfileError::Parse(_))));
    }

    #[test]
    fn test_non_scalar_value_is_rejected() {
        let err = SettingsProfiles::from_toml_str("[profiles.ci]\nmax_examples = [1, 2]\n").unwrap_err();

        assert!(matches!(err, ProfileError::Parse(_)));
        assert!(err.to_string().starts_with("invalid profile file:"));
    }

    #[test]
    fn test_unreadable_path_names_the_file() {
        // A directory exists but cannot be read as a file.
        let dir = std::env::temp_dir().join(format!("falsify_dir_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let err = SettingsProfiles::load(&dir).unwrap_err();

        assert!(matches!(err, ProfileError::Io { ref path, .. } if path == &dir));
        assert!(err
            .to_string()
            .starts_with(&format!("cannot read profile file {}", dir.display())));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_missing_file_returns_empty_profiles() {
        let path = std::env::temp_dir().join(format!("falsify_{}.toml", Uuid::new_v4()));

        let profiles = SettingsProfiles::load(&path).expect("missing file is not an error");

        assert_eq!(profiles, SettingsProfiles::default());
    }

    #[test]
    fn test_load_reads_file_from_disk() {
        let dir = std::env::temp_dir().join(format!("falsify_test_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("profiles.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let profiles = SettingsProfiles::load(&path).unwrap();

        assert!(profiles.profile("dev").is_ok());

        std::fs::remove_dir_all(&dir).ok();
    }
}
