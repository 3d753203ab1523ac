//! # falsify-core
//!
//! The settings layer of the falsify test engine: a registry of named, typed
//! settings, immutable snapshots that override a subset of them, and a pool of
//! example-database handles that snapshots open lazily.
//!
//! # Quick tour
//!
//! ```rust
//! use falsify_core::{SettingOverrides, SettingValue, SettingsContext};
//!
//! let context = SettingsContext::builder()
//!     .home_dir(std::env::temp_dir().join("falsify-doc"))
//!     .build();
//!
//! let settings = context
//!     .settings(SettingOverrides::new().set("max_examples", 5))
//!     .unwrap();
//!
//! assert_eq!(settings.get("max_examples"), Ok(SettingValue::Int(5)));
//! assert_eq!(settings.to_string(), "Settings(max_examples=5)");
//! ```
//!
//! - **`settings`** – declaration, default resolution and snapshots.
//! - **`storage`** – home directory, database pooling and profile files.

pub mod settings;
pub mod storage;

// Re-export the most-used types at the crate root so callers can write
// `falsify_core::Settings` instead of `falsify_core::settings::snapshot::Settings`.
pub use settings::standard::{
    DATABASE_FILE, DATABASE_FILE_ENV, DERANDOMIZE, MAX_EXAMPLES, MIN_SATISFYING_EXAMPLES, TIMEOUT,
};
pub use settings::{
    SettingDefault, SettingDefinition, SettingOverrides, SettingRegistry, SettingValue, Settings,
    SettingsContext, SettingsContextBuilder, SettingsError,
};
pub use storage::{
    DatabaseCache, DatabaseFactory, DatabaseHandle, ExampleDatabase, ProfileError,
    SettingsProfiles, StoragePaths,
};
