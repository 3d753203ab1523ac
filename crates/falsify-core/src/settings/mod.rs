//! Settings: declaration, resolution and snapshots.
//!
//! The pieces, leaf first:
//!
//! - **`value`** – [`SettingValue`], the dynamically typed value of a setting.
//! - **`registry`** – [`SettingRegistry`], the name → definition map that every
//!   snapshot consults.
//! - **`overrides`** – [`SettingOverrides`], the caller's partial set of values
//!   for a new snapshot.
//! - **`snapshot`** – [`Settings`], one resolved value per declared setting.
//! - **`standard`** – the settings every engine declares (`max_examples`,
//!   `timeout`, ...) and typed accessors for them.
//! - **`context`** – [`SettingsContext`], which owns the registry, the database
//!   pool and the default snapshot that all other snapshots layer onto.

pub mod context;
pub mod overrides;
pub mod registry;
pub mod snapshot;
pub mod standard;
pub mod value;

use thiserror::Error;

pub use context::{SettingsContext, SettingsContextBuilder};
pub use overrides::{SettingOverrides, DATABASE_KEY};
pub use registry::{DefaultProducer, SettingDefault, SettingDefinition, SettingRegistry};
pub use snapshot::Settings;
pub use value::SettingValue;

/// Errors raised while building or reading settings.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SettingsError {
    /// A snapshot was built with override names that are not declared.
    #[error("unrecognized settings: {}", names.join(", "))]
    UnrecognizedSettings { names: Vec<String> },

    /// A lookup or assignment named a setting that was never declared.
    #[error("no setting named {0}")]
    UnknownSetting(String),

    /// A typed accessor found a value of another shape.
    #[error("setting {name} holds a {found} value, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}
