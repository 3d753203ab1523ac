//! Storage infrastructure: where persisted artifacts live and how they are
//! opened.
//!
//! - **`paths`** – resolves and creates the storage home directory.
//! - **`database`** – the opaque example-database handle, its factory seam and
//!   the pool that shares one handle per path.
//! - **`profile`** – named override sets loaded from a TOML file.
//!
//! Filesystem and environment access in the crate is confined to this module.

pub mod database;
pub mod paths;
pub mod profile;

#[cfg(test)]
pub use database::MockDatabaseFactory;
pub use database::{
    DatabaseCache, DatabaseFactory, DatabaseHandle, DirectDatabaseFactory, ExampleDatabase,
};
pub use paths::{process_env, EnvLookup, StoragePaths, DEFAULT_HOME_DIR_NAME, STORAGE_DIRECTORY_ENV};
pub use profile::{ProfileError, SettingsProfiles};
