//! Example-database handles and the process-wide handle pool.
//!
//! The persistent example store itself lives outside this crate.  Here it is
//! an opaque [`ExampleDatabase`] bound to a file path and produced by a
//! [`DatabaseFactory`].  Opening a store is assumed to be expensive, so every
//! handle is pooled in a [`DatabaseCache`] keyed by its path: all snapshots
//! pointing at the same file share one handle.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

/// Opaque handle to a persistent example store.
#[derive(Debug, PartialEq, Eq)]
pub struct ExampleDatabase {
    path: PathBuf,
}

impl ExampleDatabase {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this handle is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Shared handle; identity (`Arc::ptr_eq`) is what the pool guarantees.
pub type DatabaseHandle = Arc<ExampleDatabase>;

/// Builds a database handle for a path.
#[cfg_attr(test, mockall::automock)]
pub trait DatabaseFactory: Send + Sync {
    fn open(&self, path: &Path) -> DatabaseHandle;
}

/// Binds an [`ExampleDatabase`] to the path without touching the disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectDatabaseFactory;

impl DatabaseFactory for DirectDatabaseFactory {
    fn open(&self, path: &Path) -> DatabaseHandle {
        Arc::new(ExampleDatabase::new(path))
    }
}

/// Pool of database handles keyed by storage path.
///
/// Entries are created on first use and never evicted.  The pool lock is held
/// while a handle is built, so concurrent first access for one key produces a
/// single handle.
pub struct DatabaseCache {
    factory: Arc<dyn DatabaseFactory>,
    entries: Mutex<HashMap<String, DatabaseHandle>>,
}

impl DatabaseCache {
    pub fn new(factory: Arc<dyn DatabaseFactory>) -> Self {
        Self {
            factory,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the pooled handle for `key`, building it with `create` if absent.
    pub fn get_or_create<F>(&self, key: &str, create: F) -> DatabaseHandle
    where
        F: FnOnce() -> DatabaseHandle,
    {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = entries.get(key) {
            return Arc::clone(handle);
        }
        let handle = create();
        entries.insert(key.to_string(), Arc::clone(&handle));
        handle
    }

    /// Returns the pooled handle for `path`, opening it through the factory on
    /// first use.
    pub fn open(&self, path: &str) -> DatabaseHandle {
        self.get_or_create(path, || {
            info!(path, "opening example database");
            self.factory.open(Path::new(path))
        })
    }

    /// Returns the pooled handle for `key` without creating one.
    pub fn get(&self, key: &str) -> Option<DatabaseHandle> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DatabaseCache {
    fn default() -> Self {
        Self::new(Arc::new(DirectDatabaseFactory))
    }
}

impl std::fmt::Debug for DatabaseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseCache")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
