//! Redb storage engine implementation.

use std::path::Path;

use redb::Database;
use tracing::info;

use crate::engine::{StorageEngine, StorageError};

use super::transaction::{RedbTransaction, DEFAULT_BATCH_SIZE};

/// Configuration options for the Redb storage engine.
#[derive(Debug, Clone, Copy)]
pub struct RedbConfig {
    /// Maximum size of the database file in bytes.
    /// If not set, the database will grow as needed.
    pub max_size: Option<u64>,

    /// Cache size in bytes.
    /// If not set, uses Redb's default.
    pub cache_size: Option<usize>,

    /// Number of entries a cursor loads from the database at a time.
    pub cursor_batch_size: usize,
}

impl Default for RedbConfig {
    fn default() -> Self {
        Self { max_size: None, cache_size: None, cursor_batch_size: DEFAULT_BATCH_SIZE }
    }
}

impl RedbConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum database size.
    #[must_use]
    pub const fn max_size(mut self, size: u64) -> Self {
        self.max_size = Some(size);
        self
    }

    /// Set the cache size.
    #[must_use]
    pub const fn cache_size(mut self, size: usize) -> Self {
        self.cache_size = Some(size);
        self
    }

    /// Set the cursor batch size. Values below 1 are treated as 1.
    #[must_use]
    pub const fn cursor_batch_size(mut self, size: usize) -> Self {
        self.cursor_batch_size = if size == 0 { 1 } else { size };
        self
    }
}

/// A storage engine backed by Redb.
pub struct RedbEngine {
    db: Database,
    config: RedbConfig,
}

impl RedbEngine {
    /// Open or create a database at the given path with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::open_with_config(path, RedbConfig::default())
    }

    /// Open or create a database at the given path with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be opened or
    /// created, or is already larger than `max_size`.
    pub fn open_with_config(
        path: impl AsRef<Path>,
        config: RedbConfig,
    ) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let mut builder = Database::builder();

        if let Some(cache_size) = config.cache_size {
            builder.set_cache_size(cache_size);
        }

        let db = builder.create(path).map_err(|e| StorageError::Open(e.to_string()))?;

        if let Some(max_size) = config.max_size {
            let len = std::fs::metadata(path)?.len();
            if len > max_size {
                return Err(StorageError::Open(format!(
                    "database is {len} bytes, over the configured maximum of {max_size}"
                )));
            }
        }

        info!(path = %path.display(), cache_size = ?config.cache_size, "opened redb database");
        Ok(Self { db, config })
    }

    /// Create an in-memory database.
    ///
    /// The database will be lost when the engine is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::in_memory_with_config(RedbConfig::default())
    }

    /// Create an in-memory database with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be created.
    pub fn in_memory_with_config(config: RedbConfig) -> Result<Self, StorageError> {
        let mut builder = Database::builder();
        if let Some(cache_size) = config.cache_size {
            builder.set_cache_size(cache_size);
        }
        let db = builder
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(|e| StorageError::Open(e.to_string()))?;

        info!("opened in-memory redb database");
        Ok(Self { db, config })
    }

    /// The configuration the engine was opened with.
    #[must_use]
    pub const fn config(&self) -> &RedbConfig {
        &self.config
    }
}

impl StorageEngine for RedbEngine {
    type Transaction<'a> = RedbTransaction;

    fn begin_read(&self) -> Result<Self::Transaction<'_>, StorageError> {
        let tx = self.db.begin_read().map_err(|e| StorageError::Transaction(e.to_string()))?;
        Ok(RedbTransaction::new_read(tx, self.config.cursor_batch_size))
    }

    fn begin_write(&self) -> Result<Self::Transaction<'_>, StorageError> {
        let tx = self.db.begin_write().map_err(|e| StorageError::Transaction(e.to_string()))?;
        Ok(RedbTransaction::new_write(tx, self.config.cursor_batch_size))
    }

    fn flush(&self) -> Result<(), StorageError> {
        // Commits are durable in redb.
        Ok(())
    }
}
