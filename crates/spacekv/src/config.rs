//! Space configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use spacekv_core::RegionId;
use spacekv_storage::backends::RedbConfig;

use crate::error::{Error, Result};

/// Configuration options for opening a [`Space`](crate::Space) on redb.
///
/// Missing fields take their defaults when loaded from JSON:
///
/// ```
/// use spacekv::{Config, RegionId};
///
/// let config = Config::from_json(r#"{ "path": "data/profiles.redb", "region": 4 }"#).unwrap();
/// assert_eq!(config.region, RegionId::new(4));
/// assert!(config.cache_size.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the database file. `None` keeps the database in memory.
    pub path: Option<PathBuf>,
    /// The region this space's data and index entries belong to.
    pub region: RegionId,
    /// Cache size in bytes, if not redb's default.
    pub cache_size: Option<usize>,
}

impl Config {
    /// Create a configuration for a database file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: Some(path.into()), ..Self::default() }
    }

    /// Create a configuration for an in-memory database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Set the region.
    #[must_use]
    pub fn region(mut self, region: impl Into<RegionId>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the cache size.
    #[must_use]
    pub const fn cache_size(mut self, size: usize) -> Self {
        self.cache_size = Some(size);
        self
    }

    /// Parse a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the JSON does not describe a configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    pub(crate) fn redb(&self) -> RedbConfig {
        match self.cache_size {
            Some(size) => RedbConfig::new().cache_size(size),
            None => RedbConfig::new(),
        }
    }
}
