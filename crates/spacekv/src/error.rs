//! Error types for `spacekv`.
//!
//! This module provides the [`enum@Error`] type that represents all possible
//! errors when using a [`Space`](crate::Space).

use spacekv_core::CoreError;
use spacekv_storage::StorageError;
use thiserror::Error;

use crate::index::IndexError;

/// Errors that can occur when using `spacekv`.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration error occurred.
    #[error("configuration error: {0}")]
    Config(String),

    /// A schema, key or value failed validation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A storage error occurred.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Index maintenance or an index scan failed.
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// No index with this name exists in the space.
    #[error("no index named '{0}'")]
    IndexNotFound(String),

    /// A check does not apply to the index it was run against.
    #[error("invalid check: {0}")]
    InvalidCheck(String),

    /// A stored object could not be decoded.
    #[error("corrupt object: {0}")]
    Corrupt(String),
}

/// A specialized `Result` type for `spacekv` operations.
pub type Result<T> = std::result::Result<T, Error>;
