//! `spacekv` Storage
//!
//! This crate provides the persistent ordered key-value store that `spacekv`
//! keeps its objects and index entries in.
//!
//! # Overview
//!
//! The storage layer is a transactional key-value interface with logical
//! tables. Readers work against point-in-time snapshots; writers stage changes
//! and make them visible atomically on commit.
//!
//! # Core Traits
//!
//! - [`StorageEngine`] - Opens snapshots and write transactions, applies batches
//! - [`Transaction`] - Get/put/delete and ordered range cursors
//! - [`Cursor`] - Forward iteration over key-value pairs
//!
//! Changes computed ahead of time are staged in a [`WriteBatch`] and applied
//! all-or-nothing with [`StorageEngine::apply`].
//!
//! # Example
//!
//! ```
//! use spacekv_storage::backends::RedbEngine;
//! use spacekv_storage::{StorageEngine, Transaction, WriteBatch};
//!
//! let engine = RedbEngine::in_memory()?;
//!
//! let mut batch = WriteBatch::new();
//! batch.put("users", b"user:1", b"Alice");
//! batch.put("users", b"user:2", b"Bob");
//! engine.apply(&batch)?;
//!
//! let tx = engine.begin_read()?;
//! assert_eq!(tx.get("users", b"user:1")?, Some(b"Alice".to_vec()));
//! # Ok::<(), spacekv_storage::StorageError>(())
//! ```

#![deny(clippy::unwrap_used)]

pub mod backends;
pub mod engine;

pub use engine::{
    BatchOp, Cursor, CursorResult, KeyValue, StorageEngine, StorageError, StorageResult,
    Transaction, WriteBatch,
};
