//! Redb storage backend.
//!
//! Redb is a pure-Rust embedded database with ACID transactions and MVCC
//! snapshots, which gives [`StorageEngine::begin_read`](crate::StorageEngine::begin_read)
//! its point-in-time semantics for free.
//!
//! All logical tables live in one physical redb table; see [`tables`] for the
//! key prefixing scheme.
//!
//! # Example
//!
//! ```
//! use spacekv_storage::backends::redb::{RedbConfig, RedbEngine};
//! use spacekv_storage::{StorageEngine, Transaction};
//!
//! let dir = std::env::temp_dir().join(format!("spacekv-doc-{}", std::process::id()));
//! std::fs::create_dir_all(&dir)?;
//! let config = RedbConfig::new().cache_size(16 * 1024 * 1024);
//! let engine = RedbEngine::open_with_config(dir.join("doc.redb"), config)?;
//!
//! let mut tx = engine.begin_write()?;
//! tx.put("users", b"user:1", b"Alice")?;
//! tx.commit()?;
//!
//! let tx = engine.begin_read()?;
//! assert_eq!(tx.get("users", b"user:1")?, Some(b"Alice".to_vec()));
//! # drop(tx);
//! # drop(engine);
//! # std::fs::remove_dir_all(&dir)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod engine;
pub mod tables;
mod transaction;

pub use engine::{RedbConfig, RedbEngine};
pub use transaction::{RedbCursor, RedbTransaction};
