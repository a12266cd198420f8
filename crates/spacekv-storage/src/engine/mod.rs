//! Storage engine traits and abstractions.
//!
//! - [`StorageEngine`] - Main entry point for creating transactions
//! - [`Transaction`] - Transaction with get/put/delete/range operations
//! - [`Cursor`] - Ordered forward iteration over key-value pairs
//! - [`WriteBatch`] - Staged writes applied atomically
//!
//! All operations return [`StorageResult<T>`].

mod batch;
mod error;
mod traits;

pub use batch::{BatchOp, WriteBatch};
pub use error::{StorageError, StorageResult};
pub use traits::{Cursor, CursorResult, KeyValue, StorageEngine, Transaction};

/// Well-known logical table names.
pub mod names {
    /// Stored objects, keyed by `region | primary key`.
    pub const OBJECTS: &str = "objects";

    /// Secondary index entries.
    pub const INDEX_ENTRIES: &str = "index_entries";
}
