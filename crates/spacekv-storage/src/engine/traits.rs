//! Core storage engine traits.
//!
//! - [`StorageEngine`] - The main entry point for storage operations
//! - [`Transaction`] - Transactional read/write operations
//! - [`Cursor`] - Ordered iteration over key-value pairs

use std::ops::Bound;
use std::sync::Arc;

use tracing::trace;

use super::{StorageError, WriteBatch};

/// A key-value pair returned by cursor operations.
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// Result type for cursor operations that return a key-value pair.
pub type CursorResult = Result<Option<KeyValue>, StorageError>;

/// A storage engine that provides transactional key-value operations.
///
/// Implementations must be thread-safe (`Send + Sync`). Read transactions are
/// point-in-time snapshots: they never observe writes committed after they
/// began. Committed write transactions become visible to new readers
/// atomically.
pub trait StorageEngine: Send + Sync {
    /// The transaction type for this engine.
    type Transaction<'a>: Transaction
    where
        Self: 'a;

    /// Begin a read-only snapshot transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the transaction cannot be started.
    fn begin_read(&self) -> Result<Self::Transaction<'_>, StorageError>;

    /// Begin a read-write transaction.
    ///
    /// Depending on the backend, write transactions may be serialized.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the transaction cannot be started.
    fn begin_write(&self) -> Result<Self::Transaction<'_>, StorageError>;

    /// Flush any buffered data to durable storage.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the flush fails.
    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Apply a batch in its own write transaction, all-or-nothing.
    ///
    /// On any error the transaction is dropped uncommitted, so none of the
    /// batch's operations become visible.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while staging or committing.
    fn apply(&self, batch: &WriteBatch) -> Result<(), StorageError> {
        trace!(ops = batch.len(), "applying write batch");
        let mut tx = self.begin_write()?;
        batch.apply_to(&mut tx)?;
        tx.commit()
    }
}

/// A transaction that provides key-value operations over logical tables.
///
/// Write transactions must be explicitly committed; dropping one without
/// committing rolls back its changes.
pub trait Transaction {
    /// The cursor type for iteration.
    type Cursor<'a>: Cursor
    where
        Self: 'a;

    /// Get a value by key from a table.
    ///
    /// Returns `Ok(None)` if the key (or the table) does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Put a key-value pair into a table, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadOnly`] on a read-only transaction, or an
    /// error if the write fails.
    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Delete a key from a table.
    ///
    /// Returns `Ok(true)` if the key was deleted, `Ok(false)` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadOnly`] on a read-only transaction, or an
    /// error if the delete fails.
    fn delete(&mut self, table: &str, key: &[u8]) -> Result<bool, StorageError>;

    /// Create a cursor over all key-value pairs in a table.
    ///
    /// The cursor starts unpositioned; the first [`Cursor::next`] moves it to
    /// the first entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor cannot be created.
    fn cursor(&self, table: &str) -> Result<Self::Cursor<'_>, StorageError>;

    /// Create a cursor over the keys of a table within the given bounds.
    ///
    /// ```ignore
    /// use std::ops::Bound;
    ///
    /// // Keys from "a" (inclusive) to "z" (exclusive)
    /// let cursor = tx.range(
    ///     "my_table",
    ///     Bound::Included(b"a".as_slice()),
    ///     Bound::Excluded(b"z".as_slice()),
    /// )?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor cannot be created.
    fn range(
        &self,
        table: &str,
        start: Bound<&[u8]>,
        end: Bound<&[u8]>,
    ) -> Result<Self::Cursor<'_>, StorageError>;

    /// Commit the transaction, making all changes durable and visible.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the commit fails.
    fn commit(self) -> Result<(), StorageError>;

    /// Roll back the transaction, discarding all changes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the rollback fails.
    fn rollback(self) -> Result<(), StorageError>;

    /// Check if this is a read-only transaction.
    fn is_read_only(&self) -> bool;
}

/// A forward cursor over key-value pairs in key order.
///
/// ```ignore
/// let mut cursor = tx.cursor("my_table")?;
///
/// // Position at first key >= "prefix"
/// let mut entry = cursor.seek(b"prefix")?;
/// while let Some((key, value)) = entry {
///     // ...
///     entry = cursor.next()?;
/// }
/// ```
///
/// Once a cursor has run past its last entry it stays exhausted: further
/// calls to `next` return `None` until it is explicitly re-positioned.
pub trait Cursor {
    /// Seek to the first key greater than or equal to `key`.
    ///
    /// Returns the entry at the new position, or `None` if there is none.
    fn seek(&mut self, key: &[u8]) -> CursorResult;

    /// Seek to the first key-value pair.
    ///
    /// Returns the first entry, or `None` if the range is empty.
    fn seek_first(&mut self) -> CursorResult;

    /// Move to the next key-value pair.
    ///
    /// On an unpositioned cursor this behaves like [`seek_first`](Self::seek_first).
    fn next(&mut self) -> CursorResult;

    /// Get the current key-value pair without advancing.
    ///
    /// Returns `None` before the first positioning call and after exhaustion.
    fn current(&self) -> Option<(&[u8], &[u8])>;
}

/// Share one engine between several owners.
impl<E: StorageEngine> StorageEngine for Arc<E> {
    type Transaction<'a>
        = E::Transaction<'a>
    where
        Self: 'a;

    fn begin_read(&self) -> Result<Self::Transaction<'_>, StorageError> {
        (**self).begin_read()
    }

    fn begin_write(&self) -> Result<Self::Transaction<'_>, StorageError> {
        (**self).begin_write()
    }

    fn flush(&self) -> Result<(), StorageError> {
        (**self).flush()
    }

    fn apply(&self, batch: &WriteBatch) -> Result<(), StorageError> {
        (**self).apply(batch)
    }
}
