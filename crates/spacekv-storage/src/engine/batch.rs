//! Staged write operations.

use tracing::trace;

use super::{StorageError, Transaction};

/// One staged write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    /// Insert or replace a value.
    Put {
        /// Logical table.
        table: String,
        /// Key to write.
        key: Vec<u8>,
        /// Value to store.
        value: Vec<u8>,
    },
    /// Remove a key if present.
    Delete {
        /// Logical table.
        table: String,
        /// Key to remove.
        key: Vec<u8>,
    },
}

impl BatchOp {
    /// The logical table the operation targets.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::Put { table, .. } | Self::Delete { table, .. } => table,
        }
    }

    /// The key the operation targets.
    #[must_use]
    pub fn key(&self) -> &[u8] {
        match self {
            Self::Put { key, .. } | Self::Delete { key, .. } => key,
        }
    }
}

/// An ordered list of writes to apply atomically.
///
/// A batch performs no I/O itself. Operations are applied in the order they
/// were staged, so a delete followed by a put of the same key leaves the key
/// present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    /// Create an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a put.
    pub fn put(&mut self, table: &str, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Put {
            table: table.to_owned(),
            key: key.into(),
            value: value.into(),
        });
    }

    /// Stage a delete.
    pub fn delete(&mut self, table: &str, key: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Delete { table: table.to_owned(), key: key.into() });
    }

    /// The staged operations, in order.
    #[must_use]
    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    /// Number of staged operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Discard all staged operations.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Stage every operation of `other` after the current ones.
    pub fn extend(&mut self, other: Self) {
        self.ops.extend(other.ops);
    }

    /// Stage the operations into an open write transaction.
    ///
    /// The caller commits (or drops) the transaction.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the transaction.
    pub fn apply_to<T: Transaction>(&self, tx: &mut T) -> Result<(), StorageError> {
        for op in &self.ops {
            match op {
                BatchOp::Put { table, key, value } => {
                    trace!(table = %table, key_len = key.len(), "batch put");
                    tx.put(table, key, value)?;
                }
                BatchOp::Delete { table, key } => {
                    trace!(table = %table, key_len = key.len(), "batch delete");
                    tx.delete(table, key)?;
                }
            }
        }
        Ok(())
    }
}

impl IntoIterator for WriteBatch {
    type Item = BatchOp;
    type IntoIter = std::vec::IntoIter<BatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a WriteBatch {
    type Item = &'a BatchOp;
    type IntoIter = std::slice::Iter<'a, BatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
