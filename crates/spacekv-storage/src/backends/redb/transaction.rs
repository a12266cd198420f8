//! Redb transaction and cursor implementation.
//!
//! Cursors stream entries in batches instead of materializing whole ranges:
//! at most `batch_size` entries are held in memory at a time, and the next
//! batch is fetched, starting after the last key seen, when the cursor
//! advances past the end of the current one.

use std::ops::Bound;

use redb::{ReadTransaction, ReadableTable, TableError, WriteTransaction};

use crate::engine::{Cursor, CursorResult, KeyValue, StorageError, Transaction};

use super::tables::{encode_key, table_end_key, table_start_key, DATA_TABLE};

/// Default number of entries a cursor loads at a time.
pub(super) const DEFAULT_BATCH_SIZE: usize = 1000;

fn internal(e: impl std::fmt::Display) -> StorageError {
    StorageError::Internal(e.to_string())
}

/// A transaction for the Redb storage engine.
///
/// Wraps either a read-only snapshot or a read-write transaction behind the
/// one [`Transaction`] interface.
pub struct RedbTransaction {
    inner: TxKind,
    batch_size: usize,
}

#[allow(clippy::large_enum_variant)]
enum TxKind {
    Read(ReadTransaction),
    Write(WriteTransaction),
}

impl RedbTransaction {
    /// Wrap a read-only transaction.
    #[must_use]
    pub const fn new_read(tx: ReadTransaction, batch_size: usize) -> Self {
        Self { inner: TxKind::Read(tx), batch_size }
    }

    /// Wrap a read-write transaction.
    #[must_use]
    pub const fn new_write(tx: WriteTransaction, batch_size: usize) -> Self {
        Self { inner: TxKind::Write(tx), batch_size }
    }

    /// Fetch up to `limit` entries of `table` within physical bounds.
    ///
    /// Returned keys have the table prefix stripped.
    fn fetch_batch(
        &self,
        table: &str,
        lower: Bound<&[u8]>,
        upper: Bound<&[u8]>,
        limit: usize,
    ) -> Result<Vec<KeyValue>, StorageError> {
        if range_is_empty(&lower, &upper) {
            return Ok(Vec::new());
        }
        let prefix_len = table_start_key(table).len();
        match &self.inner {
            TxKind::Read(tx) => match tx.open_table(DATA_TABLE) {
                Ok(t) => collect_range(&t, lower, upper, prefix_len, limit),
                // No data table yet means no data.
                Err(TableError::TableDoesNotExist(_)) => Ok(Vec::new()),
                Err(e) => Err(internal(e)),
            },
            TxKind::Write(tx) => {
                let t = tx.open_table(DATA_TABLE).map_err(internal)?;
                collect_range(&t, lower, upper, prefix_len, limit)
            }
        }
    }
}

/// Whether no key can lie between `lower` and `upper`.
fn range_is_empty(lower: &Bound<&[u8]>, upper: &Bound<&[u8]>) -> bool {
    match (lower, upper) {
        (Bound::Included(l), Bound::Included(u)) => l > u,
        (Bound::Included(l) | Bound::Excluded(l), Bound::Excluded(u))
        | (Bound::Excluded(l), Bound::Included(u)) => l >= u,
        _ => false,
    }
}

fn get_value<T>(table: &T, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    Ok(table.get(key).map_err(internal)?.map(|v| v.value().to_vec()))
}

fn collect_range<T>(
    table: &T,
    lower: Bound<&[u8]>,
    upper: Bound<&[u8]>,
    prefix_len: usize,
    limit: usize,
) -> Result<Vec<KeyValue>, StorageError>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    let mut entries = Vec::with_capacity(limit.min(1024));
    for item in table.range::<&[u8]>((lower, upper)).map_err(internal)?.take(limit) {
        let (k, v) = item.map_err(internal)?;
        entries.push((k.value()[prefix_len..].to_vec(), v.value().to_vec()));
    }
    Ok(entries)
}

/// Map a logical bound to a physical bound within `table`.
fn physical(table: &str, bound: &Bound<Vec<u8>>) -> Bound<Vec<u8>> {
    match bound {
        Bound::Included(k) => Bound::Included(encode_key(table, k)),
        Bound::Excluded(k) => Bound::Excluded(encode_key(table, k)),
        Bound::Unbounded => Bound::Unbounded,
    }
}

fn bound_to_owned(bound: Bound<&[u8]>) -> Bound<Vec<u8>> {
    match bound {
        Bound::Included(b) => Bound::Included(b.to_vec()),
        Bound::Excluded(b) => Bound::Excluded(b.to_vec()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

fn as_ref_bound(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(b) => Bound::Included(b.as_slice()),
        Bound::Excluded(b) => Bound::Excluded(b.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

impl Transaction for RedbTransaction {
    type Cursor<'a>
        = RedbCursor<'a>
    where
        Self: 'a;

    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let encoded_key = encode_key(table, key);
        match &self.inner {
            TxKind::Read(tx) => match tx.open_table(DATA_TABLE) {
                Ok(t) => get_value(&t, &encoded_key),
                Err(TableError::TableDoesNotExist(_)) => Ok(None),
                Err(e) => Err(internal(e)),
            },
            TxKind::Write(tx) => {
                let t = tx.open_table(DATA_TABLE).map_err(internal)?;
                get_value(&t, &encoded_key)
            }
        }
    }

    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        match &mut self.inner {
            TxKind::Read(_) => Err(StorageError::ReadOnly),
            TxKind::Write(tx) => {
                let encoded_key = encode_key(table, key);
                let mut t = tx.open_table(DATA_TABLE).map_err(internal)?;
                t.insert(encoded_key.as_slice(), value).map_err(internal)?;
                Ok(())
            }
        }
    }

    fn delete(&mut self, table: &str, key: &[u8]) -> Result<bool, StorageError> {
        match &mut self.inner {
            TxKind::Read(_) => Err(StorageError::ReadOnly),
            TxKind::Write(tx) => {
                let encoded_key = encode_key(table, key);
                let mut t = tx.open_table(DATA_TABLE).map_err(internal)?;
                let removed = t.remove(encoded_key.as_slice()).map_err(internal)?;
                Ok(removed.is_some())
            }
        }
    }

    fn cursor(&self, table: &str) -> Result<Self::Cursor<'_>, StorageError> {
        Ok(RedbCursor::new(self, table, Bound::Unbounded, Bound::Unbounded))
    }

    fn range(
        &self,
        table: &str,
        start: Bound<&[u8]>,
        end: Bound<&[u8]>,
    ) -> Result<Self::Cursor<'_>, StorageError> {
        Ok(RedbCursor::new(self, table, bound_to_owned(start), bound_to_owned(end)))
    }

    fn commit(self) -> Result<(), StorageError> {
        match self.inner {
            TxKind::Read(_) => Ok(()),
            TxKind::Write(tx) => tx.commit().map_err(|e| StorageError::Transaction(e.to_string())),
        }
    }

    fn rollback(self) -> Result<(), StorageError> {
        match self.inner {
            TxKind::Read(_) => Ok(()),
            TxKind::Write(tx) => tx.abort().map_err(|e| StorageError::Transaction(e.to_string())),
        }
    }

    fn is_read_only(&self) -> bool {
        matches!(self.inner, TxKind::Read(_))
    }
}

/// Where a cursor is in its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    Unpositioned,
    /// At `batch[pos]`.
    At(usize),
    Exhausted,
}

/// A batched streaming cursor over a range of one logical table.
pub struct RedbCursor<'a> {
    tx: &'a RedbTransaction,
    table: String,
    /// Physical bounds of the cursor's range.
    lower: Bound<Vec<u8>>,
    upper: Bound<Vec<u8>>,
    batch: Vec<KeyValue>,
    state: CursorState,
    /// Whether the last fetch filled a whole batch.
    has_more: bool,
}

impl<'a> RedbCursor<'a> {
    fn new(
        tx: &'a RedbTransaction,
        table: &str,
        start: Bound<Vec<u8>>,
        end: Bound<Vec<u8>>,
    ) -> Self {
        let lower = match physical(table, &start) {
            Bound::Unbounded => Bound::Included(table_start_key(table)),
            bound => bound,
        };
        let upper = match physical(table, &end) {
            Bound::Unbounded => Bound::Excluded(table_end_key(table)),
            bound => bound,
        };
        Self {
            tx,
            table: table.to_owned(),
            lower,
            upper,
            batch: Vec::new(),
            state: CursorState::Unpositioned,
            has_more: false,
        }
    }

    /// Replace the current batch with entries from `lower`, positioning at the first.
    fn load(&mut self, lower: Bound<&[u8]>) -> CursorResult {
        let batch_size = self.tx.batch_size;
        self.batch =
            self.tx.fetch_batch(&self.table, lower, as_ref_bound(&self.upper), batch_size)?;
        self.has_more = self.batch.len() >= batch_size;
        self.state = if self.batch.is_empty() { CursorState::Exhausted } else { CursorState::At(0) };
        Ok(self.current_owned())
    }

    fn current_owned(&self) -> Option<KeyValue> {
        match self.state {
            CursorState::At(pos) => self.batch.get(pos).cloned(),
            CursorState::Unpositioned | CursorState::Exhausted => None,
        }
    }
}

impl Cursor for RedbCursor<'_> {
    fn seek(&mut self, key: &[u8]) -> CursorResult {
        let target = encode_key(&self.table, key);
        // Never seek below the range's own lower bound.
        let below_lower = match &self.lower {
            Bound::Included(l) => target < *l,
            Bound::Excluded(l) => target <= *l,
            Bound::Unbounded => false,
        };
        if below_lower {
            let lower = self.lower.clone();
            self.load(as_ref_bound(&lower))
        } else {
            self.load(Bound::Included(target.as_slice()))
        }
    }

    fn seek_first(&mut self) -> CursorResult {
        let lower = self.lower.clone();
        self.load(as_ref_bound(&lower))
    }

    fn next(&mut self) -> CursorResult {
        match self.state {
            CursorState::Unpositioned => self.seek_first(),
            CursorState::Exhausted => Ok(None),
            CursorState::At(pos) if pos + 1 < self.batch.len() => {
                self.state = CursorState::At(pos + 1);
                Ok(self.current_owned())
            }
            CursorState::At(_) if self.has_more => {
                let last = match self.batch.last() {
                    Some((k, _)) => encode_key(&self.table, k),
                    None => return Ok(None),
                };
                self.load(Bound::Excluded(last.as_slice()))
            }
            CursorState::At(_) => {
                self.state = CursorState::Exhausted;
                Ok(None)
            }
        }
    }

    fn current(&self) -> Option<(&[u8], &[u8])> {
        match self.state {
            CursorState::At(pos) => self.batch.get(pos).map(|(k, v)| (k.as_slice(), v.as_slice())),
            CursorState::Unpositioned | CursorState::Exhausted => None,
        }
    }
}
