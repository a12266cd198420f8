//! Lazy scans over index entries.

use std::ops::Bound;

use spacekv_core::encoding::keys::decode_index_entry_key;
use spacekv_core::IndexEncoding;
use spacekv_storage::engine::names;
use spacekv_storage::{Cursor, Transaction};
use tracing::{trace, warn};

use super::IndexError;

enum State<'t, T>
where
    T: Transaction + 't,
{
    /// Nothing has been read yet.
    Unopened(&'t T),
    Positioned(T::Cursor<'t>),
    /// Terminal.
    Exhausted,
}

/// An iterator over the primary keys of the index entries within one range.
///
/// Keys come out in index order: by value, then by encoded primary key. The
/// scan reads through the transaction it was opened on, so it sees that
/// transaction's snapshot for its whole lifetime; dropping it early simply
/// stops the scan.
///
/// Entries in the range that do not carry the scan's type prefix are skipped.
/// An entry that does but cannot be decoded ends the scan with
/// [`IndexError::Decode`].
pub struct IndexRangeIter<'t, T>
where
    T: Transaction + 't,
{
    state: State<'t, T>,
    lower: Vec<u8>,
    upper: Bound<Vec<u8>>,
    type_prefix: Vec<u8>,
    key_encoding: &'t dyn IndexEncoding,
}

impl<'t, T> IndexRangeIter<'t, T>
where
    T: Transaction + 't,
{
    /// Create a scan of `[lower, upper)` in the index entry table.
    ///
    /// `type_prefix` is the `region | index | type tag` prefix every yielded
    /// entry must carry.
    pub fn new(
        tx: &'t T,
        lower: Vec<u8>,
        upper: Bound<Vec<u8>>,
        type_prefix: Vec<u8>,
        key_encoding: &'t dyn IndexEncoding,
    ) -> Self {
        Self { state: State::Unopened(tx), lower, upper, type_prefix, key_encoding }
    }

    /// Whether the scan has finished.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, State::Exhausted)
    }

    fn fail(&mut self, err: IndexError) -> Option<Result<Vec<u8>, IndexError>> {
        self.state = State::Exhausted;
        Some(Err(err))
    }
}

fn decode_primary_key(key: &[u8], key_encoding: &dyn IndexEncoding) -> Result<Vec<u8>, IndexError> {
    let entry = decode_index_entry_key(key)
        .map_err(|e| IndexError::Decode { key: key.to_vec(), reason: e.to_string() })?;
    key_encoding
        .decode(entry.encoded_key)
        .map_err(|e| IndexError::Decode { key: key.to_vec(), reason: e.to_string() })
}

impl<'t, T> Iterator for IndexRangeIter<'t, T>
where
    T: Transaction + 't,
{
    type Item = Result<Vec<u8>, IndexError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match &mut self.state {
                State::Unopened(tx) => {
                    let tx: &'t T = *tx;
                    let upper = match &self.upper {
                        Bound::Included(u) => Bound::Included(u.as_slice()),
                        Bound::Excluded(u) => Bound::Excluded(u.as_slice()),
                        Bound::Unbounded => Bound::Unbounded,
                    };
                    let lower = Bound::Included(self.lower.as_slice());
                    match tx.range(names::INDEX_ENTRIES, lower, upper) {
                        Ok(cursor) => self.state = State::Positioned(cursor),
                        Err(e) => return self.fail(e.into()),
                    }
                }
                State::Positioned(cursor) => match cursor.next() {
                    Ok(Some((key, _))) => {
                        if !key.starts_with(&self.type_prefix) {
                            trace!(key = ?key, "skipping foreign index entry");
                            continue;
                        }
                        match decode_primary_key(&key, self.key_encoding) {
                            Ok(primary) => return Some(Ok(primary)),
                            Err(e) => {
                                warn!(error = %e, "index scan stopped at undecodable entry");
                                return self.fail(e);
                            }
                        }
                    }
                    Ok(None) => {
                        self.state = State::Exhausted;
                        return None;
                    }
                    Err(e) => return self.fail(e.into()),
                },
                State::Exhausted => return None,
            }
        }
    }
}
