//! Secondary indexes over document attributes.
//!
//! An index selects one scalar inside each document of an attribute and keeps
//! an entry per record in the `index_entries` table:
//!
//! ```text
//! [region][index id][type tag][value][encoded primary key] -> ()
//! ```
//!
//! # Index Kinds
//!
//! What an index does depends on the datatype of the attribute it covers. The
//! [`IndexKind`] trait is the capability surface (maintenance on mutation and
//! scans for a check); [`IndexInfo`] is the registry that selects the kind for
//! a [`Datatype`]. Only documents are indexable today.
//!
//! # Maintenance
//!
//! [`IndexKind::index_changes`] never touches storage. It stages the entry
//! removals and insertions a mutation implies into a caller-owned
//! [`WriteBatch`], which the caller applies atomically with the object write.

mod document;
mod iter;

use spacekv_core::{AttributeCheck, CoreError, Datatype, IndexDef, IndexEncoding, IndexId, RegionId};
use spacekv_storage::{StorageError, Transaction, WriteBatch};
use thiserror::Error;

pub use document::DocumentIndex;
pub use iter::IndexRangeIter;

/// Errors raised while maintaining or scanning an index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A document could not be parsed; nothing was staged for the mutation.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// The storage layer failed.
    #[error("storage error: {0}")]
    Store(#[from] StorageError),

    /// An entry inside a scan range could not be decoded.
    #[error("undecodable index entry {key:02x?}: {reason}")]
    Decode {
        /// The raw entry key.
        key: Vec<u8>,
        /// What was wrong with it.
        reason: String,
    },

    /// A key or value could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl From<CoreError> for IndexError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedDocument(msg) => Self::MalformedDocument(msg),
            other => Self::Encoding(other.to_string()),
        }
    }
}

/// Index behavior for one attribute datatype.
pub trait IndexKind {
    /// The datatype this kind indexes.
    fn datatype(&self) -> Datatype;

    /// Stage the index updates for one mutation of a record.
    ///
    /// `old` and `new` are the attribute's bytes before and after the
    /// mutation; `None` means the record did not exist (insert) or no longer
    /// exists (delete).
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::MalformedDocument`] if either side cannot be
    /// parsed, and [`IndexError::Encoding`] if the key cannot be encoded. On
    /// error nothing has been added to `batch`.
    #[allow(clippy::too_many_arguments)]
    fn index_changes(
        &self,
        def: &IndexDef,
        region: RegionId,
        key_encoding: &dyn IndexEncoding,
        key: &[u8],
        old: Option<&[u8]>,
        new: Option<&[u8]>,
        batch: &mut WriteBatch,
    ) -> Result<(), IndexError>;

    /// Open a scan of the primary keys whose indexed value satisfies `check`.
    ///
    /// The scan reads through `tx` and is lazy: nothing is read until the
    /// iterator is first advanced.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Encoding`] if the check's operand cannot be
    /// encoded.
    fn iterator_from_check<'t, T>(
        &self,
        tx: &'t T,
        region: RegionId,
        index: IndexId,
        check: &AttributeCheck,
        key_encoding: &'t dyn IndexEncoding,
    ) -> Result<IndexRangeIter<'t, T>, IndexError>
    where
        T: Transaction + 't;

    /// Open a scan of the primary keys whose indexed value satisfies every
    /// check in `checks`, such as `3 < value < 9`.
    ///
    /// The scan covers the intersection of the checks' ranges. Checks whose
    /// operands differ in type match nothing, as does an empty `checks`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Encoding`] if an operand cannot be encoded.
    fn iterator_from_checks<'t, T>(
        &self,
        tx: &'t T,
        region: RegionId,
        index: IndexId,
        checks: &[AttributeCheck],
        key_encoding: &'t dyn IndexEncoding,
    ) -> Result<IndexRangeIter<'t, T>, IndexError>
    where
        T: Transaction + 't;
}

/// The registry of index kinds, keyed by attribute datatype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexInfo {
    /// Indexes over JSON documents.
    Document(DocumentIndex),
}

impl IndexInfo {
    /// Select the index kind for attributes of `datatype`.
    ///
    /// Returns `None` for datatypes that cannot carry an index.
    #[must_use]
    pub const fn for_datatype(datatype: Datatype) -> Option<Self> {
        match datatype {
            Datatype::Document => Some(Self::Document(DocumentIndex)),
            Datatype::String | Datatype::Int64 | Datatype::Float64 => None,
        }
    }
}

impl IndexKind for IndexInfo {
    fn datatype(&self) -> Datatype {
        match self {
            Self::Document(kind) => kind.datatype(),
        }
    }

    fn index_changes(
        &self,
        def: &IndexDef,
        region: RegionId,
        key_encoding: &dyn IndexEncoding,
        key: &[u8],
        old: Option<&[u8]>,
        new: Option<&[u8]>,
        batch: &mut WriteBatch,
    ) -> Result<(), IndexError> {
        match self {
            Self::Document(kind) => {
                kind.index_changes(def, region, key_encoding, key, old, new, batch)
            }
        }
    }

    fn iterator_from_check<'t, T>(
        &self,
        tx: &'t T,
        region: RegionId,
        index: IndexId,
        check: &AttributeCheck,
        key_encoding: &'t dyn IndexEncoding,
    ) -> Result<IndexRangeIter<'t, T>, IndexError>
    where
        T: Transaction + 't,
    {
        match self {
            Self::Document(kind) => kind.iterator_from_check(tx, region, index, check, key_encoding),
        }
    }

    fn iterator_from_checks<'t, T>(
        &self,
        tx: &'t T,
        region: RegionId,
        index: IndexId,
        checks: &[AttributeCheck],
        key_encoding: &'t dyn IndexEncoding,
    ) -> Result<IndexRangeIter<'t, T>, IndexError>
    where
        T: Transaction + 't,
    {
        match self {
            Self::Document(kind) => {
                kind.iterator_from_checks(tx, region, index, checks, key_encoding)
            }
        }
    }
}
