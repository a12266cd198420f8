//! `spacekv` Core
//!
//! This crate provides the pure, storage-independent building blocks of
//! `spacekv`: partition coordinates, index key layouts, and document
//! attribute extraction.
//!
//! # Overview
//!
//! - **Hashing**: [`HashKind`], [`Coordinate`] and [`Hasher`] map a record's key
//!   and attribute values onto a two-part (key-space, value-space) coordinate
//! - **Encoding**: order-preserving encodings, pluggable [`IndexEncoding`]
//!   codecs, and the composite byte layout of secondary index entries
//! - **Documents**: [`DocPath`] selectors and extraction of indexable scalars
//!   from JSON documents
//! - **Types**: identifiers, schemas, query predicates and stored records
//!
//! Everything here is a pure function of its inputs and safe to call from any
//! number of threads.
//!
//! # Example
//!
//! ```
//! use spacekv_core::{HashKind, Hasher};
//!
//! let hasher = Hasher::new(vec![HashKind::Equality, HashKind::Range]).unwrap();
//!
//! let key_only = hasher.hash_key(b"key");
//! assert_eq!(key_only.primary_mask, u32::MAX);
//! assert_eq!(key_only.secondary_mask, 0);
//!
//! let values = [42i64.to_le_bytes()];
//! let both = hasher.hash(b"key", &values).unwrap();
//! assert_eq!(both, key_only | hasher.hash_values(&values).unwrap());
//! ```
//!
//! # Modules
//!
//! - [`hashing`] - Coordinate hashing
//! - [`encoding`] - Sortable encodings, index codecs and index keys
//! - [`document`] - Document paths and value extraction
//! - [`index`] - Index definitions and the index catalog
//! - [`types`] - Identifiers, schema, predicates and records
//! - [`error`] - Error types ([`CoreError`])

#![deny(clippy::unwrap_used)]

pub mod document;
pub mod encoding;
pub mod error;
pub mod hashing;
pub mod index;
pub mod types;

pub use document::{DocPath, ExtractedValue, TypeTag};
pub use encoding::{Float64Encoding, IndexEncoding, Int64Encoding, StringEncoding};
pub use error::CoreError;
pub use hashing::{Coordinate, HashKind, Hasher};
pub use index::{IndexCatalog, IndexDef};
pub use types::{
    AttributeCheck, AttributeDef, CheckOperand, Datatype, IndexId, IndexSpec, Predicate, Record,
    RegionId, SpaceSchema,
};
