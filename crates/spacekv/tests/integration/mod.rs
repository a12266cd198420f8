//! Integration tests for spacekv.
//!
//! These exercise index maintenance, index scans and spaces end to end
//! against the redb backend.

pub mod consistency;
pub mod index_maintenance;
pub mod persistence;
pub mod range_iter;

use spacekv::{AttributeDef, Config, Datatype, HashKind, IndexSpec, Space, SpaceSchema};
use spacekv_storage::backends::RedbEngine;

/// A space keyed by string with one document attribute indexed at `a.b`.
pub fn doc_schema() -> SpaceSchema {
    SpaceSchema::new("docs", AttributeDef::new("k", Datatype::String, HashKind::Equality))
        .with_attribute(AttributeDef::new("doc", Datatype::Document, HashKind::None))
        .with_index(IndexSpec::new("by_ab", "doc", "a.b"))
}

/// An in-memory space over [`doc_schema`].
pub fn doc_space() -> Space<RedbEngine> {
    Space::open(doc_schema(), &Config::in_memory()).expect("failed to open space")
}
