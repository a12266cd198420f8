//! Core data types for `spacekv`.
//!
//! This module defines the identifiers, schema, query predicates and stored
//! record format shared by the storage-facing crates.

mod check;
mod id;
mod record;
mod schema;

pub use check::{AttributeCheck, CheckOperand, Predicate};
pub use id::{IndexId, RegionId};
pub use record::Record;
pub use schema::{AttributeDef, Datatype, IndexSpec, SpaceSchema};
