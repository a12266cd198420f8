//! `spacekv` - Hyperspace-hashed document spaces
//!
//! A space stores records (a key plus typed value attributes) in an ordered
//! transactional key-value store, places every record at a partition
//! [`Coordinate`], and keeps secondary indexes over scalars inside document
//! attributes.
//!
//! # Quick Start
//!
//! ```
//! use spacekv::{AttributeCheck, Config, Predicate, Space, SpaceSchema};
//!
//! let schema = SpaceSchema::from_json(r#"{
//!     "name": "profiles",
//!     "key": { "name": "username", "datatype": "string", "hash": "equality" },
//!     "attributes": [ { "name": "info", "datatype": "document" } ],
//!     "indices": [ { "name": "by_age", "attribute": "info", "path": "age" } ]
//! }"#)?;
//! let space = Space::open(schema, &Config::in_memory())?;
//!
//! space.put(b"ada", &[r#"{"age": 36}"#])?;
//! space.put(b"alan", &[r#"{"age": 41}"#])?;
//! space.put(b"grace", &[r#"{"name": "no age"}"#])?;
//!
//! let over_forty = space.search("by_age", &AttributeCheck::new(1, Predicate::Gt, 40i64))?;
//! assert_eq!(over_forty, vec![b"alan".to_vec()]);
//! # Ok::<(), spacekv::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`space`] - The [`Space`] facade
//! - [`index`] - Index maintenance and range scans
//! - [`config`] - Opening spaces ([`Config`])
//! - [`error`] - Error types ([`enum@Error`])

#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod index;
pub mod space;

pub use config::Config;
pub use error::{Error, Result};
pub use index::{DocumentIndex, IndexError, IndexInfo, IndexKind, IndexRangeIter};
pub use space::Space;

pub use spacekv_core::{
    AttributeCheck, AttributeDef, CheckOperand, Coordinate, Datatype, HashKind, IndexId,
    IndexSpec, Predicate, Record, RegionId, SpaceSchema,
};
pub use spacekv_storage::{StorageEngine, Transaction};
