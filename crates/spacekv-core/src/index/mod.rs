//! Index definitions and the catalog that assigns their identifiers.
//!
//! A document index selects one scalar, by [`DocPath`](crate::DocPath), from a
//! document-typed attribute. The [`IndexCatalog`] assigns each definition the
//! [`IndexId`](crate::IndexId) that prefixes its entries. Queries look indexes
//! up by name; mutations walk every index in ID order.

mod catalog;

pub use catalog::{CatalogError, IndexCatalog, IndexDef, IndexDefBuilder};
