//! In-memory catalog of document index definitions.
//!
//! # Example
//!
//! ```
//! use spacekv_core::index::{IndexCatalog, IndexDef};
//!
//! let mut catalog = IndexCatalog::new();
//!
//! let def = IndexDef::builder("by_city", 2).path("address.city").build().unwrap();
//! let id = catalog.create_index(def).unwrap();
//!
//! assert_eq!(catalog.get_index("by_city").map(|d| d.id), Some(id));
//! assert_eq!(catalog.all_indexes().count(), 1);
//! ```

use std::collections::HashMap;

use thiserror::Error;

use crate::document::DocPath;
use crate::error::CoreError;
use crate::types::{Datatype, IndexId, SpaceSchema};

/// A document index definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    /// Identifier assigned by the catalog; prefixes every entry of the index.
    pub id: IndexId,
    /// Index name, unique within a catalog.
    pub name: String,
    /// Position of the indexed attribute (values start at 1).
    pub attribute: usize,
    /// Path of the indexed scalar inside the attribute's documents.
    pub path: DocPath,
}

impl IndexDef {
    /// Create a new index definition builder.
    #[must_use]
    pub fn builder(name: impl Into<String>, attribute: usize) -> IndexDefBuilder {
        IndexDefBuilder { name: name.into(), attribute, path: None }
    }
}

/// Builder for constructing [`IndexDef`] instances.
#[derive(Debug)]
pub struct IndexDefBuilder {
    name: String,
    attribute: usize,
    path: Option<String>,
}

impl IndexDefBuilder {
    /// Set the document path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Build the index definition.
    ///
    /// The ID is left at 0; it is assigned when the definition is registered.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPath`] if no path was set or it does not parse.
    pub fn build(self) -> Result<IndexDef, CoreError> {
        let path = self
            .path
            .ok_or_else(|| CoreError::InvalidPath(format!("index '{}' has no path", self.name)))?;
        Ok(IndexDef {
            id: IndexId::new(0),
            name: self.name,
            attribute: self.attribute,
            path: DocPath::parse(&path)?,
        })
    }
}

/// Error type for index catalog operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// An index with this name already exists.
    #[error("index already exists: {0}")]
    IndexAlreadyExists(String),
    /// Index definition is invalid.
    #[error("invalid index definition: {0}")]
    InvalidDefinition(String),
}

/// In-memory catalog of index definitions.
///
/// The catalog is not synchronized; it is built once per space and only read
/// afterwards.
#[derive(Debug)]
pub struct IndexCatalog {
    /// Definitions in ID order.
    indexes: Vec<IndexDef>,
    /// Position in `indexes` by name.
    by_name: HashMap<String, usize>,
    next_id: u64,
}

impl Default for IndexCatalog {
    fn default() -> Self {
        Self { indexes: Vec::new(), by_name: HashMap::new(), next_id: 1 }
    }
}

impl IndexCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from the index declarations of a schema.
    ///
    /// Identifiers are assigned in declaration order starting at 1, so the
    /// same schema always yields the same identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if an index references an unknown or non-document
    /// attribute, has an invalid path, or reuses a name.
    pub fn from_schema(schema: &SpaceSchema) -> Result<Self, CoreError> {
        let mut catalog = Self::new();
        for spec in &schema.indices {
            let (position, attr) = schema.attribute(&spec.attribute).ok_or_else(|| {
                CatalogError::InvalidDefinition(format!(
                    "index '{}' references unknown attribute '{}'",
                    spec.name, spec.attribute
                ))
            })?;
            if attr.datatype != Datatype::Document {
                return Err(CatalogError::InvalidDefinition(format!(
                    "attribute '{}' of index '{}' is {}, not a document",
                    attr.name,
                    spec.name,
                    attr.datatype.as_str()
                ))
                .into());
            }
            let def = IndexDef::builder(&spec.name, position).path(&spec.path).build()?;
            catalog.create_index(def)?;
        }
        Ok(catalog)
    }

    /// Register a new index definition, returning its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or taken, or the attribute is
    /// the key (position 0).
    pub fn create_index(&mut self, mut def: IndexDef) -> Result<IndexId, CatalogError> {
        if def.name.is_empty() {
            return Err(CatalogError::InvalidDefinition("index name cannot be empty".into()));
        }
        if def.attribute == 0 {
            return Err(CatalogError::InvalidDefinition(format!(
                "index '{}' cannot cover the key",
                def.name
            )));
        }
        if self.by_name.contains_key(&def.name) {
            return Err(CatalogError::IndexAlreadyExists(def.name));
        }

        let id = IndexId::new(self.next_id);
        self.next_id += 1;
        def.id = id;

        self.by_name.insert(def.name.clone(), self.indexes.len());
        self.indexes.push(def);

        Ok(id)
    }

    /// Get an index definition by name.
    #[must_use]
    pub fn get_index(&self, name: &str) -> Option<&IndexDef> {
        self.by_name.get(name).and_then(|&i| self.indexes.get(i))
    }

    /// All index definitions, in ID order.
    pub fn all_indexes(&self) -> impl Iterator<Item = &IndexDef> {
        self.indexes.iter()
    }

    /// Get the number of indexes in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

impl From<CatalogError> for CoreError {
    fn from(err: CatalogError) -> Self {
        Self::Validation(err.to_string())
    }
}
