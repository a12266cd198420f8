//! Space schemas: attribute declarations, hash kinds and index definitions.
//!
//! A schema is the static configuration of a space. It is usually loaded from
//! JSON:
//!
//! ```
//! use spacekv_core::{Datatype, HashKind, SpaceSchema};
//!
//! let schema = SpaceSchema::from_json(r#"{
//!     "name": "profiles",
//!     "key": { "name": "username", "datatype": "string", "hash": "equality" },
//!     "attributes": [
//!         { "name": "age", "datatype": "int64", "hash": "range" },
//!         { "name": "info", "datatype": "document" }
//!     ],
//!     "indices": [ { "name": "by_city", "attribute": "info", "path": "address.city" } ]
//! }"#).unwrap();
//!
//! assert_eq!(schema.hash_kinds(), vec![HashKind::Equality, HashKind::Range, HashKind::None]);
//! assert_eq!(schema.attribute("info").map(|(pos, a)| (pos, a.datatype)), Some((2, Datatype::Document)));
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::document::{validate_document, DocPath};
use crate::error::CoreError;
use crate::hashing::HashKind;

/// The type of an attribute's value bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    /// UTF-8 text.
    String,
    /// 8-byte little-endian signed integer.
    Int64,
    /// 8-byte little-endian IEEE 754 double.
    Float64,
    /// A JSON document.
    Document,
}

impl Datatype {
    /// Get a string representation of the datatype.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Document => "document",
        }
    }

    /// Check that `bytes` is a well-formed value of this datatype.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for wrongly sized numbers or invalid
    /// UTF-8, and [`CoreError::MalformedDocument`] for unparseable documents.
    pub fn check(self, bytes: &[u8]) -> Result<(), CoreError> {
        match self {
            Self::String => std::str::from_utf8(bytes)
                .map(|_| ())
                .map_err(|e| CoreError::Validation(format!("string is not UTF-8: {e}"))),
            Self::Int64 | Self::Float64 if bytes.len() != 8 => Err(CoreError::Validation(
                format!("{} value must be 8 bytes, got {}", self.as_str(), bytes.len()),
            )),
            Self::Int64 | Self::Float64 => Ok(()),
            Self::Document => validate_document(bytes),
        }
    }
}

/// Declaration of one attribute of a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    /// Attribute name, unique within the space.
    pub name: String,
    /// Type of the attribute's values.
    pub datatype: Datatype,
    /// How the attribute participates in partitioning.
    #[serde(default)]
    pub hash: HashKind,
}

impl AttributeDef {
    /// Create a new attribute declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, datatype: Datatype, hash: HashKind) -> Self {
        Self { name: name.into(), datatype, hash }
    }
}

/// Declaration of a document index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Index name, unique within the space.
    pub name: String,
    /// Name of the document attribute being indexed.
    pub attribute: String,
    /// Path of the indexed scalar inside the document.
    pub path: String,
}

impl IndexSpec {
    /// Create a new index declaration.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        attribute: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self { name: name.into(), attribute: attribute.into(), path: path.into() }
    }
}

/// The static configuration of a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceSchema {
    /// Name of the space.
    pub name: String,
    /// The key attribute (position 0).
    pub key: AttributeDef,
    /// Value attributes, positions `1..N` in declaration order.
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
    /// Document indexes over value attributes.
    #[serde(default)]
    pub indices: Vec<IndexSpec>,
}

impl SpaceSchema {
    /// Create a schema with only a key attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, key: AttributeDef) -> Self {
        Self { name: name.into(), key, attributes: Vec::new(), indices: Vec::new() }
    }

    /// Add a value attribute.
    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add a document index.
    #[must_use]
    pub fn with_index(mut self, index: IndexSpec) -> Self {
        self.indices.push(index);
        self
    }

    /// Parse and validate a schema from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the JSON does not describe a
    /// schema or the schema is inconsistent.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let schema: Self = serde_json::from_str(json)
            .map_err(|e| CoreError::Validation(format!("invalid schema: {e}")))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Check that the schema is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for duplicate names, a document key,
    /// or an index on a missing or non-document attribute, and
    /// [`CoreError::InvalidPath`] for unparseable index paths.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.key.datatype == Datatype::Document {
            return Err(CoreError::Validation(format!(
                "key attribute '{}' cannot be a document",
                self.key.name
            )));
        }

        let mut names = HashSet::new();
        for attr in std::iter::once(&self.key).chain(&self.attributes) {
            if !names.insert(attr.name.as_str()) {
                return Err(CoreError::Validation(format!("duplicate attribute '{}'", attr.name)));
            }
        }

        let mut index_names = HashSet::new();
        for index in &self.indices {
            if !index_names.insert(index.name.as_str()) {
                return Err(CoreError::Validation(format!("duplicate index '{}'", index.name)));
            }
            match self.attribute(&index.attribute) {
                Some((_, attr)) if attr.datatype == Datatype::Document => {}
                Some(_) => {
                    return Err(CoreError::Validation(format!(
                        "index '{}' is on non-document attribute '{}'",
                        index.name, index.attribute
                    )))
                }
                None => {
                    return Err(CoreError::Validation(format!(
                        "index '{}' references unknown attribute '{}'",
                        index.name, index.attribute
                    )))
                }
            }
            DocPath::parse(&index.path)?;
        }

        Ok(())
    }

    /// Hash kinds for every position, key first.
    #[must_use]
    pub fn hash_kinds(&self) -> Vec<HashKind> {
        std::iter::once(&self.key).chain(&self.attributes).map(|a| a.hash).collect()
    }

    /// Look up a value attribute by name, returning its position (1-based).
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<(usize, &AttributeDef)> {
        self.attributes.iter().enumerate().find(|(_, a)| a.name == name).map(|(i, a)| (i + 1, a))
    }

    /// Check a full set of value attributes against their declarations.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ArityMismatch`] for the wrong number of values, or
    /// the first datatype error.
    pub fn check_values<V: AsRef<[u8]>>(&self, values: &[V]) -> Result<(), CoreError> {
        if values.len() != self.attributes.len() {
            return Err(CoreError::ArityMismatch {
                expected: self.attributes.len(),
                actual: values.len(),
            });
        }
        for (attr, value) in self.attributes.iter().zip(values) {
            attr.datatype.check(value.as_ref()).map_err(|e| match e {
                CoreError::Validation(msg) => {
                    CoreError::Validation(format!("attribute '{}': {msg}", attr.name))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}
