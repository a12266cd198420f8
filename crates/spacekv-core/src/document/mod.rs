//! Document paths and extraction of indexable values.
//!
//! Documents are JSON. An index selects one scalar inside each document with a
//! [`DocPath`]; [`extract`] walks the document along the path and returns the
//! scalar in its index form:
//!
//! | JSON leaf | [`TypeTag`] | Bytes |
//! |-----------|-------------|-------|
//! | string | `String` | UTF-8, borrowed from the document when unescaped |
//! | number | `Number` | 8-byte order-preserving `f64` |
//! | anything else | - | not indexable |
//!
//! # Example
//!
//! ```
//! use spacekv_core::document::{extract, DocPath, TypeTag};
//!
//! let path = DocPath::parse("a.list[1]").unwrap();
//! let value = extract(br#"{"a":{"list":["x","y"]}}"#, &path).unwrap().unwrap();
//! assert_eq!(value.type_tag, TypeTag::String);
//! assert_eq!(value.as_bytes(), b"y");
//! assert!(value.is_borrowed());
//! ```

mod extract;
mod path;

use std::borrow::Cow;

pub use extract::{extract, validate_document};
pub use path::DocPath;

use crate::encoding::sortable::encode_f64;
use crate::types::CheckOperand;

/// The inferred type of an indexed value.
///
/// The tag is part of every index key, so values of different types occupy
/// disjoint key ranges. Numbers sort before strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    /// A JSON number, stored as an order-preserving `f64`.
    Number,
    /// A JSON string, stored as UTF-8.
    String,
}

impl TypeTag {
    /// The byte written into index keys.
    #[inline]
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Number => 0x01,
            Self::String => 0x02,
        }
    }

    /// Parse a key byte.
    #[inline]
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::Number),
            0x02 => Some(Self::String),
            _ => None,
        }
    }
}

/// A typed scalar in its index form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedValue<'a> {
    /// The value's type.
    pub type_tag: TypeTag,
    /// The value bytes; borrowed from the source when no re-encoding was needed.
    pub bytes: Cow<'a, [u8]>,
}

impl<'a> ExtractedValue<'a> {
    /// A string value.
    #[must_use]
    pub fn string(bytes: impl Into<Cow<'a, [u8]>>) -> Self {
        Self { type_tag: TypeTag::String, bytes: bytes.into() }
    }

    /// A number value.
    ///
    /// `-0.0` is stored as `0.0` so that equal numbers share one encoding.
    #[must_use]
    pub fn number(n: f64) -> Self {
        let n = if n == 0.0 { 0.0 } else { n };
        Self { type_tag: TypeTag::Number, bytes: Cow::Owned(encode_f64(n).to_vec()) }
    }

    /// The index form of a check operand.
    #[must_use]
    pub fn from_operand(operand: &'a CheckOperand) -> Self {
        match operand {
            CheckOperand::Number(n) => Self::number(*n),
            CheckOperand::String(s) => Self::string(s.as_bytes()),
        }
    }

    /// The value bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether the bytes reference the source without copying.
    #[must_use]
    pub fn is_borrowed(&self) -> bool {
        matches!(self.bytes, Cow::Borrowed(_))
    }

    /// Detach from the source.
    #[must_use]
    pub fn into_owned(self) -> ExtractedValue<'static> {
        ExtractedValue { type_tag: self.type_tag, bytes: Cow::Owned(self.bytes.into_owned()) }
    }
}
