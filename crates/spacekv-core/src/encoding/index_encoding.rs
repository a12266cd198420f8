//! Pluggable codecs for primary keys stored inside index entries.
//!
//! An index entry carries the primary key of the record it points at. The key
//! is stored through an [`IndexEncoding`] chosen by the key's [`Datatype`], so
//! that entries sharing a value sort by key in the key's logical order.

use std::fmt;

use super::sortable::{decode_f64, decode_i64, encode_f64, encode_i64, fixed8};
use crate::error::CoreError;
use crate::types::Datatype;

/// A codec whose encoded byte order matches the logical order of the values.
///
/// Values are given in their attribute byte form (UTF-8 for strings, 8-byte
/// little-endian for numbers).
pub trait IndexEncoding: fmt::Debug + Send + Sync {
    /// The datatype this codec handles.
    fn datatype(&self) -> Datatype;

    /// Encode attribute bytes into ordered bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] if `value` is not a valid value of the
    /// codec's datatype.
    fn encode(&self, value: &[u8]) -> Result<Vec<u8>, CoreError>;

    /// Decode ordered bytes back into attribute bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] if `encoded` was not produced by this codec.
    fn decode(&self, encoded: &[u8]) -> Result<Vec<u8>, CoreError>;
}

/// Identity codec for strings: byte order already equals string order.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringEncoding;

impl IndexEncoding for StringEncoding {
    fn datatype(&self) -> Datatype {
        Datatype::String
    }

    fn encode(&self, value: &[u8]) -> Result<Vec<u8>, CoreError> {
        Ok(value.to_vec())
    }

    fn decode(&self, encoded: &[u8]) -> Result<Vec<u8>, CoreError> {
        Ok(encoded.to_vec())
    }
}

/// Little-endian `i64` to big-endian sign-flipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Int64Encoding;

impl IndexEncoding for Int64Encoding {
    fn datatype(&self) -> Datatype {
        Datatype::Int64
    }

    fn encode(&self, value: &[u8]) -> Result<Vec<u8>, CoreError> {
        Ok(encode_i64(i64::from_le_bytes(fixed8(value)?)).to_vec())
    }

    fn decode(&self, encoded: &[u8]) -> Result<Vec<u8>, CoreError> {
        Ok(decode_i64(fixed8(encoded)?).to_le_bytes().to_vec())
    }
}

/// Little-endian `f64` to the order-preserving float transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct Float64Encoding;

impl IndexEncoding for Float64Encoding {
    fn datatype(&self) -> Datatype {
        Datatype::Float64
    }

    fn encode(&self, value: &[u8]) -> Result<Vec<u8>, CoreError> {
        Ok(encode_f64(f64::from_le_bytes(fixed8(value)?)).to_vec())
    }

    fn decode(&self, encoded: &[u8]) -> Result<Vec<u8>, CoreError> {
        Ok(decode_f64(fixed8(encoded)?).to_le_bytes().to_vec())
    }
}

/// Select the codec for a key datatype.
///
/// # Errors
///
/// Returns [`CoreError::Validation`] for datatypes that cannot be keys.
pub fn encoding_for(datatype: Datatype) -> Result<&'static dyn IndexEncoding, CoreError> {
    match datatype {
        Datatype::String => Ok(&StringEncoding),
        Datatype::Int64 => Ok(&Int64Encoding),
        Datatype::Float64 => Ok(&Float64Encoding),
        Datatype::Document => Err(CoreError::Validation(
            "documents have no index key encoding".to_owned(),
        )),
    }
}
