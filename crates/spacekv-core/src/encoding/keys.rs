//! Key layout of secondary index entries.
//!
//! # Key Format
//!
//! ```text
//! [region: 8 BE][index: 8 BE][type tag: 1][value][encoded primary key]
//! ```
//!
//! - Number values are the 8-byte order-preserving form of an `f64`
//! - String values are null-escaped and terminated (see [`super::sortable`])
//!
//! Both value forms are self-delimiting, so the encoded primary key is
//! whatever follows the value. Prefixes of the layout are used as scan bounds:
//!
//! | Form | Selects |
//! |------|---------|
//! | [`index_prefix`] | every entry of the index in the region |
//! | [`index_type_prefix`] | entries whose value has one type |
//! | [`index_value_prefix`] | entries with one exact value |
//! | [`index_entry_key`] | one entry |

use super::sortable::{decode_escaped, encode_escaped, fixed8};
use crate::document::TypeTag;
use crate::error::CoreError;
use crate::types::{IndexId, RegionId};

/// Length of the `region | index` prefix.
pub const INDEX_PREFIX_LEN: usize = 16;

/// Length of the `region | index | type tag` prefix.
pub const INDEX_TYPE_PREFIX_LEN: usize = INDEX_PREFIX_LEN + 1;

/// Encode the prefix shared by every entry of an index in a region.
#[must_use]
pub fn index_prefix(region: RegionId, index: IndexId) -> Vec<u8> {
    let mut key = Vec::with_capacity(INDEX_TYPE_PREFIX_LEN);
    key.extend_from_slice(&region.to_be_bytes());
    key.extend_from_slice(&index.to_be_bytes());
    key
}

/// Encode the prefix of entries whose value has type `tag`.
#[must_use]
pub fn index_type_prefix(region: RegionId, index: IndexId, tag: TypeTag) -> Vec<u8> {
    let mut key = index_prefix(region, index);
    key.push(tag.as_byte());
    key
}

/// Append the value component of an index key.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] if a number value is not 8 bytes.
pub fn encode_index_value(tag: TypeTag, value: &[u8], buf: &mut Vec<u8>) -> Result<(), CoreError> {
    match tag {
        TypeTag::Number => buf.extend_from_slice(&fixed8(value)?),
        TypeTag::String => encode_escaped(value, buf),
    }
    Ok(())
}

/// Encode the prefix of entries with exactly this value.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] if a number value is not 8 bytes.
pub fn index_value_prefix(
    region: RegionId,
    index: IndexId,
    tag: TypeTag,
    value: &[u8],
) -> Result<Vec<u8>, CoreError> {
    let mut key = index_type_prefix(region, index, tag);
    encode_index_value(tag, value, &mut key)?;
    Ok(key)
}

/// Encode a fully-qualified index entry key.
///
/// `encoded_key` is the primary key after its [`IndexEncoding`](super::IndexEncoding).
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] if a number value is not 8 bytes.
pub fn index_entry_key(
    region: RegionId,
    index: IndexId,
    tag: TypeTag,
    value: &[u8],
    encoded_key: &[u8],
) -> Result<Vec<u8>, CoreError> {
    let mut key = index_value_prefix(region, index, tag, value)?;
    key.extend_from_slice(encoded_key);
    Ok(key)
}

/// The components of a decoded index entry key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntryKey<'a> {
    /// Owning region.
    pub region: RegionId,
    /// Index definition.
    pub index: IndexId,
    /// Type of the indexed value.
    pub type_tag: TypeTag,
    /// The value component, unescaped.
    pub value: Vec<u8>,
    /// The encoded primary key suffix.
    pub encoded_key: &'a [u8],
}

/// Split an index entry key into its components.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] if the key is truncated, carries an unknown
/// type tag, or its value component is malformed.
pub fn decode_index_entry_key(key: &[u8]) -> Result<IndexEntryKey<'_>, CoreError> {
    if key.len() < INDEX_TYPE_PREFIX_LEN {
        return Err(CoreError::Encoding(format!("index key too short: {} bytes", key.len())));
    }
    let region = RegionId::new(u64::from_be_bytes(fixed8(&key[..8])?));
    let index = IndexId::new(u64::from_be_bytes(fixed8(&key[8..INDEX_PREFIX_LEN])?));
    let tag = key[INDEX_PREFIX_LEN];
    let type_tag = TypeTag::from_byte(tag)
        .ok_or_else(|| CoreError::Encoding(format!("unknown type tag 0x{tag:02x}")))?;

    let rest = &key[INDEX_TYPE_PREFIX_LEN..];
    let (value, consumed) = match type_tag {
        TypeTag::Number => {
            let raw = rest.get(..8).ok_or_else(|| {
                CoreError::Encoding(format!("number value truncated to {} bytes", rest.len()))
            })?;
            (raw.to_vec(), 8)
        }
        TypeTag::String => decode_escaped(rest)?,
    };

    Ok(IndexEntryKey { region, index, type_tag, value, encoded_key: &rest[consumed..] })
}

/// Compute the smallest key greater than every key starting with `prefix`.
///
/// Used as the exclusive upper bound of a prefix scan. Returns `None` when
/// `prefix` is empty or all `0xFF`, in which case the scan has no upper bound.
#[must_use]
pub fn increment_prefix(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}
