//! Encoding and decoding traits for serialization.

use crate::CoreError;

/// A trait for types that can be encoded to bytes.
pub trait Encoder: Sized {
    /// Encode this value to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if a component cannot be represented.
    fn encode(&self) -> Result<Vec<u8>, CoreError>;

    /// Encode this value by appending to `buf`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError>;
}

/// A trait for types that can be decoded from bytes.
pub trait Decoder: Sized {
    /// Decode a value from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error on unknown versions, truncated input or trailing bytes.
    fn decode(bytes: &[u8]) -> Result<Self, CoreError>;
}

/// Format version embedded at the start of every encoded record.
pub const FORMAT_VERSION: u8 = 1;
