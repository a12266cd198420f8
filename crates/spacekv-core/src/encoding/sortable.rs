//! Sort-order preserving primitives.
//!
//! ## Integer Encoding
//!
//! XOR with `0x8000_0000_0000_0000` flips the sign bit so negative numbers sort
//! before positive ones; the result is stored big-endian.
//!
//! ## Float Encoding
//!
//! - Positive floats: flip the sign bit
//! - Negative floats: flip all bits
//! - NaN sorts after every other value
//!
//! ## Escaped Bytes
//!
//! Variable-length data is null-terminated with an escape:
//! - `0x00` in the data becomes `0x00 0x01`
//! - The sequence ends with `0x00 0x00`
//!
//! This keeps `"a" < "aa" < "ab" < "b"` after encoding, and makes the encoded
//! data self-delimiting so further components can follow it.

use crate::error::CoreError;

/// Constant for flipping the sign bit of signed integers.
const SIGN_FLIP_I64: u64 = 0x8000_0000_0000_0000;

/// Escape byte: a 0x00 in the data is written as 0x00 0x01.
const ESCAPE_BYTE: u8 = 0x01;
/// Terminator: the end of escaped data is marked by 0x00 0x00.
const TERMINATOR: u8 = 0x00;

/// Encode an `i64` so byte order matches numeric order.
#[inline]
#[must_use]
pub const fn encode_i64(value: i64) -> [u8; 8] {
    ((value as u64) ^ SIGN_FLIP_I64).to_be_bytes()
}

/// Decode an integer produced by [`encode_i64`].
#[inline]
#[must_use]
pub const fn decode_i64(bytes: [u8; 8]) -> i64 {
    (u64::from_be_bytes(bytes) ^ SIGN_FLIP_I64) as i64
}

/// Encode an `f64` so byte order matches numeric order.
///
/// `-0.0` sorts immediately before `+0.0`; every NaN encodes as the maximum.
#[must_use]
pub fn encode_f64(value: f64) -> [u8; 8] {
    let bits = value.to_bits();
    let encoded = if value.is_nan() {
        u64::MAX
    } else if bits & SIGN_FLIP_I64 == 0 {
        bits ^ SIGN_FLIP_I64
    } else {
        !bits
    };
    encoded.to_be_bytes()
}

/// Decode a float produced by [`encode_f64`].
#[must_use]
pub fn decode_f64(bytes: [u8; 8]) -> f64 {
    let encoded = u64::from_be_bytes(bytes);
    if encoded == u64::MAX {
        return f64::NAN;
    }
    let bits = if encoded & SIGN_FLIP_I64 != 0 { encoded ^ SIGN_FLIP_I64 } else { !encoded };
    f64::from_bits(bits)
}

/// Read exactly eight bytes as an array.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] if `bytes` is not eight bytes long.
pub fn fixed8(bytes: &[u8]) -> Result<[u8; 8], CoreError> {
    bytes
        .try_into()
        .map_err(|_| CoreError::Encoding(format!("expected 8 bytes, got {}", bytes.len())))
}

/// Append `data` with null-escape encoding.
pub fn encode_escaped(data: &[u8], buf: &mut Vec<u8>) {
    buf.reserve(data.len() + 2);
    for &byte in data {
        if byte == 0x00 {
            buf.push(0x00);
            buf.push(ESCAPE_BYTE);
        } else {
            buf.push(byte);
        }
    }
    buf.push(0x00);
    buf.push(TERMINATOR);
}

/// Decode null-escaped data from the front of `data`.
///
/// Returns the decoded bytes and the number of input bytes consumed,
/// terminator included.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] on an invalid escape or a missing
/// terminator.
pub fn decode_escaped(data: &[u8]) -> Result<(Vec<u8>, usize), CoreError> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < data.len() {
        if data[i] == 0x00 {
            match data.get(i + 1) {
                Some(&TERMINATOR) => return Ok((result, i + 2)),
                Some(&ESCAPE_BYTE) => {
                    result.push(0x00);
                    i += 2;
                }
                Some(other) => {
                    return Err(CoreError::Encoding(format!(
                        "invalid escape sequence: 0x00 0x{other:02x}"
                    )));
                }
                None => {
                    return Err(CoreError::Encoding("unexpected end of escaped bytes".into()));
                }
            }
        } else {
            result.push(data[i]);
            i += 1;
        }
    }

    Err(CoreError::Encoding("missing terminator in escaped bytes".into()))
}
