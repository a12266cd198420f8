//! Per-attribute hash kinds and their hash primitives.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

/// Constant for flipping the sign bit of a signed 64-bit integer.
const SIGN_FLIP_I64: u64 = 0x8000_0000_0000_0000;

/// How an attribute position participates in partitioning.
///
/// `Equality` and `Range` both require a full 32-bit match on their half of
/// the coordinate, but derive their bits differently: `Equality` scatters the
/// bytes through a general-purpose hash, while `Range` keeps the most
/// significant bits of the attribute's integer value so nearby values land in
/// nearby partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashKind {
    /// The attribute does not participate in partitioning.
    #[default]
    None,
    /// Full-width hash usable only for exact-match routing.
    Equality,
    /// Full-width order-sensitive hash enabling range-aware partitioning.
    Range,
}

impl HashKind {
    /// Whether attributes of this kind contribute to a coordinate.
    #[inline]
    #[must_use]
    pub const fn contributes(self) -> bool {
        !matches!(self, Self::None)
    }

    /// The mask this kind sets on its half of a coordinate.
    #[inline]
    #[must_use]
    pub const fn mask(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Equality | Self::Range => u32::MAX,
        }
    }

    /// Compute the 64-bit source hash of an attribute value.
    ///
    /// Returns `None` for [`HashKind::None`].
    #[must_use]
    pub fn source_hash(self, bytes: &[u8]) -> Option<u64> {
        match self {
            Self::None => None,
            Self::Equality => Some(xxh3_64(bytes)),
            Self::Range => Some(range_source(bytes)),
        }
    }

    /// Compute this attribute's contribution to a coordinate half.
    ///
    /// `slot` is the attribute's index among the `slots` contributing
    /// attributes of the half. Returns `(mask, hash)`; kinds that do not
    /// contribute yield `(0, 0)`.
    #[must_use]
    pub fn contribution(self, bytes: &[u8], slot: usize, slots: usize) -> (u32, u32) {
        match self.source_hash(bytes) {
            Some(source) => (self.mask(), spread(source, slot, slots)),
            None => (0, 0),
        }
    }
}

/// Order-preserving source for range attributes.
///
/// The value is read as a little-endian `i64`, zero-padded when shorter than
/// eight bytes, and sign-flipped so that unsigned comparison of the result
/// matches signed comparison of the value.
fn range_source(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    let len = bytes.len().min(8);
    buf[..len].copy_from_slice(&bytes[..len]);
    u64::from_le_bytes(buf) ^ SIGN_FLIP_I64
}

/// Place the leading bits of `source` into the bit positions owned by `slot`.
///
/// Positions are counted from the most significant bit; `slot` owns every
/// position `p` with `p % slots == slot`. Slots past the 32nd own nothing.
fn spread(source: u64, slot: usize, slots: usize) -> u32 {
    debug_assert!(slot < slots);
    let mut out = 0u32;
    let mut src_bit = 63u32;
    let mut pos = slot;
    while pos < 32 {
        if (source >> src_bit) & 1 == 1 {
            out |= 1 << (31 - pos);
        }
        src_bit -= 1;
        pos += slots;
    }
    out
}
