//! Coordinates in partition space.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A point, or region, in partition space.
///
/// The primary half is derived from the key and the secondary half from the
/// non-key values. A mask bit set to 1 means the corresponding hash bit is
/// significant; hash bits outside the mask are always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coordinate {
    /// Significant bits of the key half.
    pub primary_mask: u32,
    /// Hash bits of the key half.
    pub primary_hash: u32,
    /// Significant bits of the values half.
    pub secondary_mask: u32,
    /// Hash bits of the values half.
    pub secondary_hash: u32,
}

impl Coordinate {
    /// A coordinate that constrains nothing.
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    /// Create a coordinate from its four components.
    #[must_use]
    pub const fn new(
        primary_mask: u32,
        primary_hash: u32,
        secondary_mask: u32,
        secondary_hash: u32,
    ) -> Self {
        Self { primary_mask, primary_hash, secondary_mask, secondary_hash }
    }

    /// Create a coordinate with only the key half set.
    #[must_use]
    pub const fn primary(mask: u32, hash: u32) -> Self {
        Self::new(mask, hash, 0, 0)
    }

    /// Create a coordinate with only the values half set.
    #[must_use]
    pub const fn secondary(mask: u32, hash: u32) -> Self {
        Self::new(0, 0, mask, hash)
    }

    /// Whether neither half constrains anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.primary_mask == 0 && self.secondary_mask == 0
    }

    /// Whether two coordinates can describe the same point.
    ///
    /// True when the hashes agree on every bit that both masks care about.
    #[must_use]
    pub const fn intersects(&self, other: &Self) -> bool {
        let pm = self.primary_mask & other.primary_mask;
        let sm = self.secondary_mask & other.secondary_mask;
        (self.primary_hash & pm) == (other.primary_hash & pm)
            && (self.secondary_hash & sm) == (other.secondary_hash & sm)
    }

    /// Whether every bit this coordinate constrains is matched by `point`.
    #[must_use]
    pub const fn contains(&self, point: &Self) -> bool {
        (point.primary_mask & self.primary_mask) == self.primary_mask
            && (point.secondary_mask & self.secondary_mask) == self.secondary_mask
            && self.intersects(point)
    }
}

impl BitOr for Coordinate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            primary_mask: self.primary_mask | rhs.primary_mask,
            primary_hash: self.primary_hash | rhs.primary_hash,
            secondary_mask: self.secondary_mask | rhs.secondary_mask,
            secondary_hash: self.secondary_hash | rhs.secondary_hash,
        }
    }
}

impl BitOrAssign for Coordinate {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x}/{:08x}:{:08x}/{:08x}",
            self.primary_mask, self.primary_hash, self.secondary_mask, self.secondary_hash
        )
    }
}
