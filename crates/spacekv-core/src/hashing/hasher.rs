//! The coordinate hasher.

use super::{Coordinate, HashKind};
use crate::error::CoreError;

/// Maps keys and attribute values onto [`Coordinate`]s.
///
/// Built from one [`HashKind`] per attribute position: position 0 is the key,
/// positions `1..N` are the value attributes in declaration order. The
/// configuration is fixed for the hasher's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hasher {
    kinds: Vec<HashKind>,
    /// Slot of each value attribute among the contributing value attributes.
    value_slots: Vec<Option<usize>>,
    contributing_values: usize,
}

impl Hasher {
    /// Create a hasher for the given per-position hash kinds.
    ///
    /// # Errors
    ///
    /// Returns an error if `kinds` is empty, since position 0 (the key) is
    /// required.
    pub fn new(kinds: Vec<HashKind>) -> Result<Self, CoreError> {
        if kinds.is_empty() {
            return Err(CoreError::Validation(
                "hasher requires at least the key attribute".to_owned(),
            ));
        }

        let mut contributing_values = 0;
        let value_slots = kinds[1..]
            .iter()
            .map(|kind| {
                kind.contributes().then(|| {
                    let slot = contributing_values;
                    contributing_values += 1;
                    slot
                })
            })
            .collect();

        Ok(Self { kinds, value_slots, contributing_values })
    }

    /// The per-position hash kinds, key first.
    #[must_use]
    pub fn kinds(&self) -> &[HashKind] {
        &self.kinds
    }

    /// The number of value attributes `hash_values` expects.
    #[must_use]
    pub fn value_arity(&self) -> usize {
        self.kinds.len() - 1
    }

    /// Compute the key half of a coordinate. The values half is zero.
    #[must_use]
    pub fn hash_key(&self, key: &[u8]) -> Coordinate {
        let (mask, hash) = self.kinds[0].contribution(key, 0, 1);
        Coordinate::primary(mask, hash)
    }

    /// Compute the values half of a coordinate. The key half is zero.
    ///
    /// Attributes of kind [`HashKind::None`] are skipped entirely.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ArityMismatch`] if the number of values differs
    /// from the number of configured value attributes.
    pub fn hash_values<V: AsRef<[u8]>>(&self, values: &[V]) -> Result<Coordinate, CoreError> {
        if values.len() != self.value_arity() {
            return Err(CoreError::ArityMismatch {
                expected: self.value_arity(),
                actual: values.len(),
            });
        }

        let mut mask = 0;
        let mut hash = 0;
        for ((kind, slot), value) in self.kinds[1..].iter().zip(&self.value_slots).zip(values) {
            if let Some(slot) = slot {
                let (m, h) = kind.contribution(value.as_ref(), *slot, self.contributing_values);
                mask |= m;
                hash |= h;
            }
        }
        Ok(Coordinate::secondary(mask, hash))
    }

    /// Compute both halves: the union of [`hash_key`](Self::hash_key) and
    /// [`hash_values`](Self::hash_values).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ArityMismatch`] under the same conditions as
    /// `hash_values`.
    pub fn hash<V: AsRef<[u8]>>(&self, key: &[u8], values: &[V]) -> Result<Coordinate, CoreError> {
        Ok(self.hash_key(key) | self.hash_values(values)?)
    }
}
