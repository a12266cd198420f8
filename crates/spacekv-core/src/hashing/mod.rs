//! Coordinate hashing for hash-partitioned placement.
//!
//! A record is located in partition space by a [`Coordinate`]: a primary
//! (mask, hash) pair derived only from the record's key and a secondary pair
//! derived only from its non-key attribute values. The [`Hasher`] is built from
//! one [`HashKind`] per attribute position and combines per-attribute hashes
//! into these halves.
//!
//! # Bit Ownership
//!
//! Each half has 32 hash bits that are shared among the attributes that
//! contribute to it. With `n` contributing attributes, the `j`-th contributor
//! owns the bit positions `p` (counted from the most significant bit) where
//! `p % n == j`, and fills them with the leading bits of its own 64-bit source
//! hash:
//!
//! ```text
//! n = 2:  bit  31 30 29 28 27 26 ...  1  0
//!         owner a  b  a  b  a  b  ...  a  b
//! ```
//!
//! Contributions never overlap, so combining them with a bitwise OR keeps every
//! attribute's bits independent of every other attribute. Attributes whose kind
//! is [`HashKind::None`] take no slot at all and are therefore invisible to the
//! composition.

mod coordinate;
mod hasher;
mod kind;


pub use coordinate::Coordinate;
pub use hasher::Hasher;
pub use kind::HashKind;
