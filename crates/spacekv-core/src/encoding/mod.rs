//! Order-preserving encodings and index key layouts.
//!
//! # Encoding Traits
//!
//! - [`Encoder`] / [`Decoder`] - binary serialization of stored types
//! - [`IndexEncoding`] - pluggable codecs for primary keys inside index entries
//!
//! # Key Encoding
//!
//! The [`keys`] module builds the composite keys of secondary index entries.
//! All numeric components are big-endian and sign-adjusted, and variable-length
//! components are self-delimiting, so lexicographic byte order of a key equals
//! the logical order of its components.

mod index_encoding;
pub mod keys;
pub mod sortable;
mod traits;


pub use index_encoding::{encoding_for, Float64Encoding, IndexEncoding, Int64Encoding, StringEncoding};
pub use traits::{Decoder, Encoder, FORMAT_VERSION};
