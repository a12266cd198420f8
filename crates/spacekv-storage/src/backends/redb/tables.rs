//! Redb table definitions and key encoding utilities.
//!
//! Redb requires static table definitions, so dynamic "logical" tables are
//! stored in one physical table with the table name prefixed to each key:
//!
//! ```text
//! <table name><0x00><key>
//! ```
//!
//! Table names never contain `0x00`, so every logical table occupies one
//! contiguous physical key range and keys keep their order within it.

use redb::TableDefinition;

/// The physical table that stores all key-value pairs.
pub const DATA_TABLE: TableDefinition<'static, &[u8], &[u8]> = TableDefinition::new("spacekv_data");

/// Separator byte between table name and key in the encoded key.
pub const KEY_SEPARATOR: u8 = 0x00;

/// Encode a logical table name and key into a physical key.
#[must_use]
pub fn encode_key(table: &str, key: &[u8]) -> Vec<u8> {
    let mut encoded = table_start_key(table);
    encoded.extend_from_slice(key);
    encoded
}

/// Decode a physical key into its logical table name and original key.
///
/// Returns `None` if the key is malformed (missing separator).
#[must_use]
pub fn decode_key(encoded: &[u8]) -> Option<(&str, &[u8])> {
    let sep_pos = encoded.iter().position(|&b| b == KEY_SEPARATOR)?;
    let table = std::str::from_utf8(&encoded[..sep_pos]).ok()?;
    Some((table, &encoded[sep_pos + 1..]))
}

/// The smallest physical key of a logical table.
#[must_use]
pub fn table_start_key(table: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(table.len() + 1);
    key.extend_from_slice(table.as_bytes());
    key.push(KEY_SEPARATOR);
    key
}

/// The first physical key past a logical table.
#[must_use]
pub fn table_end_key(table: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(table.len() + 1);
    key.extend_from_slice(table.as_bytes());
    key.push(KEY_SEPARATOR + 1);
    key
}
