//! The stored form of an object.

use crate::encoding::{Decoder, Encoder, FORMAT_VERSION};
use crate::error::CoreError;

/// A key together with its value attributes, as stored in a space.
///
/// # Binary Format
///
/// ```text
/// [version: 1][key_len: u32 BE][key][count: u32 BE]([len: u32 BE][value])*
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The key bytes.
    pub key: Vec<u8>,
    /// Value attribute bytes, in schema order.
    pub values: Vec<Vec<u8>>,
}

impl Record {
    /// Create a new record.
    #[must_use]
    pub fn new(key: impl Into<Vec<u8>>, values: Vec<Vec<u8>>) -> Self {
        Self { key: key.into(), values }
    }

    /// Get the value at a 1-based attribute position.
    #[must_use]
    pub fn value(&self, position: usize) -> Option<&[u8]> {
        position.checked_sub(1).and_then(|i| self.values.get(i)).map(Vec::as_slice)
    }
}

fn put_chunk(buf: &mut Vec<u8>, bytes: &[u8]) -> Result<(), CoreError> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| CoreError::Encoding(format!("chunk of {} bytes too large", bytes.len())))?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

fn take_u32(bytes: &[u8], pos: &mut usize) -> Result<u32, CoreError> {
    let end = *pos + 4;
    let raw = bytes
        .get(*pos..end)
        .ok_or_else(|| CoreError::Encoding("truncated record length".into()))?;
    *pos = end;
    let mut arr = [0u8; 4];
    arr.copy_from_slice(raw);
    Ok(u32::from_be_bytes(arr))
}

fn take_chunk(bytes: &[u8], pos: &mut usize) -> Result<Vec<u8>, CoreError> {
    let len = take_u32(bytes, pos)? as usize;
    let end = *pos + len;
    let raw = bytes
        .get(*pos..end)
        .ok_or_else(|| CoreError::Encoding("truncated record data".into()))?;
    *pos = end;
    Ok(raw.to_vec())
}

impl Encoder for Record {
    fn encode(&self) -> Result<Vec<u8>, CoreError> {
        let size = 1 + 8 + self.key.len() + self.values.iter().map(|v| v.len() + 4).sum::<usize>();
        let mut buf = Vec::with_capacity(size);
        self.encode_to(&mut buf)?;
        Ok(buf)
    }

    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError> {
        buf.push(FORMAT_VERSION);
        put_chunk(buf, &self.key)?;
        let count = u32::try_from(self.values.len())
            .map_err(|_| CoreError::Encoding("too many values".into()))?;
        buf.extend_from_slice(&count.to_be_bytes());
        for value in &self.values {
            put_chunk(buf, value)?;
        }
        Ok(())
    }
}

impl Decoder for Record {
    fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        match bytes.first() {
            Some(&FORMAT_VERSION) => {}
            Some(v) => return Err(CoreError::Encoding(format!("unsupported record version {v}"))),
            None => return Err(CoreError::Encoding("empty record".into())),
        }
        let mut pos = 1;
        let key = take_chunk(bytes, &mut pos)?;
        let count = take_u32(bytes, &mut pos)? as usize;
        // Every value needs at least its length prefix.
        if count > (bytes.len() - pos) / 4 {
            return Err(CoreError::Encoding(format!("record claims {count} values")));
        }
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(take_chunk(bytes, &mut pos)?);
        }
        if pos != bytes.len() {
            return Err(CoreError::Encoding(format!(
                "{} trailing bytes after record",
                bytes.len() - pos
            )));
        }
        Ok(Self { key, values })
    }
}
