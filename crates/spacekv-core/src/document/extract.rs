//! Walking JSON documents along a [`DocPath`].

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::value::RawValue;

use super::{DocPath, ExtractedValue};
use crate::error::CoreError;

/// A JSON string that borrows from the document when it has no escapes.
#[derive(Deserialize)]
struct Text<'a>(#[serde(borrow)] Cow<'a, str>);

fn as_text(document: &[u8]) -> Result<&str, CoreError> {
    std::str::from_utf8(document)
        .map_err(|e| CoreError::malformed_document(document, format!("not UTF-8: {e}")))
}

/// Check that `document` is well-formed JSON.
///
/// # Errors
///
/// Returns [`CoreError::MalformedDocument`] otherwise.
pub fn validate_document(document: &[u8]) -> Result<(), CoreError> {
    let text = as_text(document)?;
    serde_json::from_str::<IgnoredAny>(text)
        .map(|_| ())
        .map_err(|e| CoreError::malformed_document(document, e))
}

/// Extract the value selected by `path` from `document`.
///
/// Returns `Ok(None)` when the value is absent or not indexable: a segment is
/// missing, a container was expected but a scalar was found, an array index is
/// out of range, or the leaf is a boolean, null, object or array.
///
/// # Errors
///
/// Returns [`CoreError::MalformedDocument`] if `document` is not JSON.
pub fn extract<'a>(
    document: &'a [u8],
    path: &DocPath,
) -> Result<Option<ExtractedValue<'a>>, CoreError> {
    validate_document(document)?;
    let text = as_text(document)?;
    let malformed = |e: serde_json::Error| CoreError::malformed_document(document, e);

    let mut current: &'a RawValue = serde_json::from_str(text).map_err(malformed)?;
    for segment in path.segments() {
        let next = match first_byte(current) {
            Some(b'{') => {
                let mut fields: BTreeMap<String, &'a RawValue> =
                    serde_json::from_str(current.get()).map_err(malformed)?;
                fields.remove(segment)
            }
            Some(b'[') => {
                let Ok(index) = segment.parse::<usize>() else {
                    return Ok(None);
                };
                let elements: Vec<&'a RawValue> =
                    serde_json::from_str(current.get()).map_err(malformed)?;
                elements.get(index).copied()
            }
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Ok(None),
        }
    }

    match first_byte(current) {
        Some(b'"') => {
            let Text(text) = serde_json::from_str(current.get()).map_err(malformed)?;
            let bytes = match text {
                Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
                Cow::Owned(s) => Cow::Owned(s.into_bytes()),
            };
            Ok(Some(ExtractedValue::string(bytes)))
        }
        Some(b'-' | b'0'..=b'9') => {
            // JSON number syntax is a subset of what `f64` parses; magnitudes
            // beyond its range become infinities.
            let n: f64 = current
                .get()
                .trim()
                .parse()
                .map_err(|e| CoreError::malformed_document(document, e))?;
            Ok(Some(ExtractedValue::number(n)))
        }
        _ => Ok(None),
    }
}

fn first_byte(value: &RawValue) -> Option<u8> {
    value.get().trim_start().bytes().next()
}
