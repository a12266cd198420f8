//! Document path selectors.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A path selecting one value inside a document.
///
/// Segments are separated by dots. A segment selects a field of an object, or,
/// when it is a non-negative integer, an element of an array. Array indices
/// may also be written in brackets: `a.list[2].c` is the same path as
/// `a.list.2.c`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath {
    segments: Vec<String>,
}

impl DocPath {
    /// Parse a path.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPath`] for empty paths, empty segments and
    /// malformed brackets.
    pub fn parse(path: &str) -> Result<Self, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidPath(format!("'{path}': {reason}"));

        if path.is_empty() {
            return Err(invalid("path is empty"));
        }

        let mut segments = Vec::new();
        for part in path.split('.') {
            let (name, mut brackets) = match part.find('[') {
                Some(at) => part.split_at(at),
                None => (part, ""),
            };
            if name.contains(']') {
                return Err(invalid("unbalanced ']'"));
            }
            if name.is_empty() && brackets.is_empty() {
                return Err(invalid("empty segment"));
            }
            if !name.is_empty() {
                segments.push(name.to_owned());
            }
            while !brackets.is_empty() {
                let close = brackets.find(']').ok_or_else(|| invalid("unclosed '['"))?;
                let index = &brackets[1..close];
                if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid("bracket must hold an array index"));
                }
                segments.push(index.to_owned());
                brackets = &brackets[close + 1..];
                if !brackets.is_empty() && !brackets.starts_with('[') {
                    return Err(invalid("unexpected text after ']'"));
                }
            }
        }

        Ok(Self { segments })
    }

    /// The path's segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl FromStr for DocPath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}
