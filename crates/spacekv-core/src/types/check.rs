//! Query predicates over indexed attributes.

use serde::{Deserialize, Serialize};

/// Comparison operator of an [`AttributeCheck`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Predicate {
    /// `value == operand`
    Eq,
    /// `value < operand`
    Lt,
    /// `value <= operand`
    Le,
    /// `value > operand`
    Gt,
    /// `value >= operand`
    Ge,
}

impl Predicate {
    /// The operator as it would appear in a query.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// The value a check compares against.
///
/// The operand's variant decides which typed slice of an index is scanned: a
/// string operand never matches numeric entries and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckOperand {
    /// A numeric operand.
    Number(f64),
    /// A string operand.
    String(String),
}

impl From<f64> for CheckOperand {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for CheckOperand {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for CheckOperand {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for CheckOperand {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// A predicate on one attribute: `(attribute, predicate, operand)`.
///
/// # Example
///
/// ```
/// use spacekv_core::{AttributeCheck, Predicate};
///
/// let check = AttributeCheck::new(1, Predicate::Gt, 3i64);
/// assert_eq!(check.to_string(), "attr[1] > 3");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeCheck {
    /// Position of the attribute in the schema (0 is the key).
    pub attribute: usize,
    /// The comparison operator.
    pub predicate: Predicate,
    /// The value to compare against.
    pub operand: CheckOperand,
}

impl AttributeCheck {
    /// Create a new check.
    #[must_use]
    pub fn new(attribute: usize, predicate: Predicate, operand: impl Into<CheckOperand>) -> Self {
        Self { attribute, predicate, operand: operand.into() }
    }
}

impl std::fmt::Display for AttributeCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "attr[{}] {} ", self.attribute, self.predicate.as_str())?;
        match &self.operand {
            CheckOperand::Number(n) => write!(f, "{n}"),
            CheckOperand::String(s) => write!(f, "{s:?}"),
        }
    }
}
