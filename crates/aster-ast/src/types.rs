//! Source-level types
//!
//! Only the types the statement analyzer needs: loop and branch conditions
//! must be `Boolean`, switch conditions and case labels must be `Int`, and
//! catch parameters carry a named reference type.

use std::fmt;

/// A source-level type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Boolean,
    /// A reference type; used for exception classes.
    Object(String),
    /// Recovery type produced after a reported error. Matches anything so a
    /// single bad expression does not cascade into follow-on diagnostics.
    Any,
}

impl Type {
    pub fn object(name: impl Into<String>) -> Type {
        Type::Object(name.into())
    }

    /// Structural match used by the analyzer's type checks. `Any` on either
    /// side matches.
    pub fn matches(&self, other: &Type) -> bool {
        matches!(self, Type::Any) || matches!(other, Type::Any) || self == other
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "Int"),
            Type::Boolean => write!(f, "Boolean"),
            Type::Object(name) => write!(f, "{}", name),
            Type::Any => write!(f, "Any"),
        }
    }
}
