//! Property type tags
//!
//! This module defines:
//! - ValueKind: the fixed set of value kinds a property can declare
//! - TypeTag: a kind plus an array flag, with its wire token
//!
//! A property declares exactly one tag. Array properties share one tag for
//! all of their elements; element order is significant and preserved.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of value kinds a property can declare.
///
/// Every kind except `Binary` is rendered through its store-coerced string
/// form. `Binary` values are byte streams and are rendered base64-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Long,
    /// 64-bit floating point
    Double,
    /// Boolean
    Boolean,
    /// Calendar date, carried in its string form
    Date,
    /// Arbitrary-precision decimal, carried in its string form
    Decimal,
    /// Byte stream of finite but unspecified length
    Binary,
}

/// Type discriminator for a property: a [`ValueKind`] plus an array flag.
///
/// The wire token is the upper-case kind name, pluralized for arrays:
/// `STRING` / `STRINGS`, `BINARY` / `BINARIES`, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeTag {
    kind: ValueKind,
    array: bool,
}

impl TypeTag {
    /// Tag for a scalar property of the given kind.
    pub const fn scalar(kind: ValueKind) -> Self {
        TypeTag { kind, array: false }
    }

    /// Tag for an array property of the given kind.
    pub const fn array(kind: ValueKind) -> Self {
        TypeTag { kind, array: true }
    }

    /// The value kind shared by every element of the property.
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Whether the property holds an ordered list of values.
    pub const fn is_array(&self) -> bool {
        self.array
    }

    /// Whether values of this tag are byte streams rather than strings.
    pub const fn is_binary(&self) -> bool {
        matches!(self.kind, ValueKind::Binary)
    }

    /// The token emitted on the wire for this tag.
    pub const fn token(&self) -> &'static str {
        match (self.kind, self.array) {
            (ValueKind::String, false) => "STRING",
            (ValueKind::String, true) => "STRINGS",
            (ValueKind::Long, false) => "LONG",
            (ValueKind::Long, true) => "LONGS",
            (ValueKind::Double, false) => "DOUBLE",
            (ValueKind::Double, true) => "DOUBLES",
            (ValueKind::Boolean, false) => "BOOLEAN",
            (ValueKind::Boolean, true) => "BOOLEANS",
            (ValueKind::Date, false) => "DATE",
            (ValueKind::Date, true) => "DATES",
            (ValueKind::Decimal, false) => "DECIMAL",
            (ValueKind::Decimal, true) => "DECIMALS",
            (ValueKind::Binary, false) => "BINARY",
            (ValueKind::Binary, true) => "BINARIES",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
