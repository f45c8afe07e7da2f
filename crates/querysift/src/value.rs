//! Runtime value types for clause comparison.
//!
//! [`Scalar`] owns a decoded literal value, [`ScalarRef`] borrows a value out
//! of a record, and [`FieldValue`] is what a record accessor returns for one
//! property. Both scalar types carry the same variants, so a literal and a
//! record value are always compared variant against variant.

use std::cmp::Ordering;
use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, TimeDelta};
use uuid::Uuid;

/// Primitive family of a property or collection element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Decimal,
    String,
    DateTime,
    Duration,
    Uuid,
}

impl ScalarKind {
    /// Returns `true` if values of this kind support `lt`, `lte`, `gt`, `gte`.
    ///
    /// Numbers, date/times and durations are orderable. Strings, booleans,
    /// characters and identifiers are not.
    pub fn is_orderable(self) -> bool {
        !matches!(
            self,
            ScalarKind::Bool | ScalarKind::Char | ScalarKind::String | ScalarKind::Uuid
        )
    }

    /// Returns the display name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Char => "char",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Decimal => "decimal",
            ScalarKind::String => "string",
            ScalarKind::DateTime => "date/time",
            ScalarKind::Duration => "duration",
            ScalarKind::Uuid => "uuid",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owned, decoded literal value.
///
/// Integers keep their declared width at decode time (range checked) and are
/// widened to 64 bits for storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Char(char),
    Int(i64),
    UInt(u64),
    F32(f32),
    F64(f64),
    Decimal(BigDecimal),
    String(String),
    DateTime(DateTime<FixedOffset>),
    Duration(TimeDelta),
    Uuid(Uuid),
}

impl Scalar {
    /// Borrows this value for comparison against record values.
    pub fn as_ref(&self) -> ScalarRef<'_> {
        match self {
            Scalar::Bool(b) => ScalarRef::Bool(*b),
            Scalar::Char(c) => ScalarRef::Char(*c),
            Scalar::Int(n) => ScalarRef::Int(*n),
            Scalar::UInt(n) => ScalarRef::UInt(*n),
            Scalar::F32(n) => ScalarRef::F32(*n),
            Scalar::F64(n) => ScalarRef::F64(*n),
            Scalar::Decimal(d) => ScalarRef::Decimal(d),
            Scalar::String(s) => ScalarRef::String(s),
            Scalar::DateTime(t) => ScalarRef::DateTime(*t),
            Scalar::Duration(d) => ScalarRef::Duration(*d),
            Scalar::Uuid(u) => ScalarRef::Uuid(*u),
        }
    }
}

/// Scalar value borrowed from a record.
///
/// Date/times are normalized to [`DateTime<FixedOffset>`]; equality and
/// ordering compare instants, so `10:00Z` equals `12:00+02:00`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarRef<'a> {
    Bool(bool),
    Char(char),
    Int(i64),
    UInt(u64),
    F32(f32),
    F64(f64),
    Decimal(&'a BigDecimal),
    String(&'a str),
    DateTime(DateTime<FixedOffset>),
    Duration(TimeDelta),
    Uuid(Uuid),
}

impl<'a> ScalarRef<'a> {
    /// Compares two values of the same variant.
    ///
    /// Returns `None` for mismatched variants and for comparisons involving
    /// a floating point NaN.
    pub fn compare(&self, other: &ScalarRef<'_>) -> Option<Ordering> {
        match (self, other) {
            (ScalarRef::Bool(a), ScalarRef::Bool(b)) => Some(a.cmp(b)),
            (ScalarRef::Char(a), ScalarRef::Char(b)) => Some(a.cmp(b)),
            (ScalarRef::Int(a), ScalarRef::Int(b)) => Some(a.cmp(b)),
            (ScalarRef::UInt(a), ScalarRef::UInt(b)) => Some(a.cmp(b)),
            (ScalarRef::F32(a), ScalarRef::F32(b)) => a.partial_cmp(b),
            (ScalarRef::F64(a), ScalarRef::F64(b)) => a.partial_cmp(b),
            (ScalarRef::Decimal(a), ScalarRef::Decimal(b)) => Some(a.cmp(b)),
            (ScalarRef::String(a), ScalarRef::String(b)) => Some(a.cmp(b)),
            (ScalarRef::DateTime(a), ScalarRef::DateTime(b)) => Some(a.cmp(b)),
            (ScalarRef::Duration(a), ScalarRef::Duration(b)) => Some(a.cmp(b)),
            (ScalarRef::Uuid(a), ScalarRef::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Equality under the rules of [`compare`](Self::compare).
    pub fn equals(&self, other: &ScalarRef<'_>) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            ScalarRef::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Compares two optional values, treating two absent values as equal.
pub(crate) fn optional_equals(a: Option<&ScalarRef<'_>>, b: Option<&ScalarRef<'_>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.equals(b),
        _ => false,
    }
}

/// Value of one record property, as returned by a property accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    /// Unset nullable scalar.
    Null,
    /// Set scalar.
    Scalar(ScalarRef<'a>),
    /// Elements of an array or collection, in iteration order.
    Sequence(Vec<Option<ScalarRef<'a>>>),
}

impl<'a> FieldValue<'a> {
    /// Returns `true` if this is [`FieldValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Returns the scalar, or `None` when the value is null or a sequence.
    pub fn as_scalar(&self) -> Option<ScalarRef<'a>> {
        match self {
            FieldValue::Scalar(s) => Some(*s),
            _ => None,
        }
    }

    /// Returns the sequence elements, if this is a sequence.
    pub fn as_sequence(&self) -> Option<&[Option<ScalarRef<'a>>]> {
        match self {
            FieldValue::Sequence(items) => Some(items),
            _ => None,
        }
    }
}
