//! Type coercion.
//!
//! Given a clause and the declared type of its property, this module picks
//! the comparison path and decodes the literal into typed values.
//!
//! | property | literal | path | operators |
//! |----------|---------|------|-----------|
//! | scalar or nullable | scalar | [`Path::Direct`] | `eq ne lt lte gt gte sw ew` |
//! | scalar or nullable | list | [`Path::OneOf`] | `cov` |
//! | array or collection | scalar | [`Path::Contains`] | `ct` |
//! | array or collection | list | [`Path::SequenceEquals`] | `eq ne` |
//!
//! Every other combination is rejected as an unsupported operator.
//! [`comparison`] runs all of these checks and yields a [`Comparison`] that
//! the predicate builder evaluates without further validation.

use crate::clause::{Atom, Clause, RawLiteral};
use crate::error::{QueryError, Result};
use crate::literal;
use crate::op::{ComparisonOp, OrderingOp};
use crate::record::TypeDescriptor;
use crate::value::{Scalar, ScalarKind};

/// Comparison path chosen from the property shape and literal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Path {
    /// Scalar property against one value.
    Direct,
    /// Scalar property is a member of a literal list.
    OneOf,
    /// Sequence property holds one literal value.
    Contains,
    /// Sequence property equals a literal list element by element.
    SequenceEquals,
}

/// Decoded literal of one clause.
#[derive(Debug, Clone, PartialEq)]
pub enum CoercedValue {
    /// One value; `None` is the null sentinel.
    Single(Option<Scalar>),
    /// Ordered list values; `None` elements are null sentinels.
    Many(Vec<Option<Scalar>>),
}

/// A clause checked against its property type, with its literal decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    /// `eq` or `ne` on a scalar; `None` is null.
    Equals { expected: Option<Scalar>, negate: bool },
    /// `lt`, `lte`, `gt` or `gte` against a non-null bound.
    Order { op: OrderingOp, bound: Scalar },
    /// `sw` or `ew` on a string.
    Edge { text: String, starts: bool },
    /// `cov`: the scalar value is one of the candidates.
    OneOf(Vec<Option<Scalar>>),
    /// `ct`: the sequence holds the needle.
    Contains(Option<Scalar>),
    /// `eq` or `ne` on a sequence, element by element.
    SequenceEquals {
        expected: Vec<Option<Scalar>>,
        negate: bool,
    },
}

impl Comparison {
    pub fn path(&self) -> Path {
        match self {
            Comparison::Equals { .. } | Comparison::Order { .. } | Comparison::Edge { .. } => {
                Path::Direct
            }
            Comparison::OneOf(_) => Path::OneOf,
            Comparison::Contains(_) => Path::Contains,
            Comparison::SequenceEquals { .. } => Path::SequenceEquals,
        }
    }
}

/// Validates a clause against its property type and decodes its literal.
///
/// Sentinel misuse is reported first, then operator validity, then literal
/// decoding.
pub fn comparison(clause: &Clause, descriptor: TypeDescriptor) -> Result<Comparison> {
    reject_null(clause, descriptor)?;
    let op = clause.op();
    match resolve_path(clause, descriptor)? {
        Path::Direct => direct(clause, single(clause, descriptor)?),
        Path::Contains => single(clause, descriptor).map(Comparison::Contains),
        Path::OneOf => many(clause, descriptor).map(Comparison::OneOf),
        Path::SequenceEquals => many(clause, descriptor).map(|expected| {
            Comparison::SequenceEquals {
                expected,
                negate: op == ComparisonOp::Ne,
            }
        }),
    }
}

fn single(clause: &Clause, descriptor: TypeDescriptor) -> Result<Option<Scalar>> {
    match clause.literal() {
        RawLiteral::Scalar(atom) => coerce_atom(clause, descriptor, atom),
        RawLiteral::List(_) => Err(unsupported(clause, "expected a single value, found a list")),
    }
}

fn many(clause: &Clause, descriptor: TypeDescriptor) -> Result<Vec<Option<Scalar>>> {
    match clause.literal() {
        RawLiteral::List(atoms) => atoms
            .iter()
            .map(|atom| coerce_atom(clause, descriptor, atom))
            .collect(),
        RawLiteral::Scalar(_) => Err(unsupported(clause, "expected a list, found a single value")),
    }
}

fn direct(clause: &Clause, value: Option<Scalar>) -> Result<Comparison> {
    let op = clause.op();
    if let Some(ordering) = op.as_ordering() {
        return match value {
            Some(bound) => Ok(Comparison::Order { op: ordering, bound }),
            None => Err(unsupported(clause, "cannot order against null")),
        };
    }
    match (op, value) {
        (ComparisonOp::Eq | ComparisonOp::Ne, expected) => Ok(Comparison::Equals {
            expected,
            negate: op == ComparisonOp::Ne,
        }),
        (ComparisonOp::StartsWith | ComparisonOp::EndsWith, Some(Scalar::String(text))) => {
            Ok(Comparison::Edge {
                text,
                starts: op == ComparisonOp::StartsWith,
            })
        }
        (ComparisonOp::StartsWith | ComparisonOp::EndsWith, None) => {
            Err(unsupported(clause, "cannot match a null prefix or suffix"))
        }
        _ => Err(unsupported(clause, "not applicable to a single scalar value")),
    }
}

fn unsupported(clause: &Clause, reason: &str) -> QueryError {
    QueryError::UnsupportedOperator {
        op: clause.op().as_str(),
        property: clause.property().to_string(),
        reason: reason.to_string(),
    }
}

/// Selects the comparison path for a clause, rejecting invalid operators.
pub fn resolve_path(clause: &Clause, descriptor: TypeDescriptor) -> Result<Path> {
    let op = clause.op();
    let literal = clause.literal();
    let unsupported = |reason: String| QueryError::UnsupportedOperator {
        op: op.as_str(),
        property: clause.property().to_string(),
        reason,
    };

    match (descriptor.shape.is_sequence(), literal.is_list()) {
        (false, false) => {
            if op.is_ordering() {
                if !descriptor.kind.is_orderable() {
                    return Err(unsupported(format!(
                        "{} values have no ordering",
                        descriptor.kind
                    )));
                }
                if literal.is_null() && descriptor.accepts_null() {
                    return Err(unsupported("cannot order against null".to_string()));
                }
            } else if op.is_string_edge() {
                if descriptor.kind != ScalarKind::String {
                    return Err(unsupported(format!(
                        "requires a string property, found {descriptor}"
                    )));
                }
                if literal.is_null() && descriptor.accepts_null() {
                    return Err(unsupported("cannot match a null prefix or suffix".to_string()));
                }
            } else if !op.is_equality() {
                return Err(unsupported(format!(
                    "a {} property with a single value supports eq, ne, lt, lte, gt, gte, sw and ew",
                    descriptor.shape
                )));
            }
            Ok(Path::Direct)
        }
        (false, true) => match op {
            ComparisonOp::ContainsOnValue => Ok(Path::OneOf),
            _ => Err(unsupported(format!(
                "a list literal against a {} property requires cov",
                descriptor.shape
            ))),
        },
        (true, false) => match op {
            ComparisonOp::Contains => Ok(Path::Contains),
            _ => Err(unsupported(format!(
                "a single value against {descriptor} requires ct"
            ))),
        },
        (true, true) => match op {
            ComparisonOp::Eq | ComparisonOp::Ne => Ok(Path::SequenceEquals),
            _ => Err(unsupported(format!(
                "a list literal against {descriptor} supports eq and ne"
            ))),
        },
    }
}

/// Fails with a coercion error if the literal uses the null sentinel against
/// a type that cannot hold null.
///
/// Runs before [`resolve_path`] so that sentinel misuse is reported as a
/// coercion error whatever the operator.
pub fn reject_null(clause: &Clause, descriptor: TypeDescriptor) -> Result<()> {
    let has_null = match clause.literal() {
        RawLiteral::Scalar(atom) => *atom == Atom::Null,
        RawLiteral::List(atoms) => atoms.contains(&Atom::Null),
    };
    if has_null && !descriptor.accepts_null() {
        return Err(null_not_allowed(clause, descriptor));
    }
    Ok(())
}

fn null_not_allowed(clause: &Clause, descriptor: TypeDescriptor) -> QueryError {
    QueryError::Coercion {
        property: clause.property().to_string(),
        literal: literal::NULL_SENTINEL.to_string(),
        expected: descriptor.to_string(),
        reason: "null is not allowed for a non-nullable type".to_string(),
    }
}

/// Decodes a clause literal into values of the property's declared type.
///
/// Each list element is decoded independently. The null sentinel is only
/// accepted where the declared type (or element type) is nullable.
pub fn coerce(clause: &Clause, descriptor: TypeDescriptor) -> Result<CoercedValue> {
    match clause.literal() {
        RawLiteral::Scalar(atom) => Ok(CoercedValue::Single(coerce_atom(
            clause, descriptor, atom,
        )?)),
        RawLiteral::List(atoms) => atoms
            .iter()
            .map(|atom| coerce_atom(clause, descriptor, atom))
            .collect::<Result<Vec<_>>>()
            .map(CoercedValue::Many),
    }
}

fn coerce_atom(clause: &Clause, descriptor: TypeDescriptor, atom: &Atom) -> Result<Option<Scalar>> {
    let error = |literal: &str, reason: String| QueryError::Coercion {
        property: clause.property().to_string(),
        literal: literal.to_string(),
        expected: descriptor.to_string(),
        reason,
    };

    match atom {
        Atom::Null if descriptor.accepts_null() => Ok(None),
        Atom::Null => Err(null_not_allowed(clause, descriptor)),
        Atom::Text(text) => literal::decode(descriptor.kind, text)
            .map(Some)
            .map_err(|reason| error(text, reason)),
    }
}
