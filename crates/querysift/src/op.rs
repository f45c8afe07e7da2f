//! Comparison and composition operators.
//!
//! [`ComparisonOp`] is the closed set of function tags a clause may use, and
//! [`Composition`] is the joiner between two clauses. Both have a fixed
//! textual form used verbatim by the grammar.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a clause.
///
/// Operators are grouped by the property shapes they apply to:
/// - **Direct**: `Eq`, `Ne` on scalars; also whole-sequence equality on collections
/// - **Ordering**: `Lt`, `Lte`, `Gt`, `Gte` on numbers, date/times and durations
/// - **Membership**: `Contains` (collection holds the value),
///   `ContainsOnValue` (value is one of a literal list)
/// - **String edges**: `StartsWith`, `EndsWith`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    /// Equal. Tag `eq`.
    Eq,
    /// Not equal. Tag `ne`.
    Ne,
    /// Less than. Tag `lt`.
    Lt,
    /// Less than or equal. Tag `lte`.
    Lte,
    /// Greater than. Tag `gt`.
    Gt,
    /// Greater than or equal. Tag `gte`.
    Gte,
    /// Collection property contains the literal value. Tag `ct`.
    Contains,
    /// Scalar property value is one of the literal list. Tag `cov`.
    ContainsOnValue,
    /// String starts with the literal. Tag `sw`.
    StartsWith,
    /// String ends with the literal. Tag `ew`.
    EndsWith,
}

impl ComparisonOp {
    /// All operators, in tag order.
    pub const ALL: [ComparisonOp; 10] = [
        ComparisonOp::Eq,
        ComparisonOp::Ne,
        ComparisonOp::Lt,
        ComparisonOp::Lte,
        ComparisonOp::Gt,
        ComparisonOp::Gte,
        ComparisonOp::Contains,
        ComparisonOp::ContainsOnValue,
        ComparisonOp::StartsWith,
        ComparisonOp::EndsWith,
    ];

    /// Returns the grammar tag of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "eq",
            ComparisonOp::Ne => "ne",
            ComparisonOp::Lt => "lt",
            ComparisonOp::Lte => "lte",
            ComparisonOp::Gt => "gt",
            ComparisonOp::Gte => "gte",
            ComparisonOp::Contains => "ct",
            ComparisonOp::ContainsOnValue => "cov",
            ComparisonOp::StartsWith => "sw",
            ComparisonOp::EndsWith => "ew",
        }
    }

    /// Looks up an operator by its exact (lower-case) tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        ComparisonOp::ALL.into_iter().find(|op| op.as_str() == tag)
    }

    /// Returns the ordering operator for `Lt`, `Lte`, `Gt` and `Gte`.
    pub fn as_ordering(self) -> Option<OrderingOp> {
        match self {
            ComparisonOp::Lt => Some(OrderingOp::Lt),
            ComparisonOp::Lte => Some(OrderingOp::Lte),
            ComparisonOp::Gt => Some(OrderingOp::Gt),
            ComparisonOp::Gte => Some(OrderingOp::Gte),
            _ => None,
        }
    }

    /// Returns `true` for `Lt`, `Lte`, `Gt` and `Gte`.
    pub fn is_ordering(self) -> bool {
        self.as_ordering().is_some()
    }

    /// Returns `true` for `Eq` and `Ne`.
    pub fn is_equality(self) -> bool {
        matches!(self, ComparisonOp::Eq | ComparisonOp::Ne)
    }

    /// Returns `true` for `StartsWith` and `EndsWith`.
    pub fn is_string_edge(self) -> bool {
        matches!(self, ComparisonOp::StartsWith | ComparisonOp::EndsWith)
    }
}

/// The ordering subset of [`ComparisonOp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderingOp {
    Lt,
    Lte,
    Gt,
    Gte,
}

impl OrderingOp {
    /// Evaluates the operator given the record value compared to the literal.
    pub fn eval(self, ordering: Ordering) -> bool {
        match self {
            OrderingOp::Gt => ordering == Ordering::Greater,
            OrderingOp::Gte => ordering != Ordering::Less,
            OrderingOp::Lt => ordering == Ordering::Less,
            OrderingOp::Lte => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ComparisonOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComparisonOp::from_tag(s).ok_or_else(|| format!("unknown function '{s}'"))
    }
}

/// How a clause joins the predicate accumulated from the clauses before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Composition {
    /// Both the clause and the accumulated predicate must hold.
    And,
    /// Either the clause or the accumulated predicate must hold.
    Or,
}

impl Composition {
    /// Returns the canonical (lower-case) keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Composition::And => "and",
            Composition::Or => "or",
        }
    }

    /// Recognizes a joiner keyword, ignoring ASCII case.
    pub fn from_keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("and") {
            Some(Composition::And)
        } else if word.eq_ignore_ascii_case("or") {
            Some(Composition::Or)
        } else {
            None
        }
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
