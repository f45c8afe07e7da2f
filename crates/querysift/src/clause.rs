//! Parsed query clauses.
//!
//! A [`Clause`] is one `function('property', literal)` term together with
//! the joiner that attaches it to the clauses before it. The literal stays
//! untyped ([`RawLiteral`]) until the compiler knows the property's type.

use std::fmt;

use crate::error::{QueryError, Result};
use crate::literal::{quote, NULL_SENTINEL};
use crate::op::{ComparisonOp, Composition};

/// A single literal value as written in the query: text or the null sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Atom {
    /// The null sentinel.
    Null,
    /// Unquoted, unescaped literal text.
    Text(String),
}

impl Atom {
    pub fn text(s: impl Into<String>) -> Self {
        Atom::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Atom::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Atom::Text(s) => Some(s),
            Atom::Null => None,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Null => f.write_str(NULL_SENTINEL),
            Atom::Text(s) => f.write_str(&quote(s)),
        }
    }
}

/// Literal of a clause, still untyped.
///
/// `Display` renders the exact grammar form, so a rendered literal parses
/// back to an equal value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawLiteral {
    /// `'text'` or the null sentinel.
    Scalar(Atom),
    /// `['a', 'b', ...]`, never empty.
    List(Vec<Atom>),
}

impl RawLiteral {
    /// A scalar text literal.
    pub fn text(s: impl Into<String>) -> Self {
        RawLiteral::Scalar(Atom::text(s))
    }

    /// The null sentinel.
    pub fn null() -> Self {
        RawLiteral::Scalar(Atom::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, RawLiteral::List(_))
    }

    /// Returns `true` if this is the scalar null sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, RawLiteral::Scalar(Atom::Null))
    }
}

impl fmt::Display for RawLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawLiteral::Scalar(atom) => write!(f, "{atom}"),
            RawLiteral::List(atoms) => {
                f.write_str("[")?;
                for (i, atom) in atoms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{atom}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// One parsed query term.
///
/// # Example
///
/// ```
/// use querysift::{Clause, ComparisonOp, RawLiteral};
///
/// let clause = Clause::new(None, ComparisonOp::Eq, "Name", RawLiteral::text("Ada")).unwrap();
/// assert_eq!(clause.to_string(), "eq('Name', 'Ada')");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    composition: Option<Composition>,
    op: ComparisonOp,
    property: String,
    literal: RawLiteral,
}

impl Clause {
    /// Creates a clause.
    ///
    /// Fails with a syntax error if `property` is empty or whitespace, or if
    /// `literal` is an empty list.
    pub fn new(
        composition: Option<Composition>,
        op: ComparisonOp,
        property: impl Into<String>,
        literal: RawLiteral,
    ) -> Result<Self> {
        let property = property.into();
        if property.trim().is_empty() {
            return Err(QueryError::Syntax {
                message: "property name must not be empty".to_string(),
                position: 0,
                fragment: property,
            });
        }
        if matches!(&literal, RawLiteral::List(atoms) if atoms.is_empty()) {
            return Err(QueryError::Syntax {
                message: "list literal must not be empty".to_string(),
                position: 0,
                fragment: format!("{op}({}, [])", quote(&property)),
            });
        }
        Ok(Clause {
            composition,
            op,
            property,
            literal,
        })
    }

    /// How this clause joins the preceding ones; `None` for the first clause.
    pub fn composition(&self) -> Option<Composition> {
        self.composition
    }

    pub fn op(&self) -> ComparisonOp {
        self.op
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn literal(&self) -> &RawLiteral {
        &self.literal
    }
}

impl fmt::Display for Clause {
    /// Renders the clause without its joiner.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.op, quote(&self.property), self.literal)
    }
}
