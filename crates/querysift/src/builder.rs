//! Fluent builder for query text.
//!
//! [`QueryBuilder`] writes query strings from typed values, quoting and
//! encoding literals so that the compiler decodes exactly the values that
//! were passed in.

use std::fmt;

use crate::clause::RawLiteral;
use crate::compiler::compile;
use crate::error::Result;
use crate::literal::{quote, IntoLiteral};
use crate::op::{ComparisonOp, Composition};
use crate::predicate::Predicate;
use crate::record::Record;

#[derive(Debug, Clone, PartialEq)]
struct Term {
    composition: Composition,
    op: ComparisonOp,
    property: String,
    literal: RawLiteral,
}

/// Builds query text clause by clause.
///
/// The joiner of the first clause is dropped, so a query may start with
/// either [`and`](Self::and) or [`or`](Self::or).
///
/// # Example
///
/// ```
/// use querysift::{ComparisonOp, QueryBuilder};
/// use querysift::literal::list;
///
/// let query = QueryBuilder::new()
///     .and_gte("Pages", 300)
///     .and(ComparisonOp::ContainsOnValue, "Genre", list(["sf", "fantasy"]))
///     .or_eq("Author", "O'Brien")
///     .build();
///
/// assert_eq!(
///     query,
///     r"gte('Pages', '300') and cov('Genre', ['sf', 'fantasy']) or eq('Author', 'O\'Brien')"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    terms: Vec<Term>,
}

impl QueryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        QueryBuilder::default()
    }

    fn push(
        mut self,
        composition: Composition,
        op: ComparisonOp,
        property: &str,
        value: impl IntoLiteral,
    ) -> Self {
        self.terms.push(Term {
            composition,
            op,
            property: property.to_string(),
            literal: value.into_literal(),
        });
        self
    }

    // ========================================================================
    // Generic clause builders
    // ========================================================================

    /// Adds a clause joined with `and`.
    pub fn and(self, op: ComparisonOp, property: &str, value: impl IntoLiteral) -> Self {
        self.push(Composition::And, op, property, value)
    }

    /// Adds a clause joined with `or`.
    pub fn or(self, op: ComparisonOp, property: &str, value: impl IntoLiteral) -> Self {
        self.push(Composition::Or, op, property, value)
    }

    // ========================================================================
    // AND shorthand methods
    // ========================================================================

    pub fn and_eq(self, property: &str, value: impl IntoLiteral) -> Self {
        self.and(ComparisonOp::Eq, property, value)
    }

    pub fn and_ne(self, property: &str, value: impl IntoLiteral) -> Self {
        self.and(ComparisonOp::Ne, property, value)
    }

    pub fn and_lt(self, property: &str, value: impl IntoLiteral) -> Self {
        self.and(ComparisonOp::Lt, property, value)
    }

    pub fn and_lte(self, property: &str, value: impl IntoLiteral) -> Self {
        self.and(ComparisonOp::Lte, property, value)
    }

    pub fn and_gt(self, property: &str, value: impl IntoLiteral) -> Self {
        self.and(ComparisonOp::Gt, property, value)
    }

    pub fn and_gte(self, property: &str, value: impl IntoLiteral) -> Self {
        self.and(ComparisonOp::Gte, property, value)
    }

    /// Adds an `and` clause testing that a collection holds `value`.
    pub fn and_contains(self, property: &str, value: impl IntoLiteral) -> Self {
        self.and(ComparisonOp::Contains, property, value)
    }

    pub fn and_startswith(self, property: &str, value: &str) -> Self {
        self.and(ComparisonOp::StartsWith, property, value)
    }

    pub fn and_endswith(self, property: &str, value: &str) -> Self {
        self.and(ComparisonOp::EndsWith, property, value)
    }

    // ========================================================================
    // OR shorthand methods
    // ========================================================================

    pub fn or_eq(self, property: &str, value: impl IntoLiteral) -> Self {
        self.or(ComparisonOp::Eq, property, value)
    }

    pub fn or_ne(self, property: &str, value: impl IntoLiteral) -> Self {
        self.or(ComparisonOp::Ne, property, value)
    }

    pub fn or_lt(self, property: &str, value: impl IntoLiteral) -> Self {
        self.or(ComparisonOp::Lt, property, value)
    }

    pub fn or_lte(self, property: &str, value: impl IntoLiteral) -> Self {
        self.or(ComparisonOp::Lte, property, value)
    }

    pub fn or_gt(self, property: &str, value: impl IntoLiteral) -> Self {
        self.or(ComparisonOp::Gt, property, value)
    }

    pub fn or_gte(self, property: &str, value: impl IntoLiteral) -> Self {
        self.or(ComparisonOp::Gte, property, value)
    }

    pub fn or_contains(self, property: &str, value: impl IntoLiteral) -> Self {
        self.or(ComparisonOp::Contains, property, value)
    }

    pub fn or_startswith(self, property: &str, value: &str) -> Self {
        self.or(ComparisonOp::StartsWith, property, value)
    }

    pub fn or_endswith(self, property: &str, value: &str) -> Self {
        self.or(ComparisonOp::EndsWith, property, value)
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Number of clauses added so far.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Renders the query text.
    pub fn build(&self) -> String {
        self.to_string()
    }

    /// Renders and compiles the query with default options.
    pub fn compile<T: Record + 'static>(&self) -> Result<Predicate<T>> {
        compile(&self.build())
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", term.composition)?;
            }
            write!(f, "{}({}, {})", term.op, quote(&term.property), term.literal)?;
        }
        Ok(())
    }
}
