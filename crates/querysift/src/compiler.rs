//! Query compilation.
//!
//! [`Compiler`] ties the stages together: the query text is parsed, every
//! clause is resolved against the record type and turned into a
//! [`Predicate`], and the clause predicates are folded left to right.
//!
//! The fold has no precedence. Starting from the first clause, each
//! following clause wraps the accumulator:
//!
//! ```text
//! acc := clause0
//! acc := (clause1 AND acc)   for "... and clause1"
//! acc := (clause2 OR acc)    for "... or clause2"
//! ```
//!
//! so `a and b or c` means `c OR (b AND a)`.

use tracing::{debug, trace};

use crate::clause::Clause;
use crate::coerce::comparison;
use crate::error::{QueryError, Result};
use crate::op::Composition;
use crate::parser::parse;
use crate::predicate::{self, Predicate};
use crate::record::{Property, Record};

/// How property names in a query are matched against the record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertyCase {
    /// Names must match exactly.
    Exact,
    /// Exact match first, then a unique ASCII case-insensitive match.
    #[default]
    AsciiInsensitive,
}

/// Options controlling compilation.
///
/// # Example
///
/// ```
/// use querysift::{CompileOptions, PropertyCase};
///
/// let options = CompileOptions::new()
///     .property_case(PropertyCase::Exact)
///     .max_query_len(4096);
/// assert_eq!(options.max_len(), Some(4096));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompileOptions {
    property_case: PropertyCase,
    max_query_len: Option<usize>,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how property names are matched.
    pub fn property_case(mut self, case: PropertyCase) -> Self {
        self.property_case = case;
        self
    }

    /// Rejects query text longer than `max` bytes.
    pub fn max_query_len(mut self, max: usize) -> Self {
        self.max_query_len = Some(max);
        self
    }

    pub fn case(&self) -> PropertyCase {
        self.property_case
    }

    pub fn max_len(&self) -> Option<usize> {
        self.max_query_len
    }
}

/// Compiles query text into predicates over a record type.
///
/// # Example
///
/// ```
/// use querysift::{Compiler, PropertyCase, CompileOptions, Record};
///
/// #[derive(Record)]
/// struct Book {
///     title: String,
///     pages: u32,
/// }
///
/// let compiler = Compiler::new();
/// let long = compiler.compile::<Book>("gt('pages', '300')").unwrap();
///
/// let books = vec![
///     Book { title: "Dune".into(), pages: 412 },
///     Book { title: "Solaris".into(), pages: 204 },
/// ];
/// assert_eq!(long.count(&books), 1);
///
/// let strict = Compiler::with_options(CompileOptions::new().property_case(PropertyCase::Exact));
/// assert!(strict.compile::<Book>("gt('Pages', '300')").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    /// Creates a compiler with default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CompileOptions) -> Self {
        Compiler { options }
    }

    /// Replaces the options.
    pub fn options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the current options.
    pub fn current_options(&self) -> &CompileOptions {
        &self.options
    }

    /// Parses and compiles `query` for records of type `T`.
    ///
    /// Fails with the first error found. Blank text is
    /// [`QueryError::EmptyQuery`].
    pub fn compile<T: Record + 'static>(&self, query: &str) -> Result<Predicate<T>> {
        let result = self.compile_inner(query);
        if let Err(err) = &result {
            debug!(kind = err.kind(), error = %err, "query rejected");
        }
        result
    }

    fn compile_inner<T: Record + 'static>(&self, query: &str) -> Result<Predicate<T>> {
        if let Some(max) = self.options.max_query_len {
            if query.len() > max {
                return Err(QueryError::QueryTooLong {
                    len: query.len(),
                    max,
                });
            }
        }

        let clauses = parse(query)?;
        let count = clauses.len();
        let predicate = self.fold(clauses)?;
        debug!(clauses = count, "compiled query");
        Ok(predicate)
    }

    /// Compiles already parsed clauses with the left fold.
    ///
    /// The first clause must have no joiner and every later clause must have
    /// one; anything else is a syntax error.
    pub fn compile_clauses<T: Record + 'static>(&self, clauses: &[Clause]) -> Result<Predicate<T>> {
        self.fold(clauses.iter().cloned())
    }

    fn fold<T, I>(&self, clauses: I) -> Result<Predicate<T>>
    where
        T: Record + 'static,
        I: IntoIterator<Item = Clause>,
    {
        let mut clauses = clauses.into_iter().enumerate();
        let (_, first) = clauses.next().ok_or(QueryError::EmptyQuery)?;
        if let Some(joiner) = first.composition() {
            return Err(misplaced_joiner(
                format!("first clause must not have a joiner, found '{joiner}'"),
                &first,
            ));
        }
        let mut acc = self.compile_clause::<T>(&first)?;

        for (index, clause) in clauses {
            let new = self.compile_clause::<T>(&clause)?;
            acc = match clause.composition() {
                Some(Composition::And) => new.and(acc),
                Some(Composition::Or) => new.or(acc),
                None => {
                    return Err(misplaced_joiner(
                        format!("clause {} is missing a joiner", index + 1),
                        &clause,
                    ))
                }
            };
        }
        Ok(acc)
    }

    fn compile_clause<T: Record + 'static>(&self, clause: &Clause) -> Result<Predicate<T>> {
        let property = self.resolve_property::<T>(clause.property())?;
        let descriptor = property.descriptor();
        let comparison = comparison(clause, descriptor)?;

        trace!(
            op = clause.op().as_str(),
            property = property.name(),
            shape = descriptor.shape.as_str(),
            path = ?comparison.path(),
            "compiled clause"
        );
        Ok(predicate::build(property, comparison))
    }

    fn resolve_property<T: Record>(&self, name: &str) -> Result<Property<T>> {
        if let Some(property) = T::property(name) {
            return Ok(property);
        }

        let unknown = || QueryError::UnknownProperty {
            property: name.to_string(),
        };

        match self.options.property_case {
            PropertyCase::Exact => Err(unknown()),
            PropertyCase::AsciiInsensitive => {
                let mut candidates = T::property_names()
                    .iter()
                    .filter(|candidate| candidate.eq_ignore_ascii_case(name));
                match (candidates.next(), candidates.next()) {
                    (Some(only), None) => T::property(only).ok_or_else(unknown),
                    _ => Err(unknown()),
                }
            }
        }
    }
}

fn misplaced_joiner(message: String, clause: &Clause) -> QueryError {
    QueryError::Syntax {
        message,
        position: 0,
        fragment: clause.to_string(),
    }
}

/// Compiles `query` for records of type `T` with default options.
///
/// # Example
///
/// ```
/// use querysift::Record;
///
/// #[derive(Record)]
/// struct Task {
///     name: String,
///     priority: i32,
///     owner: Option<String>,
/// }
///
/// let tasks = vec![
///     Task { name: "Write docs".into(), priority: 3, owner: None },
///     Task { name: "Fix bug".into(), priority: 5, owner: Some("ada".into()) },
/// ];
///
/// let urgent = querysift::compile::<Task>("gte('priority', '4') or eq('owner', $!NULL!$)").unwrap();
/// assert_eq!(urgent.count(&tasks), 2);
/// ```
pub fn compile<T: Record + 'static>(query: &str) -> Result<Predicate<T>> {
    Compiler::new().compile(query)
}
