//! Querysift - compile textual filter queries into typed predicates.
//!
//! Querysift turns a small function-call style query language into a
//! [`Predicate`] over a Rust record type. Queries are parsed, checked against
//! the record's declared property types, and compiled once; the resulting
//! predicate is a plain closure that never fails when evaluated.
//!
//! # Quick Start
//!
//! ```rust
//! use querysift::Record;
//!
//! #[derive(Record)]
//! struct Book {
//!     title: String,
//!     pages: u32,
//!     tags: Vec<String>,
//!     subtitle: Option<String>,
//! }
//!
//! let books = vec![
//!     Book { title: "Dune".into(), pages: 412, tags: vec!["sf".into()], subtitle: None },
//!     Book { title: "Emma".into(), pages: 474, tags: vec!["classic".into()], subtitle: None },
//!     Book {
//!         title: "Dracula".into(),
//!         pages: 418,
//!         tags: vec!["horror".into(), "classic".into()],
//!         subtitle: Some("A Mystery Story".into()),
//!     },
//! ];
//!
//! let classics = querysift::compile::<Book>(
//!     "ct('tags', 'classic') and gt('pages', '450') or sw('title', 'Du')",
//! )
//! .unwrap();
//!
//! let titles: Vec<_> = classics.filter(&books).iter().map(|b| b.title.as_str()).collect();
//! assert_eq!(titles, vec!["Dune", "Emma"]);
//! ```
//!
//! # Query Language
//!
//! A query is a sequence of clauses joined by `and` / `or`:
//!
//! ```text
//! eq('Name', 'Ada') and cov('Status', ['1', '2']) or eq('Nick', $!NULL!$)
//! ```
//!
//! Each clause is `function('Property', literal)`. Literals are single-quoted
//! text (`\'` and `\\` escape) or lists of them in brackets. The bare token
//! `$!NULL!$` stands for "no value".
//!
//! Clauses are folded strictly left to right with no precedence:
//! `a and b or c` is `c OR (b AND a)`. See [`Compiler`] for details.
//!
//! # Operators
//!
//! | Tag | Meaning | Property |
//! |-----|---------|----------|
//! | `eq`, `ne` | equality | any; lists compare collections element-wise |
//! | `lt`, `lte`, `gt`, `gte` | ordering | numbers, decimals, date/times, durations |
//! | `sw`, `ew` | starts / ends with | strings |
//! | `ct` | collection holds the value | arrays and collections |
//! | `cov` | value is one of the list | scalars |
//!
//! # Records
//!
//! A type becomes queryable by implementing [`Record`], usually through
//! `#[derive(Record)]` (enabled by the default `derive` feature). Field types
//! map to property types through [`FieldType`].

mod builder;
mod clause;
mod coerce;
mod compiler;
mod error;
mod lexer;
pub mod literal;
mod op;
mod parser;
mod predicate;
mod record;
mod value;

// Re-export public API
pub use builder::QueryBuilder;
pub use clause::{Atom, Clause, RawLiteral};
pub use coerce::{coerce, comparison, reject_null, resolve_path, CoercedValue, Comparison, Path};
pub use compiler::{compile, CompileOptions, Compiler, PropertyCase};
pub use error::{QueryError, Result};
pub use lexer::{Lexer, Token, TokenKind};
pub use literal::{encode, LiteralValue, NULL_SENTINEL};
pub use op::{ComparisonOp, Composition, OrderingOp};
pub use parser::parse;
pub use predicate::Predicate;
pub use record::{
    ElementType, FieldType, Property, PropertyShape, Record, ScalarType, TypeDescriptor,
};
pub use value::{FieldValue, Scalar, ScalarKind, ScalarRef};

#[cfg(feature = "derive")]
pub use querysift_macros::Record;
