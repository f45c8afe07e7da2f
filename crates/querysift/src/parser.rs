//! Clause grammar parser.
//!
//! ```text
//! query         := clause (joiner clause)*
//! clause        := functionTag '(' quotedProp ',' literal ')'
//! joiner        := 'and' | 'or'                      (any case)
//! functionTag   := eq | ne | lt | lte | gt | gte | ct | cov | sw | ew
//! literal       := scalarLiteral | listLiteral
//! scalarLiteral := "'" text "'" | $!NULL!$
//! listLiteral   := '[' scalarLiteral (',' scalarLiteral)* ']'
//! ```
//!
//! Parsing is a single left-to-right pass with no grouping or precedence.
//! The first syntax error aborts the parse.

use tracing::trace;

use crate::clause::{Atom, Clause, RawLiteral};
use crate::error::{QueryError, Result};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::op::{ComparisonOp, Composition};

/// Parses query text into clauses, in source order.
///
/// Blank text parses to an empty list; the compiler reports that as
/// [`QueryError::EmptyQuery`].
///
/// # Example
///
/// ```
/// use querysift::{parse, ComparisonOp, Composition};
///
/// let clauses = parse("gte('Age', '18') AND sw('Name', 'A')").unwrap();
/// assert_eq!(clauses.len(), 2);
/// assert_eq!(clauses[0].composition(), None);
/// assert_eq!(clauses[1].composition(), Some(Composition::And));
/// assert_eq!(clauses[1].op(), ComparisonOp::StartsWith);
/// ```
pub fn parse(source: &str) -> Result<Vec<Clause>> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser {
        source,
        tokens,
        index: 0,
    }
    .parse_query()
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    index: usize,
}

impl<'src> Parser<'src> {
    fn peek(&self) -> &Token {
        // the token list always ends with Eof, and Eof is never consumed
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.index += 1;
        }
        token
    }

    fn error_at(&self, token: &Token, message: impl Into<String>) -> QueryError {
        QueryError::syntax(self.source, token.position, message)
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Result<Token> {
        let token = self.advance();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(self.error_at(
                &token,
                format!(
                    "expected {} {context}, found {}",
                    kind.describe(),
                    token.kind.describe()
                ),
            ))
        }
    }

    fn parse_query(mut self) -> Result<Vec<Clause>> {
        let mut clauses = Vec::new();
        if self.peek().kind == TokenKind::Eof {
            return Ok(clauses);
        }

        clauses.push(self.parse_clause(None)?);

        loop {
            let token = self.advance();
            let composition = match &token.kind {
                TokenKind::Eof => break,
                TokenKind::Word(word) => Composition::from_keyword(word).ok_or_else(|| {
                    self.error_at(&token, format!("expected 'and' or 'or', found '{word}'"))
                })?,
                other => {
                    return Err(self.error_at(
                        &token,
                        format!("expected 'and' or 'or', found {}", other.describe()),
                    ))
                }
            };
            clauses.push(self.parse_clause(Some(composition))?);
        }

        trace!(clauses = clauses.len(), "parsed query");
        Ok(clauses)
    }

    fn parse_clause(&mut self, composition: Option<Composition>) -> Result<Clause> {
        let tag = self.advance();
        let op = match &tag.kind {
            TokenKind::Word(word) => {
                if composition.is_none() && Composition::from_keyword(word).is_some() {
                    return Err(self.error_at(&tag, "query cannot start with a joiner"));
                }
                ComparisonOp::from_tag(word)
                    .ok_or_else(|| self.error_at(&tag, format!("unknown function '{word}'")))?
            }
            other => {
                return Err(self.error_at(
                    &tag,
                    format!("expected a function name, found {}", other.describe()),
                ))
            }
        };

        self.expect(TokenKind::LParen, "after function name")?;

        let prop = self.advance();
        let property = match prop.kind {
            TokenKind::Quoted(ref name) if !name.trim().is_empty() => name.clone(),
            TokenKind::Quoted(_) => return Err(self.error_at(&prop, "empty property name")),
            ref other => {
                return Err(self.error_at(
                    &prop,
                    format!("expected a quoted property name, found {}", other.describe()),
                ))
            }
        };

        self.expect(TokenKind::Comma, "after property name")?;
        let literal = self.parse_literal()?;
        self.expect(TokenKind::RParen, "to close the clause")?;

        Clause::new(composition, op, property, literal)
    }

    fn parse_literal(&mut self) -> Result<RawLiteral> {
        if self.peek().kind != TokenKind::LBracket {
            return Ok(RawLiteral::Scalar(self.parse_atom()?));
        }

        let open = self.advance();
        let mut atoms = vec![self.parse_atom()?];
        loop {
            let token = self.advance();
            match token.kind {
                TokenKind::Comma => atoms.push(self.parse_atom()?),
                TokenKind::RBracket => return Ok(RawLiteral::List(atoms)),
                TokenKind::Eof => return Err(self.error_at(&open, "unclosed '['")),
                ref other => {
                    return Err(self.error_at(
                        &token,
                        format!("expected ',' or ']' in list, found {}", other.describe()),
                    ))
                }
            }
        }
    }

    fn parse_atom(&mut self) -> Result<Atom> {
        let token = self.advance();
        match token.kind {
            TokenKind::Quoted(text) => Ok(Atom::Text(text)),
            TokenKind::Null => Ok(Atom::Null),
            ref other => Err(self.error_at(
                &token,
                format!("expected a quoted literal, found {}", other.describe()),
            )),
        }
    }
}
