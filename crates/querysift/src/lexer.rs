//! Lexer for query text.
//!
//! The lexer converts query text into a stream of tokens: words (function
//! tags and joiners), quoted text, the null sentinel, and the punctuation
//! `(`, `)`, `[`, `]` and `,`. Whitespace between tokens is skipped.

use crate::error::{QueryError, Result};
use crate::literal::NULL_SENTINEL;

/// Kind of a lexed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare word: `[A-Za-z0-9_]+`.
    Word(String),
    /// Single-quoted text, escapes resolved.
    Quoted(String),
    /// Bare null sentinel.
    Null,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Eof,
}

impl TokenKind {
    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Word(w) => format!("'{w}'"),
            TokenKind::Quoted(_) => "quoted text".to_string(),
            TokenKind::Null => "null sentinel".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::LBracket => "'['".to_string(),
            TokenKind::RBracket => "']'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Eof => "end of query".to_string(),
        }
    }
}

/// A token with the byte offset where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

/// Lexer over one query string.
pub struct Lexer<'src> {
    source: &'src str,
    position: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            source,
            position: 0,
        }
    }

    /// The full source text.
    pub fn source(&self) -> &'src str {
        self.source
    }

    fn rest(&self) -> &'src str {
        &self.source[self.position..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.position += rest.len() - trimmed.len();
    }

    fn error(&self, position: usize, message: impl Into<String>) -> QueryError {
        QueryError::syntax(self.source, position, message)
    }

    /// Returns the next token, or a syntax error for text that cannot start one.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        let start = self.position;

        let Some(c) = self.peek_char() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                position: start,
            });
        };

        let kind = match c {
            '(' => self.punct(TokenKind::LParen),
            ')' => self.punct(TokenKind::RParen),
            '[' => self.punct(TokenKind::LBracket),
            ']' => self.punct(TokenKind::RBracket),
            ',' => self.punct(TokenKind::Comma),
            '\'' => self.scan_quoted()?,
            '$' if self.rest().starts_with(NULL_SENTINEL) => {
                self.position += NULL_SENTINEL.len();
                TokenKind::Null
            }
            c if is_word_char(c) => self.scan_word(),
            c => return Err(self.error(start, format!("unexpected character '{c}'"))),
        };

        Ok(Token {
            kind,
            position: start,
        })
    }

    fn punct(&mut self, kind: TokenKind) -> TokenKind {
        self.position += 1;
        kind
    }

    fn scan_word(&mut self) -> TokenKind {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !is_word_char(c))
            .unwrap_or(rest.len());
        self.position += len;
        TokenKind::Word(rest[..len].to_string())
    }

    fn scan_quoted(&mut self) -> Result<TokenKind> {
        let start = self.position;
        let mut text = String::new();
        let mut chars = self.rest().char_indices().skip(1);

        while let Some((offset, c)) = chars.next() {
            match c {
                '\'' => {
                    self.position = start + offset + 1;
                    if text == NULL_SENTINEL {
                        return Ok(TokenKind::Null);
                    }
                    return Ok(TokenKind::Quoted(text));
                }
                '\\' => match chars.next() {
                    Some((_, escaped @ ('\'' | '\\'))) => text.push(escaped),
                    Some((at, other)) => {
                        return Err(self.error(
                            start + at - 1,
                            format!("invalid escape sequence '\\{other}'"),
                        ))
                    }
                    None => break,
                },
                c => text.push(c),
            }
        }

        Err(self.error(start, "unterminated quoted text"))
    }

    /// Lexes the whole source.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
