//! The Pratt (top-down operator-precedence) parser core (spec.md §4.2).
//!
//! This module knows nothing about XPath grammar: it is a generic
//! `expression(rbp)` driver over a token [`Cursor`] and a [`Grammar`] that
//! supplies binding powers plus null/left-denotation handlers. The `xpath`
//! crate's `grammar` and `parser` modules supply the actual XPath 1.0–3.1
//! symbol table; version-layered parsers extend that table rather than
//! this driver.

use crate::error::XPathError;
use crate::lexer::Token;

/// A cursor over a token stream; parse functions thread this explicitly
/// rather than storing "current token" on a parser object (spec.md §9
/// design note: "avoid global parser state").
pub struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Cursor<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn peek(&self) -> &'t Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub fn peek_at(&self, offset: usize) -> &'t Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    /// Consumes and returns the current token, advancing the cursor.
    pub fn advance(&mut self) -> &'t Token {
        let tok = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    /// Consumes the current token if its text matches `symbol`, else raises
    /// `XPST0003`.
    pub fn expect(&mut self, symbol: &str) -> Result<&'t Token, XPathError> {
        if self.peek().text == symbol {
            Ok(self.advance())
        } else {
            Err(XPathError::parse(format!(
                "expected '{}', found '{}'",
                symbol, self.peek().text
            ))
            .with_span(self.peek().span))
        }
    }

    pub fn at(&self, symbol: &str) -> bool {
        self.peek().text == symbol
    }

    pub fn eat(&mut self, symbol: &str) -> bool {
        if self.at(symbol) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn is_eof(&self) -> bool {
        self.peek().is_eof()
    }
}

/// Supplies the binding power and nud/led handlers for every symbol in the
/// grammar. Implementations hold the actual symbol table as data (spec.md
/// §4.1: "each symbol... is registered with attributes: lbp, rbp, a
/// null-denotation handler, a left-denotation handler...").
pub trait Grammar<E> {
    /// Left-binding power of the *current* token (used by the Pratt loop
    /// to decide whether to continue binding into `left`). Zero for
    /// anything that cannot appear in `led` position (most literals,
    /// closing delimiters, `eof`).
    fn lbp(&self, token: &Token) -> u8;

    /// Parses the start of an expression from `token` (already consumed).
    fn nud(&self, cursor: &mut Cursor, token: &Token) -> Result<E, XPathError>;

    /// Continues an expression to the right of `left`, given the operator
    /// `token` (already consumed).
    fn led(&self, cursor: &mut Cursor, token: &Token, left: E) -> Result<E, XPathError>;
}

/// The classic TDOP driver: `expression(rbp)` calls the current token's
/// `nud`, then while `rbp < cur.lbp`, advances and calls the new token's
/// `led(left)` (spec.md §4.2).
pub fn expression<E>(
    cursor: &mut Cursor,
    grammar: &dyn Grammar<E>,
    rbp: u8,
) -> Result<E, XPathError> {
    let token = cursor.advance().clone();
    let mut left = grammar.nud(cursor, &token)?;
    while rbp < grammar.lbp(cursor.peek()) {
        let token = cursor.advance().clone();
        left = grammar.led(cursor, &token, left)?;
    }
    Ok(left)
}
