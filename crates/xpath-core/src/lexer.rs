//! The tokenizer (spec.md §4.1). Token *recognition* is regex-derived (an
//! alternation of patterns, longest match wins); token *instances* carry a
//! kind, a source span and the raw text, ready to be handed to the Pratt
//! parser core in [`crate::parser`].

use crate::error::XPathError;
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// An NCName or QName (`foo`, `xs:string`, `*`, `prefix:*`, `*:local`).
    /// Re-tagged to a keyword by the parser's symbol table when a keyword
    /// position demands it (spec.md §4.1 "Token lookup rules").
    Name,
    IntegerLiteral(i64),
    DecimalLiteral(String),
    DoubleLiteral(f64),
    StringLiteral(String),
    /// A variable reference's name part, without the leading `$`.
    VarName,
    /// Punctuation/operator symbols: `(` `)` `[` `]` `{` `}` `,` `/` `//`
    /// `::` `:=` `=>` `?` `!` `|` `@` `.` `..` `+` `-` `*` `=` `!=` `<` `<=`
    /// `>` `>=` `<<` `>>`.
    Symbol,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The raw source text (for `Symbol`/`Name`, this is also the lookup
    /// key into the parser's symbol table).
    pub text: String,
    pub span: (usize, usize),
}

impl Token {
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

fn ncname_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*").unwrap())
}

fn double_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]*\.?[0-9]+[eE][+\-]?[0-9]+").unwrap())
}

fn decimal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]*\.[0-9]+|^[0-9]+\.").unwrap())
}

fn integer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+").unwrap())
}

/// Longest-match-wins multi-character operator symbols, tried before their
/// single-character prefixes (spec.md §4.1 "literals win over identifiers
/// when equal length").
const MULTI_CHAR_SYMBOLS: &[&str] = &[
    "<<", ">>", "::", ":=", "!=", "<=", ">=", "//", "..", "=>",
];

pub struct Lexer<'i> {
    input: &'i str,
    pos: usize,
}

impl<'i> Lexer<'i> {
    pub fn new(input: &'i str) -> Self {
        Self { input, pos: 0 }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, XPathError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.pos >= self.input.len() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    span: (self.pos, self.pos),
                });
                break;
            }
            tokens.push(self.next_token()?);
        }
        Ok(tokens)
    }

    fn rest(&self) -> &'i str {
        &self.input[self.pos..]
    }

    fn skip_trivia(&mut self) -> Result<(), XPathError> {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            if self.rest().starts_with("(:") {
                self.skip_comment()?;
                continue;
            }
            break;
        }
        Ok(())
    }

    /// `(: ... :)` comments nest (spec.md §4.1).
    fn skip_comment(&mut self) -> Result<(), XPathError> {
        let start = self.pos;
        self.pos += 2;
        let mut depth = 1usize;
        while depth > 0 {
            if self.pos >= self.input.len() {
                return Err(XPathError::parse("unterminated comment").with_span((start, self.pos)));
            }
            if self.rest().starts_with("(:") {
                depth += 1;
                self.pos += 2;
            } else if self.rest().starts_with(":)") {
                depth -= 1;
                self.pos += 2;
            } else {
                let c = self.rest().chars().next().unwrap();
                self.pos += c.len_utf8();
            }
        }
        Ok(())
    }

    fn next_token(&mut self) -> Result<Token, XPathError> {
        let start = self.pos;
        let c = self.rest().chars().next().unwrap();

        if c == '$' {
            self.pos += 1;
            let ws = self.pos;
            if let Some(m) = ncname_re().find(self.rest()) {
                self.pos += m.end();
            }
            // allow prefixed variable names, e.g. $ns:foo
            if self.rest().starts_with(':') && !self.rest().starts_with("::") {
                self.pos += 1;
                if let Some(m) = ncname_re().find(self.rest()) {
                    self.pos += m.end();
                }
            }
            return Ok(Token {
                kind: TokenKind::VarName,
                text: self.input[ws..self.pos].to_string(),
                span: (start, self.pos),
            });
        }

        if c == '"' || c == '\'' {
            return self.string_literal(c);
        }

        if c.is_ascii_digit() || (c == '.' && self.rest().chars().nth(1).is_some_and(|n| n.is_ascii_digit())) {
            return self.numeric_literal();
        }

        if c.is_alphabetic() || c == '_' {
            if let Some(m) = ncname_re().find(self.rest()) {
                self.pos += m.end();
                let mut text = self.input[start..self.pos].to_string();
                // Qualified name: prefix:local (but not the `::` axis separator).
                if self.rest().starts_with(':') && !self.rest().starts_with("::") {
                    let save = self.pos;
                    self.pos += 1;
                    if let Some(m2) = ncname_re().find(self.rest()) {
                        self.pos += m2.end();
                        text = self.input[start..self.pos].to_string();
                    } else if self.rest().starts_with('*') {
                        self.pos += 1;
                        text = self.input[start..self.pos].to_string();
                    } else {
                        self.pos = save;
                    }
                }
                return Ok(Token {
                    kind: TokenKind::Name,
                    text,
                    span: (start, self.pos),
                });
            }
        }

        if c == '*' {
            self.pos += 1;
            let mut text = "*".to_string();
            if self.rest().starts_with(':') && !self.rest().starts_with("::") {
                self.pos += 1;
                if let Some(m) = ncname_re().find(self.rest()) {
                    self.pos += m.end();
                    text = self.input[start..self.pos].to_string();
                }
            }
            return Ok(Token {
                kind: TokenKind::Name,
                text,
                span: (start, self.pos),
            });
        }

        if c == 'Q' && self.rest().starts_with("Q{") {
            let end = self
                .rest()
                .find('}')
                .ok_or_else(|| XPathError::parse("unterminated Q{uri} name").with_span((start, self.pos)))?;
            self.pos += end + 1;
            if let Some(m) = ncname_re().find(self.rest()) {
                self.pos += m.end();
            }
            return Ok(Token {
                kind: TokenKind::Name,
                text: self.input[start..self.pos].to_string(),
                span: (start, self.pos),
            });
        }

        for sym in MULTI_CHAR_SYMBOLS {
            if self.rest().starts_with(sym) {
                self.pos += sym.len();
                return Ok(Token {
                    kind: TokenKind::Symbol,
                    text: (*sym).to_string(),
                    span: (start, self.pos),
                });
            }
        }

        // Single-character symbol.
        self.pos += c.len_utf8();
        Ok(Token {
            kind: TokenKind::Symbol,
            text: c.to_string(),
            span: (start, self.pos),
        })
    }

    fn string_literal(&mut self, quote: char) -> Result<Token, XPathError> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            if self.pos >= self.input.len() {
                return Err(XPathError::parse("unterminated string literal").with_span((start, self.pos)));
            }
            let c = self.rest().chars().next().unwrap();
            if c == quote {
                self.pos += 1;
                // doubled-quote escaping: "" inside "..." is a literal quote.
                if self.rest().starts_with(quote) {
                    value.push(quote);
                    self.pos += 1;
                    continue;
                }
                break;
            }
            value.push(c);
            self.pos += c.len_utf8();
        }
        Ok(Token {
            kind: TokenKind::StringLiteral(value),
            text: self.input[start..self.pos].to_string(),
            span: (start, self.pos),
        })
    }

    fn numeric_literal(&mut self) -> Result<Token, XPathError> {
        let start = self.pos;
        if let Some(m) = double_re().find(self.rest()) {
            self.pos += m.end();
            let text = self.input[start..self.pos].to_string();
            let value: f64 = text
                .parse()
                .map_err(|_| XPathError::parse(format!("invalid double literal '{}'", text)))?;
            return Ok(Token { kind: TokenKind::DoubleLiteral(value), text, span: (start, self.pos) });
        }
        if let Some(m) = decimal_re().find(self.rest()) {
            self.pos += m.end();
            let text = self.input[start..self.pos].to_string();
            return Ok(Token { kind: TokenKind::DecimalLiteral(text.clone()), text, span: (start, self.pos) });
        }
        if let Some(m) = integer_re().find(self.rest()) {
            self.pos += m.end();
            let text = self.input[start..self.pos].to_string();
            let value: i64 = text
                .parse()
                .map_err(|_| XPathError::parse(format!("invalid integer literal '{}'", text)))?;
            return Ok(Token { kind: TokenKind::IntegerLiteral(value), text, span: (start, self.pos) });
        }
        Err(XPathError::parse("invalid numeric literal").with_span((start, self.pos)))
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, XPathError> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_path_with_predicate() {
        let tokens = tokenize("child::para[@id='p1']").unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["child", "::", "para", "[", "@", "id", "=", "'p1'", "]", ""]);
    }

    #[test]
    fn skips_nested_comments() {
        let tokens = tokenize("1 (: a (: nested :) comment :) + 2").unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["1", "+", "2", ""]);
    }

    #[test]
    fn distinguishes_multi_char_symbols() {
        let tokens = tokenize("1 <= 2 << 3 => f()").unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["1", "<=", "2", "<<", "3", "=>", "f", "(", ")", ""]);
    }

    #[test]
    fn tokenizes_qname_and_wildcard_forms() {
        let tokens = tokenize("xs:string | *:local | prefix:* | *").unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["xs:string", "|", "*:local", "|", "prefix:*", "|", "*", ""]);
    }
}
