//! The XPath error catalogue: symbolic error codes (XPST/XPTY/XPDY/FORG/...)
//! plus a human message and an optional source span, per the W3C error
//! namespace conventions.

use std::fmt;

/// A symbolic XPath/XQuery error code, e.g. `XPST0003`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum ErrorCode {
    /// Parser: generic syntax error.
    XPST0003,
    /// Parser: unknown namespace prefix.
    XPST0008,
    /// Parser: variable not in scope (static).
    XPST0008Var,
    /// Parser: axis step has no context item type known statically (unused, reserved).
    XPST0010,
    /// Parser: unknown function or wrong arity.
    XPST0017,
    /// Parser: last step of a path is not singleton-typed as required.
    XPST0019,
    /// Parser: the context item has an inappropriate static type.
    XPST0057,
    /// Parser: unknown schema type in a sequence type.
    XPST0051,
    /// Parser: an inline function's parameter names are not unique.
    XPST0081,
    /// Dynamic: mixing nodes and atomic values in a path result.
    XPTY0018,
    /// Dynamic: the context item is absent.
    XPDY0002,
    /// Dynamic: wrong item kind or cardinality violation.
    XPTY0004,
    /// Dynamic: cardinality of the last step in a path expression.
    XPTY0019,
    /// Dynamic: required singleton, got a sequence.
    XPTY0020,
    /// Generic function: invalid argument (catch-all).
    FORG0001,
    /// Generic function: invalid argument to `fn:resolve-uri` or similar.
    FORG0002,
    /// Generic function: empty-sequence argument to e.g. `fn:zero-or-one`.
    FORG0003,
    /// Generic function: the two arguments to `fn:id`/`fn:idref` have no node.
    FORG0004,
    /// Generic function: invalid value for `fn:compare` collation.
    FORG0005,
    /// Generic function: effective-boolean-value error.
    FORG0006,
    /// Generic function: both arguments of `fn:deep-equal` must be comparable.
    FORG0008,
    /// Generic function: `fn:error` raised explicitly with no code.
    FOER0000,
    /// Arithmetic: division by zero (integer/decimal).
    FOAR0001,
    /// Arithmetic: numeric overflow/underflow.
    FOAR0002,
    /// Cast: invalid lexical representation.
    FOCA0002,
    /// Cast: input value too large for the target type.
    FOCA0003,
    /// Date/time: overflow/underflow.
    FODT0001,
    /// Date/time: overflow/underflow in duration.
    FODT0002,
    /// Date/time: invalid timezone value.
    FODT0003,
    /// Document function: error retrieving a resource.
    FODC0002,
    /// Document function: invalid collection URI.
    FODC0004,
    /// Namespace: invalid argument to namespace-related function.
    FONS0004,
    /// Regex: invalid regular expression.
    FORX0002,
    /// Regex: invalid replacement string.
    FORX0004,
    /// Unparsed text: resource not found or wrong encoding.
    FOUT1170,
    /// JSON (3.1): invalid JSON, used by map/array helpers when relevant.
    FOJS0001,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A zero-based half-open byte offset range into the source expression text.
pub type Span = (usize, usize);

#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {message}")]
pub struct XPathError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Option<Span>,
}

impl XPathError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::XPST0003, message)
    }

    pub fn unknown_function(name: impl Into<String>, arity: usize) -> Self {
        Self::new(
            ErrorCode::XPST0017,
            format!("unknown function {}#{}", name.into(), arity),
        )
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::XPTY0004, message)
    }

    pub fn no_context_item() -> Self {
        Self::new(ErrorCode::XPDY0002, "context item is absent")
    }
}
