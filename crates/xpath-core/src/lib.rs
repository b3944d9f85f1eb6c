//! `xpath-core`: the node model, the tokenizer, the Pratt parser core and
//! the error catalogue shared by every XPath grammar layer (1.0 through
//! 3.1). See the `xpath` crate for the actual grammar, value model and
//! evaluator built on top of this foundation.

pub mod ast;
pub mod axes;
pub mod datasource;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{Axis, BinaryOperator, KindTest, LocationPath, NodeTest, Step, UnaryOperator};
pub use datasource::{DataSourceNode, NodeType, QName};
pub use error::{ErrorCode, XPathError};
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{expression, Cursor, Grammar};

// Re-export test utilities for integration testing in downstream crates.
pub use datasource::tests as test_support;
