//! Error surface for the full grammar layer. Re-exports the shared
//! [`xpath_core::ErrorCode`]/[`xpath_core::XPathError`] catalogue (spec.md
//! §7) and adds constructors for the error shapes the evaluator and
//! function library raise most often.

pub use xpath_core::error::{ErrorCode, XPathError};

pub fn cardinality(expected: &str, actual: usize) -> XPathError {
    XPathError::new(
        ErrorCode::XPTY0004,
        format!("expected {} item(s), got {}", expected, actual),
    )
}

pub fn function_error(name: &str, message: impl Into<String>) -> XPathError {
    XPathError::new(ErrorCode::FORG0001, format!("{}(): {}", name, message.into()))
}

pub fn unknown_variable(name: &str) -> XPathError {
    XPathError::new(ErrorCode::XPST0008, format!("unknown variable ${}", name))
}

pub fn div_by_zero() -> XPathError {
    XPathError::new(ErrorCode::FOAR0001, "division by zero")
}

pub fn invalid_cast(from: &str, to: &str) -> XPathError {
    XPathError::new(ErrorCode::FOCA0002, format!("cannot cast {} to {}", from, to))
}

pub fn ebv_error(message: impl Into<String>) -> XPathError {
    XPathError::new(ErrorCode::FORG0006, message.into())
}
