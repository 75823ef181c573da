// klam-core - Error types for the compiler and runtime
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Error types for compilation and evaluation.
//!
//! Every failure, whether raised by the compiler, a primitive or guest code,
//! is an [`Error`]. `trap-error` turns any of them into a guest Error value.

use klam_reader::{KlamError, KlamVal, ParseError, StreamError};
use thiserror::Error;

/// Result type for compilation and evaluation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during compilation or evaluation.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrong value kind at a primitive boundary
    #[error("{expected} expected, got {got}")]
    TypeMismatch { expected: &'static str, got: String },
    /// Vector or string access outside `0..length`
    #[error("index {index} is not within bounds of length {length}")]
    IndexOutOfRange { index: f64, length: usize },
    #[error("not a function: {0}")]
    NotCallable(String),
    /// Special form with the wrong shape
    #[error("{form} must have {expected}")]
    MalformedForm { form: String, expected: String },
    /// A value that cannot appear in source forms
    #[error("invalid syntax: {0}")]
    InvalidSyntax(String),
    #[error("no condition was true")]
    NoConditionTrue,
    #[error("{table} {name} is not defined")]
    UnboundGlobal { table: &'static str, name: String },
    /// A host capability that was not configured
    #[error("{0} not supported")]
    UnsupportedOperation(String),
    /// Raised from guest code with `simple-error`
    #[error("{0}")]
    UserRaised(String),
    /// Non-finite arithmetic result
    #[error("arithmetic error: {0}")]
    Arithmetic(String),
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Internal error - invariant violation
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a type mismatch naming the offending value.
    pub fn type_mismatch(expected: &'static str, got: &KlamVal) -> Self {
        Error::TypeMismatch {
            expected,
            got: got.to_string(),
        }
    }

    /// Create a malformed-form error.
    pub fn malformed(form: impl Into<String>, expected: impl Into<String>) -> Self {
        Error::MalformedForm {
            form: form.into(),
            expected: expected.into(),
        }
    }

    pub fn unbound_function(name: impl Into<String>) -> Self {
        Error::UnboundGlobal {
            table: "function",
            name: name.into(),
        }
    }

    pub fn unbound_value(name: impl Into<String>) -> Self {
        Error::UnboundGlobal {
            table: "value",
            name: name.into(),
        }
    }

    pub fn unsupported(capability: impl Into<String>) -> Self {
        Error::UnsupportedOperation(capability.into())
    }

    /// The guest Error value `trap-error` hands to its handler.
    pub fn to_guest(&self) -> KlamError {
        KlamError::new(self.to_string())
    }
}

impl From<Error> for KlamError {
    fn from(e: Error) -> Self {
        e.to_guest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_raised_message_is_verbatim() {
        let err = Error::UserRaised("boom".into());
        assert_eq!(err.to_guest().message(), "boom");
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            Error::type_mismatch("number", &KlamVal::string("x")).to_string(),
            "number expected, got \"x\""
        );
        assert_eq!(
            Error::malformed("let", "3 argument forms").to_string(),
            "let must have 3 argument forms"
        );
        assert_eq!(
            Error::unbound_function("foo").to_string(),
            "function foo is not defined"
        );
        assert_eq!(
            Error::IndexOutOfRange {
                index: 3.0,
                length: 3
            }
            .to_string(),
            "index 3 is not within bounds of length 3"
        );
    }

    #[test]
    fn test_stream_errors_convert() {
        let err: Error = StreamError::Unsupported("standard output".into()).into();
        assert_eq!(err.to_string(), "standard output not supported");
    }
}
