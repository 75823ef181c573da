// klam-core - Common test utilities
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared test helpers for klam-core integration tests.
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Available Helpers
//!
//! - [`eval_str`] - Evaluate source in a fresh synchronous runtime
//! - [`eval_all`] - Evaluate source in an existing runtime
//! - [`eval_err`] - Evaluate source that must fail, returning the error
//! - [`new_runtime`] - Create a synchronous runtime with default options
//!
//! # Macros
//!
//! - [`assert_eval!`] - Assert that code evaluates to an expected value
//! - [`assert_eval_err!`] - Assert that code produces an error

#[allow(unused_imports)]
pub use klam_core::{Error, Options, Runtime};
#[allow(unused_imports)]
pub use klam_reader::{KlamVal, Parser};

/// Create a synchronous runtime with default options.
#[must_use]
pub fn new_runtime() -> Runtime {
    Runtime::new(Options::new())
}

/// Evaluate every form in `s` in a fresh runtime, returning the last value.
///
/// # Returns
///
/// Returns the evaluated value, or an error message string.
#[must_use]
pub fn eval_str(s: &str) -> Result<KlamVal, String> {
    eval_all(s, &new_runtime())
}

/// Evaluate every form in `s` in the given runtime.
#[must_use]
pub fn eval_all(s: &str, rt: &Runtime) -> Result<KlamVal, String> {
    rt.eval(s).map_err(|e| e.to_string())
}

/// Evaluate `s` in a fresh runtime, expecting failure.
///
/// # Panics
///
/// Panics if evaluation succeeds.
#[must_use]
#[allow(dead_code)]
pub fn eval_err(s: &str) -> Error {
    match new_runtime().eval(s) {
        Ok(value) => panic!("Expected error for '{}' but got {}", s, value),
        Err(e) => e,
    }
}

/// Parse a single value, for building expected results.
#[must_use]
#[allow(dead_code)]
pub fn read(s: &str) -> KlamVal {
    Parser::parse_str(s)
        .expect("expected value should parse")
        .expect("expected value should not be empty")
}

/// Assert that evaluating `input` produces the expected value.
///
/// # Example
///
/// ```ignore
/// assert_eval!("(+ 1 2)", KlamVal::Number(3.0));
/// ```
#[macro_export]
macro_rules! assert_eval {
    ($input:expr, $expected:expr) => {
        let result = $crate::common::eval_str($input);
        assert!(
            result.is_ok(),
            "Failed to evaluate '{}': {:?}",
            $input,
            result.err()
        );
        assert_eq!(
            result.unwrap(),
            $expected,
            "Evaluation of '{}' did not match expected",
            $input
        );
    };
}

/// Assert that evaluating `input` produces an error.
///
/// # Example
///
/// ```ignore
/// assert_eval_err!("(+ 1 a)");
/// ```
#[macro_export]
macro_rules! assert_eval_err {
    ($input:expr) => {
        let result = $crate::common::eval_str($input);
        assert!(
            result.is_err(),
            "Expected error for '{}' but got {:?}",
            $input,
            result.ok()
        );
    };
}
