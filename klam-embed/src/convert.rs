// klam-embed - Type conversion traits
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Type conversion between Rust and guest values.
//!
//! This module provides the [`IntoKlamVal`] and [`FromKlamVal`] traits for
//! converting between Rust types and [`KlamVal`].
//!
//! # Built-in Conversions
//!
//! | Rust Type | Guest Type |
//! |-----------|------------|
//! | `()` | `()` (the empty list) |
//! | `bool` | the symbols `true` / `false` |
//! | `i32`, `i64`, `usize` | integral number |
//! | `f64` | number |
//! | `String`, `&str` | string |
//! | `Vec<T>` | proper list |
//!
//! # Custom Conversions
//!
//! ```rust
//! use klam_embed::{Error, FromKlamVal, IntoKlamVal, KlamVal, Result};
//!
//! struct Point { x: f64, y: f64 }
//!
//! impl IntoKlamVal for Point {
//!     fn into_klam_val(self) -> KlamVal {
//!         KlamVal::list([KlamVal::Number(self.x), KlamVal::Number(self.y)])
//!     }
//! }
//!
//! impl FromKlamVal for Point {
//!     fn from_klam_val(val: &KlamVal) -> Result<Self> {
//!         match val.to_vec().as_deref() {
//!             Some([x, y]) => Ok(Point {
//!                 x: f64::from_klam_val(x)?,
//!                 y: f64::from_klam_val(y)?,
//!             }),
//!             _ => Err(Error::type_mismatch("list of 2 numbers", val)),
//!         }
//!     }
//! }
//! ```

use std::rc::Rc;

use klam_core::{Error, Result};
use klam_reader::KlamVal;

/// Convert a Rust type into a `KlamVal`.
pub trait IntoKlamVal {
    fn into_klam_val(self) -> KlamVal;
}

/// Convert a `KlamVal` into a Rust type.
pub trait FromKlamVal: Sized {
    fn from_klam_val(val: &KlamVal) -> Result<Self>;
}

// ============================================================================
// IntoKlamVal implementations
// ============================================================================

impl IntoKlamVal for KlamVal {
    fn into_klam_val(self) -> KlamVal {
        self
    }
}

impl IntoKlamVal for () {
    fn into_klam_val(self) -> KlamVal {
        KlamVal::Empty
    }
}

impl IntoKlamVal for bool {
    fn into_klam_val(self) -> KlamVal {
        KlamVal::boolean(self)
    }
}

impl IntoKlamVal for f64 {
    fn into_klam_val(self) -> KlamVal {
        KlamVal::Number(self)
    }
}

impl IntoKlamVal for i64 {
    fn into_klam_val(self) -> KlamVal {
        KlamVal::Number(self as f64)
    }
}

impl IntoKlamVal for i32 {
    fn into_klam_val(self) -> KlamVal {
        KlamVal::Number(f64::from(self))
    }
}

impl IntoKlamVal for usize {
    fn into_klam_val(self) -> KlamVal {
        KlamVal::Number(self as f64)
    }
}

impl IntoKlamVal for String {
    fn into_klam_val(self) -> KlamVal {
        KlamVal::Str(Rc::from(self))
    }
}

impl IntoKlamVal for &str {
    fn into_klam_val(self) -> KlamVal {
        KlamVal::string(self)
    }
}

impl IntoKlamVal for Rc<str> {
    fn into_klam_val(self) -> KlamVal {
        KlamVal::Str(self)
    }
}

impl<T: IntoKlamVal> IntoKlamVal for Vec<T> {
    fn into_klam_val(self) -> KlamVal {
        KlamVal::list(self.into_iter().map(IntoKlamVal::into_klam_val))
    }
}

// ============================================================================
// FromKlamVal implementations
// ============================================================================

impl FromKlamVal for KlamVal {
    fn from_klam_val(val: &KlamVal) -> Result<Self> {
        Ok(val.clone())
    }
}

impl FromKlamVal for () {
    fn from_klam_val(val: &KlamVal) -> Result<Self> {
        match val {
            KlamVal::Empty => Ok(()),
            other => Err(Error::type_mismatch("()", other)),
        }
    }
}

impl FromKlamVal for bool {
    fn from_klam_val(val: &KlamVal) -> Result<Self> {
        val.as_bool()
            .ok_or_else(|| Error::type_mismatch("boolean", val))
    }
}

impl FromKlamVal for f64 {
    fn from_klam_val(val: &KlamVal) -> Result<Self> {
        match val {
            KlamVal::Number(n) => Ok(*n),
            other => Err(Error::type_mismatch("number", other)),
        }
    }
}

impl FromKlamVal for i64 {
    fn from_klam_val(val: &KlamVal) -> Result<Self> {
        match val {
            // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
            KlamVal::Number(n)
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n < i64::MAX as f64 =>
            {
                Ok(*n as i64)
            }
            other => Err(Error::type_mismatch("integer", other)),
        }
    }
}

impl FromKlamVal for i32 {
    fn from_klam_val(val: &KlamVal) -> Result<Self> {
        let n = i64::from_klam_val(val)?;
        i32::try_from(n).map_err(|_| Error::type_mismatch("32-bit integer", val))
    }
}

impl FromKlamVal for usize {
    fn from_klam_val(val: &KlamVal) -> Result<Self> {
        let n = i64::from_klam_val(val)?;
        usize::try_from(n).map_err(|_| Error::type_mismatch("non-negative integer", val))
    }
}

impl FromKlamVal for String {
    fn from_klam_val(val: &KlamVal) -> Result<Self> {
        match val {
            KlamVal::Str(s) => Ok(s.to_string()),
            other => Err(Error::type_mismatch("string", other)),
        }
    }
}

impl<T: FromKlamVal> FromKlamVal for Vec<T> {
    fn from_klam_val(val: &KlamVal) -> Result<Self> {
        let items = val
            .to_vec()
            .ok_or_else(|| Error::type_mismatch("list", val))?;
        items.iter().map(T::from_klam_val).collect()
    }
}

// ============================================================================
// Convenience functions
// ============================================================================

/// Convert a Rust value into a `KlamVal`.
#[must_use]
pub fn to_klam<T: IntoKlamVal>(value: T) -> KlamVal {
    value.into_klam_val()
}

/// Convert a `KlamVal` into a Rust type.
pub fn from_klam<T: FromKlamVal>(val: &KlamVal) -> Result<T> {
    T::from_klam_val(val)
}
