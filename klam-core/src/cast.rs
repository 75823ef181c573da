// klam-core - Checked casts at primitive boundaries
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Checked conversions from [`KlamVal`] to host types.
//!
//! Each helper fails with [`Error::TypeMismatch`] naming the expected kind and
//! the offending value.

use klam_reader::{KlamError, KlamStream, KlamVal, KlamVector, Symbol};
use num_traits::ToPrimitive;

use crate::error::{Error, Result};

pub fn as_number(value: &KlamVal) -> Result<f64> {
    match value {
        KlamVal::Number(n) => Ok(*n),
        other => Err(Error::type_mismatch("number", other)),
    }
}

pub fn as_str(value: &KlamVal) -> Result<&str> {
    match value {
        KlamVal::Str(s) => Ok(s),
        other => Err(Error::type_mismatch("string", other)),
    }
}

pub fn as_symbol(value: &KlamVal) -> Result<&Symbol> {
    match value {
        KlamVal::Symbol(s) => Ok(s),
        other => Err(Error::type_mismatch("symbol", other)),
    }
}

/// The guest boolean sentinels; any other value is a type mismatch.
pub fn as_boolean(value: &KlamVal) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| Error::type_mismatch("boolean", value))
}

pub fn as_vector(value: &KlamVal) -> Result<&KlamVector> {
    match value {
        KlamVal::Vector(v) => Ok(v),
        other => Err(Error::type_mismatch("absvector", other)),
    }
}

pub fn as_error(value: &KlamVal) -> Result<&KlamError> {
    match value {
        KlamVal::Error(e) => Ok(e),
        other => Err(Error::type_mismatch("error", other)),
    }
}

pub fn as_stream(value: &KlamVal) -> Result<&KlamStream> {
    match value {
        KlamVal::Stream(s) => Ok(s),
        other => Err(Error::type_mismatch("stream", other)),
    }
}

/// A non-negative integral number usable as a size.
pub fn as_size(value: &KlamVal) -> Result<usize> {
    let n = as_number(value)?;
    integral(n)
        .and_then(|n| n.to_usize())
        .ok_or_else(|| Error::type_mismatch("non-negative integer", value))
}

/// An index checked against `length`.
///
/// Fractional indexes are type mismatches; integral indexes outside
/// `0..length` are out of range.
pub fn as_index(value: &KlamVal, length: usize) -> Result<usize> {
    let n = as_number(value)?;
    let Some(whole) = integral(n) else {
        return Err(Error::type_mismatch("integer", value));
    };
    match whole.to_usize() {
        Some(index) if index < length => Ok(index),
        _ => Err(Error::IndexOutOfRange { index: n, length }),
    }
}

fn integral(n: f64) -> Option<f64> {
    (n.is_finite() && n.fract() == 0.0).then_some(n)
}
