// klam-core - Arithmetic built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Arithmetic and numeric comparison: + - * / > < >= <=
//!
//! All numbers are doubles. A result that is not finite (division by zero,
//! overflow to infinity) is an arithmetic error rather than a guest value.

use klam_reader::KlamVal;

use crate::cast::as_number;
use crate::error::{Error, Result};
use crate::runtime::Runtime;

use super::{finite, fixed};

fn operands(name: &str, args: &[KlamVal]) -> Result<(f64, f64)> {
    let [x, y] = fixed::<2>(name, args)?;
    Ok((as_number(x)?, as_number(y)?))
}

pub(super) fn builtin_add(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let (x, y) = operands("+", args)?;
    finite("+", x + y)
}

pub(super) fn builtin_sub(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let (x, y) = operands("-", args)?;
    finite("-", x - y)
}

pub(super) fn builtin_mul(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let (x, y) = operands("*", args)?;
    finite("*", x * y)
}

pub(super) fn builtin_div(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let (x, y) = operands("/", args)?;
    if y == 0.0 {
        return Err(Error::Arithmetic("division by zero".to_string()));
    }
    finite("/", x / y)
}

pub(super) fn builtin_gt(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let (x, y) = operands(">", args)?;
    Ok(KlamVal::boolean(x > y))
}

pub(super) fn builtin_lt(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let (x, y) = operands("<", args)?;
    Ok(KlamVal::boolean(x < y))
}

pub(super) fn builtin_ge(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let (x, y) = operands(">=", args)?;
    Ok(KlamVal::boolean(x >= y))
}

pub(super) fn builtin_le(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let (x, y) = operands("<=", args)?;
    Ok(KlamVal::boolean(x <= y))
}
