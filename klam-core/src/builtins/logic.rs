// klam-core - Boolean built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Function forms of `if`, `and` and `or`.
//!
//! These run only when the keywords are used as values or partially
//! applied; full applications compile to short-circuiting code instead.

use klam_reader::KlamVal;

use crate::cast::as_boolean;
use crate::error::Result;
use crate::runtime::Runtime;

use super::fixed;

pub(super) fn builtin_if(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [test, then, otherwise] = fixed::<3>("if", args)?;
    Ok(if as_boolean(test)? {
        then.clone()
    } else {
        otherwise.clone()
    })
}

pub(super) fn builtin_and(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [x, y] = fixed::<2>("and", args)?;
    Ok(KlamVal::boolean(as_boolean(x)? && as_boolean(y)?))
}

pub(super) fn builtin_or(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [x, y] = fixed::<2>("or", args)?;
    Ok(KlamVal::boolean(as_boolean(x)? || as_boolean(y)?))
}
