// klam-core - Symbol and global value built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use klam_reader::{KlamVal, intern};

use crate::cast::{as_str, as_symbol};
use crate::error::Result;
use crate::runtime::Runtime;

use super::fixed;

pub(super) fn builtin_intern(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [name] = fixed::<1>("intern", args)?;
    Ok(KlamVal::Symbol(intern(as_str(name)?)))
}

/// Assign a global value and return it.
pub(super) fn builtin_set(rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [name, value] = fixed::<2>("set", args)?;
    rt.globals().set_value(as_symbol(name)?.clone(), value.clone());
    Ok(value.clone())
}

pub(super) fn builtin_value(rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [name] = fixed::<1>("value", args)?;
    rt.globals().value(as_symbol(name)?)
}

/// Type annotations have no run-time effect.
pub(super) fn builtin_type(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [x, _] = fixed::<2>("type", args)?;
    Ok(x.clone())
}
