// klam-core - String built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! String operations. Strings are indexed by character, not by byte.

use klam_reader::{KlamVal, show};

use crate::cast::{as_index, as_size, as_str};
use crate::error::{Error, Result};
use crate::runtime::Runtime;

use super::fixed;

/// Everything after the first character.
pub(super) fn builtin_tlstr(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [s] = fixed::<1>("tlstr", args)?;
    let mut chars = as_str(s)?.chars();
    match chars.next() {
        Some(_) => Ok(KlamVal::string(chars.as_str())),
        None => Err(Error::type_mismatch("non-empty string", s)),
    }
}

pub(super) fn builtin_cn(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [s, t] = fixed::<2>("cn", args)?;
    let joined = format!("{}{}", as_str(s)?, as_str(t)?);
    Ok(KlamVal::string(&joined))
}

/// Code point of the first character.
pub(super) fn builtin_string_to_n(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [s] = fixed::<1>("string->n", args)?;
    match as_str(s)?.chars().next() {
        Some(c) => Ok(KlamVal::Number(f64::from(u32::from(c)))),
        None => Err(Error::type_mismatch("non-empty string", s)),
    }
}

/// One-character string with the given code point.
pub(super) fn builtin_n_to_string(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [n] = fixed::<1>("n->string", args)?;
    let c = u32::try_from(as_size(n)?)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| Error::type_mismatch("character code", n))?;
    Ok(KlamVal::string(c.encode_utf8(&mut [0u8; 4])))
}

pub(super) fn builtin_pos(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [s, i] = fixed::<2>("pos", args)?;
    let text = as_str(s)?;
    let index = as_index(i, text.chars().count())?;
    let c = text
        .chars()
        .nth(index)
        .ok_or_else(|| Error::Internal("character index checked above".to_string()))?;
    Ok(KlamVal::string(c.encode_utf8(&mut [0u8; 4])))
}

/// Canonical text of any value.
pub(super) fn builtin_str(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [x] = fixed::<1>("str", args)?;
    Ok(KlamVal::string(&show(x)))
}
