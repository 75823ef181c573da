// klam-core - Type predicates and equality
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use klam_reader::{KlamVal, equate};

use crate::error::Result;
use crate::runtime::Runtime;

use super::fixed;

fn test(name: &str, args: &[KlamVal], pred: fn(&KlamVal) -> bool) -> Result<KlamVal> {
    let [x] = fixed::<1>(name, args)?;
    Ok(KlamVal::boolean(pred(x)))
}

pub(super) fn builtin_number_p(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    test("number?", args, KlamVal::is_number)
}

pub(super) fn builtin_string_p(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    test("string?", args, KlamVal::is_string)
}

pub(super) fn builtin_symbol_p(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    test("symbol?", args, KlamVal::is_symbol)
}

pub(super) fn builtin_absvector_p(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    test("absvector?", args, KlamVal::is_vector)
}

pub(super) fn builtin_cons_p(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    test("cons?", args, KlamVal::is_cons)
}

/// Structural equality.
pub(super) fn builtin_eq(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [x, y] = fixed::<2>("=", args)?;
    Ok(KlamVal::boolean(equate(x, y)))
}
