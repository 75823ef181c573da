// klam-core - List built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use klam_reader::KlamVal;

use crate::error::{Error, Result};
use crate::runtime::Runtime;

use super::fixed;

pub(super) fn builtin_cons(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [head, tail] = fixed::<2>("cons", args)?;
    Ok(KlamVal::cons(head.clone(), tail.clone()))
}

pub(super) fn builtin_hd(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    match fixed::<1>("hd", args)? {
        [KlamVal::Cons(cell)] => Ok(cell.head.clone()),
        [other] => Err(Error::type_mismatch("cons", other)),
    }
}

pub(super) fn builtin_tl(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    match fixed::<1>("tl", args)? {
        [KlamVal::Cons(cell)] => Ok(cell.tail.clone()),
        [other] => Err(Error::type_mismatch("cons", other)),
    }
}
