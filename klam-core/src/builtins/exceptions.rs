// klam-core - Error built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use klam_reader::KlamVal;

use crate::cast::{as_error, as_str};
use crate::error::{Error, Result};
use crate::runtime::Runtime;

use super::fixed;

/// Raise an error carrying the given message.
pub(super) fn builtin_simple_error(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [message] = fixed::<1>("simple-error", args)?;
    Err(Error::UserRaised(as_str(message)?.to_string()))
}

pub(super) fn builtin_error_to_string(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [err] = fixed::<1>("error-to-string", args)?;
    Ok(KlamVal::string(as_error(err)?.message()))
}
