// klam-core - Time built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use klam_reader::KlamVal;

use crate::cast::as_symbol;
use crate::error::{Error, Result};
use crate::runtime::Runtime;

use super::fixed;

/// `(get-time unix)` is wall-clock milliseconds; `(get-time run)` is
/// milliseconds since the runtime was created.
pub(super) fn builtin_get_time(rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [mode] = fixed::<1>("get-time", args)?;
    match as_symbol(mode)?.name() {
        "unix" => Ok(KlamVal::Number(rt.options().now_millis())),
        "run" => Ok(KlamVal::Number(rt.elapsed_millis())),
        _ => Err(Error::type_mismatch("unix or run", mode)),
    }
}
