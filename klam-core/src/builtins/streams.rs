// klam-core - Stream built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Byte I/O over host-supplied streams.

use klam_reader::KlamVal;
use log::warn;

use crate::cast::{as_size, as_stream, as_str, as_symbol};
use crate::error::{Error, Result};
use crate::runtime::Runtime;

use super::fixed;

/// `(open Path Mode)` where `Mode` is `in` or `out`.
pub(super) fn builtin_open(rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [path, mode] = fixed::<2>("open", args)?;
    let path = as_str(path)?;
    let (callback, capability) = match as_symbol(mode)?.name() {
        "in" => (rt.options().open_read(), "open(in)"),
        "out" => (rt.options().open_write(), "open(out)"),
        _ => return Err(Error::type_mismatch("in or out", mode)),
    };
    match callback {
        Some(open) => open(path).map(KlamVal::Stream),
        None => {
            warn!("{} requested for {} but not configured", capability, path);
            Err(Error::unsupported(capability))
        }
    }
}

pub(super) fn builtin_close(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [stream] = fixed::<1>("close", args)?;
    as_stream(stream)?.close()?;
    Ok(KlamVal::Empty)
}

/// The next byte, or -1 at end of stream.
pub(super) fn builtin_read_byte(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [stream] = fixed::<1>("read-byte", args)?;
    let byte = as_stream(stream)?.read_byte()?;
    Ok(KlamVal::Number(byte.map_or(-1.0, f64::from)))
}

/// `(write-byte Byte Stream)`, returning the byte.
pub(super) fn builtin_write_byte(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [byte, stream] = fixed::<2>("write-byte", args)?;
    let b = u8::try_from(as_size(byte)?).map_err(|_| Error::type_mismatch("byte", byte))?;
    as_stream(stream)?.write_byte(b)?;
    Ok(byte.clone())
}
