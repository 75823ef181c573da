// klam-core - Built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Primitive functions and global constants.
//!
//! Primitives are global functions with fixed arities, so they curry like any
//! other function value.

mod arithmetic;
mod datetime;
mod exceptions;
mod lists;
mod logic;
mod predicates;
mod streams;
mod strings;
mod symbols;
mod vectors;

use std::rc::Rc;

use futures::FutureExt;
use klam_reader::{KlamFn, KlamVal, intern};

use crate::arity::{FnImpl, PrimitiveFn};
use crate::error::{Error, Result};
use crate::runtime::Runtime;

use arithmetic::{
    builtin_add, builtin_div, builtin_ge, builtin_gt, builtin_le, builtin_lt, builtin_mul,
    builtin_sub,
};
use datetime::builtin_get_time;
use exceptions::{builtin_error_to_string, builtin_simple_error};
use lists::{builtin_cons, builtin_hd, builtin_tl};
use logic::{builtin_and, builtin_if, builtin_or};
use predicates::{
    builtin_absvector_p, builtin_cons_p, builtin_eq, builtin_number_p, builtin_string_p,
    builtin_symbol_p,
};
use streams::{builtin_close, builtin_open, builtin_read_byte, builtin_write_byte};
use strings::{
    builtin_cn, builtin_n_to_string, builtin_pos, builtin_str, builtin_string_to_n,
    builtin_tlstr,
};
use symbols::{builtin_intern, builtin_set, builtin_type, builtin_value};
use vectors::{builtin_absvector, builtin_absvector_get, builtin_absvector_set};

/// Register all primitive functions in the runtime's global environment.
pub fn register_builtins(rt: &Runtime) {
    // Control
    define(rt, "if", 3, builtin_if);
    define(rt, "and", 2, builtin_and);
    define(rt, "or", 2, builtin_or);

    // Streams
    define(rt, "open", 2, builtin_open);
    define(rt, "close", 1, builtin_close);
    define(rt, "read-byte", 1, builtin_read_byte);
    define(rt, "write-byte", 2, builtin_write_byte);

    // Type predicates and equality
    define(rt, "number?", 1, builtin_number_p);
    define(rt, "string?", 1, builtin_string_p);
    define(rt, "symbol?", 1, builtin_symbol_p);
    define(rt, "absvector?", 1, builtin_absvector_p);
    define(rt, "cons?", 1, builtin_cons_p);
    define(rt, "=", 2, builtin_eq);

    // Lists
    define(rt, "hd", 1, builtin_hd);
    define(rt, "tl", 1, builtin_tl);
    define(rt, "cons", 2, builtin_cons);

    // Strings
    define(rt, "tlstr", 1, builtin_tlstr);
    define(rt, "cn", 2, builtin_cn);
    define(rt, "string->n", 1, builtin_string_to_n);
    define(rt, "n->string", 1, builtin_n_to_string);
    define(rt, "pos", 2, builtin_pos);
    define(rt, "str", 1, builtin_str);

    // Vectors
    define(rt, "absvector", 1, builtin_absvector);
    define(rt, "<-absvector", 2, builtin_absvector_get);
    define(rt, "absvector->", 3, builtin_absvector_set);

    // Arithmetic and comparison
    define(rt, "+", 2, builtin_add);
    define(rt, "-", 2, builtin_sub);
    define(rt, "*", 2, builtin_mul);
    define(rt, "/", 2, builtin_div);
    define(rt, ">", 2, builtin_gt);
    define(rt, "<", 2, builtin_lt);
    define(rt, ">=", 2, builtin_ge);
    define(rt, "<=", 2, builtin_le);

    // Symbols and globals
    define(rt, "intern", 1, builtin_intern);
    define(rt, "set", 2, builtin_set);
    define(rt, "value", 1, builtin_value);
    define(rt, "type", 2, builtin_type);

    // Time and errors
    define(rt, "get-time", 1, builtin_get_time);
    define(rt, "simple-error", 1, builtin_simple_error);
    define(rt, "error-to-string", 1, builtin_error_to_string);

    define_eval_kl(rt);
}

/// Install the global constants derived from the runtime's options.
pub fn install_constants(rt: &Runtime) {
    let options = rt.options();
    let constants = [
        ("*language*", KlamVal::string("Rust")),
        ("*implementation*", KlamVal::string(options.implementation())),
        ("*release*", KlamVal::string(options.release())),
        ("*os*", KlamVal::string(options.os())),
        ("*port*", KlamVal::string(options.port())),
        ("*porters*", KlamVal::string(options.porters())),
        ("*stinput*", KlamVal::Stream(options.stinput())),
        ("*stoutput*", KlamVal::Stream(options.stoutput())),
        ("*sterror*", KlamVal::Stream(options.sterror())),
    ];
    for (name, value) in constants {
        rt.globals().set_value(intern(name), value);
    }
}

fn define(rt: &Runtime, name: &str, arity: usize, func: PrimitiveFn) {
    let imp = FnImpl::Primitive {
        runtime: rt.downgrade(),
        func,
    };
    rt.define_function(name, KlamFn::new(name, Some(arity), imp));
}

/// `eval-kl` compiles its argument at run time, and evaluating it may
/// suspend, so it is an asynchronous function rather than a primitive.
fn define_eval_kl(rt: &Runtime) {
    let weak = rt.downgrade();
    let imp = FnImpl::Async(Rc::new(move |args: Vec<KlamVal>| {
        let weak = weak.clone();
        async move {
            let rt = weak.upgrade()?;
            let form = args.into_iter().next().unwrap_or(KlamVal::Empty);
            rt.eval_form_async(&form).await
        }
        .boxed_local()
    }));
    rt.define_function("eval-kl", KlamFn::new("eval-kl", Some(1), imp));
}

/// Arguments of a fixed-arity primitive. The arity runtime guarantees the
/// count, so a mismatch is an internal error.
fn fixed<'a, const N: usize>(name: &str, args: &'a [KlamVal]) -> Result<&'a [KlamVal; N]> {
    args.try_into().map_err(|_| {
        Error::Internal(format!(
            "{} called with {} arguments, expected {}",
            name,
            args.len(),
            N
        ))
    })
}

/// Check that an arithmetic result can reach guest code.
fn finite(op: &str, n: f64) -> Result<KlamVal> {
    if n.is_finite() {
        Ok(KlamVal::Number(n))
    } else {
        Err(Error::Arithmetic(format!("{} produced a non-finite result", op)))
    }
}
