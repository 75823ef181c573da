// klam-core - Arity and currying runtime
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Calling convention for function values.
//!
//! Every [`KlamFn`] created by this crate carries an [`FnImpl`]. [`run`]
//! compares the argument count with the declared arity:
//!
//! - equal, or arity unknown: the function is invoked directly
//! - fewer: a partial application of the remaining arity is returned
//! - more: the function is invoked with its arity's worth of arguments and
//!   the result is run with the rest

use std::rc::Rc;

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};
use klam_reader::{KlamFn, KlamVal};
use log::trace;

use crate::error::{Error, Result};
use crate::eval::Closure;
use crate::runtime::{Runtime, WeakRuntime};
use crate::trampoline::{Step, StepFuture, settle_async};

/// Signature of a built-in primitive.
pub type PrimitiveFn = fn(&Runtime, &[KlamVal]) -> Result<KlamVal>;

/// Host function that completes immediately.
pub type NativeFn = dyn Fn(&[KlamVal]) -> Result<KlamVal>;

/// Host function that may suspend.
pub type AsyncFn = dyn Fn(Vec<KlamVal>) -> LocalBoxFuture<'static, Result<KlamVal>>;

/// Implementation behind a function value.
pub enum FnImpl {
    Primitive {
        runtime: WeakRuntime,
        func: PrimitiveFn,
    },
    Native(Rc<NativeFn>),
    Async(Rc<AsyncFn>),
    /// Compiled guest code.
    Closure(Rc<Closure>),
    /// Arguments collected so far for a function of larger arity.
    Partial {
        target: KlamFn,
        bound: Vec<KlamVal>,
    },
}

/// Apply `target` to `args`, currying or overapplying as its arity demands.
///
/// The returned step may be a bounce when `target` ends in a tail call.
pub fn run(target: KlamFn, mut args: Vec<KlamVal>) -> StepFuture {
    match target.arity() {
        Some(arity) if args.is_empty() && arity > 0 => {
            future::ready(Ok(Step::Done(KlamVal::Function(target)))).boxed_local()
        }
        Some(arity) if args.len() < arity => {
            let curried = partial(target, args);
            future::ready(Ok(Step::Done(KlamVal::Function(curried)))).boxed_local()
        }
        Some(arity) if args.len() > arity => {
            let rest = args.split_off(arity);
            async move {
                match settle_async(invoke(&target, args)).await? {
                    KlamVal::Function(next) => run(next, rest).await,
                    other => Err(Error::NotCallable(other.to_string())),
                }
            }
            .boxed_local()
        }
        _ => invoke(&target, args),
    }
}

/// Invoke `target` with exactly `args`, ignoring its arity.
pub fn invoke(target: &KlamFn, args: Vec<KlamVal>) -> StepFuture {
    let Some(imp) = target.imp().downcast_ref::<FnImpl>() else {
        let err = Error::Internal(format!("function {} has no implementation", target.name()));
        return future::ready(Err(err)).boxed_local();
    };
    match imp {
        FnImpl::Primitive { runtime, func } => {
            let result = runtime.upgrade().and_then(|rt| func(&rt, &args));
            future::ready(result.map(Step::Done)).boxed_local()
        }
        FnImpl::Native(func) => future::ready(func(&args).map(Step::Done)).boxed_local(),
        FnImpl::Async(func) => func(args).map(|r| r.map(Step::Done)).boxed_local(),
        FnImpl::Closure(closure) => Closure::enter(Rc::clone(closure), args),
        FnImpl::Partial { target, bound } => {
            let mut all = bound.clone();
            all.extend(args);
            run(target.clone(), all)
        }
    }
}

/// A function of arity `n - len(bound)` that runs `target` with `bound`
/// prepended to its arguments.
pub fn partial(target: KlamFn, bound: Vec<KlamVal>) -> KlamFn {
    let remaining = target.arity().map(|n| n.saturating_sub(bound.len()));
    trace!(
        "partial application of {} with {} argument(s)",
        target.name(),
        bound.len()
    );
    let name = target.name().to_string();
    KlamFn::new(name, remaining, FnImpl::Partial { target, bound })
}

/// Coerce a call head to a function.
///
/// Functions are used as they are and symbols name global functions.
pub fn callable(value: KlamVal, rt: &Runtime) -> Result<KlamFn> {
    match value {
        KlamVal::Function(f) => Ok(f),
        KlamVal::Symbol(name) => rt.globals().function(&name),
        other => Err(Error::NotCallable(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trampoline::settle_now;

    fn native(
        name: &str,
        arity: usize,
        f: impl Fn(&[KlamVal]) -> Result<KlamVal> + 'static,
    ) -> KlamFn {
        KlamFn::new(name, Some(arity), FnImpl::Native(Rc::new(f)))
    }

    fn list3() -> KlamFn {
        native("list3", 3, |args| Ok(KlamVal::list(args.iter().cloned())))
    }

    fn call(f: &KlamFn, args: Vec<KlamVal>) -> KlamVal {
        settle_now(settle_async(run(f.clone(), args))).unwrap()
    }

    fn n(x: f64) -> KlamVal {
        KlamVal::Number(x)
    }

    #[test]
    fn test_exact_application() {
        assert_eq!(call(&list3(), vec![n(1.0), n(2.0), n(3.0)]).to_string(), "[1 2 3]");
    }

    #[test]
    fn test_partial_application_reduces_arity() {
        let KlamVal::Function(curried) = call(&list3(), vec![n(1.0)]) else {
            panic!("expected a function");
        };
        assert_eq!(curried.arity(), Some(2));
        assert_eq!(call(&curried, vec![n(2.0), n(3.0)]).to_string(), "[1 2 3]");
    }

    #[test]
    fn test_partials_compose() {
        let KlamVal::Function(a) = call(&list3(), vec![n(1.0)]) else {
            panic!("expected a function");
        };
        let KlamVal::Function(b) = call(&a, vec![n(2.0)]) else {
            panic!("expected a function");
        };
        assert_eq!(b.arity(), Some(1));
        assert_eq!(call(&b, vec![n(3.0)]).to_string(), "[1 2 3]");
    }

    #[test]
    fn test_overapplication() {
        let adder = native("adder", 1, |args| {
            let KlamVal::Number(x) = args[0] else {
                return Err(Error::type_mismatch("number", &args[0]));
            };
            Ok(KlamVal::Function(native("add-x", 1, move |more| match more[0] {
                KlamVal::Number(y) => Ok(KlamVal::Number(x + y)),
                _ => Err(Error::type_mismatch("number", &more[0])),
            })))
        });
        assert_eq!(call(&adder, vec![n(1.0), n(2.0)]), n(3.0));
    }

    #[test]
    fn test_overapplying_a_non_function_result() {
        let one = native("one", 1, |_| Ok(KlamVal::Number(1.0)));
        let result = settle_now(settle_async(run(one, vec![n(0.0), n(0.0)])));
        assert!(matches!(result, Err(Error::NotCallable(_))));
    }

    #[test]
    fn test_unknown_arity_takes_all_arguments() {
        let count = KlamFn::new(
            "count",
            None,
            FnImpl::Native(Rc::new(|args: &[KlamVal]| Ok(KlamVal::Number(args.len() as f64)))),
        );
        assert_eq!(call(&count, vec![n(1.0), n(1.0), n(1.0), n(1.0)]), n(4.0));
        assert_eq!(call(&count, vec![]), n(0.0));
    }
}
