// klam-core - Suspension-aware evaluation tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

mod common;

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use common::*;
use futures::FutureExt;
use futures::executor::block_on;
use klam_core::FnImpl;
use klam_reader::KlamFn;

/// Pending on the first poll, ready on the second.
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// `(tick X)` suspends once, then returns X.
fn define_tick(rt: &Runtime) {
    let imp = FnImpl::Async(Rc::new(|args: Vec<KlamVal>| {
        async move {
            YieldOnce(false).await;
            Ok(args.into_iter().next().unwrap_or(KlamVal::Empty))
        }
        .boxed_local()
    }));
    rt.define_function("tick", KlamFn::new("tick", Some(1), imp));
}

/// `(ready X)` returns X without suspending.
fn define_ready(rt: &Runtime) {
    let imp = FnImpl::Async(Rc::new(|args: Vec<KlamVal>| {
        async move { Ok(args.into_iter().next().unwrap_or(KlamVal::Empty)) }.boxed_local()
    }));
    rt.define_function("ready", KlamFn::new("ready", Some(1), imp));
}

const COUNTDOWN: &str = "
    (defun countdown (N)
      (if (= N 0) done (countdown (tick (- N 1)))))";

#[test]
fn test_suspending_tail_recursion() {
    let rt = Runtime::new(Options::new().with_suspend(true));
    define_tick(&rt);
    block_on(rt.eval_async(COUNTDOWN)).unwrap();
    let result = block_on(rt.eval_async("(countdown 10000)")).unwrap();
    assert_eq!(result, KlamVal::symbol("done"));
}

#[test]
fn test_suspension_in_sync_mode_fails() {
    let rt = new_runtime();
    define_tick(&rt);
    rt.eval(COUNTDOWN).unwrap();
    match rt.eval("(countdown 3)") {
        Err(Error::UnsupportedOperation(message)) => {
            assert!(message.contains("synchronous"), "{}", message)
        }
        other => panic!("expected unsupported operation, got {:?}", other),
    }
}

const DEEP: &str = "(defun deep (N) (if (= N 0) (tick 0) (+ 1 (deep (- N 1)))))";

#[test]
fn test_deep_suspension_in_sync_mode_fails() {
    let rt = new_runtime();
    define_tick(&rt);
    rt.eval(DEEP).unwrap();
    assert!(matches!(
        rt.eval("(deep 10000)"),
        Err(Error::UnsupportedOperation(_))
    ));
}

#[test]
fn test_deep_suspension_in_async_mode() {
    let rt = Runtime::new(Options::new().with_suspend(true));
    define_tick(&rt);
    block_on(rt.eval_async(DEEP)).unwrap();
    let result = block_on(rt.eval_async("(deep 10000)")).unwrap();
    assert_eq!(result, KlamVal::Number(10000.0));
}

#[test]
fn test_suspension_preserves_order() {
    let rt = Runtime::new(Options::new().with_suspend(true));
    define_tick(&rt);
    let result = block_on(rt.eval_async(
        "(do (set *log* ())
             (set *log* (cons (tick 1) (value *log*)))
             (set *log* (cons 2 (value *log*)))
             (set *log* (cons (tick 3) (value *log*)))
             (value *log*))",
    ))
    .unwrap();
    assert_eq!(result, read("(3 2 1)"));
}

#[test]
fn test_ready_async_function_in_sync_mode() {
    let rt = new_runtime();
    define_ready(&rt);
    assert_eq!(rt.eval("(+ 1 (ready 2))").unwrap(), KlamVal::Number(3.0));
    assert_eq!(
        rt.eval("(eval-kl (cons + (cons 1 (cons 2 ()))))").unwrap(),
        KlamVal::Number(3.0)
    );
}

#[test]
fn test_async_entry_on_sync_runtime() {
    let rt = new_runtime();
    assert_eq!(
        block_on(rt.eval_async("(* 6 7)")).unwrap(),
        KlamVal::Number(42.0)
    );
}

#[test]
fn test_apply_async() {
    let rt = Runtime::new(Options::new().with_suspend(true));
    define_tick(&rt);
    let f = block_on(rt.eval_async("(lambda X (tick (+ X 1)))")).unwrap();
    let result = block_on(rt.apply_async(&f, vec![KlamVal::Number(1.0)])).unwrap();
    assert_eq!(result, KlamVal::Number(2.0));
}
