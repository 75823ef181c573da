// klam-core - Trampoline runtime
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Deferred calls and the drive loop.
//!
//! A tail call does not run its callee; it returns [`Step::Bounce`] and the
//! nearest enclosing drive loop performs the call. Guest tail recursion
//! therefore runs in constant host stack.
//!
//! There is a single drive loop, [`settle_async`]. Every evaluation step is a
//! future; in synchronous mode the loop is polled exactly once with
//! [`settle_now`], which succeeds whenever no callee actually suspends.
//!
//! Head-position calls still nest: each one settles inside its caller's
//! poll. Every step the loop awaits is polled through [`GrowStack`], which
//! moves onto a fresh stack segment when the current one runs low, so deep
//! non-tail recursion is bounded by memory rather than the thread's stack.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};
use klam_reader::{KlamFn, KlamVal};

use crate::arity;
use crate::error::{Error, Result};

/// Future of one evaluation step.
pub type StepFuture = LocalBoxFuture<'static, Result<Step>>;

/// Outcome of evaluating code in some position.
#[derive(Debug)]
pub enum Step {
    Done(KlamVal),
    Bounce(Trampoline),
}

/// A call awaiting execution. Never visible to guest code.
#[derive(Debug)]
pub struct Trampoline {
    pub target: KlamFn,
    pub args: Vec<KlamVal>,
}

impl Trampoline {
    /// Perform the deferred call through the arity runtime.
    pub fn run(self) -> StepFuture {
        arity::run(self.target, self.args)
    }
}

/// Build a deferred call without executing it.
pub fn bounce(target: KlamFn, args: Vec<KlamVal>) -> Step {
    Step::Bounce(Trampoline { target, args })
}

/// Free stack below which polling switches to a new segment.
const RED_ZONE: usize = 256 * 1024;

/// Size of each additional stack segment.
const STACK_SEGMENT: usize = 4 * 1024 * 1024;

/// Polls and drops the wrapped future with at least [`RED_ZONE`] bytes of
/// stack available.
struct GrowStack<F>(Option<F>);

impl<F: Future + Unpin> Future for GrowStack<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<F::Output> {
        let Some(inner) = self.0.as_mut() else {
            return Poll::Pending;
        };
        stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || Pin::new(inner).poll(cx))
    }
}

impl<F> Drop for GrowStack<F> {
    // A pending chain of head calls is as deep to drop as it was to poll.
    fn drop(&mut self) {
        if let Some(inner) = self.0.take() {
            stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, move || drop(inner));
        }
    }
}

/// Drive a possibly pending step to a final value.
///
/// Each step is awaited before it is inspected; bounces are unwound in this
/// loop rather than by recursion.
pub async fn settle_async<F>(pending: F) -> Result<KlamVal>
where
    F: Future<Output = Result<Step>> + Unpin,
{
    let mut step = GrowStack(Some(pending)).await?;
    loop {
        match step {
            Step::Done(value) => return Ok(value),
            Step::Bounce(trampoline) => step = GrowStack(Some(trampoline.run())).await?,
        }
    }
}

/// Drive `step` to a final value without suspending.
pub fn settle(step: Step) -> Result<KlamVal> {
    settle_now(settle_async(future::ready(Ok(step))))
}

/// Poll `pending` once. A computation that would suspend is an error.
pub fn settle_now<T>(pending: impl Future<Output = Result<T>>) -> Result<T> {
    pending
        .now_or_never()
        .unwrap_or_else(|| Err(Error::unsupported("suspending call in synchronous mode")))
}
