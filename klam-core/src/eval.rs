// klam-core - Evaluator for compiled code
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Evaluation of [`Code`] trees.
//!
//! [`eval`] returns a future of a [`Step`]. Code compiled in tail position
//! may produce a bounce; everything else settles its calls before returning.
//! Operands are evaluated strictly left to right, each fully resolved before
//! the next begins.

use std::rc::Rc;

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};
use klam_reader::{KlamFn, KlamVal, Symbol};

use crate::arity::{self, FnImpl};
use crate::cast;
use crate::code::{Callee, Code, Handler};
use crate::context::Position;
use crate::error::{Error, Result};
use crate::runtime::{Runtime, WeakRuntime};
use crate::trampoline::{Step, StepFuture, bounce, settle_async};

/// Values of the locals in scope.
pub type Locals = im::HashMap<Symbol, KlamVal>;

/// A function value backed by compiled code.
pub struct Closure {
    params: Rc<[Symbol]>,
    body: Rc<Code>,
    captured: Locals,
    runtime: WeakRuntime,
}

impl Closure {
    /// Build a function value. `defun` passes empty `captured` locals.
    pub fn function(
        name: impl Into<Rc<str>>,
        params: Rc<[Symbol]>,
        body: Rc<Code>,
        captured: Locals,
        rt: &Runtime,
    ) -> KlamFn {
        let arity = params.len();
        let closure = Closure {
            params,
            body,
            captured,
            runtime: rt.downgrade(),
        };
        KlamFn::new(name, Some(arity), FnImpl::Closure(Rc::new(closure)))
    }

    /// Run the body with `args` bound to the parameters.
    pub(crate) fn enter(self: Rc<Self>, args: Vec<KlamVal>) -> StepFuture {
        async move {
            let rt = self.runtime.upgrade()?;
            let mut locals = self.captured.clone();
            for (param, arg) in self.params.iter().zip(args) {
                locals.insert(param.clone(), arg);
            }
            eval(&self.body, &locals, &rt).await
        }
        .boxed_local()
    }
}

/// Evaluate `code` in `locals`.
///
/// Dispatch is synchronous; each compound node gets its own small future, so
/// the poll frame of one node never carries the state of the others.
pub fn eval<'a>(
    code: &'a Code,
    locals: &'a Locals,
    rt: &'a Runtime,
) -> LocalBoxFuture<'a, Result<Step>> {
    match code {
        Code::Const(value) => done(Ok(value.clone())),
        Code::Local(name) => done(local(locals, name)),
        Code::And(operands) => eval_and(operands, locals, rt).boxed_local(),
        Code::Or(operands) => eval_or(operands, locals, rt).boxed_local(),
        Code::If {
            test,
            then,
            otherwise,
        } => eval_if(test, then, otherwise, locals, rt).boxed_local(),
        Code::Cond { clauses, default } => {
            eval_cond(clauses, default.as_deref(), locals, rt).boxed_local()
        }
        Code::Let { name, value, body } => eval_let(name, value, body, locals, rt).boxed_local(),
        Code::Do { effects, last } => eval_do(effects, last, locals, rt).boxed_local(),
        Code::Lambda { name, param, body } => {
            let params: Rc<[Symbol]> = Rc::from([param.clone()]);
            let f = Closure::function(
                Rc::clone(name),
                params,
                Rc::clone(body),
                locals.clone(),
                rt,
            );
            done(Ok(KlamVal::Function(f)))
        }
        Code::Freeze { name, body } => {
            let params: Rc<[Symbol]> = Rc::from([]);
            let f = Closure::function(
                Rc::clone(name),
                params,
                Rc::clone(body),
                locals.clone(),
                rt,
            );
            done(Ok(KlamVal::Function(f)))
        }
        Code::TrapError {
            body,
            handler,
            position,
        } => eval_trap_error(body, handler, *position, locals, rt).boxed_local(),
        Code::Defun { name, params, body } => {
            let f = Closure::function(
                name.name(),
                Rc::clone(params),
                Rc::clone(body),
                Locals::new(),
                rt,
            );
            rt.globals().define_function(name.clone(), f);
            done(Ok(KlamVal::Symbol(name.clone())))
        }
        Code::GlobalValue(name) => done(rt.globals().value(name)),
        Code::SetGlobal { name, value } => eval_set_global(name, value, locals, rt).boxed_local(),
        Code::Call {
            callee,
            args,
            position,
        } => eval_call(callee, args, *position, locals, rt).boxed_local(),
        Code::HostCall { name, args } => eval_host_call(name, args, locals, rt).boxed_local(),
    }
}

fn done<'a>(result: Result<KlamVal>) -> LocalBoxFuture<'a, Result<Step>> {
    future::ready(result.map(Step::Done)).boxed_local()
}

fn local(locals: &Locals, name: &Symbol) -> Result<KlamVal> {
    locals
        .get(name)
        .cloned()
        .ok_or_else(|| Error::Internal(format!("unbound local {}", name)))
}

async fn eval_and(operands: &[Code], locals: &Locals, rt: &Runtime) -> Result<Step> {
    for operand in operands {
        if !cast::as_boolean(&value_of(operand, locals, rt).await?)? {
            return Ok(Step::Done(KlamVal::boolean(false)));
        }
    }
    Ok(Step::Done(KlamVal::boolean(true)))
}

async fn eval_or(operands: &[Code], locals: &Locals, rt: &Runtime) -> Result<Step> {
    for operand in operands {
        if cast::as_boolean(&value_of(operand, locals, rt).await?)? {
            return Ok(Step::Done(KlamVal::boolean(true)));
        }
    }
    Ok(Step::Done(KlamVal::boolean(false)))
}

async fn eval_if(
    test: &Code,
    then: &Code,
    otherwise: &Code,
    locals: &Locals,
    rt: &Runtime,
) -> Result<Step> {
    if cast::as_boolean(&value_of(test, locals, rt).await?)? {
        eval(then, locals, rt).await
    } else {
        eval(otherwise, locals, rt).await
    }
}

async fn eval_cond(
    clauses: &[(Code, Code)],
    default: Option<&Code>,
    locals: &Locals,
    rt: &Runtime,
) -> Result<Step> {
    for (test, consequent) in clauses {
        if cast::as_boolean(&value_of(test, locals, rt).await?)? {
            return eval(consequent, locals, rt).await;
        }
    }
    match default {
        Some(consequent) => eval(consequent, locals, rt).await,
        None => Err(Error::NoConditionTrue),
    }
}

async fn eval_let(
    name: &Symbol,
    value: &Code,
    body: &Code,
    locals: &Locals,
    rt: &Runtime,
) -> Result<Step> {
    let bound = value_of(value, locals, rt).await?;
    let inner = locals.update(name.clone(), bound);
    eval(body, &inner, rt).await
}

async fn eval_do(effects: &[Code], last: &Code, locals: &Locals, rt: &Runtime) -> Result<Step> {
    for effect in effects {
        value_of(effect, locals, rt).await?;
    }
    eval(last, locals, rt).await
}

async fn eval_trap_error(
    body: &Code,
    handler: &Handler,
    position: Position,
    locals: &Locals,
    rt: &Runtime,
) -> Result<Step> {
    let err = match value_of(body, locals, rt).await {
        Ok(value) => return Ok(Step::Done(value)),
        Err(err) => err,
    };
    let caught = KlamVal::Error(err.to_guest());
    match handler {
        Handler::Bind { param, body } => {
            let inner = locals.update(param.clone(), caught);
            eval(body, &inner, rt).await
        }
        Handler::Apply(expr) => {
            let f = arity::callable(value_of(expr, locals, rt).await?, rt)?;
            call(f, vec![caught], position).await
        }
    }
}

async fn eval_set_global(
    name: &Symbol,
    value: &Code,
    locals: &Locals,
    rt: &Runtime,
) -> Result<Step> {
    let value = value_of(value, locals, rt).await?;
    rt.globals().set_value(name.clone(), value.clone());
    Ok(Step::Done(value))
}

async fn eval_call(
    callee: &Callee,
    args: &[Code],
    position: Position,
    locals: &Locals,
    rt: &Runtime,
) -> Result<Step> {
    let f = match callee {
        Callee::Global(name) => rt.globals().function(name)?,
        Callee::Local(name) => arity::callable(local(locals, name)?, rt)?,
        Callee::Dynamic(head) => arity::callable(value_of(head, locals, rt).await?, rt)?,
    };
    let args = values_of(args, locals, rt).await?;
    call(f, args, position).await
}

async fn eval_host_call(
    name: &Symbol,
    args: &[Code],
    locals: &Locals,
    rt: &Runtime,
) -> Result<Step> {
    let f = rt.host_function(name)?;
    let args = values_of(args, locals, rt).await?;
    f(&args).map(Step::Done)
}

/// Evaluate `code` and settle it to a value.
pub async fn value_of(code: &Code, locals: &Locals, rt: &Runtime) -> Result<KlamVal> {
    settle_async(eval(code, locals, rt)).await
}

async fn values_of(codes: &[Code], locals: &Locals, rt: &Runtime) -> Result<Vec<KlamVal>> {
    let mut values = Vec::with_capacity(codes.len());
    for code in codes {
        values.push(value_of(code, locals, rt).await?);
    }
    Ok(values)
}

/// A call in tail position is deferred; in head position it is settled.
async fn call(f: KlamFn, args: Vec<KlamVal>, position: Position) -> Result<Step> {
    match position {
        Position::Tail => Ok(bounce(f, args)),
        Position::Head => settle_async(arity::run(f, args)).await.map(Step::Done),
    }
}
