// klam-core - Runtime instance
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! A runtime instance: global environment, options, primitives and host
//! interop table.
//!
//! # Examples
//!
//! ```
//! use klam_core::{Options, Runtime};
//! use klam_reader::KlamVal;
//!
//! let rt = Runtime::new(Options::new());
//! let result = rt.eval("(defun double (X) (* X 2)) (double 21)").unwrap();
//! assert_eq!(result, KlamVal::Number(42.0));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Instant;

use klam_reader::{KlamFn, KlamVal, Parser, Symbol, intern};
use log::{debug, trace};

use crate::arity::{self, NativeFn};
use crate::builtins;
use crate::code::Code;
use crate::compiler::Compiler;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::eval::{Locals, eval};
use crate::globals::Globals;
use crate::options::Options;
use crate::trampoline::{settle_async, settle_now};

struct RuntimeInner {
    globals: Globals,
    options: Options,
    started: Instant,
    host: RefCell<HashMap<Symbol, Rc<NativeFn>>>,
}

/// Shared handle to a runtime instance.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

/// Non-owning handle held by function values, so that globals holding
/// closures do not keep their own runtime alive.
#[derive(Clone)]
pub struct WeakRuntime(Weak<RuntimeInner>);

impl WeakRuntime {
    pub fn upgrade(&self) -> Result<Runtime> {
        self.0
            .upgrade()
            .map(|inner| Runtime { inner })
            .ok_or_else(|| Error::Internal("runtime has been dropped".to_string()))
    }
}

impl Runtime {
    /// Create a runtime with primitives and global constants installed.
    pub fn new(options: Options) -> Self {
        let rt = Runtime {
            inner: Rc::new(RuntimeInner {
                globals: Globals::new(),
                options,
                started: Instant::now(),
                host: RefCell::new(HashMap::new()),
            }),
        };
        builtins::register_builtins(&rt);
        builtins::install_constants(&rt);
        debug!(
            "runtime created ({} mode)",
            if rt.is_async() { "async" } else { "sync" }
        );
        rt
    }

    pub fn globals(&self) -> &Globals {
        &self.inner.globals
    }

    pub fn options(&self) -> &Options {
        &self.inner.options
    }

    /// Is this runtime in suspension-aware mode?
    pub fn is_async(&self) -> bool {
        self.inner.options.suspend()
    }

    pub fn downgrade(&self) -> WeakRuntime {
        WeakRuntime(Rc::downgrade(&self.inner))
    }

    /// Milliseconds since this runtime was created.
    pub fn elapsed_millis(&self) -> f64 {
        self.inner.started.elapsed().as_secs_f64() * 1000.0
    }

    /// Register a host interop function, callable as `(host.NAME ...)`.
    pub fn register_host(&self, name: &str, f: Rc<NativeFn>) {
        debug!("registered host function {}", name);
        self.inner.host.borrow_mut().insert(intern(name), f);
    }

    pub fn host_function(&self, name: &Symbol) -> Result<Rc<NativeFn>> {
        self.inner
            .host
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnboundGlobal {
                table: "host function",
                name: name.name().to_string(),
            })
    }

    /// Define a global function.
    pub fn define_function(&self, name: &str, f: KlamFn) {
        self.globals().define_function(intern(name), f);
    }

    /// Compile a form at top level.
    pub fn compile(&self, form: &KlamVal) -> Result<Code> {
        trace!("compiling {}", form);
        Compiler::new(self).compile(form, &Context::toplevel())
    }

    /// Compile and evaluate a form without suspending.
    pub fn eval_form(&self, form: &KlamVal) -> Result<KlamVal> {
        self.require_sync()?;
        let code = self.compile(form)?;
        let locals = Locals::new();
        settle_now(settle_async(eval(&code, &locals, self)))
    }

    /// Compile and evaluate a form, awaiting any suspension.
    pub async fn eval_form_async(&self, form: &KlamVal) -> Result<KlamVal> {
        let code = self.compile(form)?;
        let locals = Locals::new();
        settle_async(eval(&code, &locals, self)).await
    }

    /// Evaluate every form in `source`, returning the last value.
    ///
    /// Empty source evaluates to the empty list.
    pub fn eval(&self, source: &str) -> Result<KlamVal> {
        self.require_sync()?;
        let mut result = KlamVal::Empty;
        for form in Parser::parse_all_str(source)? {
            result = self.eval_form(&form)?;
        }
        Ok(result)
    }

    pub async fn eval_async(&self, source: &str) -> Result<KlamVal> {
        let mut result = KlamVal::Empty;
        for form in Parser::parse_all_str(source)? {
            result = self.eval_form_async(&form).await?;
        }
        Ok(result)
    }

    /// Apply a function value through the arity runtime.
    pub fn apply(&self, f: &KlamVal, args: Vec<KlamVal>) -> Result<KlamVal> {
        self.require_sync()?;
        let f = arity::callable(f.clone(), self)?;
        settle_now(settle_async(arity::run(f, args)))
    }

    pub async fn apply_async(&self, f: &KlamVal, args: Vec<KlamVal>) -> Result<KlamVal> {
        let f = arity::callable(f.clone(), self)?;
        settle_async(arity::run(f, args)).await
    }

    fn require_sync(&self) -> Result<()> {
        if self.is_async() {
            return Err(Error::unsupported(
                "synchronous evaluation in suspension-aware mode",
            ));
        }
        Ok(())
    }
}
