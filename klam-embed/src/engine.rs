// klam-embed - Engine implementation
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The Engine struct - main entry point for embedding klam.

use std::future::Future;
use std::path::Path;
use std::rc::Rc;

use futures::FutureExt;
use klam_core::{Error, FnImpl, Options, Result, Runtime};
use klam_reader::{KlamFn, KlamVal, StreamError, intern};
use log::debug;

use crate::convert::{FromKlamVal, IntoKlamVal};

/// The klam scripting engine.
///
/// `Engine` owns a runtime instance and provides a high-level interface for
/// evaluating guest code, registering Rust functions, and reading and
/// writing global values.
///
/// # Thread Safety
///
/// **`Engine` is NOT thread-safe.** It uses `Rc` and `RefCell` internally.
/// Create a separate `Engine` per thread if you need concurrent evaluation.
///
/// # Example
///
/// ```rust
/// use klam_embed::Engine;
///
/// let engine = Engine::new();
/// let result = engine.eval("(defun sq (X) (* X X)) (sq 7)").unwrap();
/// assert_eq!(result.to_string(), "49");
/// ```
pub struct Engine {
    runtime: Runtime,
}

impl Engine {
    /// Create an Engine with default options: synchronous mode, no standard
    /// streams and no file access.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(Options::new())
    }

    /// Create an Engine from explicit runtime options.
    #[must_use]
    pub fn with_options(options: Options) -> Self {
        Engine {
            runtime: Runtime::new(options),
        }
    }

    /// Evaluate a string of guest code, returning the value of the last form.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The code contains syntax errors
    /// - Compilation or evaluation fails
    /// - A raised error is not caught by `trap-error`
    /// - The engine was created in suspension-aware mode (use [`Engine::eval_async`])
    pub fn eval(&self, code: &str) -> Result<KlamVal> {
        self.runtime.eval(code)
    }

    /// Evaluate a string of guest code, awaiting asynchronous functions.
    ///
    /// # Example
    ///
    /// ```rust
    /// use futures::executor::block_on;
    /// use klam_embed::{Engine, Options};
    ///
    /// let engine = Engine::with_options(Options::new().with_suspend(true));
    /// let result = block_on(engine.eval_async("(cn \"a\" \"b\")")).unwrap();
    /// assert_eq!(result.to_string(), "\"ab\"");
    /// ```
    pub async fn eval_async(&self, code: &str) -> Result<KlamVal> {
        self.runtime.eval_async(code).await
    }

    /// Evaluate a file of guest code.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or for any reason
    /// [`Engine::eval`] would.
    pub fn eval_file(&self, path: impl AsRef<Path>) -> Result<KlamVal> {
        let code = read_source(path.as_ref())?;
        self.eval(&code)
    }

    pub async fn eval_file_async(&self, path: impl AsRef<Path>) -> Result<KlamVal> {
        let code = read_source(path.as_ref())?;
        self.eval_async(&code).await
    }

    /// Get a global value.
    ///
    /// Returns `None` if the symbol has no value.
    #[must_use]
    pub fn get_value(&self, name: &str) -> Option<KlamVal> {
        self.runtime.globals().value(&intern(name)).ok()
    }

    /// Get a global value converted to a Rust type.
    ///
    /// Returns `None` if the symbol has no value or cannot be converted.
    #[must_use]
    pub fn get_as<T: FromKlamVal>(&self, name: &str) -> Option<T> {
        self.get_value(name).and_then(|v| T::from_klam_val(&v).ok())
    }

    /// Set a global value, as `(set name value)` would.
    pub fn set_value(&self, name: &str, value: impl IntoKlamVal) {
        self.runtime.globals().set_value(intern(name), value.into_klam_val());
    }

    /// Call a global function by name.
    ///
    /// Arity rules apply: too few arguments return a partial application.
    ///
    /// # Example
    ///
    /// ```rust
    /// use klam_embed::{Engine, KlamVal};
    ///
    /// let engine = Engine::new();
    /// let result = engine
    ///     .call("+", &[KlamVal::Number(1.0), KlamVal::Number(2.0)])
    ///     .unwrap();
    /// assert_eq!(result, KlamVal::Number(3.0));
    /// ```
    pub fn call(&self, name: &str, args: &[KlamVal]) -> Result<KlamVal> {
        self.runtime.apply(&KlamVal::symbol(name), args.to_vec())
    }

    pub async fn call_async(&self, name: &str, args: &[KlamVal]) -> Result<KlamVal> {
        self.runtime.apply_async(&KlamVal::symbol(name), args.to_vec()).await
    }

    /// Register a native Rust function as a global function.
    ///
    /// With `Some(arity)` the function curries like guest code; with `None`
    /// it receives every argument it is applied to.
    ///
    /// # Example
    ///
    /// ```rust
    /// use klam_embed::{Engine, KlamVal};
    ///
    /// let engine = Engine::new();
    /// engine.register_native("greet", Some(1), |args| {
    ///     let name = match args.first() {
    ///         Some(KlamVal::Str(s)) => s.as_ref(),
    ///         _ => "World",
    ///     };
    ///     Ok(KlamVal::string(&format!("Hello, {}!", name)))
    /// });
    /// ```
    pub fn register_native(
        &self,
        name: &str,
        arity: Option<usize>,
        func: impl Fn(&[KlamVal]) -> Result<KlamVal> + 'static,
    ) {
        let imp = FnImpl::Native(Rc::new(func));
        self.runtime.define_function(name, KlamFn::new(name, arity, imp));
    }

    /// Register an asynchronous Rust function as a global function.
    ///
    /// Calls to it suspend evaluation until the returned future completes.
    /// A future that is not immediately ready fails in synchronous mode.
    pub fn register_async<F, Fut>(&self, name: &str, arity: Option<usize>, func: F)
    where
        F: Fn(Vec<KlamVal>) -> Fut + 'static,
        Fut: Future<Output = Result<KlamVal>> + 'static,
    {
        let imp = FnImpl::Async(Rc::new(move |args: Vec<KlamVal>| func(args).boxed_local()));
        self.runtime.define_function(name, KlamFn::new(name, arity, imp));
    }

    /// Register a host interop function, callable as `(host.NAME ...)`.
    ///
    /// Interop calls receive exactly the operands written at the call site
    /// and are not function values, so they never curry.
    pub fn register_host(
        &self,
        name: &str,
        func: impl Fn(&[KlamVal]) -> Result<KlamVal> + 'static,
    ) {
        self.runtime.register_host(name, Rc::new(func));
    }

    /// Get access to the underlying runtime.
    #[must_use]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn read_source(path: &Path) -> Result<String> {
    debug!("loading {}", path.display());
    std::fs::read_to_string(path).map_err(|source| {
        Error::Stream(StreamError::Io {
            name: path.display().to_string(),
            source,
        })
    })
}
