// klam-core - Compiler and runtime for the KLambda guest language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # klam-core
//!
//! Compiles guest forms into an executable [`Code`] tree and evaluates it
//! with a trampolined, arity-aware calling convention.
//!
//! - [`compiler`] resolves special forms, scope and call position
//! - [`arity`] implements partial application and overapplication
//! - [`trampoline`] drives tail calls in constant stack, synchronously or
//!   asynchronously
//! - [`runtime`] owns the global environment and the primitive table

pub mod analysis;
pub mod arity;
pub mod builtins;
pub mod cast;
pub mod code;
pub mod compiler;
pub mod context;
pub mod error;
pub mod eval;
pub mod globals;
pub mod options;
pub mod runtime;
pub mod trampoline;

pub use arity::{AsyncFn, FnImpl, NativeFn};
pub use code::Code;
pub use compiler::Compiler;
pub use context::Context;
pub use error::{Error, Result};
pub use globals::Globals;
pub use options::Options;
pub use runtime::Runtime;
pub use trampoline::{Step, Trampoline, bounce, settle, settle_async};
