// klam-embed - Embedding API for klam
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # klam-embed
//!
//! A high-level embedding API for the klam KLambda runtime.
//!
//! This crate wraps a [`klam_core::Runtime`] with a simple interface for
//! evaluating source text, registering Rust functions and converting values
//! between Rust and the guest language.
//!
//! ## Quick Start
//!
//! ```rust
//! use klam_embed::Engine;
//!
//! let engine = Engine::new();
//! let result = engine.eval("(+ 1 2)").unwrap();
//! println!("{}", result); // 3
//! ```
//!
//! ## Registering Native Functions
//!
//! ```rust
//! use klam_embed::{Engine, KlamVal, Result};
//!
//! let engine = Engine::new();
//! engine.register_native("double", Some(1), |args: &[KlamVal]| -> Result<KlamVal> {
//!     match args {
//!         [KlamVal::Number(n)] => Ok(KlamVal::Number(n * 2.0)),
//!         [other] => Err(klam_embed::Error::type_mismatch("number", other)),
//!         _ => Ok(KlamVal::Empty),
//!     }
//! });
//! let result = engine.eval("(double 21)").unwrap();
//! assert_eq!(result.to_string(), "42");
//! ```
//!
//! Natives registered with an arity curry like any guest function.

mod convert;
mod engine;

pub use convert::{FromKlamVal, IntoKlamVal, from_klam, to_klam};
pub use engine::Engine;

// Re-export core types for convenience
pub use klam_core::{Error, Options, Result, Runtime};
pub use klam_reader::{BufferPort, Direction, KlamStream, KlamVal};
