// klam-reader - Values, symbols and reader for the KLambda guest language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # klam-reader
//!
//! The guest-language value model, the process-wide symbol table, the
//! Stream value kind, and a reader that turns source text into forms.

pub mod lexer;
pub mod parser;
pub mod stream;
pub mod symbol;
pub mod value;

pub use lexer::{Lexer, LexerError, Token};
pub use parser::{ParseError, Parser};
pub use stream::{BufferPort, BytePort, Direction, KlamStream, ReaderPort, StreamError, WriterPort};
pub use symbol::{Symbol, intern, name_of};
pub use value::{Cons, ConsIter, KlamError, KlamFn, KlamVal, KlamVector, equate, show};
