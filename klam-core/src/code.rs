// klam-core - Executable representation
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The compiled form of guest code.
//!
//! The compiler lowers forms into a [`Code`] tree that the evaluator walks.
//! Scoping, position and special-form dispatch are all resolved here, so the
//! evaluator never inspects source forms.

use std::rc::Rc;

use klam_reader::{KlamVal, Symbol};

use crate::context::Position;

#[derive(Debug, Clone)]
pub enum Code {
    Const(KlamVal),
    Local(Symbol),
    /// Short-circuit conjunction of flattened operands.
    And(Vec<Code>),
    Or(Vec<Code>),
    If {
        test: Box<Code>,
        then: Box<Code>,
        otherwise: Box<Code>,
    },
    /// Clauses after a literal `true` test are dropped into `default`.
    Cond {
        clauses: Vec<(Code, Code)>,
        default: Option<Box<Code>>,
    },
    Let {
        name: Symbol,
        value: Box<Code>,
        body: Box<Code>,
    },
    Do {
        effects: Vec<Code>,
        last: Box<Code>,
    },
    Lambda {
        name: Rc<str>,
        param: Symbol,
        body: Rc<Code>,
    },
    Freeze {
        name: Rc<str>,
        body: Rc<Code>,
    },
    TrapError {
        body: Box<Code>,
        handler: Handler,
        position: Position,
    },
    Defun {
        name: Symbol,
        params: Rc<[Symbol]>,
        body: Rc<Code>,
    },
    GlobalValue(Symbol),
    SetGlobal {
        name: Symbol,
        value: Box<Code>,
    },
    Call {
        callee: Callee,
        args: Vec<Code>,
        position: Position,
    },
    /// Direct call of a host interop function, outside the arity runtime.
    HostCall {
        name: Symbol,
        args: Vec<Code>,
    },
}

/// How the function of a call is found.
#[derive(Debug, Clone)]
pub enum Callee {
    Local(Symbol),
    Global(Symbol),
    /// Computed head, coerced to a function at run time.
    Dynamic(Box<Code>),
}

/// The handler of a `trap-error`.
#[derive(Debug, Clone)]
pub enum Handler {
    /// An inline `(lambda E ...)`: the error is bound to `param`.
    Bind { param: Symbol, body: Box<Code> },
    /// Any other expression, applied to the error.
    Apply(Box<Code>),
}

impl Code {
    /// Evaluating this code has no effect and cannot fail.
    pub fn is_pure(&self) -> bool {
        matches!(
            self,
            Code::Const(_) | Code::Local(_) | Code::Lambda { .. } | Code::Freeze { .. }
        )
    }
}
