// klam-core - Compilation context
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Compilation context.
//!
//! A [`Context`] is an immutable record threaded through the compiler. Every
//! narrowing operation returns a new context; the local set is an
//! `im::HashSet`, so entering a scope shares structure with the parent.

use im::HashSet;
use klam_reader::Symbol;

/// Whether a call's result is consumed immediately or ends its function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Head,
    Tail,
}

/// Whether the value of an expression is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obligation {
    Expression,
    Statement,
}

/// Scope and position of the form being compiled.
///
/// There is no expected-kind hint: the nodes that consume a boolean (`if`,
/// `cond`, `and`, `or`) check it with [`crate::cast::as_boolean`] at run time
/// whatever the operand's kind.
#[derive(Debug, Clone)]
pub struct Context {
    locals: HashSet<Symbol>,
    position: Position,
    obligation: Obligation,
    /// Name of the enclosing `defun`, if any.
    scope: Option<Symbol>,
}

impl Context {
    /// Context for a form evaluated at top level.
    pub fn toplevel() -> Self {
        Context {
            locals: HashSet::new(),
            position: Position::Tail,
            obligation: Obligation::Expression,
            scope: None,
        }
    }

    pub fn is_local(&self, name: &Symbol) -> bool {
        self.locals.contains(name)
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_statement(&self) -> bool {
        self.obligation == Obligation::Statement
    }

    pub fn scope(&self) -> Option<&Symbol> {
        self.scope.as_ref()
    }

    /// Bind `name` as a local, keeping position and obligation.
    #[must_use]
    pub fn with_local(&self, name: &Symbol) -> Self {
        Context {
            locals: self.locals.update(name.clone()),
            ..self.clone()
        }
    }

    /// Body of a `lambda`: the parameter is local and the body is a tail.
    #[must_use]
    pub fn lambda(&self, param: &Symbol) -> Self {
        Context {
            locals: self.locals.update(param.clone()),
            position: Position::Tail,
            obligation: Obligation::Expression,
            scope: self.scope.clone(),
        }
    }

    /// Body of a `freeze`.
    #[must_use]
    pub fn freeze(&self) -> Self {
        Context {
            position: Position::Tail,
            obligation: Obligation::Expression,
            ..self.clone()
        }
    }

    /// Body of a `defun`. Nothing from the enclosing context is visible.
    pub fn defun(name: &Symbol, params: &[Symbol]) -> Self {
        Context {
            locals: params.iter().cloned().collect(),
            position: Position::Tail,
            obligation: Obligation::Expression,
            scope: Some(name.clone()),
        }
    }

    /// An operand whose value is consumed immediately.
    #[must_use]
    pub fn in_head(&self) -> Self {
        Context {
            position: Position::Head,
            obligation: Obligation::Expression,
            ..self.clone()
        }
    }

    /// An expression evaluated only for its effects.
    #[must_use]
    pub fn as_statement(&self) -> Self {
        Context {
            obligation: Obligation::Statement,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use klam_reader::intern;

    #[test]
    fn test_narrowing_does_not_mutate_parent() {
        let x = intern("X");
        let outer = Context::toplevel();
        let inner = outer.with_local(&x);
        assert!(inner.is_local(&x));
        assert!(!outer.is_local(&x));
    }

    #[test]
    fn test_lambda_body_is_tail() {
        let ctx = Context::toplevel().in_head().lambda(&intern("Y"));
        assert_eq!(ctx.position(), Position::Tail);
        assert!(ctx.is_local(&intern("Y")));
    }

    #[test]
    fn test_defun_drops_outer_locals() {
        let outer = Context::toplevel().with_local(&intern("X"));
        assert!(outer.is_local(&intern("X")));
        let body = Context::defun(&intern("f"), &[intern("Y")]);
        assert!(!body.is_local(&intern("X")));
        assert!(body.is_local(&intern("Y")));
        assert_eq!(body.scope(), Some(&intern("f")));
    }

    #[test]
    fn test_statement_obligation() {
        let ctx = Context::toplevel().in_head().as_statement();
        assert!(ctx.is_statement());
        assert!(!ctx.in_head().is_statement());
    }
}
