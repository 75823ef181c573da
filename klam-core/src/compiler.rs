// klam-core - Form compiler
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Translation of source forms into [`Code`].
//!
//! The compiler resolves special forms, lexical scope and call position once,
//! ahead of evaluation. Keywords that are also primitives (`and`, `or`, `if`,
//! `value`, `set`, `type`) compile as ordinary calls when given fewer
//! operands than their special form takes, which partially applies the
//! primitive.

use std::rc::Rc;

use klam_reader::{KlamVal, Symbol, intern};

use crate::analysis::{flatten, is_form, is_referenced};
use crate::code::{Callee, Code, Handler};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::runtime::Runtime;

/// Symbol heads with this prefix call host interop functions.
pub const HOST_PREFIX: &str = "host.";

pub struct Compiler<'a> {
    rt: &'a Runtime,
}

impl<'a> Compiler<'a> {
    pub fn new(rt: &'a Runtime) -> Self {
        Compiler { rt }
    }

    /// Compile `form` in `ctx`.
    pub fn compile(&self, form: &KlamVal, ctx: &Context) -> Result<Code> {
        let code = match form {
            KlamVal::Empty | KlamVal::Number(_) | KlamVal::Str(_) => Code::Const(form.clone()),
            KlamVal::Symbol(name) if ctx.is_local(name) => Code::Local(name.clone()),
            // Free symbols are self-evaluating.
            KlamVal::Symbol(_) => Code::Const(form.clone()),
            KlamVal::Cons(_) => self.compile_list(form, ctx)?,
            other => return Err(Error::InvalidSyntax(other.to_string())),
        };
        if ctx.is_statement() && code.is_pure() {
            return Ok(Code::Const(KlamVal::Empty));
        }
        Ok(code)
    }

    fn compile_list(&self, form: &KlamVal, ctx: &Context) -> Result<Code> {
        let Some(items) = form.to_vec() else {
            return Err(Error::InvalidSyntax(format!("improper list {}", form)));
        };
        let (head, operands) = match items.split_first() {
            Some(split) => split,
            None => return Ok(Code::Const(KlamVal::Empty)),
        };

        if let KlamVal::Symbol(keyword) = head {
            let n = operands.len();
            match keyword.name() {
                "and" | "or" if n >= 2 => return self.compile_junction(form, keyword.name(), ctx),
                "if" if n == 3 => return self.compile_if(operands, ctx),
                "if" if n > 3 => return Err(arity_error("if", "3")),
                "cond" => return self.compile_cond(operands, ctx),
                "let" if n == 3 => return self.compile_let(operands, ctx),
                "let" => return Err(arity_error("let", "3")),
                "do" if n > 0 => return self.compile_do(form, ctx),
                "do" => return Err(Error::malformed("do", "at least 1 argument form")),
                "lambda" if n == 2 => return self.compile_lambda(operands, ctx),
                "lambda" => return Err(arity_error("lambda", "2")),
                "freeze" if n == 1 => return self.compile_freeze(&operands[0], ctx),
                "freeze" => return Err(arity_error("freeze", "1")),
                "trap-error" if n == 2 => return self.compile_trap_error(operands, ctx),
                "trap-error" => return Err(arity_error("trap-error", "2")),
                "defun" if n == 3 => return self.compile_defun(operands),
                "defun" => return Err(arity_error("defun", "3")),
                "value" if n == 1 => {
                    if let KlamVal::Symbol(name) = &operands[0]
                        && !ctx.is_local(name)
                        && self.rt.globals().has_value(name)
                    {
                        return Ok(Code::GlobalValue(name.clone()));
                    }
                }
                "value" if n > 1 => return Err(arity_error("value", "1")),
                "set" if n == 2 => {
                    if let KlamVal::Symbol(name) = &operands[0]
                        && !ctx.is_local(name)
                    {
                        let value = self.compile(&operands[1], &ctx.in_head())?;
                        return Ok(Code::SetGlobal {
                            name: name.clone(),
                            value: Box::new(value),
                        });
                    }
                }
                "set" if n > 2 => return Err(arity_error("set", "2")),
                "type" if n == 2 => return self.compile(&operands[0], ctx),
                "type" if n > 2 => return Err(arity_error("type", "2")),
                _ => {}
            }
        }

        self.compile_call(head, operands, ctx)
    }

    /// `and`/`or` with nested chains of the same keyword flattened.
    fn compile_junction(&self, form: &KlamVal, keyword: &str, ctx: &Context) -> Result<Code> {
        let test_ctx = ctx.in_head();
        let operands = flatten(form, keyword)
            .into_iter()
            .map(|operand| self.compile(operand, &test_ctx))
            .collect::<Result<Vec<_>>>()?;
        Ok(if keyword == "and" {
            Code::And(operands)
        } else {
            Code::Or(operands)
        })
    }

    fn compile_if(&self, operands: &[KlamVal], ctx: &Context) -> Result<Code> {
        Ok(Code::If {
            test: Box::new(self.compile(&operands[0], &ctx.in_head())?),
            then: Box::new(self.compile(&operands[1], ctx)?),
            otherwise: Box::new(self.compile(&operands[2], ctx)?),
        })
    }

    fn compile_cond(&self, clauses: &[KlamVal], ctx: &Context) -> Result<Code> {
        let mut compiled = Vec::with_capacity(clauses.len());
        let mut default = None;
        for clause in clauses {
            let parts = clause
                .to_vec()
                .filter(|parts| parts.len() == 2)
                .ok_or_else(|| Error::malformed("cond", "clauses of exactly 2 forms"))?;
            let (test, consequent) = (&parts[0], &parts[1]);
            if matches!(test, KlamVal::Symbol(s) if s.is("true") && !ctx.is_local(s)) {
                default = Some(Box::new(self.compile(consequent, ctx)?));
                break;
            }
            compiled.push((
                self.compile(test, &ctx.in_head())?,
                self.compile(consequent, ctx)?,
            ));
        }
        Ok(Code::Cond {
            clauses: compiled,
            default,
        })
    }

    fn compile_let(&self, operands: &[KlamVal], ctx: &Context) -> Result<Code> {
        let name = binder(&operands[0], "let")?;
        let value = self.compile(&operands[1], &ctx.in_head())?;
        let body = &operands[2];

        if name.is("_") || !is_referenced(name, body) {
            let last = self.compile(body, ctx)?;
            return Ok(sequence(vec![value], last));
        }

        Ok(Code::Let {
            name: name.clone(),
            value: Box::new(value),
            body: Box::new(self.compile(body, &ctx.with_local(name))?),
        })
    }

    fn compile_do(&self, form: &KlamVal, ctx: &Context) -> Result<Code> {
        let mut forms = flatten(form, "do");
        let Some(last) = forms.pop() else {
            return Err(Error::malformed("do", "at least 1 argument form"));
        };
        let effect_ctx = ctx.in_head().as_statement();
        let effects = forms
            .into_iter()
            .map(|effect| self.compile(effect, &effect_ctx))
            .collect::<Result<Vec<_>>>()?;
        Ok(sequence(effects, self.compile(last, ctx)?))
    }

    fn compile_lambda(&self, operands: &[KlamVal], ctx: &Context) -> Result<Code> {
        let param = binder(&operands[0], "lambda")?;
        let body = self.compile(&operands[1], &ctx.lambda(param))?;
        Ok(Code::Lambda {
            name: closure_name(ctx, "lambda"),
            param: param.clone(),
            body: Rc::new(body),
        })
    }

    fn compile_freeze(&self, body: &KlamVal, ctx: &Context) -> Result<Code> {
        let body = self.compile(body, &ctx.freeze())?;
        Ok(Code::Freeze {
            name: closure_name(ctx, "freeze"),
            body: Rc::new(body),
        })
    }

    fn compile_trap_error(&self, operands: &[KlamVal], ctx: &Context) -> Result<Code> {
        let body = self.compile(&operands[0], &ctx.in_head())?;
        let handler_form = &operands[1];

        let inline = is_form(handler_form, "lambda")
            .then(|| handler_form.to_vec())
            .flatten()
            .filter(|parts| parts.len() == 3);
        let handler = match inline.as_deref() {
            Some([_, KlamVal::Symbol(param), handler_body]) => Handler::Bind {
                param: param.clone(),
                body: Box::new(self.compile(handler_body, &ctx.with_local(param))?),
            },
            _ => Handler::Apply(Box::new(self.compile(handler_form, &ctx.in_head())?)),
        };

        Ok(Code::TrapError {
            body: Box::new(body),
            handler,
            position: ctx.position(),
        })
    }

    fn compile_defun(&self, operands: &[KlamVal]) -> Result<Code> {
        let name = binder(&operands[0], "defun")?;
        let params = operands[1]
            .to_vec()
            .ok_or_else(|| Error::malformed("defun", "a parameter list"))?
            .iter()
            .map(|param| binder(param, "defun").cloned())
            .collect::<Result<Vec<Symbol>>>()?;
        let body = self.compile(&operands[2], &Context::defun(name, &params))?;
        Ok(Code::Defun {
            name: name.clone(),
            params: Rc::from(params),
            body: Rc::new(body),
        })
    }

    fn compile_call(&self, head: &KlamVal, operands: &[KlamVal], ctx: &Context) -> Result<Code> {
        let arg_ctx = ctx.in_head();
        let args = operands
            .iter()
            .map(|operand| self.compile(operand, &arg_ctx))
            .collect::<Result<Vec<_>>>()?;

        let callee = match head {
            KlamVal::Symbol(name) if ctx.is_local(name) => Callee::Local(name.clone()),
            KlamVal::Symbol(name) => {
                if let Some(host_name) = name.name().strip_prefix(HOST_PREFIX)
                    && !host_name.is_empty()
                {
                    return Ok(Code::HostCall {
                        name: intern(host_name),
                        args,
                    });
                }
                Callee::Global(name.clone())
            }
            other => Callee::Dynamic(Box::new(self.compile(other, &arg_ctx)?)),
        };

        Ok(Code::Call {
            callee,
            args,
            position: ctx.position(),
        })
    }
}

/// Effects followed by a final expression; pure effects are dropped.
fn sequence(effects: Vec<Code>, last: Code) -> Code {
    let effects: Vec<Code> = effects.into_iter().filter(|e| !e.is_pure()).collect();
    if effects.is_empty() {
        last
    } else {
        Code::Do {
            effects,
            last: Box::new(last),
        }
    }
}

fn binder<'v>(form: &'v KlamVal, keyword: &str) -> Result<&'v Symbol> {
    form.as_symbol()
        .ok_or_else(|| Error::malformed(keyword, format!("a symbol to bind, not {}", form)))
}

fn arity_error(keyword: &str, count: &str) -> Error {
    Error::malformed(keyword, format!("exactly {} argument forms", count))
}

fn closure_name(ctx: &Context, kind: &str) -> Rc<str> {
    match ctx.scope() {
        Some(scope) => Rc::from(format!("{}/{}", scope, kind)),
        None => Rc::from(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Position;
    use crate::options::Options;
    use klam_reader::Parser;

    fn compile(source: &str) -> Result<Code> {
        let rt = Runtime::new(Options::new());
        let form = Parser::parse_str(source).unwrap().unwrap();
        Compiler::new(&rt).compile(&form, &Context::toplevel())
    }

    #[test]
    fn test_literals_and_free_symbols() {
        assert!(matches!(compile("1").unwrap(), Code::Const(KlamVal::Number(_))));
        assert!(matches!(compile("abc").unwrap(), Code::Const(KlamVal::Symbol(_))));
        assert!(matches!(compile("()").unwrap(), Code::Const(KlamVal::Empty)));
    }

    #[test]
    fn test_and_flattens() {
        match compile("(and true (and false true) true)").unwrap() {
            Code::And(operands) => assert_eq!(operands.len(), 4),
            other => panic!("expected and, got {:?}", other),
        }
    }

    #[test]
    fn test_short_keywords_are_calls() {
        assert!(matches!(compile("(and true)").unwrap(), Code::Call { .. }));
        assert!(matches!(compile("(if true 1)").unwrap(), Code::Call { .. }));
    }

    #[test]
    fn test_malformed_forms() {
        for source in [
            "(let X 1)",
            "(lambda X)",
            "(freeze)",
            "(defun f X)",
            "(defun f (1) 1)",
            "(trap-error 1)",
            "(do)",
            "(if 1 2 3 4)",
            "(cond (true))",
            "(let 1 2 3)",
        ] {
            assert!(
                matches!(compile(source), Err(Error::MalformedForm { .. })),
                "{} should be malformed",
                source
            );
        }
    }

    #[test]
    fn test_dead_binding_becomes_sequence() {
        match compile("(let X (foo) 2)").unwrap() {
            Code::Do { effects, .. } => assert_eq!(effects.len(), 1),
            other => panic!("expected do, got {:?}", other),
        }
        assert!(matches!(compile("(let X 1 2)").unwrap(), Code::Const(_)));
        assert!(matches!(compile("(let X 1 X)").unwrap(), Code::Let { .. }));
    }

    #[test]
    fn test_do_drops_pure_effects() {
        match compile("(do 1 (foo) (do \"x\" (bar)) 2)").unwrap() {
            Code::Do { effects, last } => {
                assert_eq!(effects.len(), 2);
                assert!(matches!(*last, Code::Const(_)));
            }
            other => panic!("expected do, got {:?}", other),
        }
    }

    #[test]
    fn test_cond_true_becomes_default() {
        match compile("(cond (false 1) (true 2) (false 3))").unwrap() {
            Code::Cond { clauses, default } => {
                assert_eq!(clauses.len(), 1);
                assert!(default.is_some());
            }
            other => panic!("expected cond, got {:?}", other),
        }
    }

    #[test]
    fn test_call_positions() {
        match compile("(defun f (X) (g (h X)))").unwrap() {
            Code::Defun { body, .. } => match &*body {
                Code::Call { position, args, .. } => {
                    assert_eq!(*position, Position::Tail);
                    assert!(matches!(
                        &args[0],
                        Code::Call {
                            position: Position::Head,
                            ..
                        }
                    ));
                }
                other => panic!("expected call, got {:?}", other),
            },
            other => panic!("expected defun, got {:?}", other),
        }
    }

    #[test]
    fn test_trap_error_body_is_head() {
        match compile("(trap-error (f) (lambda E E))").unwrap() {
            Code::TrapError { body, handler, .. } => {
                assert!(matches!(
                    *body,
                    Code::Call {
                        position: Position::Head,
                        ..
                    }
                ));
                assert!(matches!(handler, Handler::Bind { .. }));
            }
            other => panic!("expected trap-error, got {:?}", other),
        }
    }

    #[test]
    fn test_value_inlines_only_defined_globals() {
        assert!(matches!(
            compile("(value *language*)").unwrap(),
            Code::GlobalValue(_)
        ));
        assert!(matches!(
            compile("(value *undefined*)").unwrap(),
            Code::Call { .. }
        ));
    }

    #[test]
    fn test_set_global() {
        assert!(matches!(
            compile("(set *x* 1)").unwrap(),
            Code::SetGlobal { .. }
        ));
        assert!(matches!(
            compile("(lambda X (set X 1))").unwrap(),
            Code::Lambda { .. }
        ));
    }

    #[test]
    fn test_head_kinds() {
        assert!(matches!(
            compile("(lambda F (F 1))").unwrap(),
            Code::Lambda { ref body, .. }
                if matches!(&**body, Code::Call { callee: Callee::Local(_), .. })
        ));
        assert!(matches!(
            compile("((lambda X X) 1)").unwrap(),
            Code::Call {
                callee: Callee::Dynamic(_),
                ..
            }
        ));
        assert!(matches!(
            compile("(host.now)").unwrap(),
            Code::HostCall { .. }
        ));
    }

    #[test]
    fn test_invalid_syntax() {
        let rt = Runtime::new(Options::new());
        let compiler = Compiler::new(&rt);
        let improper = KlamVal::cons(KlamVal::symbol("f"), KlamVal::Number(1.0));
        assert!(matches!(
            compiler.compile(&improper, &Context::toplevel()),
            Err(Error::InvalidSyntax(_))
        ));
        let vector = KlamVal::Vector(klam_reader::KlamVector::new(1));
        assert!(matches!(
            compiler.compile(&vector, &Context::toplevel()),
            Err(Error::InvalidSyntax(_))
        ));
    }
}
