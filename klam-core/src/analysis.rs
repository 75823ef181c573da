// klam-core - Form analysis helpers
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Queries over source forms used by the compiler.

use klam_reader::{KlamVal, Symbol};

/// Is `form` a list whose head is the symbol `keyword`?
pub fn is_form(form: &KlamVal, keyword: &str) -> bool {
    match form {
        KlamVal::Cons(cell) => matches!(&cell.head, KlamVal::Symbol(s) if s.is(keyword)),
        _ => false,
    }
}

/// Operands of `form` when it is a `keyword` list, flattening nested lists
/// headed by the same keyword into one sequence.
///
/// `(do a (do b c) d)` yields `[a, b, c, d]`.
pub fn flatten<'a>(form: &'a KlamVal, keyword: &str) -> Vec<&'a KlamVal> {
    let mut out = Vec::new();
    let mut pending: Vec<&KlamVal> = form.iter().skip(1).collect();
    pending.reverse();
    while let Some(item) = pending.pop() {
        if is_form(item, keyword) {
            pending.extend(item.iter().skip(1).collect::<Vec<_>>().into_iter().rev());
        } else {
            out.push(item);
        }
    }
    out
}

/// Does `name` occur free in `body`?
///
/// Walks into nested forms; a `let`, `lambda` or `defun` that rebinds `name`
/// shadows it for its body. The bound value of a shadowing `let` is still
/// searched, since it is evaluated in the outer scope.
pub fn is_referenced(name: &Symbol, body: &KlamVal) -> bool {
    let mut pending = vec![body];
    while let Some(form) = pending.pop() {
        match form {
            KlamVal::Symbol(s) => {
                if s == name {
                    return true;
                }
            }
            KlamVal::Cons(_) => {
                let items: Vec<&KlamVal> = form.iter().collect();
                match binding_shape(&items) {
                    Some(Binding::Let { var, value, body }) => {
                        pending.push(value);
                        if var != name {
                            pending.push(body);
                        }
                    }
                    Some(Binding::Lambda { var, body }) => {
                        if var != name {
                            pending.push(body);
                        }
                    }
                    Some(Binding::Defun { params, body }) => {
                        if !params.iter().any(|p| matches!(p, KlamVal::Symbol(s) if s == name)) {
                            pending.push(body);
                        }
                    }
                    None => pending.extend(items),
                }
            }
            _ => {}
        }
    }
    false
}

enum Binding<'a> {
    Let {
        var: &'a Symbol,
        value: &'a KlamVal,
        body: &'a KlamVal,
    },
    Lambda {
        var: &'a Symbol,
        body: &'a KlamVal,
    },
    Defun {
        params: Vec<&'a KlamVal>,
        body: &'a KlamVal,
    },
}

fn binding_shape<'a>(items: &[&'a KlamVal]) -> Option<Binding<'a>> {
    let keyword = items.first()?.as_symbol()?;
    match (keyword.name(), items) {
        ("let", &[_, var, value, body]) => Some(Binding::Let {
            var: var.as_symbol()?,
            value,
            body,
        }),
        ("lambda", &[_, var, body]) => Some(Binding::Lambda {
            var: var.as_symbol()?,
            body,
        }),
        ("defun", &[_, _, params, body]) => Some(Binding::Defun {
            params: params.iter().collect(),
            body,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use klam_reader::{Parser, intern};

    fn read(s: &str) -> KlamVal {
        Parser::parse_str(s).unwrap().unwrap()
    }

    #[test]
    fn test_flatten_do() {
        let form = read("(do a (do b (do c)) d)");
        let names: Vec<String> = flatten(&form, "do").iter().map(|v| v.to_string()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_flatten_and_keeps_other_forms() {
        let form = read("(and a (or b c) (and d e))");
        let names: Vec<String> = flatten(&form, "and").iter().map(|v| v.to_string()).collect();
        assert_eq!(names, vec!["a", "[or b c]", "d", "e"]);
    }

    #[test]
    fn test_plain_references() {
        let x = intern("X");
        assert!(is_referenced(&x, &read("X")));
        assert!(is_referenced(&x, &read("(+ 1 (* X 2))")));
        assert!(!is_referenced(&x, &read("(+ 1 Y)")));
        assert!(!is_referenced(&x, &read("\"X\"")));
    }

    #[test]
    fn test_shadowing_stops_search() {
        let x = intern("X");
        assert!(!is_referenced(&x, &read("(lambda X X)")));
        assert!(!is_referenced(&x, &read("(let X 1 X)")));
        assert!(!is_referenced(&x, &read("(defun f (X) X)")));
    }

    #[test]
    fn test_shadowing_let_value_is_outer() {
        let x = intern("X");
        assert!(is_referenced(&x, &read("(let X (+ X 1) X)")));
    }

    #[test]
    fn test_other_bindings_are_searched() {
        let x = intern("X");
        assert!(is_referenced(&x, &read("(let Y 1 (+ X Y))")));
        assert!(is_referenced(&x, &read("(lambda Y X)")));
        assert!(is_referenced(&x, &read("(defun f (Y) X)")));
    }
}
