// klam-reader - Value types
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Runtime values of the guest language.
//!
//! [`KlamVal`] is a closed sum over the nine value kinds. Values are cheap to
//! clone: every heap kind sits behind an `Rc`.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::stream::KlamStream;
use crate::symbol::Symbol;

/// A guest-language value.
#[derive(Clone)]
pub enum KlamVal {
    /// The empty list, also the guest "nil".
    Empty,
    Number(f64),
    Str(Rc<str>),
    Symbol(Symbol),
    Cons(Rc<Cons>),
    Vector(KlamVector),
    Function(KlamFn),
    Error(KlamError),
    Stream(KlamStream),
}

// ============================================================================
// Cons
// ============================================================================

/// A pair. Chains ending in `Empty` are proper lists.
pub struct Cons {
    pub head: KlamVal,
    pub tail: KlamVal,
}

impl Drop for Cons {
    // Unlink the tail chain iteratively so dropping a long list does not
    // recurse once per element.
    fn drop(&mut self) {
        let mut tail = std::mem::replace(&mut self.tail, KlamVal::Empty);
        while let KlamVal::Cons(rc) = tail {
            match Rc::try_unwrap(rc) {
                Ok(mut cell) => tail = std::mem::replace(&mut cell.tail, KlamVal::Empty),
                Err(_) => break,
            }
        }
    }
}

/// Iterator over the heads of a cons chain. Stops at the first non-cons tail.
pub struct ConsIter<'a> {
    current: &'a KlamVal,
}

impl<'a> Iterator for ConsIter<'a> {
    type Item = &'a KlamVal;

    fn next(&mut self) -> Option<Self::Item> {
        match self.current {
            KlamVal::Cons(cell) => {
                self.current = &cell.tail;
                Some(&cell.head)
            }
            _ => None,
        }
    }
}

// ============================================================================
// Vector
// ============================================================================

/// A mutable array whose length is fixed at creation.
#[derive(Clone)]
pub struct KlamVector(Rc<RefCell<Vec<KlamVal>>>);

impl KlamVector {
    /// A vector of `len` elements, each `Empty`.
    pub fn new(len: usize) -> Self {
        KlamVector(Rc::new(RefCell::new(vec![KlamVal::Empty; len])))
    }

    pub fn from_vec(items: Vec<KlamVal>) -> Self {
        KlamVector(Rc::new(RefCell::new(items)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<KlamVal> {
        self.0.borrow().get(index).cloned()
    }

    /// Store `value` at `index`. Returns `false` when out of range.
    pub fn set(&self, index: usize, value: KlamVal) -> bool {
        match self.0.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn to_vec(&self) -> Vec<KlamVal> {
        self.0.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &KlamVector) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// ============================================================================
// Function
// ============================================================================

struct FnInner {
    name: Rc<str>,
    arity: Option<usize>,
    imp: Box<dyn Any>,
}

/// A callable value.
///
/// Carries a display name, a declared arity (`None` means "call with whatever
/// arguments are given") and a type-erased implementation. The implementation
/// type is defined in klam-core, which owns the calling convention.
#[derive(Clone)]
pub struct KlamFn(Rc<FnInner>);

impl KlamFn {
    pub fn new(name: impl Into<Rc<str>>, arity: Option<usize>, imp: impl Any) -> Self {
        KlamFn(Rc::new(FnInner {
            name: name.into(),
            arity,
            imp: Box::new(imp),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn arity(&self) -> Option<usize> {
        self.0.arity
    }

    /// The inner implementation reference.
    pub fn imp(&self) -> &dyn Any {
        self.0.imp.as_ref()
    }

    pub fn ptr_eq(&self, other: &KlamFn) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for KlamFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Function {}>", self.0.name)
    }
}

// ============================================================================
// Error
// ============================================================================

/// A guest exception value.
#[derive(Clone)]
pub struct KlamError(Rc<str>);

impl KlamError {
    pub fn new(message: impl Into<Rc<str>>) -> Self {
        KlamError(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }

    pub fn ptr_eq(&self, other: &KlamError) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for KlamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Error {:?}>", &*self.0)
    }
}

// ============================================================================
// Constructors, predicates, accessors
// ============================================================================

impl KlamVal {
    pub fn number(n: f64) -> Self {
        KlamVal::Number(n)
    }

    pub fn string(s: &str) -> Self {
        KlamVal::Str(Rc::from(s))
    }

    pub fn symbol(name: &str) -> Self {
        KlamVal::Symbol(Symbol::new(name))
    }

    pub fn cons(head: KlamVal, tail: KlamVal) -> Self {
        KlamVal::Cons(Rc::new(Cons { head, tail }))
    }

    /// The guest boolean sentinel `true` or `false`.
    pub fn boolean(b: bool) -> Self {
        KlamVal::symbol(if b { "true" } else { "false" })
    }

    /// Build a proper list.
    pub fn list(items: impl IntoIterator<Item = KlamVal>) -> Self {
        let items: Vec<KlamVal> = items.into_iter().collect();
        items
            .into_iter()
            .rev()
            .fold(KlamVal::Empty, |tail, head| KlamVal::cons(head, tail))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, KlamVal::Empty)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, KlamVal::Number(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, KlamVal::Str(_))
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, KlamVal::Symbol(_))
    }

    pub fn is_cons(&self) -> bool {
        matches!(self, KlamVal::Cons(_))
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, KlamVal::Vector(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, KlamVal::Function(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, KlamVal::Error(_))
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, KlamVal::Stream(_))
    }

    /// `Some` for the boolean sentinels, `None` for anything else.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            KlamVal::Symbol(s) if s.is("true") => Some(true),
            KlamVal::Symbol(s) if s.is("false") => Some(false),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            KlamVal::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Get the type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            KlamVal::Empty => "empty",
            KlamVal::Number(_) => "number",
            KlamVal::Str(_) => "string",
            KlamVal::Symbol(_) => "symbol",
            KlamVal::Cons(_) => "cons",
            KlamVal::Vector(_) => "vector",
            KlamVal::Function(_) => "function",
            KlamVal::Error(_) => "error",
            KlamVal::Stream(_) => "stream",
        }
    }

    /// Iterate over the elements of a cons chain.
    pub fn iter(&self) -> ConsIter<'_> {
        ConsIter { current: self }
    }

    /// Length of a proper list, or `None` if the chain does not end in `Empty`.
    pub fn list_len(&self) -> Option<usize> {
        let mut len = 0;
        let mut current = self;
        loop {
            match current {
                KlamVal::Empty => return Some(len),
                KlamVal::Cons(cell) => {
                    len += 1;
                    current = &cell.tail;
                }
                _ => return None,
            }
        }
    }

    /// Elements of a proper list.
    pub fn to_vec(&self) -> Option<Vec<KlamVal>> {
        self.list_len()?;
        Some(self.iter().cloned().collect())
    }
}

// ============================================================================
// Equality
// ============================================================================

/// Structural equality.
///
/// Identical values are equal; cons chains compare element-wise, vectors
/// compare length and then element-wise. No coercion between kinds.
pub fn equate(a: &KlamVal, b: &KlamVal) -> bool {
    let (mut a, mut b) = (a, b);
    loop {
        match (a, b) {
            (KlamVal::Cons(x), KlamVal::Cons(y)) => {
                if Rc::ptr_eq(x, y) {
                    return true;
                }
                if !equate(&x.head, &y.head) {
                    return false;
                }
                a = &x.tail;
                b = &y.tail;
            }
            (KlamVal::Empty, KlamVal::Empty) => return true,
            (KlamVal::Number(x), KlamVal::Number(y)) => return x == y,
            (KlamVal::Str(x), KlamVal::Str(y)) => return x == y,
            (KlamVal::Symbol(x), KlamVal::Symbol(y)) => return x == y,
            (KlamVal::Vector(x), KlamVal::Vector(y)) => {
                if x.ptr_eq(y) {
                    return true;
                }
                let (xs, ys) = (x.0.borrow(), y.0.borrow());
                return xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(p, q)| equate(p, q));
            }
            (KlamVal::Function(x), KlamVal::Function(y)) => return x.ptr_eq(y),
            (KlamVal::Error(x), KlamVal::Error(y)) => return x.ptr_eq(y),
            (KlamVal::Stream(x), KlamVal::Stream(y)) => return x.ptr_eq(y),
            _ => return false,
        }
    }
}

impl PartialEq for KlamVal {
    fn eq(&self, other: &Self) -> bool {
        equate(self, other)
    }
}

// ============================================================================
// Display
// ============================================================================

/// Canonical text of a value. Lists render fully, other structured kinds
/// render as opaque placeholders.
pub fn show(value: &KlamVal) -> String {
    value.to_string()
}

impl fmt::Display for KlamVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KlamVal::Empty => write!(f, "[]"),
            KlamVal::Number(n) => write!(f, "{}", n),
            KlamVal::Str(s) => write!(f, "\"{}\"", s),
            KlamVal::Symbol(s) => write!(f, "{}", s),
            KlamVal::Cons(_) => {
                write!(f, "[")?;
                let mut current = self;
                let mut first = true;
                while let KlamVal::Cons(cell) = current {
                    if !first {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", cell.head)?;
                    first = false;
                    current = &cell.tail;
                }
                if !current.is_empty() {
                    write!(f, " | {}", current)?;
                }
                write!(f, "]")
            }
            KlamVal::Vector(v) => write!(f, "<Vector {}>", v.len()),
            KlamVal::Function(func) => write!(f, "<Function {}>", func.name()),
            KlamVal::Error(e) => write!(f, "<Error \"{}\">", e.message()),
            KlamVal::Stream(s) => write!(f, "<Stream {}>", s.name()),
        }
    }
}

impl fmt::Debug for KlamVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num_list(items: &[f64]) -> KlamVal {
        KlamVal::list(items.iter().map(|n| KlamVal::Number(*n)))
    }

    #[test]
    fn test_show() {
        assert_eq!(show(&KlamVal::Empty), "[]");
        assert_eq!(show(&KlamVal::Number(42.0)), "42");
        assert_eq!(show(&KlamVal::Number(1.5)), "1.5");
        assert_eq!(show(&KlamVal::string("hi")), "\"hi\"");
        assert_eq!(show(&KlamVal::symbol("abc")), "abc");
        assert_eq!(show(&num_list(&[1.0, 2.0, 3.0])), "[1 2 3]");
        assert_eq!(
            show(&KlamVal::cons(KlamVal::Number(1.0), KlamVal::Number(2.0))),
            "[1 | 2]"
        );
        assert_eq!(show(&KlamVal::Vector(KlamVector::new(3))), "<Vector 3>");
        assert_eq!(
            show(&KlamVal::Error(KlamError::new("boom"))),
            "<Error \"boom\">"
        );
    }

    #[test]
    fn test_nested_lists_render_fully() {
        let inner = num_list(&[2.0, 3.0]);
        let outer = KlamVal::list([KlamVal::Number(1.0), inner, KlamVal::string("x")]);
        assert_eq!(show(&outer), "[1 [2 3] \"x\"]");
    }

    #[test]
    fn test_equate_lists() {
        assert!(equate(&num_list(&[1.0, 2.0]), &num_list(&[1.0, 2.0])));
        assert!(!equate(&num_list(&[1.0, 2.0]), &num_list(&[1.0, 2.0, 3.0])));
        assert!(!equate(&num_list(&[1.0]), &KlamVal::Empty));
    }

    #[test]
    fn test_equate_vectors() {
        let a = KlamVector::from_vec(vec![KlamVal::Number(1.0), KlamVal::string("a")]);
        let b = KlamVector::from_vec(vec![KlamVal::Number(1.0), KlamVal::string("a")]);
        let c = KlamVector::from_vec(vec![KlamVal::Number(1.0)]);
        assert!(equate(&KlamVal::Vector(a.clone()), &KlamVal::Vector(b)));
        assert!(!equate(&KlamVal::Vector(a), &KlamVal::Vector(c)));
    }

    #[test]
    fn test_equate_no_coercion() {
        assert!(!equate(&KlamVal::Number(1.0), &KlamVal::string("1")));
        assert!(!equate(&KlamVal::symbol("a"), &KlamVal::string("a")));
        let e1 = KlamVal::Error(KlamError::new("x"));
        let e2 = KlamVal::Error(KlamError::new("x"));
        assert!(equate(&e1, &e1.clone()));
        assert!(!equate(&e1, &e2));
    }

    #[test]
    fn test_vector_bounds() {
        let v = KlamVector::new(3);
        assert!(v.set(2, KlamVal::Number(7.0)));
        assert_eq!(v.get(2), Some(KlamVal::Number(7.0)));
        assert!(!v.set(3, KlamVal::Empty));
        assert_eq!(v.get(3), None);
    }

    #[test]
    fn test_booleans() {
        assert_eq!(KlamVal::boolean(true).as_bool(), Some(true));
        assert_eq!(KlamVal::boolean(false).as_bool(), Some(false));
        assert_eq!(KlamVal::symbol("maybe").as_bool(), None);
    }

    #[test]
    fn test_list_len() {
        assert_eq!(num_list(&[1.0, 2.0]).list_len(), Some(2));
        assert_eq!(KlamVal::Empty.list_len(), Some(0));
        assert_eq!(
            KlamVal::cons(KlamVal::Empty, KlamVal::Number(1.0)).list_len(),
            None
        );
    }

    #[test]
    fn test_long_list_drops_without_overflow() {
        let mut list = KlamVal::Empty;
        for i in 0..200_000 {
            list = KlamVal::cons(KlamVal::Number(i as f64), list);
        }
        assert_eq!(list.list_len(), Some(200_000));
        drop(list);
    }
}
