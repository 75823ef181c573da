// klam-core - Global environment
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The global environment: two flat name-keyed tables.
//!
//! Functions and values live in separate namespaces, so `(defun f ...)` and
//! `(set f ...)` never interfere. Both tables are last-write-wins.

use std::cell::RefCell;
use std::collections::HashMap;

use klam_reader::{KlamFn, KlamVal, Symbol};
use log::debug;

use crate::error::{Error, Result};

#[derive(Default)]
pub struct Globals {
    functions: RefCell<HashMap<Symbol, KlamFn>>,
    values: RefCell<HashMap<Symbol, KlamVal>>,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a global function.
    pub fn function(&self, name: &Symbol) -> Result<KlamFn> {
        self.functions
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::unbound_function(name.name()))
    }

    pub fn has_function(&self, name: &Symbol) -> bool {
        self.functions.borrow().contains_key(name)
    }

    /// Define or replace a global function.
    pub fn define_function(&self, name: Symbol, function: KlamFn) {
        let previous = self.functions.borrow_mut().insert(name.clone(), function);
        if previous.is_some() {
            debug!("redefined function {}", name);
        } else {
            debug!("defined function {}", name);
        }
    }

    /// Look up a global value.
    pub fn value(&self, name: &Symbol) -> Result<KlamVal> {
        self.values
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::unbound_value(name.name()))
    }

    pub fn has_value(&self, name: &Symbol) -> bool {
        self.values.borrow().contains_key(name)
    }

    /// Assign a global value.
    pub fn set_value(&self, name: Symbol, value: KlamVal) {
        self.values.borrow_mut().insert(name, value);
    }
}
