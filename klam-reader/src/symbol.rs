// klam-reader - Symbol type with interning
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Interned guest-language symbols.
//!
//! # Interning
//!
//! Every symbol is registered in a process-wide interner, so two symbols with
//! the same name share one allocation:
//!
//! - **O(1) equality**: comparing symbols is a pointer comparison
//! - **O(1) hashing**: the hash is computed from the pointer address
//! - **Keyword dispatch**: the compiler matches `if`, `let`, `true`, ... by identity
//!
//! # Memory Behaviour
//!
//! Interned symbols are never deallocated. The table only grows, which is fine
//! for the bounded vocabulary of real programs but worth knowing for code that
//! calls `intern` on generated names in a loop.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, OnceLock};

/// A guest identifier.
#[derive(Clone)]
pub struct Symbol {
    name: Arc<str>,
}

/// Global symbol interner
static SYMBOL_INTERNER: OnceLock<Mutex<HashSet<Arc<str>>>> = OnceLock::new();

fn get_interner() -> &'static Mutex<HashSet<Arc<str>>> {
    SYMBOL_INTERNER.get_or_init(|| Mutex::new(HashSet::new()))
}

impl Symbol {
    /// Return the canonical symbol for `name`, registering it on first use.
    pub fn new(name: &str) -> Self {
        // A poisoned lock still guards a consistent map: insertion is the
        // only mutation and it cannot be observed half-done.
        let mut table = get_interner()
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(existing) = table.get(name) {
            return Symbol {
                name: Arc::clone(existing),
            };
        }
        let name: Arc<str> = Arc::from(name);
        table.insert(Arc::clone(&name));
        Symbol { name }
    }

    /// Get the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compare against a plain string without interning it.
    #[inline]
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        &*self.name == name
    }
}

/// Canonical symbol for `name`.
pub fn intern(name: &str) -> Symbol {
    Symbol::new(name)
}

/// Inverse of [`intern`].
pub fn name_of(symbol: &Symbol) -> &str {
    symbol.name()
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.name)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        // Due to interning, pointer comparison is sufficient
        Arc::ptr_eq(&self.name, &other.name)
    }
}

impl Eq for Symbol {}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.name).cast::<u8>().hash(state);
    }
}

// ============================================================================
// Tests
// ============================================================================
