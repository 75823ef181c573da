// klam-core - Vector built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Fixed-length mutable vectors. Indexes are checked: a non-integral index
//! is a type mismatch and an index outside the vector is out of range.

use klam_reader::{KlamVal, KlamVector};

use crate::cast::{as_index, as_size, as_vector};
use crate::error::{Error, Result};
use crate::runtime::Runtime;

use super::fixed;

/// A vector of the given length, every element the empty list.
pub(super) fn builtin_absvector(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [n] = fixed::<1>("absvector", args)?;
    Ok(KlamVal::Vector(KlamVector::new(as_size(n)?)))
}

pub(super) fn builtin_absvector_get(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [v, i] = fixed::<2>("<-absvector", args)?;
    let vector = as_vector(v)?;
    let index = as_index(i, vector.len())?;
    vector
        .get(index)
        .ok_or_else(|| Error::Internal("vector index checked above".to_string()))
}

/// Store a value and return the vector.
pub(super) fn builtin_absvector_set(_rt: &Runtime, args: &[KlamVal]) -> Result<KlamVal> {
    let [v, i, x] = fixed::<3>("absvector->", args)?;
    let vector = as_vector(v)?;
    let index = as_index(i, vector.len())?;
    vector.set(index, x.clone());
    Ok(v.clone())
}
