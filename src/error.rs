use std::collections::TryReserveError;

use thiserror::Error;

use crate::arena::Key;

#[derive(Debug, Error)]
pub enum AvlError {
    #[error("node allocation failed: {0}")]
    Alloc(#[from] TryReserveError),
}

/// Which tree invariant a `Violation` breaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Invariant {
    Order,
    Balance,
    Height,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("key {key} is outside its allowed range ({low:?}, {high:?})")]
    Order {
        key: Key,
        low: Option<Key>,
        high: Option<Key>,
    },
    #[error("key {key} has balance factor {factor}")]
    Balance { key: Key, factor: i32 },
    #[error("key {key} caches height {stored} but its children give {expected}")]
    Height {
        key: Key,
        stored: i32,
        expected: i32,
    },
}

impl Violation {
    pub fn invariant(&self) -> Invariant {
        match self {
            Violation::Order { .. } => Invariant::Order,
            Violation::Balance { .. } => Invariant::Balance,
            Violation::Height { .. } => Invariant::Height,
        }
    }

    pub fn key(&self) -> Key {
        match self {
            Violation::Order { key, .. }
            | Violation::Balance { key, .. }
            | Violation::Height { key, .. } => *key,
        }
    }
}
