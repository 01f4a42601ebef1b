use std::cmp::max;
use std::collections::BTreeSet;

use crate::arena::{Key, NodeArena, NodeId};
use crate::avl_tree::{AvlTree, ConfigT};
use crate::error::{Invariant, Violation};

impl<Config: ConfigT> AvlTree<Config> {
    /// Checks ordering, balance and the cached heights independently of each
    /// other and reports every violation found.
    pub fn validate(&self) -> Result<(), Vec<Violation>> {
        let mut violations = Vec::new();
        check(&self.arena, self.root, None, None, &mut violations);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    pub fn violated_invariants(&self) -> BTreeSet<Invariant> {
        match self.validate() {
            Ok(()) => BTreeSet::new(),
            Err(violations) => violations.iter().map(Violation::invariant).collect(),
        }
    }
}

fn cached(arena: &NodeArena, node: Option<NodeId>) -> i32 {
    node.map_or(-1, |id| arena.get(id).cached_height())
}

// Returns the real height of the subtree, ignoring the cache.
fn check(
    arena: &NodeArena,
    node: Option<NodeId>,
    low: Option<Key>,
    high: Option<Key>,
    out: &mut Vec<Violation>,
) -> i32 {
    let Some(id) = node else {
        return -1;
    };
    let current = arena.get(id);
    let key = current.key();

    if low.is_some_and(|l| key <= l) || high.is_some_and(|h| key >= h) {
        out.push(Violation::Order { key, low, high });
    }

    let left = check(arena, current.left(), low, Some(key), out);
    let right = check(arena, current.right(), Some(key), high, out);

    let factor = left - right;
    if !(-1..=1).contains(&factor) {
        out.push(Violation::Balance { key, factor });
    }

    let expected = 1 + max(cached(arena, current.left()), cached(arena, current.right()));
    if current.cached_height() != expected {
        out.push(Violation::Height {
            key,
            stored: current.cached_height(),
            expected,
        });
    }

    1 + max(left, right)
}
