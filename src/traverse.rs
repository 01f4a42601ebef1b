use std::collections::VecDeque;

use crate::arena::{Key, NodeArena, NodeId};
use crate::avl_tree::{AvlTree, ConfigT};

/// Ascending keys. Holds the path of nodes whose left side is done.
pub struct InOrder<'a> {
    arena: &'a NodeArena,
    stack: Vec<NodeId>,
}

impl<'a> InOrder<'a> {
    fn new(arena: &'a NodeArena, root: Option<NodeId>) -> Self {
        let mut iter = InOrder {
            arena,
            stack: Vec::new(),
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<NodeId>) {
        while let Some(id) = node {
            self.stack.push(id);
            node = self.arena.get(id).left();
        }
    }
}

impl Iterator for InOrder<'_> {
    type Item = Key;

    fn next(&mut self) -> Option<Key> {
        let id = self.stack.pop()?;
        let node = self.arena.get(id);
        self.push_left_spine(node.right());
        Some(node.key())
    }
}

pub struct PreOrder<'a> {
    arena: &'a NodeArena,
    stack: Vec<NodeId>,
}

impl Iterator for PreOrder<'_> {
    type Item = Key;

    fn next(&mut self) -> Option<Key> {
        let id = self.stack.pop()?;
        let node = self.arena.get(id);
        self.stack.extend(node.right());
        self.stack.extend(node.left());
        Some(node.key())
    }
}

/// Each stack entry is a node plus whether its children were already pushed.
pub struct PostOrder<'a> {
    arena: &'a NodeArena,
    stack: Vec<(NodeId, bool)>,
}

impl Iterator for PostOrder<'_> {
    type Item = Key;

    fn next(&mut self) -> Option<Key> {
        while let Some((id, expanded)) = self.stack.pop() {
            let node = self.arena.get(id);
            if expanded {
                return Some(node.key());
            }
            self.stack.push((id, true));
            if let Some(right) = node.right() {
                self.stack.push((right, false));
            }
            if let Some(left) = node.left() {
                self.stack.push((left, false));
            }
        }
        None
    }
}

/// Breadth-first. Only present children are ever queued.
pub struct LevelOrder<'a> {
    arena: &'a NodeArena,
    queue: VecDeque<NodeId>,
}

impl Iterator for LevelOrder<'_> {
    type Item = Key;

    fn next(&mut self) -> Option<Key> {
        let id = self.queue.pop_front()?;
        let node = self.arena.get(id);
        self.queue.extend(node.left());
        self.queue.extend(node.right());
        Some(node.key())
    }
}

impl<Config: ConfigT> AvlTree<Config> {
    pub fn in_order(&self) -> InOrder<'_> {
        InOrder::new(&self.arena, self.root)
    }

    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            arena: &self.arena,
            stack: self.root.into_iter().collect(),
        }
    }

    pub fn post_order(&self) -> PostOrder<'_> {
        PostOrder {
            arena: &self.arena,
            stack: self.root.map(|id| (id, false)).into_iter().collect(),
        }
    }

    pub fn level_order(&self) -> LevelOrder<'_> {
        LevelOrder {
            arena: &self.arena,
            queue: self.root.into_iter().collect(),
        }
    }

    pub fn iter(&self) -> InOrder<'_> {
        self.in_order()
    }
}

impl<'a, Config: ConfigT> IntoIterator for &'a AvlTree<Config> {
    type Item = Key;
    type IntoIter = InOrder<'a>;

    fn into_iter(self) -> InOrder<'a> {
        self.in_order()
    }
}
