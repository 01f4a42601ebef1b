use crate::error::AvlError;

pub type Key = i32;

/// Index of a live node inside a `NodeArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Clone, Copy, Debug)]
pub struct Node {
    pub(crate) key: Key,
    pub(crate) height: i32,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

impl Node {
    fn leaf(key: Key) -> Self {
        Node {
            key,
            height: 0,
            left: None,
            right: None,
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    /// Height stored on the node; `0` for a leaf.
    pub fn cached_height(&self) -> i32 {
        self.height
    }

    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    pub fn right(&self) -> Option<NodeId> {
        self.right
    }
}

/// Slot storage for tree nodes. Freed slots are kept on a free list and handed
/// out again before the vector grows.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    slots: Vec<Option<Node>>,
    free_list: Vec<usize>,
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        NodeArena {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
        }
    }

    /// Make sure the next `alloc` cannot fail.
    pub fn reserve_one(&mut self) -> Result<(), AvlError> {
        if self.free_list.is_empty() {
            self.slots.try_reserve(1)?;
        }
        Ok(())
    }

    /// Callers go through `reserve_one` first so this never reallocates out of
    /// memory halfway through a mutation.
    pub fn alloc(&mut self, key: Key) -> NodeId {
        if let Some(idx) = self.free_list.pop() {
            debug_assert!(self.slots[idx].is_none());
            self.slots[idx] = Some(Node::leaf(key));
            NodeId(idx)
        } else {
            let idx = self.slots.len();
            self.slots.push(Some(Node::leaf(key)));
            NodeId(idx)
        }
    }

    pub fn free(&mut self, id: NodeId) {
        let node = self.slots[id.0].take();
        assert!(node.is_some(), "double free of node slot {}", id.0);
        self.free_list.push(id.0);
    }

    pub fn get(&self, id: NodeId) -> &Node {
        match &self.slots[id.0] {
            Some(node) => node,
            None => panic!("access to freed node slot {}", id.0),
        }
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        match &mut self.slots[id.0] {
            Some(node) => node,
            None => panic!("access to freed node slot {}", id.0),
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freed_slots_are_reused() {
        let mut arena = NodeArena::new();
        let a = arena.alloc(1);
        let b = arena.alloc(2);
        assert_eq!(arena.len(), 2);
        arena.free(a);
        assert_eq!(arena.len(), 1);
        let c = arena.alloc(3);
        assert_eq!(c, a);
        assert_eq!(arena.get(c).key(), 3);
        assert_eq!(arena.get(b).key(), 2);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn new_nodes_are_leaves() {
        let mut arena = NodeArena::with_capacity(4);
        let a = arena.alloc(7);
        let node = arena.get(a);
        assert_eq!(node.cached_height(), 0);
        assert_eq!(node.left(), None);
        assert_eq!(node.right(), None);
    }

    #[test]
    #[should_panic(expected = "access to freed node slot")]
    fn reading_a_freed_slot_panics() {
        let mut arena = NodeArena::new();
        let a = arena.alloc(1);
        arena.free(a);
        arena.get(a);
    }

    #[test]
    fn reserve_then_clear() {
        let mut arena = NodeArena::new();
        arena.reserve_one().unwrap();
        arena.alloc(1);
        arena.alloc(2);
        arena.clear();
        assert!(arena.is_empty());
    }
}
