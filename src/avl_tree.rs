use std::cell::RefCell;
use std::cmp::{max, Ordering};
use std::fmt;
use std::marker::PhantomData;

use crate::arena::{Key, Node, NodeArena, NodeId};
use crate::error::AvlError;

pub trait ConfigT: Sized {
    const DEBUG: bool;
    const CHECK_INVARIANTS: bool; // validate the whole tree after every mutation
}

macro_rules! debug {
    ($writer:expr, $($arg:tt)+) => {
        if Config::DEBUG {
            match $writer {
                Some(ref w) => {
                    let _ = writeln!(w.borrow_mut(), $($arg)+);
                }
                None => {
                    log::debug!($($arg)+);
                }
            }
        }
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation {
    LeftLeft,
    RightRight,
    LeftRight,
    RightLeft,
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rotation::LeftLeft => "LL",
            Rotation::RightRight => "RR",
            Rotation::LeftRight => "LR",
            Rotation::RightLeft => "RL",
        };
        f.write_str(name)
    }
}

/// AVL tree over `i32` keys, stored in a `NodeArena`.
///
/// Nodes carry no parent link. Every structural operation works on a subtree
/// and returns the id of whatever node roots that subtree afterwards; the
/// caller relinks its own child slot to the returned id.
pub struct AvlTree<Config: ConfigT> {
    pub(crate) arena: NodeArena,
    pub(crate) root: Option<NodeId>,
    debug_writer: Option<RefCell<Box<dyn std::fmt::Write>>>,
    _config: PhantomData<Config>,
}

impl<Config: ConfigT> AvlTree<Config> {
    pub fn new() -> Self {
        Self::new_with_debug_writer::<String>(None)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        AvlTree {
            arena: NodeArena::with_capacity(capacity),
            root: None,
            debug_writer: None,
            _config: PhantomData,
        }
    }

    pub fn new_with_debug_writer<Writer: std::fmt::Write + 'static>(
        debug_writer: Option<Writer>,
    ) -> Self {
        let debug_writer = match debug_writer {
            None => None,
            Some(w) => {
                let b: Box<dyn std::fmt::Write> = Box::new(w);
                Some(RefCell::new(b))
            }
        };
        AvlTree {
            arena: NodeArena::new(),
            root: None,
            debug_writer,
            _config: PhantomData,
        }
    }

    pub fn from_keys<I: IntoIterator<Item = Key>>(keys: I) -> Result<Self, AvlError> {
        Self::from_keys_with_debug_writer::<_, String>(keys, None)
    }

    pub fn from_keys_with_debug_writer<I, Writer>(
        keys: I,
        debug_writer: Option<Writer>,
    ) -> Result<Self, AvlError>
    where
        I: IntoIterator<Item = Key>,
        Writer: std::fmt::Write + 'static,
    {
        let mut tree = Self::new_with_debug_writer(debug_writer);
        for key in keys {
            tree.insert(key)?;
        }
        Ok(tree)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.arena.get(id)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the whole tree: `-1` when empty, `0` for a single node.
    pub fn height(&self) -> i32 {
        self.height_of(self.root)
    }

    pub fn height_of(&self, node: Option<NodeId>) -> i32 {
        node.map_or(-1, |id| self.arena.get(id).height)
    }

    pub fn balance_factor(&self, id: NodeId) -> i32 {
        let node = self.arena.get(id);
        self.height_of(node.left) - self.height_of(node.right)
    }

    fn recompute_height(&mut self, id: NodeId) {
        let node = *self.arena.get(id);
        let height = 1 + max(self.height_of(node.left), self.height_of(node.right));
        self.arena.get_mut(id).height = height;
    }

    pub fn search(&self, key: Key) -> bool {
        let mut current = self.root;
        while let Some(id) = current {
            let node = self.arena.get(id);
            match key.cmp(&node.key) {
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
                Ordering::Equal => return true,
            }
        }
        false
    }

    pub fn contains(&self, key: Key) -> bool {
        self.search(key)
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.arena.get(id).left {
            id = left;
        }
        id
    }

    fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.arena.get(id).right {
            id = right;
        }
        id
    }

    pub fn min(&self) -> Option<Key> {
        self.root.map(|id| self.arena.get(self.leftmost(id)).key)
    }

    pub fn max(&self) -> Option<Key> {
        self.root.map(|id| self.arena.get(self.rightmost(id)).key)
    }

    /// Releases every node.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    /// Promote `node.left`; `node` becomes its right child.
    pub fn rotate_left_left(&mut self, node: NodeId) -> NodeId {
        let pivot = self.arena.get(node).left.expect("LL rotation without a left child");
        let moved = self.arena.get(pivot).right;
        self.arena.get_mut(node).left = moved;
        self.arena.get_mut(pivot).right = Some(node);
        self.recompute_height(node);
        self.recompute_height(pivot);
        pivot
    }

    /// Promote `node.right`; `node` becomes its left child.
    pub fn rotate_right_right(&mut self, node: NodeId) -> NodeId {
        let pivot = self
            .arena
            .get(node)
            .right
            .expect("RR rotation without a right child");
        let moved = self.arena.get(pivot).left;
        self.arena.get_mut(node).right = moved;
        self.arena.get_mut(pivot).left = Some(node);
        self.recompute_height(node);
        self.recompute_height(pivot);
        pivot
    }

    /// `node.left.right` becomes the subtree root with `node.left` on its left
    /// and `node` on its right.
    pub fn rotate_left_right(&mut self, node: NodeId) -> NodeId {
        let child = self.arena.get(node).left.expect("LR rotation without a left child");
        let new_root = self
            .arena
            .get(child)
            .right
            .expect("LR rotation without a left-right grandchild");
        let Node {
            left: inner_left,
            right: inner_right,
            ..
        } = *self.arena.get(new_root);

        self.arena.get_mut(child).right = inner_left;
        self.arena.get_mut(node).left = inner_right;
        let root = self.arena.get_mut(new_root);
        root.left = Some(child);
        root.right = Some(node);

        self.recompute_height(child);
        self.recompute_height(node);
        self.recompute_height(new_root);
        new_root
    }

    /// Mirror of `rotate_left_right`.
    pub fn rotate_right_left(&mut self, node: NodeId) -> NodeId {
        let child = self
            .arena
            .get(node)
            .right
            .expect("RL rotation without a right child");
        let new_root = self
            .arena
            .get(child)
            .left
            .expect("RL rotation without a right-left grandchild");
        let Node {
            left: inner_left,
            right: inner_right,
            ..
        } = *self.arena.get(new_root);

        self.arena.get_mut(child).left = inner_right;
        self.arena.get_mut(node).right = inner_left;
        let root = self.arena.get_mut(new_root);
        root.left = Some(node);
        root.right = Some(child);

        self.recompute_height(child);
        self.recompute_height(node);
        self.recompute_height(new_root);
        new_root
    }

    fn rotation_for(&self, node: NodeId) -> Rotation {
        let bf = self.balance_factor(node);
        debug_assert!(
            !(-1..=1).contains(&bf),
            "rotation requested for balanced node (bf={bf})"
        );
        let current = self.arena.get(node);
        if bf < -1 {
            let right = current.right.expect("right-heavy node without a right child");
            // A balanced right child only shows up after a deletion and needs the
            // single rotation; the double one would leave the old child at -2.
            if self.balance_factor(right) <= 0 {
                Rotation::RightRight
            } else {
                Rotation::RightLeft
            }
        } else {
            let left = current.left.expect("left-heavy node without a left child");
            if self.balance_factor(left) < 0 {
                Rotation::LeftRight
            } else {
                Rotation::LeftLeft
            }
        }
    }

    /// `node` must have a balance factor outside `[-1, 1]`.
    pub fn choose_and_apply_rotation(&mut self, node: NodeId) -> NodeId {
        let rotation = self.rotation_for(node);
        let key = self.arena.get(node).key;
        if Config::DEBUG {
            debug!(self.debug_writer, "{} at {}", rotation, key);
        } else {
            log::trace!("{rotation} rotation at key {key}");
        }
        match rotation {
            Rotation::LeftLeft => self.rotate_left_left(node),
            Rotation::RightRight => self.rotate_right_right(node),
            Rotation::LeftRight => self.rotate_left_right(node),
            Rotation::RightLeft => self.rotate_right_left(node),
        }
    }

    fn rebalance(&mut self, node: NodeId) -> NodeId {
        self.recompute_height(node);
        let bf = self.balance_factor(node);
        if (-1..=1).contains(&bf) {
            node
        } else {
            self.choose_and_apply_rotation(node)
        }
    }

    // Returns the new root of the subtree
    fn insert_at(&mut self, node: Option<NodeId>, key: Key) -> NodeId {
        let Some(id) = node else {
            return self.arena.alloc(key);
        };
        let current = *self.arena.get(id);
        match key.cmp(&current.key) {
            Ordering::Less => {
                let left = self.insert_at(current.left, key);
                self.arena.get_mut(id).left = Some(left);
            }
            Ordering::Greater => {
                let right = self.insert_at(current.right, key);
                self.arena.get_mut(id).right = Some(right);
            }
            Ordering::Equal => return id,
        }
        self.rebalance(id)
    }

    /// Inserts `key`. Returns `Ok(false)` and leaves the tree untouched when the
    /// key is already present. On allocation failure the tree is unchanged.
    pub fn insert(&mut self, key: Key) -> Result<bool, AvlError> {
        if self.search(key) {
            log::debug!("insert {key}: already present");
            return Ok(false);
        }
        self.arena.reserve_one()?;
        let root = self.insert_at(self.root, key);
        self.root = Some(root);
        log::debug!("insert {key}: height now {}", self.height());
        self.check_invariants("insert", key);
        Ok(true)
    }

    // Returns the new root of the subtree
    fn delete_at(&mut self, node: Option<NodeId>, key: Key) -> Option<NodeId> {
        let id = node?;
        let current = *self.arena.get(id);
        match key.cmp(&current.key) {
            Ordering::Less => {
                let left = self.delete_at(current.left, key);
                self.arena.get_mut(id).left = left;
            }
            Ordering::Greater => {
                let right = self.delete_at(current.right, key);
                self.arena.get_mut(id).right = right;
            }
            Ordering::Equal => match (current.left, current.right) {
                (None, None) => {
                    self.arena.free(id);
                    return None;
                }
                (Some(child), None) | (None, Some(child)) => {
                    self.arena.free(id);
                    return Some(child);
                }
                (Some(_), Some(right)) => {
                    let successor_key = self.arena.get(self.leftmost(right)).key;
                    self.arena.get_mut(id).key = successor_key;
                    let right = self.delete_at(Some(right), successor_key);
                    self.arena.get_mut(id).right = right;
                }
            },
        }
        Some(self.rebalance(id))
    }

    /// Removes `key`. Returns `false` when it was absent, in which case no node
    /// is touched.
    pub fn delete(&mut self, key: Key) -> bool {
        if !self.search(key) {
            log::debug!("delete {key}: not found");
            return false;
        }
        self.root = self.delete_at(self.root, key);
        log::debug!("delete {key}: height now {}", self.height());
        self.check_invariants("delete", key);
        true
    }

    fn check_invariants(&self, op: &str, key: Key) {
        if Config::CHECK_INVARIANTS {
            if let Err(violations) = self.validate() {
                let report = violations
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                panic!("{op} {key} broke the tree: {report}");
            }
        }
    }
}

impl<Config: ConfigT> fmt::Display for AvlTree<Config> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::render::render(self))
    }
}

pub struct BaseConfig {}
pub struct BaseConfigDebug {}

impl ConfigT for BaseConfig {
    const DEBUG: bool = false;
    const CHECK_INVARIANTS: bool = false;
}

impl ConfigT for BaseConfigDebug {
    const DEBUG: bool = true;
    const CHECK_INVARIANTS: bool = true;
}

pub type Default = AvlTree<BaseConfig>;
pub type DefaultDebug = AvlTree<BaseConfigDebug>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_string_writer::SharedStringWriter;

    use expect_test::{expect, Expect};

    fn tree_of(keys: &[Key]) -> DefaultDebug {
        let mut tree = DefaultDebug::new();
        for &k in keys {
            tree.insert(k).unwrap();
        }
        tree
    }

    fn check_rotations(keys: &[Key], deletes: &[Key], expect: Expect) {
        let writer = SharedStringWriter::new();
        let mut tree = DefaultDebug::new_with_debug_writer(Some(writer.clone()));
        for &k in keys {
            tree.insert(k).unwrap();
        }
        for &k in deletes {
            assert!(tree.delete(k));
        }
        expect.assert_eq(&writer.borrow());
    }

    #[test]
    fn test_single_rotations_on_insert() {
        check_rotations(&[3, 2, 1], &[], expect![[r#"
            LL at 3
        "#]]);
        check_rotations(&[1, 2, 3], &[], expect![[r#"
            RR at 1
        "#]]);
    }

    #[test]
    fn test_double_rotations_on_insert() {
        check_rotations(&[3, 1, 2], &[], expect![[r#"
            LR at 3
        "#]]);
        check_rotations(&[1, 3, 2], &[], expect![[r#"
            RL at 1
        "#]]);
    }

    #[test]
    fn test_balanced_right_child_after_delete_uses_single_rotation() {
        check_rotations(&[10, 5, 20, 3, 15, 25, 12, 30], &[3], expect![[r#"
            RR at 10
        "#]]);
    }

    #[test]
    fn test_balanced_left_child_after_delete_uses_single_rotation() {
        check_rotations(&[10, 15, 5, 17, 7, 3, 8, 1], &[17], expect![[r#"
            LL at 10
        "#]]);
    }

    #[test]
    fn test_from_keys_keeps_debug_writer() {
        let writer = SharedStringWriter::new();
        let tree = DefaultDebug::from_keys_with_debug_writer([3, 2, 1, 4, 5], Some(writer.clone()))
            .unwrap();
        assert_eq!(writer.lines(), vec!["LL at 3", "RR at 3"]);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_rotation_returns_new_subtree_root() {
        let mut tree = Default::new();
        let a = tree.arena.alloc(3);
        let b = tree.arena.alloc(2);
        let c = tree.arena.alloc(1);
        tree.arena.get_mut(a).left = Some(b);
        tree.arena.get_mut(b).left = Some(c);
        tree.recompute_height(b);
        tree.recompute_height(a);
        assert_eq!(tree.balance_factor(a), 2);

        let root = tree.choose_and_apply_rotation(a);
        assert_eq!(root, b);
        assert_eq!(tree.node(b).left(), Some(c));
        assert_eq!(tree.node(b).right(), Some(a));
        assert_eq!(tree.node(b).cached_height(), 1);
        assert_eq!(tree.node(a).cached_height(), 0);
        assert_eq!(tree.node(c).cached_height(), 0);
    }

    #[test]
    fn test_left_right_moves_grandchild_subtrees() {
        // 50 -> 30 -> 40 with 40 carrying 35 and 45.
        let mut tree = Default::new();
        let n50 = tree.arena.alloc(50);
        let n30 = tree.arena.alloc(30);
        let n40 = tree.arena.alloc(40);
        let n35 = tree.arena.alloc(35);
        let n45 = tree.arena.alloc(45);
        tree.arena.get_mut(n50).left = Some(n30);
        tree.arena.get_mut(n30).right = Some(n40);
        tree.arena.get_mut(n40).left = Some(n35);
        tree.arena.get_mut(n40).right = Some(n45);
        for id in [n35, n45, n40, n30, n50] {
            tree.recompute_height(id);
        }

        let root = tree.rotate_left_right(n50);
        assert_eq!(root, n40);
        assert_eq!(tree.node(n40).left(), Some(n30));
        assert_eq!(tree.node(n40).right(), Some(n50));
        assert_eq!(tree.node(n30).right(), Some(n35));
        assert_eq!(tree.node(n50).left(), Some(n45));
        assert_eq!(tree.node(n40).cached_height(), 2);
    }

    #[test]
    fn test_insert_duplicate_is_noop() {
        let mut tree = tree_of(&[2, 1, 3]);
        let root = tree.root();
        assert_eq!(tree.insert(2).unwrap(), false);
        assert_eq!(tree.root(), root);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_height_convention() {
        let mut tree = Default::new();
        assert_eq!(tree.height(), -1);
        tree.insert(1).unwrap();
        assert_eq!(tree.height(), 0);
        tree.insert(2).unwrap();
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_delete_missing_key_keeps_node_ids() {
        let mut tree = tree_of(&[50, 30, 70]);
        let root = tree.root().unwrap();
        let left = tree.node(root).left();
        let right = tree.node(root).right();
        assert!(!tree.delete(999));
        assert_eq!(tree.root(), Some(root));
        assert_eq!(tree.node(root).left(), left);
        assert_eq!(tree.node(root).right(), right);
    }

    #[test]
    fn test_two_children_delete_copies_successor_key() {
        let mut tree = tree_of(&[50, 30, 70, 20, 40, 60, 80]);
        let root = tree.root().unwrap();
        assert!(tree.delete(50));
        assert_eq!(tree.root(), Some(root));
        assert_eq!(tree.node(root).key(), 60);
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn test_min_max_and_clear() {
        let mut tree = tree_of(&[5, 9, 1, 7]);
        assert_eq!(tree.min(), Some(1));
        assert_eq!(tree.max(), Some(9));
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.min(), None);
    }

    #[test]
    fn test_balance_after_operations() {
        let mut tree = Default::new();
        for k in 1..=100 {
            tree.insert(k).unwrap();
        }
        for k in &[50, 75, 25] {
            tree.delete(*k);
        }
        assert!(tree.validate().is_ok(), "Tree is unbalanced after operations");
    }
}
