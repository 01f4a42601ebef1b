use std::fmt::Write;

use crate::arena::NodeId;
use crate::avl_tree::{AvlTree, ConfigT};

const INDENT: usize = 4;

/// Sideways dump: right subtree above, left subtree below, one node per line
/// as `key (h=HEIGHT, bf=BALANCE)`.
pub fn render<Config: ConfigT>(tree: &AvlTree<Config>) -> String {
    fn traverse<Config: ConfigT>(
        tree: &AvlTree<Config>,
        node: Option<NodeId>,
        indent: usize,
        mut out: String,
    ) -> String {
        if let Some(id) = node {
            let current = tree.node(id);
            out = traverse(tree, current.right(), indent + INDENT, out);
            writeln!(
                &mut out,
                "{:indent$}{} (h={}, bf={})",
                "",
                current.key(),
                current.cached_height(),
                tree.balance_factor(id),
            )
            .expect("writing to String cannot fail");
            out = traverse(tree, current.left(), indent + INDENT, out);
        }
        out
    }
    traverse(tree, tree.root(), 0, String::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avl_tree::Default;

    use expect_test::expect;

    #[test]
    fn test_render_full_tree() {
        let tree = Default::from_keys([50, 30, 70, 20, 40, 60, 80]).unwrap();
        let expect = expect![[r#"
                    80 (h=0, bf=0)
                70 (h=1, bf=0)
                    60 (h=0, bf=0)
            50 (h=2, bf=0)
                    40 (h=0, bf=0)
                30 (h=1, bf=0)
                    20 (h=0, bf=0)
        "#]];
        expect.assert_eq(&render(&tree));
    }

    #[test]
    fn test_render_after_delete() {
        let mut tree = Default::from_keys([2, 1, 3, 4]).unwrap();
        tree.delete(1);
        let expect = expect![[r#"
                4 (h=0, bf=0)
            3 (h=1, bf=0)
                2 (h=0, bf=0)
        "#]];
        expect.assert_eq(&tree.to_string());
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&Default::new()), "");
    }
}
