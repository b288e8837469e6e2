//! Text rendering of ordered trees

use termtree::Tree;
use tracing::instrument;

use crate::application::{OrderedTree, OrderingResult};
use crate::domain::{Node, NodeId};
use crate::infrastructure::TreeStore;

pub trait TreeRender {
    /// Forest under a `.` root, children in list order, labels `name [position]`.
    fn to_tree_string(&self) -> OrderingResult<Tree<String>>;
}

fn label(node: &Node) -> String {
    match node.position {
        Some(position) => format!("{} [{}]", node.data, position),
        None => format!("{} [-]", node.data),
    }
}

impl<S: TreeStore> TreeRender for OrderedTree<S> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> OrderingResult<Tree<String>> {
        fn build_tree<S: TreeStore>(
            tree: &OrderedTree<S>,
            node_id: NodeId,
            parent_tree: &mut Tree<String>,
        ) -> OrderingResult<()> {
            for child in tree.children(node_id)? {
                let mut child_tree = Tree::new(label(&child));
                build_tree(tree, child.id, &mut child_tree)?;
                parent_tree.push(child_tree);
            }
            Ok(())
        }

        let mut forest = Tree::new(".".to_string());
        for root in self.roots()? {
            let mut root_tree = Tree::new(label(&root));
            build_tree(self, root.id, &mut root_tree)?;
            forest.push(root_tree);
        }
        Ok(forest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::OutlineBuilder;

    #[test]
    fn given_outline_when_rendering_then_lists_in_position_order() {
        let mut outline = OutlineBuilder::new()
            .build("- a:\n  - a1\n  - a2\n- b")
            .unwrap();
        let a2 = outline.id("a2").unwrap();
        outline.tree.engine_mut().move_to_top(a2).unwrap();

        let rendered = outline.tree.to_tree_string().unwrap().to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], ".");
        assert!(lines[1].ends_with("a [0]"));
        assert!(lines[2].ends_with("a2 [0]"));
        assert!(lines[3].ends_with("a1 [1]"));
        assert!(lines[4].ends_with("b [1]"));
    }
}
