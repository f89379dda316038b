/*!
# Reversible Mutations

Every edit of the tree goes through an `Undo` record: the node's content
before and after the edit. Records compose by concatenation and are reverted
in reverse order. Reverting checks that each node still holds the content
the edit installed; anything else means two edits overlapped incorrectly.
*/

use crate::core::{ReduceError, ReduceResult};
use crate::parser::ast::{Node, NodeId, Tree};

#[derive(Debug, Clone, PartialEq)]
struct Edit {
    id: NodeId,
    prev: Node,
    next: Node,
}

/// Inverse of a group of edits
#[derive(Debug, Default, PartialEq)]
#[must_use = "an Undo must be reverted or explicitly committed"]
pub struct Undo {
    edits: Vec<Edit>,
}

impl Undo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Installs `next` as the content of `id`.
    pub fn set(&mut self, tree: &mut Tree, id: NodeId, next: Node) {
        let prev = tree.replace(id, next.clone());
        self.edits.push(Edit { id, prev, next });
    }

    /// Points the slot of `parent` that holds `old` at `new`.
    pub fn replace_child(&mut self, tree: &mut Tree, parent: NodeId, old: NodeId, new: NodeId) -> ReduceResult<()> {
        let mut node = tree.node(parent).clone();
        if !node.replace_child(old, new) {
            return Err(ReduceError::invariant(format!(
                "{} is not a child of {} ({})",
                old,
                parent,
                node.kind_name()
            )));
        }
        self.set(tree, parent, node);
        Ok(())
    }

    /// Renames the identifier `id`.
    pub fn rename(&mut self, tree: &mut Tree, id: NodeId, name: &str) -> ReduceResult<()> {
        match tree.node(id) {
            Node::Ident { .. } => {
                self.set(tree, id, Node::Ident { name: name.to_string() });
                Ok(())
            }
            other => Err(ReduceError::invariant(format!(
                "cannot rename {} ({})",
                id,
                other.kind_name()
            ))),
        }
    }

    /// Appends `later`, which must have been applied after `self`.
    pub fn then(mut self, later: Undo) -> Undo {
        self.edits.extend(later.edits);
        self
    }

    /// Restores every edited node, newest edit first.
    pub fn revert(self, tree: &mut Tree) -> ReduceResult<()> {
        for edit in self.edits.into_iter().rev() {
            match tree.get(edit.id) {
                Some(current) if *current == edit.next => {
                    tree.replace(edit.id, edit.prev);
                }
                Some(current) => {
                    return Err(ReduceError::invariant(format!(
                        "{} changed under undo: expected {}, found {}",
                        edit.id,
                        edit.next.kind_name(),
                        current.kind_name()
                    )));
                }
                None => {
                    return Err(ReduceError::invariant(format!("{} vanished before undo", edit.id)));
                }
            }
        }
        Ok(())
    }

    /// Keeps the edits.
    pub fn commit(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{print_tree, GoParser};

    const SRC: &str = "package main\n\nfunc main() {\n\tx := 1 + 2\n\tprintln(x)\n}\n";

    fn find(tree: &Tree, pred: impl Fn(&Node) -> bool) -> NodeId {
        tree.descendants(tree.root())
            .into_iter()
            .find(|id| pred(tree.node(*id)))
            .unwrap()
    }

    #[test]
    fn test_revert_restores_exact_tree() {
        let mut tree = GoParser::new().parse_text(SRC).unwrap();
        let before = tree.clone();

        let binary = find(&tree, |n| matches!(n, Node::Binary { .. }));
        let Node::Binary { x, .. } = tree.node(binary).clone() else { unreachable!() };
        let assign = find(&tree, |n| matches!(n, Node::Assign { .. }));

        let mut undo = Undo::new();
        undo.replace_child(&mut tree, assign, binary, x).unwrap();
        let ident = find(&tree, |n| n.ident_name() == Some("println"));
        undo.rename(&mut tree, ident, "print").unwrap();
        assert_eq!(
            print_tree(&tree),
            "package main\n\nfunc main() {\n\tx := 1\n\tprint(x)\n}\n"
        );

        undo.revert(&mut tree).unwrap();
        assert_eq!(tree, before);
    }

    #[test]
    fn test_composed_undo_reverts_in_reverse_order() {
        let mut tree = GoParser::new().parse_text(SRC).unwrap();
        let before = tree.clone();
        let ident = find(&tree, |n| n.ident_name() == Some("println"));

        let mut first = Undo::new();
        first.rename(&mut tree, ident, "a").unwrap();
        let mut second = Undo::new();
        second.rename(&mut tree, ident, "b").unwrap();

        first.then(second).revert(&mut tree).unwrap();
        assert_eq!(tree, before);
    }

    #[test]
    fn test_revert_detects_foreign_edit() {
        let mut tree = GoParser::new().parse_text(SRC).unwrap();
        let ident = find(&tree, |n| n.ident_name() == Some("println"));

        let mut undo = Undo::new();
        undo.rename(&mut tree, ident, "a").unwrap();
        tree.replace(ident, Node::Ident { name: "z".to_string() });

        let err = undo.revert(&mut tree).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_replace_child_requires_child() {
        let mut tree = GoParser::new().parse_text(SRC).unwrap();
        let ident = find(&tree, |n| n.ident_name() == Some("println"));
        let mut undo = Undo::new();
        let err = undo.replace_child(&mut tree, ident, NodeId(0), NodeId(1)).unwrap_err();
        assert!(matches!(err, ReduceError::Invariant(_)));
        assert!(undo.is_empty());
    }
}
