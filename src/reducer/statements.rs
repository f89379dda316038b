/*!
# Statement Remover

Tries deleting each statement of a block, one trial per statement, in
source order.
*/

use crate::config::RuleKind;
use crate::core::ReduceResult;
use crate::parser::ast::{AssignOp, DeclKind, Node, NodeId};

use super::dead_refs::resolve_dead_refs;
use super::oracle::Oracle;
use super::Reducer;

impl<O: Oracle> Reducer<O> {
    pub(super) fn remove_statement(&mut self, block: NodeId) -> ReduceResult<bool> {
        if !self.enabled(RuleKind::StmtRemove) {
            return Ok(false);
        }
        let Node::Block { stmts } = self.tree.node(block).clone() else {
            return Ok(false);
        };

        for (i, &stmt) in stmts.iter().enumerate() {
            if !self.removable(stmt) {
                continue;
            }
            let kind = self.tree.node(stmt).kind_name();
            let change = self.change(stmt, RuleKind::StmtRemove, format!("{} removed", kind));

            let mark = self.tree.len();
            let mut undo = resolve_dead_refs(&mut self.tree, &self.index, &[stmt])?;
            let mut remaining = stmts.clone();
            remaining.remove(i);
            undo.set(&mut self.tree, block, Node::Block { stmts: remaining });
            if self.attempt(mark, undo, change)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether deleting `stmt` can leave the rest of the block well-formed.
    ///
    /// Declarations go only when none of their names is used; a defining
    /// assignment or type declaration would leave dangling uses behind.
    fn removable(&self, stmt: NodeId) -> bool {
        match self.tree.node(stmt) {
            Node::Assign { op: AssignOp::Define, .. } => false,
            Node::Decl { kind: DeclKind::Type, .. } => false,
            Node::Labeled { stmt: Some(stmt), .. } => self.removable(*stmt),
            Node::Decl { specs, .. } => specs.iter().all(|spec| match self.tree.node(*spec) {
                Node::ValueSpec { names, .. } => names.iter().all(|name| {
                    self.index
                        .declared_by(*name)
                        .map_or(true, |symbol| self.index.reference_count(symbol) == 0)
                }),
                _ => false,
            }),
            _ => true,
        }
    }
}
