/*!
# Block Inliner

Splices a nested block's statements into the enclosing block. Names the
nested block declares that would clash with an outer binding are renamed
first by appending underscores.
*/

use std::collections::HashSet;

use crate::config::RuleKind;
use crate::core::ReduceResult;
use crate::parser::ast::{AssignOp, Node, NodeId, Tree};
use crate::semantic::SymbolIndex;

use super::oracle::Oracle;
use super::undo::Undo;
use super::Reducer;

impl<O: Oracle> Reducer<O> {
    pub(super) fn inline_block(&mut self, block: NodeId) -> ReduceResult<bool> {
        if !self.enabled(RuleKind::BlockInline) {
            return Ok(false);
        }
        let Node::Block { stmts } = self.tree.node(block).clone() else {
            return Ok(false);
        };

        for (i, &inner) in stmts.iter().enumerate() {
            let Node::Block { stmts: inner_stmts } = self.tree.node(inner).clone() else {
                continue;
            };
            let change = self.change(inner, RuleKind::BlockInline, "block inlined");

            let mark = self.tree.len();
            let mut undo = rename_shadowing(&mut self.tree, &self.index, inner, &inner_stmts)?;
            let spliced: Vec<NodeId> = stmts[..i]
                .iter()
                .chain(inner_stmts.iter())
                .chain(stmts[i + 1..].iter())
                .copied()
                .collect();
            undo.set(&mut self.tree, block, Node::Block { stmts: spliced });
            if self.attempt(mark, undo, change)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Renames every name declared directly in `inner` that also resolves from
/// the enclosing scope, together with all of its uses.
fn rename_shadowing(tree: &mut Tree, index: &SymbolIndex, inner: NodeId, stmts: &[NodeId]) -> ReduceResult<Undo> {
    let mut undo = Undo::new();
    let scopes = index.scopes();
    let Some(scope) = index.block_scope(inner) else {
        return Ok(undo);
    };
    let Some(outer) = scopes.parent(scope) else {
        return Ok(undo);
    };

    // Every name spelled inside the block, so a new name cannot capture a
    // use in a deeper scope
    let mut taken: HashSet<String> = tree
        .descendants(inner)
        .into_iter()
        .filter_map(|id| tree.node(id).ident_name().map(str::to_string))
        .collect();

    let declared: Vec<NodeId> = stmts.iter().flat_map(|stmt| declared_names(tree, *stmt)).collect();
    for ident in declared {
        let Some(symbol) = index.declared_by(ident) else {
            continue;
        };
        let name = &index.symbol(symbol).name;
        match scopes.lookup(outer, name) {
            Some(other) if other != symbol => {}
            _ => continue,
        }

        let mut fresh = format!("{}_", name);
        while taken.contains(&fresh) || scopes.lookup(outer, &fresh).is_some() {
            fresh.push('_');
        }
        taken.insert(fresh.clone());

        undo.rename(tree, ident, &fresh)?;
        for &occurrence in index.occurrences_of(symbol) {
            undo.rename(tree, occurrence, &fresh)?;
        }
    }
    Ok(undo)
}

/// Identifiers a statement binds in its own block.
fn declared_names(tree: &Tree, stmt: NodeId) -> Vec<NodeId> {
    match tree.node(stmt) {
        Node::Assign { op: AssignOp::Define, lhs, .. } => lhs.clone(),
        Node::Decl { specs, .. } => specs
            .iter()
            .flat_map(|spec| match tree.node(*spec) {
                Node::ValueSpec { names, .. } => names.clone(),
                Node::TypeSpec { name, .. } => vec![*name],
                _ => Vec::new(),
            })
            .collect(),
        Node::Labeled { stmt: Some(stmt), .. } => declared_names(tree, *stmt),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ReducerConfig, RuleKind};
    use crate::parser::GoParser;
    use crate::reducer::Reducer;

    fn inline_only() -> ReducerConfig {
        let mut config = ReducerConfig::default();
        for rule in RuleKind::ALL {
            config.set_rule_enabled(rule, rule == RuleKind::BlockInline);
        }
        config
    }

    #[test]
    fn test_plain_block_is_spliced() {
        let src = "package main\n\nfunc main() {\n\t{\n\t\tprintln(1)\n\t}\n\tprintln(2)\n}\n";
        let tree = GoParser::new().parse_text(src).unwrap();
        let mut r = Reducer::with_config(tree, |_: &str| true, inline_only());
        let change = r.reduce_once().unwrap().unwrap();
        assert_eq!(change.description, "block inlined");
        assert_eq!(r.source(), "package main\n\nfunc main() {\n\tprintln(1)\n\tprintln(2)\n}\n");
    }

    #[test]
    fn test_shadowing_name_is_renamed() {
        let src = "package main\n\nfunc main() {\n\tx := 1\n\t{\n\t\tx := 2\n\t\tprintln(x)\n\t}\n\tprintln(x)\n}\n";
        let tree = GoParser::new().parse_text(src).unwrap();
        let mut r = Reducer::with_config(tree, |_: &str| true, inline_only());
        r.reduce_once().unwrap().unwrap();
        assert_eq!(
            r.source(),
            "package main\n\nfunc main() {\n\tx := 1\n\tx_ := 2\n\tprintln(x_)\n\tprintln(x)\n}\n"
        );
    }

    #[test]
    fn test_fresh_name_skips_taken_names() {
        let src = "package main\n\nfunc main() {\n\tx := 1\n\tx_ := 1\n\t{\n\t\tx := 2\n\t\tprintln(x, x_)\n\t}\n\tprintln(x, x_)\n}\n";
        let tree = GoParser::new().parse_text(src).unwrap();
        let mut r = Reducer::with_config(tree, |_: &str| true, inline_only());
        r.reduce_once().unwrap().unwrap();
        assert!(r.source().contains("\tx__ := 2\n\tprintln(x__, x_)\n"));
    }

    #[test]
    fn test_block_in_case_body_is_spliced() {
        let src = "package main\n\nfunc main() {\n\tx := 1\n\tswitch {\n\tcase x > 0:\n\t\t{\n\t\t\tx := 2\n\t\t\tprintln(x)\n\t\t}\n\t}\n}\n";
        let tree = GoParser::new().parse_text(src).unwrap();
        let mut r = Reducer::with_config(tree, |_: &str| true, inline_only());
        let change = r.reduce_once().unwrap().unwrap();
        assert_eq!(change.description, "block inlined");
        assert_eq!(
            r.source(),
            "package main\n\nfunc main() {\n\tx := 1\n\tswitch {\n\tcase x > 0:\n\t\tx_ := 2\n\t\tprintln(x_)\n\t}\n}\n"
        );
    }

    #[test]
    fn test_rejected_inline_restores_names() {
        let src = "package main\n\nfunc main() {\n\tx := 1\n\t{\n\t\tx := 2\n\t\tprintln(x)\n\t}\n\tprintln(x)\n}\n";
        let tree = GoParser::new().parse_text(src).unwrap();
        let mut r = Reducer::with_config(tree, |_: &str| false, inline_only());
        assert_eq!(r.reduce_once().unwrap(), None);
        assert_eq!(r.source(), src);
    }
}
