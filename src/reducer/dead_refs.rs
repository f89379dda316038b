/*!
# Dead-Reference Resolver

When a group of nodes is about to leave the tree, the symbols whose last
references live in that group are neutralized in the same trial: their
import is deleted, or their declaring identifier becomes `_`.
*/

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::core::ReduceResult;
use crate::parser::ast::{AssignOp, Node, NodeId, Tree};
use crate::semantic::{SymbolId, SymbolIndex, SymbolKind};

use super::undo::Undo;

/// Symbols left without references once every node in `dropped` is gone.
///
/// The group is counted as a whole: a symbol referenced once in each of two
/// dropped nodes is an orphan even though neither node alone would orphan it.
pub fn orphans(tree: &Tree, index: &SymbolIndex, dropped: &[NodeId]) -> Vec<SymbolId> {
    let mut remaining: HashMap<SymbolId, usize> = HashMap::new();
    let mut orphans = Vec::new();
    for &node in dropped {
        for id in tree.descendants(node) {
            let Some(symbol) = index.referenced_by(id) else {
                continue;
            };
            let left = remaining
                .entry(symbol)
                .or_insert_with(|| index.reference_count(symbol));
            if *left == 0 {
                continue;
            }
            *left -= 1;
            if *left == 0 {
                orphans.push(symbol);
            }
        }
    }
    orphans
}

/// Neutralizes every orphan of `dropped` and returns the inverse.
pub fn resolve_dead_refs(tree: &mut Tree, index: &SymbolIndex, dropped: &[NodeId]) -> ReduceResult<Undo> {
    let orphaned = orphans(tree, index, dropped);
    let orphan_set: HashSet<SymbolId> = orphaned.iter().copied().collect();
    let mut undo = Undo::new();

    for symbol_id in orphaned {
        let symbol = index.symbol(symbol_id);
        match &symbol.kind {
            SymbolKind::Package { path, import } => {
                let root = tree.root();
                if let Node::File { package, imports, decls } = tree.node(root) {
                    let file = Node::File {
                        package: package.clone(),
                        imports: imports.iter().copied().filter(|i| i != import).collect(),
                        decls: decls.clone(),
                    };
                    undo.set(tree, root, file);
                    trace!("import \"{}\" no longer used", path);
                }
            }
            SymbolKind::Var | SymbolKind::Const { .. } => {
                if let Some(stmt) = symbol.decl_stmt {
                    if let Node::TypeSwitch { init, guard, clauses, .. } = tree.node(stmt) {
                        // `_ := x.(type)` is not valid Go; drop the binding instead
                        let unbound = Node::TypeSwitch {
                            init: *init,
                            bind: None,
                            guard: *guard,
                            clauses: clauses.clone(),
                        };
                        undo.set(tree, stmt, unbound);
                        trace!("{} `{}` unbound", symbol_id, symbol.name);
                        continue;
                    }
                }
                undo.rename(tree, symbol.decl, "_")?;
                trace!("{} `{}` blanked", symbol_id, symbol.name);
                if let Some(stmt) = symbol.decl_stmt {
                    undo = undo.then(downgrade_definition(tree, index, &orphan_set, stmt));
                }
            }
            // Unused types and functions still compile
            SymbolKind::Type | SymbolKind::Func => {}
        }
    }
    Ok(undo)
}

/// Turns `:=` into `=` once no name on its left introduces a live binding.
fn downgrade_definition(
    tree: &mut Tree,
    index: &SymbolIndex,
    orphans: &HashSet<SymbolId>,
    stmt: NodeId,
) -> Undo {
    let mut undo = Undo::new();
    let binds = |targets: &[NodeId]| {
        targets
            .iter()
            .filter_map(|t| index.declared_by(*t))
            .any(|s| !orphans.contains(&s))
    };
    let replacement = match tree.node(stmt) {
        Node::Assign { op: AssignOp::Define, lhs, rhs } if !binds(lhs) => Node::Assign {
            op: AssignOp::Assign,
            lhs: lhs.clone(),
            rhs: rhs.clone(),
        },
        Node::Range { key, value, define: true, x, body } => {
            let targets: Vec<NodeId> = key.iter().chain(value.iter()).copied().collect();
            if binds(&targets) {
                return undo;
            }
            Node::Range { key: *key, value: *value, define: false, x: *x, body: *body }
        }
        _ => return undo,
    };
    undo.set(tree, stmt, replacement);
    undo
}
