/*!
# Symbol Index

Derived view over a tree: which identifier declares which symbol, which
identifier references which symbol, and every symbol's ordered list of
referencing occurrences. The reducer rebuilds it after every accepted
change and checks it against the tree at the start of every pass.
*/

use std::collections::HashMap;

use crate::core::{ReduceError, ReduceResult};
use crate::parser::ast::{Node, NodeId, Tree};

use super::resolver::Resolver;
use super::scope::{ScopeId, ScopeTree, Symbol, SymbolId, SymbolKind};

#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    pub(super) symbols: Vec<Symbol>,
    pub(super) scopes: ScopeTree,
    /// Declaring identifier (or import node) -> symbol
    pub(super) declares: HashMap<NodeId, SymbolId>,
    /// Referencing identifier -> symbol
    pub(super) references: HashMap<NodeId, SymbolId>,
    /// Referencing identifiers per symbol, in source order
    pub(super) occurrences: Vec<Vec<NodeId>>,
    /// Scope opened by each block; function bodies share the function scope
    pub(super) block_scopes: HashMap<NodeId, ScopeId>,
}

impl SymbolIndex {
    pub fn build(tree: &Tree) -> Self {
        Resolver::new(tree).resolve()
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, symbol)| (SymbolId(i as u32), symbol))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol introduced at `node`, if it is a declaring identifier.
    pub fn declared_by(&self, node: NodeId) -> Option<SymbolId> {
        self.declares.get(&node).copied()
    }

    /// Symbol denoted by `node`, if it is a resolved use.
    pub fn referenced_by(&self, node: NodeId) -> Option<SymbolId> {
        self.references.get(&node).copied()
    }

    pub fn occurrences_of(&self, symbol: SymbolId) -> &[NodeId] {
        self.occurrences
            .get(symbol.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn reference_count(&self, symbol: SymbolId) -> usize {
        self.occurrences_of(symbol).len()
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn block_scope(&self, block: NodeId) -> Option<ScopeId> {
        self.block_scopes.get(&block).copied()
    }

    /// Checks that the index still describes `tree`: every recorded
    /// occurrence is an identifier spelling its symbol's name, and a fresh
    /// resolution finds the same declarations and references.
    pub fn verify(&self, tree: &Tree) -> ReduceResult<()> {
        for (&node, &symbol) in self.references.iter().chain(self.declares.iter()) {
            let expected = self.symbol(symbol);
            match (tree.get(node), &expected.kind) {
                (Some(Node::Import { .. }), SymbolKind::Package { .. }) => {}
                (Some(Node::Ident { name }), _) if *name == expected.name => {}
                (Some(other), _) => {
                    return Err(ReduceError::stale(format!(
                        "{} at {} should spell `{}`, found {}",
                        node,
                        tree.position(node),
                        expected.name,
                        other.kind_name()
                    )));
                }
                (None, _) => {
                    return Err(ReduceError::stale(format!("{} is no longer in the tree", node)));
                }
            }
        }

        let fresh = Self::build(tree);
        if fresh.references != self.references || fresh.declares != self.declares {
            return Err(ReduceError::stale(format!(
                "index has {} references and {} declarations, tree has {} and {}",
                self.references.len(),
                self.declares.len(),
                fresh.references.len(),
                fresh.declares.len()
            )));
        }
        Ok(())
    }
}
