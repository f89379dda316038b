/*!
# Scopes and Symbols

Scope arena used by the resolver. Scopes refer to their parent by id, so a
lookup walks the chain without borrowing the tree.
*/

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::parser::ast::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeType {
    Package,
    File,
    Function,
    Block,
}

/// What a symbol denotes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    /// Imported package. `import` is the `Import` node.
    Package { path: String, import: NodeId },
    Var,
    /// `value` is the initializer expression paired with this name, if any.
    Const { untyped: bool, value: Option<NodeId> },
    Type,
    Func,
}

/// A declared name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub scope: ScopeId,
    /// Declaring identifier. For packages this is the import node itself.
    pub decl: NodeId,
    /// Assignment, `ValueSpec` or `range` statement that introduced the name.
    pub decl_stmt: Option<NodeId>,
}

impl Symbol {
    pub fn is_package(&self) -> bool {
        matches!(self.kind, SymbolKind::Package { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub scope_type: ScopeType,
    pub parent: Option<ScopeId>,
    names: HashMap<String, SymbolId>,
}

impl Scope {
    pub fn names(&self) -> impl Iterator<Item = (&str, SymbolId)> {
        self.names.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

/// All scopes of one file
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scope_type: ScopeType, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            scope_type,
            parent,
            names: HashMap::new(),
        });
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.get(id).parent
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Binds `name` in `scope`, shadowing any previous binding there.
    pub fn declare(&mut self, scope: ScopeId, name: &str, symbol: SymbolId) {
        self.scopes[scope.0 as usize].names.insert(name.to_string(), symbol);
    }

    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.get(scope).names.get(name).copied()
    }

    /// Resolves `name` from `scope` outwards.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(symbol) = self.lookup_local(id, name) {
                return Some(symbol);
            }
            current = self.parent(id);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_parents() {
        let mut scopes = ScopeTree::new();
        let package = scopes.push(ScopeType::Package, None);
        let block = scopes.push(ScopeType::Block, Some(package));
        scopes.declare(package, "a", SymbolId(0));
        scopes.declare(block, "b", SymbolId(1));

        assert_eq!(scopes.lookup(block, "a"), Some(SymbolId(0)));
        assert_eq!(scopes.lookup(package, "b"), None);
        assert_eq!(scopes.lookup_local(block, "a"), None);
    }

    #[test]
    fn test_inner_declaration_shadows() {
        let mut scopes = ScopeTree::new();
        let outer = scopes.push(ScopeType::Function, None);
        let inner = scopes.push(ScopeType::Block, Some(outer));
        scopes.declare(outer, "x", SymbolId(0));
        scopes.declare(inner, "x", SymbolId(1));

        assert_eq!(scopes.lookup(inner, "x"), Some(SymbolId(1)));
        assert_eq!(scopes.lookup(outer, "x"), Some(SymbolId(0)));
    }
}
