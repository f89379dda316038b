/*!
# Semantic Analysis

Scope tracking and symbol resolution for the reducer. The result is a
`SymbolIndex` keyed by node id, so it survives edits that only rename or
detach nodes until the next rebuild.
*/

pub mod index;
pub mod resolver;
pub mod scope;

pub use index::SymbolIndex;
pub use resolver::{package_name, Resolver};
pub use scope::{Scope, ScopeId, ScopeTree, ScopeType, Symbol, SymbolId, SymbolKind};
