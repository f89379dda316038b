/*!
# Rule Dispatcher

Maps each visited node to the transformations that apply to its kind and
tries them in a fixed order. The first accepted trial ends the visit.
*/

use std::collections::HashSet;

use crate::config::RuleKind;
use crate::core::{Change, ReduceResult};
use crate::parser::ast::{LitKind, Node, NodeId};
use crate::semantic::SymbolKind;

use super::dead_refs::resolve_dead_refs;
use super::oracle::Oracle;
use super::Reducer;

/// Literal text is cut to this many characters in change descriptions
const SHOWN_LITERAL_CHARS: usize = 7;
/// Literals longer than this are shortened
const MAX_LITERAL_CHARS: usize = 10;

impl<O: Oracle> Reducer<O> {
    /// Tries every applicable rule on `id`. Returns whether one was accepted.
    pub(super) fn dispatch(&mut self, id: NodeId, parent: Option<NodeId>) -> ReduceResult<bool> {
        let node = self.tree.node(id).clone();
        if let Node::Block { .. } = node {
            return Ok(self.remove_statement(id)? || self.inline_block(id)?);
        }
        let Some(parent) = parent else {
            return Ok(false);
        };

        match node {
            Node::If { init, cond, body, els } => {
                if self.enabled(RuleKind::IfBody) && !self.header_binds(init, body) {
                    let dropped: Vec<NodeId> = init.into_iter().chain([cond]).chain(els).collect();
                    let change = self.change(id, RuleKind::IfBody, "if a { b } -> { b }");
                    if self.try_replace(self.tree.len(), parent, id, body, &dropped, change)? {
                        return Ok(true);
                    }
                }
                match els {
                    Some(els) if self.enabled(RuleKind::IfElse) && !self.header_binds(init, els) => {
                        let dropped: Vec<NodeId> = init.into_iter().chain([cond, body]).collect();
                        let change = self.change(id, RuleKind::IfElse, "if a {...} else c -> c");
                        self.try_replace(self.tree.len(), parent, id, els, &dropped, change)
                    }
                    _ => Ok(false),
                }
            }
            Node::Ident { .. } => self.inline_const(id, parent),
            Node::BasicLit { kind, value } => self.zero_literal(id, kind, &value),
            Node::Slice { x, low, high, max, slice3 } => {
                if self.enabled(RuleKind::SliceBase) {
                    let dropped: Vec<NodeId> = low.into_iter().chain(high).chain(max).collect();
                    let change = self.change(id, RuleKind::SliceBase, "a[b:] -> a");
                    if self.try_replace(self.tree.len(), parent, id, x, &dropped, change)? {
                        return Ok(true);
                    }
                }
                if !self.enabled(RuleKind::SliceBounds) {
                    return Ok(false);
                }
                if let Some(m) = max {
                    let next = Node::Slice { x, low, high, max: None, slice3: false };
                    let change = self.change(id, RuleKind::SliceBounds, "a[b:c:d] -> a[b:c]");
                    if self.try_set(id, next, &[m], change)? {
                        return Ok(true);
                    }
                }
                // A three-index slice needs its high bound
                if let (Some(h), false) = (high, slice3) {
                    let next = Node::Slice { x, low, high: None, max, slice3 };
                    let change = self.change(id, RuleKind::SliceBounds, "a[b:c] -> a[b:]");
                    if self.try_set(id, next, &[h], change)? {
                        return Ok(true);
                    }
                }
                if let Some(l) = low {
                    let next = Node::Slice { x, low: None, high, max, slice3 };
                    let change = self.change(id, RuleKind::SliceBounds, "a[b:c] -> a[:c]");
                    return self.try_set(id, next, &[l], change);
                }
                Ok(false)
            }
            Node::Composite { ty, elts } if !elts.is_empty() && self.enabled(RuleKind::CompositeEmpty) => {
                let is_array = ty.is_some_and(|t| matches!(self.tree.node(t), Node::ArrayType { .. }));
                let description = if is_array { "[]T{a, b} -> []T{}" } else { "T{a, b} -> T{}" };
                let change = self.change(id, RuleKind::CompositeEmpty, description);
                self.try_set(id, Node::Composite { ty, elts: Vec::new() }, &elts, change)
            }
            Node::Binary { op, x, y } if self.enabled(RuleKind::BinaryOperand) => {
                let change = self.change(id, RuleKind::BinaryOperand, format!("a {} b -> a", op.as_str()));
                if self.try_replace(self.tree.len(), parent, id, x, &[y], change)? {
                    return Ok(true);
                }
                let change = self.change(id, RuleKind::BinaryOperand, format!("a {} b -> b", op.as_str()));
                self.try_replace(self.tree.len(), parent, id, y, &[x], change)
            }
            Node::Paren { x } => self.unwrap(id, parent, x, "(a) -> a".to_string()),
            Node::Star { x } => self.unwrap(id, parent, x, "*a -> a".to_string()),
            Node::Unary { op, x } => self.unwrap(id, parent, x, format!("{}a -> a", op.as_str())),
            Node::Index { x, index } if self.enabled(RuleKind::IndexBase) => {
                let change = self.change(id, RuleKind::IndexBase, "a[b] -> a");
                self.try_replace(self.tree.len(), parent, id, x, &[index], change)
            }
            Node::Go { call } => self.call_statement(id, parent, call, "go a() -> a()"),
            Node::Defer { call } => self.call_statement(id, parent, call, "defer a() -> a()"),
            _ => Ok(false),
        }
    }

    pub(super) fn enabled(&self, rule: RuleKind) -> bool {
        self.config.is_rule_enabled(rule)
    }

    pub(super) fn change(&self, id: NodeId, rule: RuleKind, description: impl Into<String>) -> Change {
        Change::new(self.tree.position(id), self.tree.node(id).kind_name(), rule, description)
    }

    /// Puts `new` in the slot of `parent` holding `old`, neutralizing the
    /// orphans of `dropped` first. `mark` is the arena length before the
    /// trial allocated anything.
    fn try_replace(
        &mut self,
        mark: usize,
        parent: NodeId,
        old: NodeId,
        new: NodeId,
        dropped: &[NodeId],
        change: Change,
    ) -> ReduceResult<bool> {
        let mut undo = resolve_dead_refs(&mut self.tree, &self.index, dropped)?;
        if let Err(err) = undo.replace_child(&mut self.tree, parent, old, new) {
            self.rollback(mark, undo)?;
            return Err(err);
        }
        self.attempt(mark, undo, change)
    }

    /// Rewrites `id` in place to `next`, neutralizing the orphans of `dropped`.
    fn try_set(&mut self, id: NodeId, next: Node, dropped: &[NodeId], change: Change) -> ReduceResult<bool> {
        let mark = self.tree.len();
        let mut undo = resolve_dead_refs(&mut self.tree, &self.index, dropped)?;
        undo.set(&mut self.tree, id, next);
        self.attempt(mark, undo, change)
    }

    /// Whether a name declared in an `if` header is used inside `kept`.
    fn header_binds(&self, header: Option<NodeId>, kept: NodeId) -> bool {
        let Some(header) = header else {
            return false;
        };
        let kept: HashSet<NodeId> = self.tree.descendants(kept).into_iter().collect();
        self.tree
            .descendants(header)
            .into_iter()
            .filter_map(|n| self.index.declared_by(n))
            .any(|symbol| self.index.occurrences_of(symbol).iter().any(|o| kept.contains(o)))
    }

    /// `(a)`, `*a` and `-a` become `a`.
    fn unwrap(&mut self, id: NodeId, parent: NodeId, x: NodeId, description: String) -> ReduceResult<bool> {
        if !self.enabled(RuleKind::UnwrapOperand) {
            return Ok(false);
        }
        let change = self.change(id, RuleKind::UnwrapOperand, description);
        self.try_replace(self.tree.len(), parent, id, x, &[], change)
    }

    /// `go f()` and `defer f()` become the plain call statement.
    fn call_statement(&mut self, id: NodeId, parent: NodeId, call: NodeId, description: &str) -> ReduceResult<bool> {
        if !self.enabled(RuleKind::CallStmt) {
            return Ok(false);
        }
        let mark = self.tree.len();
        let change = self.change(id, RuleKind::CallStmt, description);
        let stmt = self.tree.alloc(Node::ExprStmt { x: call }, self.tree.position(id));
        self.try_replace(mark, parent, id, stmt, &[], change)
    }

    /// Replaces a use of an untyped constant with a copy of its value.
    fn inline_const(&mut self, id: NodeId, parent: NodeId) -> ReduceResult<bool> {
        if !self.enabled(RuleKind::ConstInline) {
            return Ok(false);
        }
        let Some(symbol) = self.index.referenced_by(id) else {
            return Ok(false);
        };
        let SymbolKind::Const { untyped: true, value: Some(value) } = self.index.symbol(symbol).kind else {
            return Ok(false);
        };
        // iota means something else outside its declaration
        let mentions_iota = self
            .tree
            .descendants(value)
            .into_iter()
            .any(|n| self.tree.node(n).ident_name() == Some("iota"));
        if mentions_iota {
            return Ok(false);
        }

        let mark = self.tree.len();
        let change = self.change(id, RuleKind::ConstInline, "const inlined");
        let copy = self.tree.deep_clone(value);
        self.try_replace(mark, parent, id, copy, &[id], change)
    }

    /// String literals become `""`, integer literals `0`.
    fn zero_literal(&mut self, id: NodeId, kind: LitKind, value: &str) -> ReduceResult<bool> {
        if !self.enabled(RuleKind::LiteralZero) {
            return Ok(false);
        }
        let zero = match kind {
            LitKind::String => "\"\"",
            LitKind::Int => "0",
            _ => return Ok(false),
        };
        if value == zero {
            return Ok(false);
        }

        let shown = if value.chars().count() > MAX_LITERAL_CHARS {
            let head: String = value.chars().take(SHOWN_LITERAL_CHARS).collect();
            match kind {
                LitKind::String => format!("{}...\"", head),
                _ => format!("{}...", head),
            }
        } else {
            value.to_string()
        };
        let change = self.change(id, RuleKind::LiteralZero, format!("{} -> {}", shown, zero));
        let next = Node::BasicLit { kind, value: zero.to_string() };
        self.try_set(id, next, &[], change)
    }
}
