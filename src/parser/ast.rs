/*!
# Abstract Syntax Tree (AST) for the Go subset

Nodes live in an arena (`Tree`) and refer to their children by `NodeId`.
Every node has exactly one parent, so a child slot is identified by the
parent id plus the child id it currently holds.
*/

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::Position;

/// Stable node identifier inside one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclKind {
    Var,
    Const,
    Type,
}

impl DeclKind {
    pub fn keyword(self) -> &'static str {
        match self {
            DeclKind::Var => "var",
            DeclKind::Const => "const",
            DeclKind::Type => "type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    LogOr,
    LogAnd,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Or,
    Xor,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    And,
    AndNot,
}

impl BinaryOp {
    /// Go operator precedence (5 binds tightest).
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::LogOr => 1,
            BinaryOp::LogAnd => 2,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Or | BinaryOp::Xor => 4,
            BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Rem
            | BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::And
            | BinaryOp::AndNot => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::LogOr => "||",
            BinaryOp::LogAnd => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::And => "&",
            BinaryOp::AndNot => "&^",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Pos,
    Neg,
    Not,
    Xor,
    Addr,
    Recv,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Pos => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::Xor => "^",
            UnaryOp::Addr => "&",
            UnaryOp::Recv => "<-",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assignment token: `:=`, `=` or a compound `op=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Define,
    Assign,
    Compound(BinaryOp),
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignOp::Define => f.write_str(":="),
            AssignOp::Assign => f.write_str("="),
            AssignOp::Compound(op) => write!(f, "{}=", op),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

impl BranchKind {
    pub fn keyword(self) -> &'static str {
        match self {
            BranchKind::Break => "break",
            BranchKind::Continue => "continue",
            BranchKind::Goto => "goto",
            BranchKind::Fallthrough => "fallthrough",
        }
    }
}

/// AST node. Child links are `NodeId`s into the owning `Tree`.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // File level
    File { package: String, imports: Vec<NodeId>, decls: Vec<NodeId> },
    Import { alias: Option<String>, path: String },
    FuncDecl { recv: Option<NodeId>, name: NodeId, ty: NodeId, body: Option<NodeId> },
    /// Parameter, result, receiver or struct field.
    Field { names: Vec<NodeId>, ty: NodeId, tag: Option<String> },
    ValueSpec { names: Vec<NodeId>, ty: Option<NodeId>, values: Vec<NodeId> },
    TypeSpec { name: NodeId, alias: bool, ty: NodeId },

    // Statements
    /// Statement-sequence container: function bodies, branches and nested blocks.
    Block { stmts: Vec<NodeId> },
    Decl { kind: DeclKind, grouped: bool, specs: Vec<NodeId> },
    Assign { op: AssignOp, lhs: Vec<NodeId>, rhs: Vec<NodeId> },
    IncDec { x: NodeId, inc: bool },
    ExprStmt { x: NodeId },
    /// `ch <- value`
    Send { chan: NodeId, value: NodeId },
    Go { call: NodeId },
    Defer { call: NodeId },
    Return { results: Vec<NodeId> },
    Branch { kind: BranchKind, label: Option<String> },
    /// `stmt == None` is a label in front of an empty statement.
    Labeled { label: String, stmt: Option<NodeId> },
    If { init: Option<NodeId>, cond: NodeId, body: NodeId, els: Option<NodeId> },
    For { init: Option<NodeId>, cond: Option<NodeId>, post: Option<NodeId>, body: NodeId },
    Range { key: Option<NodeId>, value: Option<NodeId>, define: bool, x: NodeId, body: NodeId },
    Switch { init: Option<NodeId>, tag: Option<NodeId>, clauses: Vec<NodeId> },
    /// `switch bind := guard {`, where `guard` is an `x.(type)` assertion.
    TypeSwitch { init: Option<NodeId>, bind: Option<NodeId>, guard: NodeId, clauses: Vec<NodeId> },
    /// `case a, b:`, or `default:` when `default` is set. The body is a
    /// `Block` printed without braces.
    CaseClause { list: Vec<NodeId>, default: bool, body: NodeId },
    Select { clauses: Vec<NodeId> },
    /// `comm == None` is `default:`.
    CommClause { comm: Option<NodeId>, body: NodeId },

    // Expressions
    Ident { name: String },
    BasicLit { kind: LitKind, value: String },
    Binary { op: BinaryOp, x: NodeId, y: NodeId },
    Unary { op: UnaryOp, x: NodeId },
    /// Dereference or pointer type.
    Star { x: NodeId },
    Paren { x: NodeId },
    Selector { x: NodeId, sel: String },
    Index { x: NodeId, index: NodeId },
    Slice { x: NodeId, low: Option<NodeId>, high: Option<NodeId>, max: Option<NodeId>, slice3: bool },
    /// `ty == None` is the `x.(type)` guard of a type switch.
    TypeAssert { x: NodeId, ty: Option<NodeId> },
    Call { fun: NodeId, args: Vec<NodeId>, ellipsis: bool },
    Composite { ty: Option<NodeId>, elts: Vec<NodeId> },
    KeyValue { key: NodeId, value: NodeId },
    FuncLit { ty: NodeId, body: NodeId },
    /// `...T` in a parameter list, or `...` as an array length.
    Ellipsis { elt: Option<NodeId> },

    // Types
    /// `len == None` is a slice type.
    ArrayType { len: Option<NodeId>, elt: NodeId },
    MapType { key: NodeId, value: NodeId },
    ChanType { dir: ChanDir, value: NodeId },
    FuncType { params: Vec<NodeId>, results: Vec<NodeId> },
    StructType { fields: Vec<NodeId> },
    InterfaceType { methods: Vec<NodeId> },
}

fn push_opt(out: &mut Vec<NodeId>, id: &Option<NodeId>) {
    if let Some(id) = id {
        out.push(*id);
    }
}

fn slot_opt<'a>(out: &mut Vec<&'a mut NodeId>, id: &'a mut Option<NodeId>) {
    if let Some(id) = id {
        out.push(id);
    }
}

impl Node {
    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            Node::File { imports, decls, .. } => {
                out.extend(imports);
                out.extend(decls);
            }
            Node::Import { .. } | Node::Ident { .. } | Node::BasicLit { .. } | Node::Branch { .. } => {}
            Node::FuncDecl { recv, name, ty, body } => {
                push_opt(&mut out, recv);
                out.push(*name);
                out.push(*ty);
                push_opt(&mut out, body);
            }
            Node::Field { names, ty, .. } => {
                out.extend(names);
                out.push(*ty);
            }
            Node::ValueSpec { names, ty, values } => {
                out.extend(names);
                push_opt(&mut out, ty);
                out.extend(values);
            }
            Node::TypeSpec { name, ty, .. } => {
                out.push(*name);
                out.push(*ty);
            }
            Node::Block { stmts } => out.extend(stmts),
            Node::Decl { specs, .. } => out.extend(specs),
            Node::Assign { lhs, rhs, .. } => {
                out.extend(lhs);
                out.extend(rhs);
            }
            Node::IncDec { x, .. }
            | Node::ExprStmt { x }
            | Node::Unary { x, .. }
            | Node::Star { x }
            | Node::Paren { x }
            | Node::Selector { x, .. } => out.push(*x),
            Node::Go { call } | Node::Defer { call } => out.push(*call),
            Node::Return { results } => out.extend(results),
            Node::If { init, cond, body, els } => {
                push_opt(&mut out, init);
                out.push(*cond);
                out.push(*body);
                push_opt(&mut out, els);
            }
            Node::For { init, cond, post, body } => {
                push_opt(&mut out, init);
                push_opt(&mut out, cond);
                push_opt(&mut out, post);
                out.push(*body);
            }
            Node::Range { key, value, x, body, .. } => {
                push_opt(&mut out, key);
                push_opt(&mut out, value);
                out.push(*x);
                out.push(*body);
            }
            Node::Labeled { stmt, .. } => push_opt(&mut out, stmt),
            Node::Switch { init, tag, clauses } => {
                push_opt(&mut out, init);
                push_opt(&mut out, tag);
                out.extend(clauses);
            }
            Node::TypeSwitch { init, bind, guard, clauses } => {
                push_opt(&mut out, init);
                push_opt(&mut out, bind);
                out.push(*guard);
                out.extend(clauses);
            }
            Node::CaseClause { list, body, .. } => {
                out.extend(list);
                out.push(*body);
            }
            Node::Select { clauses } => out.extend(clauses),
            Node::CommClause { comm, body } => {
                push_opt(&mut out, comm);
                out.push(*body);
            }
            Node::Binary { x, y, .. } => {
                out.push(*x);
                out.push(*y);
            }
            Node::Send { chan, value } => {
                out.push(*chan);
                out.push(*value);
            }
            Node::Index { x, index } => {
                out.push(*x);
                out.push(*index);
            }
            Node::Slice { x, low, high, max, .. } => {
                out.push(*x);
                push_opt(&mut out, low);
                push_opt(&mut out, high);
                push_opt(&mut out, max);
            }
            Node::TypeAssert { x, ty } => {
                out.push(*x);
                push_opt(&mut out, ty);
            }
            Node::Call { fun, args, .. } => {
                out.push(*fun);
                out.extend(args);
            }
            Node::Composite { ty, elts } => {
                push_opt(&mut out, ty);
                out.extend(elts);
            }
            Node::KeyValue { key, value } => {
                out.push(*key);
                out.push(*value);
            }
            Node::FuncLit { ty, body } => {
                out.push(*ty);
                out.push(*body);
            }
            Node::Ellipsis { elt } => push_opt(&mut out, elt),
            Node::ArrayType { len, elt } => {
                push_opt(&mut out, len);
                out.push(*elt);
            }
            Node::MapType { key, value } => {
                out.push(*key);
                out.push(*value);
            }
            Node::ChanType { value, .. } => out.push(*value),
            Node::FuncType { params, results } => {
                out.extend(params);
                out.extend(results);
            }
            Node::StructType { fields } => out.extend(fields),
            Node::InterfaceType { methods } => out.extend(methods),
        }
        out
    }

    /// Mutable references to every child slot, in the same order as `children`.
    pub fn child_slots_mut(&mut self) -> Vec<&mut NodeId> {
        let mut out = Vec::new();
        match self {
            Node::File { imports, decls, .. } => {
                out.extend(imports.iter_mut());
                out.extend(decls.iter_mut());
            }
            Node::Import { .. } | Node::Ident { .. } | Node::BasicLit { .. } | Node::Branch { .. } => {}
            Node::FuncDecl { recv, name, ty, body } => {
                slot_opt(&mut out, recv);
                out.push(name);
                out.push(ty);
                slot_opt(&mut out, body);
            }
            Node::Field { names, ty, .. } => {
                out.extend(names.iter_mut());
                out.push(ty);
            }
            Node::ValueSpec { names, ty, values } => {
                out.extend(names.iter_mut());
                slot_opt(&mut out, ty);
                out.extend(values.iter_mut());
            }
            Node::TypeSpec { name, ty, .. } => {
                out.push(name);
                out.push(ty);
            }
            Node::Block { stmts } => out.extend(stmts.iter_mut()),
            Node::Decl { specs, .. } => out.extend(specs.iter_mut()),
            Node::Assign { lhs, rhs, .. } => {
                out.extend(lhs.iter_mut());
                out.extend(rhs.iter_mut());
            }
            Node::IncDec { x, .. }
            | Node::ExprStmt { x }
            | Node::Unary { x, .. }
            | Node::Star { x }
            | Node::Paren { x }
            | Node::Selector { x, .. } => out.push(x),
            Node::Go { call } | Node::Defer { call } => out.push(call),
            Node::Return { results } => out.extend(results.iter_mut()),
            Node::If { init, cond, body, els } => {
                slot_opt(&mut out, init);
                out.push(cond);
                out.push(body);
                slot_opt(&mut out, els);
            }
            Node::For { init, cond, post, body } => {
                slot_opt(&mut out, init);
                slot_opt(&mut out, cond);
                slot_opt(&mut out, post);
                out.push(body);
            }
            Node::Range { key, value, x, body, .. } => {
                slot_opt(&mut out, key);
                slot_opt(&mut out, value);
                out.push(x);
                out.push(body);
            }
            Node::Labeled { stmt, .. } => slot_opt(&mut out, stmt),
            Node::Switch { init, tag, clauses } => {
                slot_opt(&mut out, init);
                slot_opt(&mut out, tag);
                out.extend(clauses.iter_mut());
            }
            Node::TypeSwitch { init, bind, guard, clauses } => {
                slot_opt(&mut out, init);
                slot_opt(&mut out, bind);
                out.push(guard);
                out.extend(clauses.iter_mut());
            }
            Node::CaseClause { list, body, .. } => {
                out.extend(list.iter_mut());
                out.push(body);
            }
            Node::Select { clauses } => out.extend(clauses.iter_mut()),
            Node::CommClause { comm, body } => {
                slot_opt(&mut out, comm);
                out.push(body);
            }
            Node::Binary { x, y, .. } => {
                out.push(x);
                out.push(y);
            }
            Node::Send { chan, value } => {
                out.push(chan);
                out.push(value);
            }
            Node::Index { x, index } => {
                out.push(x);
                out.push(index);
            }
            Node::Slice { x, low, high, max, .. } => {
                out.push(x);
                slot_opt(&mut out, low);
                slot_opt(&mut out, high);
                slot_opt(&mut out, max);
            }
            Node::TypeAssert { x, ty } => {
                out.push(x);
                slot_opt(&mut out, ty);
            }
            Node::Call { fun, args, .. } => {
                out.push(fun);
                out.extend(args.iter_mut());
            }
            Node::Composite { ty, elts } => {
                slot_opt(&mut out, ty);
                out.extend(elts.iter_mut());
            }
            Node::KeyValue { key, value } => {
                out.push(key);
                out.push(value);
            }
            Node::FuncLit { ty, body } => {
                out.push(ty);
                out.push(body);
            }
            Node::Ellipsis { elt } => slot_opt(&mut out, elt),
            Node::ArrayType { len, elt } => {
                slot_opt(&mut out, len);
                out.push(elt);
            }
            Node::MapType { key, value } => {
                out.push(key);
                out.push(value);
            }
            Node::ChanType { value, .. } => out.push(value),
            Node::FuncType { params, results } => {
                out.extend(params.iter_mut());
                out.extend(results.iter_mut());
            }
            Node::StructType { fields } => out.extend(fields.iter_mut()),
            Node::InterfaceType { methods } => out.extend(methods.iter_mut()),
        }
        out
    }

    /// Points the slot currently holding `old` at `new`. Returns false when
    /// `old` is not a child of this node.
    pub fn replace_child(&mut self, old: NodeId, new: NodeId) -> bool {
        match self.child_slots_mut().into_iter().find(|slot| **slot == old) {
            Some(slot) => {
                *slot = new;
                true
            }
            None => false,
        }
    }

    /// Go-style node type name used as the tag in change reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::File { .. } => "File",
            Node::Import { .. } => "ImportSpec",
            Node::FuncDecl { .. } => "FuncDecl",
            Node::Field { .. } => "Field",
            Node::ValueSpec { .. } => "ValueSpec",
            Node::TypeSpec { .. } => "TypeSpec",
            Node::Block { .. } => "BlockStmt",
            Node::Decl { .. } => "DeclStmt",
            Node::Assign { .. } => "AssignStmt",
            Node::IncDec { .. } => "IncDecStmt",
            Node::ExprStmt { .. } => "ExprStmt",
            Node::Send { .. } => "SendStmt",
            Node::Go { .. } => "GoStmt",
            Node::Defer { .. } => "DeferStmt",
            Node::Return { .. } => "ReturnStmt",
            Node::Branch { .. } => "BranchStmt",
            Node::If { .. } => "IfStmt",
            Node::For { .. } => "ForStmt",
            Node::Range { .. } => "RangeStmt",
            Node::Labeled { .. } => "LabeledStmt",
            Node::Switch { .. } => "SwitchStmt",
            Node::TypeSwitch { .. } => "TypeSwitchStmt",
            Node::CaseClause { .. } => "CaseClause",
            Node::Select { .. } => "SelectStmt",
            Node::CommClause { .. } => "CommClause",
            Node::Ident { .. } => "Ident",
            Node::BasicLit { .. } => "BasicLit",
            Node::Binary { .. } => "BinaryExpr",
            Node::Unary { .. } => "UnaryExpr",
            Node::Star { .. } => "StarExpr",
            Node::Paren { .. } => "ParenExpr",
            Node::Selector { .. } => "SelectorExpr",
            Node::Index { .. } => "IndexExpr",
            Node::Slice { .. } => "SliceExpr",
            Node::TypeAssert { .. } => "TypeAssertExpr",
            Node::Call { .. } => "CallExpr",
            Node::Composite { .. } => "CompositeLit",
            Node::KeyValue { .. } => "KeyValueExpr",
            Node::FuncLit { .. } => "FuncLit",
            Node::Ellipsis { .. } => "Ellipsis",
            Node::ArrayType { .. } => "ArrayType",
            Node::MapType { .. } => "MapType",
            Node::ChanType { .. } => "ChanType",
            Node::FuncType { .. } => "FuncType",
            Node::StructType { .. } => "StructType",
            Node::InterfaceType { .. } => "InterfaceType",
        }
    }

    pub fn ident_name(&self) -> Option<&str> {
        match self {
            Node::Ident { name } => Some(name),
            _ => None,
        }
    }
}

/// Arena owning every node of one source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
    positions: Vec<Position>,
    root: Option<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: Node, position: Position) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.positions.push(position);
        id
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    /// The `File` node. Trees produced by the parser always have one.
    pub fn root(&self) -> NodeId {
        self.root.unwrap_or(NodeId(0))
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn position(&self, id: NodeId) -> Position {
        self.positions.get(id.index()).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Installs `node` at `id` and returns the previous content.
    /// Edits go through `reducer::undo` so they can be reverted.
    pub(crate) fn replace(&mut self, id: NodeId, node: Node) -> Node {
        std::mem::replace(&mut self.nodes[id.index()], node)
    }

    /// Drops nodes allocated after `len`; used when a trial is reverted.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
        self.positions.truncate(len);
    }

    /// Preorder list of `id` and all of its descendants.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            out.push(cur);
            let children = self.node(cur).children();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Copies the subtree rooted at `id` into fresh nodes.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let mut node = self.node(id).clone();
        for slot in node.child_slots_mut() {
            *slot = self.deep_clone(*slot);
        }
        let position = self.position(id);
        self.alloc(node, position)
    }

    /// Structural equality of two subtrees, ignoring node ids.
    pub fn same_shape(&self, a: NodeId, other: &Tree, b: NodeId) -> bool {
        let (na, nb) = (self.node(a), other.node(b));
        if std::mem::discriminant(na) != std::mem::discriminant(nb) {
            return false;
        }
        let mut la = na.clone();
        let mut lb = nb.clone();
        for slot in la.child_slots_mut() {
            *slot = NodeId(0);
        }
        for slot in lb.child_slots_mut() {
            *slot = NodeId(0);
        }
        if la != lb {
            return false;
        }
        let (ca, cb) = (na.children(), nb.children());
        ca.len() == cb.len() && ca.iter().zip(cb.iter()).all(|(x, y)| self.same_shape(*x, other, *y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(tree: &mut Tree, name: &str) -> NodeId {
        tree.alloc(Node::Ident { name: name.to_string() }, Position::zero())
    }

    #[test]
    fn test_children_follow_source_order() {
        let mut tree = Tree::new();
        let a = ident(&mut tree, "a");
        let b = ident(&mut tree, "b");
        let bin = tree.alloc(Node::Binary { op: BinaryOp::Add, x: a, y: b }, Position::zero());
        assert_eq!(tree.node(bin).children(), vec![a, b]);
        assert_eq!(tree.descendants(bin), vec![bin, a, b]);
    }

    #[test]
    fn test_replace_child_only_touches_matching_slot() {
        let mut tree = Tree::new();
        let a = ident(&mut tree, "a");
        let b = ident(&mut tree, "b");
        let c = ident(&mut tree, "c");
        let mut node = Node::Slice { x: a, low: Some(b), high: None, max: None, slice3: false };
        assert!(node.replace_child(b, c));
        assert_eq!(node, Node::Slice { x: a, low: Some(c), high: None, max: None, slice3: false });
        assert!(!node.replace_child(b, a));
    }

    #[test]
    fn test_clause_children_end_with_body() {
        let mut tree = Tree::new();
        let a = ident(&mut tree, "a");
        let b = ident(&mut tree, "b");
        let body = tree.alloc(Node::Block { stmts: Vec::new() }, Position::zero());
        let clause = tree.alloc(Node::CaseClause { list: vec![a, b], default: false, body }, Position::zero());
        let switch = tree.alloc(Node::Switch { init: None, tag: None, clauses: vec![clause] }, Position::zero());
        assert_eq!(tree.node(clause).children(), vec![a, b, body]);
        assert_eq!(tree.descendants(switch), vec![switch, clause, a, b, body]);
        assert_eq!(tree.node(switch).kind_name(), "SwitchStmt");
    }

    #[test]
    fn test_deep_clone_allocates_fresh_nodes() {
        let mut tree = Tree::new();
        let a = ident(&mut tree, "a");
        let one = tree.alloc(Node::BasicLit { kind: LitKind::Int, value: "1".into() }, Position::zero());
        let bin = tree.alloc(Node::Binary { op: BinaryOp::Mul, x: a, y: one }, Position::zero());
        let copy = tree.deep_clone(bin);
        assert_ne!(copy, bin);
        assert!(tree.same_shape(bin, &tree, copy));
        assert!(tree.node(copy).children().iter().all(|c| c.0 > bin.0));
    }

    #[test]
    fn test_precedence_table() {
        assert!(BinaryOp::Mul.precedence() > BinaryOp::Add.precedence());
        assert!(BinaryOp::Add.precedence() > BinaryOp::Eq.precedence());
        assert!(BinaryOp::LogAnd.precedence() > BinaryOp::LogOr.precedence());
        assert_eq!(AssignOp::Compound(BinaryOp::Shl).to_string(), "<<=");
    }
}
