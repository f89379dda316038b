/*!
# Symbol Resolver

Walks a parsed file and fills the `declares` and `references` tables of a
`SymbolIndex`. Package-level names are declared before any body is
resolved; local names become visible at their declaration, so a use before
a local `:=` resolves outwards.
*/

use crate::parser::ast::{AssignOp, DeclKind, Node, NodeId, Tree};

use super::index::SymbolIndex;
use super::scope::{ScopeId, ScopeType, Symbol, SymbolId, SymbolKind};

/// Go's package name for an import path: the last path element, skipping a
/// major-version suffix and anything after a dot (`gopkg.in/yaml.v2`).
pub fn package_name(path: &str) -> String {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() > 1 {
        if let Some(last) = segments.last() {
            let is_version = last.len() > 1
                && last.starts_with('v')
                && last[1..].chars().all(|c| c.is_ascii_digit());
            if is_version {
                segments.pop();
            }
        }
    }
    let last = segments.last().copied().unwrap_or(path);
    last.split('.').next().unwrap_or(last).to_string()
}

pub struct Resolver<'a> {
    tree: &'a Tree,
    index: SymbolIndex,
}

impl<'a> Resolver<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        Self {
            tree,
            index: SymbolIndex::default(),
        }
    }

    pub fn resolve(mut self) -> SymbolIndex {
        let root = self.tree.root();
        if matches!(self.tree.get(root), Some(Node::File { .. })) {
            self.resolve_file(root);
        }
        for occurrences in &mut self.index.occurrences {
            occurrences.sort();
        }
        self.index
    }

    fn resolve_file(&mut self, file: NodeId) {
        let tree = self.tree;
        let Node::File { imports, decls, .. } = tree.node(file) else {
            return;
        };
        let package = self.index.scopes.push(ScopeType::Package, None);
        let file_scope = self.index.scopes.push(ScopeType::File, Some(package));

        for &import in imports {
            let Node::Import { alias, path } = tree.node(import) else {
                continue;
            };
            let name = match alias.as_deref() {
                Some("_") | Some(".") => continue,
                Some(alias) => alias.to_string(),
                None => package_name(path),
            };
            let kind = SymbolKind::Package { path: path.clone(), import };
            self.new_symbol(file_scope, name, kind, import, None);
        }

        for &decl in decls {
            match tree.node(decl) {
                Node::FuncDecl { recv: None, name, .. } => {
                    self.declare(package, *name, SymbolKind::Func, None);
                }
                Node::Decl { kind, specs, .. } => {
                    for &spec in specs {
                        self.declare_spec(package, *kind, spec);
                    }
                }
                _ => {}
            }
        }

        for &decl in decls {
            match tree.node(decl) {
                Node::FuncDecl { recv, ty, body, .. } => {
                    self.resolve_function(file_scope, *recv, *ty, *body);
                }
                Node::Decl { specs, .. } => {
                    for &spec in specs {
                        self.resolve_spec(file_scope, spec);
                    }
                }
                _ => {}
            }
        }
    }

    // ---- symbol bookkeeping ------------------------------------------------

    fn new_symbol(
        &mut self,
        scope: ScopeId,
        name: String,
        kind: SymbolKind,
        decl: NodeId,
        decl_stmt: Option<NodeId>,
    ) -> SymbolId {
        let id = SymbolId(self.index.symbols.len() as u32);
        self.index.scopes.declare(scope, &name, id);
        self.index.symbols.push(Symbol {
            name,
            kind,
            scope,
            decl,
            decl_stmt,
        });
        self.index.occurrences.push(Vec::new());
        self.index.declares.insert(decl, id);
        id
    }

    /// Declares the identifier `ident` in `scope`. `_` declares nothing.
    fn declare(
        &mut self,
        scope: ScopeId,
        ident: NodeId,
        kind: SymbolKind,
        decl_stmt: Option<NodeId>,
    ) -> Option<SymbolId> {
        let tree = self.tree;
        let name = tree.node(ident).ident_name()?;
        if name == "_" {
            return None;
        }
        Some(self.new_symbol(scope, name.to_string(), kind, ident, decl_stmt))
    }

    fn reference(&mut self, scope: ScopeId, ident: NodeId) {
        let tree = self.tree;
        let Some(name) = tree.node(ident).ident_name() else {
            return;
        };
        if name == "_" {
            return;
        }
        if let Some(symbol) = self.index.scopes.lookup(scope, name) {
            self.index.references.insert(ident, symbol);
            self.index.occurrences[symbol.index()].push(ident);
        }
    }

    fn declare_spec(&mut self, scope: ScopeId, kind: DeclKind, spec: NodeId) {
        let tree = self.tree;
        match tree.node(spec) {
            Node::ValueSpec { names, ty, values } => {
                for (i, &name) in names.iter().enumerate() {
                    let symbol_kind = match kind {
                        DeclKind::Const => SymbolKind::Const {
                            untyped: ty.is_none(),
                            value: if values.len() == names.len() { Some(values[i]) } else { None },
                        },
                        _ => SymbolKind::Var,
                    };
                    self.declare(scope, name, symbol_kind, Some(spec));
                }
            }
            Node::TypeSpec { name, .. } => {
                self.declare(scope, *name, SymbolKind::Type, Some(spec));
            }
            _ => {}
        }
    }

    /// Resolves the type and initializers of a spec whose names are already declared.
    fn resolve_spec(&mut self, scope: ScopeId, spec: NodeId) {
        let tree = self.tree;
        match tree.node(spec) {
            Node::ValueSpec { ty, values, .. } => {
                if let Some(ty) = ty {
                    self.resolve_expr(scope, *ty);
                }
                for &value in values {
                    self.resolve_expr(scope, value);
                }
            }
            Node::TypeSpec { ty, .. } => self.resolve_expr(scope, *ty),
            _ => {}
        }
    }

    fn resolve_function(&mut self, scope: ScopeId, recv: Option<NodeId>, ty: NodeId, body: Option<NodeId>) {
        let tree = self.tree;
        let func_scope = self.index.scopes.push(ScopeType::Function, Some(scope));
        if let Some(recv) = recv {
            self.resolve_expr(scope, recv);
            self.declare_field_names(func_scope, recv);
        }
        self.resolve_expr(scope, ty);
        if let Node::FuncType { params, results } = tree.node(ty) {
            for &field in params.iter().chain(results) {
                self.declare_field_names(func_scope, field);
            }
        }
        if let Some(body) = body {
            self.index.block_scopes.insert(body, func_scope);
            if let Node::Block { stmts } = tree.node(body) {
                for &stmt in stmts {
                    self.resolve_stmt(func_scope, stmt);
                }
            }
        }
    }

    fn declare_field_names(&mut self, scope: ScopeId, field: NodeId) {
        let tree = self.tree;
        if let Node::Field { names, .. } = tree.node(field) {
            for &name in names {
                self.declare(scope, name, SymbolKind::Var, None);
            }
        }
    }

    // ---- statements --------------------------------------------------------

    fn resolve_stmt(&mut self, scope: ScopeId, id: NodeId) {
        let tree = self.tree;
        match tree.node(id) {
            Node::Block { stmts } => {
                let inner = self.index.scopes.push(ScopeType::Block, Some(scope));
                self.index.block_scopes.insert(id, inner);
                for &stmt in stmts {
                    self.resolve_stmt(inner, stmt);
                }
            }
            Node::Decl { kind, specs, .. } => {
                for &spec in specs {
                    if *kind == DeclKind::Type {
                        // A type is in scope inside its own definition
                        self.declare_spec(scope, *kind, spec);
                        self.resolve_spec(scope, spec);
                    } else {
                        self.resolve_spec(scope, spec);
                        self.declare_spec(scope, *kind, spec);
                    }
                }
            }
            Node::Assign { op, lhs, rhs } => {
                for &value in rhs {
                    self.resolve_expr(scope, value);
                }
                for &target in lhs {
                    let redeclared = match tree.node(target).ident_name() {
                        Some(name) => self.index.scopes.lookup_local(scope, name).is_some(),
                        None => true,
                    };
                    if *op == AssignOp::Define && !redeclared {
                        self.declare(scope, target, SymbolKind::Var, Some(id));
                    } else {
                        self.resolve_expr(scope, target);
                    }
                }
            }
            Node::If { init, cond, body, els } => {
                let header = self.index.scopes.push(ScopeType::Block, Some(scope));
                if let Some(init) = init {
                    self.resolve_stmt(header, *init);
                }
                self.resolve_expr(header, *cond);
                self.resolve_stmt(header, *body);
                if let Some(els) = els {
                    self.resolve_stmt(header, *els);
                }
            }
            Node::For { init, cond, post, body } => {
                let header = self.index.scopes.push(ScopeType::Block, Some(scope));
                if let Some(init) = init {
                    self.resolve_stmt(header, *init);
                }
                if let Some(cond) = cond {
                    self.resolve_expr(header, *cond);
                }
                if let Some(post) = post {
                    self.resolve_stmt(header, *post);
                }
                self.resolve_stmt(header, *body);
            }
            Node::Range { key, value, define, x, body } => {
                let header = self.index.scopes.push(ScopeType::Block, Some(scope));
                self.resolve_expr(header, *x);
                for &target in key.iter().chain(value.iter()) {
                    if *define {
                        self.declare(header, target, SymbolKind::Var, Some(id));
                    } else {
                        self.resolve_expr(header, target);
                    }
                }
                self.resolve_stmt(header, *body);
            }
            Node::Switch { init, tag, clauses } => {
                let header = self.index.scopes.push(ScopeType::Block, Some(scope));
                if let Some(init) = init {
                    self.resolve_stmt(header, *init);
                }
                if let Some(tag) = tag {
                    self.resolve_expr(header, *tag);
                }
                for &clause in clauses {
                    self.resolve_clause(header, clause);
                }
            }
            Node::TypeSwitch { init, bind, guard, clauses } => {
                let header = self.index.scopes.push(ScopeType::Block, Some(scope));
                if let Some(init) = init {
                    self.resolve_stmt(header, *init);
                }
                self.resolve_expr(header, *guard);
                for &clause in clauses {
                    if let Node::CaseClause { list, .. } = tree.node(clause) {
                        for &ty in list {
                            self.resolve_expr(header, ty);
                        }
                    }
                }
                // One binding shared by every clause
                if let Some(bind) = bind {
                    self.declare(header, *bind, SymbolKind::Var, Some(id));
                }
                for &clause in clauses {
                    if let Node::CaseClause { body, .. } = tree.node(clause) {
                        self.resolve_clause_body(header, *body, None);
                    }
                }
            }
            Node::Select { clauses } => {
                for &clause in clauses {
                    self.resolve_clause(scope, clause);
                }
            }
            Node::Labeled { stmt, .. } => {
                if let Some(stmt) = stmt {
                    self.resolve_stmt(scope, *stmt);
                }
            }
            Node::Branch { .. } => {}
            _ => {
                for child in tree.node(id).children() {
                    self.resolve_expr(scope, child);
                }
            }
        }
    }

    /// Case lists resolve in the switch header; the body gets a scope of its own.
    fn resolve_clause(&mut self, scope: ScopeId, clause: NodeId) {
        let tree = self.tree;
        match tree.node(clause) {
            Node::CaseClause { list, body, .. } => {
                for &expr in list {
                    self.resolve_expr(scope, expr);
                }
                self.resolve_clause_body(scope, *body, None);
            }
            Node::CommClause { comm, body } => self.resolve_clause_body(scope, *body, *comm),
            _ => {}
        }
    }

    /// A clause body is a block without braces. A `select` communication
    /// declares into the same scope as the statements after it.
    fn resolve_clause_body(&mut self, scope: ScopeId, body: NodeId, comm: Option<NodeId>) {
        let tree = self.tree;
        let inner = self.index.scopes.push(ScopeType::Block, Some(scope));
        self.index.block_scopes.insert(body, inner);
        if let Some(comm) = comm {
            self.resolve_stmt(inner, comm);
        }
        if let Node::Block { stmts } = tree.node(body) {
            for &stmt in stmts {
                self.resolve_stmt(inner, stmt);
            }
        }
    }

    // ---- expressions -------------------------------------------------------

    fn resolve_expr(&mut self, scope: ScopeId, id: NodeId) {
        let tree = self.tree;
        match tree.node(id) {
            Node::Ident { .. } => self.reference(scope, id),
            // Field names and method names are not identifier occurrences
            Node::Selector { x, .. } => self.resolve_expr(scope, *x),
            Node::Field { ty, .. } => self.resolve_expr(scope, *ty),
            Node::Composite { ty, elts } => {
                let field_keys = match ty {
                    Some(ty) => {
                        self.resolve_expr(scope, *ty);
                        matches!(tree.node(*ty), Node::Ident { .. } | Node::Selector { .. })
                    }
                    None => true,
                };
                for &elt in elts {
                    match tree.node(elt) {
                        Node::KeyValue { key, value } => {
                            let is_field = field_keys && matches!(tree.node(*key), Node::Ident { .. });
                            if !is_field {
                                self.resolve_expr(scope, *key);
                            }
                            self.resolve_expr(scope, *value);
                        }
                        _ => self.resolve_expr(scope, elt),
                    }
                }
            }
            Node::FuncLit { ty, body } => {
                self.resolve_expr(scope, *ty);
                let func_scope = self.index.scopes.push(ScopeType::Function, Some(scope));
                if let Node::FuncType { params, results } = tree.node(*ty) {
                    for &field in params.iter().chain(results) {
                        self.declare_field_names(func_scope, field);
                    }
                }
                self.index.block_scopes.insert(*body, func_scope);
                if let Node::Block { stmts } = tree.node(*body) {
                    for &stmt in stmts {
                        self.resolve_stmt(func_scope, stmt);
                    }
                }
            }
            node => {
                for child in node.children() {
                    self.resolve_expr(scope, child);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::GoParser;

    fn index_of(src: &str) -> (Tree, SymbolIndex) {
        let tree = GoParser::new().parse_text(src).unwrap();
        let index = SymbolIndex::build(&tree);
        (tree, index)
    }

    fn symbol_named<'a>(index: &'a SymbolIndex, name: &str) -> (SymbolId, &'a Symbol) {
        index
            .symbols()
            .find(|(_, s)| s.name == name)
            .unwrap_or_else(|| panic!("no symbol {name}"))
    }

    #[test]
    fn test_package_name() {
        assert_eq!(package_name("fmt"), "fmt");
        assert_eq!(package_name("net/http"), "http");
        assert_eq!(package_name("gopkg.in/yaml.v2"), "yaml");
        assert_eq!(package_name("example.com/mod/v2"), "mod");
    }

    #[test]
    fn test_import_references() {
        let (_, index) = index_of(
            "package main\n\nimport (\n\t\"fmt\"\n\t_ \"embed\"\n)\n\nfunc main() {\n\tfmt.Println(1)\n\tfmt.Println(2)\n}\n",
        );
        let (fmt, symbol) = symbol_named(&index, "fmt");
        assert!(symbol.is_package());
        assert_eq!(index.reference_count(fmt), 2);
        assert!(index.symbols().all(|(_, s)| s.name != "embed"));
    }

    #[test]
    fn test_local_scoping_is_positional() {
        let (tree, index) = index_of(
            "package main\n\nvar x = 1\n\nfunc main() {\n\tprintln(x)\n\tx := 2\n\tprintln(x)\n}\n",
        );
        let globals: Vec<_> = index.symbols().filter(|(_, s)| s.name == "x").collect();
        assert_eq!(globals.len(), 2);
        let (outer, _) = globals[0];
        let (inner, _) = globals[1];
        assert_eq!(index.reference_count(outer), 1);
        assert_eq!(index.reference_count(inner), 1);
        let first_use = index.occurrences_of(outer)[0];
        let second_use = index.occurrences_of(inner)[0];
        assert!(tree.position(first_use).line < tree.position(second_use).line);
    }

    #[test]
    fn test_define_reuses_existing_names() {
        let (_, index) = index_of(
            "package main\n\nfunc main() {\n\ta, err := f()\n\tb, err := g(a)\n\t_, _ = b, err\n}\n",
        );
        let errs: Vec<_> = index.symbols().filter(|(_, s)| s.name == "err").collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(index.reference_count(errs[0].0), 2);
    }

    #[test]
    fn test_fields_and_keys_are_not_references() {
        let (_, index) = index_of(
            "package main\n\ntype T struct {\n\tx int\n}\n\nfunc main() {\n\tx := 1\n\tt := T{x: x}\n\t_ = t.x\n}\n",
        );
        let (x, _) = index.symbols().find(|(_, s)| s.name == "x" && s.kind == SymbolKind::Var).unwrap();
        assert_eq!(index.reference_count(x), 1);
    }

    #[test]
    fn test_const_records_initializer() {
        let (tree, index) = index_of("package main\n\nconst a, b = 1, \"s\"\n\nconst c int = 3\n");
        let (_, a) = symbol_named(&index, "a");
        let SymbolKind::Const { untyped: true, value: Some(value) } = a.kind else {
            panic!("a should be an untyped const with a value");
        };
        assert!(matches!(tree.node(value), Node::BasicLit { .. }));
        let (_, c) = symbol_named(&index, "c");
        assert!(matches!(c.kind, SymbolKind::Const { untyped: false, .. }));
    }

    #[test]
    fn test_func_literal_and_range_scopes() {
        let (_, index) = index_of(
            "package main\n\nfunc main() {\n\tf := func(n int) int {\n\t\treturn n\n\t}\n\tfor i, v := range []int{1} {\n\t\t_ = f(i + v)\n\t}\n}\n",
        );
        let (n, _) = symbol_named(&index, "n");
        assert_eq!(index.reference_count(n), 1);
        let (v, symbol) = symbol_named(&index, "v");
        assert_eq!(index.reference_count(v), 1);
        assert!(symbol.decl_stmt.is_some());
    }

    #[test]
    fn test_type_switch_binding_spans_clauses() {
        let (tree, index) = index_of(
            "package main\n\nfunc f(x any) {\n\tswitch v := x.(type) {\n\tcase int:\n\t\tprintln(v)\n\tcase string:\n\t\tprintln(v)\n\tdefault:\n\t}\n}\n",
        );
        let (v, symbol) = symbol_named(&index, "v");
        assert_eq!(index.reference_count(v), 2);
        let stmt = symbol.decl_stmt.unwrap();
        assert!(matches!(tree.node(stmt), Node::TypeSwitch { .. }));
        let (x, _) = symbol_named(&index, "x");
        assert_eq!(index.reference_count(x), 1);
    }

    #[test]
    fn test_clause_scopes_are_separate() {
        let (_, index) = index_of(
            "package main\n\nfunc f(ch chan int, n int) {\n\tselect {\n\tcase v := <-ch:\n\t\tprintln(v)\n\tdefault:\n\t}\n\tswitch n {\n\tcase 1:\n\t\tv := 2\n\t\tprintln(v)\n\tcase 2:\n\t\tv := 3\n\t\tprintln(v, n)\n\t}\n}\n",
        );
        let vs: Vec<_> = index.symbols().filter(|(_, s)| s.name == "v").collect();
        assert_eq!(vs.len(), 3);
        assert!(vs.iter().all(|(id, _)| index.reference_count(*id) == 1));
        let (n, _) = symbol_named(&index, "n");
        assert_eq!(index.reference_count(n), 2);
    }

    #[test]
    fn test_blank_identifier_is_ignored() {
        let (_, index) = index_of("package main\n\nfunc main() {\n\t_ = 1\n\tvar _ int\n}\n");
        assert!(index.symbols().all(|(_, s)| s.name != "_"));
    }
}
