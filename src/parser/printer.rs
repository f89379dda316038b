/*!
# Go Printer

Renders a tree back to gofmt-style source: tab indentation, one blank line
between top-level declarations, and parentheses wherever operator
precedence requires them (rules may remove a `ParenExpr` the parser kept).
*/

use crate::parser::ast::{ChanDir, Node, NodeId, Tree, UnaryOp};

/// Precedence of primary expressions: selectors, calls, index and slice bases.
const PRIMARY: u8 = 7;
const UNARY: u8 = 6;

/// Prints a whole file.
pub fn print_tree(tree: &Tree) -> String {
    Printer::new(tree).file(tree.root())
}

/// Prints one node as it would appear in a file at indentation zero.
pub fn print_node(tree: &Tree, id: NodeId) -> String {
    let mut printer = Printer::new(tree);
    match tree.node(id) {
        Node::File { .. } => printer.file(id),
        node if is_statement(node) => printer.stmt(id),
        _ => printer.expr(id, 0),
    }
}

fn is_statement(node: &Node) -> bool {
    matches!(
        node,
        Node::Block { .. }
            | Node::Decl { .. }
            | Node::Assign { .. }
            | Node::IncDec { .. }
            | Node::ExprStmt { .. }
            | Node::Send { .. }
            | Node::Go { .. }
            | Node::Defer { .. }
            | Node::Return { .. }
            | Node::Branch { .. }
            | Node::If { .. }
            | Node::For { .. }
            | Node::Range { .. }
            | Node::Labeled { .. }
            | Node::Switch { .. }
            | Node::TypeSwitch { .. }
            | Node::Select { .. }
            | Node::CaseClause { .. }
            | Node::CommClause { .. }
            | Node::FuncDecl { .. }
    )
}

struct Printer<'a> {
    tree: &'a Tree,
    indent: usize,
}

impl<'a> Printer<'a> {
    fn new(tree: &'a Tree) -> Self {
        Self { tree, indent: 0 }
    }

    fn tabs(&self) -> String {
        "\t".repeat(self.indent)
    }

    fn file(&mut self, id: NodeId) -> String {
        let tree = self.tree;
        let Node::File { package, imports, decls } = tree.node(id) else {
            return self.stmt(id);
        };
        let mut out = format!("package {}\n", package);
        match imports.len() {
            0 => {}
            1 => out.push_str(&format!("\nimport {}\n", self.import(imports[0]))),
            _ => {
                out.push_str("\nimport (\n");
                for import in imports {
                    out.push_str(&format!("\t{}\n", self.import(*import)));
                }
                out.push_str(")\n");
            }
        }
        for decl in decls {
            out.push('\n');
            out.push_str(&self.stmt(*decl));
            out.push('\n');
        }
        out
    }

    fn import(&self, id: NodeId) -> String {
        let tree = self.tree;
        match tree.node(id) {
            Node::Import { alias: Some(alias), path } => format!("{} \"{}\"", alias, path),
            Node::Import { alias: None, path } => format!("\"{}\"", path),
            other => format!("/* {} */", other.kind_name()),
        }
    }

    fn list(&mut self, ids: &[NodeId]) -> String {
        ids.iter().map(|id| self.expr(*id, 0)).collect::<Vec<_>>().join(", ")
    }

    // ---- statements --------------------------------------------------------

    fn block(&mut self, id: NodeId) -> String {
        let tree = self.tree;
        let Node::Block { stmts } = tree.node(id) else {
            return self.stmt(id);
        };
        let mut out = String::from("{\n");
        self.indent += 1;
        out.push_str(&self.lines(stmts));
        self.indent -= 1;
        out.push_str(&self.tabs());
        out.push('}');
        out
    }

    /// One statement per line at the current indentation. Labels sit one
    /// level further out than the statement they mark.
    fn lines(&mut self, stmts: &[NodeId]) -> String {
        let tree = self.tree;
        let mut out = String::new();
        for stmt in stmts {
            if matches!(tree.node(*stmt), Node::Labeled { .. }) {
                out.push_str(&"\t".repeat(self.indent.saturating_sub(1)));
            } else {
                out.push_str(&self.tabs());
            }
            out.push_str(&self.stmt(*stmt));
            out.push('\n');
        }
        out
    }

    /// `switch`/`select` clauses at the current indentation, then `}`.
    fn clauses(&mut self, clauses: &[NodeId]) -> String {
        let mut out = String::from("{\n");
        for clause in clauses {
            out.push_str(&self.tabs());
            out.push_str(&self.stmt(*clause));
        }
        out.push_str(&self.tabs());
        out.push('}');
        out
    }

    /// Clause header followed by its body lines, one level deeper.
    fn clause(&mut self, header: String, body: NodeId) -> String {
        let tree = self.tree;
        let mut out = header;
        out.push('\n');
        if let Node::Block { stmts } = tree.node(body) {
            self.indent += 1;
            out.push_str(&self.lines(stmts));
            self.indent -= 1;
        }
        out
    }

    fn stmt(&mut self, id: NodeId) -> String {
        let tree = self.tree;
        match tree.node(id) {
            Node::Block { .. } => self.block(id),
            Node::FuncDecl { recv, name, ty, body } => {
                let mut out = String::from("func ");
                if let Some(recv) = recv {
                    out.push_str(&format!("({}) ", self.field(*recv)));
                }
                out.push_str(&self.expr(*name, 0));
                out.push_str(&self.signature(*ty));
                if let Some(body) = body {
                    out.push(' ');
                    out.push_str(&self.block(*body));
                }
                out
            }
            Node::Decl { kind, grouped, specs } => {
                if !grouped && specs.len() == 1 {
                    return format!("{} {}", kind.keyword(), self.spec(specs[0]));
                }
                let mut out = format!("{} (\n", kind.keyword());
                self.indent += 1;
                for spec in specs {
                    out.push_str(&self.tabs());
                    out.push_str(&self.spec(*spec));
                    out.push('\n');
                }
                self.indent -= 1;
                out.push_str(&self.tabs());
                out.push(')');
                out
            }
            Node::Assign { op, lhs, rhs } => {
                format!("{} {} {}", self.list(lhs), op, self.list(rhs))
            }
            Node::IncDec { x, inc } => {
                format!("{}{}", self.expr(*x, 0), if *inc { "++" } else { "--" })
            }
            Node::ExprStmt { x } => self.expr(*x, 0),
            Node::Send { chan, value } => {
                format!("{} <- {}", self.expr(*chan, 0), self.expr(*value, 0))
            }
            Node::Go { call } => format!("go {}", self.expr(*call, 0)),
            Node::Defer { call } => format!("defer {}", self.expr(*call, 0)),
            Node::Return { results } if results.is_empty() => "return".to_string(),
            Node::Return { results } => format!("return {}", self.list(results)),
            Node::Branch { kind, label: Some(label) } => format!("{} {}", kind.keyword(), label),
            Node::Branch { kind, label: None } => kind.keyword().to_string(),
            Node::Labeled { label, stmt: None } => format!("{}:", label),
            Node::Labeled { label, stmt: Some(stmt) } => {
                format!("{}:\n{}{}", label, self.tabs(), self.stmt(*stmt))
            }
            Node::Switch { init, tag, clauses } => {
                let mut out = String::from("switch ");
                if let Some(init) = init {
                    out.push_str(&self.stmt(*init));
                    out.push_str("; ");
                }
                if let Some(tag) = tag {
                    out.push_str(&self.expr(*tag, 0));
                    out.push(' ');
                }
                out.push_str(&self.clauses(clauses));
                out
            }
            Node::TypeSwitch { init, bind, guard, clauses } => {
                let mut out = String::from("switch ");
                if let Some(init) = init {
                    out.push_str(&self.stmt(*init));
                    out.push_str("; ");
                }
                if let Some(bind) = bind {
                    out.push_str(&self.expr(*bind, 0));
                    out.push_str(" := ");
                }
                out.push_str(&self.expr(*guard, 0));
                out.push(' ');
                out.push_str(&self.clauses(clauses));
                out
            }
            Node::Select { clauses } => format!("select {}", self.clauses(clauses)),
            Node::CaseClause { list, default, body } => {
                let header = if *default {
                    "default:".to_string()
                } else {
                    format!("case {}:", self.list(list))
                };
                self.clause(header, *body)
            }
            Node::CommClause { comm, body } => {
                let header = match comm {
                    Some(comm) => format!("case {}:", self.stmt(*comm)),
                    None => "default:".to_string(),
                };
                self.clause(header, *body)
            }
            Node::If { init, cond, body, els } => {
                let mut out = String::from("if ");
                if let Some(init) = init {
                    out.push_str(&self.stmt(*init));
                    out.push_str("; ");
                }
                out.push_str(&self.expr(*cond, 0));
                out.push(' ');
                out.push_str(&self.block(*body));
                if let Some(els) = els {
                    out.push_str(" else ");
                    out.push_str(&self.stmt(*els));
                }
                out
            }
            Node::For { init, cond, post, body } => {
                let mut out = String::from("for ");
                if init.is_none() && post.is_none() {
                    if let Some(cond) = cond {
                        out.push_str(&self.expr(*cond, 0));
                        out.push(' ');
                    }
                } else {
                    if let Some(init) = init {
                        out.push_str(&self.stmt(*init));
                    }
                    out.push_str("; ");
                    if let Some(cond) = cond {
                        out.push_str(&self.expr(*cond, 0));
                    }
                    out.push_str("; ");
                    if let Some(post) = post {
                        out.push_str(&self.stmt(*post));
                        out.push(' ');
                    }
                }
                out.push_str(&self.block(*body));
                out
            }
            Node::Range { key, value, define, x, body } => {
                let mut out = String::from("for ");
                if let Some(key) = key {
                    out.push_str(&self.expr(*key, 0));
                    if let Some(value) = value {
                        out.push_str(", ");
                        out.push_str(&self.expr(*value, 0));
                    }
                    out.push_str(if *define { " := " } else { " = " });
                }
                out.push_str("range ");
                out.push_str(&self.expr(*x, 0));
                out.push(' ');
                out.push_str(&self.block(*body));
                out
            }
            _ => self.expr(id, 0),
        }
    }

    fn spec(&mut self, id: NodeId) -> String {
        let tree = self.tree;
        match tree.node(id) {
            Node::ValueSpec { names, ty, values } => {
                let mut out = self.list(names);
                if let Some(ty) = ty {
                    out.push(' ');
                    out.push_str(&self.expr(*ty, 0));
                }
                if !values.is_empty() {
                    out.push_str(" = ");
                    out.push_str(&self.list(values));
                }
                out
            }
            Node::TypeSpec { name, alias, ty } => format!(
                "{}{} {}",
                self.expr(*name, 0),
                if *alias { " =" } else { "" },
                self.expr(*ty, 0)
            ),
            _ => self.expr(id, 0),
        }
    }

    fn field(&mut self, id: NodeId) -> String {
        let tree = self.tree;
        let Node::Field { names, ty, tag } = tree.node(id) else {
            return self.expr(id, 0);
        };
        let mut out = String::new();
        if !names.is_empty() {
            out.push_str(&self.list(names));
            out.push(' ');
        }
        out.push_str(&self.expr(*ty, 0));
        if let Some(tag) = tag {
            out.push(' ');
            out.push_str(tag);
        }
        out
    }

    fn fields(&mut self, ids: &[NodeId]) -> String {
        ids.iter().map(|id| self.field(*id)).collect::<Vec<_>>().join(", ")
    }

    /// Parameter and result lists of a `FuncType`, without the `func` keyword.
    fn signature(&mut self, id: NodeId) -> String {
        let tree = self.tree;
        let Node::FuncType { params, results } = tree.node(id) else {
            return self.expr(id, 0);
        };
        let mut out = format!("({})", self.fields(params));
        match results.as_slice() {
            [] => {}
            [single] if matches!(tree.node(*single), Node::Field { names, .. } if names.is_empty()) => {
                out.push(' ');
                out.push_str(&self.field(*single));
            }
            _ => out.push_str(&format!(" ({})", self.fields(results))),
        }
        out
    }

    /// Struct fields and interface methods, one per line.
    fn member_block(&mut self, keyword: &str, members: &[NodeId], methods: bool) -> String {
        let tree = self.tree;
        if members.is_empty() {
            return format!("{}{{}}", keyword);
        }
        let mut out = format!("{} {{\n", keyword);
        self.indent += 1;
        for member in members {
            out.push_str(&self.tabs());
            let line = match tree.node(*member) {
                Node::Field { names, ty, .. } if methods && names.len() == 1 => {
                    format!("{}{}", self.expr(names[0], 0), self.signature(*ty))
                }
                _ => self.field(*member),
            };
            out.push_str(&line);
            out.push('\n');
        }
        self.indent -= 1;
        out.push_str(&self.tabs());
        out.push('}');
        out
    }

    // ---- expressions -------------------------------------------------------

    /// Prints an expression in a context of precedence `prec`; lower-binding
    /// expressions are parenthesized.
    fn expr(&mut self, id: NodeId, prec: u8) -> String {
        let tree = self.tree;
        match tree.node(id) {
            Node::Ident { name } => name.clone(),
            Node::BasicLit { value, .. } => value.clone(),
            Node::Binary { op, x, y } => {
                let p = op.precedence();
                let text = format!("{} {} {}", self.expr(*x, p), op, self.expr(*y, p + 1));
                if p < prec {
                    format!("({})", text)
                } else {
                    text
                }
            }
            Node::Unary { op, x } => {
                let mut operand = self.expr(*x, UNARY);
                // `- -a` must not print as `--a`
                let clash = match op {
                    UnaryOp::Neg => operand.starts_with('-'),
                    UnaryOp::Pos => operand.starts_with('+'),
                    UnaryOp::Addr => operand.starts_with('&'),
                    UnaryOp::Recv => operand.starts_with('-'),
                    _ => false,
                };
                if clash {
                    operand = format!("({})", operand);
                }
                let text = format!("{}{}", op, operand);
                if UNARY < prec {
                    format!("({})", text)
                } else {
                    text
                }
            }
            Node::Star { x } => {
                let text = format!("*{}", self.expr(*x, UNARY));
                if UNARY < prec {
                    format!("({})", text)
                } else {
                    text
                }
            }
            Node::Paren { x } => format!("({})", self.expr(*x, 0)),
            Node::Selector { x, sel } => format!("{}.{}", self.expr(*x, PRIMARY), sel),
            Node::Index { x, index } => {
                format!("{}[{}]", self.expr(*x, PRIMARY), self.expr(*index, 0))
            }
            Node::Slice { x, low, high, max, slice3 } => {
                let mut out = self.expr(*x, PRIMARY);
                out.push('[');
                if let Some(low) = low {
                    out.push_str(&self.expr(*low, 0));
                }
                out.push(':');
                if let Some(high) = high {
                    out.push_str(&self.expr(*high, 0));
                }
                if *slice3 {
                    out.push(':');
                    if let Some(max) = max {
                        out.push_str(&self.expr(*max, 0));
                    }
                }
                out.push(']');
                out
            }
            Node::TypeAssert { x, ty: Some(ty) } => {
                format!("{}.({})", self.expr(*x, PRIMARY), self.expr(*ty, 0))
            }
            Node::TypeAssert { x, ty: None } => format!("{}.(type)", self.expr(*x, PRIMARY)),
            Node::Call { fun, args, ellipsis } => format!(
                "{}({}{})",
                self.expr(*fun, PRIMARY),
                self.list(args),
                if *ellipsis { "..." } else { "" }
            ),
            Node::Composite { ty, elts } => {
                let ty = match ty {
                    Some(ty) => self.expr(*ty, PRIMARY),
                    None => String::new(),
                };
                format!("{}{{{}}}", ty, self.list(elts))
            }
            Node::KeyValue { key, value } => {
                format!("{}: {}", self.expr(*key, 0), self.expr(*value, 0))
            }
            Node::FuncLit { ty, body } => {
                format!("func{} {}", self.signature(*ty), self.block(*body))
            }
            Node::Ellipsis { elt: Some(elt) } => format!("...{}", self.expr(*elt, 0)),
            Node::Ellipsis { elt: None } => "...".to_string(),
            Node::ArrayType { len, elt } => {
                let len = match len {
                    Some(len) => self.expr(*len, 0),
                    None => String::new(),
                };
                format!("[{}]{}", len, self.expr(*elt, 0))
            }
            Node::MapType { key, value } => {
                format!("map[{}]{}", self.expr(*key, 0), self.expr(*value, 0))
            }
            Node::ChanType { dir, value } => {
                let value = self.expr(*value, 0);
                match dir {
                    ChanDir::Both => format!("chan {}", value),
                    ChanDir::Send => format!("chan<- {}", value),
                    ChanDir::Recv => format!("<-chan {}", value),
                }
            }
            Node::FuncType { .. } => format!("func{}", self.signature(id)),
            Node::StructType { fields } => self.member_block("struct", fields, false),
            Node::InterfaceType { methods } => self.member_block("interface", methods, true),
            Node::Field { .. } => self.field(id),
            Node::ValueSpec { .. } | Node::TypeSpec { .. } => self.spec(id),
            Node::Import { .. } => self.import(id),
            _ => self.stmt(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::BinaryOp;
    use crate::parser::GoParser;
    use crate::core::Position;
    use pretty_assertions::assert_eq;

    fn round_trip(src: &str) {
        let tree = GoParser::new().parse_text(src).unwrap();
        assert_eq!(print_tree(&tree), src);
    }

    #[test]
    fn test_round_trip_canonical_sources() {
        round_trip("package main\n\nimport \"fmt\"\n\nfunc main() {\n\tfmt.Println(\"hi\")\n}\n");
        round_trip(
            "package p\n\nimport (\n\t\"fmt\"\n\tstr \"strings\"\n)\n\nvar (\n\ta = 1\n\tb, c int\n)\n\nconst d = (a + 2) * 3\n",
        );
        round_trip(
            "package p\n\ntype T struct {\n\tA, B int `json:\"a\"`\n\t*Embedded\n}\n\ntype I interface {\n\tM(x int) error\n\tfmt.Stringer\n}\n",
        );
        round_trip(
            "package p\n\nfunc (t *T) f(a, b int, rest ...string) (int, error) {\n\tif x := g(); x > 0 {\n\t\treturn x, nil\n\t} else if y {\n\t} else {\n\t}\n\tfor i := 0; i < 3; i++ {\n\t\tcontinue\n\t}\n\tfor k, v := range m {\n\t\t_, _ = k, v\n\t}\n\tfor {\n\t\tbreak\n\t}\n\treturn 0, nil\n}\n",
        );
        round_trip(
            "package p\n\nfunc f() {\n\tch := make(chan int, 1)\n\tch <- 1\n\tgo func() {\n\t\t<-ch\n\t}()\n\tdefer close(ch)\n\ts := []int{1, 2}[1:2:2]\n\tm := map[string]T{\"a\": {X: 1}}\n\t_, _ = s, m\n\tv, ok := x.(*T)\n\t_, _ = v, ok\n}\n",
        );
    }

    #[test]
    fn test_round_trip_switch_select_and_labels() {
        round_trip(
            "package p\n\nfunc f(x any, ch chan int) {\n\tswitch n := len(ch); {\n\tcase n > 1, n < -1:\n\t\tprintln(n)\n\t\tfallthrough\n\tdefault:\n\t}\n\tswitch v := x.(type) {\n\tcase int:\n\t\tprintln(v)\n\tcase nil:\n\t}\n\tselect {\n\tcase v, ok := <-ch:\n\t\t_, _ = v, ok\n\tcase ch <- 1:\n\tdefault:\n\t\treturn\n\t}\nloop:\n\tfor {\n\t\tswitch {\n\t\tcase true:\n\t\t\tbreak loop\n\t\t}\n\t}\n\tgoto done\ndone:\n}\n",
        );
    }

    #[test]
    fn test_empty_bodies() {
        round_trip("package main\n\nfunc main() {\n}\n");
        let tree = GoParser::new().parse_text("package main\nfunc main() {}").unwrap();
        assert_eq!(print_tree(&tree), "package main\n\nfunc main() {\n}\n");
    }

    #[test]
    fn test_parens_added_for_precedence() {
        let mut tree = GoParser::new().parse_text("package p\n\nvar x = a * b\n").unwrap();
        // Build `(c + d) * b` by hand without a ParenExpr
        let c = tree.alloc(Node::Ident { name: "c".into() }, Position::zero());
        let d = tree.alloc(Node::Ident { name: "d".into() }, Position::zero());
        let sum = tree.alloc(Node::Binary { op: BinaryOp::Add, x: c, y: d }, Position::zero());
        let a = tree
            .descendants(tree.root())
            .into_iter()
            .find(|id| tree.node(*id).ident_name() == Some("a"))
            .unwrap();
        let mul = tree
            .descendants(tree.root())
            .into_iter()
            .find(|id| matches!(tree.node(*id), Node::Binary { .. }))
            .unwrap();
        let mut node = tree.node(mul).clone();
        assert!(node.replace_child(a, sum));
        tree.replace(mul, node);
        assert_eq!(print_tree(&tree), "package p\n\nvar x = (c + d) * b\n");
    }

    #[test]
    fn test_nested_negation_is_not_decrement() {
        let tree = GoParser::new().parse_text("package p\n\nvar x = -(-a)\n").unwrap();
        let paren = tree
            .descendants(tree.root())
            .into_iter()
            .find(|id| matches!(tree.node(*id), Node::Paren { .. }))
            .unwrap();
        let Node::Paren { x: inner } = tree.node(paren) else { unreachable!() };
        let inner = *inner;
        let mut tree = tree;
        let outer = tree
            .descendants(tree.root())
            .into_iter()
            .find(|id| matches!(tree.node(*id), Node::Unary { x, .. } if *x == paren))
            .unwrap();
        let mut node = tree.node(outer).clone();
        node.replace_child(paren, inner);
        tree.replace(outer, node);
        assert_eq!(print_tree(&tree), "package p\n\nvar x = -(-a)\n");
    }

    #[test]
    fn test_print_node_statement() {
        let tree = GoParser::new()
            .parse_text("package p\n\nfunc f() {\n\tif a {\n\t\tb()\n\t}\n}\n")
            .unwrap();
        let stmt = tree
            .descendants(tree.root())
            .into_iter()
            .find(|id| matches!(tree.node(*id), Node::If { .. }))
            .unwrap();
        assert_eq!(print_node(&tree, stmt), "if a {\n\tb()\n}");
    }
}
