/*!
# Go Syntax Analyzer

Recursive-descent parser for the supported Go subset. Produces an arena
`Tree` whose root is a `File` node.
*/

use crate::core::Position;
use crate::parser::ast::{
    AssignOp, BinaryOp, BranchKind, ChanDir, DeclKind, LitKind, Node, NodeId, Tree, UnaryOp,
};
use crate::parser::lexer::{GoLexer, Token, TokenType};
use crate::parser::ParseError;

type PResult<T> = Result<T, ParseError>;

/// Result of parsing a simple statement. Expressions are kept unwrapped so
/// that `if`/`for` headers can use them as conditions.
enum Simple {
    Expr(NodeId, Position),
    Stmt(NodeId),
    Range { lhs: Vec<NodeId>, define: bool, x: NodeId, position: Position },
}

/// Header of a `switch` statement once its form is known.
enum SwitchHeader {
    Expr(Option<NodeId>),
    Type { bind: Option<NodeId>, guard: NodeId },
}

/// A parameter list entry before names and types are grouped.
enum ParamEntry {
    Name(String, Position),
    Named(String, Position, NodeId),
    Type(NodeId),
}

/// Go syntax analyzer
pub struct SyntaxAnalyzer {
    /// Current token index
    current_index: usize,
    /// Tokens to analyze
    tokens: Vec<Token>,
    tree: Tree,
    /// Set inside `if`/`for`/`switch` headers, where `T {` opens the body
    /// rather than a composite literal.
    no_composite: bool,
    /// Set inside `switch` headers, the only place `x.(type)` may appear.
    type_guard: bool,
}

impl SyntaxAnalyzer {
    /// Creates an analyzer over an already tokenized source.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            current_index: 0,
            tokens,
            tree: Tree::new(),
            no_composite: false,
            type_guard: false,
        }
    }

    /// Parses Go source into a tree rooted at a `File` node.
    pub fn parse(code: &str) -> PResult<Tree> {
        let tokens = GoLexer::new()
            .tokenize(code)
            .map_err(|(message, position)| ParseError::Lexical { message, position })?;
        let mut analyzer = Self::new(tokens);
        let root = analyzer.parse_file()?;
        analyzer.tree.set_root(root);
        Ok(analyzer.tree)
    }

    fn parse_file(&mut self) -> PResult<NodeId> {
        let position = self.position();
        self.expect(TokenType::Package)?;
        let package = self.expect(TokenType::Identifier)?.value;
        self.expect_semi(TokenType::Eof)?;

        let mut imports = Vec::new();
        while self.at(TokenType::Import) {
            self.parse_import_decl(&mut imports)?;
            self.expect_semi(TokenType::Eof)?;
        }

        let mut decls = Vec::new();
        while !self.at(TokenType::Eof) {
            let decl = match self.peek() {
                TokenType::Func => self.parse_func_decl()?,
                TokenType::Var | TokenType::Const | TokenType::Type => self.parse_gen_decl()?,
                TokenType::Semicolon => {
                    self.advance();
                    continue;
                }
                _ => return Err(self.unexpected("declaration")),
            };
            decls.push(decl);
            self.expect_semi(TokenType::Eof)?;
        }

        Ok(self.alloc(Node::File { package, imports, decls }, position))
    }

    // ---- declarations ------------------------------------------------------

    fn parse_import_decl(&mut self, imports: &mut Vec<NodeId>) -> PResult<()> {
        self.expect(TokenType::Import)?;
        if self.eat(TokenType::LeftParen) {
            while !self.at(TokenType::RightParen) {
                imports.push(self.parse_import_spec()?);
                self.expect_semi(TokenType::RightParen)?;
            }
            self.expect(TokenType::RightParen)?;
        } else {
            imports.push(self.parse_import_spec()?);
        }
        Ok(())
    }

    fn parse_import_spec(&mut self) -> PResult<NodeId> {
        let position = self.position();
        let alias = match self.peek() {
            TokenType::Identifier => Some(self.advance().value),
            TokenType::Dot => {
                self.advance();
                Some(".".to_string())
            }
            _ => None,
        };
        let path = match self.peek() {
            TokenType::StringLiteral | TokenType::RawStringLiteral => unquote(&self.advance().value),
            _ => return Err(self.unexpected("import path")),
        };
        Ok(self.alloc(Node::Import { alias, path }, position))
    }

    fn parse_func_decl(&mut self) -> PResult<NodeId> {
        let position = self.position();
        self.expect(TokenType::Func)?;
        let recv = if self.at(TokenType::LeftParen) {
            let mut fields = self.parse_parameters()?;
            if fields.len() != 1 {
                return Err(ParseError::Unexpected {
                    expected: "single receiver".to_string(),
                    found: format!("{} receivers", fields.len()),
                    position,
                });
            }
            fields.pop()
        } else {
            None
        };
        let name = self.parse_ident()?;
        if self.at(TokenType::LeftBracket) {
            return Err(self.unsupported("type parameters"));
        }
        let ty = self.parse_signature(position)?;
        let body = if self.at(TokenType::LeftBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(self.alloc(Node::FuncDecl { recv, name, ty, body }, position))
    }

    fn parse_gen_decl(&mut self) -> PResult<NodeId> {
        let position = self.position();
        let kind = match self.advance().token_type {
            TokenType::Var => DeclKind::Var,
            TokenType::Const => DeclKind::Const,
            _ => DeclKind::Type,
        };
        let mut specs = Vec::new();
        let grouped = self.eat(TokenType::LeftParen);
        if grouped {
            while !self.at(TokenType::RightParen) {
                specs.push(self.parse_spec(kind)?);
                self.expect_semi(TokenType::RightParen)?;
            }
            self.expect(TokenType::RightParen)?;
        } else {
            specs.push(self.parse_spec(kind)?);
        }
        Ok(self.alloc(Node::Decl { kind, grouped, specs }, position))
    }

    fn parse_spec(&mut self, kind: DeclKind) -> PResult<NodeId> {
        let position = self.position();
        if kind == DeclKind::Type {
            let name = self.parse_ident()?;
            let alias = self.eat(TokenType::Assign);
            let ty = self.parse_type()?;
            return Ok(self.alloc(Node::TypeSpec { name, alias, ty }, position));
        }

        let names = self.parse_ident_list()?;
        let ty = match self.peek() {
            TokenType::Assign | TokenType::Semicolon | TokenType::RightParen => None,
            _ => Some(self.parse_type()?),
        };
        let values = if self.eat(TokenType::Assign) {
            self.parse_expr_list()?
        } else {
            Vec::new()
        };
        Ok(self.alloc(Node::ValueSpec { names, ty, values }, position))
    }

    // ---- types -------------------------------------------------------------

    fn parse_signature(&mut self, position: Position) -> PResult<NodeId> {
        let params = self.parse_parameters()?;
        let results = if self.at(TokenType::LeftParen) {
            self.parse_parameters()?
        } else if starts_type(self.peek()) {
            let result_position = self.position();
            let ty = self.parse_type()?;
            vec![self.alloc(Node::Field { names: Vec::new(), ty, tag: None }, result_position)]
        } else {
            Vec::new()
        };
        Ok(self.alloc(Node::FuncType { params, results }, position))
    }

    /// `(a, b int, c string)` or `(int, string)`. Names are only known once
    /// a type follows them, so entries are grouped after the list closes.
    fn parse_parameters(&mut self) -> PResult<Vec<NodeId>> {
        self.expect(TokenType::LeftParen)?;
        let mut entries = Vec::new();
        while !self.at(TokenType::RightParen) {
            let entry = if self.at(TokenType::Identifier) {
                match self.peek_at(1) {
                    TokenType::Comma | TokenType::RightParen => {
                        let position = self.position();
                        ParamEntry::Name(self.advance().value, position)
                    }
                    TokenType::Dot => ParamEntry::Type(self.parse_type()?),
                    _ => {
                        let position = self.position();
                        let name = self.advance().value;
                        let ty = self.parse_param_type()?;
                        ParamEntry::Named(name, position, ty)
                    }
                }
            } else {
                ParamEntry::Type(self.parse_param_type()?)
            };
            entries.push(entry);
            if !self.eat(TokenType::Comma) {
                break;
            }
        }
        self.expect(TokenType::RightParen)?;

        let named = entries.iter().any(|e| matches!(e, ParamEntry::Named(..)));
        let mut fields = Vec::new();
        if !named {
            for entry in entries {
                let ty = match entry {
                    ParamEntry::Name(name, position) => self.alloc(Node::Ident { name }, position),
                    ParamEntry::Type(ty) => ty,
                    ParamEntry::Named(_, _, ty) => ty,
                };
                let position = self.tree.position(ty);
                fields.push(self.alloc(Node::Field { names: Vec::new(), ty, tag: None }, position));
            }
            return Ok(fields);
        }

        let mut pending: Vec<(String, Position)> = Vec::new();
        for entry in entries {
            match entry {
                ParamEntry::Name(name, position) => pending.push((name, position)),
                ParamEntry::Named(name, position, ty) => {
                    pending.push((name, position));
                    let field_position = pending[0].1;
                    let names = pending
                        .drain(..)
                        .map(|(name, position)| self.alloc(Node::Ident { name }, position))
                        .collect();
                    fields.push(self.alloc(Node::Field { names, ty, tag: None }, field_position));
                }
                ParamEntry::Type(ty) => {
                    return Err(ParseError::Unexpected {
                        expected: "parameter name".to_string(),
                        found: "type".to_string(),
                        position: self.tree.position(ty),
                    });
                }
            }
        }
        if let Some((_, position)) = pending.first() {
            return Err(ParseError::Unexpected {
                expected: "parameter type".to_string(),
                found: ")".to_string(),
                position: *position,
            });
        }
        Ok(fields)
    }

    fn parse_param_type(&mut self) -> PResult<NodeId> {
        let position = self.position();
        if self.eat(TokenType::Ellipsis) {
            let elt = self.parse_type()?;
            return Ok(self.alloc(Node::Ellipsis { elt: Some(elt) }, position));
        }
        self.parse_type()
    }

    fn parse_type(&mut self) -> PResult<NodeId> {
        let position = self.position();
        let node = match self.peek() {
            TokenType::Identifier => {
                let id = self.parse_ident()?;
                if self.at(TokenType::Dot) && self.peek_at(1) == TokenType::Identifier {
                    self.advance();
                    let sel = self.advance().value;
                    Node::Selector { x: id, sel }
                } else {
                    return Ok(id);
                }
            }
            TokenType::Star => {
                self.advance();
                Node::Star { x: self.parse_type()? }
            }
            TokenType::LeftBracket => {
                self.advance();
                let len = if self.eat(TokenType::RightBracket) {
                    None
                } else if self.at(TokenType::Ellipsis) && self.peek_at(1) == TokenType::RightBracket {
                    let ellipsis_position = self.position();
                    self.advance();
                    self.advance();
                    Some(self.alloc(Node::Ellipsis { elt: None }, ellipsis_position))
                } else {
                    let len = self.with_composites(|p| p.parse_expr())?;
                    self.expect(TokenType::RightBracket)?;
                    Some(len)
                };
                let elt = self.parse_type()?;
                Node::ArrayType { len, elt }
            }
            TokenType::Map => {
                self.advance();
                self.expect(TokenType::LeftBracket)?;
                let key = self.parse_type()?;
                self.expect(TokenType::RightBracket)?;
                let value = self.parse_type()?;
                Node::MapType { key, value }
            }
            TokenType::Chan => {
                self.advance();
                let dir = if self.eat(TokenType::Arrow) { ChanDir::Send } else { ChanDir::Both };
                Node::ChanType { dir, value: self.parse_type()? }
            }
            TokenType::Arrow => {
                self.advance();
                self.expect(TokenType::Chan)?;
                Node::ChanType { dir: ChanDir::Recv, value: self.parse_type()? }
            }
            TokenType::Func => {
                self.advance();
                return self.parse_signature(position);
            }
            TokenType::Struct => return self.parse_struct_type(),
            TokenType::Interface => return self.parse_interface_type(),
            TokenType::LeftParen => {
                self.advance();
                let x = self.parse_type()?;
                self.expect(TokenType::RightParen)?;
                Node::Paren { x }
            }
            _ => return Err(self.unexpected("type")),
        };
        Ok(self.alloc(node, position))
    }

    fn parse_struct_type(&mut self) -> PResult<NodeId> {
        let position = self.position();
        self.expect(TokenType::Struct)?;
        self.expect(TokenType::LeftBrace)?;
        let mut fields = Vec::new();
        while !self.at(TokenType::RightBrace) {
            let field_position = self.position();
            let embedded = match self.peek() {
                TokenType::Star => true,
                TokenType::Identifier => matches!(
                    self.peek_at(1),
                    TokenType::Semicolon
                        | TokenType::RightBrace
                        | TokenType::Dot
                        | TokenType::StringLiteral
                        | TokenType::RawStringLiteral
                ),
                _ => false,
            };
            let (names, ty) = if embedded {
                (Vec::new(), self.parse_type()?)
            } else {
                let names = self.parse_ident_list()?;
                (names, self.parse_type()?)
            };
            let tag = match self.peek() {
                TokenType::StringLiteral | TokenType::RawStringLiteral => Some(self.advance().value),
                _ => None,
            };
            fields.push(self.alloc(Node::Field { names, ty, tag }, field_position));
            self.expect_semi(TokenType::RightBrace)?;
        }
        self.expect(TokenType::RightBrace)?;
        Ok(self.alloc(Node::StructType { fields }, position))
    }

    fn parse_interface_type(&mut self) -> PResult<NodeId> {
        let position = self.position();
        self.expect(TokenType::Interface)?;
        self.expect(TokenType::LeftBrace)?;
        let mut methods = Vec::new();
        while !self.at(TokenType::RightBrace) {
            let method_position = self.position();
            let field = if self.at(TokenType::Identifier) && self.peek_at(1) == TokenType::LeftParen {
                let name = self.parse_ident()?;
                let ty = self.parse_signature(method_position)?;
                Node::Field { names: vec![name], ty, tag: None }
            } else {
                Node::Field { names: Vec::new(), ty: self.parse_type()?, tag: None }
            };
            methods.push(self.alloc(field, method_position));
            self.expect_semi(TokenType::RightBrace)?;
        }
        self.expect(TokenType::RightBrace)?;
        Ok(self.alloc(Node::InterfaceType { methods }, position))
    }

    // ---- statements --------------------------------------------------------

    fn parse_block(&mut self) -> PResult<NodeId> {
        let position = self.position();
        self.expect(TokenType::LeftBrace)?;
        let stmts = self.parse_statement_list()?;
        self.expect(TokenType::RightBrace)?;
        Ok(self.alloc(Node::Block { stmts }, position))
    }

    /// Statements up to the closing `}` of a block or the next clause of a
    /// `switch`/`select`.
    fn parse_statement_list(&mut self) -> PResult<Vec<NodeId>> {
        let mut stmts = Vec::new();
        while !matches!(
            self.peek(),
            TokenType::RightBrace | TokenType::Case | TokenType::Default | TokenType::Eof
        ) {
            if self.eat(TokenType::Semicolon) {
                continue;
            }
            stmts.push(self.parse_statement()?);
            self.expect_semi(TokenType::RightBrace)?;
        }
        Ok(stmts)
    }

    fn parse_statement(&mut self) -> PResult<NodeId> {
        let position = self.position();
        match self.peek() {
            TokenType::Var | TokenType::Const | TokenType::Type => self.parse_gen_decl(),
            TokenType::LeftBrace => self.parse_block(),
            TokenType::If => self.parse_if_statement(),
            TokenType::For => self.parse_for_statement(),
            TokenType::Switch => self.parse_switch_statement(),
            TokenType::Select => self.parse_select_statement(),
            TokenType::Identifier if self.peek_at(1) == TokenType::Colon => {
                let label = self.advance().value;
                self.advance();
                let stmt = match self.peek() {
                    TokenType::RightBrace | TokenType::Case | TokenType::Default => None,
                    _ => Some(self.parse_statement()?),
                };
                Ok(self.alloc(Node::Labeled { label, stmt }, position))
            }
            TokenType::Go | TokenType::Defer => {
                let is_go = self.advance().token_type == TokenType::Go;
                let call = self.parse_expr()?;
                if !matches!(self.tree.node(call), Node::Call { .. }) {
                    return Err(ParseError::Unexpected {
                        expected: "function call".to_string(),
                        found: self.tree.node(call).kind_name().to_string(),
                        position: self.tree.position(call),
                    });
                }
                let node = if is_go { Node::Go { call } } else { Node::Defer { call } };
                Ok(self.alloc(node, position))
            }
            TokenType::Return => {
                self.advance();
                let results = match self.peek() {
                    TokenType::Semicolon | TokenType::RightBrace => Vec::new(),
                    _ => self.parse_expr_list()?,
                };
                Ok(self.alloc(Node::Return { results }, position))
            }
            TokenType::Break | TokenType::Continue | TokenType::Goto | TokenType::Fallthrough => {
                let kind = match self.advance().token_type {
                    TokenType::Break => BranchKind::Break,
                    TokenType::Continue => BranchKind::Continue,
                    TokenType::Goto => BranchKind::Goto,
                    _ => BranchKind::Fallthrough,
                };
                let label = if kind != BranchKind::Fallthrough && self.at(TokenType::Identifier) {
                    Some(self.advance().value)
                } else {
                    None
                };
                if kind == BranchKind::Goto && label.is_none() {
                    return Err(self.unexpected("label"));
                }
                Ok(self.alloc(Node::Branch { kind, label }, position))
            }
            _ => {
                let simple = self.parse_simple_statement(false)?;
                self.into_statement(simple)
            }
        }
    }

    fn parse_simple_statement(&mut self, range_ok: bool) -> PResult<Simple> {
        let position = self.position();
        if range_ok && self.eat(TokenType::Range) {
            let x = self.parse_expr()?;
            return Ok(Simple::Range { lhs: Vec::new(), define: false, x, position });
        }

        let lhs = self.parse_expr_list()?;
        let token = self.peek();
        let op = match token {
            TokenType::Define => Some(AssignOp::Define),
            TokenType::Assign => Some(AssignOp::Assign),
            _ => compound_op(token).map(AssignOp::Compound),
        };
        if let Some(op) = op {
            self.advance();
            let plain = matches!(op, AssignOp::Define | AssignOp::Assign);
            if range_ok && plain && self.eat(TokenType::Range) {
                let x = self.parse_expr()?;
                return Ok(Simple::Range { lhs, define: op == AssignOp::Define, x, position });
            }
            let rhs = self.parse_expr_list()?;
            return Ok(Simple::Stmt(self.alloc(Node::Assign { op, lhs, rhs }, position)));
        }

        match token {
            TokenType::Inc | TokenType::Dec => {
                self.advance();
                let x = self.single(lhs, position)?;
                let inc = token == TokenType::Inc;
                Ok(Simple::Stmt(self.alloc(Node::IncDec { x, inc }, position)))
            }
            TokenType::Arrow => {
                self.advance();
                let chan = self.single(lhs, position)?;
                let value = self.parse_expr()?;
                Ok(Simple::Stmt(self.alloc(Node::Send { chan, value }, position)))
            }
            _ => {
                let x = self.single(lhs, position)?;
                Ok(Simple::Expr(x, position))
            }
        }
    }

    fn single(&self, mut list: Vec<NodeId>, position: Position) -> PResult<NodeId> {
        if list.len() != 1 {
            return Err(ParseError::Unexpected {
                expected: "single expression".to_string(),
                found: format!("{} expressions", list.len()),
                position,
            });
        }
        Ok(list.remove(0))
    }

    fn into_statement(&mut self, simple: Simple) -> PResult<NodeId> {
        match simple {
            Simple::Expr(x, position) => Ok(self.alloc(Node::ExprStmt { x }, position)),
            Simple::Stmt(id) => Ok(id),
            Simple::Range { position, .. } => Err(ParseError::Unexpected {
                expected: "statement".to_string(),
                found: "range".to_string(),
                position,
            }),
        }
    }

    fn into_condition(&self, simple: Simple) -> PResult<NodeId> {
        match simple {
            Simple::Expr(x, _) => Ok(x),
            Simple::Stmt(id) => Err(ParseError::Unexpected {
                expected: "condition".to_string(),
                found: self.tree.node(id).kind_name().to_string(),
                position: self.tree.position(id),
            }),
            Simple::Range { position, .. } => Err(ParseError::Unexpected {
                expected: "condition".to_string(),
                found: "range".to_string(),
                position,
            }),
        }
    }

    fn parse_if_statement(&mut self) -> PResult<NodeId> {
        let position = self.position();
        self.expect(TokenType::If)?;
        let saved = std::mem::replace(&mut self.no_composite, true);

        let first = if self.at(TokenType::Semicolon) {
            None
        } else {
            Some(self.parse_simple_statement(false)?)
        };
        let (init, cond) = if self.eat(TokenType::Semicolon) {
            let init = match first {
                Some(simple) => Some(self.into_statement(simple)?),
                None => None,
            };
            (init, self.parse_expr()?)
        } else {
            match first {
                Some(simple) => (None, self.into_condition(simple)?),
                None => return Err(self.unexpected("condition")),
            }
        };
        self.no_composite = saved;

        let body = self.parse_block()?;
        let els = if self.eat(TokenType::Else) {
            match self.peek() {
                TokenType::If => Some(self.parse_if_statement()?),
                TokenType::LeftBrace => Some(self.parse_block()?),
                _ => return Err(self.unexpected("if statement or block")),
            }
        } else {
            None
        };
        Ok(self.alloc(Node::If { init, cond, body, els }, position))
    }

    fn parse_for_statement(&mut self) -> PResult<NodeId> {
        let position = self.position();
        self.expect(TokenType::For)?;
        let saved = std::mem::replace(&mut self.no_composite, true);

        let mut init = None;
        let mut cond = None;
        let mut post = None;
        if !self.at(TokenType::LeftBrace) {
            let first = if self.at(TokenType::Semicolon) {
                None
            } else {
                Some(self.parse_simple_statement(true)?)
            };
            match first {
                Some(Simple::Range { lhs, define, x, .. }) => {
                    if lhs.len() > 2 {
                        return Err(self.unexpected("at most two range variables"));
                    }
                    self.no_composite = saved;
                    let key = lhs.first().copied();
                    let value = lhs.get(1).copied();
                    let body = self.parse_block()?;
                    return Ok(self.alloc(Node::Range { key, value, define, x, body }, position));
                }
                Some(simple) if !self.at(TokenType::Semicolon) => {
                    cond = Some(self.into_condition(simple)?);
                }
                first => {
                    if let Some(simple) = first {
                        init = Some(self.into_statement(simple)?);
                    }
                    self.expect(TokenType::Semicolon)?;
                    if !self.at(TokenType::Semicolon) {
                        cond = Some(self.parse_expr()?);
                    }
                    self.expect(TokenType::Semicolon)?;
                    if !self.at(TokenType::LeftBrace) {
                        let simple = self.parse_simple_statement(false)?;
                        post = Some(self.into_statement(simple)?);
                    }
                }
            }
        }
        self.no_composite = saved;

        let body = self.parse_block()?;
        Ok(self.alloc(Node::For { init, cond, post, body }, position))
    }

    fn parse_switch_statement(&mut self) -> PResult<NodeId> {
        let position = self.position();
        self.expect(TokenType::Switch)?;
        let saved = std::mem::replace(&mut self.no_composite, true);
        let saved_guard = std::mem::replace(&mut self.type_guard, true);
        let header = self.parse_switch_header();
        self.type_guard = saved_guard;
        self.no_composite = saved;
        let (init, header) = header?;

        self.expect(TokenType::LeftBrace)?;
        let types = matches!(header, SwitchHeader::Type { .. });
        let mut clauses = Vec::new();
        while !self.at(TokenType::RightBrace) {
            clauses.push(self.parse_case_clause(types)?);
        }
        self.expect(TokenType::RightBrace)?;

        let node = match header {
            SwitchHeader::Expr(tag) => Node::Switch { init, tag, clauses },
            SwitchHeader::Type { bind, guard } => Node::TypeSwitch { init, bind, guard, clauses },
        };
        Ok(self.alloc(node, position))
    }

    /// `[init;] [tag]` or `[init;] [v :=] x.(type)`.
    fn parse_switch_header(&mut self) -> PResult<(Option<NodeId>, SwitchHeader)> {
        if self.at(TokenType::LeftBrace) {
            return Ok((None, SwitchHeader::Expr(None)));
        }
        let first = if self.at(TokenType::Semicolon) {
            None
        } else {
            Some(self.parse_simple_statement(false)?)
        };
        let mut init = None;
        let tag = if self.eat(TokenType::Semicolon) {
            if let Some(simple) = first {
                init = Some(self.into_statement(simple)?);
            }
            if self.at(TokenType::LeftBrace) {
                None
            } else {
                Some(self.parse_simple_statement(false)?)
            }
        } else {
            first
        };

        let header = match tag {
            None => SwitchHeader::Expr(None),
            Some(Simple::Expr(x, _)) if self.is_type_guard(x) => SwitchHeader::Type { bind: None, guard: x },
            Some(Simple::Stmt(id)) => match self.tree.node(id) {
                Node::Assign { op: AssignOp::Define, lhs, rhs }
                    if lhs.len() == 1 && rhs.len() == 1 && self.is_type_guard(rhs[0]) =>
                {
                    SwitchHeader::Type { bind: Some(lhs[0]), guard: rhs[0] }
                }
                other => {
                    return Err(ParseError::Unexpected {
                        expected: "switch expression".to_string(),
                        found: other.kind_name().to_string(),
                        position: self.tree.position(id),
                    })
                }
            },
            Some(simple) => SwitchHeader::Expr(Some(self.into_condition(simple)?)),
        };
        Ok((init, header))
    }

    fn is_type_guard(&self, id: NodeId) -> bool {
        matches!(self.tree.node(id), Node::TypeAssert { ty: None, .. })
    }

    /// One `case`/`default` clause; `types` selects a type list over an
    /// expression list.
    fn parse_case_clause(&mut self, types: bool) -> PResult<NodeId> {
        let position = self.position();
        let (list, default) = match self.peek() {
            TokenType::Case => {
                self.advance();
                let list = if types { self.parse_type_list()? } else { self.parse_expr_list()? };
                (list, false)
            }
            TokenType::Default => {
                self.advance();
                (Vec::new(), true)
            }
            _ => return Err(self.unexpected("case or default")),
        };
        self.expect(TokenType::Colon)?;
        let body = self.parse_clause_body(position)?;
        Ok(self.alloc(Node::CaseClause { list, default, body }, position))
    }

    fn parse_select_statement(&mut self) -> PResult<NodeId> {
        let position = self.position();
        self.expect(TokenType::Select)?;
        self.expect(TokenType::LeftBrace)?;
        let mut clauses = Vec::new();
        while !self.at(TokenType::RightBrace) {
            let clause_position = self.position();
            let comm = match self.peek() {
                TokenType::Case => {
                    self.advance();
                    let simple = self.parse_simple_statement(false)?;
                    Some(self.into_statement(simple)?)
                }
                TokenType::Default => {
                    self.advance();
                    None
                }
                _ => return Err(self.unexpected("case or default")),
            };
            self.expect(TokenType::Colon)?;
            let body = self.parse_clause_body(clause_position)?;
            clauses.push(self.alloc(Node::CommClause { comm, body }, clause_position));
        }
        self.expect(TokenType::RightBrace)?;
        Ok(self.alloc(Node::Select { clauses }, position))
    }

    fn parse_clause_body(&mut self, position: Position) -> PResult<NodeId> {
        let stmts = self.parse_statement_list()?;
        Ok(self.alloc(Node::Block { stmts }, position))
    }

    // ---- expressions -------------------------------------------------------

    fn parse_expr_list(&mut self) -> PResult<Vec<NodeId>> {
        let mut list = vec![self.parse_expr()?];
        while self.eat(TokenType::Comma) {
            list.push(self.parse_expr()?);
        }
        Ok(list)
    }

    fn parse_type_list(&mut self) -> PResult<Vec<NodeId>> {
        let mut list = vec![self.parse_type()?];
        while self.eat(TokenType::Comma) {
            list.push(self.parse_type()?);
        }
        Ok(list)
    }

    fn parse_ident_list(&mut self) -> PResult<Vec<NodeId>> {
        let mut list = vec![self.parse_ident()?];
        while self.eat(TokenType::Comma) {
            list.push(self.parse_ident()?);
        }
        Ok(list)
    }

    fn parse_ident(&mut self) -> PResult<NodeId> {
        let token = self.expect(TokenType::Identifier)?;
        Ok(self.alloc(Node::Ident { name: token.value }, token.position))
    }

    fn parse_expr(&mut self) -> PResult<NodeId> {
        self.parse_binary(1)
    }

    /// Precedence climbing; all binary operators are left-associative.
    fn parse_binary(&mut self, min_prec: u8) -> PResult<NodeId> {
        let mut x = self.parse_unary()?;
        while let Some(op) = binary_op(self.peek()) {
            if op.precedence() < min_prec {
                break;
            }
            self.advance();
            let y = self.parse_binary(op.precedence() + 1)?;
            let position = self.tree.position(x);
            x = self.alloc(Node::Binary { op, x, y }, position);
        }
        Ok(x)
    }

    fn parse_unary(&mut self) -> PResult<NodeId> {
        let position = self.position();
        let op = match self.peek() {
            TokenType::Plus => UnaryOp::Pos,
            TokenType::Minus => UnaryOp::Neg,
            TokenType::Not => UnaryOp::Not,
            TokenType::Caret => UnaryOp::Xor,
            TokenType::Amp => UnaryOp::Addr,
            TokenType::Arrow if self.peek_at(1) == TokenType::Chan => return self.parse_primary(),
            TokenType::Arrow => UnaryOp::Recv,
            TokenType::Star => {
                self.advance();
                let x = self.parse_unary()?;
                return Ok(self.alloc(Node::Star { x }, position));
            }
            _ => return self.parse_primary(),
        };
        self.advance();
        let x = self.parse_unary()?;
        Ok(self.alloc(Node::Unary { op, x }, position))
    }

    fn parse_primary(&mut self) -> PResult<NodeId> {
        let position = self.position();
        let mut x = self.parse_operand()?;
        loop {
            match self.peek() {
                TokenType::Dot => {
                    self.advance();
                    if self.eat(TokenType::LeftParen) {
                        let ty = if self.at(TokenType::Type) {
                            if !self.type_guard {
                                return Err(ParseError::Unexpected {
                                    expected: "type".to_string(),
                                    found: "`type` outside a type switch".to_string(),
                                    position: self.position(),
                                });
                            }
                            self.advance();
                            None
                        } else {
                            Some(self.parse_type()?)
                        };
                        self.expect(TokenType::RightParen)?;
                        x = self.alloc(Node::TypeAssert { x, ty }, position);
                    } else {
                        let sel = self.expect(TokenType::Identifier)?.value;
                        x = self.alloc(Node::Selector { x, sel }, position);
                    }
                }
                TokenType::LeftBracket => {
                    self.advance();
                    x = self.parse_index_or_slice(x, position)?;
                }
                TokenType::LeftParen => {
                    self.advance();
                    x = self.parse_call(x, position)?;
                }
                TokenType::LeftBrace => {
                    let allowed = match self.tree.node(x) {
                        Node::Ident { .. } | Node::Selector { .. } => !self.no_composite,
                        Node::ArrayType { .. } | Node::MapType { .. } | Node::StructType { .. } => true,
                        _ => false,
                    };
                    if !allowed {
                        break;
                    }
                    x = self.parse_composite(Some(x), position)?;
                }
                _ => break,
            }
        }
        Ok(x)
    }

    fn parse_operand(&mut self) -> PResult<NodeId> {
        let position = self.position();
        let kind = match self.peek() {
            TokenType::Identifier => return self.parse_ident(),
            TokenType::IntLiteral => LitKind::Int,
            TokenType::FloatLiteral => LitKind::Float,
            TokenType::ImagLiteral => LitKind::Imag,
            TokenType::CharLiteral => LitKind::Char,
            TokenType::StringLiteral | TokenType::RawStringLiteral => LitKind::String,
            TokenType::LeftParen => {
                self.advance();
                let x = self.with_composites(|p| p.parse_expr())?;
                self.expect(TokenType::RightParen)?;
                return Ok(self.alloc(Node::Paren { x }, position));
            }
            TokenType::Func => {
                self.advance();
                let ty = self.parse_signature(position)?;
                if !self.at(TokenType::LeftBrace) {
                    return Ok(ty);
                }
                let body = self.with_composites(|p| p.parse_block())?;
                return Ok(self.alloc(Node::FuncLit { ty, body }, position));
            }
            TokenType::LeftBracket
            | TokenType::Map
            | TokenType::Chan
            | TokenType::Struct
            | TokenType::Interface
            | TokenType::Arrow => return self.parse_type(),
            _ => return Err(self.unexpected("expression")),
        };
        let value = self.advance().value;
        Ok(self.alloc(Node::BasicLit { kind, value }, position))
    }

    /// Called after `[`.
    fn parse_index_or_slice(&mut self, x: NodeId, position: Position) -> PResult<NodeId> {
        self.with_composites(|p| {
            let low = if p.at(TokenType::Colon) { None } else { Some(p.parse_expr()?) };
            if p.eat(TokenType::RightBracket) {
                let index = match low {
                    Some(index) => index,
                    None => return Err(p.unexpected("index")),
                };
                return Ok(p.alloc(Node::Index { x, index }, position));
            }
            p.expect(TokenType::Colon)?;
            let high = match p.peek() {
                TokenType::RightBracket | TokenType::Colon => None,
                _ => Some(p.parse_expr()?),
            };
            let mut max = None;
            let slice3 = p.eat(TokenType::Colon);
            if slice3 {
                max = Some(p.parse_expr()?);
            }
            p.expect(TokenType::RightBracket)?;
            Ok(p.alloc(Node::Slice { x, low, high, max, slice3 }, position))
        })
    }

    /// Called after `(`.
    fn parse_call(&mut self, fun: NodeId, position: Position) -> PResult<NodeId> {
        self.with_composites(|p| {
            let mut args = Vec::new();
            let mut ellipsis = false;
            while !p.at(TokenType::RightParen) {
                args.push(p.parse_expr()?);
                if p.eat(TokenType::Ellipsis) {
                    ellipsis = true;
                }
                if !p.eat(TokenType::Comma) {
                    break;
                }
            }
            p.expect(TokenType::RightParen)?;
            Ok(p.alloc(Node::Call { fun, args, ellipsis }, position))
        })
    }

    fn parse_composite(&mut self, ty: Option<NodeId>, position: Position) -> PResult<NodeId> {
        self.expect(TokenType::LeftBrace)?;
        self.with_composites(|p| {
            let mut elts = Vec::new();
            while !p.at(TokenType::RightBrace) {
                let element_position = p.position();
                let key = p.parse_element()?;
                let elt = if p.eat(TokenType::Colon) {
                    let value = p.parse_element()?;
                    p.alloc(Node::KeyValue { key, value }, element_position)
                } else {
                    key
                };
                elts.push(elt);
                if !p.eat(TokenType::Comma) {
                    break;
                }
            }
            p.expect(TokenType::RightBrace)?;
            Ok(p.alloc(Node::Composite { ty, elts }, position))
        })
    }

    /// Composite elements may elide their type: `[]T{{1}, {2}}`.
    fn parse_element(&mut self) -> PResult<NodeId> {
        if self.at(TokenType::LeftBrace) {
            let position = self.position();
            return self.parse_composite(None, position);
        }
        self.parse_expr()
    }

    // ---- helpers -----------------------------------------------------------

    fn with_composites<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let saved = std::mem::replace(&mut self.no_composite, false);
        let result = f(self);
        self.no_composite = saved;
        result
    }

    fn alloc(&mut self, node: Node, position: Position) -> NodeId {
        self.tree.alloc(node, position)
    }

    fn current(&self) -> &Token {
        // The token stream always ends with Eof
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.current_index.min(last)]
    }

    fn peek(&self) -> TokenType {
        self.current().token_type
    }

    fn peek_at(&self, offset: usize) -> TokenType {
        self.tokens
            .get(self.current_index + offset)
            .map(|t| t.token_type)
            .unwrap_or(TokenType::Eof)
    }

    fn position(&self) -> Position {
        self.current().position
    }

    fn at(&self, token_type: TokenType) -> bool {
        self.peek() == token_type
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.current_index < self.tokens.len() {
            self.current_index += 1;
        }
        token
    }

    fn eat(&mut self, token_type: TokenType) -> bool {
        if self.at(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token_type: TokenType) -> PResult<Token> {
        if self.at(token_type) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(token_type.as_str()))
        }
    }

    /// A semicolon may be omitted before a closing `)` or `}`.
    fn expect_semi(&mut self, closing: TokenType) -> PResult<()> {
        if self.eat(TokenType::Semicolon) || self.at(closing) || self.at(TokenType::Eof) {
            Ok(())
        } else {
            Err(self.unexpected(";"))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.current();
        let found = match token.token_type {
            TokenType::Semicolon if token.value == "\n" => "newline".to_string(),
            TokenType::Identifier
            | TokenType::IntLiteral
            | TokenType::FloatLiteral
            | TokenType::StringLiteral => token.value.clone(),
            other => other.as_str().to_string(),
        };
        ParseError::Unexpected {
            expected: expected.to_string(),
            found,
            position: token.position,
        }
    }

    fn unsupported(&self, construct: &str) -> ParseError {
        ParseError::Unsupported {
            construct: construct.to_string(),
            position: self.position(),
        }
    }
}

fn starts_type(token: TokenType) -> bool {
    matches!(
        token,
        TokenType::Identifier
            | TokenType::Star
            | TokenType::LeftBracket
            | TokenType::Map
            | TokenType::Chan
            | TokenType::Arrow
            | TokenType::Func
            | TokenType::Struct
            | TokenType::Interface
    )
}

fn binary_op(token: TokenType) -> Option<BinaryOp> {
    Some(match token {
        TokenType::OrOr => BinaryOp::LogOr,
        TokenType::AndAnd => BinaryOp::LogAnd,
        TokenType::EqEq => BinaryOp::Eq,
        TokenType::NotEq => BinaryOp::Ne,
        TokenType::Less => BinaryOp::Lt,
        TokenType::LessEq => BinaryOp::Le,
        TokenType::Greater => BinaryOp::Gt,
        TokenType::GreaterEq => BinaryOp::Ge,
        TokenType::Plus => BinaryOp::Add,
        TokenType::Minus => BinaryOp::Sub,
        TokenType::Pipe => BinaryOp::Or,
        TokenType::Caret => BinaryOp::Xor,
        TokenType::Star => BinaryOp::Mul,
        TokenType::Slash => BinaryOp::Div,
        TokenType::Percent => BinaryOp::Rem,
        TokenType::Shl => BinaryOp::Shl,
        TokenType::Shr => BinaryOp::Shr,
        TokenType::Amp => BinaryOp::And,
        TokenType::AndNot => BinaryOp::AndNot,
        _ => return None,
    })
}

fn compound_op(token: TokenType) -> Option<BinaryOp> {
    Some(match token {
        TokenType::PlusAssign => BinaryOp::Add,
        TokenType::MinusAssign => BinaryOp::Sub,
        TokenType::StarAssign => BinaryOp::Mul,
        TokenType::SlashAssign => BinaryOp::Div,
        TokenType::PercentAssign => BinaryOp::Rem,
        TokenType::AmpAssign => BinaryOp::And,
        TokenType::PipeAssign => BinaryOp::Or,
        TokenType::CaretAssign => BinaryOp::Xor,
        TokenType::ShlAssign => BinaryOp::Shl,
        TokenType::ShrAssign => BinaryOp::Shr,
        TokenType::AndNotAssign => BinaryOp::AndNot,
        _ => return None,
    })
}

fn unquote(literal: &str) -> String {
    if literal.len() >= 2 {
        literal[1..literal.len() - 1].to_string()
    } else {
        literal.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Tree {
        SyntaxAnalyzer::parse(src).expect("parse")
    }

    fn main_body(tree: &Tree) -> Vec<NodeId> {
        let Node::File { decls, .. } = tree.node(tree.root()) else {
            panic!("root is not a file");
        };
        let Node::FuncDecl { body: Some(body), .. } = tree.node(decls[decls.len() - 1]) else {
            panic!("last decl is not a func with body");
        };
        let Node::Block { stmts } = tree.node(*body) else {
            panic!("body is not a block");
        };
        stmts.clone()
    }

    #[test]
    fn test_parse_file_header() {
        let tree = parse("package main\n\nimport (\n\t\"fmt\"\n\tstr \"strings\"\n)\n\nfunc main() {}\n");
        let Node::File { package, imports, decls } = tree.node(tree.root()) else {
            panic!("root is not a file");
        };
        assert_eq!(package, "main");
        assert_eq!(imports.len(), 2);
        assert_eq!(decls.len(), 1);
        assert_eq!(
            tree.node(imports[1]),
            &Node::Import { alias: Some("str".to_string()), path: "strings".to_string() }
        );
    }

    #[test]
    fn test_parameter_grouping() {
        let tree = parse("package p\n\nfunc f(a, b int, c string) (int, error) { return 0, nil }\n");
        let Node::File { decls, .. } = tree.node(tree.root()) else { unreachable!() };
        let Node::FuncDecl { ty, .. } = tree.node(decls[0]) else { unreachable!() };
        let Node::FuncType { params, results } = tree.node(*ty) else { unreachable!() };
        assert_eq!(params.len(), 2);
        let Node::Field { names, .. } = tree.node(params[0]) else { unreachable!() };
        assert_eq!(names.len(), 2);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_composite_not_allowed_in_if_header() {
        let tree = parse("package p\n\nfunc f() {\n\tif a == b {\n\t\tc()\n\t}\n}\n");
        let stmts = main_body(&tree);
        let Node::If { cond, .. } = tree.node(stmts[0]) else {
            panic!("expected if");
        };
        assert!(matches!(tree.node(*cond), Node::Binary { op: BinaryOp::Eq, .. }));
    }

    #[test]
    fn test_composite_in_parens_inside_header() {
        let tree = parse("package p\n\nfunc f() {\n\tif (T{}) == x {\n\t}\n}\n");
        assert_eq!(main_body(&tree).len(), 1);
    }

    #[test]
    fn test_if_with_init_and_else_if() {
        let tree = parse(
            "package p\n\nfunc f() {\n\tif x := g(); x > 0 {\n\t} else if y {\n\t} else {\n\t}\n}\n",
        );
        let stmts = main_body(&tree);
        let Node::If { init, els, .. } = tree.node(stmts[0]) else {
            panic!("expected if");
        };
        assert!(init.is_some());
        let Some(els) = els else { panic!("missing else") };
        assert!(matches!(tree.node(*els), Node::If { els: Some(_), .. }));
    }

    #[test]
    fn test_for_forms() {
        let tree = parse(
            "package p\n\nfunc f() {\n\tfor {\n\t}\n\tfor x < 3 {\n\t}\n\tfor i := 0; i < 3; i++ {\n\t}\n\tfor k, v := range m {\n\t}\n\tfor range ch {\n\t}\n}\n",
        );
        let stmts = main_body(&tree);
        assert!(matches!(tree.node(stmts[0]), Node::For { cond: None, .. }));
        assert!(matches!(tree.node(stmts[1]), Node::For { cond: Some(_), init: None, .. }));
        assert!(matches!(tree.node(stmts[2]), Node::For { init: Some(_), post: Some(_), .. }));
        assert!(matches!(
            tree.node(stmts[3]),
            Node::Range { key: Some(_), value: Some(_), define: true, .. }
        ));
        assert!(matches!(tree.node(stmts[4]), Node::Range { key: None, .. }));
    }

    #[test]
    fn test_binary_precedence() {
        let tree = parse("package p\n\nvar x = a + b*c\n");
        let Node::File { decls, .. } = tree.node(tree.root()) else { unreachable!() };
        let Node::Decl { specs, .. } = tree.node(decls[0]) else { unreachable!() };
        let Node::ValueSpec { values, .. } = tree.node(specs[0]) else { unreachable!() };
        let Node::Binary { op, y, .. } = tree.node(values[0]) else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(tree.node(*y), Node::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_slices_and_composites() {
        let tree = parse(
            "package p\n\nfunc f() {\n\t_ = a[1:2:3]\n\t_ = b[:]\n\t_ = []int{1, 2}\n\t_ = map[string]T{\"a\": {1}}\n}\n",
        );
        let stmts = main_body(&tree);
        let Node::Assign { rhs, .. } = tree.node(stmts[0]) else { unreachable!() };
        assert!(matches!(tree.node(rhs[0]), Node::Slice { slice3: true, .. }));
        let Node::Assign { rhs, .. } = tree.node(stmts[1]) else { unreachable!() };
        assert!(matches!(tree.node(rhs[0]), Node::Slice { low: None, high: None, .. }));
        let Node::Assign { rhs, .. } = tree.node(stmts[3]) else { unreachable!() };
        let Node::Composite { elts, .. } = tree.node(rhs[0]) else { unreachable!() };
        assert!(matches!(tree.node(elts[0]), Node::KeyValue { .. }));
    }

    #[test]
    fn test_go_defer_send() {
        let tree = parse("package p\n\nfunc f() {\n\tgo g()\n\tdefer h(1)\n\tch <- 1\n\tv := <-ch\n}\n");
        let stmts = main_body(&tree);
        assert!(matches!(tree.node(stmts[0]), Node::Go { .. }));
        assert!(matches!(tree.node(stmts[1]), Node::Defer { .. }));
        assert!(matches!(tree.node(stmts[2]), Node::Send { .. }));
        let Node::Assign { rhs, .. } = tree.node(stmts[3]) else { unreachable!() };
        assert!(matches!(tree.node(rhs[0]), Node::Unary { op: UnaryOp::Recv, .. }));
    }

    #[test]
    fn test_types() {
        let tree = parse(
            "package p\n\ntype T struct {\n\tA, B int `json:\"a\"`\n\t*Embedded\n}\n\ntype I interface {\n\tM(x int) error\n}\n\nvar c <-chan map[string][]*T\n",
        );
        let Node::File { decls, .. } = tree.node(tree.root()) else { unreachable!() };
        assert_eq!(decls.len(), 3);
    }

    #[test]
    fn test_expression_switch() {
        let tree = parse(
            "package p\n\nfunc f() {\n\tswitch x := g(); x {\n\tcase 1, 2:\n\t\th()\n\t\tfallthrough\n\tdefault:\n\t}\n\tswitch {\n\t}\n}\n",
        );
        let stmts = main_body(&tree);
        let Node::Switch { init: Some(_), tag: Some(_), clauses } = tree.node(stmts[0]) else {
            panic!("expected switch with init and tag");
        };
        assert_eq!(clauses.len(), 2);
        let Node::CaseClause { list, default: false, body } = tree.node(clauses[0]) else {
            panic!("expected case clause");
        };
        assert_eq!(list.len(), 2);
        let Node::Block { stmts: body } = tree.node(*body) else { panic!("body is not a block") };
        assert!(matches!(
            tree.node(body[1]),
            Node::Branch { kind: BranchKind::Fallthrough, label: None }
        ));
        assert!(matches!(tree.node(clauses[1]), Node::CaseClause { default: true, .. }));
        assert!(matches!(tree.node(stmts[1]), Node::Switch { init: None, tag: None, .. }));
    }

    #[test]
    fn test_type_switch() {
        let tree = parse(
            "package p\n\nfunc f(x any) {\n\tswitch v := x.(type) {\n\tcase int, *T:\n\t\t_ = v\n\tcase nil:\n\t}\n\tswitch x.(type) {\n\t}\n}\n",
        );
        let stmts = main_body(&tree);
        let Node::TypeSwitch { bind: Some(bind), guard, clauses, .. } = tree.node(stmts[0]) else {
            panic!("expected type switch");
        };
        assert_eq!(tree.node(*bind).ident_name(), Some("v"));
        assert!(matches!(tree.node(*guard), Node::TypeAssert { ty: None, .. }));
        let Node::CaseClause { list, .. } = tree.node(clauses[0]) else { unreachable!() };
        assert!(matches!(tree.node(list[1]), Node::Star { .. }));
        assert!(matches!(tree.node(stmts[1]), Node::TypeSwitch { bind: None, .. }));
    }

    #[test]
    fn test_type_guard_outside_switch() {
        let err = SyntaxAnalyzer::parse("package p\n\nfunc f() {\n\tv := x.(type)\n}\n").unwrap_err();
        assert!(err.to_string().contains("outside a type switch"), "{err}");
    }

    #[test]
    fn test_select_clauses() {
        let tree = parse(
            "package p\n\nfunc f() {\n\tselect {\n\tcase v := <-in:\n\t\t_ = v\n\tcase out <- 1:\n\tcase <-done:\n\t\treturn\n\tdefault:\n\t}\n}\n",
        );
        let stmts = main_body(&tree);
        let Node::Select { clauses } = tree.node(stmts[0]) else { panic!("expected select") };
        let comms: Vec<_> = clauses
            .iter()
            .map(|c| match tree.node(*c) {
                Node::CommClause { comm, .. } => comm.map(|id| tree.node(id).kind_name()),
                other => panic!("unexpected {}", other.kind_name()),
            })
            .collect();
        assert_eq!(comms, vec![Some("AssignStmt"), Some("SendStmt"), Some("ExprStmt"), None]);
    }

    #[test]
    fn test_labels_and_branches() {
        let tree = parse(
            "package p\n\nfunc f() {\nouter:\n\tfor {\n\t\tbreak outer\n\t}\n\tgoto end\nend:\n}\n",
        );
        let stmts = main_body(&tree);
        let Node::Labeled { label, stmt: Some(stmt) } = tree.node(stmts[0]) else {
            panic!("expected labeled for");
        };
        assert_eq!(label, "outer");
        assert!(matches!(tree.node(*stmt), Node::For { .. }));
        assert!(matches!(
            tree.node(stmts[1]),
            Node::Branch { kind: BranchKind::Goto, label: Some(l) } if l == "end"
        ));
        assert!(matches!(tree.node(stmts[2]), Node::Labeled { stmt: None, .. }));
    }

    #[test]
    fn test_unsupported_type_parameters() {
        let err = SyntaxAnalyzer::parse("package p\n\nfunc f[T any](x T) {\n}\n").unwrap_err();
        assert!(matches!(err, ParseError::Unsupported { .. }), "{err}");
    }

    #[test]
    fn test_error_position() {
        let err = SyntaxAnalyzer::parse("package p\n\nfunc f() {\n\tx := )\n}\n").unwrap_err();
        let ParseError::Unexpected { position, .. } = err else {
            panic!("unexpected error kind: {err}");
        };
        assert_eq!(position.line, 4);
    }
}
