//! A compact recursive-descent parser over [`crate::lexer`]'s tokens,
//! producing a [`crate::tree::ParsedTree`]. It covers the surface syntax
//! `ft-engine`'s node-kind vocabulary can express: declarations, control
//! flow, classes (methods only — the tree has no class-field node),
//! expressions through arrow functions and template literals, and
//! destructuring patterns (object/array, nested, with defaults and rest) in
//! both `VarDecl` names and `Param` names. Multi-declarator `var` statements
//! aren't representable in the shared `NodeKind`, so later declarators in
//! `let a = 1, b = 2;` are parsed (to keep the token stream in sync) and
//! then discarded.

use ft_common::tree::{AssignOp, BinaryOp, DeclKind, LogicalOp, NodeKind, UnaryOp};
use ft_common::{NodeId, Span, Tree};

use crate::lexer::{tokenize, TokKind, Token};
use crate::tree::ParsedTree;

pub fn parse(source: &str) -> (ParsedTree, NodeId) {
    let tokens = tokenize(source);
    let mut parser = Parser {
        tokens,
        pos: 0,
        tree: ParsedTree::new(),
    };
    let program = parser.parse_program();
    (parser.tree, program)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    tree: ParsedTree,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_n(&self, n: usize) -> &Token {
        self.tokens.get(self.pos + n).unwrap_or_else(|| self.tokens.last().unwrap())
    }

    fn is_eof(&self) -> bool {
        matches!(self.peek().kind, TokKind::Eof)
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if !matches!(tok.kind, TokKind::Eof) {
            self.pos += 1;
        }
        tok
    }

    fn is_punct(&self, s: &'static str) -> bool {
        self.peek().kind == TokKind::Punct(s)
    }

    fn is_ident(&self, s: &str) -> bool {
        matches!(&self.peek().kind, TokKind::Ident(n) if n == s)
    }

    fn eat_punct(&mut self, s: &'static str) -> bool {
        if self.is_punct(s) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, s: &'static str) {
        self.eat_punct(s);
    }

    fn eat_ident_kw(&mut self, s: &str) -> bool {
        if self.is_ident(s) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn prev_end(&self) -> u32 {
        self.tokens[self.pos.saturating_sub(1)].end
    }

    fn can_start_expression(&self) -> bool {
        !matches!(
            &self.peek().kind,
            TokKind::Punct(";") | TokKind::Punct("}") | TokKind::Punct(")") | TokKind::Eof
        )
    }

    fn is_paren_arrow_at(&self, open_idx: usize) -> bool {
        let mut depth = 0i32;
        let mut i = open_idx;
        loop {
            match self.tokens.get(i) {
                Some(t) if t.kind == TokKind::Punct("(") => depth += 1,
                Some(t) if t.kind == TokKind::Punct(")") => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Some(t) if t.kind == TokKind::Eof => return false,
                Some(_) => {}
                None => return false,
            }
            i += 1;
        }
        matches!(self.tokens.get(i + 1), Some(t) if t.kind == TokKind::Punct("=>"))
    }

    // ---- program / statements ----

    fn parse_program(&mut self) -> NodeId {
        let start = self.peek().start;
        let mut stmts = Vec::new();
        while !self.is_eof() {
            if self.eat_punct(";") {
                continue;
            }
            stmts.push(self.parse_statement());
        }
        self.tree.push(NodeKind::Program(stmts), Span::new(start, self.peek().end))
    }

    fn parse_statement(&mut self) -> NodeId {
        if self.is_ident("var") || self.is_ident("let") || self.is_ident("const") {
            return self.parse_var_decl_stmt();
        }
        if self.is_ident("function") {
            return self.parse_function_decl(false);
        }
        if self.is_ident("async") && matches!(&self.peek_n(1).kind, TokKind::Ident(s) if s == "function") {
            self.bump();
            return self.parse_function_decl(true);
        }
        if self.is_ident("class") {
            return self.parse_class_decl();
        }
        if self.is_punct("{") {
            return self.parse_block();
        }
        if self.is_ident("if") {
            return self.parse_if();
        }
        if self.is_ident("while") {
            return self.parse_while();
        }
        if self.is_ident("do") {
            return self.parse_do_while();
        }
        if self.is_ident("for") {
            return self.parse_for();
        }
        if self.is_ident("return") {
            return self.parse_return();
        }
        if self.is_ident("throw") {
            return self.parse_throw();
        }
        if self.is_ident("break") {
            return self.parse_break();
        }
        if self.is_ident("continue") {
            return self.parse_continue();
        }
        if self.is_ident("try") {
            return self.parse_try();
        }
        if self.is_ident("switch") {
            return self.parse_switch();
        }
        if let TokKind::Ident(name) = self.peek().kind.clone() {
            if matches!(&self.peek_n(1).kind, TokKind::Punct(":")) && !is_reserved(&name) {
                let start = self.peek().start;
                let label = self.parse_binding_identifier();
                self.bump(); // ':'
                let body = self.parse_statement();
                let end = self.tree.span(body).end;
                return self.tree.push(NodeKind::Labeled { label, body }, Span::new(start, end));
            }
        }
        self.parse_expr_stmt()
    }

    fn parse_expr_stmt(&mut self) -> NodeId {
        let start = self.peek().start;
        let expr = self.parse_expression();
        self.eat_punct(";");
        let end = self.tree.span(expr).end;
        self.tree.push(NodeKind::ExprStmt(expr), Span::new(start, end))
    }

    fn parse_block(&mut self) -> NodeId {
        let start = self.peek().start;
        self.expect_punct("{");
        let mut stmts = Vec::new();
        while !self.is_punct("}") && !self.is_eof() {
            if self.eat_punct(";") {
                continue;
            }
            stmts.push(self.parse_statement());
        }
        let end = self.peek().end;
        self.eat_punct("}");
        self.tree.push(NodeKind::Block(stmts), Span::new(start, end))
    }

    fn parse_binding_identifier(&mut self) -> NodeId {
        let tok = self.bump();
        let name = match tok.kind {
            TokKind::Ident(s) => s,
            _ => String::new(),
        };
        self.tree.push(NodeKind::Identifier(name), Span::new(tok.start, tok.end))
    }

    /// A `VarDecl`/`Param` name position: a plain identifier, or a
    /// destructuring pattern (`{ a, b: [c] }`, `[a, ...rest]`).
    fn parse_binding_target(&mut self) -> NodeId {
        if self.is_punct("{") {
            self.parse_object_pattern()
        } else if self.is_punct("[") {
            self.parse_array_pattern()
        } else {
            self.parse_binding_identifier()
        }
    }

    /// A binding target that may carry its own default (`a = 1` inside a
    /// pattern, as opposed to the `VarDecl`/`Param`-level initializer).
    fn parse_binding_target_with_default(&mut self) -> NodeId {
        let target = self.parse_binding_target();
        if self.eat_punct("=") {
            let start = self.tree.span(target).start;
            let default = self.parse_assignment();
            let end = self.tree.span(default).end;
            self.tree.push(NodeKind::AssignmentPattern { target, default }, Span::new(start, end))
        } else {
            target
        }
    }

    fn parse_object_pattern(&mut self) -> NodeId {
        let start = self.peek().start;
        self.expect_punct("{");
        let mut properties = Vec::new();
        let mut rest = None;
        while !self.is_punct("}") && !self.is_eof() {
            if self.eat_punct("...") {
                rest = Some(self.parse_binding_identifier());
                break;
            }
            let key = self.parse_binding_identifier();
            let value = if self.eat_punct(":") {
                self.parse_binding_target_with_default()
            } else if self.is_punct("=") {
                self.bump(); // '='
                let default = self.parse_assignment();
                let span = Span::new(self.tree.span(key).start, self.tree.span(default).end);
                self.tree.push(NodeKind::AssignmentPattern { target: key, default }, span)
            } else {
                key // shorthand: `{ a }`
            };
            properties.push((key, value));
            if !self.eat_punct(",") {
                break;
            }
        }
        let end = self.peek().end;
        self.eat_punct("}");
        self.tree.push(NodeKind::ObjectPattern { properties, rest }, Span::new(start, end))
    }

    fn parse_array_pattern(&mut self) -> NodeId {
        let start = self.peek().start;
        self.expect_punct("[");
        let mut elements = Vec::new();
        let mut rest = None;
        while !self.is_punct("]") && !self.is_eof() {
            if self.is_punct(",") {
                elements.push(None); // elision: `[, b]`
                self.bump();
                continue;
            }
            if self.eat_punct("...") {
                rest = Some(self.parse_binding_target());
                break;
            }
            elements.push(Some(self.parse_binding_target_with_default()));
            if !self.eat_punct(",") {
                break;
            }
        }
        let end = self.peek().end;
        self.eat_punct("]");
        self.tree.push(NodeKind::ArrayPattern { elements, rest }, Span::new(start, end))
    }

    fn parse_var_decl_stmt(&mut self) -> NodeId {
        let start = self.peek().start;
        let kind = self.parse_decl_kind();
        let name = self.parse_binding_target();
        let init = if self.eat_punct("=") { Some(self.parse_assignment()) } else { None };
        while self.eat_punct(",") {
            let _ = self.parse_binding_target();
            if self.eat_punct("=") {
                let _ = self.parse_assignment();
            }
        }
        self.eat_punct(";");
        let end = self.prev_end();
        self.tree.push(NodeKind::VarDecl { kind, name, init }, Span::new(start, end))
    }

    fn parse_decl_kind(&mut self) -> DeclKind {
        let tok = self.bump();
        match &tok.kind {
            TokKind::Ident(s) if s == "var" => DeclKind::Var,
            TokKind::Ident(s) if s == "let" => DeclKind::Let,
            _ => DeclKind::Const,
        }
    }

    fn parse_params(&mut self) -> Vec<NodeId> {
        self.expect_punct("(");
        let mut params = Vec::new();
        while !self.is_punct(")") && !self.is_eof() {
            let start = self.peek().start;
            let rest = self.eat_punct("...");
            let name = self.parse_binding_target();
            let default = if self.eat_punct("=") { Some(self.parse_assignment()) } else { None };
            let end = default.map(|d| self.tree.span(d).end).unwrap_or_else(|| self.tree.span(name).end);
            params.push(self.tree.push(
                NodeKind::Param { name, default, rest, type_annotation: None },
                Span::new(start, end),
            ));
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(")");
        params
    }

    fn parse_function_decl(&mut self, is_async: bool) -> NodeId {
        let start = self.peek().start;
        self.bump(); // 'function'
        let is_generator = self.eat_punct("*");
        let name = if !self.is_punct("(") { Some(self.parse_binding_identifier()) } else { None };
        let params = self.parse_params();
        let body = self.parse_block();
        let end = self.tree.span(body).end;
        self.tree.push(
            NodeKind::FunctionDecl { name, params, body, is_async, is_generator },
            Span::new(start, end),
        )
    }

    fn parse_function_expr(&mut self, is_async: bool) -> NodeId {
        let start = self.peek().start;
        self.bump(); // 'function'
        let is_generator = self.eat_punct("*");
        if !self.is_punct("(") {
            self.bump(); // optional name; `NodeKind::FunctionExpr` carries none
        }
        let params = self.parse_params();
        let body = self.parse_block();
        let end = self.tree.span(body).end;
        self.tree.push(NodeKind::FunctionExpr { params, body, is_async, is_generator }, Span::new(start, end))
    }

    fn parse_class_decl(&mut self) -> NodeId {
        let start = self.peek().start;
        self.bump(); // 'class'
        let name = if !self.is_ident("extends") && !self.is_punct("{") {
            Some(self.parse_binding_identifier())
        } else {
            None
        };
        let superclass = if self.eat_ident_kw("extends") { Some(self.parse_call_member()) } else { None };
        self.expect_punct("{");
        let mut members = Vec::new();
        while !self.is_punct("}") && !self.is_eof() {
            if self.eat_punct(";") {
                continue;
            }
            self.eat_ident_kw("static");
            let is_async = self.eat_ident_kw("async");
            let is_generator = self.eat_punct("*");
            if (self.is_ident("get") || self.is_ident("set")) && !matches!(&self.peek_n(1).kind, TokKind::Punct("(")) {
                self.bump();
            }
            let mstart = self.peek().start;
            let mname = self.parse_binding_identifier();
            if self.is_punct("(") {
                let params = self.parse_params();
                let body = self.parse_block();
                let end = self.tree.span(body).end;
                members.push(self.tree.push(
                    NodeKind::FunctionDecl { name: Some(mname), params, body, is_async, is_generator },
                    Span::new(mstart, end),
                ));
            } else {
                // A class field (`x;` or `x = expr;`): no counterpart in
                // `NodeKind`, so parse it for token-stream sync and drop it.
                if self.eat_punct("=") {
                    let _ = self.parse_assignment();
                }
                self.eat_punct(";");
            }
        }
        let end = self.peek().end;
        self.eat_punct("}");
        self.tree.push(NodeKind::ClassDecl { name, superclass, members }, Span::new(start, end))
    }

    fn parse_if(&mut self) -> NodeId {
        let start = self.peek().start;
        self.bump();
        self.expect_punct("(");
        let condition = self.parse_expression();
        self.expect_punct(")");
        let then_branch = self.parse_statement();
        let else_branch = if self.eat_ident_kw("else") { Some(self.parse_statement()) } else { None };
        let end = else_branch.map(|e| self.tree.span(e).end).unwrap_or_else(|| self.tree.span(then_branch).end);
        self.tree.push(NodeKind::If { condition, then_branch, else_branch }, Span::new(start, end))
    }

    fn parse_while(&mut self) -> NodeId {
        let start = self.peek().start;
        self.bump();
        self.expect_punct("(");
        let condition = self.parse_expression();
        self.expect_punct(")");
        let body = self.parse_statement();
        let end = self.tree.span(body).end;
        self.tree.push(NodeKind::While { condition, body }, Span::new(start, end))
    }

    fn parse_do_while(&mut self) -> NodeId {
        let start = self.peek().start;
        self.bump();
        let body = self.parse_statement();
        self.eat_ident_kw("while");
        self.expect_punct("(");
        let condition = self.parse_expression();
        self.expect_punct(")");
        self.eat_punct(";");
        let end = self.prev_end();
        self.tree.push(NodeKind::DoWhile { body, condition }, Span::new(start, end))
    }

    fn parse_for(&mut self) -> NodeId {
        let start = self.peek().start;
        self.bump(); // 'for'
        self.expect_punct("(");

        let decl_kind = if self.is_ident("var") {
            Some(DeclKind::Var)
        } else if self.is_ident("let") {
            Some(DeclKind::Let)
        } else if self.is_ident("const") {
            Some(DeclKind::Const)
        } else {
            None
        };

        if let Some(kind) = decl_kind {
            self.bump();
            let decl_name = self.parse_binding_identifier();
            if self.eat_ident_kw("of") {
                let iterable = self.parse_assignment();
                self.expect_punct(")");
                let body = self.parse_statement();
                let end = self.tree.span(body).end;
                return self.tree.push(NodeKind::ForOf { decl_name, iterable, body }, Span::new(start, end));
            }
            if self.eat_ident_kw("in") {
                let object = self.parse_assignment();
                self.expect_punct(")");
                let body = self.parse_statement();
                let end = self.tree.span(body).end;
                return self.tree.push(NodeKind::ForIn { decl_name, object, body }, Span::new(start, end));
            }
            let init_expr = if self.eat_punct("=") { Some(self.parse_assignment()) } else { None };
            while self.eat_punct(",") {
                let _ = self.parse_binding_identifier();
                if self.eat_punct("=") {
                    let _ = self.parse_assignment();
                }
            }
            let decl_span = Span::new(self.tree.span(decl_name).start, self.peek().start);
            let init_node = self.tree.push(NodeKind::VarDecl { kind, name: decl_name, init: init_expr }, decl_span);
            self.expect_punct(";");
            let condition = if !self.is_punct(";") { Some(self.parse_expression()) } else { None };
            self.expect_punct(";");
            let update = if !self.is_punct(")") { Some(self.parse_expression()) } else { None };
            self.expect_punct(")");
            let body = self.parse_statement();
            let end = self.tree.span(body).end;
            return self.tree.push(
                NodeKind::For { init: Some(init_node), condition, update, body },
                Span::new(start, end),
            );
        }

        let init = if !self.is_punct(";") { Some(self.parse_expression()) } else { None };
        self.expect_punct(";");
        let condition = if !self.is_punct(";") { Some(self.parse_expression()) } else { None };
        self.expect_punct(";");
        let update = if !self.is_punct(")") { Some(self.parse_expression()) } else { None };
        self.expect_punct(")");
        let body = self.parse_statement();
        let end = self.tree.span(body).end;
        self.tree.push(NodeKind::For { init, condition, update, body }, Span::new(start, end))
    }

    fn parse_return(&mut self) -> NodeId {
        let start = self.peek().start;
        self.bump();
        let argument = if self.can_start_expression() { Some(self.parse_expression()) } else { None };
        self.eat_punct(";");
        let end = argument.map(|a| self.tree.span(a).end).unwrap_or_else(|| self.prev_end());
        self.tree.push(NodeKind::Return(argument), Span::new(start, end))
    }

    fn parse_throw(&mut self) -> NodeId {
        let start = self.peek().start;
        self.bump();
        let argument = self.parse_expression();
        self.eat_punct(";");
        let end = self.tree.span(argument).end;
        self.tree.push(NodeKind::Throw(argument), Span::new(start, end))
    }

    fn parse_break(&mut self) -> NodeId {
        let start = self.peek().start;
        self.bump();
        let label = if matches!(&self.peek().kind, TokKind::Ident(_)) && !self.is_punct(";") {
            Some(self.parse_binding_identifier())
        } else {
            None
        };
        self.eat_punct(";");
        let end = label.map(|l| self.tree.span(l).end).unwrap_or_else(|| self.prev_end());
        self.tree.push(NodeKind::Break(label), Span::new(start, end))
    }

    fn parse_continue(&mut self) -> NodeId {
        let start = self.peek().start;
        self.bump();
        let label = if matches!(&self.peek().kind, TokKind::Ident(_)) && !self.is_punct(";") {
            Some(self.parse_binding_identifier())
        } else {
            None
        };
        self.eat_punct(";");
        let end = label.map(|l| self.tree.span(l).end).unwrap_or_else(|| self.prev_end());
        self.tree.push(NodeKind::Continue(label), Span::new(start, end))
    }

    fn parse_try(&mut self) -> NodeId {
        let start = self.peek().start;
        self.bump();
        let block = self.parse_block();
        let mut catch_param = None;
        let mut catch_block = None;
        if self.eat_ident_kw("catch") {
            if self.eat_punct("(") {
                catch_param = Some(self.parse_binding_identifier());
                self.expect_punct(")");
            }
            catch_block = Some(self.parse_block());
        }
        let finally_block = if self.eat_ident_kw("finally") { Some(self.parse_block()) } else { None };
        let end = finally_block
            .or(catch_block)
            .map(|b| self.tree.span(b).end)
            .unwrap_or_else(|| self.tree.span(block).end);
        self.tree.push(
            NodeKind::TryStmt { block, catch_param, catch_block, finally_block },
            Span::new(start, end),
        )
    }

    fn parse_switch(&mut self) -> NodeId {
        let start = self.peek().start;
        self.bump();
        self.expect_punct("(");
        let discriminant = self.parse_expression();
        self.expect_punct(")");
        self.expect_punct("{");
        let mut cases = Vec::new();
        while !self.is_punct("}") && !self.is_eof() {
            let test = if self.eat_ident_kw("case") {
                let t = self.parse_expression();
                self.expect_punct(":");
                Some(t)
            } else if self.eat_ident_kw("default") {
                self.expect_punct(":");
                None
            } else {
                break;
            };
            let mut stmts = Vec::new();
            while !self.is_ident("case") && !self.is_ident("default") && !self.is_punct("}") && !self.is_eof() {
                stmts.push(self.parse_statement());
            }
            cases.push((test, stmts));
        }
        let end = self.peek().end;
        self.eat_punct("}");
        self.tree.push(NodeKind::Switch { discriminant, cases }, Span::new(start, end))
    }

    // ---- expressions ----

    fn parse_expression(&mut self) -> NodeId {
        let start = self.peek().start;
        let first = self.parse_assignment();
        if self.is_punct(",") {
            let mut exprs = vec![first];
            while self.eat_punct(",") {
                exprs.push(self.parse_assignment());
            }
            let end = self.tree.span(*exprs.last().unwrap()).end;
            return self.tree.push(NodeKind::Sequence(exprs), Span::new(start, end));
        }
        first
    }

    fn parse_assignment(&mut self) -> NodeId {
        let start = self.peek().start;
        let left = self.parse_conditional();
        let op = match &self.peek().kind {
            TokKind::Punct("=") => Some(AssignOp::Assign),
            TokKind::Punct("+=") => Some(AssignOp::AddAssign),
            TokKind::Punct("-=") => Some(AssignOp::SubAssign),
            TokKind::Punct("*=") => Some(AssignOp::MulAssign),
            TokKind::Punct("/=") => Some(AssignOp::DivAssign),
            TokKind::Punct("&&=") => Some(AssignOp::LogicalAndAssign),
            TokKind::Punct("||=") => Some(AssignOp::LogicalOrAssign),
            TokKind::Punct("??=") => Some(AssignOp::NullishAssign),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let value = self.parse_assignment();
            let end = self.tree.span(value).end;
            return self.tree.push(NodeKind::Assignment { op, target: left, value }, Span::new(start, end));
        }
        left
    }

    fn parse_conditional(&mut self) -> NodeId {
        let start = self.peek().start;
        let test = self.parse_nullish();
        if self.eat_punct("?") {
            let consequent = self.parse_assignment();
            self.expect_punct(":");
            let alternate = self.parse_assignment();
            let end = self.tree.span(alternate).end;
            return self.tree.push(NodeKind::Conditional { test, consequent, alternate }, Span::new(start, end));
        }
        test
    }

    fn mk_logical(&mut self, op: LogicalOp, left: NodeId, right: NodeId) -> NodeId {
        let span = Span::new(self.tree.span(left).start, self.tree.span(right).end);
        self.tree.push(NodeKind::Logical { op, left, right }, span)
    }

    fn mk_binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        let span = Span::new(self.tree.span(left).start, self.tree.span(right).end);
        self.tree.push(NodeKind::Binary { op, left, right }, span)
    }

    fn parse_nullish(&mut self) -> NodeId {
        let mut left = self.parse_or();
        while self.eat_punct("??") {
            let right = self.parse_or();
            left = self.mk_logical(LogicalOp::NullishCoalesce, left, right);
        }
        left
    }

    fn parse_or(&mut self) -> NodeId {
        let mut left = self.parse_and();
        while self.eat_punct("||") {
            let right = self.parse_and();
            left = self.mk_logical(LogicalOp::Or, left, right);
        }
        left
    }

    fn parse_and(&mut self) -> NodeId {
        let mut left = self.parse_bitor();
        while self.eat_punct("&&") {
            let right = self.parse_bitor();
            left = self.mk_logical(LogicalOp::And, left, right);
        }
        left
    }

    fn parse_bitor(&mut self) -> NodeId {
        let mut left = self.parse_bitxor();
        while self.eat_punct("|") {
            let right = self.parse_bitxor();
            left = self.mk_binary(BinaryOp::BitOr, left, right);
        }
        left
    }

    fn parse_bitxor(&mut self) -> NodeId {
        let mut left = self.parse_bitand();
        while self.eat_punct("^") {
            let right = self.parse_bitand();
            left = self.mk_binary(BinaryOp::BitXor, left, right);
        }
        left
    }

    fn parse_bitand(&mut self) -> NodeId {
        let mut left = self.parse_equality();
        while self.eat_punct("&") {
            let right = self.parse_equality();
            left = self.mk_binary(BinaryOp::BitAnd, left, right);
        }
        left
    }

    fn parse_equality(&mut self) -> NodeId {
        let mut left = self.parse_relational();
        loop {
            let op = if self.eat_punct("===") {
                BinaryOp::StrictEqual
            } else if self.eat_punct("!==") {
                BinaryOp::StrictNotEqual
            } else if self.eat_punct("==") {
                BinaryOp::Equal
            } else if self.eat_punct("!=") {
                BinaryOp::NotEqual
            } else {
                break;
            };
            let right = self.parse_relational();
            left = self.mk_binary(op, left, right);
        }
        left
    }

    fn parse_relational(&mut self) -> NodeId {
        let mut left = self.parse_shift();
        loop {
            let op = if self.eat_punct("<=") {
                BinaryOp::LessEqual
            } else if self.eat_punct(">=") {
                BinaryOp::GreaterEqual
            } else if self.eat_punct("<") {
                BinaryOp::Less
            } else if self.eat_punct(">") {
                BinaryOp::Greater
            } else if self.eat_ident_kw("instanceof") {
                BinaryOp::InstanceOf
            } else if self.eat_ident_kw("in") {
                BinaryOp::In
            } else {
                break;
            };
            let right = self.parse_shift();
            left = self.mk_binary(op, left, right);
        }
        left
    }

    fn parse_shift(&mut self) -> NodeId {
        let mut left = self.parse_additive();
        loop {
            let op = if self.eat_punct(">>>") {
                BinaryOp::UnsignedShiftRight
            } else if self.eat_punct("<<") {
                BinaryOp::ShiftLeft
            } else if self.eat_punct(">>") {
                BinaryOp::ShiftRight
            } else {
                break;
            };
            let right = self.parse_additive();
            left = self.mk_binary(op, left, right);
        }
        left
    }

    fn parse_additive(&mut self) -> NodeId {
        let mut left = self.parse_multiplicative();
        loop {
            let op = if self.eat_punct("+") {
                BinaryOp::Add
            } else if self.eat_punct("-") {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.parse_multiplicative();
            left = self.mk_binary(op, left, right);
        }
        left
    }

    fn parse_multiplicative(&mut self) -> NodeId {
        let mut left = self.parse_exponent();
        loop {
            let op = if self.eat_punct("*") {
                BinaryOp::Mul
            } else if self.eat_punct("/") {
                BinaryOp::Div
            } else if self.eat_punct("%") {
                BinaryOp::Mod
            } else {
                break;
            };
            let right = self.parse_exponent();
            left = self.mk_binary(op, left, right);
        }
        left
    }

    fn parse_exponent(&mut self) -> NodeId {
        let left = self.parse_unary();
        if self.eat_punct("**") {
            let right = self.parse_exponent(); // right-associative
            return self.mk_binary(BinaryOp::Exponent, left, right);
        }
        left
    }

    fn mk_unary(&mut self, op: UnaryOp, argument: NodeId, start: u32) -> NodeId {
        let end = self.tree.span(argument).end;
        self.tree.push(NodeKind::Unary { op, argument }, Span::new(start, end))
    }

    fn parse_unary(&mut self) -> NodeId {
        let start = self.peek().start;
        if self.eat_punct("!") {
            let arg = self.parse_unary();
            return self.mk_unary(UnaryOp::Not, arg, start);
        }
        if self.eat_punct("~") {
            let arg = self.parse_unary();
            return self.mk_unary(UnaryOp::BitNot, arg, start);
        }
        if self.eat_punct("+") {
            let arg = self.parse_unary();
            return self.mk_unary(UnaryOp::Plus, arg, start);
        }
        if self.eat_punct("-") {
            let arg = self.parse_unary();
            return self.mk_unary(UnaryOp::Negate, arg, start);
        }
        if self.eat_ident_kw("typeof") {
            let arg = self.parse_unary();
            return self.mk_unary(UnaryOp::Typeof, arg, start);
        }
        if self.eat_ident_kw("void") {
            let arg = self.parse_unary();
            return self.mk_unary(UnaryOp::Void, arg, start);
        }
        if self.eat_ident_kw("delete") {
            let arg = self.parse_unary();
            return self.mk_unary(UnaryOp::Delete, arg, start);
        }
        if self.eat_ident_kw("await") {
            let arg = self.parse_unary();
            let end = self.tree.span(arg).end;
            return self.tree.push(NodeKind::Await(arg), Span::new(start, end));
        }
        if self.eat_punct("++") {
            let arg = self.parse_unary();
            let end = self.tree.span(arg).end;
            return self.tree.push(
                NodeKind::Update { argument: arg, is_increment: true, is_prefix: true },
                Span::new(start, end),
            );
        }
        if self.eat_punct("--") {
            let arg = self.parse_unary();
            let end = self.tree.span(arg).end;
            return self.tree.push(
                NodeKind::Update { argument: arg, is_increment: false, is_prefix: true },
                Span::new(start, end),
            );
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> NodeId {
        let expr = self.parse_call_member();
        let start = self.tree.span(expr).start;
        if self.is_punct("++") {
            let end = self.peek().end;
            self.bump();
            return self.tree.push(
                NodeKind::Update { argument: expr, is_increment: true, is_prefix: false },
                Span::new(start, end),
            );
        }
        if self.is_punct("--") {
            let end = self.peek().end;
            self.bump();
            return self.tree.push(
                NodeKind::Update { argument: expr, is_increment: false, is_prefix: false },
                Span::new(start, end),
            );
        }
        expr
    }

    fn parse_property_name(&mut self) -> NodeId {
        self.parse_binding_identifier()
    }

    fn parse_args(&mut self) -> Vec<NodeId> {
        self.expect_punct("(");
        let mut args = Vec::new();
        while !self.is_punct(")") && !self.is_eof() {
            if self.eat_punct("...") {
                let start = self.prev_end().saturating_sub(3);
                let inner = self.parse_assignment();
                let end = self.tree.span(inner).end;
                args.push(self.tree.push(NodeKind::Spread(inner), Span::new(start, end)));
            } else {
                args.push(self.parse_assignment());
            }
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(")");
        args
    }

    fn parse_new_expr(&mut self) -> NodeId {
        let start = self.peek().start;
        self.bump(); // 'new'
        let mut callee = self.parse_primary();
        loop {
            if self.eat_punct(".") {
                let prop = self.parse_property_name();
                let end = self.tree.span(prop).end;
                callee = self.tree.push(
                    NodeKind::Member { object: callee, property: prop, computed: false, optional: false },
                    Span::new(start, end),
                );
            } else if self.eat_punct("[") {
                let prop = self.parse_expression();
                let end = self.peek().end;
                self.expect_punct("]");
                callee = self.tree.push(
                    NodeKind::Member { object: callee, property: prop, computed: true, optional: false },
                    Span::new(start, end),
                );
            } else {
                break;
            }
        }
        let args = if self.is_punct("(") { self.parse_args() } else { Vec::new() };
        let end = self.prev_end().max(self.tree.span(callee).end);
        self.tree.push(NodeKind::New { callee, args }, Span::new(start, end))
    }

    fn parse_call_member(&mut self) -> NodeId {
        let start = self.peek().start;
        let mut expr = if self.is_ident("new") { self.parse_new_expr() } else { self.parse_primary() };
        loop {
            if self.eat_punct(".") {
                let prop = self.parse_property_name();
                let end = self.tree.span(prop).end;
                expr = self.tree.push(
                    NodeKind::Member { object: expr, property: prop, computed: false, optional: false },
                    Span::new(start, end),
                );
            } else if self.eat_punct("?.") {
                if self.is_punct("(") {
                    let args = self.parse_args();
                    let end = self.prev_end();
                    expr = self.tree.push(NodeKind::Call { callee: expr, args, optional: true }, Span::new(start, end));
                } else {
                    let prop = self.parse_property_name();
                    let end = self.tree.span(prop).end;
                    expr = self.tree.push(
                        NodeKind::Member { object: expr, property: prop, computed: false, optional: true },
                        Span::new(start, end),
                    );
                }
            } else if self.eat_punct("[") {
                let prop = self.parse_expression();
                let end = self.peek().end;
                self.expect_punct("]");
                expr = self.tree.push(
                    NodeKind::Member { object: expr, property: prop, computed: true, optional: false },
                    Span::new(start, end),
                );
            } else if self.is_punct("(") {
                let args = self.parse_args();
                let end = self.prev_end();
                expr = self.tree.push(NodeKind::Call { callee: expr, args, optional: false }, Span::new(start, end));
            } else {
                break;
            }
        }
        expr
    }

    fn parse_arrow(&mut self, is_async: bool) -> NodeId {
        let start = self.peek().start;
        let params = if self.is_punct("(") {
            self.parse_params()
        } else {
            let name = self.parse_binding_identifier();
            let span = self.tree.span(name);
            vec![self.tree.push(NodeKind::Param { name, default: None, rest: false, type_annotation: None }, span)]
        };
        self.expect_punct("=>");
        let body = if self.is_punct("{") {
            self.parse_block()
        } else {
            let expr = self.parse_assignment();
            let span = self.tree.span(expr);
            let ret = self.tree.push(NodeKind::Return(Some(expr)), span);
            self.tree.push(NodeKind::Block(vec![ret]), span)
        };
        let end = self.tree.span(body).end;
        self.tree.push(NodeKind::ArrowFunction { params, body, is_async }, Span::new(start, end))
    }

    fn parse_array_literal(&mut self) -> NodeId {
        let start = self.peek().start;
        self.expect_punct("[");
        let mut elements = Vec::new();
        while !self.is_punct("]") && !self.is_eof() {
            if self.eat_punct(",") {
                continue;
            }
            if self.eat_punct("...") {
                let espan_start = self.prev_end().saturating_sub(3);
                let inner = self.parse_assignment();
                let end = self.tree.span(inner).end;
                elements.push(self.tree.push(NodeKind::Spread(inner), Span::new(espan_start, end)));
            } else {
                elements.push(self.parse_assignment());
            }
            if !self.eat_punct(",") {
                break;
            }
        }
        let end = self.peek().end;
        self.eat_punct("]");
        self.tree.push(NodeKind::ArrayLiteral(elements), Span::new(start, end))
    }

    fn parse_object_literal(&mut self) -> NodeId {
        let start = self.peek().start;
        self.expect_punct("{");
        let mut props = Vec::new();
        while !self.is_punct("}") && !self.is_eof() {
            let computed = self.eat_punct("[");
            let key = if computed {
                let k = self.parse_assignment();
                self.expect_punct("]");
                k
            } else {
                match self.peek().kind.clone() {
                    TokKind::Str(s) => {
                        let t = self.bump();
                        self.tree.push(NodeKind::StringLiteral(s), Span::new(t.start, t.end))
                    }
                    TokKind::Number(n) => {
                        let t = self.bump();
                        self.tree.push(NodeKind::NumberLiteral(n), Span::new(t.start, t.end))
                    }
                    _ => self.parse_binding_identifier(),
                }
            };
            let value = if self.eat_punct(":") {
                self.parse_assignment()
            } else if self.is_punct("(") {
                let mstart = self.tree.span(key).start;
                let params = self.parse_params();
                let body = self.parse_block();
                let end = self.tree.span(body).end;
                self.tree.push(
                    NodeKind::FunctionExpr { params, body, is_async: false, is_generator: false },
                    Span::new(mstart, end),
                )
            } else {
                key
            };
            props.push((key, value, computed));
            if !self.eat_punct(",") {
                break;
            }
        }
        let end = self.peek().end;
        self.eat_punct("}");
        self.tree.push(NodeKind::ObjectLiteral(props), Span::new(start, end))
    }

    fn parse_primary(&mut self) -> NodeId {
        let tok = self.peek().clone();
        match tok.kind.clone() {
            TokKind::Number(n) => {
                self.bump();
                self.tree.push(NodeKind::NumberLiteral(n), Span::new(tok.start, tok.end))
            }
            TokKind::Str(s) => {
                self.bump();
                self.tree.push(NodeKind::StringLiteral(s), Span::new(tok.start, tok.end))
            }
            TokKind::Template(s) => {
                self.bump();
                let part = self.tree.push(NodeKind::StringLiteral(s), Span::new(tok.start, tok.end));
                self.tree.push(NodeKind::TemplateLiteral(vec![part]), Span::new(tok.start, tok.end))
            }
            TokKind::Punct("(") => {
                if self.is_paren_arrow_at(self.pos) {
                    self.parse_arrow(false)
                } else {
                    self.bump();
                    let inner = self.parse_expression();
                    self.expect_punct(")");
                    inner
                }
            }
            TokKind::Punct("[") => self.parse_array_literal(),
            TokKind::Punct("{") => self.parse_object_literal(),
            TokKind::Ident(name) => match name.as_str() {
                "true" => {
                    self.bump();
                    self.tree.push(NodeKind::BooleanLiteral(true), Span::new(tok.start, tok.end))
                }
                "false" => {
                    self.bump();
                    self.tree.push(NodeKind::BooleanLiteral(false), Span::new(tok.start, tok.end))
                }
                "null" => {
                    self.bump();
                    self.tree.push(NodeKind::NullLiteral, Span::new(tok.start, tok.end))
                }
                "undefined" => {
                    self.bump();
                    self.tree.push(NodeKind::UndefinedLiteral, Span::new(tok.start, tok.end))
                }
                "this" => {
                    self.bump();
                    self.tree.push(NodeKind::ThisExpr, Span::new(tok.start, tok.end))
                }
                "function" => self.parse_function_expr(false),
                "yield" => {
                    self.bump();
                    let delegate = self.eat_punct("*");
                    let argument = if self.can_start_expression() { Some(self.parse_assignment()) } else { None };
                    let end = argument.map(|a| self.tree.span(a).end).unwrap_or(tok.end);
                    self.tree.push(NodeKind::Yield { argument, delegate }, Span::new(tok.start, end))
                }
                "async"
                    if matches!(&self.peek_n(1).kind, TokKind::Ident(s) if s == "function") =>
                {
                    self.bump();
                    self.parse_function_expr(true)
                }
                "async" if matches!(&self.peek_n(1).kind, TokKind::Punct("(")) && self.is_paren_arrow_at(self.pos + 1) => {
                    self.bump();
                    self.parse_arrow(true)
                }
                "async"
                    if matches!(&self.peek_n(1).kind, TokKind::Ident(_))
                        && self.peek_n(2).kind == TokKind::Punct("=>") =>
                {
                    self.bump();
                    self.parse_arrow(true)
                }
                _ if self.peek_n(1).kind == TokKind::Punct("=>") => self.parse_arrow(false),
                _ => {
                    self.bump();
                    self.tree.push(NodeKind::Identifier(name), Span::new(tok.start, tok.end))
                }
            },
            _ => {
                // Unrecognized primary: consume and emit `undefined` so
                // parsing can keep making progress.
                self.bump();
                self.tree.push(NodeKind::UndefinedLiteral, Span::new(tok.start, tok.end))
            }
        }
    }
}

fn is_reserved(name: &str) -> bool {
    matches!(
        name,
        "var" | "let"
            | "const"
            | "function"
            | "return"
            | "if"
            | "else"
            | "while"
            | "do"
            | "for"
            | "switch"
            | "case"
            | "default"
            | "break"
            | "continue"
            | "throw"
            | "try"
            | "catch"
            | "finally"
            | "class"
            | "extends"
            | "new"
            | "typeof"
            | "void"
            | "delete"
            | "instanceof"
            | "in"
            | "of"
            | "this"
            | "true"
            | "false"
            | "null"
            | "undefined"
            | "async"
            | "await"
            | "yield"
    )
}
