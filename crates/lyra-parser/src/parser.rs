// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The parser implementation using Pratt parsing for expressions.

use lyra_ast::decl::{
    Annotation, ClassDecl, Decl, DeclKind, FieldDecl, ImportDecl, InterfaceDecl, Member,
    MethodDecl, MethodKind, Modifier, Modifiers, Param, Program,
};
use lyra_ast::expr::{BinOp, Expr, ExprKind, LambdaBody, LambdaExpr, Literal, UnaryOp};
use lyra_ast::stmt::{ElseBranch, IfStmt, MatchCase, Stmt, StmtKind};
use lyra_ast::token::{Token, TokenKind};
use lyra_ast::ty::{TypeRef, TypeRefKind};
use lyra_ast::{FileId, Span};

/// The parser for Lyra source code. Stops at the first error.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    file: FileId,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let file = tokens.first().map(|t| t.span.file).unwrap_or_default();
        Self { tokens, pos: 0, file }
    }

    // =========================================================================
    // Token Navigation
    // =========================================================================

    fn current(&self) -> &Token {
        let idx = self.pos.min(self.tokens.len().saturating_sub(1));
        &self.tokens[idx]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek(&self, n: usize) -> &TokenKind {
        self.tokens.get(self.pos + n).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if !self.at_end() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::expected(expected, self.current_kind(), self.current().span))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::expected("a name", self.current_kind(), self.current().span)),
        }
    }

    /// After `.`, keywords are valid member names (`Assert.equals`, `x.default`).
    fn expect_member_name(&mut self) -> Result<String, ParseError> {
        if let Some(text) = self.current_kind().keyword_text() {
            self.advance();
            return Ok(text.to_string());
        }
        match self.current_kind() {
            TokenKind::Null => {
                self.advance();
                Ok("null".to_string())
            }
            TokenKind::Bool(b) => {
                let name = b.to_string();
                self.advance();
                Ok(name)
            }
            _ => self.expect_ident(),
        }
    }

    fn expect_string(&mut self) -> Result<String, ParseError> {
        match self.current_kind().clone() {
            TokenKind::String(s) => {
                self.advance();
                Ok(s)
            }
            _ => Err(ParseError::expected("a string", self.current_kind(), self.current().span)),
        }
    }

    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span.end)
            .unwrap_or(0)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end().max(start)).in_file(self.file)
    }

    // =========================================================================
    // Top-Level Parsing
    // =========================================================================

    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let mut decls = Vec::new();
        while !self.at_end() {
            decls.push(self.parse_decl()?);
        }
        Ok(Program { file: self.file, decls })
    }

    fn parse_decl(&mut self) -> Result<Decl, ParseError> {
        let start = self.current().span.start;

        if self.check(&TokenKind::Import) {
            let import = self.parse_import()?;
            return Ok(Decl { kind: DeclKind::Import(import), span: self.span_from(start) });
        }

        let annotations = self.parse_annotations()?;
        let modifiers = self.parse_modifiers()?;

        let kind = match self.current_kind() {
            TokenKind::Class => DeclKind::Class(self.parse_class(annotations, modifiers, start)?),
            TokenKind::Interface => {
                DeclKind::Interface(self.parse_interface(annotations, modifiers, start)?)
            }
            _ if !annotations.is_empty() || modifiers != Modifiers::default() => {
                return Err(ParseError::expected(
                    "'class' or 'interface'",
                    self.current_kind(),
                    self.current().span,
                ));
            }
            _ => DeclKind::Stmt(self.parse_stmt()?),
        };

        Ok(Decl { kind, span: self.span_from(start) })
    }

    fn parse_import(&mut self) -> Result<ImportDecl, ParseError> {
        self.expect(&TokenKind::Import, "'import'")?;

        if self.match_token(&TokenKind::LBrace) {
            let names = self.parse_name_list(&TokenKind::RBrace)?;
            self.expect(&TokenKind::RBrace, "'}'")?;
            self.expect(&TokenKind::From, "'from'")?;
            let from = self.expect_string()?;
            self.expect(&TokenKind::Semi, "';'")?;
            return Ok(ImportDecl { names, from: Some(from) });
        }

        let names = self.parse_name_list(&TokenKind::Semi)?;
        self.expect(&TokenKind::Semi, "';'")?;
        Ok(ImportDecl { names, from: None })
    }

    /// `A, B, C` up to (not including) `close`. At least one name.
    fn parse_name_list(&mut self, close: &TokenKind) -> Result<Vec<String>, ParseError> {
        let mut names = vec![self.expect_ident()?];
        while self.match_token(&TokenKind::Comma) {
            if self.check(close) {
                break;
            }
            names.push(self.expect_ident()?);
        }
        Ok(names)
    }

    fn parse_annotations(&mut self) -> Result<Vec<Annotation>, ParseError> {
        let mut annotations = Vec::new();
        while self.check(&TokenKind::At) {
            let start = self.advance().span.start;
            let name = self.expect_member_name()?;
            annotations.push(Annotation { name, span: self.span_from(start) });
        }
        Ok(annotations)
    }

    fn parse_modifiers(&mut self) -> Result<Modifiers, ParseError> {
        let mut modifiers = Modifiers::default();
        loop {
            let modifier = match self.current_kind() {
                TokenKind::Open => Modifier::Open,
                TokenKind::Public => Modifier::Public,
                TokenKind::Private => Modifier::Private,
                TokenKind::Static => Modifier::Static,
                TokenKind::Readonly => Modifier::Readonly,
                _ => return Ok(modifiers),
            };
            let span = self.advance().span;
            if !modifiers.insert(modifier) {
                return Err(ParseError::new(
                    format!("Duplicate modifier '{}'", modifier.as_str()),
                    span,
                ));
            }
        }
    }

    fn parse_type_params(&mut self) -> Result<Vec<String>, ParseError> {
        if !self.match_token(&TokenKind::Lt) {
            return Ok(Vec::new());
        }
        let params = self.parse_name_list(&TokenKind::Gt)?;
        self.expect(&TokenKind::Gt, "'>'")?;
        Ok(params)
    }

    fn parse_class(
        &mut self,
        annotations: Vec<Annotation>,
        modifiers: Modifiers,
        start: usize,
    ) -> Result<ClassDecl, ParseError> {
        self.expect(&TokenKind::Class, "'class'")?;
        let name = self.expect_ident()?;
        let type_params = self.parse_type_params()?;

        let superclass = if self.match_token(&TokenKind::Extends) {
            Some(self.expect_ident()?)
        } else {
            None
        };

        let mut implements = Vec::new();
        if self.match_token(&TokenKind::Implements) {
            implements.push(self.parse_type()?);
            while self.match_token(&TokenKind::Comma) {
                implements.push(self.parse_type()?);
            }
        }

        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut members = Vec::new();
        let mut has_constructor = false;
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let member = self.parse_member()?;
            if let Member::Method(m) = &member {
                if m.is_constructor() {
                    if has_constructor {
                        return Err(ParseError::new(
                            format!("Class '{}' declares more than one constructor", name),
                            m.span,
                        ));
                    }
                    has_constructor = true;
                }
            }
            members.push(member);
        }
        self.expect(&TokenKind::RBrace, "'}'")?;

        Ok(ClassDecl {
            name,
            annotations,
            modifiers,
            type_params,
            superclass,
            implements,
            members,
            span: self.span_from(start),
        })
    }

    fn parse_interface(
        &mut self,
        annotations: Vec<Annotation>,
        modifiers: Modifiers,
        start: usize,
    ) -> Result<InterfaceDecl, ParseError> {
        self.expect(&TokenKind::Interface, "'interface'")?;
        let name = self.expect_ident()?;
        let type_params = self.parse_type_params()?;

        let extends = if self.match_token(&TokenKind::Extends) {
            self.parse_name_list(&TokenKind::LBrace)?
        } else {
            Vec::new()
        };

        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let member = self.parse_member()?;
            match &member {
                Member::Field(f) if !f.modifiers.is_static => {
                    return Err(ParseError::new(
                        format!("Interface field '{}' must be static", f.name),
                        f.span,
                    )
                    .with_hint("interfaces only carry static fields"));
                }
                Member::Method(m) if m.is_constructor() => {
                    return Err(ParseError::new("Interfaces cannot declare a constructor", m.span));
                }
                Member::Method(m) if m.body.is_some() => {
                    return Err(ParseError::new(
                        format!("Interface method '{}' cannot have a body", m.name),
                        m.span,
                    )
                    .with_hint("end the signature with ';'"));
                }
                _ => {}
            }
            members.push(member);
        }
        self.expect(&TokenKind::RBrace, "'}'")?;

        Ok(InterfaceDecl {
            name,
            annotations,
            modifiers,
            type_params,
            extends,
            members,
            span: self.span_from(start),
        })
    }

    fn parse_member(&mut self) -> Result<Member, ParseError> {
        let start = self.current().span.start;
        let annotations = self.parse_annotations()?;
        let modifiers = self.parse_modifiers()?;

        if self.match_token(&TokenKind::Constructor) {
            let method = self.parse_method_rest(
                "constructor".to_string(),
                MethodKind::Constructor,
                annotations,
                modifiers,
                start,
            )?;
            return Ok(Member::Method(method));
        }

        let name = self.expect_ident()?;
        match self.current_kind() {
            TokenKind::LParen | TokenKind::Lt => {
                let method =
                    self.parse_method_rest(name, MethodKind::Method, annotations, modifiers, start)?;
                Ok(Member::Method(method))
            }
            TokenKind::Colon | TokenKind::Eq | TokenKind::Semi => {
                let ty = if self.match_token(&TokenKind::Colon) {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                let init = if self.match_token(&TokenKind::Eq) {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                self.expect(&TokenKind::Semi, "';'")?;
                Ok(Member::Field(FieldDecl { name, modifiers, ty, init, span: self.span_from(start) }))
            }
            _ => Err(ParseError::new(
                format!("Invalid class member '{}'", name),
                self.current().span,
            )
            .with_hint("members are fields (`name: T = value;`) or methods (`name(): T { }`)")),
        }
    }

    fn parse_method_rest(
        &mut self,
        name: String,
        kind: MethodKind,
        annotations: Vec<Annotation>,
        modifiers: Modifiers,
        start: usize,
    ) -> Result<MethodDecl, ParseError> {
        let type_params = self.parse_type_params()?;
        self.expect(&TokenKind::LParen, "'('")?;
        let params = self.parse_params()?;
        self.expect(&TokenKind::RParen, "')'")?;

        let ret = if self.match_token(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = if self.match_token(&TokenKind::Semi) {
            None
        } else {
            Some(self.parse_block()?)
        };

        Ok(MethodDecl {
            name,
            kind,
            annotations,
            modifiers,
            type_params,
            params,
            ret,
            body,
            span: self.span_from(start),
        })
    }

    /// Parameter list without the surrounding parentheses.
    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let start = self.current().span.start;
            let name = self.expect_ident()?;
            let ty = if self.match_token(&TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let default = if self.match_token(&TokenKind::Eq) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            params.push(Param { name, ty, default, span: self.span_from(start) });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    // =========================================================================
    // Types
    // =========================================================================

    pub fn parse_type(&mut self) -> Result<TypeRef, ParseError> {
        let start = self.current().span.start;

        let kind = if self.match_token(&TokenKind::LParen) {
            let mut params = Vec::new();
            while !self.check(&TokenKind::RParen) {
                params.push(self.parse_type()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RParen, "')'")?;
            self.expect(&TokenKind::Arrow, "'->'")?;
            let ret = self.parse_type()?;
            TypeRefKind::Function { params, ret: Box::new(ret) }
        } else {
            let name = match self.current_kind() {
                TokenKind::Null => {
                    self.advance();
                    "null".to_string()
                }
                _ => self.expect_ident()?,
            };
            if self.match_token(&TokenKind::Lt) {
                let mut args = vec![self.parse_type()?];
                while self.match_token(&TokenKind::Comma) {
                    args.push(self.parse_type()?);
                }
                self.expect(&TokenKind::Gt, "'>'")?;
                TypeRefKind::Generic { name, args }
            } else {
                TypeRefKind::Simple(name)
            }
        };

        let nullable = self.match_token(&TokenKind::Question);
        Ok(TypeRef { kind, nullable, span: self.span_from(start) })
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span.start;

        let kind = match self.current_kind() {
            TokenKind::Let => self.parse_let()?,
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(&TokenKind::Semi, "';'")?;
                StmtKind::Return(value)
            }
            TokenKind::If => StmtKind::If(self.parse_if()?),
            TokenKind::Match => self.parse_match()?,
            TokenKind::Foreach => self.parse_foreach()?,
            _ => {
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::Semi, "';'")?;
                StmtKind::Expr(expr)
            }
        };

        Ok(Stmt::new(kind, self.span_from(start)))
    }

    fn parse_let(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::Let, "'let'")?;
        let name = self.expect_ident()?;
        let ty = if self.match_token(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let init = if self.match_token(&TokenKind::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(&TokenKind::Semi, "';'")?;
        Ok(StmtKind::Let { name, ty, init })
    }

    fn parse_if(&mut self) -> Result<IfStmt, ParseError> {
        self.expect(&TokenKind::If, "'if'")?;
        self.expect(&TokenKind::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "')'")?;
        let then_branch = self.parse_block()?;

        let else_branch = if self.match_token(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(ElseBranch::If(Box::new(self.parse_if()?)))
            } else {
                Some(ElseBranch::Block(self.parse_block()?))
            }
        } else {
            None
        };

        Ok(IfStmt { cond, then_branch, else_branch })
    }

    fn parse_match(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::Match, "'match'")?;
        self.expect(&TokenKind::LParen, "'('")?;
        let scrutinee = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "')'")?;
        self.expect(&TokenKind::LBrace, "'{'")?;

        let mut cases = Vec::new();
        let mut has_default = false;
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let start = self.current().span.start;
            let test = match self.current_kind() {
                TokenKind::Case => {
                    self.advance();
                    Some(self.parse_expr()?)
                }
                TokenKind::Default => {
                    let span = self.advance().span;
                    if has_default {
                        return Err(ParseError::new("Match has more than one default case", span));
                    }
                    has_default = true;
                    None
                }
                _ => {
                    return Err(ParseError::expected(
                        "'case' or 'default'",
                        self.current_kind(),
                        self.current().span,
                    ));
                }
            };
            let body = self.parse_block()?;
            cases.push(MatchCase { test, body, span: self.span_from(start) });
        }
        self.expect(&TokenKind::RBrace, "'}'")?;

        Ok(StmtKind::Match { scrutinee, cases })
    }

    fn parse_foreach(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::Foreach, "'foreach'")?;
        self.expect(&TokenKind::LParen, "'('")?;
        let binding = self.expect_ident()?;
        self.expect(&TokenKind::In, "'in'")?;
        let iterable = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "')'")?;
        let body = self.parse_block()?;
        Ok(StmtKind::Foreach { binding, iterable, body })
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        let target = self.parse_expr_bp(0)?;

        if !self.check(&TokenKind::Eq) {
            return Ok(target);
        }
        let eq_span = self.advance().span;
        if !matches!(target.kind, ExprKind::Ident(_) | ExprKind::Member { .. } | ExprKind::Index { .. }) {
            return Err(ParseError::new("Invalid assignment target", eq_span)
                .with_hint("assign to a variable, a field, or an index"));
        }
        let value = self.parse_expr()?;
        Ok(Expr::new(
            ExprKind::Assign { target: Box::new(target), value: Box::new(value) },
            self.span_from(start),
        ))
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        let mut lhs = self.parse_prefix()?;

        loop {
            if Self::is_postfix(self.current_kind()) {
                lhs = self.parse_postfix(lhs, start)?;
                continue;
            }

            if let Some((l_bp, r_bp)) = self.infix_bp() {
                if l_bp < min_bp {
                    break;
                }
                let op = self.parse_binop()?;
                let rhs = self.parse_expr_bp(r_bp)?;
                lhs = Expr::new(
                    ExprKind::Binary { op, left: Box::new(lhs), right: Box::new(rhs) },
                    self.span_from(start),
                );
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;

        let kind = match self.current_kind().clone() {
            TokenKind::Number(n) => {
                self.advance();
                ExprKind::Literal(Literal::Number(n))
            }
            TokenKind::String(s) => {
                self.advance();
                ExprKind::Literal(Literal::String(s))
            }
            TokenKind::Bool(b) => {
                self.advance();
                ExprKind::Literal(Literal::Bool(b))
            }
            TokenKind::Null => {
                self.advance();
                ExprKind::Literal(Literal::Null)
            }
            TokenKind::Ident(name) => {
                self.advance();
                ExprKind::Ident(name)
            }
            TokenKind::This => {
                self.advance();
                ExprKind::This
            }
            TokenKind::Super => {
                self.advance();
                ExprKind::Super
            }
            TokenKind::Bang => {
                self.advance();
                let operand = self.parse_expr_bp(Self::PREFIX_BP)?;
                ExprKind::Unary { op: UnaryOp::Not, operand: Box::new(operand) }
            }
            TokenKind::Minus => {
                // `-x` is sugar for `0 - x`.
                let minus = self.advance().span;
                let operand = self.parse_expr_bp(Self::PREFIX_BP)?;
                let zero = Expr::new(ExprKind::Literal(Literal::Number(0.0)), minus);
                ExprKind::Binary { op: BinOp::Sub, left: Box::new(zero), right: Box::new(operand) }
            }
            TokenKind::New => {
                self.advance();
                let ty = self.parse_type()?;
                self.expect(&TokenKind::LParen, "'('")?;
                let args = self.parse_args()?;
                ExprKind::New { ty, args }
            }
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                while !self.check(&TokenKind::RBracket) {
                    items.push(self.parse_expr()?);
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RBracket, "']'")?;
                ExprKind::Array(items)
            }
            TokenKind::LParen if self.looks_like_lambda() => ExprKind::Lambda(self.parse_lambda()?),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "')'")?;
                return Ok(Expr::new(inner.kind, self.span_from(start)));
            }
            _ => {
                return Err(ParseError::expected(
                    "expression",
                    self.current_kind(),
                    self.current().span,
                ));
            }
        };

        Ok(Expr::new(kind, self.span_from(start)))
    }

    /// `(` ... matching `)` followed by `=>` or `:` starts a lambda.
    fn looks_like_lambda(&self) -> bool {
        let mut depth = 0usize;
        let mut i = 0;
        loop {
            match self.peek(i) {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return matches!(self.peek(i + 1), TokenKind::FatArrow | TokenKind::Colon);
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            i += 1;
        }
    }

    fn parse_lambda(&mut self) -> Result<LambdaExpr, ParseError> {
        self.expect(&TokenKind::LParen, "'('")?;
        let params = self.parse_params()?;
        self.expect(&TokenKind::RParen, "')'")?;
        let ret = if self.match_token(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect(&TokenKind::FatArrow, "'=>'")?;
        let body = if self.check(&TokenKind::LBrace) {
            LambdaBody::Block(self.parse_block()?)
        } else {
            LambdaBody::Expr(Box::new(self.parse_expr()?))
        };
        Ok(LambdaExpr { params, ret, body })
    }

    fn is_postfix(kind: &TokenKind) -> bool {
        matches!(kind, TokenKind::LParen | TokenKind::Dot | TokenKind::LBracket)
    }

    fn parse_postfix(&mut self, lhs: Expr, start: usize) -> Result<Expr, ParseError> {
        let kind = match self.advance().kind {
            TokenKind::LParen => {
                let args = self.parse_args()?;
                ExprKind::Call { callee: Box::new(lhs), args }
            }
            TokenKind::Dot => {
                let property = self.expect_member_name()?;
                ExprKind::Member { object: Box::new(lhs), property }
            }
            TokenKind::LBracket => {
                let index = self.parse_expr()?;
                self.expect(&TokenKind::RBracket, "']'")?;
                ExprKind::Index { object: Box::new(lhs), index: Box::new(index) }
            }
            _ => return Ok(lhs),
        };
        Ok(Expr::new(kind, self.span_from(start)))
    }

    /// Arguments after an already-consumed `(`, including the closing `)`.
    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) {
            args.push(self.parse_expr()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(args)
    }

    // =========================================================================
    // Operator Precedence
    // =========================================================================

    const PREFIX_BP: u8 = 13;

    fn infix_bp(&self) -> Option<(u8, u8)> {
        match self.current_kind() {
            TokenKind::PipePipe => Some((1, 2)),
            TokenKind::AmpAmp => Some((3, 4)),
            TokenKind::EqEq | TokenKind::BangEq => Some((5, 6)),
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => Some((7, 8)),
            TokenKind::Plus | TokenKind::Minus => Some((9, 10)),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some((11, 12)),
            _ => None,
        }
    }

    fn parse_binop(&mut self) -> Result<BinOp, ParseError> {
        let op = match self.current_kind() {
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Div,
            TokenKind::Percent => BinOp::Mod,
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::BangEq => BinOp::Ne,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::LtEq => BinOp::Le,
            TokenKind::GtEq => BinOp::Ge,
            TokenKind::AmpAmp => BinOp::And,
            TokenKind::PipePipe => BinOp::Or,
            _ => {
                return Err(ParseError::expected(
                    "operator like '+' or '-'",
                    self.current_kind(),
                    self.current().span,
                ));
            }
        };
        self.advance();
        Ok(op)
    }
}

/// A parse error with location and friendly message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl ParseError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        Self { span, message: message.into(), hint: None }
    }

    fn expected(expected: &str, found: &TokenKind, span: Span) -> Self {
        let message = format!("Expected {}, found {}", expected, found.display_name());
        let hint = crate::hints::for_expected(expected, found).map(String::from);
        Self { span, message, hint }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
