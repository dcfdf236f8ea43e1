// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement AST nodes.

use crate::expr::Expr;
use crate::ty::TypeRef;
use crate::Span;

/// A statement in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// The kind of statement.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `let name: T = init;`
    Let {
        name: String,
        ty: Option<TypeRef>,
        init: Option<Expr>,
    },
    /// Return statement
    Return(Option<Expr>),
    /// If with optional else / else-if chain
    If(IfStmt),
    /// `match (x) { case a { } default { } }`
    Match {
        scrutinee: Expr,
        cases: Vec<MatchCase>,
    },
    /// `foreach (x in xs) { }`
    Foreach {
        binding: String,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    /// Expression statement
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Vec<Stmt>,
    pub else_branch: Option<ElseBranch>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    If(Box<IfStmt>),
    Block(Vec<Stmt>),
}

/// One arm of a match. A missing test marks the default arm.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCase {
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}
