// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declaration AST nodes.

use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::ty::TypeRef;
use crate::{FileId, Span};

/// A parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub file: FileId,
    pub decls: Vec<Decl>,
}

/// A top-level item.
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub kind: DeclKind,
    pub span: Span,
}

/// The kind of top-level item.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    Import(ImportDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    /// Plain statement executed top to bottom
    Stmt(Stmt),
}

/// `import System, Assert;` or `import { A, B } from "./lib.lyra";`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub names: Vec<String>,
    /// Absent for native class imports.
    pub from: Option<String>,
}

/// `@name` attached to a class, interface or member.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: String,
    pub span: Span,
}

/// A single modifier keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Open,
    Public,
    Private,
    Static,
    Readonly,
}

impl Modifier {
    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::Open => "open",
            Modifier::Public => "public",
            Modifier::Private => "private",
            Modifier::Static => "static",
            Modifier::Readonly => "readonly",
        }
    }
}

/// Modifier flags of a declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub open: bool,
    pub public: bool,
    pub private: bool,
    pub is_static: bool,
    pub readonly: bool,
}

impl Modifiers {
    /// Set a flag. Returns false when it was already set.
    pub fn insert(&mut self, modifier: Modifier) -> bool {
        let flag = match modifier {
            Modifier::Open => &mut self.open,
            Modifier::Public => &mut self.public,
            Modifier::Private => &mut self.private,
            Modifier::Static => &mut self.is_static,
            Modifier::Readonly => &mut self.readonly,
        };
        !std::mem::replace(flag, true)
    }
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub modifiers: Modifiers,
    pub type_params: Vec<String>,
    pub superclass: Option<String>,
    pub implements: Vec<TypeRef>,
    pub members: Vec<Member>,
    pub span: Span,
}

/// An interface declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub modifiers: Modifiers,
    pub type_params: Vec<String>,
    pub extends: Vec<String>,
    pub members: Vec<Member>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub ty: Option<TypeRef>,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Constructor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub kind: MethodKind,
    pub annotations: Vec<Annotation>,
    pub modifiers: Modifiers,
    pub type_params: Vec<String>,
    pub params: Vec<Param>,
    pub ret: Option<TypeRef>,
    /// `None` for signature-only methods (`length(): number;`).
    pub body: Option<Vec<Stmt>>,
    pub span: Span,
}

/// A method, constructor or lambda parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeRef>,
    pub default: Option<Expr>,
    pub span: Span,
}

impl MethodDecl {
    pub fn is_constructor(&self) -> bool {
        self.kind == MethodKind::Constructor
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a.name == name)
    }
}

impl ClassDecl {
    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Field(f) => Some(f),
            Member::Method(_) => None,
        })
    }

    /// Methods, excluding the constructor.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(m) if !m.is_constructor() => Some(m),
            _ => None,
        })
    }

    pub fn constructor(&self) -> Option<&MethodDecl> {
        self.members.iter().find_map(|m| match m {
            Member::Method(m) if m.is_constructor() => Some(m),
            _ => None,
        })
    }
}

impl InterfaceDecl {
    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Field(f) => Some(f),
            Member::Method(_) => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(m) => Some(m),
            Member::Field(_) => None,
        })
    }
}

impl Program {
    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.decls.iter().filter_map(|d| match &d.kind {
            DeclKind::Class(c) => Some(c),
            _ => None,
        })
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &InterfaceDecl> {
        self.decls.iter().filter_map(|d| match &d.kind {
            DeclKind::Interface(i) => Some(i),
            _ => None,
        })
    }

    pub fn imports(&self) -> impl Iterator<Item = &ImportDecl> {
        self.decls.iter().filter_map(|d| match &d.kind {
            DeclKind::Import(i) => Some(i),
            _ => None,
        })
    }
}
