// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement and body checking.

use lyra_ast::decl::{DeclKind, Member, Program};
use lyra_ast::expr::Expr;
use lyra_ast::stmt::{ElseBranch, IfStmt, MatchCase, Stmt, StmtKind};
use lyra_ast::ty::TypeRef;
use lyra_ast::Span;
use tracing::debug;

use super::{FnContext, TypeChecker, TypeError};
use crate::symbols::{ClassId, MethodSymbol, Owner};
use crate::types::Type;

/// `Some(ty)` when a statement always returns, with the returned type.
pub(super) type Flow = Option<Type>;

impl<'a> TypeChecker<'a> {
    /// Check the top-level statements of the main program.
    pub fn check_program(&mut self, program: &Program) -> Result<(), TypeError> {
        for decl in &program.decls {
            if let DeclKind::Stmt(stmt) = &decl.kind {
                self.check_statement(stmt)?;
            }
        }
        Ok(())
    }

    /// Interfaces have no method bodies; only static field initializers
    /// are checked.
    pub fn check_interface_bodies(&mut self) -> Result<(), TypeError> {
        let decls: Vec<_> = self.interface_decls.iter().map(|(id, decl)| (*id, *decl)).collect();
        for (id, decl) in decls {
            let owner = Owner::Interface(id);
            self.in_object_scope(owner, |this| {
                for field in decl.fields() {
                    if let Some(init) = &field.init {
                        let expected = this
                            .registry
                            .interface(id)
                            .static_fields
                            .get(&field.name)
                            .map(|f| f.ty.clone())
                            .unwrap_or(Type::Mixed);
                        this.check_initializer(&expected, init)?;
                    }
                }
                Ok(())
            })?;
        }
        Ok(())
    }

    pub fn check_classes_bodies(&mut self) -> Result<(), TypeError> {
        let decls: Vec<_> = self.class_decls.iter().map(|(id, decl)| (*id, *decl)).collect();
        for (id, decl) in decls {
            debug!(class = %decl.name, "checking class body");
            self.in_object_scope(Owner::Class(id), |this| {
                for member in &decl.members {
                    match member {
                        Member::Field(field) => {
                            if let Some(init) = &field.init {
                                let expected = this.field_declared_type(id, &field.name, field.modifiers.is_static);
                                this.check_initializer(&expected, init)?;
                            }
                        }
                        Member::Method(method) => {
                            let Some(body) = &method.body else { continue };
                            let class = this.registry.class(id);
                            let symbol = if method.is_constructor() {
                                class.constructor.clone()
                            } else if method.modifiers.is_static {
                                class.static_methods.get(&method.name).cloned()
                            } else {
                                class.instance_methods.get(&method.name).cloned()
                            };
                            if let Some(symbol) = symbol {
                                let constructor_of = method.is_constructor().then_some(id);
                                this.check_method_body(&symbol, body, constructor_of)?;
                            }
                        }
                    }
                }
                Ok(())
            })?;
        }
        Ok(())
    }

    fn field_declared_type(&self, id: ClassId, name: &str, is_static: bool) -> Type {
        let class = self.registry.class(id);
        let fields = if is_static { &class.static_fields } else { &class.instance_fields };
        fields.get(name).map(|f| f.ty.clone()).unwrap_or(Type::Mixed)
    }

    fn check_initializer(&mut self, expected: &Type, init: &Expr) -> Result<(), TypeError> {
        let found = self.check_expr(init, Some(expected))?;
        self.check_assignable(expected, &found, init.span)
    }

    fn check_method_body(
        &mut self,
        symbol: &MethodSymbol,
        body: &[Stmt],
        constructor_of: Option<ClassId>,
    ) -> Result<(), TypeError> {
        let ctx = FnContext { name: symbol.name.clone(), ret: symbol.ret.clone(), constructor_of };
        let flow = self.in_scope(|this| {
            this.scope.bind_type_params(&symbol.type_params);
            for param in &symbol.params {
                this.scope.define(param.name.clone(), param.ty.clone());
            }
            this.in_function(ctx, |this| this.check_statements(body))
        })?;
        if flow.is_none() && constructor_of.is_none() && requires_return(&symbol.ret) {
            return Err(TypeError::MissingReturn {
                method: symbol.name.clone(),
                expected: symbol.ret.clone(),
                span: symbol.span,
            });
        }
        Ok(())
    }

    /// Check statements in a child frame.
    pub(super) fn check_block(&mut self, stmts: &[Stmt]) -> Result<Flow, TypeError> {
        self.in_scope(|this| this.check_statements(stmts))
    }

    /// Check statements in the current frame. Statements after a return
    /// are still checked.
    pub(super) fn check_statements(&mut self, stmts: &[Stmt]) -> Result<Flow, TypeError> {
        let mut flow = None;
        for stmt in stmts {
            let returned = self.check_statement(stmt)?;
            if flow.is_none() {
                flow = returned;
            }
        }
        Ok(flow)
    }

    pub(super) fn check_statement(&mut self, stmt: &Stmt) -> Result<Flow, TypeError> {
        match &stmt.kind {
            StmtKind::Let { name, ty, init } => {
                self.check_variable(name, ty.as_ref(), init.as_ref())?;
                Ok(None)
            }
            StmtKind::Return(value) => self.check_return(value.as_ref(), stmt.span).map(Some),
            StmtKind::If(if_stmt) => self.check_if(if_stmt),
            StmtKind::Match { scrutinee, cases } => self.check_match(scrutinee, cases),
            StmtKind::Foreach { binding, iterable, body } => {
                let iterable_ty = self.check_expr(iterable, None)?;
                let iterable_ty = self.autobox(iterable_ty);
                let element = self
                    .element_type(&iterable_ty)
                    .ok_or(TypeError::NotIterable { ty: iterable_ty, span: iterable.span })?;
                self.in_scope(|this| {
                    this.scope.define(binding.clone(), element);
                    this.check_statements(body)
                })
            }
            StmtKind::Expr(expr) => {
                self.check_expr(expr, None)?;
                Ok(None)
            }
        }
    }

    fn check_variable(&mut self, name: &str, ty: Option<&TypeRef>, init: Option<&Expr>) -> Result<(), TypeError> {
        let declared = ty.map(|t| self.resolve_type(t)).transpose()?;
        let bound = match (declared, init) {
            (Some(declared), Some(init)) => {
                let found = self.check_expr(init, Some(&declared))?;
                self.check_assignable(&declared, &found, init.span)?;
                declared
            }
            (None, Some(init)) => self.check_expr(init, None)?,
            (Some(declared), None) => declared,
            (None, None) => Type::Mixed,
        };
        self.scope.define(name.to_string(), bound);
        Ok(())
    }

    fn check_return(&mut self, value: Option<&Expr>, span: Span) -> Result<Type, TypeError> {
        let current = self.fn_stack.last().cloned();
        let expected = current.as_ref().map(|f| f.ret.clone());
        match value {
            Some(expr) => {
                let found = self.check_expr(expr, expected.as_ref())?;
                if let Some(expected) = &expected {
                    self.check_assignable(expected, &found, expr.span)?;
                }
                Ok(found)
            }
            None => {
                if let Some(current) = current {
                    if requires_return(&current.ret) {
                        return Err(TypeError::MissingReturnValue { method: current.name, expected: current.ret, span });
                    }
                }
                Ok(Type::Void)
            }
        }
    }

    fn check_condition(&mut self, cond: &Expr) -> Result<(), TypeError> {
        let ty = self.check_expr(cond, Some(&Type::Boolean))?;
        if ty.accepts(&Type::Boolean) {
            Ok(())
        } else {
            Err(TypeError::InvalidCondition { ty, span: cond.span })
        }
    }

    fn check_if(&mut self, stmt: &IfStmt) -> Result<Flow, TypeError> {
        self.check_condition(&stmt.cond)?;
        let then_flow = self.check_block(&stmt.then_branch)?;
        let else_flow = match &stmt.else_branch {
            None => None,
            Some(ElseBranch::If(nested)) => self.check_if(nested)?,
            Some(ElseBranch::Block(block)) => self.check_block(block)?,
        };
        Ok(match (then_flow, else_flow) {
            (Some(ty), Some(_)) => Some(ty),
            _ => None,
        })
    }

    fn check_match(&mut self, scrutinee: &Expr, cases: &[MatchCase]) -> Result<Flow, TypeError> {
        let subject = self.check_expr(scrutinee, None)?;
        let mut all_return = true;
        let mut has_default = false;
        let mut first = None;
        for case in cases {
            match &case.test {
                Some(test) => {
                    let ty = self.check_expr(test, Some(&subject))?;
                    self.check_assignable(&subject, &ty, test.span)?;
                }
                None => has_default = true,
            }
            match self.check_block(&case.body)? {
                Some(ty) => {
                    first.get_or_insert(ty);
                }
                None => all_return = false,
            }
        }
        Ok(if all_return && has_default { first } else { None })
    }
}

/// Whether a body declared to return `ty` must end in a return.
fn requires_return(ty: &Type) -> bool {
    !matches!(ty, Type::Void | Type::Mixed) && !ty.is_nullable()
}
