// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement execution.

use lyra_ast::expr::Expr;
use lyra_ast::stmt::{ElseBranch, IfStmt, MatchCase, Stmt, StmtKind};
use lyra_ast::Span;

use crate::env::Environment;
use crate::value::{InstanceRef, Value};

use super::cast::cast_to;
use super::{Eval, Interpreter, RuntimeError};

impl Interpreter {
    /// Execute statements in `env` itself. A `return` surfaces as
    /// `RuntimeError::Return` and stops the block.
    pub(crate) fn exec_block(&mut self, stmts: &[Stmt], env: &Environment) -> Eval<()> {
        for stmt in stmts {
            self.exec_stmt(stmt, env)?;
        }
        Ok(())
    }

    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt, env: &Environment) -> Eval<()> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval_expr(expr, env)?;
                Ok(())
            }

            StmtKind::Let { name, ty, init } => {
                let value = match init {
                    Some(init) => cast_to(self.eval_expr(init, env)?, ty.as_ref()),
                    None => Value::Null,
                };
                env.define(name.clone(), value);
                Ok(())
            }

            StmtKind::Return(expr) => {
                let value = match expr {
                    Some(e) => self.eval_expr(e, env)?,
                    None => Value::Null,
                };
                Err(RuntimeError::Return(value).at(stmt.span))
            }

            StmtKind::If(if_stmt) => self.exec_if(if_stmt, env),

            StmtKind::Match { scrutinee, cases } => self.exec_match(scrutinee, cases, env),

            StmtKind::Foreach { binding, iterable, body } => {
                self.exec_foreach(binding, iterable, body, env, stmt.span)
            }
        }
    }

    fn exec_if(&mut self, stmt: &IfStmt, env: &Environment) -> Eval<()> {
        if self.eval_expr(&stmt.cond, env)?.is_truthy() {
            return self.exec_block(&stmt.then_branch, &env.child());
        }
        match &stmt.else_branch {
            Some(ElseBranch::If(nested)) => self.exec_if(nested, env),
            Some(ElseBranch::Block(body)) => self.exec_block(body, &env.child()),
            None => Ok(()),
        }
    }

    /// First case whose test is strictly equal to the scrutinee runs; the
    /// default runs only when none matches.
    fn exec_match(&mut self, scrutinee: &Expr, cases: &[MatchCase], env: &Environment) -> Eval<()> {
        let value = self.eval_expr(scrutinee, env)?;
        let mut default = None;
        for case in cases {
            let Some(test) = &case.test else {
                default = Some(case);
                continue;
            };
            if self.eval_expr(test, env)?.strict_eq(&value) {
                return self.exec_block(&case.body, &env.child());
            }
        }
        match default {
            Some(case) => self.exec_block(&case.body, &env.child()),
            None => Ok(()),
        }
    }

    /// Drive an `Iterable` through `iterator()`, `rewind()`, `hasNext()`,
    /// `current()` and `next()`. Each iteration gets a fresh scope.
    fn exec_foreach(
        &mut self,
        binding: &str,
        iterable: &Expr,
        body: &[Stmt],
        env: &Environment,
        span: Span,
    ) -> Eval<()> {
        let value = self.eval_expr(iterable, env)?;
        let source = self.iterable_source(&value).map_err(|e| e.at(iterable.span))?;
        let iterator = match self.call_method(&source, "iterator", Vec::new(), env, span)? {
            Value::Object(iterator) => iterator,
            other => return Err(RuntimeError::NotIterable(other.type_name()).at(iterable.span)),
        };

        self.call_method(&iterator, "rewind", Vec::new(), env, span)?;
        while self.call_method(&iterator, "hasNext", Vec::new(), env, span)?.is_truthy() {
            let current = self.call_method(&iterator, "current", Vec::new(), env, span)?;
            let scope = env.child();
            scope.define(binding, current);
            self.exec_block(body, &scope)?;
            self.call_method(&iterator, "next", Vec::new(), env, span)?;
        }
        Ok(())
    }

    /// An object with an `iterator()` method, its own or native.
    fn iterable_source(&self, value: &Value) -> Result<InstanceRef, RuntimeError> {
        let Value::Object(instance) = value else {
            return Err(RuntimeError::NotIterable(value.type_name()));
        };
        let (class, native) = {
            let instance = instance.borrow();
            (instance.class.clone(), instance.native.clone())
        };
        let native_iterable = native.is_some_and(|n| n.has_method("iterator"));
        if native_iterable || self.find_method(&class, "iterator").is_some() {
            Ok(instance.clone())
        } else {
            Err(RuntimeError::NotIterable(class.name.clone()))
        }
    }
}
