// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type checker implementation.

use std::collections::HashMap;

use indexmap::IndexMap;
use lyra_ast::decl::{ClassDecl, InterfaceDecl, MethodDecl};
use lyra_linker::{LinkedProgram, ModuleKind};
use tracing::debug;

use crate::scope::TypeScope;
use crate::symbols::{ClassId, InterfaceId, Owner, TypeRegistry};
use crate::types::Type;

mod errors;
mod resolve;
mod declarations;
mod check_stmt;
mod check_expr;
mod check_call;
mod implements;

pub use errors::TypeError;

/// Method or lambda whose body is being checked.
#[derive(Debug, Clone)]
pub(super) struct FnContext {
    pub(super) name: String,
    pub(super) ret: Type,
    /// Set while checking a constructor body.
    pub(super) constructor_of: Option<ClassId>,
}

/// Result of a successful check.
#[derive(Debug)]
pub struct CheckedProgram {
    pub registry: TypeRegistry,
    /// Types of the main program's top-level variables.
    pub globals: HashMap<String, Type>,
}

pub struct TypeChecker<'a> {
    pub(super) registry: TypeRegistry,
    /// Global native functions, as function types.
    pub(super) functions: IndexMap<String, Type>,
    pub(super) scope: TypeScope,
    /// Declaration behind each registered class.
    pub(super) class_decls: IndexMap<ClassId, &'a ClassDecl>,
    pub(super) interface_decls: IndexMap<InterfaceId, &'a InterfaceDecl>,
    /// Innermost method or lambda last.
    pub(super) fn_stack: Vec<FnContext>,
}

impl Default for TypeChecker<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TypeChecker<'a> {
    pub fn new() -> Self {
        Self {
            registry: TypeRegistry::new(),
            functions: IndexMap::new(),
            scope: TypeScope::new(),
            class_decls: IndexMap::new(),
            interface_decls: IndexMap::new(),
            fn_stack: Vec::new(),
        }
    }

    /// Run every phase over a linked program.
    pub fn check(linked: &'a LinkedProgram) -> Result<CheckedProgram, TypeError> {
        let mut checker = TypeChecker::new();
        for module in &linked.modules {
            checker.declare_shells(&module.program, module.kind == ModuleKind::Native);
        }
        for module in &linked.modules {
            debug!(url = %module.url, "collecting symbols");
            checker.collect_all_symbols_from_node(&module.program)?;
        }
        checker.register_functions(&linked.functions)?;
        checker.validate_inheritance()?;
        if let Some(main) = linked.main() {
            debug!(url = %main.url, "checking program");
            checker.check_program(&main.program)?;
        }
        checker.check_interface_bodies()?;
        checker.check_classes_bodies()?;
        checker.check_classes_implements()?;
        Ok(checker.finish())
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn finish(self) -> CheckedProgram {
        CheckedProgram { registry: self.registry, globals: self.scope.into_globals() }
    }

    /// Register the global native functions (`print`).
    pub fn register_functions(&mut self, decls: &[MethodDecl]) -> Result<(), TypeError> {
        for decl in decls {
            let params = decl.params.iter().map(|p| self.param_symbol(p)).collect::<Result<Vec<_>, _>>()?;
            let ret = match &decl.ret {
                Some(ret) => self.resolve_type(ret)?,
                None => Type::Void,
            };
            self.functions.insert(decl.name.clone(), Type::Function { params, ret: Box::new(ret) });
        }
        Ok(())
    }

    /// Run `f` in a child frame.
    pub(super) fn in_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, TypeError>,
    ) -> Result<T, TypeError> {
        self.scope.push();
        let result = f(self);
        self.scope.pop();
        result
    }

    /// Run `f` in a frame whose current object is `owner`, with the
    /// owner's type parameters bound.
    pub(super) fn in_object_scope<T>(
        &mut self,
        owner: Owner,
        f: impl FnOnce(&mut Self) -> Result<T, TypeError>,
    ) -> Result<T, TypeError> {
        self.scope.push_object(owner);
        let type_params = self.registry.type_params(owner).to_vec();
        self.scope.bind_type_params(&type_params);
        let result = f(self);
        self.scope.pop();
        result
    }

    /// Run `f` with `ctx` as the enclosing method.
    pub(super) fn in_function<T>(
        &mut self,
        ctx: FnContext,
        f: impl FnOnce(&mut Self) -> Result<T, TypeError>,
    ) -> Result<T, TypeError> {
        self.fn_stack.push(ctx);
        let result = f(self);
        self.fn_stack.pop();
        result
    }

    pub(super) fn current_class(&self) -> Option<ClassId> {
        match self.scope.current_object()? {
            Owner::Class(id) => Some(id),
            Owner::Interface(_) => None,
        }
    }
}
