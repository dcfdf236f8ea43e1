// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type reference resolution, autoboxing and assignability.

use std::collections::HashSet;

use lyra_ast::ty::{TypeRef, TypeRefKind};
use lyra_ast::Span;

use super::{TypeChecker, TypeError};
use crate::symbols::Owner;
use crate::types::{bindings, ParamSymbol, Type};

impl<'a> TypeChecker<'a> {
    /// Resolve a written type in the current scope.
    pub(super) fn resolve_type(&self, ty: &TypeRef) -> Result<Type, TypeError> {
        let base = match &ty.kind {
            TypeRefKind::Simple(name) => self.resolve_simple(name),
            TypeRefKind::Generic { name, args } => {
                let owner = self
                    .registry
                    .lookup(name)
                    .ok_or_else(|| TypeError::NotAClass { name: name.clone(), span: ty.span })?;
                let args = args.iter().map(|a| self.resolve_type(a)).collect::<Result<Vec<_>, _>>()?;
                let expected = self.registry.type_params(owner).len();
                if expected != args.len() {
                    return Err(TypeError::TypeArgumentCount {
                        name: name.clone(),
                        expected,
                        found: args.len(),
                        span: ty.span,
                    });
                }
                self.registry.reference(owner, args)
            }
            TypeRefKind::Function { params, ret } => {
                let params = params
                    .iter()
                    .enumerate()
                    .map(|(i, p)| Ok(ParamSymbol::new(format!("arg{}", i), self.resolve_type(p)?)))
                    .collect::<Result<Vec<_>, TypeError>>()?;
                Type::Function { params, ret: Box::new(self.resolve_type(ret)?) }
            }
        };
        Ok(if ty.nullable { base.nullable() } else { base })
    }

    pub(super) fn resolve_optional(&self, ty: Option<&TypeRef>, fallback: Type) -> Result<Type, TypeError> {
        match ty {
            Some(ty) => self.resolve_type(ty),
            None => Ok(fallback),
        }
    }

    /// Type parameter in scope, then class or interface, then primitive.
    /// Unknown names become unconstrained type variables.
    fn resolve_simple(&self, name: &str) -> Type {
        if let Some(bound) = self.scope.type_param(name) {
            return bound.clone();
        }
        if let Some(owner) = self.registry.lookup(name) {
            return self.registry.reference(owner, Vec::new());
        }
        Type::primitive(name).unwrap_or_else(|| Type::Var(name.to_string()))
    }

    /// Primitive to wrapper class, so methods can be called on it.
    pub(super) fn autobox(&self, ty: Type) -> Type {
        let name = match ty {
            Type::Number => "Number",
            Type::String => "String",
            Type::Boolean => "Boolean",
            other => return other,
        };
        match self.registry.class_id(name) {
            Some(id) => Type::Class { id, name: name.to_string(), args: Vec::new() },
            None => ty,
        }
    }

    pub(super) fn is_assignable(&self, expected: &Type, actual: &Type) -> bool {
        if expected.equals(actual) || matches!(expected, Type::Mixed) || matches!(actual, Type::Var(_)) {
            return true;
        }
        if let Type::Nullable(inner) = expected {
            match actual {
                Type::Null => return true,
                Type::Nullable(actual_inner) => return self.is_assignable(inner, actual_inner),
                _ if self.is_assignable(inner, actual) => return true,
                _ => {}
            }
        }
        if expected.accepts(actual) {
            return true;
        }
        self.supertypes(actual).iter().any(|sup| expected.accepts(sup) || raw_match(expected, sup))
    }

    pub(super) fn check_assignable(&self, expected: &Type, actual: &Type, span: Span) -> Result<(), TypeError> {
        if self.is_assignable(expected, actual) {
            Ok(())
        } else {
            Err(TypeError::mismatch(expected, actual, span))
        }
    }

    /// `ty` and every class or interface it can be used as: super classes
    /// and implemented or extended interfaces, arguments substituted where
    /// the declaration names them.
    pub(super) fn supertypes(&self, ty: &Type) -> Vec<Type> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut pending = vec![ty.clone()];
        while let Some(current) = pending.pop() {
            match &current {
                Type::Class { id, args, .. } => {
                    if !seen.insert(Owner::Class(*id)) {
                        continue;
                    }
                    let class = self.registry.class(*id);
                    let map = bindings(&class.type_params, args);
                    if let Some(parent) = class.superclass {
                        pending.push(self.registry.reference(parent, Vec::new()));
                    }
                    pending.extend(class.implements.iter().map(|i| i.substitute(&map)));
                }
                Type::Interface { id, .. } => {
                    if !seen.insert(Owner::Interface(*id)) {
                        continue;
                    }
                    for parent in &self.registry.interface(*id).extends {
                        pending.push(self.registry.reference(Owner::Interface(*parent), Vec::new()));
                    }
                }
                _ => {}
            }
            out.push(current);
        }
        out
    }

    /// Element type of a `foreach` iterable: only `Array<T>` is iterable
    /// to the checker.
    pub(super) fn element_type(&self, ty: &Type) -> Option<Type> {
        let array = self.registry.class_id("Array")?;
        match ty {
            Type::Class { id, args, .. } if *id == array && args.len() == 1 => Some(args[0].clone()),
            _ => None,
        }
    }
}

/// Same class or interface where one side is written without arguments.
fn raw_match(expected: &Type, actual: &Type) -> bool {
    match (expected, actual) {
        (Type::Class { id: a, args: a_args, .. }, Type::Class { id: b, args: b_args, .. }) => {
            a == b && (a_args.is_empty() || b_args.is_empty())
        }
        (Type::Interface { id: a, args: a_args, .. }, Type::Interface { id: b, args: b_args, .. }) => {
            a == b && (a_args.is_empty() || b_args.is_empty())
        }
        _ => false,
    }
}
