// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression type checking.

use std::collections::HashMap;

use lyra_ast::expr::{BinOp, Expr, ExprKind, LambdaBody, LambdaExpr, Literal};
use lyra_ast::ty::{TypeRef, TypeRefKind};
use lyra_ast::Span;

use super::{FnContext, TypeChecker, TypeError};
use crate::symbols::{FieldSymbol, Owner, Visibility};
use crate::types::{bindings, Type};

/// What a bare identifier refers to.
pub(super) enum NameBinding {
    Value(Type),
    Field(FieldSymbol),
}

impl<'a> TypeChecker<'a> {
    /// Type of `expr`. `expected` guides inference of empty arrays and of
    /// type arguments omitted from `new`.
    pub(super) fn check_expr(&mut self, expr: &Expr, expected: Option<&Type>) -> Result<Type, TypeError> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(match lit {
                Literal::Number(_) => Type::Number,
                Literal::String(_) => Type::String,
                Literal::Bool(_) => Type::Boolean,
                Literal::Null => Type::Null,
            }),
            ExprKind::Array(items) => self.check_array(items, expected),
            ExprKind::Index { object, index } => {
                let object_ty = self.check_expr(object, None)?;
                self.check_expr(index, None)?;
                match self.autobox(object_ty) {
                    Type::Class { args, .. } => Ok(args.into_iter().next().unwrap_or(Type::Mixed)),
                    Type::Mixed | Type::Var(_) => Ok(Type::Mixed),
                    ty => Err(TypeError::NotIndexable { ty, span: object.span }),
                }
            }
            ExprKind::Unary { operand, .. } => {
                let ty = self.check_expr(operand, Some(&Type::Boolean))?;
                if Type::Boolean.equals(&ty) {
                    Ok(Type::Boolean)
                } else {
                    Err(TypeError::InvalidNot { ty, span: operand.span })
                }
            }
            ExprKind::Member { object, property } => {
                Ok(self.member_field(object, property, expr.span)?.map(|(_, ty)| ty).unwrap_or(Type::Mixed))
            }
            ExprKind::This => match self.current_class() {
                Some(id) => Ok(self.registry.reference(Owner::Class(id), Vec::new())),
                None => Err(TypeError::ThisOutsideClass { span: expr.span }),
            },
            ExprKind::Super => Err(TypeError::BareSuper { span: expr.span }),
            ExprKind::Ident(name) => self.check_ident(name, expr.span),
            ExprKind::New { ty, args } => self.check_new(ty, args, expected, expr.span),
            ExprKind::Binary { op, left, right } => self.check_binary(*op, left, right, expr.span),
            ExprKind::Assign { target, value } => self.check_assign(target, value),
            ExprKind::Lambda(lambda) => self.check_lambda(lambda, expr.span),
            ExprKind::Call { callee, args } => self.check_call(callee, args, expr.span),
        }
    }

    fn check_array(&mut self, items: &[Expr], expected: Option<&Type>) -> Result<Type, TypeError> {
        let hinted = expected.and_then(|e| self.array_element_hint(e));
        let item = match (items.first(), hinted) {
            (_, Some(hinted)) => hinted,
            (None, None) => Type::Mixed,
            (Some(first), None) => self.check_expr(first, None)?,
        };
        for element in items {
            let found = self.check_expr(element, Some(&item))?;
            if !self.is_assignable(&item, &found) {
                return Err(TypeError::ArrayElement { expected: item, found, span: element.span });
            }
        }
        Ok(self.array_of(item))
    }

    /// Element type named by an expected `Array<T>` (or `Array<T>?`).
    fn array_element_hint(&self, expected: &Type) -> Option<Type> {
        let array = self.registry.class_id("Array")?;
        match expected {
            Type::Nullable(inner) => self.array_element_hint(inner),
            Type::Class { id, args, .. } if *id == array && args.len() == 1 => Some(args[0].clone()),
            _ => None,
        }
    }

    pub(super) fn array_of(&self, item: Type) -> Type {
        match self.registry.class_id("Array") {
            Some(id) => self.registry.reference(Owner::Class(id), vec![item]),
            None => Type::Mixed,
        }
    }

    /// A binding of the current body, then a field of the current class,
    /// then a binding of the enclosing program, then a class or interface
    /// name used as a value.
    fn check_ident(&mut self, name: &str, span: Span) -> Result<Type, TypeError> {
        match self.resolve_name(name) {
            Some(NameBinding::Value(ty)) => return Ok(ty),
            Some(NameBinding::Field(field)) => {
                self.check_member_access("field", &field.name, field.visibility, field.owner, span)?;
                return Ok(field.ty);
            }
            None => {}
        }
        match self.registry.lookup(name) {
            Some(owner) => Ok(self.registry.reference(owner, Vec::new())),
            None => Err(TypeError::Undefined { name: name.to_string(), span }),
        }
    }

    /// What a bare identifier names, in the order the interpreter's
    /// environment resolves it.
    pub(super) fn resolve_name(&self, name: &str) -> Option<NameBinding> {
        if let Some(ty) = self.scope.lookup_local(name) {
            return Some(NameBinding::Value(ty.clone()));
        }
        if let Some(field) = self.bare_field(name) {
            return Some(NameBinding::Field(field));
        }
        self.scope.lookup_enclosing(name).map(|ty| NameBinding::Value(ty.clone()))
    }

    /// Field of the current class (or an ancestor) named without `this.`.
    pub(super) fn bare_field(&self, name: &str) -> Option<FieldSymbol> {
        let id = self.current_class()?;
        self.registry
            .resolve_instance_field(id, name)
            .or_else(|| self.registry.resolve_static_field(id, name))
            .cloned()
    }

    /// Resolve `object.property` to a field and its type as seen through
    /// the receiver. `None` for receivers that are not checked (`mixed`,
    /// type variables).
    fn member_field(
        &mut self,
        object: &Expr,
        property: &str,
        span: Span,
    ) -> Result<Option<(FieldSymbol, Type)>, TypeError> {
        let receiver = self.check_expr(object, None)?;
        let (field, owner, args) = match &receiver {
            Type::Class { id, args, .. } => {
                let field = self
                    .registry
                    .resolve_instance_field(*id, property)
                    .or_else(|| self.registry.resolve_static_field(*id, property));
                (field.cloned(), Owner::Class(*id), args.clone())
            }
            Type::Interface { id, args, .. } => {
                let field = self.registry.resolve_interface_field(*id, property);
                (field.cloned(), Owner::Interface(*id), args.clone())
            }
            Type::Mixed | Type::Var(_) => return Ok(None),
            _ => {
                return Err(TypeError::NotAnObject { ty: receiver.clone(), member: property.to_string(), span });
            }
        };
        let field =
            field.ok_or_else(|| TypeError::UnknownMember { ty: receiver.clone(), member: property.to_string(), span })?;
        self.check_member_access("field", &field.name, field.visibility, field.owner, span)?;
        let map = self.owner_bindings(field.owner, owner, &args);
        let ty = field.ty.substitute(&map);
        Ok(Some((field, ty)))
    }

    /// Non-public members are reachable from their owner and from classes
    /// whose direct superclass is the owner. Interface members are public.
    pub(super) fn check_member_access(
        &self,
        kind: &'static str,
        name: &str,
        visibility: Visibility,
        owner: Owner,
        span: Span,
    ) -> Result<(), TypeError> {
        if visibility == Visibility::Public
            || matches!(owner, Owner::Interface(_))
            || self.registry.can_access(self.scope.current_object(), owner)
        {
            return Ok(());
        }
        Err(TypeError::Private {
            kind,
            name: name.to_string(),
            owner: self.registry.owner_name(owner).to_string(),
            span,
        })
    }

    /// Type-parameter bindings of `owner` when it is the receiver's own
    /// declaration. Members inherited from elsewhere keep their variables.
    pub(super) fn owner_bindings(&self, owner: Owner, receiver: Owner, args: &[Type]) -> HashMap<String, Type> {
        if owner == receiver {
            bindings(self.registry.type_params(owner), args)
        } else {
            HashMap::new()
        }
    }

    fn check_new(
        &mut self,
        ty: &TypeRef,
        args: &[Expr],
        expected: Option<&Type>,
        span: Span,
    ) -> Result<Type, TypeError> {
        let name = ty.base_name().ok_or_else(|| TypeError::NotAClass { name: ty.to_string(), span: ty.span })?;
        let id = match self.registry.lookup(name) {
            Some(Owner::Class(id)) => id,
            Some(Owner::Interface(_)) => {
                return Err(TypeError::InstantiateInterface { name: name.to_string(), span: ty.span })
            }
            None => return Err(TypeError::UnknownClass { name: name.to_string(), span: ty.span }),
        };
        let type_params = self.registry.class(id).type_params.clone();
        let type_args = match &ty.kind {
            TypeRefKind::Generic { args, .. } => {
                let resolved = args.iter().map(|a| self.resolve_type(a)).collect::<Result<Vec<_>, _>>()?;
                if resolved.len() != type_params.len() {
                    return Err(TypeError::TypeArgumentCount {
                        name: name.to_string(),
                        expected: type_params.len(),
                        found: resolved.len(),
                        span: ty.span,
                    });
                }
                resolved
            }
            _ => match expected.map(strip_nullable) {
                Some(Type::Class { id: wanted, args, .. }) if *wanted == id && args.len() == type_params.len() => {
                    args.clone()
                }
                _ => vec![Type::Mixed; type_params.len()],
            },
        };

        let map = bindings(&type_params, &type_args);
        if let Some(ctor) = self.registry.class(id).constructor.clone() {
            self.check_call_arguments(&ctor.params, args, &map, span)?;
        }

        let instance = self.registry.reference(Owner::Class(id), type_args);
        if let Some(expected) = expected {
            self.check_assignable(expected, &instance, span)?;
        }
        Ok(instance)
    }

    fn check_binary(&mut self, op: BinOp, left: &Expr, right: &Expr, span: Span) -> Result<Type, TypeError> {
        let l = self.check_expr(left, None)?;
        let r = self.check_expr(right, None)?;
        let result = if op.is_arithmetic() {
            if l.accepts(&Type::Number) && r.accepts(&Type::Number) {
                Some(Type::Number)
            } else if l.accepts(&Type::String) || r.accepts(&Type::String) {
                Some(Type::String)
            } else {
                None
            }
        } else if op.is_comparison() {
            (l.accepts(&Type::Number) && r.accepts(&Type::Number)).then_some(Type::Boolean)
        } else if op.is_equality() {
            l.accepts(&r).then_some(Type::Boolean)
        } else {
            (l.accepts(&Type::Boolean) && r.accepts(&Type::Boolean)).then_some(Type::Boolean)
        };
        result.ok_or(TypeError::InvalidBinary { op: op.symbol(), left: l, right: r, span })
    }

    fn check_assign(&mut self, target: &Expr, value: &Expr) -> Result<Type, TypeError> {
        let target_ty = match &target.kind {
            ExprKind::Ident(name) => match self.resolve_name(name) {
                Some(NameBinding::Value(ty)) => ty,
                Some(NameBinding::Field(field)) => {
                    self.check_member_access("field", &field.name, field.visibility, field.owner, target.span)?;
                    self.check_field_write(&field, target.span)?;
                    field.ty
                }
                None => return Err(TypeError::Undefined { name: name.clone(), span: target.span }),
            },
            ExprKind::Member { object, property } => match self.member_field(object, property, target.span)? {
                Some((field, ty)) => {
                    self.check_field_write(&field, target.span)?;
                    ty
                }
                None => Type::Mixed,
            },
            _ => self.check_expr(target, None)?,
        };
        let found = self.check_expr(value, Some(&target_ty))?;
        self.check_assignable(&target_ty, &found, value.span)?;
        Ok(target_ty)
    }

    /// Readonly fields are written only by a constructor of their owner.
    fn check_field_write(&self, field: &FieldSymbol, span: Span) -> Result<(), TypeError> {
        if !field.readonly {
            return Ok(());
        }
        let in_owner_constructor = self
            .fn_stack
            .last()
            .and_then(|f| f.constructor_of)
            .is_some_and(|id| Owner::Class(id) == field.owner);
        if in_owner_constructor {
            Ok(())
        } else {
            Err(TypeError::ReadonlyField { field: field.name.clone(), span })
        }
    }

    /// Without a written return type, an expression body gives its own
    /// type and a block body the type returned by its first statement.
    fn check_lambda(&mut self, lambda: &LambdaExpr, span: Span) -> Result<Type, TypeError> {
        self.in_scope(|this| {
            let params = lambda.params.iter().map(|p| this.param_symbol(p)).collect::<Result<Vec<_>, _>>()?;
            for param in &params {
                this.scope.define(param.name.clone(), param.ty.clone());
            }
            let declared = lambda.ret.as_ref().map(|r| this.resolve_type(r)).transpose()?;
            let ctx = FnContext {
                name: "lambda".to_string(),
                ret: declared.clone().unwrap_or(Type::Mixed),
                constructor_of: None,
            };
            let ret = this.in_function(ctx, |this| match &lambda.body {
                LambdaBody::Expr(body) => {
                    let found = this.check_expr(body, declared.as_ref())?;
                    match &declared {
                        Some(declared) => {
                            this.check_assignable(declared, &found, body.span)?;
                            Ok(declared.clone())
                        }
                        None => Ok(found),
                    }
                }
                LambdaBody::Block(stmts) if stmts.is_empty() => Err(TypeError::LambdaReturnType { span }),
                LambdaBody::Block(stmts) => {
                    let mut first = None;
                    for (i, stmt) in stmts.iter().enumerate() {
                        let flow = this.check_statement(stmt)?;
                        if i == 0 {
                            first = flow;
                        }
                    }
                    match (&declared, first) {
                        (Some(declared), _) => Ok(declared.clone()),
                        (None, Some(found)) => Ok(found),
                        (None, None) => Err(TypeError::LambdaReturnType { span }),
                    }
                }
            })?;
            Ok(Type::Function { params, ret: Box::new(ret) })
        })
    }
}

fn strip_nullable(ty: &Type) -> &Type {
    match ty {
        Type::Nullable(inner) => inner,
        other => other,
    }
}
