// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Call checking: instance, static, super, lambda and native calls.

use std::collections::HashMap;

use lyra_ast::expr::{Expr, ExprKind};
use lyra_ast::Span;

use super::check_expr::NameBinding;
use super::{TypeChecker, TypeError};
use crate::symbols::{ClassId, MethodSymbol, Owner};
use crate::types::{ParamSymbol, Type};

impl<'a> TypeChecker<'a> {
    pub(super) fn check_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> Result<Type, TypeError> {
        match &callee.kind {
            ExprKind::Super => self.check_super_constructor_call(args, span),
            ExprKind::Member { object, property } => match &object.kind {
                ExprKind::Super => self.check_super_method_call(property, args, span),
                ExprKind::Ident(name) if self.names_class(name) => {
                    let id = self.registry.class_id(name);
                    match id {
                        Some(id) => self.check_static_call(id, property, args, span),
                        None => self.check_instance_call(object, property, args, span),
                    }
                }
                _ => self.check_instance_call(object, property, args, span),
            },
            ExprKind::Ident(name) => {
                let bound = match self.resolve_name(name) {
                    Some(NameBinding::Value(ty)) => Some(ty),
                    Some(NameBinding::Field(field)) => Some(field.ty),
                    None => None,
                };
                match bound {
                    Some(ty) => self.check_function_call(&ty, args, callee.span),
                    None => {
                        let function = self
                            .functions
                            .get(name)
                            .cloned()
                            .ok_or_else(|| TypeError::UnknownFunction { name: name.clone(), span: callee.span })?;
                        self.check_function_call(&function, args, span)
                    }
                }
            }
            _ => {
                let ty = self.check_expr(callee, None)?;
                self.check_function_call(&ty, args, callee.span)
            }
        }
    }

    /// An identifier that is not shadowed by a variable or field and names
    /// a registered class.
    fn names_class(&self, name: &str) -> bool {
        self.resolve_name(name).is_none() && self.registry.class_id(name).is_some()
    }

    fn check_function_call(&mut self, ty: &Type, args: &[Expr], span: Span) -> Result<Type, TypeError> {
        match ty {
            Type::Function { params, ret } => {
                self.check_call_arguments(params, args, &HashMap::new(), span)?;
                Ok((**ret).clone())
            }
            Type::Mixed | Type::Var(_) => {
                for arg in args {
                    self.check_expr(arg, None)?;
                }
                Ok(Type::Mixed)
            }
            other => Err(TypeError::NotCallable { ty: other.clone(), span }),
        }
    }

    fn check_instance_call(
        &mut self,
        object: &Expr,
        method: &str,
        args: &[Expr],
        span: Span,
    ) -> Result<Type, TypeError> {
        let receiver = self.check_expr(object, None)?;
        let receiver = self.autobox(receiver);
        let (symbol, receiver_owner, type_args) = match &receiver {
            Type::Null | Type::Nullable(_) => {
                return Err(TypeError::NullableReceiver { ty: receiver.clone(), method: method.to_string(), span })
            }
            Type::Class { id, args: type_args, .. } => {
                let symbol = match self.registry.resolve_instance_method(*id, method) {
                    Some(symbol) => symbol.clone(),
                    None if self.registry.class(*id).static_methods.contains_key(method) => {
                        return Err(TypeError::StaticAsInstance { method: method.to_string(), span })
                    }
                    None => {
                        return Err(TypeError::UnknownMethod { ty: receiver.clone(), method: method.to_string(), span })
                    }
                };
                (symbol, Owner::Class(*id), type_args.clone())
            }
            Type::Interface { id, args: type_args, .. } => {
                let symbol = self.registry.resolve_interface_method(*id, method).cloned().ok_or_else(|| {
                    TypeError::UnknownMethod { ty: receiver.clone(), method: method.to_string(), span }
                })?;
                (symbol, Owner::Interface(*id), type_args.clone())
            }
            Type::Mixed | Type::Var(_) => {
                for arg in args {
                    self.check_expr(arg, None)?;
                }
                return Ok(Type::Mixed);
            }
            _ => {
                return Err(TypeError::UnknownMethod { ty: receiver.clone(), method: method.to_string(), span })
            }
        };
        if symbol.is_static {
            return Err(TypeError::StaticAsInstance { method: method.to_string(), span });
        }
        self.check_member_access("method", &symbol.name, symbol.visibility, symbol.owner, span)?;
        let map = self.owner_bindings(symbol.owner, receiver_owner, &type_args);
        self.check_call_arguments(&symbol.params, args, &map, span)?;
        Ok(symbol.ret.substitute(&map))
    }

    /// `Class.method(...)`. Static methods are looked up on the class
    /// itself only.
    fn check_static_call(&mut self, id: ClassId, method: &str, args: &[Expr], span: Span) -> Result<Type, TypeError> {
        let class = self.registry.class(id);
        let symbol = match class.static_methods.get(method) {
            Some(symbol) => symbol.clone(),
            None if self.registry.resolve_instance_method(id, method).is_some() => {
                return Err(TypeError::InstanceAsStatic { method: method.to_string(), span })
            }
            None => {
                return Err(TypeError::UnknownMethod {
                    ty: self.registry.reference(Owner::Class(id), Vec::new()),
                    method: method.to_string(),
                    span,
                })
            }
        };
        self.check_member_access("method", &symbol.name, symbol.visibility, symbol.owner, span)?;
        self.check_call_arguments(&symbol.params, args, &HashMap::new(), span)?;
        Ok(symbol.ret)
    }

    fn superclass(&self, span: Span) -> Result<ClassId, TypeError> {
        let current = self.current_class().ok_or(TypeError::SuperOutsideSubclass { span })?;
        match self.registry.class(current).superclass {
            Some(Owner::Class(parent)) => Ok(parent),
            _ => Err(TypeError::SuperOutsideSubclass { span }),
        }
    }

    fn check_super_constructor_call(&mut self, args: &[Expr], span: Span) -> Result<Type, TypeError> {
        let parent = self.superclass(span)?;
        match self.registry.class(parent).constructor.clone() {
            Some(ctor) => self.check_call_arguments(&ctor.params, args, &HashMap::new(), span)?,
            None if !args.is_empty() => {
                return Err(TypeError::TooManyArguments { expected: 0, found: args.len(), span })
            }
            None => {}
        }
        Ok(Type::Void)
    }

    fn check_super_method_call(&mut self, method: &str, args: &[Expr], span: Span) -> Result<Type, TypeError> {
        let parent = self.superclass(span)?;
        let symbol: MethodSymbol = self.registry.resolve_instance_method(parent, method).cloned().ok_or_else(|| {
            TypeError::UnknownMethod {
                ty: self.registry.reference(Owner::Class(parent), Vec::new()),
                method: method.to_string(),
                span,
            }
        })?;
        self.check_member_access("method", &symbol.name, symbol.visibility, symbol.owner, span)?;
        self.check_call_arguments(&symbol.params, args, &HashMap::new(), span)?;
        Ok(symbol.ret)
    }

    /// Check actual arguments against parameters, with `map` applied to
    /// the parameter types. Missing arguments need a default.
    pub(super) fn check_call_arguments(
        &mut self,
        params: &[ParamSymbol],
        args: &[Expr],
        map: &HashMap<String, Type>,
        span: Span,
    ) -> Result<(), TypeError> {
        if args.len() > params.len() {
            return Err(TypeError::TooManyArguments { expected: params.len(), found: args.len(), span });
        }
        self.in_scope(|this| {
            for (i, param) in params.iter().enumerate() {
                let expected = param.ty.substitute(map);
                match args.get(i) {
                    Some(arg) => {
                        let found = this.check_expr(arg, Some(&expected))?;
                        this.check_assignable(&expected, &found, arg.span)?;
                    }
                    None if param.is_optional() => {}
                    None => return Err(TypeError::MissingArgument { param: param.name.clone(), span }),
                }
            }
            Ok(())
        })
    }
}
