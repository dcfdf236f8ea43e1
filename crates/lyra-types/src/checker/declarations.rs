// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Symbol collection: classes, interfaces and their members.

use indexmap::IndexMap;
use lyra_ast::decl::{ClassDecl, DeclKind, FieldDecl, InterfaceDecl, Member, MethodDecl, Param, Program};
use lyra_ast::Span;
use tracing::{trace, warn};

use super::{TypeChecker, TypeError};
use crate::symbols::{ClassId, FieldSymbol, InterfaceId, MethodSymbol, Owner, Visibility};
use crate::types::{ParamSymbol, Type};

impl<'a> TypeChecker<'a> {
    /// Register every class and interface name of `program` without
    /// members, so later member resolution sees all names. Names already
    /// registered are left alone.
    pub fn declare_shells(&mut self, program: &'a Program, native: bool) {
        for decl in &program.decls {
            match &decl.kind {
                DeclKind::Class(class) => {
                    let declared = self.registry.declare_class(
                        &class.name,
                        class.type_params.clone(),
                        class.superclass.clone(),
                        class.span,
                    );
                    if let Some(id) = declared {
                        let symbol = self.registry.class_mut(id);
                        symbol.native = native;
                        symbol.open = class.modifiers.open;
                        self.class_decls.insert(id, class);
                    }
                }
                DeclKind::Interface(iface) => {
                    let declared = self.registry.declare_interface(
                        &iface.name,
                        iface.type_params.clone(),
                        iface.extends.clone(),
                        iface.span,
                    );
                    if let Some(id) = declared {
                        self.interface_decls.insert(id, iface);
                    }
                }
                DeclKind::Import(_) | DeclKind::Stmt(_) => {}
            }
        }
    }

    /// Collect the symbols declared by `program`. Idempotent per name.
    pub fn collect_all_symbols_from_node(&mut self, program: &'a Program) -> Result<(), TypeError> {
        self.declare_shells(program, false);
        for decl in &program.decls {
            match &decl.kind {
                DeclKind::Class(class) => match self.owned_class(class) {
                    Some(id) => self.register_class_symbol(id, class)?,
                    None => warn!(class = %class.name, "class already declared; this declaration is ignored"),
                },
                DeclKind::Interface(iface) => match self.owned_interface(iface) {
                    Some(id) => self.register_interface_symbol(id, iface)?,
                    None => warn!(interface = %iface.name, "name already declared; this declaration is ignored"),
                },
                DeclKind::Import(_) | DeclKind::Stmt(_) => {}
            }
        }
        Ok(())
    }

    /// Every super class name must name a registered class or interface.
    pub fn validate_inheritance(&mut self) -> Result<(), TypeError> {
        let pending: Vec<(ClassId, String, Span)> = self
            .registry
            .classes()
            .filter_map(|c| c.superclass_name.clone().map(|name| (c.id, name, c.span)))
            .collect();
        for (id, name, span) in pending {
            let parent = self.registry.lookup(&name).ok_or(TypeError::UnknownSuperclass { name, span })?;
            self.registry.class_mut(id).superclass = Some(parent);
        }
        Ok(())
    }

    /// The registered id of `class`, if this very declaration owns the name.
    fn owned_class(&self, class: &ClassDecl) -> Option<ClassId> {
        let id = self.registry.class_id(&class.name)?;
        let owner = self.class_decls.get(&id)?;
        std::ptr::eq(*owner, class).then_some(id)
    }

    fn owned_interface(&self, iface: &InterfaceDecl) -> Option<InterfaceId> {
        let id = self.registry.interface_id(&iface.name)?;
        let owner = self.interface_decls.get(&id)?;
        std::ptr::eq(*owner, iface).then_some(id)
    }

    fn register_class_symbol(&mut self, id: ClassId, decl: &ClassDecl) -> Result<(), TypeError> {
        if self.registry.class(id).complete {
            return Ok(());
        }
        trace!(class = %decl.name, "registering class");
        let owner = Owner::Class(id);
        if let Some(parent) = decl.superclass.as_deref().and_then(|name| self.registry.lookup(name)) {
            self.registry.class_mut(id).superclass = Some(parent);
        }

        self.in_object_scope(owner, |this| {
            let mut implements = Vec::new();
            for written in &decl.implements {
                match this.resolve_type(written)? {
                    ty @ Type::Interface { .. } => implements.push(ty),
                    _ => {
                        return Err(TypeError::NotAnInterface { name: written.to_string(), span: written.span })
                    }
                }
            }

            let mut instance_fields = IndexMap::new();
            let mut static_fields = IndexMap::new();
            let mut instance_methods = IndexMap::new();
            let mut static_methods = IndexMap::new();
            let mut constructor = None;
            for member in &decl.members {
                match member {
                    Member::Field(field) => {
                        let symbol = this.field_symbol(field, owner)?;
                        let map = if symbol.is_static { &mut static_fields } else { &mut instance_fields };
                        insert_unique(map, symbol.name.clone(), symbol, &decl.name, field.span)?;
                    }
                    Member::Method(method) => {
                        let symbol = this.method_symbol(method, owner)?;
                        if method.is_constructor() {
                            constructor = Some(symbol);
                        } else {
                            let map = if symbol.is_static { &mut static_methods } else { &mut instance_methods };
                            insert_unique(map, symbol.name.clone(), symbol, &decl.name, method.span)?;
                        }
                    }
                }
            }

            let class = this.registry.class_mut(id);
            class.implements = implements;
            class.instance_fields = instance_fields;
            class.static_fields = static_fields;
            class.instance_methods = instance_methods;
            class.static_methods = static_methods;
            class.constructor = constructor;
            class.complete = true;
            Ok(())
        })
    }

    fn register_interface_symbol(&mut self, id: InterfaceId, decl: &InterfaceDecl) -> Result<(), TypeError> {
        if self.registry.interface(id).complete {
            return Ok(());
        }
        trace!(interface = %decl.name, "registering interface");
        let mut extends = Vec::new();
        for name in &decl.extends {
            match self.registry.lookup(name) {
                Some(Owner::Interface(parent)) => extends.push(parent),
                Some(Owner::Class(_)) => {
                    return Err(TypeError::NotAnInterface { name: name.clone(), span: decl.span })
                }
                None => return Err(TypeError::UnknownInterface { name: name.clone(), span: decl.span }),
            }
        }

        let owner = Owner::Interface(id);
        self.in_object_scope(owner, |this| {
            let mut static_fields = IndexMap::new();
            let mut methods = IndexMap::new();
            for member in &decl.members {
                match member {
                    Member::Field(field) => {
                        let mut symbol = this.field_symbol(field, owner)?;
                        symbol.is_static = true;
                        insert_unique(&mut static_fields, symbol.name.clone(), symbol, &decl.name, field.span)?;
                    }
                    Member::Method(method) => {
                        let symbol = this.method_symbol(method, owner)?;
                        insert_unique(&mut methods, symbol.name.clone(), symbol, &decl.name, method.span)?;
                    }
                }
            }
            let iface = this.registry.interface_mut(id);
            iface.extends = extends;
            iface.static_fields = static_fields;
            iface.methods = methods;
            iface.complete = true;
            Ok(())
        })
    }

    fn field_symbol(&self, field: &FieldDecl, owner: Owner) -> Result<FieldSymbol, TypeError> {
        Ok(FieldSymbol {
            name: field.name.clone(),
            ty: self.resolve_optional(field.ty.as_ref(), Type::Mixed)?,
            is_static: field.modifiers.is_static,
            readonly: field.modifiers.readonly,
            visibility: Visibility::from_modifiers(&field.modifiers),
            owner,
            span: field.span,
        })
    }

    fn method_symbol(&mut self, method: &MethodDecl, owner: Owner) -> Result<MethodSymbol, TypeError> {
        self.in_scope(|this| {
            this.scope.bind_type_params(&method.type_params);
            let params = method.params.iter().map(|p| this.param_symbol(p)).collect::<Result<Vec<_>, _>>()?;
            let ret = if method.is_constructor() {
                Type::Void
            } else {
                this.resolve_optional(method.ret.as_ref(), Type::Void)?
            };
            Ok(MethodSymbol {
                name: method.name.clone(),
                type_params: method.type_params.clone(),
                params,
                ret,
                is_static: method.modifiers.is_static,
                visibility: Visibility::from_modifiers(&method.modifiers),
                owner,
                has_body: method.body.is_some(),
                span: method.span,
            })
        })
    }

    /// Resolve a parameter. A default value is checked against the
    /// declared type when both are written.
    pub(super) fn param_symbol(&mut self, param: &Param) -> Result<ParamSymbol, TypeError> {
        let ty = self.resolve_optional(param.ty.as_ref(), Type::Mixed)?;
        let default = match &param.default {
            Some(expr) => {
                let found = self.check_expr(expr, Some(&ty))?;
                if param.ty.is_some() && !self.is_assignable(&ty, &found) {
                    return Err(TypeError::DefaultMismatch {
                        param: param.name.clone(),
                        expected: ty,
                        found,
                        span: expr.span,
                    });
                }
                Some(found)
            }
            None => None,
        };
        Ok(ParamSymbol { name: param.name.clone(), ty, default })
    }
}

fn insert_unique<T>(
    map: &mut IndexMap<String, T>,
    name: String,
    value: T,
    owner: &str,
    span: Span,
) -> Result<(), TypeError> {
    if map.contains_key(&name) {
        return Err(TypeError::DuplicateMember { owner: owner.to_string(), member: name, span });
    }
    map.insert(name, value);
    Ok(())
}
