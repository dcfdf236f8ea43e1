// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Class and interface symbols.
//!
//! Symbols live in a [`TypeRegistry`] arena and are addressed by id.
//! Registration is idempotent by name: the first declaration of a name
//! wins and later ones are ignored.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use lyra_ast::decl::Modifiers;
use lyra_ast::Span;

use crate::types::{ParamSymbol, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceId(pub u32);

/// The class or interface a member (or a super link) refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Class(ClassId),
    Interface(InterfaceId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
    /// Neither modifier written.
    Default,
}

impl Visibility {
    pub fn from_modifiers(modifiers: &Modifiers) -> Self {
        if modifiers.public {
            Visibility::Public
        } else if modifiers.private {
            Visibility::Private
        } else {
            Visibility::Default
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSymbol {
    pub name: String,
    pub ty: Type,
    pub is_static: bool,
    pub readonly: bool,
    pub visibility: Visibility,
    pub owner: Owner,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MethodSymbol {
    pub name: String,
    pub type_params: Vec<String>,
    pub params: Vec<ParamSymbol>,
    pub ret: Type,
    pub is_static: bool,
    pub visibility: Visibility,
    pub owner: Owner,
    pub has_body: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ClassSymbol {
    pub id: ClassId,
    pub name: String,
    pub span: Span,
    pub type_params: Vec<String>,
    pub superclass_name: Option<String>,
    /// Set once the super name resolves to a registered symbol.
    pub superclass: Option<Owner>,
    pub instance_fields: IndexMap<String, FieldSymbol>,
    pub static_fields: IndexMap<String, FieldSymbol>,
    pub instance_methods: IndexMap<String, MethodSymbol>,
    pub static_methods: IndexMap<String, MethodSymbol>,
    pub constructor: Option<MethodSymbol>,
    /// Resolved `implements` clauses, all `Type::Interface`.
    pub implements: Vec<Type>,
    pub open: bool,
    pub native: bool,
    /// Members have been resolved.
    pub complete: bool,
}

#[derive(Debug, Clone)]
pub struct InterfaceSymbol {
    pub id: InterfaceId,
    pub name: String,
    pub span: Span,
    pub type_params: Vec<String>,
    pub extends_names: Vec<String>,
    pub extends: Vec<InterfaceId>,
    pub static_fields: IndexMap<String, FieldSymbol>,
    pub methods: IndexMap<String, MethodSymbol>,
    pub complete: bool,
}

/// All class and interface symbols of one check.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    classes: Vec<ClassSymbol>,
    interfaces: Vec<InterfaceSymbol>,
    names: HashMap<String, Owner>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty class. Returns `None` when the name is taken.
    pub fn declare_class(
        &mut self,
        name: &str,
        type_params: Vec<String>,
        superclass_name: Option<String>,
        span: Span,
    ) -> Option<ClassId> {
        if self.names.contains_key(name) {
            return None;
        }
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(ClassSymbol {
            id,
            name: name.to_string(),
            span,
            type_params,
            superclass_name,
            superclass: None,
            instance_fields: IndexMap::new(),
            static_fields: IndexMap::new(),
            instance_methods: IndexMap::new(),
            static_methods: IndexMap::new(),
            constructor: None,
            implements: Vec::new(),
            open: false,
            native: false,
            complete: false,
        });
        self.names.insert(name.to_string(), Owner::Class(id));
        Some(id)
    }

    /// Register an empty interface. Returns `None` when the name is taken.
    pub fn declare_interface(
        &mut self,
        name: &str,
        type_params: Vec<String>,
        extends_names: Vec<String>,
        span: Span,
    ) -> Option<InterfaceId> {
        if self.names.contains_key(name) {
            return None;
        }
        let id = InterfaceId(self.interfaces.len() as u32);
        self.interfaces.push(InterfaceSymbol {
            id,
            name: name.to_string(),
            span,
            type_params,
            extends_names,
            extends: Vec::new(),
            static_fields: IndexMap::new(),
            methods: IndexMap::new(),
            complete: false,
        });
        self.names.insert(name.to_string(), Owner::Interface(id));
        Some(id)
    }

    pub fn lookup(&self, name: &str) -> Option<Owner> {
        self.names.get(name).copied()
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        match self.lookup(name)? {
            Owner::Class(id) => Some(id),
            Owner::Interface(_) => None,
        }
    }

    pub fn interface_id(&self, name: &str) -> Option<InterfaceId> {
        match self.lookup(name)? {
            Owner::Interface(id) => Some(id),
            Owner::Class(_) => None,
        }
    }

    pub fn class(&self, id: ClassId) -> &ClassSymbol {
        &self.classes[id.0 as usize]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassSymbol {
        &mut self.classes[id.0 as usize]
    }

    pub fn interface(&self, id: InterfaceId) -> &InterfaceSymbol {
        &self.interfaces[id.0 as usize]
    }

    pub fn interface_mut(&mut self, id: InterfaceId) -> &mut InterfaceSymbol {
        &mut self.interfaces[id.0 as usize]
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassSymbol> {
        self.classes.iter()
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &InterfaceSymbol> {
        self.interfaces.iter()
    }

    pub fn owner_name(&self, owner: Owner) -> &str {
        match owner {
            Owner::Class(id) => &self.class(id).name,
            Owner::Interface(id) => &self.interface(id).name,
        }
    }

    pub fn type_params(&self, owner: Owner) -> &[String] {
        match owner {
            Owner::Class(id) => &self.class(id).type_params,
            Owner::Interface(id) => &self.interface(id).type_params,
        }
    }

    /// Reference type to a symbol with the given arguments.
    pub fn reference(&self, owner: Owner, args: Vec<Type>) -> Type {
        match owner {
            Owner::Class(id) => Type::Class { id, name: self.class(id).name.clone(), args },
            Owner::Interface(id) => Type::Interface { id, name: self.interface(id).name.clone(), args },
        }
    }

    /// `id` followed by its ancestors, nearest first. Stops on a cycle.
    pub fn ancestry(&self, id: ClassId) -> Vec<ClassId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(id);
        while let Some(class) = current {
            if !seen.insert(class) {
                break;
            }
            chain.push(class);
            current = match self.class(class).superclass {
                Some(Owner::Class(parent)) => Some(parent),
                _ => None,
            };
        }
        chain
    }

    /// Whether `ancestor` is `id` or one of its super classes.
    pub fn is_subclass_of(&self, id: ClassId, ancestor: ClassId) -> bool {
        self.ancestry(id).contains(&ancestor)
    }

    pub fn resolve_instance_method(&self, id: ClassId, name: &str) -> Option<&MethodSymbol> {
        self.ancestry(id).into_iter().find_map(|c| self.class(c).instance_methods.get(name))
    }

    pub fn resolve_instance_field(&self, id: ClassId, name: &str) -> Option<&FieldSymbol> {
        self.ancestry(id).into_iter().find_map(|c| self.class(c).instance_fields.get(name))
    }

    pub fn resolve_static_field(&self, id: ClassId, name: &str) -> Option<&FieldSymbol> {
        self.ancestry(id).into_iter().find_map(|c| self.class(c).static_fields.get(name))
    }

    /// `id` followed by every interface it extends, breadth first.
    pub fn interface_ancestry(&self, id: InterfaceId) -> Vec<InterfaceId> {
        let mut order = vec![id];
        let mut seen: HashSet<InterfaceId> = order.iter().copied().collect();
        let mut i = 0;
        while i < order.len() {
            for parent in &self.interface(order[i]).extends {
                if seen.insert(*parent) {
                    order.push(*parent);
                }
            }
            i += 1;
        }
        order
    }

    pub fn resolve_interface_method(&self, id: InterfaceId, name: &str) -> Option<&MethodSymbol> {
        self.interface_ancestry(id).into_iter().find_map(|i| self.interface(i).methods.get(name))
    }

    pub fn resolve_interface_field(&self, id: InterfaceId, name: &str) -> Option<&FieldSymbol> {
        self.interface_ancestry(id).into_iter().find_map(|i| self.interface(i).static_fields.get(name))
    }

    /// Whether code running with `current` as its object may touch a
    /// non-public member of `owner`: only the owner itself and classes
    /// whose direct super link is the owner.
    pub fn can_access(&self, current: Option<Owner>, owner: Owner) -> bool {
        match current {
            None => false,
            Some(current) if current == owner => true,
            Some(Owner::Class(id)) => self.class(id).superclass == Some(owner),
            Some(Owner::Interface(_)) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_chain(names: &[&str]) -> (TypeRegistry, Vec<ClassId>) {
        let mut reg = TypeRegistry::new();
        let ids: Vec<_> = names
            .iter()
            .map(|n| reg.declare_class(n, vec![], None, Span::default()).unwrap())
            .collect();
        for pair in ids.windows(2) {
            reg.class_mut(pair[1]).superclass = Some(Owner::Class(pair[0]));
        }
        (reg, ids)
    }

    fn method(name: &str, owner: Owner) -> MethodSymbol {
        MethodSymbol {
            name: name.into(),
            type_params: vec![],
            params: vec![],
            ret: Type::Void,
            is_static: false,
            visibility: Visibility::Private,
            owner,
            has_body: true,
            span: Span::default(),
        }
    }

    #[test]
    fn registration_is_idempotent() {
        let mut reg = TypeRegistry::new();
        assert!(reg.declare_class("A", vec![], None, Span::default()).is_some());
        assert!(reg.declare_class("A", vec![], None, Span::default()).is_none());
        assert!(reg.declare_interface("A", vec![], vec![], Span::default()).is_none());
        assert_eq!(reg.classes().count(), 1);
    }

    #[test]
    fn methods_resolve_through_ancestors() {
        let (mut reg, ids) = registry_with_chain(&["Base", "Mid", "Leaf"]);
        let owner = Owner::Class(ids[0]);
        reg.class_mut(ids[0]).instance_methods.insert("greet".into(), method("greet", owner));
        let found = reg.resolve_instance_method(ids[2], "greet").unwrap();
        assert_eq!(found.owner, owner);
        assert!(reg.resolve_instance_method(ids[2], "missing").is_none());
        assert!(reg.is_subclass_of(ids[2], ids[0]));
        assert!(!reg.is_subclass_of(ids[0], ids[2]));
    }

    #[test]
    fn cyclic_super_links_terminate() {
        let (mut reg, ids) = registry_with_chain(&["A", "B"]);
        reg.class_mut(ids[0]).superclass = Some(Owner::Class(ids[1]));
        assert_eq!(reg.ancestry(ids[0]).len(), 2);
        assert!(reg.resolve_instance_method(ids[0], "anything").is_none());
        assert!(reg.resolve_instance_field(ids[1], "anything").is_none());
    }

    #[test]
    fn cyclic_interfaces_terminate() {
        let mut reg = TypeRegistry::new();
        let a = reg.declare_interface("A", vec![], vec![], Span::default()).unwrap();
        let b = reg.declare_interface("B", vec![], vec![], Span::default()).unwrap();
        reg.interface_mut(a).extends = vec![b];
        reg.interface_mut(b).extends = vec![a];
        assert_eq!(reg.interface_ancestry(a), vec![a, b]);
    }

    #[test]
    fn private_access_reaches_one_level_down() {
        let (reg, ids) = registry_with_chain(&["A", "B", "C"]);
        let owner = Owner::Class(ids[0]);
        assert!(reg.can_access(Some(owner), owner));
        assert!(reg.can_access(Some(Owner::Class(ids[1])), owner));
        assert!(!reg.can_access(Some(Owner::Class(ids[2])), owner));
        assert!(!reg.can_access(None, owner));
    }
}
