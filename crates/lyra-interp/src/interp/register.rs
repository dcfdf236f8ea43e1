// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Class and interface declaration evaluation.

use std::rc::Rc;

use indexmap::IndexMap;
use lyra_ast::decl::{ClassDecl, InterfaceDecl};
use tracing::debug;

use crate::native;
use crate::value::{ClassDefinition, FieldDefinition, Instance, InterfaceDefinition, Value};

use super::cast::cast_to;
use super::{Eval, Interpreter};

impl Interpreter {
    /// Evaluate a class declaration: build its definition (or reuse the one
    /// already registered under that name), evaluate field initializers
    /// into a class-level object and bind that object to the class name.
    /// Classes are not hoisted.
    pub(crate) fn eval_class(&mut self, decl: &ClassDecl, native: bool) -> Eval<()> {
        let class = match self.classes.get(&decl.name) {
            Some(existing) => existing.clone(),
            None => {
                let host = if native { native::native_class(&decl.name) } else { None };
                Rc::new(ClassDefinition::from_decl(decl, host))
            }
        };
        debug!(class = %class.name, native = class.native.is_some(), "evaluating class");

        let mut object = Instance::new(class.clone());
        object.fields = self.eval_fields(&class.instance_fields)?;
        object.statics = self.eval_fields(&class.static_fields)?;
        let object = object.into_ref();

        self.globals.define(class.name.clone(), Value::Object(object.clone()));
        self.class_objects.insert(class.name.clone(), object);
        self.classes.insert(class.name.clone(), class);
        Ok(())
    }

    /// Interfaces only carry static fields at runtime. Fields of extended
    /// interfaces are visible through the extending one.
    pub(crate) fn eval_interface(&mut self, decl: &InterfaceDecl) -> Eval<()> {
        let iface = match self.interfaces.get(&decl.name) {
            Some(existing) => existing.clone(),
            None => Rc::new(InterfaceDefinition::from(decl)),
        };
        debug!(interface = %iface.name, "evaluating interface");

        let class = Rc::new(ClassDefinition::from_interface(&iface));
        let mut object = Instance::new(class.clone());
        for parent in &iface.extends {
            if let Some(parent) = self.class_objects.get(parent) {
                object.statics.extend(parent.borrow().statics.clone());
            }
        }
        object.statics.extend(self.eval_fields(&class.static_fields)?);
        let object = object.into_ref();

        self.globals.define(iface.name.clone(), Value::Object(object.clone()));
        self.class_objects.insert(iface.name.clone(), object);
        self.interfaces.insert(iface.name.clone(), iface);
        Ok(())
    }

    /// Initializers run in the global environment; missing ones are null.
    fn eval_fields(&mut self, fields: &[FieldDefinition]) -> Eval<IndexMap<String, Value>> {
        let globals = self.globals.clone();
        let mut values = IndexMap::new();
        for field in fields {
            let value = match &field.init {
                Some(init) => cast_to(self.eval_expr(init, &globals)?, field.ty.as_ref()),
                None => Value::Null,
            };
            values.insert(field.name.clone(), value);
        }
        Ok(values)
    }
}
