// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Object construction.

use std::rc::Rc;

use lyra_ast::Span;

use crate::env::{Environment, ThisBinding};
use crate::native::{ArrayObject, HostValue};
use crate::value::{ClassDefinition, Instance, InstanceRef, Value};

use super::convert::host_values;
use super::{Eval, Interpreter, RuntimeError};

impl Interpreter {
    /// `new Class(args)`.
    pub(crate) fn instantiate(
        &mut self,
        class: &Rc<ClassDefinition>,
        args: Vec<Value>,
        caller: &Environment,
        span: Span,
    ) -> Eval<InstanceRef> {
        if let Some(constructor) = class.native.and_then(|n| n.constructor) {
            let args = match &class.constructor {
                Some(signature) => self.bind_arguments(&signature.params, args, caller, span)?,
                None => args,
            };
            let host = host_values(&args).map_err(|e| e.at(span))?;
            let native = constructor(host).map_err(|e| e.at(span))?;
            let mut instance = Instance::new(class.clone());
            instance.native = Some(native);
            return Ok(instance.into_ref());
        }

        let instance = self.fresh_instance(class);
        if let Some(constructor) = &class.constructor {
            let this = ThisBinding { instance: instance.clone(), class: class.clone() };
            self.invoke(this, constructor, args, caller, span)?;
        }
        Ok(instance)
    }

    /// An instance whose fields and statics are copied from the class-level
    /// objects of the class and its ancestors, root first.
    pub(crate) fn fresh_instance(&self, class: &Rc<ClassDefinition>) -> InstanceRef {
        let mut instance = Instance::new(class.clone());
        for ancestor in self.ancestry(class).iter().rev() {
            let Some(object) = self.class_objects.get(&ancestor.name) else { continue };
            let object = object.borrow();
            instance.fields.extend(object.fields.clone());
            instance.statics.extend(object.statics.clone());
        }
        instance.into_ref()
    }

    /// An `Array` instance holding `items`.
    pub(crate) fn new_array(&self, items: Vec<HostValue>) -> Result<Value, RuntimeError> {
        let class = self.lookup_class("Array")?;
        let mut instance = Instance::new(class);
        instance.native = Some(Rc::new(ArrayObject::from_items(items)));
        Ok(Value::Object(instance.into_ref()))
    }
}
