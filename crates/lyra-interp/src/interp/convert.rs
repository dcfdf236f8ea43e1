// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversion between interpreter values and host values, and autoboxing.

use std::rc::Rc;

use crate::native::{native_class, HostValue, NativeObject, ObjectView};
use crate::value::{Instance, InstanceRef, Value};

use super::{Interpreter, RuntimeError};

/// Interpreter value → host value. Boxed primitives unwrap to the
/// primitive they carry; lambdas cannot cross the boundary.
pub(crate) fn from_lyra_value(value: &Value) -> Result<HostValue, RuntimeError> {
    Ok(match value {
        Value::Null => HostValue::Null,
        Value::Bool(b) => HostValue::Bool(*b),
        Value::Number(n) => HostValue::Number(*n),
        Value::String(s) => HostValue::String(s.clone()),
        Value::Object(obj) => {
            let instance = obj.borrow();
            match &instance.native {
                Some(native) => native.unbox().unwrap_or_else(|| HostValue::Native(native.clone())),
                None => HostValue::Object(ObjectView(obj.clone())),
            }
        }
        Value::Lambda(_) => return Err(RuntimeError::CannotConvert("a lambda".to_string())),
    })
}

pub(crate) fn host_values(values: &[Value]) -> Result<Vec<HostValue>, RuntimeError> {
    values.iter().map(from_lyra_value).collect()
}

impl Interpreter {
    /// Host value → interpreter value. Native objects are wrapped in a new
    /// instance of the class registered under their class name.
    pub(crate) fn to_lyra_value(&self, value: HostValue) -> Result<Value, RuntimeError> {
        Ok(match value {
            HostValue::Null => Value::Null,
            HostValue::Bool(b) => Value::Bool(b),
            HostValue::Number(n) => Value::Number(n),
            HostValue::String(s) => Value::String(s),
            HostValue::Native(native) => Value::Object(self.wrap_native(native)?),
            HostValue::Object(view) => Value::Object(view.0),
        })
    }

    pub(crate) fn wrap_native(&self, native: Rc<dyn NativeObject>) -> Result<InstanceRef, RuntimeError> {
        let name = native.class_name();
        let class = self.classes.get(name).ok_or_else(|| RuntimeError::UnknownClass(name.to_string()))?;
        let mut instance = Instance::new(class.clone());
        instance.native = Some(native);
        Ok(instance.into_ref())
    }

    /// Wrap a primitive in a fresh `String`, `Number` or `Boolean`
    /// instance. Every call allocates a new wrapper.
    pub(crate) fn autobox(&self, value: &Value) -> Result<InstanceRef, RuntimeError> {
        let (class, host) = match value {
            Value::String(s) => ("String", HostValue::String(s.clone())),
            Value::Number(n) => ("Number", HostValue::Number(*n)),
            Value::Bool(b) => ("Boolean", HostValue::Bool(*b)),
            Value::Object(obj) => return Ok(obj.clone()),
            other => return Err(RuntimeError::NotAnObject(other.type_name())),
        };
        let constructor = native_class(class)
            .and_then(|c| c.constructor)
            .ok_or_else(|| RuntimeError::UnknownClass(class.to_string()))?;
        self.wrap_native(constructor(vec![host])?)
    }
}
