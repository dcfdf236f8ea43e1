// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Host side of the native classes.
//!
//! Native code never sees interpreter values directly. Arguments are
//! converted to [`HostValue`]s at the call boundary and results converted
//! back, so the implementations here stay independent of the evaluator.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::interp::RuntimeError;
use crate::output::Output;
use crate::value::{format_number, parse_number, InstanceRef, Value};

mod array;
mod primitives;
mod system;

pub use array::{ArrayIteratorObject, ArrayObject};
pub use primitives::{BooleanObject, NumberObject, StringObject};

/// A value on the host side of a native call.
#[derive(Debug, Clone)]
pub enum HostValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// A native-backed object, shared with the instance wrapping it.
    Native(Rc<dyn NativeObject>),
    /// Read/write view of a plain instance's fields.
    Object(ObjectView),
}

impl HostValue {
    pub fn to_number(&self) -> f64 {
        match self {
            HostValue::Null => 0.0,
            HostValue::Bool(b) => f64::from(u8::from(*b)),
            HostValue::Number(n) => *n,
            HostValue::String(s) if s.trim().is_empty() => 0.0,
            HostValue::String(s) => parse_number(s.trim()).unwrap_or(f64::NAN),
            HostValue::Native(_) | HostValue::Object(_) => f64::NAN,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            HostValue::Null => false,
            HostValue::Bool(b) => *b,
            HostValue::Number(n) => *n != 0.0 && !n.is_nan(),
            HostValue::String(s) => !s.is_empty(),
            HostValue::Native(_) | HostValue::Object(_) => true,
        }
    }

    pub fn strict_eq(&self, other: &HostValue) -> bool {
        match (self, other) {
            (HostValue::Null, HostValue::Null) => true,
            (HostValue::Bool(a), HostValue::Bool(b)) => a == b,
            (HostValue::Number(a), HostValue::Number(b)) => a == b,
            (HostValue::String(a), HostValue::String(b)) => a == b,
            (HostValue::Native(a), HostValue::Native(b)) => Rc::ptr_eq(a, b),
            (HostValue::Object(a), HostValue::Object(b)) => Rc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }

    /// The interpreter value for primitives; `None` for objects.
    pub fn to_primitive(&self) -> Option<Value> {
        match self {
            HostValue::Null => Some(Value::Null),
            HostValue::Bool(b) => Some(Value::Bool(*b)),
            HostValue::Number(n) => Some(Value::Number(*n)),
            HostValue::String(s) => Some(Value::String(s.clone())),
            HostValue::Native(_) | HostValue::Object(_) => None,
        }
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Null => write!(f, "null"),
            HostValue::Bool(b) => write!(f, "{}", b),
            HostValue::Number(n) => write!(f, "{}", format_number(*n)),
            HostValue::String(s) => write!(f, "{}", s),
            HostValue::Native(native) => write!(f, "{}", native.display()),
            HostValue::Object(view) => write!(f, "[object {}]", view.class_name()),
        }
    }
}

/// Field access to an instance from native code.
#[derive(Clone)]
pub struct ObjectView(pub InstanceRef);

impl ObjectView {
    pub fn class_name(&self) -> String {
        self.0.borrow().class.name.clone()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().field(name)
    }

    pub fn set(&self, name: &str, value: Value) -> bool {
        self.0.borrow_mut().set_field(name, value)
    }
}

impl fmt::Debug for ObjectView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectView({})", self.class_name())
    }
}

/// A host object backing a native class instance.
pub trait NativeObject: fmt::Debug {
    fn class_name(&self) -> &'static str;

    /// Names of the instance methods this object answers.
    fn methods(&self) -> &'static [&'static str];

    fn call(&self, method: &str, args: Vec<HostValue>) -> Result<HostValue, RuntimeError>;

    fn as_any(&self) -> &dyn Any;

    fn has_method(&self, name: &str) -> bool {
        self.methods().contains(&name)
    }

    fn display(&self) -> String {
        format!("[object {}]", self.class_name())
    }

    /// The primitive a boxed value wraps.
    fn unbox(&self) -> Option<HostValue> {
        None
    }
}

pub type NativeConstructor = fn(Vec<HostValue>) -> Result<Rc<dyn NativeObject>, RuntimeError>;
pub type NativeFunction = fn(&Output, Vec<HostValue>) -> Result<HostValue, RuntimeError>;

/// Host implementation of one native class.
pub struct NativeClass {
    pub name: &'static str,
    pub constructor: Option<NativeConstructor>,
    pub statics: &'static [(&'static str, NativeFunction)],
}

impl NativeClass {
    pub fn static_function(&self, name: &str) -> Option<NativeFunction> {
        self.statics.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
    }
}

impl fmt::Debug for NativeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeClass").field("name", &self.name).finish_non_exhaustive()
    }
}

static NATIVE_CLASSES: &[NativeClass] = &[
    NativeClass { name: "String", constructor: Some(primitives::new_string), statics: &[] },
    NativeClass {
        name: "Number",
        constructor: Some(primitives::new_number),
        statics: &[("parse", primitives::parse_number as NativeFunction)],
    },
    NativeClass { name: "Boolean", constructor: Some(primitives::new_boolean), statics: &[] },
    NativeClass { name: "Array", constructor: Some(array::new_array), statics: &[] },
    NativeClass { name: "ArrayIterator", constructor: Some(array::new_array_iterator), statics: &[] },
    NativeClass { name: "System", constructor: None, statics: system::SYSTEM_FUNCTIONS },
    NativeClass { name: "Assert", constructor: None, statics: system::ASSERT_FUNCTIONS },
];

static NATIVE_FUNCTIONS: &[(&str, NativeFunction)] = &[("print", system::print as NativeFunction)];

pub fn native_classes() -> &'static [NativeClass] {
    NATIVE_CLASSES
}

pub fn native_class(name: &str) -> Option<&'static NativeClass> {
    NATIVE_CLASSES.iter().find(|c| c.name == name)
}

/// Global native function (`print`).
pub fn native_function(name: &str) -> Option<NativeFunction> {
    NATIVE_FUNCTIONS.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
}

pub fn native_function_names() -> impl Iterator<Item = &'static str> {
    NATIVE_FUNCTIONS.iter().map(|(n, _)| *n)
}

/// Positional argument; absent ones read as null.
pub(crate) fn arg(args: &[HostValue], index: usize) -> HostValue {
    args.get(index).cloned().unwrap_or(HostValue::Null)
}

pub(crate) fn no_such_method(class: &str, method: &str) -> RuntimeError {
    RuntimeError::NoSuchMethod { class: class.to_string(), method: method.to_string() }
}
