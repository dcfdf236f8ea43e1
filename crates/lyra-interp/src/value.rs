// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Runtime values and the object model.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use lyra_ast::decl::{ClassDecl, FieldDecl, InterfaceDecl, MethodDecl, Param};
use lyra_ast::expr::{Expr, LambdaBody};
use lyra_ast::ty::TypeRef;

use crate::env::Environment;
use crate::native::{NativeClass, NativeObject};

pub type InstanceRef = Rc<RefCell<Instance>>;

/// A runtime value in the interpreter.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    /// All numbers are IEEE-754 doubles.
    Number(f64),
    String(String),
    /// Class instance, boxed primitive, native-backed object or the
    /// class-level object bound to a class name.
    Object(InstanceRef),
    Lambda(Rc<Closure>),
}

impl Value {
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "boolean".to_string(),
            Value::Number(_) => "number".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Object(obj) => obj.borrow().class.name.clone(),
            Value::Lambda(_) => "lambda".to_string(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) | Value::Lambda(_) => true,
        }
    }

    /// Numeric view used by arithmetic and `number` casts.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    parse_number(trimmed).unwrap_or(f64::NAN)
                }
            }
            Value::Object(obj) => match obj.borrow().unboxed() {
                Some(inner) => inner.to_number(),
                None => f64::NAN,
            },
            Value::Lambda(_) => f64::NAN,
        }
    }

    /// `===` semantics: primitives by value, objects and lambdas by identity.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn as_instance(&self) -> Option<&InstanceRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::Object(obj) => {
                let obj = obj.borrow();
                match &obj.native {
                    Some(native) => write!(f, "{}", native.display()),
                    None => write!(f, "[object {}]", obj.class.name),
                }
            }
            Value::Lambda(_) => write!(f, "[lambda]"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            Value::Object(obj) => write!(f, "Object({})", obj.borrow().class.name),
            other => write!(f, "{}", other),
        }
    }
}

/// Integral values print without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Strict decimal number syntax; rejects `inf`, `NaN` and friends.
pub fn parse_number(text: &str) -> Option<f64> {
    let plausible = !text.is_empty()
        && text.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        && text.chars().any(|c| c.is_ascii_digit());
    if plausible {
        text.parse().ok()
    } else {
        None
    }
}

/// A lambda value with the environment it was created in.
pub struct Closure {
    pub params: Vec<Param>,
    pub ret: Option<TypeRef>,
    pub body: LambdaBody,
    pub env: Environment,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure").field("params", &self.params.len()).finish_non_exhaustive()
    }
}

/// An object at runtime.
///
/// Static fields live on every instance: each new instance starts from a
/// copy of the class-level values and does not share later writes.
pub struct Instance {
    pub class: Rc<ClassDefinition>,
    pub fields: IndexMap<String, Value>,
    pub statics: IndexMap<String, Value>,
    pub native: Option<Rc<dyn NativeObject>>,
}

impl Instance {
    pub fn new(class: Rc<ClassDefinition>) -> Self {
        Self { class, fields: IndexMap::new(), statics: IndexMap::new(), native: None }
    }

    pub fn into_ref(self) -> InstanceRef {
        Rc::new(RefCell::new(self))
    }

    /// Instance field, then static field.
    pub fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).or_else(|| self.statics.get(name)).cloned()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name) || self.statics.contains_key(name)
    }

    /// Overwrite an existing field. Returns false when there is none.
    pub fn set_field(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.fields.get_mut(name) {
            *slot = value;
            true
        } else if let Some(slot) = self.statics.get_mut(name) {
            *slot = value;
            true
        } else {
            false
        }
    }

    /// Primitive carried by a boxed `String`, `Number` or `Boolean`.
    pub fn unboxed(&self) -> Option<Value> {
        self.native.as_ref().and_then(|n| n.unbox()).and_then(|h| h.to_primitive())
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("native", &self.native.is_some())
            .finish()
    }
}

/// Field with the initializer evaluated at class declaration time.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub ty: Option<TypeRef>,
    pub init: Option<Expr>,
}

impl From<&FieldDecl> for FieldDefinition {
    fn from(field: &FieldDecl) -> Self {
        Self { name: field.name.clone(), ty: field.ty.clone(), init: field.init.clone() }
    }
}

/// Flattened execution view of a class declaration.
#[derive(Debug)]
pub struct ClassDefinition {
    pub name: String,
    pub superclass: Option<String>,
    pub instance_fields: Vec<FieldDefinition>,
    pub static_fields: Vec<FieldDefinition>,
    pub instance_methods: IndexMap<String, Rc<MethodDecl>>,
    pub static_methods: IndexMap<String, Rc<MethodDecl>>,
    pub constructor: Option<Rc<MethodDecl>>,
    /// Host implementation for native classes.
    pub native: Option<&'static NativeClass>,
    pub open: bool,
}

impl ClassDefinition {
    pub fn from_decl(decl: &ClassDecl, native: Option<&'static NativeClass>) -> Self {
        let mut def = Self {
            name: decl.name.clone(),
            superclass: decl.superclass.clone(),
            instance_fields: Vec::new(),
            static_fields: Vec::new(),
            instance_methods: IndexMap::new(),
            static_methods: IndexMap::new(),
            constructor: decl.constructor().cloned().map(Rc::new),
            native,
            open: decl.modifiers.open,
        };
        for field in decl.fields() {
            let target = if field.modifiers.is_static { &mut def.static_fields } else { &mut def.instance_fields };
            target.push(field.into());
        }
        for method in decl.methods() {
            let target = if method.modifiers.is_static { &mut def.static_methods } else { &mut def.instance_methods };
            target.entry(method.name.clone()).or_insert_with(|| Rc::new(method.clone()));
        }
        def
    }

    /// Class-shaped view of an interface, so its static fields can be read
    /// through the same object machinery.
    pub fn from_interface(iface: &InterfaceDefinition) -> Self {
        Self {
            name: iface.name.clone(),
            superclass: None,
            instance_fields: Vec::new(),
            static_fields: iface.static_fields.clone(),
            instance_methods: IndexMap::new(),
            static_methods: IndexMap::new(),
            constructor: None,
            native: None,
            open: false,
        }
    }

    /// Methods annotated `@test`, in declaration order.
    pub fn test_methods(&self) -> impl Iterator<Item = &Rc<MethodDecl>> {
        self.instance_methods.values().filter(|m| m.has_annotation("test"))
    }
}

/// Flattened execution view of an interface declaration.
#[derive(Debug)]
pub struct InterfaceDefinition {
    pub name: String,
    pub extends: Vec<String>,
    pub static_fields: Vec<FieldDefinition>,
}

impl From<&InterfaceDecl> for InterfaceDefinition {
    fn from(decl: &InterfaceDecl) -> Self {
        Self {
            name: decl.name.clone(),
            extends: decl.extends.clone(),
            static_fields: decl.fields().map(FieldDefinition::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_format_like_integers_when_integral() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
    }

    #[test]
    fn string_to_number() {
        assert_eq!(Value::String(" 12 ".into()).to_number(), 12.0);
        assert_eq!(Value::String("".into()).to_number(), 0.0);
        assert!(Value::String("abc".into()).to_number().is_nan());
        assert!(Value::String("inf".into()).to_number().is_nan());
        assert_eq!(Value::Bool(true).to_number(), 1.0);
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(Value::String("0".into()).is_truthy());
        assert!(Value::Number(-1.0).is_truthy());
    }

    #[test]
    fn strict_equality() {
        assert!(Value::Number(1.0).strict_eq(&Value::Number(1.0)));
        assert!(!Value::Number(1.0).strict_eq(&Value::String("1".into())));
        assert!(!Value::Number(f64::NAN).strict_eq(&Value::Number(f64::NAN)));
        assert!(Value::Null.strict_eq(&Value::Null));
    }
}
