// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Casting values at binding, return and declaration boundaries.

use lyra_ast::ty::TypeRef;

use crate::value::{parse_number, Value};

/// Cast `value` to the primitive named by `ty`.
///
/// `string`, `number`, `boolean` and `null` convert; every other name
/// (classes, `mixed`, `void`, type variables) passes the value through.
/// Without a type the cast is loose: `"null"`, `"true"`, `"false"` and
/// numeric-looking strings become the values they spell.
pub fn cast_value(value: Value, ty: Option<&str>) -> Value {
    match ty {
        Some("string") => match value {
            Value::String(_) => value,
            other => Value::String(other.to_string()),
        },
        Some("number") => match value {
            Value::Number(_) => value,
            other => Value::Number(other.to_number()),
        },
        Some("boolean") => match value {
            Value::Bool(_) => value,
            Value::Object(ref obj) => match obj.borrow().unboxed() {
                Some(Value::Bool(b)) => Value::Bool(b),
                _ => Value::Bool(false),
            },
            other => Value::Bool(matches!(other, Value::String(ref s) if s == "true")),
        },
        Some("null") => Value::Null,
        Some(_) => value,
        None => loose(value),
    }
}

fn loose(value: Value) -> Value {
    let Value::String(text) = &value else {
        return value;
    };
    match text.as_str() {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        other => match parse_number(other.trim()) {
            Some(n) => Value::Number(n),
            None => value,
        },
    }
}

/// Cast by a declared type. Untyped and function-typed slots pass the
/// value through, and null satisfies a nullable type unchanged.
pub(crate) fn cast_to(value: Value, ty: Option<&TypeRef>) -> Value {
    let Some(ty) = ty else { return value };
    if ty.nullable && matches!(value, Value::Null) {
        return value;
    }
    match ty.base_name() {
        Some(name) => cast_value(value, Some(name)),
        None => value,
    }
}
