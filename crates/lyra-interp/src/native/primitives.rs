// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Boxed `String`, `Number` and `Boolean`.

use std::any::Any;
use std::rc::Rc;

use super::{arg, no_such_method, ArrayObject, HostValue, NativeObject};
use crate::interp::RuntimeError;
use crate::method_names::{BOOLEAN_METHODS, NUMBER_METHODS, STRING_METHODS};
use crate::output::Output;
use crate::value::format_number;

#[derive(Debug)]
pub struct StringObject(pub String);

#[derive(Debug)]
pub struct NumberObject(pub f64);

#[derive(Debug)]
pub struct BooleanObject(pub bool);

pub(super) fn new_string(args: Vec<HostValue>) -> Result<Rc<dyn NativeObject>, RuntimeError> {
    Ok(Rc::new(StringObject(arg(&args, 0).to_string())))
}

pub(super) fn new_number(args: Vec<HostValue>) -> Result<Rc<dyn NativeObject>, RuntimeError> {
    Ok(Rc::new(NumberObject(arg(&args, 0).to_number())))
}

pub(super) fn new_boolean(args: Vec<HostValue>) -> Result<Rc<dyn NativeObject>, RuntimeError> {
    Ok(Rc::new(BooleanObject(arg(&args, 0).is_truthy())))
}

/// `Number.parse(text)`: NaN when the text is not a number.
pub(super) fn parse_number(_out: &Output, args: Vec<HostValue>) -> Result<HostValue, RuntimeError> {
    let text = arg(&args, 0).to_string();
    let trimmed = text.trim();
    let value = if trimmed.is_empty() { f64::NAN } else { HostValue::String(trimmed.to_string()).to_number() };
    Ok(HostValue::Number(value))
}

fn char_index(chars: &[char], index: f64) -> Option<usize> {
    if index.is_nan() || index < 0.0 {
        return None;
    }
    let index = index as usize;
    (index < chars.len()).then_some(index)
}

/// Clamp a possibly fractional, negative or NaN position into `0..=len`.
fn clamp_position(position: f64, len: usize) -> usize {
    if position.is_nan() || position <= 0.0 {
        0
    } else {
        (position as usize).min(len)
    }
}

impl StringObject {
    fn substring(&self, start: &HostValue, end: &HostValue) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        let start = clamp_position(start.to_number(), chars.len());
        let end = match end {
            HostValue::Null => chars.len(),
            other => clamp_position(other.to_number(), chars.len()),
        };
        let (from, to) = if start <= end { (start, end) } else { (end, start) };
        chars[from..to].iter().collect()
    }

    fn index_of(&self, search: &str) -> f64 {
        match self.0.find(search) {
            Some(byte) => self.0[..byte].chars().count() as f64,
            None => -1.0,
        }
    }

    fn split(&self, separator: &str) -> Vec<HostValue> {
        if separator.is_empty() {
            self.0.chars().map(|c| HostValue::String(c.to_string())).collect()
        } else {
            self.0.split(separator).map(|part| HostValue::String(part.to_string())).collect()
        }
    }
}

impl NativeObject for StringObject {
    fn class_name(&self) -> &'static str {
        "String"
    }

    fn methods(&self) -> &'static [&'static str] {
        STRING_METHODS
    }

    fn call(&self, method: &str, args: Vec<HostValue>) -> Result<HostValue, RuntimeError> {
        let s = &self.0;
        Ok(match method {
            "length" => HostValue::Number(s.chars().count() as f64),
            "toUpperCase" => HostValue::String(s.to_uppercase()),
            "toLowerCase" => HostValue::String(s.to_lowercase()),
            "charAt" => {
                let chars: Vec<char> = s.chars().collect();
                let found = char_index(&chars, arg(&args, 0).to_number());
                HostValue::String(found.map(|i| chars[i].to_string()).unwrap_or_default())
            }
            "indexOf" => HostValue::Number(self.index_of(&arg(&args, 0).to_string())),
            "contains" => HostValue::Bool(s.contains(arg(&args, 0).to_string().as_str())),
            "substring" => HostValue::String(self.substring(&arg(&args, 0), &arg(&args, 1))),
            "trim" => HostValue::String(s.trim().to_string()),
            "split" => {
                let parts = self.split(&arg(&args, 0).to_string());
                HostValue::Native(Rc::new(ArrayObject::from_items(parts)))
            }
            "equals" => HostValue::Bool(*s == arg(&args, 0).to_string()),
            "toString" => HostValue::String(s.clone()),
            _ => return Err(no_such_method("String", method)),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn display(&self) -> String {
        self.0.clone()
    }

    fn unbox(&self) -> Option<HostValue> {
        Some(HostValue::String(self.0.clone()))
    }
}

impl NativeObject for NumberObject {
    fn class_name(&self) -> &'static str {
        "Number"
    }

    fn methods(&self) -> &'static [&'static str] {
        NUMBER_METHODS
    }

    fn call(&self, method: &str, args: Vec<HostValue>) -> Result<HostValue, RuntimeError> {
        let n = self.0;
        Ok(match method {
            "toString" => HostValue::String(format_number(n)),
            "toFixed" => {
                let digits = arg(&args, 0).to_number();
                let digits = if digits.is_nan() { 0 } else { digits.clamp(0.0, 100.0) as usize };
                HostValue::String(format!("{:.*}", digits, n))
            }
            "floor" => HostValue::Number(n.floor()),
            "ceil" => HostValue::Number(n.ceil()),
            // Halves round up, toward positive infinity.
            "round" => HostValue::Number((n + 0.5).floor()),
            "abs" => HostValue::Number(n.abs()),
            _ => return Err(no_such_method("Number", method)),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn display(&self) -> String {
        format_number(self.0)
    }

    fn unbox(&self) -> Option<HostValue> {
        Some(HostValue::Number(self.0))
    }
}

impl NativeObject for BooleanObject {
    fn class_name(&self) -> &'static str {
        "Boolean"
    }

    fn methods(&self) -> &'static [&'static str] {
        BOOLEAN_METHODS
    }

    fn call(&self, method: &str, _args: Vec<HostValue>) -> Result<HostValue, RuntimeError> {
        match method {
            "toString" => Ok(HostValue::String(self.0.to_string())),
            _ => Err(no_such_method("Boolean", method)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn display(&self) -> String {
        self.0.to_string()
    }

    fn unbox(&self) -> Option<HostValue> {
        Some(HostValue::Bool(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(s: &str) -> HostValue {
        HostValue::String(s.to_string())
    }

    fn call(obj: &dyn NativeObject, method: &str, args: Vec<HostValue>) -> String {
        obj.call(method, args).unwrap().to_string()
    }

    #[test]
    fn string_methods() {
        let s = StringObject("Hello World".to_string());
        assert_eq!(call(&s, "length", vec![]), "11");
        assert_eq!(call(&s, "toUpperCase", vec![]), "HELLO WORLD");
        assert_eq!(call(&s, "charAt", vec![HostValue::Number(4.0)]), "o");
        assert_eq!(call(&s, "charAt", vec![HostValue::Number(40.0)]), "");
        assert_eq!(call(&s, "indexOf", vec![string("World")]), "6");
        assert_eq!(call(&s, "indexOf", vec![string("xyz")]), "-1");
        assert_eq!(call(&s, "substring", vec![HostValue::Number(6.0), HostValue::Null]), "World");
        assert_eq!(call(&s, "substring", vec![HostValue::Number(5.0), HostValue::Number(0.0)]), "Hello");
        assert_eq!(call(&s, "equals", vec![string("Hello World")]), "true");
    }

    #[test]
    fn split_produces_an_array() {
        let s = StringObject("a,b,c".to_string());
        let HostValue::Native(parts) = s.call("split", vec![string(",")]).unwrap() else {
            panic!("expected a native array");
        };
        assert_eq!(parts.class_name(), "Array");
        assert_eq!(parts.display(), "[a, b, c]");
    }

    #[test]
    fn number_methods() {
        let n = NumberObject(2.5);
        assert_eq!(call(&n, "round", vec![]), "3");
        assert_eq!(call(&n, "floor", vec![]), "2");
        assert_eq!(call(&n, "toFixed", vec![HostValue::Number(2.0)]), "2.50");
        assert_eq!(call(&NumberObject(-2.5), "round", vec![]), "-2");
        assert_eq!(call(&NumberObject(-4.0), "abs", vec![]), "4");
    }

    #[test]
    fn parse_rejects_garbage() {
        let out = Output::stdout();
        let ok = parse_number(&out, vec![string(" 7.5 ")]).unwrap();
        assert!(matches!(ok, HostValue::Number(n) if n == 7.5));
        let bad = parse_number(&out, vec![string("seven")]).unwrap();
        assert!(matches!(bad, HostValue::Number(n) if n.is_nan()));
    }

    #[test]
    fn unknown_method_is_an_error() {
        let err = BooleanObject(true).call("negate", vec![]).unwrap_err();
        assert!(matches!(err, RuntimeError::NoSuchMethod { .. }));
    }
}
