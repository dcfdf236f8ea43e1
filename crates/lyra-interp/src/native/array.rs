// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `Array<T>` and its iterator.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{arg, no_such_method, HostValue, NativeObject};
use crate::interp::RuntimeError;
use crate::method_names::{ARRAY_ITERATOR_METHODS, ARRAY_METHODS};

type Items = Rc<RefCell<Vec<HostValue>>>;

#[derive(Debug, Default)]
pub struct ArrayObject {
    items: Items,
}

impl ArrayObject {
    pub fn from_items(items: Vec<HostValue>) -> Self {
        Self { items: Rc::new(RefCell::new(items)) }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<HostValue> {
        self.items.borrow().get(index).cloned()
    }

    /// Overwrite an element, or append when `index == len`.
    pub fn set(&self, index: usize, value: HostValue) -> Result<(), RuntimeError> {
        let mut items = self.items.borrow_mut();
        let len = items.len();
        match index.cmp(&len) {
            std::cmp::Ordering::Less => items[index] = value,
            std::cmp::Ordering::Equal => items.push(value),
            std::cmp::Ordering::Greater => {
                return Err(RuntimeError::IndexOutOfBounds { index: index as f64, len });
            }
        }
        Ok(())
    }

    pub fn items(&self) -> Vec<HostValue> {
        self.items.borrow().clone()
    }

    fn position(&self, needle: &HostValue) -> Option<usize> {
        self.items.borrow().iter().position(|item| item.strict_eq(needle))
    }

    fn index(&self, value: &HostValue) -> Result<usize, RuntimeError> {
        let n = value.to_number();
        let len = self.len();
        if n.is_nan() || n < 0.0 || n.fract() != 0.0 || n as usize >= len {
            return Err(RuntimeError::IndexOutOfBounds { index: n, len });
        }
        Ok(n as usize)
    }
}

impl NativeObject for ArrayObject {
    fn class_name(&self) -> &'static str {
        "Array"
    }

    fn methods(&self) -> &'static [&'static str] {
        ARRAY_METHODS
    }

    fn call(&self, method: &str, args: Vec<HostValue>) -> Result<HostValue, RuntimeError> {
        Ok(match method {
            "length" => HostValue::Number(self.len() as f64),
            "push" => {
                self.items.borrow_mut().push(arg(&args, 0));
                HostValue::Null
            }
            "pop" => self.items.borrow_mut().pop().unwrap_or(HostValue::Null),
            "get" => {
                let index = self.index(&arg(&args, 0))?;
                self.get(index).unwrap_or(HostValue::Null)
            }
            "set" => {
                let index = self.index(&arg(&args, 0))?;
                self.set(index, arg(&args, 1))?;
                HostValue::Null
            }
            "contains" => HostValue::Bool(self.position(&arg(&args, 0)).is_some()),
            "indexOf" => HostValue::Number(self.position(&arg(&args, 0)).map_or(-1.0, |i| i as f64)),
            "join" => {
                let separator = match arg(&args, 0) {
                    HostValue::Null => ",".to_string(),
                    other => other.to_string(),
                };
                let parts: Vec<String> = self.items.borrow().iter().map(|v| v.to_string()).collect();
                HostValue::String(parts.join(&separator))
            }
            "iterator" => HostValue::Native(Rc::new(ArrayIteratorObject::over(self.items.clone()))),
            _ => return Err(no_such_method("Array", method)),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn display(&self) -> String {
        let parts: Vec<String> = self.items.borrow().iter().map(|v| v.to_string()).collect();
        format!("[{}]", parts.join(", "))
    }
}

/// Cursor over a live array; pushes during iteration are observed.
#[derive(Debug)]
pub struct ArrayIteratorObject {
    items: Items,
    position: Cell<usize>,
}

impl ArrayIteratorObject {
    fn over(items: Items) -> Self {
        Self { items, position: Cell::new(0) }
    }
}

impl NativeObject for ArrayIteratorObject {
    fn class_name(&self) -> &'static str {
        "ArrayIterator"
    }

    fn methods(&self) -> &'static [&'static str] {
        ARRAY_ITERATOR_METHODS
    }

    fn call(&self, method: &str, _args: Vec<HostValue>) -> Result<HostValue, RuntimeError> {
        let position = self.position.get();
        Ok(match method {
            "current" => self.items.borrow().get(position).cloned().unwrap_or(HostValue::Null),
            "key" => HostValue::Number(position as f64),
            "next" => {
                self.position.set(position + 1);
                HostValue::Null
            }
            "rewind" => {
                self.position.set(0);
                HostValue::Null
            }
            "hasNext" => HostValue::Bool(position < self.items.borrow().len()),
            _ => return Err(no_such_method("ArrayIterator", method)),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `new Array()`; any arguments become the initial elements.
pub(super) fn new_array(args: Vec<HostValue>) -> Result<Rc<dyn NativeObject>, RuntimeError> {
    Ok(Rc::new(ArrayObject::from_items(args)))
}

/// `new ArrayIterator(array)`
pub(super) fn new_array_iterator(args: Vec<HostValue>) -> Result<Rc<dyn NativeObject>, RuntimeError> {
    match args.first() {
        Some(HostValue::Native(native)) => match native.as_any().downcast_ref::<ArrayObject>() {
            Some(array) => Ok(Rc::new(ArrayIteratorObject::over(array.items.clone()))),
            None => Err(RuntimeError::InvalidArgument(format!(
                "ArrayIterator expects an Array, got {}",
                native.class_name()
            ))),
        },
        other => Err(RuntimeError::InvalidArgument(format!(
            "ArrayIterator expects an Array, got {}",
            other.map_or_else(|| "nothing".to_string(), |v| v.to_string())
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(values: &[f64]) -> ArrayObject {
        ArrayObject::from_items(values.iter().map(|n| HostValue::Number(*n)).collect())
    }

    #[test]
    fn push_pop_and_index() {
        let array = numbers(&[1.0, 2.0]);
        array.call("push", vec![HostValue::Number(3.0)]).unwrap();
        assert_eq!(array.display(), "[1, 2, 3]");
        assert_eq!(array.call("get", vec![HostValue::Number(1.0)]).unwrap().to_string(), "2");
        assert_eq!(array.call("pop", vec![]).unwrap().to_string(), "3");
        assert_eq!(array.len(), 2);
        assert_eq!(array.call("indexOf", vec![HostValue::Number(2.0)]).unwrap().to_string(), "1");
        assert_eq!(array.call("join", vec![HostValue::String("-".into())]).unwrap().to_string(), "1-2");
    }

    #[test]
    fn out_of_range_access_fails() {
        let array = numbers(&[1.0]);
        let err = array.call("get", vec![HostValue::Number(5.0)]).unwrap_err();
        assert!(matches!(err, RuntimeError::IndexOutOfBounds { len: 1, .. }));
        assert!(array.set(1, HostValue::Null).is_ok());
        assert!(array.set(5, HostValue::Null).is_err());
    }

    #[test]
    fn iterator_walks_the_live_array() {
        let array = numbers(&[10.0, 20.0]);
        let HostValue::Native(iter) = array.call("iterator", vec![]).unwrap() else {
            panic!("expected an iterator");
        };
        let mut seen = Vec::new();
        iter.call("rewind", vec![]).unwrap();
        while iter.call("hasNext", vec![]).unwrap().is_truthy() {
            seen.push(iter.call("current", vec![]).unwrap().to_string());
            iter.call("next", vec![]).unwrap();
        }
        assert_eq!(seen, ["10", "20"]);
    }

    #[test]
    fn iterator_constructor_needs_an_array() {
        let array: Rc<dyn NativeObject> = Rc::new(numbers(&[1.0]));
        assert!(new_array_iterator(vec![HostValue::Native(array)]).is_ok());
        let err = new_array_iterator(vec![HostValue::Number(1.0)]).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidArgument(_)));
    }
}
