// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Drift detection: every method name listed in method_names.rs must be
//! answered by the native object that claims it.
//!
//! One test per kind of name constructs a dummy host object and calls each
//! method. A NoSuchMethod error means the name is listed but not
//! implemented.

use std::rc::Rc;

use crate::interp::RuntimeError;
use crate::method_names;
use crate::native::{native_class, ArrayObject, BooleanObject, HostValue, NativeObject, NumberObject, StringObject};
use crate::output::Output;

/// A minimal host object for each native class with instance methods.
fn dummy(class: &str) -> Rc<dyn NativeObject> {
    match class {
        "String" => Rc::new(StringObject("text".to_string())),
        "Number" => Rc::new(NumberObject(1.5)),
        "Boolean" => Rc::new(BooleanObject(true)),
        "Array" => Rc::new(ArrayObject::from_items(vec![HostValue::Number(1.0), HostValue::Number(2.0)])),
        "ArrayIterator" => {
            let array: Rc<dyn NativeObject> = Rc::new(ArrayObject::from_items(vec![HostValue::Number(1.0)]));
            match array.call("iterator", Vec::new()) {
                Ok(HostValue::Native(iter)) => iter,
                other => panic!("Array.iterator returned {:?}", other),
            }
        }
        other => panic!("no dummy for {}", other),
    }
}

/// Arguments that keep index-taking methods in range.
fn dummy_args() -> Vec<HostValue> {
    vec![HostValue::Number(0.0), HostValue::Number(1.0)]
}

fn is_missing(result: &Result<HostValue, RuntimeError>) -> bool {
    matches!(result, Err(RuntimeError::NoSuchMethod { .. }))
}

#[test]
fn every_listed_instance_method_is_implemented() {
    for class in ["String", "Number", "Boolean", "Array", "ArrayIterator"] {
        let object = dummy(class);
        assert_eq!(object.class_name(), class);
        assert_eq!(object.methods(), method_names::instance_methods(class));
        for method in method_names::instance_methods(class) {
            let result = object.call(method, dummy_args());
            assert!(!is_missing(&result), "{}.{} is listed but not implemented", class, method);
        }
        assert!(is_missing(&object.call("noSuchMethod", Vec::new())), "{} accepts unknown methods", class);
    }
}

#[test]
fn every_listed_static_function_is_registered() {
    for class in ["Number", "System", "Assert"] {
        let native = native_class(class).unwrap_or_else(|| panic!("{} is not registered", class));
        let registered: Vec<_> = native.statics.iter().map(|(name, _)| *name).collect();
        assert_eq!(registered, method_names::static_functions(class), "{}", class);
    }
}

#[test]
fn static_functions_run() {
    let (out, buffer) = Output::captured();
    let print = native_class("System").and_then(|c| c.static_function("print")).unwrap();
    print(&out, vec![HostValue::String("hi".into())]).unwrap();
    assert_eq!(*buffer.lock().unwrap(), "hi\n");

    let equals = native_class("Assert").and_then(|c| c.static_function("equals")).unwrap();
    assert!(equals(&out, vec![HostValue::Number(1.0), HostValue::Number(1.0)]).is_ok());
}
