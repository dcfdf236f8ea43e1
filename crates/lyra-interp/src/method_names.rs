// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Interpreter method name constants.
//!
//! Every method handled by the native implementations is listed here.
//! The drift test in tests/drift_test.rs cross-checks these against the
//! signature stubs in lyra-stdlib, so the checker and the interpreter agree
//! on the native surface.

// ---------------------------------------------------------------------------
// Instance methods
// ---------------------------------------------------------------------------

/// Methods on boxed strings (native/primitives.rs)
pub const STRING_METHODS: &[&str] = &[
    "length", "toUpperCase", "toLowerCase", "charAt", "indexOf", "contains",
    "substring", "trim", "split", "equals", "toString",
];

/// Methods on boxed numbers (native/primitives.rs)
pub const NUMBER_METHODS: &[&str] = &["toString", "toFixed", "floor", "ceil", "round", "abs"];

/// Methods on boxed booleans (native/primitives.rs)
pub const BOOLEAN_METHODS: &[&str] = &["toString"];

/// Methods on arrays (native/array.rs)
pub const ARRAY_METHODS: &[&str] = &[
    "length", "push", "pop", "get", "set", "contains", "indexOf", "join", "iterator",
];

/// Methods on array iterators (native/array.rs)
pub const ARRAY_ITERATOR_METHODS: &[&str] = &["current", "key", "next", "rewind", "hasNext"];

// ---------------------------------------------------------------------------
// Static functions
// ---------------------------------------------------------------------------

pub const NUMBER_STATICS: &[&str] = &["parse"];

/// native/system.rs
pub const SYSTEM_STATICS: &[&str] = &["print", "write"];

/// native/system.rs
pub const ASSERT_STATICS: &[&str] = &[
    "equals", "notEquals", "isTrue", "isFalse", "isNull", "notNull", "fail",
];

/// Instance methods per native class.
pub fn instance_methods(class: &str) -> &'static [&'static str] {
    match class {
        "String" => STRING_METHODS,
        "Number" => NUMBER_METHODS,
        "Boolean" => BOOLEAN_METHODS,
        "Array" => ARRAY_METHODS,
        "ArrayIterator" => ARRAY_ITERATOR_METHODS,
        _ => &[],
    }
}

/// Static functions per native class.
pub fn static_functions(class: &str) -> &'static [&'static str] {
    match class {
        "Number" => NUMBER_STATICS,
        "System" => SYSTEM_STATICS,
        "Assert" => ASSERT_STATICS,
        _ => &[],
    }
}
