// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Drift detection test: cross-checks interpreter method lists against the
//! signature stubs in lyra-stdlib.
//!
//! If you add a method to a native object, add it to method_names.rs and to
//! the class's stub. If you add a method to a stub, implement it and list it
//! in method_names.rs. This test catches either direction of drift.

use lyra_ast::decl::ClassDecl;
use lyra_ast::FileId;
use lyra_interp::{method_names, native};

fn stub(class: &str) -> ClassDecl {
    let source = lyra_stdlib::native_class(class).unwrap_or_else(|| panic!("no stub for {}", class));
    let program = source.parse(FileId(0)).unwrap_or_else(|e| panic!("{} failed to parse: {}", class, e));
    let decl = program.classes().find(|c| c.name == class).cloned().unwrap_or_else(|| panic!("{} stub has no class", class));
    decl
}

fn stub_methods(class: &str, statics: bool) -> Vec<String> {
    stub(class)
        .methods()
        .filter(|m| m.modifiers.is_static == statics)
        .map(|m| m.name.clone())
        .collect()
}

/// Bidirectional check: interpreter ↔ stub must match exactly.
fn check_sync(class: &str, interp_methods: &[&str], statics: bool) {
    let declared = stub_methods(class, statics);
    for m in interp_methods {
        assert!(
            declared.iter().any(|d| d == m),
            "Interpreter has {}.{} but the stub doesn't declare it",
            class,
            m,
        );
    }
    for d in &declared {
        assert!(
            interp_methods.contains(&d.as_str()),
            "Stub declares {}.{} but the interpreter doesn't implement it",
            class,
            d,
        );
    }
}

#[test]
fn instance_methods_match_stubs() {
    for class in ["String", "Number", "Boolean", "Array", "ArrayIterator", "System", "Assert"] {
        check_sync(class, method_names::instance_methods(class), false);
    }
}

#[test]
fn static_functions_match_stubs() {
    for class in ["String", "Number", "Boolean", "Array", "ArrayIterator", "System", "Assert"] {
        check_sync(class, method_names::static_functions(class), true);
    }
}

#[test]
fn every_stub_has_a_host_implementation() {
    for source in lyra_stdlib::native_classes() {
        let host = native::native_class(source.name)
            .unwrap_or_else(|| panic!("{} has a stub but no host class", source.name));
        let declares_constructor = stub(source.name).constructor().is_some();
        assert_eq!(
            host.constructor.is_some(),
            declares_constructor,
            "{}: stub constructor and host constructor disagree",
            source.name,
        );
    }
}

#[test]
fn native_functions_match_stubs() {
    let program = lyra_stdlib::NATIVE_FUNCTIONS.parse(FileId(0)).unwrap();
    let declared: Vec<_> = lyra_stdlib::native_function_decls(&program).into_iter().map(|m| m.name).collect();
    let implemented: Vec<_> = native::native_function_names().collect();
    assert_eq!(declared, implemented);
}
