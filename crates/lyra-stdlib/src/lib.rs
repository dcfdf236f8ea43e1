// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lyra Standard Library signatures.
//!
//! Native classes declare their public surface as ordinary Lyra source,
//! embedded here and parsed by the regular parser. The checker sees them
//! as normal classes; the interpreter pairs each one with a host
//! implementation of the same name.

use lyra_ast::decl::{MethodDecl, Program};
use lyra_ast::FileId;
use lyra_parser::SyntaxError;

/// An embedded signature source.
#[derive(Debug, Clone, Copy)]
pub struct NativeSource {
    /// Class name for native classes, module name otherwise.
    pub name: &'static str,
    /// Pseudo-url shown in diagnostics.
    pub url: &'static str,
    pub source: &'static str,
    /// Registered into every program without an import.
    pub autoload: bool,
}

impl NativeSource {
    pub fn parse(&self, file: FileId) -> Result<Program, SyntaxError> {
        lyra_parser::parse_program(self.source, file)
    }
}

/// The `Iterator`/`Iterable` contract every program sees without importing it.
pub const DEFAULT_DEPENDENCY: NativeSource = NativeSource {
    name: "iterator",
    url: "lyra:iterator",
    source: include_str!("../stubs/iterator.lyra"),
    autoload: true,
};

/// Signatures of the global native functions (`print`).
pub const NATIVE_FUNCTIONS: NativeSource = NativeSource {
    name: "Functions",
    url: "lyra:functions",
    source: include_str!("../stubs/functions.lyra"),
    autoload: true,
};

const NATIVE_CLASSES: &[NativeSource] = &[
    NativeSource {
        name: "String",
        url: "lyra:String",
        source: include_str!("../stubs/string.lyra"),
        autoload: true,
    },
    NativeSource {
        name: "Number",
        url: "lyra:Number",
        source: include_str!("../stubs/number.lyra"),
        autoload: true,
    },
    NativeSource {
        name: "Boolean",
        url: "lyra:Boolean",
        source: include_str!("../stubs/boolean.lyra"),
        autoload: true,
    },
    NativeSource {
        name: "Array",
        url: "lyra:Array",
        source: include_str!("../stubs/array.lyra"),
        autoload: true,
    },
    NativeSource {
        name: "ArrayIterator",
        url: "lyra:ArrayIterator",
        source: include_str!("../stubs/array_iterator.lyra"),
        autoload: true,
    },
    NativeSource {
        name: "System",
        url: "lyra:System",
        source: include_str!("../stubs/system.lyra"),
        autoload: false,
    },
    NativeSource {
        name: "Assert",
        url: "lyra:Assert",
        source: include_str!("../stubs/assert.lyra"),
        autoload: false,
    },
];

/// Every native class, autoloaded ones first.
pub fn native_classes() -> &'static [NativeSource] {
    NATIVE_CLASSES
}

pub fn native_class(name: &str) -> Option<&'static NativeSource> {
    NATIVE_CLASSES.iter().find(|c| c.name == name)
}

pub fn is_native_class(name: &str) -> bool {
    native_class(name).is_some()
}

pub fn autoloaded_classes() -> impl Iterator<Item = &'static NativeSource> {
    NATIVE_CLASSES.iter().filter(|c| c.autoload)
}

/// Method signatures of the global native functions.
pub fn native_function_decls(program: &Program) -> Vec<MethodDecl> {
    program.classes().flat_map(|c| c.methods().cloned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_stub_parses() {
        let all = NATIVE_CLASSES.iter().chain([&DEFAULT_DEPENDENCY, &NATIVE_FUNCTIONS]);
        for (i, src) in all.enumerate() {
            if let Err(e) = src.parse(FileId(i as u32)) {
                panic!("{} failed to parse: {}", src.url, e);
            }
        }
    }

    #[test]
    fn each_native_stub_declares_its_class() {
        for src in native_classes() {
            let program = src.parse(FileId(0)).unwrap();
            let names: Vec<_> = program.classes().map(|c| c.name.as_str()).collect();
            assert_eq!(names, vec![src.name], "{}", src.url);
        }
    }

    #[test]
    fn default_dependency_declares_iterator_contract() {
        let program = DEFAULT_DEPENDENCY.parse(FileId(0)).unwrap();
        let names: Vec<_> = program.interfaces().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Iterator", "Iterable"]);
    }

    #[test]
    fn system_and_assert_need_an_import() {
        let autoloaded: Vec<_> = autoloaded_classes().map(|c| c.name).collect();
        assert_eq!(autoloaded, vec!["String", "Number", "Boolean", "Array", "ArrayIterator"]);
        assert!(is_native_class("Assert"));
        assert!(!is_native_class("Counter"));
    }

    #[test]
    fn print_is_the_only_global_function() {
        let program = NATIVE_FUNCTIONS.parse(FileId(0)).unwrap();
        let decls = native_function_decls(&program);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "print");
        assert_eq!(decls[0].params.len(), 1);
    }
}
