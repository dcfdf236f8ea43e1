// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Module linking for Lyra.
//!
//! Starting from a main source file, the linker discovers every module the
//! program needs, loads and parses each one exactly once, and returns them
//! in the order later phases consume them:
//!
//! 1. the default dependency (`Iterator` / `Iterable`),
//! 2. autoloaded native classes,
//! 3. native classes named by `import System;` style imports,
//! 4. file dependencies, depth first in discovery order,
//! 5. the main program.
//!
//! Loading is plain blocking I/O through a [`ModuleLoader`].

mod error;
mod loader;

pub use error::LinkError;
pub use loader::{join_relative, FsLoader, LoadError, MemoryLoader, ModuleLoader};

use std::collections::HashSet;

use lyra_ast::decl::{DeclKind, MethodDecl, Program};
use lyra_ast::{SourceMap, Span};
use lyra_stdlib::{NativeSource, DEFAULT_DEPENDENCY, NATIVE_FUNCTIONS};
use tracing::{debug, trace};

/// `import { A, B } from "url";` after resolving the url.
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    pub names: Vec<String>,
    pub url: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// The always-loaded iterator contract.
    Prelude,
    /// Signature source of a native class.
    Native,
    File,
    Main,
}

#[derive(Debug, Clone)]
pub struct Module {
    pub url: String,
    pub kind: ModuleKind,
    pub program: Program,
    pub dependencies: Vec<Dependency>,
}

/// Every module of a program, in load order, plus their sources.
#[derive(Debug, Clone)]
pub struct LinkedProgram {
    pub sources: SourceMap,
    pub modules: Vec<Module>,
    /// Signatures of the global native functions.
    pub functions: Vec<MethodDecl>,
}

impl LinkedProgram {
    pub fn main(&self) -> Option<&Module> {
        self.modules.last().filter(|m| m.kind == ModuleKind::Main)
    }

    pub fn programs(&self) -> impl Iterator<Item = &Program> {
        self.modules.iter().map(|m| &m.program)
    }
}

/// Link `source` (found at `url`) with its dependencies.
pub fn link<L: ModuleLoader>(url: &str, source: &str, loader: L) -> Result<LinkedProgram, LinkError> {
    Linker::new(loader).link(url, source)
}

/// Stateful linker. On failure, [`Linker::sources`] still holds every file
/// read so far, so the error can be rendered against its source.
pub struct Linker<L> {
    loader: L,
    sources: SourceMap,
    modules: Vec<Module>,
    seen: HashSet<String>,
}

impl<L: ModuleLoader> Linker<L> {
    pub fn new(loader: L) -> Self {
        Self { loader, sources: SourceMap::new(), modules: Vec::new(), seen: HashSet::new() }
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn link(&mut self, url: &str, source: &str) -> Result<LinkedProgram, LinkError> {
        self.sources = SourceMap::new();
        self.modules.clear();
        self.seen.clear();

        self.add_native(&DEFAULT_DEPENDENCY, ModuleKind::Prelude)?;
        for native in lyra_stdlib::autoloaded_classes() {
            self.add_native(native, ModuleKind::Native)?;
        }
        let file = self.sources.add(NATIVE_FUNCTIONS.url, NATIVE_FUNCTIONS.source);
        let functions = lyra_stdlib::native_function_decls(&NATIVE_FUNCTIONS.parse(file)?);

        debug!(url, "linking main module");
        self.seen.insert(url.to_string());
        let file = self.sources.add(url, source);
        let program = lyra_parser::parse_program(source, file)?;
        let dependencies = self.link_imports(url, &program)?;
        self.modules.push(Module { url: url.to_string(), kind: ModuleKind::Main, program, dependencies });
        debug!(modules = self.modules.len(), "linking complete");

        Ok(LinkedProgram {
            sources: std::mem::take(&mut self.sources),
            modules: std::mem::take(&mut self.modules),
            functions,
        })
    }

    fn add_native(&mut self, native: &NativeSource, kind: ModuleKind) -> Result<(), LinkError> {
        if !self.seen.insert(native.url.to_string()) {
            return Ok(());
        }
        trace!(url = native.url, "loading native signatures");
        let file = self.sources.add(native.url, native.source);
        let program = native.parse(file)?;
        self.modules.push(Module { url: native.url.to_string(), kind, program, dependencies: Vec::new() });
        Ok(())
    }

    /// Load what `program` imports. Native imports go first, then file
    /// imports in source order.
    fn link_imports(&mut self, importer: &str, program: &Program) -> Result<Vec<Dependency>, LinkError> {
        for decl in &program.decls {
            let DeclKind::Import(import) = &decl.kind else { continue };
            if import.from.is_some() {
                continue;
            }
            for name in &import.names {
                let native = lyra_stdlib::native_class(name)
                    .ok_or_else(|| LinkError::UnknownNative { name: name.clone(), span: decl.span })?;
                self.add_native(native, ModuleKind::Native)?;
            }
        }

        let mut dependencies = Vec::new();
        for decl in &program.decls {
            let DeclKind::Import(import) = &decl.kind else { continue };
            let Some(specifier) = &import.from else { continue };
            let url = self.loader.resolve(importer, specifier);
            self.link_file(&url, decl.span)?;
            self.check_exports(&url, &import.names, decl.span)?;
            dependencies.push(Dependency { names: import.names.clone(), url, span: decl.span });
        }
        Ok(dependencies)
    }

    fn link_file(&mut self, url: &str, span: Span) -> Result<(), LinkError> {
        if !self.seen.insert(url.to_string()) {
            trace!(url, "dependency already linked");
            return Ok(());
        }
        debug!(url, "loading dependency");
        let source = self.loader.load(url).map_err(|source| LinkError::Load { source, span })?;
        let file = self.sources.add(url, source.as_str());
        let program = lyra_parser::parse_program(&source, file)?;
        let dependencies = self.link_imports(url, &program)?;
        self.modules.push(Module { url: url.to_string(), kind: ModuleKind::File, program, dependencies });
        Ok(())
    }

    fn check_exports(&self, url: &str, names: &[String], span: Span) -> Result<(), LinkError> {
        // A module still being linked (import cycle) is checked by its own importer.
        let Some(module) = self.modules.iter().find(|m| m.url == url) else {
            return Ok(());
        };
        for name in names {
            if !declares(&module.program, name) {
                return Err(LinkError::MissingExport { name: name.clone(), url: url.to_string(), span });
            }
        }
        Ok(())
    }
}

fn declares(program: &Program, name: &str) -> bool {
    program.classes().any(|c| c.name == name) || program.interfaces().any(|i| i.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(linked: &LinkedProgram) -> Vec<&str> {
        linked.modules.iter().map(|m| m.url.as_str()).collect()
    }

    #[test]
    fn prelude_and_autoloads_come_first() {
        let linked = link("main.lyra", "let x = 1;", MemoryLoader::new()).unwrap();
        assert_eq!(
            urls(&linked),
            vec![
                "lyra:iterator",
                "lyra:String",
                "lyra:Number",
                "lyra:Boolean",
                "lyra:Array",
                "lyra:ArrayIterator",
                "main.lyra"
            ]
        );
        assert_eq!(linked.main().unwrap().kind, ModuleKind::Main);
        assert_eq!(linked.functions.len(), 1);
    }

    #[test]
    fn native_imports_are_loaded_once() {
        let loader = MemoryLoader::new().with("lib.lyra", "import System; class Box { }");
        let src = "import System, Assert;\nimport { Box } from \"./lib.lyra\";";
        let linked = link("main.lyra", src, loader).unwrap();
        let all = urls(&linked);
        assert_eq!(all.iter().filter(|u| **u == "lyra:System").count(), 1);
        let system = all.iter().position(|u| *u == "lyra:System").unwrap();
        let lib = all.iter().position(|u| *u == "lib.lyra").unwrap();
        assert!(system < lib);
        assert_eq!(all.last(), Some(&"main.lyra"));
    }

    #[test]
    fn file_dependencies_load_depth_first() {
        let loader = MemoryLoader::new()
            .with("app/a.lyra", "import { C } from \"./c.lyra\"; class A { }")
            .with("app/b.lyra", "class B { }")
            .with("app/c.lyra", "class C { }");
        let src = "import { A } from \"./a.lyra\";\nimport { B } from \"./b.lyra\";";
        let linked = link("app/main.lyra", src, loader).unwrap();
        let files: Vec<_> = linked
            .modules
            .iter()
            .filter(|m| matches!(m.kind, ModuleKind::File | ModuleKind::Main))
            .map(|m| m.url.as_str())
            .collect();
        assert_eq!(files, vec!["app/c.lyra", "app/a.lyra", "app/b.lyra", "app/main.lyra"]);
        let main = linked.main().unwrap();
        assert_eq!(main.dependencies.len(), 2);
        assert_eq!(main.dependencies[0].url, "app/a.lyra");
    }

    #[test]
    fn shared_dependency_is_loaded_once() {
        let loader = MemoryLoader::new()
            .with("a.lyra", "import { C } from \"./c.lyra\"; class A { }")
            .with("c.lyra", "class C { }");
        let src = "import { A } from \"./a.lyra\";\nimport { C } from \"./c.lyra\";";
        let linked = link("main.lyra", src, loader).unwrap();
        assert_eq!(urls(&linked).iter().filter(|u| **u == "c.lyra").count(), 1);
    }

    #[test]
    fn import_cycles_terminate() {
        let loader = MemoryLoader::new()
            .with("a.lyra", "import { B } from \"./b.lyra\"; class A { }")
            .with("b.lyra", "import { A } from \"./a.lyra\"; class B { }");
        let linked = link("main.lyra", "import { A } from \"./a.lyra\";", loader).unwrap();
        assert_eq!(linked.modules.len(), 9);
    }

    #[test]
    fn unknown_native_class() {
        let err = link("main.lyra", "import Network;", MemoryLoader::new()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown native class 'Network'");
    }

    #[test]
    fn missing_file() {
        let err = link("main.lyra", "import { A } from \"./a.lyra\";", MemoryLoader::new()).unwrap_err();
        assert!(matches!(err, LinkError::Load { .. }));
        assert_eq!(err.to_string(), "module not found: a.lyra");
    }

    #[test]
    fn imported_name_must_be_declared() {
        let loader = MemoryLoader::new().with("a.lyra", "class A { }");
        let err = link("main.lyra", "import { Z } from \"./a.lyra\";", loader).unwrap_err();
        assert_eq!(err.to_string(), "'Z' is not declared in a.lyra");
    }

    #[test]
    fn syntax_errors_keep_their_file() {
        let loader = MemoryLoader::new().with("a.lyra", "class A {");
        let mut linker = Linker::new(loader);
        let err = linker.link("main.lyra", "import { A } from \"./a.lyra\";").unwrap_err();
        let file = linker.sources().find("a.lyra").unwrap();
        assert_eq!(err.span().file, file);
    }

    #[test]
    fn links_files_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("lib.lyra"), "class Lib { }").unwrap();
        let main = dir.path().join("main.lyra");
        let linked = link(main.to_str().unwrap(), "import { Lib } from \"./lib.lyra\";", FsLoader).unwrap();
        let lib = &linked.modules[linked.modules.len() - 2];
        assert_eq!(lib.kind, ModuleKind::File);
        assert!(lib.url.ends_with("lib.lyra"));
    }
}
