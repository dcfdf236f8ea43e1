// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Test runner for `@test` methods.

use std::rc::Rc;
use std::time::{Duration, Instant};

use lyra_ast::decl::DeclKind;
use lyra_ast::Span;
use lyra_linker::LinkedProgram;
use tracing::debug;

use crate::interp::{Interpreter, RuntimeDiagnostic};
use crate::value::ClassDefinition;

/// Result of running a single test method.
#[derive(Debug)]
pub struct TestResult {
    pub class: String,
    pub method: String,
    pub passed: bool,
    /// Failure message.
    pub message: Option<String>,
    pub duration: Duration,
}

impl TestResult {
    pub fn name(&self) -> String {
        format!("{}.{}", self.class, self.method)
    }
}

/// Runs every `@test` method of the main module's classes.
pub struct TestSuites {
    interpreter: Interpreter,
    filter: Option<String>,
}

impl TestSuites {
    pub fn new(interpreter: Interpreter) -> Self {
        Self { interpreter, filter: None }
    }

    /// Only run tests whose `Class.method` name contains `pattern`.
    pub fn with_filter(mut self, pattern: impl Into<String>) -> Self {
        self.filter = Some(pattern.into());
        self
    }

    /// Run with output going to stdout.
    pub fn run(program: &LinkedProgram) -> Result<Vec<TestResult>, RuntimeDiagnostic> {
        Self::new(Interpreter::new()).execute(program)
    }

    /// Evaluate the program's declarations, then construct each test class
    /// with no arguments and call its test methods in declaration order.
    /// Failures inside a test are recorded, not returned.
    pub fn execute(mut self, program: &LinkedProgram) -> Result<Vec<TestResult>, RuntimeDiagnostic> {
        self.interpreter.declare_dependencies(program)?;
        self.interpreter.declare_main(program)?;

        let mut results = Vec::new();
        let Some(main) = program.main() else { return Ok(results) };
        for decl in &main.program.decls {
            let DeclKind::Class(class_decl) = &decl.kind else { continue };
            let class = match self.interpreter.lookup_class(&class_decl.name) {
                Ok(class) => class,
                Err(e) => return Err(e.at(decl.span)),
            };
            let tests: Vec<_> = class
                .test_methods()
                .filter(|m| self.selected(&format!("{}.{}", class.name, m.name)))
                .cloned()
                .collect();
            if tests.is_empty() {
                continue;
            }
            debug!(class = %class.name, tests = tests.len(), "running test class");

            for method in tests {
                let start = Instant::now();
                let outcome = self.interpreter.run_test(&class, &method.name, decl.span);
                let (passed, message) = match outcome {
                    Ok(()) => (true, None),
                    Err(e) => (false, Some(e.to_string())),
                };
                results.push(TestResult {
                    class: class.name.clone(),
                    method: method.name.clone(),
                    passed,
                    message,
                    duration: start.elapsed(),
                });
            }
        }
        Ok(results)
    }

    fn selected(&self, name: &str) -> bool {
        self.filter.as_deref().map_or(true, |f| name.contains(f))
    }
}

impl Interpreter {
    /// A fresh instance per test, so tests do not share state.
    fn run_test(&mut self, class: &Rc<ClassDefinition>, method: &str, span: Span) -> Result<(), RuntimeDiagnostic> {
        let globals = self.globals.clone();
        let instance = self.instantiate(class, Vec::new(), &globals, span)?;
        self.call_method(&instance, method, Vec::new(), &globals, span)?;
        Ok(())
    }
}
