// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The interpreter implementation.
//!
//! A tree-walk interpreter over the linked program. Class declarations are
//! evaluated in module order, then the main module's top-level statements
//! run in the global environment.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

mod call;
mod cast;
mod construct;
mod convert;
mod eval_expr;
mod exec_stmt;
mod operators;
mod register;

pub use cast::cast_value;

use lyra_ast::decl::{DeclKind, MethodDecl};
use lyra_ast::Span;
use lyra_linker::{LinkedProgram, ModuleKind};
use tracing::debug;

use crate::env::Environment;
use crate::output::Output;
use crate::value::{ClassDefinition, InstanceRef, InterfaceDefinition, Value};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("undefined variable `{0}`")]
    Undefined(String),

    #[error("unknown class `{0}`")]
    UnknownClass(String),

    #[error("no method `{method}` on `{class}`")]
    NoSuchMethod { class: String, method: String },

    #[error("no field `{field}` on `{class}`")]
    NoSuchField { class: String, field: String },

    #[error("cannot access members of {0}")]
    NotAnObject(String),

    #[error("`{0}` is not callable")]
    NotCallable(String),

    #[error("cannot index into {0}")]
    NotIndexable(String),

    #[error("missing argument for parameter `{0}`")]
    MissingParameter(String),

    #[error("`{0}` does not implement Iterable")]
    NotIterable(String),

    #[error("class `{0}` has no superclass")]
    NoSuperclass(String),

    #[error("`this` used outside of a method")]
    ThisOutsideMethod,

    #[error("index {index} out of bounds (length is {len})")]
    IndexOutOfBounds { index: f64, len: usize },

    #[error("cannot apply `{op}` to {left} and {right}")]
    InvalidOperands { op: &'static str, left: String, right: String },

    #[error("cannot pass {0} to native code")]
    CannotConvert(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("assertion failed: {0}")]
    AssertionFailed(String),

    // Control flow (not an actual error)
    #[error("return")]
    Return(Value),
}

impl RuntimeError {
    pub fn at(self, span: Span) -> RuntimeDiagnostic {
        RuntimeDiagnostic::new(self, span)
    }
}

/// A runtime error with the location it was raised at.
#[derive(Debug)]
pub struct RuntimeDiagnostic {
    pub error: RuntimeError,
    pub span: Span,
}

impl RuntimeDiagnostic {
    pub fn new(error: RuntimeError, span: Span) -> Self {
        Self { error, span }
    }
}

impl std::fmt::Display for RuntimeDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for RuntimeDiagnostic {}

pub(crate) type Eval<T> = Result<T, RuntimeDiagnostic>;

/// The tree-walk interpreter.
pub struct Interpreter {
    /// Top-level variables and class-level objects.
    pub(crate) globals: Environment,
    /// Evaluated class declarations by name.
    pub(crate) classes: HashMap<String, Rc<ClassDefinition>>,
    /// Class-level instance holding each class's initial field values.
    pub(crate) class_objects: HashMap<String, InstanceRef>,
    pub(crate) interfaces: HashMap<String, Rc<InterfaceDefinition>>,
    /// Signatures of the global native functions, for default arguments.
    pub(crate) functions: HashMap<String, Rc<MethodDecl>>,
    pub(crate) output: Output,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(Output::stdout())
    }

    pub fn with_output(output: Output) -> Self {
        Self {
            globals: Environment::new(),
            classes: HashMap::new(),
            class_objects: HashMap::new(),
            interfaces: HashMap::new(),
            functions: HashMap::new(),
            output,
        }
    }

    /// Returns interpreter and output buffer reference.
    pub fn with_captured_output() -> (Self, Arc<Mutex<String>>) {
        let (output, buffer) = Output::captured();
        (Self::with_output(output), buffer)
    }

    /// Run a linked program. The result is the value of a top-level
    /// `return`, or null.
    pub fn run(&mut self, program: &LinkedProgram) -> Result<Value, RuntimeDiagnostic> {
        self.declare_dependencies(program)?;
        let Some(main) = program.main() else {
            return Ok(Value::Null);
        };
        debug!(url = %main.url, "running main module");
        let globals = self.globals.clone();
        for decl in &main.program.decls {
            match &decl.kind {
                DeclKind::Import(_) => {}
                DeclKind::Class(class) => self.eval_class(class, false)?,
                DeclKind::Interface(iface) => self.eval_interface(iface)?,
                DeclKind::Stmt(stmt) => match self.exec_stmt(stmt, &globals) {
                    Ok(()) => {}
                    Err(RuntimeDiagnostic { error: RuntimeError::Return(value), .. }) => {
                        return Ok(cast_value(value, None));
                    }
                    Err(e) => return Err(e),
                },
            }
        }
        Ok(Value::Null)
    }

    /// Evaluate the declarations of every module except the main one,
    /// and register the global native functions.
    pub(crate) fn declare_dependencies(&mut self, program: &LinkedProgram) -> Eval<()> {
        for function in &program.functions {
            self.functions.insert(function.name.clone(), Rc::new(function.clone()));
        }
        for module in program.modules.iter().filter(|m| m.kind != ModuleKind::Main) {
            debug!(url = %module.url, "declaring module");
            let native = module.kind == ModuleKind::Native;
            for decl in &module.program.decls {
                match &decl.kind {
                    DeclKind::Class(class) => self.eval_class(class, native)?,
                    DeclKind::Interface(iface) => self.eval_interface(iface)?,
                    DeclKind::Import(_) | DeclKind::Stmt(_) => {}
                }
            }
        }
        Ok(())
    }

    /// Evaluate only the class and interface declarations of the main module.
    pub(crate) fn declare_main(&mut self, program: &LinkedProgram) -> Eval<()> {
        let Some(main) = program.main() else { return Ok(()) };
        for decl in &main.program.decls {
            match &decl.kind {
                DeclKind::Class(class) => self.eval_class(class, false)?,
                DeclKind::Interface(iface) => self.eval_interface(iface)?,
                DeclKind::Import(_) | DeclKind::Stmt(_) => {}
            }
        }
        Ok(())
    }

    /// A top-level variable or class-level object.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.get(name)
    }

    pub fn class(&self, name: &str) -> Option<&Rc<ClassDefinition>> {
        self.classes.get(name)
    }

    pub fn interface(&self, name: &str) -> Option<&Rc<InterfaceDefinition>> {
        self.interfaces.get(name)
    }

    pub fn output(&self) -> &Output {
        &self.output
    }
}
