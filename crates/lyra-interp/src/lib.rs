// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Tree-walk interpreter for the Lyra language.
//!
//! Executes a linked program directly from its AST. Native classes
//! (`String`, `Array`, `System`, ...) are implemented in [`native`] and
//! paired with the signature stubs of lyra-stdlib by class name.

mod env;
mod interp;
pub mod method_names;
pub mod native;
mod output;
mod suites;
mod value;

pub use env::{Environment, ThisBinding};
pub use interp::{cast_value, Interpreter, RuntimeDiagnostic, RuntimeError};
pub use output::Output;
pub use suites::{TestResult, TestSuites};
pub use value::{ClassDefinition, Closure, Instance, InstanceRef, InterfaceDefinition, Value};

#[cfg(test)]
mod drift;
