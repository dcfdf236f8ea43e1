// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type system and type checker for the Lyra language.
//!
//! Checking runs over a whole [`LinkedProgram`](lyra_linker::LinkedProgram):
//! symbols of every module are collected first, then the main program's
//! statements, every class body, and finally interface conformance are
//! checked. The first error aborts the check.

mod types;
mod symbols;
mod scope;
mod checker;

pub use types::{ParamSymbol, Type};
pub use symbols::{
    ClassId, ClassSymbol, FieldSymbol, InterfaceId, InterfaceSymbol, MethodSymbol, Owner,
    TypeRegistry, Visibility,
};
pub use scope::TypeScope;
pub use checker::{CheckedProgram, TypeChecker, TypeError};
