// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Abstract Syntax Tree types for the Lyra language.
//!
//! This crate defines the AST nodes shared between the lexer, parser,
//! linker, type checker, and interpreter.

pub mod span;
pub mod token;
pub mod ty;
pub mod expr;
pub mod stmt;
pub mod decl;

pub use span::{FileId, LineMap, SourceFile, SourceMap, Span};
