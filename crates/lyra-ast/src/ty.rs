// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type annotations as written in source.
//!
//! These are unresolved references. The type checker turns them into
//! resolved types; the interpreter only ever looks at [`TypeRef::base_name`]
//! when casting primitive values.

use std::fmt;

use crate::Span;

/// A type annotation node.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub kind: TypeRefKind,
    /// Written with a trailing `?`.
    pub nullable: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeRefKind {
    /// `Name`
    Simple(String),
    /// `Name<A, B>`
    Generic { name: String, args: Vec<TypeRef> },
    /// `(A, B) -> R`
    Function { params: Vec<TypeRef>, ret: Box<TypeRef> },
}

impl TypeRef {
    pub fn simple(name: impl Into<String>, span: Span) -> Self {
        Self { kind: TypeRefKind::Simple(name.into()), nullable: false, span }
    }

    /// Name the interpreter casts by: `Foo` for both `Foo` and `Foo<T>`,
    /// nothing for function types.
    pub fn base_name(&self) -> Option<&str> {
        match &self.kind {
            TypeRefKind::Simple(name) | TypeRefKind::Generic { name, .. } => Some(name),
            TypeRefKind::Function { .. } => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeRefKind::Simple(name) => write!(f, "{}", name)?,
            TypeRefKind::Generic { name, args } => {
                write!(f, "{}<", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")?;
            }
            TypeRefKind::Function { params, ret } => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", ret)?;
            }
        }
        if self.nullable {
            write!(f, "?")?;
        }
        Ok(())
    }
}
