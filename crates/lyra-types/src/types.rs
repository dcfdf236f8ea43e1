// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Resolved types.

use std::collections::HashMap;
use std::fmt;

use crate::symbols::{ClassId, InterfaceId};

/// A resolved type.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Number,
    String,
    Boolean,
    /// Top type: accepts every value.
    Mixed,
    Void,
    Null,
    Nullable(Box<Type>),
    /// Type parameter, or an unknown simple name.
    Var(String),
    Class { id: ClassId, name: String, args: Vec<Type> },
    Interface { id: InterfaceId, name: String, args: Vec<Type> },
    Function { params: Vec<ParamSymbol>, ret: Box<Type> },
}

/// A method, constructor, lambda or function-type parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSymbol {
    pub name: String,
    pub ty: Type,
    /// Type of the default expression, when one is declared.
    pub default: Option<Type>,
}

impl ParamSymbol {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty, default: None }
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

impl Type {
    /// Primitive keyword types. Anything else named in source is a
    /// class, an interface or a type variable.
    pub fn primitive(name: &str) -> Option<Type> {
        match name {
            "number" => Some(Type::Number),
            "string" => Some(Type::String),
            "boolean" => Some(Type::Boolean),
            "mixed" => Some(Type::Mixed),
            "void" => Some(Type::Void),
            "null" => Some(Type::Null),
            _ => None,
        }
    }

    /// Wrap in `Nullable` unless the type already admits `null`.
    pub fn nullable(self) -> Type {
        match self {
            Type::Nullable(_) | Type::Null | Type::Mixed => self,
            other => Type::Nullable(Box::new(other)),
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Type::Nullable(_) | Type::Null)
    }

    /// Type arguments of a class or interface reference.
    pub fn args(&self) -> &[Type] {
        match self {
            Type::Class { args, .. } | Type::Interface { args, .. } => args,
            _ => &[],
        }
    }

    /// Whether a value of type `other` may be used where `self` is expected.
    /// Not symmetric.
    pub fn accepts(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Mixed, _) => true,
            (Type::Var(_), _) => true,
            (Type::Nullable(inner), other) => match other {
                Type::Null => true,
                Type::Nullable(other_inner) => inner.accepts(other_inner),
                other => inner.accepts(other),
            },
            (
                Type::Class { id: a, args: a_args, .. },
                Type::Class { id: b, args: b_args, .. },
            ) => a == b && args_accept(a_args, b_args),
            (
                Type::Interface { id: a, args: a_args, .. },
                Type::Interface { id: b, args: b_args, .. },
            ) => a == b && args_accept(a_args, b_args),
            (Type::Function { .. }, Type::Function { .. }) => self.equals(other),
            (Type::Number, Type::Number)
            | (Type::String, Type::String)
            | (Type::Boolean, Type::Boolean)
            | (Type::Void, Type::Void)
            | (Type::Null, Type::Null) => true,
            _ => false,
        }
    }

    /// Narrower than [`Type::accepts`]: structural identity, except that
    /// function types compare parameters and return with `accepts`.
    pub fn equals(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Nullable(_), Type::Null) => true,
            (Type::Nullable(a), Type::Nullable(b)) => a.equals(b),
            (Type::Var(a), Type::Var(b)) => a == b,
            (
                Type::Class { id: a, args: a_args, .. },
                Type::Class { id: b, args: b_args, .. },
            ) => a == b && args_equal(a_args, b_args),
            (
                Type::Interface { id: a, args: a_args, .. },
                Type::Interface { id: b, args: b_args, .. },
            ) => a == b && args_equal(a_args, b_args),
            (
                Type::Function { params: a_params, ret: a_ret },
                Type::Function { params: b_params, ret: b_ret },
            ) => {
                a_params.len() == b_params.len()
                    && a_params.iter().zip(b_params).all(|(a, b)| a.ty.accepts(&b.ty))
                    && a_ret.accepts(b_ret)
            }
            (Type::Number, Type::Number)
            | (Type::String, Type::String)
            | (Type::Boolean, Type::Boolean)
            | (Type::Mixed, Type::Mixed)
            | (Type::Void, Type::Void)
            | (Type::Null, Type::Null) => true,
            _ => false,
        }
    }

    /// Replace type variables bound in `map`.
    pub fn substitute(&self, map: &HashMap<String, Type>) -> Type {
        if map.is_empty() {
            return self.clone();
        }
        match self {
            Type::Var(name) => map.get(name).cloned().unwrap_or_else(|| self.clone()),
            Type::Nullable(inner) => inner.substitute(map).nullable(),
            Type::Class { id, name, args } => Type::Class {
                id: *id,
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(map)).collect(),
            },
            Type::Interface { id, name, args } => Type::Interface {
                id: *id,
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(map)).collect(),
            },
            Type::Function { params, ret } => Type::Function {
                params: params
                    .iter()
                    .map(|p| ParamSymbol {
                        name: p.name.clone(),
                        ty: p.ty.substitute(map),
                        default: p.default.as_ref().map(|d| d.substitute(map)),
                    })
                    .collect(),
                ret: Box::new(ret.substitute(map)),
            },
            _ => self.clone(),
        }
    }
}

fn args_accept(expected: &[Type], actual: &[Type]) -> bool {
    expected.len() == actual.len() && expected.iter().zip(actual).all(|(e, a)| e.accepts(a))
}

fn args_equal(expected: &[Type], actual: &[Type]) -> bool {
    expected.len() == actual.len() && expected.iter().zip(actual).all(|(e, a)| e.equals(a))
}

/// Map type parameter names to type arguments, position by position.
/// Parameters without an argument stay unbound.
pub(crate) fn bindings(params: &[String], args: &[Type]) -> HashMap<String, Type> {
    params.iter().cloned().zip(args.iter().cloned()).collect()
}

fn write_list(f: &mut fmt::Formatter<'_>, items: impl Iterator<Item = impl fmt::Display>) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Number => write!(f, "number"),
            Type::String => write!(f, "string"),
            Type::Boolean => write!(f, "boolean"),
            Type::Mixed => write!(f, "mixed"),
            Type::Void => write!(f, "void"),
            Type::Null => write!(f, "null"),
            Type::Nullable(inner) => write!(f, "{}?", inner),
            Type::Var(name) => write!(f, "{}", name),
            Type::Class { name, args, .. } | Type::Interface { name, args, .. } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    write_list(f, args.iter())?;
                    write!(f, ">")?;
                }
                Ok(())
            }
            Type::Function { params, ret } => {
                write!(f, "(")?;
                write_list(f, params.iter().map(|p| &p.ty))?;
                write!(f, ") -> {}", ret)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(id: u32, args: Vec<Type>) -> Type {
        Type::Class { id: ClassId(id), name: format!("C{}", id), args }
    }

    #[test]
    fn nullable_accepts_null_and_inner() {
        for inner in [Type::Number, Type::String, Type::Boolean, class(0, vec![])] {
            let nullable = inner.clone().nullable();
            assert!(nullable.accepts(&Type::Null), "{}", nullable);
            assert!(nullable.accepts(&inner), "{}", nullable);
            assert!(nullable.accepts(&nullable), "{}", nullable);
        }
        assert!(!Type::Number.nullable().accepts(&Type::String));
        assert!(!Type::Number.accepts(&Type::Null));
    }

    #[test]
    fn nullable_equals_null() {
        let n = Type::Number.nullable();
        assert!(n.equals(&Type::Null));
        assert!(n.equals(&Type::Number.nullable()));
        assert!(!n.equals(&Type::Number));
    }

    #[test]
    fn nullable_does_not_double_wrap() {
        assert_eq!(Type::Number.nullable().nullable(), Type::Number.nullable());
        assert_eq!(Type::Null.nullable(), Type::Null);
    }

    #[test]
    fn generic_refs_compare_per_argument() {
        let mixed = class(1, vec![Type::Mixed]);
        let numbers = class(1, vec![Type::Number]);
        let strings = class(1, vec![Type::String]);
        assert!(mixed.accepts(&numbers));
        assert!(!numbers.accepts(&mixed));
        assert!(!numbers.accepts(&strings));
        assert!(!numbers.accepts(&class(1, vec![Type::Number, Type::Number])));
        assert!(!numbers.accepts(&class(2, vec![Type::Number])));
        assert!(!mixed.equals(&numbers));
    }

    #[test]
    fn type_variables() {
        let t = Type::Var("T".into());
        assert!(t.accepts(&Type::Number));
        assert!(t.equals(&Type::Var("T".into())));
        assert!(!t.equals(&Type::Var("U".into())));
    }

    #[test]
    fn function_types() {
        let f = |p: Type, r: Type| Type::Function { params: vec![ParamSymbol::new("a", p)], ret: Box::new(r) };
        assert!(f(Type::Mixed, Type::Mixed).equals(&f(Type::Number, Type::String)));
        assert!(!f(Type::Number, Type::Number).equals(&f(Type::String, Type::Number)));
        let zero = Type::Function { params: vec![], ret: Box::new(Type::Number) };
        assert!(!zero.equals(&f(Type::Number, Type::Number)));
    }

    #[test]
    fn substitution_reaches_nested_args() {
        let map = bindings(&["T".to_string()], &[Type::Number]);
        let ty = class(0, vec![Type::Var("T".into()).nullable()]);
        assert_eq!(ty.substitute(&map), class(0, vec![Type::Number.nullable()]));
        assert_eq!(Type::Var("U".into()).substitute(&map), Type::Var("U".into()));
    }

    #[test]
    fn display() {
        let array = Type::Class { id: ClassId(0), name: "Array".into(), args: vec![Type::String] };
        assert_eq!(array.nullable().to_string(), "Array<string>?");
        let f = Type::Function { params: vec![ParamSymbol::new("a", Type::Number)], ret: Box::new(Type::Void) };
        assert_eq!(f.to_string(), "(number) -> void");
    }
}
