// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type checker error types.

use lyra_ast::Span;

use crate::types::Type;

/// A type error. Checking stops at the first one.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    #[error("type mismatch: expected {expected}, found {found}")]
    Mismatch { expected: Type, found: Type, span: Span },
    #[error("'{name}' is not a class reference")]
    NotAClass { name: String, span: Span },
    #[error("'{name}' is not an interface")]
    NotAnInterface { name: String, span: Span },
    #[error("'{name}' expects {expected} type arguments, found {found}")]
    TypeArgumentCount { name: String, expected: usize, found: usize, span: Span },
    #[error("Unknown superclass '{name}'")]
    UnknownSuperclass { name: String, span: Span },
    #[error("unknown interface '{name}'")]
    UnknownInterface { name: String, span: Span },
    #[error("duplicate member '{member}' in '{owner}'")]
    DuplicateMember { owner: String, member: String, span: Span },
    #[error("default value of '{param}' does not match type: expected {expected}, found {found}")]
    DefaultMismatch { param: String, expected: Type, found: Type, span: Span },
    #[error("undefined identifier '{name}'")]
    Undefined { name: String, span: Span },
    #[error("unknown class '{name}'")]
    UnknownClass { name: String, span: Span },
    #[error("cannot instantiate interface '{name}'")]
    InstantiateInterface { name: String, span: Span },
    #[error("unknown member '{member}' on type {ty}")]
    UnknownMember { ty: Type, member: String, span: Span },
    #[error("unknown method '{method}' on type {ty}")]
    UnknownMethod { ty: Type, method: String, span: Span },
    #[error("cannot access member '{member}' of non-object type {ty}")]
    NotAnObject { ty: Type, member: String, span: Span },
    #[error("cannot call method '{method}' on nullable type {ty}")]
    NullableReceiver { ty: Type, method: String, span: Span },
    #[error("cannot access private {kind} '{name}' of '{owner}'")]
    Private { kind: &'static str, name: String, owner: String, span: Span },
    #[error("cannot call static method '{method}' as an instance method")]
    StaticAsInstance { method: String, span: Span },
    #[error("cannot call instance method '{method}' as static")]
    InstanceAsStatic { method: String, span: Span },
    #[error("'this' is only valid inside a class")]
    ThisOutsideClass { span: Span },
    #[error("'super' is only valid inside a class with a superclass")]
    SuperOutsideSubclass { span: Span },
    #[error("'super' can only be called or used to call a method")]
    BareSuper { span: Span },
    #[error("cannot index into type {ty}")]
    NotIndexable { ty: Type, span: Span },
    #[error("cannot apply '{op}' to {left} and {right}")]
    InvalidBinary { op: &'static str, left: Type, right: Type, span: Span },
    #[error("'!' expects boolean, found {ty}")]
    InvalidNot { ty: Type, span: Span },
    #[error("condition must be boolean, found {ty}")]
    InvalidCondition { ty: Type, span: Span },
    #[error("type {ty} is not callable")]
    NotCallable { ty: Type, span: Span },
    #[error("unknown function '{name}'")]
    UnknownFunction { name: String, span: Span },
    #[error("too many arguments: expected at most {expected}, found {found}")]
    TooManyArguments { expected: usize, found: usize, span: Span },
    #[error("missing argument '{param}'")]
    MissingArgument { param: String, span: Span },
    #[error("lambda must have a return type")]
    LambdaReturnType { span: Span },
    #[error("missing return in '{method}': expected {expected}")]
    MissingReturn { method: String, expected: Type, span: Span },
    #[error("missing return value in '{method}': expected {expected}")]
    MissingReturnValue { method: String, expected: Type, span: Span },
    #[error("cannot assign to readonly field '{field}'")]
    ReadonlyField { field: String, span: Span },
    #[error("foreach expects an iterable, found {ty}")]
    NotIterable { ty: Type, span: Span },
    #[error("array elements must have same type: expected {expected}, found {found}")]
    ArrayElement { expected: Type, found: Type, span: Span },
    #[error("class '{class}' does not implement method '{method}' of interface '{interface}'")]
    MissingInterfaceMethod { class: String, interface: String, method: String, span: Span },
    #[error("method '{method}' of class '{class}' does not match interface '{interface}': {reason}")]
    IncompatibleImplementation {
        class: String,
        interface: String,
        method: String,
        reason: String,
        span: Span,
    },
}

impl TypeError {
    pub fn mismatch(expected: &Type, found: &Type, span: Span) -> Self {
        TypeError::Mismatch { expected: expected.clone(), found: found.clone(), span }
    }

    pub fn span(&self) -> Span {
        match self {
            TypeError::Mismatch { span, .. }
            | TypeError::NotAClass { span, .. }
            | TypeError::NotAnInterface { span, .. }
            | TypeError::TypeArgumentCount { span, .. }
            | TypeError::UnknownSuperclass { span, .. }
            | TypeError::UnknownInterface { span, .. }
            | TypeError::DuplicateMember { span, .. }
            | TypeError::DefaultMismatch { span, .. }
            | TypeError::Undefined { span, .. }
            | TypeError::UnknownClass { span, .. }
            | TypeError::InstantiateInterface { span, .. }
            | TypeError::UnknownMember { span, .. }
            | TypeError::UnknownMethod { span, .. }
            | TypeError::NotAnObject { span, .. }
            | TypeError::NullableReceiver { span, .. }
            | TypeError::Private { span, .. }
            | TypeError::StaticAsInstance { span, .. }
            | TypeError::InstanceAsStatic { span, .. }
            | TypeError::ThisOutsideClass { span }
            | TypeError::SuperOutsideSubclass { span }
            | TypeError::BareSuper { span }
            | TypeError::NotIndexable { span, .. }
            | TypeError::InvalidBinary { span, .. }
            | TypeError::InvalidNot { span, .. }
            | TypeError::InvalidCondition { span, .. }
            | TypeError::NotCallable { span, .. }
            | TypeError::UnknownFunction { span, .. }
            | TypeError::TooManyArguments { span, .. }
            | TypeError::MissingArgument { span, .. }
            | TypeError::LambdaReturnType { span }
            | TypeError::MissingReturn { span, .. }
            | TypeError::MissingReturnValue { span, .. }
            | TypeError::ReadonlyField { span, .. }
            | TypeError::NotIterable { span, .. }
            | TypeError::ArrayElement { span, .. }
            | TypeError::MissingInterfaceMethod { span, .. }
            | TypeError::IncompatibleImplementation { span, .. } => *span,
        }
    }
}
