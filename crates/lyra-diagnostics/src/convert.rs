// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions from phase error types to `Diagnostic`.

use lyra_interp::{RuntimeDiagnostic, RuntimeError};
use lyra_linker::{LinkError, LoadError};
use lyra_parser::SyntaxError;
use lyra_types::{Type, TypeError};

use crate::suggestions;
use crate::{Diagnostic, DiagnosticKind, ToDiagnostic};

// ============================================================================
// Lex and Parse Errors
// ============================================================================

impl ToDiagnostic for lyra_lexer::LexError {
    fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::Token, &self.message)
            .with_code("E0001")
            .at(self.span)
            .with_help_opt(self.hint.clone())
    }
}

impl ToDiagnostic for lyra_parser::ParseError {
    fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::Parser, &self.message)
            .with_code("E0100")
            .with_primary(self.span, "here")
            .with_help_opt(self.hint.clone())
    }
}

impl ToDiagnostic for SyntaxError {
    fn to_diagnostic(&self) -> Diagnostic {
        match self {
            SyntaxError::Lex(e) => e.to_diagnostic(),
            SyntaxError::Parse(e) => e.to_diagnostic(),
        }
    }
}

// ============================================================================
// Link Errors
// ============================================================================

impl ToDiagnostic for LinkError {
    fn to_diagnostic(&self) -> Diagnostic {
        match self {
            LinkError::Syntax(e) => e.to_diagnostic(),

            LinkError::UnknownNative { name, span } => Diagnostic::new(DiagnosticKind::Type, self.to_string())
                .with_code("E0200")
                .with_primary(*span, "no native class with this name")
                .with_help_opt(suggestions::native_class(name))
                .with_note("imports without `from` name native classes such as `System` or `Assert`"),

            LinkError::Load { source, span } => {
                let diag = Diagnostic::new(DiagnosticKind::Internal, self.to_string())
                    .with_code("E0201")
                    .with_primary(*span, "imported here");
                match source {
                    LoadError::NotFound(_) => diag.with_help("paths are relative to the importing file"),
                    LoadError::Io { .. } => diag,
                }
            }

            LinkError::MissingExport { url, span, .. } => Diagnostic::new(DiagnosticKind::Type, self.to_string())
                .with_code("E0202")
                .with_primary(*span, "imported here")
                .with_note(format!("only classes and interfaces declared in {} can be imported", url)),
        }
    }
}

// ============================================================================
// Type Errors
// ============================================================================

/// Class whose methods a receiver of type `ty` sees.
fn receiver_class(ty: &Type) -> Option<&str> {
    match ty {
        Type::String => Some("String"),
        Type::Number => Some("Number"),
        Type::Boolean => Some("Boolean"),
        Type::Class { name, .. } => Some(name),
        Type::Nullable(inner) => receiver_class(inner),
        _ => None,
    }
}

fn type_code(error: &TypeError) -> &'static str {
    use TypeError::*;

    match error {
        Mismatch { .. } | DefaultMismatch { .. } | ArrayElement { .. } => "E0300",
        Undefined { .. } | UnknownFunction { .. } => "E0301",
        NotAClass { .. }
        | NotAnInterface { .. }
        | UnknownSuperclass { .. }
        | UnknownInterface { .. }
        | UnknownClass { .. }
        | InstantiateInterface { .. } => "E0302",
        TypeArgumentCount { .. } => "E0303",
        DuplicateMember { .. } => "E0304",
        UnknownMember { .. } | UnknownMethod { .. } | NotAnObject { .. } | NullableReceiver { .. } => "E0305",
        Private { .. } => "E0306",
        StaticAsInstance { .. } | InstanceAsStatic { .. } => "E0307",
        ThisOutsideClass { .. } | SuperOutsideSubclass { .. } | BareSuper { .. } => "E0308",
        NotIndexable { .. }
        | InvalidBinary { .. }
        | InvalidNot { .. }
        | InvalidCondition { .. }
        | NotCallable { .. }
        | NotIterable { .. } => "E0309",
        TooManyArguments { .. } | MissingArgument { .. } => "E0310",
        MissingReturn { .. } | MissingReturnValue { .. } | LambdaReturnType { .. } => "E0311",
        ReadonlyField { .. } => "E0312",
        MissingInterfaceMethod { .. } | IncompatibleImplementation { .. } => "E0313",
    }
}

impl ToDiagnostic for TypeError {
    fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::new(DiagnosticKind::Type, self.to_string())
            .with_code(type_code(self))
            .at(self.span());

        match self {
            TypeError::UnknownMethod { ty, method, .. } => {
                diag.with_help_opt(receiver_class(ty).and_then(|class| suggestions::native_method(class, method)))
            }
            TypeError::NullableReceiver { .. } => {
                diag.with_note("a nullable value may be null at runtime; methods need an object")
            }
            TypeError::Private { owner, .. } => {
                diag.with_note(format!("private members are visible in `{}` and its direct subclasses", owner))
            }
            TypeError::LambdaReturnType { .. } => diag.with_help("annotate the lambda: `(x: number): number => ...`"),
            TypeError::MissingReturn { .. } => diag.with_note("every path through the method must return a value"),
            TypeError::InstantiateInterface { .. } => diag.with_help("instantiate a class that implements it"),
            _ => diag,
        }
    }
}

// ============================================================================
// Runtime Errors
// ============================================================================

impl ToDiagnostic for RuntimeDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic {
        use RuntimeError::*;

        let (kind, code) = match &self.error {
            Undefined(_) | UnknownClass(_) => (DiagnosticKind::Runtime, "E0400"),
            NoSuchMethod { .. } | NoSuchField { .. } => (DiagnosticKind::Runtime, "E0401"),
            NotAnObject(_)
            | NotCallable(_)
            | NotIndexable(_)
            | NotIterable(_)
            | InvalidOperands { .. }
            | CannotConvert(_)
            | InvalidArgument(_) => (DiagnosticKind::Runtime, "E0402"),
            IndexOutOfBounds { .. } => (DiagnosticKind::Runtime, "E0403"),
            MissingParameter(_) => (DiagnosticKind::Runtime, "E0404"),
            NoSuperclass(_) | ThisOutsideMethod => (DiagnosticKind::Runtime, "E0405"),
            AssertionFailed(_) => (DiagnosticKind::Runtime, "E0406"),
            Return(_) => (DiagnosticKind::Internal, "E0900"),
        };

        let diag = Diagnostic::new(kind, self.error.to_string()).with_code(code).at(self.span);
        match &self.error {
            NoSuchMethod { class, method } => diag.with_help_opt(suggestions::native_method(class, method)),
            UnknownClass(_) => diag.with_note("classes exist once their declaration has run"),
            _ => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyra_ast::Span;

    #[test]
    fn runtime_errors_keep_their_span() {
        let err = RuntimeError::IndexOutOfBounds { index: 4.0, len: 2 }.at(Span::new(3, 7));
        let diag = err.to_diagnostic();
        assert_eq!(diag.kind, DiagnosticKind::Runtime);
        assert_eq!(diag.code.clone().map(|c| c.0).as_deref(), Some("E0403"));
        assert_eq!(diag.primary_span(), Some(Span::new(3, 7)));
        assert_eq!(diag.message, "index 4 out of bounds (length is 2)");
    }

    #[test]
    fn misspelled_native_method_gets_a_hint() {
        let err = RuntimeError::NoSuchMethod { class: "String".into(), method: "lenght".into() }.at(Span::default());
        assert_eq!(err.to_diagnostic().help.as_deref(), Some("did you mean `length`?"));
    }

    #[test]
    fn type_errors_are_type_diagnostics() {
        let err = TypeError::mismatch(&Type::Number, &Type::String, Span::new(8, 11));
        let diag = err.to_diagnostic();
        assert_eq!(diag.kind, DiagnosticKind::Type);
        assert_eq!(diag.message, "type mismatch: expected number, found string");
        assert_eq!(diag.primary_span(), Some(Span::new(8, 11)));
    }

    #[test]
    fn unknown_native_import_suggests_a_class() {
        let err = LinkError::UnknownNative { name: "Assrt".into(), span: Span::new(7, 12) };
        let diag = err.to_diagnostic();
        assert_eq!(diag.help.as_deref(), Some("did you mean `Assert`?"));
        assert_eq!(diag.kind, DiagnosticKind::Type);
    }
}
