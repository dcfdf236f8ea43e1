// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lyra diagnostics.
//!
//! Every phase reports its own error type. Each one converts to a
//! `Diagnostic` via the `ToDiagnostic` trait, which the CLI renders either
//! for a terminal or as JSON.

pub mod codes;
pub mod convert;
pub mod formatter;
pub mod json;
pub mod suggestions;

use std::fmt;

use lyra_ast::Span;
use serde::Serialize;

// ============================================================================
// Core Types
// ============================================================================

/// A phase error with the context needed to display it.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub code: Option<ErrorCode>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

/// Which phase raised the diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    Token,
    Parser,
    Type,
    Runtime,
    /// A failure of the toolchain itself, such as an unreadable file.
    Internal,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::Token => "token",
            DiagnosticKind::Parser => "parser",
            DiagnosticKind::Type => "type",
            DiagnosticKind::Runtime => "runtime",
            DiagnosticKind::Internal => "internal",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::Token => "token error",
            DiagnosticKind::Parser => "parse error",
            DiagnosticKind::Type => "type error",
            DiagnosticKind::Runtime => "runtime error",
            DiagnosticKind::Internal => "internal error",
        };
        f.write_str(name)
    }
}

/// A labeled source span within a diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub span: Span,
    pub style: LabelStyle,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    /// Where the error happened (`^` underline).
    Primary,
    /// Related location (`-` underline).
    Secondary,
}

/// An error code like E0300.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ErrorCode(pub String);

// ============================================================================
// Builder API
// ============================================================================

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(ErrorCode(code.into()));
        self
    }

    pub fn with_label(mut self, span: Span, style: LabelStyle, msg: impl Into<String>) -> Self {
        self.labels.push(Label { span, style, message: Some(msg.into()) });
        self
    }

    pub fn with_primary(self, span: Span, msg: impl Into<String>) -> Self {
        self.with_label(span, LabelStyle::Primary, msg)
    }

    /// Primary label without a message.
    pub fn at(mut self, span: Span) -> Self {
        self.labels.push(Label { span, style: LabelStyle::Primary, message: None });
        self
    }

    pub fn with_secondary(self, span: Span, msg: impl Into<String>) -> Self {
        self.with_label(span, LabelStyle::Secondary, msg)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attach help only when there is some.
    pub fn with_help_opt(self, help: Option<String>) -> Self {
        match help {
            Some(help) => self.with_help(help),
            None => self,
        }
    }

    /// Returns the primary span (first primary label, or first label).
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|l| l.style == LabelStyle::Primary)
            .or(self.labels.first())
            .map(|l| l.span)
    }
}

// ============================================================================
// Conversion Trait
// ============================================================================

/// Convert a phase error into a diagnostic.
pub trait ToDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_span_prefers_primary_labels() {
        let diag = Diagnostic::new(DiagnosticKind::Type, "mismatch")
            .with_secondary(Span::new(0, 2), "declared here")
            .with_primary(Span::new(5, 9), "used here");
        assert_eq!(diag.primary_span(), Some(Span::new(5, 9)));
    }

    #[test]
    fn kinds_display_as_phase_names() {
        assert_eq!(DiagnosticKind::Token.to_string(), "token error");
        assert_eq!(DiagnosticKind::Runtime.to_string(), "runtime error");
    }
}
