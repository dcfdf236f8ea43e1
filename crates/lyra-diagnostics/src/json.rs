// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON diagnostic output for machine consumption.
//!
//! Use `--format json` with `lyra run`, `check` or `test` to get this output.

use lyra_ast::{SourceMap, Span};
use serde::Serialize;

use crate::codes::ErrorCodeRegistry;
use crate::{Diagnostic, LabelStyle};

/// A complete JSON diagnostic report for one command.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    /// Schema version for forward compatibility.
    pub version: u32,
    /// The main file of the program.
    pub file: String,
    pub success: bool,
    /// The phase that produced these diagnostics (`link`, `check`, `run`, `test`).
    pub phase: String,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
}

/// A single diagnostic in JSON form, enriched with source context.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    /// `token`, `parser`, `type`, `runtime` or `internal`.
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Registry title of the code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub message: String,
    /// Primary source location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    pub labels: Vec<JsonLabel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// A source location with line/column (1-based).
#[derive(Debug, Serialize)]
pub struct SourceLocation {
    pub url: String,
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
    /// The source line text for context.
    pub source_line: String,
}

/// A labeled span in JSON form.
#[derive(Debug, Serialize)]
pub struct JsonLabel {
    /// "primary" or "secondary".
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<SourceLocation>,
}

/// Convert diagnostics to a structured JSON report.
pub fn to_json_report(diagnostics: &[Diagnostic], sources: &SourceMap, file: &str, phase: &str) -> DiagnosticReport {
    let registry = ErrorCodeRegistry::default();
    let diagnostics: Vec<_> = diagnostics.iter().map(|d| to_json_diagnostic(d, sources, &registry)).collect();

    DiagnosticReport {
        version: 1,
        file: file.to_string(),
        success: diagnostics.is_empty(),
        phase: phase.to_string(),
        error_count: diagnostics.len(),
        diagnostics,
    }
}

fn to_json_diagnostic(diag: &Diagnostic, sources: &SourceMap, registry: &ErrorCodeRegistry) -> JsonDiagnostic {
    let code = diag.code.as_ref().map(|c| c.0.clone());
    let title = code.as_deref().and_then(|c| registry.get(c)).map(|info| info.title.to_string());

    let labels = diag
        .labels
        .iter()
        .map(|l| JsonLabel {
            role: match l.style {
                LabelStyle::Primary => "primary".to_string(),
                LabelStyle::Secondary => "secondary".to_string(),
            },
            message: l.message.clone(),
            span: l.span,
            start: location(sources, l.span),
        })
        .collect();

    JsonDiagnostic {
        kind: diag.kind.as_str().to_string(),
        code,
        title,
        message: diag.message.clone(),
        location: diag.primary_span().and_then(|span| location(sources, span)),
        labels,
        notes: diag.notes.clone(),
        help: diag.help.clone(),
    }
}

fn location(sources: &SourceMap, span: Span) -> Option<SourceLocation> {
    let file = sources.get(span.file)?;
    let (line, column) = file.lines.offset_to_line_col(span.start.min(file.source.len()));
    Some(SourceLocation {
        url: file.url.clone(),
        line,
        column,
        byte_offset: span.start,
        source_line: file.lines.line_text(&file.source, line).unwrap_or("").to_string(),
    })
}

/// Serialize a diagnostic report to pretty JSON.
pub fn to_json_string(report: &DiagnosticReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DiagnosticKind;

    #[test]
    fn report_carries_locations() {
        let mut sources = SourceMap::new();
        let file = sources.add("main.lyra", "let a = b;\n");
        let diag = Diagnostic::new(DiagnosticKind::Runtime, "undefined variable `b`")
            .with_code("E0400")
            .at(Span::new(8, 9).in_file(file));

        let report = to_json_report(&[diag], &sources, "main.lyra", "run");
        let value: serde_json::Value = serde_json::from_str(&to_json_string(&report)).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["error_count"], 1);
        let d = &value["diagnostics"][0];
        assert_eq!(d["kind"], "runtime");
        assert_eq!(d["title"], "undefined name");
        assert_eq!(d["location"]["url"], "main.lyra");
        assert_eq!(d["location"]["line"], 1);
        assert_eq!(d["location"]["column"], 9);
        assert_eq!(d["location"]["source_line"], "let a = b;");
        assert_eq!(d["labels"][0]["span"]["start"], 8);
        assert!(d.get("help").is_none());
    }

    #[test]
    fn empty_report_succeeds() {
        let report = to_json_report(&[], &SourceMap::new(), "main.lyra", "check");
        assert!(report.success);
        assert_eq!(report.error_count, 0);
    }
}
