// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal formatter for diagnostics.
//!
//! ```text
//! type error[E0300]: type mismatch: expected number, found string
//!   --> main.lyra:2:17
//!    |
//!  2 | let x: number = "a";
//!    |                 ^^^
//!    |
//!    = help: ...
//! ```
//!
//! Colors come from `colored`, which honors `NO_COLOR`; the CLI adds
//! `FORCE_COLOR`.

use std::collections::BTreeMap;

use colored::Colorize;

use lyra_ast::{SourceMap, Span};

use crate::{Diagnostic, LabelStyle};

/// Formats diagnostics against the files of one program.
pub struct DiagnosticFormatter<'a> {
    sources: &'a SourceMap,
}

/// A source line with its labels.
struct AnnotatedLine<'a> {
    url: &'a str,
    line_num: usize,
    text: &'a str,
    annotations: Vec<Annotation>,
}

struct Annotation {
    col_start: usize,
    col_end: usize,
    style: LabelStyle,
    message: Option<String>,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(sources: &'a SourceMap) -> Self {
        Self { sources }
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        self.format_header(&mut out, diagnostic);

        let annotated = self.collect_annotated_lines(diagnostic);
        if annotated.is_empty() {
            self.format_footer(&mut out, diagnostic, 2);
            return out;
        }

        let max_line = annotated.iter().map(|a| a.line_num).max().unwrap_or(1);
        let gutter_width = max_line.to_string().len().max(2);

        let mut prev: Option<(&str, usize)> = None;
        for (i, line) in annotated.iter().enumerate() {
            let same_file = prev.is_some_and(|(url, _)| url == line.url);
            if !same_file {
                let col = line.annotations.first().map_or(1, |a| a.col_start);
                let arrow = if i == 0 { "-->" } else { ":::" };
                out.push_str(&format!(
                    "{}{} {}:{}:{}\n",
                    " ".repeat(gutter_width.saturating_sub(1)),
                    arrow.blue(),
                    line.url,
                    line.line_num,
                    col
                ));
                out.push_str(&format!("{} {}\n", " ".repeat(gutter_width + 1), "|".blue()));
            } else if let Some((_, prev_line)) = prev {
                if line.line_num > prev_line + 1 {
                    out.push_str(&format!("{} {}\n", " ".repeat(gutter_width), "...".blue()));
                }
            }

            out.push_str(&format!(
                "{:>width$} {} {}\n",
                line.line_num.to_string().blue().bold(),
                "|".blue(),
                line.text,
                width = gutter_width + 1,
            ));
            self.format_annotations(&mut out, line, gutter_width);
            prev = Some((line.url, line.line_num));
        }

        if !diagnostic.notes.is_empty() || diagnostic.help.is_some() {
            out.push_str(&format!("{} {}\n", " ".repeat(gutter_width + 1), "|".blue()));
        }
        self.format_footer(&mut out, diagnostic, gutter_width);
        out
    }

    fn format_header(&self, out: &mut String, diagnostic: &Diagnostic) {
        let kind = diagnostic.kind.to_string();
        match &diagnostic.code {
            Some(code) => out.push_str(&format!(
                "{}[{}]: {}\n",
                kind.red().bold(),
                code.0.red().bold(),
                diagnostic.message.bold()
            )),
            None => out.push_str(&format!("{}: {}\n", kind.red().bold(), diagnostic.message.bold())),
        }
    }

    fn format_footer(&self, out: &mut String, diagnostic: &Diagnostic, gutter_width: usize) {
        for note in &diagnostic.notes {
            out.push_str(&format!(
                "{} {} {}: {}\n",
                " ".repeat(gutter_width + 1),
                "=".cyan(),
                "note".cyan().bold(),
                note
            ));
        }
        if let Some(help) = &diagnostic.help {
            out.push_str(&format!(
                "{} {} {}: {}\n",
                " ".repeat(gutter_width + 1),
                "=".cyan(),
                "help".cyan().bold(),
                help
            ));
        }
    }

    /// `(url, line, col)` of a span start plus the line's text.
    fn locate(&self, span: Span, offset: usize) -> Option<(&'a str, usize, usize, &'a str)> {
        let file = self.sources.get(span.file)?;
        let (line, col) = file.lines.offset_to_line_col(offset.min(file.source.len()));
        let text = file.lines.line_text(&file.source, line)?;
        Some((file.url.as_str(), line, col, text))
    }

    fn collect_annotated_lines(&self, diagnostic: &Diagnostic) -> Vec<AnnotatedLine<'a>> {
        let mut lines: BTreeMap<(u32, usize), AnnotatedLine<'a>> = BTreeMap::new();
        let mut order = Vec::new();

        for label in &diagnostic.labels {
            let Some((url, line_num, col_start, text)) = self.locate(label.span, label.span.start) else {
                continue;
            };
            let (end_line, col_end) = self
                .locate(label.span, label.span.end)
                .map_or((line_num, col_start + 1), |(_, l, c, _)| (l, c));

            // Multi-line spans underline to the end of their first line.
            let col_end = if end_line == line_num { col_end } else { text.len() + 1 };

            let key = (label.span.file.0, line_num);
            let entry = lines.entry(key).or_insert_with(|| {
                order.push(key);
                AnnotatedLine { url, line_num, text, annotations: Vec::new() }
            });
            entry.annotations.push(Annotation {
                col_start,
                col_end: col_end.max(col_start + 1),
                style: label.style,
                message: label.message.clone(),
            });
        }

        // Files in order of first mention, lines ascending within a file.
        let mut files: Vec<u32> = Vec::new();
        for (file, _) in &order {
            if !files.contains(file) {
                files.push(*file);
            }
        }
        let mut result = Vec::new();
        for file in files {
            let keys: Vec<_> = lines.keys().filter(|(f, _)| *f == file).copied().collect();
            for key in keys {
                if let Some(line) = lines.remove(&key) {
                    result.push(line);
                }
            }
        }
        result
    }

    fn format_annotations(&self, out: &mut String, line: &AnnotatedLine, gutter_width: usize) {
        let mut sorted: Vec<&Annotation> = line.annotations.iter().collect();
        sorted.sort_by(|a, b| {
            a.style.cmp_priority().cmp(&b.style.cmp_priority()).then(a.col_start.cmp(&b.col_start))
        });

        let width = line.text.chars().count() + 2;
        let mut underline = vec![' '; width];
        let mut messages: Vec<(usize, LabelStyle, &str)> = Vec::new();

        for ann in &sorted {
            let ch = match ann.style {
                LabelStyle::Primary => '^',
                LabelStyle::Secondary => '-',
            };
            let end = ann.col_end.saturating_sub(1).min(width);
            for slot in underline.iter_mut().take(end).skip(ann.col_start - 1) {
                *slot = ch;
            }
            if let Some(msg) = &ann.message {
                messages.push((ann.col_start, ann.style, msg));
            }
        }

        let underline: String = underline.iter().collect::<String>().trim_end().to_string();
        if underline.is_empty() {
            return;
        }
        let gutter = format!("{} {}", " ".repeat(gutter_width + 1), "|".blue());
        let underline = color_underline(&underline);

        match messages.as_slice() {
            [] => out.push_str(&format!("{} {}\n", gutter, underline)),
            [(_, style, msg)] => out.push_str(&format!("{} {} {}\n", gutter, underline, styled(msg, *style))),
            _ => {
                out.push_str(&format!("{} {}\n", gutter, underline));
                for (col, style, msg) in messages.iter().rev() {
                    out.push_str(&format!(
                        "{} {}{}\n",
                        gutter,
                        " ".repeat(col.saturating_sub(1)),
                        styled(msg, *style)
                    ));
                }
            }
        }
    }
}

impl LabelStyle {
    fn cmp_priority(&self) -> u8 {
        match self {
            LabelStyle::Primary => 0,
            LabelStyle::Secondary => 1,
        }
    }
}

fn styled(msg: &str, style: LabelStyle) -> String {
    match style {
        LabelStyle::Primary => msg.red().bold().to_string(),
        LabelStyle::Secondary => msg.blue().to_string(),
    }
}

/// Color the underline characters (^ in red, - in blue).
fn color_underline(s: &str) -> String {
    let mut result = String::new();
    let mut current = None;
    let mut run = String::new();

    for ch in s.chars() {
        let kind = matches!(ch, '^' | '-').then_some(ch);
        if kind != current && !run.is_empty() {
            result.push_str(&flush_run(&run, current));
            run.clear();
        }
        run.push(ch);
        current = kind;
    }
    if !run.is_empty() {
        result.push_str(&flush_run(&run, current));
    }
    result
}

fn flush_run(run: &str, kind: Option<char>) -> String {
    match kind {
        Some('^') => run.red().bold().to_string(),
        Some('-') => run.blue().to_string(),
        _ => run.to_string(),
    }
}
