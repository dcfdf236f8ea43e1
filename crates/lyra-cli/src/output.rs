// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! CLI output formatting with colors and styling.
//!
//! Respects NO_COLOR and FORCE_COLOR environment variables.

use colored::{ColoredString, Colorize};

/// Initialize color support based on environment.
/// Call once at startup.
pub fn init() {
    if std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    } else if std::env::var_os("FORCE_COLOR").is_some() {
        colored::control::set_override(true);
    }
}

// === Error Output ===

pub fn error_label() -> ColoredString {
    "error".red().bold()
}

// === Banners ===

pub fn banner_ok(phase: &str) -> String {
    format!("{} {} {}", "===".dimmed(), format!("{} OK", phase).green().bold(), "===".dimmed())
}

pub fn banner_fail(phase: &str) -> String {
    format!("{} {} {}", "===".dimmed(), format!("{} FAILED", phase).red().bold(), "===".dimmed())
}

pub fn banner(text: &str) -> String {
    format!("{} {} {}", "===".dimmed(), text, "===".dimmed())
}

// === Status Output ===

pub fn status_pass() -> ColoredString {
    "✓".green()
}

pub fn status_fail() -> ColoredString {
    "✗".red()
}

// === Help Output ===

pub fn title(name: &str) -> ColoredString {
    name.bold()
}

pub fn version(v: &str) -> ColoredString {
    v.dimmed()
}

pub fn section_header(header: &str) -> ColoredString {
    header.yellow().bold()
}

pub fn command(name: &str) -> ColoredString {
    name.green()
}

pub fn arg(name: &str) -> ColoredString {
    name.cyan()
}

// === Decorations ===

pub fn separator(width: usize) -> ColoredString {
    "─".repeat(width).dimmed()
}

pub fn file_path(path: &str) -> ColoredString {
    path.underline()
}

// === Test Summary ===

pub fn passed_count(n: usize) -> ColoredString {
    format!("{} passed", n).green()
}

pub fn failed_count(n: usize) -> ColoredString {
    if n > 0 {
        format!("{} failed", n).red()
    } else {
        format!("{} failed", n).normal()
    }
}
