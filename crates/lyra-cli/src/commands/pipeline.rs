// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Shared front half of `run`, `check` and `test`: read, link, type check.

use std::process;

use lyra_ast::SourceMap;
use lyra_diagnostics::{Diagnostic, ToDiagnostic};
use lyra_linker::{FsLoader, LinkedProgram, Linker};
use lyra_types::TypeChecker;
use tracing::debug;

use crate::{output, show_diagnostics, Format, Options};

pub fn read_source(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: reading {}: {}", output::error_label(), output::file_path(path), e);
            process::exit(1);
        }
    }
}

/// Show one diagnostic and exit with status 1.
pub fn fail(diagnostic: Diagnostic, sources: &SourceMap, options: &Options, phase: &str) -> ! {
    show_diagnostics(&[diagnostic], sources, &options.path, phase, options.format);
    if options.format == Format::Human {
        eprintln!("{}", output::banner_fail(&capitalize(phase)));
    }
    process::exit(1);
}

/// Load the main file and every module it imports.
pub fn link_program(options: &Options) -> LinkedProgram {
    let source = read_source(&options.path);
    let mut linker = Linker::new(FsLoader);
    match linker.link(&options.path, &source) {
        Ok(program) => {
            debug!(modules = program.modules.len(), "linked {}", options.path);
            program
        }
        Err(e) => fail(e.to_diagnostic(), linker.sources(), options, "link"),
    }
}

pub fn check_program(program: &LinkedProgram, options: &Options) {
    debug!("type checking {}", options.path);
    if let Err(e) = TypeChecker::check(program) {
        fail(e.to_diagnostic(), &program.sources, options, "check");
    }
}

fn capitalize(phase: &str) -> String {
    let mut chars = phase.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
