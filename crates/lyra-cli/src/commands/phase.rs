// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Phase inspection commands: lex, parse.

use std::process;

use colored::Colorize;
use lyra_ast::token::TokenKind;
use lyra_ast::SourceMap;
use lyra_diagnostics::{Diagnostic, ToDiagnostic};
use lyra_lexer::Lexer;
use lyra_parser::Parser;

use super::pipeline::{fail, read_source};
use crate::{output, show_diagnostics, Format, Options};

pub fn cmd_lex(options: &Options) {
    let source = read_source(&options.path);
    let mut sources = SourceMap::new();
    let file = sources.add(options.path.as_str(), source.as_str());

    let result = Lexer::new(&source).with_file(file).tokenize();
    if !result.is_ok() {
        let diags: Vec<Diagnostic> = result.errors.iter().map(|e| e.to_diagnostic()).collect();
        show_diagnostics(&diags, &sources, &options.path, "lex", options.format);
        if options.format == Format::Human {
            eprintln!("{}", output::banner_fail(&format!("Lex: {} error(s)", result.errors.len())));
        }
        process::exit(1);
    }

    println!("{}\n", output::banner(&format!("Tokens ({})", result.tokens.len())));
    for tok in &result.tokens {
        if tok.kind == TokenKind::Eof {
            continue;
        }
        println!("{:4}:{:<4} {:?}", tok.span.start, tok.span.end, tok.kind);
    }
    println!("\n{}", output::banner_ok("Lex"));
}

pub fn cmd_parse(options: &Options) {
    let source = read_source(&options.path);
    let mut sources = SourceMap::new();
    let file = sources.add(options.path.as_str(), source.as_str());

    let tokens = match Lexer::new(&source).with_file(file).tokenize().into_result() {
        Ok(tokens) => tokens,
        Err(e) => fail(e.to_diagnostic(), &sources, options, "lex"),
    };
    println!("{}\n", output::banner(&format!("Lexed {} tokens", tokens.len())));

    let program = match Parser::new(tokens).parse() {
        Ok(program) => program,
        Err(e) => fail(e.to_diagnostic(), &sources, options, "parse"),
    };

    println!("{}\n", output::banner(&format!("AST ({} declarations)", program.decls.len())));
    for (i, decl) in program.decls.iter().enumerate() {
        println!("{}", format!("--- Declaration {} ---", i + 1).dimmed());
        println!("{:#?}", decl);
        println!();
    }
    println!("{}", output::banner_ok("Parse"));
}
