// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Help text for CLI commands.

use crate::output;

pub fn print_usage() {
    println!(
        "{} {} - a small class-based scripting language",
        output::title("Lyra"),
        output::version(env!("CARGO_PKG_VERSION"))
    );
    println!();
    println!(
        "{}: {} {} {}",
        output::section_header("Usage"),
        output::command("lyra"),
        output::arg("<command>"),
        output::arg("[args]")
    );
    println!();
    println!("{}", output::section_header("Commands:"));
    println!("  {} {}     Type check and run a program", output::command("run"), output::arg("<file>"));
    println!("  {} {}   Type check a program", output::command("check"), output::arg("<file>"));
    println!("  {} {}    Run the @test methods of a program", output::command("test"), output::arg("<file>"));
    println!("  {} {}     Tokenize a file and print tokens", output::command("lex"), output::arg("<file>"));
    println!("  {} {}   Parse a file and print the AST", output::command("parse"), output::arg("<file>"));
    println!("  {}            Show this help", output::command("help"));
    println!("  {}         Show version", output::command("version"));
    println!();
    println!("{}", output::section_header("Options:"));
    println!("  {}  Diagnostics as text (default) or JSON", output::arg("--format human|json"));
    println!("  {}           Run without type checking", output::arg("--no-check"));
    println!("  {}   Only tests whose Class.method contains pattern", output::arg("--filter <pattern>"));
    println!();
    println!("{}", output::section_header("Environment:"));
    println!("  {}   Log filter, e.g. `debug` or `lyra_interp=trace` (default: warn)", output::arg("LYRA_LOG"));
    println!("  {}   Disable colors", output::arg("NO_COLOR"));
    println!("  {} Force colors", output::arg("FORCE_COLOR"));
}

/// One-line usage for a command, shown on bad arguments.
pub fn command_usage(command: &str) -> &'static str {
    match command {
        "run" => "lyra run <file> [--no-check] [--format human|json]",
        "check" => "lyra check <file> [--format human|json]",
        "test" => "lyra test <file> [--filter <pattern>] [--format human|json]",
        "lex" => "lyra lex <file>",
        "parse" => "lyra parse <file>",
        _ => "lyra <command> [args]",
    }
}
