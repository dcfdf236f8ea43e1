// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lyra CLI - runs, checks and tests Lyra programs.

mod commands;
mod help;
mod output;

use std::env;
use std::process;

use lyra_ast::SourceMap;
use lyra_diagnostics::formatter::DiagnosticFormatter;
use lyra_diagnostics::json;
use lyra_diagnostics::Diagnostic;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// How diagnostics are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Human,
    Json,
}

/// Arguments shared by the file commands.
#[derive(Debug)]
pub struct Options {
    pub path: String,
    pub format: Format,
    pub no_check: bool,
    pub filter: Option<String>,
}

fn main() {
    output::init();
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        help::print_usage();
        return;
    };

    match command.as_str() {
        "help" | "--help" | "-h" => help::print_usage(),
        "version" | "--version" | "-V" => println!("lyra {}", env!("CARGO_PKG_VERSION")),
        cmd @ ("run" | "check" | "test" | "lex" | "parse") => {
            let options = match parse_options(&args[1..]) {
                Ok(options) => options,
                Err(msg) => {
                    eprintln!("{}: {}", output::error_label(), msg);
                    eprintln!("usage: {}", help::command_usage(cmd));
                    process::exit(1);
                }
            };
            match cmd {
                "run" => commands::run::cmd_run(&options),
                "check" => commands::run::cmd_check(&options),
                "test" => commands::run::cmd_test(&options),
                "lex" => commands::phase::cmd_lex(&options),
                _ => commands::phase::cmd_parse(&options),
            }
        }
        other => {
            eprintln!("{}: unknown command `{}`", output::error_label(), other);
            eprintln!();
            help::print_usage();
            process::exit(1);
        }
    }
}

/// Logs go to stderr, filtered by `LYRA_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env("LYRA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut path = None;
    let mut format = Format::Human;
    let mut no_check = false;
    let mut filter = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--format" => {
                format = match iter.next().map(String::as_str) {
                    Some("human") => Format::Human,
                    Some("json") => Format::Json,
                    Some(other) => return Err(format!("unknown format `{}`", other)),
                    None => return Err("--format needs a value".to_string()),
                };
            }
            "--json" => format = Format::Json,
            "--no-check" => no_check = true,
            "--filter" => match iter.next() {
                Some(pattern) => filter = Some(pattern.clone()),
                None => return Err("--filter needs a pattern".to_string()),
            },
            flag if flag.starts_with("--") => return Err(format!("unknown option `{}`", flag)),
            file => {
                if path.replace(file.to_string()).is_some() {
                    return Err("expected a single file".to_string());
                }
            }
        }
    }

    let path = path.ok_or_else(|| "missing file argument".to_string())?;
    Ok(Options { path, format, no_check, filter })
}

/// Print diagnostics: rendered to stderr, or as a JSON report on stdout.
pub fn show_diagnostics(diagnostics: &[Diagnostic], sources: &SourceMap, path: &str, phase: &str, format: Format) {
    match format {
        Format::Human => {
            let formatter = DiagnosticFormatter::new(sources);
            for diagnostic in diagnostics {
                eprintln!("{}", formatter.format(diagnostic));
            }
        }
        Format::Json => {
            let report = json::to_json_report(diagnostics, sources, path, phase);
            println!("{}", json::to_json_string(&report));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_in_any_order() {
        let options = parse_options(&args(&["--format", "json", "main.lyra", "--no-check"])).unwrap();
        assert_eq!(options.path, "main.lyra");
        assert_eq!(options.format, Format::Json);
        assert!(options.no_check);
        assert!(options.filter.is_none());

        let options = parse_options(&args(&["main.lyra", "--filter", "Math"])).unwrap();
        assert_eq!(options.filter.as_deref(), Some("Math"));
        assert_eq!(options.format, Format::Human);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse_options(&args(&[])).is_err());
        assert!(parse_options(&args(&["a.lyra", "b.lyra"])).is_err());
        assert!(parse_options(&args(&["a.lyra", "--format", "xml"])).is_err());
        assert!(parse_options(&args(&["a.lyra", "--verbose"])).is_err());
        assert!(parse_options(&args(&["a.lyra", "--filter"])).is_err());
    }
}
