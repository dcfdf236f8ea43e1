// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Execution commands: run, check, test.

use std::process;

use colored::Colorize;
use lyra_diagnostics::json;
use lyra_diagnostics::ToDiagnostic;
use lyra_interp::{Interpreter, TestResult, TestSuites};
use serde::Serialize;

use super::pipeline::{check_program, fail, link_program};
use crate::{output, Format, Options};

pub fn cmd_run(options: &Options) {
    let program = link_program(options);
    if !options.no_check {
        check_program(&program, options);
    }

    let mut interp = Interpreter::new();
    if let Err(diag) = interp.run(&program) {
        fail(diag.to_diagnostic(), &program.sources, options, "run");
    }
}

pub fn cmd_check(options: &Options) {
    let program = link_program(options);
    check_program(&program, options);

    match options.format {
        Format::Human => println!("{}", output::banner_ok("Check")),
        Format::Json => {
            let report = json::to_json_report(&[], &program.sources, &options.path, "check");
            println!("{}", json::to_json_string(&report));
        }
    }
}

/// `lyra test --format json` output.
#[derive(Serialize)]
struct TestReport<'a> {
    file: &'a str,
    passed: usize,
    failed: usize,
    tests: Vec<TestEntry>,
}

#[derive(Serialize)]
struct TestEntry {
    name: String,
    passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    duration_ms: f64,
}

pub fn cmd_test(options: &Options) {
    let program = link_program(options);
    if !options.no_check {
        check_program(&program, options);
    }

    let mut suites = TestSuites::new(Interpreter::new());
    if let Some(filter) = &options.filter {
        suites = suites.with_filter(filter.clone());
    }
    let results = match suites.execute(&program) {
        Ok(results) => results,
        Err(diag) => fail(diag.to_diagnostic(), &program.sources, options, "test"),
    };

    let failed = results.iter().filter(|r| !r.passed).count();
    match options.format {
        Format::Human => print_results(&options.path, &results),
        Format::Json => {
            let report = TestReport {
                file: &options.path,
                passed: results.len() - failed,
                failed,
                tests: results
                    .iter()
                    .map(|r| TestEntry {
                        name: r.name(),
                        passed: r.passed,
                        message: r.message.clone(),
                        duration_ms: r.duration.as_secs_f64() * 1000.0,
                    })
                    .collect(),
            };
            match serde_json::to_string_pretty(&report) {
                Ok(text) => println!("{}", text),
                Err(e) => eprintln!("{}: {}", output::error_label(), e),
            }
        }
    }

    if failed > 0 {
        process::exit(1);
    }
}

fn print_results(path: &str, results: &[TestResult]) {
    println!("{}\n", output::banner(&format!("Testing {}", output::file_path(path))));
    if results.is_empty() {
        println!("  No tests found.");
        return;
    }

    let mut passed = 0;
    let mut total = std::time::Duration::ZERO;
    for r in results {
        total += r.duration;
        if r.passed {
            passed += 1;
            println!(
                "  {} {} {}",
                output::status_pass(),
                r.name(),
                format!("({}ms)", r.duration.as_millis()).dimmed()
            );
        } else {
            println!("  {} {}", output::status_fail(), r.name());
            if let Some(message) = &r.message {
                println!("      {}", message.red());
            }
        }
    }

    println!();
    println!("{}", output::separator(50));
    println!(
        "{} tests, {}, {} ({}ms)",
        results.len(),
        output::passed_count(passed),
        output::failed_count(results.len() - passed),
        total.as_millis(),
    );
}
