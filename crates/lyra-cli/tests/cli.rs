// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Integration tests for the `lyra` binary. Each test runs a fixture and
//! checks exit status and output.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

fn lyra(args: &[&str], file: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lyra"))
        .args(args)
        .arg(fixture(file))
        .env("NO_COLOR", "1")
        .env_remove("LYRA_LOG")
        .output()
        .expect("failed to run lyra")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}

#[test]
fn run_prints_program_output() {
    let out = lyra(&["run"], "hello.lyra");
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "hello Lyra\n");
}

#[test]
fn check_reports_type_errors_with_location() {
    let out = lyra(&["check"], "type_error.lyra");
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("type error[E0300]: type mismatch: expected number, found string"), "{}", err);
    assert!(err.contains("type_error.lyra:2:21"), "{}", err);
    assert!(err.contains("let label: number = \"one\";"), "{}", err);
}

#[test]
fn check_passes_valid_programs() {
    let out = lyra(&["check"], "hello.lyra");
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Check OK"));
}

#[test]
fn run_without_check_skips_type_errors() {
    let out = lyra(&["run", "--no-check"], "type_error.lyra");
    assert!(out.status.success(), "stderr: {}", stderr(&out));
}

#[test]
fn runtime_errors_as_json() {
    let out = lyra(&["run", "--format", "json"], "runtime_error.lyra");
    assert_eq!(out.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_str(&stdout(&out)).expect("stdout should be JSON");
    assert_eq!(report["phase"], "run");
    assert_eq!(report["success"], false);
    let diag = &report["diagnostics"][0];
    assert_eq!(diag["kind"], "runtime");
    assert_eq!(diag["code"], "E0403");
    assert_eq!(diag["location"]["line"], 2);
}

#[test]
fn test_command_reports_failures() {
    let out = lyra(&["test"], "math_test.lyra");
    assert_eq!(out.status.code(), Some(1));
    let text = stdout(&out);
    assert!(text.contains("✓ MathTest.addition"), "{}", text);
    assert!(text.contains("✗ MathTest.broken"), "{}", text);
    assert!(text.contains("assertion failed: expected 5 but got 4"), "{}", text);
    assert!(text.contains("1 passed, 1 failed"), "{}", text);
}

#[test]
fn test_filter_selects_tests() {
    let out = lyra(&["test", "--filter", "addition", "--format", "json"], "math_test.lyra");
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let report: serde_json::Value = serde_json::from_str(&stdout(&out)).expect("stdout should be JSON");
    assert_eq!(report["passed"], 1);
    assert_eq!(report["failed"], 0);
    assert_eq!(report["tests"][0]["name"], "MathTest.addition");
}

#[test]
fn lex_and_parse_dump_phases() {
    let out = lyra(&["lex"], "greeter.lyra");
    assert!(out.status.success());
    assert!(stdout(&out).contains("Class"));

    let out = lyra(&["parse"], "greeter.lyra");
    assert!(out.status.success());
    assert!(stdout(&out).contains("AST (1 declarations)"));
}

#[test]
fn missing_file_fails() {
    let out = lyra(&["run"], "does_not_exist.lyra");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("reading"));
}
