// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `System`, `Assert` and the global `print` function.

use super::{arg, HostValue, NativeFunction};
use crate::interp::RuntimeError;
use crate::output::Output;

pub(super) const SYSTEM_FUNCTIONS: &[(&str, NativeFunction)] = &[
    ("print", print as NativeFunction),
    ("write", write as NativeFunction),
];

pub(super) const ASSERT_FUNCTIONS: &[(&str, NativeFunction)] = &[
    ("equals", assert_equals as NativeFunction),
    ("notEquals", assert_not_equals as NativeFunction),
    ("isTrue", assert_true as NativeFunction),
    ("isFalse", assert_false as NativeFunction),
    ("isNull", assert_null as NativeFunction),
    ("notNull", assert_not_null as NativeFunction),
    ("fail", fail as NativeFunction),
];

/// Message followed by a newline.
pub(super) fn print(out: &Output, args: Vec<HostValue>) -> Result<HostValue, RuntimeError> {
    out.write_line(&arg(&args, 0).to_string());
    Ok(HostValue::Null)
}

fn write(out: &Output, args: Vec<HostValue>) -> Result<HostValue, RuntimeError> {
    out.write(&arg(&args, 0).to_string());
    Ok(HostValue::Null)
}

/// Strings are quoted so `"1"` and `1` read differently.
fn describe(value: &HostValue) -> String {
    match value {
        HostValue::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    }
}

fn check(holds: bool, message: impl FnOnce() -> String) -> Result<HostValue, RuntimeError> {
    if holds {
        Ok(HostValue::Null)
    } else {
        Err(RuntimeError::AssertionFailed(message()))
    }
}

fn assert_equals(_out: &Output, args: Vec<HostValue>) -> Result<HostValue, RuntimeError> {
    let (expected, actual) = (arg(&args, 0), arg(&args, 1));
    check(expected.strict_eq(&actual), || format!("expected {} but got {}", describe(&expected), describe(&actual)))
}

fn assert_not_equals(_out: &Output, args: Vec<HostValue>) -> Result<HostValue, RuntimeError> {
    let (expected, actual) = (arg(&args, 0), arg(&args, 1));
    check(!expected.strict_eq(&actual), || format!("expected a value other than {}", describe(&expected)))
}

fn assert_true(_out: &Output, args: Vec<HostValue>) -> Result<HostValue, RuntimeError> {
    let value = arg(&args, 0);
    check(matches!(value, HostValue::Bool(true)), || format!("expected true but got {}", value))
}

fn assert_false(_out: &Output, args: Vec<HostValue>) -> Result<HostValue, RuntimeError> {
    let value = arg(&args, 0);
    check(matches!(value, HostValue::Bool(false)), || format!("expected false but got {}", value))
}

fn assert_null(_out: &Output, args: Vec<HostValue>) -> Result<HostValue, RuntimeError> {
    let value = arg(&args, 0);
    check(matches!(value, HostValue::Null), || format!("expected null but got {}", value))
}

fn assert_not_null(_out: &Output, args: Vec<HostValue>) -> Result<HostValue, RuntimeError> {
    check(!matches!(arg(&args, 0), HostValue::Null), || "expected a non-null value".to_string())
}

fn fail(_out: &Output, args: Vec<HostValue>) -> Result<HostValue, RuntimeError> {
    Err(RuntimeError::AssertionFailed(match arg(&args, 0) {
        HostValue::Null => "assertion failed".to_string(),
        message => message.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_appends_a_newline_and_write_does_not() {
        let (out, buffer) = Output::captured();
        print(&out, vec![HostValue::Number(5.0)]).unwrap();
        write(&out, vec![HostValue::String("a".into())]).unwrap();
        write(&out, vec![HostValue::String("b".into())]).unwrap();
        assert_eq!(*buffer.lock().unwrap(), "5\nab");
    }

    #[test]
    fn equality_assertions_compare_strictly() {
        let out = Output::captured().0;
        assert!(assert_equals(&out, vec![HostValue::Number(1.0), HostValue::Number(1.0)]).is_ok());
        let err = assert_equals(&out, vec![HostValue::Number(1.0), HostValue::String("1".into())]).unwrap_err();
        assert_eq!(err.to_string(), "assertion failed: expected 1 but got \"1\"");
        assert!(assert_not_equals(&out, vec![HostValue::Null, HostValue::Bool(false)]).is_ok());
    }

    #[test]
    fn boolean_assertions_need_real_booleans() {
        let out = Output::captured().0;
        assert!(assert_true(&out, vec![HostValue::Bool(true)]).is_ok());
        assert!(assert_true(&out, vec![HostValue::Number(1.0)]).is_err());
        assert!(assert_false(&out, vec![HostValue::Bool(false)]).is_ok());
        assert!(assert_null(&out, vec![]).is_ok());
        assert!(assert_not_null(&out, vec![]).is_err());
    }

    #[test]
    fn fail_uses_the_given_message() {
        let out = Output::captured().0;
        let err = fail(&out, vec![HostValue::String("boom".into())]).unwrap_err();
        assert!(matches!(err, RuntimeError::AssertionFailed(m) if m == "boom"));
    }
}
