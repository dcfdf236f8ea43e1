// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Binary operators. `&&` and `||` short-circuit in the evaluator and
//! never reach this module.

use std::cmp::Ordering;

use lyra_ast::expr::BinOp;

use crate::value::Value;

use super::RuntimeError;

/// Numeric view of an operand. Plain objects and lambdas have none.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Object(obj) => obj.borrow().unboxed().map(|inner| inner.to_number()),
        Value::Lambda(_) => None,
        other => Some(other.to_number()),
    }
}

fn is_string(value: &Value) -> bool {
    match value {
        Value::String(_) => true,
        Value::Object(obj) => matches!(obj.borrow().unboxed(), Some(Value::String(_))),
        _ => false,
    }
}

fn invalid(op: BinOp, l: &Value, r: &Value) -> RuntimeError {
    RuntimeError::InvalidOperands { op: op.symbol(), left: l.type_name(), right: r.type_name() }
}

/// Evaluate a binary operation on two evaluated operands.
pub(crate) fn eval_binop(op: BinOp, l: &Value, r: &Value) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Eq => return Ok(Value::Bool(l.strict_eq(r))),
        BinOp::Ne => return Ok(Value::Bool(!l.strict_eq(r))),
        BinOp::Add if is_string(l) || is_string(r) => return Ok(Value::String(format!("{}{}", l, r))),
        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => return compare(op, l, r),
        _ => {}
    }
    let (Some(a), Some(b)) = (numeric(l), numeric(r)) else {
        return Err(invalid(op, l, r));
    };
    Ok(Value::Number(match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        BinOp::Mod => a % b,
        _ => return Err(invalid(op, l, r)),
    }))
}

/// Strings compare lexicographically, everything else numerically.
/// Any comparison with NaN is false.
fn compare(op: BinOp, l: &Value, r: &Value) -> Result<Value, RuntimeError> {
    let ordering = match (l, r) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => {
            let (Some(a), Some(b)) = (numeric(l), numeric(r)) else {
                return Err(invalid(op, l, r));
            };
            a.partial_cmp(&b)
        }
    };
    let holds = match ordering {
        None => false,
        Some(ordering) => match op {
            BinOp::Lt => ordering == Ordering::Less,
            BinOp::Gt => ordering == Ordering::Greater,
            BinOp::Le => ordering != Ordering::Greater,
            BinOp::Ge => ordering != Ordering::Less,
            _ => return Err(invalid(op, l, r)),
        },
    };
    Ok(Value::Bool(holds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    fn string(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[test]
    fn addition_concatenates_with_strings() {
        assert_eq!(eval_binop(BinOp::Add, &num(2.0), &num(3.0)).unwrap().to_string(), "5");
        assert_eq!(eval_binop(BinOp::Add, &string("a"), &num(1.0)).unwrap().to_string(), "a1");
        assert_eq!(eval_binop(BinOp::Add, &num(1.5), &string("x")).unwrap().to_string(), "1.5x");
    }

    #[test]
    fn arithmetic_follows_ieee() {
        assert_eq!(eval_binop(BinOp::Div, &num(7.0), &num(2.0)).unwrap().to_string(), "3.5");
        assert_eq!(eval_binop(BinOp::Div, &num(1.0), &num(0.0)).unwrap().to_string(), "Infinity");
        assert_eq!(eval_binop(BinOp::Mod, &num(7.0), &num(4.0)).unwrap().to_string(), "3");
        assert_eq!(eval_binop(BinOp::Sub, &string("5"), &num(1.0)).unwrap().to_string(), "4");
    }

    #[test]
    fn comparisons() {
        assert!(eval_binop(BinOp::Lt, &num(1.0), &num(2.0)).unwrap().is_truthy());
        assert!(eval_binop(BinOp::Ge, &num(2.0), &num(2.0)).unwrap().is_truthy());
        assert!(eval_binop(BinOp::Lt, &string("apple"), &string("banana")).unwrap().is_truthy());
        assert!(!eval_binop(BinOp::Lt, &num(f64::NAN), &num(1.0)).unwrap().is_truthy());
    }

    #[test]
    fn equality_is_strict() {
        assert!(eval_binop(BinOp::Eq, &num(1.0), &num(1.0)).unwrap().is_truthy());
        assert!(!eval_binop(BinOp::Eq, &num(1.0), &string("1")).unwrap().is_truthy());
        assert!(eval_binop(BinOp::Ne, &Value::Null, &Value::Bool(false)).unwrap().is_truthy());
    }
}
