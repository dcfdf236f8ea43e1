// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression evaluation.

use std::rc::Rc;

use lyra_ast::expr::{BinOp, Expr, ExprKind, Literal, UnaryOp};
use lyra_ast::Span;

use crate::env::Environment;
use crate::native::ArrayObject;
use crate::value::{Closure, InstanceRef, Value};

use super::convert::{from_lyra_value, host_values};
use super::operators::eval_binop;
use super::{Eval, Interpreter, RuntimeError};

impl Interpreter {
    pub(crate) fn eval_expr(&mut self, expr: &Expr, env: &Environment) -> Eval<Value> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(match lit {
                Literal::Number(n) => Value::Number(*n),
                Literal::String(s) => Value::String(s.clone()),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Null => Value::Null,
            }),
            ExprKind::Ident(name) => {
                env.get(name).ok_or_else(|| RuntimeError::Undefined(name.clone()).at(expr.span))
            }
            ExprKind::This | ExprKind::Super => {
                let this = env.this().ok_or_else(|| RuntimeError::ThisOutsideMethod.at(expr.span))?;
                Ok(Value::Object(this.instance))
            }
            ExprKind::New { ty, args } => {
                let name = ty.base_name().unwrap_or_default();
                let class = self.lookup_class(name).map_err(|e| e.at(ty.span))?;
                let values = self.eval_args(args, env)?;
                Ok(Value::Object(self.instantiate(&class, values, env, expr.span)?))
            }
            ExprKind::Call { callee, args } => self.eval_call(callee, args, env, expr.span),
            ExprKind::Member { object, property } => {
                let instance = self.eval_object(object, env)?;
                let found = instance.borrow().field(property);
                found.ok_or_else(|| self.no_such_field(&instance, property).at(expr.span))
            }
            ExprKind::Index { object, index } => {
                let target = self.eval_expr(object, env)?;
                let index = self.eval_expr(index, env)?.to_number();
                self.read_index(&target, index).map_err(|e| e.at(expr.span))
            }
            ExprKind::Binary { op: BinOp::And, left, right } => {
                let l = self.eval_expr(left, env)?;
                if !l.is_truthy() {
                    return Ok(l);
                }
                self.eval_expr(right, env)
            }
            ExprKind::Binary { op: BinOp::Or, left, right } => {
                let l = self.eval_expr(left, env)?;
                if l.is_truthy() {
                    return Ok(l);
                }
                self.eval_expr(right, env)
            }
            ExprKind::Binary { op, left, right } => {
                let l = self.eval_expr(left, env)?;
                let r = self.eval_expr(right, env)?;
                eval_binop(*op, &l, &r).map_err(|e| e.at(expr.span))
            }
            ExprKind::Unary { op: UnaryOp::Not, operand } => {
                let value = self.eval_expr(operand, env)?;
                Ok(Value::Bool(!value.is_truthy()))
            }
            ExprKind::Assign { target, value } => self.eval_assign(target, value, env, expr.span),
            ExprKind::Array(items) => {
                let values = self.eval_args(items, env)?;
                let host = host_values(&values).map_err(|e| e.at(expr.span))?;
                self.new_array(host).map_err(|e| e.at(expr.span))
            }
            ExprKind::Lambda(lambda) => Ok(Value::Lambda(Rc::new(Closure {
                params: lambda.params.clone(),
                ret: lambda.ret.clone(),
                body: lambda.body.clone(),
                env: env.clone(),
            }))),
        }
    }

    /// Evaluate the receiver of a member access. `super.x` reads `this`.
    fn eval_object(&mut self, object: &Expr, env: &Environment) -> Eval<InstanceRef> {
        match self.eval_expr(object, env)? {
            Value::Object(instance) => Ok(instance),
            other => Err(RuntimeError::NotAnObject(other.type_name()).at(object.span)),
        }
    }

    fn no_such_field(&self, instance: &InstanceRef, field: &str) -> RuntimeError {
        RuntimeError::NoSuchField { class: instance.borrow().class.name.clone(), field: field.to_string() }
    }

    fn eval_assign(&mut self, target: &Expr, value: &Expr, env: &Environment, span: Span) -> Eval<Value> {
        match &target.kind {
            ExprKind::Ident(name) => {
                let value = self.eval_expr(value, env)?;
                if env.set(name, value.clone()) {
                    Ok(value)
                } else {
                    Err(RuntimeError::Undefined(name.clone()).at(target.span))
                }
            }
            ExprKind::Member { object, property } => {
                let instance = self.eval_object(object, env)?;
                let value = self.eval_expr(value, env)?;
                if instance.borrow_mut().set_field(property, value.clone()) {
                    Ok(value)
                } else {
                    Err(self.no_such_field(&instance, property).at(target.span))
                }
            }
            ExprKind::Index { object, index } => {
                let array = self.eval_expr(object, env)?;
                let index = self.eval_expr(index, env)?.to_number();
                let value = self.eval_expr(value, env)?;
                self.write_index(&array, index, &value).map_err(|e| e.at(span))?;
                Ok(value)
            }
            _ => Err(RuntimeError::InvalidArgument("invalid assignment target".to_string()).at(target.span)),
        }
    }

    /// `array[i]` on a native array, or `string[i]` for one character.
    fn read_index(&self, target: &Value, index: f64) -> Result<Value, RuntimeError> {
        match target {
            Value::String(s) => {
                let len = s.chars().count();
                let c = checked_index(index, len).and_then(|i| s.chars().nth(i));
                c.map(|c| Value::String(c.to_string())).ok_or(RuntimeError::IndexOutOfBounds { index, len })
            }
            Value::Object(obj) => {
                let native = obj.borrow().native.clone();
                let array = native.as_ref().and_then(|n| n.as_any().downcast_ref::<ArrayObject>());
                let Some(array) = array else {
                    return Err(RuntimeError::NotIndexable(target.type_name()));
                };
                let len = array.len();
                let item = checked_index(index, len).and_then(|i| array.get(i));
                let item = item.ok_or(RuntimeError::IndexOutOfBounds { index, len })?;
                self.to_lyra_value(item)
            }
            other => Err(RuntimeError::NotIndexable(other.type_name())),
        }
    }

    /// `array[i] = v`. Writing at `length` appends.
    fn write_index(&self, target: &Value, index: f64, value: &Value) -> Result<(), RuntimeError> {
        let native = match target {
            Value::Object(obj) => obj.borrow().native.clone(),
            _ => None,
        };
        let array = native.as_ref().and_then(|n| n.as_any().downcast_ref::<ArrayObject>());
        let Some(array) = array else {
            return Err(RuntimeError::NotIndexable(target.type_name()));
        };
        let len = array.len();
        let slot = checked_index(index, len + 1).ok_or(RuntimeError::IndexOutOfBounds { index, len })?;
        array.set(slot, from_lyra_value(value)?)
    }
}

/// A non-negative integral index below `len`.
fn checked_index(index: f64, len: usize) -> Option<usize> {
    if index.is_nan() || index < 0.0 || index.fract() != 0.0 {
        return None;
    }
    let index = index as usize;
    (index < len).then_some(index)
}
