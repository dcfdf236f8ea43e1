// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Call dispatch: lambdas, native functions, static, instance and super calls.

use std::collections::HashSet;
use std::rc::Rc;

use lyra_ast::decl::{MethodDecl, Param};
use lyra_ast::expr::{Expr, ExprKind, LambdaBody};
use lyra_ast::stmt::Stmt;
use lyra_ast::Span;

use crate::env::{Environment, ThisBinding};
use crate::native::{native_function, HostValue};
use crate::value::{ClassDefinition, Closure, InstanceRef, Value};

use super::cast::cast_to;
use super::convert::host_values;
use super::{Eval, Interpreter, RuntimeDiagnostic, RuntimeError};

type Resolved = (Rc<ClassDefinition>, Rc<MethodDecl>);

impl Interpreter {
    pub(crate) fn eval_call(&mut self, callee: &Expr, args: &[Expr], env: &Environment, span: Span) -> Eval<Value> {
        match &callee.kind {
            ExprKind::Super => self.call_super_constructor(args, env, span),
            ExprKind::Member { object, property } => match &object.kind {
                ExprKind::Super => self.call_super_method(property, args, env, span),
                ExprKind::Ident(name) if self.is_static_target(name, env) => {
                    self.call_static(name, property, args, env, span)
                }
                _ => {
                    let receiver = self.eval_expr(object, env)?;
                    let values = self.eval_args(args, env)?;
                    let instance = self.autobox(&receiver).map_err(|e| e.at(object.span))?;
                    self.call_method(&instance, property, values, env, span)
                }
            },
            ExprKind::Ident(name) => match env.get(name) {
                Some(Value::Lambda(closure)) => {
                    let values = self.eval_args(args, env)?;
                    self.call_lambda(&closure, values, env, span)
                }
                Some(_) => Err(RuntimeError::NotCallable(name.clone()).at(callee.span)),
                None => self.call_native_function(name, args, env, span),
            },
            _ => match self.eval_expr(callee, env)? {
                Value::Lambda(closure) => {
                    let values = self.eval_args(args, env)?;
                    self.call_lambda(&closure, values, env, span)
                }
                other => Err(RuntimeError::NotCallable(other.type_name()).at(callee.span)),
            },
        }
    }

    pub(crate) fn eval_args(&mut self, args: &[Expr], env: &Environment) -> Eval<Vec<Value>> {
        args.iter().map(|arg| self.eval_expr(arg, env)).collect()
    }

    /// Match arguments to parameters positionally. A missing argument takes
    /// its default, evaluated in the caller's environment. Values are cast
    /// by the declared parameter type; extra arguments are dropped.
    pub(crate) fn bind_arguments(
        &mut self,
        params: &[Param],
        args: Vec<Value>,
        caller: &Environment,
        span: Span,
    ) -> Eval<Vec<Value>> {
        let mut args = args.into_iter();
        let mut bound = Vec::with_capacity(params.len());
        for param in params {
            let value = match (args.next(), &param.default) {
                (Some(value), _) => value,
                (None, Some(default)) => self.eval_expr(default, caller)?,
                (None, None) => return Err(RuntimeError::MissingParameter(param.name.clone()).at(span)),
            };
            bound.push(cast_to(value, param.ty.as_ref()));
        }
        Ok(bound)
    }

    /// Run a statement body, turning a `return` into the body's value.
    pub(crate) fn run_body(&mut self, body: &[Stmt], frame: &Environment) -> Eval<Value> {
        match self.exec_block(body, frame) {
            Ok(()) => Ok(Value::Null),
            Err(RuntimeDiagnostic { error: RuntimeError::Return(value), .. }) => Ok(value),
            Err(e) => Err(e),
        }
    }

    /// Run a method body on `this`. The frame's parent is the global
    /// environment, not the caller's.
    pub(crate) fn invoke(
        &mut self,
        this: ThisBinding,
        method: &MethodDecl,
        args: Vec<Value>,
        caller: &Environment,
        span: Span,
    ) -> Eval<Value> {
        let Some(body) = &method.body else {
            let class = this.class.name.clone();
            return Err(RuntimeError::NoSuchMethod { class, method: method.name.clone() }.at(span));
        };
        let values = self.bind_arguments(&method.params, args, caller, span)?;
        let frame = self.globals.anchored(this);
        for (param, value) in method.params.iter().zip(values) {
            frame.define(param.name.clone(), value);
        }
        let result = self.run_body(body, &frame)?;
        Ok(cast_to(result, method.ret.as_ref()))
    }

    /// Call a host implementation. Arguments are bound against the
    /// signature stub when there is one, so defaults apply.
    fn call_native(
        &mut self,
        signature: Option<&MethodDecl>,
        args: Vec<Value>,
        caller: &Environment,
        span: Span,
        call: impl FnOnce(Vec<HostValue>) -> Result<HostValue, RuntimeError>,
    ) -> Eval<Value> {
        let args = match signature {
            Some(decl) => self.bind_arguments(&decl.params, args, caller, span)?,
            None => args,
        };
        let host = host_values(&args).map_err(|e| e.at(span))?;
        let result = call(host).and_then(|r| self.to_lyra_value(r)).map_err(|e| e.at(span))?;
        Ok(cast_to(result, signature.and_then(|d| d.ret.as_ref())))
    }

    /// Instance call on an object, walking its class chain. Native-backed
    /// objects answer their own methods first.
    pub(crate) fn call_method(
        &mut self,
        instance: &InstanceRef,
        name: &str,
        args: Vec<Value>,
        caller: &Environment,
        span: Span,
    ) -> Eval<Value> {
        let (class, native) = {
            let instance = instance.borrow();
            (instance.class.clone(), instance.native.clone())
        };
        let found = self.find_method(&class, name);
        if let Some(native) = native.filter(|n| n.has_method(name)) {
            let signature = found.map(|(_, m)| m);
            return self.call_native(signature.as_deref(), args, caller, span, |host| native.call(name, host));
        }
        let (owner, method) = found.ok_or_else(|| {
            RuntimeError::NoSuchMethod { class: class.name.clone(), method: name.to_string() }.at(span)
        })?;
        self.invoke(ThisBinding { instance: instance.clone(), class: owner }, &method, args, caller, span)
    }

    /// `Class.method(...)` where `Class` is not shadowed. Static methods
    /// are looked up on the class itself only.
    fn call_static(&mut self, class_name: &str, method: &str, args: &[Expr], env: &Environment, span: Span) -> Eval<Value> {
        let class = self.lookup_class(class_name).map_err(|e| e.at(span))?;
        let decl = class.static_methods.get(method).cloned().ok_or_else(|| {
            RuntimeError::NoSuchMethod { class: class.name.clone(), method: method.to_string() }.at(span)
        })?;
        let values = self.eval_args(args, env)?;
        if let Some(function) = class.native.and_then(|n| n.static_function(method)) {
            let output = self.output.clone();
            return self.call_native(Some(&decl), values, env, span, |host| function(&output, host));
        }
        let object = self.class_objects.get(class_name).cloned().ok_or_else(|| {
            RuntimeError::UnknownClass(class_name.to_string()).at(span)
        })?;
        self.invoke(ThisBinding { instance: object, class }, &decl, values, env, span)
    }

    /// A class name that still refers to its class-level object.
    fn is_static_target(&self, name: &str, env: &Environment) -> bool {
        let Some(object) = self.class_objects.get(name) else {
            return false;
        };
        self.classes.contains_key(name)
            && match env.get(name) {
                None => true,
                Some(Value::Object(bound)) => Rc::ptr_eq(&bound, object),
                Some(_) => false,
            }
    }

    /// `super.method(...)`: resolved from the superclass of the class that
    /// declared the running method, on the same `this`.
    fn call_super_method(&mut self, name: &str, args: &[Expr], env: &Environment, span: Span) -> Eval<Value> {
        let this = env.this().ok_or_else(|| RuntimeError::ThisOutsideMethod.at(span))?;
        let parent = self.superclass_of(&this.class).map_err(|e| e.at(span))?;
        let (owner, method) = self.find_method(&parent, name).ok_or_else(|| {
            RuntimeError::NoSuchMethod { class: parent.name.clone(), method: name.to_string() }.at(span)
        })?;
        let values = self.eval_args(args, env)?;
        self.invoke(ThisBinding { instance: this.instance, class: owner }, &method, values, env, span)
    }

    /// `super(...)`: the constructor declared by the superclass of the
    /// declaring class. Without one the call does nothing.
    fn call_super_constructor(&mut self, args: &[Expr], env: &Environment, span: Span) -> Eval<Value> {
        let this = env.this().ok_or_else(|| RuntimeError::ThisOutsideMethod.at(span))?;
        let parent = self.superclass_of(&this.class).map_err(|e| e.at(span))?;
        let values = self.eval_args(args, env)?;
        if let Some(constructor) = &parent.constructor {
            self.invoke(ThisBinding { instance: this.instance, class: parent.clone() }, constructor, values, env, span)?;
        }
        Ok(Value::Null)
    }

    pub(crate) fn call_lambda(&mut self, closure: &Closure, args: Vec<Value>, caller: &Environment, span: Span) -> Eval<Value> {
        let values = self.bind_arguments(&closure.params, args, caller, span)?;
        let frame = closure.env.child();
        for (param, value) in closure.params.iter().zip(values) {
            frame.define(param.name.clone(), value);
        }
        let result = match &closure.body {
            LambdaBody::Expr(expr) => self.eval_expr(expr, &frame)?,
            LambdaBody::Block(body) => self.run_body(body, &frame)?,
        };
        Ok(cast_to(result, closure.ret.as_ref()))
    }

    fn call_native_function(&mut self, name: &str, args: &[Expr], env: &Environment, span: Span) -> Eval<Value> {
        let function = native_function(name).ok_or_else(|| RuntimeError::Undefined(name.to_string()).at(span))?;
        let signature = self.functions.get(name).cloned();
        let values = self.eval_args(args, env)?;
        let output = self.output.clone();
        self.call_native(signature.as_deref(), values, env, span, |host| function(&output, host))
    }

    pub(crate) fn lookup_class(&self, name: &str) -> Result<Rc<ClassDefinition>, RuntimeError> {
        self.classes.get(name).cloned().ok_or_else(|| RuntimeError::UnknownClass(name.to_string()))
    }

    fn superclass_of(&self, class: &ClassDefinition) -> Result<Rc<ClassDefinition>, RuntimeError> {
        let name = class.superclass.as_ref().ok_or_else(|| RuntimeError::NoSuperclass(class.name.clone()))?;
        self.lookup_class(name)
    }

    /// The class and its known superclasses, nearest first. Stops at an
    /// unknown name or a cycle.
    pub(crate) fn ancestry(&self, class: &Rc<ClassDefinition>) -> Vec<Rc<ClassDefinition>> {
        let mut chain = vec![class.clone()];
        let mut seen = HashSet::from([class.name.clone()]);
        let mut next = class.superclass.clone();
        while let Some(name) = next {
            if !seen.insert(name.clone()) {
                break;
            }
            let Some(parent) = self.classes.get(&name) else { break };
            next = parent.superclass.clone();
            chain.push(parent.clone());
        }
        chain
    }

    pub(crate) fn find_method(&self, class: &Rc<ClassDefinition>, name: &str) -> Option<Resolved> {
        self.ancestry(class).into_iter().find_map(|c| {
            let method = c.instance_methods.get(name).cloned()?;
            Some((c, method))
        })
    }
}
