// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Environment for variable bindings.
//!
//! Frames are reference counted and linked to their parent, so lambdas can
//! keep the frame they were created in alive.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::{ClassDefinition, InstanceRef, Value};

/// The object a method runs on, and the class that declared the method.
#[derive(Debug, Clone)]
pub struct ThisBinding {
    pub instance: InstanceRef,
    /// Starting point for `super` lookups.
    pub class: Rc<ClassDefinition>,
}

#[derive(Debug, Default)]
struct Frame {
    bindings: HashMap<String, Value>,
    parent: Option<Environment>,
    this: Option<ThisBinding>,
}

/// A handle to one frame of the environment chain.
#[derive(Debug, Clone, Default)]
pub struct Environment(Rc<RefCell<Frame>>);

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new frame whose parent is `self`.
    pub fn child(&self) -> Self {
        Self(Rc::new(RefCell::new(Frame { parent: Some(self.clone()), ..Frame::default() })))
    }

    /// A new frame anchored on a `this` instance.
    pub fn anchored(&self, this: ThisBinding) -> Self {
        Self(Rc::new(RefCell::new(Frame {
            parent: Some(self.clone()),
            this: Some(this),
            ..Frame::default()
        })))
    }

    /// Bind `name` in this frame.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().bindings.insert(name.into(), value);
    }

    /// Look up a name, walking up the chain. An anchored frame also
    /// answers with the fields of its `this` instance.
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut current = Some(self.clone());
        while let Some(env) = current {
            let frame = env.0.borrow();
            if let Some(value) = frame.bindings.get(name) {
                return Some(value.clone());
            }
            if let Some(value) = frame.this.as_ref().and_then(|this| this.instance.borrow().field(name)) {
                return Some(value);
            }
            current = frame.parent.clone();
        }
        None
    }

    /// Assign to the nearest existing binding or `this` field. Returns
    /// false when there is none.
    pub fn set(&self, name: &str, value: Value) -> bool {
        let mut current = Some(self.clone());
        while let Some(env) = current {
            let mut frame = env.0.borrow_mut();
            if let Some(slot) = frame.bindings.get_mut(name) {
                *slot = value;
                return true;
            }
            if let Some(this) = &frame.this {
                let mut instance = this.instance.borrow_mut();
                if instance.has_field(name) {
                    return instance.set_field(name, value);
                }
            }
            current = frame.parent.clone();
        }
        false
    }

    /// Nearest `this` anchor.
    pub fn this(&self) -> Option<ThisBinding> {
        let mut current = Some(self.clone());
        while let Some(env) = current {
            let frame = env.0.borrow();
            if let Some(this) = &frame.this {
                return Some(this.clone());
            }
            current = frame.parent.clone();
        }
        None
    }

    /// Bindings of this frame only.
    pub fn bindings(&self) -> HashMap<String, Value> {
        self.0.borrow().bindings.clone()
    }
}
