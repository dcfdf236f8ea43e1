// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lexical scope used while checking.

use std::collections::HashMap;

use crate::symbols::Owner;
use crate::types::Type;

#[derive(Debug, Default)]
struct Frame {
    values: HashMap<String, Type>,
    type_params: HashMap<String, Type>,
    /// Overrides the object inherited from outer frames.
    object: Option<Owner>,
}

/// Stack of frames, innermost last. Value types, type-parameter bindings
/// and the current object are looked up from the innermost frame out.
#[derive(Debug)]
pub struct TypeScope {
    frames: Vec<Frame>,
}

impl Default for TypeScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeScope {
    pub fn new() -> Self {
        Self { frames: vec![Frame::default()] }
    }

    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Enter the body of a class or interface.
    pub fn push_object(&mut self, object: Owner) {
        self.frames.push(Frame { object: Some(object), ..Frame::default() });
    }

    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn define(&mut self, name: impl Into<String>, ty: Type) {
        if let Some(frame) = self.frames.last_mut() {
            frame.values.insert(name.into(), ty);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Type> {
        self.frames.iter().rev().find_map(|f| f.values.get(name))
    }

    /// Look up a name in the frames opened inside the current object's
    /// body. Without a current object every frame is searched.
    pub fn lookup_local(&self, name: &str) -> Option<&Type> {
        let start = self.object_frame().unwrap_or(0);
        self.frames[start..].iter().rev().find_map(|f| f.values.get(name))
    }

    /// Look up a name in the frames enclosing the current object's body.
    pub fn lookup_enclosing(&self, name: &str) -> Option<&Type> {
        let end = self.object_frame()?;
        self.frames[..end].iter().rev().find_map(|f| f.values.get(name))
    }

    fn object_frame(&self) -> Option<usize> {
        self.frames.iter().rposition(|f| f.object.is_some())
    }

    /// Bind each name to a type variable of the same name.
    pub fn bind_type_params(&mut self, names: &[String]) {
        if let Some(frame) = self.frames.last_mut() {
            for name in names {
                frame.type_params.insert(name.clone(), Type::Var(name.clone()));
            }
        }
    }

    pub fn type_param(&self, name: &str) -> Option<&Type> {
        self.frames.iter().rev().find_map(|f| f.type_params.get(name))
    }

    pub fn current_object(&self) -> Option<Owner> {
        self.frames.iter().rev().find_map(|f| f.object)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Consume the scope, keeping the bindings of the outermost frame.
    pub fn into_globals(mut self) -> HashMap<String, Type> {
        self.frames.truncate(1);
        self.frames.pop().map(|f| f.values).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::ClassId;

    #[test]
    fn inner_bindings_shadow_outer() {
        let mut scope = TypeScope::new();
        scope.define("x", Type::Number);
        scope.push();
        scope.define("x", Type::String);
        assert_eq!(scope.lookup("x"), Some(&Type::String));
        scope.pop();
        assert_eq!(scope.lookup("x"), Some(&Type::Number));
    }

    #[test]
    fn object_is_inherited_by_nested_frames() {
        let mut scope = TypeScope::new();
        assert_eq!(scope.current_object(), None);
        let owner = Owner::Class(ClassId(3));
        scope.push_object(owner);
        scope.bind_type_params(&["T".to_string()]);
        scope.push();
        assert_eq!(scope.current_object(), Some(owner));
        assert_eq!(scope.type_param("T"), Some(&Type::Var("T".into())));
        scope.pop();
        scope.pop();
        assert_eq!(scope.current_object(), None);
        assert!(scope.type_param("T").is_none());
    }

    #[test]
    fn object_bodies_split_locals_from_enclosing_bindings() {
        let mut scope = TypeScope::new();
        scope.define("count", Type::String);
        assert_eq!(scope.lookup_local("count"), Some(&Type::String));
        assert!(scope.lookup_enclosing("count").is_none());

        scope.push_object(Owner::Class(ClassId(0)));
        scope.push();
        assert!(scope.lookup_local("count").is_none());
        assert_eq!(scope.lookup_enclosing("count"), Some(&Type::String));
        scope.define("count", Type::Number);
        assert_eq!(scope.lookup_local("count"), Some(&Type::Number));
    }

    #[test]
    fn root_frame_is_never_popped() {
        let mut scope = TypeScope::new();
        scope.pop();
        scope.define("x", Type::Boolean);
        assert_eq!(scope.depth(), 1);
        assert!(scope.lookup("x").is_some());
    }
}
