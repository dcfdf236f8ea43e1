// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Interface conformance of classes.

use std::collections::HashMap;

use tracing::trace;

use super::{TypeChecker, TypeError};
use crate::symbols::{ClassId, InterfaceId, MethodSymbol};
use crate::types::{bindings, Type};

impl<'a> TypeChecker<'a> {
    /// Every class provides each method of the interfaces it implements,
    /// including methods the interfaces inherit, with compatible
    /// parameters and return type.
    pub fn check_classes_implements(&mut self) -> Result<(), TypeError> {
        let classes: Vec<(ClassId, Vec<Type>)> =
            self.registry.classes().map(|c| (c.id, c.implements.clone())).collect();
        for (class_id, implements) in classes {
            for implemented in implements {
                if let Type::Interface { id, args, .. } = implemented {
                    self.check_conformance(class_id, id, &args)?;
                }
            }
        }
        Ok(())
    }

    fn check_conformance(&self, class_id: ClassId, iface_id: InterfaceId, args: &[Type]) -> Result<(), TypeError> {
        let class = self.registry.class(class_id);
        let iface = self.registry.interface(iface_id);
        trace!(class = %class.name, interface = %iface.name, "checking conformance");
        let map = bindings(&iface.type_params, args);

        for ancestor in self.registry.interface_ancestry(iface_id) {
            for required in self.registry.interface(ancestor).methods.values() {
                let Some(provided) = self.registry.resolve_instance_method(class_id, &required.name) else {
                    return Err(TypeError::MissingInterfaceMethod {
                        class: class.name.clone(),
                        interface: iface.name.clone(),
                        method: required.name.clone(),
                        span: class.span,
                    });
                };
                let incompatible = |reason: String| TypeError::IncompatibleImplementation {
                    class: class.name.clone(),
                    interface: iface.name.clone(),
                    method: required.name.clone(),
                    reason,
                    span: provided.span,
                };
                if let Some(reason) = self.signature_mismatch(required, provided, &map) {
                    return Err(incompatible(reason));
                }
            }
        }
        Ok(())
    }

    /// Why `provided` cannot stand in for `required`, if it cannot.
    fn signature_mismatch(
        &self,
        required: &MethodSymbol,
        provided: &MethodSymbol,
        map: &HashMap<String, Type>,
    ) -> Option<String> {
        if required.params.len() != provided.params.len() {
            return Some(format!(
                "expected {} parameters, found {}",
                required.params.len(),
                provided.params.len()
            ));
        }
        for (want, have) in required.params.iter().zip(&provided.params) {
            let want_ty = want.ty.substitute(map);
            if !self.is_assignable(&have.ty, &want_ty) {
                return Some(format!("parameter '{}' expects {}, found {}", have.name, want_ty, have.ty));
            }
        }
        let want_ret = required.ret.substitute(map);
        if !self.is_assignable(&want_ret, &provided.ret) {
            return Some(format!("return type expects {}, found {}", want_ret, provided.ret));
        }
        None
    }
}
