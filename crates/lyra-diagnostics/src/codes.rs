// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error code registry.
//!
//! Maps error codes (E0001, E0300, etc.) to titles and the phase that
//! raises them. Used for JSON output.

use std::collections::HashMap;

use crate::DiagnosticKind;

/// Registry of all known error codes.
pub struct ErrorCodeRegistry {
    codes: HashMap<&'static str, ErrorCodeInfo>,
}

/// Information about a single error code.
pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub kind: DiagnosticKind,
}

macro_rules! register_codes {
    ($($code:literal => ($title:literal, $kind:expr)),* $(,)?) => {{
        let mut map = HashMap::new();
        $(
            map.insert($code, ErrorCodeInfo {
                code: $code,
                title: $title,
                kind: $kind,
            });
        )*
        map
    }};
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        use DiagnosticKind::*;

        Self {
            codes: register_codes! {
                // Tokenizer (E00xx)
                "E0001" => ("invalid token", Token),

                // Parser (E01xx)
                "E0100" => ("unexpected token", Parser),

                // Linker (E02xx)
                "E0200" => ("unknown native class", Type),
                "E0201" => ("cannot load module", Internal),
                "E0202" => ("name not declared by module", Type),

                // Checker (E03xx)
                "E0300" => ("mismatched types", Type),
                "E0301" => ("undefined name", Type),
                "E0302" => ("unknown type", Type),
                "E0303" => ("wrong number of type arguments", Type),
                "E0304" => ("duplicate member", Type),
                "E0305" => ("no such member", Type),
                "E0306" => ("private member", Type),
                "E0307" => ("static and instance mixed up", Type),
                "E0308" => ("invalid this or super", Type),
                "E0309" => ("invalid operand", Type),
                "E0310" => ("arity mismatch", Type),
                "E0311" => ("missing return", Type),
                "E0312" => ("readonly field", Type),
                "E0313" => ("interface not implemented", Type),

                // Interpreter (E04xx)
                "E0400" => ("undefined name", Runtime),
                "E0401" => ("no such member", Runtime),
                "E0402" => ("invalid operand", Runtime),
                "E0403" => ("index out of bounds", Runtime),
                "E0404" => ("missing argument", Runtime),
                "E0405" => ("invalid this or super", Runtime),
                "E0406" => ("assertion failed", Runtime),

                "E0900" => ("return outside of a method", Internal),
            },
        }
    }
}

impl ErrorCodeRegistry {
    pub fn get(&self, code: &str) -> Option<&ErrorCodeInfo> {
        self.codes.get(code)
    }

    pub fn all(&self) -> impl Iterator<Item = &ErrorCodeInfo> {
        self.codes.values()
    }
}
