// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Linking error types.

use lyra_ast::Span;
use lyra_parser::SyntaxError;
use thiserror::Error;

use crate::loader::LoadError;

/// A failure while assembling the module list of a program.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("Unknown native class '{name}'")]
    UnknownNative { name: String, span: Span },
    #[error("{source}")]
    Load {
        #[source]
        source: LoadError,
        span: Span,
    },
    #[error("'{name}' is not declared in {url}")]
    MissingExport { name: String, url: String, span: Span },
}

impl LinkError {
    pub fn span(&self) -> Span {
        match self {
            LinkError::Syntax(SyntaxError::Lex(e)) => e.span,
            LinkError::Syntax(SyntaxError::Parse(e)) => e.span,
            LinkError::UnknownNative { span, .. }
            | LinkError::Load { span, .. }
            | LinkError::MissingExport { span, .. } => *span,
        }
    }
}
