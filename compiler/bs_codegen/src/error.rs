//! Errors raised while generating C.

use std::fmt;

use bs_diagnostic::{Diagnostic, ErrorCode};
use bs_ir::Span;
use bs_types::Type;

/// A program the builder accepted but the C backend cannot express.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodegenError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
}

impl CodegenError {
    /// A value of a type with no C representation (maps, `ANY`, ...).
    pub fn unsupported_type(ty: &Type, span: Span) -> Self {
        CodegenError {
            code: ErrorCode::E4001,
            message: format!("values of type {ty} cannot be compiled to C"),
            span,
        }
    }

    pub fn while_condition(found: &Type, span: Span) -> Self {
        CodegenError {
            code: ErrorCode::E4002,
            message: format!("WHILE condition must be BOOL, found {found}"),
            span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.code)
            .with_message(self.message.clone())
            .with_label(self.span, "here");
        match self.code {
            ErrorCode::E4001 => {
                diagnostic.with_note("the C backend supports INT, FLOAT, BOOL, STRING and arrays")
            }
            _ => diagnostic,
        }
    }
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CodegenError {}
