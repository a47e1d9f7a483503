//! Builder errors.

use std::fmt;

use bs_diagnostic::{type_mismatch, Diagnostic, ErrorCode};
use bs_ir::Span;
use bs_types::Type;

/// A user error found while building the IR. Building stops at the first
/// one.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct BuildError {
    pub kind: BuildErrorKind,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum BuildErrorKind {
    /// Too few or too many arguments. `max == None` means "at least `min`".
    ArgCount {
        construct: String,
        min: usize,
        max: Option<usize>,
        found: usize,
    },
    UnknownFunction {
        name: String,
    },
    ExpectedIdent {
        construct: String,
    },
    InvalidType {
        text: String,
    },
    DuplicateElse,
    DuplicateDefault,
    ExpectedCase,
    UnexpectedIdent {
        name: String,
    },
    InvalidOperator {
        construct: String,
        op: String,
    },
    DuplicateFunction {
        name: String,
    },
    ReservedFunctionName {
        name: String,
    },
    TypeMismatch {
        context: String,
        expected: Type,
        found: Type,
    },
    CaseTypeMismatch {
        expected: Type,
    },
    ExpectedBoolCondition {
        construct: String,
    },
    NotHashable {
        construct: String,
    },
    NonConstantCase,
    ExpectedValue {
        construct: String,
    },
    InvalidCast {
        from: Type,
        to: Type,
    },
    UnknownVariable {
        name: String,
    },
    OutsideSwitch {
        construct: String,
    },
    ReturnOutsideFunction,
    FunctionNotTopLevel,
    /// A function with a non-NULL return type whose body can run off its
    /// end.
    MissingReturn {
        name: String,
        ret: Type,
    },
}

impl BuildError {
    pub fn new(kind: BuildErrorKind, span: Span) -> Self {
        BuildError { kind, span }
    }

    pub fn code(&self) -> ErrorCode {
        match &self.kind {
            BuildErrorKind::ArgCount { .. } => ErrorCode::E1001,
            BuildErrorKind::UnknownFunction { .. } => ErrorCode::E1002,
            BuildErrorKind::ExpectedIdent { .. } => ErrorCode::E1003,
            BuildErrorKind::InvalidType { .. } => ErrorCode::E1004,
            BuildErrorKind::DuplicateElse => ErrorCode::E1005,
            BuildErrorKind::DuplicateDefault => ErrorCode::E1006,
            BuildErrorKind::ExpectedCase => ErrorCode::E1007,
            BuildErrorKind::UnexpectedIdent { .. } => ErrorCode::E1008,
            BuildErrorKind::InvalidOperator { .. } => ErrorCode::E1009,
            BuildErrorKind::DuplicateFunction { .. }
            | BuildErrorKind::ReservedFunctionName { .. } => ErrorCode::E1010,
            BuildErrorKind::TypeMismatch { .. } | BuildErrorKind::CaseTypeMismatch { .. } => {
                ErrorCode::E2001
            }
            BuildErrorKind::ExpectedBoolCondition { .. } => ErrorCode::E2002,
            BuildErrorKind::NotHashable { .. } => ErrorCode::E2003,
            BuildErrorKind::NonConstantCase => ErrorCode::E2004,
            BuildErrorKind::ExpectedValue { .. } => ErrorCode::E2005,
            BuildErrorKind::InvalidCast { .. } => ErrorCode::E2006,
            BuildErrorKind::UnknownVariable { .. } => ErrorCode::E3001,
            BuildErrorKind::OutsideSwitch { .. } => ErrorCode::E3002,
            BuildErrorKind::ReturnOutsideFunction => ErrorCode::E3003,
            BuildErrorKind::FunctionNotTopLevel => ErrorCode::E3004,
            BuildErrorKind::MissingReturn { .. } => ErrorCode::E3005,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match &self.kind {
            BuildErrorKind::TypeMismatch {
                context,
                expected,
                found,
            } => type_mismatch(
                self.span,
                &expected.to_string(),
                &found.to_string(),
                context,
            ),
            BuildErrorKind::OutsideSwitch { construct } => Diagnostic::error(self.code())
                .with_message(self.to_string())
                .with_label(self.span, format!("{construct} outside of a SWITCH"))
                .with_note("CASE and DEFAULT blocks must appear directly in a SWITCH body"),
            BuildErrorKind::UnknownVariable { name } => Diagnostic::error(self.code())
                .with_message(self.to_string())
                .with_label(self.span, "not found in this scope")
                .with_note(format!("declare it first with [DEFINE {name} ...]")),
            BuildErrorKind::MissingReturn { .. } => Diagnostic::error(self.code())
                .with_message(self.to_string())
                .with_label(self.span, "not every path returns a value")
                .with_note("end the body with RETURN, or with an IF and ELSE that both return"),
            _ => Diagnostic::error(self.code())
                .with_message(self.to_string())
                .with_label(self.span, "here"),
        }
    }
}

fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            BuildErrorKind::ArgCount {
                construct,
                min,
                max,
                found,
            } => match max {
                Some(max) if max == min => write!(
                    f,
                    "{construct} requires exactly {min} argument{}, got {found}",
                    plural_s(*min)
                ),
                Some(max) => write!(
                    f,
                    "{construct} requires between {min} and {max} arguments, got {found}"
                ),
                None => write!(
                    f,
                    "{construct} requires at least {min} argument{}",
                    plural_s(*min)
                ),
            },
            BuildErrorKind::UnknownFunction { name } => write!(f, "unknown function `{name}`"),
            BuildErrorKind::ExpectedIdent { construct } => {
                write!(f, "expected identifier in {construct}")
            }
            BuildErrorKind::InvalidType { text } => write!(f, "unknown type `{text}`"),
            BuildErrorKind::DuplicateElse => {
                write!(f, "ELSE can only be used once in IF statement")
            }
            BuildErrorKind::DuplicateDefault => write!(f, "only one default case allowed"),
            BuildErrorKind::ExpectedCase => write!(f, "expected case"),
            BuildErrorKind::UnexpectedIdent { name } => {
                write!(f, "unexpected identifier `{name}`")
            }
            BuildErrorKind::InvalidOperator { construct, op } => {
                write!(f, "invalid operator `{op}` in {construct}")
            }
            BuildErrorKind::DuplicateFunction { name } => {
                write!(f, "function `{name}` is already defined")
            }
            BuildErrorKind::ReservedFunctionName { name } => {
                write!(f, "`{name}` is a keyword and cannot name a function")
            }
            BuildErrorKind::TypeMismatch {
                context,
                expected,
                found,
            } => write!(f, "expected {expected} for {context}, got {found}"),
            BuildErrorKind::CaseTypeMismatch { expected } => {
                write!(f, "expected case with type {expected}")
            }
            BuildErrorKind::ExpectedBoolCondition { construct } => {
                write!(f, "expected boolean for condition in {construct} statement")
            }
            BuildErrorKind::NotHashable { construct } => {
                write!(f, "expected hashable type for {construct} value")
            }
            BuildErrorKind::NonConstantCase => write!(f, "expected constant for CASE value"),
            BuildErrorKind::ExpectedValue { construct } => {
                write!(f, "expected a value in {construct}, found a statement")
            }
            BuildErrorKind::InvalidCast { from, to } => write!(f, "cannot convert {from} to {to}"),
            BuildErrorKind::UnknownVariable { name } => write!(f, "unknown variable `{name}`"),
            BuildErrorKind::OutsideSwitch { construct } => {
                write!(f, "{construct} can only be used inside SWITCH")
            }
            BuildErrorKind::ReturnOutsideFunction => {
                write!(f, "RETURN can only be used inside FUNC")
            }
            BuildErrorKind::FunctionNotTopLevel => {
                write!(f, "FUNC can only be used at the top level")
            }
            BuildErrorKind::MissingReturn { name, ret } => {
                write!(f, "function `{name}` returns {ret} but can end without RETURN")
            }
        }
    }
}

impl std::error::Error for BuildError {}
