//! Embedder-supplied functions.
//!
//! An [`Extension`] is a named function the host provides (implemented by
//! the runtime, not in B#). The table is built once and passed to the
//! builder by shared reference.

use bs_ir::{Node, Span};
use bs_types::Type;
use rustc_hash::FxHashMap;

use crate::{BuildError, BuildErrorKind};

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Extension {
    pub name: String,
    /// Parameter types. A trailing [`Type::Variadic`] lets the parameter
    /// before it repeat any number of extra times.
    pub params: Vec<Type>,
    pub ret: Type,
}

impl Extension {
    pub fn new(name: impl Into<String>, params: Vec<Type>, ret: Type) -> Self {
        Extension {
            name: name.into(),
            params,
            ret,
        }
    }
}

#[derive(Clone, Default, Debug)]
pub struct Extensions {
    by_name: FxHashMap<String, Extension>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an extension, replacing any previous one with the same name.
    #[must_use]
    pub fn with(mut self, extension: Extension) -> Self {
        self.insert(extension);
        self
    }

    pub fn insert(&mut self, extension: Extension) {
        self.by_name.insert(extension.name.clone(), extension);
    }

    pub fn get(&self, name: &str) -> Option<&Extension> {
        self.by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// The parameter type expected at argument position `i`, honouring a
/// trailing `VARIADIC`.
pub(crate) fn param_type_at(params: &[Type], i: usize) -> Option<&Type> {
    match params.split_last() {
        Some((Type::Variadic, fixed)) if i + 1 >= fixed.len() => fixed.last(),
        Some((Type::Variadic, fixed)) => fixed.get(i),
        _ => params.get(i),
    }
}

/// Check already-built arguments against a parameter list.
pub fn match_types(
    construct: &str,
    args: &[Node],
    params: &[Type],
    span: Span,
) -> Result<(), BuildError> {
    let (min, max) = match params.split_last() {
        Some((Type::Variadic, fixed)) => (fixed.len(), None),
        _ => (params.len(), Some(params.len())),
    };
    if args.len() < min || max.is_some_and(|max| args.len() > max) {
        return Err(BuildError::new(
            BuildErrorKind::ArgCount {
                construct: construct.to_string(),
                min,
                max,
                found: args.len(),
            },
            span,
        ));
    }

    for (i, arg) in args.iter().enumerate() {
        if arg.ty == Type::Null {
            return Err(BuildError::new(
                BuildErrorKind::ExpectedValue {
                    construct: construct.to_string(),
                },
                arg.span,
            ));
        }
        let Some(expected) = param_type_at(params, i) else {
            continue;
        };
        if !expected.equal(&arg.ty) {
            return Err(BuildError::new(
                BuildErrorKind::TypeMismatch {
                    context: format!("argument {} of {construct}", i + 1),
                    expected: expected.clone(),
                    found: arg.ty.clone(),
                },
                arg.span,
            ));
        }
    }
    Ok(())
}
