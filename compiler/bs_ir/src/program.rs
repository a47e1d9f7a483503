//! Built programs.

use bs_types::Type;

use crate::{Body, FuncId, Span, VarId, Variable};

/// A user function: `[FUNC name [PARAM p T]... [RETURNS T] body...]`.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Function {
    pub id: FuncId,
    pub name: String,
    pub params: Vec<VarId>,
    /// `NULL` when the function returns nothing.
    pub ret: Type,
    pub body: Body,
    pub span: Span,
}

/// Output of the builder: the variable table, user functions and the
/// top-level statements.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Program {
    /// Indexed by [`VarId::index`].
    pub variables: Vec<Variable>,
    /// Indexed by [`FuncId::index`].
    pub functions: Vec<Function>,
    pub body: Body,
}

impl Program {
    /// Look up a variable.
    ///
    /// # Panics
    /// Panics if `id` was not issued for this program.
    pub fn variable(&self, id: VarId) -> &Variable {
        match self.variables.get(id.index()) {
            Some(var) => var,
            None => panic!("internal compiler error: unknown variable id {id}"),
        }
    }

    /// Look up a function.
    ///
    /// # Panics
    /// Panics if `id` was not issued for this program.
    pub fn function(&self, id: FuncId) -> &Function {
        match self.functions.get(id.index()) {
            Some(func) => func,
            None => panic!("internal compiler error: unknown function id {id}"),
        }
    }
}
