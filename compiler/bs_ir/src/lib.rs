//! Intermediate representation for the B# compiler.
//!
//! - [`SyntaxNode`]: the bracketed syntax tree produced by the parser.
//! - [`Node`] / [`Block`]: the typed, scope-checked IR produced by the
//!   builder and consumed by the SSA and C backends.
//! - [`Variable`] / [`ScopeInfo`]: the variable table and frame snapshots.
//!
//! IR trees are immutable once built. Every block exclusively owns its
//! statement lists.

mod code;
mod node;
mod program;
mod span;
mod syntax;
mod var;

pub use code::CodeConfig;
pub use node::{
    Block, Body, CaseBlock, CompareOp, ConstValue, DefaultBlock, LogicalOp, MathOp, Node,
    NodeKind, SwitchBlock,
};
pub use program::{Function, Program};
pub use span::Span;
pub use syntax::{SyntaxKind, SyntaxNode};
pub use var::{FuncId, ScopeInfo, ScopeKind, VarId, Variable};

#[cfg(test)]
mod tests;
