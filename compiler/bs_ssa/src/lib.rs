//! Basic-block SSA backend for the B# compiler.
//!
//! [`lower_program`] turns a built [`bs_ir::Program`] into an
//! [`SsaProgram`]: one [`SsaFunction`] per user function plus `main` for
//! the top-level statements. Block parameters stand in for phi nodes.
//!
//! No optimization happens here.

pub mod ir;
pub mod lower;

pub use ir::{BlockId, Operands, SsaBlock, SsaFunction, SsaInstr, SsaProgram, SsaTerminator, ValueId};
pub use lower::{lower_program, SsaBuilder};
