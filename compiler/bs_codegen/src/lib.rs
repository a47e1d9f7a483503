//! C code generation backend for B#.
//!
//! Turns a built [`Program`](bs_ir::Program) into one self-contained C
//! translation unit. Arrays are heap allocated; the generator tracks who
//! owns each one and emits its release exactly once.
//!
//! # Architecture
//!
//! ```text
//!   bs_ir::Program
//!        ↓
//!     CCodegen        (statements, expressions, functions)
//!        ↓  uses
//!   OwnershipStack    (pending releases per open C block)
//!        ↓
//!   C source or CodegenError
//! ```

pub mod analysis;
pub mod c;
mod context;
mod error;

pub use c::{generate_c, CCodegen};
pub use context::{mangle, CodegenConfig, CodegenContext};
pub use error::CodegenError;
