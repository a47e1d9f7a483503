//! Scope manager and IR builder for B#.
//!
//! [`build`] turns the parser's syntax tree into a [`bs_ir::Program`],
//! resolving names through a [`ScopeStack`] and type-checking every
//! construct with [`bs_types::Type::equal`]. The first user error aborts
//! the build.

mod builder;
mod error;
mod extensions;
pub mod scope;

pub use builder::build;
pub use error::{BuildError, BuildErrorKind};
pub use extensions::{match_types, Extension, Extensions};
pub use scope::ScopeStack;
