//! Diagnostics for the B# compiler.
//!
//! Every user-facing error of every phase converts into a [`Diagnostic`]:
//! an [`ErrorCode`] for searchability, a message, a primary span and
//! optional notes. [`emitter::TerminalEmitter`] renders them, resolving
//! spans to line and column through [`span_utils::LineOffsetTable`].

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod span_utils;

pub use diagnostic::{type_mismatch, Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
