//! Analyses run while generating C.

pub mod ownership;

pub use ownership::{is_dynamic, OwnershipStack, PendingFree};
