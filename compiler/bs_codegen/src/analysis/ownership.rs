//! Ownership tracking for dynamically sized values.
//!
//! The stack mirrors the C blocks being emitted. Every dynamic value
//! created while a scope is open has exactly one pending release in that
//! scope until it is *grabbed*, that is, moved into a container, a
//! variable, a callee or a return value. Popping a scope hands back its
//! pending releases, which the generator emits before control leaves the
//! block.
//!
//! # Rules
//!
//! 1. **Scalars** (`INT`, `FLOAT`, `BOOL`, `STRING`) never need a release.
//!    Strings live in the runtime's string pool.
//! 2. **Arrays and maps** are dynamic.
//! 3. **Grab** cancels a pending release; ownership moved elsewhere.
//! 4. **Return** releases everything pending in the function's scopes.

use bs_types::Type;
use tracing::trace;

/// Whether values of `ty` own heap memory that must be released.
pub fn is_dynamic(ty: &Type) -> bool {
    ty.is_container()
}

/// A release owed by the current code position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingFree {
    /// C expression holding the value, normally a variable or temporary.
    pub name: String,
    pub ty: Type,
    /// C statement releasing the value.
    pub code: String,
}

#[derive(Debug)]
struct OwnershipScope {
    /// Opened for a function body; `RETURN` releases down to here.
    function: bool,
    frees: Vec<PendingFree>,
}

/// Scope-aligned stack of pending releases.
#[derive(Debug, Default)]
pub struct OwnershipStack {
    scopes: Vec<OwnershipScope>,
}

impl OwnershipStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a block scope.
    pub fn push(&mut self) {
        self.scopes.push(OwnershipScope {
            function: false,
            frees: Vec::new(),
        });
    }

    /// Open the outermost scope of a function body.
    pub fn push_function(&mut self) {
        self.scopes.push(OwnershipScope {
            function: true,
            frees: Vec::new(),
        });
    }

    /// Close the innermost scope, returning its releases newest first.
    ///
    /// # Panics
    ///
    /// Panics if no scope is open.
    pub fn pop(&mut self) -> Vec<PendingFree> {
        let Some(scope) = self.scopes.pop() else {
            panic!("internal compiler error: popped an empty ownership stack");
        };
        let mut frees = scope.frees;
        frees.reverse();
        frees
    }

    /// Register a release in the innermost scope.
    pub fn add(&mut self, free: PendingFree) {
        trace!(name = %free.name, ty = %free.ty, "pending release");
        match self.scopes.last_mut() {
            Some(scope) => scope.frees.push(free),
            None => panic!("internal compiler error: release registered outside any scope"),
        }
    }

    /// Cancel the pending release of `name`, searching innermost first.
    /// Returns `false` when nothing was pending for it.
    pub fn grab(&mut self, name: &str) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(pos) = scope.frees.iter().rposition(|free| free.name == name) {
                scope.frees.remove(pos);
                trace!(name, "grabbed");
                return true;
            }
        }
        false
    }

    /// Every release pending in the current function, innermost scope
    /// first, newest first within a scope.
    pub fn function_frees(&self) -> Vec<&PendingFree> {
        let mut frees = Vec::new();
        for scope in self.scopes.iter().rev() {
            frees.extend(scope.frees.iter().rev());
            if scope.function {
                break;
            }
        }
        frees
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Number of releases pending in the innermost scope.
    pub fn pending(&self) -> usize {
        self.scopes.last().map_or(0, |scope| scope.frees.len())
    }
}
