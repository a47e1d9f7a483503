//! Variables, function ids and scope snapshots.

use std::fmt;

use bs_types::Type;

use crate::Span;

/// Dense, process-unique variable id, assigned in declaration order.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct VarId(u32);

impl VarId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a user function in [`Program::functions`](crate::Program).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct FuncId(u32);

impl FuncId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FuncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What opened a lexical frame.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ScopeKind {
    Global,
    Function,
    If,
    While,
    Switch,
    Case,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Global => write!(f, "global"),
            ScopeKind::Function => write!(f, "function"),
            ScopeKind::If => write!(f, "if"),
            ScopeKind::While => write!(f, "while"),
            ScopeKind::Switch => write!(f, "switch"),
            ScopeKind::Case => write!(f, "case"),
        }
    }
}

/// A declared variable. Never mutated after creation and never removed,
/// so it stays valid after the frame that declared it closes.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    pub id: VarId,
    pub name: String,
    pub ty: Type,
    pub span: Span,
    /// Kind of the frame the variable was declared in.
    pub scope: ScopeKind,
}

/// Snapshot of a closed frame: its kind and the variables declared
/// directly in it, ordered by id.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ScopeInfo {
    pub kind: ScopeKind,
    pub variables: Vec<VarId>,
}

impl ScopeInfo {
    pub fn new(kind: ScopeKind, mut variables: Vec<VarId>) -> Self {
        variables.sort_unstable();
        variables.dedup();
        ScopeInfo { kind, variables }
    }

    pub fn empty(kind: ScopeKind) -> Self {
        ScopeInfo {
            kind,
            variables: Vec::new(),
        }
    }
}
