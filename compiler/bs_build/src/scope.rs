//! Lexical scope management for the builder.
//!
//! [`ScopeStack`] is a stack of frames mapping names to [`VarId`]s, plus the
//! dense table of every variable ever declared. Lookup walks frames from the
//! innermost outward, so an inner declaration shadows an outer one until its
//! frame is popped. Variables outlive their frames: the table only grows.

use bs_ir::{ScopeInfo, ScopeKind, Span, VarId, Variable};
use bs_types::Type;
use rustc_hash::FxHashMap;

struct Frame {
    kind: ScopeKind,
    names: FxHashMap<String, VarId>,
    /// Every variable declared in this frame, including ones whose name was
    /// later redeclared in the same frame.
    declared: Vec<VarId>,
}

impl Frame {
    fn new(kind: ScopeKind) -> Self {
        Frame {
            kind,
            names: FxHashMap::default(),
            declared: Vec::new(),
        }
    }

    fn info(&self) -> ScopeInfo {
        ScopeInfo::new(self.kind, self.declared.clone())
    }
}

/// Frames set aside by [`ScopeStack::isolate`].
#[must_use = "isolated frames must be handed back to `ScopeStack::restore`"]
pub struct SavedFrames(Vec<Frame>);

#[derive(Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
    variables: Vec<Variable>,
}

impl ScopeStack {
    /// An empty stack; callers push the outermost frame themselves.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ScopeKind) {
        tracing::trace!(%kind, depth = self.frames.len() + 1, "push scope");
        self.frames.push(Frame::new(kind));
    }

    /// Pop the innermost frame and return its snapshot.
    ///
    /// # Panics
    /// Panics when no frame is open; pushes and pops are always paired by
    /// the builder.
    pub fn pop(&mut self) -> ScopeInfo {
        match self.frames.pop() {
            Some(frame) => frame.info(),
            None => panic!("internal compiler error: popped an empty scope stack"),
        }
    }

    /// Declare a variable in the innermost frame.
    ///
    /// Always allocates a fresh id. Redeclaring a name in the same frame
    /// rebinds the name for that frame only.
    ///
    /// # Panics
    /// Panics when no frame is open.
    pub fn declare(&mut self, name: &str, ty: Type, span: Span) -> VarId {
        let raw = u32::try_from(self.variables.len())
            .unwrap_or_else(|_| panic!("internal compiler error: too many variables"));
        let id = VarId::new(raw);
        let Some(frame) = self.frames.last_mut() else {
            panic!("internal compiler error: declared `{name}` with no open scope")
        };
        frame.names.insert(name.to_string(), id);
        frame.declared.push(id);
        tracing::trace!(name, %ty, id = raw, scope = %frame.kind, "declare variable");
        self.variables.push(Variable {
            id,
            name: name.to_string(),
            ty,
            span,
            scope: frame.kind,
        });
        id
    }

    /// Resolve a name, innermost frame first.
    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.names.get(name))
            .map(|id| self.variable(*id))
    }

    /// Resolve a name in the innermost frame only.
    pub fn lookup_in_current_frame(&self, name: &str) -> Option<&Variable> {
        self.frames
            .last()
            .and_then(|frame| frame.names.get(name))
            .map(|id| self.variable(*id))
    }

    pub fn current_kind(&self) -> Option<ScopeKind> {
        self.frames.last().map(|frame| frame.kind)
    }

    /// Whether any open frame, the innermost included, has `kind`.
    pub fn has_ancestor_of_kind(&self, kind: ScopeKind) -> bool {
        self.frames.iter().any(|frame| frame.kind == kind)
    }

    pub fn snapshot_current_frame(&self) -> Option<ScopeInfo> {
        self.frames.last().map(Frame::info)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// # Panics
    /// Panics if `id` was not issued by this stack.
    pub fn variable(&self, id: VarId) -> &Variable {
        match self.variables.get(id.index()) {
            Some(var) => var,
            None => panic!("internal compiler error: unknown variable id {id}"),
        }
    }

    /// Set the open frames aside and start a fresh stack with one `kind`
    /// frame. Used for function bodies, which cannot see the locals of the
    /// code around them. Variable ids keep counting across the switch.
    pub fn isolate(&mut self, kind: ScopeKind) -> SavedFrames {
        let saved = std::mem::take(&mut self.frames);
        self.push(kind);
        SavedFrames(saved)
    }

    /// Discard the isolated stack and reinstate `saved`.
    pub fn restore(&mut self, saved: SavedFrames) {
        self.frames = saved.0;
    }

    pub fn into_variables(self) -> Vec<Variable> {
        self.variables
    }
}
