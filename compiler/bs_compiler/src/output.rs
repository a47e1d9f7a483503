//! Result types for the portable compiler pipeline.

use bs_diagnostic::Diagnostic;
use bs_ssa::SsaProgram;

/// Which compilation phase produced the error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorPhase {
    /// Scope and type checking while building the IR.
    Build,
    /// The C backend rejected the program.
    Codegen,
}

/// Result of compiling one program.
#[derive(Clone, Debug)]
pub struct CompileOutput {
    pub success: bool,
    /// Generated C, for the C backend.
    pub c_source: Option<String>,
    /// Lowered program, for the SSA backend.
    pub ssa: Option<SsaProgram>,
    pub diagnostics: Vec<Diagnostic>,
    pub error_phase: Option<ErrorPhase>,
}

impl CompileOutput {
    pub(crate) fn failed(diagnostic: Diagnostic, phase: ErrorPhase) -> Self {
        CompileOutput {
            success: false,
            c_source: None,
            ssa: None,
            diagnostics: vec![diagnostic],
            error_phase: Some(phase),
        }
    }
}
