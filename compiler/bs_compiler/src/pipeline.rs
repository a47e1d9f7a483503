//! Core compilation pipeline: build → { SSA lowering | C generation }.
//!
//! Portable: the syntax tree comes in already parsed, results come out as
//! a [`CompileOutput`]. Compilation stops at the first error.

use bs_build::Extensions;
use bs_codegen::CodegenConfig;
use bs_ir::{CodeConfig, SyntaxNode};
use tracing::debug;

use crate::output::{CompileOutput, ErrorPhase};

/// Which backend consumes the built program.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    C,
    Ssa,
}

/// Configuration for a compilation run.
#[derive(Clone, Debug)]
pub struct CompileConfig {
    /// Logical file path (used in diagnostics, not for IO).
    pub file_path: String,
    pub backend: Backend,
    pub codegen: CodegenConfig,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            file_path: "input.bsp".to_string(),
            backend: Backend::default(),
            codegen: CodegenConfig::default(),
        }
    }
}

/// Build `tree` and run it through the configured backend.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(file = %config.file_path, backend = ?config.backend)
)]
pub fn compile(tree: &[SyntaxNode], extensions: &Extensions, config: &CompileConfig) -> CompileOutput {
    let program = match bs_build::build(tree, extensions) {
        Ok(program) => program,
        Err(err) => {
            debug!(%err, "build failed");
            return CompileOutput::failed(err.to_diagnostic(), ErrorPhase::Build);
        }
    };

    match config.backend {
        Backend::Ssa => CompileOutput {
            success: true,
            c_source: None,
            ssa: Some(bs_ssa::lower_program(&program)),
            diagnostics: Vec::new(),
            error_phase: None,
        },
        Backend::C => match bs_codegen::generate_c(&program, config.codegen.clone()) {
            Ok(c_source) => CompileOutput {
                success: true,
                c_source: Some(c_source),
                ssa: None,
                diagnostics: Vec::new(),
                error_phase: None,
            },
            Err(err) => {
                debug!(%err, "code generation failed");
                CompileOutput::failed(err.to_diagnostic(), ErrorPhase::Codegen)
            }
        },
    }
}

/// Build `tree` and render the IR in its bracketed text form.
pub fn ir_code(
    tree: &[SyntaxNode],
    extensions: &Extensions,
    config: &CodeConfig,
) -> Result<String, bs_diagnostic::Diagnostic> {
    bs_build::build(tree, extensions)
        .map(|program| program.code(config))
        .map_err(|err| err.to_diagnostic())
}
