//! Portable B# compiler driver.
//!
//! Ties the stages together without touching the filesystem: an already
//! parsed syntax tree comes in, generated C or an SSA program comes out,
//! together with any diagnostics.
//!
//! ```text
//! bs_types, bs_ir, bs_build, bs_ssa, bs_codegen
//!                    ↓
//!              bs_compiler  ← this crate
//! ```

mod output;
mod pipeline;

use std::sync::Once;

pub use output::{CompileOutput, ErrorPhase};
pub use pipeline::{compile, ir_code, Backend, CompileConfig};

pub use bs_build::{Extension, Extensions};
pub use bs_diagnostic::emitter::ColorMode;

use bs_diagnostic::emitter::{SourceFile, TerminalEmitter};
use bs_diagnostic::Diagnostic;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set,
/// e.g. `RUST_LOG=bs_codegen=debug` or `RUST_LOG=bs_ssa=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Render diagnostics to a string, locating spans in `source`.
pub fn render_diagnostics(
    source: &str,
    file_path: &str,
    diagnostics: &[Diagnostic],
    color: ColorMode,
) -> String {
    let mut emitter = TerminalEmitter::new(Vec::new(), color, false)
        .with_source(SourceFile::new(file_path, source));
    if let Err(err) = emitter.emit_all(diagnostics) {
        tracing::warn!(%err, "failed to render diagnostics");
    }
    String::from_utf8_lossy(&emitter.into_inner()).into_owned()
}
