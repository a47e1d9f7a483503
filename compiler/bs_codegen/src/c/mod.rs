//! C code generation.
//!
//! The generated translation unit is laid out as:
//!
//! ```text
//! runtime prologue      (includes, array runtime, string pool)
//! extern prototypes     (extensions called by the program)
//! function prototypes   (so calls may precede definitions)
//! synthesized helpers   (arrfree_* / arrcopy_*, inner shapes first)
//! function bodies
//! int main(void)        (the top-level statements)
//! ```

mod array;
mod expr;
mod function;
mod runtime;
mod stmt;
pub mod types;

use bs_ir::Program;
use tracing::{debug, instrument};

pub use runtime::CRuntime;
pub use types::CTypeMapper;

use crate::context::{CodegenConfig, CodegenContext};
use crate::CodegenError;

/// Generates one C translation unit for a built program.
pub struct CCodegen<'a> {
    ctx: CodegenContext<'a>,
}

impl<'a> CCodegen<'a> {
    pub fn new(program: &'a Program, config: CodegenConfig) -> Self {
        CCodegen {
            ctx: CodegenContext::new(program, config),
        }
    }

    /// Generate the complete C source. Stops at the first error.
    #[instrument(
        level = "debug",
        skip_all,
        fields(functions = self.ctx.program.functions.len())
    )]
    pub fn generate(mut self) -> Result<String, CodegenError> {
        let program = self.ctx.program;

        let mut prototypes = String::new();
        for func in &program.functions {
            prototypes.push_str(&function::prototype(&self.ctx, func)?);
            prototypes.push_str(";\n");
        }

        let mut bodies = String::new();
        for func in &program.functions {
            function::emit_function(&mut self.ctx, func)?;
            bodies.push_str(&self.ctx.take_output());
            bodies.push('\n');
        }

        function::emit_main(&mut self.ctx, &program.body)?;
        let main = self.ctx.take_output();

        CRuntime::emit(&mut self.ctx);
        let runtime = self.ctx.take_output();
        let externs = self.ctx.take_externs();
        let helpers = self.ctx.take_helpers();

        let mut out = runtime;
        for section in [&externs, &prototypes] {
            if !section.is_empty() {
                out.push_str(section);
                out.push('\n');
            }
        }
        out.push_str(&helpers);
        out.push_str(&bodies);
        out.push_str(&main);

        debug!(bytes = out.len(), "generated C");
        Ok(out)
    }
}

/// Generate C for `program` with the given formatting.
pub fn generate_c(program: &Program, config: CodegenConfig) -> Result<String, CodegenError> {
    CCodegen::new(program, config).generate()
}

#[cfg(test)]
mod tests;
