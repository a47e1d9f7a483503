//! User functions and the entry routine.

use bs_ir::{Body, Function};
use tracing::debug;

use super::array::free_code;
use super::stmt::{emit_frees, emit_stmts};
use super::types::CTypeMapper;
use crate::analysis::{is_dynamic, PendingFree};
use crate::context::CodegenContext;
use crate::CodegenError;

/// `ret bsf_<id>_<name>(params)`, without the trailing `;` or body.
pub(crate) fn prototype(ctx: &CodegenContext<'_>, func: &Function) -> Result<String, CodegenError> {
    let ret = CTypeMapper::map_type(&func.ret, func.span)?;
    let mut params = Vec::with_capacity(func.params.len());
    for &param in &func.params {
        let var = ctx.program.variable(param);
        let c_type = CTypeMapper::map_type(&var.ty, var.span)?;
        params.push(format!("{c_type} {}", ctx.var_name(param)));
    }
    let params = if params.is_empty() {
        "void".to_string()
    } else {
        params.join(", ")
    };
    Ok(format!("{ret} {}({params})", ctx.func_name(func.id)))
}

/// A function definition. Dynamic parameters are owned by the callee and
/// released when it returns.
pub(crate) fn emit_function(ctx: &mut CodegenContext<'_>, func: &Function) -> Result<(), CodegenError> {
    debug!(name = %func.name, "emitting function");
    let header = prototype(ctx, func)?;
    ctx.writeln(&format!("{header} {{"));
    ctx.indent();
    ctx.ownership.push_function();
    for &param in &func.params {
        let var = ctx.program.variable(param);
        if is_dynamic(&var.ty) {
            let ty = var.ty.clone();
            let span = var.span;
            let name = ctx.var_name(param);
            let code = free_code(ctx, &name, &ty, span)?;
            ctx.ownership.add(PendingFree { name, ty, code });
        }
    }
    emit_closing_body(ctx, &func.body)?;
    ctx.dedent();
    ctx.writeln("}");
    Ok(())
}

/// `int main(void)` running the top-level statements.
pub(crate) fn emit_main(ctx: &mut CodegenContext<'_>, body: &Body) -> Result<(), CodegenError> {
    ctx.writeln("int main(void) {");
    ctx.indent();
    ctx.ownership.push_function();
    emit_closing_body(ctx, body)?;
    ctx.writeln("bs_strings_free();");
    ctx.writeln("return 0;");
    ctx.dedent();
    ctx.writeln("}");
    Ok(())
}

/// Statements of a function-level body followed by the releases of its
/// outermost scope, which `push_function` opened.
fn emit_closing_body(ctx: &mut CodegenContext<'_>, body: &Body) -> Result<(), CodegenError> {
    let returned = emit_stmts(ctx, &body.stmts)?;
    let frees = ctx.ownership.pop();
    if !returned {
        emit_frees(ctx, &frees);
    }
    debug_assert_eq!(ctx.ownership.depth(), 0, "unbalanced ownership scopes");
    Ok(())
}
