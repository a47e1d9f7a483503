//! Statement and block code generation.

use bs_ir::{Block, Body, Node, NodeKind, SwitchBlock};
use bs_types::Type;
use tracing::trace;

use super::array::{emit_append, free_code};
use super::expr::{emit_call, emit_expr, emit_moved};
use super::types::CTypeMapper;
use crate::analysis::{is_dynamic, PendingFree};
use crate::context::CodegenContext;
use crate::CodegenError;

/// Write the release statements of `frees`, in order.
pub(crate) fn emit_frees(ctx: &mut CodegenContext<'_>, frees: &[PendingFree]) {
    for free in frees {
        ctx.writeln(&free.code);
    }
}

/// Emit `stmts` in order, stopping after a `RETURN`. Returns whether the
/// list ended in one.
pub(crate) fn emit_stmts(ctx: &mut CodegenContext<'_>, stmts: &[Node]) -> Result<bool, CodegenError> {
    for stmt in stmts {
        emit_stmt(ctx, stmt)?;
        if matches!(stmt.kind, NodeKind::Return(_)) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// A nested statement list in its own ownership scope. The caller writes
/// the surrounding braces.
fn emit_body(ctx: &mut CodegenContext<'_>, body: &Body) -> Result<(), CodegenError> {
    ctx.ownership.push();
    let returned = emit_stmts(ctx, &body.stmts)?;
    let frees = ctx.ownership.pop();
    if !returned {
        emit_frees(ctx, &frees);
    }
    Ok(())
}

pub(crate) fn emit_stmt(ctx: &mut CodegenContext<'_>, node: &Node) -> Result<(), CodegenError> {
    trace!(span = %node.span, "emitting statement");
    match &node.kind {
        NodeKind::Define {
            var,
            value,
            declares,
        } => {
            let ty = ctx.program.variable(*var).ty.clone();
            let c_type = CTypeMapper::map_type(&ty, node.span)?;
            let value = emit_moved(ctx, value)?;
            let name = ctx.var_name(*var);
            if *declares {
                ctx.writeln(&format!("{c_type} {name} = {value};"));
                if is_dynamic(&ty) {
                    let code = free_code(ctx, &name, &ty, node.span)?;
                    ctx.ownership.add(PendingFree { name, ty, code });
                }
            } else {
                if is_dynamic(&ty) {
                    let release = free_code(ctx, &name, &ty, node.span)?;
                    ctx.writeln(&release);
                }
                ctx.writeln(&format!("{name} = {value};"));
            }
            Ok(())
        }
        NodeKind::Print(value) => emit_print(ctx, value),
        NodeKind::Append { array, value } => emit_append(ctx, array, value),
        NodeKind::Return(value) => emit_return(ctx, value.as_deref()),
        NodeKind::Block(block) => emit_block(ctx, block),
        NodeKind::Call { .. } | NodeKind::ExtensionCall { .. } if node.ty == Type::Null => {
            let call = emit_call(ctx, node)?;
            ctx.writeln(&format!("{call};"));
            Ok(())
        }
        _ => {
            // A value nobody reads. Dynamic ones are released with the scope.
            let value = emit_expr(ctx, node)?;
            if !is_dynamic(&node.ty) {
                ctx.writeln(&format!("(void)({value});"));
            }
            Ok(())
        }
    }
}

fn emit_print(ctx: &mut CodegenContext<'_>, value: &Node) -> Result<(), CodegenError> {
    let ty = value.ty.clone();
    let c_value = emit_expr(ctx, value)?;
    let line = match ty {
        Type::Int => format!("printf(\"%lld\\n\", {c_value});"),
        Type::Float => format!("printf(\"%f\\n\", {c_value});"),
        Type::String | Type::Ident => format!("printf(\"%s\\n\", {c_value});"),
        Type::Bool => format!("printf(\"%s\\n\", ({c_value}) ? \"true\" : \"false\");"),
        _ => return Err(CodegenError::unsupported_type(&ty, value.span)),
    };
    ctx.writeln(&line);
    Ok(())
}

/// `RETURN`: compute the result, release everything the function still
/// owns, return.
fn emit_return(ctx: &mut CodegenContext<'_>, value: Option<&Node>) -> Result<(), CodegenError> {
    let result = match value {
        Some(value) => {
            let c_type = CTypeMapper::map_type(&value.ty, value.span)?;
            let moved = emit_moved(ctx, value)?;
            let name = ctx.fresh_temp("ret");
            ctx.writeln(&format!("{c_type} {name} = {moved};"));
            Some(name)
        }
        None => None,
    };
    let releases: Vec<String> = ctx
        .ownership
        .function_frees()
        .into_iter()
        .map(|free| free.code.clone())
        .collect();
    for release in &releases {
        ctx.writeln(release);
    }
    match result {
        Some(name) => ctx.writeln(&format!("return {name};")),
        None => ctx.writeln("return;"),
    }
    Ok(())
}

fn emit_block(ctx: &mut CodegenContext<'_>, block: &Block) -> Result<(), CodegenError> {
    match block {
        Block::If {
            cond,
            body,
            else_body,
        } => {
            let cond = emit_expr(ctx, cond)?;
            ctx.writeln(&format!("if ({cond}) {{"));
            ctx.indent();
            emit_body(ctx, body)?;
            ctx.dedent();
            if let Some(else_body) = else_body {
                ctx.writeln("} else {");
                ctx.indent();
                emit_body(ctx, else_body)?;
                ctx.dedent();
            }
            ctx.writeln("}");
            Ok(())
        }
        Block::While { cond, body } => emit_while(ctx, cond, body),
        Block::Switch(switch) => emit_switch(ctx, switch),
        Block::Case(case) => panic!(
            "internal compiler error: CASE outside a switch at {}",
            case.span
        ),
        Block::Default(default) => panic!(
            "internal compiler error: DEFAULT outside a switch at {}",
            default.span
        ),
    }
}

/// The condition is evaluated in its own scope on every iteration, so
/// whatever it allocates is released before the test.
fn emit_while(ctx: &mut CodegenContext<'_>, cond: &Node, body: &Body) -> Result<(), CodegenError> {
    if cond.ty != Type::Bool {
        return Err(CodegenError::while_condition(&cond.ty, cond.span));
    }
    ctx.writeln("while (1) {");
    ctx.indent();
    ctx.ownership.push();
    let value = emit_expr(ctx, cond)?;
    let flag = ctx.fresh_temp("cond");
    ctx.writeln(&format!("bool {flag} = {value};"));
    let frees = ctx.ownership.pop();
    emit_frees(ctx, &frees);
    ctx.writeln(&format!("if (!{flag}) {{"));
    ctx.indent();
    ctx.writeln("break;");
    ctx.dedent();
    ctx.writeln("}");
    emit_body(ctx, body)?;
    ctx.dedent();
    ctx.writeln("}");
    Ok(())
}

/// An `if` / `else if` chain over the cases in order; the default is the
/// final `else`.
fn emit_switch(ctx: &mut CodegenContext<'_>, switch: &SwitchBlock) -> Result<(), CodegenError> {
    let ty = switch.value.ty.clone();
    let c_type = CTypeMapper::map_type(&ty, switch.value.span)?;
    let value = emit_expr(ctx, &switch.value)?;
    let subject = ctx.fresh_temp("switch");
    ctx.writeln(&format!("{c_type} {subject} = {value};"));

    let strings = matches!(ty, Type::String | Type::Ident);
    for (i, case) in switch.cases.iter().enumerate() {
        let label = emit_expr(ctx, &case.value)?;
        let test = if strings {
            format!("strcmp({subject}, {label}) == 0")
        } else {
            format!("{subject} == {label}")
        };
        if i == 0 {
            ctx.writeln(&format!("if ({test}) {{"));
        } else {
            ctx.writeln(&format!("}} else if ({test}) {{"));
        }
        ctx.indent();
        emit_body(ctx, &case.body)?;
        ctx.dedent();
    }

    match (&switch.default, switch.cases.is_empty()) {
        (Some(default), true) => {
            ctx.writeln("{");
            ctx.indent();
            emit_body(ctx, &default.body)?;
            ctx.dedent();
            ctx.writeln("}");
        }
        (Some(default), false) => {
            ctx.writeln("} else {");
            ctx.indent();
            emit_body(ctx, &default.body)?;
            ctx.dedent();
            ctx.writeln("}");
        }
        (None, false) => ctx.writeln("}"),
        (None, true) => ctx.writeln(&format!("(void)({subject});")),
    }
    Ok(())
}
