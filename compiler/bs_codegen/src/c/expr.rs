//! Expression code generation.
//!
//! [`emit_expr`] returns a C expression for a node. Setup the expression
//! needs (temporaries, allocations) is written to the context first, so
//! the returned text is only valid after those lines.

use bs_ir::{CompareOp, ConstValue, LogicalOp, MathOp, Node, NodeKind};
use bs_types::Type;

use super::array::{copy_code, emit_array, emit_index, emit_length};
use super::stmt::emit_frees;
use super::types::CTypeMapper;
use crate::analysis::{is_dynamic, PendingFree};
use crate::context::CodegenContext;
use crate::CodegenError;

/// Generate C for a value-producing node.
///
/// # Panics
///
/// Panics on statement nodes; the builder never puts them where a value
/// is expected.
pub(crate) fn emit_expr(ctx: &mut CodegenContext<'_>, node: &Node) -> Result<String, CodegenError> {
    match &node.kind {
        NodeKind::Const(value) => Ok(emit_const(value)),
        NodeKind::Ident(word) => Ok(emit_string_literal(word)),
        NodeKind::Var(id) => Ok(ctx.var_name(*id)),
        NodeKind::Math { op, lhs, rhs } => {
            let lhs = emit_expr(ctx, lhs)?;
            let rhs = emit_expr(ctx, rhs)?;
            Ok(emit_math(*op, &lhs, &rhs))
        }
        NodeKind::Compare { op, lhs, rhs } => {
            let strings = lhs.ty == Type::String;
            let lhs = emit_expr(ctx, lhs)?;
            let rhs = emit_expr(ctx, rhs)?;
            Ok(emit_compare(*op, &lhs, &rhs, strings))
        }
        NodeKind::Logical { op, lhs, rhs } => emit_logical(ctx, *op, lhs, rhs),
        NodeKind::Not(value) => {
            let value = emit_expr(ctx, value)?;
            Ok(format!("(!{value})"))
        }
        NodeKind::Cast(value) => {
            let from = value.ty.clone();
            let value = emit_expr(ctx, value)?;
            Ok(emit_cast(&value, &from, &node.ty))
        }
        NodeKind::Array { elem, values } => emit_array(ctx, node, elem, values),
        NodeKind::Index { array, index } => emit_index(ctx, node, array, index),
        NodeKind::Length(array) => emit_length(ctx, array),
        NodeKind::Call { .. } | NodeKind::ExtensionCall { .. } => {
            let call = emit_call(ctx, node)?;
            materialize_call(ctx, node, &call)
        }
        NodeKind::Define { .. }
        | NodeKind::Print(_)
        | NodeKind::Append { .. }
        | NodeKind::Return(_)
        | NodeKind::Block(_) => panic!(
            "internal compiler error: statement used as a value at {}",
            node.span
        ),
    }
}

/// Generate C for a value whose ownership moves to the consumer.
///
/// A dynamic value created here loses its pending release. A borrowed
/// one (a variable or an array element) is deep-copied first.
pub(crate) fn emit_moved(ctx: &mut CodegenContext<'_>, node: &Node) -> Result<String, CodegenError> {
    let value = emit_expr(ctx, node)?;
    if !is_dynamic(&node.ty) {
        return Ok(value);
    }
    match node.kind {
        NodeKind::Var(_) | NodeKind::Index { .. } => {
            let copy = copy_code(ctx, &value, &node.ty, node.span)?;
            let name = ctx.fresh_temp("copy");
            ctx.writeln(&format!("array* {name} = {copy};"));
            Ok(name)
        }
        _ => {
            let grabbed = ctx.ownership.grab(&value);
            debug_assert!(grabbed, "no pending release for moved value {value}");
            Ok(value)
        }
    }
}

/// `f(args)` for a user function or extension call, arguments moved.
pub(crate) fn emit_call(ctx: &mut CodegenContext<'_>, node: &Node) -> Result<String, CodegenError> {
    let (callee, args) = match &node.kind {
        NodeKind::Call { func, args } => (ctx.func_name(*func), args),
        NodeKind::ExtensionCall { name, args } => {
            ctx.declare_extern(name, node, args)?;
            (name.clone(), args)
        }
        _ => panic!("internal compiler error: expected a call at {}", node.span),
    };
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(emit_moved(ctx, arg)?);
    }
    Ok(format!("{callee}({})", values.join(", ")))
}

/// Store a call result in a `call` temporary so calls run in source
/// order; dynamic results become owned by the current scope.
fn materialize_call(
    ctx: &mut CodegenContext<'_>,
    node: &Node,
    call: &str,
) -> Result<String, CodegenError> {
    if node.ty == Type::Null {
        ctx.writeln(&format!("{call};"));
        return Ok("((void)0)".to_string());
    }
    let c_type = CTypeMapper::map_type(&node.ty, node.span)?;
    let name = ctx.fresh_temp("call");
    ctx.writeln(&format!("{c_type} {name} = {call};"));
    if is_dynamic(&node.ty) {
        let code = super::array::free_code(ctx, &name, &node.ty, node.span)?;
        ctx.ownership.add(PendingFree {
            name: name.clone(),
            ty: node.ty.clone(),
            code,
        });
    }
    Ok(name)
}

/// `AND` / `OR`. The right operand, and any setup it needs, runs only
/// when the left one does not decide the result.
fn emit_logical(
    ctx: &mut CodegenContext<'_>,
    op: LogicalOp,
    lhs: &Node,
    rhs: &Node,
) -> Result<String, CodegenError> {
    let lhs = emit_expr(ctx, lhs)?;
    let result = ctx.fresh_temp("logic");
    ctx.writeln(&format!("bool {result} = {lhs};"));
    match op {
        LogicalOp::And => ctx.writeln(&format!("if ({result}) {{")),
        LogicalOp::Or => ctx.writeln(&format!("if (!{result}) {{")),
    }
    ctx.indent();
    ctx.ownership.push();
    let rhs = emit_expr(ctx, rhs)?;
    ctx.writeln(&format!("{result} = {rhs};"));
    let frees = ctx.ownership.pop();
    emit_frees(ctx, &frees);
    ctx.dedent();
    ctx.writeln("}");
    Ok(result)
}

pub(crate) fn emit_const(value: &ConstValue) -> String {
    match value {
        ConstValue::Int(v) => format!("{v}LL"),
        ConstValue::Float(v) if v.is_nan() => "NAN".to_string(),
        ConstValue::Float(v) if v.is_infinite() && v.is_sign_positive() => "INFINITY".to_string(),
        ConstValue::Float(v) if v.is_infinite() => "-INFINITY".to_string(),
        ConstValue::Float(v) => format!("{v:?}"),
        ConstValue::Bool(true) => "true".to_string(),
        ConstValue::Bool(false) => "false".to_string(),
        ConstValue::String(s) => emit_string_literal(s),
    }
}

/// A C string literal with escapes.
pub(crate) fn emit_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => out.push_str(&format!("\\{:03o}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn emit_math(op: MathOp, lhs: &str, rhs: &str) -> String {
    format!("({lhs} {} {rhs})", op.symbol())
}

fn emit_compare(op: CompareOp, lhs: &str, rhs: &str, strings: bool) -> String {
    let c_op = match op {
        CompareOp::Eq => "==",
        CompareOp::NotEq => "!=",
        CompareOp::Gt => ">",
        CompareOp::Lt => "<",
        CompareOp::GtEq => ">=",
        CompareOp::LtEq => "<=",
    };
    if strings {
        format!("(strcmp({lhs}, {rhs}) {c_op} 0)")
    } else {
        format!("({lhs} {c_op} {rhs})")
    }
}

fn emit_cast(value: &str, from: &Type, to: &Type) -> String {
    match (from, to) {
        (Type::Int, Type::Float) => format!("((double)({value}))"),
        (Type::Float, Type::Int) => format!("((long long)({value}))"),
        (Type::Int, Type::String) => format!("bs_string_from_int({value})"),
        (Type::Float, Type::String) => format!("bs_string_from_float({value})"),
        (Type::Bool, Type::String) => format!("bs_string_from_bool({value})"),
        (Type::String, Type::Int) => format!("atoll({value})"),
        (Type::String, Type::Float) => format!("atof({value})"),
        _ => value.to_string(),
    }
}
