//! Array literals, indexing, appending, and the per-shape release and
//! copy helpers.
//!
//! Arrays whose elements own memory get a helper per type shape, named
//! after [`CTypeMapper::type_tag`]: `arrfree_aai` releases the elements of
//! a `[][]INT`, `arrcopy_aai` deep-copies them. Inner helpers are defined
//! before the helpers that call them, and each is defined once. For
//! scalar elements no helper exists and `NULL` is passed instead.

use bs_ir::{Node, Span};
use bs_types::Type;
use tracing::debug;

use super::expr::{emit_expr, emit_moved};
use super::types::CTypeMapper;
use crate::analysis::{is_dynamic, PendingFree};
use crate::context::CodegenContext;
use crate::CodegenError;

/// C statement releasing the dynamic value `name` of type `ty`.
pub(crate) fn free_code(
    ctx: &mut CodegenContext<'_>,
    name: &str,
    ty: &Type,
    span: Span,
) -> Result<String, CodegenError> {
    match ty {
        Type::Array(elem) => {
            let free_elems = free_fn(ctx, elem, ty, span)?;
            Ok(format!("array_free({name}, {free_elems});"))
        }
        _ => Err(CodegenError::unsupported_type(ty, span)),
    }
}

/// C expression deep-copying the array `value` of type `ty`.
pub(crate) fn copy_code(
    ctx: &mut CodegenContext<'_>,
    value: &str,
    ty: &Type,
    span: Span,
) -> Result<String, CodegenError> {
    match ty {
        Type::Array(elem) => {
            let copy_elems = copy_fn(ctx, elem, ty, span)?;
            Ok(format!("array_copy({value}, {copy_elems})"))
        }
        _ => Err(CodegenError::unsupported_type(ty, span)),
    }
}

/// `&arrfree_<tag>` for arrays of `ty` with dynamic `elem`s, else `NULL`.
fn free_fn(
    ctx: &mut CodegenContext<'_>,
    elem: &Type,
    ty: &Type,
    span: Span,
) -> Result<String, CodegenError> {
    if !is_dynamic(elem) {
        return Ok("NULL".to_string());
    }
    let name = format!("arrfree_{}", CTypeMapper::type_tag(ty));
    if !ctx.has_helper(&name) {
        let release = free_code(ctx, "*((array**)(array_get(arr, i)))", elem, span)?;
        ctx.define_helper(&name, |ctx| {
            ctx.writeln(&format!("void {name}(array* arr) {{"));
            ctx.indent();
            ctx.writeln("for (long long i = 0; i < array_length(arr); i++) {");
            ctx.indent();
            ctx.writeln(&release);
            ctx.dedent();
            ctx.writeln("}");
            ctx.dedent();
            ctx.writeln("}");
        });
        debug!(helper = %name, "synthesized release helper");
    }
    Ok(format!("&{name}"))
}

/// `&arrcopy_<tag>` for arrays of `ty` with dynamic `elem`s, else `NULL`.
fn copy_fn(
    ctx: &mut CodegenContext<'_>,
    elem: &Type,
    ty: &Type,
    span: Span,
) -> Result<String, CodegenError> {
    if !is_dynamic(elem) {
        return Ok("NULL".to_string());
    }
    let name = format!("arrcopy_{}", CTypeMapper::type_tag(ty));
    if !ctx.has_helper(&name) {
        let copy = copy_code(ctx, "*slot", elem, span)?;
        ctx.define_helper(&name, |ctx| {
            ctx.writeln(&format!("void {name}(array* arr) {{"));
            ctx.indent();
            ctx.writeln("for (long long i = 0; i < array_length(arr); i++) {");
            ctx.indent();
            ctx.writeln("array** slot = (array**)(array_get(arr, i));");
            ctx.writeln(&format!("*slot = {copy};"));
            ctx.dedent();
            ctx.writeln("}");
            ctx.dedent();
            ctx.writeln("}");
        });
        debug!(helper = %name, "synthesized copy helper");
    }
    Ok(format!("&{name}"))
}

/// An lvalue holding `node`'s value, suitable for `&` in `array_append`.
///
/// Dynamic values are moved; scalars are materialized into a `cnst`
/// temporary.
fn emit_addressable(ctx: &mut CodegenContext<'_>, node: &Node) -> Result<String, CodegenError> {
    if is_dynamic(&node.ty) {
        return emit_moved(ctx, node);
    }
    let value = emit_expr(ctx, node)?;
    let c_type = CTypeMapper::map_type(&node.ty, node.span)?;
    let name = ctx.fresh_temp("cnst");
    ctx.writeln(&format!("{c_type} {name} = {value};"));
    Ok(name)
}

/// `[ARRAY v...]`: allocate, append every element, register the release.
pub(crate) fn emit_array(
    ctx: &mut CodegenContext<'_>,
    node: &Node,
    elem: &Type,
    values: &[Node],
) -> Result<String, CodegenError> {
    let c_elem = CTypeMapper::map_type(elem, node.span)?;
    let arr = ctx.fresh_temp("arr");
    ctx.writeln(&format!(
        "array* {arr} = array_new(sizeof({c_elem}), {});",
        values.len()
    ));
    for value in values {
        let value = emit_addressable(ctx, value)?;
        ctx.writeln(&format!("array_append({arr}, &{value});"));
    }

    let code = free_code(ctx, &arr, &node.ty, node.span)?;
    ctx.ownership.add(PendingFree {
        name: arr.clone(),
        ty: node.ty.clone(),
        code,
    });
    Ok(arr)
}

/// `[INDEX array i]`, borrowing the element.
pub(crate) fn emit_index(
    ctx: &mut CodegenContext<'_>,
    node: &Node,
    array: &Node,
    index: &Node,
) -> Result<String, CodegenError> {
    let array = emit_expr(ctx, array)?;
    let index = emit_expr(ctx, index)?;
    let c_type = CTypeMapper::map_type(&node.ty, node.span)?;
    Ok(format!("*(({c_type}*)(array_get({array}, {index})))"))
}

/// `[APPEND array value]`; the array takes ownership of `value`.
pub(crate) fn emit_append(
    ctx: &mut CodegenContext<'_>,
    array: &Node,
    value: &Node,
) -> Result<(), CodegenError> {
    let array = emit_expr(ctx, array)?;
    let value = emit_addressable(ctx, value)?;
    ctx.writeln(&format!("array_append({array}, &{value});"));
    Ok(())
}

pub(crate) fn emit_length(ctx: &mut CodegenContext<'_>, array: &Node) -> Result<String, CodegenError> {
    let array = emit_expr(ctx, array)?;
    Ok(format!("array_length({array})"))
}
