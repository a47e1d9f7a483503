//! User functions, RETURN, and calls to user functions and extensions.

use bs_ir::{
    Block, Body, FuncId, Function, Node, NodeKind, ScopeKind, Span, SyntaxKind, SyntaxNode,
};
use bs_types::Type;
use tracing::debug;

use super::{expect_args, expect_ident, parse_type, Builder, Keyword};
use crate::extensions::param_type_at;
use crate::{match_types, BuildError, BuildErrorKind, Extension};

/// What callers need to know about a user function.
pub(super) struct Signature {
    pub(super) name: String,
    pub(super) params: Vec<Type>,
    pub(super) ret: Type,
}

/// A `FUNC` definition split into its parts.
pub(super) struct FuncHeader<'t> {
    /// Position in the top-level statement list.
    pub(super) index: usize,
    id: FuncId,
    name: String,
    params: Vec<(String, Type, Span)>,
    ret: Type,
    body: &'t [SyntaxNode],
    span: Span,
}

/// The args of a call named `name`, if `node` is one.
fn call_args<'n>(node: &'n SyntaxNode, name: &str) -> Option<&'n [SyntaxNode]> {
    match &node.kind {
        SyntaxKind::Call { name: n, args } if n == name => Some(args),
        _ => None,
    }
}

/// Split `[FUNC name [PARAM p T]... [RETURNS T]? body...]`.
fn parse_header(
    index: usize,
    id: FuncId,
    args: &[SyntaxNode],
    span: Span,
) -> Result<FuncHeader<'_>, BuildError> {
    expect_args("FUNC", args, 1, None, span)?;
    let name = expect_ident(&args[0], "FUNC")?;
    if Keyword::from_name(name).is_some() {
        return Err(BuildError::new(
            BuildErrorKind::ReservedFunctionName {
                name: name.to_string(),
            },
            args[0].span,
        ));
    }

    let mut rest = &args[1..];
    let mut params = Vec::new();
    while let Some((first, tail)) = rest.split_first() {
        let Some(param) = call_args(first, "PARAM") else {
            break;
        };
        expect_args("PARAM", param, 2, Some(2), first.span)?;
        let param_name = expect_ident(&param[0], "PARAM")?;
        params.push((param_name.to_string(), parse_type(&param[1])?, param[0].span));
        rest = tail;
    }

    let mut ret = Type::Null;
    if let Some((first, tail)) = rest.split_first() {
        if let Some(returns) = call_args(first, "RETURNS") {
            expect_args("RETURNS", returns, 1, Some(1), first.span)?;
            ret = parse_type(&returns[0])?;
            rest = tail;
        }
    }

    Ok(FuncHeader {
        index,
        id,
        name: name.to_string(),
        params,
        ret,
        body: rest,
        span,
    })
}

/// Whether every path through `stmts` reaches a `RETURN`. Only a `RETURN`
/// and an `IF` whose branches both return count; loops and switches never
/// do.
fn definitely_returns(stmts: &[Node]) -> bool {
    stmts.iter().any(|stmt| match &stmt.kind {
        NodeKind::Return(_) => true,
        NodeKind::Block(block) => match &**block {
            Block::If {
                body,
                else_body: Some(else_body),
                ..
            } => definitely_returns(&body.stmts) && definitely_returns(&else_body.stmts),
            _ => false,
        },
        _ => false,
    })
}

impl Builder<'_> {
    /// First pass: register every top-level `FUNC` so calls can precede
    /// definitions.
    pub(super) fn collect_signatures<'t>(
        &mut self,
        tree: &'t [SyntaxNode],
    ) -> Result<Vec<FuncHeader<'t>>, BuildError> {
        let mut headers = Vec::new();
        for (index, node) in tree.iter().enumerate() {
            let Some(args) = call_args(node, "FUNC") else {
                continue;
            };
            let raw = u32::try_from(self.signatures.len())
                .unwrap_or_else(|_| panic!("internal compiler error: too many functions"));
            let header = parse_header(index, FuncId::new(raw), args, node.span)?;
            if self.functions_by_name.contains_key(&header.name) {
                return Err(BuildError::new(
                    BuildErrorKind::DuplicateFunction {
                        name: header.name.clone(),
                    },
                    node.span,
                ));
            }
            self.functions_by_name.insert(header.name.clone(), header.id);
            self.signatures.push(Signature {
                name: header.name.clone(),
                params: header.params.iter().map(|(_, ty, _)| ty.clone()).collect(),
                ret: header.ret.clone(),
            });
            headers.push(header);
        }
        debug!(functions = headers.len(), "collected function signatures");
        Ok(headers)
    }

    /// Build a function body in its own isolated frame stack.
    pub(super) fn build_function(&mut self, header: &FuncHeader<'_>) -> Result<Function, BuildError> {
        debug!(name = %header.name, params = header.params.len(), "building function");
        let saved = self.scopes.isolate(ScopeKind::Function);
        let params = header
            .params
            .iter()
            .map(|(name, ty, span)| self.scopes.declare(name, ty.clone(), *span))
            .collect();
        self.return_type = Some(header.ret.clone());

        let stmts = self.build_body(header.body)?;

        self.return_type = None;
        let scope = self.scopes.pop();
        self.scopes.restore(saved);

        if header.ret != Type::Null && !definitely_returns(&stmts) {
            return Err(BuildError::new(
                BuildErrorKind::MissingReturn {
                    name: header.name.clone(),
                    ret: header.ret.clone(),
                },
                header.span,
            ));
        }

        Ok(Function {
            id: header.id,
            name: header.name.clone(),
            params,
            ret: header.ret.clone(),
            body: Body { stmts, scope },
            span: header.span,
        })
    }

    /// `[RETURN]` or `[RETURN value]`, inside a function only.
    pub(super) fn build_return(
        &mut self,
        args: &[SyntaxNode],
        span: Span,
    ) -> Result<Node, BuildError> {
        if !self.scopes.has_ancestor_of_kind(ScopeKind::Function) {
            return Err(BuildError::new(BuildErrorKind::ReturnOutsideFunction, span));
        }
        expect_args("RETURN", args, 0, Some(1), span)?;
        let expected = self.return_type.clone().unwrap_or(Type::Null);

        let value = match args.first() {
            Some(arg) => Some(self.value(arg, "RETURN")?),
            None => None,
        };
        let found = value.as_ref().map_or(Type::Null, |v| v.ty.clone());
        let matches = match expected {
            Type::Null => found == Type::Null,
            _ => found != Type::Null && expected.equal(&found),
        };
        if !matches {
            return Err(BuildError::new(
                BuildErrorKind::TypeMismatch {
                    context: "RETURN value".to_string(),
                    expected,
                    found,
                },
                value.as_ref().map_or(span, |v| v.span),
            ));
        }

        Ok(Node::stmt(NodeKind::Return(value.map(Box::new)), span))
    }

    /// `[name args...]` for a user function.
    pub(super) fn build_user_call(
        &mut self,
        func: FuncId,
        args: &[SyntaxNode],
        span: Span,
    ) -> Result<Node, BuildError> {
        let args = args
            .iter()
            .map(|arg| self.build_node(arg))
            .collect::<Result<Vec<_>, _>>()?;
        let signature = &self.signatures[func.index()];
        match_types(&signature.name, &args, &signature.params, span)?;
        Ok(Node::new(
            NodeKind::Call { func, args },
            signature.ret.clone(),
            span,
        ))
    }

    /// `[name args...]` for an extension. Bare identifiers are accepted
    /// where the extension declares an `IDENT` parameter.
    pub(super) fn build_extension_call(
        &mut self,
        extension: &Extension,
        args: &[SyntaxNode],
        span: Span,
    ) -> Result<Node, BuildError> {
        let mut built = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            let wants_ident = param_type_at(&extension.params, i) == Some(&Type::Ident);
            match arg.as_ident() {
                Some(word) if wants_ident => built.push(Node::new(
                    NodeKind::Ident(word.to_string()),
                    Type::Ident,
                    arg.span,
                )),
                _ => built.push(self.build_node(arg)?),
            }
        }
        match_types(&extension.name, &built, &extension.params, span)?;
        Ok(Node::new(
            NodeKind::ExtensionCall {
                name: extension.name.clone(),
                args: built,
            },
            extension.ret.clone(),
            span,
        ))
    }
}
