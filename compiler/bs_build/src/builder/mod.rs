//! Syntax tree → typed IR.
//!
//! [`build`] runs two passes over the top-level statements: the first
//! collects every `FUNC` signature so calls may precede definitions, the
//! second builds statements and function bodies in source order.
//!
//! Call dispatch order: block keywords, built-in keywords, extensions,
//! user functions.

mod blocks;
mod calls;
mod functions;

use bs_ir::{
    Body, ConstValue, FuncId, Function, Node, NodeKind, Program, ScopeKind, Span, SyntaxKind,
    SyntaxNode,
};
use bs_types::Type;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::scope::ScopeStack;
use crate::{BuildError, BuildErrorKind, Extensions};

use functions::Signature;

/// Reserved call names.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Keyword {
    // Blocks
    If,
    While,
    Switch,
    Case,
    Default,
    // Built-ins
    Define,
    Var,
    Print,
    Math,
    Compare,
    And,
    Or,
    Not,
    Int,
    Float,
    String,
    Array,
    Index,
    Append,
    Length,
    Func,
    Return,
}

impl Keyword {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "IF" => Keyword::If,
            "WHILE" => Keyword::While,
            "SWITCH" => Keyword::Switch,
            "CASE" => Keyword::Case,
            "DEFAULT" => Keyword::Default,
            "DEFINE" => Keyword::Define,
            "VAR" => Keyword::Var,
            "PRINT" => Keyword::Print,
            "MATH" => Keyword::Math,
            "COMPARE" => Keyword::Compare,
            "AND" => Keyword::And,
            "OR" => Keyword::Or,
            "NOT" => Keyword::Not,
            "INT" => Keyword::Int,
            "FLOAT" => Keyword::Float,
            "STRING" => Keyword::String,
            "ARRAY" => Keyword::Array,
            "INDEX" => Keyword::Index,
            "APPEND" => Keyword::Append,
            "LENGTH" => Keyword::Length,
            "FUNC" => Keyword::Func,
            "RETURN" => Keyword::Return,
            _ => return None,
        })
    }
}

/// Build a program from top-level syntax nodes.
#[tracing::instrument(level = "debug", skip_all, fields(stmts = tree.len()))]
pub fn build(tree: &[SyntaxNode], extensions: &Extensions) -> Result<Program, BuildError> {
    let mut builder = Builder::new(extensions);
    let headers = builder.collect_signatures(tree)?;

    builder.scopes.push(ScopeKind::Global);
    let mut stmts = Vec::with_capacity(tree.len());
    let mut functions: Vec<Function> = Vec::with_capacity(headers.len());
    let mut pending = headers.iter().peekable();
    for (index, node) in tree.iter().enumerate() {
        match pending.next_if(|header| header.index == index) {
            Some(header) => functions.push(builder.build_function(header)?),
            None => stmts.push(builder.build_node(node)?),
        }
    }
    let scope = builder.scopes.pop();

    let program = Program {
        variables: builder.scopes.into_variables(),
        functions,
        body: Body { stmts, scope },
    };
    debug!(
        variables = program.variables.len(),
        functions = program.functions.len(),
        "built program"
    );
    Ok(program)
}

pub(crate) struct Builder<'a> {
    scopes: ScopeStack,
    extensions: &'a Extensions,
    /// Indexed by [`FuncId::index`].
    signatures: Vec<Signature>,
    functions_by_name: FxHashMap<String, FuncId>,
    /// Declared return type of the function being built.
    return_type: Option<Type>,
}

impl<'a> Builder<'a> {
    fn new(extensions: &'a Extensions) -> Self {
        Builder {
            scopes: ScopeStack::new(),
            extensions,
            signatures: Vec::new(),
            functions_by_name: FxHashMap::default(),
            return_type: None,
        }
    }

    fn build_body(&mut self, nodes: &[SyntaxNode]) -> Result<Vec<Node>, BuildError> {
        nodes.iter().map(|node| self.build_node(node)).collect()
    }

    /// Build any node; statements are allowed.
    fn build_node(&mut self, node: &SyntaxNode) -> Result<Node, BuildError> {
        let span = node.span;
        match &node.kind {
            SyntaxKind::Int(v) => Ok(constant(ConstValue::Int(*v), span)),
            SyntaxKind::Float(v) => Ok(constant(ConstValue::Float(*v), span)),
            SyntaxKind::String(s) => Ok(constant(ConstValue::String(s.clone()), span)),
            SyntaxKind::Ident(word) => match word.as_str() {
                "TRUE" => Ok(constant(ConstValue::Bool(true), span)),
                "FALSE" => Ok(constant(ConstValue::Bool(false), span)),
                _ => Err(BuildError::new(
                    BuildErrorKind::UnexpectedIdent { name: word.clone() },
                    span,
                )),
            },
            SyntaxKind::Call { name, args } => self.build_call(name, args, span),
        }
    }

    /// Build a node that must produce a value.
    fn value(&mut self, node: &SyntaxNode, construct: &str) -> Result<Node, BuildError> {
        let built = self.build_node(node)?;
        if built.ty == Type::Null {
            return Err(BuildError::new(
                BuildErrorKind::ExpectedValue {
                    construct: construct.to_string(),
                },
                built.span,
            ));
        }
        Ok(built)
    }

    fn build_call(
        &mut self,
        name: &str,
        args: &[SyntaxNode],
        span: Span,
    ) -> Result<Node, BuildError> {
        if let Some(keyword) = Keyword::from_name(name) {
            return match keyword {
                Keyword::If => self.build_if(args, span),
                Keyword::While => self.build_while(args, span),
                Keyword::Switch => self.build_switch(args, span),
                Keyword::Case => self.build_case(args, span),
                Keyword::Default => self.build_default(args, span),
                Keyword::Define => self.build_define(args, span),
                Keyword::Var => self.build_var(args, span),
                Keyword::Print => self.build_print(args, span),
                Keyword::Math => self.build_math(args, span),
                Keyword::Compare => self.build_compare(args, span),
                Keyword::And | Keyword::Or => self.build_logical(keyword, args, span),
                Keyword::Not => self.build_not(args, span),
                Keyword::Int => self.build_cast(Type::Int, "INT", args, span),
                Keyword::Float => self.build_cast(Type::Float, "FLOAT", args, span),
                Keyword::String => self.build_cast(Type::String, "STRING", args, span),
                Keyword::Array => self.build_array(args, span),
                Keyword::Index => self.build_index(args, span),
                Keyword::Append => self.build_append(args, span),
                Keyword::Length => self.build_length(args, span),
                Keyword::Return => self.build_return(args, span),
                Keyword::Func => Err(BuildError::new(
                    BuildErrorKind::FunctionNotTopLevel,
                    span,
                )),
            };
        }
        let extensions = self.extensions;
        if let Some(extension) = extensions.get(name) {
            return self.build_extension_call(extension, args, span);
        }
        if let Some(&func) = self.functions_by_name.get(name) {
            return self.build_user_call(func, args, span);
        }
        Err(BuildError::new(
            BuildErrorKind::UnknownFunction {
                name: name.to_string(),
            },
            span,
        ))
    }
}

fn constant(value: ConstValue, span: Span) -> Node {
    let ty = value.ty();
    Node::new(NodeKind::Const(value), ty, span)
}

/// Check an argument count; `max == None` means "at least `min`".
fn expect_args(
    construct: &str,
    args: &[SyntaxNode],
    min: usize,
    max: Option<usize>,
    span: Span,
) -> Result<(), BuildError> {
    if args.len() < min || max.is_some_and(|max| args.len() > max) {
        return Err(BuildError::new(
            BuildErrorKind::ArgCount {
                construct: construct.to_string(),
                min,
                max,
                found: args.len(),
            },
            span,
        ));
    }
    Ok(())
}

fn expect_ident<'n>(node: &'n SyntaxNode, construct: &str) -> Result<&'n str, BuildError> {
    node.as_ident().ok_or_else(|| {
        BuildError::new(
            BuildErrorKind::ExpectedIdent {
                construct: construct.to_string(),
            },
            node.span,
        )
    })
}

/// Read a written type annotation (`INT`, `[]STRING`, `{INT, FLOAT}`).
fn parse_type(node: &SyntaxNode) -> Result<Type, BuildError> {
    let text = match &node.kind {
        SyntaxKind::Ident(text) | SyntaxKind::String(text) => text.as_str(),
        _ => {
            return Err(BuildError::new(
                BuildErrorKind::InvalidType {
                    text: "<expression>".to_string(),
                },
                node.span,
            ))
        }
    };
    text.parse::<Type>().map_err(|err| {
        BuildError::new(BuildErrorKind::InvalidType { text: err.text }, node.span)
    })
}

#[cfg(test)]
mod tests;
