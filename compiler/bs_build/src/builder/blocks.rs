//! IF / WHILE / SWITCH / CASE / DEFAULT.

use bs_ir::{
    Block, Body, CaseBlock, DefaultBlock, Node, NodeKind, ScopeKind, Span, SwitchBlock,
    SyntaxNode,
};
use bs_types::Type;

use super::{expect_args, Builder};
use crate::{BuildError, BuildErrorKind};

fn block_node(block: Block, span: Span) -> Node {
    Node::stmt(NodeKind::Block(Box::new(block)), span)
}

impl Builder<'_> {
    /// Build `nodes` inside a fresh `kind` frame.
    fn scoped_body(&mut self, kind: ScopeKind, nodes: &[SyntaxNode]) -> Result<Body, BuildError> {
        self.scopes.push(kind);
        let stmts = self.build_body(nodes)?;
        let scope = self.scopes.pop();
        Ok(Body { stmts, scope })
    }

    /// `[IF cond stmt... ELSE stmt...]`
    pub(super) fn build_if(&mut self, args: &[SyntaxNode], span: Span) -> Result<Node, BuildError> {
        expect_args("IF", args, 2, None, span)?;

        let cond = self.build_node(&args[0])?;
        if cond.ty != Type::Bool {
            return Err(BuildError::new(
                BuildErrorKind::ExpectedBoolCondition {
                    construct: "IF".to_string(),
                },
                cond.span,
            ));
        }

        let mut else_at = None;
        for (i, arg) in args.iter().enumerate().skip(1) {
            if arg.is_ident("ELSE") {
                if else_at.is_some() {
                    return Err(BuildError::new(BuildErrorKind::DuplicateElse, arg.span));
                }
                else_at = Some(i);
            }
        }
        let (then_args, else_args) = match else_at {
            Some(i) => (&args[1..i], Some(&args[i + 1..])),
            None => (&args[1..], None),
        };

        let body = self.scoped_body(ScopeKind::If, then_args)?;
        let else_body = match else_args {
            Some(nodes) => Some(self.scoped_body(ScopeKind::If, nodes)?),
            None => None,
        };
        Ok(block_node(
            Block::If {
                cond,
                body,
                else_body,
            },
            span,
        ))
    }

    /// `[WHILE cond stmt...]`
    ///
    /// The condition is not type-checked here.
    pub(super) fn build_while(
        &mut self,
        args: &[SyntaxNode],
        span: Span,
    ) -> Result<Node, BuildError> {
        expect_args("WHILE", args, 2, None, span)?;
        let cond = self.build_node(&args[0])?;
        let body = self.scoped_body(ScopeKind::While, &args[1..])?;
        Ok(block_node(Block::While { cond, body }, span))
    }

    /// `[SWITCH value [CASE c stmt...]... [DEFAULT stmt...]]`
    pub(super) fn build_switch(
        &mut self,
        args: &[SyntaxNode],
        span: Span,
    ) -> Result<Node, BuildError> {
        expect_args("SWITCH", args, 2, None, span)?;

        let value = self.build_node(&args[0])?;
        if !Type::hashable().equal(&value.ty) {
            return Err(BuildError::new(
                BuildErrorKind::NotHashable {
                    construct: "SWITCH".to_string(),
                },
                value.span,
            ));
        }

        let mut cases = Vec::with_capacity(args.len() - 1);
        let mut default: Option<DefaultBlock> = None;
        self.scopes.push(ScopeKind::Switch);
        for arg in &args[1..] {
            let node = self.build_node(arg)?;
            let NodeKind::Block(block) = node.kind else {
                return Err(BuildError::new(BuildErrorKind::ExpectedCase, arg.span));
            };
            match *block {
                Block::Case(case) => {
                    if !case.value.ty.equal(&value.ty) {
                        return Err(BuildError::new(
                            BuildErrorKind::CaseTypeMismatch {
                                expected: value.ty.clone(),
                            },
                            arg.span,
                        ));
                    }
                    cases.push(case);
                }
                Block::Default(default_block) => {
                    if default.is_some() {
                        return Err(BuildError::new(
                            BuildErrorKind::DuplicateDefault,
                            node.span,
                        ));
                    }
                    default = Some(default_block);
                }
                _ => return Err(BuildError::new(BuildErrorKind::ExpectedCase, arg.span)),
            }
        }
        let scope = self.scopes.pop();

        Ok(block_node(
            Block::Switch(SwitchBlock {
                value,
                cases,
                default,
                scope,
            }),
            span,
        ))
    }

    /// `[CASE constant stmt...]`, only directly inside a SWITCH.
    pub(super) fn build_case(
        &mut self,
        args: &[SyntaxNode],
        span: Span,
    ) -> Result<Node, BuildError> {
        self.expect_in_switch("CASE", span)?;
        expect_args("CASE", args, 2, None, span)?;

        let value = self.build_node(&args[0])?;
        if !value.is_const() {
            return Err(BuildError::new(BuildErrorKind::NonConstantCase, value.span));
        }
        if !Type::hashable().equal(&value.ty) {
            return Err(BuildError::new(
                BuildErrorKind::NotHashable {
                    construct: "CASE".to_string(),
                },
                value.span,
            ));
        }

        let body = self.scoped_body(ScopeKind::Case, &args[1..])?;
        Ok(block_node(Block::Case(CaseBlock { value, body, span }), span))
    }

    /// `[DEFAULT stmt...]`, only directly inside a SWITCH.
    pub(super) fn build_default(
        &mut self,
        args: &[SyntaxNode],
        span: Span,
    ) -> Result<Node, BuildError> {
        self.expect_in_switch("DEFAULT", span)?;
        expect_args("DEFAULT", args, 1, None, span)?;

        let body = self.scoped_body(ScopeKind::Case, args)?;
        Ok(block_node(Block::Default(DefaultBlock { body, span }), span))
    }

    fn expect_in_switch(&self, construct: &str, span: Span) -> Result<(), BuildError> {
        if self.scopes.current_kind() == Some(ScopeKind::Switch) {
            Ok(())
        } else {
            Err(BuildError::new(
                BuildErrorKind::OutsideSwitch {
                    construct: construct.to_string(),
                },
                span,
            ))
        }
    }
}
