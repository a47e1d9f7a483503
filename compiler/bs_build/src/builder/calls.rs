//! Built-in keywords: variables, printing, operators, casts and arrays.

use bs_ir::{CompareOp, LogicalOp, MathOp, Node, NodeKind, Span, SyntaxNode};
use bs_types::Type;

use super::{expect_args, expect_ident, parse_type, Builder, Keyword};
use crate::{BuildError, BuildErrorKind};

fn mismatch(context: &str, expected: Type, found: &Node) -> BuildError {
    BuildError::new(
        BuildErrorKind::TypeMismatch {
            context: context.to_string(),
            expected,
            found: found.ty.clone(),
        },
        found.span,
    )
}

fn operator<T>(
    construct: &str,
    node: &SyntaxNode,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, BuildError> {
    let symbol = expect_ident(node, construct)?;
    parse(symbol).ok_or_else(|| {
        BuildError::new(
            BuildErrorKind::InvalidOperator {
                construct: construct.to_string(),
                op: symbol.to_string(),
            },
            node.span,
        )
    })
}

/// Whether a cast from `from` to `to` is defined.
fn can_cast(from: &Type, to: &Type) -> bool {
    matches!(
        (from, to),
        (Type::Int, Type::Int | Type::Float | Type::String)
            | (Type::Float, Type::Int | Type::Float | Type::String)
            | (Type::String, Type::Int | Type::Float | Type::String)
            | (Type::Bool, Type::String)
    )
}

impl Builder<'_> {
    /// `[DEFINE name value]`
    ///
    /// Overwrites the visible variable of that name when the value has
    /// exactly its type, otherwise declares a new variable in the current
    /// frame.
    pub(super) fn build_define(
        &mut self,
        args: &[SyntaxNode],
        span: Span,
    ) -> Result<Node, BuildError> {
        expect_args("DEFINE", args, 2, Some(2), span)?;
        let name = expect_ident(&args[0], "DEFINE")?;
        let value = self.value(&args[1], "DEFINE")?;

        let existing = self
            .scopes
            .lookup(name)
            .filter(|var| var.ty == value.ty)
            .map(|var| var.id);
        let (var, declares) = match existing {
            Some(id) => (id, false),
            None => (self.scopes.declare(name, value.ty.clone(), args[0].span), true),
        };
        Ok(Node::stmt(
            NodeKind::Define {
                var,
                value: Box::new(value),
                declares,
            },
            span,
        ))
    }

    /// `[VAR name]`
    pub(super) fn build_var(&mut self, args: &[SyntaxNode], span: Span) -> Result<Node, BuildError> {
        expect_args("VAR", args, 1, Some(1), span)?;
        let name = expect_ident(&args[0], "VAR")?;
        let Some(var) = self.scopes.lookup(name) else {
            return Err(BuildError::new(
                BuildErrorKind::UnknownVariable {
                    name: name.to_string(),
                },
                args[0].span,
            ));
        };
        Ok(Node::new(NodeKind::Var(var.id), var.ty.clone(), span))
    }

    /// `[PRINT value]`
    pub(super) fn build_print(
        &mut self,
        args: &[SyntaxNode],
        span: Span,
    ) -> Result<Node, BuildError> {
        expect_args("PRINT", args, 1, Some(1), span)?;
        let value = self.value(&args[0], "PRINT")?;
        if !Type::printable().equal(&value.ty) {
            return Err(mismatch("PRINT", Type::printable(), &value));
        }
        Ok(Node::stmt(NodeKind::Print(Box::new(value)), span))
    }

    /// `[MATH lhs op rhs]` over two INTs or two FLOATs.
    pub(super) fn build_math(
        &mut self,
        args: &[SyntaxNode],
        span: Span,
    ) -> Result<Node, BuildError> {
        expect_args("MATH", args, 3, Some(3), span)?;
        let lhs = self.value(&args[0], "MATH")?;
        let op = operator("MATH", &args[1], MathOp::from_symbol)?;
        let rhs = self.value(&args[2], "MATH")?;

        let allowed = match op {
            MathOp::Mod => Type::Int,
            _ => Type::Union(vec![Type::Int, Type::Float]),
        };
        if !matches!(lhs.ty, Type::Int | Type::Float) || !allowed.equal(&lhs.ty) {
            return Err(mismatch("MATH operand", allowed, &lhs));
        }
        if rhs.ty != lhs.ty {
            return Err(mismatch("MATH operand", lhs.ty.clone(), &rhs));
        }

        let ty = lhs.ty.clone();
        Ok(Node::new(
            NodeKind::Math {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty,
            span,
        ))
    }

    /// `[COMPARE lhs op rhs]`; booleans only support `=` and `!=`.
    pub(super) fn build_compare(
        &mut self,
        args: &[SyntaxNode],
        span: Span,
    ) -> Result<Node, BuildError> {
        expect_args("COMPARE", args, 3, Some(3), span)?;
        let lhs = self.value(&args[0], "COMPARE")?;
        let op = operator("COMPARE", &args[1], CompareOp::from_symbol)?;
        let rhs = self.value(&args[2], "COMPARE")?;

        let allowed = if op.is_equality() {
            Type::Union(vec![Type::Int, Type::Float, Type::String, Type::Bool])
        } else {
            Type::Union(vec![Type::Int, Type::Float, Type::String])
        };
        if !matches!(lhs.ty, Type::Int | Type::Float | Type::String | Type::Bool)
            || !allowed.equal(&lhs.ty)
        {
            return Err(mismatch("COMPARE operand", allowed, &lhs));
        }
        if rhs.ty != lhs.ty {
            return Err(mismatch("COMPARE operand", lhs.ty.clone(), &rhs));
        }

        Ok(Node::new(
            NodeKind::Compare {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            Type::Bool,
            span,
        ))
    }

    fn bool_operand(&mut self, node: &SyntaxNode, construct: &str) -> Result<Node, BuildError> {
        let value = self.value(node, construct)?;
        if value.ty != Type::Bool {
            return Err(mismatch(&format!("{construct} operand"), Type::Bool, &value));
        }
        Ok(value)
    }

    /// `[AND a b]` / `[OR a b]`
    pub(super) fn build_logical(
        &mut self,
        keyword: Keyword,
        args: &[SyntaxNode],
        span: Span,
    ) -> Result<Node, BuildError> {
        let op = if keyword == Keyword::And {
            LogicalOp::And
        } else {
            LogicalOp::Or
        };
        let construct = op.keyword();
        expect_args(construct, args, 2, Some(2), span)?;
        let lhs = self.bool_operand(&args[0], construct)?;
        let rhs = self.bool_operand(&args[1], construct)?;
        Ok(Node::new(
            NodeKind::Logical {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            Type::Bool,
            span,
        ))
    }

    /// `[NOT a]`
    pub(super) fn build_not(&mut self, args: &[SyntaxNode], span: Span) -> Result<Node, BuildError> {
        expect_args("NOT", args, 1, Some(1), span)?;
        let value = self.bool_operand(&args[0], "NOT")?;
        Ok(Node::new(NodeKind::Not(Box::new(value)), Type::Bool, span))
    }

    /// `[INT v]`, `[FLOAT v]`, `[STRING v]`
    pub(super) fn build_cast(
        &mut self,
        to: Type,
        construct: &str,
        args: &[SyntaxNode],
        span: Span,
    ) -> Result<Node, BuildError> {
        expect_args(construct, args, 1, Some(1), span)?;
        let value = self.value(&args[0], construct)?;
        if !can_cast(&value.ty, &to) {
            return Err(BuildError::new(
                BuildErrorKind::InvalidCast {
                    from: value.ty.clone(),
                    to,
                },
                value.span,
            ));
        }
        Ok(Node::new(NodeKind::Cast(Box::new(value)), to, span))
    }

    /// `[ARRAY v...]`, or `[ARRAY T]` for an empty array of `T`.
    ///
    /// Every element must have exactly the type of the first.
    pub(super) fn build_array(
        &mut self,
        args: &[SyntaxNode],
        span: Span,
    ) -> Result<Node, BuildError> {
        expect_args("ARRAY", args, 1, None, span)?;

        if let [annotation] = args {
            if annotation
                .as_ident()
                .is_some_and(|word| word != "TRUE" && word != "FALSE")
            {
                let elem = parse_type(annotation)?;
                return Ok(Node::new(
                    NodeKind::Array {
                        elem: elem.clone(),
                        values: Vec::new(),
                    },
                    Type::array(elem),
                    span,
                ));
            }
        }

        let mut values: Vec<Node> = Vec::with_capacity(args.len());
        for arg in args {
            let value = self.value(arg, "ARRAY")?;
            if let Some(first) = values.first() {
                if value.ty != first.ty {
                    return Err(mismatch("ARRAY element", first.ty.clone(), &value));
                }
            }
            values.push(value);
        }
        let elem = values[0].ty.clone();
        Ok(Node::new(
            NodeKind::Array {
                elem: elem.clone(),
                values,
            },
            Type::array(elem),
            span,
        ))
    }

    fn array_operand(&mut self, node: &SyntaxNode, construct: &str) -> Result<Node, BuildError> {
        let value = self.value(node, construct)?;
        if value.ty.elem().is_none() {
            return Err(mismatch(
                &format!("{construct} array"),
                Type::array(Type::Any),
                &value,
            ));
        }
        Ok(value)
    }

    /// `[INDEX array i]`
    pub(super) fn build_index(
        &mut self,
        args: &[SyntaxNode],
        span: Span,
    ) -> Result<Node, BuildError> {
        expect_args("INDEX", args, 2, Some(2), span)?;
        let array = self.array_operand(&args[0], "INDEX")?;
        let index = self.value(&args[1], "INDEX")?;
        if index.ty != Type::Int {
            return Err(mismatch("INDEX index", Type::Int, &index));
        }
        let ty = array.ty.elem().cloned().unwrap_or(Type::Any);
        Ok(Node::new(
            NodeKind::Index {
                array: Box::new(array),
                index: Box::new(index),
            },
            ty,
            span,
        ))
    }

    /// `[APPEND array value]`
    pub(super) fn build_append(
        &mut self,
        args: &[SyntaxNode],
        span: Span,
    ) -> Result<Node, BuildError> {
        expect_args("APPEND", args, 2, Some(2), span)?;
        let array = self.array_operand(&args[0], "APPEND")?;
        let value = self.value(&args[1], "APPEND")?;
        let elem = array.ty.elem().cloned().unwrap_or(Type::Any);
        if value.ty != elem {
            return Err(mismatch("APPEND value", elem, &value));
        }
        Ok(Node::stmt(
            NodeKind::Append {
                array: Box::new(array),
                value: Box::new(value),
            },
            span,
        ))
    }

    /// `[LENGTH array]`
    pub(super) fn build_length(
        &mut self,
        args: &[SyntaxNode],
        span: Span,
    ) -> Result<Node, BuildError> {
        expect_args("LENGTH", args, 1, Some(1), span)?;
        let array = self.array_operand(&args[0], "LENGTH")?;
        Ok(Node::new(NodeKind::Length(Box::new(array)), Type::Int, span))
    }
}

#[cfg(test)]
mod tests {
    use super::can_cast;
    use bs_types::Type;

    #[test]
    fn test_cast_table() {
        assert!(can_cast(&Type::Float, &Type::Int));
        assert!(can_cast(&Type::Bool, &Type::String));
        assert!(!can_cast(&Type::Bool, &Type::Int));
        assert!(!can_cast(&Type::array(Type::Int), &Type::String));
    }
}
