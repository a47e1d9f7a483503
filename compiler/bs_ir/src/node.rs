//! Typed IR nodes.
//!
//! Every node carries its result type and the span it was built from.
//! Statements (definitions, prints, blocks, ...) have type `NULL`.

use std::fmt;

use bs_types::Type;

use crate::{FuncId, ScopeInfo, Span, VarId};

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub kind: NodeKind,
    pub ty: Type,
    pub span: Span,
}

impl Node {
    pub fn new(kind: NodeKind, ty: Type, span: Span) -> Self {
        Node { kind, ty, span }
    }

    /// A statement node (type `NULL`).
    pub fn stmt(kind: NodeKind, span: Span) -> Self {
        Node::new(kind, Type::Null, span)
    }

    pub fn is_const(&self) -> bool {
        matches!(self.kind, NodeKind::Const(_))
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
}

impl ConstValue {
    pub fn ty(&self) -> Type {
        match self {
            ConstValue::Int(_) => Type::Int,
            ConstValue::Float(_) => Type::Float,
            ConstValue::Bool(_) => Type::Bool,
            ConstValue::String(_) => Type::String,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Float(v) => write!(f, "{v:?}"),
            ConstValue::Bool(true) => write!(f, "TRUE"),
            ConstValue::Bool(false) => write!(f, "FALSE"),
            ConstValue::String(s) => write!(f, "{s:?}"),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum MathOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl MathOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => MathOp::Add,
            "-" => MathOp::Sub,
            "*" => MathOp::Mul,
            "/" => MathOp::Div,
            "%" => MathOp::Mod,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            MathOp::Add => "+",
            MathOp::Sub => "-",
            MathOp::Mul => "*",
            MathOp::Div => "/",
            MathOp::Mod => "%",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
}

impl CompareOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "=" => CompareOp::Eq,
            "!=" => CompareOp::NotEq,
            ">" => CompareOp::Gt,
            "<" => CompareOp::Lt,
            ">=" => CompareOp::GtEq,
            "<=" => CompareOp::LtEq,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::GtEq => ">=",
            CompareOp::LtEq => "<=",
        }
    }

    /// `=` and `!=`; the only comparisons defined on booleans.
    pub fn is_equality(self) -> bool {
        matches!(self, CompareOp::Eq | CompareOp::NotEq)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn keyword(self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    Const(ConstValue),
    /// Read of a variable's current value.
    Var(VarId),
    /// A bare identifier operand.
    Ident(String),
    /// Assignment. `declares` is set when this definition created the
    /// variable; otherwise it overwrites an existing one.
    Define {
        var: VarId,
        value: Box<Node>,
        declares: bool,
    },
    Print(Box<Node>),
    Math {
        op: MathOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    Compare {
        op: CompareOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    /// Short-circuiting `AND` / `OR`.
    Logical {
        op: LogicalOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    Not(Box<Node>),
    /// Conversion between scalar types; the target is the node's type.
    Cast(Box<Node>),
    /// Array literal. `elem` is the element type, also for empty literals.
    Array {
        elem: Type,
        values: Vec<Node>,
    },
    Index {
        array: Box<Node>,
        index: Box<Node>,
    },
    Append {
        array: Box<Node>,
        value: Box<Node>,
    },
    Length(Box<Node>),
    Call {
        func: FuncId,
        args: Vec<Node>,
    },
    ExtensionCall {
        name: String,
        args: Vec<Node>,
    },
    Return(Option<Box<Node>>),
    Block(Box<Block>),
}

/// A statement list together with the frame it was built in.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Body {
    pub stmts: Vec<Node>,
    pub scope: ScopeInfo,
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Block {
    If {
        cond: Node,
        body: Body,
        else_body: Option<Body>,
    },
    While {
        cond: Node,
        body: Body,
    },
    Switch(SwitchBlock),
    Case(CaseBlock),
    Default(DefaultBlock),
}

/// Multi-way branch. Cases are tested in order, the first match wins and
/// the default runs only when no case matches.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct SwitchBlock {
    pub value: Node,
    pub cases: Vec<CaseBlock>,
    pub default: Option<DefaultBlock>,
    pub scope: ScopeInfo,
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct CaseBlock {
    /// Always a [`NodeKind::Const`].
    pub value: Node,
    pub body: Body,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct DefaultBlock {
    pub body: Body,
    pub span: Span,
}
