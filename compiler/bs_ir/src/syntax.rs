//! Syntax tree handed over by the parser.
//!
//! The surface language is fully bracketed: every construct is a call
//! `[NAME arg...]` whose arguments are further calls, identifiers or
//! literals. The builder consumes this tree read-only.

use crate::Span;

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum SyntaxKind {
    /// `[name args...]`
    Call { name: String, args: Vec<SyntaxNode> },
    /// A bare word, such as `ELSE`, an operator, or a type annotation.
    Ident(String),
    Int(i64),
    Float(f64),
    String(String),
}

impl SyntaxNode {
    pub fn new(kind: SyntaxKind, span: Span) -> Self {
        SyntaxNode { kind, span }
    }

    pub fn call(name: impl Into<String>, args: Vec<SyntaxNode>, span: Span) -> Self {
        Self::new(
            SyntaxKind::Call {
                name: name.into(),
                args,
            },
            span,
        )
    }

    pub fn ident(text: impl Into<String>, span: Span) -> Self {
        Self::new(SyntaxKind::Ident(text.into()), span)
    }

    /// The text of a bare identifier, `None` for anything else.
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            SyntaxKind::Ident(text) => Some(text),
            _ => None,
        }
    }

    /// `true` for a bare identifier spelled exactly `word`.
    pub fn is_ident(&self, word: &str) -> bool {
        self.as_ident() == Some(word)
    }
}
