//! Parsing of written type annotations.
//!
//! Accepts the forms a program can spell: `INT`, `FLOAT`, `BOOL`, `STRING`,
//! `[]T` and `{K, V}`. Whitespace around components is ignored.

use std::fmt;
use std::str::FromStr;

use crate::Type;

/// A type annotation that does not name a type.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ParseTypeError {
    pub text: String,
}

impl fmt::Display for ParseTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown type `{}`", self.text)
    }
}

impl std::error::Error for ParseTypeError {}

impl FromStr for Type {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTypeError { text: s.to_string() };
        let (ty, rest) = parse_type(s).ok_or_else(err)?;
        if rest.trim().is_empty() {
            Ok(ty)
        } else {
            Err(err())
        }
    }
}

/// Parse one type from the front of `s`, returning it and the unparsed tail.
fn parse_type(s: &str) -> Option<(Type, &str)> {
    let s = s.trim_start();
    if let Some(rest) = s.strip_prefix("[]") {
        let (elem, rest) = parse_type(rest)?;
        return Some((Type::array(elem), rest));
    }
    if let Some(rest) = s.strip_prefix('{') {
        let (key, rest) = parse_type(rest)?;
        let rest = rest.trim_start().strip_prefix(',')?;
        let (val, rest) = parse_type(rest)?;
        let rest = rest.trim_start().strip_prefix('}')?;
        return Some((Type::map(key, val), rest));
    }

    let end = s
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(s.len());
    let (word, rest) = s.split_at(end);
    let ty = match word {
        "INT" => Type::Int,
        "FLOAT" => Type::Float,
        "BOOL" => Type::Bool,
        "STRING" => Type::String,
        _ => return None,
    };
    Some((ty, rest))
}
