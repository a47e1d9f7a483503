//! Type system for B#.
//!
//! Types are plain structural values: there is no interning and no identity
//! beyond shape. Two relations are provided:
//!
//! - `==` (derived `PartialEq`): exact structural identity.
//! - [`Type::equal`]: the compatibility relation used by type checking.
//!   [`Type::Any`] matches everything in either position, and a
//!   [`Type::Union`] matches a type when any of its alternatives does.
//!   Containers compare element-wise and recursively.
//!
//! `Type::equal` is symmetric for every pair of types, so call sites do not
//! need to care which side is the "expected" one.

mod parse;

use std::fmt;

pub use parse::ParseTypeError;

/// The shape of a type, ignoring any type parameters.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    Int,
    Float,
    Bool,
    String,
    Array,
    Map,
    Null,
    Any,
    Variadic,
    Ident,
    Union,
}

/// A B# type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Type {
    Int,
    Float,
    Bool,
    String,
    /// Growable array of a single element type.
    Array(Box<Type>),
    Map {
        key: Box<Type>,
        val: Box<Type>,
    },
    /// The type of statements; never a value.
    Null,
    /// Wildcard, compatible with every type.
    Any,
    /// Marks a repeated trailing parameter in an extension signature.
    Variadic,
    /// A bare identifier argument (keyword operands such as operators).
    Ident,
    /// Any one of the listed alternatives.
    Union(Vec<Type>),
}

impl Type {
    /// Convenience constructor for `[]elem`.
    pub fn array(elem: Type) -> Self {
        Type::Array(Box::new(elem))
    }

    /// Convenience constructor for `{key, val}`.
    pub fn map(key: Type, val: Type) -> Self {
        Type::Map {
            key: Box::new(key),
            val: Box::new(val),
        }
    }

    /// Types a switch value or case constant may have.
    pub fn hashable() -> Self {
        Type::Union(vec![Type::Int, Type::String, Type::Bool])
    }

    /// Types `PRINT` accepts.
    pub fn printable() -> Self {
        Type::Union(vec![Type::Int, Type::Float, Type::String, Type::Bool])
    }

    pub fn basic_kind(&self) -> Kind {
        match self {
            Type::Int => Kind::Int,
            Type::Float => Kind::Float,
            Type::Bool => Kind::Bool,
            Type::String => Kind::String,
            Type::Array(_) => Kind::Array,
            Type::Map { .. } => Kind::Map,
            Type::Null => Kind::Null,
            Type::Any => Kind::Any,
            Type::Variadic => Kind::Variadic,
            Type::Ident => Kind::Ident,
            Type::Union(_) => Kind::Union,
        }
    }

    /// Type compatibility.
    ///
    /// `Any` on either side matches. A union matches when at least one of its
    /// alternatives matches the other side. Arrays and maps match when their
    /// parameters match recursively; every other type matches only its own
    /// kind.
    pub fn equal(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Any, _) | (_, Type::Any) => true,
            (Type::Union(alts), _) => alts.iter().any(|alt| alt.equal(other)),
            (_, Type::Union(alts)) => alts.iter().any(|alt| self.equal(alt)),
            (Type::Array(a), Type::Array(b)) => a.equal(b),
            (Type::Map { key: k1, val: v1 }, Type::Map { key: k2, val: v2 }) => {
                k1.equal(k2) && v1.equal(v2)
            }
            (Type::Array(_) | Type::Map { .. }, _) | (_, Type::Array(_) | Type::Map { .. }) => {
                false
            }
            _ => self.basic_kind() == other.basic_kind(),
        }
    }

    /// Arrays and maps: values whose storage is allocated at runtime.
    pub fn is_container(&self) -> bool {
        matches!(self, Type::Array(_) | Type::Map { .. })
    }

    /// Element type of an array, `None` for anything else.
    pub fn elem(&self) -> Option<&Type> {
        match self {
            Type::Array(elem) => Some(elem),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "INT"),
            Type::Float => write!(f, "FLOAT"),
            Type::Bool => write!(f, "BOOL"),
            Type::String => write!(f, "STRING"),
            Type::Null => write!(f, "NULL"),
            Type::Any => write!(f, "ANY"),
            Type::Variadic => write!(f, "VARIADIC"),
            Type::Ident => write!(f, "IDENT"),
            Type::Array(elem) => write!(f, "[]{elem}"),
            Type::Map { key, val } => write!(f, "{{{key}, {val}}}"),
            Type::Union(alts) => {
                write!(f, "(")?;
                for (i, alt) in alts.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{alt}")?;
                }
                write!(f, ")")
            }
        }
    }
}
