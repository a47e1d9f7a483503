//! B# types in C.

use bs_ir::Span;
use bs_types::Type;

use crate::CodegenError;

pub struct CTypeMapper;

impl CTypeMapper {
    /// The C type of values of `ty`; `span` locates the error.
    pub fn map_type(ty: &Type, span: Span) -> Result<&'static str, CodegenError> {
        match ty {
            Type::Int => Ok("long long"),
            Type::Float => Ok("double"),
            Type::Bool => Ok("bool"),
            Type::String | Type::Ident => Ok("char*"),
            Type::Array(_) => Ok("array*"),
            Type::Null => Ok("void"),
            Type::Map { .. } | Type::Any | Type::Variadic | Type::Union(_) => {
                Err(CodegenError::unsupported_type(ty, span))
            }
        }
    }

    /// Short tag naming a type shape in helper names: `aai` is `[][]INT`.
    pub fn type_tag(ty: &Type) -> String {
        match ty {
            Type::Int => "i".to_string(),
            Type::Float => "f".to_string(),
            Type::String => "s".to_string(),
            Type::Bool => "b".to_string(),
            Type::Array(elem) => format!("a{}", Self::type_tag(elem)),
            Type::Map { key, val } => format!("m{}{}", Self::type_tag(key), Self::type_tag(val)),
            _ => "u".to_string(),
        }
    }
}
