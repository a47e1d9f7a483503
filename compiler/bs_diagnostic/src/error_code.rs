use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E1xxx: Structure errors (arity, keywords, annotations)
/// - E2xxx: Type errors
/// - E3xxx: Scope errors
/// - E4xxx: Native code generation errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Structure Errors (E1xxx)
    /// Wrong number of arguments
    E1001,
    /// Unknown function or keyword
    E1002,
    /// Expected identifier
    E1003,
    /// Invalid type annotation
    E1004,
    /// `ELSE` used more than once
    E1005,
    /// More than one `DEFAULT` in a switch
    E1006,
    /// Switch body entry is not a `CASE` or `DEFAULT`
    E1007,
    /// Bare identifier used as a statement
    E1008,
    /// Unknown operator
    E1009,
    /// Function defined twice
    E1010,

    // Type Errors (E2xxx)
    /// Type mismatch
    E2001,
    /// Condition is not a boolean
    E2002,
    /// Value is not hashable
    E2003,
    /// Case value is not a constant
    E2004,
    /// Statement used where a value is required
    E2005,
    /// Invalid conversion
    E2006,

    // Scope Errors (E3xxx)
    /// Unknown variable
    E3001,
    /// `CASE` or `DEFAULT` outside a switch
    E3002,
    /// `RETURN` outside a function
    E3003,
    /// `FUNC` below the top level
    E3004,
    /// Function with a return type can end without `RETURN`
    E3005,

    // Codegen Errors (E4xxx)
    /// Type has no native representation
    E4001,
    /// `WHILE` condition is not a boolean
    E4002,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E1007,
        ErrorCode::E1008,
        ErrorCode::E1009,
        ErrorCode::E1010,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E3005,
        ErrorCode::E4001,
        ErrorCode::E4002,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E1010 => "E1010",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
        }
    }

    pub fn is_structure_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    pub fn is_type_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    pub fn is_scope_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }

    pub fn is_codegen_error(&self) -> bool {
        self.as_str().starts_with("E4")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E2001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
