//! SSA IR: functions made of basic blocks.
//!
//! - [`SsaFunction`]: parameters, blocks, and the type of every value
//! - [`SsaBlock`]: parameters, instructions, terminator
//! - [`SsaInstr`]: one operation over already-computed values
//! - [`SsaTerminator`]: how control leaves a block
//!
//! Every [`ValueId`] is defined exactly once, either by an instruction or
//! as a block parameter. Block parameters take the place of phi nodes:
//! a `Jump` passes one argument per parameter of its target.

use std::fmt;

use bs_ir::{CompareOp, ConstValue, FuncId, MathOp};
use bs_types::Type;
use smallvec::SmallVec;

/// Operand list; most calls and literals are short.
pub type Operands = SmallVec<[ValueId; 4]>;

// ── ID newtypes ─────────────────────────────────────────────────────

/// A value within one [`SsaFunction`], allocated sequentially from 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ValueId(u32);

impl ValueId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A basic block within one [`SsaFunction`]; `blocks[id.index()]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct BlockId(u32);

impl BlockId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

// ── Instructions ────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum SsaInstr {
    Const {
        dst: ValueId,
        value: ConstValue,
    },
    /// The value of a statement.
    Null {
        dst: ValueId,
    },
    Print {
        value: ValueId,
    },
    Math {
        dst: ValueId,
        op: MathOp,
        lhs: ValueId,
        rhs: ValueId,
    },
    Compare {
        dst: ValueId,
        op: CompareOp,
        lhs: ValueId,
        rhs: ValueId,
    },
    Not {
        dst: ValueId,
        value: ValueId,
    },
    Cast {
        dst: ValueId,
        value: ValueId,
        from: Type,
        to: Type,
    },
    Array {
        dst: ValueId,
        elem: Type,
        values: Operands,
    },
    Index {
        dst: ValueId,
        array: ValueId,
        index: ValueId,
    },
    Append {
        array: ValueId,
        value: ValueId,
    },
    Length {
        dst: ValueId,
        array: ValueId,
    },
    Call {
        dst: ValueId,
        func: FuncId,
        args: Operands,
    },
    ExtensionCall {
        dst: ValueId,
        name: String,
        args: Operands,
    },
}

impl SsaInstr {
    /// The value this instruction defines, if any.
    pub fn defined_value(&self) -> Option<ValueId> {
        match self {
            SsaInstr::Const { dst, .. }
            | SsaInstr::Null { dst }
            | SsaInstr::Math { dst, .. }
            | SsaInstr::Compare { dst, .. }
            | SsaInstr::Not { dst, .. }
            | SsaInstr::Cast { dst, .. }
            | SsaInstr::Array { dst, .. }
            | SsaInstr::Index { dst, .. }
            | SsaInstr::Length { dst, .. }
            | SsaInstr::Call { dst, .. }
            | SsaInstr::ExtensionCall { dst, .. } => Some(*dst),
            SsaInstr::Print { .. } | SsaInstr::Append { .. } => None,
        }
    }

    /// Every value this instruction reads.
    pub fn used_values(&self) -> Operands {
        match self {
            SsaInstr::Const { .. } | SsaInstr::Null { .. } => SmallVec::new(),
            SsaInstr::Print { value }
            | SsaInstr::Not { value, .. }
            | SsaInstr::Cast { value, .. } => smallvec::smallvec![*value],
            SsaInstr::Math { lhs, rhs, .. } | SsaInstr::Compare { lhs, rhs, .. } => {
                smallvec::smallvec![*lhs, *rhs]
            }
            SsaInstr::Index { array, index, .. } => smallvec::smallvec![*array, *index],
            SsaInstr::Append { array, value } => smallvec::smallvec![*array, *value],
            SsaInstr::Length { array, .. } => smallvec::smallvec![*array],
            SsaInstr::Array { values: args, .. }
            | SsaInstr::Call { args, .. }
            | SsaInstr::ExtensionCall { args, .. } => args.clone(),
        }
    }
}

// ── Terminators ─────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum SsaTerminator {
    /// `None` for functions that return nothing.
    Return { value: Option<ValueId> },
    /// Unconditional jump, one argument per parameter of `target`.
    Jump { target: BlockId, args: Operands },
    Branch {
        cond: ValueId,
        then_block: BlockId,
        else_block: BlockId,
    },
    Unreachable,
}

impl SsaTerminator {
    pub fn used_values(&self) -> Operands {
        match self {
            SsaTerminator::Return { value } => value.iter().copied().collect(),
            SsaTerminator::Jump { args, .. } => args.clone(),
            SsaTerminator::Branch { cond, .. } => smallvec::smallvec![*cond],
            SsaTerminator::Unreachable => SmallVec::new(),
        }
    }

    pub fn successors(&self) -> SmallVec<[BlockId; 2]> {
        match self {
            SsaTerminator::Jump { target, .. } => smallvec::smallvec![*target],
            SsaTerminator::Branch {
                then_block,
                else_block,
                ..
            } => smallvec::smallvec![*then_block, *else_block],
            SsaTerminator::Return { .. } | SsaTerminator::Unreachable => SmallVec::new(),
        }
    }
}

// ── Blocks and functions ────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct SsaBlock {
    pub id: BlockId,
    /// Phi-like parameters bound by the arguments of incoming jumps.
    pub params: Vec<ValueId>,
    pub instrs: Vec<SsaInstr>,
    pub terminator: SsaTerminator,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct SsaFunction {
    pub name: String,
    /// `None` for the top-level entry routine.
    pub func: Option<FuncId>,
    /// Bound as the parameters of the entry block.
    pub params: Vec<ValueId>,
    pub ret: Type,
    /// In creation order; the entry block is `blocks[0]`.
    pub blocks: Vec<SsaBlock>,
    /// Indexed by [`ValueId::index`].
    pub value_types: Vec<Type>,
}

impl SsaFunction {
    /// # Panics
    ///
    /// Panics if `value` was not allocated in this function.
    pub fn value_type(&self, value: ValueId) -> &Type {
        match self.value_types.get(value.index()) {
            Some(ty) => ty,
            None => panic!(
                "internal compiler error: value {value} out of bounds in `{}`",
                self.name
            ),
        }
    }

    pub fn block(&self, id: BlockId) -> &SsaBlock {
        &self.blocks[id.index()]
    }

    pub fn entry(&self) -> BlockId {
        BlockId::new(0)
    }

    /// Blocks that jump or branch to `id`.
    pub fn predecessors(&self, id: BlockId) -> Vec<BlockId> {
        self.blocks
            .iter()
            .filter(|block| block.terminator.successors().contains(&id))
            .map(|block| block.id)
            .collect()
    }
}

/// Lowered user functions plus the top-level entry routine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct SsaProgram {
    /// Indexed by [`FuncId::index`].
    pub functions: Vec<SsaFunction>,
    pub main: SsaFunction,
}

// ── Printing ────────────────────────────────────────────────────────

fn write_list(f: &mut fmt::Formatter<'_>, values: &[ValueId]) -> fmt::Result {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{value}")?;
    }
    Ok(())
}

impl fmt::Display for SsaInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SsaInstr::Const { dst, value } => write!(f, "{dst} = const {value}"),
            SsaInstr::Null { dst } => write!(f, "{dst} = null"),
            SsaInstr::Print { value } => write!(f, "print {value}"),
            SsaInstr::Math { dst, op, lhs, rhs } => {
                write!(f, "{dst} = math {lhs} {} {rhs}", op.symbol())
            }
            SsaInstr::Compare { dst, op, lhs, rhs } => {
                write!(f, "{dst} = compare {lhs} {} {rhs}", op.symbol())
            }
            SsaInstr::Not { dst, value } => write!(f, "{dst} = not {value}"),
            SsaInstr::Cast {
                dst,
                value,
                from,
                to,
            } => write!(f, "{dst} = cast {value} {from} -> {to}"),
            SsaInstr::Array { dst, elem, values } => {
                write!(f, "{dst} = array {elem} [")?;
                write_list(f, values)?;
                write!(f, "]")
            }
            SsaInstr::Index { dst, array, index } => write!(f, "{dst} = index {array} {index}"),
            SsaInstr::Append { array, value } => write!(f, "append {array} {value}"),
            SsaInstr::Length { dst, array } => write!(f, "{dst} = length {array}"),
            SsaInstr::Call { dst, func, args } => {
                write!(f, "{dst} = call @{func}(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
            SsaInstr::ExtensionCall { dst, name, args } => {
                write!(f, "{dst} = ext {name}(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for SsaTerminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SsaTerminator::Return { value: Some(value) } => write!(f, "return {value}"),
            SsaTerminator::Return { value: None } => write!(f, "return"),
            SsaTerminator::Jump { target, args } if args.is_empty() => write!(f, "jump {target}"),
            SsaTerminator::Jump { target, args } => {
                write!(f, "jump {target}(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
            SsaTerminator::Branch {
                cond,
                then_block,
                else_block,
            } => write!(f, "branch {cond}, {then_block}, {else_block}"),
            SsaTerminator::Unreachable => write!(f, "unreachable"),
        }
    }
}

impl SsaFunction {
    fn write_typed(&self, f: &mut fmt::Formatter<'_>, values: &[ValueId]) -> fmt::Result {
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}: {}", self.value_type(*value))?;
        }
        Ok(())
    }
}

impl fmt::Display for SsaFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn {}(", self.name)?;
        self.write_typed(f, &self.params)?;
        writeln!(f, ") -> {} {{", self.ret)?;
        for block in &self.blocks {
            write!(f, "{}", block.id)?;
            if !block.params.is_empty() {
                write!(f, "(")?;
                self.write_typed(f, &block.params)?;
                write!(f, ")")?;
            }
            writeln!(f, ":")?;
            for instr in &block.instrs {
                writeln!(f, "  {instr}")?;
            }
            writeln!(f, "  {}", block.terminator)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for SsaProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for func in &self.functions {
            writeln!(f, "{func}")?;
            writeln!(f)?;
        }
        write!(f, "{}", self.main)
    }
}
