//! Incremental construction of an [`SsaFunction`].

use bs_ir::FuncId;
use bs_types::Type;

use crate::ir::{BlockId, Operands, SsaBlock, SsaFunction, SsaInstr, SsaTerminator, ValueId};

struct BlockBuilder {
    id: BlockId,
    params: Vec<ValueId>,
    instrs: Vec<SsaInstr>,
    terminator: Option<SsaTerminator>,
}

impl BlockBuilder {
    fn new(id: BlockId) -> Self {
        Self {
            id,
            params: Vec::new(),
            instrs: Vec::new(),
            terminator: None,
        }
    }
}

/// Position at a block, emit instructions, terminate.
///
/// Consumed by [`finish`](SsaBuilder::finish).
pub struct SsaBuilder {
    blocks: Vec<BlockBuilder>,
    current: BlockId,
    value_types: Vec<Type>,
}

impl Default for SsaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SsaBuilder {
    /// A builder with the entry block allocated and selected.
    pub fn new() -> Self {
        Self {
            blocks: vec![BlockBuilder::new(BlockId::new(0))],
            current: BlockId::new(0),
            value_types: Vec::new(),
        }
    }

    // Blocks

    pub fn new_block(&mut self) -> BlockId {
        let raw = u32::try_from(self.blocks.len())
            .unwrap_or_else(|_| panic!("internal compiler error: block count exceeds u32::MAX"));
        let id = BlockId::new(raw);
        self.blocks.push(BlockBuilder::new(id));
        id
    }

    pub fn position_at(&mut self, block: BlockId) {
        debug_assert!(
            block.index() < self.blocks.len(),
            "{block} out of bounds (have {} blocks)",
            self.blocks.len(),
        );
        self.current = block;
    }

    #[inline]
    pub fn current_block(&self) -> BlockId {
        self.current
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.blocks[self.current.index()].terminator.is_some()
    }

    // Values

    pub fn fresh_value(&mut self, ty: Type) -> ValueId {
        let raw = u32::try_from(self.value_types.len())
            .unwrap_or_else(|_| panic!("internal compiler error: value count exceeds u32::MAX"));
        self.value_types.push(ty);
        ValueId::new(raw)
    }

    pub fn value_type(&self, value: ValueId) -> &Type {
        &self.value_types[value.index()]
    }

    pub fn add_block_param(&mut self, block: BlockId, ty: Type) -> ValueId {
        let value = self.fresh_value(ty);
        self.blocks[block.index()].params.push(value);
        value
    }

    // Instructions

    /// Allocate a `ty` value and emit the instruction `make` builds for it.
    pub fn emit_value(&mut self, ty: Type, make: impl FnOnce(ValueId) -> SsaInstr) -> ValueId {
        let dst = self.fresh_value(ty);
        self.emit(make(dst));
        dst
    }

    /// Emit an instruction that defines no value.
    pub fn emit(&mut self, instr: SsaInstr) {
        let block = &mut self.blocks[self.current.index()];
        debug_assert!(
            block.terminator.is_none(),
            "emitting into terminated block {}",
            block.id
        );
        block.instrs.push(instr);
    }

    pub fn emit_null(&mut self) -> ValueId {
        self.emit_value(Type::Null, |dst| SsaInstr::Null { dst })
    }

    // Terminators

    fn terminate(&mut self, terminator: SsaTerminator) {
        let block = &mut self.blocks[self.current.index()];
        debug_assert!(
            block.terminator.is_none(),
            "block {} already terminated",
            block.id
        );
        block.terminator = Some(terminator);
    }

    pub fn terminate_return(&mut self, value: Option<ValueId>) {
        self.terminate(SsaTerminator::Return { value });
    }

    pub fn terminate_jump(&mut self, target: BlockId, args: Operands) {
        debug_assert_eq!(
            args.len(),
            self.blocks[target.index()].params.len(),
            "jump to {target} with wrong argument count",
        );
        self.terminate(SsaTerminator::Jump { target, args });
    }

    pub fn terminate_branch(&mut self, cond: ValueId, then_block: BlockId, else_block: BlockId) {
        self.terminate(SsaTerminator::Branch {
            cond,
            then_block,
            else_block,
        });
    }

    pub fn terminate_unreachable(&mut self) {
        self.terminate(SsaTerminator::Unreachable);
    }

    /// Produce the function. Blocks left without a terminator become
    /// `Unreachable`.
    pub fn finish(
        self,
        name: String,
        func: Option<FuncId>,
        params: Vec<ValueId>,
        ret: Type,
    ) -> SsaFunction {
        let blocks = self
            .blocks
            .into_iter()
            .map(|block| {
                let terminator = block.terminator.unwrap_or_else(|| {
                    tracing::warn!(
                        function = %name,
                        block = block.id.raw(),
                        "unterminated block in SSA, adding Unreachable"
                    );
                    SsaTerminator::Unreachable
                });
                SsaBlock {
                    id: block.id,
                    params: block.params,
                    instrs: block.instrs,
                    terminator,
                }
            })
            .collect();

        SsaFunction {
            name,
            func,
            params,
            ret,
            blocks,
            value_types: self.value_types,
        }
    }
}
