//! Typed IR → SSA.
//!
//! Each user function and the top-level body are lowered independently.
//! Variables are renamed: `DEFINE` rebinds a [`VarId`] to the value it
//! computed and `VAR` reads the current binding. Where control flow
//! merges, variables whose binding differs between incoming edges become
//! parameters of the merge block (see [`control_flow`]).

mod builder;
mod control_flow;

use bs_ir::{Block, Body, Function, Node, NodeKind, Program, VarId};
use bs_types::Type;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::ir::{Operands, SsaFunction, SsaInstr, SsaProgram, ValueId};

pub use builder::SsaBuilder;

/// Current SSA value of every variable in scope.
pub(crate) type Env = FxHashMap<VarId, ValueId>;

/// Lower a built program.
#[tracing::instrument(level = "debug", skip_all, fields(functions = program.functions.len()))]
pub fn lower_program(program: &Program) -> SsaProgram {
    let functions = program
        .functions
        .iter()
        .map(|func| lower_function(program, func))
        .collect();
    let main = lower_body(program, "main", &program.body);
    SsaProgram { functions, main }
}

fn lower_function(program: &Program, func: &Function) -> SsaFunction {
    let mut lowerer = SsaLowerer::new(program);
    let params = func
        .params
        .iter()
        .map(|&param| {
            let entry = lowerer.builder.current_block();
            let ty = program.variable(param).ty.clone();
            let value = lowerer.builder.add_block_param(entry, ty);
            lowerer.env.insert(param, value);
            value
        })
        .collect();

    lowerer.lower_stmts(&func.body);
    lowerer.finish(func.name.clone(), Some(func.id), params, func.ret.clone())
}

fn lower_body(program: &Program, name: &str, body: &Body) -> SsaFunction {
    let mut lowerer = SsaLowerer::new(program);
    lowerer.lower_stmts(body);
    lowerer.finish(name.to_string(), None, Vec::new(), Type::Null)
}

pub(crate) struct SsaLowerer<'a> {
    program: &'a Program,
    builder: SsaBuilder,
    env: Env,
}

impl<'a> SsaLowerer<'a> {
    fn new(program: &'a Program) -> Self {
        SsaLowerer {
            program,
            builder: SsaBuilder::new(),
            env: Env::default(),
        }
    }

    fn finish(
        mut self,
        name: String,
        func: Option<bs_ir::FuncId>,
        params: Vec<ValueId>,
        ret: Type,
    ) -> SsaFunction {
        if !self.builder.is_terminated() {
            if ret == Type::Null {
                self.builder.terminate_return(None);
            } else {
                self.builder.terminate_unreachable();
            }
        }
        let function = self.builder.finish(name, func, params, ret);
        debug!(
            name = %function.name,
            blocks = function.blocks.len(),
            values = function.value_types.len(),
            "lowered function"
        );
        function
    }

    /// Lower statements until one terminates the block.
    pub(crate) fn lower_stmts(&mut self, body: &Body) {
        for stmt in &body.stmts {
            if self.builder.is_terminated() {
                break;
            }
            self.lower_node(stmt);
        }
    }

    fn lower_operands(&mut self, nodes: &[Node]) -> Operands {
        nodes.iter().map(|node| self.lower_node(node)).collect()
    }

    /// Lower one node; statements yield a `null` value.
    pub(crate) fn lower_node(&mut self, node: &Node) -> ValueId {
        match &node.kind {
            NodeKind::Const(value) => {
                let value = value.clone();
                self.builder
                    .emit_value(node.ty.clone(), |dst| SsaInstr::Const { dst, value })
            }
            NodeKind::Ident(word) => {
                let value = bs_ir::ConstValue::String(word.clone());
                self.builder
                    .emit_value(Type::String, |dst| SsaInstr::Const { dst, value })
            }
            NodeKind::Var(var) => self.read_var(*var),
            NodeKind::Define { var, value, .. } => {
                let value = self.lower_node(value);
                self.env.insert(*var, value);
                self.builder.emit_null()
            }
            NodeKind::Print(value) => {
                let value = self.lower_node(value);
                self.builder.emit(SsaInstr::Print { value });
                self.builder.emit_null()
            }
            NodeKind::Math { op, lhs, rhs } => {
                let (op, lhs, rhs) = (*op, self.lower_node(lhs), self.lower_node(rhs));
                self.builder.emit_value(node.ty.clone(), |dst| SsaInstr::Math {
                    dst,
                    op,
                    lhs,
                    rhs,
                })
            }
            NodeKind::Compare { op, lhs, rhs } => {
                let (op, lhs, rhs) = (*op, self.lower_node(lhs), self.lower_node(rhs));
                self.builder.emit_value(Type::Bool, |dst| SsaInstr::Compare {
                    dst,
                    op,
                    lhs,
                    rhs,
                })
            }
            NodeKind::Logical { op, lhs, rhs } => self.lower_logical(*op, lhs, rhs),
            NodeKind::Not(value) => {
                let value = self.lower_node(value);
                self.builder
                    .emit_value(Type::Bool, |dst| SsaInstr::Not { dst, value })
            }
            NodeKind::Cast(inner) => {
                let from = inner.ty.clone();
                let to = node.ty.clone();
                let value = self.lower_node(inner);
                self.builder.emit_value(to.clone(), |dst| SsaInstr::Cast {
                    dst,
                    value,
                    from,
                    to,
                })
            }
            NodeKind::Array { elem, values } => {
                let values = self.lower_operands(values);
                let elem = elem.clone();
                self.builder
                    .emit_value(node.ty.clone(), |dst| SsaInstr::Array { dst, elem, values })
            }
            NodeKind::Index { array, index } => {
                let array = self.lower_node(array);
                let index = self.lower_node(index);
                self.builder
                    .emit_value(node.ty.clone(), |dst| SsaInstr::Index { dst, array, index })
            }
            NodeKind::Append { array, value } => {
                let array = self.lower_node(array);
                let value = self.lower_node(value);
                self.builder.emit(SsaInstr::Append { array, value });
                self.builder.emit_null()
            }
            NodeKind::Length(array) => {
                let array = self.lower_node(array);
                self.builder
                    .emit_value(Type::Int, |dst| SsaInstr::Length { dst, array })
            }
            NodeKind::Call { func, args } => {
                let args = self.lower_operands(args);
                let func = *func;
                self.builder
                    .emit_value(node.ty.clone(), |dst| SsaInstr::Call { dst, func, args })
            }
            NodeKind::ExtensionCall { name, args } => {
                let args = self.lower_operands(args);
                let name = name.clone();
                self.builder.emit_value(node.ty.clone(), |dst| {
                    SsaInstr::ExtensionCall { dst, name, args }
                })
            }
            NodeKind::Return(value) => {
                let value = value.as_deref().map(|value| self.lower_node(value));
                let null = self.builder.emit_null();
                self.builder.terminate_return(value);
                null
            }
            NodeKind::Block(block) => match block.as_ref() {
                Block::If {
                    cond,
                    body,
                    else_body,
                } => self.lower_if(cond, body, else_body.as_ref()),
                Block::While { cond, body } => self.lower_while(cond, body),
                Block::Switch(switch) => self.lower_switch(switch),
                Block::Case(_) | Block::Default(_) => panic!(
                    "internal compiler error: CASE/DEFAULT outside SWITCH reached SSA lowering"
                ),
            },
        }
    }

    fn read_var(&self, var: VarId) -> ValueId {
        match self.env.get(&var) {
            Some(&value) => value,
            None => panic!(
                "internal compiler error: variable `{}` has no SSA binding",
                self.program.variable(var).name
            ),
        }
    }
}
