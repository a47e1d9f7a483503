//! IF, WHILE, SWITCH and short-circuit AND / OR.
//!
//! These create multiple blocks. Branches start from a snapshot of the
//! environment; at the merge block every variable that was visible before
//! the branch and is bound to different values on different incoming
//! edges gets a block parameter. Variables declared inside a branch go
//! out of scope at the merge.

use bs_ir::{Body, LogicalOp, Node, SwitchBlock, VarId};
use bs_types::Type;
use smallvec::smallvec;

use crate::ir::{BlockId, Operands, SsaInstr, ValueId};

use super::{Env, SsaLowerer};

/// A branch that fell through to the merge point.
struct BranchExit {
    block: BlockId,
    env: Env,
}

/// Visible variables in id order.
fn sorted_vars(env: &Env) -> Vec<VarId> {
    let mut vars: Vec<VarId> = env.keys().copied().collect();
    vars.sort_unstable();
    vars
}

impl SsaLowerer<'_> {
    /// Lower `body` from `block` with `env`; `None` if it terminated.
    fn lower_branch(&mut self, block: BlockId, env: Env, body: &Body) -> Option<BranchExit> {
        self.builder.position_at(block);
        self.env = env;
        self.lower_stmts(body);
        if self.builder.is_terminated() {
            return None;
        }
        Some(BranchExit {
            block: self.builder.current_block(),
            env: std::mem::take(&mut self.env),
        })
    }

    /// Whether any exit rebinds a variable visible in `pre`.
    fn any_changed(pre: &Env, exits: &[BranchExit]) -> bool {
        pre.iter()
            .any(|(var, value)| exits.iter().any(|exit| exit.env.get(var) != Some(value)))
    }

    /// Jump every exit to `merge`, adding a parameter for each variable
    /// whose value differs between exits, and continue at `merge`.
    fn merge_exits(&mut self, merge: BlockId, pre: Env, exits: &[BranchExit]) {
        let mut merged = pre;
        let mut args: Vec<Operands> = vec![Operands::new(); exits.len()];
        for var in sorted_vars(&merged) {
            let incoming: Vec<ValueId> = exits
                .iter()
                .map(|exit| exit.env.get(&var).copied().unwrap_or(merged[&var]))
                .collect();
            let Some(&first) = incoming.first() else {
                continue;
            };
            if incoming.iter().all(|&value| value == first) {
                merged.insert(var, first);
                continue;
            }
            let ty = self.builder.value_type(first).clone();
            let param = self.builder.add_block_param(merge, ty);
            for (arg, value) in args.iter_mut().zip(incoming) {
                arg.push(value);
            }
            merged.insert(var, param);
        }

        for (exit, arg) in exits.iter().zip(args) {
            self.builder.position_at(exit.block);
            self.builder.terminate_jump(merge, arg);
        }
        self.builder.position_at(merge);
        self.env = merged;
    }

    /// `IF`: condition in the current block, then a then-block, an
    /// else-block when there is an `ELSE`, and a continuation block.
    pub(super) fn lower_if(&mut self, cond: &Node, body: &Body, else_body: Option<&Body>) -> ValueId {
        let cond = self.lower_node(cond);
        let entry = self.builder.current_block();
        let pre = self.env.clone();

        let then_block = self.builder.new_block();
        let mut exits: Vec<BranchExit> = Vec::with_capacity(2);
        exits.extend(self.lower_branch(then_block, pre.clone(), body));

        let else_block = match else_body {
            Some(else_body) => {
                let else_block = self.builder.new_block();
                exits.extend(self.lower_branch(else_block, pre.clone(), else_body));
                Some(else_block)
            }
            // The false edge must pass the old values of changed variables.
            None if Self::any_changed(&pre, &exits) => {
                let edge = self.builder.new_block();
                exits.push(BranchExit {
                    block: edge,
                    env: pre.clone(),
                });
                Some(edge)
            }
            None => None,
        };
        let merge = self.builder.new_block();

        self.builder.position_at(entry);
        self.builder
            .terminate_branch(cond, then_block, else_block.unwrap_or(merge));

        self.merge_exits(merge, pre, &exits);
        self.builder.emit_null()
    }

    /// `WHILE`: a header re-evaluating the condition with every visible
    /// variable as a parameter, a body looping back, and an exit block.
    pub(super) fn lower_while(&mut self, cond: &Node, body: &Body) -> ValueId {
        let pre = self.env.clone();
        let vars = sorted_vars(&pre);

        let header = self.builder.new_block();
        let entry_args: Operands = vars.iter().map(|var| pre[var]).collect();
        let mut header_env = Env::default();
        for &var in &vars {
            let ty = self.builder.value_type(pre[&var]).clone();
            header_env.insert(var, self.builder.add_block_param(header, ty));
        }
        self.builder.terminate_jump(header, entry_args);

        self.builder.position_at(header);
        self.env = header_env.clone();
        let cond = self.lower_node(cond);
        let body_block = self.builder.new_block();
        let exit = self.builder.new_block();
        self.builder.terminate_branch(cond, body_block, exit);

        if let Some(latch) = self.lower_branch(body_block, header_env.clone(), body) {
            let args: Operands = vars
                .iter()
                .map(|var| latch.env.get(var).copied().unwrap_or(header_env[var]))
                .collect();
            self.builder.position_at(latch.block);
            self.builder.terminate_jump(header, args);
        }

        self.builder.position_at(exit);
        self.env = header_env;
        self.builder.emit_null()
    }

    /// `SWITCH`: an ordered chain of equality tests. The first matching
    /// case runs; the default (or nothing) runs at the end of the chain.
    pub(super) fn lower_switch(&mut self, switch: &SwitchBlock) -> ValueId {
        let value = self.lower_node(&switch.value);
        let pre = self.env.clone();
        let mut exits = Vec::with_capacity(switch.cases.len() + 1);

        for case in &switch.cases {
            let expected = self.lower_node(&case.value);
            let matched = self.builder.emit_value(Type::Bool, |dst| SsaInstr::Compare {
                dst,
                op: bs_ir::CompareOp::Eq,
                lhs: value,
                rhs: expected,
            });
            let case_block = self.builder.new_block();
            let next = self.builder.new_block();
            self.builder.terminate_branch(matched, case_block, next);

            exits.extend(self.lower_branch(case_block, pre.clone(), &case.body));
            self.builder.position_at(next);
            self.env = pre.clone();
        }

        let fallthrough = self.builder.current_block();
        match &switch.default {
            Some(default) => exits.extend(self.lower_branch(fallthrough, pre.clone(), &default.body)),
            None => exits.push(BranchExit {
                block: fallthrough,
                env: pre.clone(),
            }),
        }

        let merge = self.builder.new_block();
        self.merge_exits(merge, pre, &exits);
        self.builder.emit_null()
    }

    /// `AND` / `OR`, evaluating the right operand only when needed.
    pub(super) fn lower_logical(&mut self, op: LogicalOp, lhs: &Node, rhs: &Node) -> ValueId {
        let lhs = self.lower_node(lhs);
        let rhs_block = self.builder.new_block();
        let short_block = self.builder.new_block();
        let merge = self.builder.new_block();
        let result = self.builder.add_block_param(merge, Type::Bool);

        match op {
            LogicalOp::And => self.builder.terminate_branch(lhs, rhs_block, short_block),
            LogicalOp::Or => self.builder.terminate_branch(lhs, short_block, rhs_block),
        }

        self.builder.position_at(short_block);
        self.builder.terminate_jump(merge, smallvec![lhs]);

        self.builder.position_at(rhs_block);
        let rhs = self.lower_node(rhs);
        self.builder.terminate_jump(merge, smallvec![rhs]);

        self.builder.position_at(merge);
        result
    }
}
