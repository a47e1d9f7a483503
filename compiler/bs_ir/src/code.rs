//! Textual rendering of built programs.
//!
//! Produces the bracketed surface form, with block bodies indented by
//! [`CodeConfig::indent`] spaces per level. Changing the indentation never
//! changes anything but leading whitespace.

use crate::{Block, Body, CaseBlock, DefaultBlock, Function, Node, NodeKind, Program};

/// Rendering options.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct CodeConfig {
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for CodeConfig {
    fn default() -> Self {
        CodeConfig { indent: 2 }
    }
}

impl Program {
    /// Render the whole program: functions first, then top-level statements.
    pub fn code(&self, config: &CodeConfig) -> String {
        let printer = CodePrinter {
            program: self,
            config,
        };
        let mut parts: Vec<String> = self.functions.iter().map(|f| printer.function(f)).collect();
        parts.extend(self.body.stmts.iter().map(|stmt| printer.node(stmt)));
        parts.join("\n")
    }

    /// Render a single node of this program.
    pub fn node_code(&self, node: &Node, config: &CodeConfig) -> String {
        CodePrinter {
            program: self,
            config,
        }
        .node(node)
    }
}

struct CodePrinter<'a> {
    program: &'a Program,
    config: &'a CodeConfig,
}

impl CodePrinter<'_> {
    fn function(&self, func: &Function) -> String {
        let mut header = format!("[FUNC {}", func.name);
        for param in &func.params {
            let var = self.program.variable(*param);
            header.push_str(&format!(" [PARAM {} {}]", var.name, var.ty));
        }
        if func.ret != bs_types::Type::Null {
            header.push_str(&format!(" [RETURNS {}]", func.ret));
        }
        self.block(header, &func.body)
    }

    fn node(&self, node: &Node) -> String {
        match &node.kind {
            NodeKind::Const(value) => value.to_string(),
            NodeKind::Var(id) => format!("[VAR {}]", self.program.variable(*id).name),
            NodeKind::Ident(name) => name.clone(),
            NodeKind::Define { var, value, .. } => format!(
                "[DEFINE {} {}]",
                self.program.variable(*var).name,
                self.node(value)
            ),
            NodeKind::Print(value) => format!("[PRINT {}]", self.node(value)),
            NodeKind::Math { op, lhs, rhs } => {
                format!("[MATH {} {} {}]", self.node(lhs), op.symbol(), self.node(rhs))
            }
            NodeKind::Compare { op, lhs, rhs } => {
                format!("[COMPARE {} {} {}]", self.node(lhs), op.symbol(), self.node(rhs))
            }
            NodeKind::Logical { op, lhs, rhs } => {
                format!("[{} {} {}]", op.keyword(), self.node(lhs), self.node(rhs))
            }
            NodeKind::Not(value) => format!("[NOT {}]", self.node(value)),
            NodeKind::Cast(value) => format!("[{} {}]", node.ty, self.node(value)),
            NodeKind::Array { elem, values } => {
                if values.is_empty() {
                    format!("[ARRAY {elem}]")
                } else {
                    format!("[ARRAY {}]", self.args(values))
                }
            }
            NodeKind::Index { array, index } => {
                format!("[INDEX {} {}]", self.node(array), self.node(index))
            }
            NodeKind::Append { array, value } => {
                format!("[APPEND {} {}]", self.node(array), self.node(value))
            }
            NodeKind::Length(array) => format!("[LENGTH {}]", self.node(array)),
            NodeKind::Call { func, args } => {
                self.call(&self.program.function(*func).name, args)
            }
            NodeKind::ExtensionCall { name, args } => self.call(name, args),
            NodeKind::Return(None) => "[RETURN]".to_string(),
            NodeKind::Return(Some(value)) => format!("[RETURN {}]", self.node(value)),
            NodeKind::Block(block) => self.block_node(block),
        }
    }

    fn block_node(&self, block: &Block) -> String {
        match block {
            Block::If {
                cond,
                body,
                else_body,
            } => {
                let mut code = self.open(format!("[IF {}", self.node(cond)), body);
                if let Some(else_body) = else_body {
                    code = self.open(format!("{code}\nELSE"), else_body);
                }
                code.push(']');
                code
            }
            Block::While { cond, body } => self.block(format!("[WHILE {}", self.node(cond)), body),
            Block::Switch(switch) => {
                let mut code = format!("[SWITCH {}", self.node(&switch.value));
                for case in &switch.cases {
                    code.push('\n');
                    code.push_str(&self.indent(&self.case(case)));
                }
                if let Some(default) = &switch.default {
                    code.push('\n');
                    code.push_str(&self.indent(&self.default(default)));
                }
                code.push(']');
                code
            }
            Block::Case(case) => self.case(case),
            Block::Default(default) => self.default(default),
        }
    }

    fn case(&self, case: &CaseBlock) -> String {
        self.block(format!("[CASE {}", self.node(&case.value)), &case.body)
    }

    fn default(&self, default: &DefaultBlock) -> String {
        self.block("[DEFAULT".to_string(), &default.body)
    }

    fn call(&self, name: &str, args: &[Node]) -> String {
        if args.is_empty() {
            format!("[{name}]")
        } else {
            format!("[{name} {}]", self.args(args))
        }
    }

    fn args(&self, nodes: &[Node]) -> String {
        nodes
            .iter()
            .map(|n| self.node(n))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Header, indented body, closing bracket.
    fn block(&self, header: String, body: &Body) -> String {
        let mut code = self.open(header, body);
        code.push(']');
        code
    }

    /// Header followed by the indented body, left open.
    fn open(&self, mut header: String, body: &Body) -> String {
        for stmt in &body.stmts {
            header.push('\n');
            header.push_str(&self.indent(&self.node(stmt)));
        }
        header
    }

    fn indent(&self, code: &str) -> String {
        let pad = " ".repeat(self.config.indent);
        code.lines()
            .map(|line| format!("{pad}{line}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
