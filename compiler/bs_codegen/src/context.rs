//! Code generation context and state.
//!
//! [`CodegenContext`] holds everything shared while emitting one program:
//! the output buffer of the function being emitted, the synthesized
//! helpers, the temporary-name counters and the ownership stack.

use bs_ir::{FuncId, Node, Program, VarId};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::analysis::OwnershipStack;
use crate::c::types::CTypeMapper;
use crate::CodegenError;

/// Formatting options for generated C.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodegenConfig {
    /// One level of indentation.
    pub indent: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        CodegenConfig {
            indent: "    ".to_string(),
        }
    }
}

pub struct CodegenContext<'a> {
    pub program: &'a Program,
    pub config: CodegenConfig,
    /// Releases owed at the current code position.
    pub ownership: OwnershipStack,
    /// Current indentation level.
    indent: usize,
    output: String,
    /// Definitions of synthesized helpers, in dependency order.
    helpers: String,
    generated_helpers: FxHashSet<String>,
    /// `extern` prototypes of the extensions called so far.
    externs: String,
    declared_externs: FxHashSet<String>,
    /// Next number per temporary purpose (`arr`, `cnst`, ...).
    temp_counters: FxHashMap<&'static str, u32>,
}

impl<'a> CodegenContext<'a> {
    pub fn new(program: &'a Program, config: CodegenConfig) -> Self {
        Self {
            program,
            config,
            ownership: OwnershipStack::new(),
            indent: 0,
            output: String::with_capacity(4096),
            helpers: String::new(),
            generated_helpers: FxHashSet::default(),
            externs: String::new(),
            declared_externs: FxHashSet::default(),
            temp_counters: FxHashMap::default(),
        }
    }

    /// C name of a variable: `bsv_<id>_<name>`. The id comes first so no
    /// user name can make two variables collide.
    pub fn var_name(&self, id: VarId) -> String {
        let var = self.program.variable(id);
        format!("bsv_{}_{}", id.raw(), mangle(&var.name))
    }

    /// C name of a user function: `bsf_<id>_<name>`.
    pub fn func_name(&self, id: FuncId) -> String {
        let func = self.program.function(id);
        format!("bsf_{}_{}", id.raw(), mangle(&func.name))
    }

    /// A fresh temporary `bst_<purpose>_<n>`, numbered per purpose.
    pub fn fresh_temp(&mut self, purpose: &'static str) -> String {
        let counter = self.temp_counters.entry(purpose).or_insert(0);
        let n = *counter;
        *counter += 1;
        format!("bst_{purpose}_{n}")
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent called with zero indent");
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str(&self.config.indent);
        }
    }

    /// Write a line with indentation and newline.
    pub fn writeln(&mut self, s: &str) {
        self.write_indent();
        self.output.push_str(s);
        self.output.push('\n');
    }

    pub fn newline(&mut self) {
        self.output.push('\n');
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    pub fn has_helper(&self, name: &str) -> bool {
        self.generated_helpers.contains(name)
    }

    /// Emit a helper definition with `body`, which writes through `self`
    /// at indentation zero. Helpers it depends on must already exist.
    pub fn define_helper(&mut self, name: &str, body: impl FnOnce(&mut Self)) {
        self.generated_helpers.insert(name.to_string());
        let saved_output = std::mem::take(&mut self.output);
        let saved_indent = std::mem::replace(&mut self.indent, 0);

        body(self);

        let code = std::mem::replace(&mut self.output, saved_output);
        self.indent = saved_indent;
        self.helpers.push_str(&code);
        self.helpers.push('\n');
    }

    pub fn take_helpers(&mut self) -> String {
        std::mem::take(&mut self.helpers)
    }

    /// Record the `extern` prototype of extension `name` on its first
    /// call, typed after that call's arguments and result.
    pub fn declare_extern(
        &mut self,
        name: &str,
        call: &Node,
        args: &[Node],
    ) -> Result<(), CodegenError> {
        if self.declared_externs.contains(name) {
            return Ok(());
        }
        let ret = CTypeMapper::map_type(&call.ty, call.span)?;
        let params = args
            .iter()
            .map(|arg| CTypeMapper::map_type(&arg.ty, arg.span))
            .collect::<Result<Vec<_>, _>>()?;
        let params = if params.is_empty() {
            "void".to_string()
        } else {
            params.join(", ")
        };
        self.externs
            .push_str(&format!("extern {ret} {name}({params});\n"));
        self.declared_externs.insert(name.to_string());
        Ok(())
    }

    pub fn take_externs(&mut self) -> String {
        std::mem::take(&mut self.externs)
    }
}

/// Keep the characters C allows in identifiers.
pub fn mangle(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
