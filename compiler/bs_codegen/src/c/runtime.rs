//! C runtime prologue.
//!
//! Every generated unit starts with the runtime its code calls:
//!
//! - **Dynamic arrays**: `array_new`, `array_get` (bounds-checked),
//!   `array_append`, `array_length`, `array_free`, `array_copy`
//! - **String pool**: strings created at run time are kept in a pool and
//!   released once by `bs_strings_free` when `main` returns

use crate::context::CodegenContext;

pub struct CRuntime;

impl CRuntime {
    pub fn emit(ctx: &mut CodegenContext<'_>) {
        ctx.writeln("#include <stdbool.h>");
        ctx.writeln("#include <stdio.h>");
        ctx.writeln("#include <stdlib.h>");
        ctx.writeln("#include <string.h>");
        ctx.writeln("#include <math.h>");
        ctx.newline();

        Self::emit_array(ctx);
        Self::emit_strings(ctx);
    }

    fn emit_array(ctx: &mut CodegenContext<'_>) {
        ctx.writeln("typedef struct array {");
        ctx.indent();
        ctx.writeln("size_t elem_size;");
        ctx.writeln("size_t len;");
        ctx.writeln("size_t cap;");
        ctx.writeln("char* data;");
        ctx.dedent();
        ctx.writeln("} array;");
        ctx.newline();

        ctx.writeln("array* array_new(size_t elem_size, size_t cap) {");
        ctx.indent();
        ctx.writeln("array* arr = malloc(sizeof(array));");
        ctx.writeln("if (cap == 0) {");
        ctx.indent();
        ctx.writeln("cap = 1;");
        ctx.dedent();
        ctx.writeln("}");
        ctx.writeln("arr->elem_size = elem_size;");
        ctx.writeln("arr->len = 0;");
        ctx.writeln("arr->cap = cap;");
        ctx.writeln("arr->data = malloc(elem_size * cap);");
        ctx.writeln("return arr;");
        ctx.dedent();
        ctx.writeln("}");
        ctx.newline();

        ctx.writeln("void* array_get(array* arr, long long i) {");
        ctx.indent();
        ctx.writeln("if (i < 0 || (size_t)i >= arr->len) {");
        ctx.indent();
        ctx.writeln(
            "fprintf(stderr, \"index out of range: %lld (length %zu)\\n\", i, arr->len);",
        );
        ctx.writeln("exit(1);");
        ctx.dedent();
        ctx.writeln("}");
        ctx.writeln("return arr->data + (size_t)i * arr->elem_size;");
        ctx.dedent();
        ctx.writeln("}");
        ctx.newline();

        ctx.writeln("void array_append(array* arr, void* elem) {");
        ctx.indent();
        ctx.writeln("if (arr->len == arr->cap) {");
        ctx.indent();
        ctx.writeln("arr->cap *= 2;");
        ctx.writeln("arr->data = realloc(arr->data, arr->elem_size * arr->cap);");
        ctx.dedent();
        ctx.writeln("}");
        ctx.writeln("memcpy(arr->data + arr->len * arr->elem_size, elem, arr->elem_size);");
        ctx.writeln("arr->len++;");
        ctx.dedent();
        ctx.writeln("}");
        ctx.newline();

        ctx.writeln("long long array_length(array* arr) {");
        ctx.indent();
        ctx.writeln("return (long long)arr->len;");
        ctx.dedent();
        ctx.writeln("}");
        ctx.newline();

        ctx.writeln("// free_elems releases the elements; NULL when they own nothing.");
        ctx.writeln("void array_free(array* arr, void (*free_elems)(array*)) {");
        ctx.indent();
        ctx.writeln("if (free_elems != NULL) {");
        ctx.indent();
        ctx.writeln("free_elems(arr);");
        ctx.dedent();
        ctx.writeln("}");
        ctx.writeln("free(arr->data);");
        ctx.writeln("free(arr);");
        ctx.dedent();
        ctx.writeln("}");
        ctx.newline();

        ctx.writeln("// copy_elems replaces each element by a deep copy; NULL for scalars.");
        ctx.writeln("array* array_copy(array* arr, void (*copy_elems)(array*)) {");
        ctx.indent();
        ctx.writeln("array* out = array_new(arr->elem_size, arr->len);");
        ctx.writeln("memcpy(out->data, arr->data, arr->elem_size * arr->len);");
        ctx.writeln("out->len = arr->len;");
        ctx.writeln("if (copy_elems != NULL) {");
        ctx.indent();
        ctx.writeln("copy_elems(out);");
        ctx.dedent();
        ctx.writeln("}");
        ctx.writeln("return out;");
        ctx.dedent();
        ctx.writeln("}");
        ctx.newline();
    }

    fn emit_strings(ctx: &mut CodegenContext<'_>) {
        ctx.writeln("static char** bs_strings = NULL;");
        ctx.writeln("static size_t bs_strings_len = 0;");
        ctx.writeln("static size_t bs_strings_cap = 0;");
        ctx.newline();

        ctx.writeln("char* bs_string_keep(char* s) {");
        ctx.indent();
        ctx.writeln("if (bs_strings_len == bs_strings_cap) {");
        ctx.indent();
        ctx.writeln("bs_strings_cap = bs_strings_cap == 0 ? 16 : bs_strings_cap * 2;");
        ctx.writeln("bs_strings = realloc(bs_strings, sizeof(char*) * bs_strings_cap);");
        ctx.dedent();
        ctx.writeln("}");
        ctx.writeln("bs_strings[bs_strings_len++] = s;");
        ctx.writeln("return s;");
        ctx.dedent();
        ctx.writeln("}");
        ctx.newline();

        for (name, c_type, format) in [
            ("bs_string_from_int", "long long", "%lld"),
            ("bs_string_from_float", "double", "%f"),
        ] {
            ctx.writeln(&format!("char* {name}({c_type} v) {{"));
            ctx.indent();
            ctx.writeln("char* s = malloc(32);");
            ctx.writeln(&format!("snprintf(s, 32, \"{format}\", v);"));
            ctx.writeln("return bs_string_keep(s);");
            ctx.dedent();
            ctx.writeln("}");
            ctx.newline();
        }

        ctx.writeln("char* bs_string_from_bool(bool v) {");
        ctx.indent();
        ctx.writeln("return v ? \"true\" : \"false\";");
        ctx.dedent();
        ctx.writeln("}");
        ctx.newline();

        ctx.writeln("void bs_strings_free(void) {");
        ctx.indent();
        ctx.writeln("for (size_t i = 0; i < bs_strings_len; i++) {");
        ctx.indent();
        ctx.writeln("free(bs_strings[i]);");
        ctx.dedent();
        ctx.writeln("}");
        ctx.writeln("free(bs_strings);");
        ctx.dedent();
        ctx.writeln("}");
        ctx.newline();
    }
}
