use bs_build::{build, Extension, Extensions};
use bs_diagnostic::ErrorCode;
use bs_ir::{Node, Program, Span, SyntaxKind, SyntaxNode};
use bs_types::Type;
use pretty_assertions::assert_eq;

use super::expr::emit_expr;
use super::generate_c;
use crate::context::{CodegenConfig, CodegenContext};
use crate::CodegenError;

fn call(name: &str, args: Vec<SyntaxNode>) -> SyntaxNode {
    SyntaxNode::call(name, args, Span::DUMMY)
}

fn ident(text: &str) -> SyntaxNode {
    SyntaxNode::ident(text, Span::DUMMY)
}

fn int(v: i64) -> SyntaxNode {
    SyntaxNode::new(SyntaxKind::Int(v), Span::DUMMY)
}

fn string(s: &str) -> SyntaxNode {
    SyntaxNode::new(SyntaxKind::String(s.to_string()), Span::DUMMY)
}

fn define(name: &str, value: SyntaxNode) -> SyntaxNode {
    call("DEFINE", vec![ident(name), value])
}

fn var(name: &str) -> SyntaxNode {
    call("VAR", vec![ident(name)])
}

fn print(value: SyntaxNode) -> SyntaxNode {
    call("PRINT", vec![value])
}

fn array(values: Vec<SyntaxNode>) -> SyntaxNode {
    call("ARRAY", values)
}

fn program_with(tree: &[SyntaxNode], extensions: &Extensions) -> Program {
    match build(tree, extensions) {
        Ok(program) => program,
        Err(err) => panic!("unexpected build error: {err}"),
    }
}

fn compile_with(tree: &[SyntaxNode], extensions: &Extensions) -> Result<String, CodegenError> {
    generate_c(&program_with(tree, extensions), CodegenConfig::default())
}

fn compile(tree: &[SyntaxNode]) -> String {
    match compile_with(tree, &Extensions::new()) {
        Ok(c) => c,
        Err(err) => panic!("unexpected codegen error: {err}"),
    }
}

/// The text of `int main(void)` to the end of the unit.
fn main_section(c: &str) -> &str {
    match c.find("int main(void) {") {
        Some(start) => &c[start..],
        None => panic!("no main in:\n{c}"),
    }
}

/// C name the generator gives the (first) variable called `name`.
fn c_var(program: &Program, name: &str) -> String {
    match program.variables.iter().find(|v| v.name == name) {
        Some(v) => format!("bsv_{}_{name}", v.id.raw()),
        None => panic!("no variable {name}"),
    }
}

/// First value-producing top-level node: the value of a `DEFINE`.
fn defined_value(program: &Program, stmt: usize) -> &Node {
    match &program.body.stmts[stmt].kind {
        bs_ir::NodeKind::Define { value, .. } => value,
        other => panic!("expected DEFINE, got {other:?}"),
    }
}

// Arrays

#[test]
fn test_int_array_literal() {
    let program = program_with(
        &[define("x", array(vec![int(1), int(2), int(3)]))],
        &Extensions::new(),
    );
    let mut ctx = CodegenContext::new(&program, CodegenConfig::default());
    ctx.ownership.push_function();
    let value = emit_expr(&mut ctx, defined_value(&program, 0)).unwrap();

    assert_eq!(value, "bst_arr_0");
    assert_eq!(ctx.ownership.pending(), 1);
    assert_eq!(
        ctx.take_output(),
        "array* bst_arr_0 = array_new(sizeof(long long), 3);\n\
         long long bst_cnst_0 = 1LL;\n\
         array_append(bst_arr_0, &bst_cnst_0);\n\
         long long bst_cnst_1 = 2LL;\n\
         array_append(bst_arr_0, &bst_cnst_1);\n\
         long long bst_cnst_2 = 3LL;\n\
         array_append(bst_arr_0, &bst_cnst_2);\n"
    );
    let frees = ctx.ownership.pop();
    assert_eq!(frees[0].code, "array_free(bst_arr_0, NULL);");
}

#[test]
fn test_nested_arrays_share_one_helper_per_shape() {
    let tree = [
        define("a", array(vec![array(vec![int(1)]), array(vec![int(2)])])),
        define("b", array(vec![array(vec![int(3)])])),
        define("c", array(vec![array(vec![array(vec![int(4)])])])),
    ];
    let program = program_with(&tree, &Extensions::new());
    let c = compile(&tree);

    assert_eq!(c.matches("void arrfree_aai(array* arr) {").count(), 1);
    assert_eq!(c.matches("void arrfree_aaai(array* arr) {").count(), 1);
    // The inner helper is defined before the helper calling it.
    let inner = c.find("void arrfree_aai(").unwrap();
    let outer = c.find("void arrfree_aaai(").unwrap();
    assert!(inner < outer);
    assert!(c.contains("array_free(*((array**)(array_get(arr, i))), &arrfree_aai);"));

    let main = main_section(&c);
    assert!(main.contains(&format!("array_free({}, &arrfree_aai);", c_var(&program, "a"))));
    assert!(main.contains(&format!("array_free({}, &arrfree_aai);", c_var(&program, "b"))));
    assert!(main.contains(&format!("array_free({}, &arrfree_aaai);", c_var(&program, "c"))));
    // Inner literals were moved into their containers.
    assert_eq!(main.matches("array_free(").count(), 3);
}

#[test]
fn test_scalar_arrays_use_null_sentinel() {
    let c = compile(&[define("xs", array(vec![string("a")]))]);
    assert!(!c.contains("arrfree_"));
    assert!(main_section(&c).contains("array_free(bsv_0_xs, NULL);"));
}

#[test]
fn test_append_moves_dynamic_value() {
    let tree = [
        define("xs", array(vec![array(vec![int(1)])])),
        call("APPEND", vec![var("xs"), array(vec![int(2)])]),
    ];
    let c = compile(&tree);
    let main = main_section(&c);
    assert!(main.contains("array_append(bsv_0_xs, &bst_arr_2);"));
    assert_eq!(main.matches("array_free(").count(), 1);
    assert!(main.contains("array_free(bsv_0_xs, &arrfree_aai);"));
}

#[test]
fn test_index_borrows_element() {
    let tree = [
        define("x", array(vec![int(1), int(2), int(3)])),
        print(call("INDEX", vec![var("x"), int(1)])),
    ];
    let c = compile(&tree);
    let main = main_section(&c);
    assert!(main.contains("printf(\"%lld\\n\", *((long long*)(array_get(bsv_0_x, 1LL))));"));
    assert_eq!(main.matches("array_free(").count(), 1);
    assert_eq!(main.matches("array_free(bsv_0_x, NULL);").count(), 1);
}

#[test]
fn test_borrowed_array_is_copied_before_moving() {
    let tree = [
        define("a", array(vec![array(vec![int(1)])])),
        define("b", var("a")),
        call("APPEND", vec![var("b"), call("INDEX", vec![var("a"), int(0)])]),
    ];
    let c = compile(&tree);
    let main = main_section(&c);
    assert!(main.contains("array* bst_copy_0 = array_copy(bsv_0_a, &arrcopy_aai);"));
    assert!(main.contains("array* bsv_1_b = bst_copy_0;"));
    assert!(main.contains(
        "array* bst_copy_1 = array_copy(*((array**)(array_get(bsv_0_a, 0LL))), NULL);"
    ));
    assert!(main.contains("array_append(bsv_1_b, &bst_copy_1);"));
    assert!(c.contains("void arrcopy_aai(array* arr) {"));
    assert!(c.contains("*slot = array_copy(*slot, NULL);"));
}

#[test]
fn test_redefinition_releases_old_value() {
    let tree = [
        define("xs", array(vec![int(1)])),
        define("xs", array(vec![int(2)])),
    ];
    let c = compile(&tree);
    let main = main_section(&c);
    let release = main.find("array_free(bsv_0_xs, NULL);\n    bsv_0_xs = bst_arr_1;");
    assert!(release.is_some(), "{main}");
    assert_eq!(main.matches("array_free(").count(), 2);
}

// Functions

fn func(name: &str, rest: Vec<SyntaxNode>) -> SyntaxNode {
    let mut args = vec![ident(name)];
    args.extend(rest);
    call("FUNC", args)
}

fn param(name: &str, ty: &str) -> SyntaxNode {
    call("PARAM", vec![ident(name), ident(ty)])
}

fn returns(ty: &str) -> SyntaxNode {
    call("RETURNS", vec![ident(ty)])
}

#[test]
fn test_return_releases_every_open_scope() {
    let tree = [func(
        "f",
        vec![
            param("xs", "[]INT"),
            returns("INT"),
            call(
                "IF",
                vec![
                    ident("TRUE"),
                    define("ys", array(vec![int(1)])),
                    call("RETURN", vec![call("LENGTH", vec![var("ys")])]),
                ],
            ),
            call("RETURN", vec![int(0)]),
        ],
    )];
    let program = program_with(&tree, &Extensions::new());
    let c = compile(&tree);
    let xs = c_var(&program, "xs");
    let ys = c_var(&program, "ys");

    assert!(c.contains(&format!("long long bsf_0_f(array* {xs});\n")));
    let expected = format!(
        "        long long bst_ret_0 = array_length({ys});\n\
         \x20       array_free({ys}, NULL);\n\
         \x20       array_free({xs}, NULL);\n\
         \x20       return bst_ret_0;\n\
         \x20   }}\n"
    );
    assert!(c.contains(&expected), "{c}");
    // The final RETURN only releases the parameter.
    assert!(c.contains(&format!(
        "    long long bst_ret_1 = 0LL;\n    array_free({xs}, NULL);\n    return bst_ret_1;\n}}"
    )));
}

#[test]
fn test_call_moves_arguments_and_owns_result() {
    let tree = [
        func(
            "wrap",
            vec![
                param("xs", "[]INT"),
                returns("[][]INT"),
                call("RETURN", vec![array(vec![var("xs")])]),
            ],
        ),
        define("a", array(vec![int(1), int(2)])),
        print(call("LENGTH", vec![call("wrap", vec![var("a")])])),
    ];
    let program = program_with(&tree, &Extensions::new());
    let c = compile(&tree);
    let a = c_var(&program, "a");
    let main = main_section(&c);

    assert!(main.contains(&format!("array* bst_copy_1 = array_copy({a}, NULL);")));
    assert!(main.contains("array* bst_call_0 = bsf_0_wrap(bst_copy_1);"));
    assert!(main.contains("array_free(bst_call_0, &arrfree_aai);"));
    assert!(main.contains(&format!("array_free({a}, NULL);")));
}

#[test]
fn test_function_prototypes_precede_bodies() {
    let tree = [
        print(call("one", vec![])),
        func("one", vec![returns("INT"), call("RETURN", vec![int(1)])]),
    ];
    let c = compile(&tree);
    let prototype = c.find("long long bsf_0_one(void);").unwrap();
    let body = c.find("long long bsf_0_one(void) {").unwrap();
    let main = c.find("int main(void) {").unwrap();
    assert!(prototype < body && body < main);
    assert!(main_section(&c).contains("printf(\"%lld\\n\", bst_call_0);"));
}

#[test]
fn test_extension_gets_extern_prototype() {
    let extensions = Extensions::new()
        .with(Extension::new("twice", vec![Type::Int], Type::Int))
        .with(Extension::new("log", vec![Type::String], Type::Null));
    let tree = [
        print(call("twice", vec![int(2)])),
        print(call("twice", vec![int(3)])),
        call("log", vec![string("hi")]),
    ];
    let c = compile_with(&tree, &extensions).unwrap();
    assert_eq!(c.matches("extern long long twice(long long);").count(), 1);
    assert!(c.contains("extern void log(char*);"));
    let main = main_section(&c);
    assert!(main.contains("long long bst_call_0 = twice(2LL);"));
    assert!(main.contains("    log(\"hi\");\n"));
}

// Control flow

#[test]
fn test_while_output() {
    let tree = [
        define("i", int(0)),
        call(
            "WHILE",
            vec![
                call("COMPARE", vec![var("i"), ident("<"), int(3)]),
                define("i", call("MATH", vec![var("i"), ident("+"), int(1)])),
            ],
        ),
    ];
    let c = compile(&tree);
    assert_eq!(
        main_section(&c),
        "int main(void) {
    long long bsv_0_i = 0LL;
    while (1) {
        bool bst_cond_0 = (bsv_0_i < 3LL);
        if (!bst_cond_0) {
            break;
        }
        bsv_0_i = (bsv_0_i + 1LL);
    }
    bs_strings_free();
    return 0;
}
"
    );
}

#[test]
fn test_while_body_releases_each_iteration() {
    let tree = [call(
        "WHILE",
        vec![ident("TRUE"), define("xs", array(vec![int(1)]))],
    )];
    let c = compile(&tree);
    let main = main_section(&c);
    let body = main.find("array* bsv_0_xs = bst_arr_0;").unwrap();
    let release = main.find("array_free(bsv_0_xs, NULL);").unwrap();
    let close = main.find("    }\n    bs_strings_free();").unwrap();
    assert!(body < release && release < close);
}

#[test]
fn test_if_else_output() {
    let tree = [call(
        "IF",
        vec![ident("TRUE"), print(int(1)), ident("ELSE"), print(int(2))],
    )];
    let c = compile(&tree);
    assert!(main_section(&c).starts_with(
        "int main(void) {
    if (true) {
        printf(\"%lld\\n\", 1LL);
    } else {
        printf(\"%lld\\n\", 2LL);
    }
"
    ));
}

#[test]
fn test_switch_on_strings() {
    let tree = [
        define("s", string("b")),
        call(
            "SWITCH",
            vec![
                var("s"),
                call("CASE", vec![string("a"), print(int(1))]),
                call("CASE", vec![string("b"), print(int(2))]),
                call("DEFAULT", vec![print(int(3))]),
            ],
        ),
    ];
    let c = compile(&tree);
    let main = main_section(&c);
    assert!(main.contains(
        "    char* bst_switch_0 = bsv_0_s;
    if (strcmp(bst_switch_0, \"a\") == 0) {
        printf(\"%lld\\n\", 1LL);
    } else if (strcmp(bst_switch_0, \"b\") == 0) {
        printf(\"%lld\\n\", 2LL);
    } else {
        printf(\"%lld\\n\", 3LL);
    }
"
    ));
}

#[test]
fn test_and_short_circuits() {
    let tree = [print(call(
        "AND",
        vec![
            ident("FALSE"),
            call(
                "COMPARE",
                vec![call("LENGTH", vec![array(vec![int(1)])]), ident(">"), int(0)],
            ),
        ],
    ))];
    let c = compile(&tree);
    assert!(main_section(&c).contains(
        "    bool bst_logic_0 = false;
    if (bst_logic_0) {
        array* bst_arr_0 = array_new(sizeof(long long), 1);
        long long bst_cnst_0 = 1LL;
        array_append(bst_arr_0, &bst_cnst_0);
        bst_logic_0 = (array_length(bst_arr_0) > 0LL);
        array_free(bst_arr_0, NULL);
    }
    printf(\"%s\\n\", (bst_logic_0) ? \"true\" : \"false\");
"
    ));
}

// Errors

#[test]
fn test_map_values_are_rejected() {
    let extensions = Extensions::new().with(Extension::new(
        "make_map",
        Vec::new(),
        Type::map(Type::String, Type::Int),
    ));
    let tree = [define("m", call("make_map", vec![]))];
    let err = compile_with(&tree, &extensions).unwrap_err();
    assert_eq!(err.code, ErrorCode::E4001);
    assert_eq!(err.to_string(), "values of type {STRING, INT} cannot be compiled to C");
}

#[test]
fn test_any_values_are_rejected() {
    let extensions =
        Extensions::new().with(Extension::new("anything", Vec::new(), Type::Any));
    let err = compile_with(&[print(call("anything", vec![]))], &extensions).unwrap_err();
    assert_eq!(err.code, ErrorCode::E4001);
}

#[test]
fn test_while_condition_must_be_bool() {
    let err = compile_with(&[call("WHILE", vec![int(1), print(int(1))])], &Extensions::new())
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::E4002);
    assert_eq!(err.to_string(), "WHILE condition must be BOOL, found INT");
    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.code, ErrorCode::E4002);
}

#[test]
fn test_unit_layout() {
    let c = compile(&[print(string("hi"))]);
    assert!(c.starts_with("#include <stdbool.h>\n"));
    let runtime = c.find("array* array_copy(").unwrap();
    let main = c.find("int main(void) {").unwrap();
    assert!(runtime < main);
    assert!(c.ends_with("    printf(\"%s\\n\", \"hi\");\n    bs_strings_free();\n    return 0;\n}\n"));
}

#[test]
fn test_custom_indent() {
    let program = program_with(&[print(int(1))], &Extensions::new());
    let config = CodegenConfig {
        indent: "\t".to_string(),
    };
    let c = generate_c(&program, config).unwrap();
    assert!(c.contains("int main(void) {\n\tprintf("));
}

#[test]
fn test_c_names_cannot_collide() {
    // `x1` gets id 2 and `x` id 12; the names must stay apart.
    let names = ["a", "b", "x1", "d", "e", "f", "g", "h", "i", "j", "k", "l", "x"];
    let tree: Vec<_> = names.iter().map(|name| define(name, int(1))).collect();
    let program = program_with(&tree, &Extensions::new());
    assert_eq!(c_var(&program, "x1"), "bsv_2_x1");
    assert_eq!(c_var(&program, "x"), "bsv_12_x");

    let main = main_section(&compile(&tree)).to_string();
    assert_eq!(main.matches("long long bsv_2_x1 = 1LL;").count(), 1);
    assert_eq!(main.matches("long long bsv_12_x = 1LL;").count(), 1);
    for line in main.lines().filter(|line| line.contains("long long bsv_")) {
        assert_eq!(main.matches(line).count(), 1, "declared twice: {line}");
    }
}

fn positive_or_empty(else_branch: Vec<SyntaxNode>) -> SyntaxNode {
    let mut branch = vec![
        call("COMPARE", vec![var("n"), ident(">"), int(0)]),
        call("RETURN", vec![array(vec![var("n")])]),
    ];
    branch.extend(else_branch);
    func(
        "f",
        vec![param("n", "INT"), returns("[]INT"), call("IF", branch)],
    )
}

#[test]
fn test_function_falling_off_its_end_never_reaches_codegen() {
    let tree = [
        positive_or_empty(Vec::new()),
        print(call("LENGTH", vec![call("f", vec![int(-1)])])),
    ];
    let error = match build(&tree, &Extensions::new()) {
        Ok(_) => panic!("a missing RETURN was accepted"),
        Err(err) => err,
    };
    assert_eq!(error.code(), ErrorCode::E3005);
}

#[test]
fn test_if_else_returning_on_both_paths() {
    let tree = [
        positive_or_empty(vec![
            ident("ELSE"),
            call("RETURN", vec![array(vec![ident("[]INT")])]),
        ]),
        print(call("LENGTH", vec![call("f", vec![int(-1)])])),
    ];
    let c = compile(&tree);
    let start = c.find("array* bsf_0_f(long long bsv_0_n) {").unwrap();
    let end = c.find("int main(void) {").unwrap();
    let body = &c[start..end];
    assert!(body.contains("} else {"), "{body}");
    assert_eq!(body.matches("return bst_ret_").count(), 2, "{body}");
    assert!(main_section(&c).contains("array* bst_call_0 = bsf_0_f(-1LL);"));
}
