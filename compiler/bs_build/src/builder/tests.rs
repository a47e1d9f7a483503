use bs_ir::{Block, CodeConfig, NodeKind, Program, ScopeKind, Span, SyntaxKind, SyntaxNode};
use bs_diagnostic::ErrorCode;
use bs_types::Type;
use pretty_assertions::assert_eq;

use crate::{build, BuildError, BuildErrorKind, Extension, Extensions};

fn call(name: &str, args: Vec<SyntaxNode>) -> SyntaxNode {
    SyntaxNode::call(name, args, Span::DUMMY)
}

fn call_at(name: &str, args: Vec<SyntaxNode>, start: u32) -> SyntaxNode {
    SyntaxNode::call(name, args, Span::new(start, start + 1))
}

fn ident(text: &str) -> SyntaxNode {
    SyntaxNode::ident(text, Span::DUMMY)
}

fn int(v: i64) -> SyntaxNode {
    SyntaxNode::new(SyntaxKind::Int(v), Span::DUMMY)
}

fn float(v: f64) -> SyntaxNode {
    SyntaxNode::new(SyntaxKind::Float(v), Span::DUMMY)
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

fn ok(tree: &[SyntaxNode]) -> Program {
    match build(tree, &Extensions::new()) {
        Ok(program) => program,
        Err(err) => panic!("unexpected build error: {err}"),
    }
}

fn err(tree: &[SyntaxNode]) -> BuildError {
    build(tree, &Extensions::new()).unwrap_err()
}

fn block(program: &Program, stmt: usize) -> &Block {
    match &program.body.stmts[stmt].kind {
        NodeKind::Block(block) => block,
        other => panic!("expected block, got {other:?}"),
    }
}

// IF

#[test]
fn test_if_requires_two_arguments() {
    let error = err(&[call("IF", vec![ident("TRUE")])]);
    assert!(matches!(error.kind, BuildErrorKind::ArgCount { min: 2, max: None, found: 1, .. }));
    assert_eq!(error.to_string(), "IF requires at least 2 arguments");
}

#[test]
fn test_if_condition_must_be_bool() {
    let error = err(&[call("IF", vec![int(1), print(int(1))])]);
    assert_eq!(error.to_string(), "expected boolean for condition in IF statement");
}

#[test]
fn test_if_condition_is_not_relaxed_by_any() {
    let extensions =
        Extensions::new().with(Extension::new("anything", Vec::new(), Type::Any));
    let tree = [call("IF", vec![call("anything", vec![]), print(int(1))])];
    let error = build(&tree, &extensions).unwrap_err();
    assert!(matches!(error.kind, BuildErrorKind::ExpectedBoolCondition { .. }));
}

#[test]
fn test_if_with_two_else_fails_at_second_else() {
    let tree = [call(
        "IF",
        vec![
            ident("TRUE"),
            print(int(1)),
            ident("ELSE"),
            print(int(2)),
            SyntaxNode::ident("ELSE", Span::new(40, 44)),
            print(int(3)),
        ],
    )];
    let error = err(&tree);
    assert_eq!(error.kind, BuildErrorKind::DuplicateElse);
    assert_eq!(error.span, Span::new(40, 44));
    assert_eq!(error.to_string(), "ELSE can only be used once in IF statement");
}

#[test]
fn test_if_else_bodies_have_own_scopes() {
    let tree = [call(
        "IF",
        vec![
            ident("TRUE"),
            define("a", int(1)),
            ident("ELSE"),
            define("b", string("x")),
            define("c", float(1.5)),
        ],
    )];
    let program = ok(&tree);
    let Block::If {
        body, else_body, ..
    } = block(&program, 0)
    else {
        panic!("expected IF");
    };
    let else_body = else_body.as_ref().unwrap();
    assert_eq!(body.stmts.len(), 1);
    assert_eq!(body.scope.kind, ScopeKind::If);
    assert_eq!(body.scope.variables.len(), 1);
    assert_eq!(else_body.stmts.len(), 2);
    assert_eq!(else_body.scope.variables.len(), 2);
    assert!(program.body.scope.variables.is_empty());
}

#[test]
fn test_shadowing_reverts_after_block() {
    let tree = [
        define("x", int(1)),
        call("IF", vec![ident("TRUE"), define("x", string("inner")), print(var("x"))]),
        print(var("x")),
    ];
    let program = ok(&tree);
    assert_eq!(program.variables.len(), 2);
    let NodeKind::Print(value) = &program.body.stmts[2].kind else {
        panic!("expected PRINT");
    };
    assert_eq!(value.ty, Type::Int);
    assert_eq!(program.variables[1].scope, ScopeKind::If);
}

#[test]
fn test_define_same_type_overwrites() {
    let tree = [
        define("x", int(1)),
        call(
            "WHILE",
            vec![ident("TRUE"), define("x", call("MATH", vec![var("x"), ident("+"), int(1)]))],
        ),
    ];
    let program = ok(&tree);
    assert_eq!(program.variables.len(), 1);
    let Block::While { body, .. } = block(&program, 1) else {
        panic!("expected WHILE");
    };
    assert!(matches!(
        body.stmts[0].kind,
        NodeKind::Define { declares: false, .. }
    ));
}

// WHILE

#[test]
fn test_while_condition_is_unchecked() {
    let program = ok(&[call("WHILE", vec![int(1), print(int(1))])]);
    let Block::While { cond, body } = block(&program, 0) else {
        panic!("expected WHILE");
    };
    assert_eq!(cond.ty, Type::Int);
    assert_eq!(body.scope.kind, ScopeKind::While);
}

#[test]
fn test_while_requires_two_arguments() {
    let error = err(&[call("WHILE", vec![ident("TRUE")])]);
    assert_eq!(error.to_string(), "WHILE requires at least 2 arguments");
}

// SWITCH / CASE / DEFAULT

#[test]
fn test_switch_builds_cases_in_order() {
    let tree = [
        define("x", int(2)),
        call(
            "SWITCH",
            vec![
                var("x"),
                call("CASE", vec![int(1), print(string("one"))]),
                call("CASE", vec![int(2), print(string("two"))]),
                call("DEFAULT", vec![print(string("other"))]),
            ],
        ),
    ];
    let program = ok(&tree);
    let Block::Switch(switch) = block(&program, 1) else {
        panic!("expected SWITCH");
    };
    assert_eq!(switch.cases.len(), 2);
    assert!(switch.default.is_some());
    assert_eq!(switch.cases[1].body.scope.kind, ScopeKind::Case);
    assert_eq!(switch.scope.kind, ScopeKind::Switch);
}

#[test]
fn test_switch_case_type_mismatch() {
    let tree = [call(
        "SWITCH",
        vec![int(1), call("CASE", vec![string("a"), print(int(1))])],
    )];
    let error = err(&tree);
    assert_eq!(error.to_string(), "expected case with type INT");
}

#[test]
fn test_switch_two_defaults() {
    let tree = [call(
        "SWITCH",
        vec![
            int(1),
            call("DEFAULT", vec![print(int(1))]),
            call_at("DEFAULT", vec![print(int(2))], 30),
        ],
    )];
    let error = err(&tree);
    assert_eq!(error.kind, BuildErrorKind::DuplicateDefault);
    assert_eq!(error.span, Span::new(30, 31));
}

#[test]
fn test_switch_value_must_be_hashable() {
    let tree = [call(
        "SWITCH",
        vec![float(1.0), call("DEFAULT", vec![print(int(1))])],
    )];
    assert_eq!(err(&tree).to_string(), "expected hashable type for SWITCH value");
}

#[test]
fn test_switch_rejects_non_case_entries() {
    let tree = [call("SWITCH", vec![int(1), print(int(1))])];
    assert_eq!(err(&tree).kind, BuildErrorKind::ExpectedCase);
}

#[test]
fn test_case_outside_switch() {
    let error = err(&[call_at("CASE", vec![int(1), print(int(1))], 7)]);
    assert_eq!(error.to_string(), "CASE can only be used inside SWITCH");
    assert_eq!(error.span, Span::new(7, 8));

    let error = err(&[call("DEFAULT", vec![print(int(1))])]);
    assert_eq!(error.to_string(), "DEFAULT can only be used inside SWITCH");
}

#[test]
fn test_case_must_be_directly_inside_switch() {
    let nested = call("CASE", vec![int(2), print(int(2))]);
    let tree = [call(
        "SWITCH",
        vec![int(1), call("CASE", vec![int(1), nested])],
    )];
    assert!(matches!(err(&tree).kind, BuildErrorKind::OutsideSwitch { .. }));
}

#[test]
fn test_case_value_must_be_constant() {
    let tree = [
        define("y", int(1)),
        call(
            "SWITCH",
            vec![int(1), call("CASE", vec![var("y"), print(int(1))])],
        ),
    ];
    assert_eq!(err(&tree).to_string(), "expected constant for CASE value");
}

// Built-ins

#[test]
fn test_index_of_int_array() {
    let tree = [
        define("x", call("ARRAY", vec![int(1), int(2), int(3)])),
        print(call("INDEX", vec![var("x"), int(1)])),
    ];
    let program = ok(&tree);
    assert_eq!(program.variables[0].ty, Type::array(Type::Int));
    let NodeKind::Print(value) = &program.body.stmts[1].kind else {
        panic!("expected PRINT");
    };
    assert!(matches!(value.kind, NodeKind::Index { .. }));
    assert_eq!(value.ty, Type::Int);
}

#[test]
fn test_array_elements_must_match() {
    let error = err(&[call("ARRAY", vec![int(1), float(2.0)])]);
    assert!(matches!(error.kind, BuildErrorKind::TypeMismatch { .. }));
}

#[test]
fn test_empty_array_from_annotation() {
    let program = ok(&[define("xs", call("ARRAY", vec![ident("[]STRING")]))]);
    assert_eq!(
        program.variables[0].ty,
        Type::array(Type::array(Type::String))
    );
}

#[test]
fn test_append_checks_element_type() {
    let tree = [
        define("xs", call("ARRAY", vec![int(1)])),
        call("APPEND", vec![var("xs"), string("no")]),
    ];
    assert!(matches!(err(&tree).kind, BuildErrorKind::TypeMismatch { .. }));
}

#[test]
fn test_print_rejects_arrays_and_statements() {
    let error = err(&[print(call("ARRAY", vec![int(1)]))]);
    assert!(matches!(error.kind, BuildErrorKind::TypeMismatch { .. }));
    let error = err(&[print(print(int(1)))]);
    assert!(matches!(error.kind, BuildErrorKind::ExpectedValue { .. }));
}

#[test]
fn test_math_and_compare() {
    let error = err(&[call("MATH", vec![float(1.0), ident("%"), float(2.0)])]);
    assert!(matches!(error.kind, BuildErrorKind::TypeMismatch { .. }));
    let error = err(&[call("MATH", vec![int(1), ident("^"), int(2)])]);
    assert_eq!(error.to_string(), "invalid operator `^` in MATH");
    let error = err(&[call("COMPARE", vec![ident("TRUE"), ident("<"), ident("FALSE")])]);
    assert!(matches!(error.kind, BuildErrorKind::TypeMismatch { .. }));
    ok(&[print(call("COMPARE", vec![string("a"), ident("<"), string("b")]))]);
}

#[test]
fn test_casts() {
    ok(&[print(call("STRING", vec![ident("TRUE")]))]);
    let error = err(&[call("INT", vec![ident("TRUE")])]);
    assert_eq!(error.to_string(), "cannot convert BOOL to INT");
}

#[test]
fn test_unknown_variable_and_function() {
    assert_eq!(err(&[print(var("nope"))]).to_string(), "unknown variable `nope`");
    assert_eq!(
        err(&[call("nope", vec![])]).to_string(),
        "unknown function `nope`"
    );
    assert_eq!(
        err(&[ident("x")]).kind,
        BuildErrorKind::UnexpectedIdent {
            name: "x".to_string()
        }
    );
}

// Functions

fn add_function() -> SyntaxNode {
    call(
        "FUNC",
        vec![
            ident("add"),
            call("PARAM", vec![ident("a"), ident("INT")]),
            call("PARAM", vec![ident("b"), ident("INT")]),
            call("RETURNS", vec![ident("INT")]),
            call(
                "RETURN",
                vec![call("MATH", vec![var("a"), ident("+"), var("b")])],
            ),
        ],
    )
}

#[test]
fn test_call_before_definition() {
    let tree = [print(call("add", vec![int(1), int(2)])), add_function()];
    let program = ok(&tree);
    assert_eq!(program.functions.len(), 1);
    assert_eq!(program.body.stmts.len(), 1);
    let func = &program.functions[0];
    assert_eq!(func.ret, Type::Int);
    assert_eq!(func.params.len(), 2);
    assert_eq!(func.body.scope.kind, ScopeKind::Function);
    assert_eq!(func.body.scope.variables, func.params);
}

#[test]
fn test_call_argument_types_checked() {
    let tree = [add_function(), print(call("add", vec![int(1), string("2")]))];
    assert!(matches!(err(&tree).kind, BuildErrorKind::TypeMismatch { .. }));
    let tree = [add_function(), print(call("add", vec![int(1)]))];
    assert!(matches!(err(&tree).kind, BuildErrorKind::ArgCount { .. }));
}

#[test]
fn test_return_rules() {
    assert_eq!(
        err(&[call("RETURN", vec![])]).kind,
        BuildErrorKind::ReturnOutsideFunction
    );
    let wrong = call(
        "FUNC",
        vec![
            ident("f"),
            call("RETURNS", vec![ident("INT")]),
            call("RETURN", vec![string("s")]),
        ],
    );
    assert!(matches!(err(&[wrong]).kind, BuildErrorKind::TypeMismatch { .. }));
    let missing_value = call(
        "FUNC",
        vec![ident("g"), call("RETURNS", vec![ident("INT")]), call("RETURN", vec![])],
    );
    assert!(matches!(
        err(&[missing_value]).kind,
        BuildErrorKind::TypeMismatch { .. }
    ));
}

fn positive_branch(else_branch: Vec<SyntaxNode>) -> SyntaxNode {
    let mut args = vec![
        call("COMPARE", vec![var("n"), ident(">"), int(0)]),
        call("RETURN", vec![call("ARRAY", vec![var("n")])]),
    ];
    args.extend(else_branch);
    call("IF", args)
}

fn wrap_positive(body: Vec<SyntaxNode>) -> SyntaxNode {
    let mut args = vec![
        ident("f"),
        call("PARAM", vec![ident("n"), ident("INT")]),
        call("RETURNS", vec![ident("[]INT")]),
    ];
    args.extend(body);
    call_at("FUNC", args, 7)
}

#[test]
fn test_typed_function_must_return_on_every_path() {
    let error = err(&[wrap_positive(vec![positive_branch(Vec::new())])]);
    assert_eq!(
        error.kind,
        BuildErrorKind::MissingReturn {
            name: "f".to_string(),
            ret: Type::Array(Box::new(Type::Int)),
        }
    );
    assert_eq!(error.code(), ErrorCode::E3005);
    assert_eq!(error.span, Span::new(7, 8));

    // A loop body never counts, even when it returns.
    let looping = wrap_positive(vec![call(
        "WHILE",
        vec![ident("TRUE"), call("RETURN", vec![call("ARRAY", vec![var("n")])])],
    )]);
    assert!(matches!(err(&[looping]).kind, BuildErrorKind::MissingReturn { .. }));

    let empty = call("FUNC", vec![ident("g"), call("RETURNS", vec![ident("INT")])]);
    assert!(matches!(err(&[empty]).kind, BuildErrorKind::MissingReturn { .. }));
}

#[test]
fn test_returning_paths_are_accepted() {
    let both = positive_branch(vec![
        ident("ELSE"),
        print(int(0)),
        call("RETURN", vec![call("ARRAY", vec![int(0)])]),
    ]);
    let program = ok(&[wrap_positive(vec![both])]);
    assert_eq!(program.functions[0].body.stmts.len(), 1);

    let trailing = wrap_positive(vec![
        positive_branch(Vec::new()),
        call("RETURN", vec![call("ARRAY", vec![int(0)])]),
    ]);
    ok(&[trailing]);

    // Functions returning NULL may simply end.
    ok(&[call("FUNC", vec![ident("h"), print(int(1))])]);
}

#[test]
fn test_function_rules() {
    let nested = call(
        "IF",
        vec![ident("TRUE"), call("FUNC", vec![ident("f")])],
    );
    assert_eq!(err(&[nested]).kind, BuildErrorKind::FunctionNotTopLevel);
    let duplicate = [call("FUNC", vec![ident("f")]), call("FUNC", vec![ident("f")])];
    assert!(matches!(
        err(&duplicate).kind,
        BuildErrorKind::DuplicateFunction { .. }
    ));
    let reserved = [call("FUNC", vec![ident("PRINT")])];
    assert!(matches!(
        err(&reserved).kind,
        BuildErrorKind::ReservedFunctionName { .. }
    ));
}

#[test]
fn test_function_cannot_see_globals() {
    let tree = [
        define("g", int(1)),
        call("FUNC", vec![ident("f"), print(var("g"))]),
    ];
    assert!(matches!(err(&tree).kind, BuildErrorKind::UnknownVariable { .. }));
}

// Extensions

#[test]
fn test_extension_variadic_and_ident_params() {
    let extensions = Extensions::new()
        .with(Extension::new(
            "sum",
            vec![Type::Int, Type::Variadic],
            Type::Int,
        ))
        .with(Extension::new("tag", vec![Type::Ident], Type::String));
    let tree = [
        print(call("sum", vec![int(1), int(2), int(3)])),
        print(call("tag", vec![ident("red")])),
    ];
    let program = build(&tree, &extensions).unwrap();
    let NodeKind::Print(value) = &program.body.stmts[1].kind else {
        panic!("expected PRINT");
    };
    let NodeKind::ExtensionCall { args, .. } = &value.kind else {
        panic!("expected extension call");
    };
    assert_eq!(args[0].kind, NodeKind::Ident("red".to_string()));
}

#[test]
fn test_bare_variadic_extension_rejects_statement_arguments() {
    let extensions = Extensions::new().with(Extension::new("log", vec![Type::Variadic], Type::Null));
    let tree = [call("log", vec![int(1), print(int(2))])];
    let error = build(&tree, &extensions).unwrap_err();
    assert_eq!(
        error.kind,
        BuildErrorKind::ExpectedValue {
            construct: "log".to_string()
        }
    );
    assert_eq!(error.code(), ErrorCode::E2005);

    let tree = [call("log", vec![int(1), string("two")])];
    assert!(build(&tree, &extensions).is_ok());
}

#[test]
fn test_built_program_renders_independently_of_indent() {
    let tree = [
        add_function(),
        define("x", int(2)),
        call(
            "SWITCH",
            vec![
                var("x"),
                call("CASE", vec![int(2), print(call("add", vec![var("x"), int(1)]))]),
                call("DEFAULT", vec![print(string("none"))]),
            ],
        ),
    ];
    let program = ok(&tree);
    let two = program.code(&CodeConfig { indent: 2 });
    let four = program.code(&CodeConfig { indent: 4 });
    assert!(two.starts_with("[FUNC add [PARAM a INT] [PARAM b INT] [RETURNS INT]\n  [RETURN"));
    let strip = |s: &str| s.split_whitespace().collect::<String>();
    assert_eq!(strip(&two), strip(&four));
}
