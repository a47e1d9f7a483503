use bs_types::Type;
use pretty_assertions::assert_eq;

use super::*;

fn int(v: i64) -> Node {
    Node::new(NodeKind::Const(ConstValue::Int(v)), Type::Int, Span::DUMMY)
}

fn var_x() -> Variable {
    Variable {
        id: VarId::new(0),
        name: "x".to_string(),
        ty: Type::Int,
        span: Span::DUMMY,
        scope: ScopeKind::Global,
    }
}

fn body(stmts: Vec<Node>, kind: ScopeKind) -> Body {
    Body {
        stmts,
        scope: ScopeInfo::empty(kind),
    }
}

fn block(block: Block) -> Node {
    Node::stmt(NodeKind::Block(Box::new(block)), Span::DUMMY)
}

fn print(node: Node) -> Node {
    Node::stmt(NodeKind::Print(Box::new(node)), Span::DUMMY)
}

fn sample_program() -> Program {
    let cond = Node::new(
        NodeKind::Compare {
            op: CompareOp::Gt,
            lhs: Box::new(Node::new(NodeKind::Var(VarId::new(0)), Type::Int, Span::DUMMY)),
            rhs: Box::new(int(1)),
        },
        Type::Bool,
        Span::DUMMY,
    );
    let if_block = block(Block::If {
        cond,
        body: body(vec![print(int(1))], ScopeKind::If),
        else_body: Some(body(vec![print(int(2))], ScopeKind::If)),
    });
    let switch = block(Block::Switch(SwitchBlock {
        value: Node::new(NodeKind::Var(VarId::new(0)), Type::Int, Span::DUMMY),
        cases: vec![CaseBlock {
            value: int(3),
            body: body(vec![print(int(3))], ScopeKind::Case),
            span: Span::DUMMY,
        }],
        default: Some(DefaultBlock {
            body: body(vec![print(int(0))], ScopeKind::Case),
            span: Span::DUMMY,
        }),
        scope: ScopeInfo::empty(ScopeKind::Switch),
    }));
    let define = Node::stmt(
        NodeKind::Define {
            var: VarId::new(0),
            value: Box::new(int(5)),
            declares: true,
        },
        Span::DUMMY,
    );
    Program {
        variables: vec![var_x()],
        functions: Vec::new(),
        body: body(vec![define, if_block, switch], ScopeKind::Global),
    }
}

#[test]
fn test_code_renders_blocks() {
    let code = sample_program().code(&CodeConfig { indent: 2 });
    assert_eq!(
        code,
        "[DEFINE x 5]\n\
         [IF [COMPARE [VAR x] > 1]\n  [PRINT 1]\nELSE\n  [PRINT 2]]\n\
         [SWITCH [VAR x]\n  [CASE 3\n    [PRINT 3]]\n  [DEFAULT\n    [PRINT 0]]]"
    );
}

#[test]
fn test_code_indentation_only_changes_whitespace() {
    let program = sample_program();
    let strip = |s: String| s.split_whitespace().collect::<Vec<_>>().join(" ");
    let two = program.code(&CodeConfig { indent: 2 });
    let eight = program.code(&CodeConfig { indent: 8 });
    assert_ne!(two, eight);
    assert_eq!(strip(two), strip(eight));
}

#[test]
fn test_const_rendering() {
    assert_eq!(ConstValue::Float(1.0).to_string(), "1.0");
    assert_eq!(ConstValue::Bool(false).to_string(), "FALSE");
    assert_eq!(ConstValue::String("a\"b".into()).to_string(), "\"a\\\"b\"");
}

#[test]
fn test_empty_array_renders_element_type() {
    let program = sample_program();
    let empty = Node::new(
        NodeKind::Array {
            elem: Type::array(Type::Int),
            values: Vec::new(),
        },
        Type::array(Type::array(Type::Int)),
        Span::DUMMY,
    );
    assert_eq!(
        program.node_code(&empty, &CodeConfig::default()),
        "[ARRAY []INT]"
    );
}

#[test]
fn test_scope_info_sorted() {
    let info = ScopeInfo::new(ScopeKind::If, vec![VarId::new(3), VarId::new(1), VarId::new(3)]);
    assert_eq!(info.variables, vec![VarId::new(1), VarId::new(3)]);
}

#[test]
fn test_operator_symbols() {
    assert_eq!(MathOp::from_symbol("%"), Some(MathOp::Mod));
    assert_eq!(CompareOp::from_symbol(">="), Some(CompareOp::GtEq));
    assert_eq!(CompareOp::from_symbol("=="), None);
    assert!(CompareOp::NotEq.is_equality());
}
