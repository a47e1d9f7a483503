use super::*;

#[test]
fn test_diagnostic_builder() {
    let diag = Diagnostic::error(ErrorCode::E1005)
        .with_message("ELSE can only be used once in IF statement")
        .with_label(Span::new(0, 5), "second ELSE")
        .with_secondary_label(Span::new(20, 30), "enclosing IF")
        .with_note("split the branches into nested IF blocks");

    assert_eq!(diag.code, ErrorCode::E1005);
    assert!(diag.is_error());
    assert_eq!(diag.labels.len(), 2);
    assert_eq!(diag.primary_span(), Some(Span::new(0, 5)));
    assert_eq!(diag.notes.len(), 1);
}

#[test]
fn test_type_mismatch_helper() {
    let diag = type_mismatch(Span::new(10, 15), "INT", "STRING", "CASE value");

    assert_eq!(diag.code, ErrorCode::E2001);
    assert!(diag.message.contains("INT"));
    assert!(diag.message.contains("STRING"));
    assert!(diag.message.contains("CASE value"));
    assert_eq!(diag.primary_span(), Some(Span::new(10, 15)));
}

#[test]
fn test_diagnostic_display() {
    let diag = Diagnostic::warning(ErrorCode::E4002)
        .with_message("test warning")
        .with_label(Span::new(0, 5), "here");

    let output = diag.to_string();
    assert!(output.starts_with("warning [E4002]: test warning"));
    assert!(output.contains("--> 0..5: here"));
}
