//! One test per structural-error kind the checker and parser can raise,
//! so every variant in `error::CheckError`/`error::ParserError` has a
//! regression test driving it.

use tplverify::error::{CheckError, ParserError};
use tplverify::orchestrator::verify_source;
use tplverify::parser::parse_program;
use tplverify::VerifierError;

fn check_err(source: &str) -> CheckError {
    match verify_source(source, "test.tpl", false) {
        Err(VerifierError::Check(e)) => e,
        Err(VerifierError::Parser(ParserError::Check(e))) => e,
        Err(other) => panic!("expected a CheckError, got {other}"),
        Ok(_) => panic!("expected a CheckError, got Ok"),
    }
}

fn parser_err(source: &str) -> ParserError {
    match parse_program(source, "test.tpl") {
        Err(e) => e,
        Ok(_) => panic!("expected a ParserError, got Ok"),
    }
}

#[test]
fn empty_program_is_annotation_func_error() {
    assert!(matches!(check_err(""), CheckError::AnnotationFuncError));
}

#[test]
fn missing_precondition_is_a_precondition_error() {
    let source = "INT FUNCTION f() { RETURN 0; }";
    assert!(matches!(check_err(source), CheckError::PreConditionError(_)));
}

#[test]
fn missing_postcondition_is_postcondition_missing() {
    let source = "INT FUNCTION f() { @PRE TRUE; RETURN 0; }";
    assert!(matches!(check_err(source), CheckError::PostConditionMissing));
}

#[test]
fn second_pre_after_the_header_is_rejected() {
    // This is the case the Python original's `isinstance(statement_index, ...)`
    // bug on the loop counter let slip through silently.
    let source = "INT FUNCTION f() { @PRE TRUE; @POST TRUE; @PRE TRUE; RETURN 0; }";
    assert!(matches!(check_err(source), CheckError::PreConditionError(_)));
}

#[test]
fn second_post_after_the_header_is_rejected() {
    let source = "INT FUNCTION f() { @PRE TRUE; @POST TRUE; @POST TRUE; RETURN 0; }";
    assert!(matches!(check_err(source), CheckError::PostConditionError(_)));
}

#[test]
fn precondition_may_not_reference_rv() {
    let source = "INT FUNCTION f() { @PRE rv == 0; @POST TRUE; RETURN 0; }";
    match check_err(source) {
        CheckError::PreConditionError(msg) => assert!(msg.contains("rv")),
        other => panic!("expected PreConditionError, got {other:?}"),
    }
}

#[test]
fn precondition_referencing_a_non_parameter_is_rejected() {
    let source = "INT FUNCTION f(INT n) { INT i; @PRE i == 0; @POST TRUE; RETURN n; }";
    assert!(matches!(check_err(source), CheckError::PreConditionError(_)));
}

#[test]
fn postcondition_referencing_a_non_parameter_is_rejected() {
    let source = "INT FUNCTION f(INT n) { INT i; @PRE TRUE; @POST i == 0; RETURN n; }";
    assert!(matches!(check_err(source), CheckError::PostConditionError(_)));
}

#[test]
fn loop_annotation_not_followed_by_while_is_rejected() {
    let source = "INT FUNCTION f(INT n) { @PRE TRUE; @POST TRUE; @LOOP TRUE; RETURN n; }";
    assert!(matches!(check_err(source), CheckError::AnnotationWithNoWhileLoop { .. }));
}

#[test]
fn bare_expression_statement_has_no_effect() {
    let source = "INT FUNCTION f(INT n) { @PRE TRUE; @POST TRUE; n; RETURN n; }";
    assert!(matches!(check_err(source), CheckError::ExpressionWithNoEffect { .. }));
}

#[test]
fn function_without_a_return_on_every_path_is_rejected() {
    let source = "INT FUNCTION f() { @PRE TRUE; @POST TRUE; NOP; }";
    assert!(matches!(check_err(source), CheckError::MissingReturnStatement { .. }));
}

#[test]
fn mismatched_comparison_types_are_an_invalid_expression_type() {
    let source = "INT FUNCTION f(INT a) { @PRE TRUE; @POST TRUE; RETURN a > TRUE; }";
    match parser_err(source) {
        ParserError::Check(CheckError::InvalidExpressionType { .. }) => {}
        other => panic!("expected ParserError::Check(InvalidExpressionType), got {other:?}"),
    }
}

#[test]
fn undeclared_variable_is_rejected() {
    let source = "INT FUNCTION f() { @PRE TRUE; @POST TRUE; RETURN x; }";
    assert!(matches!(parser_err(source), ParserError::UndeclaredVariable { .. }));
}

#[test]
fn duplicate_parameter_declaration_is_rejected() {
    let source = "INT FUNCTION f(INT a, INT a) { @PRE TRUE; @POST TRUE; RETURN a; }";
    assert!(matches!(parser_err(source), ParserError::DuplicateDeclaration { .. }));
}

#[test]
fn rv_is_a_reserved_parameter_name() {
    let source = "INT FUNCTION f(INT rv) { @PRE TRUE; @POST TRUE; RETURN rv; }";
    assert!(matches!(parser_err(source), ParserError::ReservedVariableName { .. }));
}

#[test]
fn duplicate_function_names_are_rejected() {
    let source = "INT FUNCTION f() { @PRE TRUE; @POST TRUE; RETURN 0; } \
                   INT FUNCTION f() { @PRE TRUE; @POST TRUE; RETURN 0; }";
    assert!(matches!(parser_err(source), ParserError::DuplicateFunction { .. }));
}
