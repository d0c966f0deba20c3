//! End-to-end pipeline tests over literal source text, one per
//! concrete scenario.

use tplverify::orchestrator::verify_source;

fn verify(source: &str) -> tplverify::orchestrator::ProgramVerdict {
    verify_source(source, "test.tpl", false).expect("pipeline should not raise a structural error")
}

#[test]
fn add_is_valid_with_one_path() {
    let verdict = verify(
        "INT FUNCTION add(INT a, INT b) { @PRE TRUE; @POST rv == a + b; RETURN a + b; }",
    );
    assert!(verdict.is_valid());
    assert_eq!(verdict.functions[0].paths.len(), 1);
}

#[test]
fn maxxy_is_valid_with_two_paths() {
    let verdict = verify(
        "INT FUNCTION maxxy(INT x, INT y) { @PRE TRUE; @POST rv >= x ^ rv >= y; \
         IF (x > y) { RETURN x; } ELSE { RETURN y; } }",
    );
    assert!(verdict.is_valid());
    assert_eq!(verdict.functions[0].paths.len(), 2);
}

#[test]
fn buggy_is_invalid_with_a_counter_model() {
    let verdict = verify("INT FUNCTION buggy(INT x) { @PRE x >= 0; @POST rv > x; RETURN x; }");
    assert!(!verdict.is_valid());
    let path = &verdict.functions[0].paths[0];
    match &path.decision {
        tplverify::verification::Decision::Invalid(Some(model)) => {
            assert!(model.assignments.contains_key("x"));
        }
        other => panic!("expected a counter-model, got {other:?}"),
    }
}

#[test]
fn sum_with_correct_invariant_is_valid_with_three_paths() {
    let verdict = verify(
        "INT FUNCTION sum(INT n) { @PRE n >= 0; @POST rv == n; INT i; INT s; i := 0; s := 0; \
         @LOOP s == i ^ i <= n; WHILE (i < n) { s := s + 1; i := i + 1; } RETURN s; }",
    );
    assert!(verdict.is_valid());
    assert_eq!(verdict.functions[0].paths.len(), 3);
}

#[test]
fn sum_with_broken_invariant_is_invalid() {
    let verdict = verify(
        "INT FUNCTION sum(INT n) { @PRE n >= 0; @POST rv == n; INT i; INT s; i := 0; s := 0; \
         @LOOP s == i + 1 ^ i <= n; WHILE (i < n) { s := s + 1; i := i + 1; } RETURN s; }",
    );
    assert!(!verdict.is_valid());
    // The path entering the loop (invariant does not hold on entry) must fail.
    assert!(matches!(
        verdict.functions[0].paths[0].decision,
        tplverify::verification::Decision::Invalid(_)
    ));
}

#[test]
fn while_loop_without_a_preceding_loop_annotation_is_a_structural_error() {
    let source = "INT FUNCTION f(INT n) { @PRE TRUE; @POST rv == n; WHILE (n > 0) { n := n - 1; } RETURN n; }";
    let err = verify_source(source, "test.tpl", false).unwrap_err();
    assert!(matches!(
        err,
        tplverify::VerifierError::Check(tplverify::error::CheckError::LoopAnnotationError { .. })
    ));
}
