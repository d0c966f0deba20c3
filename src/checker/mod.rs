//! Well-formedness checker : three independent passes
//! over a parsed [`Program`], run in order. Each is fatal for the whole
//! file; there is no partial analysis past the first failure.

use crate::ast::{AnnotationKind, DataType, Expr, Function, Program, Stmt};
use crate::error::{CheckError, SourceLocation};
use std::collections::HashSet;

/// Runs all three passes on every function, mutating bodies in place
/// (annotation extraction, loop-invariant attachment) and filling
/// `precondition`/`postcondition`.
pub fn check_program(program: &mut Program) -> Result<(), CheckError> {
    check_unique_names(program)?;
    for function in &mut program.functions {
        attach_loop_invariants(&mut function.body)?;
        extract_header_annotations(function)?;
        check_annotation_scope(function)?;
        check_return_coverage(function)?;
    }
    Ok(())
}

/// Pass 1 (partial): function names must be unique. The "program is
/// exactly a sequence of function declarations" half of this rule is
/// enforced structurally by the parser, which can only ever produce
/// `Function` values — there is no other top-level statement kind to
/// reject, so `AnnotationFuncError` exists for the case a caller feeds
/// the checker an empty or malformed program some other way.
fn check_unique_names(program: &Program) -> Result<(), CheckError> {
    if program.functions.is_empty() {
        return Err(CheckError::AnnotationFuncError);
    }
    let mut seen = HashSet::new();
    for f in &program.functions {
        if !seen.insert(f.name.clone()) {
            return Err(CheckError::AnnotationFuncError);
        }
    }
    Ok(())
}

/// Loop-invariant attachment: every `While` must be immediately
/// preceded, in its enclosing statement list, by a `@LOOP` annotation.
/// That annotation is popped out of the list and moved onto the
/// `While` node. Recurses into `If` branches and nested `While` bodies
/// first, so inner loops are attached before the outer sweep looks at
/// its own list.
fn attach_loop_invariants(stmts: &mut Vec<Stmt>) -> Result<(), CheckError> {
    for stmt in stmts.iter_mut() {
        match stmt {
            Stmt::If(_, then_body, else_body) => {
                attach_loop_invariants(then_body)?;
                attach_loop_invariants(else_body)?;
            }
            Stmt::While { body, .. } => attach_loop_invariants(body)?,
            _ => {}
        }
    }

    let mut i = 0;
    while i < stmts.len() {
        let is_loop_annotation = matches!(&stmts[i], Stmt::Annotation(AnnotationKind::Loop, _));
        if is_loop_annotation {
            let next_is_while = matches!(stmts.get(i + 1), Some(Stmt::While { .. }));
            if !next_is_while {
                let loc = annotation_location(&stmts[i]);
                return Err(CheckError::AnnotationWithNoWhileLoop { location: loc });
            }
            let annotation = stmts.remove(i);
            let Stmt::Annotation(AnnotationKind::Loop, inv) = annotation else { unreachable!() };
            let Stmt::While { invariant, .. } = &mut stmts[i] else { unreachable!() };
            *invariant = Some(Box::new(inv));
        }
        i += 1;
    }

    // Any `While` that survived without an invariant had no preceding
    // `@LOOP` at all.
    for stmt in stmts.iter() {
        if let Stmt::While { invariant: None, .. } = stmt {
            return Err(CheckError::LoopAnnotationError { location: SourceLocation::unknown() });
        }
    }
    Ok(())
}

fn annotation_location(_stmt: &Stmt) -> SourceLocation {
    // Statement nodes don't carry a source span (only tokens do, during
    // parsing); structural errors raised post-parse report an unknown
    // location rather than threading spans through every AST node.
    SourceLocation::unknown()
}

/// Extracts the header `Decl*  @PRE  @POST` prefix: fills
/// `function.precondition`/`postcondition` and rejects any `@PRE`/
/// `@POST` appearing anywhere else in the body (this is the check the
/// Python original's `isinstance(statement_index, ...)` bug made
/// ineffective: it compared the loop counter, an `int`, against a
/// statement class, so the "incorrect placement" branch never fired).
fn extract_header_annotations(function: &mut Function) -> Result<(), CheckError> {
    let mut i = 0;
    while i < function.body.len() && matches!(function.body[i], Stmt::Decl(..)) {
        i += 1;
    }

    let pre_idx = i;
    match function.body.get(pre_idx) {
        Some(Stmt::Annotation(AnnotationKind::Pre, _)) => {}
        _ => return Err(CheckError::PreConditionError("Missing precondition".to_string())),
    }
    let post_idx = pre_idx + 1;
    match function.body.get(post_idx) {
        Some(Stmt::Annotation(AnnotationKind::Post, _)) => {}
        _ => return Err(CheckError::PostConditionMissing),
    }

    let Stmt::Annotation(AnnotationKind::Pre, pre_expr) = &function.body[pre_idx] else { unreachable!() };
    let Stmt::Annotation(AnnotationKind::Post, post_expr) = &function.body[post_idx] else { unreachable!() };
    function.precondition = Some(pre_expr.clone());
    function.postcondition = Some(post_expr.clone());

    for (idx, stmt) in function.body.iter().enumerate() {
        if idx == pre_idx || idx == post_idx {
            continue;
        }
        match stmt {
            Stmt::Annotation(AnnotationKind::Pre, _) => {
                return Err(CheckError::PreConditionError("Incorrect placement".to_string()))
            }
            Stmt::Annotation(AnnotationKind::Post, _) => {
                return Err(CheckError::PostConditionError("Incorrect placement".to_string()))
            }
            _ => {}
        }
    }
    Ok(())
}

/// Pre/post may reference only the function's formal parameters (post
/// may additionally reference `rv`; pre may not). Loop invariants are
/// unrestricted.
fn check_annotation_scope(function: &Function) -> Result<(), CheckError> {
    let params: HashSet<&str> = function.params.iter().map(|(n, _)| n.as_str()).collect();

    if let Some(pre) = &function.precondition {
        let mut names = Vec::new();
        pre.referenced_names(&mut names);
        for n in &names {
            if n == "rv" {
                return Err(CheckError::PreConditionError("precondition may not reference rv".to_string()));
            }
            if !params.contains(n.as_str()) {
                return Err(CheckError::PreConditionError(format!("'{n}' is not a parameter")));
            }
        }
    }

    if let Some(post) = &function.postcondition {
        let mut names = Vec::new();
        post.referenced_names(&mut names);
        for n in &names {
            if n != "rv" && !params.contains(n.as_str()) {
                return Err(CheckError::PostConditionError(format!("'{n}' is not a parameter")));
            }
        }
    }

    Ok(())
}

/// Return coverage: every syntactic path not guarded only by a loop
/// must hit a `Return`. A block "returns" iff it has a top-level
/// `Return`, or an `If` whose both branches return.
fn check_return_coverage(function: &Function) -> Result<(), CheckError> {
    if !block_returns(&function.body) {
        return Err(CheckError::MissingReturnStatement { name: function.name.clone() });
    }
    check_return_types(&function.body, function.return_type)?;
    check_no_stray_expr_stmts(&function.body)
}

fn block_returns(stmts: &[Stmt]) -> bool {
    stmts.iter().any(|s| match s {
        Stmt::Return(_) => true,
        Stmt::If(_, then_body, else_body) => block_returns(then_body) && block_returns(else_body),
        _ => false,
    })
}

fn check_return_types(stmts: &[Stmt], return_type: DataType) -> Result<(), CheckError> {
    let ctx = crate::ast::TypeCtx { return_type };
    for stmt in stmts {
        match stmt {
            Stmt::Return(e) => {
                Expr::expect_type(e, return_type, &ctx, &SourceLocation::unknown())?;
            }
            Stmt::If(_, then_body, else_body) => {
                check_return_types(then_body, return_type)?;
                check_return_types(else_body, return_type)?;
            }
            Stmt::While { body, .. } => check_return_types(body, return_type)?,
            _ => {}
        }
    }
    Ok(())
}

/// A bare expression statement never has logical meaning in this
/// language; the grammar accepts `expr ";"` but every occurrence is
/// rejected here before path collection ever sees one.
fn check_no_stray_expr_stmts(stmts: &[Stmt]) -> Result<(), CheckError> {
    for stmt in stmts {
        match stmt {
            Stmt::ExprStmt(_) => {
                return Err(CheckError::ExpressionWithNoEffect { location: SourceLocation::unknown() })
            }
            Stmt::If(_, then_body, else_body) => {
                check_no_stray_expr_stmts(then_body)?;
                check_no_stray_expr_stmts(else_body)?;
            }
            Stmt::While { body, .. } => check_no_stray_expr_stmts(body)?,
            _ => {}
        }
    }
    Ok(())
}
