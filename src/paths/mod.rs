//! Basic path collection , grounded on the reference
//! implementation's `collector()`: a recursive traversal over a
//! function's body that emits every annotation-to-annotation
//! straight-line fragment.

use crate::ast::{Expr, Function, Stmt, TypeCtx};
use crate::error::{CheckError, SourceLocation};

/// One element of a basic path: either a logical cut point
/// (`Annotation`-derived) or an executable element carried along the
/// path (`Assign`/`Assume`).
#[derive(Debug, Clone, PartialEq)]
pub enum PathElem {
    Annotation(Expr),
    Assign(String, Expr),
    Assume(Expr),
}

pub type BasicPath = Vec<PathElem>;

/// What a path currently being built closes onto once its statement
/// queue runs dry: the function's postcondition, or the invariant of
/// the loop it is currently inside.
#[derive(Debug, Clone)]
enum PathOrigin {
    Function,
    Loop(Expr),
}

impl PathOrigin {
    fn closing_annotation<'a>(&'a self, postcondition: &'a Expr) -> &'a Expr {
        match self {
            PathOrigin::Function => postcondition,
            PathOrigin::Loop(invariant) => invariant,
        }
    }
}

/// Collects every basic path through `function`'s body (the statements
/// after the `@PRE`/`@POST` header). The function must already be
/// checked: `precondition`/`postcondition` filled, every `While`'s
/// invariant attached.
pub fn collect_paths(function: &Function) -> Result<Vec<BasicPath>, CheckError> {
    let postcondition = function
        .postcondition
        .clone()
        .expect("collect_paths requires a checked function with a postcondition");
    let precondition = function
        .precondition
        .clone()
        .expect("collect_paths requires a checked function with a precondition");

    let ctx = function.type_ctx();
    let mut paths = Vec::new();
    let seed = vec![PathElem::Annotation(precondition)];
    collector(function.body_after_header(), seed, &PathOrigin::Function, &postcondition, &ctx, &mut paths)?;
    Ok(paths)
}

fn collector(
    remaining: &[Stmt],
    path: BasicPath,
    origin: &PathOrigin,
    postcondition: &Expr,
    ctx: &TypeCtx,
    out: &mut Vec<BasicPath>,
) -> Result<(), CheckError> {
    let Some((head, tail)) = remaining.split_first() else {
        let mut closed = path;
        closed.push(PathElem::Annotation(origin.closing_annotation(postcondition).clone()));
        out.push(closed);
        return Ok(());
    };

    match head {
        Stmt::Decl(..) => collector(tail, path, origin, postcondition, ctx, out),

        Stmt::Assign(name, e) => {
            let mut extended = path;
            extended.push(PathElem::Assign(name.clone(), e.clone()));
            collector(tail, extended, origin, postcondition, ctx, out)
        }

        Stmt::Assume(e) => {
            let mut extended = path;
            extended.push(PathElem::Assume(e.clone()));
            collector(tail, extended, origin, postcondition, ctx, out)
        }

        Stmt::If(cond, then_body, else_body) => {
            let mut then_path = path.clone();
            then_path.push(PathElem::Assume(cond.clone()));
            let then_stmts: Vec<Stmt> = then_body.iter().cloned().chain(tail.iter().cloned()).collect();
            collector(&then_stmts, then_path, origin, postcondition, ctx, out)?;

            let not_cond = Expr::not(cond.clone(), ctx, &SourceLocation::unknown())
                .expect("condition of an already-checked IF is BOOL");
            let mut else_path = path;
            else_path.push(PathElem::Assume(not_cond));
            let else_stmts: Vec<Stmt> = else_body.iter().cloned().chain(tail.iter().cloned()).collect();
            collector(&else_stmts, else_path, origin, postcondition, ctx, out)
        }

        Stmt::While { cond, body, invariant } => {
            let invariant = invariant
                .as_ref()
                .expect("While.invariant is attached by the well-formedness checker before path collection")
                .as_ref()
                .clone();

            // 1. Close the path leading into the loop.
            let mut into_loop = path;
            into_loop.push(PathElem::Annotation(invariant.clone()));
            out.push(into_loop);

            // 2. Body path: invariant ∧ cond, closing back onto the invariant.
            let loop_origin = PathOrigin::Loop(invariant.clone());
            let body_seed = vec![PathElem::Annotation(invariant.clone()), PathElem::Assume(cond.clone())];
            collector(body, body_seed, &loop_origin, postcondition, ctx, out)?;

            // 3. Exit path: invariant ∧ ¬cond, continuing with the
            //    enclosing tail under the *original* origin context.
            let not_cond = Expr::not(cond.clone(), ctx, &SourceLocation::unknown())
                .expect("condition of an already-checked WHILE is BOOL");
            let exit_seed = vec![PathElem::Annotation(invariant), PathElem::Assume(not_cond)];
            collector(tail, exit_seed, origin, postcondition, ctx, out)
        }

        Stmt::Return(e) => {
            let mut closed = path;
            closed.push(PathElem::Assign("rv".to_string(), e.clone()));
            closed.push(PathElem::Annotation(postcondition.clone()));
            out.push(closed);
            Ok(())
        }

        Stmt::Annotation(_, _) => {
            // Attachment already removed every well-placed `@LOOP`, and
            // the header pass already extracted `@PRE`/`@POST`; any
            // annotation reaching here is misplaced.
            Err(CheckError::AnnotationWithNoWhileLoop { location: SourceLocation::unknown() })
        }

        Stmt::ExprStmt(_) => {
            // Ruled out by the well-formedness checker before this runs.
            Err(CheckError::ExpressionWithNoEffect { location: SourceLocation::unknown() })
        }
    }
}
