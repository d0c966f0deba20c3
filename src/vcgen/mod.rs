//! Verification-condition generation : backward
//! substitution and implication chaining over one basic path.
//!
//! Grounded on the reference implementation's `convert_to_z3` reverse
//! walk, with its two bugs fixed: substitution builds a fresh `Expr`
//! per step instead of mutating shared nodes, and the result of every
//! substitution is rebound rather than discarded.

use crate::ast::Expr;
use crate::paths::{BasicPath, PathElem};

/// The verification condition for one basic path: `pre => phi`.
#[derive(Debug, Clone)]
pub struct VerificationCondition {
    pub precondition: Expr,
    pub formula: Expr,
}

impl VerificationCondition {
    /// `precondition => formula`, the single closed formula handed to
    /// the SMT bridge.
    pub fn as_implication(&self) -> Expr {
        Expr::Implies(Box::new(self.precondition.clone()), Box::new(self.formula.clone()))
    }
}

/// Builds the VC for one basic path `[A0, s1, ..., sn-1, An]`.
///
/// Panics if `path` does not start and end with `PathElem::Annotation`
/// or contains anything but `Assign`/`Assume` in between — the path
/// collector's closure invariant guarantees this never happens for
/// paths it produces.
pub fn generate_vc(path: &BasicPath) -> VerificationCondition {
    let (first, body, last) = split_path(path);

    let mut formula = last.clone();
    for elem in body.iter().rev() {
        formula = match elem {
            PathElem::Assign(name, e) => formula.substitute(name, e),
            PathElem::Assume(psi) => Expr::Implies(Box::new(psi.clone()), Box::new(formula)),
            PathElem::Annotation(_) => unreachable!("basic path body may only contain Assign/Assume"),
        };
    }

    VerificationCondition { precondition: first.clone(), formula }
}

fn split_path(path: &BasicPath) -> (&Expr, &[PathElem], &Expr) {
    let PathElem::Annotation(first) = path.first().expect("basic path is non-empty") else {
        panic!("basic path must start with an annotation");
    };
    let PathElem::Annotation(last) = path.last().expect("basic path is non-empty") else {
        panic!("basic path must end with an annotation");
    };
    (first, &path[1..path.len() - 1], last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CmpOp, DataType};

    #[test]
    fn assign_substitutes_backward() {
        // [TRUE, x := 1, x == 1]
        let pre = Expr::BoolLit(true);
        let x = Expr::Var("x".to_string(), DataType::Int);
        let post = Expr::Cmp(Box::new(x.clone()), Box::new(Expr::IntLit(1)), CmpOp::Eq);
        let path = vec![
            PathElem::Annotation(pre.clone()),
            PathElem::Assign("x".to_string(), Expr::IntLit(1)),
            PathElem::Annotation(post),
        ];
        let vc = generate_vc(&path);
        assert_eq!(vc.precondition, pre);
        // 1 == 1
        assert_eq!(vc.formula, Expr::Cmp(Box::new(Expr::IntLit(1)), Box::new(Expr::IntLit(1)), CmpOp::Eq));
    }

    #[test]
    fn assume_chains_as_implication() {
        let pre = Expr::BoolLit(true);
        let cond = Expr::Var("c".to_string(), DataType::Bool);
        let post = Expr::BoolLit(true);
        let path = vec![
            PathElem::Annotation(pre.clone()),
            PathElem::Assume(cond.clone()),
            PathElem::Annotation(post.clone()),
        ];
        let vc = generate_vc(&path);
        assert_eq!(vc.formula, Expr::Implies(Box::new(cond), Box::new(post)));
    }
}
