//! Pretty-printing for expressions and statements, producing valid
//! `.tpl` surface syntax so a printed path can be re-parsed into a
//! structurally equivalent tree (see "Round-trip").

use super::{AnnotationKind, BoolBinOp, CmpOp, Expr, IntBinOp, Stmt};
use std::fmt;

impl fmt::Display for IntBinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntBinOp::Add => "+",
            IntBinOp::Sub => "-",
            IntBinOp::Mul => "*",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for BoolBinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BoolBinOp::And => "^",
            BoolBinOp::Or => "v",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::IntLit(n) => write!(f, "{n}"),
            Expr::BoolLit(true) => write!(f, "TRUE"),
            Expr::BoolLit(false) => write!(f, "FALSE"),
            Expr::Var(name, _) => write!(f, "{name}"),
            Expr::ReturnVar => write!(f, "rv"),
            Expr::UnaryMinus(e) => write!(f, "(-{e})"),
            Expr::Not(e) => write!(f, "!({e})"),
            Expr::IntBinOp(l, r, op) => write!(f, "({l} {op} {r})"),
            Expr::Cmp(l, r, op) => write!(f, "({l} {op} {r})"),
            Expr::BoolBinOp(l, r, op) => write!(f, "({l} {op} {r})"),
            Expr::Implies(l, r) => write!(f, "({l} => {r})"),
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnnotationKind::Pre => "@PRE",
            AnnotationKind::Post => "@POST",
            AnnotationKind::Loop => "@LOOP",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Decl(name, ty) => write!(f, "{ty} {name};"),
            Stmt::Assign(name, e) => write!(f, "{name} := {e};"),
            Stmt::Assume(e) => write!(f, "ASSUME {e};"),
            Stmt::If(cond, then_body, else_body) => {
                write!(f, "IF ({cond}) {{ ")?;
                for s in then_body {
                    write!(f, "{s} ")?;
                }
                write!(f, "}} ELSE {{ ")?;
                for s in else_body {
                    write!(f, "{s} ")?;
                }
                write!(f, "}}")
            }
            Stmt::While { cond, body, .. } => {
                write!(f, "WHILE ({cond}) {{ ")?;
                for s in body {
                    write!(f, "{s} ")?;
                }
                write!(f, "}}")
            }
            Stmt::Return(e) => write!(f, "RETURN {e};"),
            Stmt::Annotation(kind, e) => write!(f, "{kind} {e};"),
            Stmt::ExprStmt(e) => write!(f, "{e};"),
        }
    }
}
