//! Expression and statement model.
//!
//! `Expr` and `Stmt` are closed tagged variants (sum types) rather than
//! a class hierarchy with dynamic dispatch: every sub-expression's
//! declared type is checked against its operator's signature at
//! construction time, so an ill-typed tree can never be built.

use crate::error::{CheckError, SourceLocation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub mod display;

/// The two value types this language knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Int,
    Bool,
}

/// Per-function variable -> type mapping, populated during parsing.
pub type SymbolTable = HashMap<String, DataType>;

/// Context needed to resolve the type of `rv` while constructing or
/// type-checking an expression. A function's return type is known as
/// soon as its header is parsed, so this is available for the whole
/// body, including the precondition.
#[derive(Debug, Clone, Copy)]
pub struct TypeCtx {
    pub return_type: DataType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntBinOp {
    Add,
    Sub,
    Mul,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoolBinOp {
    And,
    Or,
}

/// A closed expression variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    IntLit(i64),
    BoolLit(bool),
    Var(String, DataType),
    /// The reserved symbol denoting the function result, name fixed to `rv`.
    ReturnVar,
    UnaryMinus(Box<Expr>),
    Not(Box<Expr>),
    IntBinOp(Box<Expr>, Box<Expr>, IntBinOp),
    Cmp(Box<Expr>, Box<Expr>, CmpOp),
    BoolBinOp(Box<Expr>, Box<Expr>, BoolBinOp),
    Implies(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// The statically-known type of this expression. Construction
    /// functions below use this to reject ill-typed trees before they
    /// exist.
    pub fn type_of(&self, ctx: &TypeCtx) -> DataType {
        match self {
            Expr::IntLit(_) => DataType::Int,
            Expr::BoolLit(_) => DataType::Bool,
            Expr::Var(_, ty) => *ty,
            Expr::ReturnVar => ctx.return_type,
            Expr::UnaryMinus(_) => DataType::Int,
            Expr::Not(_) => DataType::Bool,
            Expr::IntBinOp(..) => DataType::Int,
            Expr::Cmp(..) => DataType::Bool,
            Expr::BoolBinOp(..) => DataType::Bool,
            Expr::Implies(..) => DataType::Bool,
        }
    }

    fn expect(
        ty: DataType,
        expected: DataType,
        location: &SourceLocation,
    ) -> Result<(), CheckError> {
        if ty == expected {
            Ok(())
        } else {
            Err(CheckError::InvalidExpressionType {
                expected,
                found: ty,
                location: location.clone(),
            })
        }
    }

    pub fn unary_minus(operand: Expr, ctx: &TypeCtx, loc: &SourceLocation) -> Result<Expr, CheckError> {
        Self::expect(operand.type_of(ctx), DataType::Int, loc)?;
        Ok(Expr::UnaryMinus(Box::new(operand)))
    }

    pub fn not(operand: Expr, ctx: &TypeCtx, loc: &SourceLocation) -> Result<Expr, CheckError> {
        Self::expect(operand.type_of(ctx), DataType::Bool, loc)?;
        Ok(Expr::Not(Box::new(operand)))
    }

    pub fn int_bin_op(left: Expr, right: Expr, op: IntBinOp, ctx: &TypeCtx, loc: &SourceLocation) -> Result<Expr, CheckError> {
        Self::expect(left.type_of(ctx), DataType::Int, loc)?;
        Self::expect(right.type_of(ctx), DataType::Int, loc)?;
        Ok(Expr::IntBinOp(Box::new(left), Box::new(right), op))
    }

    pub fn cmp(left: Expr, right: Expr, op: CmpOp, ctx: &TypeCtx, loc: &SourceLocation) -> Result<Expr, CheckError> {
        let lt = left.type_of(ctx);
        let rt = right.type_of(ctx);
        if lt != rt {
            return Err(CheckError::InvalidExpressionType { expected: lt, found: rt, location: loc.clone() });
        }
        Ok(Expr::Cmp(Box::new(left), Box::new(right), op))
    }

    pub fn bool_bin_op(left: Expr, right: Expr, op: BoolBinOp, ctx: &TypeCtx, loc: &SourceLocation) -> Result<Expr, CheckError> {
        Self::expect(left.type_of(ctx), DataType::Bool, loc)?;
        Self::expect(right.type_of(ctx), DataType::Bool, loc)?;
        Ok(Expr::BoolBinOp(Box::new(left), Box::new(right), op))
    }

    pub fn implies(left: Expr, right: Expr, ctx: &TypeCtx, loc: &SourceLocation) -> Result<Expr, CheckError> {
        Self::expect(left.type_of(ctx), DataType::Bool, loc)?;
        Self::expect(right.type_of(ctx), DataType::Bool, loc)?;
        Ok(Expr::Implies(Box::new(left), Box::new(right)))
    }

    /// Asserts `e` has type `BOOL`, used where the grammar demands a
    /// condition (annotations, `IF`/`WHILE` guards) rather than building
    /// a new node.
    pub fn expect_bool(e: &Expr, ctx: &TypeCtx, loc: &SourceLocation) -> Result<(), CheckError> {
        Self::expect(e.type_of(ctx), DataType::Bool, loc)
    }

    /// Asserts `e` has type `expected`, used for assignment targets
    /// whose declared type is already known.
    pub fn expect_type(e: &Expr, expected: DataType, ctx: &TypeCtx, loc: &SourceLocation) -> Result<(), CheckError> {
        Self::expect(e.type_of(ctx), expected, loc)
    }

    /// Capture-free, functional textual substitution of `var` by
    /// `with` throughout `self`. Never mutates `self`; always returns
    /// a new tree. The source language has no binders inside
    /// formulas, so no alpha-renaming is required.
    ///
    /// `var == "rv"` also matches [`Expr::ReturnVar`] nodes, since a
    /// rewritten `Return` statement targets `rv` by name but the tree
    /// still carries the dedicated variant.
    pub fn substitute(&self, var: &str, with: &Expr) -> Expr {
        match self {
            Expr::IntLit(_) | Expr::BoolLit(_) => self.clone(),
            Expr::Var(name, _) => {
                if name == var {
                    with.clone()
                } else {
                    self.clone()
                }
            }
            Expr::ReturnVar => {
                if var == "rv" {
                    with.clone()
                } else {
                    Expr::ReturnVar
                }
            }
            Expr::UnaryMinus(e) => Expr::UnaryMinus(Box::new(e.substitute(var, with))),
            Expr::Not(e) => Expr::Not(Box::new(e.substitute(var, with))),
            Expr::IntBinOp(l, r, op) => {
                Expr::IntBinOp(Box::new(l.substitute(var, with)), Box::new(r.substitute(var, with)), *op)
            }
            Expr::Cmp(l, r, op) => {
                Expr::Cmp(Box::new(l.substitute(var, with)), Box::new(r.substitute(var, with)), *op)
            }
            Expr::BoolBinOp(l, r, op) => {
                Expr::BoolBinOp(Box::new(l.substitute(var, with)), Box::new(r.substitute(var, with)), *op)
            }
            Expr::Implies(l, r) => {
                Expr::Implies(Box::new(l.substitute(var, with)), Box::new(r.substitute(var, with)))
            }
        }
    }

    /// Names of every `Var`/`ReturnVar` reachable from this expression.
    pub fn referenced_names(&self, out: &mut Vec<String>) {
        match self {
            Expr::IntLit(_) | Expr::BoolLit(_) => {}
            Expr::Var(name, _) => out.push(name.clone()),
            Expr::ReturnVar => out.push("rv".to_string()),
            Expr::UnaryMinus(e) | Expr::Not(e) => e.referenced_names(out),
            Expr::IntBinOp(l, r, _) | Expr::Cmp(l, r, _) | Expr::BoolBinOp(l, r, _) | Expr::Implies(l, r) => {
                l.referenced_names(out);
                r.referenced_names(out);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationKind {
    Pre,
    Post,
    Loop,
}

/// A closed statement variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    Decl(String, DataType),
    Assign(String, Expr),
    /// Non-executable; constrains the current logical state.
    Assume(Expr),
    If(Expr, Vec<Stmt>, Vec<Stmt>),
    /// `invariant` is `None` until the well-formedness checker's
    /// annotation-attachment pass runs; it is never `None` afterwards.
    While {
        cond: Expr,
        body: Vec<Stmt>,
        invariant: Option<Box<Expr>>,
    },
    Return(Expr),
    Annotation(AnnotationKind, Expr),
    /// A bare expression statement. The grammar accepts it (`expr ";"`)
    /// but no statement kind in the data model gives it logical
    /// meaning, so the well-formedness pass always rejects it with
    /// `ExpressionWithNoEffect` before it can reach path collection.
    ExprStmt(Expr),
}

impl Stmt {
    pub fn while_loop(cond: Expr, body: Vec<Stmt>) -> Stmt {
        Stmt::While { cond, body, invariant: None }
    }
}

/// A function declaration: name, ordered parameters, return type,
/// body, and the pre/postcondition extracted during validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<(String, DataType)>,
    pub return_type: DataType,
    pub body: Vec<Stmt>,
    pub precondition: Option<Expr>,
    pub postcondition: Option<Expr>,
    pub symbols: SymbolTable,
}

impl Function {
    pub fn type_ctx(&self) -> TypeCtx {
        TypeCtx { return_type: self.return_type }
    }

    /// The statements after the `@PRE`/`@POST` header pair (and any
    /// leading `Decl`s), i.e. the part the path collector walks.
    pub fn body_after_header(&self) -> &[Stmt] {
        let mut idx = 0;
        while idx < self.body.len() {
            if matches!(&self.body[idx], Stmt::Annotation(AnnotationKind::Post, _)) {
                return &self.body[idx + 1..];
            }
            idx += 1;
        }
        &[]
    }
}

/// A whole program: an ordered sequence of function declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub functions: Vec<Function>,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int => write!(f, "INT"),
            DataType::Bool => write!(f, "BOOL"),
        }
    }
}
