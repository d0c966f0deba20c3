//! SMT bridge : translates a closed [`Expr`] formula to
//! Z3's AST, asserts its negation, and interprets the verdict.
//!
//! Grounded on the reference compiler's `verification/solver_z3.rs`
//! (`Context`/`Solver` construction, one constant per symbol-table
//! variable, `SatResult` dispatch), generalized from that file's
//! `Formula` enum directly onto this crate's `Expr` since the two are
//! isomorphic at this language's scope (no arrays, reals, or
//! quantifiers).

use crate::ast::{BoolBinOp, CmpOp, DataType, Expr, IntBinOp, SymbolTable};
use std::collections::HashMap;
use z3::ast::{Ast, Bool, Int};
use z3::{Config, Context, SatResult, Solver};

/// A variable assignment witnessing invalidity.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub assignments: HashMap<String, ModelValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelValue {
    Int(i64),
    Bool(bool),
}

impl std::fmt::Display for ModelValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelValue::Int(n) => write!(f, "{n}"),
            ModelValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// The outcome of discharging one verification condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Valid,
    /// Carries a counter-model on `SAT`; `None` when the oracle
    /// returned `UNKNOWN`, which is treated as invalid with no model.
    Invalid(Option<Model>),
}

/// Decides satisfiability of `¬formula` and reports the verdict.
/// `symbols` supplies the declared type of every free variable `formula`
/// may reference; a fresh Z3 context is created per call so that oracle
/// state never leaks between basic paths.
pub fn decide(formula: &Expr, symbols: &SymbolTable) -> Decision {
    let config = Config::new();
    let context = Context::new(&config);
    let solver = Solver::new(&context);

    let mut translator = Translator { context: &context, ints: HashMap::new(), bools: HashMap::new() };
    let z3_formula = translator.to_bool(formula, symbols);

    solver.assert(&z3_formula.not());

    match solver.check() {
        SatResult::Unsat => Decision::Valid,
        SatResult::Sat => {
            let model = solver.get_model().map(|m| translator.extract_model(&m));
            Decision::Invalid(model)
        }
        SatResult::Unknown => Decision::Invalid(None),
    }
}

enum Value<'ctx> {
    Int(Int<'ctx>),
    Bool(Bool<'ctx>),
}

struct Translator<'ctx> {
    context: &'ctx Context,
    ints: HashMap<String, Int<'ctx>>,
    bools: HashMap<String, Bool<'ctx>>,
}

impl<'ctx> Translator<'ctx> {
    fn to_bool(&mut self, e: &Expr, symbols: &SymbolTable) -> Bool<'ctx> {
        match self.translate(e, symbols) {
            Value::Bool(b) => b,
            Value::Int(_) => unreachable!("type-checked formula must be BOOL at the top level"),
        }
    }

    fn to_int(&mut self, e: &Expr, symbols: &SymbolTable) -> Int<'ctx> {
        match self.translate(e, symbols) {
            Value::Int(i) => i,
            Value::Bool(_) => unreachable!("type-checked operand must be INT"),
        }
    }

    fn translate(&mut self, e: &Expr, symbols: &SymbolTable) -> Value<'ctx> {
        match e {
            Expr::IntLit(n) => Value::Int(Int::from_i64(self.context, *n)),
            Expr::BoolLit(b) => Value::Bool(Bool::from_bool(self.context, *b)),
            Expr::Var(name, DataType::Int) => Value::Int(self.int_const(name)),
            Expr::Var(name, DataType::Bool) => Value::Bool(self.bool_const(name)),
            Expr::ReturnVar => match symbols.get("rv") {
                Some(DataType::Int) => Value::Int(self.int_const("rv")),
                _ => Value::Bool(self.bool_const("rv")),
            },
            Expr::UnaryMinus(inner) => Value::Int(-self.to_int(inner, symbols)),
            Expr::Not(inner) => Value::Bool(self.to_bool(inner, symbols).not()),
            Expr::IntBinOp(l, r, op) => {
                let (l, r) = (self.to_int(l, symbols), self.to_int(r, symbols));
                Value::Int(match op {
                    IntBinOp::Add => l + r,
                    IntBinOp::Sub => l - r,
                    IntBinOp::Mul => l * r,
                })
            }
            Expr::Cmp(l, r, op) => Value::Bool(self.translate_cmp(l, r, *op, symbols)),
            Expr::BoolBinOp(l, r, op) => {
                let (l, r) = (self.to_bool(l, symbols), self.to_bool(r, symbols));
                Value::Bool(match op {
                    BoolBinOp::And => Bool::and(self.context, &[&l, &r]),
                    BoolBinOp::Or => Bool::or(self.context, &[&l, &r]),
                })
            }
            Expr::Implies(l, r) => {
                let (l, r) = (self.to_bool(l, symbols), self.to_bool(r, symbols));
                Value::Bool(l.implies(&r))
            }
        }
    }

    fn translate_cmp(&mut self, l: &Expr, r: &Expr, op: CmpOp, symbols: &SymbolTable) -> Bool<'ctx> {
        match (self.translate(l, symbols), self.translate(r, symbols)) {
            (Value::Int(l), Value::Int(r)) => match op {
                CmpOp::Eq => l._eq(&r),
                CmpOp::Ne => l._eq(&r).not(),
                CmpOp::Lt => l.lt(&r),
                CmpOp::Le => l.le(&r),
                CmpOp::Gt => l.gt(&r),
                CmpOp::Ge => l.ge(&r),
            },
            (Value::Bool(l), Value::Bool(r)) => match op {
                CmpOp::Eq => l._eq(&r),
                CmpOp::Ne => l._eq(&r).not(),
                // Ordering on BOOL is well-typed per the construction
                // rules (both operands share a type) but has no
                // standard meaning; treat FALSE < TRUE as the only
                // order, via the usual 0/1 embedding.
                _ => {
                    let (li, ri) = (self.bool_to_int(&l), self.bool_to_int(&r));
                    match op {
                        CmpOp::Lt => li.lt(&ri),
                        CmpOp::Le => li.le(&ri),
                        CmpOp::Gt => li.gt(&ri),
                        CmpOp::Ge => li.ge(&ri),
                        CmpOp::Eq | CmpOp::Ne => unreachable!(),
                    }
                }
            },
            _ => unreachable!("homogeneous Cmp operand types are enforced at construction"),
        }
    }

    fn bool_to_int(&self, b: &Bool<'ctx>) -> Int<'ctx> {
        b.ite(&Int::from_i64(self.context, 1), &Int::from_i64(self.context, 0))
    }

    fn int_const(&mut self, name: &str) -> Int<'ctx> {
        self.ints.entry(name.to_string()).or_insert_with(|| Int::new_const(self.context, name)).clone()
    }

    fn bool_const(&mut self, name: &str) -> Bool<'ctx> {
        self.bools.entry(name.to_string()).or_insert_with(|| Bool::new_const(self.context, name)).clone()
    }

    fn extract_model(&self, model: &z3::Model<'ctx>) -> Model {
        let mut assignments = HashMap::new();
        for (name, var) in &self.ints {
            if let Some(value) = model.eval(var, true).and_then(|v| v.as_i64()) {
                assignments.insert(name.clone(), ModelValue::Int(value));
            }
        }
        for (name, var) in &self.bools {
            if let Some(value) = model.eval(var, true).and_then(|v| v.as_bool()) {
                assignments.insert(name.clone(), ModelValue::Bool(value));
            }
        }
        Model { assignments }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::DataType;

    #[test]
    fn tautology_is_valid() {
        // x == x, for x: INT
        let mut symbols = SymbolTable::new();
        symbols.insert("x".to_string(), DataType::Int);
        let x = Expr::Var("x".to_string(), DataType::Int);
        let formula = Expr::Cmp(Box::new(x.clone()), Box::new(x), CmpOp::Eq);
        assert_eq!(decide(&formula, &symbols), Decision::Valid);
    }

    #[test]
    fn contradiction_is_invalid_with_model() {
        // x > x, for x: INT — never true, so the negation is always
        // satisfiable and the oracle must report a counter-model.
        let mut symbols = SymbolTable::new();
        symbols.insert("x".to_string(), DataType::Int);
        let x = Expr::Var("x".to_string(), DataType::Int);
        let formula = Expr::Cmp(Box::new(x.clone()), Box::new(x), CmpOp::Gt);
        match decide(&formula, &symbols) {
            Decision::Invalid(Some(model)) => assert!(model.assignments.contains_key("x")),
            other => panic!("expected Invalid(Some(_)), got {other:?}"),
        }
    }
}
