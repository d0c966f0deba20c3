//! Recursive-descent parser for the `.tpl` source language.
//! Expressions are built through the type-checked constructors
//! on [`crate::ast::Expr`], so an ill-typed expression is rejected the
//! moment it would be assembled rather than in a later pass.

use crate::ast::{AnnotationKind, DataType, Expr, Function, Program, Stmt, SymbolTable, TypeCtx};
use crate::error::{ParserError, SourceLocation};
use crate::lexer::{Lexer, Token, TokenType};
use std::collections::HashSet;

pub fn parse_program(source: &str, file: &str) -> Result<Program, ParserError> {
    let tokens = Lexer::new(source, file.to_string()).tokenize()?;
    Parser::new(tokens).parse_program()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    symtab: SymbolTable,
    function_names: HashSet<String>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0, symtab: SymbolTable::new(), function_names: HashSet::new() }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_type(&self) -> &TokenType {
        &self.current().token_type
    }

    fn loc(&self) -> SourceLocation {
        self.current().location.clone()
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, tt: &TokenType) -> bool {
        self.peek_type() == tt
    }

    fn expect(&mut self, tt: TokenType) -> Result<Token, ParserError> {
        if self.check(&tt) {
            Ok(self.advance())
        } else {
            Err(ParserError::UnexpectedToken {
                found: format!("{}", self.peek_type()),
                expected: format!("{tt}"),
                location: self.loc(),
            })
        }
    }

    fn expect_ident(&mut self) -> Result<(String, SourceLocation), ParserError> {
        let loc = self.loc();
        match self.advance().token_type {
            TokenType::Ident(name) => Ok((name, loc)),
            other => Err(ParserError::UnexpectedToken {
                found: format!("{other}"),
                expected: "identifier".to_string(),
                location: loc,
            }),
        }
    }

    // ---- top level ----------------------------------------------------

    fn parse_program(&mut self) -> Result<Program, ParserError> {
        let mut functions = Vec::new();
        while !self.check(&TokenType::Eof) {
            functions.push(self.parse_function()?);
        }
        Ok(Program { functions })
    }

    fn parse_type(&mut self) -> Result<(DataType, SourceLocation), ParserError> {
        let loc = self.loc();
        match self.advance().token_type {
            TokenType::KwInt => Ok((DataType::Int, loc)),
            TokenType::KwBool => Ok((DataType::Bool, loc)),
            other => Err(ParserError::UnexpectedToken {
                found: format!("{other}"),
                expected: "INT or BOOL".to_string(),
                location: loc,
            }),
        }
    }

    fn declare(&mut self, name: String, ty: DataType, loc: &SourceLocation) -> Result<(), ParserError> {
        if name == "rv" {
            return Err(ParserError::ReservedVariableName { location: loc.clone() });
        }
        if self.symtab.insert(name.clone(), ty).is_some() {
            return Err(ParserError::DuplicateDeclaration { name, location: loc.clone() });
        }
        Ok(())
    }

    fn parse_function(&mut self) -> Result<Function, ParserError> {
        self.symtab = SymbolTable::new();
        let (return_type, _) = self.parse_type()?;
        self.expect(TokenType::KwFunction)?;
        let (name, name_loc) = self.expect_ident()?;
        if !self.function_names.insert(name.clone()) {
            return Err(ParserError::DuplicateFunction { name, location: name_loc });
        }

        self.expect(TokenType::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenType::RParen) {
            loop {
                let (ty, _loc) = self.parse_type()?;
                let (pname, ploc) = self.expect_ident()?;
                self.declare(pname.clone(), ty, &ploc)?;
                params.push((pname, ty));
                if self.check(&TokenType::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenType::RParen)?;

        let ctx = TypeCtx { return_type };
        self.expect(TokenType::LBrace)?;
        let body = self.parse_body(&ctx)?;
        self.expect(TokenType::RBrace)?;

        Ok(Function {
            name,
            params,
            return_type,
            body,
            precondition: None,
            postcondition: None,
            symbols: self.symtab.clone(),
        })
    }

    // ---- bodies and statements -----------------------------------------

    fn parse_body(&mut self, ctx: &TypeCtx) -> Result<Vec<Stmt>, ParserError> {
        let mut stmts = Vec::new();

        if self.check(&TokenType::KwDeclare) {
            self.advance();
            self.expect(TokenType::LParen)?;
            if !self.check(&TokenType::RParen) {
                loop {
                    let (ty, _loc) = self.parse_type()?;
                    let (dname, dloc) = self.expect_ident()?;
                    self.declare(dname.clone(), ty, &dloc)?;
                    stmts.push(Stmt::Decl(dname, ty));
                    if self.check(&TokenType::Comma) {
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
            self.expect(TokenType::RParen)?;
            self.expect(TokenType::Semicolon)?;
        }

        while !self.check(&TokenType::RBrace) && !self.check(&TokenType::Eof) {
            if let Some(stmt) = self.parse_stmt(ctx)? {
                stmts.push(stmt);
            }
        }
        Ok(stmts)
    }

    /// Parses one statement. Returns `None` for a bare `NOP;`, which
    /// carries no meaning and is simply dropped from the tree.
    fn parse_stmt(&mut self, ctx: &TypeCtx) -> Result<Option<Stmt>, ParserError> {
        match self.peek_type().clone() {
            TokenType::KwNop => {
                self.advance();
                self.expect(TokenType::Semicolon)?;
                Ok(None)
            }
            TokenType::KwInt | TokenType::KwBool => {
                let (ty, _loc) = self.parse_type()?;
                let (name, nloc) = self.expect_ident()?;
                self.declare(name.clone(), ty, &nloc)?;
                self.expect(TokenType::Semicolon)?;
                Ok(Some(Stmt::Decl(name, ty)))
            }
            TokenType::KwAssume => {
                self.advance();
                let e = self.parse_expr(ctx)?;
                self.expect(TokenType::Semicolon)?;
                Ok(Some(Stmt::Assume(e)))
            }
            TokenType::KwReturn => {
                self.advance();
                let e = self.parse_expr(ctx)?;
                self.expect(TokenType::Semicolon)?;
                Ok(Some(Stmt::Return(e)))
            }
            TokenType::AnnotPre => {
                self.advance();
                let loc = self.loc();
                let e = self.parse_expr(ctx)?;
                Expr::expect_bool(&e, ctx, &loc)?;
                self.expect(TokenType::Semicolon)?;
                Ok(Some(Stmt::Annotation(AnnotationKind::Pre, e)))
            }
            TokenType::AnnotPost => {
                self.advance();
                let loc = self.loc();
                let e = self.parse_expr(ctx)?;
                Expr::expect_bool(&e, ctx, &loc)?;
                self.expect(TokenType::Semicolon)?;
                Ok(Some(Stmt::Annotation(AnnotationKind::Post, e)))
            }
            TokenType::AnnotLoop => {
                self.advance();
                let loc = self.loc();
                let e = self.parse_expr(ctx)?;
                Expr::expect_bool(&e, ctx, &loc)?;
                self.expect(TokenType::Semicolon)?;
                Ok(Some(Stmt::Annotation(AnnotationKind::Loop, e)))
            }
            TokenType::KwIf => {
                self.advance();
                self.expect(TokenType::LParen)?;
                let cond_loc = self.loc();
                let cond = self.parse_expr(ctx)?;
                Expr::expect_bool(&cond, ctx, &cond_loc)?;
                self.expect(TokenType::RParen)?;
                self.expect(TokenType::LBrace)?;
                let then_body = self.parse_body(ctx)?;
                self.expect(TokenType::RBrace)?;
                self.expect(TokenType::KwElse)?;
                self.expect(TokenType::LBrace)?;
                let else_body = self.parse_body(ctx)?;
                self.expect(TokenType::RBrace)?;
                Ok(Some(Stmt::If(cond, then_body, else_body)))
            }
            TokenType::KwWhile => {
                self.advance();
                self.expect(TokenType::LParen)?;
                let cond_loc = self.loc();
                let cond = self.parse_expr(ctx)?;
                Expr::expect_bool(&cond, ctx, &cond_loc)?;
                self.expect(TokenType::RParen)?;
                self.expect(TokenType::LBrace)?;
                let body = self.parse_body(ctx)?;
                self.expect(TokenType::RBrace)?;
                Ok(Some(Stmt::while_loop(cond, body)))
            }
            TokenType::Ident(_) => {
                // Either `name := expr;` or a bare expression statement.
                let (name, loc) = self.expect_ident()?;
                if self.check(&TokenType::Assign) {
                    self.advance();
                    let rhs_loc = self.loc();
                    let rhs = self.parse_expr(ctx)?;
                    let declared_ty = self.symtab.get(&name).copied().ok_or_else(|| {
                        ParserError::UndeclaredVariable { name: name.clone(), location: loc.clone() }
                    })?;
                    Expr::expect_type(&rhs, declared_ty, ctx, &rhs_loc)?;
                    self.expect(TokenType::Semicolon)?;
                    Ok(Some(Stmt::Assign(name, rhs)))
                } else {
                    let e = self.parse_expr_from_ident(name, loc)?;
                    self.expect(TokenType::Semicolon)?;
                    Ok(Some(Stmt::ExprStmt(e)))
                }
            }
            _ => {
                let e = self.parse_expr(ctx)?;
                self.expect(TokenType::Semicolon)?;
                Ok(Some(Stmt::ExprStmt(e)))
            }
        }
    }

    // ---- expressions: precedence climbing ------------------------------
    //
    // implies  (left, lowest)
    // or/and   (left)
    // compare  (nonassoc)
    // + -      (left)
    // *        (left)
    // unary - !  (right)
    // primary  (highest)

    fn parse_expr(&mut self, ctx: &TypeCtx) -> Result<Expr, ParserError> {
        self.parse_implies(ctx)
    }

    fn parse_implies(&mut self, ctx: &TypeCtx) -> Result<Expr, ParserError> {
        let mut left = self.parse_or(ctx)?;
        while self.check(&TokenType::Implies) {
            let loc = self.loc();
            self.advance();
            let right = self.parse_or(ctx)?;
            left = Expr::implies(left, right, ctx, &loc)?;
        }
        Ok(left)
    }

    fn parse_or(&mut self, ctx: &TypeCtx) -> Result<Expr, ParserError> {
        let mut left = self.parse_cmp(ctx)?;
        loop {
            let loc = self.loc();
            let op = match self.peek_type() {
                TokenType::And => crate::ast::BoolBinOp::And,
                TokenType::Or => crate::ast::BoolBinOp::Or,
                _ => break,
            };
            self.advance();
            let right = self.parse_cmp(ctx)?;
            left = Expr::bool_bin_op(left, right, op, ctx, &loc)?;
        }
        Ok(left)
    }

    fn parse_cmp(&mut self, ctx: &TypeCtx) -> Result<Expr, ParserError> {
        let left = self.parse_add(ctx)?;
        let loc = self.loc();
        let op = match self.peek_type() {
            TokenType::EqEq => crate::ast::CmpOp::Eq,
            TokenType::NotEq => crate::ast::CmpOp::Ne,
            TokenType::Lt => crate::ast::CmpOp::Lt,
            TokenType::Le => crate::ast::CmpOp::Le,
            TokenType::Gt => crate::ast::CmpOp::Gt,
            TokenType::Ge => crate::ast::CmpOp::Ge,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_add(ctx)?;
        Ok(Expr::cmp(left, right, op, ctx, &loc)?)
    }

    fn parse_add(&mut self, ctx: &TypeCtx) -> Result<Expr, ParserError> {
        let mut left = self.parse_mul(ctx)?;
        loop {
            let loc = self.loc();
            let op = match self.peek_type() {
                TokenType::Plus => crate::ast::IntBinOp::Add,
                TokenType::Minus => crate::ast::IntBinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_mul(ctx)?;
            left = Expr::int_bin_op(left, right, op, ctx, &loc)?;
        }
        Ok(left)
    }

    fn parse_mul(&mut self, ctx: &TypeCtx) -> Result<Expr, ParserError> {
        let mut left = self.parse_unary(ctx)?;
        while self.check(&TokenType::Star) {
            let loc = self.loc();
            self.advance();
            let right = self.parse_unary(ctx)?;
            left = Expr::int_bin_op(left, right, crate::ast::IntBinOp::Mul, ctx, &loc)?;
        }
        Ok(left)
    }

    fn parse_unary(&mut self, ctx: &TypeCtx) -> Result<Expr, ParserError> {
        let loc = self.loc();
        match self.peek_type() {
            TokenType::Minus => {
                self.advance();
                let operand = self.parse_unary(ctx)?;
                Ok(Expr::unary_minus(operand, ctx, &loc)?)
            }
            TokenType::Not => {
                self.advance();
                let operand = self.parse_unary(ctx)?;
                Ok(Expr::not(operand, ctx, &loc)?)
            }
            _ => self.parse_primary(ctx),
        }
    }

    fn parse_primary(&mut self, ctx: &TypeCtx) -> Result<Expr, ParserError> {
        let loc = self.loc();
        match self.advance().token_type {
            TokenType::Int(n) => Ok(Expr::IntLit(n)),
            TokenType::Bool(b) => Ok(Expr::BoolLit(b)),
            TokenType::LParen => {
                let e = self.parse_expr(ctx)?;
                self.expect(TokenType::RParen)?;
                Ok(e)
            }
            TokenType::Ident(name) => self.parse_expr_from_ident(name, loc),
            other => Err(ParserError::UnexpectedToken {
                found: format!("{other}"),
                expected: "an expression".to_string(),
                location: loc,
            }),
        }
    }

    fn parse_expr_from_ident(&mut self, name: String, loc: SourceLocation) -> Result<Expr, ParserError> {
        if name == "rv" {
            return Ok(Expr::ReturnVar);
        }
        match self.symtab.get(&name) {
            Some(ty) => Ok(Expr::Var(name, *ty)),
            None => Err(ParserError::UndeclaredVariable { name, location: loc }),
        }
    }
}
