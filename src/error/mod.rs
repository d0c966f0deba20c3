//! Error types for the verifier pipeline.
//!
//! Each phase of the pipeline (lexer, parser, well-formedness checker,
//! SMT bridge) gets its own error enum; [`VerifierError`] wraps them
//! for the orchestrator and the CLI.

use std::fmt;
use thiserror::Error;

/// A position in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: String, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }

    pub fn unknown() -> Self {
        Self { file: "<unknown>".to_string(), line: 0, column: 0 }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Lexical analysis errors.
#[derive(Error, Debug, Clone)]
pub enum LexerError {
    #[error("unexpected character '{character}' at {location}")]
    UnexpectedCharacter { character: char, location: SourceLocation },

    #[error("invalid number literal '{value}' at {location}")]
    InvalidNumber { value: String, location: SourceLocation },

    #[error("unterminated token starting at {location}")]
    UnterminatedToken { location: SourceLocation },
}

/// Parsing errors.
#[derive(Error, Debug, Clone)]
pub enum ParserError {
    #[error("unexpected token {found}, expected {expected} at {location}")]
    UnexpectedToken { found: String, expected: String, location: SourceLocation },

    #[error("variable '{name}' used but not declared at {location}")]
    UndeclaredVariable { name: String, location: SourceLocation },

    #[error("variable '{name}' already declared at {location}")]
    DuplicateDeclaration { name: String, location: SourceLocation },

    #[error("variable name 'rv' is reserved at {location}")]
    ReservedVariableName { location: SourceLocation },

    #[error("duplicate function name '{name}' at {location}")]
    DuplicateFunction { name: String, location: SourceLocation },

    #[error(transparent)]
    Lexer(#[from] LexerError),

    #[error(transparent)]
    Check(#[from] CheckError),
}

/// Structural well-formedness errors, one kind per rule. These are
/// fatal for the whole file; no partial analysis is attempted once one
/// is raised.
#[derive(Error, Debug, Clone)]
pub enum CheckError {
    #[error("only function declarations are allowed at the top level")]
    AnnotationFuncError,

    #[error("precondition error: {0}")]
    PreConditionError(String),

    #[error("postcondition error: {0}")]
    PostConditionError(String),

    #[error("postcondition missing")]
    PostConditionMissing,

    #[error("while loop without a preceding @LOOP annotation at {location}")]
    LoopAnnotationError { location: SourceLocation },

    #[error("@LOOP annotation not immediately followed by a while loop at {location}")]
    AnnotationWithNoWhileLoop { location: SourceLocation },

    #[error("expression statement has no effect at {location}")]
    ExpressionWithNoEffect { location: SourceLocation },

    #[error("function '{name}' is missing a return statement on some path")]
    MissingReturnStatement { name: String },

    #[error("expression of type {found:?} used where {expected:?} was expected at {location}")]
    InvalidExpressionType { expected: crate::ast::DataType, found: crate::ast::DataType, location: SourceLocation },
}

/// Errors raised by the SMT bridge.
#[derive(Error, Debug, Clone)]
pub enum SolverError {
    #[error("oracle returned unknown for '{name}'")]
    Unknown { name: String },

    #[error("oracle failure for '{name}': {reason}")]
    OracleFailure { name: String, reason: String },
}

/// Top-level error type threaded through the orchestrator and surfaced
/// by the CLI.
#[derive(Error, Debug, Clone)]
pub enum VerifierError {
    #[error(transparent)]
    Parser(#[from] ParserError),

    #[error(transparent)]
    Check(#[from] CheckError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}
