//! Deductive verifier for a small annotated imperative language (`.tpl`
//! source files). See [`ast`] for the expression/statement model,
//! [`checker`] for well-formedness validation, [`paths`] for basic-path
//! collection, [`vcgen`] for verification-condition generation, and
//! [`verification`] for the SMT bridge that discharges them.

pub mod ast;
pub mod checker;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod paths;
pub mod vcgen;
pub mod verification;

pub mod orchestrator;

pub use error::VerifierError;
