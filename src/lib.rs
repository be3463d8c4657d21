//! # sexpr
//!
//! sexpr is a general purpose S-expression language runtime written in
//! Rust. A pull-driven lexer scans a byte stream for a finite set of
//! typed lexemes, a recursive-descent parser builds abstract syntax trees
//! from them, and a streaming evaluator executes the trees against
//! hierarchical contexts, so that host functions consume their arguments
//! one at a time while sub-expressions run concurrently with their
//! consumers.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use crate::interpreter::{
    evaluator::{Interpreter, builtin},
    parser,
    value::Value,
};

/// Defines the structure of parsed code.
///
/// This module declares the `Node` type and related types that represent
/// the syntactic structure of source code as a tree. The tree is built by
/// the parser and walked by the evaluator.
///
/// # Responsibilities
/// - Defines the expression, list, map and leaf node types.
/// - Attaches the opening token to each node for error reporting.
/// - Renders trees back to source text.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised during lexing,
/// parsing or evaluating code. It standardizes error reporting and carries
/// detailed information about failures, including source positions where
/// they are known.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (lexer, parser, evaluator).
/// - Attaches line and column numbers where applicable.
/// - Supports integration with standard error handling traits.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, value
/// representations and all supporting infrastructure to provide a complete
/// runtime for source evaluation. It exposes the public API for
/// interpreting and executing programs.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, evaluator and value
///   types.
/// - Provides entry points for parsing and evaluating user code.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;

pub use crate::error::Error;

/// Parses and evaluates a script with the demonstration prelude installed,
/// returning the list of top-level results.
///
/// # Errors
/// Returns an error if parsing or evaluation fails.
///
/// # Examples
/// ```
/// let value = sexpr::run("(+ 1 2 3 4)").unwrap();
/// assert_eq!(value.to_string(), "[10]");
///
/// // An unresolved name in call position is a hard error.
/// assert!(sexpr::run("(no_such_function 1)").is_err());
/// ```
pub fn run(source: &str) -> Result<Value, Error> {
    let interp = Interpreter::new();
    builtin::install(&interp);

    let root = parser::parse(source.as_bytes())?;
    let (_ctx, value) = interp.eval(&root)?;
    Ok(value)
}
