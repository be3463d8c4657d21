/// The evaluator module executes syntax trees and computes results.
///
/// Evaluation walks the tree concurrently: every container node and every
/// invocation runs as its own task, connected to its consumer through a
/// context's rendezvous streams. The module also hosts the runtime scope
/// type and the host-function API.
///
/// # Responsibilities
/// - Evaluates nodes, materializes expression arguments and invokes
///   functions with accept-gated argument delivery.
/// - Manages scopes, closures and cancellation across contexts.
/// - Surfaces evaluation errors at the collection points.
pub mod evaluator;
/// The lexer module tokenizes source text for further parsing.
///
/// The lexer reads the raw source and produces a stream of tokens, each
/// carrying its lexeme and 1-based source position. It is pull-driven: the
/// parser requests one token at a time and the lexer pauses in between.
///
/// # Responsibilities
/// - Classifies input into the closed set of token kinds.
/// - Tracks lines and columns for error reporting.
/// - Supports being stopped mid-scan.
pub mod lexer;
/// The parser module builds the abstract syntax tree from tokens.
///
/// The parser drives its lexer in lock-step with one token of lookahead
/// and assembles expressions, lists, maps and leaf values into a tree
/// rooted at a synthetic list of top-level forms.
///
/// # Responsibilities
/// - Validates the grammar, reporting errors with source positions.
/// - Merges multi-token constructs: strings, atoms and decimal numbers.
/// - Optionally closes unterminated containers at end of input.
pub mod parser;
/// The value module defines the runtime data types for evaluation.
///
/// Declares the tagged [`Value`](value::Value) union used throughout
/// evaluation — nil, booleans, numbers, strings, atoms, symbols, lists,
/// maps and host functions — together with total equality and hashing so
/// values can key maps.
pub mod value;
