/// Demonstration host functions.
///
/// A small prelude of host functions (`+`, `=`, `echo`, `print`, `set`,
/// `get`, `defn`, `nop`, `:true`, `:false`) that exercises every part of
/// the context runtime: streaming argument reads, early stops, scope
/// access and user-defined functions. Installed by the runner binary and
/// the end-to-end tests.
pub mod builtin;
/// Runtime scopes and value streams.
///
/// Defines [`Context`](context::Context), the per-evaluation bundle of a
/// symbol table, an input stream, an output stream and the accept gate
/// coordinating producer and consumer.
pub mod context;
/// Tree evaluation and the host API.
///
/// Walks syntax trees against contexts, materializes and invokes
/// expressions, and exposes [`Interpreter`](self::core::Interpreter) for
/// registering host functions and running programs.
pub mod core;
/// Rendezvous hand-over primitives used by contexts.
pub(crate) mod stream;
/// Lexically scoped name bindings.
pub mod symbol_table;

pub use self::context::Context;
pub use self::core::{EvalResult, Interpreter, eval_context};
pub use self::symbol_table::SymbolTable;
