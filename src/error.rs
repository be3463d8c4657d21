/// Parsing errors.
///
/// Defines all error types that can occur during lexing and parsing of
/// source text. Parse errors include unexpected tokens, premature end of
/// input, and numeric literals outside the representable range, each
/// carrying the 1-based source position where it was detected.
pub mod parse_error;
/// Runtime errors.
///
/// Contains all error types that can be raised while evaluating a syntax
/// tree: unresolved names in call position, operations on closed streams,
/// and type mismatches reported by host functions.
pub mod runtime_error;

pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Union of the two error phases, returned by entry points that both parse
/// and evaluate.
pub enum Error {
    /// The input failed to lex or parse.
    Parse(ParseError),
    /// The syntax tree failed to evaluate.
    Runtime(RuntimeError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => e.fmt(f),
            Self::Runtime(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Runtime(e) => Some(e),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<RuntimeError> for Error {
    fn from(e: RuntimeError) -> Self {
        Self::Runtime(e)
    }
}
