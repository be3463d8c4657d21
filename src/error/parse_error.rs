#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can occur during lexing or parsing.
pub enum ParseError {
    /// Found a token that is not valid at the current position.
    UnexpectedToken {
        /// The lexeme of the offending token.
        token:  String,
        /// The source line where the token starts.
        line:   usize,
        /// The source column where the token starts.
        column: usize,
    },
    /// Reached the end of input inside an unterminated construct.
    UnexpectedEof {
        /// The source line where the end of input was observed.
        line:   usize,
        /// The source column where the end of input was observed.
        column: usize,
    },
    /// A numeric literal does not fit the 64-bit value range.
    NumberOutOfRange {
        /// The lexeme of the offending literal.
        token:  String,
        /// The source line where the literal starts.
        line:   usize,
        /// The source column where the literal starts.
        column: usize,
    },
    /// The scan loop was told to stop before reaching the end of input.
    ForceStopped,
    /// The input byte stream is not valid UTF-8.
    InvalidEncoding,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedToken { token, line, column } => {
                write!(f,
                       "syntax error: unexpected token {token:?} (around (line {line}) (column {column}))")
            },

            Self::UnexpectedEof { line, column } => {
                write!(f,
                       "syntax error: unexpected EOF (around (line {line}) (column {column}))")
            },

            Self::NumberOutOfRange { token, line, column } => {
                write!(f,
                       "syntax error: number out of range {token:?} (around (line {line}) (column {column}))")
            },

            Self::ForceStopped => write!(f, "scanning was stopped"),

            Self::InvalidEncoding => write!(f, "input is not valid UTF-8"),
        }
    }
}

impl std::error::Error for ParseError {}
