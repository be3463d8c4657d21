#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can occur during evaluation and runtime.
pub enum RuntimeError {
    /// A name in call position is not bound in any reachable scope.
    UndefinedFunction {
        /// The name that failed to resolve.
        name: String,
    },
    /// A name in call position resolved to a value that cannot be called.
    NotAFunction {
        /// The name of the offending binding.
        name: String,
    },
    /// A value was pushed into a context whose input stream is closed.
    StreamClosed,
    /// An output was requested from a context whose output stream is closed
    /// and drained.
    ClosedChannel,
    /// Tried to append a child to a leaf node.
    NotAContainer,
    /// Tried to use a non-hashable value (such as a function) as a map key.
    NotHashable,
    /// A host function received a value of an unexpected type.
    TypeError {
        /// Details about the type mismatch.
        details: String,
    },
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UndefinedFunction { name } => write!(f, "undefined function {name:?}"),

            Self::NotAFunction { name } => write!(f, "not a function: {name:?}"),

            Self::StreamClosed => write!(f, "stream is closed"),

            Self::ClosedChannel => write!(f, "channel is closed"),

            Self::NotAContainer => write!(f, "nodes of type value can't accept children"),

            Self::NotHashable => write!(f, "map keys must be hashable values"),

            Self::TypeError { details } => write!(f, "type error: {details}"),
        }
    }
}

impl std::error::Error for RuntimeError {}
