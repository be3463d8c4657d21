use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ordered_float::OrderedFloat;

use crate::{error::RuntimeError, interpreter::evaluator::context::Context};

/// The signature shared by every host-callable function.
///
/// A host function receives the context it was invoked on, reads its
/// arguments from the context's input stream and emits results on the
/// output stream. Returning an error exits the context with that error.
pub type HostFn = dyn Fn(&Arc<Context>) -> Result<(), RuntimeError> + Send + Sync;

/// A host-callable function value.
///
/// Function values compare equal only to themselves (identity), never by
/// behavior.
#[derive(Clone)]
pub struct FunctionValue {
    name: Option<String>,
    func: Arc<HostFn>,
}

impl FunctionValue {
    /// Wraps a callable into a function value, optionally attaching the
    /// name it was registered or resolved under.
    pub fn new<F>(name: Option<String>, func: F) -> Self
        where F: Fn(&Arc<Context>) -> Result<(), RuntimeError> + Send + Sync + 'static
    {
        Self { name,
               func: Arc::new(func) }
    }

    /// Returns the name the function was registered under, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Invokes the function on the given context.
    ///
    /// # Errors
    /// Propagates whatever error the underlying callable reports.
    pub fn call(&self, ctx: &Arc<Context>) -> Result<(), RuntimeError> {
        (self.func)(ctx)
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.func).cast::<()>()
    }
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl std::fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FunctionValue({})", self.name.as_deref().unwrap_or("anonymous"))
    }
}

impl std::fmt::Display for FunctionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f,
               "<function {}: {:?}>",
               self.name.as_deref().unwrap_or("anonymous"),
               self.addr())
    }
}

/// Names each [`Value`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Nil,
    Binary,
    String,
    Atom,
    Symbol,
    Int,
    Float,
    Bool,
    Map,
    List,
    Function,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Nil => "nil",
            Self::Binary => "binary",
            Self::String => "string",
            Self::Atom => "atom",
            Self::Symbol => "symbol",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Map => "map",
            Self::List => "list",
            Self::Function => "function",
        };
        f.write_str(name)
    }
}

/// A runtime tagged value.
///
/// Values are immutable once constructed and freely shared: they travel
/// between contexts on streams, live in symbol tables and key maps.
/// Equality is type-wise then content-wise; floats compare with total
/// ordering and functions compare by identity.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absence of a value, rendered `:nil`.
    Nil,
    /// A boolean, rendered `:true` or `:false`.
    Bool(bool),
    /// A signed 64-bit integer.
    Int(i64),
    /// A 64-bit floating point number.
    Float(f64),
    /// A text string.
    String(String),
    /// An opaque byte sequence.
    Binary(Vec<u8>),
    /// A symbolic constant such as `:foo`; the spelling keeps the colon.
    Atom(String),
    /// An identifier such as `foo`, resolvable in a scope.
    Symbol(String),
    /// An ordered sequence of values.
    List(Vec<Value>),
    /// An unordered mapping from value to value.
    Map(HashMap<Value, Value>),
    /// A host-callable function.
    Function(FunctionValue),
}

/// The canonical nil value.
pub const NIL: Value = Value::Nil;
/// The canonical true value.
pub const TRUE: Value = Value::Bool(true);
/// The canonical false value.
pub const FALSE: Value = Value::Bool(false);

impl Value {
    /// Returns the type tag of the value.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Nil => ValueType::Nil,
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::String(_) => ValueType::String,
            Self::Binary(_) => ValueType::Binary,
            Self::Atom(_) => ValueType::Atom,
            Self::Symbol(_) => ValueType::Symbol,
            Self::List(_) => ValueType::List,
            Self::Map(_) => ValueType::Map,
            Self::Function(_) => ValueType::Function,
        }
    }

    /// Creates a symbol value.
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// Creates an atom value; the spelling should include the leading colon.
    pub fn atom(spelling: impl Into<String>) -> Self {
        Self::Atom(spelling.into())
    }

    /// Wraps a callable into a function value.
    pub fn function<F>(name: Option<String>, func: F) -> Self
        where F: Fn(&Arc<Context>) -> Result<(), RuntimeError> + Send + Sync + 'static
    {
        Self::Function(FunctionValue::new(name, func))
    }

    /// Builds a map value from interleaved key/value pairs.
    ///
    /// # Errors
    /// Returns [`RuntimeError::NotHashable`] when a key contains a function
    /// value, which has no content-based identity to hash.
    pub fn map_from_pairs<I>(pairs: I) -> Result<Self, RuntimeError>
        where I: IntoIterator<Item = (Value, Value)>
    {
        let mut map = HashMap::new();
        for (key, value) in pairs {
            if !key.is_hashable() {
                return Err(RuntimeError::NotHashable);
            }
            map.insert(key, value);
        }
        Ok(Self::Map(map))
    }

    /// Returns true when the value can be used as a map key.
    #[must_use]
    pub fn is_hashable(&self) -> bool {
        match self {
            Self::Function(_) => false,
            Self::List(items) => items.iter().all(Self::is_hashable),
            Self::Map(entries) => entries.iter().all(|(k, v)| k.is_hashable() && v.is_hashable()),
            _ => true,
        }
    }

    /// Returns the unquoted text of the value: the content of a string,
    /// the spelling of a symbol or atom, and the rendered form of
    /// everything else. This is the name a value contributes when used in
    /// call position or as a symbol-table key.
    #[must_use]
    pub fn raw(&self) -> String {
        match self {
            Self::String(s) | Self::Atom(s) | Self::Symbol(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Returns the integer content, if this is an int value.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float content, if this is a float value.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Returns the boolean content, if this is a bool value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the elements, if this is a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries, if this is a map value.
    #[must_use]
    pub const fn as_map(&self) -> Option<&HashMap<Value, Value>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns the function, if this is a function value.
    #[must_use]
    pub const fn as_function(&self) -> Option<&FunctionValue> {
        match self {
            Self::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Consumes the value, returning its elements when it is a list and a
    /// single-element vector otherwise.
    #[must_use]
    pub fn into_list(self) -> Vec<Value> {
        match self {
            Self::List(items) => items,
            other => vec![other],
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (Self::String(a), Self::String(b))
            | (Self::Atom(a), Self::Atom(b))
            | (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Binary(a), Self::Binary(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Nil => {},
            Self::Bool(b) => b.hash(state),
            Self::Int(n) => n.hash(state),
            Self::Float(x) => OrderedFloat(*x).hash(state),
            Self::String(s) | Self::Atom(s) | Self::Symbol(s) => s.hash(state),
            Self::Binary(bytes) => bytes.hash(state),
            Self::List(items) => items.hash(state),
            Self::Map(entries) => {
                // Entry order is unspecified, so fold a commutative
                // combination of per-entry hashes.
                let mut combined: u64 = 0;
                for entry in entries {
                    let mut h = DefaultHasher::new();
                    entry.hash(&mut h);
                    combined ^= h.finish();
                }
                combined.hash(state);
            },
            Self::Function(f) => f.addr().hash(state),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

fn write_quoted(f: &mut std::fmt::Formatter<'_>, s: &str) -> std::fmt::Result {
    write!(f, "\"")?;
    for ch in s.chars() {
        match ch {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "\"")
}

fn write_float(f: &mut std::fmt::Formatter<'_>, x: f64) -> std::fmt::Result {
    let s = format!("{x}");
    // The shortest decimal form drops the point for whole floats; keep it
    // so the rendering reads back as a float.
    if s.contains('.') || s.contains("inf") || s.contains("NaN") {
        f.write_str(&s)
    } else {
        write!(f, "{s}.0")
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => write!(f, ":nil"),
            Self::Bool(true) => write!(f, ":true"),
            Self::Bool(false) => write!(f, ":false"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write_float(f, *x),
            Self::String(s) => write_quoted(f, s),
            Self::Binary(bytes) => write!(f, "<binary {}>", bytes.len()),
            Self::Atom(s) | Self::Symbol(s) => write!(f, "{s}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            },
            Self::Map(entries) => {
                // Stable output: order entries by their rendered key.
                let mut rendered: Vec<(String, &Value)> =
                    entries.iter().map(|(k, v)| (k.to_string(), v)).collect();
                rendered.sort_by(|a, b| a.0.cmp(&b.0));

                write!(f, "{{")?;
                for (i, (key, value)) in rendered.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{key} {value}")?;
                }
                write!(f, "}}")
            },
            Self::Function(func) => write!(f, "{func}"),
        }
    }
}
