use std::sync::{
    Arc, Weak,
    atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            stream::{Gate, Stream},
            symbol_table::SymbolTable,
        },
        value::{FunctionValue, Value},
    },
};

/// A runtime scope for one in-flight evaluation.
///
/// A context bundles a symbol table with two rendezvous streams — `input`,
/// on which a producer delivers argument values, and `output`, on which the
/// context's own task emits results — plus the accept gate that lets the
/// producer observe the consumer's readiness. Exactly one producer and one
/// consumer drive each context.
///
/// The two streams close independently: [`Context::close`] shuts the input
/// side only (and is idempotent), while [`Context::exit`] shuts the output
/// and cascades into the input and into every child context that is still
/// alive. A closed input makes [`Context::push`] fail and
/// [`Context::accept`] return `false`; a closed output silently drops
/// yields and makes [`Context::output`] report a closed channel.
pub struct Context {
    parent: Option<Arc<Context>>,
    table:  Arc<SymbolTable>,

    executable: AtomicBool,

    input:  Stream<Value>,
    output: Stream<Value>,
    accept: Gate,

    last_argument: Mutex<Option<Value>>,
    exit_status:   Mutex<Option<RuntimeError>>,

    children: Mutex<Vec<Weak<Context>>>,
}

impl Context {
    fn build(parent: Option<&Arc<Self>>, table: Arc<SymbolTable>) -> Arc<Self> {
        let executable = parent.is_some_and(|p| p.is_executable());
        let ctx = Arc::new(Self { parent: parent.map(Arc::clone),
                                  table,
                                  executable: AtomicBool::new(executable),
                                  input: Stream::new(),
                                  output: Stream::new(),
                                  accept: Gate::new(),
                                  last_argument: Mutex::new(None),
                                  exit_status: Mutex::new(None),
                                  children: Mutex::new(Vec::new()) });
        if let Some(parent) = parent {
            parent.children.lock().push(Arc::downgrade(&ctx));
        }
        ctx
    }

    /// Creates a root context with a fresh symbol table.
    #[must_use]
    pub fn root() -> Arc<Self> {
        Self::build(None, SymbolTable::new(None))
    }

    /// Creates a child context with its own symbol-table frame, so local
    /// bindings shadow the parent's without mutating them.
    #[must_use]
    pub fn child(parent: &Arc<Self>) -> Arc<Self> {
        Self::build(Some(parent), SymbolTable::new(Some(Arc::clone(&parent.table))))
    }

    /// Creates a closure context that shares the parent's symbol table, so
    /// writes made here are observed by every sibling sharing the table.
    #[must_use]
    pub fn closure(parent: &Arc<Self>) -> Arc<Self> {
        Self::build(Some(parent), Arc::clone(&parent.table))
    }

    /// Returns the parent context, when there is one.
    #[must_use]
    pub const fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// Returns true when [`Context::argument`] may evaluate function
    /// values on read.
    #[must_use]
    pub fn is_executable(&self) -> bool {
        self.executable.load(Ordering::Acquire)
    }

    /// Flips the executable flag.
    pub fn set_executable(&self, executable: bool) {
        self.executable.store(executable, Ordering::Release);
    }

    /// Marks the context executable, for chaining at construction.
    #[must_use]
    pub fn executable(self: Arc<Self>) -> Arc<Self> {
        self.set_executable(true);
        self
    }

    /// Marks the context non-executable, for chaining at construction.
    #[must_use]
    pub fn non_executable(self: Arc<Self>) -> Arc<Self> {
        self.set_executable(false);
        self
    }

    /// Delivers one value to the context, blocking until the consumer has
    /// taken it.
    ///
    /// # Errors
    /// Returns [`RuntimeError::StreamClosed`] once the input is closed.
    pub fn push(&self, value: Value) -> Result<(), RuntimeError> {
        if self.input.is_closed() {
            return Err(RuntimeError::StreamClosed);
        }
        self.input.send(value).map_err(|_| RuntimeError::StreamClosed)
    }

    /// Waits until the consumer is ready for the next value. Returns
    /// `false` once the input side is closed.
    #[must_use]
    pub fn accept(&self) -> bool {
        self.accept.take()
    }

    /// Pulls the next input value, making it available through
    /// [`Context::argument`]. Returns `false` when the input is closed and
    /// drained.
    #[must_use]
    pub fn next(&self) -> bool {
        if self.input.is_closed() {
            return false;
        }
        self.accept.open();
        match self.input.recv() {
            Some(value) => {
                *self.last_argument.lock() = Some(value);
                true
            },
            None => false,
        }
    }

    /// Returns the most recently pulled value.
    ///
    /// On an executable context a function value is transparently invoked
    /// in a fresh child context and its first output is returned instead;
    /// list values are never auto-evaluated.
    ///
    /// # Errors
    /// Propagates any error reported by an invoked function value.
    pub fn argument(self: &Arc<Self>) -> Result<Value, RuntimeError> {
        let last = self.last_argument.lock().clone().unwrap_or(Value::Nil);
        if self.is_executable() {
            if let Value::Function(func) = &last {
                return expand_argument(self, func);
            }
        }
        Ok(last)
    }

    /// Pulls and expands every remaining input value.
    ///
    /// # Errors
    /// Returns [`RuntimeError::StreamClosed`] when the input is already
    /// closed, and propagates expansion errors.
    pub fn arguments(self: &Arc<Self>) -> Result<Vec<Value>, RuntimeError> {
        if self.input.is_closed() {
            return Err(RuntimeError::StreamClosed);
        }
        let mut args = Vec::new();
        while self.next() {
            args.push(self.argument()?);
        }
        Ok(args)
    }

    /// Emits one value on the output stream. Yields against a closed
    /// output are silently dropped.
    pub fn yield_value(&self, value: Value) {
        if self.output.is_closed() {
            return;
        }
        let _ = self.output.send(value);
    }

    /// Emits values on the output stream, in order.
    pub fn yield_values(&self, values: &[Value]) {
        for value in values {
            self.yield_value(value.clone());
        }
    }

    /// Takes the next output value.
    ///
    /// # Errors
    /// Returns [`RuntimeError::ClosedChannel`] once the output is closed
    /// and drained.
    pub fn output(&self) -> Result<Value, RuntimeError> {
        self.output.recv().ok_or(RuntimeError::ClosedChannel)
    }

    /// Drains the output stream to a vector.
    ///
    /// # Errors
    /// Returns the error the context exited with, if any, once the stream
    /// is drained.
    pub fn collect(&self) -> Result<Vec<Value>, RuntimeError> {
        let mut values = Vec::new();
        while let Some(value) = self.output.recv() {
            values.push(value);
        }
        match self.exit_status.lock().take() {
            Some(error) => Err(error),
            None => Ok(values),
        }
    }

    /// Drains the output stream and wraps it as a single list value.
    ///
    /// # Errors
    /// Returns the error the context exited with, if any.
    pub fn result(&self) -> Result<Value, RuntimeError> {
        Ok(Value::List(self.collect()?))
    }

    /// Emits the given values and exits the context.
    pub fn return_values(&self, values: &[Value]) {
        self.yield_values(values);
        self.exit(None);
    }

    /// Closes the output stream, recording the error (first one wins) for
    /// the consumer draining the context, closing the input stream, and
    /// cancelling any children that are still alive. Idempotent.
    pub fn exit(&self, error: Option<RuntimeError>) {
        if self.output.is_closed() {
            return;
        }

        if let Some(error) = error {
            self.exit_status.lock().get_or_insert(error);
        }

        self.output.close();
        self.close();

        let children: Vec<Arc<Context>> =
            self.children.lock().drain(..).filter_map(|c| c.upgrade()).collect();
        for child in children {
            child.exit(None);
        }
    }

    /// Closes the input stream only. Idempotent.
    pub fn close(&self) {
        self.accept.close();
        self.input.close();
    }

    /// Binds a name in the context's scope.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.table.set(name, value);
    }

    /// Resolves a name, walking up through parent scopes.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.table.get(name)
    }
}

/// Invokes a function value read as an argument: the function runs against
/// a fresh closure context and its first output becomes the argument
/// value. The closure shares the reader's scope, so writes made by one
/// argument are observed by the ones after it.
fn expand_argument(ctx: &Arc<Context>, func: &FunctionValue) -> Result<Value, RuntimeError> {
    let child = Context::closure(ctx);

    let task_ctx = Arc::clone(&child);
    let task_fn = func.clone();
    std::thread::spawn(move || {
        let outcome = task_fn.call(&task_ctx);
        task_ctx.exit(outcome.err());
    });

    let values = child.collect()?;
    Ok(values.into_iter().next().unwrap_or(Value::Nil))
}
