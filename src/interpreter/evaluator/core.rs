use std::{sync::Arc, thread};

use crate::{
    ast::{NodeRef, NodeType},
    error::RuntimeError,
    interpreter::{
        evaluator::context::Context,
        value::{FunctionValue, Value},
    },
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// Owns the root scope against which trees are evaluated and host
/// functions are registered.
///
/// The root context is executable, so expressions evaluated through
/// [`Interpreter::eval`] invoke the functions they name.
pub struct Interpreter {
    root: Arc<Context>,
}

#[allow(clippy::new_without_default)]
impl Interpreter {
    /// Creates an interpreter with an empty executable root scope.
    #[must_use]
    pub fn new() -> Self {
        Self { root: Context::root().executable() }
    }

    /// Returns the root context.
    #[must_use]
    pub const fn root(&self) -> &Arc<Context> {
        &self.root
    }

    /// Registers a host function in the root scope.
    ///
    /// The runtime wraps the function so that its context exits — carrying
    /// the function's error, if any — as soon as it returns.
    pub fn defn<F>(&self, name: &str, func: F)
        where F: Fn(&Arc<Context>) -> EvalResult<()> + Send + Sync + 'static
    {
        let wrapper = move |ctx: &Arc<Context>| -> EvalResult<()> {
            let outcome = func(ctx);
            ctx.exit(outcome.as_ref().err().cloned());
            outcome
        };
        self.root.set(name, Value::function(Some(name.to_owned()), wrapper));
    }

    /// Evaluates a syntax tree and returns the evaluation context together
    /// with the collected result: the single produced value when there is
    /// exactly one, otherwise a list of everything the tree produced.
    ///
    /// # Errors
    /// Returns the first error raised anywhere in the evaluation.
    pub fn eval(&self, node: &NodeRef) -> EvalResult<(Arc<Context>, Value)> {
        let ctx = Context::child(&self.root);
        spawn_eval(Arc::clone(&ctx), vec![Arc::clone(node)]);

        let mut values = ctx.collect()?;
        let value = match values.len() {
            0 => Value::Nil,
            1 => values.pop().unwrap_or(Value::Nil),
            _ => Value::List(values),
        };
        Ok((ctx, value))
    }
}

/// Runs the nodes as the producer task of the given context, exiting the
/// context with the outcome when done.
fn spawn_eval(ctx: Arc<Context>, nodes: Vec<NodeRef>) {
    thread::spawn(move || {
        let outcome = eval_nodes(&ctx, &nodes);
        ctx.exit(outcome.err());
    });
}

/// Runs a prepared callable as the producer task of the given context.
fn spawn_call(ctx: Arc<Context>, func: FunctionValue) {
    thread::spawn(move || {
        let outcome = func.call(&ctx);
        ctx.exit(outcome.err());
    });
}

fn eval_nodes(ctx: &Arc<Context>, nodes: &[NodeRef]) -> EvalResult<()> {
    for node in nodes {
        eval_context(ctx, node)?;
    }
    Ok(())
}

/// Evaluates one node against a context, yielding the node's values on the
/// context's output stream.
///
/// Container nodes evaluate their children concurrently with the drain
/// performed here: the children run as a producer task on a subordinate
/// context while this task consumes its outputs.
///
/// # Errors
/// Returns the first error raised by the node or any of its children.
pub fn eval_context(ctx: &Arc<Context>, node: &NodeRef) -> EvalResult<()> {
    match node.node_type() {
        NodeType::Value => {
            let value = node.value().cloned().unwrap_or(Value::Nil);
            ctx.yield_value(value);
            Ok(())
        },

        NodeType::List => {
            let child = Context::child(ctx);
            spawn_eval(Arc::clone(&child), node.children());

            let value = child.result()?;
            ctx.yield_value(value);
            Ok(())
        },

        NodeType::Map => {
            let child = Context::child(ctx);
            spawn_eval(Arc::clone(&child), node.children());

            let values = child.collect()?;
            let mut pairs = Vec::new();
            let mut chunks = values.into_iter();
            while let Some(key) = chunks.next() {
                // An odd trailing key pairs with nil.
                let value = chunks.next().unwrap_or(Value::Nil);
                pairs.push((key, value));
            }

            let map = Value::map_from_pairs(pairs)?;
            ctx.yield_value(map);
            Ok(())
        },

        NodeType::Expression => {
            // Phase one: materialize the child forms without expanding
            // function values, so the callee controls when its arguments
            // are reduced.
            let mctx = Context::closure(ctx).non_executable();
            spawn_eval(Arc::clone(&mctx), node.children());
            let values = mctx.result()?.into_list();

            let func = prepare_call(values);

            if !ctx.is_executable() {
                ctx.yield_value(Value::Function(func));
                return Ok(());
            }

            // Phase two: invoke on a closure of the evaluating context, so
            // bindings written by the call are observed by later siblings.
            let call = Context::closure(ctx);
            spawn_call(Arc::clone(&call), func);

            let mut results = call.result()?.into_list();
            if results.len() == 1 {
                ctx.yield_value(results.pop().unwrap_or(Value::Nil));
            } else {
                ctx.yield_value(Value::List(results));
            }
            Ok(())
        },
    }
}

/// Wraps one materialized expression into a callable.
///
/// When invoked, the wrapper resolves the head value to a function — a
/// function value is used directly, anything else resolves by name in the
/// invocation scope, and a lone literal short-circuits to itself — then
/// feeds the remaining values to the callee one at a time, each hand-over
/// gated by the callee's accept, and finally runs the callee on the
/// invocation context.
fn prepare_call(values: Vec<Value>) -> FunctionValue {
    let name = values.first().and_then(|head| match head {
        Value::Symbol(s) | Value::Atom(s) => Some(s.clone()),
        Value::Function(f) => f.name().map(str::to_owned),
        _ => None,
    });

    FunctionValue::new(name, move |ctx: &Arc<Context>| {
        let Some(head) = values.first() else {
            // An empty expression produces nothing.
            return Ok(());
        };

        let func = match head {
            Value::Function(f) => f.clone(),
            _ => {
                if values.len() == 1 && !matches!(head, Value::Symbol(_)) {
                    ctx.yield_value(head.clone());
                    return Ok(());
                }
                let name = head.raw();
                match ctx.get(&name) {
                    Some(Value::Function(f)) => f,
                    Some(bound) => {
                        if values.len() == 1 {
                            ctx.yield_value(bound);
                            return Ok(());
                        }
                        return Err(RuntimeError::NotAFunction { name });
                    },
                    None => return Err(RuntimeError::UndefinedFunction { name }),
                }
            },
        };

        let args: Vec<Value> = values[1..].to_vec();
        let feeder = Arc::clone(ctx);
        thread::spawn(move || {
            for arg in args {
                if !feeder.accept() {
                    break;
                }
                if feeder.push(arg).is_err() {
                    break;
                }
            }
            feeder.close();
        });

        func.call(ctx)
    })
}

/// Executes one captured body form of a user-defined function: function
/// values run as a closure of the definition scope with their outputs
/// forwarded, lists run element-wise, and anything else is yielded as-is.
///
/// # Errors
/// Propagates the first error raised by the body.
pub fn exec_function_body(out: &Arc<Context>,
                          scope: &Arc<Context>,
                          form: &Value)
                          -> EvalResult<()> {
    match form {
        Value::Function(func) => {
            let body_ctx = Context::closure(scope).executable();
            spawn_call(Arc::clone(&body_ctx), func.clone());

            let values = body_ctx.result()?.into_list();
            out.yield_values(&values);
            Ok(())
        },
        Value::List(items) => {
            for item in items {
                exec_function_body(out, scope, item)?;
            }
            Ok(())
        },
        other => {
            out.yield_value(other.clone());
            Ok(())
        },
    }
}
