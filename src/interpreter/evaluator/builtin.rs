use std::sync::Arc;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            context::Context,
            core::{EvalResult, Interpreter, exec_function_body},
        },
        value::{self, Value},
    },
};

/// Installs the demonstration host functions into the interpreter's root
/// scope: `+`, `=`, `echo`, `print`, `set`, `get`, `defn`, `nop`, `:true`
/// and `:false`.
pub fn install(interp: &Interpreter) {
    interp.defn("+", add);
    interp.defn("=", all_equal);
    interp.defn("echo", echo);
    interp.defn("print", print);
    interp.defn("set", set_binding);
    interp.defn("get", get_binding);
    interp.defn("defn", define_function);
    interp.defn("nop", nop);
    interp.defn(":true", always_true);
    interp.defn(":false", always_false);
}

/// Widest integer magnitude an `f64` carries exactly (`2^53 - 1`).
const MAX_EXACT_FLOAT_INT: u64 = (1 << 53) - 1;

/// Converts an integer addend for a float-promoted sum. Magnitudes beyond
/// `2^53` would round silently, so they are rejected instead.
#[allow(clippy::cast_precision_loss)]
fn promote_to_float(n: i64) -> EvalResult<f64> {
    if n.unsigned_abs() > MAX_EXACT_FLOAT_INT {
        return Err(RuntimeError::TypeError {
            details: format!("integer {n} cannot join a float sum exactly"),
        });
    }
    Ok(n as f64)
}

/// Sums every argument. Integers stay integral; a single float argument
/// promotes the whole sum.
fn add(ctx: &Arc<Context>) -> EvalResult<()> {
    let mut int_sum: i64 = 0;
    let mut float_sum: f64 = 0.0;
    let mut promoted = false;

    while ctx.next() {
        match ctx.argument()? {
            Value::Int(n) => {
                int_sum = int_sum.checked_add(n).ok_or_else(|| RuntimeError::TypeError {
                    details: "integer overflow in \"+\"".to_owned(),
                })?;
            },
            Value::Float(x) => {
                promoted = true;
                float_sum += x;
            },
            other => {
                return Err(RuntimeError::TypeError { details: format!("cannot add a {} value",
                                                                      other.value_type()) });
            },
        }
    }

    if promoted {
        let int_part = promote_to_float(int_sum)?;
        ctx.yield_value(Value::Float(float_sum + int_part));
    } else {
        ctx.yield_value(Value::Int(int_sum));
    }
    Ok(())
}

/// Yields `:true` when every argument equals the first one, `:false` as
/// soon as one differs — at which point it stops reading, halting the
/// argument producer.
fn all_equal(ctx: &Arc<Context>) -> EvalResult<()> {
    let mut first: Option<Value> = None;

    while ctx.next() {
        let value = ctx.argument()?;
        match &first {
            None => first = Some(value),
            Some(seen) => {
                if *seen != value {
                    ctx.yield_value(value::FALSE);
                    return Ok(());
                }
            },
        }
    }

    ctx.yield_value(value::TRUE);
    Ok(())
}

/// Forwards every argument to the output stream, one at a time.
fn echo(ctx: &Arc<Context>) -> EvalResult<()> {
    while ctx.next() {
        let value = ctx.argument()?;
        ctx.yield_value(value);
    }
    Ok(())
}

/// Writes the unquoted form of every argument to standard output and
/// yields nil.
fn print(ctx: &Arc<Context>) -> EvalResult<()> {
    let mut rendered = String::new();
    while ctx.next() {
        rendered.push_str(&ctx.argument()?.raw());
    }
    println!("{rendered}");

    ctx.yield_value(value::NIL);
    Ok(())
}

/// `(set name value)` — binds a name in the current scope and yields the
/// bound value.
fn set_binding(ctx: &Arc<Context>) -> EvalResult<()> {
    let args = ctx.arguments()?;
    let [name, value] = args.as_slice() else {
        return Err(RuntimeError::TypeError { details: "\"set\" expects a name and a value".to_owned() });
    };

    ctx.set(name.raw(), value.clone());
    ctx.yield_value(value.clone());
    Ok(())
}

/// `(get name)` — resolves a name in the current scope, yielding nil when
/// it is unbound.
fn get_binding(ctx: &Arc<Context>) -> EvalResult<()> {
    let args = ctx.arguments()?;
    let [name] = args.as_slice() else {
        return Err(RuntimeError::TypeError { details: "\"get\" expects one name".to_owned() });
    };

    match ctx.get(&name.raw()) {
        Some(value) => ctx.yield_value(value),
        None => ctx.yield_value(value::NIL),
    }
    Ok(())
}

/// `(defn name [params…] body…)` — captures the body unexpanded and binds
/// a function that runs it with the parameters bound in a fresh frame.
fn define_function(ctx: &Arc<Context>) -> EvalResult<()> {
    // The body must arrive as unevaluated function values.
    ctx.set_executable(false);
    let args = ctx.arguments()?;
    ctx.set_executable(true);

    if args.len() < 3 {
        return Err(RuntimeError::TypeError {
            details: "\"defn\" expects a name, a parameter list and a body".to_owned(),
        });
    }

    let name = args[0].raw();
    let params: Vec<String> = args[1].as_list()
                                     .ok_or_else(|| RuntimeError::TypeError {
                                         details: "\"defn\" parameters must be a list".to_owned(),
                                     })?
                                     .iter()
                                     .map(Value::raw)
                                     .collect();
    let body: Vec<Value> = args[2..].to_vec();

    let func = Value::function(Some(name.clone()), move |call: &Arc<Context>| {
        let frame = Context::child(call);
        for param in &params {
            if !call.next() {
                break;
            }
            frame.set(param.clone(), call.argument()?);
        }

        for form in &body {
            exec_function_body(call, &frame, form)?;
        }
        Ok(())
    });

    ctx.set(name, func);
    ctx.yield_value(value::TRUE);
    Ok(())
}

/// Ignores its arguments without reading them and yields nil.
fn nop(ctx: &Arc<Context>) -> EvalResult<()> {
    ctx.yield_value(value::NIL);
    Ok(())
}

/// Drains every argument, then yields `:true`.
fn always_true(ctx: &Arc<Context>) -> EvalResult<()> {
    while ctx.next() {
        let _ = ctx.argument()?;
    }
    ctx.yield_value(value::TRUE);
    Ok(())
}

/// Yields `:false` without reading any argument.
fn always_false(ctx: &Arc<Context>) -> EvalResult<()> {
    ctx.yield_value(value::FALSE);
    Ok(())
}
