//! Loosely-typed construction of combinators.
//!
//! [`build`] accepts a combinator name and [`Value`] arguments, resolves them
//! through an [`Overloads`] table and forwards to the typed constructor.
//! Function values act as task factories: they must return [`Value::Task`].
//!
//! | kind       | accepted shapes                                               |
//! |------------|---------------------------------------------------------------|
//! | `series`   | `array\|function`                                             |
//! | `parallel` | `array\|function`                                             |
//! | `each`     | `array, function`                                             |
//! | `repeat`   | `number, function`                                            |
//! | `retry`    | `number, function`                                            |
//! | `dowhile`  | `function\|boolean, function`                                 |
//! | `ifelse`   | `function\|boolean, function\|object, function\|object`       |
//! | `ifthen`   | `function\|boolean, function\|object`                         |
//! | `timeout`  | `number, function\|object`                                    |
//! | `delay`    | `number` or `number, function\|object`                        |
//! | `trycatch` | `function\|object` or `function\|object, function\|object`    |
//! | `watch`    | `string\|array, function`                                     |

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::{
    Child, Condition, Steps, delay, delay_then, dowhile, each, ifelse, ifthen, parallel, repeat,
    retry, series, timeout, trycatch, trycatch_with, watch,
};
use crate::error::SignatureError;
use crate::signature::{Callable, Overloads, Value};
use crate::tasks::Task;

type Built = Result<Task, SignatureError>;

/// Builds the combinator `kind` from loosely-typed arguments.
///
/// # Errors
/// - [`SignatureError::NoMatch`] / [`SignatureError::Ambiguous`] for an unsupported shape;
/// - [`SignatureError::InvalidArgument`] for an unknown `kind` or a value that
///   matched a pattern but cannot serve as a task (e.g. a plain object).
///
/// Factories returning something other than a task fail the combinator when called.
///
/// ## Example
/// ```rust
/// use taskweave::combinators::build;
/// use taskweave::signature::Value;
/// use taskweave::leaf;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), taskweave::SignatureError> {
/// let task = build("repeat", vec![
///     Value::Number(3.0),
///     Value::function(|args| Value::Task(leaf::ok(format!("{:?}", args[0].as_number())))),
/// ])?;
/// assert!(task.run().await.is_ok());
/// # Ok(())
/// # }
/// ```
pub fn build(kind: &str, args: Vec<Value>) -> Built {
    let table = Overloads::<Built>::new(kind);
    let table = match kind {
        "series" => table.with("array|function", |args| {
            let [steps] = positional::<1>("series", args)?;
            Ok(series(to_steps("series", steps)?))
        })?,
        "parallel" => table.with("array|function", |args| {
            let [steps] = positional::<1>("parallel", args)?;
            Ok(parallel(to_steps("parallel", steps)?))
        })?,
        "each" => table.with("array, function", |args| {
            let [items, f] = positional::<2>("each", args)?;
            let (Value::Array(items), Value::Function(f)) = (items, f) else {
                return Err(invalid("each", "expected (array, function)"));
            };
            Ok(each(items, move |item: Value| expect_task("each", f(&[item]))))
        })?,
        "repeat" => table.with("number, function", |args| {
            let [n, f] = positional::<2>("repeat", args)?;
            Ok(repeat(count(&n), indexed("repeat", f)?))
        })?,
        "retry" => table.with("number, function", |args| {
            let [n, f] = positional::<2>("retry", args)?;
            Ok(retry(count(&n), indexed("retry", f)?))
        })?,
        "dowhile" => table.with("function|boolean, function", |args| {
            let [cond, f] = positional::<2>("dowhile", args)?;
            let Value::Function(f) = f else {
                return Err(invalid("dowhile", "expected a task factory"));
            };
            Ok(dowhile(to_condition(cond), move || expect_task("dowhile", f(&[]))))
        })?,
        "ifelse" => table.with("function|boolean, function|object, function|object", |args| {
            let [cond, then, otherwise] = positional::<3>("ifelse", args)?;
            Ok(ifelse(
                to_condition(cond),
                to_child("ifelse", then)?,
                to_child("ifelse", otherwise)?,
            ))
        })?,
        "ifthen" => table.with("function|boolean, function|object", |args| {
            let [cond, then] = positional::<2>("ifthen", args)?;
            Ok(ifthen(to_condition(cond), to_child("ifthen", then)?))
        })?,
        "timeout" => table.with("number, function|object", |args| {
            let [ms, child] = positional::<2>("timeout", args)?;
            Ok(timeout(millis(&ms), to_child("timeout", child)?))
        })?,
        "delay" => table
            .with("number", |args| {
                let [ms] = positional::<1>("delay", args)?;
                Ok(delay(millis(&ms)))
            })?
            .with("number, function|object", |args| {
                let [ms, child] = positional::<2>("delay", args)?;
                Ok(delay_then(millis(&ms), to_child("delay", child)?))
            })?,
        "trycatch" => table
            .with("function|object", |args| {
                let [attempt] = positional::<1>("trycatch", args)?;
                Ok(trycatch(to_child("trycatch", attempt)?))
            })?
            .with("function|object, function|object", |args| {
                let [attempt, recover] = positional::<2>("trycatch", args)?;
                Ok(trycatch_with(
                    to_child("trycatch", attempt)?,
                    to_child("trycatch", recover)?,
                ))
            })?,
        "watch" => table.with("string|array, function", |args| {
            let [paths, f] = positional::<2>("watch", args)?;
            let Value::Function(f) = f else {
                return Err(invalid("watch", "expected a task factory"));
            };
            Ok(watch(to_paths(paths)?, move || expect_task("watch", f(&[]))))
        })?,
        other => {
            return Err(invalid("build", format!("unknown combinator {other:?}")));
        }
    };
    table.resolve(args)?
}

fn invalid(target: &str, detail: impl Into<String>) -> SignatureError {
    SignatureError::InvalidArgument {
        target: target.to_owned(),
        detail: detail.into(),
    }
}

fn positional<const N: usize>(target: &str, args: Vec<Value>) -> Result<[Value; N], SignatureError> {
    args.try_into()
        .map_err(|args: Vec<Value>| invalid(target, format!("expected {N} arguments, got {}", args.len())))
}

fn expect_task(target: &'static str, value: Value) -> Result<Task, SignatureError> {
    match value {
        Value::Task(task) => Ok(task),
        other => Err(invalid(
            target,
            format!("factory returned {} instead of a task", other.type_tag()),
        )),
    }
}

fn to_child(target: &'static str, value: Value) -> Result<Child, SignatureError> {
    match value {
        Value::Task(task) => Ok(Child::from(task)),
        Value::Function(f) => Ok(Child::from(move || expect_task(target, f(&[])))),
        other => Err(invalid(
            target,
            format!("expected a task or a task factory, got {}", other.type_tag()),
        )),
    }
}

fn to_steps(target: &'static str, value: Value) -> Result<Steps, SignatureError> {
    match value {
        Value::Array(items) => task_list(target, items).map(Steps::from),
        Value::Function(f) => Ok(Steps::try_from_fn(move || match f(&[]) {
            Value::Array(items) => task_list(target, items),
            other => Err(invalid(
                target,
                format!("factory returned {} instead of an array", other.type_tag()),
            )),
        })),
        other => Err(invalid(
            target,
            format!("expected an array or a factory, got {}", other.type_tag()),
        )),
    }
}

fn task_list(target: &'static str, items: Vec<Value>) -> Result<Vec<Task>, SignatureError> {
    items.into_iter().map(|v| expect_task(target, v)).collect()
}

fn indexed(
    target: &'static str,
    value: Value,
) -> Result<impl FnMut(u32) -> Result<Task, SignatureError> + Send + 'static, SignatureError> {
    let Value::Function(f) = value else {
        return Err(invalid(target, "expected a task factory"));
    };
    Ok(move |i: u32| expect_task(target, f(&[Value::from(i)])))
}

fn to_condition(value: Value) -> impl Condition {
    let f: Callable = match value {
        Value::Function(f) => f,
        other => {
            let holds = other.truthy();
            Arc::new(move |_: &[Value]| Value::Boolean(holds))
        }
    };
    move || {
        let holds = f(&[]).truthy();
        async move { holds }
    }
}

fn to_paths(value: Value) -> Result<Vec<PathBuf>, SignatureError> {
    match value {
        Value::String(path) => Ok(vec![path.into()]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(path) => Ok(PathBuf::from(path)),
                other => Err(invalid("watch", format!("path must be a string, got {}", other.type_tag()))),
            })
            .collect(),
        other => Err(invalid("watch", format!("expected paths, got {}", other.type_tag()))),
    }
}

fn millis(value: &Value) -> Duration {
    Duration::from_millis(value.as_number().unwrap_or(0.0).max(0.0) as u64)
}

fn count(value: &Value) -> u32 {
    value.as_number().unwrap_or(0.0).max(0.0) as u32
}
