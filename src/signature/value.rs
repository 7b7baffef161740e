//! Dynamically-typed argument values.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use super::pattern::TypeTag;
use crate::tasks::Task;

/// A callable argument: receives positional values, returns a value.
pub type Callable = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// One argument of a loosely-typed call.
#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Function(Callable),
    String(String),
    Number(f64),
    Boolean(bool),
    Date(SystemTime),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    /// Regular expression source.
    Regex(String),
    /// A task handle; reflects as `object`.
    Task(Task),
}

impl Value {
    /// Wraps a closure as [`Value::Function`].
    pub fn function(f: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        Value::Function(Arc::new(f))
    }

    /// The type name this value reflects as.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Undefined => TypeTag::Undefined,
            Value::Null => TypeTag::Null,
            Value::Function(_) => TypeTag::Function,
            Value::String(_) => TypeTag::String,
            Value::Number(_) => TypeTag::Number,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::Date(_) => TypeTag::Date,
            Value::Array(_) => TypeTag::Array,
            Value::Object(_) | Value::Task(_) => TypeTag::Object,
            Value::Regex(_) => TypeTag::Regex,
        }
    }

    /// Loose truthiness: `undefined`, `null`, `false`, `0`, `NaN` and `""` are false.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_task(&self) -> Option<&Task> {
        match self {
            Value::Task(t) => Some(t),
            _ => None,
        }
    }

    /// Invokes a [`Value::Function`]; `None` for anything else.
    pub fn call(&self, args: &[Value]) -> Option<Value> {
        match self {
            Value::Function(f) => Some(f(args)),
            _ => None,
        }
    }
}

impl From<Task> for Value {
    fn from(task: Task) -> Self {
        Value::Task(task)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<SystemTime> for Value {
    fn from(at: SystemTime) -> Self {
        Value::Date(at)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Function(_) => f.write_str("Function(..)"),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Date(at) => f.debug_tuple("Date").field(at).finish(),
            Value::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Value::Object(map) => f.debug_tuple("Object").field(map).finish(),
            Value::Regex(src) => f.debug_tuple("Regex").field(src).finish(),
            Value::Task(task) => f.debug_tuple("Task").field(task).finish(),
        }
    }
}
