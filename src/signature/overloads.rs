//! Overload tables.

use super::pattern::{Pattern, shape_of};
use super::value::Value;
use crate::error::SignatureError;

type MapFn<T> = Box<dyn Fn(Vec<Value>) -> T + Send + Sync>;

/// A named table of `(pattern, map)` entries.
///
/// ## Example
/// ```rust
/// use taskweave::signature::{Overloads, Value};
///
/// # fn main() -> Result<(), taskweave::SignatureError> {
/// let describe = Overloads::new("describe")
///     .with("number", |args| format!("n={:?}", args[0].as_number()))?
///     .with("string|regex", |_| "text".to_string())?;
///
/// assert_eq!(describe.resolve(vec![Value::from("x")])?, "text");
/// assert!(describe.resolve(vec![Value::Null]).is_err());
/// # Ok(())
/// # }
/// ```
pub struct Overloads<T> {
    target: String,
    entries: Vec<(Pattern, MapFn<T>)>,
}

impl<T> Overloads<T> {
    /// An empty table; `target` names the dispatched function in errors.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            entries: Vec::new(),
        }
    }

    /// Adds an entry.
    ///
    /// # Errors
    /// [`SignatureError::UnknownType`] if `pattern` does not parse.
    pub fn with<F>(mut self, pattern: &str, map: F) -> Result<Self, SignatureError>
    where
        F: Fn(Vec<Value>) -> T + Send + Sync + 'static,
    {
        self.entries.push((Pattern::parse(pattern)?, Box::new(map)));
        Ok(self)
    }

    /// Maps `args` through the single entry whose pattern accepts them.
    ///
    /// # Errors
    /// [`SignatureError::NoMatch`] or [`SignatureError::Ambiguous`].
    pub fn resolve(&self, args: Vec<Value>) -> Result<T, SignatureError> {
        let matched: Vec<&(Pattern, MapFn<T>)> =
            self.entries.iter().filter(|(p, _)| p.accepts(&args)).collect();
        match matched.as_slice() {
            [(_, map)] => Ok(map(args)),
            [] => Err(SignatureError::NoMatch {
                target: self.target.clone(),
                got: shape_of(&args),
                expected: self.entries.iter().map(|(p, _)| p.to_string()).collect(),
            }),
            many => Err(SignatureError::Ambiguous {
                target: self.target.clone(),
                got: shape_of(&args),
                candidates: many.iter().map(|(p, _)| p.to_string()).collect(),
            }),
        }
    }

    /// Like [`Overloads::resolve`], routing a dispatch error to `handler`.
    pub fn resolve_or_else(&self, args: Vec<Value>, handler: impl FnOnce(SignatureError) -> T) -> T {
        self.resolve(args).unwrap_or_else(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Result<Overloads<&'static str>, SignatureError> {
        Overloads::new("delay")
            .with("number", |_| "wait")?
            .with("number, function|object", |_| "wait-then")?
            .with("any, string", |_| "labelled")
    }

    #[test]
    fn picks_unique_match() {
        let t = table().unwrap();
        assert_eq!(t.resolve(vec![Value::Number(5.0)]), Ok("wait"));
        let err = t.resolve(vec![Value::Number(5.0), Value::Null]).unwrap_err();
        assert_eq!(err.as_label(), "signature_no_match");
        assert_eq!(t.resolve(vec![Value::Boolean(true), Value::from("x")]), Ok("labelled"));
    }

    #[test]
    fn reports_ambiguity() {
        let t = Overloads::new("f")
            .with("number", |_| 1)
            .and_then(|o| o.with("any", |_| 2))
            .unwrap();
        match t.resolve(vec![Value::Number(1.0)]) {
            Err(SignatureError::Ambiguous { candidates, got, .. }) => {
                assert_eq!(got, "number");
                assert_eq!(candidates, vec!["number".to_string(), "any".to_string()]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn no_match_lists_patterns() {
        let t = table().unwrap();
        let err = t.resolve(Vec::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "no overload of delay accepts (); expected one of: number | number, function|object | any, string"
        );
        assert_eq!(t.resolve_or_else(Vec::new(), |_| "handled"), "handled");
    }
}
