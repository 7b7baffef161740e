//! Error types used by tasks, combinators and the runner.
//!
//! This module defines three error enums:
//!
//! - [`TaskError`] - the failure side of every task outcome.
//! - [`SignatureError`] - argument-shape errors raised by the overload dispatcher.
//! - [`RuntimeError`] - errors surfaced by the [`Runner`](crate::Runner) to the process boundary.
//!
//! All of them provide `as_label` (stable snake_case, for logs) and `as_message` helpers.

use std::any::Any;
use std::time::Duration;
use thiserror::Error;

/// Default reason carried by a cancellation failure.
pub const ABORTED: &str = "aborted";

/// # Errors produced by task execution.
///
/// Every task either completes with a message or fails with one of these.
/// Cancellation is an ordinary failure with its own variant ([`TaskError::Aborted`]),
/// so callers that only care about success/failure can ignore the distinction.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The task called `fail` (directly or by propagating a child failure).
    #[error("{reason}")]
    Failed {
        /// Formatted failure reason.
        reason: String,
    },

    /// The task was cancelled before or while running.
    #[error("{reason}")]
    Aborted {
        /// Cancellation reason (`"aborted"` unless the caller supplied one).
        reason: String,
    },

    /// A `timeout` combinator fired before its child finished.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// `run` was called on a task that is no longer pending,
    /// or `subscribe` was called after `run`.
    #[error("task {task:?} has already been started")]
    AlreadyStarted {
        /// Name of the offending task.
        task: String,
    },

    /// Every handle able to complete the task was dropped before it completed.
    #[error("task {task:?} was dropped before completing")]
    Abandoned {
        /// Name of the abandoned task.
        task: String,
    },

    /// An executor or a task factory panicked.
    #[error("panicked: {message}")]
    Panicked {
        /// Panic payload, when it was a string.
        message: String,
    },

    /// A combinator was built from arguments no overload accepts.
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

impl TaskError {
    /// Shorthand for [`TaskError::Failed`].
    pub fn failed(reason: impl Into<String>) -> Self {
        TaskError::Failed {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`TaskError::Aborted`].
    pub fn aborted(reason: impl Into<String>) -> Self {
        TaskError::Aborted {
            reason: reason.into(),
        }
    }

    /// Converts a caught panic payload into [`TaskError::Panicked`].
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        TaskError::Panicked { message }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use taskweave::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Failed { .. } => "task_failed",
            TaskError::Aborted { .. } => "task_aborted",
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::AlreadyStarted { .. } => "task_already_started",
            TaskError::Abandoned { .. } => "task_abandoned",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Signature(_) => "task_signature",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Failed { reason } => format!("failed: {reason}"),
            TaskError::Aborted { reason } => format!("aborted: {reason}"),
            other => other.to_string(),
        }
    }

    /// The plain reason string, as carried by the terminal event.
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// Indicates whether the failure came from cancellation.
    ///
    /// # Example
    /// ```
    /// use taskweave::TaskError;
    ///
    /// assert!(TaskError::aborted("aborted").is_aborted());
    /// assert!(!TaskError::failed("boom").is_aborted());
    /// ```
    pub fn is_aborted(&self) -> bool {
        matches!(self, TaskError::Aborted { .. })
    }
}

/// # Argument-shape errors.
///
/// Raised by [`Overloads::resolve`](crate::signature::Overloads::resolve) before any task runs.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// A pattern named a type the dispatcher does not know.
    #[error("unknown type name {name:?} in pattern {pattern:?}")]
    UnknownType {
        /// The unrecognized type name.
        name: String,
        /// The pattern it appeared in.
        pattern: String,
    },

    /// No overload accepts the given argument shape.
    #[error("no overload of {target} accepts ({got}); expected one of: {}", expected.join(" | "))]
    NoMatch {
        /// Name of the function being dispatched.
        target: String,
        /// Reflected shape of the arguments.
        got: String,
        /// Patterns that were tried.
        expected: Vec<String>,
    },

    /// More than one overload accepts the given argument shape.
    #[error("ambiguous call to {target} with ({got}); candidates: {}", candidates.join(" | "))]
    Ambiguous {
        /// Name of the function being dispatched.
        target: String,
        /// Reflected shape of the arguments.
        got: String,
        /// Patterns that matched.
        candidates: Vec<String>,
    },

    /// A matched argument did not hold what the overload needs (e.g. a non-task array element).
    #[error("invalid argument for {target}: {detail}")]
    InvalidArgument {
        /// Name of the function being dispatched.
        target: String,
        /// What was wrong.
        detail: String,
    },
}

impl SignatureError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SignatureError::UnknownType { .. } => "signature_unknown_type",
            SignatureError::NoMatch { .. } => "signature_no_match",
            SignatureError::Ambiguous { .. } => "signature_ambiguous",
            SignatureError::InvalidArgument { .. } => "signature_invalid_argument",
        }
    }
}

/// # Errors surfaced by the runner to the invoking process.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The selected task failed.
    #[error("task {task:?} failed: {error}")]
    TaskFailed {
        /// Name the task was registered under.
        task: String,
        /// The task's failure.
        error: TaskError,
    },

    /// A shutdown signal cancelled the task and it did not fail within the grace period.
    #[error("shutdown timeout {grace:?} exceeded; task {task:?} still running")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Name of the stuck task.
        task: String,
    },

    /// Installing the OS signal listeners failed.
    #[error("signal handling failed: {0}")]
    Signal(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use taskweave::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), task: "build".into() };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::TaskFailed { .. } => "runtime_task_failed",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::Signal(_) => "runtime_signal",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::TaskFailed { task, error } => {
                format!("task {task} failed ({}): {error}", error.as_label())
            }
            RuntimeError::GraceExceeded { grace, task } => {
                format!("grace exceeded after {grace:?}; stuck task={task}")
            }
            RuntimeError::Signal(e) => format!("signal: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_displays_bare_reason() {
        assert_eq!(TaskError::failed("x").to_string(), "x");
        assert_eq!(TaskError::aborted(ABORTED).to_string(), "aborted");
        assert_eq!(TaskError::failed("x").as_message(), "failed: x");
    }

    #[test]
    fn panic_payloads_are_readable() {
        let err = TaskError::from_panic(Box::new("boom"));
        assert_eq!(
            err,
            TaskError::Panicked {
                message: "boom".into()
            }
        );
        let err = TaskError::from_panic(Box::new(String::from("owned")));
        assert_eq!(err.reason(), "panicked: owned");
        let err = TaskError::from_panic(Box::new(42_u8));
        assert_eq!(err.as_label(), "task_panicked");
    }

    #[test]
    fn signature_errors_list_patterns() {
        let err = SignatureError::NoMatch {
            target: "timeout".into(),
            got: "string".into(),
            expected: vec!["number, function|object".into()],
        };
        assert_eq!(
            err.to_string(),
            "no overload of timeout accepts (string); expected one of: number, function|object"
        );
        let wrapped: TaskError = err.into();
        assert_eq!(wrapped.as_label(), "task_signature");
    }
}
