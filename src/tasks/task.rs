//! # Run-once task handle.
//!
//! A [`Task`] wraps an [`Executor`] and owns the lifecycle state machine:
//!
//! ```text
//! Pending ──run──► Running ──ok()───► Completed
//!    │                │
//!    │                └────fail()──► Failed
//!    │                │
//!    └─cancel─► Pending(cancelled)   └─cancel─► Running (abort delivered; executor fails)
//! ```
//!
//! ## Rules
//! - `run` succeeds **once**; a second call, or a call after `cancel`, returns an
//!   already-rejected [`Outcome`] and changes nothing.
//! - `subscribe` is only accepted while the task is still pending.
//! - `cancel` is idempotent and a no-op on terminal tasks.
//! - `Task` is a cheap handle: clones refer to the same task.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use futures::FutureExt;

use super::context::{Context, WeakContext};
use super::executor::{ExecFn, Executor};
use crate::deferred::Deferred;
use crate::error::{ABORTED, TaskError};
use crate::subscribers::Subscribe;
use crate::sync::lock;

/// Global id counter; ids correlate events, names are only descriptive.
static TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Settle-once result of a task run: the success message or the failure.
pub type Outcome = Deferred<String>;

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Created, not yet run.
    Pending,
    /// `run` was called; no completion yet.
    Running,
    /// Completed with `ok`.
    Completed,
    /// Completed with `fail` (including aborts).
    Failed,
}

impl Status {
    /// True for `Completed` and `Failed`.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Completed | Status::Failed)
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Running => "running",
            Status::Completed => "completed",
            Status::Failed => "failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Run-once asynchronous unit of work.
///
/// ## Example
/// ```rust
/// use taskweave::{Context, Status, Task, TaskError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let task = Task::new("greet", |ctx: Context| async move {
///     ctx.log("working");
///     ctx.ok("hello");
/// });
///
/// assert_eq!(task.run().await, Ok("hello".to_string()));
/// assert_eq!(task.status(), Status::Completed);
/// assert!(matches!(task.run().await, Err(TaskError::AlreadyStarted { .. })));
/// # }
/// ```
#[derive(Clone)]
pub struct Task {
    shared: Arc<Shared>,
}

pub(crate) struct Shared {
    id: u64,
    name: Arc<str>,
    lifecycle: Mutex<Lifecycle>,
}

struct Lifecycle {
    status: Status,
    /// Cancel reason, once cancelled.
    cancelled: Option<Arc<str>>,
    executor: Option<Box<dyn Executor>>,
    listeners: Vec<Arc<dyn Subscribe>>,
    context: WeakContext,
}

impl Shared {
    /// Records the terminal state. Called by the context on its first completion.
    pub(crate) fn finish(&self, ok: bool) {
        let mut lc = lock(&self.lifecycle);
        if lc.status == Status::Running {
            lc.status = if ok { Status::Completed } else { Status::Failed };
        }
        lc.context = WeakContext::default();
    }
}

impl Task {
    /// Creates a task from a closure receiving the run's [`Context`].
    pub fn new<F, Fut>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: FnOnce(Context) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        Self::from_executor(name, ExecFn::new(f))
    }

    /// Creates a task from any [`Executor`].
    pub fn from_executor(name: impl Into<Arc<str>>, executor: impl Executor) -> Self {
        Self {
            shared: Arc::new(Shared {
                id: TASK_ID.fetch_add(1, AtomicOrdering::Relaxed),
                name: name.into(),
                lifecycle: Mutex::new(Lifecycle {
                    status: Status::Pending,
                    cancelled: None,
                    executor: Some(Box::new(executor)),
                    listeners: Vec::new(),
                    context: WeakContext::default(),
                }),
            }),
        }
    }

    /// Process-unique id.
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    /// Descriptive name (not unique).
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Current lifecycle state.
    pub fn status(&self) -> Status {
        lock(&self.shared.lifecycle).status
    }

    /// True once `cancel` took effect (pending or running task).
    pub fn is_cancelled(&self) -> bool {
        lock(&self.shared.lifecycle).cancelled.is_some()
    }

    /// Registers an event listener. Only accepted before `run`.
    ///
    /// # Errors
    /// [`TaskError::AlreadyStarted`] if the task is no longer pending.
    pub fn subscribe(&self, listener: impl Subscribe) -> Result<(), TaskError> {
        let mut lc = lock(&self.shared.lifecycle);
        if lc.status != Status::Pending {
            return Err(self.already_started());
        }
        lc.listeners.push(Arc::new(listener));
        Ok(())
    }

    /// Starts the task and returns its outcome.
    ///
    /// The executor is invoked synchronously (a closure body runs before this
    /// returns) and the future it produces is spawned on the current tokio
    /// runtime. A second call, or a call on a cancelled task, returns an
    /// already-rejected outcome without side effects.
    ///
    /// # Panics
    /// When called outside a tokio runtime.
    pub fn run(&self) -> Outcome {
        let (ctx, executor, outcome) = {
            let mut lc = lock(&self.shared.lifecycle);
            if lc.status != Status::Pending {
                tracing::warn!(task = %self.shared.name, status = %lc.status, "run called twice");
                return Deferred::rejected(self.already_started());
            }
            if let Some(reason) = &lc.cancelled {
                return Deferred::rejected(TaskError::aborted(&**reason));
            }
            let Some(executor) = lc.executor.take() else {
                return Deferred::rejected(self.already_started());
            };
            let (resolver, outcome) = Deferred::labelled(self.name());
            let ctx = Context::new(
                self.shared.id,
                Arc::clone(&self.shared.name),
                Arc::downgrade(&self.shared),
                lc.listeners.clone(),
                resolver,
            );
            lc.status = Status::Running;
            lc.context = ctx.downgrade();
            (ctx, executor, outcome)
        };

        ctx.started();
        let fut = match catch_unwind(AssertUnwindSafe(|| executor.execute(ctx.clone()))) {
            Ok(fut) => fut,
            Err(payload) => {
                ctx.fail_with(TaskError::from_panic(payload));
                return outcome;
            }
        };
        tokio::spawn(async move {
            if let Err(payload) = AssertUnwindSafe(fut).catch_unwind().await {
                ctx.fail_with(TaskError::from_panic(payload));
            }
        });
        outcome
    }

    /// Subscribes `listener`, then runs.
    pub fn run_with(&self, listener: impl Subscribe) -> Outcome {
        if let Err(e) = self.subscribe(listener) {
            return Deferred::rejected(e);
        }
        self.run()
    }

    /// Requests cancellation with the default `"aborted"` reason.
    pub fn cancel(&self) {
        self.cancel_with(ABORTED);
    }

    /// Requests cancellation.
    ///
    /// - Pending: the task is marked cancelled and will refuse to run.
    /// - Running: the run's abort is delivered once (token + hook).
    /// - Terminal, or already cancelled: no-op.
    pub fn cancel_with(&self, reason: impl Into<Arc<str>>) {
        let reason = reason.into();
        let ctx = {
            let mut lc = lock(&self.shared.lifecycle);
            if lc.cancelled.is_some() || lc.status.is_terminal() {
                return;
            }
            lc.cancelled = Some(Arc::clone(&reason));
            match lc.status {
                Status::Running => lc.context.upgrade(),
                _ => {
                    lc.executor = None;
                    None
                }
            }
        };
        if let Some(ctx) = ctx {
            ctx.abort(reason);
        }
    }

    fn already_started(&self) -> TaskError {
        TaskError::AlreadyStarted {
            task: self.name().to_string(),
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.shared.id)
            .field("name", &self.shared.name)
            .field("status", &self.status())
            .finish()
    }
}

/// Anything a task factory may return: a [`Task`], or a `Result` whose error
/// fails the enclosing combinator.
pub trait IntoTask {
    /// Converts into a task, or the error that prevented building one.
    fn into_task(self) -> Result<Task, TaskError>;
}

impl IntoTask for Task {
    fn into_task(self) -> Result<Task, TaskError> {
        Ok(self)
    }
}

impl<E: Into<TaskError>> IntoTask for Result<Task, E> {
    fn into_task(self) -> Result<Task, TaskError> {
        self.map_err(Into::into)
    }
}
