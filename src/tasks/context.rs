//! # Execution context of one task run.
//!
//! A [`Context`] is created by [`Task::run`](crate::Task::run) and handed to the
//! task's executor. It is the only way to move the task to a terminal state.
//!
//! ## Rules
//! - The **first** `ok`/`fail`/`fail_with` wins; later calls (and `log`/`emit` after
//!   completion) are silently dropped.
//! - The terminal event is delivered to listeners **before** the run's outcome settles.
//! - Abort is delivered at most once: the cancellation token is cancelled and the
//!   currently registered hook (if any) is invoked. Aborting a completed context does nothing.
//! - Clones share state. When the last clone of an uncompleted context is dropped, the
//!   task fails with [`TaskError::Abandoned`].
//!
//! ## Cancellation protocol
//! ```text
//! Task::cancel() ──► Context::abort(reason)
//!                      ├─► token.cancel()       (select! on ctx.cancelled())
//!                      └─► hook()               (callback-style leaves)
//!                                 ▼
//!                      executor calls fail_with(ctx.abort_error())
//! ```

use std::fmt::{self, Display};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, Weak};

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use super::task::{Shared, Task};
use crate::deferred::Resolver;
use crate::error::{ABORTED, TaskError};
use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use crate::sync::lock;

type AbortHook = Box<dyn FnOnce() + Send>;

/// Capability object passed to a task's executor.
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

struct Inner {
    id: u64,
    name: Arc<str>,
    task: Weak<Shared>,
    listeners: Vec<Arc<dyn Subscribe>>,
    token: CancellationToken,
    state: Mutex<State>,
}

struct State {
    /// `None` once the run has completed.
    resolver: Option<Resolver<String>>,
    hook: Option<AbortHook>,
    /// Set when the run was aborted.
    aborted: Option<Arc<str>>,
}

/// Non-owning handle kept by the task while it runs.
#[derive(Default)]
pub(crate) struct WeakContext(Weak<Inner>);

impl WeakContext {
    pub(crate) fn upgrade(&self) -> Option<Context> {
        self.0.upgrade().map(|inner| Context { inner })
    }
}

impl Context {
    pub(crate) fn new(
        id: u64,
        name: Arc<str>,
        task: Weak<Shared>,
        listeners: Vec<Arc<dyn Subscribe>>,
        resolver: Resolver<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                id,
                name,
                task,
                listeners,
                token: CancellationToken::new(),
                state: Mutex::new(State {
                    resolver: Some(resolver),
                    hook: None,
                    aborted: None,
                }),
            }),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakContext {
        WeakContext(Arc::downgrade(&self.inner))
    }

    /// Id of the running task.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Name of the running task.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Emits a `Log` event. Dropped after completion.
    pub fn log(&self, msg: impl Display) {
        let st = lock(&self.inner.state);
        if st.resolver.is_none() {
            return;
        }
        let ev = Event::new(EventKind::Log, self.inner.id, Arc::clone(&self.inner.name))
            .with_data(msg.to_string());
        self.inner.dispatch(&ev);
    }

    /// Re-emits an event (typically a child's) to this task's listeners.
    /// Dropped after completion.
    pub fn emit(&self, event: &Event) {
        let st = lock(&self.inner.state);
        if st.resolver.is_none() {
            return;
        }
        self.inner.dispatch(event);
    }

    /// Completes the run successfully. Only the first completion has effect.
    pub fn ok(&self, msg: impl Display) {
        self.inner.complete(Ok(msg.to_string()));
    }

    /// Fails the run with a formatted reason. Only the first completion has effect.
    pub fn fail(&self, reason: impl Display) {
        self.inner.complete(Err(TaskError::failed(reason.to_string())));
    }

    /// Fails the run with an existing error (e.g. a child's). Only the first completion has effect.
    pub fn fail_with(&self, err: TaskError) {
        self.inner.complete(Err(err));
    }

    /// Settles the run from a result: `Ok(msg)` completes, `Err(e)` fails.
    pub fn finish(&self, result: Result<String, TaskError>) {
        self.inner.complete(result);
    }

    /// True once `ok`/`fail` took effect.
    pub fn is_completed(&self) -> bool {
        lock(&self.inner.state).resolver.is_none()
    }

    /// Registers the abort hook, replacing any previous one.
    ///
    /// If the run was already aborted the hook runs immediately; if it already
    /// completed the hook is dropped.
    pub fn on_abort(&self, hook: impl FnOnce() + Send + 'static) {
        let mut st = lock(&self.inner.state);
        if st.resolver.is_none() {
            return;
        }
        if st.aborted.is_some() {
            drop(st);
            self.run_hook(Box::new(hook));
            return;
        }
        st.hook = Some(Box::new(hook));
    }

    /// True once the run was aborted.
    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Resolves when the run is aborted.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.inner.token.cancelled()
    }

    /// A token cancelled together with this run. Cancelling it does not abort the run.
    pub fn token(&self) -> CancellationToken {
        self.inner.token.child_token()
    }

    /// The failure an aborted combinator reports: [`TaskError::Aborted`] with the cancel reason.
    pub fn abort_error(&self) -> TaskError {
        let st = lock(&self.inner.state);
        let reason = st.aborted.as_deref().unwrap_or(ABORTED);
        TaskError::aborted(reason)
    }

    /// Forwards every event of `child` to this run's listeners.
    ///
    /// Must be called before `child.run()`. A child that already started is left
    /// as is: its `run` reports [`TaskError::AlreadyStarted`].
    pub fn adopt(&self, child: &Task) {
        let parent = self.clone();
        let _ = child.subscribe(move |ev: &Event| parent.emit(ev));
    }

    /// Delivers an abort request. Called by [`Task::cancel_with`].
    pub(crate) fn abort(&self, reason: Arc<str>) {
        let hook = {
            let mut st = lock(&self.inner.state);
            if st.resolver.is_none() || st.aborted.is_some() {
                return;
            }
            st.aborted = Some(reason);
            st.hook.take()
        };
        tracing::debug!(task = %self.inner.name, id = self.inner.id, "abort requested");
        self.inner.token.cancel();
        if let Some(hook) = hook {
            self.run_hook(hook);
        }
    }

    fn run_hook(&self, hook: AbortHook) {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(hook)) {
            self.fail_with(TaskError::from_panic(payload));
        }
    }

    /// Emits the `Started` event.
    pub(crate) fn started(&self) {
        let _st = lock(&self.inner.state);
        let ev = Event::new(EventKind::Started, self.inner.id, Arc::clone(&self.inner.name));
        self.inner.dispatch(&ev);
    }
}

impl Inner {
    fn dispatch(&self, ev: &Event) {
        for listener in &self.listeners {
            if catch_unwind(AssertUnwindSafe(|| listener.on_event(ev))).is_err() {
                tracing::warn!(
                    listener = listener.name(),
                    task = %self.name,
                    "listener panicked; event skipped for it"
                );
            }
        }
    }

    fn complete(&self, result: Result<String, TaskError>) {
        let mut st = lock(&self.state);
        let Some(resolver) = st.resolver.take() else {
            return;
        };
        st.hook = None;
        if let Some(task) = self.task.upgrade() {
            task.finish(result.is_ok());
        }
        let ev = match &result {
            Ok(msg) => Event::new(EventKind::Completed, self.id, Arc::clone(&self.name))
                .with_data(msg.as_str()),
            Err(err) => Event::new(EventKind::Failed, self.id, Arc::clone(&self.name))
                .with_data(err.reason()),
        };
        self.dispatch(&ev);
        drop(st);
        resolver.settle(result);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let pending = lock(&self.state).resolver.is_some();
        if pending {
            tracing::debug!(task = %self.name, id = self.id, "context dropped before completing");
            self.complete(Err(TaskError::Abandoned {
                task: self.name.to_string(),
            }));
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("completed", &self.is_completed())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
