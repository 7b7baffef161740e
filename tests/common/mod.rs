// Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskweave::{Context, Event, EventKind, Subscribe, Task};

/// Collects every event it receives.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// `(kind, task name)` pairs in arrival order.
    pub fn kinds(&self) -> Vec<(EventKind, String)> {
        self.events()
            .into_iter()
            .map(|e| (e.kind, e.task.to_string()))
            .collect()
    }

    /// Position of the first `(kind, task)` event.
    pub fn position(&self, kind: EventKind, task: &str) -> Option<usize> {
        self.kinds()
            .iter()
            .position(|(k, t)| *k == kind && t == task)
    }

    /// Number of terminal events emitted by `task`.
    pub fn terminals(&self, task: &str) -> usize {
        self.count(EventKind::Completed, task) + self.count(EventKind::Failed, task)
    }

    pub fn count(&self, kind: EventKind, task: &str) -> usize {
        self.kinds()
            .iter()
            .filter(|(k, t)| *k == kind && t == task)
            .count()
    }
}

impl Subscribe for Recorder {
    fn on_event(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

/// Counts executor invocations and abort hook calls of the tasks it builds.
#[derive(Clone, Default)]
pub struct Spy {
    pub runs: Arc<AtomicUsize>,
    pub aborts: Arc<AtomicUsize>,
}

impl Spy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn aborts(&self) -> usize {
        self.aborts.load(Ordering::SeqCst)
    }

    /// Completes with `msg` right away.
    pub fn ok(&self, name: &'static str, msg: &'static str) -> Task {
        let runs = Arc::clone(&self.runs);
        Task::new(name, move |ctx: Context| async move {
            runs.fetch_add(1, Ordering::SeqCst);
            ctx.ok(msg);
        })
    }

    /// Fails with `reason` right away.
    pub fn fail(&self, name: &'static str, reason: &'static str) -> Task {
        let runs = Arc::clone(&self.runs);
        Task::new(name, move |ctx: Context| async move {
            runs.fetch_add(1, Ordering::SeqCst);
            ctx.fail(reason);
        })
    }

    /// Runs until aborted, then fails from its own future (not from the hook).
    pub fn waiter(&self, name: &'static str) -> Task {
        let runs = Arc::clone(&self.runs);
        let aborts = Arc::clone(&self.aborts);
        Task::new(name, move |ctx: Context| async move {
            runs.fetch_add(1, Ordering::SeqCst);
            ctx.cancelled().await;
            tokio::task::yield_now().await;
            aborts.fetch_add(1, Ordering::SeqCst);
            ctx.fail_with(ctx.abort_error());
        })
    }

    /// Completes after `ms`; an abort is counted and fails the task.
    pub fn sleeper(&self, name: &'static str, ms: u64) -> Task {
        let runs = Arc::clone(&self.runs);
        let aborts = Arc::clone(&self.aborts);
        Task::new(name, move |ctx: Context| {
            runs.fetch_add(1, Ordering::SeqCst);
            let hook_ctx = ctx.clone();
            ctx.on_abort(move || {
                aborts.fetch_add(1, Ordering::SeqCst);
                hook_ctx.fail_with(hook_ctx.abort_error());
            });
            async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                ctx.ok(name);
            }
        })
    }
}
