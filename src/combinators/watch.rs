//! Restart-on-change supervision.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use super::{abort, guarded, stop};
use crate::config::Config;
use crate::error::TaskError;
use crate::leaf::{ChangeSource, PollWatcher};
use crate::tasks::{BoxTaskFuture, Context, Executor, IntoTask, Outcome, Task};

/// Cancel reason given to a child replaced after a change.
const RESTARTED: &str = "restarted";

/// Watches paths and (re)starts `f()` after every debounced change.
///
/// ## Rules
/// - Nothing runs until the first change is observed.
/// - A change cancels the running child (if any), waits for it to settle and
///   starts a fresh one.
/// - A failing child is logged and tolerated; the watch keeps going.
/// - The watch only terminates through cancellation: it cancels its current
///   child and fails with the abort error.
pub struct Watch<F> {
    paths: Vec<PathBuf>,
    f: F,
    source: Arc<dyn ChangeSource>,
    debounce: Duration,
}

impl<F, R> Watch<F>
where
    F: FnMut() -> R + Send + 'static,
    R: IntoTask + 'static,
{
    /// Polls `paths` with a [`PollWatcher`] and the default debounce.
    pub fn new<I, P>(paths: I, f: F) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            f,
            source: Arc::new(PollWatcher::default()),
            debounce: Config::default().debounce,
        }
    }

    /// Replaces the change notification source.
    pub fn with_source(mut self, source: impl ChangeSource) -> Self {
        self.source = Arc::new(source);
        self
    }

    /// Replaces the quiet interval applied before restarting.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Wraps the watch into a `"watch"` task.
    pub fn into_task(self) -> Task {
        Task::from_executor("watch", self)
    }

    async fn run(mut self, ctx: Context) {
        let mut changes = match self.source.subscribe(&self.paths) {
            Ok(rx) => rx,
            Err(e) => {
                ctx.fail_with(e);
                return;
            }
        };
        ctx.log(format_args!("watching {} path(s)", self.paths.len()));

        let mut current: Option<Task> = None;
        let mut running: Option<Outcome> = None;
        let mut open = true;

        loop {
            tokio::select! {
                biased;
                _ = ctx.cancelled() => {
                    halt(&ctx, &mut current, &mut running, &ctx.abort_error().reason()).await;
                    abort(&ctx, []);
                    return;
                }
                res = settle(&mut running) => {
                    running = None;
                    if let Err(e) = res {
                        tracing::debug!(task = ctx.name(), error = %e, "watched child failed; waiting for changes");
                    }
                }
                change = changes.recv(), if open => {
                    let Some(first) = change else {
                        open = false;
                        continue;
                    };
                    match quiet(&ctx, &mut changes, self.debounce).await {
                        Quiet::Aborted => {
                            halt(&ctx, &mut current, &mut running, &ctx.abort_error().reason()).await;
                            abort(&ctx, []);
                            return;
                        }
                        Quiet::Closed => open = false,
                        Quiet::Settled => {}
                    }
                    ctx.log(format_args!("changed: {}", first.display()));
                    halt(&ctx, &mut current, &mut running, RESTARTED).await;
                    let task = match guarded(&mut self.f) {
                        Ok(task) => task,
                        Err(e) => {
                            ctx.fail_with(e);
                            return;
                        }
                    };
                    ctx.adopt(&task);
                    running = Some(task.run());
                    current = Some(task);
                }
            }
        }
    }
}

impl<F, R> Executor for Watch<F>
where
    F: FnMut() -> R + Send + 'static,
    R: IntoTask + 'static,
{
    fn execute(self: Box<Self>, ctx: Context) -> BoxTaskFuture {
        Box::pin((*self).run(ctx))
    }
}

/// A `"watch"` task polling `paths` and restarting `f()` on change.
pub fn watch<I, P, F, R>(paths: I, f: F) -> Task
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
    F: FnMut() -> R + Send + 'static,
    R: IntoTask + 'static,
{
    Watch::new(paths, f).into_task()
}

enum Quiet {
    Settled,
    Closed,
    Aborted,
}

/// Waits until no change arrived for `debounce`, swallowing the burst.
async fn quiet(ctx: &Context, changes: &mut mpsc::Receiver<PathBuf>, debounce: Duration) -> Quiet {
    loop {
        tokio::select! {
            biased;
            _ = ctx.cancelled() => return Quiet::Aborted,
            more = changes.recv() => {
                if more.is_none() {
                    return Quiet::Closed;
                }
            }
            _ = tokio::time::sleep(debounce) => return Quiet::Settled,
        }
    }
}

/// Stops the current child if it is still running.
async fn halt(ctx: &Context, current: &mut Option<Task>, running: &mut Option<Outcome>, reason: &str) {
    if let (Some(task), Some(outcome)) = (current.take(), running.take()) {
        stop(ctx, &task, outcome, reason).await;
    }
}

/// Resolves with the running child's outcome; pending while nothing runs.
async fn settle(running: &mut Option<Outcome>) -> Result<String, TaskError> {
    match running {
        Some(outcome) => outcome.await,
        None => std::future::pending().await,
    }
}
