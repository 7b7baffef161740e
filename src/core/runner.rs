//! # Command-line task dispatcher.
//!
//! [`Runner`] owns a name → task map. [`Runner::dispatch`] reads the task name
//! from the argument list (the first element is the program name), runs that
//! task and reports its outcome.
//!
//! ## Flow
//! ```text
//! dispatch(args)
//!   ├─ no name / unknown name ──► print available names ──► Ok(None)
//!   └─ task found
//!        ├─► subscribe: configured subscribers + event bus
//!        ├─► task.run()
//!        └─► select!
//!              ├─ outcome ok  ──► Ok(Some(msg))
//!              ├─ outcome err ──► Err(TaskFailed)
//!              └─ signal      ──► task.cancel_with("interrupted by SIG..")
//!                                  └─► wait up to cfg.grace
//!                                        ├─ settled  ──► as above
//!                                        └─ elapsed  ──► Err(GraceExceeded)
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskweave::{Config, LogWriter, Runner, Subscribe, leaf, series};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), taskweave::RuntimeError> {
//! let cfg = Config::default();
//! let log: Arc<dyn Subscribe> = Arc::new(LogWriter::with_config(&cfg));
//!
//! Runner::new(cfg)
//!     .with_subscribers(vec![log])
//!     .with_task("build", series(vec![leaf::shell("cargo build"), leaf::shell("cargo test")]))
//!     .with_task("hello", leaf::ok("hi"))
//!     .dispatch(std::env::args())
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::future::Future;
use std::io;
use std::sync::Arc;

use tokio::sync::broadcast;

use super::shutdown;
use crate::config::Config;
use crate::error::RuntimeError;
use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;
use crate::tasks::Task;

/// Named task registry driven from the command line.
pub struct Runner {
    cfg: Config,
    bus: Bus,
    tasks: BTreeMap<String, Task>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl Runner {
    pub fn new(cfg: Config) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            cfg,
            bus,
            tasks: BTreeMap::new(),
            subscribers: Vec::new(),
        }
    }

    /// Registers `task` under `name`, replacing an earlier registration.
    pub fn with_task(mut self, name: impl Into<String>, task: Task) -> Self {
        self.tasks.insert(name.into(), task);
        self
    }

    /// Sets the listeners attached to the dispatched task.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    /// Receiver for every event of the dispatched task tree.
    ///
    /// Only events published after this call are received.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Runs the task named by `args[1]`.
    ///
    /// Returns `Ok(None)` when no (or an unknown) name was given, after printing
    /// the available names; `Ok(Some(msg))` when the task completed.
    ///
    /// # Errors
    /// - [`RuntimeError::TaskFailed`] when the task failed (including after a signal);
    /// - [`RuntimeError::GraceExceeded`] when it did not fail within `cfg.grace` after a signal;
    /// - [`RuntimeError::Signal`] when signal listeners could not be installed.
    pub async fn dispatch<I, S>(self, args: I) -> Result<Option<String>, RuntimeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dispatch_until(args, shutdown::wait_for_signal()).await
    }

    /// [`Runner::dispatch`] with an explicit shutdown trigger.
    pub(crate) async fn dispatch_until<I, S, F>(
        mut self,
        args: I,
        shutdown: F,
    ) -> Result<Option<String>, RuntimeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Future<Output = io::Result<&'static str>>,
    {
        let Some(name) = args.into_iter().nth(1).map(|a| a.as_ref().to_owned()) else {
            self.print_names();
            return Ok(None);
        };
        let Some(task) = self.tasks.remove(&name) else {
            tracing::warn!(task = %name, "unknown task");
            self.print_names();
            return Ok(None);
        };

        let attached = self
            .subscribers
            .iter()
            .try_for_each(|sub| task.subscribe(Forward(Arc::clone(sub))))
            .and_then(|()| task.subscribe(self.bus.clone()));
        if let Err(error) = attached {
            return Err(RuntimeError::TaskFailed { task: name, error });
        }

        tracing::info!(task = %name, id = task.id(), "dispatching");
        let mut outcome = task.run();
        let result = tokio::select! {
            res = &mut outcome => res,
            signal = shutdown => {
                let signal = match signal {
                    Ok(signal) => signal,
                    Err(e) => {
                        task.cancel();
                        return Err(RuntimeError::Signal(e));
                    }
                };
                tracing::info!(task = %name, signal, grace = ?self.cfg.grace, "shutdown requested");
                task.cancel_with(format!("interrupted by {signal}"));
                match tokio::time::timeout(self.cfg.grace, &mut outcome).await {
                    Ok(res) => res,
                    Err(_) => {
                        tracing::error!(task = %name, "task did not stop within grace");
                        return Err(RuntimeError::GraceExceeded { grace: self.cfg.grace, task: name });
                    }
                }
            }
        };

        match result {
            Ok(msg) => {
                tracing::info!(task = %name, "completed");
                Ok(Some(msg))
            }
            Err(error) => {
                tracing::error!(task = %name, label = error.as_label(), error = %error, "failed");
                Err(RuntimeError::TaskFailed { task: name, error })
            }
        }
    }

    fn print_names(&self) {
        tracing::info!(count = self.tasks.len(), "no task selected");
        println!("available tasks:");
        for name in self.names() {
            println!("  {name}");
        }
    }
}

/// Shares one listener across dispatches, keeping its name in diagnostics.
struct Forward(Arc<dyn Subscribe>);

impl Subscribe for Forward {
    fn on_event(&self, event: &Event) {
        self.0.on_event(event);
    }

    fn name(&self) -> &'static str {
        self.0.name()
    }
}
