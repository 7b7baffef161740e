//! # Deferred values
//!
//! [`Deferred`] is a settle-once result future used to bridge callback-style
//! completion (`ok`/`fail` called from anywhere, possibly from another spawned
//! future) into an awaitable value. It is the type behind
//! [`Task::run`](crate::Task::run)'s [`Outcome`](crate::Outcome).
//!
//! ## Rules
//! - A deferred settles **exactly once**; later `resolve`/`reject` calls are ignored.
//! - The executor passed to [`Deferred::new`] runs synchronously; a panic inside it rejects.
//! - If every [`Resolver`] is dropped without settling, the deferred rejects with
//!   [`TaskError::Abandoned`].
//! - Continuations (`then`, `and_then`, `catch`) run when the deferred is polled;
//!   a panic inside one rejects the chained deferred.
//!
//! ## Example
//! ```rust
//! use taskweave::{Deferred, TaskError};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let d = Deferred::new(|r| {
//!     r.resolve(2);
//!     r.resolve(3); // ignored
//! });
//! assert_eq!(d.then(|v| v * 10).await, Ok(20));
//!
//! let all = Deferred::all(vec![Deferred::resolved(1), Deferred::rejected(TaskError::failed("x"))]);
//! assert_eq!(all.await, Err(TaskError::failed("x")));
//! # }
//! ```

use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use futures::future::{self, BoxFuture, FutureExt};
use tokio::sync::oneshot;

use crate::error::TaskError;
use crate::sync::lock;

type Slot<T> = Arc<Mutex<Option<oneshot::Sender<Result<T, TaskError>>>>>;

/// Settling half of a [`Deferred`]. Cloneable; the first settle wins.
pub struct Resolver<T> {
    slot: Slot<T>,
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Resolver<T> {
    /// Fulfils the deferred. Returns `false` if it was already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Rejects the deferred. Returns `false` if it was already settled.
    pub fn reject(&self, err: TaskError) -> bool {
        self.settle(Err(err))
    }

    /// Settles with an already-built result. Returns `false` if it was already settled.
    pub fn settle(&self, result: Result<T, TaskError>) -> bool {
        let Some(tx) = lock(&self.slot).take() else {
            return false;
        };
        // The receiving side may be gone; the deferred still counts as settled.
        let _ = tx.send(result);
        true
    }

    /// True once `resolve`, `reject` or `settle` has succeeded.
    pub fn is_settled(&self) -> bool {
        lock(&self.slot).is_none()
    }
}

/// Settle-once result future.
///
/// See the [module docs](self) for the rules.
#[must_use = "a deferred does nothing unless awaited"]
pub struct Deferred<T> {
    inner: BoxFuture<'static, Result<T, TaskError>>,
}

impl<T: Send + 'static> Deferred<T> {
    /// Creates a pending deferred and its resolver.
    pub fn channel() -> (Resolver<T>, Self) {
        Self::labelled("deferred")
    }

    /// Like [`Deferred::channel`], naming the owner reported by [`TaskError::Abandoned`].
    pub(crate) fn labelled(label: impl Into<String>) -> (Resolver<T>, Self) {
        let (tx, rx) = oneshot::channel();
        let label = label.into();
        let inner = async move {
            match rx.await {
                Ok(result) => result,
                Err(_) => Err(TaskError::Abandoned { task: label }),
            }
        }
        .boxed();
        let resolver = Resolver {
            slot: Arc::new(Mutex::new(Some(tx))),
        };
        (resolver, Self { inner })
    }

    /// Creates a deferred and hands its resolver to `executor`, synchronously.
    ///
    /// A panic raised by `executor` rejects the deferred with [`TaskError::Panicked`]
    /// (unless it had already settled).
    pub fn new<F>(executor: F) -> Self
    where
        F: FnOnce(Resolver<T>),
    {
        let (resolver, deferred) = Self::channel();
        let handle = resolver.clone();
        if let Err(payload) = catch_unwind(AssertUnwindSafe(move || executor(handle))) {
            resolver.reject(TaskError::from_panic(payload));
        }
        deferred
    }

    /// An already-fulfilled deferred.
    pub fn resolved(value: T) -> Self {
        Self {
            inner: future::ready(Ok(value)).boxed(),
        }
    }

    /// An already-rejected deferred.
    pub fn rejected(err: TaskError) -> Self {
        Self {
            inner: future::ready(Err(err)).boxed(),
        }
    }

    /// Wraps an arbitrary result future.
    pub fn from_future<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        Self { inner: fut.boxed() }
    }

    /// Maps the fulfilled value.
    pub fn then<U, F>(self, f: F) -> Deferred<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.and_then(move |v| Ok(f(v)))
    }

    /// Chains a fallible continuation on the fulfilled value.
    pub fn and_then<U, F>(self, f: F) -> Deferred<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<U, TaskError> + Send + 'static,
    {
        Deferred::from_future(self.inner.map(|res| match res {
            Ok(v) => guarded(move || f(v)),
            Err(e) => Err(e),
        }))
    }

    /// Recovers from (or rewrites) a rejection.
    pub fn catch<F>(self, f: F) -> Deferred<T>
    where
        F: FnOnce(TaskError) -> Result<T, TaskError> + Send + 'static,
    {
        Deferred::from_future(self.inner.map(|res| match res {
            Ok(v) => Ok(v),
            Err(e) => guarded(move || f(e)),
        }))
    }

    /// Fulfils with every value in input order once all fulfil; rejects with the first rejection.
    ///
    /// Remaining inputs are not awaited further after a rejection and receive no cancellation.
    pub fn all<I>(items: I) -> Deferred<Vec<T>>
    where
        I: IntoIterator<Item = Deferred<T>>,
    {
        Deferred::from_future(future::try_join_all(items))
    }

    /// Settles like whichever input settles first. An empty input rejects with
    /// [`TaskError::Abandoned`], since nothing could ever settle it.
    pub fn race<I>(items: I) -> Deferred<T>
    where
        I: IntoIterator<Item = Deferred<T>>,
    {
        let items: Vec<_> = items.into_iter().collect();
        if items.is_empty() {
            return Deferred::rejected(TaskError::Abandoned {
                task: "race".into(),
            });
        }
        Deferred::from_future(future::select_all(items).map(|(res, _, _)| res))
    }
}

impl<T> Future for Deferred<T> {
    type Output = Result<T, TaskError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().inner.poll_unpin(cx)
    }
}

impl<T> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred").finish_non_exhaustive()
    }
}

fn guarded<U>(f: impl FnOnce() -> Result<U, TaskError>) -> Result<U, TaskError> {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| Err(TaskError::from_panic(payload)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn settles_once() {
        let (r, d) = Deferred::<u32>::channel();
        assert!(r.resolve(1));
        assert!(!r.reject(TaskError::failed("late")));
        assert!(r.is_settled());
        assert_eq!(d.await, Ok(1));
    }

    #[tokio::test]
    async fn executor_panic_rejects() {
        let d = Deferred::<u32>::new(|_| panic!("inside executor"));
        assert_eq!(
            d.await,
            Err(TaskError::Panicked {
                message: "inside executor".into()
            })
        );
    }

    #[tokio::test]
    async fn panic_after_settle_keeps_value() {
        let d = Deferred::new(|r| {
            r.resolve("first");
            panic!("ignored");
        });
        assert_eq!(d.await, Ok("first"));
    }

    #[tokio::test]
    async fn dropped_resolver_abandons() {
        let (r, d) = Deferred::<()>::channel();
        drop(r);
        assert!(matches!(d.await, Err(TaskError::Abandoned { .. })));
    }

    #[tokio::test]
    async fn settles_from_another_future() {
        let (r, d) = Deferred::channel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            r.resolve("later");
        });
        assert_eq!(d.await, Ok("later"));
    }

    #[tokio::test]
    async fn chains_and_recovers() {
        let d = Deferred::<u32>::rejected(TaskError::failed("x"))
            .catch(|e| {
                assert_eq!(e.reason(), "x");
                Ok(7)
            })
            .and_then(|v| if v > 5 { Err(TaskError::failed("big")) } else { Ok(v) });
        assert_eq!(d.await, Err(TaskError::failed("big")));

        let d = Deferred::resolved(1).then(|_: i32| -> i32 { panic!("in then") });
        assert!(matches!(d.await, Err(TaskError::Panicked { .. })));
    }

    #[tokio::test]
    async fn all_keeps_input_order() {
        let (slow, slow_d) = Deferred::channel();
        let fast = Deferred::resolved("b");
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            slow.resolve("a");
        });
        assert_eq!(Deferred::all(vec![slow_d, fast]).await, Ok(vec!["a", "b"]));
        assert_eq!(Deferred::<u8>::all(Vec::new()).await, Ok(vec![]));
    }

    #[tokio::test]
    async fn race_takes_first() {
        let (_never, pending) = Deferred::<&str>::channel();
        let d = Deferred::race(vec![pending, Deferred::resolved("win")]);
        assert_eq!(d.await, Ok("win"));
        assert!(Deferred::<u8>::race(Vec::new()).await.is_err());
    }
}
