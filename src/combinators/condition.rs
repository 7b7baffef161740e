//! Asynchronous predicates used by `dowhile`, `ifelse` and `ifthen`.

use std::future::Future;

use async_trait::async_trait;

/// A predicate re-evaluated by a combinator, possibly asynchronously.
///
/// Implemented for every `FnMut() -> impl Future<Output = bool>`:
///
/// ```rust
/// use taskweave::{Context, Task, ifthen};
///
/// let t = ifthen(|| async { std::env::var("CI").is_ok() }, || {
///     Task::new("ci-only", |ctx: Context| async move { ctx.ok("") })
/// });
/// # drop(t);
/// ```
#[async_trait]
pub trait Condition: Send + 'static {
    /// Evaluates the predicate once.
    async fn check(&mut self) -> bool;
}

#[async_trait]
impl<F, Fut> Condition for F
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    async fn check(&mut self) -> bool {
        (self)().await
    }
}
