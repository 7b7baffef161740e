use crate::tasks::{Context, Task};

/// A task completing with `msg`.
pub fn ok(msg: impl Into<String>) -> Task {
    let msg = msg.into();
    Task::new("ok", move |ctx: Context| async move { ctx.ok(msg) })
}

/// A task failing with `reason`.
pub fn fail(reason: impl Into<String>) -> Task {
    let reason = reason.into();
    Task::new("fail", move |ctx: Context| async move { ctx.fail(reason) })
}

/// A task completing with an empty message.
pub fn noop() -> Task {
    Task::new("noop", |ctx: Context| async move { ctx.ok("") })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;

    #[tokio::test]
    async fn constant_outcomes() {
        assert_eq!(ok("fine").run().await, Ok("fine".into()));
        assert_eq!(fail("bad").run().await, Err(TaskError::failed("bad")));
        assert_eq!(noop().run().await, Ok(String::new()));
    }
}
