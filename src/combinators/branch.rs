//! Conditional branching.

use super::{Child, Condition, Step, abort, drive};
use crate::tasks::{BoxTaskFuture, Context, Executor, Task};

/// Evaluates a condition once, then runs one of two branches.
///
/// The chosen branch's outcome becomes the outcome of the whole task. A missing
/// `otherwise` branch completes with an empty message when the condition is false.
pub struct IfElse<C> {
    condition: C,
    then: Child,
    otherwise: Option<Child>,
}

impl<C: Condition> IfElse<C> {
    pub fn new(condition: C, then: impl Into<Child>, otherwise: Option<Child>) -> Self {
        Self {
            condition,
            then: then.into(),
            otherwise,
        }
    }

    async fn run(mut self, ctx: Context) {
        let holds = tokio::select! {
            biased;
            _ = ctx.cancelled() => None,
            holds = self.condition.check() => Some(holds),
        };
        let Some(holds) = holds else {
            self.then.discard();
            if let Some(otherwise) = self.otherwise {
                otherwise.discard();
            }
            abort(&ctx, []);
            return;
        };

        let (chosen, dropped) = if holds {
            (Some(self.then), self.otherwise)
        } else {
            (self.otherwise, Some(self.then))
        };
        if let Some(dropped) = dropped {
            dropped.discard();
        }
        let Some(chosen) = chosen else {
            ctx.ok("");
            return;
        };
        let task = match chosen.build() {
            Ok(task) => task,
            Err(e) => {
                ctx.fail_with(e);
                return;
            }
        };
        match drive(&ctx, &task).await {
            Step::Done(result) => ctx.finish(result),
            Step::Aborted => abort(&ctx, []),
        }
    }
}

impl<C: Condition> Executor for IfElse<C> {
    fn execute(self: Box<Self>, ctx: Context) -> BoxTaskFuture {
        Box::pin((*self).run(ctx))
    }
}

/// An `"ifelse"` task running `then` when `condition` holds, `otherwise` if not.
pub fn ifelse<C: Condition>(condition: C, then: impl Into<Child>, otherwise: impl Into<Child>) -> Task {
    Task::from_executor("ifelse", IfElse::new(condition, then, Some(otherwise.into())))
}

/// An `"ifthen"` task running `then` only when `condition` holds.
pub fn ifthen<C: Condition>(condition: C, then: impl Into<Child>) -> Task {
    Task::from_executor("ifthen", IfElse::new(condition, then, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::tasks::Status;

    fn answer(msg: &'static str) -> Task {
        Task::new(msg, move |ctx: Context| async move { ctx.ok(msg) })
    }

    #[tokio::test]
    async fn picks_branch_by_condition() {
        let yes = ifelse(|| async { true }, answer("left"), answer("right"));
        assert_eq!(yes.run().await, Ok("left".to_string()));

        let right = answer("right");
        let no = ifelse(|| async { false }, || answer("left"), right.clone());
        assert_eq!(no.run().await, Ok("right".to_string()));
        assert_eq!(right.status(), Status::Completed);
    }

    #[tokio::test]
    async fn ifthen_false_completes_empty() {
        let skipped = answer("skipped");
        let t = ifthen(|| async { false }, skipped.clone());
        assert_eq!(t.run().await, Ok(String::new()));
        assert!(skipped.is_cancelled());
    }

    #[tokio::test]
    async fn branch_failure_propagates() {
        let t = ifthen(|| async { true }, || -> Result<Task, TaskError> {
            Err(TaskError::failed("no branch"))
        });
        assert_eq!(t.run().await, Err(TaskError::failed("no branch")));
    }
}
