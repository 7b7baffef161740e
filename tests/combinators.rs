mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{Recorder, Spy};
use taskweave::{
    Context, EventKind, Status, Task, TaskError, delay_then, dowhile, each, format_message,
    ifelse, ifthen, leaf, parallel, repeat, retry, series, timeout, trycatch_with,
};
use tokio::time::Instant;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test]
async fn executor_runs_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let task = Task::new("once", move |ctx: Context| {
        c.fetch_add(1, Ordering::SeqCst);
        async move { ctx.ok("done") }
    });

    let first = task.run();
    let second = task.run();
    assert_eq!(first.await, Ok("done".into()));
    assert!(matches!(second.await, Err(TaskError::AlreadyStarted { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn one_terminal_event_per_run() {
    let rec = Recorder::new();
    let task = Task::new("racy", |ctx: Context| async move {
        ctx.fail("first");
        ctx.ok("second");
        ctx.log("after");
    });
    task.subscribe(rec.clone()).unwrap();

    assert_eq!(task.run().await, Err(TaskError::failed("first")));
    let kinds: Vec<_> = rec.kinds().into_iter().map(|(k, _)| k).collect();
    assert_eq!(kinds, vec![EventKind::Started, EventKind::Failed]);
    assert_eq!(task.status(), Status::Failed);
}

#[tokio::test]
async fn cancelled_before_start_never_executes() {
    let spy = Spy::new();
    let task = spy.ok("never", "");
    task.cancel();

    assert_eq!(task.run().await, Err(TaskError::aborted("aborted")));
    assert_eq!(spy.runs(), 0);
    assert_eq!(task.status(), Status::Pending);
}

#[tokio::test]
async fn series_stops_at_first_failure() {
    let spy = Spy::new();
    let after = Spy::new();
    let rec = Recorder::new();
    let task = series([
        spy.ok("a", "1"),
        spy.fail("b", "broken"),
        after.ok("c", "3"),
    ]);
    task.subscribe(rec.clone()).unwrap();

    assert_eq!(task.run().await, Err(TaskError::failed("broken")));
    assert_eq!(spy.runs(), 2);
    assert_eq!(after.runs(), 0);
    assert_eq!(rec.count(EventKind::Started, "c"), 0);
    assert_eq!(rec.count(EventKind::Failed, "series"), 1);
}

#[tokio::test]
async fn series_forwards_child_events_in_order() {
    let rec = Recorder::new();
    let task = series([leaf::ok("a"), leaf::ok("b")]);
    task.subscribe(rec.clone()).unwrap();

    assert_eq!(task.run().await, Ok(String::new()));
    let data: Vec<_> = rec
        .events()
        .into_iter()
        .filter(|e| e.kind == EventKind::Completed)
        .map(|e| e.data.as_deref().unwrap_or_default().to_string())
        .collect();
    assert_eq!(data, vec!["a", "b", ""]);
    assert_eq!(rec.kinds()[0], (EventKind::Started, "series".to_string()));
}

#[tokio::test(start_paused = true)]
async fn parallel_runs_children_concurrently() {
    let spy = Spy::new();
    let started = Instant::now();
    let task = parallel([
        spy.sleeper("a", 30),
        spy.sleeper("b", 10),
        spy.sleeper("c", 20),
    ]);

    assert_eq!(task.run().await, Ok(String::new()));
    assert_eq!(spy.runs(), 3);
    assert!(started.elapsed() < ms(60));
}

#[tokio::test(start_paused = true)]
async fn parallel_fails_fast_and_cancels_siblings() {
    let spy = Spy::new();
    let started = Instant::now();
    let slow = spy.sleeper("slow", 1000);
    let task = parallel(vec![leaf::ok(""), leaf::fail("e"), slow.clone()]);

    assert_eq!(task.run().await, Err(TaskError::failed("e")));
    assert!(started.elapsed() < ms(1000));
    assert_eq!(spy.aborts(), 1);
    assert_eq!(slow.status(), Status::Failed);
}

#[tokio::test]
async fn retry_calls_factory_per_attempt() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let task = retry(3, move |_| {
        c.fetch_add(1, Ordering::SeqCst);
        leaf::fail("boom")
    });

    assert_eq!(task.run().await, Err(TaskError::failed("boom")));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_stops_at_first_success() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let task = retry(5, move |attempt| {
        c.fetch_add(1, Ordering::SeqCst);
        if attempt < 2 {
            leaf::fail("flaky")
        } else {
            leaf::ok("stable")
        }
    });

    assert_eq!(task.run().await, Ok("stable".into()));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn repeat_passes_one_based_indices() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let task = repeat(5, move |i| {
        sink.lock().unwrap().push(i);
        leaf::noop()
    });

    assert_eq!(task.run().await, Ok(String::new()));
    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);
}

#[tokio::test(start_paused = true)]
async fn timeout_fails_slow_child() {
    let task = timeout(ms(50), delay_then(ms(1000), leaf::ok("late")));
    let started = Instant::now();

    assert_eq!(
        task.run().await,
        Err(TaskError::Timeout { timeout: ms(50) })
    );
    assert!(started.elapsed() < ms(1000));
}

#[tokio::test(start_paused = true)]
async fn timeout_cancels_the_child_with_its_reason() {
    let spy = Spy::new();
    let child = spy.sleeper("slow", 1000);
    let task = timeout(ms(50), child.clone());
    let outcome = task.run();

    assert!(matches!(outcome.await, Err(TaskError::Timeout { .. })));
    assert_eq!(spy.aborts(), 1);
    assert_eq!(child.status(), Status::Failed);
}

#[tokio::test]
async fn timeout_reflects_fast_child() {
    let task = timeout(ms(1000), leaf::ok("fast"));
    assert_eq!(task.run().await, Ok("fast".into()));
}

#[tokio::test(start_paused = true)]
async fn cancel_reaches_each_active_child_once() {
    let spy = Spy::new();
    let later = Spy::new();
    let inner = parallel([spy.waiter("a"), spy.waiter("b")]);
    let root = series([inner.clone(), later.ok("c", "")]);

    let outcome = root.run();
    tokio::time::sleep(ms(10)).await;
    root.cancel();
    root.cancel();

    assert_eq!(outcome.await, Err(TaskError::aborted("aborted")));
    assert_eq!(spy.runs(), 2);
    assert_eq!(spy.aborts(), 2);
    assert_eq!(later.runs(), 0);
    assert_eq!(inner.status(), Status::Failed);
}

#[tokio::test(start_paused = true)]
async fn children_settle_before_their_parents() {
    let spy = Spy::new();
    let rec = Recorder::new();
    let root = series([parallel([spy.waiter("a"), spy.waiter("b")])]);
    root.subscribe(rec.clone()).unwrap();

    let outcome = root.run();
    tokio::time::sleep(ms(10)).await;
    root.cancel();
    assert_eq!(outcome.await, Err(TaskError::aborted("aborted")));

    for task in ["a", "b", "parallel", "series"] {
        assert_eq!(rec.terminals(task), 1, "{task}");
    }
    let failed = |task: &str| rec.position(EventKind::Failed, task).unwrap();
    assert!(failed("a") < failed("parallel"));
    assert!(failed("b") < failed("parallel"));
    assert!(failed("parallel") < failed("series"));
    assert_eq!(rec.kinds().last(), Some(&(EventKind::Failed, "series".to_string())));
}

#[tokio::test(start_paused = true)]
async fn parallel_failure_waits_for_cancelled_siblings() {
    let spy = Spy::new();
    let rec = Recorder::new();
    let task = parallel([spy.waiter("slow"), leaf::fail("e")]);
    task.subscribe(rec.clone()).unwrap();

    assert_eq!(task.run().await, Err(TaskError::failed("e")));
    assert_eq!(spy.aborts(), 1);
    let slow = rec.position(EventKind::Failed, "slow").unwrap();
    assert!(slow < rec.position(EventKind::Failed, "parallel").unwrap());
}

#[tokio::test(start_paused = true)]
async fn timeout_waits_for_the_cancelled_child() {
    let spy = Spy::new();
    let rec = Recorder::new();
    let task = timeout(ms(50), spy.waiter("slow"));
    task.subscribe(rec.clone()).unwrap();

    assert_eq!(task.run().await, Err(TaskError::Timeout { timeout: ms(50) }));
    assert_eq!(spy.aborts(), 1);
    let slow = rec.position(EventKind::Failed, "slow").unwrap();
    assert!(slow < rec.position(EventKind::Failed, "timeout").unwrap());
}

#[tokio::test(start_paused = true)]
async fn cancel_reason_reaches_nested_children() {
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    let leafy = Task::new("leafy", move |ctx: Context| async move {
        ctx.cancelled().await;
        let err = ctx.abort_error();
        *sink.lock().unwrap() = Some(err.reason());
        ctx.fail_with(err);
    });
    let root = series([parallel([leafy])]);

    let outcome = root.run();
    tokio::time::sleep(ms(5)).await;
    root.cancel_with("shutdown");

    assert_eq!(outcome.await, Err(TaskError::aborted("shutdown")));
    assert_eq!(seen.lock().unwrap().as_deref(), Some("shutdown"));
}

#[tokio::test]
async fn each_over_nothing_completes() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let task = each(Vec::<u8>::new(), move |_| {
        c.fetch_add(1, Ordering::SeqCst);
        leaf::noop()
    });

    assert_eq!(task.run().await, Ok(String::new()));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// Cancels `task` while its `"leaf"` child runs and checks the abort protocol.
async fn cancel_mid_child(task: Task, parent: &str, spy: &Spy) {
    let rec = Recorder::new();
    task.subscribe(rec.clone()).unwrap();

    let outcome = task.run();
    tokio::time::sleep(ms(10)).await;
    assert_eq!(spy.runs(), 1, "{parent}: child should be running");
    task.cancel();

    assert_eq!(outcome.await, Err(TaskError::aborted("aborted")), "{parent}");
    assert_eq!(spy.runs(), 1, "{parent}: no child started after abort");
    assert_eq!(spy.aborts(), 1, "{parent}");
    assert_eq!(rec.terminals("leaf"), 1, "{parent}");
    let child = rec.position(EventKind::Failed, "leaf").unwrap();
    let own = rec.position(EventKind::Failed, parent).unwrap();
    assert!(child < own, "{parent}: {:?}", rec.kinds());
}

#[tokio::test(start_paused = true)]
async fn each_cancel_mid_child() {
    let spy = Spy::new();
    let s = spy.clone();
    cancel_mid_child(each([1u8, 2, 3], move |_| s.waiter("leaf")), "each", &spy).await;
}

#[tokio::test(start_paused = true)]
async fn repeat_cancel_mid_child() {
    let spy = Spy::new();
    let s = spy.clone();
    cancel_mid_child(repeat(3, move |_| s.waiter("leaf")), "repeat", &spy).await;
}

#[tokio::test(start_paused = true)]
async fn retry_cancel_mid_child() {
    let spy = Spy::new();
    let s = spy.clone();
    cancel_mid_child(retry(3, move |_| s.waiter("leaf")), "retry", &spy).await;
}

#[tokio::test(start_paused = true)]
async fn dowhile_cancel_mid_child() {
    let spy = Spy::new();
    let s = spy.clone();
    cancel_mid_child(dowhile(|| async { true }, move || s.waiter("leaf")), "dowhile", &spy).await;
}

#[tokio::test(start_paused = true)]
async fn ifelse_cancel_mid_child() {
    let spy = Spy::new();
    let task = ifelse(|| async { true }, spy.waiter("leaf"), leaf::noop());
    cancel_mid_child(task, "ifelse", &spy).await;
}

#[tokio::test(start_paused = true)]
async fn ifthen_cancel_mid_child() {
    let spy = Spy::new();
    let task = ifthen(|| async { true }, spy.waiter("leaf"));
    cancel_mid_child(task, "ifthen", &spy).await;
}

#[tokio::test(start_paused = true)]
async fn trycatch_cancel_mid_child() {
    let spy = Spy::new();
    let recover = leaf::ok("recovered");
    let task = trycatch_with(spy.waiter("leaf"), recover.clone());
    cancel_mid_child(task, "trycatch", &spy).await;
    assert_eq!(recover.status(), Status::Pending);
}

#[tokio::test(start_paused = true)]
async fn delay_then_cancel_mid_child() {
    let spy = Spy::new();
    let task = delay_then(ms(1), spy.waiter("leaf"));
    cancel_mid_child(task, "delay", &spy).await;
}

#[tokio::test(start_paused = true)]
async fn series_cancel_mid_child() {
    let spy = Spy::new();
    cancel_mid_child(series([spy.waiter("leaf")]), "series", &spy).await;
}

#[tokio::test(start_paused = true)]
async fn timeout_cancel_mid_child() {
    let spy = Spy::new();
    cancel_mid_child(timeout(ms(1000), spy.waiter("leaf")), "timeout", &spy).await;
}

#[test]
fn messages_join_present_parts() {
    assert_eq!(format_message([Some("built"), None, Some("3"), Some("")]), "built 3");
    assert_eq!(format_message([None::<u8>]), "");
}
