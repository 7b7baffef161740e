mod common;

use std::sync::Arc;

use common::{Recorder, Spy};
use taskweave::{
    Config, EventKind, RuntimeError, Runner, Status, Subscribe, TaskError, leaf, series,
};

fn runner() -> Runner {
    Runner::new(Config::default())
        .with_task("hello", leaf::ok("hi"))
        .with_task("broken", leaf::fail("nope"))
}

#[tokio::test]
async fn lists_names_sorted() {
    let names: Vec<_> = runner().names().map(str::to_owned).collect();
    assert_eq!(names, vec!["broken", "hello"]);
}

#[tokio::test]
async fn without_a_name_nothing_runs() {
    let spy = Spy::new();
    let res = Runner::new(Config::default())
        .with_task("only", spy.ok("only", ""))
        .dispatch(["prog"])
        .await;
    assert_eq!(res.unwrap(), None);
    assert_eq!(spy.runs(), 0);
}

#[tokio::test]
async fn unknown_name_runs_nothing() {
    let spy = Spy::new();
    let task = spy.ok("known", "");
    let res = Runner::new(Config::default())
        .with_task("known", task.clone())
        .dispatch(["prog", "missing"])
        .await;
    assert_eq!(res.unwrap(), None);
    assert_eq!(task.status(), Status::Pending);
}

#[tokio::test]
async fn completed_task_reports_its_message() {
    let res = runner().dispatch(["prog", "hello"]).await;
    assert_eq!(res.unwrap(), Some("hi".to_string()));
}

#[tokio::test]
async fn failed_task_is_an_error() {
    match runner().dispatch(["prog", "broken"]).await {
        Err(RuntimeError::TaskFailed { task, error }) => {
            assert_eq!(task, "broken");
            assert_eq!(error, TaskError::failed("nope"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn subscribers_see_the_whole_tree() {
    let rec = Recorder::new();
    let sub: Arc<dyn Subscribe> = Arc::new(rec.clone());
    let res = Runner::new(Config::default())
        .with_subscribers(vec![sub])
        .with_task("build", series([leaf::ok("compiled"), leaf::ok("tested")]))
        .dispatch(["prog", "build"])
        .await;

    assert_eq!(res.unwrap(), Some(String::new()));
    assert_eq!(rec.count(EventKind::Started, "series"), 1);
    assert_eq!(rec.count(EventKind::Completed, "ok"), 2);
    assert_eq!(rec.count(EventKind::Completed, "series"), 1);
}

#[tokio::test]
async fn bus_receives_events() {
    let runner = runner();
    let mut rx = runner.events();
    runner.dispatch(["prog", "hello"]).await.unwrap();

    let first = rx.recv().await.unwrap();
    assert_eq!(first.kind, EventKind::Started);
    assert_eq!(&*first.task, "ok");
    let last = rx.recv().await.unwrap();
    assert_eq!(last.kind, EventKind::Completed);
    assert_eq!(last.data.as_deref(), Some("hi"));
}
