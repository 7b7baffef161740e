//! # Example: pipeline
//!
//! Builds a small release pipeline out of combinators and prints every event
//! with the built-in [`LogWriter`].
//!
//! ## Flow
//! ```text
//! series
//!   ├─► prepare                      (leaf ok)
//!   ├─► parallel
//!   │     ├─► retry(3, fetch)        fails once, then succeeds (backoff 50ms → 100ms)
//!   │     └─► timeout(1s, compile)   finishes in 200ms
//!   ├─► trycatch(lint, fallback)     lint fails, fallback recovers
//!   └─► repeat(3, publish #i)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=taskweave=debug cargo run --example pipeline
//! ```

use std::time::Duration;

use taskweave::{
    BackoffPolicy, Config, Context, JitterPolicy, LogWriter, Task, leaf, parallel, repeat,
    series, timeout, trycatch_with,
};
use taskweave::combinators::Retry;
use tracing_subscriber::EnvFilter;

fn fetch(attempt: u32) -> Task {
    Task::new("fetch", move |ctx: Context| async move {
        ctx.log(format_args!("attempt #{attempt}"));
        tokio::time::sleep(Duration::from_millis(30)).await;
        if attempt < 2 {
            ctx.fail("connection reset");
        } else {
            ctx.ok("3 artifacts");
        }
    })
}

fn compile() -> Task {
    Task::new("compile", |ctx: Context| async move {
        for unit in ["core", "cli", "docs"] {
            tokio::select! {
                _ = ctx.cancelled() => {
                    ctx.fail_with(ctx.abort_error());
                    return;
                }
                _ = tokio::time::sleep(Duration::from_millis(70)) => ctx.log(format_args!("compiled {unit}")),
            }
        }
        ctx.ok("3 units");
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cfg = Config::default();
    let backoff = BackoffPolicy::exponential(Duration::from_millis(50), 2.0, Duration::from_secs(1))
        .with_jitter(JitterPolicy::Equal);

    let pipeline = series(vec![
        leaf::ok("workspace ready"),
        parallel(vec![
            Retry::new(3, fetch).with_backoff(backoff).into_task(),
            timeout(Duration::from_secs(1), compile),
        ]),
        trycatch_with(leaf::fail("3 warnings treated as errors"), || leaf::ok("lint skipped")),
        repeat(3, |i| leaf::ok(format!("published shard #{i}"))),
    ]);

    let result = pipeline.run_with(LogWriter::with_config(&cfg)).await;
    match result {
        Ok(_) => println!("pipeline completed"),
        Err(e) => println!("pipeline failed: {}", e.as_message()),
    }
    Ok(())
}
