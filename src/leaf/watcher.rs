//! # File-change sources for `watch`.
//!
//! A [`ChangeSource`] turns a list of paths into a stream of "this path changed"
//! notifications. The stream ends (and the source releases its resources) once
//! the receiving side is dropped.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::error::TaskError;
use crate::sync::lock;

/// Buffered notifications per subscription; overflow is dropped (watch debounces anyway).
const CHANNEL_CAPACITY: usize = 64;

/// Producer of file-change notifications.
pub trait ChangeSource: Send + Sync + 'static {
    /// Starts observing `paths`.
    ///
    /// # Errors
    /// When the source cannot be installed; `watch` then fails immediately.
    fn subscribe(&self, paths: &[PathBuf]) -> Result<mpsc::Receiver<PathBuf>, TaskError>;
}

/// Detects changes by polling modification times.
///
/// Directories are scanned recursively without following symlinks. Additions,
/// removals and mtime changes are all reported. Requires a tokio runtime.
#[derive(Clone, Debug)]
pub struct PollWatcher {
    interval: Duration,
}

impl PollWatcher {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
        }
    }
}

impl Default for PollWatcher {
    /// Polls every 250ms.
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

impl ChangeSource for PollWatcher {
    fn subscribe(&self, paths: &[PathBuf]) -> Result<mpsc::Receiver<PathBuf>, TaskError> {
        if paths.is_empty() {
            return Err(TaskError::failed("watch: no paths given"));
        }
        let paths: Arc<[PathBuf]> = paths.into();
        let mut snapshot = scan(&paths);
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let every = self.interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    _ = ticker.tick() => {}
                }
                let scan_paths = Arc::clone(&paths);
                let Ok(next) = tokio::task::spawn_blocking(move || scan(&scan_paths)).await else {
                    break;
                };
                for changed in diff(&snapshot, &next) {
                    if tx.try_send(changed).is_err() && tx.is_closed() {
                        return;
                    }
                }
                snapshot = next;
            }
            tracing::debug!("poll watcher stopped");
        });
        Ok(rx)
    }
}

type Snapshot = HashMap<PathBuf, SystemTime>;

fn scan(roots: &[PathBuf]) -> Snapshot {
    let mut out = HashMap::new();
    for root in roots {
        visit(root, true, &mut out);
    }
    out
}

/// Below the roots, symlinks are recorded as entries of their own and never followed.
fn visit(path: &Path, follow: bool, out: &mut Snapshot) {
    let meta = if follow {
        fs::metadata(path)
    } else {
        fs::symlink_metadata(path)
    };
    let Ok(meta) = meta else {
        return;
    };
    if meta.is_dir() {
        let Ok(entries) = fs::read_dir(path) else {
            return;
        };
        for entry in entries.flatten() {
            visit(&entry.path(), false, out);
        }
    } else {
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        out.insert(path.to_path_buf(), modified);
    }
}

fn diff(before: &Snapshot, after: &Snapshot) -> Vec<PathBuf> {
    let mut changed: Vec<PathBuf> = after
        .iter()
        .filter(|(path, mtime)| before.get(*path) != Some(*mtime))
        .map(|(path, _)| path.clone())
        .collect();
    changed.extend(before.keys().filter(|p| !after.contains_key(*p)).cloned());
    changed.sort();
    changed
}

/// In-process source: changes are whatever is sent on the paired sender.
///
/// Serves a single subscription.
pub struct ChannelSource {
    rx: Mutex<Option<mpsc::Receiver<PathBuf>>>,
}

impl ChannelSource {
    /// Creates the source and the sender used to report changes.
    pub fn new() -> (mpsc::Sender<PathBuf>, Self) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        (
            tx,
            Self {
                rx: Mutex::new(Some(rx)),
            },
        )
    }
}

impl ChangeSource for ChannelSource {
    fn subscribe(&self, _paths: &[PathBuf]) -> Result<mpsc::Receiver<PathBuf>, TaskError> {
        lock(&self.rx)
            .take()
            .ok_or_else(|| TaskError::failed("channel source already subscribed"))
    }
}
