//! # LogWriter: fixed-width event printer
//!
//! A minimal listener that prints incoming [`Event`]s to stdout, one line each.
//! Use it for CLIs, tests or demos.
//!
//! ## Example output
//! ```text
//! 14:02:11.104  started    build
//! 14:02:11.105  log        compile                   cargo build --release
//! 14:02:12.870  failed     compile                   exit status 101
//! 14:02:12.870  failed     build                     exit status 101
//! ```

use chrono::{DateTime, Local};

use crate::config::Config;
use crate::events::Event;
use crate::subscribers::Subscribe;

/// Renders `{at, kind, task, data}` as one fixed-width line (no trailing newline).
///
/// Names longer than `name_width` are cut with a trailing `~`; the data column
/// is omitted when the event has no message.
pub fn format_event(event: &Event, name_width: usize) -> String {
    let at: DateTime<Local> = event.at.into();
    let name = fit(&event.task, name_width);
    let kind = event.kind.as_label();
    match event.data.as_deref() {
        Some(data) => format!(
            "{}  {kind:<9}  {name:<name_width$}  {data}",
            at.format("%H:%M:%S%.3f")
        ),
        None => format!("{}  {kind:<9}  {name}", at.format("%H:%M:%S%.3f")),
    }
}

fn fit(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let mut cut: String = name.chars().take(width.saturating_sub(1)).collect();
    cut.push('~');
    cut
}

/// Event writer listener.
#[derive(Debug, Clone)]
pub struct LogWriter {
    name_width: usize,
}

impl Default for LogWriter {
    fn default() -> Self {
        Self::with_config(&Config::default())
    }
}

impl LogWriter {
    /// Construct a new [`LogWriter`] with default column widths.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a [`LogWriter`] using `cfg.name_width`.
    #[must_use]
    pub fn with_config(cfg: &Config) -> Self {
        Self {
            name_width: cfg.name_width.max(1),
        }
    }

    /// Renders an event the way [`Subscribe::on_event`] prints it.
    pub fn render(&self, event: &Event) -> String {
        format_event(event, self.name_width)
    }
}

impl Subscribe for LogWriter {
    fn on_event(&self, event: &Event) {
        println!("{}", self.render(event));
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
