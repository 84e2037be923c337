//! Per-entry progress reporting for registry builds
//!
//! Every entry ends in exactly one event: `Done` when it made it into the
//! catalog, `Failed` when it was dropped.

use console::style;
use std::sync::Mutex;
use std::time::Duration;

use artalk_community_core::RegistryEntry;

/// Outcome of building one entry
#[derive(Debug, Clone, Copy)]
pub enum BuildEvent<'a> {
    Done {
        entry: &'a RegistryEntry,
        cached: bool,
        elapsed: Duration,
    },
    Failed {
        /// Package, repository or URL that could not be resolved
        subject: &'a str,
        reason: &'a str,
    },
}

/// Receives build events as entries settle
pub trait Reporter: Send + Sync {
    fn report(&self, event: BuildEvent<'_>);
}

/// Colored single-line output, one line per entry
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, event: BuildEvent<'_>) {
        match event {
            BuildEvent::Done {
                entry,
                cached,
                elapsed,
            } => {
                let cached = if cached {
                    format!(" {}", style("[Cached]").blue())
                } else {
                    String::new()
                };
                println!(
                    "{} {} - v{}{} [{:.2}s]",
                    style("[DONE]").green(),
                    style(&entry.npm_name).bold(),
                    entry.version,
                    cached,
                    elapsed.as_secs_f64()
                );
            }
            BuildEvent::Failed { subject, reason } => {
                eprintln!(
                    "{} {} - {}",
                    style("[FAIL]").red(),
                    style(subject).bold(),
                    style(reason).red()
                );
            }
        }
    }
}

/// Reporter that prints nothing
#[derive(Debug, Default)]
pub struct QuietReporter;

impl Reporter for QuietReporter {
    fn report(&self, _event: BuildEvent<'_>) {}
}

/// Reporter that keeps a plain-text line per event
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: BuildEvent<'_>) {
        let line = match event {
            BuildEvent::Done { entry, cached, .. } => format!(
                "DONE {} v{}{}",
                entry.npm_name,
                entry.version,
                if cached { " cached" } else { "" }
            ),
            BuildEvent::Failed { subject, reason } => format!("FAIL {} - {}", subject, reason),
        };
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}
