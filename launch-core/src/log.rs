//! Logging seam for the history store.
//!
//! The store reports through an injected [`HistoryLog`] so it can run inside a
//! host that owns the logging sink, or under test without any subscriber.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::Level;

pub trait HistoryLog {
    fn log(&self, level: Level, message: &str);
}

/// Forwards to `tracing` under the `launch_history` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLog;

impl HistoryLog for TracingLog {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(target: "launch_history", "{message}"),
            Level::WARN => tracing::warn!(target: "launch_history", "{message}"),
            Level::INFO => tracing::info!(target: "launch_history", "{message}"),
            Level::DEBUG => tracing::debug!(target: "launch_history", "{message}"),
            _ => tracing::trace!(target: "launch_history", "{message}"),
        }
    }
}

/// Keeps every line in memory. Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct MemoryLog {
    lines: Rc<RefCell<Vec<(Level, String)>>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.borrow().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines
            .borrow()
            .iter()
            .any(|(_, line)| line.contains(needle))
    }
}

impl HistoryLog for MemoryLog {
    fn log(&self, level: Level, message: &str) {
        self.lines.borrow_mut().push((level, message.to_string()));
    }
}
