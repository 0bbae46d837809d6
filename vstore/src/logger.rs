//! Injectable logging for the rotation engine.
//!
//! The engine reports best-effort failures (archival, metadata persistence,
//! eviction) through a `Logger` rather than its return values, so tests
//! assert on captured entries while production forwards to `tracing`.

use std::sync::Arc;

use parking_lot::RwLock;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

/// Sink for engine diagnostics.
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, message: &str);

    fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }
}

/// Logger that forwards to the `tracing` macros under the `vstore` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::Error => tracing::error!(target: "vstore", "{}", message),
            Level::Warn => tracing::warn!(target: "vstore", "{}", message),
            Level::Info => tracing::info!(target: "vstore", "{}", message),
            Level::Debug => tracing::debug!(target: "vstore", "{}", message),
        }
    }
}

/// A captured log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
}

/// Logger that captures every entry for later inspection.
/// Cloning shares the captured entries.
#[derive(Debug, Clone, Default)]
pub struct MockLogger {
    entries: Arc<RwLock<Vec<LogEntry>>>,
}

impl MockLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.read().clone()
    }

    /// Messages logged at exactly `level`.
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }

    /// Whether any entry at `level` contains `substring`.
    pub fn contains_at(&self, level: Level, substring: &str) -> bool {
        self.entries
            .read()
            .iter()
            .any(|e| e.level == level && e.message.contains(substring))
    }

    /// Whether any entry contains `substring`.
    pub fn contains(&self, substring: &str) -> bool {
        self.entries
            .read()
            .iter()
            .any(|e| e.message.contains(substring))
    }

    pub fn count(&self) -> usize {
        self.entries.read().len()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl Logger for MockLogger {
    fn log(&self, level: Level, message: &str) {
        self.entries.write().push(LogEntry {
            level,
            message: message.to_string(),
        });
    }
}

/// Logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Level, _message: &str) {}
}
