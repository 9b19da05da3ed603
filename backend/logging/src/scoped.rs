//! Scoped loggers
//!
//! A [`Logger`] is a cheap handle over a shared [`LogSink`] plus an identity
//! path. [`scope`] derives a child handle whose records are tagged with that
//! path; the underlying sink is shared, never replaced.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::Level;

use crate::redact::redact_sensitive_data;

/// Destination for formatted log records.
pub trait LogSink: Send + Sync {
    fn emit(&self, level: Level, message: &str);
}

/// Forwards records into the global `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, level: Level, message: &str) {
        let message = redact_sensitive_data(message);
        match level {
            Level::ERROR => tracing::error!(target: "relayer", "{message}"),
            Level::WARN => tracing::warn!(target: "relayer", "{message}"),
            Level::INFO => tracing::info!(target: "relayer", "{message}"),
            Level::DEBUG => tracing::debug!(target: "relayer", "{message}"),
            _ => tracing::trace!(target: "relayer", "{message}"),
        }
    }
}

/// A record captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
}

/// Keeps every record in memory. Used by tests and diagnostics tooling.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, oldest first.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, level: Level, message: &str) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(LogRecord {
                level,
                message: message.to_string(),
            });
    }
}

/// Logger handle carrying an identity path.
///
/// Records emitted through a logger with a non-empty path reach the sink as
/// `"[a|b] message"`. A logger with an empty path forwards records verbatim.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
    labels: Arc<[String]>,
}

impl Logger {
    /// Create an unscoped logger writing to `sink`.
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            labels: Arc::from(Vec::new()),
        }
    }

    /// The process base logger, backed by `tracing`.
    pub fn base() -> Self {
        Self::new(Arc::new(TracingSink))
    }

    /// Identity path, outermost label first.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn log(&self, level: Level, message: impl fmt::Display) {
        if self.labels.is_empty() {
            self.sink.emit(level, &message.to_string());
        } else {
            let record = format!("[{}] {}", self.labels.join("|"), message);
            self.sink.emit(level, &record);
        }
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(Level::ERROR, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.log(Level::WARN, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(Level::INFO, message);
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Level::DEBUG, message);
    }

    pub fn trace(&self, message: impl fmt::Display) {
        self.log(Level::TRACE, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::base()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

/// Derive a logger tagged with `labels`, appended to `base`'s own path.
///
/// Pure: `base` is left untouched and both handles share one sink.
pub fn scope<S: AsRef<str>>(base: &Logger, labels: &[S]) -> Logger {
    if labels.is_empty() {
        return base.clone();
    }
    let path: Vec<String> = base
        .labels
        .iter()
        .cloned()
        .chain(labels.iter().map(|l| l.as_ref().to_string()))
        .collect();
    Logger {
        sink: Arc::clone(&base.sink),
        labels: Arc::from(path),
    }
}
