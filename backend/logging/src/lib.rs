//! Logging for the relayer host and its plugins.
//!
//! Handles subscriber setup (console + rolling NDJSON file), log redaction,
//! and the scoped loggers handed to every plugin at construction time.

pub mod logger;
pub mod redact;
pub mod scoped;

pub use logger::init_logger;
pub use redact::redact_sensitive_data;
pub use scoped::{scope, LogRecord, LogSink, Logger, MemorySink, TracingSink};
