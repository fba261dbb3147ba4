//! Structured logging for specscan.
//!
//! Handles subscriber setup (console + rolling NDJSON file), redaction of
//! secrets echoed back by downstream services, and per-stage pipeline events.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{PipelineEvent, PipelineEventEntry, PipelineEventLogger};
pub use logger::{init_console_logger, init_logger};
pub use redact::redact_sensitive_data;
