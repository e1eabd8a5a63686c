//! Structured logging for Moodline.
//!
//! Handles subscriber setup (console plus optional daily-rolling JSON files)
//! and scrubbing of credentials from strings before they are logged.

pub mod logger;
pub mod redact;

pub use logger::{init_logger, LogOptions};
pub use redact::redact_sensitive_data;
