//! Structured Logger
//!
//! Wraps `tracing` with a console layer (text or JSON), an optional rolling
//! file layer (NDJSON), and environment-based level control.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE_PREFIX: &str = "moodline.log";

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Writes `moodline.log.YYYY-MM-DD` files here when set.
    pub dir: Option<PathBuf>,
    /// JSON lines on the console instead of human-readable text.
    pub json_console: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self { level: "info".into(), dir: None, json_console: false }
    }
}

impl LogOptions {
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Initialize the global structured logger. Later calls are no-ops.
pub fn init_logger(options: &LogOptions) {
    let file_appender = options.dir.as_ref().and_then(|dir| {
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .build(dir)
            .map_err(|e| eprintln!("file logging disabled, cannot write to {}: {e}", dir.display()))
            .ok()
    });
    let file_layer = file_appender.map(|appender| fmt::layer().json().with_writer(appender).with_ansi(false));

    let (json_console, text_console) = if options.json_console {
        (Some(fmt::layer().json().with_writer(std::io::stdout)), None)
    } else {
        let layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .with_ansi(true);
        (None, Some(layer))
    };

    let _ = tracing_subscriber::registry()
        .with(options.filter())
        .with(json_console)
        .with(text_console)
        .with(file_layer)
        .try_init();
}
