//! Structured Logger
//!
//! Wraps `tracing` to provide JSON-formatted file output with daily rotation
//! and environment-based level control (`RUST_LOG` wins over the configured level).

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the global logger with a console layer and a rolling file layer.
///
/// Files land in `log_dir` as `specscan.log.YYYY-MM-DD`.
pub fn init_logger<P: AsRef<Path>>(log_dir: P, level: &str) {
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "specscan.log");

    let file_layer = fmt::layer()
        .json()
        .with_writer(file_appender)
        .with_ansi(false);

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_ansi(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

/// Initialize a JSON console-only logger (containers, CI).
pub fn init_console_logger(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt::layer().json().with_writer(std::io::stdout))
        .try_init();
}
