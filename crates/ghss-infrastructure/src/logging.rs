//! Structured logging with `tracing`: JSON or human text formatting, an
//! `EnvFilter` seeded from the configured level and overridable through
//! `GHSS_LOG`, and an optional daily-rotating file appender.

use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use ghss_domain::error::{Error, Result};

pub use crate::config::LoggingConfig;

/// Initialize the global `tracing` subscriber from `config`. Must be
/// called at most once per process, before any other log-emitting code
/// runs.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter = EnvFilter::try_from_env("GHSS_LOG").unwrap_or_else(|_| EnvFilter::new(&config.level));
    let file_appender = create_file_appender(config.file_output.as_deref());

    if config.json_format {
        init_json_logging(filter, file_appender);
    } else {
        init_text_logging(filter, file_appender);
    }

    info!(level = %level, "logging initialized");
    Ok(())
}

fn create_file_appender(
    file_output: Option<&std::path::Path>,
) -> Option<tracing_appender::rolling::RollingFileAppender> {
    file_output.map(|path| {
        tracing_appender::rolling::daily(
            path.parent().unwrap_or_else(|| std::path::Path::new(".")),
            path.file_stem().unwrap_or_else(|| std::ffi::OsStr::new("ghss")),
        )
    })
}

fn init_json_logging(
    filter: EnvFilter,
    file_appender: Option<tracing_appender::rolling::RollingFileAppender>,
) {
    let stdout = fmt::layer().json().with_target(true).with_line_number(true);
    let registry = Registry::default().with(filter);
    if let Some(appender) = file_appender {
        let file = fmt::layer().json().with_writer(appender).with_ansi(false);
        registry.with(stdout).with(file).init();
    } else {
        registry.with(stdout).init();
    }
}

fn init_text_logging(
    filter: EnvFilter,
    file_appender: Option<tracing_appender::rolling::RollingFileAppender>,
) {
    let stdout = fmt::layer().with_target(true).with_line_number(true);
    let registry = Registry::default().with(filter);
    if let Some(appender) = file_appender {
        let file = fmt::layer().with_writer(appender).with_ansi(false);
        registry.with(stdout).with(file).init();
    } else {
        registry.with(stdout).init();
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::config(format!(
            "invalid log level '{level}' - use trace, debug, info, warn, or error"
        ))),
    }
}
