//! Diagnostics for flog itself.
//!
//! flog's internals emit `tracing` events (node creation, sink failures,
//! forwarding cycles). These helpers install a subscriber for them. They are
//! independent of the log trees an application builds.

use flog_types::{FlogError, LogFormat, Result, TracingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Variable holding a filter directive for flog's diagnostics.
pub const ENV_TRACE: &str = "FLOG_TRACE";

/// Keeps a background file writer alive; drop it last.
#[derive(Debug, Default)]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Initialize the logging system with default configuration.
pub fn init_default() -> Result<LogGuard> {
    init_from_config(&TracingConfig::default())
}

/// Initialize logging from configuration.
///
/// `FLOG_TRACE`, then `RUST_LOG`, take precedence over the configured
/// filter. Fails if a global subscriber is already installed.
pub fn init_from_config(config: &TracingConfig) -> Result<LogGuard> {
    let directive = filter_directive(config, |key| std::env::var(key).ok());
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| FlogError::Config(format!("Invalid trace filter '{}': {}", directive, e)))?;

    let (writer, worker, ansi) = match &config.file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let file_name = path.file_name().ok_or_else(|| {
                FlogError::Config(format!("Trace file {} has no file name", path.display()))
            })?;
            let appender = tracing_appender::rolling::never(
                dir.unwrap_or_else(|| std::path::Path::new(".")),
                file_name,
            );
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), None, true),
    };

    let layer = match config.format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_ansi(ansi)
            .with_target(false)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| FlogError::Config(format!("Failed to initialize tracing: {}", e)))?;

    Ok(LogGuard { _worker: worker })
}

/// The filter directive in effect: `FLOG_TRACE`, `RUST_LOG`, then the
/// configured one.
pub fn filter_directive<F>(config: &TracingConfig, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    [ENV_TRACE, "RUST_LOG"]
        .into_iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.filter.clone())
}
