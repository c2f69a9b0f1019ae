//! Structured logging infrastructure for gembot

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "gembot_gate=trace")
    pub level: String,
    /// Whether to emit JSON lines on the console
    pub json_format: bool,
    /// Whether to enable pretty multi-line formatting on the console
    pub pretty_format: bool,
    /// Optional file that receives a copy of every event
    pub file_path: Option<String>,
    /// Whether to include target module information
    pub include_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            pretty_format: false,
            file_path: Some("bot.log".to_string()),
            include_targets: true,
        }
    }
}

/// Initialize the tracing subscriber with the given configuration.
///
/// Events go to stdout and, when `file_path` is set, to that file as well.
/// The returned guard must be held for as long as file logging should keep
/// flushing.
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let env_filter =
        EnvFilter::try_new(&config.level).or_else(|_| EnvFilter::try_new("info"))?;

    let (file_layer, guard) = match &config.file_path {
        Some(file_path) => {
            let path = Path::new(file_path);
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or("log file path has no file name")?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(config.include_targets);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if config.json_format {
        registry
            .with(fmt::layer().json().with_target(config.include_targets))
            .try_init()?;
    } else if config.pretty_format {
        registry
            .with(fmt::layer().pretty().with_target(config.include_targets))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(config.include_targets))
            .try_init()?;
    }

    Ok(guard)
}
