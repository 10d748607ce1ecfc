//! Logging setup using `tracing-subscriber`, with an optional daily log file.

use anyhow::Context;
use grc_client::constants::LOG_FILE_PREFIX;
use grc_client::domain::config::LogConfig;
use grc_client::helpers::get_or_create_data_dir;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber
///
/// `RUST_LOG` wins over `override_level`, which wins over the configured
/// level. The returned guard flushes the log file and must be kept alive.
pub fn init_logging(config: &LogConfig, override_level: Option<&str>) -> anyhow::Result<Option<WorkerGuard>> {
    let level = override_level.unwrap_or(&config.level);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level `{level}`"))?;

    let (file_layer, guard) = if config.file {
        let dir = get_or_create_data_dir().context("no data directory for the log file")?;
        let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_writer(writer).with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init()
        .context("failed to install the tracing subscriber")?;

    Ok(guard)
}
