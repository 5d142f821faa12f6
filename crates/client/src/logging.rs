//! Log setup: stderr plus a per-bot file under the platform cache directory.
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Platform cache directory for bot logs.
///
/// - macOS: `~/Library/Caches/dbot/logs`
/// - Linux: `~/.cache/dbot/logs` (or `$XDG_CACHE_HOME/dbot/logs`)
/// - Windows: `%LOCALAPPDATA%\dbot\cache\logs`
/// - Fallback: `/tmp/dbot/logs`
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "dbot")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/dbot"))
        .join("logs")
}

/// Logs to stderr and to `<log dir>/<bot>/bot.log`.
///
/// `RUST_LOG` overrides the default `info` level.
pub fn setup_logging(bot: &str) -> Result<PathBuf> {
    let bot_log_dir = log_dir().join(bot);
    std::fs::create_dir_all(&bot_log_dir)
        .with_context(|| format!("Failed to create log directory: {}", bot_log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&bot_log_dir, "bot.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    // Keep the file writer alive for the whole process
    std::mem::forget(guard);

    let log_file = bot_log_dir.join("bot.log");
    tracing::info!("Log file: {}", log_file.display());
    Ok(log_file)
}
