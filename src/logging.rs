//! Logging configuration with journald support on Linux.
//!
//! The server logs to systemd's journal when it is reachable and to stderr
//! otherwise. The browse tool keeps the terminal clean and writes a daily
//! rolling file instead.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where log output should go when journald is not used.
pub enum LogTarget {
    Stderr,
    Directory(PathBuf),
}

/// Initialize the logging system.
///
/// Log level can be controlled via the `ATELIER_LOG` environment variable:
/// - `ATELIER_LOG=debug` for verbose output, including composed SQL
/// - `ATELIER_LOG=info` for standard output (default)
/// - `ATELIER_LOG=warn` for warnings and errors only
/// - `ATELIER_LOG=atelier=debug,tower_http=debug` for per-target levels
pub fn init(target: LogTarget) -> Result<()> {
    let env_filter = EnvFilter::try_from_env("ATELIER_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));

    #[cfg(target_os = "linux")]
    {
        if matches!(target, LogTarget::Stderr) && std::env::var_os("JOURNAL_STREAM").is_some() {
            if let Ok(journald_layer) = tracing_journald::layer() {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(journald_layer)
                    .try_init()?;

                tracing::info!("Logging initialized with journald backend");
                return Ok(());
            }
        }
    }

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init()?;
        }
        LogTarget::Directory(log_dir) => {
            std::fs::create_dir_all(&log_dir)?;

            let file_appender = tracing_appender::rolling::daily(&log_dir, "atelier.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // The guard flushes on drop, so it has to outlive every log call.
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .try_init()?;

            tracing::info!("Logging initialized with file backend at {:?}", log_dir);
        }
    }

    Ok(())
}
