use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE_PREFIX: &str = "cogtrack.log";

/// Keeps the background log writer alive; drop it last to flush pending lines
pub struct LogGuard {
    _guard: WorkerGuard,
}

fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// The terminal UI owns stdout, so logs go to a daily-rolling file under
/// `log_dir`. When no directory is given or it cannot be created, logs go to
/// stderr instead. `RUST_LOG` takes precedence over `log_level`. Calling this
/// twice is harmless; the second subscriber is ignored.
pub fn init_tracing(log_level: &str, log_dir: Option<&Path>) -> Option<LogGuard> {
    if let Some(dir) = log_dir {
        match std::fs::create_dir_all(dir) {
            Ok(()) => {
                let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
                let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
                let file_layer = fmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false)
                    .with_target(true);

                let _ = tracing_subscriber::registry()
                    .with(env_filter(log_level))
                    .with(file_layer)
                    .try_init();

                return Some(LogGuard { _guard: guard });
            }
            Err(err) => {
                eprintln!("failed to create log directory {}: {err}", dir.display());
            }
        }
    }

    let _ = tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init();

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_log_directory() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let guard = init_tracing("debug", Some(&log_dir));
        assert!(guard.is_some());
        assert!(log_dir.is_dir());
    }
}
