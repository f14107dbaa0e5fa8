//! Tracing subscriber setup

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogConfig, LogFormat};

/// Build the filter from `RUST_LOG` when present, otherwise from the configured level.
fn build_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber.
///
/// Pretty output goes to stderr so JSON results on stdout stay clean. JSON output
/// is appended to `log_file` through a non-blocking writer; keep the returned guard
/// alive until exit or buffered lines are lost.
pub fn init_logging(config: &LogConfig, log_file: &Path) -> Option<WorkerGuard> {
    let filter = build_filter(config);

    match config.format {
        LogFormat::Pretty => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init();
            None
        }
        LogFormat::Json => {
            let directory = log_file.parent().unwrap_or_else(|| Path::new("."));
            let file_name = log_file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "nuget-sandbox.log".to_string());

            if let Err(e) = std::fs::create_dir_all(directory) {
                eprintln!("Failed to create log directory {:?}: {}", directory, e);
                return None;
            }

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(writer))
                .try_init();
            Some(guard)
        }
    }
}
