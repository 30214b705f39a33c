use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use tracing::subscriber::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

const TIMESTAMP_FORMAT: &str = "[%Y-%m-%d %H:%M:%S]";

/// Keeps the run's subscriber installed and the file writer flushing.
///
/// Dropping it restores the previous default subscriber.
pub struct LogSession {
    _default: DefaultGuard,
    _file: Option<WorkerGuard>,
}

/// Build the sink for one run: stderr, plus an appended log file when given.
///
/// The subscriber is installed as the thread's default for the life of the
/// returned session. A log file that cannot be opened is reported on stderr
/// and skipped.
pub fn start_session(log_file: Option<&Path>) -> LogSession {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let timer = ChronoLocal::new(TIMESTAMP_FORMAT.to_string());

    let (file_writer, file_error) = match log_file.map(open_log_file) {
        Some(Ok(file)) => (Some(tracing_appender::non_blocking(file)), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };
    let (file_layer, file_guard) = match file_writer {
        Some((writer, guard)) => (
            Some(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(false)
                    .with_timer(timer.clone()),
            ),
            Some(guard),
        ),
        None => (None, None),
    };

    let subscriber = Registry::default()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_timer(timer),
        )
        .with(file_layer);
    let default = tracing::subscriber::set_default(subscriber);

    if let (Some(path), Some(e)) = (log_file, file_error) {
        tracing::warn!("log file {} unavailable: {e}", path.display());
    }

    LogSession {
        _default: default,
        _file: file_guard,
    }
}

fn open_log_file(path: &Path) -> io::Result<fs::File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
