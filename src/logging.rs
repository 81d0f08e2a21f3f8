//! Tracing for the driver binary.
//!
//! stdout carries the cycle response, so human-readable logs always go to
//! stderr. When [`LogSettings::file_dir`] is set, the same events are also
//! written without ANSI colours to a daily-rolled `adaptive.log.<date>` file.

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogSettings;

pub const LOG_FILE_PREFIX: &str = "adaptive.log";

/// Flushes buffered file output when dropped; hold it for the life of `main`.
#[must_use]
pub struct LogGuard {
    _file_worker: Option<WorkerGuard>,
}

fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|err| {
        eprintln!("invalid log filter {level:?} ({err}), falling back to info");
        EnvFilter::new("info")
    })
}

fn rolling_file_writer(dir: &Path) -> io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}

pub fn init_tracing(settings: &LogSettings) -> LogGuard {
    let (file_writer, file_worker) = match settings.file_dir.as_deref() {
        Some(dir) => match rolling_file_writer(dir) {
            Ok((writer, worker)) => (Some(writer), Some(worker)),
            Err(err) => {
                eprintln!("file logging disabled, cannot use {}: {err}", dir.display());
                (None, None)
            }
        },
        None => (None, None),
    };

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
    });

    let installed = tracing_subscriber::registry()
        .with(level_filter(&settings.level))
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(file_layer)
        .try_init();
    if let Err(err) = installed {
        eprintln!("tracing subscriber already installed: {err}");
    }

    if let (Some(dir), Some(_)) = (settings.file_dir.as_deref(), &file_worker) {
        tracing::debug!(log_dir = %dir.display(), "file logging enabled");
    }

    LogGuard {
        _file_worker: file_worker,
    }
}
