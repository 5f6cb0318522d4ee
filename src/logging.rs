use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Keeps the background file writer alive for the life of the process.
static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Level filter for the given mode. Only debug mode lets `RUST_LOG`
/// override the level, so a stray variable cannot make release output noisy.
pub fn filter(debug: bool) -> EnvFilter {
    let level = if debug { "debug" } else { "info" };
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    }
}

/// Initialise logging to stderr and, optionally, to `log_file`.
///
/// Calling this more than once is harmless; only the first subscriber is
/// installed.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let mut file_error = None;
    let mut guard = None;
    let file_layer = match log_file.as_deref().map(file_appender) {
        Some(Ok(appender)) => {
            let (writer, worker) = tracing_appender::non_blocking(appender);
            guard = Some(worker);
            Some(fmt::layer().with_ansi(false).with_writer(writer))
        }
        Some(Err(err)) => {
            file_error = Some(err);
            None
        }
        None => None,
    };

    let installed = tracing_subscriber::registry()
        .with(filter(debug))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .is_ok();

    if let Some(err) = file_error {
        tracing::warn!("log file disabled: {err:#}");
    }
    if installed {
        if let Some(guard) = guard {
            let _ = FILE_GUARD.set(guard);
        }
        let debug_mode = debug;
        tracing::debug!(debug_mode, "logging initialised");
    }
}

fn file_appender(path: &Path) -> anyhow::Result<RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("log path {} has no file name", path.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .map_err(|err| anyhow::anyhow!("open log file {}: {err}", path.display()))
}
