//! Process-wide logging.
//!
//! [`init`] installs a [`tracing`] subscriber with two sinks: the console,
//! filtered to `INFO` and above, and a per-run log file that receives every
//! level through a background writer. Call it once from `main` before
//! anything else logs, and keep the returned [`LogGuard`] alive.
//!
//! Levels map as `trace`, `info`, [`note!`](crate::note), `warn`, `error`.
//! Messages use ordinary Rust format strings, so positional placeholders
//! (`{0}`, `{1}`) work as expected.

use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer,
};

use crate::config::LogConfig;

/// Suffix appended to the file stem, formatted with the start time.
pub const FILE_TIMESTAMP_FORMAT: &str = "_%Y-%m-%d_%H-%M-%S";

/// Timestamp printed at the start of each log line.
pub const LINE_TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Log a message at the "note" level: above `info` in importance, below
/// `warn`.
///
/// [`tracing`] has no such level, so notes are `INFO` events carrying a
/// `note = true` field.
#[macro_export]
macro_rules! note {
    ($($arg:tt)+) => {
        ::tracing::info!(note = true, $($arg)+)
    };
}

/// Why logging could not be set up.
#[derive(Error, Debug)]
pub enum LogError {
    /// The log directory could not be created.
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The log file could not be created or truncated.
    #[error("failed to open log file {path}: {source}")]
    OpenFile {
        /// File that could not be opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// [`init`] already ran, or another subscriber is installed.
    #[error("a global logger is already installed")]
    AlreadyInitialized,
}

/// The log file path for a run started at `started`, e.g.
/// `temp/main_2026-10-19_14-03-07.log`.
#[must_use]
pub fn log_file_path(config: &LogConfig, started: DateTime<Local>) -> PathBuf {
    config.dir.join(format!(
        "{}{}.log",
        config.file_stem,
        started.format(FILE_TIMESTAMP_FORMAT)
    ))
}

/// Create `path` (and its directory), truncating any existing file.
///
/// # Errors
///
/// Returns the I/O error with the path that caused it.
pub fn open_log_file(path: &Path) -> Result<File, LogError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| LogError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    File::create(path).map_err(|source| LogError::OpenFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Keeps the file sink's background writer alive.
///
/// Hold it until the process exits: dropping it flushes every queued line
/// to the file and stops the writer thread. Later events still reach the
/// console but no longer the file.
#[derive(Debug)]
pub struct LogGuard {
    path: PathBuf,
    _worker: WorkerGuard,
}

impl LogGuard {
    /// Path of this run's log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Install the global subscriber and the panic hook.
///
/// Callers never wait on file I/O: file lines are queued to a background
/// writer owned by the returned [`LogGuard`].
///
/// # Errors
///
/// Fails if the log file cannot be created or a global subscriber is
/// already set (including by an earlier call). In the latter case nothing
/// on disk is touched.
pub fn init(config: &LogConfig) -> Result<LogGuard, LogError> {
    if tracing::dispatcher::has_been_set() {
        return Err(LogError::AlreadyInitialized);
    }

    let path = log_file_path(config, Local::now());
    let file = open_log_file(&path)?;
    let (writer, worker) = NonBlockingBuilder::default().lossy(false).finish(file);

    let console = fmt::layer()
        .with_writer(io::stdout)
        .with_timer(ChronoLocal::new(LINE_TIME_FORMAT.to_owned()))
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_filter(LevelFilter::INFO);

    let file = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_timer(ChronoLocal::new(LINE_TIME_FORMAT.to_owned()))
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_filter(LevelFilter::TRACE);

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|_| LogError::AlreadyInitialized)?;

    install_panic_hook();
    tracing::debug!("logging to {0}", path.display());
    Ok(LogGuard {
        path,
        _worker: worker,
    })
}

/// Route panics through the logger before the default hook prints them, so
/// the file sink records why the process died.
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let payload = info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("<non-string panic payload>");
        let location = info.location().map_or_else(
            || "<unknown location>".to_owned(),
            |l| format!("{}:{}", l.file(), l.line()),
        );

        tracing::error!(
            "-----------------------\n{0}\n  at {1}\n-----------------------",
            message,
            location
        );
        previous(info);
    }));
}
