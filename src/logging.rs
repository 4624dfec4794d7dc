//! Logging setup
//!
//! Progress is logged to the console and, for pipeline runs, to a timestamped
//! file `<log_dir>/etl_YYYYMMDD_HHMMSS.log`. `RUST_LOG` overrides the level.

use crate::error::{Error, Result};
use chrono::{Local, NaiveDateTime};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Where console output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Console {
    #[default]
    Stdout,
    /// Keeps stdout free for command output
    Stderr,
}

/// Logging options chosen by the runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    pub level: String,
    pub console: Console,
    /// Directory for the run log; no file when `None`
    pub log_dir: Option<PathBuf>,
}

impl LogOptions {
    pub fn new(verbose: bool) -> Self {
        Self {
            level: if verbose { "debug" } else { "info" }.to_string(),
            console: Console::Stdout,
            log_dir: None,
        }
    }

    #[must_use]
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    #[must_use]
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }
}

/// Name of the run log for a given local time
pub fn log_file_name(at: NaiveDateTime) -> String {
    format!("etl_{}.log", at.format("%Y%m%d_%H%M%S"))
}

/// Create the log directory and the run log file
pub fn create_log_file(dir: &Path, at: NaiveDateTime) -> Result<(PathBuf, File)> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(log_file_name(at));
    let file = File::create(&path)?;
    Ok((path, file))
}

/// Install the global subscriber.
///
/// Returns the path of the run log when one was created.
pub fn init(options: &LogOptions) -> Result<Option<PathBuf>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&options.level));

    let (path, file) = match &options.log_dir {
        Some(dir) => {
            let (path, file) = create_log_file(dir, Local::now().naive_local())?;
            (Some(path), Some(file))
        }
        None => (None, None),
    };

    let stdout_layer =
        (options.console == Console::Stdout).then(|| fmt::layer().with_target(false));
    let stderr_layer = (options.console == Console::Stderr)
        .then(|| fmt::layer().with_target(false).with_writer(std::io::stderr));
    let file_layer = file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;

    Ok(path)
}
