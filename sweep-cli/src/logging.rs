// ============================================================================
// adder-sweep/src/logging.rs
// ============================================================================
//
// LOGGING: Console and controller log file setup
//
// The core library logs through the `log` facade. This module installs a
// `fern` dispatcher that writes every record to the console and, unless
// disabled, to a timestamped controller log next to the sweep output.
//
// The controller log is only created once the sweep has passed its setup
// checks; records logged before that are held in memory and written out
// when the file is opened, or dropped if setup fails.
//
// Console info output moves to stderr when stdout carries JSON progress
// events.

use anyhow::Context;
use log::LevelFilter;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let log_filename = format!("adder_sweep_run_{}.log", adder_sweep::logging::get_timestamp());
/// // Result: "adder_sweep_run_20240601_123045.log"
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Path of a fresh controller log in `log_dir`.
pub fn controller_log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("adder_sweep_run_{}.log", get_timestamp()))
}

enum LogState {
    Pending(Vec<u8>),
    Open(File),
    Closed,
}

/// Controller log file that buffers until it is opened.
#[derive(Clone)]
pub struct ControllerLog {
    path: PathBuf,
    state: Arc<Mutex<LogState>>,
}

impl ControllerLog {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: Arc::new(Mutex::new(LogState::Pending(Vec::new()))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file and its directory, then writes out everything
    /// buffered so far. On failure the log is closed and later records are
    /// discarded.
    pub fn open(&self) -> anyhow::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow::anyhow!("controller log lock poisoned"))?;

        let pending = match std::mem::replace(&mut *state, LogState::Closed) {
            LogState::Pending(buffer) => buffer,
            open @ LogState::Open(_) => {
                *state = open;
                return Ok(());
            }
            LogState::Closed => return Ok(()),
        };

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open log file {}", self.path.display()))?;
        file.write_all(&pending)
            .with_context(|| format!("Failed to write log file {}", self.path.display()))?;

        *state = LogState::Open(file);
        Ok(())
    }
}

impl Write for ControllerLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("controller log lock poisoned"))?;
        match &mut *state {
            LogState::Pending(buffer) => {
                buffer.extend_from_slice(buf);
                Ok(buf.len())
            }
            LogState::Open(file) => file.write(buf),
            LogState::Closed => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("controller log lock poisoned"))?;
        match &mut *state {
            LogState::Open(file) => file.flush(),
            _ => Ok(()),
        }
    }
}

/// Installs the global logger.
///
/// `verbose` raises the level from Info to Debug.
pub fn init_logging(
    verbose: bool,
    log_file: Option<&ControllerLog>,
    console_to_stderr: bool,
) -> anyhow::Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let info_output: fern::Output = if console_to_stderr {
        std::io::stderr().into()
    } else {
        std::io::stdout().into()
    };

    // Warnings and errors always go to stderr
    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            if record.level() <= log::Level::Warn {
                out.finish(format_args!("{}: {}", record.level(), message))
            } else {
                out.finish(format_args!("{}", message))
            }
        })
        .chain(
            fern::Dispatch::new()
                .filter(|metadata| metadata.level() <= log::Level::Warn)
                .chain(std::io::stderr()),
        )
        .chain(
            fern::Dispatch::new()
                .filter(|metadata| metadata.level() > log::Level::Warn)
                .chain(info_output),
        );

    let mut dispatch = fern::Dispatch::new()
        .level(level)
        // Dependencies are noisy at debug level
        .level_for("ntfy", LevelFilter::Warn)
        .chain(console);

    if let Some(log) = log_file {
        let file: Box<dyn Write + Send> = Box::new(log.clone());
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{} [{}] {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                        record.level(),
                        message
                    ))
                })
                .chain(file),
        );
    }

    dispatch.apply().context("Failed to install logger")?;
    Ok(())
}
