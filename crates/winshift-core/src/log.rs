//! Stderr logger with an optional rotating log file.
//!
//! Every line goes to stderr because winshift runs in the foreground.
//! When enabled, lines are also appended to
//! `~/.config/winshift/logs/winshift.log`, rotated to `winshift.log.1`
//! once it passes the size limit (one backup kept).

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

const LOG_FILE_NAME: &str = "winshift.log";
const BACKUP_FILE_NAME: &str = "winshift.log.1";

/// Logging configuration, derived from the `log_level` and `log_file`
/// config keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Minimum log level: "debug", "info", "warning", or "error".
    pub level: String,
    /// Whether to also write to the log file.
    pub file: bool,
    /// Maximum log file size in megabytes before rotation.
    pub max_file_mb: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            file: false,
            max_file_mb: 10,
        }
    }
}

/// Log severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }

    /// Parses a level name. Unknown names fall back to `Info`.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Self::Debug,
            "warn" | "warning" => Self::Warn,
            "error" | "critical" => Self::Error,
            _ => Self::Info,
        }
    }
}

struct Sink {
    file: File,
    path: PathBuf,
    max_bytes: u64,
    written: u64,
}

struct Logger {
    min_level: Level,
    sink: Option<Sink>,
}

/// Initialises the global logger. Call once at startup.
///
/// A log file that cannot be opened is reported on stderr and skipped;
/// stderr logging keeps working.
pub fn init(config: &LogConfig) {
    let sink = if config.file {
        open_sink(config.max_file_mb)
    } else {
        None
    };

    let logger = Logger {
        min_level: Level::parse(&config.level),
        sink,
    };

    let _ = LOGGER.set(Mutex::new(logger));
}

fn open_sink(max_file_mb: u64) -> Option<Sink> {
    let log_dir = crate::config::config_dir()?.join("logs");
    let _ = fs::create_dir_all(&log_dir);
    let path = log_dir.join(LOG_FILE_NAME);

    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: cannot open {}: {e}", path.display());
            return None;
        }
    };
    let written = file.metadata().map(|m| m.len()).unwrap_or(0);

    Some(Sink {
        file,
        path,
        max_bytes: max_file_mb * 1024 * 1024,
        written,
    })
}

/// Writes a log line if the level is at or above the configured minimum.
///
/// Before [`init`] runs, `Info` and above still reach stderr.
pub fn write(level: Level, args: fmt::Arguments<'_>) {
    let line = format!("{} [{}] {args}\n", timestamp(), level.as_str());

    let Some(mutex) = LOGGER.get() else {
        if level >= Level::Info {
            eprint!("{line}");
        }
        return;
    };
    let Ok(mut logger) = mutex.lock() else {
        return;
    };
    if level < logger.min_level {
        return;
    }

    eprint!("{line}");

    if let Some(sink) = logger.sink.as_mut() {
        let _ = sink.file.write_all(line.as_bytes());
        sink.written += line.len() as u64;
        if sink.max_bytes > 0 && sink.written >= sink.max_bytes {
            sink.rotate();
        }
    }
}

impl Sink {
    fn rotate(&mut self) {
        let backup = self.path.with_file_name(BACKUP_FILE_NAME);
        let _ = fs::rename(&self.path, &backup);
        if let Ok(f) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
        {
            self.file = f;
        }
        self.written = 0;
    }
}

fn timestamp() -> String {
    let dur = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = dur.as_secs();
    let (h, m, s) = (secs / 3600 % 24, secs / 60 % 60, secs % 60);
    format!("{h:02}:{m:02}:{s:02}")
}

/// Logs at DEBUG level.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { $crate::log::write($crate::log::Level::Debug, format_args!($($arg)*)) };
}

/// Logs at INFO level.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { $crate::log::write($crate::log::Level::Info, format_args!($($arg)*)) };
}

/// Logs at WARN level.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { $crate::log::write($crate::log::Level::Warn, format_args!($($arg)*)) };
}

/// Logs at ERROR level.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { $crate::log::write($crate::log::Level::Error, format_args!($($arg)*)) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_python_style_names() {
        // Assert
        assert_eq!(Level::parse("WARNING"), Level::Warn);
        assert_eq!(Level::parse("critical"), Level::Error);
        assert_eq!(Level::parse("Debug"), Level::Debug);
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        // Assert
        assert_eq!(Level::parse("verbose"), Level::Info);
        assert_eq!(Level::parse(""), Level::Info);
    }

    #[test]
    fn levels_are_ordered_by_severity() {
        // Assert
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
    }
}
