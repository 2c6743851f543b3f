//! FILENAME: app/src/logging.rs
// PURPOSE: Unified logging system for the matrix view.
// CONTEXT: Every line has the shape `seq|level|category|message`. Lines from the
// `log` facade (engine, persistence) go through `UnifiedLogger` into the same sink.

use std::fs::File;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::Lazy;

// ============================================================================
// UNIFIED LOGGING SYSTEM
// ============================================================================

/// Global sequence counter
static LOG_SEQ: AtomicU64 = AtomicU64::new(0);

/// Echo log lines to stderr. Stdout is left to command output.
static LOG_STDERR: AtomicBool = AtomicBool::new(true);

/// Most verbose level written, as `LevelFilter as usize`
static LOG_LEVEL: AtomicUsize = AtomicUsize::new(LevelFilter::Info as usize);

/// Global log file handle
static LOG_FILE: Lazy<Mutex<Option<File>>> = Lazy::new(|| Mutex::new(None));

static LOGGER: UnifiedLogger = UnifiedLogger;

/// Get next sequence number
pub fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst) + 1
}

pub fn set_stderr(enabled: bool) {
    LOG_STDERR.store(enabled, Ordering::SeqCst);
}

pub fn set_level(level: LevelFilter) {
    LOG_LEVEL.store(level as usize, Ordering::SeqCst);
}

pub fn level_filter() -> LevelFilter {
    let stored = LOG_LEVEL.load(Ordering::SeqCst);
    LevelFilter::iter()
        .find(|filter| *filter as usize == stored)
        .unwrap_or(LevelFilter::Info)
}

/// Level of a one-letter code used in log lines.
fn level_of(code: &str) -> Level {
    match code {
        "E" => Level::Error,
        "W" => Level::Warn,
        "I" => Level::Info,
        _ => Level::Debug,
    }
}

/// Create (truncate) the log file at `path`, creating parent directories.
pub fn init_log_file(path: &Path) -> io::Result<PathBuf> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;

    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = Some(file);
    }

    Ok(path.to_path_buf())
}

/// Install `UnifiedLogger` as the `log` facade backend.
/// Fails if another logger is already installed.
pub fn init_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Write a log line in unified format. Lines above the configured level are dropped.
pub fn write_log(level: &str, category: &str, message: &str) {
    if level_of(level) > level_filter() {
        return;
    }
    let seq = next_seq();
    write_log_raw(&format!("{}|{}|{}|{}", seq, level, category, message));
}

/// Write an ENTER log line for function entry
pub fn write_log_enter(level: &str, category: &str, func_name: &str, params: &str) {
    let message = if params.is_empty() {
        format!("ENTER {}", func_name)
    } else {
        format!("ENTER {} {}", func_name, params)
    };
    write_log(level, category, &message);
}

/// Write an EXIT log line for function exit
pub fn write_log_exit(level: &str, category: &str, func_name: &str, result: &str) {
    let message = if result.is_empty() {
        format!("EXIT {}", func_name)
    } else {
        format!("EXIT {} {}", func_name, result)
    };
    write_log(level, category, &message);
}

/// Write raw message
fn write_log_raw(message: &str) {
    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(ref mut file) = *guard {
            if let Err(e) = writeln!(file, "{}", message) {
                eprintln!("[LOG_ERROR] Failed to write: {}", e);
            }
            let _ = file.flush();
        }
    }
    if LOG_STDERR.load(Ordering::SeqCst) {
        eprintln!("{}", message);
    }
}

// ============================================================================
// LOG FACADE BRIDGE
// ============================================================================

/// Routes `log` records into the unified log.
pub struct UnifiedLogger;

impl UnifiedLogger {
    fn level_code(level: Level) -> &'static str {
        match level {
            Level::Error => "E",
            Level::Warn => "W",
            Level::Info => "I",
            Level::Debug | Level::Trace => "D",
        }
    }

    /// "persistence::http" -> "PERSISTENCE"
    fn category(target: &str) -> String {
        target
            .split("::")
            .next()
            .unwrap_or(target)
            .to_ascii_uppercase()
    }
}

impl Log for UnifiedLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        write_log(
            Self::level_code(record.level()),
            &Self::category(record.target()),
            &record.args().to_string(),
        );
    }

    fn flush(&self) {
        if let Ok(mut guard) = LOG_FILE.lock() {
            if let Some(ref mut file) = *guard {
                let _ = file.flush();
            }
        }
    }
}

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================

#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("D", $cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("I", $cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("W", $cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("E", $cat, &format!($($arg)*))
    };
}

// ENTER/EXIT macros for function tracing

#[macro_export]
macro_rules! log_enter {
    ($cat:expr, $func:expr) => {
        $crate::logging::write_log_enter("D", $cat, $func, "")
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::write_log_enter("D", $cat, $func, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_exit {
    ($cat:expr, $func:expr) => {
        $crate::logging::write_log_exit("D", $cat, $func, "")
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::write_log_exit("D", $cat, $func, &format!($($arg)*))
    };
}

// Re-export the macros so they can be imported via `use crate::logging::log_info;`
pub use log_debug;
pub use log_enter;
pub use log_error;
pub use log_exit;
pub use log_info;
pub use log_warn;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = next_seq();
        let b = next_seq();
        assert!(b > a);
    }

    #[test]
    fn test_category_from_target() {
        assert_eq!(UnifiedLogger::category("persistence::http"), "PERSISTENCE");
        assert_eq!(UnifiedLogger::category("engine"), "ENGINE");
    }

    #[test]
    fn test_level_filter_ordering() {
        assert_eq!(level_of("W"), Level::Warn);
        assert_eq!(level_of("D"), Level::Debug);
        assert!(level_of("I") > LevelFilter::Warn);
        assert!(level_of("E") <= LevelFilter::Warn);
    }

    #[test]
    fn test_level_codes() {
        assert_eq!(UnifiedLogger::level_code(Level::Warn), "W");
        assert_eq!(UnifiedLogger::level_code(Level::Trace), "D");
    }
}
