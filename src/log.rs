// Author: Dustin Pilgrim
// License: MIT

use std::fmt::Arguments;
use std::fs::{OpenOptions, create_dir_all, metadata, rename};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::{Mutex, Once};

use chrono::Local;
use once_cell::sync::Lazy;

/// Maximum log file size in bytes before rotation (5 MiB)
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;

#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum LogLevel {
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl LogLevel {
    fn color(&self) -> &'static str {
        match self {
            LogLevel::Error => "\x1b[31m",
            LogLevel::Warn => "\x1b[33m",
            LogLevel::Info => "\x1b[36m",
            LogLevel::Debug => "\x1b[90m",
        }
    }

    fn short(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERR",
            LogLevel::Warn => "WRN",
            LogLevel::Info => "INF",
            LogLevel::Debug => "DBG",
        }
    }
}

const RESET_COLOR: &str = "\x1b[0m";

pub struct Config {
    pub level: LogLevel,
    pub use_colors: bool,
    pub console: bool,
    pub file: bool,
}

pub static GLOBAL_CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| {
    Mutex::new(Config {
        level: LogLevel::Info,
        use_colors: std::io::stderr().is_terminal(),
        console: false,
        file: !cfg!(test),
    })
});

static SESSION_SEPARATOR: Once = Once::new();

/// Verbose mode: debug level and every line echoed to the console.
pub fn set_verbose(enabled: bool) {
    if let Ok(mut config) = GLOBAL_CONFIG.lock() {
        config.level = if enabled { LogLevel::Debug } else { LogLevel::Info };
        config.console = enabled;
    }
}

pub fn log_message(level: LogLevel, prefix: &str, args: Arguments) {
    let Ok(config) = GLOBAL_CONFIG.lock() else {
        return;
    };

    if level > config.level {
        return;
    }

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    let file_line = format!("[{}][{}][{}] {}", timestamp, level.short(), prefix, args);

    if config.file {
        if let Err(e) = write_line_to_log(&file_line) {
            eprintln!("Failed to write log: {}", e);
        }
    }

    // Console lines go to stderr so `info --json` stays clean on stdout.
    if config.console || level == LogLevel::Error {
        if config.use_colors {
            eprintln!(
                "{}●{} [{}][{}] {}",
                level.color(),
                RESET_COLOR,
                timestamp,
                prefix,
                args
            );
        } else {
            eprintln!("{}", file_line);
        }
    }
}

#[macro_export]
macro_rules! plog {
    ($level:expr, $prefix:expr, $($arg:tt)*) => {
        $crate::log::log_message($level, $prefix, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! pinfo {
    ($prefix:expr, $($arg:tt)*) => { $crate::plog!($crate::log::LogLevel::Info, $prefix, $($arg)*) };
}

#[macro_export]
macro_rules! pwarn {
    ($prefix:expr, $($arg:tt)*) => { $crate::plog!($crate::log::LogLevel::Warn, $prefix, $($arg)*) };
}

#[macro_export]
macro_rules! perror {
    ($prefix:expr, $($arg:tt)*) => { $crate::plog!($crate::log::LogLevel::Error, $prefix, $($arg)*) };
}

#[macro_export]
macro_rules! pdebug {
    ($prefix:expr, $($arg:tt)*) => { $crate::plog!($crate::log::LogLevel::Debug, $prefix, $($arg)*) };
}

pub fn log_path() -> PathBuf {
    let mut path = dirs::cache_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    path.push("presence");
    if !path.exists() {
        let _ = create_dir_all(&path);
    }
    path.push("presence.log");
    path
}

/// Keeps one backup (`presence.log.1`) once the file passes MAX_LOG_SIZE.
fn rotate_log_if_needed(path: &PathBuf) {
    if let Ok(meta) = metadata(path) {
        if meta.len() >= MAX_LOG_SIZE {
            let backup = PathBuf::from(format!("{}.1", path.display()));
            let _ = rename(path, backup);
        }
    }
}

fn ensure_session_header_once(path: &PathBuf) {
    SESSION_SEPARATOR.call_once(|| {
        let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) else {
            return;
        };
        if metadata(path).map(|m| m.len() > 0).unwrap_or(false) {
            let _ = writeln!(file);
        }
        let _ = writeln!(
            file,
            "==================== presence run start (pid={}) ====================",
            std::process::id()
        );
    });
}

fn write_line_to_log(line: &str) -> std::io::Result<()> {
    let path = log_path();
    rotate_log_if_needed(&path);
    ensure_session_header_once(&path);

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

    writeln!(file, "{}", line)?;
    Ok(())
}
