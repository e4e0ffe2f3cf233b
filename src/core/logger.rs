// Threat Lookup Proxy - Systemd-Style Logger
// Copyright (C) 2025 EliteHosting
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Systemd-style logging compatible with journald
//!
//! Terminal mode prints `YYYY-MM-DD HH:MM:SS [LEVEL] message` to stderr, coloured
//! when stderr is a TTY. Journald mode prints `KEY=value` blocks.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};

use chrono::Utc;

const SYSLOG_IDENTIFIER: &str = "threat-lookup";

/// Log levels following systemd priority conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl LogLevel {
    pub fn priority(self) -> u8 {
        self as u8
    }

    pub fn from_priority(priority: u8) -> Self {
        match priority {
            0..=3 => LogLevel::Error,
            4 => LogLevel::Warning,
            5 => LogLevel::Notice,
            6 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERR",
            LogLevel::Warning => "WARNING",
            LogLevel::Notice => "NOTICE",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    fn color_code(self) -> &'static str {
        match self {
            LogLevel::Error => "\x1b[31m",
            LogLevel::Warning => "\x1b[33m",
            LogLevel::Notice => "\x1b[36m",
            LogLevel::Info => "\x1b[32m",
            LogLevel::Debug => "\x1b[37m",
        }
    }
}

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub use_colors: bool,
    pub include_timestamp: bool,
    /// Prefix lines with the emitting module
    pub include_target: bool,
    pub journald_format: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            use_colors: atty::is(atty::Stream::Stderr),
            include_timestamp: true,
            include_target: false,
            journald_format: false,
        }
    }
}

static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

#[derive(Debug)]
pub struct Logger {
    config: LoggerConfig,
    min_level: AtomicU8,
}

impl Logger {
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            min_level: AtomicU8::new(config.min_level.priority()),
            config,
        }
    }

    /// Install the global logger. Fails if one is already installed.
    pub fn init(config: LoggerConfig) -> Result<(), LoggerError> {
        let mut global = LOGGER.lock().map_err(|_| LoggerError::InitError)?;
        if global.is_some() {
            return Err(LoggerError::AlreadyInitialized);
        }
        *global = Some(Self::new(config));
        Ok(())
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level.priority() <= self.min_level.load(Ordering::Relaxed)
    }

    pub fn log(&self, level: LogLevel, target: &str, message: &str) {
        if !self.should_log(level) {
            return;
        }
        eprintln!("{}", self.format(level, target, message));
    }

    fn format(&self, level: LogLevel, target: &str, message: &str) -> String {
        if self.config.journald_format {
            self.format_journald(level, target, message)
        } else {
            self.format_terminal(level, target, message)
        }
    }

    fn format_journald(&self, level: LogLevel, target: &str, message: &str) -> String {
        let mut output = format!("PRIORITY={}\nMESSAGE={}\n", level.priority(), message);
        if self.config.include_target && !target.is_empty() {
            output.push_str(&format!("CODE_FILE={}\n", target));
        }
        if self.config.include_timestamp {
            output.push_str(&format!(
                "_SOURCE_REALTIME_TIMESTAMP={}\n",
                Utc::now().timestamp_micros()
            ));
        }
        output.push_str(&format!("SYSLOG_IDENTIFIER={}\n", SYSLOG_IDENTIFIER));
        output
    }

    fn format_terminal(&self, level: LogLevel, target: &str, message: &str) -> String {
        let mut output = String::new();

        if self.config.include_timestamp {
            output.push_str(&format!("{} ", Utc::now().format("%Y-%m-%d %H:%M:%S")));
        }

        // Lines that already carry a status marker ([*], [   OK   ], ...) keep it
        let has_marker = message.starts_with("[*]") || message.starts_with("[   ") || message.starts_with("[  FAILED ]");
        if !has_marker {
            if self.config.use_colors {
                output.push_str(&format!("{}[{}]\x1b[0m ", level.color_code(), level.as_str()));
            } else {
                output.push_str(&format!("[{}] ", level.as_str()));
            }
        }

        if self.config.include_target && !target.is_empty() {
            output.push_str(&format!("{}: ", target));
        }

        if has_marker && self.config.use_colors {
            output.push_str(&format!("{}{}\x1b[0m", level.color_code(), message));
        } else {
            output.push_str(message);
        }

        output
    }
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::core::logger::log_with_level($crate::core::logger::LogLevel::Error, module_path!(), &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::core::logger::log_with_level($crate::core::logger::LogLevel::Warning, module_path!(), &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::core::logger::log_with_level($crate::core::logger::LogLevel::Debug, module_path!(), &format!($($arg)*))
    };
}

/// Log through the global logger; a no-op before `init`
pub fn log_with_level(level: LogLevel, target: &str, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(ref logger) = *guard {
            logger.log(level, target, message);
        }
    }
}

pub fn log_init_start(service_name: &str) {
    log_with_level(LogLevel::Notice, module_path!(), &format!("[*] Starting {}...", service_name));
}

pub fn log_init_ok_with_details(service_name: &str, details: &str) {
    log_with_level(
        LogLevel::Info,
        module_path!(),
        &format!("[   OK   ] Starting {} ({})", service_name, details),
    );
}

pub fn log_init_failed(service_name: &str, error: &str) {
    log_with_level(
        LogLevel::Error,
        module_path!(),
        &format!("[  FAILED ] Starting {} - {}", service_name, error),
    );
}

#[macro_export]
macro_rules! log_init_start {
    ($service:expr) => {
        $crate::core::logger::log_init_start($service);
    };
}

#[macro_export]
macro_rules! log_init_ok_with_details {
    ($service:expr, $details:expr) => {
        $crate::core::logger::log_init_ok_with_details($service, $details);
    };
}

#[macro_export]
macro_rules! log_init_failed {
    ($service:expr, $error:expr) => {
        $crate::core::logger::log_init_failed($service, $error);
    };
}

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("Logger already initialized")]
    AlreadyInitialized,
    #[error("Failed to initialize logger")]
    InitError,
}

/// Initialize logger from CLI arguments
pub fn init_from_args(debug: bool, trace: bool, journald: bool) -> Result<(), LoggerError> {
    let min_level = if debug || trace { LogLevel::Debug } else { LogLevel::Info };

    Logger::init(LoggerConfig {
        min_level,
        use_colors: atty::is(atty::Stream::Stderr) && !journald,
        include_timestamp: !journald,
        include_target: trace,
        journald_format: journald,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(min_level: LogLevel) -> Logger {
        Logger::new(LoggerConfig {
            min_level,
            use_colors: false,
            include_timestamp: false,
            include_target: false,
            journald_format: false,
        })
    }

    #[test]
    fn test_log_level_priority() {
        assert_eq!(LogLevel::Error.priority(), 3);
        assert_eq!(LogLevel::Debug.priority(), 7);
        assert_eq!(LogLevel::from_priority(0), LogLevel::Error);
        assert_eq!(LogLevel::from_priority(6), LogLevel::Info);
        assert!(LogLevel::Error < LogLevel::Warning);
    }

    #[test]
    fn test_logger_level_filtering() {
        let logger = plain(LogLevel::Warning);
        assert!(logger.should_log(LogLevel::Error));
        assert!(logger.should_log(LogLevel::Warning));
        assert!(!logger.should_log(LogLevel::Info));
        assert!(!logger.should_log(LogLevel::Debug));
    }

    #[test]
    fn test_terminal_format() {
        let logger = plain(LogLevel::Info);
        assert_eq!(logger.format(LogLevel::Error, "x", "upstream down"), "[ERR] upstream down");
        assert_eq!(
            logger.format(LogLevel::Info, "x", "[   OK   ] Starting proxy"),
            "[   OK   ] Starting proxy"
        );
    }

    #[test]
    fn test_journald_format() {
        let logger = Logger::new(LoggerConfig {
            min_level: LogLevel::Debug,
            use_colors: false,
            include_timestamp: false,
            include_target: true,
            journald_format: true,
        });
        let out = logger.format(LogLevel::Warning, "threat_lookup::web", "slow upstream");
        assert!(out.starts_with("PRIORITY=4\nMESSAGE=slow upstream\n"));
        assert!(out.contains("CODE_FILE=threat_lookup::web\n"));
        assert!(out.ends_with("SYSLOG_IDENTIFIER=threat-lookup\n"));
    }
}
