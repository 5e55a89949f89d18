//! Logging infrastructure for the anco_env library
//!
//! Mobile hosts call [`init_logging`] once through the C API; log lines go
//! to logcat on Android and to stderr elsewhere. Binaries that install
//! their own tracing subscriber only use [`set_debug_enabled`] to switch
//! the library's debug output.

use std::sync::{Arc, Mutex, OnceLock};

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, Registry};

type LoggingResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Global logging configuration
static LOGGING_CONFIG: OnceLock<Arc<Mutex<LoggingConfig>>> = OnceLock::new();

/// Level filter handle of the subscriber installed by [`init_logging`]
static FILTER_HANDLE: OnceLock<reload::Handle<LevelFilter, Registry>> = OnceLock::new();

/// Logcat tag and line prefix
pub const DEFAULT_LOG_TAG: &str = "AncoEnv";

/// Logging configuration structure
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Whether debug logging is enabled
    pub debug_enabled: bool,
    /// Log level filter
    pub level: Level,
    /// Whether to include thread information
    pub include_thread_info: bool,
    /// Custom log target prefix
    pub target_prefix: Option<String>,
    /// Maximum log line length (for mobile platforms)
    pub max_line_length: Option<usize>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            debug_enabled: false,
            level: Level::INFO,
            include_thread_info: false,
            target_prefix: Some(DEFAULT_LOG_TAG.to_string()),
            max_line_length: Some(1024), // logcat truncates longer entries
        }
    }
}

impl LoggingConfig {
    fn level_filter(&self) -> LevelFilter {
        if self.debug_enabled {
            LevelFilter::DEBUG
        } else {
            LevelFilter::from_level(self.level)
        }
    }
}

fn config_store() -> &'static Arc<Mutex<LoggingConfig>> {
    LOGGING_CONFIG.get_or_init(|| Arc::new(Mutex::new(LoggingConfig::default())))
}

/// Initialize the logging system
pub fn init_logging() -> LoggingResult<()> {
    if FILTER_HANDLE.get().is_some() {
        return Err("Logging already initialized".into());
    }

    let config = get_config();
    setup_subscriber(&config)?;

    crate::platform::log_platform_info();
    Ok(())
}

/// Update logging configuration
pub fn configure_logging(config: LoggingConfig) -> LoggingResult<()> {
    {
        let mut stored = config_store()
            .lock()
            .map_err(|_| "Failed to acquire logging config lock")?;
        *stored = config.clone();
    }

    reload_filter(&config)?;

    tracing::debug!(
        "Logging configuration updated: debug_enabled={}",
        config.debug_enabled
    );
    Ok(())
}

/// Enable or disable debug logging
pub fn set_debug_enabled(enabled: bool) -> LoggingResult<()> {
    let config = {
        let mut stored = config_store()
            .lock()
            .map_err(|_| "Failed to acquire logging config lock")?;
        stored.debug_enabled = enabled;
        stored.level = if enabled { Level::DEBUG } else { Level::INFO };
        stored.clone()
    };

    reload_filter(&config)?;

    if enabled {
        tracing::debug!("Debug logging enabled");
    }
    Ok(())
}

/// Check if debug logging is enabled
pub fn is_debug_enabled() -> bool {
    LOGGING_CONFIG
        .get()
        .and_then(|config| config.lock().ok())
        .map(|config| config.debug_enabled)
        .unwrap_or(false)
}

/// Get current logging configuration
pub fn get_config() -> LoggingConfig {
    LOGGING_CONFIG
        .get()
        .and_then(|config| config.lock().ok())
        .map(|config| config.clone())
        .unwrap_or_default()
}

fn reload_filter(config: &LoggingConfig) -> LoggingResult<()> {
    if let Some(handle) = FILTER_HANDLE.get() {
        handle.modify(|filter| *filter = config.level_filter())?;
    }
    Ok(())
}

/// Set up the tracing subscriber based on configuration
fn setup_subscriber(config: &LoggingConfig) -> LoggingResult<()> {
    let (filter, handle) = reload::Layer::new(config.level_filter());

    let max_length = config.max_line_length.unwrap_or(usize::MAX);
    let prefix = config
        .target_prefix
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_TAG.to_string());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(config.include_thread_info)
        .with_thread_names(config.include_thread_info)
        .with_writer(move || MobileLogWriter::new(max_length, prefix.clone()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    let _ = FILTER_HANDLE.set(handle);
    Ok(())
}

/// Writer that splits long lines and routes them to the platform log
pub struct MobileLogWriter {
    max_length: usize,
    prefix: String,
}

impl MobileLogWriter {
    pub fn new(max_length: usize, prefix: String) -> Self {
        Self {
            max_length: max_length.max(1),
            prefix,
        }
    }

    fn split_message(&self, message: &str) -> Vec<String> {
        if message.len() <= self.max_length {
            return vec![message.to_string()];
        }

        let mut parts = Vec::new();
        let mut remaining = message;

        while remaining.len() > self.max_length {
            let mut end = self.max_length;
            while !remaining.is_char_boundary(end) {
                end -= 1;
            }
            if end == 0 {
                // Single character wider than the limit
                end = remaining
                    .char_indices()
                    .nth(1)
                    .map(|(i, _)| i)
                    .unwrap_or(remaining.len());
            }

            let split_pos = match remaining[..end].rfind(' ') {
                Some(pos) if pos > 0 => pos,
                _ => end,
            };

            parts.push(remaining[..split_pos].to_string());
            remaining = remaining[split_pos..].trim_start();
        }

        if !remaining.is_empty() {
            parts.push(remaining.to_string());
        }

        parts
    }

    #[cfg(target_os = "android")]
    fn emit(&self, line: &str) {
        use std::ffi::CString;

        let priority = match detect_level(line) {
            Some(Level::ERROR) => android_log_sys::LogPriority::ERROR,
            Some(Level::WARN) => android_log_sys::LogPriority::WARN,
            Some(Level::DEBUG) => android_log_sys::LogPriority::DEBUG,
            Some(Level::TRACE) => android_log_sys::LogPriority::VERBOSE,
            _ => android_log_sys::LogPriority::INFO,
        };

        let (Ok(tag), Ok(text)) = (CString::new(self.prefix.as_str()), CString::new(line)) else {
            return;
        };

        unsafe {
            android_log_sys::__android_log_write(priority as i32, tag.as_ptr(), text.as_ptr());
        }
    }

    #[cfg(not(target_os = "android"))]
    fn emit(&self, line: &str) {
        eprintln!("{} {}", self.prefix, line);
    }
}

/// Level token of a formatted tracing line
#[cfg_attr(not(target_os = "android"), allow(dead_code))]
fn detect_level(line: &str) -> Option<Level> {
    line.split_whitespace().take(3).find_map(|token| match token {
        "ERROR" => Some(Level::ERROR),
        "WARN" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "TRACE" => Some(Level::TRACE),
        _ => None,
    })
}

impl std::io::Write for MobileLogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let message = String::from_utf8_lossy(buf);
        let message = message.trim_end();
        if message.is_empty() {
            return Ok(buf.len());
        }

        let parts = self.split_message(message);
        let count = parts.len();
        for (i, part) in parts.iter().enumerate() {
            if count > 1 {
                self.emit(&format!("({}/{}) {}", i + 1, count, part));
            } else {
                self.emit(part);
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Logging macros for consistent usage throughout the library
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::debug!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        tracing::info!($($arg)*);
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        tracing::warn!($($arg)*);
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        tracing::error!($($arg)*);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(!config.debug_enabled);
        assert_eq!(config.level, Level::INFO);
        assert!(!config.include_thread_info);
        assert_eq!(config.target_prefix, Some("AncoEnv".to_string()));
        assert_eq!(config.max_line_length, Some(1024));
        assert_eq!(config.level_filter(), LevelFilter::INFO);
    }

    #[test]
    fn test_debug_overrides_level() {
        let config = LoggingConfig {
            debug_enabled: true,
            level: Level::WARN,
            ..LoggingConfig::default()
        };
        assert_eq!(config.level_filter(), LevelFilter::DEBUG);
    }

    #[test]
    fn test_mobile_log_writer_split() {
        let writer = MobileLogWriter::new(10, "TEST".to_string());
        let parts = writer.split_message("This is a very long message that should be split");

        assert!(parts.len() > 1);
        for part in &parts {
            assert!(part.len() <= 10);
        }
        assert_eq!(
            parts.join(" "),
            "This is a very long message that should be split"
        );
    }

    #[test]
    fn test_mobile_log_writer_short_message() {
        let writer = MobileLogWriter::new(100, "TEST".to_string());
        let parts = writer.split_message("Short message");

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0], "Short message");
    }

    #[test]
    fn test_mobile_log_writer_multibyte() {
        let writer = MobileLogWriter::new(4, "TEST".to_string());
        let parts = writer.split_message("鸿蒙系统");

        assert_eq!(parts.concat(), "鸿蒙系统");
        for part in &parts {
            assert!(part.len() <= 4);
        }
    }

    #[test]
    fn test_detect_level() {
        assert_eq!(
            detect_level("2024-05-01T10:00:00Z  WARN anco_env_shared::core::probe: x"),
            Some(Level::WARN)
        );
        assert_eq!(detect_level("DEBUG something"), Some(Level::DEBUG));
        assert_eq!(detect_level("plain text line here"), None);
    }

    #[test]
    fn test_set_debug_enabled_without_subscriber() {
        set_debug_enabled(true).unwrap();
        assert!(is_debug_enabled());
        assert_eq!(get_config().level, Level::DEBUG);

        set_debug_enabled(false).unwrap();
        assert!(!is_debug_enabled());
    }
}
