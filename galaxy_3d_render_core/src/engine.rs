/// Galaxy3D Engine - process-wide logging facade
///
/// The render core keeps no renderer or manager singletons: every subsystem
/// lives in an explicit `RenderContext`. The only process-wide state is the
/// logger, its severity filter, and the set of keys already reported by
/// `log_once`.

use std::sync::{Mutex, OnceLock, RwLock};
use std::time::SystemTime;
use rustc_hash::FxHashSet;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Entries below this severity are dropped before reaching the logger
static MIN_SEVERITY: RwLock<LogSeverity> = RwLock::new(LogSeverity::Trace);

/// Keys already emitted through `log_once`
static ONCE_KEYS: OnceLock<Mutex<FxHashSet<String>>> = OnceLock::new();

fn logger_lock() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

fn passes_filter(severity: LogSeverity) -> bool {
    match MIN_SEVERITY.read() {
        Ok(min) => severity >= *min,
        Err(_) => true,
    }
}

// ===== PUBLIC API =====

/// Logging entry point used by the `engine_*` macros
pub struct Engine;

impl Engine {
    /// Set a custom logger
    ///
    /// # Example
    ///
    /// ```no_run
    /// use galaxy_3d_render_core::galaxy3d::Engine;
    /// use galaxy_3d_render_core::galaxy3d::log::{Logger, LogEntry};
    ///
    /// struct FileLogger;
    ///
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Drop every entry whose severity is below `severity`
    pub fn set_min_severity(severity: LogSeverity) {
        if let Ok(mut min) = MIN_SEVERITY.write() {
            *min = severity;
        }
    }

    /// Current minimum severity
    pub fn min_severity() -> LogSeverity {
        MIN_SEVERITY.read().map(|min| *min).unwrap_or(LogSeverity::Trace)
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if !passes_filter(severity) {
            return;
        }
        if let Ok(lock) = logger_lock().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if !passes_filter(severity) {
            return;
        }
        if let Ok(lock) = logger_lock().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }

    /// Log `message` only the first time `key` is seen
    ///
    /// Returns true when the entry was emitted.
    pub fn log_once(key: impl Into<String>, severity: LogSeverity, source: &str, message: String) -> bool {
        let keys = ONCE_KEYS.get_or_init(|| Mutex::new(FxHashSet::default()));
        let first = match keys.lock() {
            Ok(mut set) => set.insert(key.into()),
            Err(_) => true,
        };
        if first {
            Self::log(severity, source, message);
        }
        first
    }

    /// Forget every `log_once` key and restore the default filter
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(keys) = ONCE_KEYS.get() {
            if let Ok(mut set) = keys.lock() {
                set.clear();
            }
        }
        Self::set_min_severity(LogSeverity::Trace);
        Self::reset_logger();
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
