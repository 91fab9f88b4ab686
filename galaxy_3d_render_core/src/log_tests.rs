//! Unit tests for log.rs
//!
//! Tests LogSeverity, LogEntry and DefaultLogger.

use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
use std::time::SystemTime;

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_labels_are_fixed_width() {
    let all = [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ];
    for severity in all {
        assert_eq!(severity.label().len(), 5, "label of {:?}", severity);
    }
    assert_eq!(LogSeverity::Warn.label().trim(), "WARN");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_without_location() {
    let entry = LogEntry {
        severity: LogSeverity::Info,
        timestamp: SystemTime::now(),
        source: "galaxy3d::Scheduler".to_string(),
        message: "pass 'opaque' started".to_string(),
        file: None,
        line: None,
    };

    assert_eq!(entry.severity, LogSeverity::Info);
    assert_eq!(entry.source, "galaxy3d::Scheduler");
    assert!(entry.file.is_none());
    assert!(entry.line.is_none());
}

#[test]
fn test_log_entry_with_location_clone() {
    let entry = LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "galaxy3d::PipelineCache".to_string(),
        message: "pipeline creation failed".to_string(),
        file: Some("pipeline_cache.rs"),
        line: Some(42),
    };
    let copy = entry.clone();
    assert_eq!(copy.file, Some("pipeline_cache.rs"));
    assert_eq!(copy.line, Some(42));
    assert_eq!(copy.message, entry.message);
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_all_severities() {
    let logger = DefaultLogger;
    for severity in [LogSeverity::Trace, LogSeverity::Debug, LogSeverity::Info, LogSeverity::Warn] {
        logger.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: "galaxy3d::test".to_string(),
            message: "console output".to_string(),
            file: None,
            line: None,
        });
    }
    logger.log(&LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "galaxy3d::test".to_string(),
        message: "console output with location".to_string(),
        file: Some("log_tests.rs"),
        line: Some(1),
    });
}
