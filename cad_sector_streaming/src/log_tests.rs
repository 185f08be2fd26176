//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger, and the global logger slot.
//!
//! Tests that swap the global logger are marked #[serial].

use crate::log::{self, CaptureLogger, DefaultLogger, LogEntry, LogSeverity, Logger};
use serial_test::serial;
use std::time::SystemTime;

fn entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "sector3d::test".to_string(),
        message: format!("{:?} message", severity),
        file,
        line,
    }
}

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
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Warn), "Warn");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_with_file_line() {
    let entry = entry(LogSeverity::Error, Some("batching.rs"), Some(42));
    assert_eq!(entry.file, Some("batching.rs"));
    assert_eq!(entry.line, Some(42));
    assert_eq!(entry.source, "sector3d::test");
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_all_severities() {
    let logger = DefaultLogger;
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        // Both branches (with and without file:line) must not panic
        logger.log(&entry(severity, None, None));
        logger.log(&entry(severity, Some("test.rs"), Some(7)));
    }
}

#[test]
fn test_logger_trait_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();
    assert_send_sync::<CaptureLogger>();
}

// ============================================================================
// GLOBAL LOGGER TESTS
// ============================================================================

#[test]
#[serial]
fn test_set_logger_routes_macros() {
    let capture = CaptureLogger::default();
    log::set_logger(capture.clone());

    crate::stream_warn!("sector3d::test", "skipped {} items", 2);
    crate::stream_info!("sector3d::test", "loaded");
    crate::stream_error!("sector3d::test", "broken");

    log::reset_logger();

    // Other tests may log concurrently, so look for our entries instead of exact lists
    assert!(capture.messages(LogSeverity::Warn).contains(&"skipped 2 items".to_string()));
    assert!(capture.messages(LogSeverity::Info).contains(&"loaded".to_string()));

    let entries = capture.entries.lock().unwrap();
    let error = entries.iter().find(|e| e.message == "broken").unwrap();
    assert!(error.file.is_some());
    assert!(error.line.is_some());
}

#[test]
#[serial]
fn test_reset_logger_stops_capture() {
    let capture = CaptureLogger::default();
    log::set_logger(capture.clone());
    log::reset_logger();

    crate::stream_debug!("sector3d::test", "not captured");

    assert!(!capture.messages(LogSeverity::Debug).contains(&"not captured".to_string()));
}
