//! Unit tests for error.rs
//!
//! Tests all Error variants and the engine_err!/engine_bail! macros.

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("command list reset failed".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("command list reset failed"));
}

#[test]
fn test_out_of_memory_display() {
    let err = Error::OutOfMemory;
    assert_eq!(format!("{}", err), "Out of GPU memory");
}

#[test]
fn test_descriptor_table_full_display() {
    let err = Error::DescriptorTableFull { capacity: 16 };
    let display = format!("{}", err);
    assert!(display.contains("Descriptor table full"));
    assert!(display.contains("16"));
}

#[test]
fn test_invariant_violation_display() {
    let err = Error::InvariantViolation("second render context".to_string());
    let display = format!("{}", err);
    assert!(display.starts_with("Invariant violation"));
    assert!(display.contains("second render context"));
}

#[test]
fn test_invalid_resource_and_init_display() {
    let a = Error::InvalidResource("shader 'x'".to_string());
    let b = Error::InitializationFailed("worker spawn".to_string());
    assert!(format!("{}", a).contains("Invalid resource"));
    assert!(format!("{}", b).contains("Initialization failed"));
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::OutOfMemory;
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_clone_keeps_message() {
    let err = Error::DescriptorTableFull { capacity: 4 };
    assert_eq!(format!("{}", err), format!("{}", err.clone()));
}

#[test]
fn test_poison_error_maps_to_backend_error() {
    let lock = std::sync::Arc::new(std::sync::Mutex::new(0u32));
    let poisoner = lock.clone();
    let _ = std::thread::spawn(move || {
        let _guard = poisoner.lock().unwrap();
        panic!("poison the lock");
    })
    .join();

    let result: Result<u32> = lock.lock().map(|v| *v).map_err(Error::from);
    assert!(matches!(result, Err(Error::BackendError(_))));
}

// ============================================================================
// MACRO TESTS
// ============================================================================

fn bail_when_negative(value: i32) -> Result<i32> {
    if value < 0 {
        crate::engine_bail!("galaxy3d::test", "negative value {}", value);
    }
    Ok(value)
}

#[test]
fn test_engine_bail_returns_backend_error() {
    assert_eq!(bail_when_negative(3).unwrap(), 3);
    match bail_when_negative(-1) {
        Err(Error::BackendError(msg)) => assert_eq!(msg, "negative value -1"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_engine_err_builds_error() {
    let err = crate::engine_err!("galaxy3d::test", "slot {} missing", 7);
    assert_eq!(format!("{}", err), "Backend error: slot 7 missing");
}
