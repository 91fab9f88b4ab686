//! Error types for the Galaxy3D render core
//!
//! This module defines the error type shared by every component of the
//! submission pipeline (descriptor table, pipeline cache, materials,
//! recording scheduler, frame fences).

use std::fmt;

/// Result type for render core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Render core errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (device, command list, fence)
    BackendError(String),

    /// Out of GPU or arena memory
    OutOfMemory,

    /// Invalid resource (unknown shader stage, bad reflection data, ...)
    InvalidResource(String),

    /// Initialization failed (context, scheduler, worker threads)
    InitializationFailed(String),

    /// The fixed-capacity descriptor table has no free slot left
    DescriptorTableFull { capacity: u32 },

    /// A construction-time invariant was broken (second context, double override)
    InvariantViolation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::DescriptorTableFull { capacity } => {
                write!(f, "Descriptor table full ({} slots)", capacity)
            }
            Error::InvariantViolation(msg) => write!(f, "Invariant violation: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Error::BackendError("lock poisoned".to_string())
    }
}

// ===== ERROR MACROS =====

/// Log an error through the engine logger and build an `Error::BackendError`
///
/// # Example
///
/// ```ignore
/// let slot = table.slot(index)
///     .ok_or_else(|| engine_err!("galaxy3d::ResourceTable", "slot {} not live", index))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::BackendError(message)
    }};
}

/// Log an error and return early with `Error::BackendError`
///
/// # Example
///
/// ```ignore
/// if stages.is_empty() {
///     engine_bail!("galaxy3d::Signature", "no shader stage given");
/// }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
