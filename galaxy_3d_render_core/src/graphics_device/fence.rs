/// GPU timeline fence

use std::time::Duration;
use crate::error::Result;

/// Monotonic GPU fence
///
/// The device writes increasing values through `GraphicsDevice::signal` once
/// every command list submitted before the signal has executed.
pub trait Fence: Send + Sync {
    /// Last value the GPU has reached
    fn completed_value(&self) -> u64;

    /// Block until the fence reaches `value` or `timeout` elapses
    ///
    /// Returns `Ok(true)` when the value was reached, `Ok(false)` on timeout.
    fn wait(&self, value: u64, timeout: Duration) -> Result<bool>;
}
