/// Render core configuration
///
/// Sized once at startup. None of these capacities grow at runtime: the
/// descriptor table, the per-frame constant arenas and the frame ring keep
/// the size they were created with.

use std::time::Duration;
use crate::error::{Error, Result};

/// Smallest and largest supported number of frames in flight
pub const MIN_FRAMES_IN_FLIGHT: usize = 1;
pub const MAX_FRAMES_IN_FLIGHT: usize = 4;

/// Render core configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application name (forwarded to the backend for debug labels)
    pub app_name: String,
    /// Number of frame-in-flight slots
    pub frames_in_flight: usize,
    /// Fixed capacity of the shader-visible descriptor table
    pub descriptor_capacity: u32,
    /// Size of the inline (root) constant budget in 32-bit values
    pub root_constant_budget_dwords: u32,
    /// Bytes available to per-draw constants in each frame slot
    pub constant_arena_bytes_per_frame: usize,
    /// Alignment of every constant arena allocation
    pub constant_alignment: usize,
    /// Duration of one bounded fence wait before it is retried
    pub fence_wait_timeout: Duration,
    /// Enable validation/debug layers in the backend
    pub enable_validation: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Galaxy3D Application".to_string(),
            frames_in_flight: 3,
            descriptor_capacity: 8192,
            root_constant_budget_dwords: 64,
            constant_arena_bytes_per_frame: 4 * 1024 * 1024,
            constant_alignment: 256,
            fence_wait_timeout: Duration::from_millis(100),
            enable_validation: cfg!(debug_assertions),
        }
    }
}

impl Config {
    /// Check the configuration before any GPU object is created
    pub fn validate(&self) -> Result<()> {
        if !(MIN_FRAMES_IN_FLIGHT..=MAX_FRAMES_IN_FLIGHT).contains(&self.frames_in_flight) {
            return Err(Error::InitializationFailed(format!(
                "frames_in_flight must be in {}..={}, got {}",
                MIN_FRAMES_IN_FLIGHT, MAX_FRAMES_IN_FLIGHT, self.frames_in_flight
            )));
        }
        if self.descriptor_capacity == 0 {
            return Err(Error::InitializationFailed(
                "descriptor_capacity must be greater than zero".to_string(),
            ));
        }
        if !self.constant_alignment.is_power_of_two() {
            return Err(Error::InitializationFailed(format!(
                "constant_alignment must be a power of two, got {}",
                self.constant_alignment
            )));
        }
        if self.constant_arena_bytes_per_frame < self.constant_alignment {
            return Err(Error::InitializationFailed(format!(
                "constant arena ({} bytes) smaller than one aligned allocation ({} bytes)",
                self.constant_arena_bytes_per_frame, self.constant_alignment
            )));
        }
        if self.fence_wait_timeout.is_zero() {
            return Err(Error::InitializationFailed(
                "fence_wait_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
