/// Frame-in-flight slot rotation guarded by one GPU timeline fence
///
/// Each slot remembers the fence value signaled after its last submission.
/// A slot's per-frame resources (command allocators, constant arena) may be
/// reused only once the GPU has reached that value.

use std::sync::Arc;
use std::time::Duration;
use crate::error::Result;
use crate::graphics_device::{Fence, GraphicsDevice};
use crate::{engine_debug, engine_warn};

const SOURCE: &str = "galaxy3d::FrameFenceTracker";

pub struct FrameFenceTracker {
    fence: Arc<dyn Fence>,
    /// Fence value recorded at each slot's last submission (0 = never submitted)
    slot_values: Vec<u64>,
    last_signaled: u64,
    current: usize,
    wait_timeout: Duration,
}

impl FrameFenceTracker {
    pub fn new(device: &dyn GraphicsDevice, frames_in_flight: usize, wait_timeout: Duration) -> Result<Self> {
        let fence = device.create_fence(0)?;
        engine_debug!(SOURCE, "Created fence tracker with {} slots", frames_in_flight);
        Ok(Self {
            fence,
            slot_values: vec![0; frames_in_flight.max(1)],
            last_signaled: 0,
            current: 0,
            wait_timeout,
        })
    }

    pub fn current_slot(&self) -> usize {
        self.current
    }

    pub fn frames_in_flight(&self) -> usize {
        self.slot_values.len()
    }

    pub fn last_signaled(&self) -> u64 {
        self.last_signaled
    }

    /// Fence value the GPU must reach before `slot` is reused
    pub fn slot_value(&self, slot: usize) -> Option<u64> {
        self.slot_values.get(slot).copied()
    }

    /// Advance to the next slot and block until its previous frame completed
    pub fn move_to_next(&mut self) -> Result<usize> {
        self.current = (self.current + 1) % self.slot_values.len();
        self.wait_for_value(self.slot_values[self.current])?;
        Ok(self.current)
    }

    /// Record a new fence value for the current slot after its submission
    pub fn signal_current(&mut self, device: &dyn GraphicsDevice) -> Result<u64> {
        let value = self.last_signaled + 1;
        device.signal(&self.fence, value)?;
        self.last_signaled = value;
        self.slot_values[self.current] = value;
        Ok(value)
    }

    /// Wait until the current slot's last submission completed
    pub fn wait_for_current(&self) -> Result<()> {
        self.wait_for_value(self.slot_values[self.current])
    }

    /// Wait until every signaled submission completed
    pub fn wait_for_all(&self) -> Result<()> {
        self.wait_for_value(self.last_signaled)
    }

    fn wait_for_value(&self, value: u64) -> Result<()> {
        if self.fence.completed_value() >= value {
            return Ok(());
        }
        let mut attempts = 0u32;
        while !self.fence.wait(value, self.wait_timeout)? {
            attempts += 1;
            engine_warn!(SOURCE, "Fence value {} not reached after {} waits (completed: {})",
                value, attempts, self.fence.completed_value());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fence_tracker_tests.rs"]
mod tests;
