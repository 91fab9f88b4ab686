/// Monotonic frame signal shared between the orchestrator and pass workers
///
/// Holds the last frame number signaled. Waiters block until the value
/// reaches the frame they need; `u64::MAX` releases every waiter for good.

use std::sync::{Condvar, Mutex};
use crate::error::Result;

#[derive(Debug, Default)]
pub struct FrameSignal {
    value: Mutex<u64>,
    changed: Condvar,
}

impl FrameSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal to `frame` (never lowers it)
    pub fn signal(&self, frame: u64) -> Result<()> {
        let mut value = self.value.lock()?;
        if frame > *value {
            *value = frame;
        }
        self.changed.notify_all();
        Ok(())
    }

    /// Block until the signal reaches `frame`
    pub fn wait_for(&self, frame: u64) -> Result<u64> {
        let value = self.value.lock()?;
        let value = self.changed.wait_while(value, |value| *value < frame)?;
        Ok(*value)
    }

    pub fn value(&self) -> Result<u64> {
        Ok(*self.value.lock()?)
    }

    pub fn is_reached(&self, frame: u64) -> bool {
        self.value().is_ok_and(|value| value >= frame)
    }
}
