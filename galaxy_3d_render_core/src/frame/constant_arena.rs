/// Per-frame constant arena
///
/// One append-only byte arena per frame-in-flight slot. Per-object constants
/// that do not fit the inline root budget are copied here and bound by
/// (slot, offset). A slot is reset only after its fence has been waited on.

use std::sync::Mutex;
use crate::error::{Error, Result};
use crate::engine_error;

/// Location of one constant block inside a frame slot's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantAllocation {
    pub frame_slot: usize,
    pub offset: usize,
    pub size: usize,
}

struct ArenaSlot {
    data: Vec<u8>,
}

pub struct FrameConstantArena {
    slots: Vec<Mutex<ArenaSlot>>,
    capacity: usize,
    alignment: usize,
}

fn align_up(value: usize, alignment: usize) -> usize {
    (value + alignment - 1) & !(alignment - 1)
}

impl FrameConstantArena {
    /// `alignment` must be a power of two (checked by `Config::validate`)
    pub fn new(frames_in_flight: usize, capacity: usize, alignment: usize) -> Self {
        let slots = (0..frames_in_flight.max(1))
            .map(|_| Mutex::new(ArenaSlot { data: Vec::with_capacity(capacity) }))
            .collect();
        Self { slots, capacity, alignment: alignment.max(1).next_power_of_two() }
    }

    /// Copy `data` into the arena of `frame_slot`
    ///
    /// Called concurrently by pass workers; each slot has its own lock.
    pub fn push(&self, frame_slot: usize, data: &[u8]) -> Result<ConstantAllocation> {
        let slot = self.slots.get(frame_slot).ok_or_else(|| {
            Error::InvalidResource(format!("frame slot {} out of range", frame_slot))
        })?;
        let mut slot = slot.lock()?;

        let offset = align_up(slot.data.len(), self.alignment);
        if offset + data.len() > self.capacity {
            engine_error!("galaxy3d::FrameConstantArena",
                "Constant arena of slot {} exhausted ({} bytes)", frame_slot, self.capacity);
            return Err(Error::OutOfMemory);
        }
        slot.data.resize(offset, 0);
        slot.data.extend_from_slice(data);
        Ok(ConstantAllocation { frame_slot, offset, size: data.len() })
    }

    /// Bytes of a previous allocation (what a backend uploads)
    pub fn read(&self, allocation: &ConstantAllocation) -> Result<Vec<u8>> {
        let slot = self.slots.get(allocation.frame_slot).ok_or_else(|| {
            Error::InvalidResource(format!("frame slot {} out of range", allocation.frame_slot))
        })?;
        let slot = slot.lock()?;
        slot.data
            .get(allocation.offset..allocation.offset + allocation.size)
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| Error::InvalidResource("stale constant allocation".to_string()))
    }

    pub fn reset(&self, frame_slot: usize) -> Result<()> {
        if let Some(slot) = self.slots.get(frame_slot) {
            slot.lock()?.data.clear();
        }
        Ok(())
    }

    pub fn used(&self, frame_slot: usize) -> Result<usize> {
        match self.slots.get(frame_slot) {
            Some(slot) => Ok(slot.lock()?.data.len()),
            None => Ok(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }
}
