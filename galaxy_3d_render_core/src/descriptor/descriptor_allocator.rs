/// Fixed-capacity allocator of shader-visible descriptor slots.
///
/// Slots are handed out lowest-index-first so the live table stays dense.
/// Freed slots are reusable immediately; trailing unused slots are trimmed
/// from the live length. The capacity is fixed at construction and never
/// grows: running out of slots is an error.
///
/// # Example
///
/// ```ignore
/// let mut table = DescriptorAllocator::new(8);
/// let a = table.allocate(DescriptorKind::Texture2D, "albedo")?;  // 0
/// let b = table.allocate(DescriptorKind::Texture2D, "normal")?;  // 1
/// table.free(a)?;                                                // 0 is now free
/// let c = table.allocate(DescriptorKind::Buffer, "lights")?;     // 0 (reused)
/// ```

use crate::error::{Error, Result};
use crate::engine_error;

/// What a descriptor slot currently describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    Buffer,
    Texture2D,
    Texture3D,
    TextureCube,
    Unused,
}

/// One entry of the descriptor table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSlot {
    pub index: u32,
    pub kind: DescriptorKind,
    pub debug_name: String,
}

impl DescriptorSlot {
    fn unused(index: u32) -> Self {
        Self { index, kind: DescriptorKind::Unused, debug_name: String::new() }
    }

    pub fn is_unused(&self) -> bool {
        self.kind == DescriptorKind::Unused
    }
}

pub struct DescriptorAllocator {
    /// Live part of the table; the last slot is never unused
    slots: Vec<DescriptorSlot>,
    /// Lowest unused index (equals `slots.len()` when the live part is full)
    first_free: u32,
    live_count: u32,
    capacity: u32,
}

impl DescriptorAllocator {
    /// Create an empty table of `capacity` slots
    pub fn new(capacity: u32) -> Self {
        Self {
            slots: Vec::with_capacity(capacity as usize),
            first_free: 0,
            live_count: 0,
            capacity,
        }
    }

    /// Allocate the lowest free slot
    pub fn allocate(&mut self, kind: DescriptorKind, name: &str) -> Result<u32> {
        if kind == DescriptorKind::Unused {
            return Err(Error::InvalidResource(format!(
                "descriptor '{}' cannot be allocated as Unused", name
            )));
        }

        let index = self.first_free;
        if index as usize == self.slots.len() {
            if index >= self.capacity {
                engine_error!("galaxy3d::DescriptorAllocator",
                    "descriptor table full ({} slots), cannot allocate '{}'", self.capacity, name);
                return Err(Error::DescriptorTableFull { capacity: self.capacity });
            }
            self.slots.push(DescriptorSlot::unused(index));
        }

        let slot = &mut self.slots[index as usize];
        slot.kind = kind;
        slot.debug_name = name.to_string();
        self.live_count += 1;

        self.first_free = self.scan_unused_from(index + 1);
        Ok(index)
    }

    /// Release a slot for reuse
    pub fn free(&mut self, index: u32) -> Result<()> {
        match self.slots.get_mut(index as usize) {
            Some(slot) if !slot.is_unused() => {
                *slot = DescriptorSlot::unused(index);
            }
            _ => {
                return Err(Error::InvalidResource(format!(
                    "descriptor slot {} is not allocated", index
                )));
            }
        }
        self.live_count -= 1;
        self.first_free = self.first_free.min(index);

        while self.slots.last().is_some_and(DescriptorSlot::is_unused) {
            self.slots.pop();
        }
        self.first_free = self.first_free.min(self.slots.len() as u32);
        Ok(())
    }

    /// Next slot of `kind` after `from` (exclusive)
    pub fn next_of_kind(&self, from: u32, kind: DescriptorKind) -> Option<u32> {
        let start = from as usize + 1;
        self.slots
            .iter()
            .skip(start)
            .find(|slot| slot.kind == kind)
            .map(|slot| slot.index)
    }

    /// Previous slot of `kind` before `from` (exclusive)
    pub fn previous_of_kind(&self, from: u32, kind: DescriptorKind) -> Option<u32> {
        let end = (from as usize).min(self.slots.len());
        self.slots[..end]
            .iter()
            .rev()
            .find(|slot| slot.kind == kind)
            .map(|slot| slot.index)
    }

    pub fn slot(&self, index: u32) -> Option<&DescriptorSlot> {
        self.slots.get(index as usize)
    }

    /// Live table length (highest allocated index + 1)
    pub fn len(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of allocated slots
    pub fn live_count(&self) -> u32 {
        self.live_count
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn first_free(&self) -> u32 {
        self.first_free
    }

    fn scan_unused_from(&self, start: u32) -> u32 {
        self.slots
            .iter()
            .skip(start as usize)
            .find(|slot| slot.is_unused())
            .map(|slot| slot.index)
            .unwrap_or(self.slots.len() as u32)
    }
}

#[cfg(test)]
#[path = "descriptor_allocator_tests.rs"]
mod tests;
