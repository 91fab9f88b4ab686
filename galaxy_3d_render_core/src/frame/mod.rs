//! Frame module - frame-in-flight fences and per-frame constant storage.

mod fence_tracker;
mod constant_arena;

pub use fence_tracker::FrameFenceTracker;
pub use constant_arena::{ConstantAllocation, FrameConstantArena};
