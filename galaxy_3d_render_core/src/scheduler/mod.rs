//! Scheduler module - parallel per-pass command recording.

mod frame_signal;
mod pass_recorder;
mod resource_state;
mod scene_pass;
mod scheduler;

pub use frame_signal::FrameSignal;
pub use pass_recorder::{FrameContext, PassRecorder};
pub use resource_state::{ResourceStateTracker, ResourceUsage};
pub use scene_pass::{PassTargets, ScenePass};
pub use scheduler::{ParallelRecordingScheduler, PassId, SubmissionSlot};
