/// Pass recording interface implemented by every scheduled pass

use crate::error::Result;
use crate::graphics_device::CommandList;
use super::resource_state::ResourceUsage;

/// Frame a pass records for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameContext {
    /// Monotonic frame number, starting at 1
    pub frame: u64,
    /// Frame-in-flight slot whose allocators and arena the frame uses
    pub frame_slot: usize,
}

/// Pass-specific recording, run on the pass's worker thread
///
/// The worker resets the command list and records resource transitions
/// before calling `record`, and closes the list afterwards.
pub trait PassRecorder: Send {
    fn name(&self) -> &str;

    /// Record the pass content
    fn record(&mut self, frame: &FrameContext, cmd: &mut dyn CommandList) -> Result<()>;

    /// False when nothing changed since the last recording; content recording is skipped
    fn has_changes(&self) -> bool {
        true
    }

    /// Resources and the states this pass needs them in
    fn resource_usages(&self) -> Vec<ResourceUsage> {
        Vec::new()
    }
}
