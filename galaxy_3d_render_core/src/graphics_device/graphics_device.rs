/// GraphicsDevice trait - backend factory and submission interface

use std::sync::Arc;
use crate::error::Result;
use crate::descriptor::DescriptorKind;
use crate::graphics_device::{CommandList, Fence, Pipeline, PipelineDesc, RootSignature};
use crate::shader::SignatureInfo;

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// Backend device: creates GPU objects and executes recorded command lists
///
/// The render core shares one device between the orchestrator and every pass
/// worker through `Arc<dyn GraphicsDevice>`, so every method takes `&self`
/// and implementations synchronize internally.
pub trait GraphicsDevice: Send + Sync {
    /// Create the backend root signature of a merged material signature
    fn create_root_signature(&self, info: &SignatureInfo) -> Result<Arc<dyn RootSignature>>;

    /// Create a graphics pipeline
    fn create_pipeline(&self, desc: &PipelineDesc) -> Result<Arc<dyn Pipeline>>;

    /// Create a command list with one command allocator per frame-in-flight slot
    fn create_command_list(&self, debug_name: &str, frames_in_flight: usize) -> Result<Box<dyn CommandList>>;

    /// Create a fence starting at `initial_value`
    fn create_fence(&self, initial_value: u64) -> Result<Arc<dyn Fence>>;

    /// Write a view into the shader-visible descriptor table
    fn write_descriptor(&self, index: u32, kind: DescriptorKind, name: &str) -> Result<()>;

    /// Clear a descriptor table entry
    fn clear_descriptor(&self, index: u32) -> Result<()>;

    /// Submit command lists for execution, in slice order
    fn submit(&self, command_lists: &[&dyn CommandList]) -> Result<()>;

    /// Ask the GPU queue to set `fence` to `value` once prior work completes
    fn signal(&self, fence: &Arc<dyn Fence>, value: u64) -> Result<()>;

    /// Wait for the GPU queue to be idle
    fn wait_idle(&self) -> Result<()>;
}
