/// CommandList trait - for recording rendering commands

use std::sync::Arc;
use crate::error::Result;
use crate::frame::ConstantAllocation;
use crate::graphics_device::{
    Buffer, IndexType, Pipeline, ResourceId, RootSignature, Transition,
};

/// Command list for recording rendering commands
///
/// One command list belongs to one pass. The backend keeps one command
/// allocator per frame-in-flight slot inside the list; `reset` selects the
/// allocator of the slot being recorded. Recorded lists are handed to
/// `GraphicsDevice::submit`.
pub trait CommandList: Send + Sync {
    /// Name used for debug labels and command logs
    fn debug_name(&self) -> &str;

    /// Begin recording for the given frame-in-flight slot
    fn reset(&mut self, frame_slot: usize) -> Result<()>;

    /// Finish recording
    fn close(&mut self) -> Result<()>;

    /// Record resource state transitions
    fn resource_barrier(&mut self, transitions: &[Transition]) -> Result<()>;

    /// Bind color targets and an optional depth target
    fn set_render_targets(&mut self, colors: &[ResourceId], depth: Option<ResourceId>) -> Result<()>;

    /// Clear a color target
    fn clear_color(&mut self, target: ResourceId, color: [f32; 4]) -> Result<()>;

    /// Clear a depth target
    fn clear_depth(&mut self, target: ResourceId, depth: f32) -> Result<()>;

    /// Set the viewport
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Set the scissor rectangle
    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()>;

    /// Bind a root signature
    fn bind_signature(&mut self, signature: &Arc<dyn RootSignature>) -> Result<()>;

    /// Bind the shader-visible descriptor table
    fn bind_descriptor_table(&mut self) -> Result<()>;

    /// Bind a graphics pipeline
    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()>;

    /// Point a texture root parameter at a descriptor table entry
    fn bind_texture(&mut self, root_index: u32, descriptor_index: u32) -> Result<()>;

    /// Write inline (root) constants
    ///
    /// # Arguments
    ///
    /// * `root_index` - Root parameter index of the inline buffer
    /// * `data` - Constant bytes, a multiple of 4 bytes long
    fn set_inline_constants(&mut self, root_index: u32, data: &[u8]) -> Result<()>;

    /// Bind a constant buffer allocated in the frame constant arena
    fn bind_constant_buffer(&mut self, root_index: u32, allocation: ConstantAllocation) -> Result<()>;

    /// Bind a vertex buffer
    fn bind_vertex_buffer(&mut self, slot: u32, buffer: &Arc<dyn Buffer>, stride: u32) -> Result<()>;

    /// Bind an index buffer
    fn bind_index_buffer(&mut self, buffer: &Arc<dyn Buffer>, index_type: IndexType) -> Result<()>;

    /// Draw non-indexed vertices
    fn draw(&mut self, vertex_count: u32, instance_count: u32, first_vertex: u32) -> Result<()>;

    /// Draw indexed vertices
    ///
    /// # Arguments
    ///
    /// * `index_count` - Number of indices to draw
    /// * `instance_count` - Number of instances
    /// * `first_index` - Index of first index
    /// * `vertex_offset` - Value added to vertex index before indexing into the vertex buffer
    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
    ) -> Result<()>;
}

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-target viewport with a [0, 1] depth range
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// 2D rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}
