/// Mock graphics device for unit tests (no GPU required)
///
/// Records every command as a string so tests can assert on recorded
/// streams, counts live pipelines, and exposes fences that complete either
/// immediately on signal or when the test advances them by hand.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, Weak};
use std::time::Duration;
use rustc_hash::FxHashMap;

use crate::descriptor::DescriptorKind;
use crate::error::Result;
use crate::frame::ConstantAllocation;
use crate::graphics_device::{
    Buffer, CommandList, Fence, GraphicsDevice, IndexType, Pipeline, PipelineDesc,
    Rect2D, ResourceId, RootSignature, Transition, Viewport,
};
use crate::shader::SignatureInfo;
use crate::engine_bail;

// ============================================================================
// Mock Buffer
// ============================================================================

#[derive(Debug)]
pub struct MockBuffer {
    pub size: u64,
    pub name: String,
}

impl MockBuffer {
    pub fn new(size: u64, name: &str) -> Self {
        Self { size, name: name.to_string() }
    }
}

impl Buffer for MockBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        if offset + data.len() as u64 > self.size {
            engine_bail!("galaxy3d::MockBuffer", "write past end of buffer '{}'", self.name);
        }
        Ok(())
    }
}

// ============================================================================
// Mock RootSignature / Pipeline
// ============================================================================

#[derive(Debug)]
pub struct MockRootSignature {
    pub name: String,
}

impl RootSignature for MockRootSignature {
    fn debug_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug)]
pub struct MockPipeline {
    pub name: String,
    /// Creation order across the whole device, starting at 1
    pub serial: usize,
    pub desc_summary: String,
}

impl Pipeline for MockPipeline {
    fn debug_name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

/// Command list that logs every call as a string
///
/// On `close` the recorded commands are published to the shared log of the
/// device that created it (if any), keyed by the list's name.
pub struct MockCommandList {
    pub name: String,
    pub commands: Vec<String>,
    pub frame_slot: Option<usize>,
    published: Option<Arc<Mutex<FxHashMap<String, Vec<String>>>>>,
}

impl MockCommandList {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            commands: Vec::new(),
            frame_slot: None,
            published: None,
        }
    }

    /// Commands starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.commands.iter().filter(|command| command.starts_with(prefix)).count()
    }
}

impl CommandList for MockCommandList {
    fn debug_name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self, frame_slot: usize) -> Result<()> {
        self.commands.clear();
        self.frame_slot = Some(frame_slot);
        self.commands.push(format!("reset:{}", frame_slot));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.commands.push("close".to_string());
        if let Some(published) = &self.published {
            published.lock()?.insert(self.name.clone(), self.commands.clone());
        }
        Ok(())
    }

    fn resource_barrier(&mut self, transitions: &[Transition]) -> Result<()> {
        for transition in transitions {
            self.commands.push(format!(
                "barrier:{}:{:?}->{:?}",
                transition.resource.0, transition.before, transition.after
            ));
        }
        Ok(())
    }

    fn set_render_targets(&mut self, colors: &[ResourceId], depth: Option<ResourceId>) -> Result<()> {
        self.commands.push(format!(
            "set_render_targets:{}:{}",
            colors.len(),
            depth.map(|id| id.0.to_string()).unwrap_or_else(|| "none".to_string())
        ));
        Ok(())
    }

    fn clear_color(&mut self, target: ResourceId, _color: [f32; 4]) -> Result<()> {
        self.commands.push(format!("clear_color:{}", target.0));
        Ok(())
    }

    fn clear_depth(&mut self, target: ResourceId, _depth: f32) -> Result<()> {
        self.commands.push(format!("clear_depth:{}", target.0));
        Ok(())
    }

    fn set_viewport(&mut self, _viewport: Viewport) -> Result<()> {
        self.commands.push("set_viewport".to_string());
        Ok(())
    }

    fn set_scissor(&mut self, _scissor: Rect2D) -> Result<()> {
        self.commands.push("set_scissor".to_string());
        Ok(())
    }

    fn bind_signature(&mut self, signature: &Arc<dyn RootSignature>) -> Result<()> {
        self.commands.push(format!("bind_signature:{}", signature.debug_name()));
        Ok(())
    }

    fn bind_descriptor_table(&mut self) -> Result<()> {
        self.commands.push("bind_descriptor_table".to_string());
        Ok(())
    }

    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()> {
        self.commands.push(format!("bind_pipeline:{}", pipeline.debug_name()));
        Ok(())
    }

    fn bind_texture(&mut self, root_index: u32, descriptor_index: u32) -> Result<()> {
        self.commands.push(format!("bind_texture:{}:{}", root_index, descriptor_index));
        Ok(())
    }

    fn set_inline_constants(&mut self, root_index: u32, data: &[u8]) -> Result<()> {
        self.commands.push(format!("set_inline_constants:{}:{}", root_index, data.len()));
        Ok(())
    }

    fn bind_constant_buffer(&mut self, root_index: u32, allocation: ConstantAllocation) -> Result<()> {
        self.commands.push(format!(
            "bind_constant_buffer:{}:{}:{}",
            root_index, allocation.frame_slot, allocation.offset
        ));
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, slot: u32, _buffer: &Arc<dyn Buffer>, stride: u32) -> Result<()> {
        self.commands.push(format!("bind_vertex_buffer:{}:{}", slot, stride));
        Ok(())
    }

    fn bind_index_buffer(&mut self, _buffer: &Arc<dyn Buffer>, index_type: IndexType) -> Result<()> {
        self.commands.push(format!("bind_index_buffer:{:?}", index_type));
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, instance_count: u32, _first_vertex: u32) -> Result<()> {
        self.commands.push(format!("draw:{}:{}", vertex_count, instance_count));
        Ok(())
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        _first_index: u32,
        _vertex_offset: i32,
    ) -> Result<()> {
        self.commands.push(format!("draw_indexed:{}:{}", index_count, instance_count));
        Ok(())
    }
}

// ============================================================================
// Mock Fence
// ============================================================================

/// Fence backed by a mutex and a condition variable
pub struct MockFence {
    completed: Mutex<u64>,
    changed: Condvar,
    /// Highest value signaled by the device (reached or not)
    signaled: Mutex<u64>,
}

impl MockFence {
    pub fn new(initial_value: u64) -> Self {
        Self {
            completed: Mutex::new(initial_value),
            changed: Condvar::new(),
            signaled: Mutex::new(initial_value),
        }
    }

    /// Advance the completed value (simulates the GPU finishing work)
    pub fn complete(&self, value: u64) {
        if let Ok(mut completed) = self.completed.lock() {
            if value > *completed {
                *completed = value;
            }
            self.changed.notify_all();
        }
    }

    /// Complete everything signaled so far
    pub fn complete_signaled(&self) {
        let signaled = self.signaled.lock().map(|value| *value).unwrap_or(0);
        self.complete(signaled);
    }

    pub fn signaled_value(&self) -> u64 {
        self.signaled.lock().map(|value| *value).unwrap_or(0)
    }
}

impl Fence for MockFence {
    fn completed_value(&self) -> u64 {
        self.completed.lock().map(|value| *value).unwrap_or(0)
    }

    fn wait(&self, value: u64, timeout: Duration) -> Result<bool> {
        let completed = self.completed.lock()?;
        let (completed, _) = self
            .changed
            .wait_timeout_while(completed, timeout, |completed| *completed < value)?;
        Ok(*completed >= value)
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// Graphics device double
pub struct MockGraphicsDevice {
    /// Fences complete as soon as they are signaled
    auto_complete: AtomicBool,
    fail_next_pipeline: AtomicBool,
    pipelines_created: AtomicUsize,
    signatures_created: AtomicUsize,
    live_pipelines: Mutex<Vec<Weak<MockPipeline>>>,
    fences: Mutex<Vec<Arc<MockFence>>>,
    descriptors: Mutex<FxHashMap<u32, (DescriptorKind, String)>>,
    published: Arc<Mutex<FxHashMap<String, Vec<String>>>>,
    submissions: Mutex<Vec<Vec<String>>>,
    wait_idle_calls: AtomicUsize,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            auto_complete: AtomicBool::new(true),
            fail_next_pipeline: AtomicBool::new(false),
            pipelines_created: AtomicUsize::new(0),
            signatures_created: AtomicUsize::new(0),
            live_pipelines: Mutex::new(Vec::new()),
            fences: Mutex::new(Vec::new()),
            descriptors: Mutex::new(FxHashMap::default()),
            published: Arc::new(Mutex::new(FxHashMap::default())),
            submissions: Mutex::new(Vec::new()),
            wait_idle_calls: AtomicUsize::new(0),
        }
    }

    /// Device whose fences only advance through `MockFence::complete`
    pub fn with_manual_fences() -> Self {
        let device = Self::new();
        device.auto_complete.store(false, Ordering::SeqCst);
        device
    }

    /// Make the next `create_pipeline` call fail
    pub fn fail_next_pipeline(&self) {
        self.fail_next_pipeline.store(true, Ordering::SeqCst);
    }

    pub fn pipelines_created(&self) -> usize {
        self.pipelines_created.load(Ordering::SeqCst)
    }

    pub fn signatures_created(&self) -> usize {
        self.signatures_created.load(Ordering::SeqCst)
    }

    /// Pipelines still referenced by someone
    pub fn live_pipeline_count(&self) -> usize {
        self.live_pipelines
            .lock()
            .map(|pipelines| pipelines.iter().filter(|weak| weak.strong_count() > 0).count())
            .unwrap_or(0)
    }

    /// Fences created by this device, in creation order
    pub fn fences(&self) -> Vec<Arc<MockFence>> {
        self.fences.lock().map(|fences| fences.clone()).unwrap_or_default()
    }

    pub fn descriptor(&self, index: u32) -> Option<(DescriptorKind, String)> {
        self.descriptors.lock().ok().and_then(|descriptors| descriptors.get(&index).cloned())
    }

    /// Commands of the last closed recording of the named list
    pub fn recorded_commands(&self, list_name: &str) -> Vec<String> {
        self.published
            .lock()
            .ok()
            .and_then(|published| published.get(list_name).cloned())
            .unwrap_or_default()
    }

    /// Names of the lists of every submitted batch
    pub fn submissions(&self) -> Vec<Vec<String>> {
        self.submissions.lock().map(|batches| batches.clone()).unwrap_or_default()
    }

    pub fn wait_idle_calls(&self) -> usize {
        self.wait_idle_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_root_signature(&self, info: &SignatureInfo) -> Result<Arc<dyn RootSignature>> {
        self.signatures_created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockRootSignature { name: info.name.clone() }))
    }

    fn create_pipeline(&self, desc: &PipelineDesc) -> Result<Arc<dyn Pipeline>> {
        if self.fail_next_pipeline.swap(false, Ordering::SeqCst) {
            engine_bail!("galaxy3d::MockGraphicsDevice", "pipeline '{}' rejected by driver", desc.debug_name);
        }
        let serial = self.pipelines_created.fetch_add(1, Ordering::SeqCst) + 1;
        let pipeline = Arc::new(MockPipeline {
            name: desc.debug_name.clone(),
            serial,
            desc_summary: format!(
                "{:?}/{:?}/{}",
                desc.rasterization.cull_mode,
                desc.depth_stencil.depth_compare_op,
                desc.color_blend.blend_enable
            ),
        });
        self.live_pipelines.lock()?.push(Arc::downgrade(&pipeline));
        Ok(pipeline)
    }

    fn create_command_list(&self, debug_name: &str, _frames_in_flight: usize) -> Result<Box<dyn CommandList>> {
        let mut list = MockCommandList::new(debug_name);
        list.published = Some(self.published.clone());
        Ok(Box::new(list))
    }

    fn create_fence(&self, initial_value: u64) -> Result<Arc<dyn Fence>> {
        let fence = Arc::new(MockFence::new(initial_value));
        self.fences.lock()?.push(fence.clone());
        Ok(fence)
    }

    fn write_descriptor(&self, index: u32, kind: DescriptorKind, name: &str) -> Result<()> {
        self.descriptors.lock()?.insert(index, (kind, name.to_string()));
        Ok(())
    }

    fn clear_descriptor(&self, index: u32) -> Result<()> {
        self.descriptors.lock()?.remove(&index);
        Ok(())
    }

    fn submit(&self, command_lists: &[&dyn CommandList]) -> Result<()> {
        let names = command_lists.iter().map(|list| list.debug_name().to_string()).collect();
        self.submissions.lock()?.push(names);
        Ok(())
    }

    fn signal(&self, fence: &Arc<dyn Fence>, value: u64) -> Result<()> {
        let target = Arc::as_ptr(fence) as *const ();
        let fences = self.fences.lock()?;
        let Some(mock) = fences.iter().find(|mock| Arc::as_ptr(mock) as *const () == target) else {
            engine_bail!("galaxy3d::MockGraphicsDevice", "fence was not created by this device");
        };
        *mock.signaled.lock()? = value;
        if self.auto_complete.load(Ordering::SeqCst) {
            mock.complete(value);
        }
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        self.wait_idle_calls.fetch_add(1, Ordering::SeqCst);
        if self.auto_complete.load(Ordering::SeqCst) {
            for fence in self.fences.lock()?.iter() {
                fence.complete_signaled();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
