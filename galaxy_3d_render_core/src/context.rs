/// RenderContext - owner of the process-wide render core state
///
/// Holds the descriptor table, the material library, the frame fences and
/// the per-frame constant arena. Only one context may be alive at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use crate::config::Config;
use crate::descriptor::ResourceTable;
use crate::error::{Error, Result};
use crate::frame::{FrameConstantArena, FrameFenceTracker};
use crate::graphics_device::GraphicsDevice;
use crate::material::MaterialLibrary;
use crate::pipeline::ReloadReport;
use crate::render_queue::RenderQueue;
use crate::scene::Scene;
use crate::scheduler::FrameContext;
use crate::shader::ShaderStageInfo;
use crate::{engine_error, engine_info};

const SOURCE: &str = "galaxy3d::RenderContext";

static CONTEXT_ALIVE: AtomicBool = AtomicBool::new(false);

pub struct RenderContext {
    device: Arc<dyn GraphicsDevice>,
    config: Config,
    resources: ResourceTable,
    materials: Arc<RwLock<MaterialLibrary>>,
    fences: FrameFenceTracker,
    arena: Arc<FrameConstantArena>,
    frame: u64,
}

impl RenderContext {
    pub fn new(device: Arc<dyn GraphicsDevice>, config: Config) -> Result<Self> {
        config.validate()?;
        if CONTEXT_ALIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::InvariantViolation("a RenderContext is already alive".to_string()));
        }

        match Self::create(device, config) {
            Ok(context) => Ok(context),
            Err(error) => {
                CONTEXT_ALIVE.store(false, Ordering::Release);
                Err(error)
            }
        }
    }

    fn create(device: Arc<dyn GraphicsDevice>, config: Config) -> Result<Self> {
        let resources = ResourceTable::new(device.clone(), config.descriptor_capacity)?;
        let materials = MaterialLibrary::new(device.clone(), config.root_constant_budget_dwords);
        let fences = FrameFenceTracker::new(device.as_ref(), config.frames_in_flight, config.fence_wait_timeout)?;
        let arena = FrameConstantArena::new(
            config.frames_in_flight,
            config.constant_arena_bytes_per_frame,
            config.constant_alignment,
        );
        engine_info!(SOURCE, "Render context '{}' created ({} frames in flight, {} descriptors)",
            config.app_name, config.frames_in_flight, config.descriptor_capacity);
        Ok(Self {
            device,
            config,
            resources,
            materials: Arc::new(RwLock::new(materials)),
            fences,
            arena: Arc::new(arena),
            frame: 0,
        })
    }

    // ===== FRAME =====

    /// Start a frame: wait for its slot to be free and reset the slot's arena
    pub fn begin_frame(&mut self) -> Result<FrameContext> {
        let frame_slot = if self.frame == 0 {
            self.fences.current_slot()
        } else {
            self.fences.move_to_next()?
        };
        self.arena.reset(frame_slot)?;
        self.frame += 1;
        Ok(FrameContext { frame: self.frame, frame_slot })
    }

    /// Mark the end of the frame's submissions; returns the fence value signaled
    pub fn end_frame(&mut self) -> Result<u64> {
        self.fences.signal_current(self.device.as_ref())
    }

    /// Block until the GPU finished every submitted frame
    pub fn wait_idle(&self) -> Result<()> {
        self.fences.wait_for_all()
    }

    // ===== SCENE / MATERIALS =====

    /// Feed pending scene changes to `queues`, then let the scene apply them
    ///
    /// Stops at the first change a queue rejects: the changes before it are
    /// consumed, that change and the later ones stay pending for a retry.
    /// Must not run while pass workers are recording.
    pub fn apply_scene_changes(&mut self, scene: &mut Scene, queues: &mut [&mut RenderQueue]) -> Result<()> {
        let mut applied = 0;
        let mut result = Ok(());
        {
            let mut materials = self.materials.write()?;
            'changes: for change in scene.pending_changes() {
                for queue in queues.iter_mut() {
                    if let Err(error) = queue.update(change, scene, &mut materials, &self.resources) {
                        engine_error!(SOURCE, "Scene change {:?} rejected: {}", change.kind, error);
                        result = Err(error);
                        break 'changes;
                    }
                }
                applied += 1;
            }
        }
        scene.take_applied_changes(applied);
        result
    }

    /// Replace shader stages and rebuild every cached pipeline
    pub fn reload_shaders(&mut self, stages: Vec<ShaderStageInfo>) -> Result<ReloadReport> {
        Ok(self.materials.write()?.reload_shaders(stages))
    }

    // ===== ACCESSORS =====

    pub fn device(&self) -> &Arc<dyn GraphicsDevice> {
        &self.device
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    /// Descriptor allocation happens on the orchestrator thread only
    pub fn resources_mut(&mut self) -> &mut ResourceTable {
        &mut self.resources
    }

    pub fn materials(&self) -> Arc<RwLock<MaterialLibrary>> {
        self.materials.clone()
    }

    pub fn constant_arena(&self) -> Arc<FrameConstantArena> {
        self.arena.clone()
    }

    pub fn fences(&self) -> &FrameFenceTracker {
        &self.fences
    }

    /// Number of the last frame started (0 before the first)
    pub fn frame_number(&self) -> u64 {
        self.frame
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        if let Err(error) = self.fences.wait_for_all() {
            engine_error!(SOURCE, "Failed to drain frames on shutdown: {}", error);
        }
        CONTEXT_ALIVE.store(false, Ordering::Release);
        engine_info!(SOURCE, "Render context destroyed");
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
