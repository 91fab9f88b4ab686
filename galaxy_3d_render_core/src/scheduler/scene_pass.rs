/// ScenePass - pass recorder drawing one RenderQueue from a camera
///
/// Culls the scene against the camera frustum, binds and clears the pass
/// targets, then records the queue. The scene, material library and queue
/// are shared with the orchestrator, which only writes them between frames.

use std::sync::{Arc, RwLock};
use crate::camera::Camera;
use crate::error::Result;
use crate::frame::FrameConstantArena;
use crate::graphics_device::{CommandList, ResourceId, ResourceState};
use crate::material::{FrameParams, MaterialLibrary};
use crate::render_queue::{DrawStats, RenderQueue};
use crate::scene::{Scene, VisibilitySet};
use crate::engine_trace;
use super::pass_recorder::{FrameContext, PassRecorder};
use super::resource_state::ResourceUsage;

/// Render targets of a pass and how they are cleared
#[derive(Debug, Clone, Default)]
pub struct PassTargets {
    pub colors: Vec<ResourceId>,
    pub depth: Option<ResourceId>,
    pub clear_color: Option<[f32; 4]>,
    pub clear_depth: Option<f32>,
}

pub struct ScenePass {
    name: String,
    scene: Arc<RwLock<Scene>>,
    materials: Arc<RwLock<MaterialLibrary>>,
    queue: Arc<RwLock<RenderQueue>>,
    arena: Arc<FrameConstantArena>,
    camera: Arc<RwLock<Camera>>,
    frame_params: Arc<RwLock<FrameParams>>,
    targets: PassTargets,
    visibility: VisibilitySet,
    last_stats: Arc<RwLock<DrawStats>>,
}

impl ScenePass {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        scene: Arc<RwLock<Scene>>,
        materials: Arc<RwLock<MaterialLibrary>>,
        queue: Arc<RwLock<RenderQueue>>,
        arena: Arc<FrameConstantArena>,
        camera: Arc<RwLock<Camera>>,
        frame_params: Arc<RwLock<FrameParams>>,
        targets: PassTargets,
    ) -> Self {
        Self {
            name: name.to_string(),
            scene,
            materials,
            queue,
            arena,
            camera,
            frame_params,
            targets,
            visibility: VisibilitySet::new(),
            last_stats: Arc::new(RwLock::new(DrawStats::default())),
        }
    }

    /// Counters of the most recent recording, readable from other threads
    pub fn stats_handle(&self) -> Arc<RwLock<DrawStats>> {
        self.last_stats.clone()
    }
}

impl PassRecorder for ScenePass {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource_usages(&self) -> Vec<ResourceUsage> {
        let mut usages: Vec<ResourceUsage> = self
            .targets
            .colors
            .iter()
            .map(|&target| ResourceUsage::new(target, ResourceState::RenderTarget))
            .collect();
        if let Some(depth) = self.targets.depth {
            usages.push(ResourceUsage::new(depth, ResourceState::DepthWrite));
        }
        usages
    }

    fn record(&mut self, frame: &FrameContext, cmd: &mut dyn CommandList) -> Result<()> {
        let camera = self.camera.read()?.clone();
        let mut params = *self.frame_params.read()?;
        params.view_proj = camera.view_projection_matrix();
        params.inv_viewport_size = camera.inv_viewport_size();

        let scene = self.scene.read()?;
        self.visibility.cull(&scene, &camera.frustum());

        cmd.set_render_targets(&self.targets.colors, self.targets.depth)?;
        if let Some(color) = self.targets.clear_color {
            for &target in &self.targets.colors {
                cmd.clear_color(target, color)?;
            }
        }
        if let (Some(depth), Some(value)) = (self.targets.depth, self.targets.clear_depth) {
            cmd.clear_depth(depth, value)?;
        }
        cmd.set_viewport(*camera.viewport())?;
        cmd.set_scissor(camera.effective_scissor())?;

        let materials = self.materials.read()?;
        let queue = self.queue.read()?;
        let stats = queue.render_objects(
            cmd,
            &scene,
            &self.visibility,
            materials.pipelines(),
            &params,
            &self.arena,
            frame.frame_slot,
        )?;
        engine_trace!("galaxy3d::ScenePass", "'{}' frame {}: {} draws, {} visible",
            self.name, frame.frame, stats.draws, self.visibility.count());
        *self.last_stats.write()? = stats;
        Ok(())
    }
}
