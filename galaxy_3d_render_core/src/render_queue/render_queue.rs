/// RenderQueue - sorted draw list of one pass and one render order
///
/// Entries are kept sorted by (signature id, assigned material id) so that
/// consecutive draws share as much bound state as possible. The queue reacts
/// to scene change events and records draws into a pass's command list.

use std::sync::Arc;
use crate::descriptor::ResourceTable;
use crate::error::{Error, Result};
use crate::frame::FrameConstantArena;
use crate::graphics_device::{CommandList, TargetFormats};
use crate::material::{AssignedMaterial, AssignedMaterialId, FrameParams, MaterialLibrary, ObjectParams};
use crate::pipeline::{PipelineCache, Technique};
use crate::scene::{EntityKey, RenderOrder, Scene, SceneChange, SceneChangeKind, VisibilitySet};
use crate::shader::SignatureId;
use crate::{engine_trace, engine_warn};

const SOURCE: &str = "galaxy3d::RenderQueue";

/// One drawable entity and the material state it is drawn with
#[derive(Clone)]
pub struct QueueEntry {
    pub entity: EntityKey,
    pub assigned: Arc<AssignedMaterial>,
}

impl QueueEntry {
    pub fn sort_key(&self) -> (SignatureId, AssignedMaterialId) {
        (self.assigned.instance.signature.id, self.assigned.id)
    }
}

/// Counters of one `render_objects` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub draws: u32,
    pub pipeline_binds: u32,
    pub signature_binds: u32,
}

pub struct RenderQueue {
    order: RenderOrder,
    technique: Technique,
    targets: TargetFormats,
    entries: Vec<QueueEntry>,
    /// Descriptor index written into `voxel_buffer` fields by voxelize passes
    voxel_buffer: u32,
}

impl RenderQueue {
    pub fn new(order: RenderOrder, technique: Technique, targets: TargetFormats) -> Self {
        Self {
            order,
            technique,
            targets,
            entries: Vec::new(),
            voxel_buffer: 0,
        }
    }

    pub fn order(&self) -> RenderOrder {
        self.order
    }

    pub fn technique(&self) -> Technique {
        self.technique
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn set_voxel_buffer(&mut self, descriptor_index: u32) {
        self.voxel_buffer = descriptor_index;
    }

    // ===== SCENE CHANGES =====

    /// Apply one scene change event
    ///
    /// Must run before `Scene::take_changes` so deleted entities are still readable.
    pub fn update(
        &mut self,
        change: &SceneChange,
        scene: &Scene,
        materials: &mut MaterialLibrary,
        resources: &ResourceTable,
    ) -> Result<()> {
        if change.order != self.order {
            return Ok(());
        }
        match change.kind {
            SceneChangeKind::Add(key) => self.add(key, scene, materials, resources),
            SceneChangeKind::Delete(key) => {
                if let Some(position) = self.entries.iter().position(|entry| entry.entity == key) {
                    self.entries.remove(position);
                }
                Ok(())
            }
            SceneChangeKind::DeleteAll => {
                self.entries.clear();
                Ok(())
            }
        }
    }

    fn add(
        &mut self,
        key: EntityKey,
        scene: &Scene,
        materials: &mut MaterialLibrary,
        resources: &ResourceTable,
    ) -> Result<()> {
        let Some(entity) = scene.entity(key) else {
            engine_warn!(SOURCE, "Add event for unknown entity {:?}", key);
            return Ok(());
        };
        // Replayed after a partially applied batch
        if self.entries.iter().any(|entry| entry.entity == key) {
            return Ok(());
        }
        let Some(instance) = materials.resolve_for_technique(
            &entity.material,
            self.technique,
            entity.geometry.is_instanced(),
            resources,
        )?
        else {
            engine_trace!(SOURCE, "'{}' skips {:?}", entity.name, self.technique);
            return Ok(());
        };
        let assigned = materials.assign(&instance, &entity.geometry.layout, &self.targets, self.technique)?;

        let entry = QueueEntry { entity: key, assigned };
        let sort_key = entry.sort_key();
        let position = self.entries.partition_point(|existing| existing.sort_key() <= sort_key);
        self.entries.insert(position, entry);
        Ok(())
    }

    // ===== RECORDING =====

    /// Record draws of every visible entry into `cmd`
    ///
    /// Signature and material state are bound only when they change between
    /// consecutive entries; per-object constants are written for every draw.
    #[allow(clippy::too_many_arguments)]
    pub fn render_objects(
        &self,
        cmd: &mut dyn CommandList,
        scene: &Scene,
        visibility: &VisibilitySet,
        pipelines: &PipelineCache,
        frame: &FrameParams,
        arena: &FrameConstantArena,
        frame_slot: usize,
    ) -> Result<DrawStats> {
        let mut stats = DrawStats::default();
        let mut bound_signature: Option<SignatureId> = None;
        let mut bound_material: Option<AssignedMaterialId> = None;
        let mut constants = Vec::new();

        for entry in &self.entries {
            let Some(entity) = scene.entity(entry.entity) else {
                continue;
            };
            if !visibility.is_visible(entity.id) {
                continue;
            }
            let assigned = &entry.assigned;
            let instance = &assigned.instance;
            let signature = &instance.signature;

            if bound_signature != Some(signature.id) {
                // Texture slots and bindless indices both address the table
                cmd.bind_signature(&signature.root)?;
                cmd.bind_descriptor_table()?;
                bound_signature = Some(signature.id);
                bound_material = None;
                stats.signature_binds += 1;
            }

            if bound_material != Some(assigned.id) {
                let pipeline = pipelines.pipeline(assigned.pipeline).ok_or_else(|| {
                    Error::InvalidResource(format!("pipeline of '{}' no longer cached", instance.name))
                })?;
                cmd.bind_pipeline(&pipeline)?;
                for texture in &instance.textures {
                    cmd.bind_texture(texture.root_index, texture.descriptor_index)?;
                }
                bound_material = Some(assigned.id);
                stats.pipeline_binds += 1;
            }

            let mut object = ObjectParams { world: entity.transform, ..ObjectParams::default() };
            match self.technique {
                Technique::Picking => object.entity_id = entity.id,
                Technique::Voxelize => object.voxel_buffer = self.voxel_buffer,
                _ => {}
            }
            for (index, buffer) in instance.buffers.iter().enumerate() {
                instance.fill_buffer(index, frame, &object, &mut constants);
                if buffer.inline {
                    cmd.set_inline_constants(buffer.root_index, &constants)?;
                } else {
                    let allocation = arena.push(frame_slot, &constants)?;
                    cmd.bind_constant_buffer(buffer.root_index, allocation)?;
                }
            }

            let geometry = &entity.geometry;
            let instance_count = geometry.instance_count.max(1);
            cmd.bind_vertex_buffer(0, &geometry.vertex_buffer, geometry.layout.stride())?;
            match &geometry.index_buffer {
                Some((buffer, index_type)) => {
                    cmd.bind_index_buffer(buffer, *index_type)?;
                    cmd.draw_indexed(geometry.index_count, instance_count, 0, 0)?;
                }
                None => cmd.draw(geometry.vertex_count, instance_count, 0)?,
            }
            stats.draws += 1;
        }
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "render_queue_tests.rs"]
mod tests;
