/// Pipeline state cache
///
/// Pipelines live in a slot-map arena. Holders keep a `PipelineKey` and
/// look the pipeline up at bind time, so a hot reload only replaces arena
/// payloads: nothing that holds a key has to be remapped.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, Pipeline, PipelineDesc, PrimitiveTopology, TargetFormats, VertexLayout,
};
use crate::pipeline::{layout_hash, MaterialFlags, RenderState, Technique};
use crate::shader::{ShaderLibrary, Signature, SignatureId};
use crate::{engine_debug, engine_error, engine_info};

new_key_type! {
    /// Stable key of a cached pipeline
    pub struct PipelineKey;
}

/// Cached pipeline and everything needed to rebuild it
pub struct PipelineStateEntry {
    pub signature: Arc<Signature>,
    pub layout_hash: u64,
    pub layout: VertexLayout,
    pub targets: TargetFormats,
    pub technique: Technique,
    pub flags: MaterialFlags,
    pub pipeline: Arc<dyn Pipeline>,
    /// Number of successful rebuilds
    pub generation: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    signature: SignatureId,
    layout_hash: u64,
    targets: TargetFormats,
    technique: Technique,
    flags: MaterialFlags,
}

/// Outcome of a hot reload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadReport {
    pub rebuilt: usize,
    /// Entries that kept their previous pipeline
    pub failed: usize,
    /// Replacement stages refused because their interface changed
    pub rejected_stages: usize,
}

pub struct PipelineCache {
    device: Arc<dyn GraphicsDevice>,
    entries: SlotMap<PipelineKey, PipelineStateEntry>,
    lookup: FxHashMap<CacheKey, PipelineKey>,
}

impl PipelineCache {
    pub fn new(device: Arc<dyn GraphicsDevice>) -> Self {
        Self {
            device,
            entries: SlotMap::with_key(),
            lookup: FxHashMap::default(),
        }
    }

    /// Return the pipeline matching the key, creating it on a miss
    pub fn get_or_create(
        &mut self,
        shaders: &ShaderLibrary,
        signature: &Arc<Signature>,
        layout: &VertexLayout,
        targets: &TargetFormats,
        technique: Technique,
        flags: MaterialFlags,
    ) -> Result<PipelineKey> {
        let key = CacheKey {
            signature: signature.id,
            layout_hash: layout_hash(layout),
            targets: targets.clone(),
            technique,
            flags,
        };
        if let Some(&existing) = self.lookup.get(&key) {
            return Ok(existing);
        }

        let desc = build_desc(shaders, signature, layout, targets, technique, flags)?;
        let pipeline = self.device.create_pipeline(&desc)?;
        engine_debug!("galaxy3d::PipelineCache", "created pipeline '{}'", desc.debug_name);

        let pipeline_key = self.entries.insert(PipelineStateEntry {
            signature: signature.clone(),
            layout_hash: key.layout_hash,
            layout: layout.clone(),
            targets: targets.clone(),
            technique,
            flags,
            pipeline,
            generation: 0,
        });
        self.lookup.insert(key, pipeline_key);
        Ok(pipeline_key)
    }

    /// Rebuild every cached pipeline from the current shader bytecode
    ///
    /// A failed rebuild keeps the previous pipeline.
    pub fn reload(&mut self, shaders: &ShaderLibrary) -> ReloadReport {
        let mut report = ReloadReport::default();
        let device = &self.device;
        for (_, entry) in self.entries.iter_mut() {
            let rebuilt = build_desc(
                shaders, &entry.signature, &entry.layout, &entry.targets, entry.technique, entry.flags,
            )
            .and_then(|desc| device.create_pipeline(&desc));

            match rebuilt {
                Ok(pipeline) => {
                    entry.pipeline = pipeline;
                    entry.generation += 1;
                    report.rebuilt += 1;
                }
                Err(err) => {
                    engine_error!("galaxy3d::PipelineCache",
                        "reload of '{}' failed, keeping previous pipeline: {}",
                        entry.pipeline.debug_name(), err);
                    report.failed += 1;
                }
            }
        }
        engine_info!("galaxy3d::PipelineCache",
            "reload: {} rebuilt, {} failed", report.rebuilt, report.failed);
        report
    }

    pub fn pipeline(&self, key: PipelineKey) -> Option<Arc<dyn Pipeline>> {
        self.entries.get(key).map(|entry| entry.pipeline.clone())
    }

    pub fn entry(&self, key: PipelineKey) -> Option<&PipelineStateEntry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = PipelineKey> + '_ {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn build_desc(
    shaders: &ShaderLibrary,
    signature: &Signature,
    layout: &VertexLayout,
    targets: &TargetFormats,
    technique: Technique,
    flags: MaterialFlags,
) -> Result<PipelineDesc> {
    let stage = |name: &str| {
        shaders
            .get(name)
            .map(|info| info.bytecode.clone())
            .ok_or_else(|| Error::InvalidResource(format!("shader stage '{}' not loaded", name)))
    };
    let state = RenderState::synthesize(technique, flags);

    Ok(PipelineDesc {
        debug_name: format!("{}[{:?}]", signature.info.name, technique),
        signature: signature.root.clone(),
        vertex_bytecode: stage(&signature.vertex_stage)?,
        pixel_bytecode: stage(&signature.pixel_stage)?,
        vertex_layout: layout.clone(),
        targets: targets.clone(),
        topology: PrimitiveTopology::TriangleList,
        rasterization: state.rasterization,
        depth_stencil: state.depth_stencil,
        color_blend: state.color_blend,
    })
}

#[cfg(test)]
#[path = "pipeline_cache_tests.rs"]
mod tests;
