/// Material instance bound to one draw configuration

use std::sync::Arc;
use crate::graphics_device::TargetFormats;
use crate::material::MaterialInstance;
use crate::pipeline::{PipelineKey, Technique};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssignedMaterialId(pub u32);

/// A material instance together with the pipeline it draws with
///
/// One exists per distinct (instance, pipeline) pair. The pipeline is held
/// by key, so hot reload is observed without touching this value.
pub struct AssignedMaterial {
    pub id: AssignedMaterialId,
    pub instance: Arc<MaterialInstance>,
    pub pipeline: PipelineKey,
    pub layout_hash: u64,
    pub targets: TargetFormats,
    pub technique: Technique,
}
