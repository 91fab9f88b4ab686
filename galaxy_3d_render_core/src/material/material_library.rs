/// Material library
///
/// Owns the material definitions, their resolved instances, the assigned
/// materials and the shader, signature and pipeline caches they are built
/// from. Lives on the orchestrator thread; passes read it between updates.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::descriptor::ResourceTable;
use crate::error::{Error, Result};
use crate::graphics_device::{GraphicsDevice, TargetFormats, VertexLayout};
use crate::material::{
    AssignedMaterial, AssignedMaterialId, MaterialDefinition, MaterialInstance, MaterialInstanceId,
    ResolvedDefinition, TechniqueOverride,
};
use crate::pipeline::{layout_hash, PipelineCache, PipelineKey, ReloadReport, Technique};
use crate::shader::{ShaderLibrary, ShaderStageInfo, SignatureCache};
use crate::{engine_debug, engine_error, engine_warn_once};

/// Name of the material unknown names resolve to
pub const FALLBACK_MATERIAL: &str = "__fallback";

/// Suffix of the instanced variant of a material
pub const INSTANCING_SUFFIX: &str = "+Instancing";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ConfigKey {
    instance: MaterialInstanceId,
    layout_hash: u64,
    targets: TargetFormats,
    technique: Technique,
}

pub struct MaterialLibrary {
    device: Arc<dyn GraphicsDevice>,
    shaders: ShaderLibrary,
    signatures: SignatureCache,
    pipelines: PipelineCache,
    definitions: FxHashMap<String, MaterialDefinition>,
    overrides: FxHashMap<(String, Technique), TechniqueOverride>,
    instances: FxHashMap<String, Arc<MaterialInstance>>,
    by_config: FxHashMap<ConfigKey, Arc<AssignedMaterial>>,
    by_pipeline: FxHashMap<(MaterialInstanceId, PipelineKey), Arc<AssignedMaterial>>,
    next_instance_id: u32,
    next_assigned_id: u32,
}

impl MaterialLibrary {
    pub fn new(device: Arc<dyn GraphicsDevice>, root_constant_budget_dwords: u32) -> Self {
        Self {
            pipelines: PipelineCache::new(device.clone()),
            device,
            shaders: ShaderLibrary::new(),
            signatures: SignatureCache::new(root_constant_budget_dwords),
            definitions: FxHashMap::default(),
            overrides: FxHashMap::default(),
            instances: FxHashMap::default(),
            by_config: FxHashMap::default(),
            by_pipeline: FxHashMap::default(),
            next_instance_id: 0,
            next_assigned_id: 0,
        }
    }

    // ===== REGISTRATION =====

    /// Register a compiled shader stage
    pub fn register_shader(&mut self, stage: ShaderStageInfo) {
        self.shaders.register(stage);
    }

    /// Register a definition and the technique overrides it carries
    ///
    /// Nothing is registered when one of the overrides is rejected.
    /// Re-registering a name whose instance was already resolved is rejected.
    pub fn register_definition(&mut self, definition: MaterialDefinition) -> Result<()> {
        if self.instances.contains_key(&definition.name) {
            return Err(Error::InvalidResource(format!(
                "material '{}' is already in use", definition.name
            )));
        }
        for (index, (technique, _)) in definition.overrides.iter().enumerate() {
            let repeated = definition.overrides[..index].iter().any(|(earlier, _)| earlier == technique);
            if repeated || self.technique_override(&definition.name, *technique).is_some() {
                return Err(Error::InvariantViolation(format!(
                    "material '{}' already has an override for {:?}", definition.name, technique
                )));
            }
        }
        for (technique, technique_override) in &definition.overrides {
            self.overrides.insert((definition.name.clone(), *technique), technique_override.clone());
        }
        self.definitions.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Attach a technique override to a material
    ///
    /// A material accepts one override per technique.
    pub fn set_technique_override(
        &mut self,
        material: &str,
        technique: Technique,
        technique_override: TechniqueOverride,
    ) -> Result<()> {
        let key = (material.to_string(), technique);
        if self.overrides.contains_key(&key) {
            return Err(Error::InvariantViolation(format!(
                "material '{}' already has an override for {:?}", material, technique
            )));
        }
        self.overrides.insert(key, technique_override);
        Ok(())
    }

    pub fn technique_override(&self, material: &str, technique: Technique) -> Option<&TechniqueOverride> {
        self.overrides.get(&(material.to_string(), technique))
    }

    pub fn has_definition(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    // ===== RESOLUTION =====

    /// Resolved instance of a material, built on first use
    ///
    /// Unknown names resolve to the fallback material with a single warning.
    pub fn instance(&mut self, name: &str, resources: &ResourceTable) -> Result<Arc<MaterialInstance>> {
        let name = if self.definitions.contains_key(name) {
            name
        } else {
            engine_warn_once!(format!("material:{}", name), "galaxy3d::MaterialLibrary",
                "material '{}' not found, using '{}'", name, FALLBACK_MATERIAL);
            FALLBACK_MATERIAL
        };
        if let Some(instance) = self.instances.get(name) {
            return Ok(instance.clone());
        }

        let resolved = ResolvedDefinition::flatten(&self.definition_chain(name)?);
        let signature = self.signatures.get_or_build(
            self.device.as_ref(), &self.shaders, &resolved.vertex_stage, &resolved.pixel_stage,
        )?;

        let instance = Arc::new(MaterialInstance::resolve_resources(
            MaterialInstanceId(self.next_instance_id), name, &resolved, signature, resources,
        ));
        self.next_instance_id += 1;
        self.instances.insert(name.to_string(), instance.clone());
        Ok(instance)
    }

    /// Instance a pass should draw `name` with
    ///
    /// Applies the material's override for `technique` (skip or substitute),
    /// then prefers the `+Instancing` variant for instanced geometry.
    /// Returns `None` when the material opts out of the technique.
    pub fn resolve_for_technique(
        &mut self,
        name: &str,
        technique: Technique,
        instanced: bool,
        resources: &ResourceTable,
    ) -> Result<Option<Arc<MaterialInstance>>> {
        let mut name = name.to_string();
        match self.technique_override(&name, technique) {
            Some(TechniqueOverride::Skip) => return Ok(None),
            Some(TechniqueOverride::Substitute(substitute)) => name = substitute.clone(),
            None => {}
        }
        if instanced {
            let variant = format!("{}{}", name, INSTANCING_SUFFIX);
            if self.definitions.contains_key(&variant) {
                name = variant;
            }
        }
        self.instance(&name, resources).map(Some)
    }

    /// Assigned material of `instance` for a draw configuration
    ///
    /// Returns the existing one when the configuration (or the pipeline it
    /// resolves to) was already assigned.
    pub fn assign(
        &mut self,
        instance: &Arc<MaterialInstance>,
        layout: &VertexLayout,
        targets: &TargetFormats,
        technique: Technique,
    ) -> Result<Arc<AssignedMaterial>> {
        let config = ConfigKey {
            instance: instance.id,
            layout_hash: layout_hash(layout),
            targets: targets.clone(),
            technique,
        };
        if let Some(assigned) = self.by_config.get(&config) {
            return Ok(assigned.clone());
        }

        let pipeline = self.pipelines.get_or_create(
            &self.shaders, &instance.signature, layout, targets, technique, instance.flags,
        )?;
        let assigned = match self.by_pipeline.get(&(instance.id, pipeline)) {
            Some(existing) => existing.clone(),
            None => {
                let assigned = Arc::new(AssignedMaterial {
                    id: AssignedMaterialId(self.next_assigned_id),
                    instance: instance.clone(),
                    pipeline,
                    layout_hash: config.layout_hash,
                    targets: targets.clone(),
                    technique,
                });
                self.next_assigned_id += 1;
                engine_debug!("galaxy3d::MaterialLibrary", "assigned '{}' for {:?}", instance.name, technique);
                self.by_pipeline.insert((instance.id, pipeline), assigned.clone());
                assigned
            }
        };
        self.by_config.insert(config, assigned.clone());
        Ok(assigned)
    }

    // ===== HOT RELOAD =====

    /// Replace shader stages and rebuild every cached pipeline
    ///
    /// Reload swaps bytecode only. Signatures, constant offsets and texture
    /// slots of resolved instances are kept, so a replacement for a stage a
    /// signature was built from must keep the same interface; one that does
    /// not is refused and the previous stage stays.
    pub fn reload_shaders(&mut self, stages: Vec<ShaderStageInfo>) -> ReloadReport {
        let mut rejected_stages = 0;
        for stage in stages {
            let changed = self
                .shaders
                .get(&stage.name)
                .is_some_and(|current| !current.same_interface(&stage));
            if changed && self.signatures.uses_stage(&stage.name) {
                engine_error!("galaxy3d::MaterialLibrary",
                    "reload of stage '{}' changes its bindings, keeping previous stage", stage.name);
                rejected_stages += 1;
                continue;
            }
            self.shaders.register(stage);
        }
        let mut report = self.pipelines.reload(&self.shaders);
        report.rejected_stages = rejected_stages;
        report
    }

    // ===== ACCESSORS =====

    pub fn pipelines(&self) -> &PipelineCache {
        &self.pipelines
    }

    pub fn shaders(&self) -> &ShaderLibrary {
        &self.shaders
    }

    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Number of distinct draw configurations
    pub fn assigned_count(&self) -> usize {
        self.by_pipeline.len()
    }

    /// Every assigned material
    pub fn assigned_materials(&self) -> impl Iterator<Item = &Arc<AssignedMaterial>> {
        self.by_pipeline.values()
    }

    /// Definitions from the root base down to `name`
    fn definition_chain(&self, name: &str) -> Result<Vec<&MaterialDefinition>> {
        let mut chain = Vec::new();
        let mut current = Some(name);
        while let Some(definition_name) = current {
            let Some(definition) = self.definitions.get(definition_name) else {
                return Err(Error::InvalidResource(format!(
                    "material definition '{}' not found", definition_name
                )));
            };
            if chain.iter().any(|seen: &&MaterialDefinition| seen.name == definition.name) {
                return Err(Error::InvalidResource(format!(
                    "material '{}' inherits from itself", name
                )));
            }
            chain.push(definition);
            current = definition.base.as_deref();
        }
        chain.reverse();
        Ok(chain)
    }
}

#[cfg(test)]
#[path = "material_library_tests.rs"]
mod tests;
