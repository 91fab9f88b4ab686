/// Material instance: a definition chain resolved against its signature

use std::sync::Arc;
use crate::descriptor::ResourceTable;
use crate::material::{AutoParam, FrameParams, ObjectParams, ParamContext, ResolvedDefinition, UpdateFrequency};
use crate::pipeline::MaterialFlags;
use crate::shader::Signature;
use crate::{engine_trace, engine_warn_once};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialInstanceId(pub u32);

/// Default contents of one constant buffer of the signature
#[derive(Debug, Clone)]
pub struct InstanceBuffer {
    pub name: String,
    pub root_index: u32,
    /// Delivered as inline (root) constants
    pub inline: bool,
    pub defaults: Vec<u8>,
}

/// Automatic parameter bound to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoParamSlot {
    pub param: AutoParam,
    /// Index into `MaterialInstance::buffers`
    pub buffer: usize,
    pub offset: u32,
    pub size: u32,
}

/// Texture root parameter and the descriptor it points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSlotBinding {
    pub root_index: u32,
    pub descriptor_index: u32,
}

pub struct MaterialInstance {
    pub id: MaterialInstanceId,
    pub name: String,
    pub signature: Arc<Signature>,
    pub flags: MaterialFlags,
    pub buffers: Vec<InstanceBuffer>,
    pub auto_params: Vec<AutoParamSlot>,
    pub textures: Vec<TextureSlotBinding>,
    /// Descriptor indices of the texture references, in declaration order
    pub texture_indices: Vec<u32>,
}

impl MaterialInstance {
    /// Resolve defaults, textures and automatic parameters of a flattened definition
    pub fn resolve_resources(
        id: MaterialInstanceId,
        name: &str,
        definition: &ResolvedDefinition,
        signature: Arc<Signature>,
        resources: &ResourceTable,
    ) -> Self {
        let texture_indices: Vec<u32> = definition
            .textures
            .iter()
            .map(|(_, view)| resources.texture_or_fallback(view))
            .collect();

        let textures = signature
            .info
            .textures()
            .map(|binding| {
                let descriptor_index = match definition.textures.iter().position(|(slot, _)| *slot == binding.name) {
                    Some(position) => texture_indices[position],
                    None => {
                        engine_warn_once!(format!("material:{}:{}", name, binding.name), "galaxy3d::MaterialInstance",
                            "material '{}' has no texture for '{}', using fallback", name, binding.name);
                        resources.fallback_index()
                    }
                };
                TextureSlotBinding { root_index: binding.root_index, descriptor_index }
            })
            .collect();

        let inline_root = signature.info.inline_binding().map(|binding| binding.root_index);
        let mut buffers = Vec::new();
        let mut auto_params = Vec::new();
        for binding in signature.info.buffers() {
            let buffer_index = buffers.len();
            let mut defaults = vec![0u8; binding.size as usize];
            for field in &binding.fields {
                let start = field.offset as usize;
                let end = (start + field.size as usize).min(defaults.len());
                if start >= end {
                    continue;
                }
                if let Some(param) = AutoParam::classify(&field.name) {
                    auto_params.push(AutoParamSlot {
                        param,
                        buffer: buffer_index,
                        offset: field.offset,
                        size: (end - start) as u32,
                    });
                } else if let Some(value) = definition.params.get(&field.name) {
                    let bytes = value.as_bytes();
                    let len = bytes.len().min(end - start);
                    defaults[start..start + len].copy_from_slice(&bytes[..len]);
                }
            }
            buffers.push(InstanceBuffer {
                name: binding.name.clone(),
                root_index: binding.root_index,
                inline: inline_root == Some(binding.root_index),
                defaults,
            });
        }

        let mut instance = Self {
            id,
            name: name.to_string(),
            signature,
            flags: definition.flags,
            buffers,
            auto_params,
            textures,
            texture_indices,
        };
        instance.bake_per_material_params();
        engine_trace!("galaxy3d::MaterialInstance", "resolved '{}': {} buffers, {} auto params",
            instance.name, instance.buffers.len(), instance.auto_params.len());
        instance
    }

    /// Write the current constants of buffer `index` into `dst`
    ///
    /// Starts from the defaults and refreshes every per-frame and per-object
    /// automatic parameter.
    pub fn fill_buffer(&self, index: usize, frame: &FrameParams, object: &ObjectParams, dst: &mut Vec<u8>) {
        dst.clear();
        let Some(buffer) = self.buffers.get(index) else {
            return;
        };
        dst.extend_from_slice(&buffer.defaults);
        let ctx = ParamContext { frame, object, texture_indices: &self.texture_indices };
        for slot in self.auto_params.iter().filter(|slot| slot.buffer == index) {
            if slot.param.frequency() == UpdateFrequency::PerMaterial {
                continue;
            }
            let start = slot.offset as usize;
            slot.param.write(&ctx, &mut dst[start..start + slot.size as usize]);
        }
    }

    /// Whether any field of this instance is `param`
    pub fn has_auto_param(&self, param: AutoParam) -> bool {
        self.auto_params.iter().any(|slot| slot.param == param)
    }

    fn bake_per_material_params(&mut self) {
        let frame = FrameParams::default();
        let object = ObjectParams::default();
        let ctx = ParamContext { frame: &frame, object: &object, texture_indices: &self.texture_indices };
        for slot in &self.auto_params {
            if slot.param.frequency() != UpdateFrequency::PerMaterial {
                continue;
            }
            let start = slot.offset as usize;
            let defaults = &mut self.buffers[slot.buffer].defaults;
            slot.param.write(&ctx, &mut defaults[start..start + slot.size as usize]);
        }
    }
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
