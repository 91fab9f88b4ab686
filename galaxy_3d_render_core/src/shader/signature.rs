/// Material signature: merged binding layout of a vertex/pixel stage pair
///
/// A signature is built once per stage pair and shared through `Arc` by
/// every material and pipeline that uses the pair.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::graphics_device::{GraphicsDevice, RootSignature};
use crate::shader::{
    ConstantBufferInfo, FieldInfo, ShaderLibrary, ShaderStageFlags, ShaderStageInfo,
    TextureDimension,
};
use crate::{engine_bail, engine_debug};

/// Kind of a merged binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    ConstantBuffer,
    Texture(TextureDimension),
    Sampler,
}

/// One merged binding, in root parameter order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureBinding {
    pub name: String,
    pub kind: BindingKind,
    pub slot: u32,
    pub space: u32,
    /// Union of the stages declaring the binding
    pub visibility: ShaderStageFlags,
    /// Root parameter index (position in the binding list)
    pub root_index: u32,
    /// Size in bytes (constant buffers only)
    pub size: u32,
    /// Fields (constant buffers only)
    pub fields: Vec<FieldInfo>,
}

impl SignatureBinding {
    pub fn is_buffer(&self) -> bool {
        self.kind == BindingKind::ConstantBuffer
    }

    pub fn is_texture(&self) -> bool {
        matches!(self.kind, BindingKind::Texture(_))
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|field| field.name == name)
    }

    fn from_buffer(buffer: &ConstantBufferInfo, visibility: ShaderStageFlags) -> Self {
        Self {
            name: buffer.name.clone(),
            kind: BindingKind::ConstantBuffer,
            slot: buffer.slot,
            space: buffer.space,
            visibility,
            root_index: 0,
            size: buffer.size,
            fields: buffer.fields.clone(),
        }
    }
}

/// Merged view of a set of shader stages
#[derive(Debug, Clone)]
pub struct SignatureInfo {
    pub name: String,
    pub bindings: Vec<SignatureBinding>,
    /// Index into `bindings` of the buffer delivered as inline (root) constants
    pub inline_buffer: Option<usize>,
    /// Some buffer carries `texture_index_<N>` fields
    pub bindless_textures: bool,
    pub has_vertex_input: bool,
}

impl SignatureInfo {
    /// Merge the bindings of `stages` and pick the inline buffer
    ///
    /// # Arguments
    ///
    /// * `name` - Debug name of the signature
    /// * `stages` - Stages to merge; the first declaration of a name fixes its position
    /// * `root_constant_budget_dwords` - Inline constant budget in 32-bit values
    pub fn build(name: &str, stages: &[&ShaderStageInfo], root_constant_budget_dwords: u32) -> Result<Self> {
        if stages.is_empty() {
            engine_bail!("galaxy3d::Signature", "signature '{}' has no shader stage", name);
        }

        let mut bindings: Vec<SignatureBinding> = Vec::new();
        let mut add = |binding: SignatureBinding| -> Result<()> {
            if let Some(existing) = bindings.iter_mut().find(|b| b.name == binding.name) {
                if existing.kind != binding.kind {
                    return Err(Error::InvalidResource(format!(
                        "binding '{}' declared as {:?} and {:?} in signature '{}'",
                        binding.name, existing.kind, binding.kind, name
                    )));
                }
                existing.visibility |= binding.visibility;
            } else {
                bindings.push(binding);
            }
            Ok(())
        };

        for stage in stages {
            let visibility = ShaderStageFlags::from(stage.stage);
            for buffer in &stage.constant_buffers {
                add(SignatureBinding::from_buffer(buffer, visibility))?;
            }
            for texture in &stage.textures {
                add(SignatureBinding {
                    name: texture.name.clone(),
                    kind: BindingKind::Texture(texture.dimension),
                    slot: texture.slot,
                    space: texture.space,
                    visibility,
                    root_index: 0,
                    size: 0,
                    fields: Vec::new(),
                })?;
            }
            for sampler in &stage.samplers {
                add(SignatureBinding {
                    name: sampler.name.clone(),
                    kind: BindingKind::Sampler,
                    slot: sampler.slot,
                    space: sampler.space,
                    visibility,
                    root_index: 0,
                    size: 0,
                    fields: Vec::new(),
                })?;
            }
        }

        for (index, binding) in bindings.iter_mut().enumerate() {
            binding.root_index = index as u32;
        }

        let has_vertex_input = stages.iter().any(|stage| stage.has_vertex_input);
        let texture_count = bindings.iter().filter(|b| b.is_texture()).count() as u32;
        let available = root_constant_budget_dwords
            .saturating_sub(texture_count)
            .saturating_sub(u32::from(has_vertex_input));

        let eligible = |binding: &SignatureBinding| binding.is_buffer() && binding.size.div_ceil(4) <= available;
        let is_global = |binding: &SignatureBinding| binding.name.is_empty() || binding.name == "$Globals";
        let inline_buffer = bindings
            .iter()
            .position(|b| is_global(b) && eligible(b))
            .or_else(|| bindings.iter().position(eligible));

        let bindless_textures = bindings
            .iter()
            .filter(|b| b.is_buffer())
            .flat_map(|b| b.fields.iter())
            .any(|field| texture_index_slot(&field.name).is_some());

        engine_debug!("galaxy3d::Signature",
            "signature '{}': {} bindings, inline buffer {:?}, bindless {}",
            name, bindings.len(), inline_buffer.map(|i| bindings[i].name.as_str()), bindless_textures);

        Ok(Self {
            name: name.to_string(),
            bindings,
            inline_buffer,
            bindless_textures,
            has_vertex_input,
        })
    }

    pub fn binding(&self, name: &str) -> Option<&SignatureBinding> {
        self.bindings.iter().find(|binding| binding.name == name)
    }

    pub fn inline_binding(&self) -> Option<&SignatureBinding> {
        self.inline_buffer.map(|index| &self.bindings[index])
    }

    pub fn buffers(&self) -> impl Iterator<Item = &SignatureBinding> {
        self.bindings.iter().filter(|binding| binding.is_buffer())
    }

    pub fn textures(&self) -> impl Iterator<Item = &SignatureBinding> {
        self.bindings.iter().filter(|binding| binding.is_texture())
    }
}

/// Parse `texture_index_<N>` field names
pub fn texture_index_slot(field_name: &str) -> Option<u32> {
    let digits = field_name.strip_prefix("texture_index_")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

// ============================================================================
// Signature cache
// ============================================================================

/// Stable identifier of a built signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignatureId(pub u32);

/// Built signature with its backend object
pub struct Signature {
    pub id: SignatureId,
    pub info: SignatureInfo,
    pub root: Arc<dyn RootSignature>,
    pub vertex_stage: String,
    pub pixel_stage: String,
}

/// Signatures keyed by (vertex stage name, pixel stage name)
pub struct SignatureCache {
    signatures: FxHashMap<(String, String), Arc<Signature>>,
    next_id: u32,
    root_constant_budget_dwords: u32,
}

impl SignatureCache {
    pub fn new(root_constant_budget_dwords: u32) -> Self {
        Self {
            signatures: FxHashMap::default(),
            next_id: 0,
            root_constant_budget_dwords,
        }
    }

    /// Return the signature of a stage pair, building it on first use
    pub fn get_or_build(
        &mut self,
        device: &dyn GraphicsDevice,
        shaders: &ShaderLibrary,
        vertex_stage: &str,
        pixel_stage: &str,
    ) -> Result<Arc<Signature>> {
        let key = (vertex_stage.to_string(), pixel_stage.to_string());
        if let Some(signature) = self.signatures.get(&key) {
            return Ok(signature.clone());
        }

        let Some(vs) = shaders.get(vertex_stage) else {
            return Err(Error::InvalidResource(format!("unknown vertex stage '{}'", vertex_stage)));
        };
        let Some(ps) = shaders.get(pixel_stage) else {
            return Err(Error::InvalidResource(format!("unknown pixel stage '{}'", pixel_stage)));
        };

        let name = format!("{}+{}", vertex_stage, pixel_stage);
        let info = SignatureInfo::build(&name, &[vs.as_ref(), ps.as_ref()], self.root_constant_budget_dwords)?;
        let root = device.create_root_signature(&info)?;

        let signature = Arc::new(Signature {
            id: SignatureId(self.next_id),
            info,
            root,
            vertex_stage: key.0.clone(),
            pixel_stage: key.1.clone(),
        });
        self.next_id += 1;
        self.signatures.insert(key, signature.clone());
        Ok(signature)
    }

    /// Whether a built signature was reflected from stage `name`
    pub fn uses_stage(&self, name: &str) -> bool {
        self.signatures.keys().any(|(vertex, pixel)| vertex == name || pixel == name)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
