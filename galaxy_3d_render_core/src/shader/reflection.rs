/// Reflection data of compiled shader stages
///
/// Produced by the shader loader collaborator. A stage is immutable once
/// compiled; hot reload replaces the whole `ShaderStageInfo`.

use std::sync::Arc;
use bitflags::bitflags;

/// Pipeline stage a compiled shader belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

bitflags! {
    /// Stages a merged binding is visible to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStageFlags: u8 {
        const VERTEX = 1 << 0;
        const PIXEL = 1 << 1;
        const ALL = Self::VERTEX.bits() | Self::PIXEL.bits();
    }
}

impl From<ShaderStage> for ShaderStageFlags {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => ShaderStageFlags::VERTEX,
            ShaderStage::Pixel => ShaderStageFlags::PIXEL,
        }
    }
}

/// One member of a constant buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    /// Byte offset inside the buffer
    pub offset: u32,
    /// Size in bytes
    pub size: u32,
}

impl FieldInfo {
    pub fn new(name: &str, offset: u32, size: u32) -> Self {
        Self { name: name.to_string(), offset, size }
    }
}

/// Constant buffer declared by a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantBufferInfo {
    /// Buffer name; empty or `$Globals` for the anonymous global buffer
    pub name: String,
    pub slot: u32,
    pub space: u32,
    /// Declared size in bytes
    pub size: u32,
    pub fields: Vec<FieldInfo>,
}

impl ConstantBufferInfo {
    /// Buffer in space 0 whose size is the end of its last field, rounded to 16 bytes
    pub fn new(name: &str, slot: u32, fields: Vec<FieldInfo>) -> Self {
        let end = fields.iter().map(|field| field.offset + field.size).max().unwrap_or(0);
        Self {
            name: name.to_string(),
            slot,
            space: 0,
            size: end.div_ceil(16) * 16,
            fields,
        }
    }

    /// Whether this is the anonymous global buffer
    pub fn is_global(&self) -> bool {
        self.name.is_empty() || self.name == "$Globals"
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Texture dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    Texture2D,
    Texture3D,
    TextureCube,
}

/// Texture declared by a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureBindingInfo {
    pub name: String,
    pub slot: u32,
    pub space: u32,
    pub dimension: TextureDimension,
}

/// Sampler declared by a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerInfo {
    pub name: String,
    pub slot: u32,
    pub space: u32,
}

/// Reflection of one compiled shader stage
#[derive(Debug, Clone)]
pub struct ShaderStageInfo {
    pub name: String,
    pub stage: ShaderStage,
    pub bytecode: Arc<[u8]>,
    pub constant_buffers: Vec<ConstantBufferInfo>,
    pub textures: Vec<TextureBindingInfo>,
    pub samplers: Vec<SamplerInfo>,
    /// Stage reads a vertex input layout (costs one root dword)
    pub has_vertex_input: bool,
}

impl ShaderStageInfo {
    pub fn new(name: &str, stage: ShaderStage, bytecode: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            stage,
            bytecode: Arc::from(bytecode),
            constant_buffers: Vec::new(),
            textures: Vec::new(),
            samplers: Vec::new(),
            has_vertex_input: false,
        }
    }

    pub fn with_constant_buffer(mut self, buffer: ConstantBufferInfo) -> Self {
        self.constant_buffers.push(buffer);
        self
    }

    pub fn with_texture(mut self, name: &str, slot: u32, dimension: TextureDimension) -> Self {
        self.textures.push(TextureBindingInfo { name: name.to_string(), slot, space: 0, dimension });
        self
    }

    pub fn with_sampler(mut self, name: &str, slot: u32) -> Self {
        self.samplers.push(SamplerInfo { name: name.to_string(), slot, space: 0 });
        self
    }

    pub fn with_vertex_input(mut self) -> Self {
        self.has_vertex_input = true;
        self
    }

    /// Same bindings, fields and vertex input; bytecode may differ
    pub fn same_interface(&self, other: &ShaderStageInfo) -> bool {
        self.stage == other.stage
            && self.constant_buffers == other.constant_buffers
            && self.textures == other.textures
            && self.samplers == other.samplers
            && self.has_vertex_input == other.has_vertex_input
    }
}
