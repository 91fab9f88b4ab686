/// Pipeline and root signature traits, fixed-function state, vertex layouts

use std::sync::Arc;
use crate::graphics_device::{BufferFormat, TextureFormat};

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    /// Triangle list
    TriangleList,
    /// Triangle strip
    TriangleStrip,
    /// Line list
    LineList,
    /// Point list
    PointList,
}

/// Index buffer element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// 16-bit indices (max 65535 vertices)
    U16,
    /// 32-bit indices
    U32,
}

impl IndexType {
    /// Size in bytes of one index element
    pub fn size_bytes(&self) -> u32 {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

// ===== VERTEX LAYOUT =====

/// One element of a vertex input layout
#[derive(Debug, Clone, PartialEq)]
pub struct VertexElement {
    /// Semantic name matched against the vertex stage input ("POSITION", "TEXCOORD", ...)
    pub semantic_name: String,
    /// Semantic index (TEXCOORD0, TEXCOORD1, ...)
    pub semantic_index: u32,
    /// Element format
    pub format: BufferFormat,
    /// Byte offset from the start of the vertex
    pub offset: u32,
    /// Vertex buffer slot the element is read from
    pub slot: u32,
    /// Element advances once per instance instead of once per vertex
    pub per_instance: bool,
}

impl VertexElement {
    /// Per-vertex element read from slot 0
    pub fn new(semantic_name: &str, semantic_index: u32, format: BufferFormat, offset: u32) -> Self {
        Self {
            semantic_name: semantic_name.to_string(),
            semantic_index,
            format,
            offset,
            slot: 0,
            per_instance: false,
        }
    }
}

/// Vertex input layout
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexLayout {
    pub elements: Vec<VertexElement>,
}

impl VertexLayout {
    pub fn new(elements: Vec<VertexElement>) -> Self {
        Self { elements }
    }

    /// Stride of slot 0 in bytes
    pub fn stride(&self) -> u32 {
        self.elements
            .iter()
            .filter(|element| element.slot == 0)
            .map(|element| element.offset + element.format.size_bytes())
            .max()
            .unwrap_or(0)
    }
}

/// Formats of the render targets a pipeline writes to
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TargetFormats {
    pub colors: Vec<TextureFormat>,
    pub depth: Option<TextureFormat>,
}

impl TargetFormats {
    /// One color target and an optional depth target
    pub fn color(format: TextureFormat, depth: Option<TextureFormat>) -> Self {
        Self { colors: vec![format], depth }
    }

    /// Depth target only (shadow maps, depth prepass)
    pub fn depth_only(depth: TextureFormat) -> Self {
        Self { colors: Vec::new(), depth: Some(depth) }
    }
}

// ===== RASTERIZATION =====

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    /// No culling
    None,
    /// Cull front faces
    Front,
    /// Cull back faces
    Back,
}

/// Front face winding order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    CounterClockwise,
    Clockwise,
}

/// Polygon rendering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonMode {
    /// Fill polygons
    Fill,
    /// Draw edges only (wireframe)
    Line,
}

/// Depth bias parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthBias {
    /// Constant depth offset
    pub constant_factor: f32,
    /// Slope-based depth offset
    pub slope_factor: f32,
    /// Maximum depth bias clamp
    pub clamp: f32,
}

/// Rasterization fixed-function state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizationState {
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub polygon_mode: PolygonMode,
    /// Depth bias (None = disabled)
    pub depth_bias: Option<DepthBias>,
}

impl Default for RasterizationState {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::Back,
            front_face: FrontFace::CounterClockwise,
            polygon_mode: PolygonMode::Fill,
            depth_bias: None,
        }
    }
}

// ===== DEPTH =====

/// Comparison operator for depth tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

/// Depth testing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilState {
    /// Enable depth testing
    pub depth_test_enable: bool,
    /// Enable writing to depth buffer
    pub depth_write_enable: bool,
    /// Depth comparison operator
    pub depth_compare_op: CompareOp,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_test_enable: true,
            depth_write_enable: true,
            depth_compare_op: CompareOp::LessOrEqual,
        }
    }
}

// ===== COLOR BLEND =====

/// Blend factor for color blending equations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Blend operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendOp {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

/// Color write mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorWriteMask {
    pub r: bool,
    pub g: bool,
    pub b: bool,
    pub a: bool,
}

impl ColorWriteMask {
    /// All channels enabled
    pub const ALL: Self = Self { r: true, g: true, b: true, a: true };
    /// No channels enabled
    pub const NONE: Self = Self { r: false, g: false, b: false, a: false };
}

impl Default for ColorWriteMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Color blending state (shared by every color target)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBlendState {
    pub blend_enable: bool,
    pub src_color_factor: BlendFactor,
    pub dst_color_factor: BlendFactor,
    pub color_blend_op: BlendOp,
    pub src_alpha_factor: BlendFactor,
    pub dst_alpha_factor: BlendFactor,
    pub alpha_blend_op: BlendOp,
    pub color_write_mask: ColorWriteMask,
    pub alpha_to_coverage: bool,
}

impl Default for ColorBlendState {
    fn default() -> Self {
        Self {
            blend_enable: false,
            src_color_factor: BlendFactor::One,
            dst_color_factor: BlendFactor::Zero,
            color_blend_op: BlendOp::Add,
            src_alpha_factor: BlendFactor::One,
            dst_alpha_factor: BlendFactor::Zero,
            alpha_blend_op: BlendOp::Add,
            color_write_mask: ColorWriteMask::ALL,
            alpha_to_coverage: false,
        }
    }
}

// ===== PIPELINE DESCRIPTOR =====

/// Descriptor for creating a graphics pipeline
#[derive(Clone)]
pub struct PipelineDesc {
    pub debug_name: String,
    /// Root signature the pipeline is created against
    pub signature: Arc<dyn RootSignature>,
    /// Vertex stage bytecode
    pub vertex_bytecode: Arc<[u8]>,
    /// Pixel stage bytecode
    pub pixel_bytecode: Arc<[u8]>,
    pub vertex_layout: VertexLayout,
    pub targets: TargetFormats,
    pub topology: PrimitiveTopology,
    pub rasterization: RasterizationState,
    pub depth_stencil: DepthStencilState,
    pub color_blend: ColorBlendState,
}

/// Pipeline resource trait
///
/// Implemented by backend-specific pipeline types.
/// The pipeline is automatically destroyed when dropped.
pub trait Pipeline: Send + Sync {
    fn debug_name(&self) -> &str;
}

/// Backend root signature (binding layout shared by every pipeline of a material signature)
pub trait RootSignature: Send + Sync {
    fn debug_name(&self) -> &str;
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
