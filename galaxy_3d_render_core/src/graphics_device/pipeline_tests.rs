//! Unit tests for pipeline state types
//!
//! Tests IndexType, VertexLayout and the fixed-function state defaults.

use crate::graphics_device::{
    IndexType, VertexLayout, VertexElement, BufferFormat, TargetFormats, TextureFormat,
    RasterizationState, DepthStencilState, ColorBlendState, ColorWriteMask,
    CullMode, CompareOp, PolygonMode,
};

// ============================================================================
// INDEX TYPE TESTS
// ============================================================================

#[test]
fn test_index_type_size_bytes() {
    assert_eq!(IndexType::U16.size_bytes(), 2);
    assert_eq!(IndexType::U32.size_bytes(), 4);
}

#[test]
fn test_index_buffer_size_calculation() {
    let index_count = 1000u32;
    assert_eq!(index_count * IndexType::U16.size_bytes(), 2000);
    assert_eq!(index_count * IndexType::U32.size_bytes(), 4000);
}

// ============================================================================
// VERTEX LAYOUT TESTS
// ============================================================================

#[test]
fn test_vertex_layout_stride() {
    let layout = VertexLayout::new(vec![
        VertexElement::new("POSITION", 0, BufferFormat::R32G32B32_SFLOAT, 0),
        VertexElement::new("NORMAL", 0, BufferFormat::R32G32B32_SFLOAT, 12),
        VertexElement::new("TEXCOORD", 0, BufferFormat::R32G32_SFLOAT, 24),
    ]);
    assert_eq!(layout.stride(), 32);
}

#[test]
fn test_vertex_layout_stride_ignores_instance_slot() {
    let mut instance = VertexElement::new("TEXCOORD", 4, BufferFormat::R32G32B32A32_SFLOAT, 0);
    instance.slot = 1;
    instance.per_instance = true;

    let layout = VertexLayout::new(vec![
        VertexElement::new("POSITION", 0, BufferFormat::R32G32B32_SFLOAT, 0),
        instance,
    ]);
    assert_eq!(layout.stride(), 12);
}

#[test]
fn test_empty_layout_has_zero_stride() {
    assert_eq!(VertexLayout::default().stride(), 0);
}

// ============================================================================
// TARGET FORMATS TESTS
// ============================================================================

#[test]
fn test_target_formats_constructors() {
    let color = TargetFormats::color(TextureFormat::R8G8B8A8_SRGB, Some(TextureFormat::D32_FLOAT));
    assert_eq!(color.colors, vec![TextureFormat::R8G8B8A8_SRGB]);
    assert_eq!(color.depth, Some(TextureFormat::D32_FLOAT));

    let depth = TargetFormats::depth_only(TextureFormat::D16_UNORM);
    assert!(depth.colors.is_empty());
    assert!(depth.depth.unwrap().is_depth());
}

// ============================================================================
// STATE DEFAULTS
// ============================================================================

#[test]
fn test_rasterization_default() {
    let raster = RasterizationState::default();
    assert_eq!(raster.cull_mode, CullMode::Back);
    assert_eq!(raster.polygon_mode, PolygonMode::Fill);
    assert!(raster.depth_bias.is_none());
}

#[test]
fn test_depth_stencil_default() {
    let depth = DepthStencilState::default();
    assert!(depth.depth_test_enable);
    assert!(depth.depth_write_enable);
    assert_eq!(depth.depth_compare_op, CompareOp::LessOrEqual);
}

#[test]
fn test_color_blend_default_is_opaque() {
    let blend = ColorBlendState::default();
    assert!(!blend.blend_enable);
    assert!(!blend.alpha_to_coverage);
    assert_eq!(blend.color_write_mask, ColorWriteMask::ALL);
}
