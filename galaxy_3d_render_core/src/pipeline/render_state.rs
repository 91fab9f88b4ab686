/// Techniques, authored material flags and fixed-function state synthesis

use bitflags::bitflags;
use crate::graphics_device::{
    BlendFactor, BlendOp, ColorBlendState, ColorWriteMask, CompareOp, CullMode, DepthBias,
    DepthStencilState, PolygonMode, RasterizationState,
};

/// Rendering technique a pass records with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Technique {
    /// Regular shaded rendering
    Default,
    /// Depth prepass
    DepthOnly,
    /// Shadow map cascades
    Shadow,
    /// Scene voxelization
    Voxelize,
    /// Entity id picking
    Picking,
}

impl Technique {
    pub const ALL: [Technique; 5] = [
        Technique::Default,
        Technique::DepthOnly,
        Technique::Shadow,
        Technique::Voxelize,
        Technique::Picking,
    ];
}

bitflags! {
    /// Render-state flags authored on a material
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MaterialFlags: u32 {
        const TWO_SIDED = 1 << 0;
        const ALPHA_BLEND = 1 << 1;
        const ADDITIVE = 1 << 2;
        const NO_DEPTH_WRITE = 1 << 3;
        const NO_DEPTH_TEST = 1 << 4;
        const WIREFRAME = 1 << 5;
        const ALPHA_TO_COVERAGE = 1 << 6;
    }
}

/// Full fixed-function state of a pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub rasterization: RasterizationState,
    pub depth_stencil: DepthStencilState,
    pub color_blend: ColorBlendState,
}

impl RenderState {
    /// Derive the pipeline state of `technique` for a material authored with `flags`
    pub fn synthesize(technique: Technique, flags: MaterialFlags) -> Self {
        let mut rasterization = RasterizationState::default();
        let mut depth_stencil = DepthStencilState::default();
        let mut color_blend = ColorBlendState::default();

        match technique {
            Technique::Default => {
                if flags.contains(MaterialFlags::WIREFRAME) {
                    rasterization.polygon_mode = PolygonMode::Line;
                }
                if flags.contains(MaterialFlags::ADDITIVE) {
                    color_blend.blend_enable = true;
                    color_blend.src_color_factor = BlendFactor::One;
                    color_blend.dst_color_factor = BlendFactor::One;
                    color_blend.src_alpha_factor = BlendFactor::One;
                    color_blend.dst_alpha_factor = BlendFactor::One;
                } else if flags.contains(MaterialFlags::ALPHA_BLEND) {
                    color_blend.blend_enable = true;
                    color_blend.src_color_factor = BlendFactor::SrcAlpha;
                    color_blend.dst_color_factor = BlendFactor::OneMinusSrcAlpha;
                    color_blend.src_alpha_factor = BlendFactor::One;
                    color_blend.dst_alpha_factor = BlendFactor::OneMinusSrcAlpha;
                }
                color_blend.color_blend_op = BlendOp::Add;
                color_blend.alpha_to_coverage = flags.contains(MaterialFlags::ALPHA_TO_COVERAGE);
                apply_depth_flags(&mut depth_stencil, flags);
            }
            Technique::DepthOnly => {
                color_blend.color_write_mask = ColorWriteMask::NONE;
                depth_stencil.depth_compare_op = CompareOp::Less;
            }
            Technique::Shadow => {
                color_blend.color_write_mask = ColorWriteMask::NONE;
                rasterization.cull_mode = CullMode::Front;
                rasterization.depth_bias = Some(DepthBias {
                    constant_factor: 1.0,
                    slope_factor: 2.0,
                    clamp: 0.0,
                });
            }
            Technique::Voxelize => {
                rasterization.cull_mode = CullMode::None;
                depth_stencil.depth_test_enable = false;
                depth_stencil.depth_write_enable = false;
            }
            Technique::Picking => {
                apply_depth_flags(&mut depth_stencil, flags);
            }
        }

        if flags.contains(MaterialFlags::TWO_SIDED) {
            rasterization.cull_mode = CullMode::None;
        }

        Self { rasterization, depth_stencil, color_blend }
    }
}

fn apply_depth_flags(depth_stencil: &mut DepthStencilState, flags: MaterialFlags) {
    if flags.contains(MaterialFlags::NO_DEPTH_WRITE) {
        depth_stencil.depth_write_enable = false;
    }
    if flags.contains(MaterialFlags::NO_DEPTH_TEST) {
        depth_stencil.depth_test_enable = false;
        depth_stencil.depth_write_enable = false;
    }
}

#[cfg(test)]
#[path = "render_state_tests.rs"]
mod tests;
