/// Automatic material parameters
///
/// Constant buffer fields whose names belong to a fixed vocabulary are
/// filled by the renderer instead of by authored defaults. Classification
/// happens once per reflected field; `AutoParam::write` is the only code
/// that produces their bytes.

use glam::{Mat4, Vec2, Vec3};
use crate::shader::texture_index_slot;

/// Number of shadow cascades with their own matrix
pub const SHADOW_CASCADES: usize = 4;

/// How often an automatic parameter changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateFrequency {
    /// Written once when the material instance is resolved
    PerMaterial,
    PerFrame,
    PerObject,
}

/// Closed set of automatic parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutoParam {
    World,
    ViewProj,
    WorldViewProj,
    ShadowMatrix(u8),
    SunDirection,
    Time,
    InvViewportSize,
    /// Descriptor index of the n-th texture reference of the material
    TextureIndex(u32),
    /// Picking technique side write
    EntityId,
    /// Voxelize technique side write
    VoxelBuffer,
}

/// Values shared by every draw of a frame
#[derive(Debug, Clone, Copy)]
pub struct FrameParams {
    pub view_proj: Mat4,
    pub shadow_matrices: [Mat4; SHADOW_CASCADES],
    pub sun_direction: Vec3,
    pub time: f32,
    pub inv_viewport_size: Vec2,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY,
            shadow_matrices: [Mat4::IDENTITY; SHADOW_CASCADES],
            sun_direction: Vec3::new(0.0, -1.0, 0.0),
            time: 0.0,
            inv_viewport_size: Vec2::ONE,
        }
    }
}

/// Values specific to one draw
#[derive(Debug, Clone, Copy)]
pub struct ObjectParams {
    pub world: Mat4,
    pub entity_id: u32,
    pub voxel_buffer: u32,
}

impl Default for ObjectParams {
    fn default() -> Self {
        Self { world: Mat4::IDENTITY, entity_id: 0, voxel_buffer: 0 }
    }
}

/// Everything an automatic parameter can read from
pub struct ParamContext<'a> {
    pub frame: &'a FrameParams,
    pub object: &'a ObjectParams,
    /// Descriptor indices of the material's texture references
    pub texture_indices: &'a [u32],
}

impl AutoParam {
    /// Match a constant buffer field name against the vocabulary
    pub fn classify(field_name: &str) -> Option<AutoParam> {
        let param = match field_name {
            "world" => AutoParam::World,
            "view_proj" => AutoParam::ViewProj,
            "world_view_proj" => AutoParam::WorldViewProj,
            "sun_direction" => AutoParam::SunDirection,
            "time" => AutoParam::Time,
            "inv_viewport_size" => AutoParam::InvViewportSize,
            "entity_id" => AutoParam::EntityId,
            "voxel_buffer" => AutoParam::VoxelBuffer,
            _ => {
                if let Some(cascade) = field_name.strip_prefix("shadow_matrix_") {
                    let cascade: u8 = cascade.parse().ok()?;
                    if (cascade as usize) < SHADOW_CASCADES {
                        return Some(AutoParam::ShadowMatrix(cascade));
                    }
                    return None;
                }
                return texture_index_slot(field_name).map(AutoParam::TextureIndex);
            }
        };
        Some(param)
    }

    pub fn frequency(&self) -> UpdateFrequency {
        match self {
            AutoParam::TextureIndex(_) => UpdateFrequency::PerMaterial,
            AutoParam::ViewProj
            | AutoParam::ShadowMatrix(_)
            | AutoParam::SunDirection
            | AutoParam::Time
            | AutoParam::InvViewportSize => UpdateFrequency::PerFrame,
            AutoParam::World
            | AutoParam::WorldViewProj
            | AutoParam::EntityId
            | AutoParam::VoxelBuffer => UpdateFrequency::PerObject,
        }
    }

    /// Write the parameter's current value into `dst`
    ///
    /// `dst` is the field's byte range; values longer than the field are truncated.
    pub fn write(&self, ctx: &ParamContext<'_>, dst: &mut [u8]) {
        let frame = ctx.frame;
        let object = ctx.object;
        match self {
            AutoParam::World => copy(bytemuck::bytes_of(&object.world), dst),
            AutoParam::ViewProj => copy(bytemuck::bytes_of(&frame.view_proj), dst),
            AutoParam::WorldViewProj => {
                let world_view_proj = frame.view_proj * object.world;
                copy(bytemuck::bytes_of(&world_view_proj), dst)
            }
            AutoParam::ShadowMatrix(cascade) => {
                copy(bytemuck::bytes_of(&frame.shadow_matrices[*cascade as usize]), dst)
            }
            AutoParam::SunDirection => copy(bytemuck::bytes_of(&frame.sun_direction), dst),
            AutoParam::Time => copy(bytemuck::bytes_of(&frame.time), dst),
            AutoParam::InvViewportSize => copy(bytemuck::bytes_of(&frame.inv_viewport_size), dst),
            AutoParam::TextureIndex(slot) => {
                let index = ctx.texture_indices.get(*slot as usize).copied().unwrap_or(0);
                copy(bytemuck::bytes_of(&index), dst)
            }
            AutoParam::EntityId => copy(bytemuck::bytes_of(&object.entity_id), dst),
            AutoParam::VoxelBuffer => copy(bytemuck::bytes_of(&object.voxel_buffer), dst),
        }
    }
}

fn copy(src: &[u8], dst: &mut [u8]) {
    let len = src.len().min(dst.len());
    dst[..len].copy_from_slice(&src[..len]);
}

#[cfg(test)]
#[path = "auto_param_tests.rs"]
mod tests;
