/// Drawable entities and the geometry they reference

use std::sync::Arc;
use glam::{Mat4, Vec3};
use slotmap::new_key_type;
use crate::graphics_device::{Buffer, IndexType, VertexLayout};

new_key_type! {
    /// Stable key of an entity within a Scene.
    pub struct EntityKey;
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Bounds of this box after `matrix` (Arvo's method)
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let translation = matrix.col(3).truncate();
        let (mut min, mut max) = (translation, translation);
        for axis_index in 0..3 {
            let axis = matrix.col(axis_index).truncate();
            let lo = axis * self.min[axis_index];
            let hi = axis * self.max[axis_index];
            min += lo.min(hi);
            max += lo.max(hi);
        }
        AABB { min, max }
    }
}

/// GPU geometry of an entity (owned by the scene collaborator)
#[derive(Clone)]
pub struct GeometryRecord {
    pub vertex_buffer: Arc<dyn Buffer>,
    pub index_buffer: Option<(Arc<dyn Buffer>, IndexType)>,
    pub vertex_count: u32,
    pub index_count: u32,
    /// Instances drawn per draw call; more than one selects `+Instancing` materials
    pub instance_count: u32,
    pub layout: VertexLayout,
    /// Local-space bounds
    pub bounds: AABB,
}

impl GeometryRecord {
    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }

    pub fn is_instanced(&self) -> bool {
        self.instance_count > 1
    }
}

/// Queue an entity's changes are routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderOrder {
    Opaque,
    Transparent,
    Overlay,
}

impl RenderOrder {
    pub const ALL: [RenderOrder; 3] = [RenderOrder::Opaque, RenderOrder::Transparent, RenderOrder::Overlay];
}

/// Entity creation descriptor
#[derive(Clone)]
pub struct EntityDesc {
    pub name: String,
    pub material: String,
    pub geometry: GeometryRecord,
    pub transform: Mat4,
    pub order: RenderOrder,
}

pub struct Entity {
    pub name: String,
    pub material: String,
    pub geometry: GeometryRecord,
    pub transform: Mat4,
    pub order: RenderOrder,
    /// Dense id used by visibility sets and picking
    pub id: u32,
}

impl Entity {
    /// World-space bounds
    pub fn world_bounds(&self) -> AABB {
        self.geometry.bounds.transformed(&self.transform)
    }
}
