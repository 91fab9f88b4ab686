/// View frustum used to build per-pass visibility sets.
///
/// Six planes (A, B, C, D) with inward-pointing unit normals: a point P is
/// inside when `dot(normal, P) + D >= 0` for every plane.

use glam::{Mat4, Vec3, Vec4};
use crate::scene::AABB;

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    /// left, right, bottom, top, near, far
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract the planes of a view-projection matrix with a [0, 1] depth range
    pub fn from_view_projection(view_proj: &Mat4) -> Self {
        let row = |i: usize| view_proj.row(i);
        let (x, y, z, w) = (row(0), row(1), row(2), row(3));

        let mut planes = [w + x, w - x, w + y, w - y, z, w - z];
        for plane in &mut planes {
            let length = plane.truncate().length();
            if length > 0.0 {
                *plane /= length;
            }
        }
        Self { planes }
    }

    /// Conservative AABB test: false only when the box is fully outside one plane
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.planes.iter().all(|plane| {
            let normal = plane.truncate();
            // Corner furthest along the normal
            let corner = Vec3::select(normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            normal.dot(corner) + plane.w >= 0.0
        })
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|plane| plane.truncate().dot(point) + plane.w >= 0.0)
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
