/// Camera - passive view description consumed by passes.
///
/// Holds the matrices and viewport a pass records with. The caller computes
/// them; the camera only derives the combined matrix and the frustum.

use glam::{Mat4, Vec2};
use crate::graphics_device::{Rect2D, Viewport};
use super::frustum::Frustum;

#[derive(Debug, Clone)]
pub struct Camera {
    view_matrix: Mat4,
    projection_matrix: Mat4,
    viewport: Viewport,
    scissor: Option<Rect2D>,
}

impl Camera {
    /// Create a camera; the scissor defaults to the viewport
    pub fn new(view: Mat4, projection: Mat4, viewport: Viewport) -> Self {
        Self {
            view_matrix: view,
            projection_matrix: projection,
            viewport,
            scissor: None,
        }
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view)
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// Frustum of the current matrices
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection_matrix())
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Reciprocal of the viewport size (the `inv_viewport_size` parameter)
    pub fn inv_viewport_size(&self) -> Vec2 {
        Vec2::new(1.0 / self.viewport.width.max(1.0), 1.0 / self.viewport.height.max(1.0))
    }

    /// Explicit scissor or the viewport bounds
    pub fn effective_scissor(&self) -> Rect2D {
        self.scissor.unwrap_or(Rect2D {
            x: self.viewport.x as i32,
            y: self.viewport.y as i32,
            width: self.viewport.width as u32,
            height: self.viewport.height as u32,
        })
    }

    pub fn set_view(&mut self, matrix: Mat4) {
        self.view_matrix = matrix;
    }

    pub fn set_projection(&mut self, matrix: Mat4) {
        self.projection_matrix = matrix;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// `None` means same as viewport
    pub fn set_scissor(&mut self, scissor: Option<Rect2D>) {
        self.scissor = scissor;
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
