use glam::{Mat4, Vec2, Vec3};
use crate::graphics_device::{Rect2D, Viewport};
use super::*;

fn camera() -> Camera {
    Camera::new(
        Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y),
        Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 16.0 / 9.0, 0.1, 100.0),
        Viewport::from_size(1920, 1080),
    )
}

#[test]
fn test_view_projection_order() {
    let camera = camera();
    assert_eq!(camera.view_projection_matrix(), *camera.projection_matrix() * *camera.view_matrix());
}

#[test]
fn test_frustum_follows_matrices() {
    let mut camera = camera();
    assert!(camera.frustum().contains_point(Vec3::ZERO));
    camera.set_view(Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 10.0), Vec3::Y));
    assert!(!camera.frustum().contains_point(Vec3::ZERO));
}

#[test]
fn test_inv_viewport_size() {
    let camera = camera();
    assert_eq!(camera.inv_viewport_size(), Vec2::new(1.0 / 1920.0, 1.0 / 1080.0));
}

#[test]
fn test_effective_scissor() {
    let mut camera = camera();
    assert_eq!(camera.effective_scissor(), Rect2D { x: 0, y: 0, width: 1920, height: 1080 });

    let scissor = Rect2D { x: 10, y: 20, width: 100, height: 50 };
    camera.set_scissor(Some(scissor));
    assert_eq!(camera.effective_scissor(), scissor);
    camera.set_scissor(None);
    camera.set_viewport(Viewport::from_size(640, 480));
    assert_eq!(camera.effective_scissor().width, 640);
}
