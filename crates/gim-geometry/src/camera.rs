//! Per-frame camera snapshot used for picking and handle sizing

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::{EPSILON, Ray};

/// Smallest distance scale handed out, so handles never collapse to zero
/// size when their origin sits on or behind the camera plane.
pub const MIN_DISTANCE_SCALE: f32 = 1e-3;

/// Immutable camera state for one frame.
///
/// The owning camera/input layer produces one of these per frame; the gizmo
/// engine only reads it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// Eye position.
    pub position: Vec3,
    /// Unit view direction.
    pub forward: Vec3,
    /// Unit right vector.
    pub right: Vec3,
    /// Unit up vector (orthogonal to forward and right).
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Viewport size in pixels.
    pub viewport: Vec2,
}

impl CameraView {
    /// Build a view looking from `position` toward `target`.
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3, fov_y: f32, viewport: Vec2) -> Self {
        let forward = (target - position).normalize_or(Vec3::NEG_Z);
        let mut right = forward.cross(up);
        if right.length_squared() < EPSILON {
            // Looking straight along `up`: pick any perpendicular
            right = forward.any_orthonormal_vector();
        }
        let right = right.normalize();
        let up = right.cross(forward).normalize();

        Self {
            position,
            forward,
            right,
            up,
            fov_y,
            near: 0.1,
            far: 100000.0,
            viewport,
        }
    }

    /// Viewport aspect ratio
    pub fn aspect(&self) -> f32 {
        if self.viewport.y > 0.0 {
            self.viewport.x / self.viewport.y
        } else {
            1.0
        }
    }

    /// Get view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward, self.up)
    }

    /// Get projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect(), self.near, self.far)
    }

    /// Projection of `point - position` onto the view direction.
    ///
    /// Multiplying a handle's size by this keeps its apparent screen size
    /// constant at any distance. Clamped to [`MIN_DISTANCE_SCALE`].
    pub fn distance_scale(&self, point: Vec3) -> f32 {
        (point - self.position)
            .dot(self.forward)
            .max(MIN_DISTANCE_SCALE)
    }

    /// World units covered by one pixel at unit view depth.
    pub fn pixel_size_at_unit_depth(&self) -> f32 {
        if self.viewport.y <= 0.0 {
            return 0.0;
        }
        2.0 * (self.fov_y * 0.5).tan() / self.viewport.y
    }

    /// Convert screen coordinates (pixels, origin top-left) to a world ray.
    pub fn screen_to_ray(&self, screen_x: f32, screen_y: f32) -> Ray {
        let width = self.viewport.x.max(1.0);
        let height = self.viewport.y.max(1.0);

        // Convert to normalized device coordinates
        let ndc_x = (2.0 * screen_x / width) - 1.0;
        let ndc_y = 1.0 - (2.0 * screen_y / height);

        let inv_proj = self.projection_matrix().inverse();
        let inv_view = self.view_matrix().inverse();

        // Near and far points in NDC (wgpu depth range)
        let near_ndc = Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
        let far_ndc = Vec4::new(ndc_x, ndc_y, 1.0, 1.0);

        let near_view = inv_proj * near_ndc;
        let far_view = inv_proj * far_ndc;
        let near_view = near_view.truncate() / near_view.w;
        let far_view = far_view.truncate() / far_view.w;

        let near_world = (inv_view * near_view.extend(1.0)).truncate();
        let far_world = (inv_view * far_view.extend(1.0)).truncate();

        Ray::new(near_world, far_world - near_world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_view() -> CameraView {
        CameraView::look_at(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::ZERO,
            Vec3::Y,
            60.0_f32.to_radians(),
            Vec2::new(800.0, 600.0),
        )
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let view = test_view();
        assert!(view.forward.abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(view.right.abs_diff_eq(Vec3::X, 1e-6));
        assert!(view.up.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_look_along_up_does_not_degenerate() {
        let view = CameraView::look_at(
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::ZERO,
            Vec3::Y,
            1.0,
            Vec2::new(100.0, 100.0),
        );
        assert!(view.right.is_normalized());
        assert_relative_eq!(view.right.dot(view.forward), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_distance_scale() {
        let view = test_view();
        assert_relative_eq!(view.distance_scale(Vec3::ZERO), 10.0, epsilon = 1e-5);
        // Lateral offsets do not change depth
        assert_relative_eq!(
            view.distance_scale(Vec3::new(3.0, -2.0, 0.0)),
            10.0,
            epsilon = 1e-5
        );
        // Behind the camera clamps
        assert_eq!(
            view.distance_scale(Vec3::new(0.0, 0.0, 20.0)),
            MIN_DISTANCE_SCALE
        );
    }

    #[test]
    fn test_center_ray_points_forward() {
        let view = test_view();
        let ray = view.screen_to_ray(400.0, 300.0);
        assert!(ray.direction.abs_diff_eq(Vec3::NEG_Z, 1e-4));
        assert_relative_eq!(ray.origin.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(ray.origin.y, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_pixel_size() {
        let view = test_view();
        let expected = 2.0 * 30.0_f32.to_radians().tan() / 600.0;
        assert_relative_eq!(view.pixel_size_at_unit_depth(), expected, epsilon = 1e-7);
    }
}
