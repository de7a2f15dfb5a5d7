//! Rotate manipulator: three half rings, an outer view ring and a free sphere

use gim_geometry::intersect::ray_plane_point;
use gim_geometry::{Ray, Shape};
use glam::{Quat, Vec3};

use super::{
    Frame, HandleSpec, Manipulator, ROTATE_GROUP, facing_bitangent, handle_scale, on_view_plane,
    snap,
};
use crate::command::{ActionKey, CommandBus, TransformAction};
use crate::handle::{HandleFlags, HandleId};
use crate::pivot::Pivot;

/// Rotate handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotateHandle {
    X,
    Y,
    Z,
    /// View-aligned outer ring
    View,
    /// Center sphere for free rotation
    Free,
}

impl RotateHandle {
    pub const ALL: [RotateHandle; 5] = [
        RotateHandle::X,
        RotateHandle::Y,
        RotateHandle::Z,
        RotateHandle::View,
        RotateHandle::Free,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn id(self) -> HandleId {
        HandleId::new(ROTATE_GROUP, self as u32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Motion {
    /// Rotation about a fixed axis driven by motion along `tangent`
    Axis { axis: Vec3, tangent: Vec3 },
    /// Yaw about `up` from motion along `right`, pitch about `right` from
    /// motion along `up`
    Free { right: Vec3, up: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RotateGesture {
    handle: RotateHandle,
    motion: Motion,
    /// Grabbed point; the drag plane passes through it facing the camera
    click: Vec3,
    view_normal: Vec3,
    /// World radius converting pointer travel to radians
    radius: f32,
}

#[derive(Debug, Clone, Default)]
pub struct RotateManipulator {
    flags: [HandleFlags; 5],
    gesture: Option<RotateGesture>,
}

impl RotateManipulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_flags(&self, handle: RotateHandle) -> HandleFlags {
        self.flags[handle.index()]
    }

    pub fn active_handle(&self) -> Option<RotateHandle> {
        self.gesture.map(|g| g.handle)
    }

    fn shape(handle: RotateHandle, pivot: &Pivot, frame: &Frame<'_>, scale: f32) -> Shape {
        let dims = frame.handles();
        let origin = pivot.position();
        let camera = frame.camera;

        match handle {
            RotateHandle::X | RotateHandle::Y | RotateHandle::Z => {
                let normal = pivot.local_axes()[handle.index()];
                Shape::Circle {
                    origin,
                    normal,
                    bitangent: facing_bitangent(camera, origin, normal),
                    width: dims.ring_width * scale,
                    radius: dims.ring_radius * scale,
                    half: true,
                }
            }
            RotateHandle::View => Shape::Circle {
                origin,
                normal: -camera.forward,
                bitangent: camera.up,
                width: dims.ring_width * scale,
                radius: dims.outer_ring_radius * scale,
                half: false,
            },
            RotateHandle::Free => Shape::Sphere {
                origin,
                radius: dims.center_radius * scale,
            },
        }
    }
}

/// Rotation reached by dragging `delta` world units on the view plane.
fn rotation_for(motion: Motion, delta: Vec3, radius: f32, step: Option<f32>, start: Quat) -> Quat {
    match motion {
        Motion::Axis { axis, tangent } => {
            let angle = snap(delta.dot(tangent) / radius, step);
            (Quat::from_axis_angle(axis, angle) * start).normalize()
        }
        Motion::Free { right, up } => {
            let yaw = snap(delta.dot(right) / radius, step);
            let pitch = snap(-delta.dot(up) / radius, step);
            (Quat::from_axis_angle(up, yaw) * Quat::from_axis_angle(right, pitch) * start)
                .normalize()
        }
    }
}

impl Manipulator for RotateManipulator {
    fn group(&self) -> u32 {
        ROTATE_GROUP
    }

    fn handles(&self, pivot: &Pivot, frame: &Frame<'_>) -> Vec<HandleSpec> {
        let scale = handle_scale(pivot, self);
        let colors = &frame.config.colors;
        RotateHandle::ALL
            .iter()
            .map(|&handle| HandleSpec {
                id: handle.id(),
                priority: 0,
                shape: Self::shape(handle, pivot, frame, scale),
                color: match handle {
                    RotateHandle::View => colors.view_ring,
                    RotateHandle::Free => colors.center,
                    axis => colors.axis(axis.index()),
                },
            })
            .collect()
    }

    fn flags(&self, id: HandleId) -> HandleFlags {
        RotateHandle::from_index(id.index())
            .map(|h| self.handle_flags(h))
            .unwrap_or_default()
    }

    fn set_hovered(&mut self, id: HandleId, hovered: bool) {
        if let Some(handle) = RotateHandle::from_index(id.index()) {
            self.flags[handle.index()].hovered = hovered;
        }
    }

    fn in_gesture(&self) -> bool {
        self.gesture.is_some()
    }

    fn begin(&mut self, id: HandleId, ray: &Ray, t: f32, pivot: &mut Pivot, frame: &Frame<'_>) {
        let Some(handle) = RotateHandle::from_index(id.index()) else {
            return;
        };
        pivot.gather_start();

        let camera = frame.camera;
        let dims = frame.handles();
        let scale = pivot.handle_scale(true);
        let center = pivot.last_position();
        let click = ray.at(t);
        let offset = click - center;

        let (motion, radius) = match handle {
            RotateHandle::X | RotateHandle::Y | RotateHandle::Z => {
                let axis = pivot.local_axes()[handle.index()];
                // Ring seen edge-on: fall back to horizontal motion
                let tangent = on_view_plane(camera, axis.cross(offset)).unwrap_or(camera.right);
                (Motion::Axis { axis, tangent }, dims.ring_radius * scale)
            }
            RotateHandle::View => {
                let axis = -camera.forward;
                let tangent = axis.cross(offset).try_normalize().unwrap_or(camera.right);
                (Motion::Axis { axis, tangent }, dims.outer_ring_radius * scale)
            }
            RotateHandle::Free => (
                Motion::Free {
                    right: camera.right,
                    up: camera.up,
                },
                dims.ring_radius * scale,
            ),
        };

        tracing::debug!(?handle, ?motion, "rotate gesture started");
        self.flags[handle.index()].held = true;
        self.gesture = Some(RotateGesture {
            handle,
            motion,
            click,
            view_normal: camera.forward,
            radius: radius.max(gim_geometry::EPSILON),
        });
    }

    fn drag(&mut self, ray: &Ray, pivot: &mut Pivot, frame: &Frame<'_>) {
        let Some(gesture) = self.gesture else {
            return;
        };
        let Some(hit) = ray_plane_point(ray, gesture.click, gesture.view_normal) else {
            return;
        };
        let rotation = rotation_for(
            gesture.motion,
            hit - gesture.click,
            gesture.radius,
            frame.config.snap.rotate_step(),
            pivot.last_rotation(),
        );
        pivot.set_rotation(rotation, false);
    }

    fn end(&mut self, pivot: &mut Pivot, bus: &mut dyn CommandBus) {
        if self.gesture.take().is_none() {
            return;
        }
        self.flags = Default::default();
        bus.record_undo(TransformAction::capture_last(ActionKey::SetRotation, pivot));
        bus.execute(
            TransformAction::capture_current(ActionKey::SetRotation, pivot),
            pivot,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandHistory;
    use crate::config::GizmoConfig;
    use crate::manipulator::GizmoSpace;
    use crate::pivot::Transform;
    use approx::assert_relative_eq;
    use gim_geometry::CameraView;
    use glam::Vec2;
    use parking_lot::Mutex;
    use std::f32::consts::FRAC_PI_2;
    use std::sync::Arc;

    fn camera() -> CameraView {
        CameraView::look_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            Vec3::Y,
            1.0,
            Vec2::new(800.0, 600.0),
        )
    }

    fn pivot() -> Pivot {
        Pivot::for_node(Arc::new(Mutex::new(Transform::default())))
    }

    #[test]
    fn test_axis_rotation_follows_ring_tangent() {
        // Rotating about Z by θ moves the point (1,0,0) along +Y
        let motion = Motion::Axis {
            axis: Vec3::Z,
            tangent: Vec3::Y,
        };
        let q = rotation_for(motion, Vec3::Y * 0.5, 1.0, None, Quat::IDENTITY);
        let (axis, angle) = q.to_axis_angle();
        assert!(axis.abs_diff_eq(Vec3::Z, 1e-5));
        assert_relative_eq!(angle, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_rotation_snaps_in_radians() {
        let motion = Motion::Axis {
            axis: Vec3::Z,
            tangent: Vec3::Y,
        };
        let step = Some(15.0_f32.to_radians());
        let q = rotation_for(motion, Vec3::Y * 0.2, 1.0, step, Quat::IDENTITY);
        assert_relative_eq!(q.to_axis_angle().1, 15.0_f32.to_radians(), epsilon = 1e-5);
    }

    #[test]
    fn test_free_rotation_yaw_and_pitch() {
        let motion = Motion::Free {
            right: Vec3::X,
            up: Vec3::Y,
        };
        let yaw = rotation_for(motion, Vec3::X * FRAC_PI_2, 1.0, None, Quat::IDENTITY);
        // Front of the target swings toward the pointer
        assert!((yaw * Vec3::Z).abs_diff_eq(Vec3::X, 1e-5));

        let pitch = rotation_for(motion, Vec3::Y * FRAC_PI_2, 1.0, None, Quat::IDENTITY);
        assert!((pitch * Vec3::Z).abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn test_ring_drag_and_commit() {
        let camera = camera();
        let config = GizmoConfig::default();
        let frame = Frame {
            camera: &camera,
            config: &config,
            space: GizmoSpace::Local,
        };
        let mut pivot = pivot();
        pivot.update_screen_scale(&camera, config.screen_pixels);
        let mut bus = CommandHistory::new();
        let mut manipulator = RotateManipulator::new();

        // Grab the Z ring at its +X point and drag upward
        let r = config.handles.ring_radius * pivot.handle_scale(false);
        let grab = Ray::new(Vec3::new(r, 0.0, 5.0), Vec3::NEG_Z);
        manipulator.begin(RotateHandle::Z.id(), &grab, 5.0, &mut pivot, &frame);
        assert!(manipulator.handle_flags(RotateHandle::Z).held);

        let drag = Ray::new(Vec3::new(r, r * 0.25, 5.0), Vec3::NEG_Z);
        manipulator.drag(&drag, &mut pivot, &frame);
        let (axis, angle) = pivot.rotation().to_axis_angle();
        assert!(axis.abs_diff_eq(Vec3::Z, 1e-4));
        assert_relative_eq!(angle, 0.25, epsilon = 1e-4);
        assert_eq!(pivot.last_rotation(), Quat::IDENTITY);

        manipulator.end(&mut pivot, &mut bus);
        assert!(!manipulator.in_gesture());
        assert!(pivot.last_rotation().abs_diff_eq(pivot.rotation(), 1e-6));
        assert_eq!(
            bus.last_entry().map(|e| e.inverse),
            Some(TransformAction::Rotation(Quat::IDENTITY))
        );
    }

    #[test]
    fn test_handle_layout() {
        let camera = camera();
        let config = GizmoConfig::default();
        let frame = Frame {
            camera: &camera,
            config: &config,
            space: GizmoSpace::Local,
        };
        let pivot = pivot();
        let specs = RotateManipulator::new().handles(&pivot, &frame);

        assert_eq!(specs.len(), 5);
        assert!(matches!(specs[0].shape, Shape::Circle { half: true, .. }));
        assert!(matches!(specs[3].shape, Shape::Circle { half: false, .. }));
        assert!(matches!(specs[4].shape, Shape::Sphere { .. }));
        assert_eq!(specs[3].color, config.colors.view_ring);
    }
}
