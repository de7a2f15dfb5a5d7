//! Scale manipulator: axis lines, axis-end cubes and a uniform center cube

use std::f32::consts::FRAC_1_SQRT_2;

use gim_geometry::intersect::{ray_edge_point, ray_plane_point};
use gim_geometry::{EPSILON, Ray, Shape};
use glam::Vec3;

use super::{Frame, HandleSpec, Manipulator, SCALE_GROUP, handle_scale, snap};
use crate::command::{ActionKey, CommandBus, TransformAction};
use crate::handle::{HandleFlags, HandleId};
use crate::pivot::Pivot;

/// Scale handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleHandle {
    AxisX,
    AxisY,
    AxisZ,
    EndX,
    EndY,
    EndZ,
    /// Uniform scale; picked ahead of every other handle
    Center,
}

impl ScaleHandle {
    pub const ALL: [ScaleHandle; 7] = [
        ScaleHandle::AxisX,
        ScaleHandle::AxisY,
        ScaleHandle::AxisZ,
        ScaleHandle::EndX,
        ScaleHandle::EndY,
        ScaleHandle::EndZ,
        ScaleHandle::Center,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn id(self) -> HandleId {
        HandleId::new(SCALE_GROUP, self as u32)
    }

    /// Scaled component, `None` for the uniform center cube
    pub fn axis(self) -> Option<usize> {
        match self {
            ScaleHandle::AxisX | ScaleHandle::EndX => Some(0),
            ScaleHandle::AxisY | ScaleHandle::EndY => Some(1),
            ScaleHandle::AxisZ | ScaleHandle::EndZ => Some(2),
            ScaleHandle::Center => None,
        }
    }

    pub fn priority(self) -> u32 {
        match self {
            ScaleHandle::Center => 1,
            _ => 0,
        }
    }
}

/// Multiply `factor` into `last` (one component or all of them) and clamp
/// every component to at least `min_scale`.
pub fn scaled(last: Vec3, factor: f32, component: Option<usize>, min_scale: f32) -> Vec3 {
    let mut scale = last;
    match component {
        Some(i) => scale[i] *= factor,
        None => scale *= factor,
    }
    scale.max(Vec3::splat(min_scale))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Reference {
    /// Factor is the ratio of the pointer's distance along `axis` to the
    /// distance at press
    Axis { axis: Vec3, component: usize, grabbed: f32 },
    /// Factor grows with diagonal pointer motion on the view plane
    Uniform {
        click: Vec3,
        view_normal: Vec3,
        diagonal: Vec3,
        span: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScaleGesture {
    handle: ScaleHandle,
    center: Vec3,
    reference: Reference,
}

impl ScaleGesture {
    fn factor(&self, ray: &Ray) -> Option<f32> {
        match self.reference {
            Reference::Axis { axis, grabbed, .. } => {
                let hit = ray_edge_point(ray, self.center, axis)?;
                Some((hit - self.center).dot(axis) / grabbed)
            }
            Reference::Uniform {
                click,
                view_normal,
                diagonal,
                span,
            } => {
                let hit = ray_plane_point(ray, click, view_normal)?;
                Some(1.0 + (hit - click).dot(diagonal) / span)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScaleManipulator {
    flags: [HandleFlags; 7],
    gesture: Option<ScaleGesture>,
}

impl ScaleManipulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_flags(&self, handle: ScaleHandle) -> HandleFlags {
        self.flags[handle.index()]
    }

    pub fn active_handle(&self) -> Option<ScaleHandle> {
        self.gesture.map(|g| g.handle)
    }

    fn shape(handle: ScaleHandle, pivot: &Pivot, frame: &Frame<'_>, scale: f32) -> Shape {
        let dims = frame.handles();
        // Scale components are target-local, so handles always are too
        let axes = pivot.local_axes();
        let [right, up, forward] = axes;
        let origin = pivot.position();

        match handle {
            ScaleHandle::AxisX | ScaleHandle::AxisY | ScaleHandle::AxisZ => Shape::Line {
                origin,
                direction: axes[handle.index()],
                width: dims.axis_width * scale,
                length: dims.axis_length * scale,
            },
            ScaleHandle::EndX | ScaleHandle::EndY | ScaleHandle::EndZ => {
                let axis = axes[handle.index() - 3];
                Shape::Cube {
                    origin: origin + axis * dims.axis_length * scale,
                    right,
                    up,
                    forward,
                    half_size: Vec3::splat(dims.cube_half_size * scale),
                }
            }
            ScaleHandle::Center => Shape::Cube {
                origin,
                right,
                up,
                forward,
                half_size: Vec3::splat(dims.center_cube_half_size * scale),
            },
        }
    }
}

impl Manipulator for ScaleManipulator {
    fn group(&self) -> u32 {
        SCALE_GROUP
    }

    fn handles(&self, pivot: &Pivot, frame: &Frame<'_>) -> Vec<HandleSpec> {
        let scale = handle_scale(pivot, self);
        let colors = &frame.config.colors;
        ScaleHandle::ALL
            .iter()
            .map(|&handle| HandleSpec {
                id: handle.id(),
                priority: handle.priority(),
                shape: Self::shape(handle, pivot, frame, scale),
                color: handle.axis().map_or(colors.center, |i| colors.axis(i)),
            })
            .collect()
    }

    fn flags(&self, id: HandleId) -> HandleFlags {
        ScaleHandle::from_index(id.index())
            .map(|h| self.handle_flags(h))
            .unwrap_or_default()
    }

    fn set_hovered(&mut self, id: HandleId, hovered: bool) {
        if let Some(handle) = ScaleHandle::from_index(id.index()) {
            self.flags[handle.index()].hovered = hovered;
        }
    }

    fn in_gesture(&self) -> bool {
        self.gesture.is_some()
    }

    fn begin(&mut self, id: HandleId, ray: &Ray, t: f32, pivot: &mut Pivot, frame: &Frame<'_>) {
        let Some(handle) = ScaleHandle::from_index(id.index()) else {
            return;
        };
        pivot.gather_start();

        let center = pivot.last_position();
        let nominal = frame.handles().axis_length * pivot.handle_scale(true);
        let click = ray.at(t);

        let reference = match handle.axis() {
            Some(component) => {
                let axis = pivot.local_axes()[component];
                let grabbed = ray_edge_point(ray, center, axis)
                    .map_or((click - center).dot(axis), |p| (p - center).dot(axis));
                // Grabbed at the pivot itself: use the nominal axis length
                let grabbed = if grabbed.abs() < EPSILON {
                    nominal.max(EPSILON)
                } else {
                    grabbed
                };
                Reference::Axis {
                    axis,
                    component,
                    grabbed,
                }
            }
            None => Reference::Uniform {
                click,
                view_normal: frame.camera.forward,
                diagonal: (frame.camera.right + frame.camera.up) * FRAC_1_SQRT_2,
                span: nominal.max(EPSILON),
            },
        };

        tracing::debug!(?handle, ?reference, "scale gesture started");
        self.flags[handle.index()].held = true;
        self.gesture = Some(ScaleGesture {
            handle,
            center,
            reference,
        });
    }

    fn drag(&mut self, ray: &Ray, pivot: &mut Pivot, frame: &Frame<'_>) {
        let Some(gesture) = self.gesture else {
            return;
        };
        let Some(factor) = gesture.factor(ray) else {
            return;
        };
        let component = match gesture.reference {
            Reference::Axis { component, .. } => Some(component),
            Reference::Uniform { .. } => None,
        };
        let factor = snap(factor, frame.config.snap.scale_step());
        pivot.set_scale(
            scaled(pivot.last_scale(), factor, component, frame.config.min_scale),
            false,
        );
    }

    fn end(&mut self, pivot: &mut Pivot, bus: &mut dyn CommandBus) {
        if self.gesture.take().is_none() {
            return;
        }
        self.flags = Default::default();
        bus.record_undo(TransformAction::capture_last(ActionKey::SetScale, pivot));
        bus.execute(
            TransformAction::capture_current(ActionKey::SetScale, pivot),
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

    fn pivot_with_scale(scale: Vec3) -> Pivot {
        Pivot::for_node(Arc::new(Mutex::new(Transform {
            scale,
            ..Default::default()
        })))
    }

    #[test]
    fn test_uniform_factor_and_floor() {
        let last = Vec3::splat(2.0);
        assert!(scaled(last, 1.4, None, 1.0).abs_diff_eq(Vec3::splat(2.8), 1e-6));
        assert_eq!(scaled(last, 0.3, None, 1.0), Vec3::ONE);
    }

    #[test]
    fn test_single_component_factor() {
        let last = Vec3::new(2.0, 3.0, 4.0);
        assert_eq!(scaled(last, 2.0, Some(1), 1.0), Vec3::new(2.0, 6.0, 4.0));
        assert_eq!(scaled(last, 0.1, Some(2), 1.0), Vec3::new(2.0, 3.0, 1.0));
    }

    #[test]
    fn test_axis_drag_doubles_component() {
        let camera = camera();
        let config = GizmoConfig::default();
        let frame = Frame {
            camera: &camera,
            config: &config,
            space: GizmoSpace::Local,
        };
        let mut pivot = pivot_with_scale(Vec3::splat(2.0));
        let mut manipulator = ScaleManipulator::new();

        let grab = Ray::new(Vec3::new(0.5, 0.0, 5.0), Vec3::NEG_Z);
        manipulator.begin(ScaleHandle::AxisX.id(), &grab, 5.0, &mut pivot, &frame);
        let drag = Ray::new(Vec3::new(1.0, 0.0, 5.0), Vec3::NEG_Z);
        manipulator.drag(&drag, &mut pivot, &frame);

        assert!(pivot.scale().abs_diff_eq(Vec3::new(4.0, 2.0, 2.0), 1e-5));
        assert_eq!(pivot.last_scale(), Vec3::splat(2.0));
    }

    #[test]
    fn test_center_drag_scales_uniformly() {
        let camera = camera();
        let config = GizmoConfig::default();
        let frame = Frame {
            camera: &camera,
            config: &config,
            space: GizmoSpace::Local,
        };
        let mut pivot = pivot_with_scale(Vec3::splat(2.0));
        pivot.update_screen_scale(&camera, config.screen_pixels);
        let span = config.handles.axis_length * pivot.handle_scale(false);
        let mut bus = CommandHistory::new();
        let mut manipulator = ScaleManipulator::new();

        let grab = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        manipulator.begin(ScaleHandle::Center.id(), &grab, 5.0, &mut pivot, &frame);
        // Diagonal travel of 0.4 spans grows the factor to 1.4
        let d = 0.4 * span * FRAC_1_SQRT_2;
        let drag = Ray::new(Vec3::new(d, d, 5.0), Vec3::NEG_Z);
        manipulator.drag(&drag, &mut pivot, &frame);
        assert_relative_eq!(pivot.scale().x, 2.8, epsilon = 1e-4);
        assert_relative_eq!(pivot.scale().z, 2.8, epsilon = 1e-4);

        manipulator.end(&mut pivot, &mut bus);
        assert_eq!(
            bus.last_entry().map(|e| e.inverse),
            Some(TransformAction::Scale(Vec3::splat(2.0)))
        );
        assert_eq!(manipulator.handle_flags(ScaleHandle::Center), HandleFlags::default());
    }

    #[test]
    fn test_global_space_scales_the_dragged_axis() {
        let camera = camera();
        let config = GizmoConfig::default();
        let frame = Frame {
            camera: &camera,
            config: &config,
            space: GizmoSpace::Global,
        };
        let node = Arc::new(Mutex::new(Transform {
            rotation: glam::Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            ..Default::default()
        }));
        let mut pivot = Pivot::for_node(node.clone());
        let mut manipulator = ScaleManipulator::new();

        // Local X points along world Y after the rotation
        match manipulator.handles(&pivot, &frame)[0].shape {
            Shape::Line { direction, .. } => assert!(direction.abs_diff_eq(Vec3::Y, 1e-6)),
            other => panic!("unexpected shape {other:?}"),
        }

        let grab = Ray::new(Vec3::new(0.0, 0.5, 5.0), Vec3::NEG_Z);
        manipulator.begin(ScaleHandle::AxisX.id(), &grab, 5.0, &mut pivot, &frame);
        let drag = Ray::new(Vec3::new(0.0, 1.0, 5.0), Vec3::NEG_Z);
        manipulator.drag(&drag, &mut pivot, &frame);

        let transform = *node.lock();
        assert!(transform.scale.abs_diff_eq(Vec3::new(2.0, 1.0, 1.0), 1e-5));
        // The world-space extent grows along the handle that was dragged
        let world_x = transform.rotation * (Vec3::X * transform.scale.x);
        assert!(world_x.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));
    }

    #[test]
    fn test_center_cube_has_higher_priority() {
        let camera = camera();
        let config = GizmoConfig::default();
        let frame = Frame {
            camera: &camera,
            config: &config,
            space: GizmoSpace::Global,
        };
        let specs = ScaleManipulator::new().handles(&pivot_with_scale(Vec3::ONE), &frame);
        assert_eq!(specs.len(), 7);
        assert_eq!(specs[6].priority, 1);
        assert!(specs[..6].iter().all(|s| s.priority == 0));
        assert!(matches!(specs[3].shape, Shape::Cube { origin, .. } if origin.x > 0.0));
    }
}
