//! Translate manipulator: three axis lines and three plane quads

use gim_geometry::intersect::{ray_edge_point, ray_plane_point};
use gim_geometry::{Ray, Shape};
use glam::{Vec2, Vec3};

use super::{Frame, HandleSpec, Manipulator, TRANSLATE_GROUP, handle_scale, snap};
use crate::command::{ActionKey, CommandBus, TransformAction};
use crate::handle::{HandleFlags, HandleId};
use crate::pivot::Pivot;

/// Translate handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslateHandle {
    X,
    Y,
    Z,
    XY,
    YZ,
    ZX,
}

impl TranslateHandle {
    pub const ALL: [TranslateHandle; 6] = [
        TranslateHandle::X,
        TranslateHandle::Y,
        TranslateHandle::Z,
        TranslateHandle::XY,
        TranslateHandle::YZ,
        TranslateHandle::ZX,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn id(self) -> HandleId {
        HandleId::new(TRANSLATE_GROUP, self as u32)
    }

    /// Axis index of a line handle
    fn axis(self) -> Option<usize> {
        match self {
            TranslateHandle::X => Some(0),
            TranslateHandle::Y => Some(1),
            TranslateHandle::Z => Some(2),
            _ => None,
        }
    }

    /// Axis indices of (normal, tangent, bitangent) of a plane handle
    fn plane(self) -> Option<(usize, usize, usize)> {
        match self {
            TranslateHandle::XY => Some((2, 0, 1)),
            TranslateHandle::YZ => Some((0, 1, 2)),
            TranslateHandle::ZX => Some((1, 2, 0)),
            _ => None,
        }
    }
}

/// Constraint of a running translate gesture
#[derive(Debug, Clone, Copy, PartialEq)]
enum Constraint {
    Axis(Vec3),
    Plane {
        normal: Vec3,
        tangent: Vec3,
        bitangent: Vec3,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TranslateGesture {
    handle: TranslateHandle,
    constraint: Constraint,
    /// Reference point the constraint passes through
    anchor: Vec3,
    /// Offset from the pivot to the grabbed point
    grab_offset: Vec3,
}

impl TranslateGesture {
    /// Position for the constraint point currently under the pointer.
    fn position(&self, ray: &Ray, step: Option<f32>) -> Option<Vec3> {
        match self.constraint {
            Constraint::Axis(axis) => {
                let hit = ray_edge_point(ray, self.anchor, axis)?;
                let along = (hit - self.grab_offset - self.anchor).dot(axis);
                Some(self.anchor + axis * snap(along, step))
            }
            Constraint::Plane {
                normal,
                tangent,
                bitangent,
            } => {
                let hit = ray_plane_point(ray, self.anchor + self.grab_offset, normal)?;
                let delta = hit - self.grab_offset - self.anchor;
                Some(
                    self.anchor
                        + tangent * snap(delta.dot(tangent), step)
                        + bitangent * snap(delta.dot(bitangent), step),
                )
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TranslateManipulator {
    flags: [HandleFlags; 6],
    gesture: Option<TranslateGesture>,
}

impl TranslateManipulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_flags(&self, handle: TranslateHandle) -> HandleFlags {
        self.flags[handle.index()]
    }

    /// Handle being dragged
    pub fn active_handle(&self) -> Option<TranslateHandle> {
        self.gesture.map(|g| g.handle)
    }

    fn set_gesture(&mut self, gesture: TranslateGesture) {
        self.flags[gesture.handle.index()].held = true;
        self.gesture = Some(gesture);
    }

    fn shape(handle: TranslateHandle, pivot: &Pivot, frame: &Frame<'_>, scale: f32) -> Shape {
        let dims = frame.handles();
        let axes = pivot.axes(frame.space);
        let origin = pivot.position();

        if let Some(i) = handle.axis() {
            return Shape::Line {
                origin,
                direction: axes[i],
                width: dims.axis_width * scale,
                length: dims.axis_length * scale,
            };
        }

        let (n, t, b) = handle.plane().unwrap_or((2, 0, 1));
        Shape::Quad {
            origin: origin + (axes[t] + axes[b]) * dims.plane_offset * scale,
            normal: axes[n],
            tangent: axes[t],
            bitangent: axes[b],
            half_extents: Vec2::splat(dims.plane_half_size * scale),
        }
    }
}

impl Manipulator for TranslateManipulator {
    fn group(&self) -> u32 {
        TRANSLATE_GROUP
    }

    fn handles(&self, pivot: &Pivot, frame: &Frame<'_>) -> Vec<HandleSpec> {
        let scale = handle_scale(pivot, self);
        TranslateHandle::ALL
            .iter()
            .map(|&handle| {
                let color_axis = handle.axis().or(handle.plane().map(|p| p.0)).unwrap_or(0);
                HandleSpec {
                    id: handle.id(),
                    priority: 0,
                    shape: Self::shape(handle, pivot, frame, scale),
                    color: frame.config.colors.axis(color_axis),
                }
            })
            .collect()
    }

    fn flags(&self, id: HandleId) -> HandleFlags {
        TranslateHandle::from_index(id.index())
            .map(|h| self.handle_flags(h))
            .unwrap_or_default()
    }

    fn set_hovered(&mut self, id: HandleId, hovered: bool) {
        if let Some(handle) = TranslateHandle::from_index(id.index()) {
            self.flags[handle.index()].hovered = hovered;
        }
    }

    fn in_gesture(&self) -> bool {
        self.gesture.is_some()
    }

    fn begin(&mut self, id: HandleId, ray: &Ray, t: f32, pivot: &mut Pivot, frame: &Frame<'_>) {
        let Some(handle) = TranslateHandle::from_index(id.index()) else {
            return;
        };
        pivot.gather_start();

        let anchor = pivot.last_position();
        let axes = pivot.axes(frame.space);

        let (constraint, grabbed) = match (handle.axis(), handle.plane()) {
            (Some(i), _) => {
                let axis = axes[i];
                let fallback = anchor + axis * (ray.at(t) - anchor).dot(axis);
                (
                    Constraint::Axis(axis),
                    ray_edge_point(ray, anchor, axis).unwrap_or(fallback),
                )
            }
            (None, Some((n, tangent, bitangent))) => (
                Constraint::Plane {
                    normal: axes[n],
                    tangent: axes[tangent],
                    bitangent: axes[bitangent],
                },
                ray_plane_point(ray, anchor, axes[n]).unwrap_or_else(|| ray.at(t)),
            ),
            (None, None) => return,
        };

        tracing::debug!(?handle, ?anchor, "translate gesture started");
        self.set_gesture(TranslateGesture {
            handle,
            constraint,
            anchor,
            grab_offset: grabbed - anchor,
        });
    }

    fn drag(&mut self, ray: &Ray, pivot: &mut Pivot, frame: &Frame<'_>) {
        let Some(gesture) = self.gesture else {
            return;
        };
        // Ray parallel to the constraint plane: keep the last value
        if let Some(position) = gesture.position(ray, frame.config.snap.translate_step()) {
            pivot.set_position(position, false);
        }
    }

    fn end(&mut self, pivot: &mut Pivot, bus: &mut dyn CommandBus) {
        if self.gesture.take().is_none() {
            return;
        }
        self.flags = Default::default();
        bus.record_undo(TransformAction::capture_last(ActionKey::SetPosition, pivot));
        bus.execute(
            TransformAction::capture_current(ActionKey::SetPosition, pivot),
            pivot,
        );
    }
}
