//! Translate, rotate and scale manipulators
//!
//! A manipulator owns the hover/click flags of its handles and the transient
//! state of one drag gesture. Every frame it describes its handles as
//! [`HandleSpec`]s; the gizmo turns them into dispatcher handles whose
//! callbacks route back into the [`Manipulator`] methods by handle group.
//!
//! The same specs feed [`visuals`], so hit-testing and drawing always agree
//! on the scaled shapes.

pub mod rotate;
pub mod scale;
pub mod translate;

pub use rotate::{RotateHandle, RotateManipulator};
pub use scale::{ScaleHandle, ScaleManipulator};
pub use translate::{TranslateHandle, TranslateManipulator};

use gim_geometry::{CameraView, Ray, Shape};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::command::CommandBus;
use crate::config::{GizmoConfig, HandleConfig};
use crate::handle::{HandleFlags, HandleId};
use crate::pivot::Pivot;

/// Handle group of the translate manipulator
pub const TRANSLATE_GROUP: u32 = 0;
/// Handle group of the rotate manipulator
pub const ROTATE_GROUP: u32 = 1;
/// Handle group of the scale manipulator
pub const SCALE_GROUP: u32 = 2;
/// First handle group free for other subsystems
pub const FIRST_USER_GROUP: u32 = 16;

/// Active manipulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GizmoMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

/// Coordinate space of translate and scale handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GizmoSpace {
    Global,
    #[default]
    Local,
}

/// Round `value` to the nearest multiple of `step`, if snapping is active.
pub fn snap(value: f32, step: Option<f32>) -> f32 {
    match step {
        Some(step) if step > 0.0 => (value / step).round() * step,
        _ => value,
    }
}

/// Per-frame view shared by all manipulator calls
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub camera: &'a CameraView,
    pub config: &'a GizmoConfig,
    pub space: GizmoSpace,
}

impl Frame<'_> {
    pub fn handles(&self) -> &HandleConfig {
        &self.config.handles
    }
}

/// One handle a manipulator wants registered this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleSpec {
    pub id: HandleId,
    pub priority: u32,
    pub shape: Shape,
    /// Color when neither hovered nor held
    pub color: [f32; 4],
}

/// Drawable handle with its interaction state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleVisual {
    pub id: HandleId,
    pub shape: Shape,
    pub color: [f32; 4],
    pub state: HandleFlags,
}

/// Behavior shared by the three manipulators.
pub trait Manipulator {
    /// Handle group used in this manipulator's [`HandleId`]s
    fn group(&self) -> u32;

    /// Handles to register this frame, sized for the current handle scale.
    fn handles(&self, pivot: &Pivot, frame: &Frame<'_>) -> Vec<HandleSpec>;

    fn flags(&self, id: HandleId) -> HandleFlags;

    fn set_hovered(&mut self, id: HandleId, hovered: bool);

    /// Whether a drag gesture is running
    fn in_gesture(&self) -> bool;

    /// Start a gesture on `id`; `t` is the hit distance that won the press.
    fn begin(&mut self, id: HandleId, ray: &Ray, t: f32, pivot: &mut Pivot, frame: &Frame<'_>);

    /// Update the running gesture with this frame's ray.
    fn drag(&mut self, ray: &Ray, pivot: &mut Pivot, frame: &Frame<'_>);

    /// Commit the gesture through `bus` and reset transient state.
    fn end(&mut self, pivot: &mut Pivot, bus: &mut dyn CommandBus);
}

/// Color of a handle given its state.
pub fn state_color(config: &GizmoConfig, base: [f32; 4], state: HandleFlags) -> [f32; 4] {
    if state.held {
        config.colors.held
    } else if state.hovered {
        config.colors.hovered
    } else {
        base
    }
}

/// Draw list of a manipulator.
pub fn visuals(manipulator: &dyn Manipulator, pivot: &Pivot, frame: &Frame<'_>) -> Vec<HandleVisual> {
    manipulator
        .handles(pivot, frame)
        .into_iter()
        .map(|spec| {
            let state = manipulator.flags(spec.id);
            HandleVisual {
                id: spec.id,
                shape: spec.shape,
                color: state_color(frame.config, spec.color, state),
                state,
            }
        })
        .collect()
}

/// Handle scale for this frame: frozen at the gesture-start depth while dragging.
pub(crate) fn handle_scale(pivot: &Pivot, manipulator: &dyn Manipulator) -> f32 {
    pivot.handle_scale(manipulator.in_gesture())
}

/// In-plane unit vector of the ring plane pointing from `center` toward the
/// camera, used to keep the near half of a ring pickable.
pub(crate) fn facing_bitangent(camera: &CameraView, center: Vec3, normal: Vec3) -> Vec3 {
    let to_camera = camera.position - center;
    let in_plane = to_camera - normal * to_camera.dot(normal);
    in_plane
        .try_normalize()
        .unwrap_or_else(|| normal.any_orthonormal_vector())
}

/// Project `v` onto the camera's view plane.
pub(crate) fn on_view_plane(camera: &CameraView, v: Vec3) -> Option<Vec3> {
    (v - camera.forward * v.dot(camera.forward)).try_normalize()
}
