//! Pivot abstraction over the manipulated target
//!
//! Manipulators only ever talk to [`Pivot`]. What is actually being moved is
//! hidden behind the [`PivotTarget`] capability trait, which has two thin
//! adapters:
//!
//! - [`NodeTarget`] for a scene node whose transform is shared with the
//!   editor ([`SharedTransform`])
//! - [`FnTarget`] for anything exposed through free-standing get/set
//!   closures, e.g. the extent of a workspace volume
//!
//! The pivot keeps a "last" snapshot of position, rotation and scale. It is
//! captured once per gesture by [`Pivot::gather_start`] and serves both as
//! the drag reference and as the value restored by undo.

use std::sync::Arc;

use gim_geometry::CameraView;
use glam::{Quat, Vec3};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::manipulator::GizmoSpace;

/// Position, rotation and scale of a scene node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

pub type SharedTransform = Arc<Mutex<Transform>>;

/// Read/write access to whatever a pivot manipulates.
pub trait PivotTarget {
    fn position(&self) -> Vec3;
    fn rotation(&self) -> Quat;
    fn scale(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn set_rotation(&mut self, rotation: Quat);
    fn set_scale(&mut self, scale: Vec3);
}

/// Target bound to a shared scene-node transform.
#[derive(Debug, Clone)]
pub struct NodeTarget {
    node: SharedTransform,
}

impl NodeTarget {
    pub fn new(node: SharedTransform) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &SharedTransform {
        &self.node
    }
}

impl PivotTarget for NodeTarget {
    fn position(&self) -> Vec3 {
        self.node.lock().position
    }

    fn rotation(&self) -> Quat {
        self.node.lock().rotation
    }

    fn scale(&self) -> Vec3 {
        self.node.lock().scale
    }

    fn set_position(&mut self, position: Vec3) {
        self.node.lock().position = position;
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.node.lock().rotation = rotation;
    }

    fn set_scale(&mut self, scale: Vec3) {
        self.node.lock().scale = scale;
    }
}

type Getter<T> = Box<dyn Fn() -> T>;
type Setter<T> = Box<dyn FnMut(T)>;

/// Target bound to free-standing get/set closures.
///
/// Rotation and scale are optional: without them the target reports
/// identity rotation and unit scale and ignores writes.
pub struct FnTarget {
    position: (Getter<Vec3>, Setter<Vec3>),
    rotation: Option<(Getter<Quat>, Setter<Quat>)>,
    scale: Option<(Getter<Vec3>, Setter<Vec3>)>,
}

impl FnTarget {
    pub fn new(get: impl Fn() -> Vec3 + 'static, set: impl FnMut(Vec3) + 'static) -> Self {
        Self {
            position: (Box::new(get), Box::new(set)),
            rotation: None,
            scale: None,
        }
    }

    pub fn with_rotation(
        mut self,
        get: impl Fn() -> Quat + 'static,
        set: impl FnMut(Quat) + 'static,
    ) -> Self {
        self.rotation = Some((Box::new(get), Box::new(set)));
        self
    }

    pub fn with_scale(
        mut self,
        get: impl Fn() -> Vec3 + 'static,
        set: impl FnMut(Vec3) + 'static,
    ) -> Self {
        self.scale = Some((Box::new(get), Box::new(set)));
        self
    }
}

impl PivotTarget for FnTarget {
    fn position(&self) -> Vec3 {
        (self.position.0)()
    }

    fn rotation(&self) -> Quat {
        self.rotation.as_ref().map_or(Quat::IDENTITY, |(get, _)| get())
    }

    fn scale(&self) -> Vec3 {
        self.scale.as_ref().map_or(Vec3::ONE, |(get, _)| get())
    }

    fn set_position(&mut self, position: Vec3) {
        (self.position.1)(position);
    }

    fn set_rotation(&mut self, rotation: Quat) {
        if let Some((_, set)) = self.rotation.as_mut() {
            set(rotation);
        }
    }

    fn set_scale(&mut self, scale: Vec3) {
        if let Some((_, set)) = self.scale.as_mut() {
            set(scale);
        }
    }
}

/// The manipulated target as seen by manipulators.
pub struct Pivot {
    target: Box<dyn PivotTarget>,
    last_position: Vec3,
    last_rotation: Quat,
    last_scale: Vec3,
    /// World size of one handle unit at unit view depth
    screen_scale: f32,
    /// View depth of the pivot this frame
    distance_scale: f32,
    /// View depth of the pivot when the current gesture started
    start_scale: f32,
}

impl Pivot {
    /// Wrap a target; the "last" snapshot starts at its current transform.
    pub fn new(target: impl PivotTarget + 'static) -> Self {
        let target: Box<dyn PivotTarget> = Box::new(target);
        Self {
            last_position: target.position(),
            last_rotation: target.rotation(),
            last_scale: target.scale(),
            target,
            screen_scale: 1.0,
            distance_scale: 1.0,
            start_scale: 1.0,
        }
    }

    /// Pivot over a shared scene-node transform.
    pub fn for_node(node: SharedTransform) -> Self {
        Self::new(NodeTarget::new(node))
    }

    /// Recompute screen and distance scale for this frame.
    pub fn update_screen_scale(&mut self, camera: &CameraView, screen_pixels: f32) {
        self.screen_scale = screen_pixels * camera.pixel_size_at_unit_depth();
        self.distance_scale = camera.distance_scale(self.position());
    }

    pub fn screen_scale(&self) -> f32 {
        self.screen_scale
    }

    pub fn distance_scale(&self) -> f32 {
        self.distance_scale
    }

    pub fn start_scale(&self) -> f32 {
        self.start_scale
    }

    /// World size of one nominal handle unit.
    ///
    /// During a gesture the depth captured at press is used, so the handle
    /// under the pointer keeps the size it had when it was grabbed.
    pub fn handle_scale(&self, in_gesture: bool) -> f32 {
        let depth = if in_gesture {
            self.start_scale
        } else {
            self.distance_scale
        };
        depth * self.screen_scale
    }

    /// Snapshot the current transform as the gesture reference.
    pub fn gather_start(&mut self) {
        self.last_position = self.target.position();
        self.last_rotation = self.target.rotation();
        self.last_scale = self.target.scale();
        self.start_scale = self.distance_scale;
    }

    pub fn position(&self) -> Vec3 {
        self.target.position()
    }

    pub fn rotation(&self) -> Quat {
        self.target.rotation()
    }

    pub fn scale(&self) -> Vec3 {
        self.target.scale()
    }

    pub fn last_position(&self) -> Vec3 {
        self.last_position
    }

    pub fn last_rotation(&self) -> Quat {
        self.last_rotation
    }

    pub fn last_scale(&self) -> Vec3 {
        self.last_scale
    }

    /// Write a position; the snapshot only follows when `commit_last` is set.
    ///
    /// The snapshot is read back from the target, so targets that ignore a
    /// write keep a snapshot matching what they report.
    pub fn set_position(&mut self, position: Vec3, commit_last: bool) {
        self.target.set_position(position);
        if commit_last {
            self.last_position = self.target.position();
        }
    }

    pub fn set_rotation(&mut self, rotation: Quat, commit_last: bool) {
        self.target.set_rotation(rotation);
        if commit_last {
            self.last_rotation = self.target.rotation();
        }
    }

    pub fn set_scale(&mut self, scale: Vec3, commit_last: bool) {
        self.target.set_scale(scale);
        if commit_last {
            self.last_scale = self.target.scale();
        }
    }

    pub fn world_axes(&self) -> [Vec3; 3] {
        [Vec3::X, Vec3::Y, Vec3::Z]
    }

    /// Target-local basis vectors in world space.
    pub fn local_axes(&self) -> [Vec3; 3] {
        let rotation = self.rotation();
        [rotation * Vec3::X, rotation * Vec3::Y, rotation * Vec3::Z]
    }

    pub fn axes(&self, space: GizmoSpace) -> [Vec3; 3] {
        match space {
            GizmoSpace::Global => self.world_axes(),
            GizmoSpace::Local => self.local_axes(),
        }
    }
}

impl std::fmt::Debug for Pivot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pivot")
            .field("position", &self.position())
            .field("rotation", &self.rotation())
            .field("scale", &self.scale())
            .field("last_position", &self.last_position)
            .field("last_rotation", &self.last_rotation)
            .field("last_scale", &self.last_scale)
            .field("start_scale", &self.start_scale)
            .finish()
    }
}
