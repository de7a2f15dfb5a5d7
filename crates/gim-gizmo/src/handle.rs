//! Pickable handle records
//!
//! A [`Handle`] is one pickable region plus the callbacks fired by the
//! [`Dispatcher`](crate::Dispatcher) as the pointer enters, presses, drags
//! and releases it. Handles are rebuilt every frame by their owner; only the
//! currently hovered or held one outlives the frame inside the dispatcher.
//!
//! Callbacks receive a mutable context `C` chosen by the owner of the
//! dispatcher, so they can reach manipulator state and the pivot without
//! shared ownership. Unset callbacks are skipped silently, which lets a
//! subsystem register passthrough handles that only need hover feedback.

use std::fmt;

use gim_geometry::{Ray, Shape};

/// Stable identity of a handle across frames.
///
/// Built from an owner group and an index within the group so that handles
/// of different subsystems never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    pub const fn new(group: u32, index: u32) -> Self {
        Self(((group as u64) << 32) | index as u64)
    }

    pub const fn group(self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub const fn index(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group(), self.index())
    }
}

pub type EnterFn<C> = Box<dyn FnMut(&mut C, HandleId)>;
pub type ExitFn<C> = Box<dyn FnMut(&mut C, HandleId)>;
pub type PressedFn<C> = Box<dyn FnMut(&mut C, HandleId, &Ray, f32)>;
pub type ReleasedFn<C> = Box<dyn FnMut(&mut C, HandleId)>;
pub type HeldFn<C> = Box<dyn FnMut(&mut C, HandleId, &Ray)>;

/// One pickable handle for a single frame.
pub struct Handle<C> {
    id: HandleId,
    priority: u32,
    shape: Shape,
    on_enter: Option<EnterFn<C>>,
    on_exit: Option<ExitFn<C>>,
    on_pressed: Option<PressedFn<C>>,
    on_released: Option<ReleasedFn<C>>,
    while_held: Option<HeldFn<C>>,
}

impl<C> Handle<C> {
    /// Create a handle without callbacks.
    ///
    /// Higher `priority` tiers win over lower ones regardless of distance.
    pub fn new(id: HandleId, priority: u32, shape: Shape) -> Self {
        Self {
            id,
            priority,
            shape,
            on_enter: None,
            on_exit: None,
            on_pressed: None,
            on_released: None,
            while_held: None,
        }
    }

    pub fn on_enter(mut self, f: impl FnMut(&mut C, HandleId) + 'static) -> Self {
        self.on_enter = Some(Box::new(f));
        self
    }

    pub fn on_exit(mut self, f: impl FnMut(&mut C, HandleId) + 'static) -> Self {
        self.on_exit = Some(Box::new(f));
        self
    }

    /// Called once on press with the ray and hit distance that made this
    /// handle the winner.
    pub fn on_pressed(mut self, f: impl FnMut(&mut C, HandleId, &Ray, f32) + 'static) -> Self {
        self.on_pressed = Some(Box::new(f));
        self
    }

    pub fn on_released(mut self, f: impl FnMut(&mut C, HandleId) + 'static) -> Self {
        self.on_released = Some(Box::new(f));
        self
    }

    /// Called every frame between press and release with the frame's ray.
    pub fn while_held(mut self, f: impl FnMut(&mut C, HandleId, &Ray) + 'static) -> Self {
        self.while_held = Some(Box::new(f));
        self
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub(crate) fn fire_enter(&mut self, ctx: &mut C) {
        if let Some(f) = self.on_enter.as_mut() {
            f(ctx, self.id);
        }
    }

    pub(crate) fn fire_exit(&mut self, ctx: &mut C) {
        if let Some(f) = self.on_exit.as_mut() {
            f(ctx, self.id);
        }
    }

    pub(crate) fn fire_pressed(&mut self, ctx: &mut C, ray: &Ray, t: f32) {
        if let Some(f) = self.on_pressed.as_mut() {
            f(ctx, self.id, ray, t);
        }
    }

    pub(crate) fn fire_released(&mut self, ctx: &mut C) {
        if let Some(f) = self.on_released.as_mut() {
            f(ctx, self.id);
        }
    }

    pub(crate) fn fire_held(&mut self, ctx: &mut C, ray: &Ray) {
        if let Some(f) = self.while_held.as_mut() {
            f(ctx, self.id, ray);
        }
    }
}

impl<C> fmt::Debug for Handle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

/// Hover and click state of one handle, read when drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandleFlags {
    pub hovered: bool,
    pub held: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_handle_id_parts() {
        let id = HandleId::new(2, 7);
        assert_eq!(id.group(), 2);
        assert_eq!(id.index(), 7);
        assert_eq!(id.to_string(), "2:7");
        assert_ne!(HandleId::new(1, 0), HandleId::new(0, 1));
    }

    #[test]
    fn test_unset_callbacks_are_noops() {
        let mut handle: Handle<u32> = Handle::new(
            HandleId::new(0, 0),
            0,
            Shape::Sphere {
                origin: Vec3::ZERO,
                radius: 1.0,
            },
        );
        let mut count = 0;
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        handle.fire_enter(&mut count);
        handle.fire_pressed(&mut count, &ray, 1.0);
        handle.fire_held(&mut count, &ray);
        handle.fire_released(&mut count);
        handle.fire_exit(&mut count);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_callbacks_receive_context_and_id() {
        let id = HandleId::new(0, 3);
        let mut handle: Handle<Vec<(HandleId, f32)>> = Handle::new(
            id,
            0,
            Shape::Sphere {
                origin: Vec3::ZERO,
                radius: 1.0,
            },
        )
        .on_pressed(|log: &mut Vec<(HandleId, f32)>, id, _ray, t| log.push((id, t)));

        let mut log = Vec::new();
        handle.fire_pressed(&mut log, &Ray::new(Vec3::ZERO, Vec3::Z), 2.5);
        assert_eq!(log, vec![(id, 2.5)]);
    }
}
