//! Interaction dispatcher
//!
//! Collects candidate handles every frame, picks a winner with the frame's
//! ray and drives the hover/press/hold/release state machine:
//!
//! ```text
//! None ──enter──▶ Hovered ──press──▶ Held ──release──▶ None
//!                    │                 │
//!                    └──exit──▶ None   └─ while_held every frame
//! ```
//!
//! Winner selection: the highest priority tier with at least one hit wins;
//! within a tier the nearest hit wins and exact ties keep the handle that
//! was registered first.

use gim_geometry::Ray;

use crate::handle::{Handle, HandleId};

/// Per-frame handle picking and state machine.
///
/// `C` is the context handed to every handle callback.
pub struct Dispatcher<C> {
    /// Candidates registered this frame, drained by [`Dispatcher::interact`]
    queue: Vec<Handle<C>>,
    /// Currently hovered or held handle
    active: Option<Handle<C>>,
    last_ray: Option<Ray>,
    last_t: f32,
    held: bool,
}

impl<C> Default for Dispatcher<C> {
    fn default() -> Self {
        Self {
            queue: Vec::new(),
            active: None,
            last_ray: None,
            last_t: f32::MAX,
            held: false,
        }
    }
}

impl<C> Dispatcher<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a candidate for this frame.
    pub fn add_interactable(&mut self, handle: Handle<C>) {
        self.queue.push(handle);
    }

    /// Number of candidates registered since the last [`Dispatcher::interact`].
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Identity of the hovered or held handle.
    pub fn active_id(&self) -> Option<HandleId> {
        self.active.as_ref().map(Handle::id)
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Hit distance of the active handle on the last hit-tested frame.
    pub fn last_hit_distance(&self) -> Option<f32> {
        self.active.as_ref().map(|_| self.last_t)
    }

    /// Run one frame of interaction with `ray`.
    ///
    /// While held, hit-testing is skipped and the held handle's
    /// `while_held` callback runs instead. The candidate queue is always
    /// drained completely.
    pub fn interact(&mut self, ray: &Ray, ctx: &mut C) {
        if self.held {
            self.queue.clear();
            if let Some(active) = self.active.as_mut() {
                active.fire_held(ctx, ray);
            }
            self.last_ray = Some(*ray);
            return;
        }

        let candidates = self.queue.len();
        let mut winner: Option<Handle<C>> = None;
        let mut nearest = f32::MAX;

        for handle in self.queue.drain(..) {
            let Some(t) = handle.shape().hit(ray) else {
                continue;
            };
            match winner.as_ref().map(Handle::priority) {
                // Lower tier never displaces a higher provisional winner
                Some(tier) if handle.priority() < tier => {}
                Some(tier) if handle.priority() == tier => {
                    if t < nearest {
                        nearest = t;
                        winner = Some(handle);
                    }
                }
                // First hit, or a strictly higher tier resets the running minimum
                _ => {
                    nearest = t;
                    winner = Some(handle);
                }
            }
        }

        tracing::trace!(
            candidates,
            winner = ?winner.as_ref().map(Handle::id),
            "hit-test pass"
        );

        let previous = self.active.take();
        match (previous, winner) {
            (Some(previous), Some(current)) if previous.id() == current.id() => {
                self.active = Some(current);
            }
            (previous, current) => {
                if let Some(mut previous) = previous {
                    tracing::debug!(id = %previous.id(), "handle exited");
                    previous.fire_exit(ctx);
                }
                if let Some(mut current) = current {
                    tracing::debug!(id = %current.id(), t = nearest, "handle entered");
                    current.fire_enter(ctx);
                    self.active = Some(current);
                }
            }
        }

        if self.active.is_some() {
            self.last_ray = Some(*ray);
            self.last_t = nearest;
        } else {
            self.last_ray = None;
            self.last_t = f32::MAX;
        }
    }

    /// Drop the hovered handle, firing its `on_exit`.
    ///
    /// Used when the registered handles stop matching what is on screen
    /// before the next [`Dispatcher::interact`]. Ignored while held.
    pub fn clear_hover(&mut self, ctx: &mut C) -> bool {
        if self.held {
            return false;
        }
        let Some(mut previous) = self.active.take() else {
            return false;
        };
        tracing::debug!(id = %previous.id(), "hover cleared");
        previous.fire_exit(ctx);
        self.last_ray = None;
        self.last_t = f32::MAX;
        true
    }

    /// External press signal.
    ///
    /// Latches the hovered handle as held and fires its `on_pressed` with the
    /// ray and distance of the last hit-test. Returns whether a handle was
    /// pressed.
    pub fn press(&mut self, ctx: &mut C) -> bool {
        if self.held {
            tracing::debug!("press ignored: a handle is already held");
            return false;
        }
        let (Some(active), Some(ray)) = (self.active.as_mut(), self.last_ray) else {
            return false;
        };

        self.held = true;
        tracing::debug!(id = %active.id(), "handle pressed");
        active.fire_pressed(ctx, &ray, self.last_t);
        true
    }

    /// External release signal.
    ///
    /// Fires `on_released` on the held handle and returns to the idle state;
    /// the next hit-test decides whether the handle is hovered again.
    pub fn release(&mut self, ctx: &mut C) -> bool {
        if !self.held {
            tracing::debug!("release ignored: no handle is held");
            return false;
        }
        self.held = false;

        if let Some(mut active) = self.active.take() {
            tracing::debug!(id = %active.id(), "handle released");
            active.fire_released(ctx);
        }
        self.last_ray = None;
        self.last_t = f32::MAX;
        true
    }
}
