//! World-space picking ray

use glam::Vec3;

/// A half-line used for picking.
///
/// The direction is always normalized so that ray parameters are world
/// distances. Hits beyond `max_distance` (when set) are rejected by every
/// intersection test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point of the ray.
    pub origin: Vec3,
    /// Unit direction of the ray.
    pub direction: Vec3,
    /// Optional upper bound for accepted hit distances.
    pub max_distance: Option<f32>,
}

impl Ray {
    /// Create a ray, normalizing the direction.
    ///
    /// A zero direction falls back to -Z so the ray stays well formed.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or(Vec3::NEG_Z),
            max_distance: None,
        }
    }

    /// Limit accepted hits to `max_distance`.
    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = Some(max_distance);
        self
    }

    /// Point along the ray at parameter `t`.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Whether a hit at parameter `t` lies on the accepted part of the ray.
    pub fn accepts(&self, t: f32) -> bool {
        t >= 0.0 && self.max_distance.is_none_or(|max| t <= max)
    }
}
