//! Pickable handle shapes

use glam::{Vec2, Vec3};

use crate::Ray;
use crate::intersect::{
    ray_circle_intersection, ray_cylinder_intersection, ray_obb_intersection,
    ray_quad_intersection, ray_sphere_intersection, record_nearest,
};

/// Geometry of one pickable handle.
///
/// Sizes are world sizes: callers multiply their nominal dimensions by the
/// handle's distance scale before building a shape, and the same shape is
/// used for hit-testing and drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Thick axis line from `origin` along `direction`.
    Line {
        /// Start of the line.
        origin: Vec3,
        /// Unit direction.
        direction: Vec3,
        /// Full thickness; the pick radius is half of it.
        width: f32,
        /// Length along `direction`.
        length: f32,
    },
    /// Rectangle centered at `origin`.
    Quad {
        /// Center of the rectangle.
        origin: Vec3,
        /// Plane normal.
        normal: Vec3,
        /// First in-plane axis.
        tangent: Vec3,
        /// Second in-plane axis.
        bitangent: Vec3,
        /// Half extents along `tangent` and `bitangent`.
        half_extents: Vec2,
    },
    /// Thick ring around `normal`.
    Circle {
        /// Ring center.
        origin: Vec3,
        /// Ring axis.
        normal: Vec3,
        /// In-plane direction of the kept half when `half` is set.
        bitangent: Vec3,
        /// Band width.
        width: f32,
        /// Radius of the band center line.
        radius: f32,
        /// Only the half toward `bitangent` is pickable.
        half: bool,
    },
    /// Sphere.
    Sphere {
        /// Center.
        origin: Vec3,
        /// Radius.
        radius: f32,
    },
    /// Oriented box.
    Cube {
        /// Box center.
        origin: Vec3,
        /// Local X axis.
        right: Vec3,
        /// Local Y axis.
        up: Vec3,
        /// Local Z axis.
        forward: Vec3,
        /// Half size along each local axis.
        half_size: Vec3,
    },
}

impl Shape {
    /// Short name of the shape kind, for logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Line { .. } => "line",
            Shape::Quad { .. } => "quad",
            Shape::Circle { .. } => "circle",
            Shape::Sphere { .. } => "sphere",
            Shape::Cube { .. } => "cube",
        }
    }

    /// Anchor point of the shape.
    pub fn origin(&self) -> Vec3 {
        match *self {
            Shape::Line { origin, .. }
            | Shape::Quad { origin, .. }
            | Shape::Circle { origin, .. }
            | Shape::Sphere { origin, .. }
            | Shape::Cube { origin, .. } => origin,
        }
    }

    /// Nearest hit distance along `ray`, if any.
    pub fn hit(&self, ray: &Ray) -> Option<f32> {
        match *self {
            Shape::Line {
                origin,
                direction,
                width,
                length,
            } => ray_cylinder_intersection(ray, origin, origin + direction * length, width * 0.5),
            Shape::Quad {
                origin,
                normal,
                tangent,
                bitangent,
                half_extents,
            } => ray_quad_intersection(ray, origin, normal, tangent, bitangent, half_extents),
            Shape::Circle {
                origin,
                normal,
                bitangent,
                width,
                radius,
                half,
            } => ray_circle_intersection(ray, origin, normal, bitangent, radius, width, half),
            Shape::Sphere { origin, radius } => ray_sphere_intersection(ray, origin, radius),
            Shape::Cube {
                origin,
                right,
                up,
                forward,
                half_size,
            } => ray_obb_intersection(ray, origin, right, up, forward, half_size),
        }
    }

    /// Test against `ray`, folding a hit into the running `nearest` distance.
    ///
    /// Returns whether the shape was hit; `nearest` only changes on a
    /// strictly closer hit.
    pub fn intersect(&self, ray: &Ray, nearest: &mut f32) -> bool {
        record_nearest(self.hit(ray), nearest)
    }
}
