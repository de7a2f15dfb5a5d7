//! Ray intersection tests for gizmo handle picking
//!
//! Every test comes in the form `ray_*_intersection(...) -> Option<f32>`,
//! returning the ray parameter of the nearest accepted hit. Misses never
//! produce NaN or infinities: degenerate configurations (parallel rays,
//! zero-length axes) take explicit epsilon branches instead.
//!
//! To track a single running minimum across different shape kinds, feed
//! results through [`record_nearest`], which only overwrites the running
//! value on a strictly closer hit.

use glam::{Vec2, Vec3};

use crate::{EPSILON, Ray};

/// Fold a hit into a running nearest distance.
///
/// Returns whether `hit` is a hit at all. `nearest` is overwritten only
/// when the hit is strictly closer than its current value.
pub fn record_nearest(hit: Option<f32>, nearest: &mut f32) -> bool {
    match hit {
        Some(t) => {
            if t < *nearest {
                *nearest = t;
            }
            true
        }
        None => false,
    }
}

/// Ray-plane intersection.
///
/// Returns `None` when the ray is parallel to the plane or the plane lies
/// behind the ray origin.
pub fn ray_plane_intersection(ray: &Ray, plane_point: Vec3, plane_normal: Vec3) -> Option<f32> {
    let denom = ray.direction.dot(plane_normal);

    // Ray is nearly parallel to the plane
    if denom.abs() < EPSILON {
        return None;
    }

    let t = (plane_point - ray.origin).dot(plane_normal) / denom;
    ray.accepts(t).then_some(t)
}

/// World point where the ray crosses the plane, if it does.
pub fn ray_plane_point(ray: &Ray, plane_point: Vec3, plane_normal: Vec3) -> Option<Vec3> {
    ray_plane_intersection(ray, plane_point, plane_normal).map(|t| ray.at(t))
}

/// Normal of the plane that contains the line `(point, axis)` and faces the
/// ray origin.
///
/// Falls back to the plane facing the ray direction when the ray origin lies
/// on the axis line; `None` when the ray also runs along the axis.
fn edge_plane_normal(ray: &Ray, point: Vec3, axis: Vec3) -> Option<Vec3> {
    let side = axis.cross(ray.origin - point);
    let normal = side.cross(axis);
    if normal.length_squared() > EPSILON {
        return Some(normal.normalize());
    }

    let normal = axis.cross(ray.direction).cross(axis);
    (normal.length_squared() > EPSILON).then(|| normal.normalize())
}

/// Ray intersection with the edge plane of an axis.
///
/// The plane contains the axis line through `point` and is oriented toward
/// the ray origin, which collapses free 3-D pointer motion onto motion
/// along `axis`.
pub fn ray_edge_intersection(ray: &Ray, point: Vec3, axis: Vec3) -> Option<f32> {
    let normal = edge_plane_normal(ray, point, axis)?;
    ray_plane_intersection(ray, point, normal)
}

/// Point on the axis line `(point, axis)` under the ray, using the edge plane.
pub fn ray_edge_point(ray: &Ray, point: Vec3, axis: Vec3) -> Option<Vec3> {
    let axis = axis.normalize_or_zero();
    if axis == Vec3::ZERO {
        return None;
    }
    let t = ray_edge_intersection(ray, point, axis)?;
    let along = (ray.at(t) - point).dot(axis);
    Some(point + axis * along)
}

/// Ray vs a cylinder around the axis from `p` to `q`.
///
/// The side surface is solved in closed form from the cross product of the
/// ray direction and the axis. When the ray runs parallel to the axis the
/// test falls back to the perpendicular distance and reports the near cap.
/// When the side hit lies outside the `[0, length]` span along the axis, the
/// cap planes are solved instead and the nearer one wins; a cap hit farther
/// than `radius` from the cap center is rejected.
pub fn ray_cylinder_intersection(ray: &Ray, p: Vec3, q: Vec3, radius: f32) -> Option<f32> {
    let axis = q - p;
    let length = axis.length();
    if length < EPSILON || radius <= 0.0 {
        return None;
    }
    let axis = axis / length;
    let rc = ray.origin - p;

    let n = ray.direction.cross(axis);
    let n_len = n.length();

    if n_len < EPSILON {
        // Parallel to the axis: inside the radius means we enter through a cap
        let perp = rc - axis * rc.dot(axis);
        if perp.length() > radius {
            return None;
        }
        return nearest_cap_intersection(ray, p, q, axis, radius);
    }

    let n = n / n_len;
    let d = rc.dot(n).abs();
    if d > radius {
        return None;
    }

    // Closest approach along the ray, then half-chord through the cylinder
    let t_mid = -rc.cross(axis).dot(n) / n_len;
    let o = n.cross(axis).normalize();
    let s = ((radius * radius - d * d).sqrt() / ray.direction.dot(o)).abs();
    let t_in = t_mid - s;
    let t_out = t_mid + s;

    let t = if t_in >= 0.0 { t_in } else { t_out };
    if t < 0.0 {
        return None;
    }

    // Starting inside the infinite cylinder but beyond the span means the
    // first surface crossed is a cap, whatever the side solution says
    let origin_along = rc.dot(axis);
    let side_first = t_in >= 0.0 || (0.0..=length).contains(&origin_along);
    let along = (ray.at(t) - p).dot(axis);
    if side_first && (0.0..=length).contains(&along) {
        return ray.accepts(t).then_some(t);
    }

    nearest_cap_intersection(ray, p, q, axis, radius)
}

/// Ray vs a capped segment cylinder from `a` to `b`.
///
/// Parameterizes the segment as `a + s * (b - a)` with `s` in `[0, 1]` and
/// solves the projected quadratic directly. Side hits outside the range fall
/// through to the end caps.
pub fn ray_segment_cylinder_intersection(
    ray: &Ray,
    a: Vec3,
    b: Vec3,
    radius: f32,
) -> Option<f32> {
    let ab = b - a;
    let ab_len_sq = ab.length_squared();
    if ab_len_sq < EPSILON || radius <= 0.0 {
        return None;
    }
    let axis = ab / ab_len_sq.sqrt();

    // Project ray direction and origin offset onto the plane perpendicular to the axis
    let d = ray.direction - axis * ray.direction.dot(axis);
    let o = (ray.origin - a) - axis * (ray.origin - a).dot(axis);

    let qa = d.dot(d);
    if qa < EPSILON {
        // Parallel: only the caps can be hit
        if o.length() > radius {
            return None;
        }
        return nearest_cap_intersection(ray, a, b, axis, radius);
    }

    let qb = 2.0 * d.dot(o);
    let qc = o.dot(o) - radius * radius;
    let discriminant = qb * qb - 4.0 * qa * qc;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    let t_in = (-qb - sqrt_disc) / (2.0 * qa);
    let t_out = (-qb + sqrt_disc) / (2.0 * qa);
    let t = if t_in >= 0.0 { t_in } else { t_out };
    if t < 0.0 {
        return None;
    }

    let origin_s = (ray.origin - a).dot(ab) / ab_len_sq;
    let side_first = t_in >= 0.0 || (0.0..=1.0).contains(&origin_s);
    let s = (ray.at(t) - a).dot(ab) / ab_len_sq;
    if side_first && (0.0..=1.0).contains(&s) {
        return ray.accepts(t).then_some(t);
    }

    // Explicit end caps
    nearest_cap_intersection(ray, a, b, axis, radius)
}

/// Hit on the disc of `radius` around `center` in the plane with `normal`.
fn cap_intersection(ray: &Ray, center: Vec3, normal: Vec3, radius: f32) -> Option<f32> {
    let t = ray_plane_intersection(ray, center, normal)?;
    if (ray.at(t) - center).length() > radius {
        return None;
    }
    Some(t)
}

/// Nearer of the two end-cap hits of a cylinder, if any.
fn nearest_cap_intersection(
    ray: &Ray,
    start: Vec3,
    end: Vec3,
    axis: Vec3,
    radius: f32,
) -> Option<f32> {
    let start_hit = cap_intersection(ray, start, axis, radius);
    let end_hit = cap_intersection(ray, end, axis, radius);
    match (start_hit, end_hit) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (hit, None) | (None, hit) => hit,
    }
}

/// Ray vs a rectangle centered at `origin`.
///
/// The normal is flipped toward the ray so the quad is pickable from both
/// sides. `half_extents` bound the projected coordinates along `tangent`
/// and `bitangent`.
pub fn ray_quad_intersection(
    ray: &Ray,
    origin: Vec3,
    normal: Vec3,
    tangent: Vec3,
    bitangent: Vec3,
    half_extents: Vec2,
) -> Option<f32> {
    let normal = if normal.dot(ray.direction) > 0.0 {
        -normal
    } else {
        normal
    };
    let t = ray_plane_intersection(ray, origin, normal)?;

    let local = ray.at(t) - origin;
    let u = local.dot(tangent);
    let v = local.dot(bitangent);
    if u.abs() > half_extents.x || v.abs() > half_extents.y {
        return None;
    }

    Some(t)
}

/// Ray vs a thick ring.
///
/// The ring is modeled as a capped cylinder of radius `radius + width / 2`
/// and height `width` around `normal`, hollowed out below
/// `radius - width / 2`. With `half` set, hits on the far side of the ring
/// (negative along `bitangent`) are rejected.
pub fn ray_circle_intersection(
    ray: &Ray,
    origin: Vec3,
    normal: Vec3,
    bitangent: Vec3,
    radius: f32,
    width: f32,
    half: bool,
) -> Option<f32> {
    let half_band = width * 0.5;
    let a = origin - normal * half_band;
    let b = origin + normal * half_band;
    let t = ray_segment_cylinder_intersection(ray, a, b, radius + half_band)?;

    let offset = ray.at(t) - origin;
    let radial = offset - normal * offset.dot(normal);
    if radial.length() < radius - half_band {
        return None;
    }
    if half && offset.dot(bitangent) < 0.0 {
        return None;
    }

    Some(t)
}

/// Ray-sphere intersection, nearest non-negative root.
pub fn ray_sphere_intersection(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;
    let discriminant = b * b - c;

    if discriminant < 0.0 {
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    let near = -b - sqrt_disc;
    let t = if near >= 0.0 { near } else { -b + sqrt_disc };
    ray.accepts(t).then_some(t)
}

/// Ray vs an oriented box.
///
/// The ray is expressed in the box frame with dot products against `right`,
/// `up` and `forward`, then clipped by the three slabs. A ray starting
/// inside the box reports its exit distance.
pub fn ray_obb_intersection(
    ray: &Ray,
    origin: Vec3,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
    half_size: Vec3,
) -> Option<f32> {
    let delta = origin - ray.origin;
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for (axis, half) in [(right, half_size.x), (up, half_size.y), (forward, half_size.z)] {
        let e = axis.dot(delta);
        let f = axis.dot(ray.direction);

        if f.abs() > EPSILON {
            let mut t1 = (e - half) / f;
            let mut t2 = (e + half) / f;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
        } else if e.abs() > half {
            // Parallel to this slab and outside it
            return None;
        }
    }

    if t_min >= t_max || t_max < 0.0 {
        return None;
    }

    let t = if t_min >= 0.0 { t_min } else { t_max };
    ray.accepts(t).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ray(origin: Vec3, dir: Vec3) -> Ray {
        Ray::new(origin, dir)
    }

    #[test]
    fn test_record_nearest_only_on_closer_hit() {
        let mut nearest = f32::MAX;
        assert!(record_nearest(Some(3.0), &mut nearest));
        assert_eq!(nearest, 3.0);
        // A farther hit still reports a hit but keeps the minimum
        assert!(record_nearest(Some(5.0), &mut nearest));
        assert_eq!(nearest, 3.0);
        assert!(!record_nearest(None, &mut nearest));
        assert_eq!(nearest, 3.0);
    }

    #[test]
    fn test_ray_hits_cylinder_side() {
        let r = ray(Vec3::new(0.5, 0.0, 1.0), Vec3::NEG_Z);
        let t = ray_cylinder_intersection(&r, Vec3::ZERO, Vec3::X, 0.1).unwrap();
        assert_relative_eq!(t, 0.9, epsilon = 1e-5);
    }

    #[test]
    fn test_ray_misses_cylinder() {
        let r = ray(Vec3::new(0.5, 0.0, 1.0), Vec3::Z);
        assert!(ray_cylinder_intersection(&r, Vec3::ZERO, Vec3::X, 0.1).is_none());
    }

    #[test]
    fn test_ray_outside_cylinder_span() {
        let r = ray(Vec3::new(2.0, 0.0, 1.0), Vec3::NEG_Z);
        assert!(ray_cylinder_intersection(&r, Vec3::ZERO, Vec3::X, 0.1).is_none());
    }

    #[test]
    fn test_cylinder_parallel_ray_hits_cap() {
        let r = ray(Vec3::new(-2.0, 0.05, 0.0), Vec3::X);
        let t = ray_cylinder_intersection(&r, Vec3::ZERO, Vec3::X, 0.1).unwrap();
        assert_relative_eq!(t, 2.0, epsilon = 1e-5);

        let wide = ray(Vec3::new(-2.0, 0.5, 0.0), Vec3::X);
        assert!(ray_cylinder_intersection(&wide, Vec3::ZERO, Vec3::X, 0.1).is_none());
    }

    #[test]
    fn test_cylinder_oblique_ray_enters_through_cap() {
        // Steep ray entering the end face at x = 1
        let r = ray(Vec3::new(1.5, 0.0, 0.05), Vec3::new(-1.0, 0.0, -0.05));
        let t = ray_cylinder_intersection(&r, Vec3::ZERO, Vec3::X, 0.1).unwrap();
        let hit = r.at(t);
        assert_relative_eq!(hit.x, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_segment_cylinder_matches_side_hit() {
        let r = ray(Vec3::new(0.5, 0.0, 1.0), Vec3::NEG_Z);
        let t = ray_segment_cylinder_intersection(&r, Vec3::ZERO, Vec3::X, 0.1).unwrap();
        assert_relative_eq!(t, 0.9, epsilon = 1e-5);

        let outside = ray(Vec3::new(1.5, 0.0, 1.0), Vec3::NEG_Z);
        assert!(ray_segment_cylinder_intersection(&outside, Vec3::ZERO, Vec3::X, 0.1).is_none());
    }

    #[test]
    fn test_segment_cylinder_parallel() {
        let r = ray(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let t = ray_segment_cylinder_intersection(&r, Vec3::ZERO, Vec3::Z, 0.5).unwrap();
        assert_relative_eq!(t, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_plane_intersection() {
        let r = ray(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let t = ray_plane_intersection(&r, Vec3::ZERO, Vec3::Z).unwrap();
        assert_relative_eq!(t, 5.0);
        // Parallel
        let p = ray(Vec3::new(0.0, 0.0, 5.0), Vec3::X);
        assert!(ray_plane_intersection(&p, Vec3::ZERO, Vec3::Z).is_none());
        // Behind
        let b = ray(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(ray_plane_intersection(&b, Vec3::ZERO, Vec3::Z).is_none());
    }

    #[test]
    fn test_edge_point_projects_onto_axis() {
        // Camera above and in front of the X axis, looking down at x = 1.3
        let origin = Vec3::new(1.3, 2.0, 4.0);
        let target = Vec3::new(1.3, 0.0, 0.0);
        let r = ray(origin, target - origin);
        let point = ray_edge_point(&r, Vec3::ZERO, Vec3::X).unwrap();
        assert!(point.abs_diff_eq(Vec3::new(1.3, 0.0, 0.0), 1e-4));
    }

    #[test]
    fn test_edge_point_along_axis_is_none() {
        let r = ray(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        assert!(ray_edge_point(&r, Vec3::ZERO, Vec3::X).is_none());
    }

    #[test]
    fn test_quad_bounds_and_sidedness() {
        let from_front = ray(Vec3::new(0.1, 0.1, 3.0), Vec3::NEG_Z);
        let from_back = ray(Vec3::new(0.1, 0.1, -3.0), Vec3::Z);
        let half = Vec2::splat(0.25);
        let hit_front =
            ray_quad_intersection(&from_front, Vec3::ZERO, Vec3::Z, Vec3::X, Vec3::Y, half);
        let hit_back =
            ray_quad_intersection(&from_back, Vec3::ZERO, Vec3::Z, Vec3::X, Vec3::Y, half);
        assert_relative_eq!(hit_front.unwrap(), 3.0);
        assert_relative_eq!(hit_back.unwrap(), 3.0);

        let outside = ray(Vec3::new(0.3, 0.0, 3.0), Vec3::NEG_Z);
        assert!(ray_quad_intersection(&outside, Vec3::ZERO, Vec3::Z, Vec3::X, Vec3::Y, half).is_none());
    }

    #[test]
    fn test_circle_band_face_on() {
        // Looking down the ring normal: the band is hit, the hole is not
        let on_band = ray(Vec3::new(1.0, 0.0, 5.0), Vec3::NEG_Z);
        let in_hole = ray(Vec3::new(0.2, 0.0, 5.0), Vec3::NEG_Z);
        let t = ray_circle_intersection(&on_band, Vec3::ZERO, Vec3::Z, Vec3::X, 1.0, 0.1, false);
        assert_relative_eq!(t.unwrap(), 4.95, epsilon = 1e-5);
        assert!(
            ray_circle_intersection(&in_hole, Vec3::ZERO, Vec3::Z, Vec3::X, 1.0, 0.1, false)
                .is_none()
        );
    }

    #[test]
    fn test_circle_half_rejects_far_side() {
        let near_side = ray(Vec3::new(1.0, 0.0, 5.0), Vec3::NEG_Z);
        let far_side = ray(Vec3::new(-1.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(
            ray_circle_intersection(&near_side, Vec3::ZERO, Vec3::Z, Vec3::X, 1.0, 0.1, true)
                .is_some()
        );
        assert!(
            ray_circle_intersection(&far_side, Vec3::ZERO, Vec3::Z, Vec3::X, 1.0, 0.1, true)
                .is_none()
        );
    }

    #[test]
    fn test_circle_edge_on() {
        // Ring in the XY plane seen edge-on from +X
        let r = ray(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_X);
        let t = ray_circle_intersection(&r, Vec3::ZERO, Vec3::Z, Vec3::X, 1.0, 0.1, false);
        assert_relative_eq!(t.unwrap(), 3.95, epsilon = 1e-4);
    }

    #[test]
    fn test_sphere_analytic_near_root() {
        for (d, radius) in [(5.0_f32, 0.1_f32), (2.0, 0.5), (10.0, 3.0)] {
            let r = ray(Vec3::ZERO, Vec3::Z);
            let t = ray_sphere_intersection(&r, Vec3::new(0.0, 0.0, d), radius).unwrap();
            assert_relative_eq!(t, d - radius, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_sphere_from_inside_and_behind() {
        let inside = ray(Vec3::ZERO, Vec3::X);
        let t = ray_sphere_intersection(&inside, Vec3::ZERO, 2.0).unwrap();
        assert_relative_eq!(t, 2.0, epsilon = 1e-6);

        let behind = ray(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
        assert!(ray_sphere_intersection(&behind, Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_obb_forward_axis_near_face() {
        let r = ray(Vec3::ZERO, Vec3::Z);
        let t = ray_obb_intersection(
            &r,
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::X,
            Vec3::Y,
            Vec3::Z,
            Vec3::splat(0.5),
        )
        .unwrap();
        assert_relative_eq!(t, 4.5, epsilon = 1e-5);
    }

    #[test]
    fn test_obb_rotated() {
        // Box rotated 45 degrees about Y, hit along its diagonal
        let s = std::f32::consts::FRAC_1_SQRT_2;
        let right = Vec3::new(s, 0.0, -s);
        let forward = Vec3::new(s, 0.0, s);
        let r = ray(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let t = ray_obb_intersection(&r, Vec3::ZERO, right, Vec3::Y, forward, Vec3::splat(1.0))
            .unwrap();
        assert_relative_eq!(t, 5.0 - std::f32::consts::SQRT_2, epsilon = 1e-4);
    }

    #[test]
    fn test_obb_miss_parallel_outside_slab() {
        let r = ray(Vec3::new(0.0, 2.0, 0.0), Vec3::Z);
        let hit = ray_obb_intersection(
            &r,
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::X,
            Vec3::Y,
            Vec3::Z,
            Vec3::splat(0.5),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_max_distance_rejects_far_hits() {
        let r = ray(Vec3::ZERO, Vec3::Z).with_max_distance(3.0);
        assert!(ray_sphere_intersection(&r, Vec3::new(0.0, 0.0, 5.0), 0.5).is_none());
        assert!(ray_sphere_intersection(&r, Vec3::new(0.0, 0.0, 2.0), 0.5).is_some());
    }
}
