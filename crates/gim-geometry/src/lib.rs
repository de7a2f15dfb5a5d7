//! Gizmo picking geometry
//!
//! Pure geometry used by the gizmo interaction engine to pick handles with
//! a world-space ray.
//!
//! # Module Structure
//!
//! ```text
//! gim-geometry/
//! ├── ray.rs        # Picking ray with optional max distance
//! ├── camera.rs     # Per-frame camera snapshot, unprojection, distance scale
//! ├── intersect.rs  # Ray vs cylinder, plane, quad, ring, sphere, oriented box
//! └── shape.rs      # Tagged handle shapes dispatching to the tests above
//! ```

pub mod camera;
pub mod intersect;
pub mod ray;
pub mod shape;

pub use camera::CameraView;
pub use intersect::record_nearest;
pub use ray::Ray;
pub use shape::Shape;

/// Tolerance used by every degenerate-case branch in this crate.
pub const EPSILON: f32 = 1e-6;
