//! Gizmo Interaction and Manipulation
//!
//! This crate provides:
//! - Handle records with hover/press/hold/release callbacks
//! - A priority dispatcher picking one handle per frame with a ray
//! - A pivot abstraction over scene nodes or closure-backed targets
//! - Translate, rotate and scale manipulators with snapping
//! - A command bus seam with an in-memory undo history
//! - RON-backed gizmo configuration

pub mod command;
pub mod config;
pub mod dispatcher;
pub mod gizmo;
pub mod handle;
pub mod manipulator;
pub mod pivot;

// Re-exports for convenience
pub use command::{
    ActionKey, CommandBus, CommandEntry, CommandError, CommandHistory, TransformAction,
};
pub use config::{ColorConfig, ConfigError, GizmoConfig, HandleConfig, SnapConfig};
pub use dispatcher::Dispatcher;
pub use gizmo::{Gizmo, GizmoContext};
pub use handle::{Handle, HandleFlags, HandleId};
pub use manipulator::{
    GizmoMode, GizmoSpace, HandleSpec, HandleVisual, Manipulator, RotateHandle,
    RotateManipulator, ScaleHandle, ScaleManipulator, TranslateHandle, TranslateManipulator,
};
pub use pivot::{FnTarget, NodeTarget, Pivot, PivotTarget, SharedTransform, Transform};

pub use gim_geometry::{CameraView, Ray, Shape};
