//! Gizmo configuration
//!
//! Settings that can be serialized and loaded from RON configuration files.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Nominal handle dimensions, in multiples of the pivot's handle scale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HandleConfig {
    /// Length of translate and scale axis lines
    pub axis_length: f32,
    /// Thickness of axis lines
    pub axis_width: f32,
    /// In-plane offset of translate plane quads from the pivot
    pub plane_offset: f32,
    /// Half size of translate plane quads
    pub plane_half_size: f32,
    /// Radius of the per-axis rotation rings
    pub ring_radius: f32,
    /// Band width of rotation rings
    pub ring_width: f32,
    /// Radius of the view-aligned outer rotation ring
    pub outer_ring_radius: f32,
    /// Radius of the free-rotation center sphere
    pub center_radius: f32,
    /// Half size of the cubes at the end of scale axes
    pub cube_half_size: f32,
    /// Half size of the uniform-scale center cube
    pub center_cube_half_size: f32,
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            axis_length: 1.0,
            axis_width: 0.08,
            plane_offset: 0.35,
            plane_half_size: 0.12,
            ring_radius: 1.0,
            ring_width: 0.1,
            outer_ring_radius: 1.2,
            center_radius: 0.2,
            cube_half_size: 0.07,
            center_cube_half_size: 0.12,
        }
    }
}

/// Snapping increments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SnapConfig {
    /// Whether snapping is applied while dragging
    pub enabled: bool,
    /// Translation increment in world units
    pub translate: f32,
    /// Rotation increment in degrees
    pub rotate_degrees: f32,
    /// Increment of the multiplicative scale factor
    pub scale: f32,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            translate: 0.25,
            rotate_degrees: 15.0,
            scale: 0.25,
        }
    }
}

impl SnapConfig {
    fn step(&self, increment: f32) -> Option<f32> {
        (self.enabled && increment > 0.0).then_some(increment)
    }

    /// Active translation increment
    pub fn translate_step(&self) -> Option<f32> {
        self.step(self.translate)
    }

    /// Active rotation increment in radians
    pub fn rotate_step(&self) -> Option<f32> {
        self.step(self.rotate_degrees.to_radians())
    }

    /// Active scale factor increment
    pub fn scale_step(&self) -> Option<f32> {
        self.step(self.scale)
    }
}

/// Handle colors (RGBA)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorConfig {
    pub x_axis: [f32; 4],
    pub y_axis: [f32; 4],
    pub z_axis: [f32; 4],
    pub view_ring: [f32; 4],
    pub center: [f32; 4],
    pub hovered: [f32; 4],
    pub held: [f32; 4],
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            x_axis: [1.0, 0.2, 0.2, 1.0],
            y_axis: [0.2, 1.0, 0.2, 1.0],
            z_axis: [0.2, 0.2, 1.0, 1.0],
            view_ring: [0.8, 0.8, 0.8, 1.0],
            center: [0.9, 0.9, 0.9, 0.8],
            hovered: [1.0, 0.85, 0.1, 1.0],
            held: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl ColorConfig {
    /// Color of the axis with the given index (0 = X, 1 = Y, 2 = Z)
    pub fn axis(&self, index: usize) -> [f32; 4] {
        match index {
            0 => self.x_axis,
            1 => self.y_axis,
            _ => self.z_axis,
        }
    }
}

/// Complete gizmo configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GizmoConfig {
    /// On-screen size, in pixels, of a unit handle dimension regardless of
    /// camera distance
    pub screen_pixels: f32,
    /// Lower bound for every component of a dragged scale
    pub min_scale: f32,
    /// Handle dimensions
    pub handles: HandleConfig,
    /// Snapping settings
    pub snap: SnapConfig,
    /// Handle colors
    pub colors: ColorConfig,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            screen_pixels: 96.0,
            min_scale: 1.0,
            handles: HandleConfig::default(),
            snap: SnapConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl GizmoConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace values that would break picking with defaults.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !is_positive(self.screen_pixels) {
            tracing::warn!(
                "Invalid screen_pixels {}, using {}",
                self.screen_pixels,
                defaults.screen_pixels
            );
            self.screen_pixels = defaults.screen_pixels;
        }
        if !is_positive(self.min_scale) {
            tracing::warn!(
                "Invalid min_scale {}, using {}",
                self.min_scale,
                defaults.min_scale
            );
            self.min_scale = defaults.min_scale;
        }
        for (name, value, default) in [
            ("translate", &mut self.snap.translate, defaults.snap.translate),
            (
                "rotate_degrees",
                &mut self.snap.rotate_degrees,
                defaults.snap.rotate_degrees,
            ),
            ("scale", &mut self.snap.scale, defaults.snap.scale),
        ] {
            if !is_positive(*value) {
                tracing::warn!("Invalid snap increment {name} = {value}, using {default}");
                *value = default;
            }
        }
        self
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = self.to_ron_string()?;
        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Serialize configuration to a pretty RON string
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Parse configuration from a RON string
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: GizmoConfig =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        Ok(config.validated())
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Configuration-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}
