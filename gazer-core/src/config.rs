//! Scene configuration.
//!
//! Every field has a default matching the stock lizard scene, so a JSON file
//! only needs to name the values it overrides.

use std::f32::consts::FRAC_PI_4;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub tracking: TrackingConfig,
    pub render: RenderConfig,
}

impl SceneConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded scene config");
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.25,
            far: 20.0,
            position: [-1.8, 0.6, 2.7],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub target: [f32; 3],
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            target: [0.0, 0.0, -0.2],
            min_distance: 2.0,
            max_distance: 10.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}

/// Plane the pointer ray is intersected with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingPlane {
    /// The z = const plane through the camera's look target
    LookTarget,
    /// A fixed z = depth plane
    Depth(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub neck_node: String,
    pub head_node: String,
    /// Width the neck gain was tuned for, in pixels
    pub reference_width: f32,
    /// Normalized depth used when unprojecting the pointer
    pub unproject_depth: f32,
    /// Resting pitch added to the neck's x rotation
    pub pitch_offset: f32,
    pub plane: TrackingPlane,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            neck_node: "Neck".to_string(),
            head_node: "Head".to_string(),
            reference_width: 1024.0,
            unproject_depth: 0.5,
            pitch_offset: FRAC_PI_4,
            plane: TrackingPlane::LookTarget,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub model_scale: f32,
    pub exposure: f32,
    /// Display-space background color
    pub background: [f32; 3],
    /// Direction the key light travels towards the scene
    pub light_direction: [f32; 3],
    pub ambient: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            model_scale: 0.2,
            exposure: 1.0,
            background: [0.0, 0.5, 1.0],
            light_direction: [-0.4, -1.0, -0.6],
            ambient: 0.35,
        }
    }
}
