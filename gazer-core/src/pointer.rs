//! Pointer tracking: screen coordinates to a point on the tracking plane.

use nalgebra::{Point2, Point3};

use crate::config::{TrackingConfig, TrackingPlane};
use crate::error::{GazerError, Result};
use crate::projection::Camera;

/// Rays flatter than this against the tracking plane count as parallel
const PARALLEL_EPSILON: f32 = 1e-6;

/// Size of the surface pointer coordinates are measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Result<Self> {
        if width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite() {
            Ok(Self { width, height })
        } else {
            Err(GazerError::InvalidViewport { width, height })
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Screen coordinates (origin top-left, y down) to NDC in [-1, 1], y up.
    pub fn to_ndc(&self, x: f32, y: f32) -> Point2<f32> {
        Point2::new(x / self.width * 2.0 - 1.0, -(y / self.height) * 2.0 + 1.0)
    }
}

/// Last tracked world point under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    pub position: Point3<f32>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Cast a ray from the camera through NDC `ndc` and intersect it with the
/// z = const tracking plane.
///
/// Returns `None` for a ray parallel to the plane, or one that would have to
/// travel backwards to reach it.
pub fn intersect_tracking_plane(
    camera: &Camera,
    ndc: Point2<f32>,
    config: &TrackingConfig,
) -> Option<Point3<f32>> {
    let unprojected = camera.unproject(&Point3::new(ndc.x, ndc.y, config.unproject_depth))?;
    let direction = (unprojected - camera.position).try_normalize(f32::EPSILON)?;

    if direction.z.abs() < PARALLEL_EPSILON {
        return None;
    }

    let plane_z = match config.plane {
        TrackingPlane::LookTarget => camera.target.z,
        TrackingPlane::Depth(z) => z,
    };
    let distance = (plane_z - camera.position.z) / direction.z;
    if !distance.is_finite() || distance < 0.0 {
        return None;
    }

    Some(camera.position + direction * distance)
}

/// Update `state` from a pointer (or first touch) at screen position `x`, `y`.
///
/// On a degenerate ray the previous point is kept and `None` is returned.
pub fn track(
    state: &mut PointerState,
    camera: &Camera,
    viewport: &Viewport,
    x: f32,
    y: f32,
    config: &TrackingConfig,
) -> Option<Point3<f32>> {
    let ndc = viewport.to_ndc(x, y);
    match intersect_tracking_plane(camera, ndc, config) {
        Some(point) => {
            state.position = point;
            tracing::trace!(x, y, ?point, "pointer tracked");
            Some(point)
        }
        None => {
            tracing::debug!(x, y, "pointer ray misses tracking plane");
            None
        }
    }
}
