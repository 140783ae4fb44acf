/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

use crate::config::{CameraConfig, OrbitConfig};

/// Perspective camera looking at a target point
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 / height.max(1) as f32,
            near: 0.1,
            far: 100.0,
        }
    }

    pub fn from_config(camera: &CameraConfig, orbit: &OrbitConfig, aspect: f32) -> Self {
        Self {
            position: Point3::from(camera.position),
            target: Point3::from(orbit.target),
            up: Vector3::y(),
            fov: camera.fov_degrees.to_radians(),
            aspect,
            near: camera.near,
            far: camera.far,
        }
    }

    /// Match the aspect ratio to a new viewport size
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    /// Length of the camera position vector
    pub fn distance_from_origin(&self) -> f32 {
        self.position.coords.norm()
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Map a normalized device coordinate back into world space.
    ///
    /// Returns `None` when the view-projection matrix is singular.
    pub fn unproject(&self, ndc: &Point3<f32>) -> Option<Point3<f32>> {
        let inverse = (self.projection_matrix() * self.view_matrix()).try_inverse()?;
        let world = inverse * ndc.to_homogeneous();
        if world.w.abs() < f32::EPSILON {
            return None;
        }
        Some(Point3::from(world.xyz() / world.w))
    }

    /// Project a 3D point to 2D screen space
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = self.projection_matrix() * self.view_matrix() * model_matrix;

        // Transform to clip space
        let clip = mvp * point.to_homogeneous();

        // Points behind the eye have w <= 0
        if clip.w < 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;

        // Clip test
        if ndc.x < -1.0 || ndc.x > 1.0 || ndc.y < -1.0 || ndc.y > 1.0 || ndc.z < -1.0 || ndc.z > 1.0
        {
            return None;
        }

        // Convert to screen space
        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

        Some((screen_x, screen_y, ndc.z))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
