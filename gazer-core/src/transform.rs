/// 3D transformation matrices and rotation state
use nalgebra::{Matrix3, Matrix4, UnitQuaternion, Vector3};

/// Euler rotation in radians, applied in XYZ order (R = Rx * Ry * Rz)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    pub fn to_quaternion(&self) -> UnitQuaternion<f32> {
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.x)
            * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.y)
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.z)
    }

    /// Decompose a rotation into XYZ Euler angles.
    ///
    /// Near gimbal lock (|m13| close to 1) z is pinned to zero.
    pub fn from_quaternion(rotation: &UnitQuaternion<f32>) -> Self {
        let m: Matrix3<f32> = rotation.to_rotation_matrix().into_inner();
        let m13 = m[(0, 2)].clamp(-1.0, 1.0);
        let y = m13.asin();

        if m13.abs() < 0.999_999_9 {
            Self::new(
                (-m[(1, 2)]).atan2(m[(2, 2)]),
                y,
                (-m[(0, 1)]).atan2(m[(0, 0)]),
            )
        } else {
            Self::new(m[(2, 1)].atan2(m[(1, 1)]), y, 0.0)
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        rotation.to_quaternion().to_homogeneous()
    }

    /// Create a translation matrix
    pub fn translation_matrix(translation: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(translation)
    }

    /// Create a scale matrix
    pub fn scale_matrix(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(scale)
    }

    /// Compose translation, rotation and scale as T * R * S
    pub fn compose(
        translation: &Vector3<f32>,
        rotation: &RotationState,
        scale: &Vector3<f32>,
    ) -> Matrix4<f32> {
        Self::translation_matrix(translation)
            * Self::rotation_matrix(rotation)
            * Self::scale_matrix(scale)
    }
}
