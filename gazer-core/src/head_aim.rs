//! Per-frame neck and head aiming.

use std::f32::consts::{FRAC_PI_2, PI};

use nalgebra::Point3;

use crate::config::TrackingConfig;
use crate::pointer::{PointerState, Viewport};
use crate::projection::Camera;
use crate::scene::{NodeId, SceneGraph};

/// Neck rotation derived from the tracked point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeckAngles {
    /// Pitch, clamped to [-PI/2, PI/2]
    pub x: f32,
    /// Roll, clamped to [-PI, 0]
    pub z: f32,
}

impl NeckAngles {
    /// Map the tracked point onto neck angles.
    ///
    /// The gain scales with `reference_width / viewport.width` on both axes.
    /// `None` when the camera distance cannot divide the gain (zero, negative
    /// or non-finite).
    pub fn compute(
        pointer: &Point3<f32>,
        camera_distance: f32,
        viewport: &Viewport,
        config: &TrackingConfig,
    ) -> Option<Self> {
        if !(camera_distance.is_finite() && camera_distance > 0.0) {
            return None;
        }

        let gain = PI / viewport.width * config.reference_width;
        let z = -(pointer.x * gain) / 2.0 / camera_distance;
        let x = -(pointer.y * gain) / 2.0 / camera_distance + config.pitch_offset;

        Some(Self {
            x: x.clamp(-FRAC_PI_2, FRAC_PI_2),
            z: z.clamp(-PI, 0.0),
        })
    }
}

/// What a single update touched
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AimReport {
    pub neck: Option<NeckAngles>,
    pub head_aimed: bool,
}

/// Resolved neck and head handles for one scene.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadAim {
    neck: Option<NodeId>,
    head: Option<NodeId>,
}

impl HeadAim {
    /// Look the joints up by name once; absent joints are skipped every frame.
    pub fn resolve(scene: &SceneGraph, config: &TrackingConfig) -> Self {
        let neck = scene.find_by_name(&config.neck_node);
        let head = scene.find_by_name(&config.head_node);

        if neck.is_none() {
            tracing::warn!(node = %config.neck_node, "neck joint not found, neck tracking disabled");
        }
        if head.is_none() {
            tracing::warn!(node = %config.head_node, "head joint not found, head tracking disabled");
        }
        tracing::debug!(?neck, ?head, "resolved head-aim joints");

        Self { neck, head }
    }

    pub fn neck(&self) -> Option<NodeId> {
        self.neck
    }

    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    /// Rotate the neck towards the tracked point and point the head at it.
    pub fn update(
        &self,
        scene: &mut SceneGraph,
        camera: &Camera,
        pointer: &PointerState,
        viewport: &Viewport,
        config: &TrackingConfig,
    ) -> AimReport {
        let mut report = AimReport::default();
        let center = camera.distance_from_origin();

        if let Some(node) = self.neck.and_then(|id| scene.node_mut(id)) {
            match NeckAngles::compute(&pointer.position, center, viewport, config) {
                Some(angles) => {
                    node.rotation.x = angles.x;
                    node.rotation.z = angles.z;
                    report.neck = Some(angles);
                }
                None => tracing::trace!(center, "camera at origin, neck left as is"),
            }
        }

        if let Some(head) = self.head {
            report.head_aimed = scene.look_at(head, &pointer.position);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::transform::RotationState;
    use nalgebra::Vector3;

    fn rig(with_neck: bool) -> SceneGraph {
        let mut scene = SceneGraph::new();
        let body = scene.add_node("Body", None);
        let parent = if with_neck {
            let neck = scene.add_node("Neck", Some(body));
            scene.node_mut(neck).unwrap().translation = Vector3::new(0.0, 0.2, 0.5);
            neck
        } else {
            body
        };
        let head = scene.add_node("Head", Some(parent));
        scene.node_mut(head).unwrap().translation = Vector3::new(0.0, 0.1, 0.3);
        scene
    }

    fn stock() -> (Camera, Viewport, TrackingConfig) {
        let config = SceneConfig::default();
        let viewport = Viewport::new(1024.0, 768.0).unwrap();
        let camera = Camera::from_config(&config.camera, &config.orbit, viewport.aspect());
        (camera, viewport, config.tracking)
    }

    #[test]
    fn test_neck_formula_inside_bounds() {
        let viewport = Viewport::new(1024.0, 768.0).unwrap();
        let config = TrackingConfig::default();
        let pointer = Point3::new(0.5, 0.1, 0.0);

        let angles = NeckAngles::compute(&pointer, 4.0, &viewport, &config).unwrap();

        // With a 1024 wide viewport the gain is exactly PI
        assert!((angles.z - (-(0.5 * PI) / 2.0 / 4.0)).abs() < 1e-6);
        assert!((angles.x - (-(0.1 * PI) / 2.0 / 4.0 + PI / 4.0)).abs() < 1e-6);
    }

    #[test]
    fn test_pitch_uses_viewport_width() {
        let config = TrackingConfig::default();
        let pointer = Point3::new(0.0, 0.2, 0.0);
        let wide = Viewport::new(2048.0, 768.0).unwrap();
        let tall = Viewport::new(2048.0, 4000.0).unwrap();

        let a = NeckAngles::compute(&pointer, 3.0, &wide, &config).unwrap();
        let b = NeckAngles::compute(&pointer, 3.0, &tall, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_neck_clamp_bounds() {
        let viewport = Viewport::new(1024.0, 768.0).unwrap();
        let config = TrackingConfig::default();

        let far_right_low = NeckAngles::compute(&Point3::new(100.0, 100.0, 0.0), 1.0, &viewport, &config).unwrap();
        assert_eq!(far_right_low.z, -PI);
        assert_eq!(far_right_low.x, -FRAC_PI_2);

        let far_left_high = NeckAngles::compute(&Point3::new(-100.0, -100.0, 0.0), 1.0, &viewport, &config).unwrap();
        assert_eq!(far_left_high.z, 0.0);
        assert_eq!(far_left_high.x, FRAC_PI_2);
    }

    #[test]
    fn test_zero_camera_distance_skips_neck() {
        let viewport = Viewport::new(1024.0, 768.0).unwrap();
        let config = TrackingConfig::default();
        assert!(NeckAngles::compute(&Point3::new(0.3, 0.3, 0.0), 0.0, &viewport, &config).is_none());

        let mut scene = rig(true);
        let aim = HeadAim::resolve(&scene, &config);
        let mut camera = Camera::new(1024, 768);
        camera.position = Point3::origin();
        camera.target = Point3::new(0.0, 0.0, -1.0);
        let pointer = PointerState {
            position: Point3::new(0.3, 0.3, -1.0),
        };

        let report = aim.update(&mut scene, &camera, &pointer, &viewport, &config);
        assert!(report.neck.is_none());
        let neck = scene.node(aim.neck().unwrap()).unwrap();
        assert_eq!(neck.rotation, RotationState::zero());
        assert!(report.head_aimed);
    }

    #[test]
    fn test_update_is_idempotent() {
        let (camera, viewport, config) = stock();
        let mut scene = rig(true);
        let aim = HeadAim::resolve(&scene, &config);
        let pointer = PointerState {
            position: Point3::new(0.4, -0.1, -0.2),
        };

        aim.update(&mut scene, &camera, &pointer, &viewport, &config);
        let neck_first = scene.node(aim.neck().unwrap()).unwrap().rotation;
        let head_first = scene.node(aim.head().unwrap()).unwrap().rotation;

        aim.update(&mut scene, &camera, &pointer, &viewport, &config);
        let neck_second = scene.node(aim.neck().unwrap()).unwrap().rotation;
        let head_second = scene.node(aim.head().unwrap()).unwrap().rotation;

        assert_eq!(neck_first, neck_second);
        assert!((head_first.x - head_second.x).abs() < 1e-6);
        assert!((head_first.y - head_second.y).abs() < 1e-6);
        assert!((head_first.z - head_second.z).abs() < 1e-6);
    }

    #[test]
    fn test_missing_neck_still_aims_head() {
        let (camera, viewport, config) = stock();
        let mut scene = rig(false);
        let aim = HeadAim::resolve(&scene, &config);
        assert!(aim.neck().is_none());
        let pointer = PointerState {
            position: Point3::new(1.0, 0.5, -0.2),
        };

        let report = aim.update(&mut scene, &camera, &pointer, &viewport, &config);

        assert!(report.neck.is_none());
        assert!(report.head_aimed);
        let head = aim.head().unwrap();
        let forward = scene.world_rotation(head).unwrap() * Vector3::z();
        let expected = (pointer.position - scene.world_position(head).unwrap()).normalize();
        assert!((forward - expected).norm() < 1e-4);
    }

    #[test]
    fn test_head_follows_rotated_neck() {
        let (camera, viewport, config) = stock();
        let mut scene = rig(true);
        let aim = HeadAim::resolve(&scene, &config);
        let pointer = PointerState {
            position: Point3::new(-0.6, 0.8, -0.2),
        };

        let report = aim.update(&mut scene, &camera, &pointer, &viewport, &config);
        assert!(report.neck.is_some());

        // The head's world forward must account for the neck rotation set this frame
        let head = aim.head().unwrap();
        let forward = scene.world_rotation(head).unwrap() * Vector3::z();
        let expected = (pointer.position - scene.world_position(head).unwrap()).normalize();
        assert!((forward - expected).norm() < 1e-4);
    }

    #[test]
    fn test_empty_scene_is_noop() {
        let (camera, viewport, config) = stock();
        let mut scene = SceneGraph::new();
        let aim = HeadAim::resolve(&scene, &config);
        let report = aim.update(&mut scene, &camera, &PointerState::new(), &viewport, &config);
        assert_eq!(report, AimReport::default());
    }
}
