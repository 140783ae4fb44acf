//! Frame-driven application state shared by every front end.
//!
//! Input handlers call [`HeadTrackingApp::pointer_move`] (and the orbit
//! helpers) as events arrive; the front end's frame callback calls
//! [`HeadTrackingApp::frame`] once per display refresh.

use nalgebra::Point3;

use crate::config::SceneConfig;
use crate::error::Result;
use crate::head_aim::{AimReport, HeadAim};
use crate::orbit::OrbitControls;
use crate::pointer::{self, PointerState, Viewport};
use crate::projection::Camera;
use crate::rig;
use crate::scene::SceneGraph;
use crate::shading::Shading;

/// Draws a scene through a camera.
pub trait SceneRenderer {
    type Error;

    fn render(&mut self, scene: &SceneGraph, camera: &Camera, shading: &Shading) -> std::result::Result<(), Self::Error>;
}

pub struct HeadTrackingApp {
    config: SceneConfig,
    scene: SceneGraph,
    camera: Camera,
    controls: OrbitControls,
    viewport: Viewport,
    pointer: PointerState,
    aim: HeadAim,
    shading: Shading,
    frames: u64,
}

impl HeadTrackingApp {
    pub fn new(config: SceneConfig, scene: SceneGraph, viewport: Viewport) -> Self {
        let mut camera = Camera::from_config(&config.camera, &config.orbit, viewport.aspect());
        let mut controls = OrbitControls::new(&config.orbit);
        controls.update(&mut camera);
        let aim = HeadAim::resolve(&scene, &config.tracking);
        let shading = Shading::new(&config.render);

        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            nodes = scene.len(),
            "head tracking app ready"
        );

        Self {
            config,
            scene,
            camera,
            controls,
            viewport,
            pointer: PointerState::new(),
            aim,
            shading,
            frames: 0,
        }
    }

    /// App showing the built-in lizard.
    pub fn with_lizard(config: SceneConfig, viewport: Viewport) -> Self {
        let scene = rig::lizard(&config);
        Self::new(config, scene, viewport)
    }

    /// Swap the model; joint handles are resolved against the new scene.
    pub fn replace_scene(&mut self, scene: SceneGraph) {
        self.aim = HeadAim::resolve(&scene, &self.config.tracking);
        self.scene = scene;
    }

    /// Pointer or first-touch move at screen position `x`, `y`.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> Option<Point3<f32>> {
        pointer::track(
            &mut self.pointer,
            &self.camera,
            &self.viewport,
            x,
            y,
            &self.config.tracking,
        )
    }

    /// Apply a new viewport size. Empty sizes (minimised windows) are rejected
    /// and the previous viewport stays in force.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        let viewport = Viewport::new(width, height)?;
        self.viewport = viewport;
        self.camera.set_aspect(width, height);
        tracing::debug!(width, height, "viewport resized");
        Ok(())
    }

    /// Orbit by a pointer drag of `dx`, `dy` screen units.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.controls.rotate(dx, dy, self.viewport.height);
        self.controls.update(&mut self.camera);
    }

    /// Dolly towards (positive) or away from (negative) the target.
    pub fn zoom(&mut self, steps: f32) {
        self.controls.zoom(steps);
        self.controls.update(&mut self.camera);
    }

    /// Head-aim update for the current pointer and camera.
    pub fn update(&mut self) -> AimReport {
        self.aim.update(
            &mut self.scene,
            &self.camera,
            &self.pointer,
            &self.viewport,
            &self.config.tracking,
        )
    }

    /// One display frame: update the joints, then draw.
    pub fn frame<R: SceneRenderer>(&mut self, renderer: &mut R) -> std::result::Result<AimReport, R::Error> {
        let report = self.update();
        renderer.render(&self.scene, &self.camera, &self.shading)?;
        self.frames += 1;
        Ok(report)
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn shading(&self) -> &Shading {
        &self.shading
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GazerError;

    #[derive(Default)]
    struct CountingRenderer {
        renders: usize,
        drawables: usize,
    }

    impl SceneRenderer for CountingRenderer {
        type Error = std::convert::Infallible;

        fn render(&mut self, scene: &SceneGraph, _camera: &Camera, _shading: &Shading) -> std::result::Result<(), Self::Error> {
            self.renders += 1;
            self.drawables = scene.drawables().count();
            Ok(())
        }
    }

    struct FailingRenderer;

    impl SceneRenderer for FailingRenderer {
        type Error = &'static str;

        fn render(&mut self, _: &SceneGraph, _: &Camera, _: &Shading) -> std::result::Result<(), Self::Error> {
            Err("context lost")
        }
    }

    fn app() -> HeadTrackingApp {
        let viewport = Viewport::new(1024.0, 768.0).unwrap();
        HeadTrackingApp::with_lizard(SceneConfig::default(), viewport)
    }

    #[test]
    fn test_end_to_end_center_pointer() {
        let mut app = app();
        let point = app.pointer_move(512.0, 384.0).unwrap();
        assert!(point.x.abs() < 1e-3);
        assert!(point.y.abs() < 1e-3);

        let mut renderer = CountingRenderer::default();
        let report = app.frame(&mut renderer).unwrap();

        assert!(report.neck.is_some());
        assert!(report.head_aimed);
        assert_eq!(renderer.renders, 1);
        assert!(renderer.drawables > 0);
        assert_eq!(app.frames(), 1);
    }

    #[test]
    fn test_frames_without_input_are_stable() {
        let mut app = app();
        app.pointer_move(300.0, 200.0).unwrap();
        let mut renderer = CountingRenderer::default();

        let first = app.frame(&mut renderer).unwrap();
        let second = app.frame(&mut renderer).unwrap();
        assert_eq!(first.neck, second.neck);
        assert_eq!(renderer.renders, 2);
    }

    #[test]
    fn test_render_error_propagates() {
        let mut app = app();
        assert_eq!(app.frame(&mut FailingRenderer).unwrap_err(), "context lost");
        assert_eq!(app.frames(), 0);
    }

    #[test]
    fn test_resize_updates_aspect_and_rejects_empty() {
        let mut app = app();
        app.resize(800.0, 400.0).unwrap();
        assert!((app.camera().aspect - 2.0).abs() < 1e-6);

        let err = app.resize(0.0, 400.0).unwrap_err();
        assert!(matches!(err, GazerError::InvalidViewport { .. }));
        assert_eq!(app.viewport(), Viewport::new(800.0, 400.0).unwrap());
    }

    #[test]
    fn test_orbit_moves_camera_and_changes_tracking() {
        let mut app = app();
        let before = app.pointer_move(700.0, 300.0).unwrap();
        app.orbit(150.0, 0.0);
        let after = app.pointer_move(700.0, 300.0).unwrap();
        assert!((before - after).norm() > 1e-3);
        assert!((app.camera().target - Point3::new(0.0, 0.0, -0.2)).norm() < 1e-6);
    }

    #[test]
    fn test_replace_scene_without_joints() {
        let mut app = app();
        app.replace_scene(SceneGraph::new());
        let report = app.update();
        assert!(report.neck.is_none());
        assert!(!report.head_aimed);
    }
}
