/// Gazer Core Library - pointer-driven head tracking for a rigged model
///
/// This library holds everything that does not touch a window: the scene
/// graph, camera and orbit math, pointer unprojection, the neck/head aiming
/// update, model import and shading.

pub mod app;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gltf_loader;
pub mod head_aim;
pub mod orbit;
pub mod pointer;
pub mod projection;
pub mod rig;
pub mod scene;
pub mod shading;
pub mod transform;

// Re-export commonly used types
pub use app::{HeadTrackingApp, SceneRenderer};
pub use config::{SceneConfig, TrackingPlane};
pub use error::{GazerError, Result};
pub use geometry::{Mesh, Triangle, Vertex};
pub use head_aim::{AimReport, HeadAim, NeckAngles};
pub use pointer::{PointerState, Viewport};
pub use projection::Camera;
pub use scene::{Node, NodeId, SceneGraph};
pub use shading::Shading;
pub use transform::{RotationState, Transform};
