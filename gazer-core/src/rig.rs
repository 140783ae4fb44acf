//! Built-in lizard model assembled from boxes.
//!
//! Units are model space; the root carries `model_scale`. The lizard faces
//! +Z with its back along +Y, so a head at rest looks down the Z axis.

use nalgebra::{Point3, Vector3};

use crate::config::SceneConfig;
use crate::geometry::Mesh;
use crate::scene::{NodeId, SceneGraph};

const SKIN: [f32; 3] = [0.22, 0.55, 0.18];
const BELLY: [f32; 3] = [0.65, 0.6, 0.3];
const EYE: [f32; 3] = [0.9, 0.75, 0.1];

fn part(
    scene: &mut SceneGraph,
    name: &str,
    parent: NodeId,
    offset: Vector3<f32>,
    mesh: Mesh,
    color: [f32; 3],
) -> NodeId {
    let id = scene.add_node(name, Some(parent));
    if let Some(node) = scene.node_mut(id) {
        node.translation = offset;
        node.mesh = Some(mesh);
        node.color = color;
    }
    id
}

fn block(w: f32, h: f32, d: f32, center: [f32; 3]) -> Mesh {
    Mesh::cuboid(Vector3::new(w, h, d), Point3::from(center))
}

/// Build the lizard scene: `Lizard` root, body, tail, four legs and the
/// `Neck`/`Head` joints named in the tracking config.
pub fn lizard(config: &SceneConfig) -> SceneGraph {
    let mut scene = SceneGraph::new();
    let root = scene.add_node("Lizard", None);
    if let Some(node) = scene.node_mut(root) {
        node.scale = Vector3::repeat(config.render.model_scale);
        node.translation = Vector3::new(0.0, -0.3, 0.0);
    }

    let body = part(&mut scene, "Body", root, Vector3::zeros(), block(2.4, 1.0, 4.4, [0.0, 0.0, 0.0]), SKIN);
    part(&mut scene, "Belly", body, Vector3::new(0.0, -0.45, 0.0), block(2.0, 0.2, 4.0, [0.0, 0.0, 0.0]), BELLY);

    let tail = part(&mut scene, "Tail", body, Vector3::new(0.0, 0.0, -2.2), block(1.2, 0.7, 2.4, [0.0, 0.0, -1.2]), SKIN);
    part(&mut scene, "TailTip", tail, Vector3::new(0.0, 0.0, -2.4), block(0.6, 0.4, 2.6, [0.0, 0.0, -1.3]), SKIN);

    for (name, x, z) in [
        ("LegFrontLeft", 1.4, 1.4),
        ("LegFrontRight", -1.4, 1.4),
        ("LegBackLeft", 1.4, -1.5),
        ("LegBackRight", -1.4, -1.5),
    ] {
        part(&mut scene, name, body, Vector3::new(x, -0.3, z), block(0.5, 1.2, 0.6, [0.0, -0.5, 0.0]), SKIN);
    }

    let neck = part(
        &mut scene,
        &config.tracking.neck_node,
        body,
        Vector3::new(0.0, 0.3, 2.2),
        block(1.2, 0.9, 1.4, [0.0, 0.0, 0.6]),
        SKIN,
    );
    let head = part(
        &mut scene,
        &config.tracking.head_node,
        neck,
        Vector3::new(0.0, 0.1, 1.3),
        block(1.4, 0.8, 1.8, [0.0, 0.0, 0.8]),
        SKIN,
    );
    part(&mut scene, "Jaw", head, Vector3::new(0.0, -0.45, 0.2), block(1.2, 0.2, 1.6, [0.0, 0.0, 0.7]), BELLY);
    part(&mut scene, "EyeLeft", head, Vector3::new(0.6, 0.3, 0.9), block(0.3, 0.3, 0.3, [0.0, 0.0, 0.0]), EYE);
    part(&mut scene, "EyeRight", head, Vector3::new(-0.6, 0.3, 0.9), block(0.3, 0.3, 0.3, [0.0, 0.0, 0.0]), EYE);

    tracing::debug!(nodes = scene.len(), "built procedural lizard");
    scene
}
