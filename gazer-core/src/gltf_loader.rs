//! glTF model import.
//!
//! Loads .glb/.gltf files into a [`SceneGraph`], keeping:
//! - node names and TRS transforms
//! - triangle-list meshes (normals are taken from the file or computed per face)
//! - the first material's base color per mesh
//!
//! Skins are not evaluated; meshes stay rigidly attached to their node.

use std::path::Path;

use nalgebra::{Point3, Quaternion, UnitQuaternion, Vector3};

use crate::config::SceneConfig;
use crate::error::{GazerError, Result};
use crate::geometry::{Mesh, Triangle, Vertex};
use crate::scene::{NodeId, SceneGraph};
use crate::transform::RotationState;

/// Name of the node that carries the model scale
pub const MODEL_ROOT: &str = "Model";

/// Load a glTF/GLB file from disk.
pub fn load_gltf(path: impl AsRef<Path>, config: &SceneConfig) -> Result<SceneGraph> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path)?;
    tracing::info!(path = %path.display(), "importing glTF model");
    build_scene(&document, &buffers, config)
}

/// Load a glTF/GLB document held in memory.
pub fn load_gltf_slice(bytes: &[u8], config: &SceneConfig) -> Result<SceneGraph> {
    let (document, buffers, _images) = gltf::import_slice(bytes)?;
    build_scene(&document, &buffers, config)
}

fn build_scene(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    config: &SceneConfig,
) -> Result<SceneGraph> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(GazerError::EmptyModel)?;

    let mut graph = SceneGraph::new();
    let root = graph.add_node(MODEL_ROOT, None);
    if let Some(node) = graph.node_mut(root) {
        node.scale = Vector3::repeat(config.render.model_scale);
    }

    for node in scene.nodes() {
        add_node(&mut graph, &node, root, buffers);
    }

    tracing::info!(nodes = graph.len(), "glTF scene loaded");
    Ok(graph)
}

fn add_node(
    graph: &mut SceneGraph,
    source: &gltf::Node<'_>,
    parent: NodeId,
    buffers: &[gltf::buffer::Data],
) {
    let id = graph.add_node(source.name().unwrap_or_default(), Some(parent));
    let (translation, rotation, scale) = source.transform().decomposed();
    let rotation = UnitQuaternion::from_quaternion(Quaternion::new(
        rotation[3],
        rotation[0],
        rotation[1],
        rotation[2],
    ));

    let mesh = source.mesh().map(|mesh| read_mesh(&mesh, buffers));

    if let Some(node) = graph.node_mut(id) {
        node.translation = Vector3::from(translation);
        node.rotation = RotationState::from_quaternion(&rotation);
        node.scale = Vector3::from(scale);
        if let Some((mesh, color)) = mesh {
            if !mesh.is_empty() {
                node.mesh = Some(mesh);
                node.color = color;
            }
        }
    }

    for child in source.children() {
        add_node(graph, &child, id, buffers);
    }
}

fn read_mesh(mesh: &gltf::Mesh<'_>, buffers: &[gltf::buffer::Data]) -> (Mesh, [f32; 3]) {
    let mut out = Mesh::new();
    let mut color = None;

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            tracing::warn!(mesh = mesh.index(), mode = ?primitive.mode(), "skipping non-triangle primitive");
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
        let Some(positions) = reader.read_positions() else {
            tracing::warn!(mesh = mesh.index(), "primitive has no positions");
            continue;
        };
        let positions: Vec<Point3<f32>> = positions.map(Point3::from).collect();
        let normals: Option<Vec<Vector3<f32>>> = reader
            .read_normals()
            .map(|normals| normals.map(Vector3::from).collect())
            .filter(|normals: &Vec<Vector3<f32>>| normals.len() == positions.len());
        let indices: Vec<usize> = match reader.read_indices() {
            Some(indices) => indices.into_u32().map(|i| i as usize).collect(),
            None => (0..positions.len()).collect(),
        };

        for face in indices.chunks_exact(3) {
            let [a, b, c] = [face[0], face[1], face[2]];
            if a.max(b).max(c) >= positions.len() {
                continue;
            }
            let triangle = match &normals {
                Some(n) => Triangle::new(
                    Vertex::new(positions[a], n[a]),
                    Vertex::new(positions[b], n[b]),
                    Vertex::new(positions[c], n[c]),
                ),
                None => Triangle::flat(positions[a], positions[b], positions[c]),
            };
            out.add_triangle(triangle);
        }

        color.get_or_insert_with(|| {
            let [r, g, b, _] = primitive.material().pbr_metallic_roughness().base_color_factor();
            [r, g, b]
        });
    }

    (out, color.unwrap_or([0.8, 0.8, 0.8]))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Body -> Neck (turned 90 degrees about Y) -> Head with one red triangle
    const MINIMAL: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "name": "Body", "children": [1] },
            { "name": "Neck", "translation": [0, 1, 0], "rotation": [0, 0.70710677, 0, 0.70710677], "children": [2] },
            { "name": "Head", "translation": [0, 0, 2], "mesh": 0 }
        ],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 }] }],
        "materials": [{ "pbrMetallicRoughness": { "baseColorFactor": [1, 0, 0, 1] } }],
        "buffers": [{
            "byteLength": 44,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAA="
        }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0, 0, 0], "max": [1, 1, 0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ]
    }"#;

    #[test]
    fn test_loads_named_hierarchy() {
        let scene = load_gltf_slice(MINIMAL.as_bytes(), &SceneConfig::default()).unwrap();
        assert_eq!(scene.len(), 4);
        let root = scene.find_by_name(MODEL_ROOT).unwrap();
        let neck = scene.find_by_name("Neck").unwrap();
        let head = scene.find_by_name("Head").unwrap();
        assert_eq!(scene.node(head).unwrap().parent, Some(neck));
        assert_eq!(scene.node(root).unwrap().scale, Vector3::repeat(0.2));
    }

    #[test]
    fn test_transforms_survive_import() {
        let scene = load_gltf_slice(MINIMAL.as_bytes(), &SceneConfig::default()).unwrap();
        let head = scene.find_by_name("Head").unwrap();
        let p = scene.world_position(head).unwrap();
        assert!((p - Point3::new(0.4, 0.2, 0.0)).norm() < 1e-5, "{p:?}");
    }

    #[test]
    fn test_mesh_and_color() {
        let scene = load_gltf_slice(MINIMAL.as_bytes(), &SceneConfig::default()).unwrap();
        let head = scene.node(scene.find_by_name("Head").unwrap()).unwrap();
        let mesh = head.mesh.as_ref().unwrap();
        assert_eq!(mesh.triangles.len(), 1);
        assert_eq!(head.color, [1.0, 0.0, 0.0]);
        // No normals in the file: face normal of a triangle in the XY plane
        assert!((mesh.triangles[0].vertices[0].normal - Vector3::z()).norm() < 1e-6);
    }

    #[test]
    fn test_garbage_is_gltf_error() {
        let err = load_gltf_slice(b"not a model", &SceneConfig::default()).unwrap_err();
        assert!(matches!(err, GazerError::Gltf(_)));
    }
}
