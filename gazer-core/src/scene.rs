//! Scene graph with named nodes.
//!
//! Nodes live in an arena owned by [`SceneGraph`] and are addressed by
//! [`NodeId`] handles. Handles stay valid for the lifetime of the graph, so
//! callers resolve names once and keep the ids.

use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

use crate::geometry::Mesh;
use crate::transform::{RotationState, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub translation: Vector3<f32>,
    pub rotation: RotationState,
    pub scale: Vector3<f32>,
    pub mesh: Option<Mesh>,
    /// Linear base color
    pub color: [f32; 3],
}

impl Node {
    fn new(name: String, parent: Option<NodeId>) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            translation: Vector3::zeros(),
            rotation: RotationState::zero(),
            scale: Vector3::repeat(1.0),
            mesh: None,
            color: [0.8, 0.8, 0.8],
        }
    }

    pub fn local_matrix(&self) -> Matrix4<f32> {
        Transform::compose(&self.translation, &self.rotation, &self.scale)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node under `parent` (or as a new root).
    ///
    /// An unknown parent id makes the node a root.
    pub fn add_node(&mut self, name: impl Into<String>, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = parent.filter(|p| p.0 < self.nodes.len());
        self.nodes.push(Node::new(name.into(), parent));
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node with the given name in depth-first pre-order.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.name == name {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    pub fn world_matrix(&self, id: NodeId) -> Option<Matrix4<f32>> {
        let node = self.node(id)?;
        let local = node.local_matrix();
        Some(match node.parent {
            Some(parent) => self.world_matrix(parent)? * local,
            None => local,
        })
    }

    /// World orientation, ignoring any scale on the way down.
    pub fn world_rotation(&self, id: NodeId) -> Option<UnitQuaternion<f32>> {
        let node = self.node(id)?;
        let local = node.rotation.to_quaternion();
        Some(match node.parent {
            Some(parent) => self.world_rotation(parent)? * local,
            None => local,
        })
    }

    pub fn world_position(&self, id: NodeId) -> Option<Point3<f32>> {
        Some(self.world_matrix(id)?.transform_point(&Point3::origin()))
    }

    /// Turn the node so its local +Z axis points at `target` (world space).
    ///
    /// Returns false, leaving the node untouched, when the id is unknown or the
    /// target sits on the node's own origin.
    pub fn look_at(&mut self, id: NodeId, target: &Point3<f32>) -> bool {
        let Some(position) = self.world_position(id) else {
            return false;
        };
        let Some(direction) = (target - position).try_normalize(f32::EPSILON) else {
            return false;
        };

        // Looking straight up or down needs a different reference axis
        let up = if direction.cross(&Vector3::y()).norm_squared() < 1e-10 {
            Vector3::z()
        } else {
            Vector3::y()
        };
        let world = UnitQuaternion::face_towards(&direction, &up);

        let parent_rotation = self
            .nodes[id.0]
            .parent
            .and_then(|parent| self.world_rotation(parent))
            .unwrap_or_else(UnitQuaternion::identity);
        let local = parent_rotation.inverse() * world;

        self.nodes[id.0].rotation = RotationState::from_quaternion(&local);
        true
    }

    /// Every mesh in the graph with its world matrix and color.
    pub fn drawables(&self) -> impl Iterator<Item = (Matrix4<f32>, &Mesh, [f32; 3])> + '_ {
        self.nodes.iter().enumerate().filter_map(|(index, node)| {
            let mesh = node.mesh.as_ref()?;
            let world = self.world_matrix(NodeId(index))?;
            Some((world, mesh, node.color))
        })
    }
}
