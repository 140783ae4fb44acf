/// Geometry primitives for 3D rendering
use nalgebra::{Point3, Vector3};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Triangle from bare positions, every vertex carrying the face normal
    pub fn flat(p0: Point3<f32>, p1: Point3<f32>, p2: Point3<f32>) -> Self {
        let normal = face_normal(&p0, &p1, &p2);
        Self::new(
            Vertex::new(p0, normal),
            Vertex::new(p1, normal),
            Vertex::new(p2, normal),
        )
    }

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        face_normal(
            &self.vertices[0].position,
            &self.vertices[1].position,
            &self.vertices[2].position,
        )
    }
}

/// Counter-clockwise face normal; zero for degenerate triangles.
fn face_normal(p0: &Point3<f32>, p1: &Point3<f32>, p2: &Point3<f32>) -> Vector3<f32> {
    let edge1 = p1 - p0;
    let edge2 = p2 - p0;
    edge1
        .cross(&edge2)
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vector3::zeros)
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Axis-aligned box with the given full size, centred on `center`
    pub fn cuboid(size: Vector3<f32>, center: Point3<f32>) -> Self {
        let h = size / 2.0;
        let corner = |sx: f32, sy: f32, sz: f32| {
            Point3::new(center.x + sx * h.x, center.y + sy * h.y, center.z + sz * h.z)
        };
        let mut mesh = Self::with_capacity(12);

        // Each face as (normal, four corners counter-clockwise seen from outside)
        let faces: [(Vector3<f32>, [(f32, f32, f32); 4]); 6] = [
            (Vector3::z(), [(-1., -1., 1.), (1., -1., 1.), (1., 1., 1.), (-1., 1., 1.)]),
            (-Vector3::z(), [(1., -1., -1.), (-1., -1., -1.), (-1., 1., -1.), (1., 1., -1.)]),
            (Vector3::y(), [(-1., 1., 1.), (1., 1., 1.), (1., 1., -1.), (-1., 1., -1.)]),
            (-Vector3::y(), [(-1., -1., -1.), (1., -1., -1.), (1., -1., 1.), (-1., -1., 1.)]),
            (Vector3::x(), [(1., -1., 1.), (1., -1., -1.), (1., 1., -1.), (1., 1., 1.)]),
            (-Vector3::x(), [(-1., -1., -1.), (-1., -1., 1.), (-1., 1., 1.), (-1., 1., -1.)]),
        ];

        for (normal, quad) in faces {
            let [a, b, c, d] = quad.map(|(x, y, z)| Vertex::new(corner(x, y, z), normal));
            mesh.add_triangle(Triangle::new(a, b, c));
            mesh.add_triangle(Triangle::new(a, c, d));
        }

        mesh
    }

    /// Create a simple cube mesh centred on the origin
    pub fn cube(size: f32) -> Self {
        Self::cuboid(Vector3::repeat(size), Point3::origin())
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_has_twelve_triangles() {
        assert_eq!(Mesh::cube(2.0).triangles.len(), 12);
    }

    #[test]
    fn test_cuboid_winding_matches_normals() {
        let mesh = Mesh::cuboid(Vector3::new(1.0, 2.0, 3.0), Point3::new(0.5, 0.0, -1.0));
        for triangle in &mesh.triangles {
            let stored = triangle.vertices[0].normal;
            let computed = triangle.calculate_normal();
            assert!((stored - computed).norm() < 1e-5, "{stored:?} vs {computed:?}");
        }
    }

    #[test]
    fn test_degenerate_triangle_has_zero_normal() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let triangle = Triangle::flat(p, p, p);
        assert_eq!(triangle.calculate_normal(), Vector3::zeros());
    }
}
