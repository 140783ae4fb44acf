/// Canvas 2D renderer: shaded triangles painted back to front
use gazer_core::{shading, Camera, SceneGraph, SceneRenderer, Shading};
use nalgebra::{Matrix3, Matrix4, Point3};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// One projected, shaded triangle
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub points: [(f32, f32); 3],
    pub depth: f32,
    pub color: [u8; 3],
}

/// Project every visible face of the scene and sort far to near.
///
/// Back faces and faces with a vertex outside the view volume are dropped.
pub fn collect_faces(
    scene: &SceneGraph,
    camera: &Camera,
    shading: &Shading,
    width: u32,
    height: u32,
    faces: &mut Vec<Face>,
) {
    faces.clear();
    for (world, mesh, color) in scene.drawables() {
        let normal_matrix = normal_matrix(&world);
        for triangle in &mesh.triangles {
            let mut points = [(0.0, 0.0); 3];
            let mut depth = 0.0;
            let mut visible = true;
            for (slot, vertex) in points.iter_mut().zip(&triangle.vertices) {
                match camera.project_to_screen(&vertex.position, &world, width, height) {
                    Some((x, y, z)) => {
                        *slot = (x, y);
                        depth += z / 3.0;
                    }
                    None => {
                        visible = false;
                        break;
                    }
                }
            }
            if !visible || signed_area(&points) >= 0.0 {
                continue;
            }

            let Some(normal) = (normal_matrix * triangle.calculate_normal()).try_normalize(f32::EPSILON) else {
                continue;
            };
            faces.push(Face {
                points,
                depth,
                color: shading.shade(color, &normal),
            });
        }
    }
    faces.sort_by(|a, b| b.depth.total_cmp(&a.depth));
}

fn normal_matrix(world: &Matrix4<f32>) -> Matrix3<f32> {
    world
        .fixed_view::<3, 3>(0, 0)
        .into_owned()
        .try_inverse()
        .map(|m| m.transpose())
        .unwrap_or_else(Matrix3::identity)
}

/// Twice the signed area in screen space (y down): negative means the face
/// winds counter-clockwise on screen, i.e. faces the camera.
fn signed_area(points: &[(f32, f32); 3]) -> f32 {
    let [(x0, y0), (x1, y1), (x2, y2)] = *points;
    (x1 - x0) * (y2 - y0) - (x2 - x0) * (y1 - y0)
}

pub struct CanvasRenderer {
    context: CanvasRenderingContext2d,
    width: f32,
    height: f32,
    background: String,
    faces: Vec<Face>,
}

impl CanvasRenderer {
    pub fn new(context: CanvasRenderingContext2d, width: f32, height: f32, background: [f32; 3]) -> Self {
        Self {
            context,
            width,
            height,
            background: shading::css_color(background),
            faces: Vec::new(),
        }
    }

    /// Track a new CSS size; `pixel_ratio` rescales drawing onto the backing store.
    pub fn resize(&mut self, width: f32, height: f32, pixel_ratio: f64) -> Result<(), JsValue> {
        self.width = width;
        self.height = height;
        self.context
            .set_transform(pixel_ratio, 0.0, 0.0, pixel_ratio, 0.0, 0.0)
    }
}

impl SceneRenderer for CanvasRenderer {
    type Error = JsValue;

    fn render(&mut self, scene: &SceneGraph, camera: &Camera, shading: &Shading) -> Result<(), JsValue> {
        let ctx = &self.context;
        ctx.set_fill_style_str(&self.background);
        ctx.fill_rect(0.0, 0.0, self.width as f64, self.height as f64);

        collect_faces(
            scene,
            camera,
            shading,
            self.width as u32,
            self.height as u32,
            &mut self.faces,
        );

        for face in &self.faces {
            let [r, g, b] = face.color;
            let style = format!("rgb({r},{g},{b})");
            ctx.set_fill_style_str(&style);
            // Matching stroke hides hairline seams between neighbours
            ctx.set_stroke_style_str(&style);
            ctx.begin_path();
            let [(x0, y0), (x1, y1), (x2, y2)] = face.points;
            ctx.move_to(x0 as f64, y0 as f64);
            ctx.line_to(x1 as f64, y1 as f64);
            ctx.line_to(x2 as f64, y2 as f64);
            ctx.close_path();
            ctx.fill();
            ctx.stroke();
        }

        Ok(())
    }
}

/// Tracked point as a JS-friendly array
pub fn point_to_array(point: &Point3<f32>) -> Box<[f32]> {
    Box::new([point.x, point.y, point.z])
}
