/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use gazer_core::{Camera, Mesh, SceneGraph, SceneRenderer, Shading, Triangle};
use nalgebra::{Matrix3, Matrix4};
use std::io::Write;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Background cells are marked with this so `draw` can tint them
const BACKGROUND: char = '\0';

/// ASCII renderer that converts 3D meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![BACKGROUND; size],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(BACKGROUND);
    }

    /// Character at a cell, `None` outside the buffer or on background.
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.char_buffer[y * self.width + x]).filter(|&c| c != BACKGROUND)
    }

    pub fn render_scene(&mut self, scene: &SceneGraph, camera: &Camera, shading: &Shading) {
        for (world, mesh, color) in scene.drawables() {
            self.render_mesh(mesh, &world, color, camera, shading);
        }
    }

    pub fn render_mesh(
        &mut self,
        mesh: &Mesh,
        model_matrix: &Matrix4<f32>,
        color: [f32; 3],
        camera: &Camera,
        shading: &Shading,
    ) {
        // Normals go through the inverse transpose so scaled nodes still shade right
        let normal_matrix = model_matrix
            .fixed_view::<3, 3>(0, 0)
            .into_owned()
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or_else(Matrix3::identity);

        for triangle in &mesh.triangles {
            self.render_triangle(triangle, model_matrix, &normal_matrix, color, camera, shading);
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        model_matrix: &Matrix4<f32>,
        normal_matrix: &Matrix3<f32>,
        color: [f32; 3],
        camera: &Camera,
        shading: &Shading,
    ) {
        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match camera.project_to_screen(
                &vertex.position,
                model_matrix,
                self.width as u32,
                self.height as u32,
            ) {
                Some(projected) => *slot = projected,
                None => return, // Triangle is clipped
            }
        }

        // Face normal in world space for shading
        let Some(normal) = (normal_matrix * triangle.calculate_normal()).try_normalize(f32::EPSILON) else {
            return;
        };
        let brightness = shading.brightness(color, &normal);

        // Map brightness to character, skipping the blank so lit faces stay visible
        let steps = (LUMINOSITY_RAMP.len() - 2) as f32;
        let char_index = 1 + (brightness * steps).round() as usize;
        let char_index = char_index.min(LUMINOSITY_RAMP.len() - 1);
        let character = LUMINOSITY_RAMP[char_index];

        // Rasterize triangle using scanline algorithm
        self.rasterize_triangle(&screen_coords, character);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                if let Some((w0, w1, w2)) = barycentric(
                    (v0.0, v0.1),
                    (v1.0, v1.1),
                    (v2.0, v2.1),
                    (px, py),
                ) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        // Interpolate depth
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;

                        let idx = y as usize * self.width + x as usize;
                        if depth < self.depth_buffer[idx] {
                            self.depth_buffer[idx] = depth;
                            self.char_buffer[idx] = character;
                        }
                    }
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W, background: Color) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let c = self.char_buffer[idx];

                // Color based on character intensity
                let (color, glyph) = match c {
                    BACKGROUND => (background, '~'),
                    '.' | ':' => (Color::DarkGreen, c),
                    '-' | '=' => (Color::Green, c),
                    '+' | '*' => (Color::Yellow, c),
                    '#' | '%' | '@' => (Color::White, c),
                    _ => (Color::Grey, c),
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(glyph))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl SceneRenderer for AsciiRenderer {
    type Error = std::convert::Infallible;

    fn render(&mut self, scene: &SceneGraph, camera: &Camera, shading: &Shading) -> Result<(), Self::Error> {
        self.clear();
        self.render_scene(scene, camera, shading);
        Ok(())
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazer_core::config::RenderConfig;
    use nalgebra::Point3;

    fn camera(width: usize, height: usize) -> Camera {
        let mut camera = Camera::new(width as u32, height as u32);
        camera.position = Point3::new(0.0, 0.0, 5.0);
        camera
    }

    #[test]
    fn test_barycentric_centroid() {
        let (w0, w1, w2) = barycentric((0.0, 0.0), (3.0, 0.0), (0.0, 3.0), (1.0, 1.0)).unwrap();
        assert!((w0 - 1.0 / 3.0).abs() < 1e-5);
        assert!((w1 - 1.0 / 3.0).abs() < 1e-5);
        assert!((w2 - 1.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_barycentric_degenerate() {
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 1.0)).is_none());
    }

    #[test]
    fn test_cube_covers_center_cell() {
        let mut renderer = AsciiRenderer::new(40, 20);
        let shading = Shading::new(&RenderConfig::default());
        renderer.render_mesh(&Mesh::cube(2.0), &Matrix4::identity(), [0.8, 0.8, 0.8], &camera(40, 20), &shading);

        assert!(renderer.cell(20, 10).is_some());
        assert!(renderer.cell(0, 0).is_none());
        assert!(renderer.cell(40, 0).is_none());
    }

    #[test]
    fn test_clear_resets_buffers() {
        let mut renderer = AsciiRenderer::new(40, 20);
        let shading = Shading::new(&RenderConfig::default());
        renderer.render_mesh(&Mesh::cube(2.0), &Matrix4::identity(), [0.8, 0.8, 0.8], &camera(40, 20), &shading);
        renderer.clear();
        assert!(renderer.cell(20, 10).is_none());
    }

    #[test]
    fn test_draw_writes_every_cell() {
        let renderer = AsciiRenderer::new(4, 2);
        let mut out = Vec::new();
        renderer.draw(&mut out, Color::Blue).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches('~').count(), 8);
    }
}
