/// ASCII rasterizer for terminal rendering
use std::collections::HashMap;
use std::io::Write;

use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix3, Matrix4, Point3, Vector3, Vector4};
use tracing::trace;

use orbis_core::{Mesh, Model, Renderer, Triangle, Visitor};

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Light shining down the scene's -Z axis from above, in world space
const LIGHT: [f32; 3] = [0.3, 0.6, 1.0];

/// Fraction of the brightness every lit face receives
const AMBIENT: f32 = 0.2;

/// Procedural stand-ins for the scene's models
#[derive(Debug, Clone, Default)]
pub struct MeshLibrary {
    meshes: HashMap<Model, Mesh>,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Meshes for every model in the showcase scene, sized to its part layout
    pub fn showcase() -> Self {
        Self::new()
            .with(Model::Skybox, Mesh::starfield(160, 10.0, 0.08))
            .with(Model::Hull, Mesh::cuboid(2.4, 2.0, 14.0))
            .with(Model::Turret, Mesh::cuboid(1.0, 0.8, 2.5))
            .with(Model::Engine, Mesh::cuboid(1.6, 1.6, 2.0))
            .with(Model::Tail, Mesh::cuboid(2.0, 3.0, 0.4))
            .with(Model::Logo, Mesh::cuboid(1.0, 1.0, 0.1))
            .with(Model::WingLeft, Mesh::cuboid(6.0, 0.3, 3.0))
            .with(Model::WingRight, Mesh::cuboid(6.0, 0.3, 3.0))
            .with(Model::Planet, Mesh::uv_sphere(10, 20))
    }

    pub fn with(mut self, model: Model, mesh: Mesh) -> Self {
        self.meshes.insert(model, mesh);
        self
    }

    pub fn get(&self, model: Model) -> Option<&Mesh> {
        self.meshes.get(&model)
    }
}

/// Base color per model; shading only picks the character
fn palette(model: Model) -> Color {
    match model {
        Model::Skybox => Color::White,
        Model::Hull | Model::WingLeft | Model::WingRight => Color::Grey,
        Model::Turret | Model::Engine => Color::Yellow,
        Model::Tail => Color::Red,
        Model::Logo => Color::Magenta,
        Model::Planet => Color::Cyan,
    }
}

/// Vertex after projection: screen x, y and NDC depth
type ScreenPoint = (f32, f32, f32);

/// ASCII renderer that converts 3D meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
    projection: Matrix4<f32>,
    /// Light direction in eye space, refreshed with every view
    light: Vector3<f32>,
    meshes: MeshLibrary,
    triangles: usize,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize, meshes: MeshLibrary) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
            projection: Matrix4::identity(),
            light: Vector3::from(LIGHT).normalize(),
            meshes,
            triangles: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reallocate the buffers for a new terminal size
    pub fn resize(&mut self, width: usize, height: usize) {
        let size = width * height;
        self.width = width;
        self.height = height;
        self.depth_buffer = vec![f32::INFINITY; size];
        self.char_buffer = vec![' '; size];
        self.color_buffer = vec![Color::Reset; size];
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
        self.triangles = 0;
    }

    /// Triangles rasterized since the last clear
    pub fn triangles(&self) -> usize {
        self.triangles
    }

    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    /// Number of cells holding geometry
    pub fn covered(&self) -> usize {
        self.char_buffer.iter().filter(|&&c| c != ' ').count()
    }

    pub fn render_mesh(&mut self, mesh: &Mesh, model_view: &Matrix4<f32>, color: Color) {
        // Inverse transpose keeps normals perpendicular under non-uniform scales
        let linear: Matrix3<f32> = model_view.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear.try_inverse().map(|m| m.transpose());

        for triangle in &mesh.triangles {
            self.render_triangle(triangle, model_view, normal_matrix.as_ref(), color);
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        model_view: &Matrix4<f32>,
        normal_matrix: Option<&Matrix3<f32>>,
        color: Color,
    ) {
        let eye = triangle
            .vertices
            .map(|vertex| model_view.transform_point(&vertex.position));

        let mut screen = [(0.0, 0.0, 0.0); 3];
        for (slot, point) in screen.iter_mut().zip(&eye) {
            match self.project(point) {
                Some(projected) => *slot = projected,
                None => return, // Triangle is clipped
            }
        }

        // Degenerate transforms or normals shade at full brightness
        let brightness = normal_matrix
            .and_then(|m| (m * triangle.normal()).try_normalize(f32::EPSILON))
            .map_or(1.0, |normal| normal.dot(&self.light).abs());
        let brightness = AMBIENT + (1.0 - AMBIENT) * brightness;

        // Never pick the blank character for geometry
        let levels = LUMINOSITY_RAMP.len() - 2;
        let char_index = 1 + (brightness * levels as f32).round() as usize;
        let character = LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)];

        self.triangles += 1;
        self.rasterize_triangle(&screen, character, color);
    }

    /// Clip-space transform and perspective divide; `None` outside the depth range
    fn project(&self, point: &Point3<f32>) -> Option<ScreenPoint> {
        let clip = self.projection * Vector4::new(point.x, point.y, point.z, 1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        if !(-1.0..=1.0).contains(&ndc.z) {
            return None;
        }

        let x = (ndc.x + 1.0) * 0.5 * self.width as f32;
        let y = (1.0 - ndc.y) * 0.5 * self.height as f32;
        Some((x, y, ndc.z))
    }

    fn rasterize_triangle(&mut self, coords: &[ScreenPoint; 3], character: char, color: Color) {
        let [v0, v1, v2] = *coords;

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Sub-cell triangles (distant stars) still light their cell
        if max_x - min_x <= 1 && max_y - min_y <= 1 {
            let cx = (v0.0 + v1.0 + v2.0) / 3.0;
            let cy = (v0.1 + v1.1 + v2.1) / 3.0;
            let depth = (v0.2 + v1.2 + v2.2) / 3.0;
            self.plot(cx.floor() as i32, cy.floor() as i32, depth, character, color);
            return;
        }

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
                if let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        // Interpolate depth
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.plot(x, y, depth, character, color);
                    }
                }
            }
        }
    }

    fn plot(&mut self, x: i32, y: i32, depth: f32, character: char, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
            self.color_buffer[idx] = color;
        }
    }

    /// Queue the frame to `writer`; the caller flushes
    pub fn present<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let color = self.color_buffer[idx];
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Visitor<Model> for AsciiRenderer {
    fn draw(&mut self, part: &str, model: &Model, transform: &Matrix4<f32>) {
        // Mesh library is moved out for the duration of the draw
        let meshes = std::mem::take(&mut self.meshes);
        match meshes.get(*model) {
            Some(mesh) => self.render_mesh(mesh, transform, palette(*model)),
            None => trace!(part, ?model, "no mesh for model"),
        }
        self.meshes = meshes;
    }
}

impl Renderer<Model> for AsciiRenderer {
    fn set_projection(&mut self, projection: &Matrix4<f32>) {
        self.projection = *projection;
    }

    fn set_view(&mut self, view: &Matrix4<f32>) {
        self.light = view
            .transform_vector(&Vector3::from(LIGHT))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::z);
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
