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

    /// Mean of the vertex normals
    pub fn normal(&self) -> Vector3<f32> {
        self.vertices.iter().map(|v| v.normal).sum::<Vector3<f32>>() / 3.0
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default)]
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

    /// Flat-shaded quad from four corners in counter-clockwise order
    fn add_quad(&mut self, corners: [Point3<f32>; 4], normal: Vector3<f32>) {
        let [a, b, c, d] = corners.map(|p| Vertex::new(p, normal));
        self.add_triangle(Triangle::new(a, b, c));
        self.add_triangle(Triangle::new(a, c, d));
    }

    /// Axis-aligned box centred on the origin
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (x, y, z) = (width / 2.0, height / 2.0, depth / 2.0);
        let p = Point3::new;
        let mut mesh = Self::with_capacity(12);

        mesh.add_quad(
            [p(-x, -y, z), p(x, -y, z), p(x, y, z), p(-x, y, z)],
            Vector3::z(),
        );
        mesh.add_quad(
            [p(x, -y, -z), p(-x, -y, -z), p(-x, y, -z), p(x, y, -z)],
            -Vector3::z(),
        );
        mesh.add_quad(
            [p(-x, y, z), p(x, y, z), p(x, y, -z), p(-x, y, -z)],
            Vector3::y(),
        );
        mesh.add_quad(
            [p(-x, -y, -z), p(x, -y, -z), p(x, -y, z), p(-x, -y, z)],
            -Vector3::y(),
        );
        mesh.add_quad(
            [p(x, -y, z), p(x, -y, -z), p(x, y, -z), p(x, y, z)],
            Vector3::x(),
        );
        mesh.add_quad(
            [p(-x, -y, -z), p(-x, -y, z), p(-x, y, z), p(-x, y, -z)],
            -Vector3::x(),
        );

        mesh
    }

    /// Unit-radius sphere with `stacks` latitude bands and `slices` longitude segments
    pub fn uv_sphere(stacks: usize, slices: usize) -> Self {
        let stacks = stacks.max(2);
        let slices = slices.max(3);
        let point = |i: usize, j: usize| {
            let theta = std::f32::consts::PI * i as f32 / stacks as f32;
            let phi = std::f32::consts::TAU * j as f32 / slices as f32;
            let position = Point3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            Vertex::new(position, position.coords)
        };

        let mut mesh = Self::with_capacity(stacks * slices * 2);
        for i in 0..stacks {
            for j in 0..slices {
                let (a, b) = (point(i, j), point(i, j + 1));
                let (c, d) = (point(i + 1, j), point(i + 1, j + 1));
                if i > 0 {
                    mesh.add_triangle(Triangle::new(a, b, c));
                }
                if i + 1 < stacks {
                    mesh.add_triangle(Triangle::new(b, d, c));
                }
            }
        }
        mesh
    }

    /// Small inward-facing triangles spread evenly over a sphere of `radius`
    pub fn starfield(count: usize, radius: f32, star_size: f32) -> Self {
        let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
        let mut mesh = Self::with_capacity(count);

        for i in 0..count {
            let y = 1.0 - 2.0 * (i as f32 + 0.5) / count as f32;
            let ring = (1.0 - y * y).sqrt();
            let phi = golden_angle * i as f32;
            let direction = Vector3::new(ring * phi.cos(), y, ring * phi.sin());

            let center = Point3::from(direction * radius);
            let normal = -direction;
            let tangent = if direction.y.abs() < 0.9 {
                direction.cross(&Vector3::y()).normalize()
            } else {
                direction.cross(&Vector3::x()).normalize()
            };
            let bitangent = direction.cross(&tangent);

            mesh.add_triangle(Triangle::new(
                Vertex::new(center + tangent * star_size, normal),
                Vertex::new(center + bitangent * star_size, normal),
                Vertex::new(center - tangent * star_size, normal),
            ));
        }
        mesh
    }
}
