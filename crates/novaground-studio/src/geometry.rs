//! Reference geometry for the 3D view: the environment cube, coordinate axes,
//! the procedural rocket and the screen-centre crosshair.

use std::f32::consts::TAU;

use novaground_engine::color::Color;
use novaground_engine::render::{Mesh, Topology};

/// Default environment: 100 cells of 10 units, i.e. a 1000-unit cube.
pub const GRID_SIZE: u32 = 100;
pub const GRID_SPACING: f32 = 10.0;

pub fn cube_edge(grid_size: u32, spacing: f32) -> f32 {
    grid_size as f32 * spacing
}

/// Wireframe cube of edge `edge` centred on the origin.
pub fn reference_cube(edge: f32, color: Color) -> Mesh {
    let h = edge / 2.0;
    let corners = [
        [-h, -h, -h],
        [h, -h, -h],
        [h, h, -h],
        [-h, h, -h],
        [-h, -h, h],
        [h, -h, h],
        [h, h, h],
        [-h, h, h],
    ];
    const EDGES: [(usize, usize); 12] = [
        (0, 1), (1, 2), (2, 3), (3, 0), // bottom
        (4, 5), (5, 6), (6, 7), (7, 4), // top
        (0, 4), (1, 5), (2, 6), (3, 7), // verticals
    ];

    let mut mesh = Mesh::new(Topology::LineList);
    for (a, b) in EDGES {
        mesh.push_line(corners[a], corners[b], color);
    }
    mesh
}

/// X (red), Y (green) and Z (blue) axes from the origin.
pub fn coordinate_axes(length: f32) -> Mesh {
    let mut mesh = Mesh::new(Topology::LineList);
    mesh.push_line([0.0; 3], [length, 0.0, 0.0], Color::RED);
    mesh.push_line([0.0; 3], [0.0, length, 0.0], Color::GREEN);
    mesh.push_line([0.0; 3], [0.0, 0.0, length], Color::BLUE);
    mesh
}

/// Crosshair at the centre of the screen, in clip-space coordinates.
///
/// `half_size` is the arm length in normalized device units.
pub fn crosshair(half_size: f32, color: Color) -> Mesh {
    let mut mesh = Mesh::new(Topology::LineList);
    mesh.push_line([-half_size, 0.0, 0.0], [half_size, 0.0, 0.0], color);
    mesh.push_line([0.0, -half_size, 0.0], [0.0, half_size, 0.0], color);
    mesh
}

/// Rocket dimensions in world units. The long axis is local +Z with the
/// tail at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocketShape {
    pub radius: f32,
    pub body_length: f32,
    pub nose_length: f32,
    pub fin_span: f32,
    pub fin_height: f32,
    pub segments: u16,
}

impl Default for RocketShape {
    fn default() -> Self {
        Self {
            radius: 1.0,
            body_length: 8.0,
            nose_length: 3.0,
            fin_span: 1.5,
            fin_height: 2.5,
            segments: 12,
        }
    }
}

const BODY: Color = Color::new(0.85, 0.85, 0.88, 1.0);
const NOSE: Color = Color::new(0.9, 0.2, 0.15, 1.0);
const FIN: Color = Color::new(0.3, 0.3, 0.35, 1.0);

/// Body cylinder with a tail cap, nose cone and four fins.
pub fn rocket(shape: RocketShape) -> Mesh {
    let n = shape.segments.max(3);
    let ring = |z: f32, i: u16| {
        let a = TAU * i as f32 / n as f32;
        [shape.radius * a.cos(), shape.radius * a.sin(), z]
    };
    let top = shape.body_length;

    let mut mesh = Mesh::new(Topology::TriangleList);

    // Body: two rings, two triangles per segment.
    let bottom: Vec<u16> = (0..n).map(|i| mesh.push_vertex(ring(0.0, i), BODY)).collect();
    let upper: Vec<u16> = (0..n).map(|i| mesh.push_vertex(ring(top, i), BODY)).collect();
    for i in 0..n as usize {
        let j = (i + 1) % n as usize;
        mesh.push_triangle(bottom[i], bottom[j], upper[j]);
        mesh.push_triangle(bottom[i], upper[j], upper[i]);
    }

    let tail = mesh.push_vertex([0.0, 0.0, 0.0], FIN);
    for i in 0..n as usize {
        mesh.push_triangle(tail, bottom[(i + 1) % n as usize], bottom[i]);
    }

    // Nose gets its own ring so its colour does not bleed into the body.
    let base: Vec<u16> = (0..n).map(|i| mesh.push_vertex(ring(top, i), NOSE)).collect();
    let apex = mesh.push_vertex([0.0, 0.0, top + shape.nose_length], NOSE);
    for i in 0..n as usize {
        mesh.push_triangle(base[i], base[(i + 1) % n as usize], apex);
    }

    // Fins along ±X and ±Y, flush with the tail.
    let r = shape.radius;
    let outer = r + shape.fin_span;
    for (dx, dy) in [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)] {
        let root_low = mesh.push_vertex([dx * r, dy * r, 0.0], FIN);
        let root_high = mesh.push_vertex([dx * r, dy * r, shape.fin_height], FIN);
        let tip = mesh.push_vertex([dx * outer, dy * outer, 0.0], FIN);
        mesh.push_triangle(root_low, tip, root_high);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cube_is_a_thousand_units() {
        assert_eq!(cube_edge(GRID_SIZE, GRID_SPACING), 1000.0);
    }

    #[test]
    fn cube_has_twelve_edges_of_equal_length() {
        let mesh = reference_cube(1000.0, Color::WHITE);
        assert_eq!(mesh.primitive_count(), 12);
        for pair in mesh.indices.chunks(2) {
            let a = mesh.vertices[pair[0] as usize].position;
            let b = mesh.vertices[pair[1] as usize].position;
            let len: f32 = (0..3).map(|k| (a[k] - b[k]).abs()).sum();
            assert_eq!(len, 1000.0);
        }
        assert!(mesh.vertices.iter().all(|v| v.position.iter().all(|c| c.abs() == 500.0)));
    }

    #[test]
    fn axes_are_rgb() {
        let mesh = coordinate_axes(250.0);
        assert_eq!(mesh.primitive_count(), 3);
        assert_eq!(mesh.vertices[1].position, [250.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[1].color, Color::RED.to_array());
        assert_eq!(mesh.vertices[3].color, Color::GREEN.to_array());
        assert_eq!(mesh.vertices[5].position, [0.0, 0.0, 250.0]);
        assert_eq!(mesh.vertices[5].color, Color::BLUE.to_array());
    }

    #[test]
    fn crosshair_stays_inside_clip_space() {
        let mesh = crosshair(0.03, Color::WHITE);
        assert_eq!(mesh.topology, Topology::LineList);
        assert_eq!(mesh.primitive_count(), 2);
        for v in &mesh.vertices {
            assert!(v.position[0].abs() <= 1.0 && v.position[1].abs() <= 1.0);
            assert_eq!(v.position[2], 0.0);
        }
    }

    #[test]
    fn rocket_counts() {
        let mesh = rocket(RocketShape::default());
        // body 24 + tail 12 + nose 12 + fins 4
        assert_eq!(mesh.primitive_count(), 52);
        assert_eq!(mesh.vertices.len(), 12 * 3 + 2 + 4 * 3);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn rocket_stands_on_its_tail() {
        let shape = RocketShape::default();
        let mesh = rocket(shape);
        let (lo, hi) = mesh.vertices.iter().fold((f32::MAX, f32::MIN), |(lo, hi), v| {
            (lo.min(v.position[2]), hi.max(v.position[2]))
        });
        assert_eq!(lo, 0.0);
        assert_eq!(hi, shape.body_length + shape.nose_length);
    }
}
