use crate::color::Color;
use crate::shader::ColorVertex;

/// Primitive assembly mode of a mesh.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Topology {
    #[default]
    TriangleList,
    LineList,
}

impl Topology {
    pub(crate) fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Self::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            Self::LineList => wgpu::PrimitiveTopology::LineList,
        }
    }

    /// Vertices (or indices) consumed per primitive.
    pub const fn arity(self) -> usize {
        match self {
            Self::TriangleList => 3,
            Self::LineList => 2,
        }
    }
}

/// CPU-side colored geometry, uploaded once through
/// [`ColorMeshRenderer::upload`](super::ColorMeshRenderer::upload).
///
/// An empty `indices` list means the mesh is drawn non-indexed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub topology: Topology,
    pub vertices: Vec<ColorVertex>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn new(topology: Topology) -> Self {
        Self { topology, ..Self::default() }
    }

    /// Appends a vertex and returns its index.
    ///
    /// Meshes are limited to `u16` indices; the caller keeps meshes small
    /// (debug-asserted).
    pub fn push_vertex(&mut self, position: [f32; 3], color: Color) -> u16 {
        debug_assert!(self.vertices.len() < u16::MAX as usize, "mesh exceeds u16 index range");
        let index = self.vertices.len() as u16;
        self.vertices.push(ColorVertex::new(position, color.to_array()));
        index
    }

    /// Appends one line segment (for `LineList` meshes).
    pub fn push_line(&mut self, a: [f32; 3], b: [f32; 3], color: Color) {
        debug_assert_eq!(self.topology, Topology::LineList);
        let ia = self.push_vertex(a, color);
        let ib = self.push_vertex(b, color);
        self.indices.extend_from_slice(&[ia, ib]);
    }

    /// Appends one triangle by existing vertex indices (for `TriangleList` meshes).
    pub fn push_triangle(&mut self, a: u16, b: u16, c: u16) {
        debug_assert_eq!(self.topology, Topology::TriangleList);
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Number of primitives the mesh will assemble into.
    pub fn primitive_count(&self) -> usize {
        let n = if self.indices.is_empty() { self.vertices.len() } else { self.indices.len() };
        n / self.topology.arity()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Opaque reference to a mesh uploaded into a renderer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MeshHandle(pub(crate) usize);

/// GPU buffers of an uploaded mesh.
pub(crate) struct GpuMesh {
    pub topology: Topology,
    pub vbo: wgpu::Buffer,
    pub ibo: Option<wgpu::Buffer>,
    /// Index count when indexed, vertex count otherwise.
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_mesh_counts_segments() {
        let mut m = Mesh::new(Topology::LineList);
        m.push_line([0.0; 3], [1.0, 0.0, 0.0], Color::RED);
        m.push_line([0.0; 3], [0.0, 1.0, 0.0], Color::GREEN);
        assert_eq!(m.vertices.len(), 4);
        assert_eq!(m.indices, vec![0, 1, 2, 3]);
        assert_eq!(m.primitive_count(), 2);
    }

    #[test]
    fn triangle_mesh_shares_vertices() {
        let mut m = Mesh::new(Topology::TriangleList);
        let a = m.push_vertex([0.0, 0.0, 0.0], Color::WHITE);
        let b = m.push_vertex([1.0, 0.0, 0.0], Color::WHITE);
        let c = m.push_vertex([0.0, 1.0, 0.0], Color::WHITE);
        let d = m.push_vertex([1.0, 1.0, 0.0], Color::WHITE);
        m.push_triangle(a, b, c);
        m.push_triangle(b, d, c);
        assert_eq!(m.vertices.len(), 4);
        assert_eq!(m.primitive_count(), 2);
    }

    #[test]
    fn non_indexed_mesh_counts_vertices() {
        let mut m = Mesh::new(Topology::TriangleList);
        for _ in 0..6 {
            m.push_vertex([0.0; 3], Color::BLACK);
        }
        assert_eq!(m.primitive_count(), 2);
    }
}
