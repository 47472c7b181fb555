use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Per-vertex input of the colour pipeline.
///
/// Locations: 0 = position (3×f32), 1 = color (4×f32).
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl ColorVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x4  // color
    ];

    #[inline]
    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ColorVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Contents of the `Transform` uniform buffer.
///
/// Column-major, matching both glam and WGSL `mat4x4<f32>`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TransformUniform {
    pub mvp: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn new(mvp: Mat4) -> Self {
        Self { mvp: mvp.to_cols_array_2d() }
    }
}

impl Default for TransformUniform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}
