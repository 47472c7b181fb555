use std::collections::HashMap;
use std::num::NonZeroU64;

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::device::DEPTH_FORMAT;
use crate::render::{RenderCtx, RenderTarget};
use crate::shader::{
    ColorVertex, ShaderVariant, TransformUniform, COLOR_WGSL, FRAGMENT_ENTRY, MVP_UNIFORM_NAME,
};

use super::mesh::{GpuMesh, Mesh, MeshHandle, Topology};

/// One draw of an uploaded mesh.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshDraw {
    pub mesh: MeshHandle,
    /// Model-to-world matrix; ignored by [`ShaderVariant::Passthrough`].
    pub model: Mat4,
    pub variant: ShaderVariant,
}

impl MeshDraw {
    /// Draw through the MVP vertex stage.
    pub fn transformed(mesh: MeshHandle, model: Mat4) -> Self {
        Self { mesh, model, variant: ShaderVariant::ModelViewProjection }
    }

    /// Draw with positions taken as clip-space coordinates.
    pub fn clip_space(mesh: MeshHandle) -> Self {
        Self { mesh, model: Mat4::IDENTITY, variant: ShaderVariant::Passthrough }
    }
}

/// Matrix written to a draw's uniform slot.
///
/// The pass-through stage never reads it, so it gets the identity.
fn draw_transform(draw: &MeshDraw, view_proj: Mat4) -> Mat4 {
    if draw.variant.uses_transform() {
        view_proj * draw.model
    } else {
        Mat4::IDENTITY
    }
}

/// Renderer for vertex-colored meshes (triangles and lines), depth tested.
///
/// Every draw gets its own slot in a single uniform buffer addressed with a
/// dynamic offset, so a mesh may be drawn several times per frame with
/// different model matrices.
#[derive(Default)]
pub struct ColorMeshRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipelines: HashMap<(ShaderVariant, Topology), wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,

    transform_ubo: Option<wgpu::Buffer>,
    transform_capacity: usize,
    transform_stride: u64,

    meshes: Vec<GpuMesh>,
}

impl ColorMeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads a mesh and returns a handle valid for the renderer's lifetime.
    ///
    /// Empty meshes are accepted and simply draw nothing.
    pub fn upload(&mut self, ctx: &RenderCtx<'_>, mesh: &Mesh) -> MeshHandle {
        let label = match mesh.topology {
            Topology::TriangleList => "novaground mesh vbo (triangles)",
            Topology::LineList => "novaground mesh vbo (lines)",
        };

        // wgpu rejects zero-sized buffers; keep one dummy vertex instead.
        let vertices: &[ColorVertex] = if mesh.vertices.is_empty() {
            &[ColorVertex { position: [0.0; 3], color: [0.0; 4] }]
        } else {
            &mesh.vertices
        };

        let vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let ibo = (!mesh.indices.is_empty()).then(|| {
            // COPY_BUFFER_ALIGNMENT is 4 bytes; pad odd u16 counts.
            let mut indices = mesh.indices.clone();
            if indices.len() % 2 == 1 {
                indices.push(0);
            }
            ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("novaground mesh ibo"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        let count = if mesh.indices.is_empty() { mesh.vertices.len() } else { mesh.indices.len() };

        self.meshes.push(GpuMesh {
            topology: mesh.topology,
            vbo,
            ibo,
            count: count as u32,
        });

        log::debug!(
            "uploaded mesh #{} ({:?}, {} vertices, {} indices)",
            self.meshes.len() - 1,
            mesh.topology,
            mesh.vertices.len(),
            mesh.indices.len()
        );

        MeshHandle(self.meshes.len() - 1)
    }

    /// Records `draws` into `target` with the camera's `view_proj`.
    ///
    /// Unknown handles are skipped.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        view_proj: Mat4,
        draws: &[MeshDraw],
    ) {
        let draws: Vec<&MeshDraw> = draws
            .iter()
            .filter(|d| self.meshes.get(d.mesh.0).is_some_and(|m| m.count > 0))
            .collect();
        if draws.is_empty() {
            return;
        }

        self.ensure_pipelines(ctx);
        self.ensure_transform_capacity(ctx, draws.len());

        let (Some(ubo), Some(bind_group)) = (self.transform_ubo.as_ref(), self.bind_group.as_ref())
        else {
            return;
        };

        // Pack one uniform per draw at the dynamic-offset stride.
        let stride = self.transform_stride as usize;
        let mut staging = vec![0u8; stride * draws.len()];
        for (i, draw) in draws.iter().enumerate() {
            let uniform = TransformUniform::new(draw_transform(draw, view_proj));
            let bytes = bytemuck::bytes_of(&uniform);
            staging[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
        }
        ctx.queue.write_buffer(ubo, 0, &staging);

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("novaground mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for (i, draw) in draws.iter().enumerate() {
            let mesh = &self.meshes[draw.mesh.0];
            let Some(pipeline) = self.pipelines.get(&(draw.variant, mesh.topology)) else {
                continue;
            };

            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, bind_group, &[(i * stride) as u32]);
            rpass.set_vertex_buffer(0, mesh.vbo.slice(..));
            match mesh.ibo.as_ref() {
                Some(ibo) => {
                    rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint16);
                    rpass.draw_indexed(0..mesh.count, 0, 0..1);
                }
                None => rpass.draw(0..mesh.count, 0..1),
            }
        }
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && !self.pipelines.is_empty() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("novaground color shader"),
            source: wgpu::ShaderSource::Wgsl(COLOR_WGSL.into()),
        });

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("novaground transform bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: true,
                            min_binding_size: Some(transform_binding_size()),
                        },
                        count: None,
                    }],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("novaground color pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        self.pipelines.clear();
        for variant in [ShaderVariant::Passthrough, ShaderVariant::ModelViewProjection] {
            for topology in [Topology::TriangleList, Topology::LineList] {
                let pipeline = create_pipeline(
                    ctx,
                    &shader,
                    &pipeline_layout,
                    variant,
                    topology,
                );
                self.pipelines.insert((variant, topology), pipeline);
            }
        }

        log::debug!(
            "color mesh pipelines built for {:?} ({} variants, {} at group 0 binding 0)",
            ctx.surface_format,
            self.pipelines.len(),
            MVP_UNIFORM_NAME
        );

        self.pipeline_format = Some(ctx.surface_format);
        self.bind_group_layout = Some(bind_group_layout);

        // The bind group references the old layout; rebuild it with the buffer.
        self.bind_group = None;
        self.transform_ubo = None;
        self.transform_capacity = 0;
    }

    fn ensure_transform_capacity(&mut self, ctx: &RenderCtx<'_>, required_draws: usize) {
        if required_draws <= self.transform_capacity && self.transform_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let align = ctx.device.limits().min_uniform_buffer_offset_alignment as u64;
        let size = std::mem::size_of::<TransformUniform>() as u64;
        let stride = size.div_ceil(align) * align;

        let new_cap = required_draws.next_power_of_two().max(16);

        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("novaground transform ubo"),
            size: stride * new_cap as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("novaground transform bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &ubo,
                    offset: 0,
                    size: Some(transform_binding_size()),
                }),
            }],
        });

        self.transform_ubo = Some(ubo);
        self.bind_group = Some(bind_group);
        self.transform_capacity = new_cap;
        self.transform_stride = stride;
    }
}

fn create_pipeline(
    ctx: &RenderCtx<'_>,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    variant: ShaderVariant,
    topology: Topology,
) -> wgpu::RenderPipeline {
    ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("novaground color pipeline"),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(variant.vertex_entry()),
            compilation_options: Default::default(),
            buffers: &[ColorVertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(FRAGMENT_ENTRY),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: topology.to_wgpu(),
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Procedural meshes are not guaranteed to be consistently wound.
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),

        multiview_mask: None,
        cache: None,
    })
}

/// `TransformUniform` is a 4×4 f32 matrix, so its size is always non-zero.
fn transform_binding_size() -> NonZeroU64 {
    NonZeroU64::new(std::mem::size_of::<TransformUniform>() as u64)
        .expect("TransformUniform has non-zero size by construction")
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn transformed_draw_combines_camera_and_model() {
        let view_proj = Mat4::perspective_rh(1.0, 1.5, 0.1, 100.0);
        let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let draw = MeshDraw::transformed(MeshHandle(0), model);
        assert_eq!(draw_transform(&draw, view_proj), view_proj * model);
    }

    #[test]
    fn clip_space_draw_ignores_camera() {
        let view_proj = Mat4::perspective_rh(1.0, 1.5, 0.1, 100.0);
        let mut draw = MeshDraw::clip_space(MeshHandle(3));
        draw.model = Mat4::from_scale(Vec3::splat(4.0));
        assert_eq!(draw.variant, ShaderVariant::Passthrough);
        assert_eq!(draw_transform(&draw, view_proj), Mat4::IDENTITY);
    }
}
