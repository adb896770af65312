//! Lit mesh rendering with depth testing.
//!
//! This module provides [`MeshPass`], the one pipeline the clock is drawn with.
//! It shades every part with a fixed ambient + diffuse model from a single
//! point light.
//!
//! # Architecture
//!
//! The mesh pass uses two bind groups:
//! - **Group 0**: Frame uniforms (view-projection, light position, ambient strength,
//!   eye position), written once per frame
//! - **Group 1**: Model uniforms (model matrix, normal matrix, color), one slot per
//!   draw in a dynamic-offset buffer
//!
//! Every draw gets its own slot in the model buffer, so all uniform data for a
//! frame is written in one upload before the render pass starts and each draw
//! binds its slot by offset.
//!
//! # Example
//!
//! ```ignore
//! let mut mesh_pass = MeshPass::new(&gpu)?;
//!
//! // Before the render pass: upload uniforms for this frame's draws
//! mesh_pass.ensure_depth_size(&gpu);
//! mesh_pass.prepare(&gpu, &camera, &draw_calls);
//!
//! // Inside a render pass that uses `mesh_pass.depth_attachment()`
//! mesh_pass.draw(&mut render_pass, &draw_calls);
//! ```

use std::num::NonZeroU64;

use glam::{Mat4, Vec3};
use thiserror::Error;

use crate::camera::Camera;
use crate::color::Color;
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};

/// Source of the lit clock shader.
pub const CLOCK_SHADER: &str = include_str!("shaders/clock.wgsl");

/// World-space position of the point light.
pub const LIGHT_POSITION: Vec3 = Vec3::new(2.0, 3.0, 2.0);
/// Fraction of the base color visible with no direct light.
pub const AMBIENT_STRENGTH: f32 = 0.3;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Draw slots allocated up front. The clock needs 19.
const INITIAL_MODEL_CAPACITY: usize = 32;

/// Shader setup failures. The caller may keep running without the pass.
#[derive(Debug, Clone, Error)]
pub enum ShaderError {
    /// The WGSL source failed to parse or validate.
    #[error("shader compilation failed: {0}")]
    Compile(String),
    /// The shader compiled but could not be linked into a render pipeline.
    #[error("pipeline creation failed: {0}")]
    Link(String),
}

/// Per-frame uniforms shared by every draw.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    /// Combined view-projection matrix for transforming world positions to clip space.
    pub view_proj: [[f32; 4]; 4],
    pub light_pos: [f32; 3],
    pub ambient: f32,
    /// Camera position in world space.
    pub view_pos: [f32; 3],
    _pad: f32,
}

impl FrameUniforms {
    pub fn new(camera: &Camera, aspect: f32) -> Self {
        Self {
            view_proj: camera.view_projection(aspect).to_cols_array_2d(),
            light_pos: LIGHT_POSITION.to_array(),
            ambient: AMBIENT_STRENGTH,
            view_pos: camera.position.to_array(),
            _pad: 0.0,
        }
    }
}

/// Per-draw model uniforms.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    /// Model matrix (object to world space transformation).
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of the model matrix, so normals survive non-uniform scaling.
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl ModelUniforms {
    pub fn new(model: Mat4, color: Color) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            color: color.to_array(),
        }
    }
}

/// A mesh to draw with its model matrix and flat color.
#[derive(Clone, Copy, Debug)]
pub struct DrawCall<'a> {
    pub mesh: &'a Mesh,
    pub model: Mat4,
    pub color: Color,
}

/// Rounds `size` up to the next multiple of `alignment`.
fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

/// The lit mesh pipeline together with its uniform buffers and depth buffer.
///
/// # Pipeline Configuration
///
/// - No face culling: the hands and markers are single quads seen from both sides
/// - Depth write with Less-than comparison into a `Depth32Float` buffer
/// - Opaque color output
pub struct MeshPass {
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    model_layout: wgpu::BindGroupLayout,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    /// Distance between consecutive model slots, aligned for dynamic offsets.
    model_stride: u64,
    model_capacity: usize,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl MeshPass {
    /// Builds the pass with the built-in clock shader.
    pub fn new(gpu: &GpuContext) -> Result<Self, ShaderError> {
        Self::from_wgsl(gpu, CLOCK_SHADER)
    }

    /// Builds the pass from WGSL source exposing `vs` and `fs` entry points.
    ///
    /// Validation errors from shader or pipeline creation are captured and
    /// returned instead of reaching the device's uncaptured-error handler.
    pub fn from_wgsl(gpu: &GpuContext, source: &str) -> Result<Self, ShaderError> {
        let device = &gpu.device;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Clock Shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShaderError::Compile(err.to_string()));
        }

        // Frame uniform buffer (group 0)
        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        // Model uniform buffer (group 1), one aligned slot per draw
        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<ModelUniforms>() as u64),
                },
                count: None,
            }],
        });

        let model_stride = align_to(
            std::mem::size_of::<ModelUniforms>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let (model_buffer, model_bind_group) =
            Self::create_model_slots(gpu, &model_layout, model_stride, INITIAL_MODEL_CAPACITY);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &model_layout],
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[Vertex3d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShaderError::Link(err.to_string()));
        }

        let depth_view = Self::create_depth_view(gpu);

        Ok(Self {
            pipeline,
            frame_buffer,
            frame_bind_group,
            model_layout,
            model_buffer,
            model_bind_group,
            model_stride,
            model_capacity: INITIAL_MODEL_CAPACITY,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
        })
    }

    fn create_model_slots(
        gpu: &GpuContext,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniforms"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<ModelUniforms>() as u64),
                }),
            }],
        });

        (buffer, bind_group)
    }

    fn create_depth_view(gpu: &GpuContext) -> wgpu::TextureView {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Ensures the depth buffer matches the current surface size.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            log::debug!(
                "Recreating depth buffer at {}x{}",
                gpu.width(),
                gpu.height()
            );
            self.depth_view = Self::create_depth_view(gpu);
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Depth attachment cleared to the far plane, for the render pass that draws this frame.
    pub fn depth_attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        wgpu::RenderPassDepthStencilAttachment {
            view: &self.depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }
    }

    /// Uploads frame and model uniforms for `draw_calls`.
    ///
    /// Must run before the render pass that calls [`draw`](Self::draw) with the
    /// same slice. The model buffer grows when there are more draws than slots.
    pub fn prepare(
        &mut self,
        gpu: &GpuContext,
        camera: &Camera,
        draw_calls: &[DrawCall],
    ) {
        let frame = FrameUniforms::new(camera, gpu.aspect());
        gpu.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));

        if draw_calls.is_empty() {
            return;
        }

        if draw_calls.len() > self.model_capacity {
            let capacity = draw_calls.len().next_power_of_two();
            log::debug!("Growing model uniform buffer to {capacity} slots");
            let (buffer, bind_group) =
                Self::create_model_slots(gpu, &self.model_layout, self.model_stride, capacity);
            self.model_buffer = buffer;
            self.model_bind_group = bind_group;
            self.model_capacity = capacity;
        }

        let stride = self.model_stride as usize;
        let mut bytes = vec![0u8; stride * draw_calls.len()];
        for (slot, call) in bytes.chunks_exact_mut(stride).zip(draw_calls) {
            let uniforms = ModelUniforms::new(call.model, call.color);
            let data = bytemuck::bytes_of(&uniforms);
            slot[..data.len()].copy_from_slice(data);
        }
        gpu.queue.write_buffer(&self.model_buffer, 0, &bytes);
    }

    /// Records the draws uploaded by the last [`prepare`](Self::prepare).
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass, draw_calls: &[DrawCall]) {
        if draw_calls.is_empty() {
            return;
        }

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for (i, call) in draw_calls.iter().take(self.model_capacity).enumerate() {
            let offset = (i as u64 * self.model_stride) as wgpu::DynamicOffset;
            render_pass.set_bind_group(1, &self.model_bind_group, &[offset]);
            render_pass.set_vertex_buffer(0, call.mesh.vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(call.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..call.mesh.index_count(), 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn uniform_layouts_match_shader() {
        // mat4 + (vec3, f32) + (vec3, f32)
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 96);
        // two mat4 + vec4
        assert_eq!(std::mem::size_of::<ModelUniforms>(), 144);
    }

    #[test]
    fn model_slots_respect_offset_alignment() {
        assert_eq!(align_to(144, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
        assert_eq!(align_to(144, 16), 144);
    }

    #[test]
    fn normal_matrix_keeps_normals_perpendicular() {
        let model = Mat4::from_rotation_z(0.4) * Mat4::from_scale(Vec3::new(0.2, 2.6, 0.2));
        let uniforms = ModelUniforms::new(model, Color::BLACK);
        let normal_matrix = Mat4::from_cols_array_2d(&uniforms.normal_matrix);

        // A surface tangent and normal of the unscaled shape.
        let tangent = Vec3::new(1.0, 1.0, 0.0);
        let normal = Vec3::new(1.0, -1.0, 0.0);

        let world_tangent = model.transform_vector3(tangent);
        let world_normal = normal_matrix.transform_vector3(normal);
        assert_abs_diff_eq!(world_tangent.dot(world_normal), 0.0, epsilon = 1e-5);
        assert_eq!(uniforms.color, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn frame_block_matches_shader_fields() {
        let block = CLOCK_SHADER
            .split("struct FrameUniforms {")
            .nth(1)
            .and_then(|rest| rest.split('}').next())
            .unwrap();
        let fields: Vec<_> = block
            .split(',')
            .filter_map(|field| field.split(':').next())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();
        assert_eq!(fields, ["view_proj", "light_pos", "ambient", "view_pos", "_pad"]);
    }

    #[test]
    fn frame_uniforms_carry_lighting_constants() {
        let frame = FrameUniforms::new(&Camera::new(), 1.0);
        assert_eq!(frame.light_pos, [2.0, 3.0, 2.0]);
        assert_eq!(frame.view_pos, [0.0, 1.5, 5.0]);
        assert_eq!(frame.ambient, AMBIENT_STRENGTH);
    }
}
