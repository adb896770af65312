//! Vertex format and GPU-resident meshes.
//!
//! - [`Vertex3d`] — The vertex format shared by every clock part: position and normal
//! - [`Mesh`] — Vertex and index buffers living on the GPU
//!
//! Meshes are never built directly from loose vertices at runtime. The procedural
//! generators in [`geometry`](crate::geometry) produce a [`RawGeometry`](crate::RawGeometry),
//! which is uploaded exactly once at startup:
//!
//! ```ignore
//! use pendulum_clock::*;
//!
//! let disk = RawGeometry::disk(DiskParams::new(0.55, 0.05, 64))?;
//! let mesh = disk.upload(&gpu);
//! ```
//!
//! # Vertex Layout
//!
//! The [`Vertex3d`] struct uses the following GPU layout (24 bytes per vertex):
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |

use crate::gpu::GpuContext;

/// A vertex with a model-space position and a surface normal.
///
/// Uses `#[repr(C)]` and derives [`bytemuck::Pod`] so slices of vertices can be
/// cast straight to bytes for upload.
///
/// # Example
///
/// ```
/// use pendulum_clock::Vertex3d;
///
/// let vertex = Vertex3d::new([0.0, 0.0, 0.025], [0.0, 0.0, 1.0]);
/// assert_eq!(std::mem::size_of::<Vertex3d>(), 24);
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    /// The 3D position of this vertex in model space.
    pub position: [f32; 3],
    /// The surface normal. Generators always emit unit-length normals.
    pub normal: [f32; 3],
}

impl Vertex3d {
    /// The wgpu vertex buffer layout for this vertex type.
    ///
    /// - **Array stride**: 24 bytes per vertex
    /// - **Step mode**: Per-vertex
    /// - **Attributes**: position (loc 0), normal (loc 1)
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    };

    /// Creates a new vertex from a position and a normal.
    pub const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

/// GPU-resident geometry with vertex and index buffers.
///
/// A `Mesh` is created once at startup from generated geometry and is immutable
/// afterwards. Every clock part that shares a shape (all hands and markers share
/// the rectangle, for instance) draws the same `Mesh` with its own model matrix.
///
/// # Winding Order
///
/// All generated meshes use counter-clockwise winding for outward-facing triangles.
#[derive(Debug)]
pub struct Mesh {
    /// The GPU buffer containing vertex data.
    pub(crate) vertex_buffer: wgpu::Buffer,
    /// The GPU buffer containing index data (u32 indices).
    pub(crate) index_buffer: wgpu::Buffer,
    /// The number of indices in the mesh (determines draw call size).
    index_count: u32,
}

impl Mesh {
    /// Uploads vertex and index data into new GPU buffers.
    ///
    /// Prefer [`RawGeometry::upload`](crate::RawGeometry::upload), which goes through
    /// this after the geometry has been generated and validated.
    pub fn new(gpu: &GpuContext, vertices: &[Vertex3d], indices: &[u32]) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    /// Number of indices submitted per draw.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}
