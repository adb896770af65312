//! Mesh storage and the per-frame draw queue.

use glam::Mat4;

use crate::color::Color;
use crate::mesh::Mesh;
use crate::mesh_pass::DrawCall;
use crate::scene::DrawCommand;

/// Type-safe handle to a mesh stored in the [`MeshQueue`].
///
/// Obtained from [`MeshQueue::add_mesh`]. Handles are cheap to copy, so the
/// scene refers to shared meshes by handle instead of by reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub(crate) usize);

impl MeshId {
    /// Position of the mesh in registration order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A queued mesh draw call stored in the queue.
#[derive(Clone, Copy, Debug)]
pub struct QueuedMesh {
    /// Handle to the mesh in the queue's mesh array.
    pub mesh: MeshId,
    /// Model-to-world matrix for this instance.
    pub model: Mat4,
    pub color: Color,
}

/// Shared storage for meshes and the per-frame draw queue.
///
/// # Usage Pattern
///
/// ```ignore
/// // Setup: register meshes once
/// let mut queue = MeshQueue::new();
/// let rect = queue.add_mesh(RawGeometry::rect().upload(&gpu));
///
/// // Each frame: queue draw calls, upload and record them, then clear
/// queue.draw(rect, model, Color::BLACK);
/// let draw_calls = queue.draw_calls();
/// mesh_pass.prepare(&gpu, &camera, &draw_calls);
/// mesh_pass.draw(&mut render_pass, &draw_calls);
/// queue.clear_queue();
/// ```
#[derive(Debug, Default)]
pub struct MeshQueue {
    /// Registered meshes, indexed by the values returned from [`add_mesh`](Self::add_mesh).
    meshes: Vec<Mesh>,
    /// Per-frame draw queue, cleared at the end of each frame.
    draw_queue: Vec<QueuedMesh>,
}

impl MeshQueue {
    /// Creates a new empty mesh queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mesh and returns a handle for later use.
    ///
    /// Meshes are stored until the queue is dropped.
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        let idx = self.meshes.len();
        self.meshes.push(mesh);
        MeshId(idx)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Queues a mesh for rendering this frame.
    pub fn draw(&mut self, mesh: MeshId, model: Mat4, color: Color) {
        self.draw_queue.push(QueuedMesh { mesh, model, color });
    }

    /// Queues every command of a composed scene, keeping their order.
    pub fn draw_scene(&mut self, commands: &[DrawCommand]) {
        self.draw_queue.extend(commands.iter().map(|cmd| QueuedMesh {
            mesh: cmd.mesh,
            model: cmd.model,
            color: cmd.color,
        }));
    }

    pub fn queued(&self) -> &[QueuedMesh] {
        &self.draw_queue
    }

    /// Resolves the queued handles into draw calls. Unknown handles are skipped.
    pub fn draw_calls(&self) -> Vec<DrawCall<'_>> {
        self.draw_queue
            .iter()
            .filter_map(|q| {
                self.meshes.get(q.mesh.0).map(|mesh| DrawCall {
                    mesh,
                    model: q.model,
                    color: q.color,
                })
            })
            .collect()
    }

    /// Clears the draw queue for the next frame. Registered meshes are kept.
    pub fn clear_queue(&mut self) {
        self.draw_queue.clear();
    }
}
