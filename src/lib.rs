//! # Pendulum Clock
//!
//! **An animated 3D pendulum clock you can spin around with the mouse.**
//!
//! The clock is built from three procedurally generated meshes (a box, a flat
//! rectangle and a disk) drawn nineteen times per frame with different transforms.
//! Its hands turn and its pendulum swings as closed-form functions of elapsed time.
//! Dragging with the left mouse button rotates the whole assembly.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> Result<(), pendulum_clock::AppError> {
//!     pendulum_clock::run()
//! }
//! ```
//!
//! ## Layers
//!
//! - **Geometry**: [`RawGeometry`] generators, validated on the CPU, uploaded once as [`Mesh`]es
//! - **Animation**: [`TimeSource`] and the pure angle functions in [`motion`]
//! - **Interaction**: [`PointerInput`] feeds [`OrbitController`], which yields the base rotation
//! - **Composition**: [`compose_scene`] turns a [`FrameState`] into [`DrawCommand`]s
//! - **Rendering**: [`MeshPass`] draws them with ambient + diffuse lighting
//!
//! Everything above the rendering layer is plain data and can be tested without a GPU:
//!
//! ```
//! use pendulum_clock::{MotionAngles, OrbitController, PointerEvent, RawGeometry};
//!
//! let body = RawGeometry::clock_box();
//! assert_eq!(body.triangle_count(), 12);
//!
//! let mut orbit = OrbitController::new();
//! orbit.apply(PointerEvent::ButtonDown { x: 0.0, y: 0.0 });
//! orbit.apply(PointerEvent::Moved { x: 0.0, y: 1000.0 });
//! assert_eq!(orbit.rotation_x, 89.0);
//!
//! let angles = MotionAngles::at(0.5);
//! assert!((angles.pendulum - 30f32.to_radians()).abs() < 1e-6);
//! ```

mod app;
pub mod camera;
mod color;
pub mod geometry;
mod gpu;
mod input;
mod mesh;
pub mod mesh_pass;
mod mesh_queue;
pub mod motion;
pub mod orbit;
pub mod scene;
mod time;
mod transform;

pub use app::{AppConfig, AppError, run, run_with_config};
pub use camera::Camera;
pub use color::Color;
pub use geometry::{DiskParams, GeometryError, RawGeometry, SideNormals};
pub use gpu::{GpuContext, GpuError};
pub use input::PointerInput;
pub use mesh::{Mesh, Vertex3d};
pub use mesh_pass::{DrawCall, MeshPass, ShaderError};
pub use mesh_queue::{MeshId, MeshQueue};
pub use motion::MotionAngles;
pub use orbit::{DragState, OrbitController, PointerEvent};
pub use scene::{DrawCommand, FrameState, Part, StaticMeshes, compose_scene};
pub use time::TimeSource;
pub use transform::Transform;

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec2, Vec3};
