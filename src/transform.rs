//! Hierarchical model transforms built step by step.
//!
//! Clock parts are positioned with chains like "move to the pivot, swing, move
//! down the rod, then stretch". Each step right-multiplies the matrix built so
//! far, so steps read in the same order as a parent-to-child hierarchy and the
//! last step is applied to the vertices first.

use glam::{Mat4, Vec3};

/// A 4×4 model matrix assembled from translate, rotate and scale steps.
///
/// # Example
///
/// ```
/// use pendulum_clock::{Transform, Vec3};
///
/// let rod = Transform::new()
///     .translate(Vec3::new(0.0, 0.5, 0.0))
///     .rotate_z(0.3)
///     .translate(Vec3::new(0.0, -0.3, 0.0))
///     .scale(Vec3::new(0.2, 2.6, 0.2));
///
/// // Anything placed after the swing inherits it.
/// let ball = Transform::new()
///     .translate(Vec3::new(0.0, 0.5, 0.0))
///     .rotate_z(0.3)
///     .translate(Vec3::new(0.0, -0.8, 0.0));
/// # let _ = (rod.matrix(), ball.matrix());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    matrix: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }
}

impl Transform {
    /// Starts a chain at the identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a chain from an existing parent matrix.
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self { matrix }
    }

    pub fn translate(self, offset: Vec3) -> Self {
        self.then(Mat4::from_translation(offset))
    }

    /// Rotates about the local X axis by `angle` radians.
    pub fn rotate_x(self, angle: f32) -> Self {
        self.then(Mat4::from_rotation_x(angle))
    }

    /// Rotates about the local Y axis by `angle` radians.
    pub fn rotate_y(self, angle: f32) -> Self {
        self.then(Mat4::from_rotation_y(angle))
    }

    /// Rotates about the local Z axis by `angle` radians.
    pub fn rotate_z(self, angle: f32) -> Self {
        self.then(Mat4::from_rotation_z(angle))
    }

    /// Scales each local axis independently.
    pub fn scale(self, factors: Vec3) -> Self {
        self.then(Mat4::from_scale(factors))
    }

    pub fn uniform_scale(self, factor: f32) -> Self {
        self.scale(Vec3::splat(factor))
    }

    /// Appends an arbitrary matrix as the next (innermost) step.
    pub fn then(self, step: Mat4) -> Self {
        Self {
            matrix: self.matrix * step,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }
}

impl From<Transform> for Mat4 {
    fn from(t: Transform) -> Self {
        t.matrix
    }
}
