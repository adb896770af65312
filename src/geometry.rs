//! Procedural geometry for the clock's primitive solids.
//!
//! Everything here runs on the CPU and produces [`RawGeometry`]: plain vertex and
//! index vectors that can be inspected and validated before they are uploaded
//! with [`RawGeometry::upload`]. Three shapes cover the whole clock:
//!
//! | Shape                       | Used for                                  |
//! |-----------------------------|-------------------------------------------|
//! | [`RawGeometry::clock_box`]  | The clock body                            |
//! | [`RawGeometry::rect`]       | Hour markers, both hands, pendulum rod    |
//! | [`RawGeometry::disk`]       | Clock face, pendulum pivot, pendulum ball |
//!
//! # Example
//!
//! ```
//! use pendulum_clock::{DiskParams, RawGeometry};
//!
//! let face = RawGeometry::disk(DiskParams::new(0.55, 0.05, 64)).unwrap();
//! assert_eq!(face.vertices.len(), 2 * (64 + 2));
//! assert_eq!(face.indices.len(), 12 * 64);
//! assert!(face.validate().is_ok());
//! ```

use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};
use glam::Vec3;
use std::f32::consts::TAU;
use thiserror::Error;

/// Lower corner of the clock body in model space.
pub const CLOCK_BODY_MIN: Vec3 = Vec3::new(-0.5, -1.0, -0.3);
/// Upper corner of the clock body in model space.
pub const CLOCK_BODY_MAX: Vec3 = Vec3::new(0.5, 0.8, 0.3);
/// Half extents of the shared hand/marker rectangle.
pub const RECT_HALF_WIDTH: f32 = 0.04;
pub const RECT_HALF_HEIGHT: f32 = 0.2;

/// Smallest segment count that still encloses an area.
pub const MIN_DISK_SEGMENTS: u32 = 3;

/// Errors that can occur when generating or validating geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A generator was given parameters that cannot describe a solid.
    #[error("invalid geometry parameter: {0}")]
    InvalidParameter(String),
    /// A triangle refers to a vertex that does not exist.
    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    /// The index list does not split into whole triangles.
    #[error("index count {0} is not a multiple of 3")]
    IncompleteTriangle(usize),
}

/// How the rim of a disk is shaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SideNormals {
    /// The side wall reuses the cap vertices, so it is lit with the caps' ±Z
    /// normals. This matches the classic look of the clock.
    #[default]
    CapShared,
    /// The side wall gets its own vertex rings with radial normals.
    Radial,
}

/// Parameters for a finite cylinder with two flat circular caps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiskParams {
    pub radius: f32,
    pub thickness: f32,
    /// Number of rim subdivisions. Must be at least [`MIN_DISK_SEGMENTS`].
    pub segments: u32,
    pub side_normals: SideNormals,
}

impl DiskParams {
    pub const fn new(radius: f32, thickness: f32, segments: u32) -> Self {
        Self {
            radius,
            thickness,
            segments,
            side_normals: SideNormals::CapShared,
        }
    }

    /// Give the side wall true radial normals instead of the cap normals.
    pub const fn radial_side_normals(mut self) -> Self {
        self.side_normals = SideNormals::Radial;
        self
    }

    fn check(&self) -> Result<(), GeometryError> {
        if self.segments < MIN_DISK_SEGMENTS {
            return Err(GeometryError::InvalidParameter(format!(
                "disk needs at least {MIN_DISK_SEGMENTS} segments, got {}",
                self.segments
            )));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(GeometryError::InvalidParameter(format!(
                "disk radius must be a positive finite number, got {}",
                self.radius
            )));
        }
        if !self.thickness.is_finite() || self.thickness < 0.0 {
            return Err(GeometryError::InvalidParameter(format!(
                "disk thickness must be a non-negative finite number, got {}",
                self.thickness
            )));
        }
        Ok(())
    }
}

/// Geometry data before GPU upload.
#[derive(Clone, Debug, Default)]
pub struct RawGeometry {
    /// Vertex positions and normals.
    pub vertices: Vec<Vertex3d>,
    /// Triangle indices, three per triangle, counter-clockwise when seen from outside.
    pub indices: Vec<u32>,
}

impl RawGeometry {
    /// Creates raw geometry from vertices and indices.
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// An axis-aligned box between `min` and `max`.
    ///
    /// Each face has its own four vertices so it can carry a flat outward normal:
    /// 24 vertices and 36 indices in total.
    pub fn cuboid(min: Vec3, max: Vec3) -> Self {
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);

        #[rustfmt::skip]
        let vertices = vec![
            // Front face (Z+)
            Vertex3d::new([x0, y0, z1], [ 0.0,  0.0,  1.0]),
            Vertex3d::new([x1, y0, z1], [ 0.0,  0.0,  1.0]),
            Vertex3d::new([x1, y1, z1], [ 0.0,  0.0,  1.0]),
            Vertex3d::new([x0, y1, z1], [ 0.0,  0.0,  1.0]),
            // Back face (Z-)
            Vertex3d::new([x1, y0, z0], [ 0.0,  0.0, -1.0]),
            Vertex3d::new([x0, y0, z0], [ 0.0,  0.0, -1.0]),
            Vertex3d::new([x0, y1, z0], [ 0.0,  0.0, -1.0]),
            Vertex3d::new([x1, y1, z0], [ 0.0,  0.0, -1.0]),
            // Top face (Y+)
            Vertex3d::new([x0, y1, z1], [ 0.0,  1.0,  0.0]),
            Vertex3d::new([x1, y1, z1], [ 0.0,  1.0,  0.0]),
            Vertex3d::new([x1, y1, z0], [ 0.0,  1.0,  0.0]),
            Vertex3d::new([x0, y1, z0], [ 0.0,  1.0,  0.0]),
            // Bottom face (Y-)
            Vertex3d::new([x0, y0, z0], [ 0.0, -1.0,  0.0]),
            Vertex3d::new([x1, y0, z0], [ 0.0, -1.0,  0.0]),
            Vertex3d::new([x1, y0, z1], [ 0.0, -1.0,  0.0]),
            Vertex3d::new([x0, y0, z1], [ 0.0, -1.0,  0.0]),
            // Right face (X+)
            Vertex3d::new([x1, y0, z1], [ 1.0,  0.0,  0.0]),
            Vertex3d::new([x1, y0, z0], [ 1.0,  0.0,  0.0]),
            Vertex3d::new([x1, y1, z0], [ 1.0,  0.0,  0.0]),
            Vertex3d::new([x1, y1, z1], [ 1.0,  0.0,  0.0]),
            // Left face (X-)
            Vertex3d::new([x0, y0, z0], [-1.0,  0.0,  0.0]),
            Vertex3d::new([x0, y0, z1], [-1.0,  0.0,  0.0]),
            Vertex3d::new([x0, y1, z1], [-1.0,  0.0,  0.0]),
            Vertex3d::new([x0, y1, z0], [-1.0,  0.0,  0.0]),
        ];

        #[rustfmt::skip]
        let indices: Vec<u32> = vec![
            0,  1,  2,  2,  3,  0,  // front
            4,  5,  6,  6,  7,  4,  // back
            8,  9,  10, 10, 11, 8,  // top
            12, 13, 14, 14, 15, 12, // bottom
            16, 17, 18, 18, 19, 16, // right
            20, 21, 22, 22, 23, 20, // left
        ];

        Self::new(vertices, indices)
    }

    /// The clock body: a box 1.0 wide, 1.8 tall and 0.6 deep.
    pub fn clock_box() -> Self {
        Self::cuboid(CLOCK_BODY_MIN, CLOCK_BODY_MAX)
    }

    /// A flat quad in the XY plane facing +Z, taller than it is wide.
    ///
    /// Hands, markers and the pendulum rod all draw this one mesh with their own
    /// scale, so its proportions are the baseline for every stretched part.
    pub fn rect() -> Self {
        let (w, h) = (RECT_HALF_WIDTH, RECT_HALF_HEIGHT);
        let n = [0.0, 0.0, 1.0];
        let vertices = vec![
            Vertex3d::new([-w, -h, 0.0], n),
            Vertex3d::new([w, -h, 0.0], n),
            Vertex3d::new([w, h, 0.0], n),
            Vertex3d::new([-w, h, 0.0], n),
        ];

        let indices = vec![0, 1, 2, 2, 3, 0];

        Self::new(vertices, indices)
    }

    /// A closed cylinder centered at the origin with its axis along Z.
    ///
    /// # Layout
    ///
    /// - Front cap: center vertex, then `segments + 1` rim vertices at `z = +thickness / 2`.
    ///   The last rim vertex repeats the first so the fan closes without wrapping.
    /// - Back cap: the same at `z = -thickness / 2`, starting at `segments + 2`.
    /// - Front fan `(0, i, i + 1)`, back fan reversed so it faces -Z.
    /// - Side wall: a quad strip between the two rims, two triangles per segment.
    ///
    /// With [`SideNormals::CapShared`] this gives `2 * (segments + 2)` vertices and
    /// `12 * segments` indices. [`SideNormals::Radial`] appends two more rings of
    /// `segments + 1` vertices for the side wall.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidParameter`] for fewer than three segments,
    /// a radius that is not positive and finite, or a negative thickness.
    pub fn disk(params: DiskParams) -> Result<Self, GeometryError> {
        params.check()?;

        let DiskParams {
            radius,
            thickness,
            segments,
            side_normals,
        } = params;
        let half = thickness * 0.5;
        let rim = segments + 1;

        let mut vertices = Vec::with_capacity(Self::disk_vertex_count(params));
        let mut indices = Vec::with_capacity(12 * segments as usize);

        let ring_point = |i: u32| {
            let angle = TAU * i as f32 / segments as f32;
            (radius * angle.cos(), radius * angle.sin())
        };

        let front = [0.0, 0.0, 1.0];
        vertices.push(Vertex3d::new([0.0, 0.0, half], front));
        for i in 0..rim {
            let (x, y) = ring_point(i);
            vertices.push(Vertex3d::new([x, y, half], front));
        }

        let base_center = vertices.len() as u32;
        let back = [0.0, 0.0, -1.0];
        vertices.push(Vertex3d::new([0.0, 0.0, -half], back));
        for i in 0..rim {
            let (x, y) = ring_point(i);
            vertices.push(Vertex3d::new([x, y, -half], back));
        }

        for i in 1..=segments {
            indices.extend_from_slice(&[0, i, i + 1]);
        }
        for i in 1..=segments {
            indices.extend_from_slice(&[base_center, base_center + i + 1, base_center + i]);
        }

        let (top_start, bottom_start) = match side_normals {
            SideNormals::CapShared => (1, base_center + 1),
            SideNormals::Radial => {
                let top_start = vertices.len() as u32;
                for z in [half, -half] {
                    for i in 0..rim {
                        let (x, y) = ring_point(i);
                        let normal = Vec3::new(x, y, 0.0).normalize_or_zero();
                        vertices.push(Vertex3d::new([x, y, z], normal.to_array()));
                    }
                }
                (top_start, top_start + rim)
            }
        };

        for i in 0..segments {
            let next = (i + 1) % segments;
            indices.extend_from_slice(&[top_start + i, bottom_start + i, bottom_start + next]);
            indices.extend_from_slice(&[top_start + i, bottom_start + next, top_start + next]);
        }

        Ok(Self::new(vertices, indices))
    }

    /// Number of vertices [`RawGeometry::disk`] emits for `params`.
    pub fn disk_vertex_count(params: DiskParams) -> usize {
        let caps = 2 * (params.segments as usize + 2);
        match params.side_normals {
            SideNormals::CapShared => caps,
            SideNormals::Radial => caps + 2 * (params.segments as usize + 1),
        }
    }

    /// Iterates over triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }

    /// Number of whole triangles in the index list.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks that the indices form whole triangles over existing vertices.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.indices.len() % 3 != 0 {
            return Err(GeometryError::IncompleteTriangle(self.indices.len()));
        }
        let vertex_count = self.vertices.len();
        match self
            .indices
            .iter()
            .find(|&&index| index as usize >= vertex_count)
        {
            Some(&index) => Err(GeometryError::IndexOutOfRange {
                index,
                vertex_count,
            }),
            None => Ok(()),
        }
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns `(min, max)` corners of the bounding box.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }

        (min, max)
    }

    /// Uploads the geometry into GPU buffers.
    pub fn upload(&self, gpu: &GpuContext) -> Mesh {
        Mesh::new(gpu, &self.vertices, &self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn geometric_normal(geom: &RawGeometry, [a, b, c]: [u32; 3]) -> Vec3 {
        let p = |i: u32| Vec3::from(geom.vertices[i as usize].position);
        (p(b) - p(a)).cross(p(c) - p(a))
    }

    fn centroid(geom: &RawGeometry, tri: [u32; 3]) -> Vec3 {
        tri.iter()
            .map(|&i| Vec3::from(geom.vertices[i as usize].position))
            .sum::<Vec3>()
            / 3.0
    }

    #[test]
    fn disk_counts_follow_segments() {
        for segments in [3, 4, 7, 16, 64, 200] {
            let geom = RawGeometry::disk(DiskParams::new(1.0, 0.1, segments)).unwrap();
            let s = segments as usize;
            assert_eq!(geom.vertices.len(), 2 * (s + 2));
            assert_eq!(geom.indices.len(), 12 * s);
            assert_eq!(geom.triangle_count(), 4 * s);
            geom.validate().unwrap();
        }
    }

    #[test]
    fn disk_rejects_too_few_segments() {
        for segments in 0..MIN_DISK_SEGMENTS {
            let err = RawGeometry::disk(DiskParams::new(1.0, 0.1, segments)).unwrap_err();
            assert!(matches!(err, GeometryError::InvalidParameter(_)));
        }
    }

    #[test]
    fn disk_rejects_bad_dimensions() {
        for params in [
            DiskParams::new(0.0, 0.1, 8),
            DiskParams::new(-1.0, 0.1, 8),
            DiskParams::new(f32::NAN, 0.1, 8),
            DiskParams::new(1.0, -0.1, 8),
            DiskParams::new(1.0, f32::INFINITY, 8),
        ] {
            assert!(RawGeometry::disk(params).is_err(), "{params:?} was accepted");
        }
    }

    #[test]
    fn disk_rim_closes_on_first_vertex() {
        let segments = 12;
        let geom = RawGeometry::disk(DiskParams::new(0.55, 0.05, segments)).unwrap();
        let first = Vec3::from(geom.vertices[1].position);
        let last = Vec3::from(geom.vertices[1 + segments as usize].position);
        assert!(first.abs_diff_eq(last, 1e-5));

        let base_center = segments as usize + 2;
        assert_eq!(geom.vertices[base_center].position, [0.0, 0.0, -0.025]);
        assert_eq!(geom.vertices[base_center].normal, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn disk_caps_face_outward() {
        let segments = 16;
        let geom = RawGeometry::disk(DiskParams::new(0.55, 0.05, segments)).unwrap();
        let tris: Vec<_> = geom.triangles().collect();
        let s = segments as usize;

        for &tri in &tris[..s] {
            assert!(geometric_normal(&geom, tri).z > 0.0);
        }
        for &tri in &tris[s..2 * s] {
            assert!(geometric_normal(&geom, tri).z < 0.0);
        }
        for &tri in &tris[2 * s..] {
            let n = geometric_normal(&geom, tri);
            let c = centroid(&geom, tri);
            assert!(n.dot(Vec3::new(c.x, c.y, 0.0)) > 0.0, "side triangle {tri:?} faces inward");
        }
    }

    #[test]
    fn disk_side_wall_shares_cap_normals_by_default() {
        let geom = RawGeometry::disk(DiskParams::new(1.0, 0.2, 8)).unwrap();
        for tri in geom.triangles().skip(16) {
            for i in tri {
                let normal = geom.vertices[i as usize].normal;
                assert_abs_diff_eq!(normal[2].abs(), 1.0);
            }
        }
    }

    #[test]
    fn disk_radial_side_normals() {
        let params = DiskParams::new(2.0, 0.5, 10).radial_side_normals();
        let geom = RawGeometry::disk(params).unwrap();
        assert_eq!(geom.vertices.len(), RawGeometry::disk_vertex_count(params));
        assert_eq!(geom.vertices.len(), 2 * 12 + 2 * 11);
        assert_eq!(geom.indices.len(), 120);
        geom.validate().unwrap();

        for tri in geom.triangles().skip(20) {
            for i in tri {
                let v = geom.vertices[i as usize];
                let n = Vec3::from(v.normal);
                let radial = Vec3::new(v.position[0], v.position[1], 0.0).normalize();
                assert_abs_diff_eq!(n.z, 0.0);
                assert!(n.abs_diff_eq(radial, 1e-5));
            }
        }
    }

    #[test]
    fn disk_normals_are_unit_length() {
        let geom = RawGeometry::disk(DiskParams::new(0.55, 0.05, 32).radial_side_normals()).unwrap();
        for v in &geom.vertices {
            assert_abs_diff_eq!(Vec3::from(v.normal).length(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn disk_bounds_match_dimensions() {
        let geom = RawGeometry::disk(DiskParams::new(0.55, 0.05, 64)).unwrap();
        let (min, max) = geom.bounds();
        assert!(min.abs_diff_eq(Vec3::new(-0.55, -0.55, -0.025), 1e-5));
        assert!(max.abs_diff_eq(Vec3::new(0.55, 0.55, 0.025), 1e-5));
    }

    #[test]
    fn box_has_six_flat_outward_faces() {
        let geom = RawGeometry::clock_box();
        assert_eq!(geom.vertices.len(), 24);
        assert_eq!(geom.indices.len(), 36);
        assert_eq!(geom.triangle_count(), 12);
        geom.validate().unwrap();

        for face in geom.vertices.chunks_exact(4) {
            assert!(face.iter().all(|v| v.normal == face[0].normal));
        }

        for tri in geom.triangles() {
            let expected = Vec3::from(geom.vertices[tri[0] as usize].normal);
            assert!(tri.iter().all(|&i| i / 4 == tri[0] / 4), "triangle spans two faces");
            let n = geometric_normal(&geom, tri).normalize();
            assert!(n.abs_diff_eq(expected, 1e-5), "{tri:?} winds against its normal");
        }
    }

    #[test]
    fn box_bounds_match_clock_body() {
        let (min, max) = RawGeometry::clock_box().bounds();
        assert_eq!(min, CLOCK_BODY_MIN);
        assert_eq!(max, CLOCK_BODY_MAX);
    }

    #[test]
    fn rect_faces_forward() {
        let geom = RawGeometry::rect();
        assert_eq!(geom.vertices.len(), 4);
        assert_eq!(geom.indices.len(), 6);
        geom.validate().unwrap();
        for tri in geom.triangles() {
            assert!(geometric_normal(&geom, tri).normalize().abs_diff_eq(Vec3::Z, 1e-6));
        }
        let (min, max) = geom.bounds();
        assert_eq!(max - min, Vec3::new(0.08, 0.4, 0.0));
    }

    #[test]
    fn validate_reports_bad_indices() {
        let vertices = vec![Vertex3d::new([0.0; 3], [0.0, 0.0, 1.0]); 3];

        let geom = RawGeometry::new(vertices.clone(), vec![0, 1, 3]);
        assert_eq!(
            geom.validate(),
            Err(GeometryError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            })
        );

        let geom = RawGeometry::new(vertices, vec![0, 1]);
        assert_eq!(geom.validate(), Err(GeometryError::IncompleteTriangle(2)));
    }
}
