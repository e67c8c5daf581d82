//! Geometric measurements used to frame a mesh: centroid and oriented
//! bounding box.
//!
//! Both are pure functions of the loaded triangles so they can be tested
//! without rendering anything.
//!
//! # Examples
//! ```
//! use printcheck::formats::{MeshData, Triangle};
//! use printcheck::geometry::{centroid, oriented_bounding_box};
//!
//! let mesh = MeshData {
//!     triangles: vec![Triangle::new([0.0, 0.0, 0.0], [3.0, 0.0, 0.0], [0.0, 3.0, 0.0])],
//! };
//! let c = centroid(&mesh).unwrap();
//! assert!((c.x - 1.0).abs() < 1e-5 && (c.y - 1.0).abs() < 1e-5);
//!
//! let obb = oriented_bounding_box(&mesh).unwrap();
//! assert!(obb.largest_extent() > 0.0);
//! ```

use std::cmp::Ordering;

use glam::{DVec2, DVec3, Vec3};
use nalgebra::{Matrix3, Vector3};
use parry3d::math::Point;
use parry3d::transformation::try_convex_hull;

use crate::formats::MeshData;

/// Triangles with less area than this are ignored when weighting the centroid.
const AREA_EPSILON: f64 = 1e-12;

/// A box aligned to its own orthonormal frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedBox {
    /// Box centre in mesh space.
    pub center: Vec3,
    /// Unit axes of the box frame.
    pub axes: [Vec3; 3],
    /// Full edge length along each axis.
    pub extents: Vec3,
}

impl OrientedBox {
    /// Returns the longest of the three edge lengths.
    pub fn largest_extent(&self) -> f32 {
        self.extents.max_element()
    }

    /// Returns the box volume.
    pub fn volume(&self) -> f32 {
        self.extents.x * self.extents.y * self.extents.z
    }

    /// Returns the total area of the six box faces.
    pub fn surface_area(&self) -> f32 {
        let e = self.extents;
        2.0 * (e.x * e.y + e.y * e.z + e.z * e.x)
    }
}

/// Area-weighted average of triangle centres.
///
/// Falls back to the plain vertex average when every triangle is degenerate.
/// Returns `None` for an empty mesh.
pub fn centroid(mesh: &MeshData) -> Option<Vec3> {
    if mesh.is_empty() {
        return None;
    }

    let mut weighted = DVec3::ZERO;
    let mut total_area = 0.0_f64;
    for tri in &mesh.triangles {
        let [a, b, c] = tri.verts.map(|v| Vec3::from_array(v).as_dvec3());
        let area = 0.5 * (b - a).cross(c - a).length();
        if area > AREA_EPSILON {
            weighted += (a + b + c) / 3.0 * area;
            total_area += area;
        }
    }

    if total_area > AREA_EPSILON {
        return Some((weighted / total_area).as_vec3());
    }

    let (sum, count) = mesh
        .vertices()
        .fold((DVec3::ZERO, 0usize), |(sum, n), v| {
            (sum + Vec3::from_array(v).as_dvec3(), n + 1)
        });
    Some((sum / count as f64).as_vec3())
}

/// Computes a tight oriented bounding box.
///
/// Candidate frames are the world axes and the principal axes of the vertex
/// cloud. Each frame is then refined about each of its axes with a
/// minimum-area rectangle over the projected convex hull. The candidate with
/// the smallest volume wins; ties (flat meshes have zero volume) go to the
/// smaller surface area, then the shorter longest side. Returns `None` for
/// an empty mesh.
pub fn oriented_bounding_box(mesh: &MeshData) -> Option<OrientedBox> {
    let points: Vec<DVec3> = mesh
        .vertices()
        .map(|v| Vec3::from_array(v).as_dvec3())
        .collect();
    if points.is_empty() {
        return None;
    }

    let frames = [[DVec3::X, DVec3::Y, DVec3::Z], principal_axes(&points)];
    let mut candidates = Vec::with_capacity(8);
    for frame in frames {
        candidates.push(fit_box(&points, frame));
        for k in 0..3 {
            candidates.push(fit_box(&points, refine_about_axis(&points, frame, k)));
        }
    }

    let key = |b: &OrientedBox| (b.volume(), b.surface_area(), b.largest_extent());
    candidates
        .into_iter()
        .min_by(|a, b| key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal))
}

/// Projects the points onto the given frame and measures the enclosing box.
fn fit_box(points: &[DVec3], axes: [DVec3; 3]) -> OrientedBox {
    let mut lo = DVec3::splat(f64::INFINITY);
    let mut hi = DVec3::splat(f64::NEG_INFINITY);
    for p in points {
        let local = DVec3::new(p.dot(axes[0]), p.dot(axes[1]), p.dot(axes[2]));
        lo = lo.min(local);
        hi = hi.max(local);
    }
    let mid = (lo + hi) * 0.5;
    let center = axes[0] * mid.x + axes[1] * mid.y + axes[2] * mid.z;

    OrientedBox {
        center: center.as_vec3(),
        axes: axes.map(|a| a.as_vec3()),
        extents: (hi - lo).as_vec3(),
    }
}

/// Keeps `frame[k]` fixed and turns the other two axes to the minimum-area
/// rectangle enclosing the points projected onto their plane.
fn refine_about_axis(points: &[DVec3], frame: [DVec3; 3], k: usize) -> [DVec3; 3] {
    let axis = frame[k];
    let u = frame[(k + 1) % 3];
    let v = frame[(k + 2) % 3];

    let projected: Vec<DVec2> = points.iter().map(|p| DVec2::new(p.dot(u), p.dot(v))).collect();
    let dir = min_area_direction(&projected);
    let perp = dir.perp();

    [u * dir.x + v * dir.y, u * perp.x + v * perp.y, axis]
}

/// Direction of the planar hull edge whose enclosing rectangle has the least
/// area (ties broken by the shorter longest side).
///
/// The planar hull is read off the 3D hull of the points extruded into a unit
/// prism: its vertices on the `z = 0` cap are the planar hull vertices and
/// every planar hull edge is a cap edge. Falls back to `X` when the points
/// span no area.
fn min_area_direction(points: &[DVec2]) -> DVec2 {
    let prism: Vec<Point<f32>> = points
        .iter()
        .flat_map(|p| {
            let (x, y) = (p.x as f32, p.y as f32);
            [Point::new(x, y, 0.0), Point::new(x, y, 1.0)]
        })
        .collect();
    let (vertices, faces) = match try_convex_hull(&prism) {
        Ok(hull) => hull,
        Err(e) => {
            log::trace!("No planar hull for {} points: {:?}", points.len(), e);
            return DVec2::X;
        }
    };

    let on_cap = |p: &Point<f32>| p.z < 0.5;
    let cap: Vec<DVec2> = vertices
        .iter()
        .filter(|p| on_cap(p))
        .map(|p| DVec2::new(f64::from(p.x), f64::from(p.y)))
        .collect();

    let mut best_key = (f64::INFINITY, f64::INFINITY);
    let mut best_dir = DVec2::X;
    for face in &faces {
        for (i, j) in [(0, 1), (1, 2), (2, 0)] {
            let (start, end) = (&vertices[face[i] as usize], &vertices[face[j] as usize]);
            if !(on_cap(start) && on_cap(end)) {
                continue;
            }
            let edge = DVec2::new(f64::from(end.x - start.x), f64::from(end.y - start.y));
            let Some(dir) = edge.try_normalize() else {
                continue;
            };
            let perp = dir.perp();

            let (mut lo, mut hi) = (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY));
            for p in &cap {
                let local = DVec2::new(p.dot(dir), p.dot(perp));
                lo = lo.min(local);
                hi = hi.max(local);
            }
            let size = hi - lo;
            let key = (size.x * size.y, size.max_element());
            if key < best_key {
                best_key = key;
                best_dir = dir;
            }
        }
    }

    best_dir
}

/// Eigenvectors of the vertex covariance matrix.
fn principal_axes(points: &[DVec3]) -> [DVec3; 3] {
    let n = points.len() as f64;
    let mean = points.iter().copied().sum::<DVec3>() / n;

    let covariance = points.iter().fold(Matrix3::<f64>::zeros(), |acc, p| {
        let d = Vector3::from((*p - mean).to_array());
        acc + d * d.transpose() / n
    });
    let eigen = covariance.symmetric_eigen();
    let column = |i: usize| {
        let c = eigen.eigenvectors.column(i);
        DVec3::new(c[0], c[1], c[2])
    };

    let x = column(0).normalize_or(DVec3::X);
    let y = column(1).normalize_or(DVec3::Y);
    // Re-orthogonalise so the frame stays right-handed after rounding
    let z = x.cross(y).normalize_or(DVec3::Z);
    let y = z.cross(x);
    [x, y, z]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::Triangle;

    fn quad(corners: [[f32; 3]; 4]) -> Vec<Triangle> {
        vec![
            Triangle::new(corners[0], corners[1], corners[2]),
            Triangle::new(corners[0], corners[2], corners[3]),
        ]
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = MeshData::default();
        assert!(centroid(&mesh).is_none());
        assert!(oriented_bounding_box(&mesh).is_none());
    }

    #[test]
    fn test_axis_aligned_box_extents() {
        let mesh = MeshData {
            triangles: quad([
                [0.0, 0.0, 0.0],
                [4.0, 0.0, 0.0],
                [4.0, 2.0, 1.0],
                [0.0, 2.0, 1.0],
            ]),
        };
        let obb = oriented_bounding_box(&mesh).unwrap();
        assert!((obb.largest_extent() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_rotated_square_gets_tight_box() {
        // Unit square rotated 45 degrees in the XY plane
        let h = std::f32::consts::FRAC_1_SQRT_2;
        let mesh = MeshData {
            triangles: quad([[0.0, -h, 0.0], [h, 0.0, 0.0], [0.0, h, 0.0], [-h, 0.0, 0.0]]),
        };
        let obb = oriented_bounding_box(&mesh).unwrap();
        assert!((obb.largest_extent() - 1.0).abs() < 1e-4, "{:?}", obb);
    }

    #[test]
    fn test_centroid_is_area_weighted() {
        // A big triangle and a tiny one far away; the centroid stays near the big one
        let mesh = MeshData {
            triangles: vec![
                Triangle::new([0.0, 0.0, 0.0], [6.0, 0.0, 0.0], [0.0, 6.0, 0.0]),
                Triangle::new([100.0, 0.0, 0.0], [100.01, 0.0, 0.0], [100.0, 0.01, 0.0]),
            ],
        };
        let c = centroid(&mesh).unwrap();
        assert!((c.x - 2.0).abs() < 0.01);
        assert!((c.y - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_degenerate_centroid_falls_back_to_vertex_mean() {
        let mesh = MeshData {
            triangles: vec![Triangle::new([0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [4.0, 0.0, 0.0])],
        };
        let c = centroid(&mesh).unwrap();
        assert!((c.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_principal_axes_follow_elongation() {
        let diagonal = DVec3::new(1.0, 1.0, 0.0).normalize();
        let across = DVec3::new(1.0, -1.0, 0.0).normalize();
        let points: Vec<DVec3> = (-5..=5)
            .flat_map(|t| {
                let along = diagonal * f64::from(t);
                [along + across * 0.1 + DVec3::Z * 0.05, along - across * 0.1 - DVec3::Z * 0.05]
            })
            .collect();

        let axes = principal_axes(&points);
        for (i, a) in axes.iter().enumerate() {
            assert!((a.length() - 1.0).abs() < 1e-9);
            for b in &axes[i + 1..] {
                assert!(a.dot(*b).abs() < 1e-9);
            }
        }
        assert!(axes.iter().any(|a| a.dot(diagonal).abs() > 0.999), "{:?}", axes);
    }

    #[test]
    fn test_collinear_points_keep_default_direction() {
        let points = [DVec2::new(0.0, 0.0), DVec2::new(1.0, 1.0), DVec2::new(2.0, 2.0)];
        let dir = min_area_direction(&points);
        assert!((dir.length() - 1.0).abs() < 1e-6);
    }
}
