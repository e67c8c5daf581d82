//! Camera framing for previews.
//!
//! The camera always looks at the mesh centroid from a fixed front-top
//! oblique angle. Its distance is proportional to the longest side of the
//! oriented bounding box, so models of any absolute size fill the frame the
//! same way.
//!
//! # Examples
//! ```
//! use printcheck::camera::camera_distance;
//!
//! assert_eq!(camera_distance(1.0), 2.5);
//! assert_eq!(camera_distance(10.0), 25.0);
//! ```

use glam::{EulerRot, Mat3, Vec3};

use crate::formats::MeshData;
use crate::geometry;

/// Camera distance as a multiple of the largest bounding-box extent.
pub const DISTANCE_FACTOR: f32 = 2.5;

/// Fixed viewing angles (radians, applied as X, Y, Z rotations): front-top oblique.
pub const VIEW_ANGLES: [f32; 3] = [0.7, -0.3, 0.3];

/// Vertical field of view of the preview camera, in degrees.
pub const FIELD_OF_VIEW_DEG: f32 = 45.0;

/// Returns the camera distance for a model whose largest extent is `scale`.
pub fn camera_distance(scale: f32) -> f32 {
    scale * DISTANCE_FACTOR
}

/// Where the camera sits and what it looks at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFraming {
    /// Euler angles of the camera orbit around the target.
    pub angles: [f32; 3],
    /// Distance from the target to the eye.
    pub distance: f32,
    /// Look-at target (the mesh centroid).
    pub target: Vec3,
}

impl CameraFraming {
    /// Frames a mesh: largest oriented-box extent sets the distance, the
    /// centroid sets the target. Returns `None` for an empty mesh.
    ///
    /// # Examples
    /// ```
    /// use printcheck::camera::CameraFraming;
    /// use printcheck::formats::{MeshData, Triangle};
    ///
    /// let mesh = MeshData {
    ///     triangles: vec![
    ///         Triangle::new([0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [4.0, 2.0, 0.0]),
    ///         Triangle::new([0.0, 0.0, 0.0], [4.0, 2.0, 0.0], [0.0, 2.0, 0.0]),
    ///     ],
    /// };
    /// let framing = CameraFraming::for_mesh(&mesh).unwrap();
    /// assert!((framing.distance - 10.0).abs() < 1e-4);
    /// ```
    pub fn for_mesh(mesh: &MeshData) -> Option<Self> {
        let obb = geometry::oriented_bounding_box(mesh)?;
        let target = geometry::centroid(mesh)?;
        Some(Self {
            angles: VIEW_ANGLES,
            distance: camera_distance(obb.largest_extent()),
            target,
        })
    }

    /// Orientation of the camera orbit.
    fn rotation(&self) -> Mat3 {
        Mat3::from_euler(EulerRot::XYZ, self.angles[0], self.angles[1], self.angles[2])
    }

    /// Eye position: the target pushed back along the rotated +Z axis.
    pub fn eye(&self) -> Vec3 {
        self.target + self.rotation() * Vec3::new(0.0, 0.0, self.distance)
    }

    /// Camera up vector.
    pub fn up(&self) -> Vec3 {
        self.rotation() * Vec3::Y
    }
}
