//! Provides the render backend seam and a CPU software rasterizer.
//!
//! The rasterizer takes world-space triangles and a [`Scene`] and produces
//! an RGBA image using a perspective camera, flat shading with fixed ambient
//! light, and a z-buffer. No GPU is required.
//!
//! # Examples
//! ```
//! use printcheck::camera::CameraFraming;
//! use printcheck::formats::{MeshData, Triangle};
//! use printcheck::renderer::{RenderBackend, Scene, SoftwareRasterizer};
//!
//! let mesh = MeshData {
//!     triangles: vec![Triangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0])],
//! };
//! let scene = Scene::new(CameraFraming::for_mesh(&mesh).unwrap(), [180, 0, 0, 255]);
//! let image = SoftwareRasterizer.render(&mesh, &scene, 32, 32).unwrap();
//! assert_eq!(image.dimensions(), (32, 32));
//! ```

use glam::{Mat4, Vec3, Vec4};
use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::camera::{CameraFraming, FIELD_OF_VIEW_DEG};
use crate::formats::{LoadError, MeshData};

/// Ambient light intensity applied to every face.
pub const AMBIENT_LIGHT: f32 = 0.5;

/// Light-gray background behind every preview.
pub const BACKGROUND: [u8; 4] = [240, 240, 240, 255];

/// Errors raised while producing a preview image.
///
/// # Examples
/// ```
/// use printcheck::renderer::RenderError;
///
/// assert!(RenderError::Transient("viewport".into()).is_transient());
/// assert!(!RenderError::Fatal("bad mesh".into()).is_transient());
/// ```
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    /// A degenerate internal size computation; worth retrying unchanged.
    #[error("transient render failure: {0}")]
    Transient(String),
    /// Anything else: bad geometry, unreadable or unsupported file.
    #[error("{0}")]
    Fatal(String),
}

impl RenderError {
    /// Returns true when the failure may clear up on an unmodified retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, RenderError::Transient(_))
    }
}

impl From<LoadError> for RenderError {
    fn from(e: LoadError) -> Self {
        RenderError::Fatal(format!("failed to load mesh: {}", e))
    }
}

/// Everything the backend needs besides the triangles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scene {
    /// Camera placement.
    pub camera: CameraFraming,
    /// Uniform RGBA colour painted on every face.
    pub face_color: [u8; 4],
    /// Ambient light intensity in `[0, 1]`.
    pub ambient: f32,
    /// Background RGBA colour.
    pub background: [u8; 4],
}

impl Scene {
    /// Builds a scene with the fixed preview lighting and background.
    pub fn new(camera: CameraFraming, face_color: [u8; 4]) -> Self {
        Self {
            camera,
            face_color,
            ambient: AMBIENT_LIGHT,
            background: BACKGROUND,
        }
    }
}

/// Something that can turn a mesh and a scene into pixels.
///
/// Implementations report retryable problems as [`RenderError::Transient`].
pub trait RenderBackend {
    /// Renders the mesh at `width` x `height`.
    ///
    /// # Errors
    /// Returns [`RenderError`] when no image could be produced.
    fn render(
        &self,
        mesh: &MeshData,
        scene: &Scene,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, RenderError>;
}

impl<B: RenderBackend + ?Sized> RenderBackend for &B {
    fn render(
        &self,
        mesh: &MeshData,
        scene: &Scene,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, RenderError> {
        (**self).render(mesh, scene, width, height)
    }
}

/// CPU rasterizer with flat shading and a z-buffer.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoftwareRasterizer;

impl RenderBackend for SoftwareRasterizer {
    fn render(
        &self,
        mesh: &MeshData,
        scene: &Scene,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, RenderError> {
        if mesh.is_empty() {
            return Err(RenderError::Fatal("mesh has no triangles".into()));
        }
        if width == 0 || height == 0 {
            return Err(RenderError::Fatal(format!(
                "invalid image size {}x{}",
                width, height
            )));
        }

        let camera = &scene.camera;
        if !(camera.distance.is_finite() && camera.distance > 0.0) {
            return Err(RenderError::Fatal(format!(
                "degenerate mesh extent (camera distance {})",
                camera.distance
            )));
        }

        // ---- Camera ----
        let eye = camera.eye();
        let view = Mat4::look_at_rh(eye, camera.target, camera.up());
        let aspect = width as f32 / height as f32;
        let near = camera.distance * 0.01;
        let far = camera.distance * 100.0;
        let proj = Mat4::perspective_rh_gl(FIELD_OF_VIEW_DEG.to_radians(), aspect, near, far);
        let view_proj = proj * view;

        if !view_proj.is_finite() {
            return Err(RenderError::Transient(format!(
                "non-finite projection for {}x{} viewport",
                width, height
            )));
        }

        // ---- Framebuffer ----
        let w = width as usize;
        let h = height as usize;
        let mut color_buf = vec![scene.background; w * h];
        let mut depth_buf = vec![f32::INFINITY; w * h];

        // ---- Lighting ----
        // Key light from above-front plus a headlight along the view direction
        let key_dir = Vec3::new(0.5, 0.8, 0.3).normalize();
        let head_dir = (eye - camera.target).normalize_or_zero();
        let base = [
            scene.face_color[0] as f32 / 255.0,
            scene.face_color[1] as f32 / 255.0,
            scene.face_color[2] as f32 / 255.0,
        ];

        for tri in &mesh.triangles {
            let mut screen = [Vec3::ZERO; 3];
            let mut visible = true;

            for (slot, vert) in screen.iter_mut().zip(tri.verts.iter()) {
                let clip: Vec4 = view_proj * Vec3::from_array(*vert).extend(1.0);
                if clip.w <= 0.0 {
                    visible = false;
                    break;
                }
                let inv_w = 1.0 / clip.w;
                *slot = Vec3::new(
                    (clip.x * inv_w * 0.5 + 0.5) * width as f32,
                    (0.5 - clip.y * inv_w * 0.5) * height as f32,
                    clip.z * inv_w,
                );
            }

            if !visible {
                continue;
            }

            // Face normal in world space (flat shading)
            let v0 = Vec3::from_array(tri.verts[0]);
            let v1 = Vec3::from_array(tri.verts[1]);
            let v2 = Vec3::from_array(tri.verts[2]);
            let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
            if normal == Vec3::ZERO {
                continue;
            }

            let diffuse = normal.dot(key_dir).abs() * 0.35 + normal.dot(head_dir).abs() * 0.25;
            let shade = (scene.ambient + diffuse).min(1.0);
            let shaded = Rgba([
                to_byte(base[0] * shade),
                to_byte(base[1] * shade),
                to_byte(base[2] * shade),
                scene.face_color[3],
            ]);

            // Screen-space bounding box
            let min_x = screen[0].x.min(screen[1].x).min(screen[2].x).max(0.0) as usize;
            let max_x = (screen[0].x.max(screen[1].x).max(screen[2].x).ceil().max(0.0) as usize).min(w);
            let min_y = screen[0].y.min(screen[1].y).min(screen[2].y).max(0.0) as usize;
            let max_y = (screen[0].y.max(screen[1].y).max(screen[2].y).ceil().max(0.0) as usize).min(h);

            for y in min_y..max_y {
                for x in min_x..max_x {
                    let (u, v, t) = barycentric(screen, x as f32 + 0.5, y as f32 + 0.5);
                    if u < 0.0 || v < 0.0 || t < 0.0 {
                        continue;
                    }
                    let z = u * screen[0].z + v * screen[1].z + t * screen[2].z;
                    let idx = y * w + x;
                    if z < depth_buf[idx] {
                        depth_buf[idx] = z;
                        color_buf[idx] = shaded.0;
                    }
                }
            }
        }

        let pixels: Vec<u8> = color_buf.into_iter().flatten().collect();
        RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| RenderError::Fatal("pixel buffer size mismatch".into()))
    }
}

fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

// ===========================================================================
// Rasterization helpers
// ===========================================================================

fn barycentric(tri: [Vec3; 3], px: f32, py: f32) -> (f32, f32, f32) {
    let v0x = tri[1].x - tri[0].x;
    let v0y = tri[1].y - tri[0].y;
    let v1x = tri[2].x - tri[0].x;
    let v1y = tri[2].y - tri[0].y;
    let v2x = px - tri[0].x;
    let v2y = py - tri[0].y;

    let d00 = v0x * v0x + v0y * v0y;
    let d01 = v0x * v1x + v0y * v1y;
    let d11 = v1x * v1x + v1y * v1y;
    let d20 = v2x * v0x + v2y * v0y;
    let d21 = v2x * v1x + v2y * v1y;

    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < 1e-10 {
        return (-1.0, -1.0, -1.0);
    }

    let inv = 1.0 / denom;
    let v = (d11 * d20 - d01 * d21) * inv;
    let w = (d00 * d21 - d01 * d20) * inv;
    let u = 1.0 - v - w;

    (u, v, w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::Triangle;

    fn square() -> MeshData {
        MeshData {
            triangles: vec![
                Triangle::new([-1.0, -1.0, 0.0], [1.0, -1.0, 0.0], [1.0, 1.0, 0.0]),
                Triangle::new([-1.0, -1.0, 0.0], [1.0, 1.0, 0.0], [-1.0, 1.0, 0.0]),
            ],
        }
    }

    #[test]
    fn test_render_output_dimensions() {
        let mesh = square();
        let scene = Scene::new(CameraFraming::for_mesh(&mesh).unwrap(), [50, 50, 50, 255]);
        let image = SoftwareRasterizer.render(&mesh, &scene, 64, 48).unwrap();
        assert_eq!(image.dimensions(), (64, 48));
    }

    #[test]
    fn test_mesh_is_drawn_over_background() {
        let mesh = square();
        let scene = Scene::new(CameraFraming::for_mesh(&mesh).unwrap(), [180, 0, 0, 255]);
        let image = SoftwareRasterizer.render(&mesh, &scene, 64, 64).unwrap();

        // The centroid projects to the image centre
        let centre = image.get_pixel(32, 32);
        assert_ne!(centre.0, BACKGROUND);
        assert!(centre.0[0] > centre.0[1], "expected a red pixel, got {:?}", centre);

        // Corners stay background: the model is framed with margin
        assert_eq!(image.get_pixel(0, 0).0, BACKGROUND);
        assert_eq!(image.get_pixel(63, 63).0, BACKGROUND);
    }

    #[test]
    fn test_zero_distance_is_fatal() {
        let mesh = square();
        let mut framing = CameraFraming::for_mesh(&mesh).unwrap();
        framing.distance = 0.0;
        let err = SoftwareRasterizer
            .render(&mesh, &Scene::new(framing, [0, 0, 0, 255]), 16, 16)
            .unwrap_err();
        assert!(!err.is_transient());
    }

    #[test]
    fn test_empty_mesh_is_fatal() {
        let mesh = square();
        let scene = Scene::new(CameraFraming::for_mesh(&mesh).unwrap(), [0, 0, 0, 255]);
        let err = SoftwareRasterizer
            .render(&MeshData::default(), &scene, 16, 16)
            .unwrap_err();
        assert_eq!(err, RenderError::Fatal("mesh has no triangles".into()));
    }
}
