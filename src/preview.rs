//! Renders one model file into a colour-coded PNG thumbnail.
//!
//! The [`PreviewRenderer`] applies the naming-convention colour, frames the
//! mesh from its oriented bounding box and centroid, and hands the scene to a
//! [`RenderBackend`]. Transient backend failures are retried immediately up
//! to a fixed budget; anything else ends the attempt. Failures are returned
//! as [`RenderOutcome::Failure`], never raised, so a batch run can carry on.
//!
//! # Examples
//! ```
//! use std::path::Path;
//!
//! use printcheck::preview::{PreviewRenderer, PreviewSettings};
//!
//! let renderer = PreviewRenderer::new(PreviewSettings::default());
//! let outcome = renderer.render(Path::new("does_not_exist.stl"));
//! assert!(!outcome.is_success());
//! ```

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use image::ImageFormat;

use crate::camera::CameraFraming;
use crate::color::ColorClass;
use crate::formats;
use crate::renderer::{RenderBackend, RenderError, Scene, SoftwareRasterizer};

/// Default thumbnail edge length in pixels.
pub const DEFAULT_IMAGE_SIZE: u32 = 200;

/// Default number of render attempts per file.
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Output size and retry budget for previews.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreviewSettings {
    /// Thumbnail width in pixels.
    pub width: u32,
    /// Thumbnail height in pixels. Zero is rendered as one.
    pub height: u32,
    /// Total render attempts allowed when failures are transient.
    pub max_retries: u32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_IMAGE_SIZE,
            height: DEFAULT_IMAGE_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl PreviewSettings {
    /// Image size actually rendered; a zero height becomes one.
    ///
    /// # Examples
    /// ```
    /// use printcheck::preview::PreviewSettings;
    ///
    /// let settings = PreviewSettings { width: 200, height: 0, max_retries: 3 };
    /// assert_eq!(settings.render_size(), (200, 1));
    /// ```
    pub fn render_size(&self) -> (u32, u32) {
        (self.width, self.height.max(1))
    }
}

/// An encoded thumbnail.
#[derive(Clone, PartialEq, Eq)]
pub struct PreviewImage {
    /// PNG-encoded bytes.
    pub png: Vec<u8>,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
}

impl fmt::Debug for PreviewImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewImage")
            .field("png", &format_args!("<{} bytes>", self.png.len()))
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Why a preview could not be produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureReason {
    /// A non-retryable failure on the given attempt.
    Fatal {
        /// Human-readable cause.
        message: String,
    },
    /// Every allowed attempt failed transiently.
    RetriesExhausted {
        /// Attempts made.
        attempts: u32,
        /// Message of the last transient failure.
        last_error: String,
    },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Fatal { message } => write!(f, "{}", message),
            FailureReason::RetriesExhausted {
                attempts,
                last_error,
            } => write!(
                f,
                "gave up after {} attempts, last error: {}",
                attempts, last_error
            ),
        }
    }
}

/// Result of rendering one file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The thumbnail was rendered.
    Success(PreviewImage),
    /// No thumbnail; the reason is kept for the log.
    Failure(FailureReason),
}

impl RenderOutcome {
    /// Returns true for [`RenderOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, RenderOutcome::Success(_))
    }
}

/// Anything that produces a [`RenderOutcome`] for a model path.
///
/// [`PreviewRenderer`] is the real implementation; closures implement it too,
/// which keeps checklist assembly testable without meshes.
pub trait Previewer {
    /// Renders the model at `path`.
    fn preview(&self, path: &Path) -> RenderOutcome;
}

impl<F> Previewer for F
where
    F: Fn(&Path) -> RenderOutcome,
{
    fn preview(&self, path: &Path) -> RenderOutcome {
        self(path)
    }
}

/// Renders colour-coded, auto-framed thumbnails with bounded retry.
#[derive(Clone, Debug)]
pub struct PreviewRenderer<B = SoftwareRasterizer> {
    backend: B,
    settings: PreviewSettings,
}

impl PreviewRenderer<SoftwareRasterizer> {
    /// Creates a renderer backed by the CPU rasterizer.
    pub fn new(settings: PreviewSettings) -> Self {
        Self::with_backend(SoftwareRasterizer, settings)
    }
}

impl<B: RenderBackend> PreviewRenderer<B> {
    /// Creates a renderer with a custom backend.
    pub fn with_backend(backend: B, settings: PreviewSettings) -> Self {
        Self { backend, settings }
    }

    /// Returns the configured settings.
    pub fn settings(&self) -> &PreviewSettings {
        &self.settings
    }

    /// Renders the model at `path`.
    ///
    /// Each attempt loads the mesh, frames it and renders it. A transient
    /// failure starts the next attempt straight away; a fatal one ends the
    /// loop. Nothing is written to disk.
    pub fn render(&self, path: &Path) -> RenderOutcome {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let color = ColorClass::from_file_name(&name).face_color();
        let (width, height) = self.settings.render_size();

        let mut attempts = 0;
        let mut last_error = String::from("no render attempts allowed");
        while attempts < self.settings.max_retries {
            attempts += 1;
            log::debug!("Rendering {} (attempt {})", path.display(), attempts);

            match self.attempt(path, color, width, height) {
                Ok(image) => return RenderOutcome::Success(image),
                Err(RenderError::Transient(message)) => {
                    log::warn!(
                        "Transient failure rendering {} (attempt {}/{}): {}",
                        path.display(),
                        attempts,
                        self.settings.max_retries,
                        message
                    );
                    last_error = message;
                }
                Err(RenderError::Fatal(message)) => {
                    log::error!("Error creating preview for {}: {}", path.display(), message);
                    return RenderOutcome::Failure(FailureReason::Fatal { message });
                }
            }
        }

        log::error!(
            "Failed to create preview for {} after {} attempts",
            path.display(),
            attempts
        );
        RenderOutcome::Failure(FailureReason::RetriesExhausted {
            attempts,
            last_error,
        })
    }

    fn attempt(
        &self,
        path: &Path,
        color: [u8; 4],
        width: u32,
        height: u32,
    ) -> Result<PreviewImage, RenderError> {
        let mesh = formats::load_mesh_from_path(path)?;
        let camera = CameraFraming::for_mesh(&mesh)
            .ok_or_else(|| RenderError::Fatal("mesh has no triangles".into()))?;
        let scene = Scene::new(camera, color);

        let image = self.backend.render(&mesh, &scene, width, height)?;

        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|e| RenderError::Fatal(format!("failed to encode PNG: {}", e)))?;

        Ok(PreviewImage {
            png: png.into_inner(),
            width: image.width(),
            height: image.height(),
        })
    }
}

impl<B: RenderBackend> Previewer for PreviewRenderer<B> {
    fn preview(&self, path: &Path) -> RenderOutcome {
        self.render(path)
    }
}

/// Renders one file with the CPU rasterizer.
///
/// Convenience wrapper over [`PreviewRenderer`] taking the size and retry
/// budget directly.
///
/// # Examples
/// ```
/// use std::path::Path;
///
/// use printcheck::preview::{render_preview, FailureReason, RenderOutcome};
///
/// let outcome = render_preview(Path::new("missing.stl"), (200, 200), 10);
/// assert!(matches!(outcome, RenderOutcome::Failure(FailureReason::Fatal { .. })));
/// ```
pub fn render_preview(path: &Path, image_size: (u32, u32), max_retries: u32) -> RenderOutcome {
    let settings = PreviewSettings {
        width: image_size.0,
        height: image_size.1,
        max_retries,
    };
    PreviewRenderer::new(settings).render(path)
}
