//! Integration tests for preview rendering: colour coding, camera framing and
//! the retry loop. Backends here are doubles that record the scene they are
//! given or replay a scripted sequence of results.

mod common;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use image::RgbaImage;
use printcheck::formats::MeshData;
use printcheck::preview::{FailureReason, PreviewRenderer, PreviewSettings, RenderOutcome};
use printcheck::renderer::{RenderBackend, RenderError, Scene};

/// Remembers every scene and returns a blank image.
#[derive(Default)]
struct RecordingBackend {
    scenes: RefCell<Vec<Scene>>,
}

impl RenderBackend for RecordingBackend {
    fn render(
        &self,
        _mesh: &MeshData,
        scene: &Scene,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, RenderError> {
        self.scenes.borrow_mut().push(*scene);
        Ok(RgbaImage::new(width, height))
    }
}

/// Replays scripted results, one per call, and counts calls.
struct ScriptedBackend {
    script: RefCell<VecDeque<Result<(), RenderError>>>,
    calls: RefCell<u32>,
}

impl ScriptedBackend {
    fn new(script: Vec<Result<(), RenderError>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            calls: RefCell::new(0),
        }
    }

    /// Fails transiently forever.
    fn always_transient() -> Self {
        Self::new(Vec::new())
    }

    fn calls(&self) -> u32 {
        *self.calls.borrow()
    }
}

impl RenderBackend for ScriptedBackend {
    fn render(
        &self,
        _mesh: &MeshData,
        _scene: &Scene,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, RenderError> {
        *self.calls.borrow_mut() += 1;
        match self.script.borrow_mut().pop_front() {
            Some(Ok(())) => Ok(RgbaImage::new(width, height)),
            Some(Err(e)) => Err(e),
            None => Err(RenderError::Transient("viewport size is zero".into())),
        }
    }
}

fn settings(max_retries: u32) -> PreviewSettings {
    PreviewSettings {
        max_retries,
        ..PreviewSettings::default()
    }
}

fn cube(dir: &Path, name: &str, side: f32) -> PathBuf {
    let path = dir.join(name);
    common::write_cube_stl(&path, side);
    path
}

// ===========================================================================
// Colour coding
// ===========================================================================

#[test]
fn test_face_colour_follows_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let cases = [
        ("arm[a].stl", [180, 0, 0, 255]),
        ("ARM[A].stl", [180, 0, 0, 255]),
        ("both[a][c].stl", [180, 0, 0, 255]),
        ("clear[c].stl", [255, 255, 255, 255]),
        ("plain.stl", [50, 50, 50, 255]),
    ];

    for (name, expected) in cases {
        let backend = RecordingBackend::default();
        let renderer = PreviewRenderer::with_backend(&backend, settings(1));
        let outcome = renderer.render(&cube(dir.path(), name, 1.0));
        assert!(outcome.is_success(), "{} did not render", name);
        assert_eq!(backend.scenes.borrow()[0].face_color, expected, "{}", name);
    }
}

// ===========================================================================
// Camera framing
// ===========================================================================

#[test]
fn test_camera_distance_scales_with_model_size() {
    let dir = tempfile::tempdir().unwrap();
    for (side, expected) in [(1.0, 2.5), (2.0, 5.0), (10.0, 25.0)] {
        let backend = RecordingBackend::default();
        let renderer = PreviewRenderer::with_backend(&backend, settings(1));
        let path = cube(dir.path(), &format!("cube_{}.stl", side), side);
        assert!(renderer.render(&path).is_success());

        let scene = backend.scenes.borrow()[0];
        assert_relative_eq!(scene.camera.distance, expected, max_relative = 1e-3);
        for axis in 0..3 {
            assert_relative_eq!(scene.camera.target[axis], side / 2.0, epsilon = 1e-3);
        }
    }
}

#[test]
fn test_output_matches_requested_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = cube(dir.path(), "part.stl", 1.0);
    let renderer = PreviewRenderer::new(PreviewSettings {
        width: 120,
        height: 0,
        max_retries: 1,
    });
    match renderer.render(&path) {
        RenderOutcome::Success(image) => {
            assert_eq!((image.width, image.height), (120, 1));
            assert_eq!(&image.png[1..4], b"PNG");
        }
        RenderOutcome::Failure(reason) => panic!("render failed: {}", reason),
    }
}

#[test]
fn test_software_render_of_real_cube() {
    let dir = tempfile::tempdir().unwrap();
    let path = cube(dir.path(), "flagged[a].stl", 4.0);
    let outcome = PreviewRenderer::new(PreviewSettings::default()).render(&path);
    let RenderOutcome::Success(preview) = outcome else {
        panic!("expected a preview");
    };

    let decoded = image::load_from_memory(&preview.png).unwrap().to_rgba8();
    let centre = decoded.get_pixel(100, 100).0;
    assert!(centre[0] > centre[1] && centre[0] > centre[2], "got {:?}", centre);
}

// ===========================================================================
// Retry loop
// ===========================================================================

#[test]
fn test_transient_failure_then_success() {
    let dir = tempfile::tempdir().unwrap();
    let path = cube(dir.path(), "part.stl", 1.0);
    let backend = ScriptedBackend::new(vec![
        Err(RenderError::Transient("viewport".into())),
        Err(RenderError::Transient("viewport".into())),
        Ok(()),
    ]);

    let outcome = PreviewRenderer::with_backend(&backend, settings(10)).render(&path);
    assert!(outcome.is_success());
    assert_eq!(backend.calls(), 3);
}

#[test]
fn test_retries_exhausted_after_budget() {
    let dir = tempfile::tempdir().unwrap();
    let path = cube(dir.path(), "part.stl", 1.0);
    let backend = ScriptedBackend::always_transient();

    let outcome = PreviewRenderer::with_backend(&backend, settings(4)).render(&path);
    assert_eq!(
        outcome,
        RenderOutcome::Failure(FailureReason::RetriesExhausted {
            attempts: 4,
            last_error: "viewport size is zero".into(),
        })
    );
    assert_eq!(backend.calls(), 4);
}

#[test]
fn test_fatal_failure_is_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let path = cube(dir.path(), "part.stl", 1.0);
    let backend = ScriptedBackend::new(vec![Err(RenderError::Fatal("out of memory".into()))]);

    let outcome = PreviewRenderer::with_backend(&backend, settings(10)).render(&path);
    assert_eq!(
        outcome,
        RenderOutcome::Failure(FailureReason::Fatal {
            message: "out of memory".into()
        })
    );
    assert_eq!(backend.calls(), 1);
}

#[test]
fn test_unreadable_file_never_reaches_backend() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.stl");
    common::write_garbage(&path);
    let backend = ScriptedBackend::new(vec![Ok(())]);

    let outcome = PreviewRenderer::with_backend(&backend, settings(10)).render(&path);
    assert!(matches!(
        outcome,
        RenderOutcome::Failure(FailureReason::Fatal { .. })
    ));
    assert_eq!(backend.calls(), 0);
}
