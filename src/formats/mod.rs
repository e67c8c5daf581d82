//! Provides the mesh loader trait and common types for multi-format model support.
//!
//! Every loader turns its file format into the same flat, world-space
//! triangle soup. The preview renderer paints the whole surface in a single
//! colour, so loaders keep positions only and drop materials and UVs.
//!
//! # Examples
//! ```
//! use printcheck::formats;
//!
//! let result = formats::load_mesh(b"invalid", None);
//! assert!(result.is_err());
//! ```

pub mod gltf;
pub mod obj;
pub mod stl;

use std::path::Path;

use thiserror::Error;

/// A 3D position used by mesh loaders.
///
/// # Examples
/// ```
/// use printcheck::formats::Vec3;
///
/// let v: Vec3 = [1.0, 2.0, 3.0];
/// assert_eq!(v, [1.0, 2.0, 3.0]);
/// ```
pub type Vec3 = [f32; 3];

/// A single world-space triangle.
///
/// # Examples
/// ```
/// use printcheck::formats::Triangle;
///
/// let tri = Triangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
/// assert_eq!(tri.verts[1], [1.0, 0.0, 0.0]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    /// Triangle vertex positions.
    pub verts: [Vec3; 3],
}

impl Triangle {
    /// Builds a triangle from three positions.
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { verts: [a, b, c] }
    }
}

/// Loaded mesh data ready for framing and rasterization.
///
/// # Examples
/// ```
/// use printcheck::formats::{MeshData, Triangle};
///
/// let tri = Triangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
/// let mesh = MeshData { triangles: vec![tri] };
/// assert_eq!(mesh.triangles.len(), 1);
/// assert_eq!(mesh.vertices().count(), 3);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    /// Triangles in world space.
    pub triangles: Vec<Triangle>,
}

impl MeshData {
    /// Iterates every triangle corner. Shared corners are yielded once per triangle.
    pub fn vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.triangles.iter().flat_map(|t| t.verts.iter().copied())
    }

    /// Returns true when the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

/// The result type for mesh loading.
///
/// # Examples
/// ```
/// use printcheck::formats::{LoadError, LoadResult};
///
/// let result: LoadResult = Err(LoadError::UnrecognizedFormat);
/// assert!(result.is_err());
/// ```
pub type LoadResult = Result<MeshData, LoadError>;

/// Errors that can occur during mesh loading.
///
/// # Examples
/// ```
/// use printcheck::formats::LoadError;
///
/// let err = LoadError::NoGeometry;
/// assert_eq!(format!("{}", err), "No geometry found");
/// ```
#[derive(Debug, Error)]
pub enum LoadError {
    /// Represents invalid or corrupted file data.
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// Indicates the file format is not recognized.
    #[error("Unrecognized format")]
    UnrecognizedFormat,
    /// Represents an IO error reading the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Indicates no geometry was found in the model.
    #[error("No geometry found")]
    NoGeometry,
}

/// A trait for format-specific mesh loaders.
///
/// # Examples
/// ```
/// use printcheck::formats::{self, MeshLoader};
///
/// let loader = formats::stl::StlLoader;
/// assert_eq!(loader.name(), "STL");
/// ```
pub trait MeshLoader: Send + Sync {
    /// Returns the human-readable name for this format.
    fn name(&self) -> &'static str;

    /// Returns the file extensions this loader handles (lowercase, without dot).
    ///
    /// # Examples
    /// ```
    /// use printcheck::formats::{self, MeshLoader};
    ///
    /// let loader = formats::stl::StlLoader;
    /// assert!(loader.extensions().contains(&"stl"));
    /// ```
    fn extensions(&self) -> &'static [&'static str];

    /// Checks whether this loader can handle the given data.
    ///
    /// This should be a quick check (magic bytes, a header line) without
    /// fully parsing the file.
    fn can_load(&self, data: &[u8], extension: Option<&str>) -> bool;

    /// Loads a mesh from raw bytes.
    ///
    /// # Errors
    /// Returns an error if the data cannot be parsed or contains no geometry.
    fn load_from_bytes(&self, data: &[u8]) -> LoadResult;

    /// Returns true when a file of this format may reference other files
    /// next to it, so it must be loaded through [`MeshLoader::load_from_path`].
    fn resolves_external_resources(&self) -> bool {
        false
    }

    /// Loads a mesh from a file path.
    ///
    /// Default implementation reads the file and calls `load_from_bytes`,
    /// but loaders can override this to resolve external resources.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    fn load_from_path(&self, path: &Path) -> LoadResult {
        let data = std::fs::read(path)?;
        self.load_from_bytes(&data)
    }
}

/// Returns all registered mesh loaders, most common print format first.
///
/// # Examples
/// ```
/// use printcheck::formats;
///
/// let loaders = formats::get_loaders();
/// assert_eq!(loaders[0].name(), "STL");
/// ```
pub fn get_loaders() -> Vec<Box<dyn MeshLoader>> {
    vec![
        Box::new(stl::StlLoader),
        Box::new(obj::ObjLoader),
        Box::new(gltf::GltfLoader),
    ]
}

/// Finds a loader that can handle the given data and extension.
///
/// # Examples
/// ```
/// use printcheck::formats;
///
/// let loader = formats::find_loader(b"solid part\nendsolid part\n", Some("STL"));
/// assert_eq!(loader.map(|l| l.name()), Some("STL"));
/// ```
pub fn find_loader(data: &[u8], extension: Option<&str>) -> Option<Box<dyn MeshLoader>> {
    let mut loaders = get_loaders();

    if let Some(ext) = extension {
        let ext_lower = ext.to_lowercase();
        if let Some(idx) = loaders.iter().position(|loader| {
            loader.extensions().contains(&ext_lower.as_str())
                && loader.can_load(data, Some(&ext_lower))
        }) {
            return Some(loaders.swap_remove(idx));
        }
    }

    // Fall back to content-based detection
    loaders.into_iter().find(|loader| loader.can_load(data, None))
}

/// Loads a mesh from bytes, auto-detecting the format.
///
/// # Errors
/// Returns an error if no loader recognizes the data or parsing fails.
///
/// # Examples
/// ```
/// use printcheck::formats::{self, LoadError};
///
/// let result = formats::load_mesh(b"\x00\x01", None);
/// assert!(matches!(result, Err(LoadError::UnrecognizedFormat)));
/// ```
pub fn load_mesh(data: &[u8], extension: Option<&str>) -> LoadResult {
    find_loader(data, extension)
        .ok_or(LoadError::UnrecognizedFormat)?
        .load_from_bytes(data)
}

/// Loads a mesh from a file path, auto-detecting the format.
///
/// # Errors
/// Returns an error if the file cannot be read or the format is unrecognized.
///
/// # Examples
/// ```
/// use std::path::Path;
///
/// use printcheck::formats;
///
/// let result = formats::load_mesh_from_path(Path::new("does_not_exist.stl"));
/// assert!(result.is_err());
/// ```
pub fn load_mesh_from_path(path: &Path) -> LoadResult {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase());

    let data = std::fs::read(path)?;

    let loader = find_loader(&data, extension.as_deref()).ok_or(LoadError::UnrecognizedFormat)?;

    if loader.resolves_external_resources() {
        loader.load_from_path(path)
    } else {
        loader.load_from_bytes(&data)
    }
}
