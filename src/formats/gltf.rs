//! Provides a glTF/GLB format loader.
//!
//! Supports binary GLB and JSON glTF with embedded or external buffers.
//! Node transforms are baked into the returned triangles so the mesh is in
//! scene space.
//!
//! # Examples
//! ```
//! use printcheck::formats::{self, MeshLoader};
//!
//! let loader = formats::gltf::GltfLoader;
//! assert!(loader.extensions().contains(&"glb"));
//! ```

use std::path::Path;

use base64::Engine;
use glam::{Mat4, Vec3 as GlamVec3};

use super::{LoadError, LoadResult, MeshData, MeshLoader, Triangle, Vec3};

/// The glTF format loader.
pub struct GltfLoader;

impl MeshLoader for GltfLoader {
    fn name(&self) -> &'static str {
        "glTF"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["gltf", "glb"]
    }

    fn can_load(&self, data: &[u8], extension: Option<&str>) -> bool {
        if let Some(ext) = extension {
            let ext_lower = ext.to_lowercase();
            if ext_lower == "gltf" || ext_lower == "glb" {
                return true;
            }
        }

        // GLB magic bytes
        if data.len() >= 4 && &data[0..4] == b"glTF" {
            return true;
        }

        if data.len() > 10 {
            let start = String::from_utf8_lossy(&data[..data.len().min(1000)]);
            if start.contains("\"asset\"")
                && (start.contains("\"scene\"") || start.contains("\"scenes\""))
            {
                return true;
            }
        }

        false
    }

    fn load_from_bytes(&self, data: &[u8]) -> LoadResult {
        // Works for GLB and fully-embedded glTF
        if let Ok((document, buffers, _)) = gltf::import_slice(data) {
            return load_from_document(&document, &buffers);
        }

        // Lenient path: resolve the buffers we can and skip the rest
        let gltf_data = gltf::Gltf::from_slice(data)
            .map_err(|e| LoadError::InvalidData(format!("Failed to parse glTF: {}", e)))?;

        let buffers: Vec<gltf::buffer::Data> = gltf_data
            .document
            .buffers()
            .map(|buffer| match buffer.source() {
                gltf::buffer::Source::Bin => {
                    gltf::buffer::Data(gltf_data.blob.clone().unwrap_or_default())
                }
                gltf::buffer::Source::Uri(uri) => {
                    gltf::buffer::Data(decode_data_uri(uri).unwrap_or_default())
                }
            })
            .collect();

        load_from_document(&gltf_data.document, &buffers)
    }

    fn resolves_external_resources(&self) -> bool {
        true
    }

    fn load_from_path(&self, path: &Path) -> LoadResult {
        let (document, buffers, _) = gltf::import(path)
            .map_err(|e| LoadError::InvalidData(format!("Failed to import glTF: {}", e)))?;
        load_from_document(&document, &buffers)
    }
}

/// Collects world-space triangles from the default (or first) scene.
fn load_from_document(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> LoadResult {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(LoadError::NoGeometry)?;

    let mut triangles = Vec::new();
    for node in scene.nodes() {
        collect_node_triangles(&node, buffers, Mat4::IDENTITY, &mut triangles);
    }

    if triangles.is_empty() {
        return Err(LoadError::NoGeometry);
    }

    Ok(MeshData { triangles })
}

fn collect_node_triangles(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent: Mat4,
    triangles: &mut Vec<Triangle>,
) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                continue;
            }

            let reader = primitive.reader(|buffer| {
                buffers
                    .get(buffer.index())
                    .map(|d| &*d.0)
                    .filter(|d| !d.is_empty())
            });

            let positions: Vec<Vec3> = match reader.read_positions() {
                Some(iter) => iter
                    .map(|p| world.transform_point3(GlamVec3::from_array(p)).to_array())
                    .collect(),
                None => continue,
            };

            let indices: Vec<u32> = match reader.read_indices() {
                Some(iter) => iter.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };

            for tri in indices.chunks_exact(3) {
                let corner = |i: u32| positions.get(i as usize).copied();
                if let (Some(a), Some(b), Some(c)) = (corner(tri[0]), corner(tri[1]), corner(tri[2]))
                {
                    triangles.push(Triangle::new(a, b, c));
                }
            }
        }
    }

    for child in node.children() {
        collect_node_triangles(&child, buffers, world, triangles);
    }
}

/// Decodes a base64 `data:` URI to raw bytes.
fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let encoded = uri.strip_prefix("data:")?.split_once(',')?.1;
    base64::engine::general_purpose::STANDARD.decode(encoded).ok()
}
