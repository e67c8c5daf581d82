//! Provides an STL format loader.
//!
//! STL is the lingua franca of 3D printing. Both binary and ASCII variants
//! are handled by `stl_io`; this loader only flattens the indexed result
//! back into world-space triangles.
//!
//! # Examples
//! ```
//! use printcheck::formats::{self, MeshLoader};
//!
//! let loader = formats::stl::StlLoader;
//! assert!(loader.can_load(b"solid cube\n", None));
//! ```

use std::io::Cursor;

use super::{LoadError, LoadResult, MeshData, MeshLoader, Triangle};

/// Size of the binary STL header plus the triangle count.
const BINARY_HEADER_LEN: usize = 84;
/// Size of one binary STL facet record.
const BINARY_FACET_LEN: usize = 50;

/// The STL format loader.
pub struct StlLoader;

impl MeshLoader for StlLoader {
    fn name(&self) -> &'static str {
        "STL"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["stl"]
    }

    fn can_load(&self, data: &[u8], extension: Option<&str>) -> bool {
        if let Some(ext) = extension {
            if ext.eq_ignore_ascii_case("stl") {
                return true;
            }
        }

        if is_binary_stl(data) {
            return true;
        }

        let head = String::from_utf8_lossy(&data[..data.len().min(256)]);
        head.trim_start().starts_with("solid")
    }

    fn load_from_bytes(&self, data: &[u8]) -> LoadResult {
        let mut reader = Cursor::new(data);
        let stl = stl_io::read_stl(&mut reader)
            .map_err(|e| LoadError::InvalidData(format!("Failed to parse STL: {}", e)))?;

        let mut triangles = Vec::with_capacity(stl.faces.len());
        for face in &stl.faces {
            let mut verts = [[0.0_f32; 3]; 3];
            for (slot, &index) in verts.iter_mut().zip(face.vertices.iter()) {
                let v = stl.vertices.get(index).ok_or_else(|| {
                    LoadError::InvalidData(format!("Facet references missing vertex {}", index))
                })?;
                *slot = [v[0], v[1], v[2]];
            }
            triangles.push(Triangle { verts });
        }

        if triangles.is_empty() {
            return Err(LoadError::NoGeometry);
        }

        Ok(MeshData { triangles })
    }
}

/// Returns true when the byte length matches the facet count in a binary header.
fn is_binary_stl(data: &[u8]) -> bool {
    if data.len() < BINARY_HEADER_LEN {
        return false;
    }
    let count = u32::from_le_bytes([data[80], data[81], data[82], data[83]]) as usize;
    count
        .checked_mul(BINARY_FACET_LEN)
        .and_then(|n| n.checked_add(BINARY_HEADER_LEN))
        == Some(data.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_stl(facets: &[[[f32; 3]; 3]]) -> Vec<u8> {
        let triangles: Vec<stl_io::Triangle> = facets
            .iter()
            .map(|f| stl_io::Triangle {
                normal: stl_io::Normal::new([0.0, 0.0, 1.0]),
                vertices: [
                    stl_io::Vertex::new(f[0]),
                    stl_io::Vertex::new(f[1]),
                    stl_io::Vertex::new(f[2]),
                ],
            })
            .collect();
        let mut out = Cursor::new(Vec::new());
        stl_io::write_stl(&mut out, triangles.iter()).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_binary_detection_by_length() {
        let data = binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
        assert_eq!(data.len(), 84 + 50);
        assert!(is_binary_stl(&data));
        assert!(StlLoader.can_load(&data, None));
    }

    #[test]
    fn test_load_binary_triangle() {
        let data = binary_stl(&[[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 3.0, 0.0]]]);
        let mesh = StlLoader.load_from_bytes(&data).unwrap();
        assert_eq!(mesh.triangles.len(), 1);
        assert_eq!(mesh.triangles[0].verts[2], [0.0, 3.0, 0.0]);
    }

    #[test]
    fn test_load_ascii_triangle() {
        let ascii = b"solid tri
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid tri
";
        let mesh = StlLoader.load_from_bytes(ascii).unwrap();
        assert_eq!(mesh.triangles.len(), 1);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(StlLoader.load_from_bytes(b"definitely not an stl").is_err());
    }
}
