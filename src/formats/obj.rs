//! Provides a Wavefront OBJ format loader.
//!
//! Only positions and faces are read. Polygons with more than three corners
//! are fan-triangulated; material libraries are ignored because previews are
//! painted with a single colour.

use std::io::{BufReader, Cursor};

use obj::raw::object::Polygon;
use obj::raw::parse_obj;

use super::{LoadError, LoadResult, MeshData, MeshLoader, Triangle, Vec3};

/// The Wavefront OBJ loader.
pub struct ObjLoader;

impl MeshLoader for ObjLoader {
    fn name(&self) -> &'static str {
        "Wavefront OBJ"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["obj"]
    }

    fn can_load(&self, data: &[u8], extension: Option<&str>) -> bool {
        if let Some(ext) = extension {
            if ext.eq_ignore_ascii_case("obj") {
                return true;
            }
        }

        // Content detection: look for OBJ vertex/face lines
        let text = String::from_utf8_lossy(&data[..data.len().min(4000)]);
        let mut has_vertex = false;
        let mut has_face = false;
        for line in text.lines() {
            let trimmed = line.trim();
            has_vertex |= trimmed.starts_with("v ");
            has_face |= trimmed.starts_with("f ");
            if has_vertex && has_face {
                return true;
            }
        }

        false
    }

    fn load_from_bytes(&self, data: &[u8]) -> LoadResult {
        let reader = BufReader::new(Cursor::new(data));
        let raw = parse_obj(reader)
            .map_err(|e| LoadError::InvalidData(format!("Failed to parse OBJ: {}", e)))?;

        let positions: Vec<Vec3> = raw.positions.iter().map(|p| [p.0, p.1, p.2]).collect();

        let mut triangles = Vec::new();
        for polygon in &raw.polygons {
            let corners = polygon_positions(polygon);
            if corners.len() < 3 {
                continue;
            }

            let lookup = |idx: usize| positions.get(idx).copied();
            let Some(v0) = lookup(corners[0]) else {
                continue;
            };
            for pair in corners[1..].windows(2) {
                if let (Some(v1), Some(v2)) = (lookup(pair[0]), lookup(pair[1])) {
                    triangles.push(Triangle::new(v0, v1, v2));
                }
            }
        }

        if triangles.is_empty() {
            return Err(LoadError::NoGeometry);
        }

        Ok(MeshData { triangles })
    }
}

/// Extracts the position indices of a polygon regardless of its attribute layout.
fn polygon_positions(polygon: &Polygon) -> Vec<usize> {
    match polygon {
        Polygon::P(indices) => indices.clone(),
        Polygon::PT(pairs) => pairs.iter().map(|&(p, _)| p).collect(),
        Polygon::PN(pairs) => pairs.iter().map(|&(p, _)| p).collect(),
        Polygon::PTN(triples) => triples.iter().map(|&(p, _, _)| p).collect(),
    }
}
