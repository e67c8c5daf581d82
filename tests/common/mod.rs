//! Mesh fixtures shared by the integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Corner indices of the twelve triangles of a cube.
const CUBE_FACES: [[usize; 3]; 12] = [
    [0, 2, 1],
    [0, 3, 2],
    [4, 5, 6],
    [4, 6, 7],
    [0, 1, 5],
    [0, 5, 4],
    [3, 7, 6],
    [3, 6, 2],
    [0, 4, 7],
    [0, 7, 3],
    [1, 2, 6],
    [1, 6, 5],
];

/// Triangles of an axis-aligned cube spanning `[0, side]` on every axis.
pub fn cube_triangles(side: f32) -> Vec<stl_io::Triangle> {
    let s = side;
    let corners = [
        [0.0, 0.0, 0.0],
        [s, 0.0, 0.0],
        [s, s, 0.0],
        [0.0, s, 0.0],
        [0.0, 0.0, s],
        [s, 0.0, s],
        [s, s, s],
        [0.0, s, s],
    ];
    CUBE_FACES
        .iter()
        .map(|face| stl_io::Triangle {
            normal: stl_io::Normal::new([0.0, 0.0, 0.0]),
            vertices: face.map(|i| stl_io::Vertex::new(corners[i])),
        })
        .collect()
}

/// Writes a binary STL cube to `path`, creating parent folders.
pub fn write_cube_stl(path: &Path, side: f32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut out = BufWriter::new(File::create(path).unwrap());
    stl_io::write_stl(&mut out, cube_triangles(side).iter()).unwrap();
}

/// Writes a file that no loader can parse.
pub fn write_garbage(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"this is not a mesh").unwrap();
}
