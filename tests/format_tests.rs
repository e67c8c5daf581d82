//! Integration tests for multi-format mesh loading.
//!
//! Covers format detection and loading for STL, OBJ and glTF. STL fixtures
//! are generated on the fly; OBJ and glTF fixtures are inline.

mod common;

use std::io::Cursor;

use printcheck::formats::{self, LoadError, MeshLoader};

fn cube_stl_bytes(side: f32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    stl_io::write_stl(&mut out, common::cube_triangles(side).iter()).unwrap();
    out.into_inner()
}

/// One triangle (0,0,0) (1,0,0) (0,1,0), placed by a node translated to z = 5.
const TRIANGLE_GLTF: &str = r#"{
    "asset": {"version": "2.0"},
    "scene": 0,
    "scenes": [{"nodes": [0]}],
    "nodes": [{"mesh": 0, "translation": [0.0, 0.0, 5.0]}],
    "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
    "accessors": [{
        "bufferView": 0,
        "componentType": 5126,
        "count": 3,
        "type": "VEC3",
        "min": [0.0, 0.0, 0.0],
        "max": [1.0, 1.0, 0.0]
    }],
    "bufferViews": [{"buffer": 0, "byteLength": 36}],
    "buffers": [{
        "byteLength": 36,
        "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"
    }]
}"#;

// ===========================================================================
// Format detection tests
// ===========================================================================

#[test]
fn test_stl_loader_detection_by_extension() {
    let loader = formats::stl::StlLoader;
    assert!(loader.can_load(b"anything", Some("stl")));
    assert!(loader.can_load(b"anything", Some("STL"))); // case insensitive
}

#[test]
fn test_stl_loader_detection_by_content() {
    let loader = formats::stl::StlLoader;
    assert!(loader.can_load(&cube_stl_bytes(1.0), None));
    assert!(loader.can_load(b"solid part\nendsolid part\n", None));
    assert!(!loader.can_load(b"v 0 0 0\n", None));
}

#[test]
fn test_gltf_loader_detection_glb_magic() {
    let loader = formats::gltf::GltfLoader;
    let glb_data = b"glTF\x02\x00\x00\x00";
    assert!(loader.can_load(glb_data, None));
    assert!(loader.can_load(glb_data, Some("glb")));
}

#[test]
fn test_find_loader_by_extension() {
    let loader = formats::find_loader(b"v 0 0 0\nf 1 1 1\n", Some("OBJ"));
    assert_eq!(loader.map(|l| l.name()), Some("Wavefront OBJ"));

    let loader = formats::find_loader(b"glTF\x02\x00\x00\x00", Some("glb"));
    assert_eq!(loader.map(|l| l.name()), Some("glTF"));
}

#[test]
fn test_find_loader_by_content() {
    let loader = formats::find_loader(&cube_stl_bytes(2.0), None);
    assert_eq!(loader.map(|l| l.name()), Some("STL"));

    let loader = formats::find_loader(TRIANGLE_GLTF.as_bytes(), None);
    assert_eq!(loader.map(|l| l.name()), Some("glTF"));
}

#[test]
fn test_load_mesh_unknown_format() {
    let result = formats::load_mesh(b"\x00\x01\x02 not a model", None);
    assert!(matches!(result, Err(LoadError::UnrecognizedFormat)));
}

// ===========================================================================
// Parsing tests (synthetic data)
// ===========================================================================

#[test]
fn test_stl_cube_has_twelve_triangles() {
    let mesh = formats::load_mesh(&cube_stl_bytes(3.0), Some("stl")).unwrap();
    assert_eq!(mesh.triangles.len(), 12);
    let max_x = mesh.vertices().map(|v| v[0]).fold(f32::MIN, f32::max);
    assert_eq!(max_x, 3.0);
}

#[test]
fn test_obj_mixed_polygons() {
    let obj = b"# tri and quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
f 1 2 3 4
f 1 2 5
";
    let mesh = formats::obj::ObjLoader.load_from_bytes(obj).unwrap();
    assert_eq!(mesh.triangles.len(), 3);
}

#[test]
fn test_gltf_node_transform_is_applied() {
    let mesh = formats::load_mesh(TRIANGLE_GLTF.as_bytes(), Some("gltf")).unwrap();
    assert_eq!(mesh.triangles.len(), 1);
    for v in mesh.vertices() {
        assert_eq!(v[2], 5.0);
    }
}

#[test]
fn test_truncated_stl_is_invalid() {
    let mut data = cube_stl_bytes(1.0);
    data.truncate(120);
    assert!(formats::stl::StlLoader.load_from_bytes(&data).is_err());
}

// ===========================================================================
// Path loading
// ===========================================================================

#[test]
fn test_load_mesh_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("part.STL");
    common::write_cube_stl(&path, 1.0);

    let mesh = formats::load_mesh_from_path(&path).unwrap();
    assert_eq!(mesh.triangles.len(), 12);
}

#[test]
fn test_load_mesh_from_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let result = formats::load_mesh_from_path(&dir.path().join("gone.stl"));
    assert!(matches!(result, Err(LoadError::Io(_))));
}
