#![allow(dead_code)]

use std::io::Cursor;

use base64::Engine as _;

use cgmath::Point3;
use flow_showroom::{
    catalog::{AssetDescriptor, Catalog},
    data_structures::model::{LoadedObject, Material, MeshData, ObjectNode, Side, SourceMaterial},
    resources::AssetSource,
};
use serde_json::json;

pub const FIXTURES: &str = "tests/fixtures";

pub fn fixtures() -> AssetSource {
    AssetSource::new(FIXTURES)
}

/// The built-in catalog plus a few entries pointing at test-only assets.
pub fn test_catalog() -> Catalog {
    let mut entries = Catalog::default().entries().to_vec();
    entries.push(AssetDescriptor::new("Triangle", "scenes/triangle.gltf", None));
    entries.push(AssetDescriptor::new("Draco", "scenes/draco.gltf", None));
    entries.push(AssetDescriptor::new("Missing", "nowhere/missing.obj", None));
    Catalog::new(entries)
        .and_then(|c| c.with_collection("Meir", &["MB01", "MB02", "MB03", "MB04"]))
        .and_then(|c| c.with_collection("Broken", &["Missing", "Draco"]))
        .expect("test catalog is consistent")
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}

pub fn assert_point_close(actual: Point3<f32>, expected: [f32; 3]) {
    assert_close(actual.x, expected[0]);
    assert_close(actual.y, expected[1]);
    assert_close(actual.z, expected[2]);
}

pub fn source_material(name: &str, base_colour: Option<[f32; 4]>) -> Material {
    Material::Source(SourceMaterial {
        name: name.to_string(),
        base_colour,
        colour_map: None,
        metalness: None,
        roughness: None,
        side: Side::Front,
    })
}

/// A closed box between `min` and `max`, 8 shared corners and 12 triangles.
pub fn box_mesh(min: [f32; 3], max: [f32; 3], material: Option<Material>) -> MeshData {
    let mut positions = Vec::with_capacity(8);
    for x in [min[0], max[0]] {
        for y in [min[1], max[1]] {
            for z in [min[2], max[2]] {
                positions.push([x, y, z]);
            }
        }
    }
    let quads: [[u32; 4]; 6] = [
        [0, 1, 3, 2],
        [4, 6, 7, 5],
        [0, 4, 5, 1],
        [2, 3, 7, 6],
        [0, 2, 6, 4],
        [1, 5, 7, 3],
    ];
    let indices = quads
        .iter()
        .flat_map(|[a, b, c, d]| [*a, *b, *c, *a, *c, *d])
        .collect();
    MeshData {
        name: "box".to_string(),
        positions,
        indices,
        material,
        ..Default::default()
    }
}

pub fn box_object(name: &str, min: [f32; 3], max: [f32; 3]) -> LoadedObject {
    let mut root = ObjectNode::new(name);
    root.meshes
        .push(box_mesh(min, max, Some(source_material(name, Some([0.5, 0.5, 0.5, 1.0])))));
    LoadedObject::new(name, root)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            image::Rgba([255, 255, 255, 255])
        } else {
            image::Rgba([0, 0, 0, 255])
        }
    });
    let mut bytes = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("failed to encode png");
    bytes.into_inner()
}

fn pad(mut bytes: Vec<u8>, fill: u8) -> Vec<u8> {
    while bytes.len() % 4 != 0 {
        bytes.push(fill);
    }
    bytes
}

/// Packs a glTF JSON document and its binary chunk into a GLB container.
pub fn glb(document: &serde_json::Value, bin: &[u8]) -> Vec<u8> {
    let json = pad(serde_json::to_vec(document).expect("json"), b' ');
    let bin = pad(bin.to_vec(), 0);
    let total = 12 + 8 + json.len() + 8 + bin.len();

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(&bin);
    out
}

fn triangle_geometry() -> Vec<u8> {
    let mut bin = Vec::new();
    for p in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        p.iter().for_each(|c| bin.extend_from_slice(&c.to_le_bytes()));
    }
    for t in [[0.0f32, 0.0], [1.0, 0.0], [0.0, 1.0]] {
        t.iter().for_each(|c| bin.extend_from_slice(&c.to_le_bytes()));
    }
    for i in [0u16, 1, 2] {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    bin
}

/// A JSON glTF whose buffer and colour map are both embedded as base64 data URIs.
pub fn embedded_triangle_gltf() -> Vec<u8> {
    let engine = base64::engine::general_purpose::STANDARD;
    let bin = triangle_geometry();
    let document = json!({
        "asset": { "version": "2.0" },
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0 }],
        "meshes": [{
            "primitives": [{
                "attributes": { "POSITION": 0, "TEXCOORD_0": 1 },
                "indices": 2,
                "material": 0
            }]
        }],
        "materials": [{
            "name": "embedded",
            "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } }
        }],
        "textures": [{ "source": 0 }],
        "images": [{
            "uri": format!("data:image/png;base64,{}", engine.encode(png_bytes(4, 2)))
        }],
        "buffers": [{
            "byteLength": bin.len(),
            "uri": format!("data:application/octet-stream;base64,{}", engine.encode(&bin))
        }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 24, "target": 34962 },
            { "buffer": 0, "byteOffset": 60, "byteLength": 6, "target": 34963 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC2" },
            { "bufferView": 2, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ]
    });
    serde_json::to_vec(&document).expect("json")
}

/// A GLB holding one textured triangle under a node translated to x = 2. The colour map
/// is a 2x2 PNG stored in the binary chunk.
pub fn textured_triangle_glb() -> Vec<u8> {
    let mut bin = triangle_geometry();
    bin.extend_from_slice(&[0, 0]);
    let image_offset = bin.len();
    let png = png_bytes(2, 2);
    bin.extend_from_slice(&png);

    let document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "painted_node", "mesh": 0, "translation": [2.0, 0.0, 0.0] }],
        "meshes": [{
            "name": "painted",
            "primitives": [{
                "attributes": { "POSITION": 0, "TEXCOORD_0": 1 },
                "indices": 2,
                "material": 0
            }]
        }],
        "materials": [{
            "name": "painted",
            "pbrMetallicRoughness": {
                "baseColorFactor": [1.0, 0.5, 0.25, 1.0],
                "baseColorTexture": { "index": 0 },
                "metallicFactor": 0.2,
                "roughnessFactor": 0.9
            }
        }],
        "textures": [{ "source": 0 }],
        "images": [{ "bufferView": 3, "mimeType": "image/png" }],
        "buffers": [{ "byteLength": bin.len() }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 24, "target": 34962 },
            { "buffer": 0, "byteOffset": 60, "byteLength": 6, "target": 34963 },
            { "buffer": 0, "byteOffset": image_offset, "byteLength": png.len() }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC2" },
            { "bufferView": 2, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ]
    });
    glb(&document, &bin)
}
