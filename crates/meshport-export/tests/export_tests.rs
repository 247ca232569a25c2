//! End-to-end tests for the glTF export pipeline
//!
//! These exercise the assembled document graph and both container forms:
//! - accessor/bufferView/buffer cross-references and bounds
//! - GLB chunk layout, padding, and declared lengths
//! - deterministic output
//! - embedded text form with base64 buffer

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use meshport_core::{Geometry, Material, Model, Triangle, Vertex};
use meshport_export::gltf::Gltf;
use meshport_export::{ColorMode, ContainerForm, GltfExportOptions, GltfExporter};

/// Helper to build one flat-shaded triangle
fn triangle_mesh(diffuse: [f32; 3], opacity: f32) -> Geometry {
    let normal = [0.0, 0.0, 1.0];
    let color = [diffuse[0], diffuse[1], diffuse[2], 1.0];
    Geometry {
        vertices: vec![
            Vertex {
                position: [0.0, 0.0, 0.0],
                normal,
                color,
                uv: [0.0, 0.0],
            },
            Vertex {
                position: [1.0, 0.0, 0.0],
                normal,
                color,
                uv: [0.0, 0.0],
            },
            Vertex {
                position: [0.0, 1.0, 0.0],
                normal,
                color,
                uv: [0.0, 0.0],
            },
        ],
        faces: vec![Triangle::new(0, 1, 2)],
        material: Material {
            diffuse,
            opacity,
            ..Material::default()
        },
    }
}

/// The one-red-triangle sample model
fn red_triangle_model() -> Model {
    Model {
        meshes: vec![triangle_mesh([1.0, 0.0, 0.0], 1.0)],
    }
}

fn exporter(color_mode: ColorMode, container: ContainerForm) -> GltfExporter {
    GltfExporter::new(GltfExportOptions {
        color_mode,
        container,
        atlas_size: 32,
    })
}

/// Split a GLB container into its parsed JSON document and BIN payload
fn split_glb(glb: &[u8]) -> (Gltf, Vec<u8>) {
    assert_eq!(&glb[0..4], b"glTF");
    assert_eq!(u32::from_le_bytes(glb[4..8].try_into().unwrap()), 2);
    let total = u32::from_le_bytes(glb[8..12].try_into().unwrap()) as usize;
    assert_eq!(total, glb.len());

    let json_len = u32::from_le_bytes(glb[12..16].try_into().unwrap()) as usize;
    assert_eq!(&glb[16..20], b"JSON");
    let json = std::str::from_utf8(&glb[20..20 + json_len]).unwrap();

    let bin_start = 20 + json_len;
    let bin_len = u32::from_le_bytes(glb[bin_start..bin_start + 4].try_into().unwrap()) as usize;
    assert_eq!(&glb[bin_start + 4..bin_start + 8], b"BIN\0");
    assert_eq!(bin_start + 8 + bin_len, glb.len());

    let document: Gltf = serde_json::from_str(json.trim_end()).unwrap();
    (document, glb[bin_start + 8..].to_vec())
}

#[test]
fn test_red_triangle_vertex_color_document() {
    let exporter = exporter(ColorMode::VertexColors, ContainerForm::Binary);
    let (document, binary) = exporter.build_document(&red_triangle_model()).unwrap();

    // Index, position, normal, color accessors, in allocation order.
    assert_eq!(document.accessors.len(), 4);
    let by_type: Vec<(&str, usize)> = document
        .accessors
        .iter()
        .map(|a| (a.accessor_type.as_str(), a.count))
        .collect();
    assert_eq!(
        by_type,
        vec![("SCALAR", 3), ("VEC3", 3), ("VEC3", 3), ("VEC4", 3)]
    );

    // Colors remapped: 1.0 -> 0.85, 0.0 -> 0.04, alpha untouched.
    let colors = &document.accessors[3];
    assert_eq!(colors.max.as_deref(), Some(&[0.85, 0.04, 0.04, 1.0][..]));

    assert_eq!(document.materials.len(), 1);
    assert_eq!(document.meshes.len(), 1);
    assert_eq!(document.nodes.len(), 1);
    assert_eq!(document.scenes.len(), 1);
    assert_eq!(document.scene, Some(0));
    assert!(document.images.is_empty());
    assert!(document.textures.is_empty());

    let primitive = &document.meshes[0].primitives[0];
    assert!(primitive.attributes.contains_key("POSITION"));
    assert!(primitive.attributes.contains_key("NORMAL"));
    assert!(primitive.attributes.contains_key("COLOR_0"));
    assert!(!primitive.attributes.contains_key("TEXCOORD_0"));
    assert_eq!(primitive.indices, Some(0));
    assert_eq!(primitive.material, Some(0));

    // 9 indices bytes would misalign; 3 u32 indices + 3*(12+12+16) vertex
    // bytes all land on 4-byte boundaries.
    assert_eq!(binary.len(), 12 + 36 + 36 + 48);
    assert_eq!(document.buffers[0].byte_length, binary.len());
}

#[test]
fn test_counts_sum_over_sub_meshes() {
    let model = Model {
        meshes: vec![
            triangle_mesh([1.0, 0.0, 0.0], 1.0),
            triangle_mesh([0.0, 1.0, 0.0], 1.0),
            triangle_mesh([0.0, 0.0, 1.0], 1.0),
        ],
    };
    let exporter = exporter(ColorMode::VertexColors, ContainerForm::Binary);
    let (document, _) = exporter.build_document(&model).unwrap();

    let indices = &document.accessors[0];
    assert_eq!(indices.count, model.triangle_count() * 3);
    let positions = &document.accessors[1];
    assert_eq!(positions.count, model.vertex_count());
}

#[test]
fn test_glb_round_trips_document() {
    let exporter = exporter(ColorMode::VertexColors, ContainerForm::Binary);
    let model = red_triangle_model();
    let (document, binary) = exporter.build_document(&model).unwrap();

    let glb = exporter.export(&model).unwrap();
    let (decoded, payload) = split_glb(&glb);

    assert_eq!(decoded, document);
    assert_eq!(&payload[..binary.len()], &binary[..]);
    assert!(payload[binary.len()..].iter().all(|&b| b == 0));
}

#[test]
fn test_export_is_deterministic() {
    let model = Model {
        meshes: vec![
            triangle_mesh([1.0, 0.0, 0.0], 1.0),
            triangle_mesh([0.2, 0.4, 0.6], 0.5),
        ],
    };

    for (color_mode, container) in [
        (ColorMode::VertexColors, ContainerForm::Binary),
        (ColorMode::TextureAtlas, ContainerForm::Binary),
        (ColorMode::VertexColors, ContainerForm::EmbeddedText),
        (ColorMode::TextureAtlas, ContainerForm::EmbeddedText),
    ] {
        let exporter = exporter(color_mode, container);
        let first = exporter.export(&model).unwrap();
        let second = exporter.export(&model).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_vertex_attribute_views_are_aligned() {
    let exporter = exporter(ColorMode::TextureAtlas, ContainerForm::Binary);
    let model = Model {
        meshes: vec![
            triangle_mesh([1.0, 0.0, 0.0], 1.0),
            triangle_mesh([0.0, 1.0, 0.0], 1.0),
        ],
    };
    let (document, _) = exporter.build_document(&model).unwrap();

    for view in &document.buffer_views {
        assert_eq!(view.byte_offset.unwrap_or(0) % 4, 0);
    }

    // Accessor regions referenced by different accessors must not overlap.
    let mut regions: Vec<(usize, usize)> = document
        .buffer_views
        .iter()
        .map(|v| (v.byte_offset.unwrap_or(0), v.byte_length))
        .collect();
    regions.sort_unstable();
    for pair in regions.windows(2) {
        assert!(pair[0].0 + pair[0].1 <= pair[1].0);
    }
}

#[test]
fn test_accessor_bounds_cover_large_magnitudes() {
    let mut mesh = triangle_mesh([1.0, 1.0, 1.0], 1.0);
    mesh.vertices[1].position = [512.0, -256.0, 0.0];
    let model = Model { meshes: vec![mesh] };

    let exporter = exporter(ColorMode::VertexColors, ContainerForm::Binary);
    let (document, _) = exporter.build_document(&model).unwrap();

    let positions = &document.accessors[1];
    let min = positions.min.as_deref().unwrap();
    let max = positions.max.as_deref().unwrap();
    assert_eq!(min, &[0.0, -256.0, 0.0]);
    assert_eq!(max, &[512.0, 1.0, 0.0]);
}

#[test]
fn test_atlas_mode_document_references_texture() {
    let exporter = exporter(ColorMode::TextureAtlas, ContainerForm::Binary);
    let model = Model {
        meshes: vec![
            triangle_mesh([1.0, 0.0, 0.0], 1.0),
            triangle_mesh([0.0, 0.0, 1.0], 1.0),
        ],
    };
    let (document, _) = exporter.build_document(&model).unwrap();

    assert_eq!(document.images.len(), 1);
    assert!(document.images[0]
        .uri
        .as_deref()
        .unwrap()
        .starts_with("data:image/png;base64,"));
    assert_eq!(document.textures.len(), 1);
    assert_eq!(document.textures[0].source, Some(0));

    let material = &document.materials[0];
    let pbr = material.pbr_metallic_roughness.as_ref().unwrap();
    assert_eq!(pbr.base_color_texture.map(|t| t.index), Some(0));
    assert!(material.double_sided);

    let primitive = &document.meshes[0].primitives[0];
    assert!(primitive.attributes.contains_key("TEXCOORD_0"));
    assert!(!primitive.attributes.contains_key("COLOR_0"));
}

#[test]
fn test_identical_materials_collapse_to_one_entry() {
    // Two sub-meshes sharing diffuse/opacity/specular power end up with a
    // single material entry after consolidation and dedup.
    let exporter = exporter(ColorMode::VertexColors, ContainerForm::Binary);
    let model = Model {
        meshes: vec![
            triangle_mesh([0.5, 0.5, 0.5], 1.0),
            triangle_mesh([0.5, 0.5, 0.5], 1.0),
        ],
    };
    let (document, _) = exporter.build_document(&model).unwrap();

    assert_eq!(document.materials.len(), 1);
    assert_eq!(document.meshes[0].primitives[0].material, Some(0));
}

#[test]
fn test_embedded_form_carries_buffer_in_data_uri() {
    let exporter = exporter(ColorMode::VertexColors, ContainerForm::EmbeddedText);
    let model = red_triangle_model();
    let (_, binary) = exporter.build_document(&model).unwrap();

    let text = String::from_utf8(exporter.export(&model).unwrap()).unwrap();
    assert!(text.starts_with("{\n    \"asset\""));

    let document: Gltf = serde_json::from_str(&text).unwrap();
    let uri = document.buffers[0].uri.as_deref().unwrap();
    let encoded = uri
        .strip_prefix("data:application/gltf-buffer;base64,")
        .unwrap();
    assert_eq!(BASE64_STANDARD.decode(encoded).unwrap(), binary);
}
