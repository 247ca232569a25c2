//! Mesh consolidation
//!
//! Merges every sub-mesh of a model into one combined vertex/index
//! stream. Per-mesh color either moves into remapped vertex colors or
//! into one pixel of a shared texture atlas addressed by UV.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use meshport_core::color::remap_pbr;
use meshport_core::{Geometry, Material, Model};
use tracing::debug;

use crate::error::{ExportError, ExportResult};
use crate::gltf::exporter::{ColorMode, GltfExportOptions};

/// Result of consolidation: one combined mesh with a neutral placeholder
/// material, plus the PNG-encoded atlas (empty in vertex-color mode).
#[derive(Debug, Clone)]
pub struct Consolidated {
    pub mesh: Geometry,
    pub atlas_png: Vec<u8>,
}

/// Merge all sub-meshes into one, applying the configured color strategy
pub fn consolidate(model: &Model, options: &GltfExportOptions) -> ExportResult<Consolidated> {
    validate_indices(model)?;

    let consolidated = match options.color_mode {
        ColorMode::VertexColors => Consolidated {
            mesh: merge_with_vertex_colors(model),
            atlas_png: Vec::new(),
        },
        ColorMode::TextureAtlas => merge_with_atlas(model, options.atlas_size)?,
    };

    debug!(
        sub_meshes = model.meshes.len(),
        vertices = consolidated.mesh.vertex_count(),
        triangles = consolidated.mesh.triangle_count(),
        "consolidated model"
    );
    Ok(consolidated)
}

/// Every triangle index must reference a vertex of its own geometry
fn validate_indices(model: &Model) -> ExportResult<()> {
    for (geometry, mesh) in model.meshes.iter().enumerate() {
        let vertex_count = mesh.vertices.len();
        for face in &mesh.faces {
            for &index in &face.indices {
                if index as usize >= vertex_count {
                    return Err(ExportError::InvalidMesh {
                        geometry,
                        index,
                        vertex_count,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Append `source` onto `combined`, offsetting face indices by the
/// running vertex count and rewriting each vertex through `adjust`
fn append_geometry(
    combined: &mut Geometry,
    source: &Geometry,
    mut adjust: impl FnMut(meshport_core::Vertex) -> meshport_core::Vertex,
) {
    let base = combined.vertices.len() as u32;
    combined
        .vertices
        .extend(source.vertices.iter().map(|&v| adjust(v)));
    combined.faces.extend(source.faces.iter().map(|face| {
        let [a, b, c] = face.indices;
        meshport_core::Triangle::new(a + base, b + base, c + base)
    }));
}

fn merge_with_vertex_colors(model: &Model) -> Geometry {
    let mut combined = Geometry::new(Material::default());
    for mesh in &model.meshes {
        append_geometry(&mut combined, mesh, |mut vertex| {
            for channel in &mut vertex.color[..3] {
                *channel = remap_pbr(*channel);
            }
            vertex
        });
    }
    combined
}

fn merge_with_atlas(model: &Model, atlas_size: u32) -> ExportResult<Consolidated> {
    let capacity = (atlas_size * atlas_size) as usize;
    if model.meshes.len() > capacity {
        return Err(ExportError::AtlasCapacityExceeded {
            geometries: model.meshes.len(),
            capacity,
        });
    }

    let mut atlas = RgbaImage::new(atlas_size, atlas_size);
    let mut combined = Geometry::new(Material::default());

    for (i, mesh) in model.meshes.iter().enumerate() {
        let x = i as u32 % atlas_size;
        let y = i as u32 / atlas_size;

        let [r, g, b] = mesh.material.diffuse;
        atlas.put_pixel(
            x,
            y,
            Rgba([
                (remap_pbr(r) * 255.0) as u8,
                (remap_pbr(g) * 255.0) as u8,
                (remap_pbr(b) * 255.0) as u8,
                (mesh.material.opacity * 255.0) as u8,
            ]),
        );

        // Every vertex of this sub-mesh samples the center of its pixel.
        let size = atlas_size as f32;
        let uv = [
            x as f32 / size + 0.5 / size,
            y as f32 / size + 0.5 / size,
        ];
        append_geometry(&mut combined, mesh, |mut vertex| {
            vertex.uv = uv;
            vertex
        });
    }

    let mut atlas_png = Vec::new();
    atlas.write_to(&mut Cursor::new(&mut atlas_png), ImageFormat::Png)?;

    Ok(Consolidated {
        mesh: combined,
        atlas_png,
    })
}
