//! Document assembly
//!
//! Orchestrates consolidation, buffer packing, and material
//! deduplication into one cross-referenced glTF document, then hands it
//! to the container writer.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use meshport_core::Model;
use tracing::info;

use crate::error::ExportResult;
use crate::gltf::{
    buffer::BufferPacker, consolidate, material, writer, Asset, Buffer, Gltf, Image, Mesh, Node,
    Primitive, Scene, Texture, MODE_TRIANGLES,
};

/// How per-mesh color reaches the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Pack a COLOR_0 vertex attribute
    VertexColors,
    /// Build a shared texture atlas addressed through TEXCOORD_0
    #[default]
    TextureAtlas,
}

/// Output container form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerForm {
    /// Chunked binary `.glb`
    #[default]
    Binary,
    /// Embedded-buffer `.gltf` text
    EmbeddedText,
}

/// glTF export options
///
/// Passed by value through the pipeline; there is no ambient mode state.
#[derive(Debug, Clone)]
pub struct GltfExportOptions {
    /// Color strategy, fixed for the whole conversion
    pub color_mode: ColorMode,
    /// Container form to serialize
    pub container: ContainerForm,
    /// Atlas edge length in pixels; capacity is the square of this
    pub atlas_size: u32,
}

impl Default for GltfExportOptions {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::default(),
            container: ContainerForm::default(),
            atlas_size: 32,
        }
    }
}

/// glTF exporter
pub struct GltfExporter {
    options: GltfExportOptions,
}

impl GltfExporter {
    /// Create a new exporter
    pub fn new(options: GltfExportOptions) -> Self {
        Self { options }
    }

    /// File extension matching the configured container form
    pub fn extension(&self) -> &'static str {
        match self.options.container {
            ContainerForm::Binary => "glb",
            ContainerForm::EmbeddedText => "gltf",
        }
    }

    /// Convert `model` into the configured container, returning its bytes
    pub fn export(&self, model: &Model) -> ExportResult<Vec<u8>> {
        let (document, binary) = self.build_document(model)?;
        let out = match self.options.container {
            ContainerForm::Binary => writer::write_glb(&document, &binary)?,
            ContainerForm::EmbeddedText => writer::write_embedded(&document, &binary)?.into_bytes(),
        };

        info!(
            container = self.extension(),
            bytes = out.len(),
            "export complete"
        );
        Ok(out)
    }

    /// Convert `model` and write it next to `stem` with the container's
    /// extension, returning the path written
    pub fn export_to_path(&self, model: &Model, stem: impl AsRef<Path>) -> ExportResult<PathBuf> {
        let path = stem.as_ref().with_extension(self.extension());
        std::fs::write(&path, self.export(model)?)?;
        Ok(path)
    }

    /// Build the document graph and its packed binary buffer
    ///
    /// The binary buffer is returned separately so either container form
    /// can attach it its own way.
    pub fn build_document(&self, model: &Model) -> ExportResult<(Gltf, Vec<u8>)> {
        let consolidated = consolidate::consolidate(model, &self.options)?;
        let mesh = &consolidated.mesh;

        let mut packer = BufferPacker::new();
        let indices = packer.push_indices(&mesh.faces)?;
        let positions: Vec<[f32; 3]> = mesh.vertices.iter().map(|v| v.position).collect();
        let normals: Vec<[f32; 3]> = mesh.vertices.iter().map(|v| v.normal).collect();

        let mut attributes = BTreeMap::new();
        attributes.insert("POSITION".to_string(), packer.push_vec3(&positions)?);
        attributes.insert("NORMAL".to_string(), packer.push_vec3(&normals)?);

        // Exactly one of TEXCOORD_0 or COLOR_0, chosen by the color mode.
        let mut images = Vec::new();
        let mut textures = Vec::new();
        let base_color_texture = match self.options.color_mode {
            ColorMode::TextureAtlas => {
                let uvs: Vec<[f32; 2]> = mesh.vertices.iter().map(|v| v.uv).collect();
                attributes.insert("TEXCOORD_0".to_string(), packer.push_vec2(&uvs)?);

                images.push(Image {
                    uri: Some(writer::png_data_uri(&consolidated.atlas_png)),
                });
                textures.push(Texture { source: Some(0) });
                Some(0)
            }
            ColorMode::VertexColors => {
                let colors: Vec<[f32; 4]> = mesh.vertices.iter().map(|v| v.color).collect();
                attributes.insert("COLOR_0".to_string(), packer.push_vec4(&colors)?);
                None
            }
        };

        let mut materials = Vec::new();
        let material_index = material::dedup(
            &mut materials,
            material::derive_pbr(&mesh.material, base_color_texture),
        );

        let (binary, accessors, buffer_views) = packer.finish();
        let document = Gltf {
            asset: Asset {
                version: "2.0".to_string(),
                generator: Some(concat!("meshport ", env!("CARGO_PKG_VERSION")).to_string()),
            },
            scene: Some(0),
            scenes: vec![Scene {
                name: Some("Scene".to_string()),
                nodes: vec![0],
            }],
            nodes: vec![Node {
                name: Some("MeshNode".to_string()),
                mesh: Some(0),
                children: vec![],
            }],
            meshes: vec![Mesh {
                name: None,
                primitives: vec![Primitive {
                    attributes,
                    indices: Some(indices),
                    material: Some(material_index),
                    mode: Some(MODE_TRIANGLES),
                }],
            }],
            materials,
            textures,
            images,
            accessors,
            buffer_views,
            buffers: vec![Buffer {
                uri: None,
                byte_length: binary.len(),
            }],
        };

        Ok((document, binary))
    }
}

impl Default for GltfExporter {
    fn default() -> Self {
        Self::new(GltfExportOptions::default())
    }
}
