//! Triangle-mesh data model
//!
//! The input representation consumed by the glTF export pipeline: a
//! [`Model`] is an ordered list of [`Geometry`] sub-meshes, each carrying
//! its own vertices, faces, and a single shading [`Material`].

use serde::{Deserialize, Serialize};

/// A single mesh vertex
///
/// All fields are always present; unused fields (e.g. `uv` when the
/// color strategy is per-vertex colors) stay zero-valued.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],
    /// Surface normal
    pub normal: [f32; 3],
    /// Linear RGBA color, each channel in 0..1
    #[serde(default)]
    pub color: [f32; 4],
    /// Texture coordinate
    #[serde(default)]
    pub uv: [f32; 2],
}

/// One triangle face, referencing three vertices by index
///
/// No winding or range validation happens here; the export pipeline
/// checks index bounds before packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [u32; 3],
}

impl Triangle {
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self { indices: [a, b, c] }
    }
}

/// Classic fixed-function shading material
///
/// Color channels are linear 0..1. `specular_power` follows the usual
/// 0..128 convention and maps to PBR roughness during export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    #[serde(default)]
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    #[serde(default)]
    pub specular: [f32; 3],
    #[serde(default)]
    pub emissive: [f32; 3],
    #[serde(default)]
    pub specular_power: f32,
    pub opacity: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: [0.0; 3],
            diffuse: [1.0, 1.0, 1.0],
            specular: [0.0; 3],
            emissive: [0.0; 3],
            specular_power: 0.0,
            opacity: 1.0,
        }
    }
}

/// One source sub-mesh: vertices, faces, and the material shading them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Triangle>,
    pub material: Material,
}

impl Geometry {
    /// Create an empty geometry with the given material
    pub fn new(material: Material) -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            material,
        }
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }
}

/// A complete model: ordered sub-meshes, consolidated by the export
/// pipeline into exactly one output mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub meshes: Vec<Geometry>,
}

impl Model {
    /// Total vertex count across all sub-meshes
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(Geometry::vertex_count).sum()
    }

    /// Total triangle count across all sub-meshes
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Geometry::triangle_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(material: Material) -> Geometry {
        Geometry {
            vertices: vec![Vertex::default(); 4],
            faces: vec![Triangle::new(0, 1, 2), Triangle::new(0, 2, 3)],
            material,
        }
    }

    #[test]
    fn test_counts_sum_over_meshes() {
        let model = Model {
            meshes: vec![quad(Material::default()), quad(Material::default())],
        };

        assert_eq!(model.vertex_count(), 8);
        assert_eq!(model.triangle_count(), 4);
    }

    #[test]
    fn test_default_material_is_opaque_white() {
        let material = Material::default();

        assert_eq!(material.diffuse, [1.0, 1.0, 1.0]);
        assert_eq!(material.opacity, 1.0);
    }

    #[test]
    fn test_model_json_round_trip() {
        let model = Model {
            meshes: vec![quad(Material {
                diffuse: [0.2, 0.4, 0.6],
                opacity: 0.5,
                ..Material::default()
            })],
        };

        let json = serde_json::to_string(&model).unwrap();
        let back: Model = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }
}
