//! Export error types

use thiserror::Error;

/// glTF export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PNG encoding error: {0}")]
    Image(#[from] image::ImageError),

    /// A packed buffer region did not end on a 4-byte boundary. This is an
    /// internal consistency fault: emitting the container anyway would
    /// produce a non-conforming asset.
    #[error("buffer region ends at unaligned offset {offset}")]
    AlignmentFault { offset: usize },

    /// A triangle referenced a vertex outside its geometry.
    #[error("geometry {geometry}: triangle index {index} out of range for {vertex_count} vertices")]
    InvalidMesh {
        geometry: usize,
        index: u32,
        vertex_count: usize,
    },

    /// More sub-meshes than the texture atlas has color slots.
    #[error("model has {geometries} sub-meshes but the atlas holds {capacity}")]
    AtlasCapacityExceeded { geometries: usize, capacity: usize },
}

pub type ExportResult<T> = Result<T, ExportError>;
