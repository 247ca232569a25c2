//! Meshport Export Pipeline
//!
//! Converts an in-memory triangle-mesh [`Model`](meshport_core::Model)
//! into a self-contained glTF 2.0 asset, either a chunked binary `.glb`
//! container or an embedded-buffer `.gltf` text document.

pub mod error;
pub mod gltf;

pub use error::{ExportError, ExportResult};
pub use gltf::{ColorMode, ContainerForm, GltfExportOptions, GltfExporter};
