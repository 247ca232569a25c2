//! Meshport Core Library
//!
//! This crate provides the geometry data model and color utilities
//! shared across all meshport components.

pub mod color;
pub mod model;

pub use model::{Geometry, Material, Model, Triangle, Vertex};

/// Re-export commonly used items
pub mod prelude {
    pub use crate::color::{remap, remap_pbr};
    pub use crate::model::*;
}
