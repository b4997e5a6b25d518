//! Mesh geometry: uploaded vertex arrays and on-demand procedural shapes.

pub mod polygon_cache;
pub mod vertex_array;

pub use polygon_cache::{PolygonCache, PrimitiveShape};
pub use vertex_array::Mesh;
