//! Uniform storage and std140 buffer layout.
//!
//! [`container::UniformContainer`] holds per-instance and per-program
//! values in stable, type-erased storage; [`block::UniformBlock`] maps a
//! subset of those values onto a std140-compliant GPU buffer.

pub mod block;
pub mod container;
pub mod value;

pub use block::{compute_layout, BindingPointAllocator, BufferUniform, UniformBlock};
pub use container::UniformContainer;
pub use value::{UniformData, UniformKind, UniformValue};
