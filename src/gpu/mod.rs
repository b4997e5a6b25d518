//! Backend-agnostic GPU resource management.
//!
//! [`backend::GraphicsBackend`] is the contract a host application
//! implements; everything else in this module is built purely in terms of
//! that trait so the rest of the pipeline never names a concrete graphics
//! API.

pub mod backend;
pub mod buffer;
pub mod texture;
pub mod types;

pub use backend::{BackendCapabilities, GraphicsBackend, ShaderStageSources};
pub use buffer::{GpuBuffer, VertexArrayData};
pub use texture::{bind_default_framebuffer, Framebuffer, Texture};
