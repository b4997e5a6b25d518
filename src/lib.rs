#![warn(missing_docs)]
#![warn(rustdoc::all)]
#![allow(rustdoc::private_intra_doc_links)]

//! # Render Pipeline Core
//!
//! A backend-agnostic render pipeline core: a resource cache with deferred
//! GPU construction and budget-driven eviction, a transform/scene graph, a
//! sortable draw-command queue, and a ping-pong post-processing chain.
//!
//! ## Key Modules
//!
//! - [`core`]: Foundational building blocks — error handling, generational
//!   handles, events, math types, and engine-wide configuration.
//! - [`gpu`]: The [`gpu::backend::GraphicsBackend`] trait and the handle/type
//!   vocabulary backends implement it against.
//! - [`shader`]: Shader source parsing and linked program state.
//! - [`mesh`]: GPU vertex/index buffer storage and object-space bounds.
//! - [`resource`]: The resource cache — typed handles, loader-thread decode,
//!   graphics-thread construction, and LRU eviction.
//! - [`uniform`]: std140-layout uniform blocks and the values written to them.
//! - [`scene`]: The transform graph, scene objects, and their components.
//! - [`render`]: Sort keys, draw commands, the render pipeline, and
//!   post-processing.
//! - [`debug_draw`]: Immediate-mode debug geometry, routed to a dedicated
//!   render layer.

pub mod core;
/// Immediate-mode debug geometry drawing.
pub mod debug_draw;
pub mod gpu;
pub mod mesh;
pub mod render;
pub mod resource;
pub mod scene;
pub mod shader;
pub mod uniform;
