//! The graphics-API contract the render pipeline core requires of its host
//! application.
//!
//! `GraphicsBackend` is intentionally not a drop-in OpenGL/wgpu/Vulkan
//! wrapper — it is the minimal surface the pipeline drives. A concrete
//! backend implements it once; everything above this trait (resource cache,
//! shader program, render pipeline) is backend-agnostic.

use crate::core::error::RenderResult;
use crate::core::math::Color;
use crate::gpu::types::*;

/// Capabilities reported by a backend, used to decide whether optional
/// passes (MSAA, compute-based culling, …) can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendCapabilities {
    /// Maximum texture units bindable at once.
    pub max_texture_units: u32,
    /// Maximum uniform-block binding points.
    pub max_uniform_bindings: u32,
    /// Whether multisampled render targets are supported.
    pub supports_msaa: bool,
}

impl Default for BackendCapabilities {
    fn default() -> Self {
        Self {
            max_texture_units: 16,
            max_uniform_bindings: 16,
            supports_msaa: true,
        }
    }
}

/// The graphics-API contract the render pipeline core drives a host
/// application through.
///
/// Implementations own every GPU object exclusively from the graphics
/// thread; nothing in this trait is safe to call concurrently with another
/// call on the same backend instance.
pub trait GraphicsBackend: Send {
    /// Reports backend capabilities, used to gate optional passes.
    fn capabilities(&self) -> BackendCapabilities;

    // -- Frame / clear ---------------------------------------------------
    /// Clears the bound framebuffer's color (and optionally depth) buffer.
    fn clear(&mut self, color: Color, clear_depth: bool);
    /// Sets the active viewport in pixels.
    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    // -- Buffers -----------------------------------------------------------
    /// Allocates a GPU buffer and uploads `data`.
    fn create_buffer(
        &mut self,
        buffer_type: BufferType,
        usage: BufferUsage,
        data: &[u8],
    ) -> RenderResult<BufferHandle>;
    /// Overwrites `data` into `buffer` at `offset` bytes (`glBufferSubData`
    /// equivalent, used by the UBO refresh path).
    fn update_buffer(&mut self, buffer: BufferHandle, offset: usize, data: &[u8]) -> RenderResult<()>;
    /// Destroys a buffer. Returns `false` if the handle was already stale.
    fn destroy_buffer(&mut self, buffer: BufferHandle) -> bool;

    // -- Vertex array objects ----------------------------------------------
    /// Creates a VAO and binds `vertex_buffers` to their attribute slots and
    /// `index_buffer` as its element source.
    fn create_vao(
        &mut self,
        vertex_buffers: &[(VertexAttributeSlot, BufferHandle)],
        index_buffer: Option<BufferHandle>,
    ) -> RenderResult<VaoHandle>;
    /// Destroys a VAO. Returns `false` if the handle was already stale.
    fn destroy_vao(&mut self, vao: VaoHandle) -> bool;

    // -- Textures ------------------------------------------------------------
    /// Allocates immutable-storage texture memory of `target`/`format` at
    /// `width`x`height` and optionally uploads `data`.
    fn create_texture(
        &mut self,
        target: TextureTarget,
        format: TextureFormat,
        width: u32,
        height: u32,
        data: Option<&[u8]>,
    ) -> RenderResult<TextureHandle>;
    /// Binds `texture` to texture unit `unit`.
    fn bind_texture(&mut self, texture: TextureHandle, unit: u32) -> RenderResult<()>;
    /// Destroys a texture. Returns `false` if the handle was already stale.
    fn destroy_texture(&mut self, texture: TextureHandle) -> bool;

    // -- Framebuffers --------------------------------------------------------
    /// Creates a framebuffer with the given color attachments (as textures)
    /// and, if requested, a depth/stencil attachment.
    fn create_framebuffer(
        &mut self,
        color_attachments: &[TextureHandle],
        depth_stencil: Option<TextureHandle>,
    ) -> RenderResult<FramebufferHandle>;
    /// Binds `framebuffer` as the active render target (`None` = default
    /// swapchain target).
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) -> RenderResult<()>;
    /// Resolves (blits) an MSAA framebuffer's color attachments into a
    /// non-multisampled sibling.
    fn blit_framebuffer(
        &mut self,
        src: FramebufferHandle,
        dst: FramebufferHandle,
        width: u32,
        height: u32,
    ) -> RenderResult<()>;
    /// Destroys a framebuffer. Returns `false` if the handle was already stale.
    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle) -> bool;

    // -- Shaders --------------------------------------------------------------
    /// Compiles and links a program from the given stage sources. Stages
    /// other than vertex/fragment may be empty strings.
    fn create_shader_program(&mut self, stages: &ShaderStageSources) -> RenderResult<ShaderHandle>;
    /// Binds `program` as the active shader program.
    fn bind_shader_program(&mut self, program: ShaderHandle) -> RenderResult<()>;
    /// Looks up the location of a uniform by name, or `None` if the linker
    /// optimized it away (unused in the compiled program).
    fn uniform_location(&self, program: ShaderHandle, name: &str) -> Option<i32>;
    /// Binds a uniform block's index in `program` to a global binding point.
    fn bind_uniform_block(&mut self, program: ShaderHandle, block_name: &str, binding: u32) -> RenderResult<()>;
    /// Binds `buffer` to uniform-block binding point `binding`.
    fn bind_uniform_buffer(&mut self, binding: u32, buffer: BufferHandle) -> RenderResult<()>;
    /// Destroys a shader program. Returns `false` if already stale.
    fn destroy_shader_program(&mut self, program: ShaderHandle) -> bool;

    // -- Draw ------------------------------------------------------------------
    /// Draws `vao`'s indexed geometry with the currently bound program,
    /// textures, and uniform blocks.
    fn draw_indexed(
        &mut self,
        vao: VaoHandle,
        index_count: u32,
        instance_count: u32,
        primitive: PrimitiveMode,
    ) -> RenderResult<()>;

    /// Reports the most recent backend-side error synchronously, on
    /// request.
    fn last_error(&self) -> Option<String> {
        None
    }
}

/// Source for each shader stage a program may use.
#[derive(Debug, Clone, Default)]
pub struct ShaderStageSources {
    /// Vertex stage source (required).
    pub vertex: String,
    /// Fragment stage source (required).
    pub fragment: String,
    /// Optional geometry stage source.
    pub geometry: Option<String>,
    /// Optional tessellation-control stage source.
    pub tess_control: Option<String>,
    /// Optional tessellation-evaluation stage source.
    pub tess_evaluation: Option<String>,
    /// Optional compute stage source (mutually exclusive with the graphics
    /// stages in a real backend; the core does not enforce that here).
    pub compute: Option<String>,
}
