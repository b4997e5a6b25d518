//! Texture and framebuffer wrappers, including the renderbuffer-plus-blit
//! MSAA strategy.

use crate::core::error::{RenderError, RenderResult};
use crate::gpu::backend::GraphicsBackend;
use crate::gpu::types::{
    ColorAttachmentKind, FramebufferAliasing, FramebufferHandle, TextureFormat, TextureHandle, TextureTarget,
};

/// A GPU texture: backend handle plus the metadata needed to rebuild it
/// (resize, reattach) without re-deriving format/target from call sites.
#[derive(Debug, Clone, Copy)]
pub struct Texture {
    handle: TextureHandle,
    target: TextureTarget,
    format: TextureFormat,
    width: u32,
    height: u32,
}

impl Texture {
    /// Allocates a texture and optionally uploads `data`.
    pub fn new(
        backend: &mut dyn GraphicsBackend,
        target: TextureTarget,
        format: TextureFormat,
        width: u32,
        height: u32,
        data: Option<&[u8]>,
    ) -> RenderResult<Self> {
        let handle = backend.create_texture(target, format, width, height, data)?;
        Ok(Self {
            handle,
            target,
            format,
            width,
            height,
        })
    }

    /// The backend handle.
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// The texture's target kind.
    pub fn target(&self) -> TextureTarget {
        self.target
    }

    /// The texture's pixel format.
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Dimensions in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Binds this texture to `unit`.
    pub fn bind(&self, backend: &mut dyn GraphicsBackend, unit: u32) -> RenderResult<()> {
        backend.bind_texture(self.handle, unit)
    }

    /// Destroys the underlying GPU texture.
    pub fn destroy(self, backend: &mut dyn GraphicsBackend) {
        backend.destroy_texture(self.handle);
    }
}

/// A render target: zero or more color attachments plus an optional
/// depth/stencil attachment.
///
/// An MSAA framebuffer (`aliasing = Msaa { .. }`) stores its color
/// attachments as renderbuffers that cannot be sampled directly; call
/// [`Framebuffer::resolve_into`] to blit them into a `Default`-aliased
/// sibling before sampling.
#[derive(Debug)]
pub struct Framebuffer {
    handle: FramebufferHandle,
    color_attachments: Vec<Texture>,
    color_attachment_kind: ColorAttachmentKind,
    depth_stencil: Option<Texture>,
    aliasing: FramebufferAliasing,
    width: u32,
    height: u32,
}

impl Framebuffer {
    /// Builds a framebuffer from already-allocated attachments. All
    /// attachments (color and depth/stencil) must share `width`/`height`.
    pub fn new(
        backend: &mut dyn GraphicsBackend,
        color_attachments: Vec<Texture>,
        color_attachment_kind: ColorAttachmentKind,
        depth_stencil: Option<Texture>,
        aliasing: FramebufferAliasing,
    ) -> RenderResult<Self> {
        let (width, height) = color_attachments
            .first()
            .map(|t| t.size())
            .or_else(|| depth_stencil.as_ref().map(|t| t.size()))
            .ok_or_else(|| RenderError::invariant("a framebuffer needs at least one attachment"))?;

        for attachment in color_attachments.iter().chain(depth_stencil.iter()) {
            if attachment.size() != (width, height) {
                return Err(RenderError::invariant(
                    "all framebuffer attachments must share the same dimensions",
                ));
            }
        }

        let color_handles: Vec<TextureHandle> = color_attachments.iter().map(Texture::handle).collect();
        let handle = backend.create_framebuffer(&color_handles, depth_stencil.as_ref().map(Texture::handle))?;

        Ok(Self {
            handle,
            color_attachments,
            color_attachment_kind,
            depth_stencil,
            aliasing,
            width,
            height,
        })
    }

    /// The backend handle.
    pub fn handle(&self) -> FramebufferHandle {
        self.handle
    }

    /// Number of color attachments.
    pub fn color_attachment_count(&self) -> usize {
        self.color_attachments.len()
    }

    /// Whether a depth or depth/stencil attachment is present.
    pub fn has_depth_stencil(&self) -> bool {
        self.depth_stencil.is_some()
    }

    /// Whether color attachments are sampleable textures or MSAA-only
    /// renderbuffer storage.
    pub fn color_attachment_kind(&self) -> ColorAttachmentKind {
        self.color_attachment_kind
    }

    /// Sample count: `1` for `Default` aliasing.
    pub fn sample_count(&self) -> u32 {
        match self.aliasing {
            FramebufferAliasing::Default => 1,
            FramebufferAliasing::Msaa { samples } => samples,
        }
    }

    /// Dimensions in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Binds this framebuffer as the active render target.
    pub fn bind(&self, backend: &mut dyn GraphicsBackend) -> RenderResult<()> {
        backend.bind_framebuffer(Some(self.handle))
    }

    /// Resolves this (MSAA) framebuffer's color attachments into `resolved`,
    /// which must share this framebuffer's dimensions and use
    /// `ColorAttachmentKind::Texture` attachments so later passes can sample
    /// them.
    pub fn resolve_into(&self, backend: &mut dyn GraphicsBackend, resolved: &Framebuffer) -> RenderResult<()> {
        if !matches!(self.aliasing, FramebufferAliasing::Msaa { .. }) {
            return Err(RenderError::invariant("resolve_into called on a non-MSAA framebuffer"));
        }
        if resolved.size() != self.size() {
            return Err(RenderError::invariant("MSAA resolve target must match source dimensions"));
        }
        backend.blit_framebuffer(self.handle, resolved.handle, self.width, self.height)
    }

    /// Destroys the framebuffer and every attachment it owns.
    pub fn destroy(self, backend: &mut dyn GraphicsBackend) {
        for attachment in self.color_attachments {
            attachment.destroy(backend);
        }
        if let Some(depth_stencil) = self.depth_stencil {
            depth_stencil.destroy(backend);
        }
        backend.destroy_framebuffer(self.handle);
    }
}

/// Binds the default swapchain framebuffer (`None`).
pub fn bind_default_framebuffer(backend: &mut dyn GraphicsBackend) -> RenderResult<()> {
    backend.bind_framebuffer(None)
}
