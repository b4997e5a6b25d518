//! Ping-pong post-processing: a chain of full-screen effects, each reading
//! the previous effect's output and writing to the other half of a pair of
//! framebuffers, with an optional checkpoint buffer effects can sample
//! alongside their immediate input.

use crate::core::error::{RenderError, RenderResult};
use crate::gpu::backend::GraphicsBackend;
use crate::gpu::texture::Framebuffer;

/// Per-effect sampling flags, matching the shader-side `kUseCheckPoint`/
/// `kUseCameraTexture` toggles a post-process fragment shader switches on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectSamplingFlags {
    /// Sample the checkpoint buffer in addition to the ping-pong input.
    pub use_checkpoint: bool,
    /// Sample the original camera color texture captured before any
    /// effect ran, instead of (or in addition to) the chain's live input.
    pub use_camera_texture: bool,
}

/// One post-processing effect: which shader draws it and how it samples
/// its inputs. Drawing itself is left to the caller (typically
/// [`crate::render::pipeline::RenderPipeline`] via a screen-space
/// [`crate::render::renderable::Renderable`]) — this type only decides
/// *which framebuffers* that draw reads from and writes to.
#[derive(Debug, Clone, Copy)]
pub struct PostProcessEffect {
    pub sampling: EffectSamplingFlags,
    /// If set, this effect's output is also blitted into the checkpoint
    /// buffer, so later effects can sample it via `use_checkpoint`.
    pub writes_checkpoint: bool,
}

/// Owns the two ping-pong framebuffers and the optional checkpoint buffer
/// a chain of effects reads and writes across a frame.
pub struct PostProcessingChain {
    ping_pong: [Framebuffer; 2],
    checkpoint: Option<Framebuffer>,
    camera_color: Option<Framebuffer>,
    current: usize,
}

impl PostProcessingChain {
    /// Builds a chain from two same-sized framebuffers to ping-pong
    /// between, an optional checkpoint buffer, and the camera's original
    /// color output (captured before any effect ran).
    pub fn new(
        ping_pong: [Framebuffer; 2],
        checkpoint: Option<Framebuffer>,
        camera_color: Option<Framebuffer>,
    ) -> RenderResult<Self> {
        if ping_pong[0].size() != ping_pong[1].size() {
            return Err(RenderError::invariant("ping-pong framebuffers must share dimensions"));
        }
        Ok(Self {
            ping_pong,
            checkpoint,
            camera_color,
            current: 0,
        })
    }

    /// The framebuffer an effect should bind as its render target before
    /// drawing; always the *other* half of the ping-pong pair from
    /// whatever was last written.
    pub fn target(&self) -> &Framebuffer {
        &self.ping_pong[1 - self.current]
    }

    /// The framebuffer an effect should sample as its primary input; the
    /// half most recently written to.
    pub fn source(&self) -> &Framebuffer {
        &self.ping_pong[self.current]
    }

    /// The checkpoint buffer, if the chain has one.
    pub fn checkpoint(&self) -> Option<&Framebuffer> {
        self.checkpoint.as_ref()
    }

    /// The original camera color output, captured before any effect ran.
    pub fn camera_color(&self) -> Option<&Framebuffer> {
        self.camera_color.as_ref()
    }

    /// Binds `effect`'s render target as the active framebuffer, ready for
    /// its draw call.
    pub fn bind_target(&self, backend: &mut dyn GraphicsBackend) -> RenderResult<()> {
        self.target().bind(backend)
    }

    /// Advances the ping-pong pair after an effect finishes drawing into
    /// [`PostProcessingChain::target`], and — if `effect.writes_checkpoint`
    /// — blits the new output into the checkpoint buffer.
    pub fn advance(&mut self, backend: &mut dyn GraphicsBackend, effect: PostProcessEffect) -> RenderResult<()> {
        self.current = 1 - self.current;
        if effect.writes_checkpoint {
            if let Some(checkpoint) = &self.checkpoint {
                let (width, height) = checkpoint.size();
                backend.blit_framebuffer(self.source().handle(), checkpoint.handle(), width, height)?;
            }
        }
        Ok(())
    }

    /// Destroys every framebuffer this chain owns.
    pub fn destroy(self, backend: &mut dyn GraphicsBackend) {
        let [a, b] = self.ping_pong;
        a.destroy(backend);
        b.destroy(backend);
        if let Some(checkpoint) = self.checkpoint {
            checkpoint.destroy(backend);
        }
        if let Some(camera_color) = self.camera_color {
            camera_color.destroy(backend);
        }
    }
}
