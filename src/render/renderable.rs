//! What a draw command actually draws and how: the mesh/material pair and
//! the fixed-function state overrides a command may apply.

use uuid::Uuid;

use crate::gpu::types::{BlendFactor, CullFace, PrimitiveMode};

/// How a command participates in the opaque/transparent split and pass
/// bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransparencyMode {
    /// Sorted front-to-back, written to the depth buffer.
    #[default]
    Opaque,
    /// Binary cutout; still depth-written, but the shader discards below
    /// `cutoff`.
    AlphaTest {
        /// Alpha below this value is discarded.
        cutoff: u8,
    },
    /// Alpha-blended, sorted back-to-front, not depth-written.
    Blended,
}

/// Fixed-function draw state a command layers on top of its material's
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub cull_face: CullFace,
    pub blend: Option<(BlendFactor, BlendFactor)>,
    pub depth_test: bool,
    pub depth_write: bool,
    pub primitive: PrimitiveMode,
    pub instance_count: u32,
    pub transparency: TransparencyMode,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            cull_face: CullFace::default(),
            blend: None,
            depth_test: true,
            depth_write: true,
            primitive: PrimitiveMode::default(),
            instance_count: 1,
            transparency: TransparencyMode::default(),
        }
    }
}

/// What to draw: a mesh/material pair plus the render state to draw it
/// with. `mesh` is nullable so a command can exist purely to run a shader
/// (e.g. a full-screen post-processing pass) without geometry of its own.
#[derive(Debug, Clone, Copy)]
pub struct Renderable {
    pub mesh: Option<Uuid>,
    pub material: Option<Uuid>,
    pub settings: RenderSettings,
}

impl Renderable {
    /// A renderable drawing `mesh` with `material` and default settings.
    pub fn new(mesh: Uuid, material: Uuid) -> Self {
        Self {
            mesh: Some(mesh),
            material: Some(material),
            settings: RenderSettings::default(),
        }
    }

    /// A renderable with no geometry of its own (e.g. a full-screen quad
    /// draw where the vertex shader synthesizes positions).
    pub fn screen_space(settings: RenderSettings) -> Self {
        Self {
            mesh: None,
            material: None,
            settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_cull_back_faces_and_write_depth() {
        let settings = RenderSettings::default();
        assert_eq!(settings.cull_face, CullFace::Back);
        assert!(settings.depth_write);
    }
}
