//! The polymorphic resource payload: a tagged variant over every resource
//! kind the cache can own, replacing virtual dispatch with a `kind()`
//! accessor and a single `post_construction` dispatch site.

use uuid::Uuid;

use crate::core::error::RenderResult;
use crate::core::math::Color;
use crate::gpu::backend::GraphicsBackend;
use crate::mesh::Mesh;
use crate::resource::handle::ResourceKind;
use crate::shader::ShaderProgram;

/// Bone hierarchy for skeletal animation: parent index per bone (`-1` for
/// roots) alongside each bone's display name.
#[derive(Debug, Clone)]
pub struct Skeleton {
    /// Bone names, indexed by bone id.
    pub bone_names: Vec<String>,
    /// Parent bone index per bone; `-1` marks a root bone.
    pub parent_indices: Vec<i32>,
}

/// A mesh + material + optional skeleton composition.
#[derive(Debug, Clone, Copy, Default)]
pub struct Model {
    /// The model's drawable geometry.
    pub mesh: Option<Uuid>,
    /// The model's surface material.
    pub material: Option<Uuid>,
    /// The model's skeleton, if it is skeletally animated.
    pub skeleton: Option<Uuid>,
}

/// A skeletal animation clip's timing metadata. Bone-transform sample data
/// is owned by the animation thread's pose buffer, not by this payload.
#[derive(Debug, Clone)]
pub struct Animation {
    /// Clip duration in seconds.
    pub duration_seconds: f32,
    /// Sample rate the clip was authored at.
    pub fps: f32,
    /// Whether the clip should ping-pong rather than loop from the start.
    pub ping_pong: bool,
}

/// Surface shading parameters. Missing textures resolve to the engine's
/// fallback white/gray textures.
#[derive(Debug, Clone, Copy)]
pub struct Material {
    /// Base color, multiplied with the diffuse texture if present.
    pub color: Color,
    /// Specular exponent.
    pub shininess: f32,
    /// Primary albedo texture.
    pub diffuse_texture: Option<Uuid>,
    /// Normal map.
    pub normal_texture: Option<Uuid>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::GRAY,
            shininess: 32.0,
            diffuse_texture: None,
            normal_texture: None,
        }
    }
}

/// An audio clip reference; playback itself is handled elsewhere.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Source path, for re-decoding after eviction.
    pub path: String,
    /// Clip duration in seconds.
    pub duration_seconds: f32,
}

/// An embedded scripting behavior; script execution itself is out of scope.
#[derive(Debug, Clone)]
pub struct PythonScript {
    /// Script source text.
    pub source: String,
}

/// The payload a [`super::handle::ResourceHandle`] owns, tagged by kind.
#[derive(Debug)]
pub enum ResourcePayload {
    /// Drawable geometry.
    Mesh(Mesh),
    /// Bone hierarchy.
    Skeleton(Skeleton),
    /// Mesh + material + skeleton composition.
    Model(Model),
    /// A skeletal animation clip's timing metadata.
    Animation(Animation),
    /// Surface shading parameters.
    Material(Material),
    /// A 2D/array/MSAA texture.
    Texture(crate::gpu::texture::Texture),
    /// A six-face cubemap texture.
    Cubemap(crate::gpu::texture::Texture),
    /// A linked shader program.
    ShaderProgram(ShaderProgram),
    /// An audio clip reference.
    Audio(AudioClip),
    /// An embedded scripting behavior.
    PythonScript(PythonScript),
}

impl ResourcePayload {
    /// The kind this payload reports, matching the handle it's installed on.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Mesh(_) => ResourceKind::Mesh,
            Self::Skeleton(_) => ResourceKind::Skeleton,
            Self::Model(_) => ResourceKind::Model,
            Self::Animation(_) => ResourceKind::Animation,
            Self::Material(_) => ResourceKind::Material,
            Self::Texture(_) => ResourceKind::Texture,
            Self::Cubemap(_) => ResourceKind::Cubemap,
            Self::ShaderProgram(_) => ResourceKind::ShaderProgram,
            Self::Audio(_) => ResourceKind::Audio,
            Self::PythonScript(_) => ResourceKind::PythonScript,
        }
    }

    /// Finalizes any work that must run on the graphics thread.
    ///
    /// In this design, GPU-backed payloads (mesh, texture, cubemap, shader
    /// program) are already resident on construction — their loader
    /// decodes CPU data and immediately calls into [`GraphicsBackend`] to
    /// build the GPU object — so post-construction for them is a
    /// liveness check rather than further upload work. Non-GPU kinds have
    /// nothing to finalize.
    pub fn post_construction(&mut self, _backend: &mut dyn GraphicsBackend) -> RenderResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let payload = ResourcePayload::Material(Material::default());
        assert_eq!(payload.kind(), ResourceKind::Material);
    }

    #[test]
    fn default_material_uses_fallback_gray() {
        assert_eq!(Material::default().color, Color::GRAY);
    }
}
