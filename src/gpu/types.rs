//! Backend-agnostic GPU resource types: handles, formats, and layout
//! descriptions shared by the buffer, texture, and shader modules.

use crate::core::handle::Handle;

/// Marker type for vertex/index/uniform/shader-storage buffer handles.
#[derive(Debug)]
pub struct BufferMarker;
/// A handle to a GPU buffer object.
pub type BufferHandle = Handle<BufferMarker>;

/// Marker type for vertex array object handles.
#[derive(Debug)]
pub struct VaoMarker;
/// A handle to a vertex array object.
pub type VaoHandle = Handle<VaoMarker>;

/// Marker type for texture handles.
#[derive(Debug)]
pub struct TextureMarker;
/// A handle to a GPU texture.
pub type TextureHandle = Handle<TextureMarker>;

/// Marker type for framebuffer handles.
#[derive(Debug)]
pub struct FramebufferMarker;
/// A handle to a framebuffer object.
pub type FramebufferHandle = Handle<FramebufferMarker>;

/// Marker type for shader program handles.
#[derive(Debug)]
pub struct ShaderMarker;
/// A handle to a linked shader program.
pub type ShaderHandle = Handle<ShaderMarker>;

/// Buffer role: VAO attribute slot, index buffer, or UBO.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferType {
    /// Per-vertex attribute data.
    Vertex = 0,
    /// Element indices.
    Index = 1,
    /// Std140 uniform block storage.
    Uniform = 2,
    /// Shader-storage block storage.
    ShaderStorage = 3,
}

/// Usage hint controlling how the backend places a buffer in memory.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    /// Set once, drawn many times.
    #[default]
    Static = 0,
    /// Updated frequently (e.g. per-frame uniform data).
    Dynamic = 1,
    /// Set once, drawn only a few times (e.g. UI overlays).
    Stream = 2,
}

/// A single vertex attribute slot.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeSlot {
    /// Object-space position.
    Position = 0,
    /// Object-space normal.
    Normal = 1,
    /// Per-vertex color.
    Color = 2,
    /// Texture coordinate.
    TexCoord = 3,
    /// Tangent (for normal mapping).
    Tangent = 4,
    /// Engine-defined per-vertex integer payload.
    MiscInt = 5,
    /// Bone indices for skeletal skinning.
    BoneIndices = 6,
    /// Bone weights for skeletal skinning.
    BoneWeights = 7,
}

impl VertexAttributeSlot {
    /// All slots, in binding-location order.
    pub const ALL: [VertexAttributeSlot; 8] = [
        Self::Position,
        Self::Normal,
        Self::Color,
        Self::TexCoord,
        Self::Tangent,
        Self::MiscInt,
        Self::BoneIndices,
        Self::BoneWeights,
    ];

    /// Shader attribute location this slot is bound to.
    pub const fn location(self) -> u32 {
        self as u32
    }
}

/// Texture target kind: 2D, 2D-array, 2D-multisample, cubemap, or
/// cubemap-array.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    /// Plain 2D texture.
    Texture2D = 0,
    /// Array of 2D layers.
    Texture2DArray = 1,
    /// Multisampled 2D texture (MSAA render targets).
    Texture2DMultisample = 2,
    /// Six-face cubemap.
    Cubemap = 3,
    /// Array of cubemaps.
    CubemapArray = 4,
}

/// Pixel format.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit red channel.
    R8,
    /// 8-bit RGBA.
    Rgba8,
    /// 16-bit float RGBA (HDR render targets).
    Rgba16F,
    /// 32-bit float RGBA.
    Rgba32F,
    /// Depth-only.
    Depth24,
    /// Combined depth/stencil.
    Depth24Stencil8,
}

impl TextureFormat {
    /// `true` for formats that carry a depth component, used to decide
    /// whether a framebuffer attachment satisfies `has_depth_stencil`.
    pub const fn is_depth(self) -> bool {
        matches!(self, Self::Depth24 | Self::Depth24Stencil8)
    }
}

/// A framebuffer's aliasing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferAliasing {
    /// One sample per pixel.
    Default,
    /// Multisampled; color attachments require a blit to resolve.
    Msaa {
        /// Sample count.
        samples: u32,
    },
}

/// Whether a framebuffer's color attachment is addressable in later passes
/// (a texture) or MSAA-only storage (a renderbuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorAttachmentKind {
    /// Sampled as a texture by later passes.
    Texture,
    /// Renderbuffer storage; MSAA only, requires blit to resolve.
    Renderbuffer,
}

/// Blend factors for the fixed-function blend stage.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// `0`
    Zero,
    /// `1`
    One,
    /// Source alpha.
    SrcAlpha,
    /// `1 - source alpha`.
    OneMinusSrcAlpha,
}

/// Which winding-order faces are culled.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullFace {
    /// No culling.
    None,
    /// Cull back faces (typical for opaque geometry).
    #[default]
    Back,
    /// Cull front faces (typical for shadow casting from inside geometry).
    Front,
}

/// Draw call primitive topology.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveMode {
    /// Individual triangles.
    #[default]
    Triangles,
    /// Connected triangle strip.
    TriangleStrip,
    /// Individual lines.
    Lines,
    /// Individual points.
    Points,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_attribute_slots_have_distinct_locations() {
        let locations: Vec<u32> = VertexAttributeSlot::ALL
            .iter()
            .map(|s| s.location())
            .collect();
        let mut sorted = locations.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), locations.len());
    }

    #[test]
    fn depth_formats_report_is_depth() {
        assert!(TextureFormat::Depth24.is_depth());
        assert!(TextureFormat::Depth24Stencil8.is_depth());
        assert!(!TextureFormat::Rgba8.is_depth());
    }
}
