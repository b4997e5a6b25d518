//! The 64-bit packed sort key draw commands are ordered by.
//!
//! Fields are packed most-significant-first in priority order: pass
//! bucket, viewport, render-layer order, material id, shader id, depth.
//! Two commands with identical fields always pack to the same key — the
//! property a [`crate::render::pipeline::RenderPipeline`] stable sort
//! depends on for deterministic frame-to-frame ordering.

use crate::render::renderable::TransparencyMode;

const PASS_BITS: u32 = 4;
const VIEWPORT_BITS: u32 = 4;
const LAYER_BITS: u32 = 16;
const MATERIAL_BITS: u32 = 16;
const SHADER_BITS: u32 = 8;
const DEPTH_BITS: u32 = 16;

const DEPTH_SHIFT: u32 = 0;
const SHADER_SHIFT: u32 = DEPTH_SHIFT + DEPTH_BITS;
const MATERIAL_SHIFT: u32 = SHADER_SHIFT + SHADER_BITS;
const LAYER_SHIFT: u32 = MATERIAL_SHIFT + MATERIAL_BITS;
const VIEWPORT_SHIFT: u32 = LAYER_SHIFT + LAYER_BITS;
const PASS_SHIFT: u32 = VIEWPORT_SHIFT + VIEWPORT_BITS;

const _: () = assert!(PASS_SHIFT + PASS_BITS == 64);

fn pass_bucket(transparency: TransparencyMode) -> u64 {
    match transparency {
        TransparencyMode::Opaque => 0,
        TransparencyMode::AlphaTest { .. } => 1,
        TransparencyMode::Blended => 2,
    }
}

/// The inputs a [`SortKey`] is packed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortKeyFields {
    pub transparency: TransparencyMode,
    pub viewport_index: u8,
    pub layer_order_index: u16,
    pub material_id: u16,
    pub shader_id: u16,
    /// Normalized depth in `[0, 1]`, camera-space distance mapped by the
    /// pipeline's running near/far tracking.
    pub normalized_depth: f32,
}

/// A packed, totally-ordered draw-command sort key. Lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey(u64);

impl SortKey {
    /// Packs `fields` into a sort key. Blended commands get their depth
    /// bucket inverted so the stable sort draws farthest-first
    /// (back-to-front), matching the opaque pass's nearest-first order
    /// inverted.
    pub fn build(fields: SortKeyFields) -> Self {
        let depth = (fields.normalized_depth.clamp(0.0, 1.0) * u16::MAX as f32).round() as u64;
        let depth = if fields.transparency == TransparencyMode::Blended {
            u16::MAX as u64 - depth
        } else {
            depth
        };
        let material = fields.material_id as u64 & mask(MATERIAL_BITS);
        let shader = fields.shader_id as u64 & mask(SHADER_BITS);
        let layer = fields.layer_order_index as u64 & mask(LAYER_BITS);
        let viewport = fields.viewport_index as u64 & mask(VIEWPORT_BITS);
        let pass = pass_bucket(fields.transparency) & mask(PASS_BITS);

        let packed = (pass << PASS_SHIFT)
            | (viewport << VIEWPORT_SHIFT)
            | (layer << LAYER_SHIFT)
            | (material << MATERIAL_SHIFT)
            | (shader << SHADER_SHIFT)
            | (depth << DEPTH_SHIFT);
        Self(packed)
    }

    /// The raw packed bits, exposed for tests and diagnostics.
    pub fn raw(self) -> u64 {
        self.0
    }
}

const fn mask(bits: u32) -> u64 {
    (1u64 << bits) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(transparency: TransparencyMode, depth: f32) -> SortKeyFields {
        SortKeyFields {
            transparency,
            viewport_index: 0,
            layer_order_index: 0,
            material_id: 0,
            shader_id: 0,
            normalized_depth: depth,
        }
    }

    #[test]
    fn opaque_sorts_before_blended_regardless_of_depth() {
        let opaque = SortKey::build(fields(TransparencyMode::Opaque, 1.0));
        let blended = SortKey::build(fields(TransparencyMode::Blended, 0.0));
        assert!(opaque < blended);
    }

    #[test]
    fn opaque_sorts_nearest_first() {
        let near = SortKey::build(fields(TransparencyMode::Opaque, 0.1));
        let far = SortKey::build(fields(TransparencyMode::Opaque, 0.9));
        assert!(near < far);
    }

    #[test]
    fn blended_sorts_farthest_first() {
        let near = SortKey::build(fields(TransparencyMode::Blended, 0.1));
        let far = SortKey::build(fields(TransparencyMode::Blended, 0.9));
        assert!(far < near);
    }

    #[test]
    fn identical_fields_pack_identically() {
        let f = fields(TransparencyMode::Opaque, 0.42);
        assert_eq!(SortKey::build(f), SortKey::build(f));
    }

    #[test]
    fn layer_order_dominates_material_and_shader() {
        let mut low_layer = fields(TransparencyMode::Opaque, 0.5);
        low_layer.layer_order_index = 1;
        low_layer.material_id = u16::MAX;
        low_layer.shader_id = u16::MAX;

        let mut high_layer = fields(TransparencyMode::Opaque, 0.0);
        high_layer.layer_order_index = 2;
        high_layer.material_id = 0;
        high_layer.shader_id = 0;

        assert!(SortKey::build(low_layer) < SortKey::build(high_layer));
    }
}
