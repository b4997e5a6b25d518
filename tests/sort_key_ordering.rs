//! Property tests for `SortKey`: arbitrary field tuples should pack and
//! order consistently with a direct tuple comparison over the same fields,
//! and identical fields should always pack to the same bits.

use proptest::prelude::*;
use render_core::render::renderable::TransparencyMode;
use render_core::render::sort_key::{SortKey, SortKeyFields};

fn arb_transparency() -> impl Strategy<Value = TransparencyMode> {
    prop_oneof![
        Just(TransparencyMode::Opaque),
        (0u8..=255).prop_map(|cutoff| TransparencyMode::AlphaTest { cutoff }),
        Just(TransparencyMode::Blended),
    ]
}

fn arb_fields() -> impl Strategy<Value = SortKeyFields> {
    (
        arb_transparency(),
        0u8..16,
        any::<u16>(),
        any::<u16>(),
        0u16..256,
        0.0f32..=1.0,
    )
        .prop_map(
            |(transparency, viewport_index, layer_order_index, material_id, shader_id, normalized_depth)| SortKeyFields {
                transparency,
                viewport_index,
                layer_order_index,
                material_id,
                shader_id,
                normalized_depth,
            },
        )
}

fn pass_rank(transparency: TransparencyMode) -> u8 {
    match transparency {
        TransparencyMode::Opaque => 0,
        TransparencyMode::AlphaTest { .. } => 1,
        TransparencyMode::Blended => 2,
    }
}

/// Same depth-quantization and back-to-front inversion `SortKey::build`
/// applies internally, reimplemented against only the public field record so
/// this test exercises the real packing rather than assuming it.
fn depth_rank(fields: &SortKeyFields) -> u16 {
    let quantized = (fields.normalized_depth.clamp(0.0, 1.0) * u16::MAX as f32).round() as u16;
    if fields.transparency == TransparencyMode::Blended {
        u16::MAX - quantized
    } else {
        quantized
    }
}

fn tuple_rank(fields: &SortKeyFields) -> (u8, u8, u16, u16, u16, u16) {
    (
        pass_rank(fields.transparency),
        fields.viewport_index,
        fields.layer_order_index,
        fields.material_id,
        fields.shader_id,
        depth_rank(fields),
    )
}

proptest! {
    #[test]
    fn ordering_matches_direct_tuple_comparison(a in arb_fields(), b in arb_fields()) {
        let key_order = SortKey::build(a).cmp(&SortKey::build(b));
        let tuple_order = tuple_rank(&a).cmp(&tuple_rank(&b));
        prop_assert_eq!(key_order, tuple_order);
    }

    #[test]
    fn identical_fields_always_pack_identically(fields in arb_fields()) {
        prop_assert_eq!(SortKey::build(fields), SortKey::build(fields));
    }
}
