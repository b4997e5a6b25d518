//! Property tests for std140 uniform-block layout: arbitrary field
//! declarations should always produce offsets aligned to their own kind and
//! a total size that packs cleanly into a 16-byte-aligned buffer.

use proptest::prelude::*;
use render_core::uniform::block::compute_layout;
use render_core::uniform::value::UniformKind;

const KINDS: [UniformKind; 18] = [
    UniformKind::Bool,
    UniformKind::Int,
    UniformKind::UInt,
    UniformKind::Float,
    UniformKind::Double,
    UniformKind::IVec2,
    UniformKind::IVec3,
    UniformKind::IVec4,
    UniformKind::Vec2,
    UniformKind::Vec3,
    UniformKind::Vec4,
    UniformKind::Mat2,
    UniformKind::Mat3,
    UniformKind::Mat4,
    UniformKind::FloatArray,
    UniformKind::Vec3Array,
    UniformKind::Vec4Array,
    UniformKind::Mat4Array,
];

fn arb_field() -> impl Strategy<Value = (String, UniformKind, Option<usize>)> {
    (0..KINDS.len(), "[a-zA-Z][a-zA-Z0-9_]{0,8}", 1usize..8).prop_map(|(kind_idx, name, array_len)| {
        let kind = KINDS[kind_idx];
        let array_len = if kind.is_array() { Some(array_len) } else { None };
        (name, kind, array_len)
    })
}

proptest! {
    #[test]
    fn every_offset_is_aligned_to_its_kind(fields in prop::collection::vec(arb_field(), 0..12)) {
        let (laid_out, _total) = compute_layout(&fields);
        for field in &laid_out {
            prop_assert_eq!(
                field.offset % field.kind.std140_align(),
                0,
                "field `{}` of kind {:?} is misaligned at offset {}",
                field.name,
                field.kind,
                field.offset,
            );
        }
    }

    #[test]
    fn total_size_is_a_multiple_of_16(fields in prop::collection::vec(arb_field(), 0..12)) {
        let (_laid_out, total) = compute_layout(&fields);
        prop_assert_eq!(total % 16, 0);
    }

    #[test]
    fn fields_never_overlap(fields in prop::collection::vec(arb_field(), 0..12)) {
        let (laid_out, _total) = compute_layout(&fields);
        for window in laid_out.windows(2) {
            let (a, b) = (&window[0], &window[1]);
            prop_assert!(a.offset + a.size <= b.offset);
        }
    }
}
