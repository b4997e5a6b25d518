//! Sort key packing benchmarks.
//!
//! Run with: `cargo bench --bench sort_key_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use render_core::render::renderable::TransparencyMode;
use render_core::render::sort_key::{SortKey, SortKeyFields};

fn sample_fields(i: u32) -> SortKeyFields {
    SortKeyFields {
        transparency: if i % 3 == 0 { TransparencyMode::Blended } else { TransparencyMode::Opaque },
        viewport_index: (i % 4) as u8,
        layer_order_index: (i % 16) as u16,
        material_id: (i % 4096) as u16,
        shader_id: (i % 256) as u16,
        normalized_depth: (i % 1000) as f32 / 1000.0,
    }
}

fn bench_sort_key_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_key");

    group.bench_function("build_single", |b| {
        let fields = sample_fields(17);
        b.iter(|| black_box(SortKey::build(black_box(fields))));
    });

    group.bench_function("build_and_sort_10k", |b| {
        let fields: Vec<SortKeyFields> = (0..10_000).map(sample_fields).collect();
        b.iter(|| {
            let mut keys: Vec<SortKey> = fields.iter().map(|&f| SortKey::build(f)).collect();
            keys.sort_unstable();
            black_box(keys.len())
        });
    });

    group.finish();
}

criterion_group!(sort_key_benches, bench_sort_key_build);
criterion_main!(sort_key_benches);
