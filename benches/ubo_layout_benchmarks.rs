//! std140 uniform-block layout benchmarks.
//!
//! Run with: `cargo bench --bench ubo_layout_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use render_core::uniform::block::compute_layout;
use render_core::uniform::value::UniformKind;

fn small_fields() -> Vec<(String, UniformKind, Option<usize>)> {
    vec![
        ("uWorldMatrix".to_string(), UniformKind::Mat4, None),
        ("uColor".to_string(), UniformKind::Vec4, None),
        ("uShininess".to_string(), UniformKind::Float, None),
    ]
}

fn large_fields(count: usize) -> Vec<(String, UniformKind, Option<usize>)> {
    let mut fields = small_fields();
    fields.push(("uBoneMatrices".to_string(), UniformKind::Mat4Array, Some(count)));
    fields.push(("uLightPositions".to_string(), UniformKind::Vec3Array, Some(count)));
    fields
}

fn bench_compute_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("ubo_layout");

    group.bench_function("small_block", |b| {
        let fields = small_fields();
        b.iter(|| black_box(compute_layout(black_box(&fields))));
    });

    for bone_count in [16, 64, 256] {
        group.bench_with_input(BenchmarkId::new("bone_block", bone_count), &bone_count, |b, &count| {
            let fields = large_fields(count);
            b.iter(|| black_box(compute_layout(black_box(&fields))));
        });
    }

    group.finish();
}

criterion_group!(ubo_layout_benches, bench_compute_layout);
criterion_main!(ubo_layout_benches);
