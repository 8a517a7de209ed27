//! Adaptive infill benchmarks
//!
//! Run with: cargo bench
//!
//! To compare against baseline:
//! 1. First run: cargo bench -- --save-baseline main
//! 2. After changes: cargo bench -- --baseline main

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use adaptive_infill::geometry::Point3F;
use adaptive_infill::infill::{
    build_octree, connect, generate_for_layer, AdaptiveInfillConfig, AdaptiveInfillGenerator,
};
use adaptive_infill::mesh::TriangleMesh;
use adaptive_infill::CoordF;

fn bench_octree_build(c: &mut Criterion) {
    let mesh = TriangleMesh::cube(20.0);
    let mut group = c.benchmark_group("octree_build");

    for spacing in [2.5, 1.0, 0.5] {
        group.bench_with_input(
            BenchmarkId::new("cube_20mm", spacing),
            &spacing,
            |b, &spacing| {
                b.iter(|| build_octree(black_box(&mesh), black_box(spacing), Point3F::zero()))
            },
        );
    }

    group.finish();
}

fn bench_layer_lines(c: &mut Criterion) {
    let mesh = TriangleMesh::cube(20.0);
    let octree = build_octree(&mesh, 1.0, Point3F::zero()).unwrap();

    let mut group = c.benchmark_group("layer_lines");
    group.throughput(Throughput::Elements(octree.cube_count() as u64));

    // The center layer cuts the densest part of the lattice.
    group.bench_function("generate_for_layer", |b| {
        b.iter(|| generate_for_layer(black_box(&octree), black_box(0.0)))
    });

    group.finish();
}

fn bench_connect(c: &mut Criterion) {
    let mesh = TriangleMesh::cube(20.0);
    let octree = build_octree(&mesh, 1.0, Point3F::zero()).unwrap();
    let segments = generate_for_layer(&octree, 0.0);

    let mut group = c.benchmark_group("connect");
    group.throughput(Throughput::Elements(segments.len() as u64));

    group.bench_function("center_layer", |b| b.iter(|| connect(black_box(&segments))));

    group.finish();
}

fn bench_fill_layers(c: &mut Criterion) {
    let mesh = TriangleMesh::cube(20.0);
    let mut generator = AdaptiveInfillGenerator::new(AdaptiveInfillConfig::default());
    generator.prepare(&mesh).unwrap();

    let heights: Vec<CoordF> = (0..50).map(|i| -9.8 + 0.4 * i as CoordF).collect();

    c.bench_function("fill_layers_50", |b| {
        b.iter(|| generator.fill_layers(black_box(&heights)))
    });
}

criterion_group!(
    benches,
    bench_octree_build,
    bench_layer_lines,
    bench_connect,
    bench_fill_layers,
);
criterion_main!(benches);
