//! Performance benchmarks for cswl1-demosaic
//!
//! This benchmark suite measures the solver stages separately and the full
//! demosaic pipeline across image sizes.

use criterion::*;
use cswl1_demosaic::{
    bilinear_demosaic, demosaic_planar, flatten, gauss_seidel_sweep, shrink, CfaPhase,
    Cswl1Params, EdgeVariables, EdgeWeights, MosaicedContourStencils, OrientationEstimator,
};
use itertools::iproduct;
use std::hint::black_box;

/// Helper function to create planar RGB data with gradients and a sharp edge
fn create_planes(width: usize, height: usize) -> Vec<f32> {
    let npix = width * height;
    let mut planes = vec![0.0f32; 3 * npix];

    iproduct!(0..height, 0..width).for_each(|(y, x)| {
        let m = y * width + x;
        let edge = if 3 * x > 2 * y + width / 3 { 0.4 } else { 0.0 };
        planes[m] = x as f32 / width as f32 * 0.6 + edge;
        planes[npix + m] = y as f32 / height as f32 * 0.6 + edge;
        planes[2 * npix + m] = (x + y) as f32 / (width + height) as f32 * 0.6 + edge;
    });

    planes
}

/// Benchmark contour stencil orientation estimation
fn bench_orientation_estimation(c: &mut Criterion) {
    let sizes = vec![(128, 128), (256, 256), (512, 512)];
    let estimator = MosaicedContourStencils::default();

    let mut group = c.benchmark_group("orientation_estimation");
    group.sample_size(10);

    for (width, height) in sizes {
        group.throughput(Throughput::Elements((width * height) as u64));
        let mosaic = flatten(&create_planes(width, height), width, height, CfaPhase::RGGB).unwrap();

        group.bench_with_input(
            BenchmarkId::new("mosaiced_stencils", format!("{}x{}", width, height)),
            &mosaic,
            |b, mosaic| {
                b.iter(|| black_box(estimator.estimate(mosaic, width, height, CfaPhase::RGGB).unwrap()))
            },
        );
    }

    group.finish();
}

/// Benchmark graph construction for different smoothing widths
fn bench_graph_construction(c: &mut Criterion) {
    let (width, height) = (256, 256);
    let sigmas = vec![0.0f32, 0.6, 2.0];

    let mosaic = flatten(&create_planes(width, height), width, height, CfaPhase::RGGB).unwrap();
    let labels = MosaicedContourStencils::default()
        .estimate(&mosaic, width, height, CfaPhase::RGGB)
        .unwrap();

    let mut group = c.benchmark_group("graph_construction");
    group.sample_size(10);
    group.throughput(Throughput::Elements((width * height) as u64));

    for sigma in sigmas {
        group.bench_with_input(
            BenchmarkId::new("edge_weights", format!("sigma{}", sigma)),
            &sigma,
            |b, &s| b.iter(|| black_box(EdgeWeights::build(&labels, width, height, 0.15, s).unwrap())),
        );
    }

    group.finish();
}

/// Benchmark one Bregman iteration (shrinkage followed by relaxation)
fn bench_bregman_iteration(c: &mut Criterion) {
    let sizes = vec![(128, 128), (256, 256)];

    let mut group = c.benchmark_group("bregman_iteration");
    group.sample_size(10);

    for (width, height) in sizes {
        let npix = width * height;
        group.throughput(Throughput::Elements(npix as u64));

        let mosaic = flatten(&create_planes(width, height), width, height, CfaPhase::RGGB).unwrap();
        let labels = MosaicedContourStencils::default()
            .estimate(&mosaic, width, height, CfaPhase::RGGB)
            .unwrap();
        let graph = EdgeWeights::build(&labels, width, height, 0.15, 0.6).unwrap();
        let mut initial = vec![0.0f32; 3 * npix];
        bilinear_demosaic(&mosaic, width, height, CfaPhase::RGGB, &mut initial);

        group.bench_with_input(
            BenchmarkId::new("shrink_and_sweep", format!("{}x{}", width, height)),
            &initial,
            |b, initial| {
                let mut image = initial.clone();
                let mut vars = EdgeVariables::zeroed(npix).unwrap();
                let mut bregman = vec![0.0f32; npix];
                b.iter(|| {
                    shrink(&mut vars, &image, &graph, 1.8);
                    black_box(gauss_seidel_sweep(
                        &mut image,
                        &mut bregman,
                        &vars.dtilde,
                        &mosaic,
                        width,
                        height,
                        CfaPhase::RGGB,
                    ))
                })
            },
        );
    }

    group.finish();
}

/// Benchmark the full demosaic with a fixed iteration budget
fn bench_full_demosaic(c: &mut Criterion) {
    let sizes = vec![(64, 64), (128, 128)];
    let iterations = vec![10, 50];

    let mut group = c.benchmark_group("full_demosaic");
    group.sample_size(10);

    for ((width, height), max_iterations) in iproduct!(sizes, iterations) {
        group.throughput(Throughput::Elements((width * height) as u64));
        let planes = create_planes(width, height);
        // Tiny tolerance so every run uses the whole budget
        let params = Cswl1Params::default()
            .with_tolerance(1e-9)
            .with_max_iterations(max_iterations);

        group.bench_with_input(
            BenchmarkId::new(
                "demosaic_planar",
                format!("{}x{}_it{}", width, height, max_iterations),
            ),
            &planes,
            |b, planes| {
                b.iter(|| {
                    let mut data = planes.clone();
                    black_box(demosaic_planar(&mut data, width, height, CfaPhase::RGGB, &params).unwrap())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_orientation_estimation,
    bench_graph_construction,
    bench_bregman_iteration,
    bench_full_demosaic,
);
criterion_main!(benches);
