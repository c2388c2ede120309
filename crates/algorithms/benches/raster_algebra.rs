//! Benchmarks for the per-pixel pipeline stages

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vegscan_algorithms::calibration::{toa_reflectance, ToaParams};
use vegscan_algorithms::indices::{masked_normalized_difference, IndexParams};
use vegscan_core::metadata::CalibrationParameters;
use vegscan_core::{GeoTransform, Raster};

fn dn_band(size: usize) -> Raster<u16> {
    let mut r = Raster::new(size, size);
    r.set_transform(GeoTransform::new(0.0, size as f64 * 30.0, 30.0, -30.0));
    for row in 0..size {
        for col in 0..size {
            let v = ((row * 7 + col * 13) % 30000) as u16;
            r.set(row, col, v).unwrap();
        }
    }
    r
}

fn reflectance_band(size: usize, base: f32) -> Raster<f32> {
    let mut r = Raster::new(size, size);
    r.set_transform(GeoTransform::new(0.0, size as f64 * 30.0, 30.0, -30.0));
    for row in 0..size {
        for col in 0..size {
            let v = base + ((row * 7 + col * 13) % 200) as f32 / 1000.0;
            r.set(row, col, v).unwrap();
        }
    }
    r
}

fn bench_calibration(c: &mut Criterion) {
    let cal = CalibrationParameters {
        gain: 2.0e-5,
        offset: -0.1,
        solar_zenith: 31.2,
    };
    let mut group = c.benchmark_group("calibration/toa");
    for size in [256, 512, 1024] {
        let band = dn_band(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| toa_reflectance(black_box(&band), &cal, &ToaParams::default()).unwrap())
        });
    }
    group.finish();
}

fn bench_masked_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("indices/masked_nd");
    for size in [256, 512, 1024] {
        let nir = reflectance_band(size, 0.4);
        let red = reflectance_band(size, 0.1);
        let swir = reflectance_band(size, 0.2);
        let params = IndexParams::default();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                masked_normalized_difference(
                    black_box(&nir),
                    black_box(&red),
                    Some(black_box(&swir)),
                    None,
                    &params,
                )
                .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_calibration, bench_masked_index);
criterion_main!(benches);
