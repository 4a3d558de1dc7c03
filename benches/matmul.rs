use apytypes::array::NdArray;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn square(n: usize) -> NdArray<f64> {
    let data: Vec<f64> = (0..n * n).map(|i| i as f64).collect();
    NdArray::new(vec![n, n], data).unwrap()
}

pub fn bench_matmul_64(c: &mut Criterion) {
    let a = square(64);
    let b = square(64);
    c.bench_function("matmul 64x64 f64", |bench| {
        bench.iter(|| {
            black_box(&a)
                .matmul(black_box(&b), || 0.0, |x, y| x * y, |x, y| x + y)
                .unwrap()
        })
    });
}

pub fn bench_convolve_1024(c: &mut Criterion) {
    let a = NdArray::new(vec![1024], (0..1024).map(|i| i as f64).collect()).unwrap();
    let kernel = NdArray::new(vec![16], (0..16).map(|i| i as f64).collect()).unwrap();
    c.bench_function("convolve1d 1024x16 full", |bench| {
        bench.iter(|| {
            black_box(&a)
                .convolve1d(
                    black_box(&kernel),
                    apytypes::array::ConvolveMode::Full,
                    || 0.0,
                    |x, y| x * y,
                    |x, y| x + y,
                )
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_matmul_64, bench_convolve_1024);
criterion_main!(benches);
